//! 缓存状态：组/行网格与每行元数据
//!
//! 行只由访问引擎修改，外部只读。

use crate::error::ConfigError;
use crate::policy::CacheType;
use serde::Serialize;

/// 缓存行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheLine {
    /// 有效位
    pub(crate) valid: bool,
    /// 标签（即完整地址）
    pub(crate) tag: u64,
    /// 行数据
    pub(crate) data: String,
    /// 脏位
    pub(crate) dirty: bool,
    /// 最近使用计数（访问时清零，组内其他行加一）
    pub(crate) recency: u64,
}

impl CacheLine {
    /// 刚填入的有效行
    pub(crate) fn filled(tag: u64, data: String, dirty: bool) -> Self {
        Self {
            valid: true,
            tag,
            data,
            dirty,
            recency: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn recency(&self) -> u64 {
        self.recency
    }

    /// 有效且标签匹配
    #[inline]
    pub fn matches(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }
}

/// 缓存组
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSet {
    lines: Vec<CacheLine>,
}

impl CacheSet {
    fn new(ways: usize) -> Self {
        Self {
            lines: vec![CacheLine::default(); ways],
        }
    }

    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    pub fn line(&self, way: usize) -> Option<&CacheLine> {
        self.lines.get(way)
    }

    /// 组内行数
    pub fn ways(&self) -> usize {
        self.lines.len()
    }

    /// 有效行数
    pub fn occupied(&self) -> usize {
        self.lines.iter().filter(|l| l.valid).count()
    }

    /// 查找标签匹配的有效行
    pub fn find(&self, tag: u64) -> Option<usize> {
        self.lines.iter().position(|line| line.matches(tag))
    }

    pub(crate) fn line_mut(&mut self, way: usize) -> &mut CacheLine {
        &mut self.lines[way]
    }

    /// 用新行替换指定槽位，返回被替换的旧行
    pub(crate) fn replace(&mut self, way: usize, line: CacheLine) -> CacheLine {
        std::mem::replace(&mut self.lines[way], line)
    }

    /// 记录一次访问：被访问行清零，组内其余行加一
    pub(crate) fn touch(&mut self, way: usize) {
        for (i, line) in self.lines.iter_mut().enumerate() {
            if i == way {
                line.recency = 0;
            } else {
                line.recency = line.recency.saturating_add(1);
            }
        }
    }
}

/// 缓存
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cache {
    cache_type: CacheType,
    sets: Vec<CacheSet>,
}

impl Cache {
    /// 按声明的尺寸创建全新缓存，所有行初始无效
    ///
    /// # 参数
    /// - `num_sets`: 组数，必须在 1..=64 之间
    /// - `cache_type`: 直接映射（每组1行）或组相联（每组4行）
    ///
    /// # 错误
    /// 组数越界时返回 `ConfigError::InvalidSetCount`，不做截断
    pub fn new(num_sets: usize, cache_type: CacheType) -> Result<Self, ConfigError> {
        ConfigError::check_sets(num_sets)?;
        let ways = cache_type.ways();
        Ok(Self {
            cache_type,
            sets: (0..num_sets).map(|_| CacheSet::new(ways)).collect(),
        })
    }

    pub fn cache_type(&self) -> CacheType {
        self.cache_type
    }

    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    /// 每组行数
    pub fn ways(&self) -> usize {
        self.cache_type.ways()
    }

    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }

    pub fn set(&self, index: usize) -> Option<&CacheSet> {
        self.sets.get(index)
    }

    pub(crate) fn set_mut(&mut self, index: usize) -> &mut CacheSet {
        &mut self.sets[index]
    }

    /// 有效行总数
    pub fn occupied(&self) -> usize {
        self.sets.iter().map(CacheSet::occupied).sum()
    }

    /// 查找地址所在的 (组, 行)
    pub fn locate(&self, set_index: usize, tag: u64) -> Option<usize> {
        self.sets.get(set_index).and_then(|set| set.find(tag))
    }
}

/// `Cache::new` 的函数形式
pub fn create_cache(num_sets: usize, cache_type: CacheType) -> Result<Cache, ConfigError> {
    Cache::new(num_sets, cache_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_direct_mapped() {
        let cache = create_cache(4, CacheType::DirectMapped).unwrap();
        assert_eq!(cache.num_sets(), 4);
        assert!(cache.sets().iter().all(|s| s.ways() == 1));
        assert_eq!(cache.occupied(), 0);
    }

    #[test]
    fn test_create_set_associative() {
        let cache = create_cache(2, CacheType::SetAssociative).unwrap();
        assert_eq!(cache.num_sets(), 2);
        assert!(cache.sets().iter().all(|s| s.ways() == 4));
        for line in cache.sets().iter().flat_map(|s| s.lines()) {
            assert_eq!(line, &CacheLine::default());
            assert!(!line.is_valid());
            assert_eq!(line.data(), "");
        }
    }

    #[test]
    fn test_create_rejects_out_of_range() {
        assert_eq!(
            create_cache(0, CacheType::DirectMapped),
            Err(ConfigError::invalid_sets(0))
        );
        assert_eq!(
            create_cache(65, CacheType::SetAssociative),
            Err(ConfigError::invalid_sets(65))
        );
    }

    #[test]
    fn test_touch_resets_accessed_and_ages_others() {
        let mut cache = create_cache(1, CacheType::SetAssociative).unwrap();
        let set = cache.set_mut(0);
        set.touch(2);
        set.touch(0);
        let recency: Vec<u64> = set.lines().iter().map(CacheLine::recency).collect();
        assert_eq!(recency, vec![0, 2, 1, 2]);
    }

    #[test]
    fn test_find_ignores_invalid_lines() {
        let mut cache = create_cache(1, CacheType::SetAssociative).unwrap();
        // 无效行的默认标签为0，地址0不能命中
        assert_eq!(cache.locate(0, 0), None);

        cache
            .set_mut(0)
            .replace(3, CacheLine::filled(0, "zero".to_string(), false));
        assert_eq!(cache.locate(0, 0), Some(3));
    }
}
