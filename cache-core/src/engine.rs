//! 访问引擎
//!
//! 所有读写都经过这里：命中/未命中判定、淘汰、写回与写直达、
//! 最近使用计数维护。每次访问要么完整执行，要么（配置非法时）
//! 在触碰任何状态之前被拒绝。

use crate::addressing::{DecodedAddress, decode};
use crate::error::ConfigError;
use crate::policy::{CacheParams, WritePolicy};
use crate::replacement::select_victim;
use crate::state::{Cache, CacheLine};
use crate::stats::CacheStats;
use crate::store::BackingStore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fmt;

/// 访问分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AccessKind {
    Hit,
    Miss,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Hit => f.write_str("HIT"),
            AccessKind::Miss => f.write_str("MISS"),
        }
    }
}

/// 被替换掉的有效行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvictedLine {
    pub tag: u64,
    pub data: String,
    pub dirty: bool,
}

/// 一次访问的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessOutcome {
    pub kind: AccessKind,
    pub set_index: usize,
    /// 命中或填入的组内行号
    pub way: usize,
    /// 未命中时被替换掉的有效行
    pub evicted: Option<EvictedLine>,
    /// 是否把脏行写回了后备存储
    pub wrote_back: bool,
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        self.kind == AccessKind::Hit
    }
}

/// 读访问的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOutcome {
    pub data: String,
    pub access: AccessOutcome,
}

/// 缓存访问引擎
///
/// 拥有缓存状态与后备存储；后备存储通过构造参数注入。
pub struct CacheEngine<S: BackingStore> {
    params: CacheParams,
    cache: Cache,
    store: S,
    rng: StdRng,
    stats: CacheStats,
}

impl<S: BackingStore> CacheEngine<S> {
    /// 创建引擎，随机替换使用系统熵
    ///
    /// # 错误
    /// 组数越界时返回 `ConfigError::InvalidSetCount`
    pub fn new(params: CacheParams, store: S) -> Result<Self, ConfigError> {
        Self::with_rng(params, store, StdRng::from_entropy())
    }

    /// 创建引擎，随机替换使用固定种子（可复现）
    pub fn with_seed(params: CacheParams, store: S, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(params, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(params: CacheParams, store: S, rng: StdRng) -> Result<Self, ConfigError> {
        params.validate()?;
        let cache = Cache::new(params.num_sets, params.cache_type)?;
        log::info!("Cache configured: {}", params);
        Ok(Self {
            params,
            cache,
            store,
            rng,
            stats: CacheStats::default(),
        })
    }

    /// 重新配置：整体丢弃旧缓存并重建，后备存储保留
    ///
    /// 参数非法时旧缓存保持不变。
    pub fn reconfigure(&mut self, params: CacheParams) -> Result<(), ConfigError> {
        params.validate()?;
        let cache = Cache::new(params.num_sets, params.cache_type)?;
        self.cache = cache;
        self.params = params;
        self.stats.reset();
        log::info!("Cache reconfigured: {}", params);
        Ok(())
    }

    pub fn params(&self) -> &CacheParams {
        &self.params
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// 读访问
    ///
    /// 命中时返回行数据，数据与脏位不变；未命中时从后备存储按地址取数，
    /// 填入（可能被淘汰的）槽位，脏位清零。
    pub fn read(&mut self, address: u64) -> ReadOutcome {
        let DecodedAddress { set_index, tag } = decode(address, self.params.num_sets);
        self.stats.reads += 1;

        if let Some(way) = self.cache.locate(set_index, tag) {
            log::debug!("[CACHE HIT - READ] address={} set={} way={}", address, set_index, way);
            self.stats.hits += 1;
            let set = self.cache.set_mut(set_index);
            set.touch(way);
            return ReadOutcome {
                data: set.line_mut(way).data.clone(),
                access: AccessOutcome {
                    kind: AccessKind::Hit,
                    set_index,
                    way,
                    evicted: None,
                    wrote_back: false,
                },
            };
        }

        log::debug!("[CACHE MISS - READ] address={} set={}", address, set_index);
        self.stats.misses += 1;
        let data = self.store.load(address);
        let access = self.fill(set_index, tag, data.clone(), false);
        ReadOutcome { data, access }
    }

    /// 写访问
    ///
    /// 命中时更新行数据：写直达立即同步后备存储并清脏位，写回只置脏位。
    /// 未命中时先按标签读一次后备存储（只为生成默认值的副作用），
    /// 再淘汰并填入新数据。
    pub fn write(&mut self, address: u64, data: impl Into<String>) -> AccessOutcome {
        let data = data.into();
        let DecodedAddress { set_index, tag } = decode(address, self.params.num_sets);
        self.stats.writes += 1;

        if let Some(way) = self.cache.locate(set_index, tag) {
            log::debug!("[CACHE HIT - WRITE] address={} set={} way={}", address, set_index, way);
            self.stats.hits += 1;
            let write_policy = self.params.write_policy;
            let set = self.cache.set_mut(set_index);
            set.touch(way);
            let line = set.line_mut(way);
            line.data = data;
            match write_policy {
                WritePolicy::WriteThrough => {
                    line.dirty = false;
                    let line_tag = line.tag;
                    let line_data = line.data.clone();
                    self.store.store(line_tag, line_data);
                    self.stats.write_throughs += 1;
                }
                WritePolicy::WriteBack => line.dirty = true,
            }
            return AccessOutcome {
                kind: AccessKind::Hit,
                set_index,
                way,
                evicted: None,
                wrote_back: false,
            };
        }

        log::debug!("[CACHE MISS - WRITE] address={} set={}", address, set_index);
        self.stats.misses += 1;
        let _ = self.store.load(tag);
        self.fill(set_index, tag, data, true)
    }

    /// 淘汰并填入新行（读未命中与写未命中共用）
    fn fill(&mut self, set_index: usize, tag: u64, data: String, is_write: bool) -> AccessOutcome {
        let params = self.params;
        let set = self.cache.set_mut(set_index);
        let way = select_victim(
            set,
            params.cache_type,
            params.replacement_policy,
            &mut self.rng,
        );

        let write_back = params.write_policy == WritePolicy::WriteBack;
        let victim = set.line(way).cloned().unwrap_or_default();
        let mut wrote_back = false;
        if victim.is_valid() && victim.is_dirty() && write_back {
            log::debug!(
                "Writing back dirty line: tag={} set={} way={}",
                victim.tag(),
                set_index,
                way
            );
            self.store.store(victim.tag(), victim.data().to_string());
            self.stats.write_backs += 1;
            wrote_back = true;
        }

        let line = CacheLine::filled(tag, data, is_write && write_back);
        if is_write && params.write_policy == WritePolicy::WriteThrough {
            self.store.store(tag, line.data().to_string());
            self.stats.write_throughs += 1;
        }

        let set = self.cache.set_mut(set_index);
        let old = set.replace(way, line);
        set.touch(way);

        let evicted = old.is_valid().then(|| {
            self.stats.evictions += 1;
            EvictedLine {
                tag: old.tag,
                data: old.data,
                dirty: old.dirty,
            }
        });

        AccessOutcome {
            kind: AccessKind::Miss,
            set_index,
            way,
            evicted,
            wrote_back,
        }
    }
}

impl<S: BackingStore + fmt::Debug> fmt::Debug for CacheEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEngine")
            .field("params", &self.params)
            .field("cache", &self.cache)
            .field("store", &self.store)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{CacheType, ReplacementPolicy};
    use crate::store::MemoryStore;

    fn engine(
        num_sets: usize,
        cache_type: CacheType,
        write_policy: WritePolicy,
    ) -> CacheEngine<MemoryStore> {
        let params = CacheParams::new(num_sets, cache_type, ReplacementPolicy::Lru, write_policy);
        CacheEngine::with_seed(params, MemoryStore::new(), 1).unwrap()
    }

    #[test]
    fn test_read_miss_then_hit() {
        let mut e = engine(4, CacheType::DirectMapped, WritePolicy::WriteBack);

        let first = e.read(10);
        assert_eq!(first.data, "data_at_10");
        assert_eq!(first.access.kind, AccessKind::Miss);
        assert_eq!(first.access.set_index, 2);
        let line = &e.cache().sets()[2].lines()[0];
        assert!(line.is_valid());
        assert_eq!(line.tag(), 10);
        assert!(!line.is_dirty());

        let second = e.read(10);
        assert_eq!(second.data, "data_at_10");
        assert!(second.access.is_hit());
        assert_eq!(e.cache().sets()[2].lines()[0].recency(), 0);
        assert_eq!(e.stats().hits, 1);
        assert_eq!(e.stats().misses, 1);
    }

    #[test]
    fn test_write_hit_write_back_marks_dirty() {
        let mut e = engine(4, CacheType::DirectMapped, WritePolicy::WriteBack);
        e.read(10);
        let outcome = e.write(10, "data10_modified");
        assert!(outcome.is_hit());

        let line = &e.cache().sets()[2].lines()[0];
        assert_eq!(line.data(), "data10_modified");
        assert!(line.is_dirty());
        assert_eq!(e.store().get(10).as_deref(), Some("data_at_10"));
    }

    #[test]
    fn test_write_hit_write_through_updates_store() {
        let mut e = engine(4, CacheType::DirectMapped, WritePolicy::WriteThrough);
        e.read(10);
        e.write(10, "X");

        let line = &e.cache().sets()[2].lines()[0];
        assert_eq!(line.data(), "X");
        assert!(!line.is_dirty());
        assert_eq!(e.store().get(10).as_deref(), Some("X"));
        assert_eq!(e.stats().write_throughs, 1);
    }

    #[test]
    fn test_write_miss_materializes_default_entry() {
        let mut e = engine(4, CacheType::DirectMapped, WritePolicy::WriteBack);
        e.write(7, "seven");
        // 写回模式下未命中写不会同步数据，但会留下默认值
        assert_eq!(e.store().get(7).as_deref(), Some("data_at_7"));
        let line = &e.cache().sets()[3].lines()[0];
        assert_eq!(line.data(), "seven");
        assert!(line.is_dirty());
    }

    #[test]
    fn test_direct_mapped_conflict_writes_back_dirty_line() {
        let mut e = engine(4, CacheType::DirectMapped, WritePolicy::WriteBack);
        e.write(2, "two");
        let outcome = e.read(6);

        assert_eq!(outcome.access.kind, AccessKind::Miss);
        assert!(outcome.access.wrote_back);
        assert_eq!(
            outcome.access.evicted,
            Some(EvictedLine {
                tag: 2,
                data: "two".to_string(),
                dirty: true
            })
        );
        assert_eq!(e.store().get(2).as_deref(), Some("two"));
        assert_eq!(e.stats().evictions, 1);
        assert_eq!(e.stats().write_backs, 1);
    }

    #[test]
    fn test_write_through_never_writes_back() {
        let mut e = engine(1, CacheType::DirectMapped, WritePolicy::WriteThrough);
        e.write(1, "one");
        assert_eq!(e.store().get(1).as_deref(), Some("one"));

        let outcome = e.write(2, "two");
        assert!(!outcome.wrote_back);
        assert_eq!(outcome.evicted.map(|l| l.dirty), Some(false));
        assert_eq!(e.store().get(2).as_deref(), Some("two"));
        assert_eq!(e.stats().write_backs, 0);
    }

    #[test]
    fn test_reconfigure_replaces_cache_and_keeps_store() {
        let mut e = engine(4, CacheType::DirectMapped, WritePolicy::WriteThrough);
        e.write(3, "three");

        let params = CacheParams::new(
            2,
            CacheType::SetAssociative,
            ReplacementPolicy::Random,
            WritePolicy::WriteBack,
        );
        e.reconfigure(params).unwrap();
        assert_eq!(e.cache().num_sets(), 2);
        assert_eq!(e.cache().ways(), 4);
        assert_eq!(e.cache().occupied(), 0);
        assert_eq!(e.stats(), &CacheStats::default());
        assert_eq!(e.store().get(3).as_deref(), Some("three"));
    }

    #[test]
    fn test_invalid_reconfigure_leaves_cache_untouched() {
        let mut e = engine(4, CacheType::DirectMapped, WritePolicy::WriteBack);
        e.read(1);
        let before = e.cache().clone();

        let bad = CacheParams::new(
            0,
            CacheType::SetAssociative,
            ReplacementPolicy::Lru,
            WritePolicy::WriteBack,
        );
        assert_eq!(e.reconfigure(bad), Err(ConfigError::invalid_sets(0)));
        assert_eq!(e.cache(), &before);
        assert_eq!(e.params().num_sets, 4);
    }

    #[test]
    fn test_store_handed_back_after_session() {
        let mut e = engine(4, CacheType::DirectMapped, WritePolicy::WriteBack);
        e.store_mut().store(6, "preloaded".to_string());
        assert_eq!(e.read(6).data, "preloaded");

        e.write(2, "dirty");
        // 2 与 6 同组，读 6 淘汰脏行 2 并写回
        e.read(6);

        let store = e.into_store();
        assert_eq!(store.get(2).as_deref(), Some("dirty"));
        assert_eq!(store.get(6).as_deref(), Some("preloaded"));
    }

    #[test]
    fn test_new_rejects_invalid_params() {
        let params = CacheParams::new(
            65,
            CacheType::DirectMapped,
            ReplacementPolicy::Lru,
            WritePolicy::WriteBack,
        );
        assert!(CacheEngine::new(params, MemoryStore::new()).is_err());
    }
}
