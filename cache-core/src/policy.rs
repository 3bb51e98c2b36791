//! 缓存组织方式与策略
//!
//! 四个配置原语：组数、缓存类型、替换策略、写策略。

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 缓存类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheType {
    /// 直接映射：每组1行
    #[default]
    #[serde(alias = "direct", alias = "DirectMapped")]
    DirectMapped,
    /// 组相联：每组4行
    #[serde(alias = "4way", alias = "SetAssociative")]
    SetAssociative,
}

impl CacheType {
    /// 每组行数
    pub const fn ways(self) -> usize {
        match self {
            CacheType::DirectMapped => 1,
            CacheType::SetAssociative => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::DirectMapped => "direct-mapped",
            CacheType::SetAssociative => "set-associative",
        }
    }
}

impl fmt::Display for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct-mapped" | "direct" | "directmapped" | "dm" => Ok(CacheType::DirectMapped),
            "set-associative" | "setassociative" | "4way" | "sa" => Ok(CacheType::SetAssociative),
            _ => Err(ConfigError::UnknownCacheType(s.to_string())),
        }
    }
}

/// 替换策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReplacementPolicy {
    /// 最近最少使用 (LRU)
    #[default]
    #[serde(rename = "LRU", alias = "lru")]
    Lru,
    /// 随机替换
    #[serde(rename = "Random", alias = "random")]
    Random,
}

impl ReplacementPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplacementPolicy::Lru => "LRU",
            ReplacementPolicy::Random => "Random",
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplacementPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(ReplacementPolicy::Lru),
            "random" | "rand" => Ok(ReplacementPolicy::Random),
            _ => Err(ConfigError::UnknownReplacementPolicy(s.to_string())),
        }
    }
}

/// 写策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// 写回：只在淘汰脏行时写入后备存储
    #[default]
    #[serde(alias = "wb", alias = "WriteBack")]
    WriteBack,
    /// 写直达：每次写入立即同步到后备存储
    #[serde(alias = "wt", alias = "WriteThrough")]
    WriteThrough,
}

impl WritePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WritePolicy::WriteBack => "write-back",
            WritePolicy::WriteThrough => "write-through",
        }
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WritePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "write-back" | "writeback" | "wb" => Ok(WritePolicy::WriteBack),
            "write-through" | "writethrough" | "wt" => Ok(WritePolicy::WriteThrough),
            _ => Err(ConfigError::UnknownWritePolicy(s.to_string())),
        }
    }
}

/// 一次配置事件的完整参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheParams {
    pub num_sets: usize,
    pub cache_type: CacheType,
    pub replacement_policy: ReplacementPolicy,
    pub write_policy: WritePolicy,
}

impl CacheParams {
    pub fn new(
        num_sets: usize,
        cache_type: CacheType,
        replacement_policy: ReplacementPolicy,
        write_policy: WritePolicy,
    ) -> Self {
        Self {
            num_sets,
            cache_type,
            replacement_policy,
            write_policy,
        }
    }

    /// 校验组数范围，越界直接拒绝而不是截断
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_sets(self.num_sets)
    }
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            num_sets: 4,
            cache_type: CacheType::default(),
            replacement_policy: ReplacementPolicy::default(),
            write_policy: WritePolicy::default(),
        }
    }
}

impl fmt::Display for CacheParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sets, {}, {}, {}",
            self.num_sets, self.cache_type, self.replacement_policy, self.write_policy
        )
    }
}
