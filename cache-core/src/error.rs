//! 缓存模拟器统一错误类型
//!
//! 引擎本身的读写访问不会失败，错误只来自配置校验和初始数据集的加载。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 组数下限
pub const MIN_SETS: usize = 1;
/// 组数上限
pub const MAX_SETS: usize = 64;

/// 模拟器顶层错误
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backing store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io {
            message: err.to_string(),
        }
    }
}

/// 配置错误
///
/// 在构建任何缓存之前被拒绝，已有缓存保持不变。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("Invalid set count: {got} (expected {min}..={max})")]
    InvalidSetCount { got: usize, min: usize, max: usize },

    #[error("Unknown cache type: {0}")]
    UnknownCacheType(String),

    #[error("Unknown replacement policy: {0}")]
    UnknownReplacementPolicy(String),

    #[error("Unknown write policy: {0}")]
    UnknownWritePolicy(String),

    #[error("Unknown log level: {0}")]
    UnknownLogLevel(String),

    #[error("Config parse error: {0}")]
    Parse(String),
}

impl ConfigError {
    /// 组数越界错误
    pub fn invalid_sets(got: usize) -> Self {
        ConfigError::InvalidSetCount {
            got,
            min: MIN_SETS,
            max: MAX_SETS,
        }
    }

    /// 校验组数是否在 `MIN_SETS..=MAX_SETS` 之内
    pub fn check_sets(num_sets: usize) -> Result<(), Self> {
        if (MIN_SETS..=MAX_SETS).contains(&num_sets) {
            Ok(())
        } else {
            Err(Self::invalid_sets(num_sets))
        }
    }
}

/// 后备存储错误
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreError {
    #[error("Seed dataset is not valid JSON: {0}")]
    InvalidSeed(String),

    #[error("Seed dataset key is not a decimal address: {0}")]
    InvalidAddress(String),
}

/// Result alias used across the simulator
pub type SimResult<T> = Result<T, SimError>;
