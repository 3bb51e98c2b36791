//! 模拟器配置
//!
//! 支持 TOML / JSON 文件，命令行参数通过 `merge` 覆盖文件中的值。

use crate::error::{ConfigError, SimResult};
use crate::policy::{CacheParams, CacheType, ReplacementPolicy, WritePolicy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigError::UnknownLogLevel(s.to_string())),
        }
    }
}

/// 模拟器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// 组数（1..=64）
    pub num_sets: usize,
    pub cache_type: CacheType,
    pub replacement_policy: ReplacementPolicy,
    pub write_policy: WritePolicy,
    /// 初始数据集路径；未设置时使用随库打包的数据集
    pub seed_path: Option<PathBuf>,
    /// 随机替换策略的种子；未设置时使用系统熵
    pub rng_seed: Option<u64>,
    pub log_level: LogLevel,
}

impl Default for SimConfig {
    fn default() -> Self {
        let params = CacheParams::default();
        Self {
            num_sets: params.num_sets,
            cache_type: params.cache_type,
            replacement_policy: params.replacement_policy,
            write_policy: params.write_policy,
            seed_path: None,
            rng_seed: None,
            log_level: LogLevel::default(),
        }
    }
}

/// 命令行覆盖项；`None` 表示沿用基础配置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub num_sets: Option<usize>,
    pub cache_type: Option<CacheType>,
    pub replacement_policy: Option<ReplacementPolicy>,
    pub write_policy: Option<WritePolicy>,
    pub seed_path: Option<PathBuf>,
    pub rng_seed: Option<u64>,
    pub log_level: Option<LogLevel>,
}

impl SimConfig {
    /// 默认配置：4组，直接映射，LRU，写回
    pub fn defaults() -> Self {
        Self::default()
    }

    /// 引擎使用的四个配置原语
    pub fn params(&self) -> CacheParams {
        CacheParams::new(
            self.num_sets,
            self.cache_type,
            self.replacement_policy,
            self.write_policy,
        )
    }

    /// 验证配置的有效性
    ///
    /// # 错误
    ///
    /// 组数越界时返回 `ConfigError::InvalidSetCount`
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params().validate()
    }

    /// 从 TOML 字符串加载配置
    ///
    /// # 示例
    ///
    /// ```
    /// use cache_core::config::SimConfig;
    /// use cache_core::CacheType;
    ///
    /// let config = SimConfig::from_toml(r#"
    ///     num_sets = 8
    ///     cache_type = "set-associative"
    /// "#).unwrap();
    /// assert_eq!(config.num_sets, 8);
    /// assert_eq!(config.cache_type, CacheType::SetAssociative);
    /// ```
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(toml).map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::Parse(format!("JSON parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 按扩展名从文件加载，`.json` 以外一律按 TOML 解析
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_toml(&content)?,
        };
        log::debug!("Loaded config from {}: {}", path.display(), config.params());
        Ok(config)
    }

    /// 合并覆盖项，`overrides` 优先级更高
    pub fn merge(&self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let merged = Self {
            num_sets: overrides.num_sets.unwrap_or(self.num_sets),
            cache_type: overrides.cache_type.unwrap_or(self.cache_type),
            replacement_policy: overrides
                .replacement_policy
                .unwrap_or(self.replacement_policy),
            write_policy: overrides.write_policy.unwrap_or(self.write_policy),
            seed_path: overrides.seed_path.clone().or_else(|| self.seed_path.clone()),
            rng_seed: overrides.rng_seed.or(self.rng_seed),
            log_level: overrides.log_level.unwrap_or(self.log_level),
        };
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::defaults();
        assert_eq!(config.num_sets, 4);
        assert_eq!(config.cache_type, CacheType::DirectMapped);
        assert_eq!(config.replacement_policy, ReplacementPolicy::Lru);
        assert_eq!(config.write_policy, WritePolicy::WriteBack);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_with_aliases() {
        let config = SimConfig::from_toml(
            r#"
            num_sets = 2
            cache_type = "4way"
            replacement_policy = "Random"
            write_policy = "wt"
            rng_seed = 9
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.num_sets, 2);
        assert_eq!(config.cache_type, CacheType::SetAssociative);
        assert_eq!(config.replacement_policy, ReplacementPolicy::Random);
        assert_eq!(config.write_policy, WritePolicy::WriteThrough);
        assert_eq!(config.rng_seed, Some(9));
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_from_json() {
        let config =
            SimConfig::from_json(r#"{"num_sets": 16, "write_policy": "write-through"}"#).unwrap();
        assert_eq!(config.num_sets, 16);
        assert_eq!(config.write_policy, WritePolicy::WriteThrough);
        assert_eq!(config.cache_type, CacheType::DirectMapped);
    }

    #[test]
    fn test_rejects_out_of_range_sets() {
        assert_eq!(
            SimConfig::from_toml("num_sets = 128"),
            Err(ConfigError::invalid_sets(128))
        );
    }

    #[test]
    fn test_rejects_unknown_enum_value() {
        let err = SimConfig::from_toml(r#"cache_type = "fully-associative""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_merge_overrides_take_precedence() {
        let base = SimConfig::defaults();
        let overrides = ConfigOverrides {
            num_sets: Some(8),
            write_policy: Some(WritePolicy::WriteThrough),
            ..Default::default()
        };
        let merged = base.merge(&overrides).unwrap();
        assert_eq!(merged.num_sets, 8);
        assert_eq!(merged.write_policy, WritePolicy::WriteThrough);
        assert_eq!(merged.cache_type, base.cache_type);

        let bad = ConfigOverrides {
            num_sets: Some(0),
            ..Default::default()
        };
        assert_eq!(base.merge(&bad), Err(ConfigError::invalid_sets(0)));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::Trace.to_filter(), log::LevelFilter::Trace);
        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(ConfigError::UnknownLogLevel(_))
        ));
    }
}
