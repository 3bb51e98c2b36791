//! cache-core: 单级 CPU 缓存模拟引擎
//!
//! 包含组/行寻址、命中判定、LRU/随机替换，以及写回/写直达到模拟主存的传播。
//!
//! ```
//! use cache_core::{CacheEngine, CacheParams, CacheType, MemoryStore, ReplacementPolicy, WritePolicy};
//!
//! let params = CacheParams::new(4, CacheType::DirectMapped, ReplacementPolicy::Lru, WritePolicy::WriteBack);
//! let mut engine = CacheEngine::new(params, MemoryStore::new()).unwrap();
//!
//! assert_eq!(engine.read(10).data, "data_at_10");
//! assert!(engine.read(10).access.is_hit());
//! ```

pub mod addressing;
pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod replacement;
pub mod state;
pub mod stats;
pub mod store;

// 重新导出主要类型
pub use addressing::{DecodedAddress, decode};
pub use config::{ConfigOverrides, LogLevel, SimConfig};
pub use engine::{AccessKind, AccessOutcome, CacheEngine, EvictedLine, ReadOutcome};
pub use error::{ConfigError, MAX_SETS, MIN_SETS, SimError, SimResult, StoreError};
pub use policy::{CacheParams, CacheType, ReplacementPolicy, WritePolicy};
pub use replacement::select_victim;
pub use state::{Cache, CacheLine, CacheSet, create_cache};
pub use stats::CacheStats;
pub use store::{BackingStore, MemoryStore, SharedStore};
