//! 后备存储（模拟主存）
//!
//! 地址到字符串数据的映射。未见过的地址在首次读取时生成默认值
//! `data_at_<address>` 并写入存储。存储通过依赖注入交给访问引擎，
//! 不是进程级全局状态。

use crate::error::{SimResult, StoreError};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// 随库打包的初始数据集，键为十进制地址字符串
pub const BUNDLED_SEED: &str = include_str!("../data/memory.json");

/// 未见地址的默认数据
pub fn default_data(address: u64) -> String {
    format!("data_at_{address}")
}

/// 后备存储接口
pub trait BackingStore {
    /// 读取地址数据；不存在时生成默认值并持久化
    fn load(&mut self, address: u64) -> String;

    /// 写入地址数据
    fn store(&mut self, address: u64, data: String);

    /// 只读查看，不生成默认值
    fn get(&self, address: u64) -> Option<String>;

    /// 已存在的条目数
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 内存中的后备存储
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<u64, String>,
}

impl MemoryStore {
    /// 空存储
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, D>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u64, D)>,
        D: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(a, d)| (a, d.into())).collect(),
        }
    }

    /// 从 JSON 数据集加载，例如 `{"10": "data10"}`
    ///
    /// # 错误
    /// - `StoreError::InvalidSeed`: 不是字符串到字符串的 JSON 对象
    /// - `StoreError::InvalidAddress`: 键不是十进制地址
    pub fn from_seed_json(json: &str) -> Result<Self, StoreError> {
        let raw: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| StoreError::InvalidSeed(e.to_string()))?;

        let mut entries = BTreeMap::new();
        for (key, value) in raw {
            let address = key
                .trim()
                .parse::<u64>()
                .map_err(|_| StoreError::InvalidAddress(key.clone()))?;
            entries.insert(address, value);
        }
        log::debug!("Loaded {} seed entries into backing store", entries.len());
        Ok(Self { entries })
    }

    /// 从文件加载数据集
    pub fn from_seed_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_seed_json(&content)?)
    }

    /// 使用随库打包的数据集
    pub fn bundled() -> Result<Self, StoreError> {
        Self::from_seed_json(BUNDLED_SEED)
    }

    pub fn entries(&self) -> &BTreeMap<u64, String> {
        &self.entries
    }

    /// 转为共享句柄
    pub fn into_shared(self) -> SharedStore {
        SharedStore::new(self)
    }
}

impl BackingStore for MemoryStore {
    fn load(&mut self, address: u64) -> String {
        self.entries
            .entry(address)
            .or_insert_with(|| default_data(address))
            .clone()
    }

    fn store(&mut self, address: u64, data: String) {
        self.entries.insert(address, data);
    }

    fn get(&self, address: u64) -> Option<String> {
        self.entries.get(&address).cloned()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// 多个会话共享同一后备存储时使用的句柄
///
/// 所有访问经过互斥锁串行化，避免不同会话的写回交错。
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<MemoryStore>>,
}

impl SharedStore {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// 当前内容的快照
    pub fn snapshot(&self) -> MemoryStore {
        self.inner.lock().clone()
    }

    /// 持有同一存储的句柄数
    pub fn handles(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl BackingStore for SharedStore {
    fn load(&mut self, address: u64) -> String {
        self.inner.lock().load(address)
    }

    fn store(&mut self, address: u64, data: String) {
        self.inner.lock().store(address, data);
    }

    fn get(&self, address: u64) -> Option<String> {
        self.inner.lock().get(address)
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }
}
