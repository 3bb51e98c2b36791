//! 交互命令：解析、校验与执行
//!
//! 输入校验与原表单一致：地址 1-100，数据 2-50 个字符，组数 1-64。
//! 校验失败的命令不会触碰引擎状态。

pub mod render;

use cache_core::{
    AccessOutcome, BackingStore, CacheEngine, CacheParams, CacheType, ConfigError, MemoryStore,
    ReplacementPolicy, WritePolicy, store::default_data,
};
use thiserror::Error;

/// 地址下限
pub const ADDRESS_MIN: u64 = 1;
/// 地址上限
pub const ADDRESS_MAX: u64 = 100;
/// 数据最短长度
pub const DATA_MIN_LEN: usize = 2;
/// 数据最长长度
pub const DATA_MAX_LEN: usize = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("Address must be an integer: {0}")]
    InvalidAddress(String),

    #[error("Address {0} out of range (1..=100)")]
    AddressOutOfRange(u64),

    #[error("Set count must be an integer: {0}")]
    InvalidSets(String),

    #[error("Data must be 2-50 characters, got {0}")]
    DataLength(usize),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Render failed: {0}")]
    Render(String),
}

/// 解析后的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Read(u64),
    Write(u64, String),
    Configure(CacheParams),
    Show,
    Json,
    Stats,
    Memory(u64),
    Help,
    Quit,
}

/// 解析一行输入；空行与 `#` 注释返回 `None`
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let mut words = rest.split_whitespace();

    let command = match name.to_ascii_lowercase().as_str() {
        "read" | "r" => {
            let address = parse_address(words.next())?;
            no_more(words)?;
            Command::Read(address)
        }
        "write" | "w" => {
            let address = parse_address(words.next())?;
            // 数据为地址之后的剩余内容，允许包含空格
            let data = rest
                .split_once(char::is_whitespace)
                .map(|(_, data)| data.trim())
                .unwrap_or("");
            if data.is_empty() {
                return Err(CommandError::MissingArgument("data"));
            }
            let len = data.chars().count();
            if !(DATA_MIN_LEN..=DATA_MAX_LEN).contains(&len) {
                return Err(CommandError::DataLength(len));
            }
            Command::Write(address, data.to_string())
        }
        "config" | "configure" => {
            let sets = words.next().ok_or(CommandError::MissingArgument("sets"))?;
            let num_sets = sets
                .parse::<usize>()
                .map_err(|_| CommandError::InvalidSets(sets.to_string()))?;
            let cache_type = words
                .next()
                .ok_or(CommandError::MissingArgument("cache type"))?
                .parse::<CacheType>()?;
            let replacement_policy = words
                .next()
                .ok_or(CommandError::MissingArgument("replacement policy"))?
                .parse::<ReplacementPolicy>()?;
            let write_policy = words
                .next()
                .ok_or(CommandError::MissingArgument("write policy"))?
                .parse::<WritePolicy>()?;
            no_more(words)?;
            let params = CacheParams::new(num_sets, cache_type, replacement_policy, write_policy);
            params.validate()?;
            Command::Configure(params)
        }
        "memory" | "mem" => {
            let address = parse_address(words.next())?;
            no_more(words)?;
            Command::Memory(address)
        }
        "show" => Command::Show,
        "json" => Command::Json,
        "stats" => Command::Stats,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_address(word: Option<&str>) -> Result<u64, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument("address"))?;
    let address = word
        .parse::<u64>()
        .map_err(|_| CommandError::InvalidAddress(word.to_string()))?;
    if !(ADDRESS_MIN..=ADDRESS_MAX).contains(&address) {
        return Err(CommandError::AddressOutOfRange(address));
    }
    Ok(address)
}

fn no_more<'a>(mut words: impl Iterator<Item = &'a str>) -> Result<(), CommandError> {
    match words.next() {
        Some(extra) => Err(CommandError::UnexpectedArgument(extra.to_string())),
        None => Ok(()),
    }
}

/// 命令执行后的流程控制
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// 一个模拟会话：持有引擎与后备存储
pub struct Session<S: BackingStore = MemoryStore> {
    engine: CacheEngine<S>,
}

impl<S: BackingStore> Session<S> {
    pub fn new(engine: CacheEngine<S>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &CacheEngine<S> {
        &self.engine
    }

    /// 解析并执行一行输入
    pub fn run_line(&mut self, line: &str) -> Result<Flow, CommandError> {
        match parse_command(line)? {
            Some(command) => self.execute(command),
            None => Ok(Flow::Continue(String::new())),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow, CommandError> {
        let output = match command {
            Command::Read(address) => {
                let outcome = self.engine.read(address);
                format!(
                    "[{}] read {} -> {}{}",
                    outcome.access.kind,
                    address,
                    outcome.data,
                    describe(&outcome.access)
                )
            }
            Command::Write(address, data) => {
                let outcome = self.engine.write(address, data.as_str());
                format!(
                    "[{}] write {} <- {}{}",
                    outcome.kind,
                    address,
                    data,
                    describe(&outcome)
                )
            }
            Command::Configure(params) => {
                self.engine.reconfigure(params)?;
                format!("Configured: {params}")
            }
            Command::Show => render::table(self.engine.cache()),
            Command::Json => serde_json::to_string_pretty(self.engine.cache())
                .map_err(|e| CommandError::Render(e.to_string()))?,
            Command::Stats => render::stats(self.engine.stats()),
            Command::Memory(address) => match self.engine.store().get(address) {
                Some(data) => format!("memory[{address}] = {data}"),
                None => format!(
                    "memory[{address}] is unset (first read yields {})",
                    default_data(address)
                ),
            },
            Command::Help => render::help(),
            Command::Quit => return Ok(Flow::Quit),
        };
        Ok(Flow::Continue(output))
    }
}

fn describe(access: &AccessOutcome) -> String {
    let mut text = format!(" (set {}, line {})", access.set_index, access.way);
    if let Some(evicted) = &access.evicted {
        text.push_str(&format!(", evicted tag {}", evicted.tag));
        if access.wrote_back {
            text.push_str(&format!(" [written back: {}]", evicted.data));
        }
    }
    text
}
