//! 命令行参数解析

use cache_core::{ConfigError, ConfigOverrides};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },

    #[error("Unknown argument: {0}")]
    Unknown(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub script: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    pub help: bool,
}

pub fn parse_args<I>(args: I) -> Result<CliArgs, ArgError>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .ok_or_else(|| ArgError::MissingValue(flag.to_string()))
        };
        match arg.as_str() {
            "--sets" | "-s" => {
                let v = value(&arg)?;
                let n = v.parse::<usize>().map_err(|_| ArgError::InvalidValue {
                    flag: arg.clone(),
                    value: v,
                })?;
                parsed.overrides.num_sets = Some(n);
            }
            "--type" | "-t" => parsed.overrides.cache_type = Some(value(&arg)?.parse()?),
            "--replacement" | "-r" => {
                parsed.overrides.replacement_policy = Some(value(&arg)?.parse()?)
            }
            "--write-policy" | "-w" => parsed.overrides.write_policy = Some(value(&arg)?.parse()?),
            "--log-level" => parsed.overrides.log_level = Some(value(&arg)?.parse()?),
            "--config" | "-c" => parsed.config = Some(PathBuf::from(value(&arg)?)),
            "--seed" => parsed.overrides.seed_path = Some(PathBuf::from(value(&arg)?)),
            "--script" => parsed.script = Some(PathBuf::from(value(&arg)?)),
            "--rng-seed" => {
                let v = value(&arg)?;
                let seed = v.parse::<u64>().map_err(|_| ArgError::InvalidValue {
                    flag: arg.clone(),
                    value: v,
                })?;
                parsed.overrides.rng_seed = Some(seed);
            }
            "--help" | "-h" => parsed.help = true,
            _ => return Err(ArgError::Unknown(arg)),
        }
    }

    Ok(parsed)
}

pub fn print_usage() {
    println!("Cache Simulator");
    println!();
    println!("USAGE:");
    println!("    cache-cli [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -s, --sets <N>             Number of sets, 1-64 [default: 4]");
    println!("    -t, --type <TYPE>          direct-mapped | set-associative [default: direct-mapped]");
    println!("    -r, --replacement <POLICY> LRU | Random [default: LRU]");
    println!("    -w, --write-policy <POLICY> write-back | write-through [default: write-back]");
    println!("    -c, --config <PATH>        Config file (.toml or .json)");
    println!("        --seed <PATH>          Initial memory dataset (JSON object keyed by address)");
    println!("        --rng-seed <N>         Seed for random replacement");
    println!("        --script <PATH>        Run commands from a file instead of stdin");
    println!("        --log-level <LEVEL>    off | error | warn | info | debug | trace");
    println!("    -h, --help                 Print this help message");
}
