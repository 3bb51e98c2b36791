mod args;
mod commands;
mod logging;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::process;

use cache_core::{CacheEngine, MemoryStore, SimConfig, SimResult};
use commands::{Flow, Session};
use log::{error, info, warn};

fn load_config(cli: &args::CliArgs) -> SimResult<SimConfig> {
    let base = match &cli.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::defaults(),
    };
    Ok(base.merge(&cli.overrides)?)
}

fn build_session(config: &SimConfig) -> SimResult<Session> {
    let store = match &config.seed_path {
        Some(path) => MemoryStore::from_seed_file(path)?,
        None => MemoryStore::bundled()?,
    };
    info!("Backing store: {} entries", store.entries().len());

    let params = config.params();
    let engine = match config.rng_seed {
        Some(seed) => CacheEngine::with_seed(params, store, seed)?,
        None => CacheEngine::new(params, store)?,
    };
    Ok(Session::new(engine))
}

/// 逐行执行命令，遇到 `quit` 或输入结束时返回
fn run<R: BufRead>(session: &mut Session, input: R, interactive: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lines = input.lines();
    loop {
        if interactive {
            let mut out = stdout.lock();
            write!(out, "cache> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match session.run_line(&line) {
            Ok(Flow::Continue(output)) => {
                if !output.is_empty() {
                    println!("{output}");
                }
            }
            Ok(Flow::Quit) => break,
            Err(e) => {
                warn!("Rejected command {:?}: {}", line.trim(), e);
                eprintln!("error: {e}");
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = match args::parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            args::print_usage();
            process::exit(1);
        }
    };
    if cli.help {
        args::print_usage();
        return;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: failed to load configuration: {e}");
            process::exit(1);
        }
    };
    logging::init(config.log_level);

    info!("=== Cache Simulator ===");
    info!("Configuration: {}", config.params());

    let mut session = match build_session(&config) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to initialize simulator: {}", e);
            process::exit(1);
        }
    };

    let result = match &cli.script {
        Some(path) => match File::open(path) {
            Ok(file) => run(&mut session, BufReader::new(file), false),
            Err(e) => {
                error!("Failed to open script {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => run(&mut session, io::stdin().lock(), true),
    };

    if let Err(e) = result {
        error!("I/O error: {}", e);
        process::exit(1);
    }

    let stats = session.engine().stats();
    info!(
        "Session finished: {} accesses, {} hits, {} misses",
        stats.accesses(),
        stats.hits,
        stats.misses
    );
}
