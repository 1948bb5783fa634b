//! Engine process command line (spec.md §6): `--cache-size=N`,
//! `--securities=N`, `--help`. Exit codes: 0 on clean shutdown via
//! `PANIC`, non-zero on init failure. Defaults match the original
//! `me.c`'s `#ifdef ME_BINARY main()`: 1.5 GiB cache, 400 securities.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use me_core::engine::arena::SystemAllocator;
use me_core::engine::dispatcher::{Channels, EngineContext};

const DEFAULT_CACHE_SIZE: usize = 1024 * 1024 * 1024 + 512 * 1024 * 1024;
const DEFAULT_SECURITIES: usize = 400;
const CHANNEL_CAPACITY: usize = 4096;

#[derive(Parser, Debug)]
#[command(name = "me-engine", about = "In-memory, multi-security matching engine")]
struct Cli {
    #[arg(long = "cache-size", default_value_t = DEFAULT_CACHE_SIZE)]
    cache_size: usize,

    #[arg(long = "securities", default_value_t = DEFAULT_SECURITIES)]
    securities: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let channels = Channels::bounded(CHANNEL_CAPACITY);

    let engine = match EngineContext::init(
        cli.cache_size,
        cli.securities,
        Arc::new(SystemAllocator),
        channels,
        None,
    ) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(?err, "engine initialization failed");
            return ExitCode::FAILURE;
        }
    };

    engine.run();
    ExitCode::SUCCESS
}
