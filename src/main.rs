use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use dualserve::cli::Cli;
use dualserve::config::{self, AppState};
use dualserve::logger;
use dualserve::server::{signal, Server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config::Config::load_from(&cli.config, &cli.overrides())?;
    logger::init(&cfg)?;

    // Size the runtime from the workers setting, default is one per core
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(&cfg)
        .map_err(|e| format!("Cannot serve root '{}': {e}", cfg.server.root))?;

    logger::log_server_start(&cfg);

    let server = Server::bind(Arc::new(state))?;

    let shutdown = CancellationToken::new();
    signal::start_signal_handler(shutdown.clone());

    server.run(shutdown).await;
    Ok(())
}
