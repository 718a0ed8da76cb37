use clap::Parser;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

mod catalog;
mod config;
mod forms;
mod gif_search;
mod handler;
mod http;
mod imaging;
mod logger;
mod server;
mod store;
mod views;

/// Interval between checks while waiting for connections to drain
const DRAIN_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(name = "form_playground", version, about)]
struct Cli {
    /// Configuration file path, with or without the `.toml` extension
    #[arg(short, long, default_value = "config")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config::Config::load_from(&cli.config)?;
    let _log_guard = logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let drain_timeout = server::connection::connection_timeout(&cfg.performance);

    logger::log_server_start(&addr, &cfg);
    let state = Arc::new(config::AppState::new(cfg)?);
    if !state.gif_client.has_api_key() {
        logger::log_warning(&format!(
            "{} is not set; GIF searches will be rejected by the upstream API",
            config::API_KEY_ENV
        ));
    }

    let shutdown = Arc::new(Notify::new());
    server::signal::start_signal_handler(Arc::clone(&shutdown))?;

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async move {
            let active = server::run_server_loop(listener, state, shutdown).await;
            wait_for_drain(&active, drain_timeout).await;
        })
        .await;

    logger::log_info("Server stopped");
    Ok(())
}

/// Let in-flight connections finish, up to `timeout`
async fn wait_for_drain(active: &AtomicUsize, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    while active.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Giving up on {} connection(s) still open after {} seconds",
                active.load(Ordering::SeqCst),
                timeout.as_secs()
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
