use chrono::Local;
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use trader_discipline::storage::ensure_parent_dir;
use trader_discipline::{load_data, router, scheduler, AppState, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    ensure_parent_dir(&config.data_path).await;

    let data = load_data(&config.data_path).await;
    let state = AppState::new(config.data_path.clone(), data);

    // Catch up on a boundary that passed while the process was not running.
    state.apply_daily_reset(Local::now(), config.reset_hour).await;
    tokio::spawn(scheduler::run(state.clone(), config.reset_hour));

    let app = router(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
