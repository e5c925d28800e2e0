mod api;
mod config;
mod engine;
mod error;
mod sim;
mod sink;

use config::Config;
use engine::Engine;
use env_logger::Builder;
use error::StockWatchError;
use log::{info, LevelFilter};
use sink::webhook::WebhookSink;
use std::error::Error;
use std::io::Write;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Configure logger
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("stockwatch", LevelFilter::Debug)
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let config = Config::from_env()?;
    info!(
        "[boot] env={:?} sim={} ignore_hours={} watchlist={:?}",
        config.webhook_env, config.sim_mode, config.ignore_market_hours, config.watchlist
    );

    let (tick_tx, tick_rx) = mpsc::channel(100);

    // Start the tick source: live Finnhub stream, or the simulator
    let source_handle = if config.sim_mode {
        let symbols = config.watchlist.clone();
        tokio::spawn(async move { sim::run(&symbols, tick_tx).await })
    } else {
        let token = config.finnhub_token.clone().ok_or_else(|| {
            StockWatchError::ConfigError(
                "FINNHUB_TOKEN not set; set SIM_MODE=1 to run without a live feed".to_string(),
            )
        })?;
        let symbols = config.watchlist.clone();
        tokio::spawn(async move { api::finnhub::ws::run(&token, &symbols, tick_tx).await })
    };

    let sink = WebhookSink::new(
        config.webhook_url().map(str::to_string),
        config.webhook_header.clone(),
        config.sim_mode,
    );
    let engine = Engine::new(&config);
    let engine_handle = tokio::spawn(engine::run(engine, tick_rx, sink));

    tokio::select! {
        _ = source_handle => {},
        _ = engine_handle => {},
        _ = tokio::signal::ctrl_c() => {
            info!("[shutdown] signal received, closing");
        }
    }

    info!("Shutdown complete");
    Ok(())
}
