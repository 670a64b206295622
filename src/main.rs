mod config;
mod gemini;
mod ingest;
mod logger;
mod models;
mod render;
mod router;
mod scan;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tokio::sync::RwLock;

use config::{api_key_from_env, load_or_init};
use gemini::GeminiClient;
use router::{run_router, RouterState};
use scan::ScanState;

fn data_dir() -> anyhow::Result<PathBuf> {
  let base = dirs_next::data_dir().context("missing data dir")?;
  Ok(base.join("leafscan"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let _ = dotenvy::dotenv();

  let data_dir = data_dir()?;
  std::fs::create_dir_all(&data_dir)?;

  let config_path = data_dir.join("config.json");
  let log_path = data_dir.join("leafscan.log");

  let config = load_or_init(&config_path)?;
  config.validate().map_err(anyhow::Error::msg)?;

  let api_key = api_key_from_env().map_err(anyhow::Error::msg)?;
  let gemini = GeminiClient::new(&config, api_key)?;

  let logger = Arc::new(logger::Logger::new(&log_path)?);
  logger.info("LeafScan starting up");

  let listener = std::net::TcpListener::bind(&config.listen_addr)
    .with_context(|| format!("bind {}", config.listen_addr))?;
  listener.set_nonblocking(true)?;
  let addr = listener.local_addr()?;
  println!("LeafScan listening on http://{addr}");

  let state = RouterState {
    started_at: Instant::now(),
    scan: Arc::new(RwLock::new(ScanState::default())),
    gemini,
    logger,
  };

  run_router(listener, state).await
}
