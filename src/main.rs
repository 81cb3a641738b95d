use std::process::ExitCode;

use prendas::config::{Backend, Config};
use prendas::store::{MemoryStore, MongoStore};
use prendas::{Error, Server, api};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;
    let server = Server::bind(config.addr()).await?;

    match config.backend {
        Backend::Mongo => {
            let store = MongoStore::connect(&config.mongo).await?;
            server.serve(api::router(store)).await
        }
        Backend::Memory => {
            info!("using the in-memory store; data is lost on exit");
            server.serve(api::router(MemoryStore::new())).await
        }
    }
}
