//! cadenza server binary.
//!
//! Run with:
//!   MEDIA_ROOT=./uploads CATALOG_PATH=./catalog.json cargo run
//!
//! Try:
//!   curl -i http://localhost:5000/api/songs/1/stream
//!   curl -i -H 'range: bytes=0-1023' http://localhost:5000/api/songs/1/stream
//!   curl -i http://localhost:5000/readyz

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cadenza::{Config, Library, Server, routes};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .init();

    let library = Library::open(&config).await?;
    let app = routes::app(library).cors(!config.no_cors);

    Server::bind(&config.addr())?.serve(app).await?;
    Ok(())
}
