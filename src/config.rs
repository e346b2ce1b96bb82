//! Runtime configuration.
//!
//! Every setting can come from a command-line flag or an environment
//! variable; flags win. [`Config::default`] matches the flag defaults.

use std::path::PathBuf;

use clap::Parser;
use clap::builder::TypedValueParser;

use crate::streaming::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, Parser)]
#[command(name = "cadenza", version, about = "Stream a song library over HTTP")]
pub struct Config {
    /// Interface to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory holding uploaded songs and covers
    #[arg(long, env = "MEDIA_ROOT", default_value = "uploads")]
    pub media_root: PathBuf,

    /// JSON file describing the songs in the library. Keep it outside the
    /// media root, which is published as-is under `/uploads`.
    #[arg(long, env = "CATALOG_PATH", default_value = "catalog.json")]
    pub catalog: PathBuf,

    /// Bytes read from disk per streamed chunk
    #[arg(
        long,
        env = "STREAM_CHUNK_SIZE",
        default_value_t = DEFAULT_CHUNK_SIZE,
        value_parser = clap::value_parser!(u32).range(1..).map(|n| n as usize),
    )]
    pub chunk_size: usize,

    /// Do not send CORS headers
    #[arg(long, env = "NO_CORS")]
    pub no_cors: bool,

    /// tracing filter directive, e.g. `info` or `cadenza=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    /// `host:port` to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_owned(),
            port: 5000,
            media_root: PathBuf::from("uploads"),
            catalog: PathBuf::from("catalog.json"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            no_cors: false,
            log_filter: "info".to_owned(),
        }
    }
}
