//! Guitar Remover - strip guitar from a track by re-mixing Demucs stems
//!
//! Demucs splits the track, FFmpeg mixes drums, bass and vocals back together.

pub mod config;
pub mod error;
pub mod processing;
pub mod tools;
pub mod web;

pub use config::{Config, Args};
pub use error::{RemoverError, Result};
pub use processing::{GuitarRemover, ConversionRequest, RemovalResult, remove_guitar};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// `RUST_LOG` takes precedence over the verbose flag
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init()
        .ok();
}

pub fn get_library_info() -> LibraryInfo {
    LibraryInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} - {}", self.name, self.version, self.description)
    }
}
