//! remove-guitar-web - Upload form server

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use guitar_remover::{init_logging, Config, GuitarRemover};

#[derive(Parser, Debug)]
#[command(name = "remove-guitar-web", about = "Web form for removing guitar from uploaded tracks", version)]
struct Args {
    /// Config file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(long)]
    host: Option<String>,

    /// Listen port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(host) = args.host {
        config.web.host = host;
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }
    config.processing.verbose |= args.verbose;
    config.validate()?;

    log::info!("{}", guitar_remover::get_library_info());
    guitar_remover::web::serve(GuitarRemover::new(config))
        .await
        .context("web server stopped")
}
