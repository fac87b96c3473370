//! Serves a small site from a template directory.
//!
//! ```text
//! frameset-demo --templates crates/frameset-demo/templates \
//!     --config crates/frameset-demo/frameset.yaml
//! ```
//!
//! `POST /-/reload` rebuilds the template set from disk.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use frameset::{DirSource, RenderConfig, TemplateStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;

#[derive(Debug, Parser)]
#[command(name = "frameset-demo", about = "Serve framed HTML templates")]
struct Args {
    /// Template directory
    #[arg(long, default_value = "templates")]
    templates: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// YAML store configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra global frame, outside any configured ones (repeatable)
    #[arg(long = "frame")]
    frames: Vec<String>,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    RenderConfig::from_yaml(&yaml).with_context(|| format!("parsing config {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    let mut builder = TemplateStore::builder(DirSource::new(&args.templates)).with_config(config);
    for frame in args.frames {
        builder = builder.frame(frame);
    }
    let store = builder.build().context("loading templates")?;

    for skipped in store.snapshot().skipped() {
        tracing::warn!(template = %skipped.path, reason = %skipped.reason, "template unavailable");
    }

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("binding {}", args.addr))?;
    info!(addr = %args.addr, templates = %args.templates.display(), "listening");

    axum::serve(listener, app::router(store)).await?;
    Ok(())
}
