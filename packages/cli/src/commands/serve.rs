use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagewright_workspace::AppState;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the configured port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,
}

pub fn serve(args: ServeArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let addr = SocketAddr::new(args.host, args.port.unwrap_or(config.port));

    let store = config.settings_store(cwd);
    let media = config.media_library(cwd);

    println!("🚀 {} Pagewright workspace", "Starting".green().bold());
    println!("   Settings: {}", store.path().display());
    println!("   Media:    {}", media.dir().display());
    if let Some(css) = store.stylesheet_path() {
        println!("   CSS:      {}", css.display());
    }
    println!("   Listening on http://{}", addr);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    runtime.block_on(pagewright_workspace::serve(addr, AppState::new(store, media)))?;
    Ok(())
}
