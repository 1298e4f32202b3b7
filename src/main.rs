use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod actions;
mod app;
mod cli;
mod config;
mod controller;
mod inventory;
mod ports;
mod prompt;
mod resolver;
mod ssh;
mod tmux;
mod tunnel;

use app::App;
use cli::Cli;
use config::Config;
use prompt::Prompt;
use tmux::TmuxClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stderr keeps listings on stdout clean
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let action = cli.into_action()?;

    let client = TmuxClient::with_path(&config.tmux_path);
    let mut app = App::new(config, client, Prompt::stdio());

    app.handle_action(action).await
}
