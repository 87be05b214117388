// ABOUTME: Entry point for pchat — a terminal chat client for the Gemini API.
// ABOUTME: Parses CLI args, loads config and secrets, sets up logging, and launches the app.

use std::path::PathBuf;

use clap::Parser;

use pocketchat::app::App;
use pocketchat::config::Config;
use pocketchat::logging;

#[derive(Debug, Parser)]
#[command(name = "pchat", version, about = "Chat with a generative model from the terminal")]
struct Cli {
    /// Config file (defaults to ~/.pocketchat/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the model name.
    #[arg(long)]
    model: Option<String>,

    /// Start with an empty history instead of loading the saved one.
    #[arg(long)]
    fresh: bool,

    /// Also print logs to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(model) = cli.model {
        config.llm.model = model;
    }

    // Load local .env if present, then the user's secrets file.
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_path(Config::secrets_env_path());

    let _log_guard = logging::init_logging(&config.logging, cli.verbose)?;

    App::new(config, cli.fresh).run().await
}
