mod platform;

use std::path::PathBuf;

use clap::Parser;

/// Paste tabular plans, explore the scheduled diagram, copy the plan back out.
#[derive(Debug, Parser)]
#[command(name = "planview", version)]
struct Cli {
    /// RON configuration file; `planview.ron` is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the planning server.
    #[arg(long)]
    server: Option<String>,
    /// Where the rendered HTML snapshot is written.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = platform::config::load_config(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(output) = cli.output {
        config.snapshot_path = output;
    }

    platform::logging::initialize(config.log_destination, &config.log_file);
    platform::run_app(config)
}
