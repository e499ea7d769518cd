mod cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "autoheal",
    about = "Webhook receiver that maps monitoring alerts to remediation commands",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the autoheal config file
    #[arg(
        long,
        global = true,
        env = "AUTOHEAL_CONFIG",
        default_value = "/etc/autoheal/autoheal.yaml"
    )]
    config: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Bind address (overrides the configured server.bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Validate the config file and report findings
    Check,

    /// Execute the remediation mapped to one alert and print the outcome
    Run { alert: String },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve { bind } => cmd::serve::run(&cli.config, bind),
        Commands::Check => cmd::check::run(&cli.config, cli.json),
        Commands::Run { alert } => cmd::run::run(&cli.config, &alert, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
