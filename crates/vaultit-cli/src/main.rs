//! VaultIt CLI tool.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vaultit")]
#[command(about = "Scheduled directory backups with tiered retention", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, env = "VAULTIT_CONFIG", default_value = "vaultit.kdl")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full backup: archive, upload, rotate, notify
    Run,
    /// Apply the retention policy without creating a new backup
    Prune {
        /// Show the decision without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List artifacts and the retention bucket each falls into
    List,
    /// Validate a configuration file
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Validate) {
        return commands::validate(&cli.config);
    }

    let config = commands::load_config(&cli.config)?;
    commands::init_tracing(config.log_file.as_deref())?;

    match cli.command {
        Commands::Run => commands::run(config).await,
        Commands::Prune { dry_run } => commands::prune(config, dry_run).await,
        Commands::List => commands::list(config).await,
        Commands::Validate => Ok(()),
    }
}
