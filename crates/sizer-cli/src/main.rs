mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sizer", about = "Crop an image and send it for resizing")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop an image and upload it for processing
    Upload(commands::upload::UploadArgs),
    /// Show the crop box an image would be submitted with
    Inspect(commands::inspect::InspectArgs),
    /// Print or save the default client config
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Upload(args) => commands::upload::run(args).await,
        Commands::Inspect(args) => commands::inspect::run(args).await,
        Commands::Config(args) => commands::config::run(args),
    }
}
