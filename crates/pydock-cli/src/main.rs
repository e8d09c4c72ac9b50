mod commands;

use clap::{Parser, Subcommand};
use commands::BuildArgs;

#[derive(Parser)]
#[command(name = "pydock", about = "Build container images from Python wheels")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the Dockerfile and stage the build context without building
    Prepare {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Stage the build context and build the image
    Build {
        #[command(flatten)]
        args: BuildArgs,
        /// Stop at this stage (e.g. `builder`)
        #[arg(long)]
        target: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // .env is optional; a present but malformed file is an error
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare { args } => commands::prepare(&args).await?,
        Commands::Build { args, target } => commands::build(&args, target).await?,
    }

    Ok(())
}
