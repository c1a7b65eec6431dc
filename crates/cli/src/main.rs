//! AlterEgo CLI.
//!
//! Commands:
//! - `init`    write a starter config
//! - `chat`    talk to the persona (interactive or single message)
//! - `profile` show the aggregated grounding profile
//! - `tools`   list the tools offered to the model
//! - `serve`   start the HTTP gateway

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "alterego",
    about = "AlterEgo: chat with an AI persona grounded in your own profile",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create ~/.alterego/config.toml with defaults
    Init,

    /// Chat with the persona
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Print the aggregated profile
    Profile {
        /// Skip the GitHub section
        #[arg(long)]
        no_github: bool,

        /// Print the structured GitHub report as JSON
        #[arg(long, conflicts_with = "no_github")]
        json: bool,

        /// Print the full system prompt instead of the profile
        #[arg(long, conflicts_with = "json")]
        prompt: bool,
    },

    /// List the tools offered to the model
    Tools,

    /// Start the HTTP gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Profile {
            no_github,
            json,
            prompt,
        } => commands::profile::run(no_github, json, prompt).await?,
        Commands::Tools => commands::tools::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
    }

    Ok(())
}
