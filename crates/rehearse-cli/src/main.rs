//! rehearse CLI — practice mock interviews from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use rehearse_core::model::{Mode, Tone};

mod commands;

#[derive(Parser)]
#[command(name = "rehearse", version, about = "LLM-powered mock interview coach")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive mock interview
    Practice {
        /// Who is practicing; selects the memory file
        #[arg(long)]
        user: String,

        /// Target role, e.g. "Software Engineer" (see `rehearse roles`)
        #[arg(long)]
        role: String,

        /// normal or drill (drill targets your historical weak spots)
        #[arg(long, default_value = "normal")]
        mode: Mode,

        /// friendly, neutral or grilling
        #[arg(long, default_value = "neutral")]
        tone: Tone,

        /// Questions to ask (5-8); overrides the config file
        #[arg(long)]
        max_questions: Option<u32>,

        /// Provider name from the config file
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a user's most frequent weak spots
    WeakSpots {
        #[arg(long)]
        user: String,

        /// How many topics to show
        #[arg(long, default_value = "6")]
        top_k: usize,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Review a user's latest session
    Review {
        #[arg(long)]
        user: String,

        /// Output format: text, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the review to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List roles with scripted question banks
    Roles,

    /// Create a starter rehearse.toml
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rehearse=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Practice {
            user,
            role,
            mode,
            tone,
            max_questions,
            provider,
            config,
        } => {
            commands::practice::execute(user, role, mode, tone, max_questions, provider, config)
                .await
        }
        Commands::WeakSpots {
            user,
            top_k,
            config,
        } => commands::weak_spots::execute(user, top_k, config),
        Commands::Review {
            user,
            format,
            output,
            config,
        } => commands::review::execute(user, format, output, config),
        Commands::Roles => commands::roles::execute(),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
