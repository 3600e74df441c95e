//! quizrun CLI: timed multiple-choice practice exams in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quizrun", version, about = "Timed multiple-choice exams from JSON question banks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a timed attempt
    Run {
        /// Bank ids to draw from (e.g. "net,os")
        #[arg(long)]
        banks: String,

        /// Number of questions (5-200)
        #[arg(long)]
        count: Option<usize>,

        /// Time limit in minutes (5-240)
        #[arg(long)]
        timer: Option<u64>,

        /// Attempt mode: exam, practice
        #[arg(long)]
        mode: Option<String>,

        /// Difficulty profile: easy, medium, hard_standard, hard_advanced, hard_mix, mixed
        #[arg(long)]
        difficulty: Option<String>,

        /// Keep answer options in bank order
        #[arg(long)]
        no_shuffle_options: bool,

        /// Ignore questions served in earlier attempts
        #[arg(long)]
        allow_repeats: bool,

        /// Seed for reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Also save the finished attempt as JSON (file or directory)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the banks in the manifest
    Banks {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load banks and report malformed records
    Validate {
        /// Only validate this bank
        #[arg(long)]
        bank: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show past attempts, most recent first
    History {
        /// Maximum number of attempts to show
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Print records as JSON
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Forget seen questions and attempt history
    Reset {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and a sample bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizrun=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            banks,
            count,
            timer,
            mode,
            difficulty,
            no_shuffle_options,
            allow_repeats,
            seed,
            report,
            config,
        } => {
            commands::run::execute(commands::run::RunOptions {
                banks,
                count,
                timer,
                mode,
                difficulty,
                shuffle_options: !no_shuffle_options,
                allow_repeats,
                seed,
                report,
                config,
            })
            .await
        }
        Commands::Banks { config } => commands::banks::execute(config).await,
        Commands::Validate { bank, config } => commands::validate::execute(bank, config).await,
        Commands::History {
            limit,
            json,
            config,
        } => commands::history::execute(limit, json, config),
        Commands::Reset { config } => commands::history::reset(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
