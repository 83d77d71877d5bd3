pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "rigsmith",
    about = "Rigsmith operator CLI",
    long_about = "Manage the Rigsmith catalog database, check builds for compatibility, \
                  and inspect recommendations.",
    after_help = "Examples:\n  rigsmith migrate\n  rigsmith seed\n  rigsmith check build.json\n  \
                  rigsmith recommend titan-advanced --limit 5"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog and view history")]
    Seed,
    #[command(about = "Check a build described by a JSON file for compatibility")]
    Check {
        #[arg(help = "Path to a JSON build keyed by slot (cpu, mb, ram, gpu, storage, ...)")]
        build: PathBuf,
    },
    #[command(about = "Show also-viewed and upgrade recommendations for a product")]
    Recommend {
        #[arg(help = "Product slug to recommend against")]
        slug: String,
        #[arg(long, help = "Look-back window in days")]
        window_days: Option<u32>,
        #[arg(long, help = "Exponential decay rate per day")]
        decay_lambda: Option<f64>,
        #[arg(long, help = "Maximum number of also-viewed results")]
        limit: Option<usize>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Check { build } => commands::check::run(&build),
        Command::Recommend { slug, window_days, decay_lambda, limit } => {
            commands::recommend::run(
                &slug,
                commands::recommend::ParamOverrides { window_days, decay_lambda, limit },
            )
        }
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
