//! competency CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "competency",
    version,
    about = "Contractor competency test bank, selector and scorer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate question bank TOML files
    Validate {
        /// Path to .toml bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// List questions in a bank
    List {
        /// Path to .toml bank file or directory (default: from config)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Only show this category (e.g. "WHS_SAFETY" or "whs")
        #[arg(long)]
        category: Option<String>,

        /// Only show this difficulty: basic, intermediate, advanced
        #[arg(long)]
        difficulty: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a randomized test instance
    Generate {
        /// Path to .toml bank file or directory (default: from config)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Categories to draw from (comma-separated, default: all in bank)
        #[arg(long)]
        categories: Option<String>,

        /// Questions per category (default: from config, 5)
        #[arg(long)]
        per_category: Option<usize>,

        /// Restrict to one difficulty
        #[arg(long)]
        difficulty: Option<String>,

        /// Seed for a reproducible selection
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (default: <output_dir>/test-<id>.json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a test instance against an answer sheet
    Score {
        /// Test instance JSON written by `generate`
        #[arg(long)]
        test: PathBuf,

        /// Answer sheet JSON: {"question_id": "answer", ...}
        #[arg(long)]
        answers: PathBuf,

        /// Candidate name recorded in the report
        #[arg(long)]
        candidate: Option<String>,

        /// Overall percentage needed to complete (default: from config, 75)
        #[arg(long)]
        completion_threshold: Option<f64>,

        /// Output directory (default: from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two attempt reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Regression threshold in percentage points
        #[arg(long, default_value = "5.0")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Cohort statistics over a directory of attempt reports
    Stats {
        /// Directory of report JSON files
        #[arg(long)]
        reports: PathBuf,

        /// Number of hardest questions to show
        #[arg(long, default_value = "5")]
        top: usize,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("competency=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::List {
            bank,
            category,
            difficulty,
            config,
        } => commands::list::execute(bank, category, difficulty, config),
        Commands::Generate {
            bank,
            categories,
            per_category,
            difficulty,
            seed,
            output,
            config,
        } => commands::generate::execute(
            bank,
            categories,
            per_category,
            difficulty,
            seed,
            output,
            config,
        ),
        Commands::Score {
            test,
            answers,
            candidate,
            completion_threshold,
            output,
            format,
            config,
        } => commands::score::execute(
            test,
            answers,
            candidate,
            completion_threshold,
            output,
            format,
            config,
        ),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Stats {
            reports,
            top,
            format,
        } => commands::stats::execute(reports, top, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
