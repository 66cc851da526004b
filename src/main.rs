//! Wordle Assist - CLI
//!
//! Suggests guesses for word-deduction games from a word list, optional
//! priors and the feedback observed so far.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{Level, debug};
use wordle_assist::{
    commands::{
        Observation, Session, SuggestConfig, TableAction, analyze_word, build_table_file,
        feedback_between, letter_heatmap, run_suggest, run_table_action,
    },
    core::Word,
    output::{
        print_built_table, print_feedback, print_guess_analysis, print_heatmap, print_history,
        print_suggestions, print_table_outcome,
    },
    solver::{Policy, ScoreOptions},
    table::CacheConfig,
    worker::{WorkerClient, WorkerConfig},
};

#[derive(Parser)]
#[command(
    name = "wordle_assist",
    about = "Guess suggestions for word-deduction games using entropy and solve probability",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Word list, one word per line
    #[arg(short = 'w', long, global = true, default_value = "words.txt")]
    words: PathBuf,

    /// Prior weights, `word weight` per line
    #[arg(short, long, global = true)]
    priors: Option<PathBuf>,

    /// Dataset name used for assets and cache keys (defaults to the word list's file stem)
    #[arg(short, long, global = true)]
    dataset: Option<String>,

    /// Directory with precomputed `<dataset>-<L>.ptab` assets
    #[arg(long, global = true)]
    asset_dir: Option<PathBuf>,

    /// Directory for the durable row cache
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// In-memory row cache budget in MiB
    #[arg(long, global = true, default_value = "32")]
    memory_budget_mb: usize,

    /// Disable the parallel row evaluator
    #[arg(long, global = true)]
    no_accel: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the next guess
    Suggest {
        #[command(flatten)]
        history: History,

        /// Attempts allowed in the game
        #[arg(long, default_value = "6")]
        attempts_max: u32,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Break down what a guess would reveal
    Analyze {
        /// Guess to analyze
        word: String,

        #[command(flatten)]
        history: History,

        /// Outcomes to list
        #[arg(short, long, default_value = "10")]
        buckets: usize,
    },

    /// Letter mass per position over the remaining candidates
    Heatmap {
        #[command(flatten)]
        history: History,

        /// Letters to list per position
        #[arg(short, long, default_value = "5")]
        letters: usize,
    },

    /// Feedback a guess would receive against a secret
    Feedback { guess: String, secret: String },

    /// Precompute a pattern-table asset
    BuildTable {
        /// Number of seed guesses to precompute
        #[arg(short, long, default_value = "64")]
        seeds: usize,

        /// Output directory (defaults to --asset-dir, then the current directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Inspect or clear the pattern-table cache
    Table {
        #[command(subcommand)]
        action: TableCommand,
    },
}

#[derive(Args)]
struct History {
    /// Observed guess as `word=feedback`, e.g. `crane=20100` (repeatable)
    #[arg(short, long = "guess")]
    guesses: Vec<String>,
}

impl History {
    fn parse(&self) -> Result<Vec<Observation>> {
        self.guesses.iter().map(|g| Observation::parse(g)).collect()
    }
}

#[derive(Args)]
struct Tuning {
    /// Suggestions to show
    #[arg(short = 'k', long, default_value = "10")]
    top_k: usize,

    /// Prior temperature
    #[arg(long)]
    tau: Option<f64>,

    /// Sampling seed
    #[arg(long)]
    seed: Option<u64>,

    /// Sample secrets above this many candidates
    #[arg(long)]
    sample_cutoff: Option<usize>,

    /// Secrets per sample
    #[arg(long)]
    sample_size: Option<usize>,

    /// Prefilter guesses above this many candidates
    #[arg(long)]
    prefilter_limit: Option<usize>,

    /// Guesses per progress tick
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Skip guesses that cannot beat the current best
    #[arg(long)]
    early_cut: bool,

    /// Early-cut safety margin
    #[arg(long)]
    epsilon: Option<f64>,

    /// Ranking policy: blend (default), eig, solve
    #[arg(long, default_value = "blend")]
    policy: String,
}

impl Tuning {
    fn options(&self) -> ScoreOptions {
        let defaults = ScoreOptions::default();
        ScoreOptions {
            top_k: self.top_k,
            tau: self.tau,
            sample_cutoff: self.sample_cutoff.unwrap_or(defaults.sample_cutoff),
            sample_size: self.sample_size.unwrap_or(defaults.sample_size),
            prefilter_limit: self.prefilter_limit.unwrap_or(defaults.prefilter_limit),
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            early_cut: self.early_cut,
            epsilon: self.epsilon.unwrap_or(defaults.epsilon),
            seed: self.seed.unwrap_or(defaults.seed),
            policy: Policy::from_name(&self.policy),
        }
    }
}

#[derive(Subcommand)]
enum TableCommand {
    /// Load the asset or prepare on-demand rows
    Ensure,
    /// Cache hit counters and memory use
    Stats,
    /// Patterns of one guess against every word
    Row { guess: String },
    /// Drop the in-memory rows
    ClearMemory,
    /// Drop the durable rows
    ClearStore,
}

impl From<TableCommand> for TableAction {
    fn from(command: TableCommand) -> Self {
        match command {
            TableCommand::Ensure => Self::Ensure,
            TableCommand::Stats => Self::Stats,
            TableCommand::Row { guess } => Self::Row { guess },
            TableCommand::ClearMemory => Self::ClearMemory,
            TableCommand::ClearStore => Self::ClearStore,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Feedback { guess, secret } = &cli.command {
        let pattern = feedback_between(guess, secret)?;
        print_feedback(&Word::new(guess.as_str())?, &Word::new(secret.as_str())?, &pattern);
        return Ok(());
    }

    let session = Session::load(&cli.words, cli.priors.as_deref(), cli.dataset.as_deref())?;
    debug!(
        dataset = %session.dataset,
        words = session.vocab.len(),
        priors = session.priors.len(),
        "session loaded"
    );

    if let Commands::BuildTable { seeds, out_dir } = &cli.command {
        let dir = out_dir
            .clone()
            .or_else(|| cli.asset_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        let built = build_table_file(&session, *seeds, &dir)?;
        print_built_table(&built);
        return Ok(());
    }

    let config = WorkerConfig {
        cache: CacheConfig {
            memory_budget_bytes: cli.memory_budget_mb.saturating_mul(1024 * 1024),
            ..CacheConfig::default()
        },
        asset_dir: cli.asset_dir.clone(),
        store_dir: cli.store_dir.clone(),
        accelerate: !cli.no_accel,
        ..WorkerConfig::default()
    };
    let client = WorkerClient::start(&config)?;
    let result = run_command(&client, &session, cli.command);

    let disposed = client.dispose().wait_timeout(Duration::from_secs(5));
    debug!(?disposed, "worker disposed");
    result
}

fn run_command(client: &WorkerClient, session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Suggest {
            history,
            attempts_max,
            tuning,
        } => {
            let config = SuggestConfig {
                history: history.parse()?,
                attempts_max,
                options: tuning.options(),
            };
            print_history(&config.history);

            let pb = ProgressBar::new(1000);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {percent}% | {msg}")?
                    .progress_chars("█▓▒░"),
            );
            pb.set_message("scoring guesses");
            let bar = pb.clone();
            let outcome = run_suggest(client, session, &config, move |p| {
                bar.set_position((p * 1000.0).round() as u64);
            });
            pb.finish_and_clear();
            print_suggestions(&outcome?);
        }
        Commands::Analyze {
            word,
            history,
            buckets,
        } => {
            let analysis = analyze_word(client, session, &word, &history.parse()?)?;
            print_guess_analysis(&analysis, buckets);
        }
        Commands::Heatmap { history, letters } => {
            let heatmap = letter_heatmap(client, session, &history.parse()?)?;
            print_heatmap(&heatmap, letters);
        }
        Commands::Table { action } => {
            let outcome = run_table_action(client, session, &action.into())?;
            print_table_outcome(&outcome, session.vocab.words());
        }
        Commands::Feedback { .. } | Commands::BuildTable { .. } => {}
    }
    Ok(())
}
