//! Command-line front end.
//!
//! Usage:
//!   wordtrain train --url <URL>     Fetch a plain-text document and train
//!   wordtrain train --file <PATH>   Train on a local text file
//!   wordtrain predict <WORD>        Classify one word
//!   wordtrain status                Show the stored model
//!   wordtrain interactive           Line-oriented shell

use crate::config::{default_config_path, load_config, Config};
use crate::fetch::Source;
use crate::{AppState, Prediction, TrainProgress, TrainSummary};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Classify word difficulty with a model trained on auto-labeled text")]
struct Cli {
    /// Config file (default: <config dir>/wordtrain/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model file, overriding the configured slot
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Forest seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Number of trees
    #[arg(long, global = true)]
    trees: Option<usize>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch text, auto-label its words and train a new model
    Train(TrainArgs),
    /// Classify the difficulty of a word
    Predict {
        /// Word to classify
        word: String,
    },
    /// Show whether a model is trained and what it was trained on
    Status,
    /// Train and classify from an interactive prompt
    Interactive,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct TrainArgs {
    /// URL of a plain-text file
    #[arg(long)]
    url: Option<String>,

    /// Local plain-text file
    #[arg(long)]
    file: Option<PathBuf>,
}

impl TrainArgs {
    fn source(&self) -> Option<Source> {
        match (&self.url, &self.file) {
            (Some(url), _) => Some(Source::Url(url.clone())),
            (None, Some(path)) => Some(Source::File(path.clone())),
            (None, None) => None,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "wordtrain_lib=debug" } else { "wordtrain_lib=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Config> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if cli.seed.is_some() || cli.trees.is_some() {
        let forest = config.forest.get_or_insert_with(Default::default);
        if let Some(seed) = cli.seed {
            forest.seed = Some(seed);
        }
        if let Some(trees) = cli.trees {
            forest.n_trees = Some(trees);
        }
    }
    Ok(config)
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_settings(&cli)?;
    let state = match cli.model.clone() {
        Some(path) => AppState::with_model_path(config, path),
        None => AppState::new(config),
    };

    match &cli.command {
        Command::Train(args) => {
            let source = args.source().context("Either --url or --file is required")?;
            train(&state, &source, cli.json)
        }
        Command::Predict { word } => predict(&state, word, cli.json),
        Command::Status => status(&state, cli.json),
        Command::Interactive => interactive(&state),
    }
}

fn log_progress(progress: TrainProgress) {
    match progress.detail {
        Some(detail) => info!("[{:>3}%] {}: {}", progress.progress, progress.stage, detail),
        None => info!("[{:>3}%] {}", progress.progress, progress.stage),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct ErrorReport<'a, E: Serialize> {
    error: &'a E,
}

fn train(state: &AppState, source: &Source, json: bool) -> Result<()> {
    match state.train(source, log_progress) {
        Ok(summary) if json => print_json(&summary),
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            if json {
                print_json(&ErrorReport { error: &e })?;
            }
            Err(e).with_context(|| format!("Failed to train from {}", source))
        }
    }
}

fn print_summary(summary: &TrainSummary) {
    println!("Fetched {} unique words", summary.trained_words);
    let breakdown: Vec<String> = summary
        .class_counts
        .iter()
        .map(|(difficulty, count)| format!("{}={}", difficulty, count))
        .collect();
    println!(
        "Model trained and saved ({} trees, {}, training accuracy {:.1}%)",
        summary.n_trees,
        breakdown.join(", "),
        summary.training_accuracy * 100.0
    );
}

fn predict(state: &AppState, word: &str, json: bool) -> Result<()> {
    match state.predict(word) {
        Ok(prediction) if json => print_json(&prediction),
        Ok(prediction) => {
            print_prediction(&prediction);
            Ok(())
        }
        Err(e) => {
            if json {
                print_json(&ErrorReport { error: &e })?;
            }
            Err(e.into())
        }
    }
}

fn print_prediction(prediction: &Prediction) {
    println!("{} is classified as: {}", prediction.word, prediction.difficulty);
}

fn status(state: &AppState, json: bool) -> Result<()> {
    let status = state.status()?;
    if json {
        return print_json(&status);
    }

    println!("Model file: {}", status.path.display());
    match (status.trained_words, status.class_counts, status.n_trees) {
        (Some(words), Some(counts), Some(trees)) => {
            println!("Trained on {} words with {} trees", words, trees);
            for (difficulty, count) in counts {
                println!("  {:<6} {}", difficulty, count);
            }
        }
        _ => println!("No trained model found. Run `wordtrain train --url <URL>` first."),
    }
    Ok(())
}

const INTERACTIVE_HELP: &str = "\
Commands:
  train <url>      fetch a plain-text document and train
  file <path>      train on a local text file
  predict <word>   classify a word, even one named like a command
  status           show the stored model
  help             show this help
  quit             exit
Anything else is classified as a word.";

/// One line of input to the interactive shell
#[derive(Debug, PartialEq, Eq)]
enum ShellCommand<'a> {
    Empty,
    Quit,
    Help,
    Status,
    Train(Source),
    Predict(&'a str),
}

fn parse_shell_line(line: &str) -> ShellCommand<'_> {
    let line = line.trim();
    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    // `train` and `file` only act as commands when given an argument.
    match (command, argument) {
        ("", _) => ShellCommand::Empty,
        ("quit" | "exit", "") => ShellCommand::Quit,
        ("help", "") => ShellCommand::Help,
        ("status", "") => ShellCommand::Status,
        ("train", url) if !url.is_empty() => ShellCommand::Train(Source::Url(url.to_string())),
        ("file", path) if !path.is_empty() => ShellCommand::Train(Source::File(PathBuf::from(path))),
        ("predict", word) if !word.is_empty() => ShellCommand::Predict(word),
        _ => ShellCommand::Predict(line),
    }
}

fn interactive(state: &AppState) -> Result<()> {
    println!("{}", INTERACTIVE_HELP);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("wordtrain> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        // Each action's failure is reported and the prompt continues.
        let outcome = match parse_shell_line(&line) {
            ShellCommand::Empty => Ok(()),
            ShellCommand::Quit => return Ok(()),
            ShellCommand::Help => {
                println!("{}", INTERACTIVE_HELP);
                Ok(())
            }
            ShellCommand::Status => status(state, false),
            ShellCommand::Train(source) => train(state, &source, false),
            ShellCommand::Predict(word) => predict(state, word, false),
        };

        if let Err(e) = outcome {
            println!("Error: {:#}", e);
        }
    }
}
