#![allow(missing_docs)]

mod fmt;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use env_logger::Env;
use log::{error, info};
use wordsets::{ManifestConfig, WordSetCollection};

use crate::fmt::{FormatSummary, OutputFormat};

fn main() -> ExitCode {
    match _main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(why) => {
            error!("{why:#}");
            ExitCode::FAILURE
        },
    }
}

// Default to debug logs on debug builds, info otherwise
#[cfg(debug_assertions)]
type WordsetsVerbosity = Verbosity<clap_verbosity_flag::DebugLevel>;
#[cfg(not(debug_assertions))]
type WordsetsVerbosity = Verbosity<clap_verbosity_flag::InfoLevel>;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: WordsetsVerbosity,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add or update words from a text file of `set_id | text | meaning`
    /// lines
    Import {
        /// The text file to import
        file: PathBuf,

        /// The master document to update
        #[arg(short, long, default_value = "words.json")]
        words: PathBuf,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Write each set to its own file, plus a manifest of all sets
    Split {
        /// The master document to split
        #[arg(short, long, default_value = "words.json")]
        words: PathBuf,

        /// Where to write sets.json and the sets/ directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// TOML file overriding the manifest settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// The manifest's lastUpdated date, YYYY-MM-DD [default: today]
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn _main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(args.verbosity.into())
        .parse_env(Env::new().filter("WORDSETS_LOG"))
        .init();

    match args.command {
        Command::Import {
            file,
            words,
            dry_run,
        } => {
            let summary = wordsets::import_file(&file, &words, dry_run)
                .with_context(|| {
                    format!("failed to import {}", file.display())
                })?;
            println!("{}", summary.format(&file, OutputFormat::Human));
        },
        Command::Split {
            words,
            out_dir,
            config,
            date,
        } => {
            let config = match config {
                Some(path) => ManifestConfig::load(&path)?,
                None => ManifestConfig::default(),
            };
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let collection = WordSetCollection::load(&words)?;
            let split = wordsets::split(&collection, &config, date)
                .context("failed to build set files")?;
            split.set_files().for_each(|(id, bytes)| {
                info!("{id}: {} bytes", bytes.len());
            });
            let manifest_path = split.write_to(&out_dir)?;
            println!(
                "Created {} set files and {}",
                split.manifest().sets.len(),
                manifest_path.display(),
            );
        },
    }
    Ok(())
}
