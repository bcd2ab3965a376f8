use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use inquire::Confirm;
use renamed::{
    episode::EpisodeExtractor,
    video::{VIDEO_EXTENSIONS, destination, parse_extension, validate_show_name},
};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tabled::{
    Table, Tabled,
    settings::{Style, Width, object::Columns},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const PLAN_NAME_WIDTH: usize = 70;

#[derive(Debug)]
struct Transaction {
    old: PathBuf,
    new: PathBuf,
    episode: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Rename files into the output folder
    Move,
    /// Copy files, leaving the originals in place
    Copy,
    /// Create hard links in the output folder
    Link,
}

#[derive(Debug, Clone, Copy)]
struct Options {
    mode: Mode,
    dry_run: bool,
    confirm: bool,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = None,
    after_help = "Example: renamed -n \"Showtime\" -o /path/to/output"
)]
struct Args {
    /// Name of the show
    #[arg(short = 'n', long, value_parser = parse_show_name)]
    show_name: String,
    /// Input folder (default: current directory)
    #[arg(short, long)]
    input_folder: Option<PathBuf>,
    /// Output folder, created if missing
    #[arg(short, long)]
    output_folder: PathBuf,
    #[arg(long, value_enum, default_value_t = Mode::Move)]
    mode: Mode,
    /// Print the plan without touching any file
    #[arg(long)]
    dry_run: bool,
    /// Show the plan as a table and ask before committing
    #[arg(long)]
    confirm: bool,
    /// Increase diagnostic output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Original Filename")]
    original: String,
    #[tabled(rename = "New Filename")]
    new: String,
}

fn parse_show_name(value: &str) -> Result<String> {
    validate_show_name(value)?;
    Ok(value.to_string())
}

fn plan_line(transaction: &Transaction) -> String {
    let stem = transaction
        .old
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    format!("{} -> {}", stem, transaction.new.display())
}

/// Returns whether anything was written, `false` when the file already has
/// its destination name.
fn commit(mode: Mode, old: &Path, new: &Path) -> Result<bool> {
    if old == new {
        debug!(path = ?old, "already named, nothing to do");
        return Ok(false);
    }
    let parent = new.parent().context("Failed to get parent")?;
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory {:?}", parent))?;
    match mode {
        Mode::Move => {
            fs::rename(old, new)
                .with_context(|| format!("Failed to move {:?} to {:?}", old, new))?;
        }
        Mode::Copy => {
            fs::copy(old, new)
                .with_context(|| format!("Failed to copy {:?} to {:?}", old, new))?;
        }
        Mode::Link => {
            fs::hard_link(old, new)
                .with_context(|| format!("Failed to link {:?} to {:?}", old, new))?;
        }
    };
    info!(?mode, from = ?old, to = ?new, "committed");
    Ok(true)
}

/// Prints each plan line right before its file is committed.
fn commit_all(mode: Mode, transactions: &[Transaction], out: &mut impl Write) -> Result<usize> {
    let mut committed = 0;
    for transaction in transactions {
        writeln!(out, "{}", plan_line(transaction))?;
        if commit(mode, &transaction.old, &transaction.new)? {
            committed += 1;
        }
    }
    Ok(committed)
}

fn scan(source: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read {:?}", source))?;
        files.push(entry.into_path());
    }
    Ok(files)
}

fn plan(
    extractor: &EpisodeExtractor,
    show_name: &str,
    source: &Path,
    target: &Path,
) -> Result<Vec<Transaction>> {
    let files = scan(source)?;
    let mut transactions = Vec::new();

    for ext in VIDEO_EXTENSIONS {
        for old in &files {
            if parse_extension(old).as_deref() != Some(ext) {
                continue;
            }

            let Some(file_name) = old.file_name().map(|name| name.to_string_lossy()) else {
                continue;
            };

            let Some(inference) = extractor.infer(&file_name) else {
                continue;
            };

            transactions.push(Transaction {
                old: old.clone(),
                new: destination(target, show_name, inference, ext),
                episode: inference.episode,
            });
        }
    }

    Ok(transactions)
}

fn render_plan(transactions: &[Transaction], target: &Path, width: usize) -> String {
    let mut ordered = transactions.iter().collect::<Vec<_>>();
    ordered.sort_by_key(|transaction| transaction.episode);

    let rows = ordered.into_iter().map(|transaction| PlanRow {
        original: transaction
            .old
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        new: transaction
            .new
            .strip_prefix(target)
            .unwrap_or(&transaction.new)
            .display()
            .to_string(),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .modify(
            Columns::first(),
            Width::truncate(PLAN_NAME_WIDTH).suffix("..."),
        )
        .with(Width::wrap(width));
    table.to_string()
}

fn confirm(transactions: &[Transaction], target: &Path) -> Result<bool> {
    println!("\n{}", "Rename Plan:".bold());
    println!(
        "{}",
        render_plan(transactions, target, textwrap::termwidth())
    );
    Ok(Confirm::new("Continue with renaming?")
        .with_default(false)
        .prompt()?)
}

fn organize(
    extractor: &EpisodeExtractor,
    show_name: &str,
    source: &Path,
    target: &Path,
    options: &Options,
) -> Result<usize> {
    if !options.dry_run {
        fs::create_dir_all(target)
            .with_context(|| format!("Failed to create output folder {:?}", target))?;
    }

    let transactions = plan(extractor, show_name, source, target)?;

    if transactions.is_empty() {
        println!("{}", "No suitable video files found.".yellow());
        return Ok(0);
    }

    if options.confirm && !confirm(&transactions, target)? {
        println!("{}", "Operation cancelled.".yellow());
        return Ok(0);
    }

    if options.dry_run {
        for transaction in &transactions {
            println!("{}", plan_line(transaction));
        }
        return Ok(0);
    }

    let committed = commit_all(options.mode, &transactions, &mut io::stdout().lock())?;
    println!(
        "{}",
        format!("Renamed {} of {} files.", committed, transactions.len()).bold()
    );
    Ok(committed)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("renamed={}", level)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let source = match args.input_folder {
        Some(input_folder) => input_folder,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let extractor = EpisodeExtractor::new()?;
    let options = Options {
        mode: args.mode,
        dry_run: args.dry_run,
        confirm: args.confirm,
    };

    organize(
        &extractor,
        &args.show_name,
        &source,
        &args.output_folder,
        &options,
    )?;
    Ok(())
}
