use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use call_analyzer::report::{self, Dimension, Filter, Pivot};
use call_analyzer::settings::{Settings, DEFAULT_CONFIG_FILE};
use call_analyzer::{Analysis, Artifact, ArtifactWarning, BatchStatus, ExtensionDirectory};

#[derive(Parser)]
#[command(name = "call_analyzer", about = "Internal to external call report analyzer")]
struct Cli {
    /// Settings file (TOML); missing file falls back to built-in defaults
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest exports and print call volume tables
    Analyze {
        /// HTML exports or Excel workbooks
        files: Vec<PathBuf>,
        /// Filter by user id (e.g. AD)
        #[arg(short, long)]
        user: Option<String>,
        /// Filter by call category (International, Mobile, Other External, ...)
        #[arg(long)]
        category: Option<String>,
        /// Filter by month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
        /// Group-by dimension: user, category, month, weekday
        #[arg(short, long, default_value = "user")]
        by: Dimension,
    },
    /// Print the canonical dataset as JSON
    Dump {
        files: Vec<PathBuf>,
    },
    /// Show the active extension directory
    Directory,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let t0 = Instant::now();
    let settings = Settings::load(&cli.config)?;
    let directory = settings.directory()?;

    match cli.command {
        Commands::Analyze {
            files,
            user,
            category,
            month,
            by,
        } => {
            let analysis = run(&files, &directory)?;
            print_warnings(&analysis.warnings);
            if let Some(msg) = analysis.status.message() {
                println!("{}", msg);
                return Ok(());
            }

            if let Some(m) = &month {
                let choices = report::months(&analysis.records);
                if !choices.contains(m) {
                    warn!(month = %m, available = ?choices, "no calls in the requested month");
                }
            }

            let filter = Filter { user, category, month };
            let all: Vec<_> = analysis.records.iter().collect();
            let filtered = filter.apply(&analysis.records);

            println!(
                "{} calls from {} files ({} after filters)\n",
                analysis.records.len(),
                files.len(),
                filtered.len()
            );

            print_groups(&filtered, by);
            print_pivot("Monthly Call Volume by Call Type (Filtered)", "Month", &report::monthly(&filtered));
            print_pivot("Weekly Call Volume by Call Type (Filtered)", "Weekday", &report::weekly(&filtered));
            // Per-user totals span all months and ignore filters.
            print_pivot("Total Calls by User (All Months)", "User", &report::per_user(&all, &directory));
        }
        Commands::Dump { files } => {
            let analysis = run(&files, &directory)?;
            print_warnings(&analysis.warnings);
            println!("{}", serde_json::to_string_pretty(&analysis.records)?);
        }
        Commands::Directory => {
            println!("{:<9} | {:<6}", "Extension", "User");
            println!("{}", "-".repeat(18));
            for (ext, user) in directory.entries() {
                println!("{:<9} | {:<6}", ext, user);
            }
            println!("\n{} extensions", directory.len());
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

/// Read every path; unreadable files become warnings, never a hard stop.
fn run(files: &[PathBuf], directory: &ExtensionDirectory) -> Result<Analysis> {
    let mut artifacts = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();

    for path in files {
        match Artifact::from_path(path) {
            Ok(a) => artifacts.push(a),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read file");
                let err = call_analyzer::ArtifactError::Io(e);
                unreadable.push(ArtifactWarning::from_error(&path.display().to_string(), &err));
            }
        }
    }

    let pb = ProgressBar::new(artifacts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    let mut analysis = call_analyzer::analyze_with_progress(&artifacts, directory, &pb);
    pb.finish_and_clear();

    if !unreadable.is_empty() {
        unreadable.append(&mut analysis.warnings);
        analysis.warnings = unreadable;
        if artifacts.is_empty() {
            analysis.status = BatchStatus::NothingSurvived;
        }
    }
    if files.is_empty() {
        analysis.status = BatchStatus::NoArtifacts;
    }
    Ok(analysis)
}

fn print_warnings(warnings: &[ArtifactWarning]) {
    for w in warnings {
        eprintln!("warning: {}", w);
    }
}

fn print_groups(records: &[&call_analyzer::CanonicalRecord], by: Dimension) {
    let groups = report::group_by(records, by);
    println!("{:<16} | {:>6} | {:>12}", format!("{:?}", by), "Calls", "Duration");
    println!("{}", "-".repeat(40));
    for g in &groups {
        println!(
            "{:<16} | {:>6} | {:>12}",
            truncate(&g.key, 16),
            g.count,
            format_seconds(g.total_duration)
        );
    }
    println!();
}

fn print_pivot(title: &str, label: &str, pivot: &Pivot) {
    println!("--- {} ---", title);
    if pivot.is_empty() {
        println!("No call data available for the selected filters.\n");
        return;
    }

    let mut header = format!("{:<10}", label);
    for col in &pivot.columns {
        header.push_str(&format!(" | {:>14}", truncate(col, 14)));
    }
    header.push_str(&format!(" | {:>6}", "Total"));
    println!("{}", header);
    println!("{}", "-".repeat(header.chars().count()));

    for row in &pivot.rows {
        let mut line = format!("{:<10}", truncate(&row.key, 10));
        for c in &row.counts {
            line.push_str(&format!(" | {:>14}", c));
        }
        line.push_str(&format!(" | {:>6}", row.total()));
        println!("{}", line);
    }
    println!();
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Durations may be negative (disconnect recorded before connect).
fn format_seconds(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let s = secs.unsigned_abs();
    if s < 3600 {
        format!("{}{}m {:02}s", sign, s / 60, s % 60)
    } else {
        format!("{}{}h {:02}m {:02}s", sign, s / 3600, (s % 3600) / 60, s % 60)
    }
}
