//! padtrim binary - discover padded game-archive files, trim the
//! padding off, and restore it later.
//!
//! The heavy lifting lives in `padtrim-engine`; this binary wires the
//! filesystem collaborators into a [`SessionController`], drives the
//! interactive loop at a fixed cadence, and maps Ctrl-C to cooperative
//! cancellation.

mod library;
mod probe;
mod sidecar;
mod trimmer;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use padtrim_core::{capability_label, outcome_label, space_savings_summary};
use padtrim_engine::{
    ArchiveLibrary, ArchiveTrimmer, BatchMode, Outcome, RecordPath, SessionController,
};

use library::{PaddedFileLibrary, DEFAULT_MIN_TRIM_BYTES};
use trimmer::PaddingTrimmer;

#[derive(Debug, Parser)]
#[command(name = "padtrim", version, about = "Trim trailing padding from game-archive files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Directory to scan for archives.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Comma-separated archive extensions to consider.
    #[arg(long, value_delimiter = ',', default_value = "xci,img,iso,bin")]
    ext: Vec<String>,

    /// Minimum trailing-padding run worth trimming, in bytes.
    #[arg(long, default_value_t = DEFAULT_MIN_TRIM_BYTES)]
    min_run: u64,
}

#[derive(Debug, Args)]
struct SelectArgs {
    /// Operate only on these files (repeatable). Default: every
    /// eligible file under the root.
    #[arg(long = "path")]
    paths: Vec<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List candidate archives and their trim state.
    List {
        #[command(flatten)]
        scan: ScanArgs,

        /// Case-insensitive substring filter on name or path.
        #[arg(long)]
        search: Option<String>,

        /// Emit the catalog as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Trim trailing padding from eligible archives.
    Trim {
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        select: SelectArgs,
    },
    /// Restore previously trimmed archives.
    Untrim {
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        select: SelectArgs,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::try_new("error").expect("error filter is valid"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::List { scan, search, json } => list(&scan, search.as_deref(), json),
        Command::Trim { scan, select } => run(&scan, &select, BatchMode::Trim).await,
        Command::Untrim { scan, select } => run(&scan, &select, BatchMode::Untrim).await,
    }
}

fn build_controller(scan: &ScanArgs) -> Result<SessionController> {
    let library = Arc::new(PaddedFileLibrary::new(
        scan.root.clone(),
        scan.ext.clone(),
        scan.min_run,
    ));
    let trimmer = Arc::new(PaddingTrimmer::new());
    let mut controller = SessionController::new(
        library as Arc<dyn ArchiveLibrary>,
        trimmer as Arc<dyn ArchiveTrimmer>,
    );
    let count = controller.load_catalog()?;
    tracing::info!(count, root = %scan.root.display(), "catalog loaded");
    Ok(controller)
}

fn list(scan: &ScanArgs, search: Option<&str>, json: bool) -> Result<()> {
    let mut controller = build_controller(scan)?;
    if let Some(search) = search {
        controller.set_search_text(search);
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&controller.catalog_snapshot())?
        );
        return Ok(());
    }

    for record in controller.view() {
        let selected = if controller.is_selected(&record.path) {
            "*"
        } else {
            " "
        };
        println!(
            "{selected} {:<28} {:<12} {:<16} {}",
            record.name,
            capability_label(record),
            space_savings_summary(record.potential_savings_b, record.current_savings_b),
            record.path
        );
    }
    println!(
        "{} | potential {} MB | saved {} MB",
        controller.status_summary(),
        controller.potential_savings_mb(),
        controller.actual_savings_mb()
    );
    Ok(())
}

async fn run(scan: &ScanArgs, select: &SelectArgs, mode: BatchMode) -> Result<()> {
    let mut controller = build_controller(scan)?;
    apply_selection(&mut controller, select, mode);

    let started = match mode {
        BatchMode::Trim => controller.start_trim(),
        BatchMode::Untrim => controller.start_untrim(),
    };
    if !started {
        println!("nothing to {mode}");
        return Ok(());
    }

    drive_batch(&mut controller).await;
    report(&controller, mode);
    Ok(())
}

/// Replace the default selection with the requested one: explicit paths
/// when given, otherwise every record eligible for `mode`.
fn apply_selection(controller: &mut SessionController, select: &SelectArgs, mode: BatchMode) {
    controller.select_none();
    if select.paths.is_empty() {
        for record in controller.catalog_snapshot() {
            if record.eligible_for(mode) {
                controller.select(&record.path);
            }
        }
        return;
    }

    // Canonicalise the catalog once up front; requested paths may come
    // in relative or symlinked forms.
    let catalog: Vec<(RecordPath, Option<PathBuf>)> = controller
        .catalog_snapshot()
        .into_iter()
        .map(|record| {
            let canonical = std::fs::canonicalize(record.path.as_path()).ok();
            (record.path, canonical)
        })
        .collect();

    for requested in &select.paths {
        let canonical = std::fs::canonicalize(requested).ok();
        let matched = catalog.iter().find(|(path, resolved)| {
            path.as_path() == requested
                || (canonical.is_some() && *resolved == canonical)
        });
        match matched {
            Some((path, _)) => controller.select(path),
            None => tracing::warn!(path = %requested.display(), "not in the scanned catalog"),
        }
    }
}

/// Fixed-cadence interactive loop: drain worker events, surface
/// progress, and map Ctrl-C to a cancel request.
async fn drive_batch(controller: &mut SessionController) {
    let mut ticker = tokio::time::interval(Duration::from_millis(50));
    let mut last_progress: Option<(RecordPath, u8)> = None;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("cancelling; the file in flight will finish first");
                controller.request_cancel();
            }
            _ = ticker.tick() => {
                controller.drain_worker_events();
                if let Some(processing) = controller.processing() {
                    let current = (processing.path().clone(), processing.percent().unwrap_or(0));
                    if last_progress.as_ref() != Some(&current) {
                        eprintln!("  {} ... {}%", current.0, current.1);
                        last_progress = Some(current);
                    }
                }
                if !controller.is_running() {
                    break;
                }
            }
        }
    }
}

fn report(controller: &SessionController, mode: BatchMode) {
    let mut done = 0usize;
    let mut failed = 0usize;
    for record in controller.catalog_snapshot() {
        match record.outcome {
            Outcome::Successful => {
                done += 1;
                println!("ok      {} ({})", record.path, outcome_label(&record, false));
            }
            Outcome::Failed => {
                failed += 1;
                println!("failed  {}", record.path);
            }
            Outcome::Undetermined | Outcome::Cancelled => {}
        }
    }
    println!(
        "{mode} finished: {done} ok, {failed} failed | potential {} MB | saved {} MB",
        controller.potential_savings_mb(),
        controller.actual_savings_mb()
    );
}
