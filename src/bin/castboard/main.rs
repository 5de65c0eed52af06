//! CLI tool to inspect a roster snapshot and build its cast library.
//!
//! Usage:
//!   castboard --input roster.json [--cast <uuid>] [--performance-date <ms>]
//!             [--output casts.automerge] [--config editor.json]

mod input;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use castboard::{CastEditor, CastStore, EditorConfig};
use input::RosterSnapshot;

#[derive(Parser, Debug)]
#[command(
    name = "castboard",
    about = "Print cast grids from a roster snapshot and write the cast library",
    version
)]
struct Args {
    /// Roster JSON file with segments, dancers and casts
    #[arg(short, long)]
    input: PathBuf,

    /// Cast to print (defaults to the editor's initial selection)
    #[arg(short, long)]
    cast: Option<String>,

    /// Output file for the cast library (defaults to input path with .automerge extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Editor config JSON file
    #[arg(long, env = "CASTBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Performance date (milliseconds since the epoch) to check absences
    /// against; turns on unavailability checks
    #[arg(long)]
    performance_date: Option<i64>,

    /// Skip writing the cast library
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EditorConfig::from_path(path).context("Failed to read config")?,
        None => EditorConfig::default(),
    }
    .apply_env()
    .context("Invalid environment override")?;
    if args.performance_date.is_some() {
        config.check_unavailabilities = true;
    }

    let input_path = &args.input;
    if !input_path.exists() {
        anyhow::bail!("Input file does not exist: {}", input_path.display());
    }
    let json_content =
        std::fs::read_to_string(input_path).context("Failed to read input file")?;
    let snapshot: RosterSnapshot =
        serde_json::from_str(&json_content).context("Failed to parse roster JSON")?;
    info!(
        segments = snapshot.segments.len(),
        dancers = snapshot.dancers.len(),
        casts = snapshot.casts.len(),
        "roster loaded"
    );

    let mut store = CastStore::new().context("Failed to create cast library")?;
    for cast in snapshot.casts {
        store
            .set_cast(cast, false)
            .context("Failed to import cast")?;
    }

    let initial_path = args
        .cast
        .as_ref()
        .map(|uuid| format!("{}/{}", config.route_base, uuid));
    let mut editor = CastEditor::new(config, store, initial_path.as_deref());
    editor
        .set_performance_date(args.performance_date)
        .context("Failed to set performance date")?;
    editor
        .load_segments(snapshot.segments)
        .context("Failed to load segments")?;
    editor
        .load_dancers(snapshot.dancers)
        .context("Failed to load dancers")?;
    editor.load_casts().context("Failed to load casts")?;

    if let Some(wanted) = &args.cast {
        if editor.board().selected_cast_uuid() != Some(wanted.as_str()) {
            anyhow::bail!("Cast not found: {}", wanted);
        }
    }

    match (editor.board().cast(), editor.board().grid()) {
        (Some(cast), Some(grid)) => {
            println!("{} ({})", cast.name, editor.url());
            println!();
            print!("{}", render::render_grid(grid));
        }
        _ => println!("No cast to show"),
    }

    if !args.dry_run {
        let output_path = args.output.clone().unwrap_or_else(|| {
            let mut path = input_path.clone();
            path.set_extension("automerge");
            path
        });
        let binary = editor.store_mut().save();
        std::fs::write(&output_path, &binary).context("Failed to write output file")?;
        info!(
            path = %output_path.display(),
            bytes = binary.len(),
            "cast library written"
        );
    }

    Ok(())
}
