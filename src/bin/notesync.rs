use clap::{Parser, Subcommand};
use notesync::{JsonStore, Plan, SyncOutcome, split_lines};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync a markdown outline against the note store
    Sync {
        /// Markdown file to sync
        file: PathBuf,
        /// Path to the note store file
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Show what a sync would do without writing anything
    Status {
        /// Markdown file to inspect
        file: PathBuf,
        /// Path to the note store file
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct LeafReport {
    title: String,
    action: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Sync { file, store, json } => sync_command(file, store, *json),
        Commands::Status { file, store, json } => status_command(file, store, *json),
    }
}

fn sync_command(file: &Path, store_path: &Path, json: bool) {
    let text = read_file(file);
    let mut store = open_store(store_path);

    let report = match notesync::sync_text(&text, &mut store) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    // The file is only replaced once the whole run has succeeded.
    if let Err(err) = write_atomic(file, &report.output) {
        eprintln!("Error: failed to write {}: {err}", file.display());
        std::process::exit(1);
    }

    let leaves: Vec<LeafReport> = report
        .outcomes
        .iter()
        .map(|(title, outcome)| LeafReport {
            title: title.clone(),
            action: describe_outcome(outcome),
        })
        .collect();

    if json {
        let output = serde_json::json!({ "leaves": leaves });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        for leaf in &leaves {
            println!("{}: {}", leaf.action, leaf.title);
        }
    }
}

fn status_command(file: &Path, store_path: &Path, json: bool) {
    let text = read_file(file);
    let store = open_store(store_path);
    let lines = split_lines(&text);

    let planned = notesync::parse_nodes(&text, &lines)
        .and_then(|nodes| notesync::plan_document(&nodes, &store));
    let planned = match planned {
        Ok(planned) => planned,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    let leaves: Vec<LeafReport> = planned
        .iter()
        .map(|plan| LeafReport {
            title: plan.title.clone(),
            action: describe_plan(plan.action),
        })
        .collect();
    let missing = planned.iter().any(|plan| plan.action == Plan::Missing);

    if json {
        let output = serde_json::json!({ "leaves": leaves });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        for leaf in &leaves {
            println!("{}: {}", leaf.action, leaf.title);
        }
    }
    if missing {
        std::process::exit(1);
    }
}

fn describe_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Created { id } => format!("created ({id})"),
        SyncOutcome::Pushed { changed: true } => "pushed".to_string(),
        SyncOutcome::Pushed { changed: false } => "unchanged".to_string(),
        SyncOutcome::Pulled => "pulled".to_string(),
    }
}

fn describe_plan(plan: Plan) -> String {
    match plan {
        Plan::Create => "create",
        Plan::Push => "push",
        Plan::Pull => "pull",
        Plan::Missing => "missing",
    }
    .to_string()
}

fn read_file(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("Error: failed to read {}: {err}", path.display());
            std::process::exit(1);
        }
    }
}

fn open_store(path: &Path) -> JsonStore {
    match JsonStore::open(path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)
}
