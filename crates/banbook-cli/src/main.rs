//! `banbook` — batch importer and maintenance CLI for the banbook CRM store.
//!
//! # Usage
//!
//! ```text
//! banbook import activations TABLA-DE-ACTIVACIONES.xlsx --dry-run
//! banbook import unified UNIFICADO_CLIENTES.xlsx
//! banbook merge-duplicates
//! banbook verify
//! ```
//!
//! Every subcommand exits 1 on any caught top-level error, 0 otherwise.

mod preview;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use banbook_core::store::{ClientQuery, CrmStore};
use banbook_import::{
  ActivationOptions, ImportReport, import_activation, import_unified,
  merge_duplicate_clients, parse_activation_sheet, parse_unified_sheet,
};
use banbook_sheet::read_sheet;
use banbook_store_sqlite::SqliteStore;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "banbook", about = "Batch importer for the banbook CRM store")]
struct Cli {
  /// Path to the SQLite store file.
  #[arg(long, env = "BANBOOK_STORE_PATH", default_value = "banbook.db")]
  store: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Import a spreadsheet into the store.
  Import {
    #[command(subcommand)]
    layout: ImportLayout,
  },

  /// Fold clients sharing a business name into the oldest one.
  MergeDuplicates {
    /// List the duplicate groups without merging them.
    #[arg(long)]
    dry_run: bool,
  },

  /// Print table counts and the incomplete-clients report.
  Verify,
}

#[derive(Subcommand)]
enum ImportLayout {
  /// Activation workbook: one BAN, metadata block above the data table.
  Activations {
    file: PathBuf,

    /// Source label for logs and reports (defaults to the file name).
    #[arg(long)]
    source: Option<String>,

    /// BAN to use when the sheet has no metadata block.
    #[arg(long)]
    ban: Option<String>,

    /// Accept positional column defaults when keywords fail to match.
    #[arg(long)]
    allow_positional: bool,

    /// Parse and preview only; write nothing.
    #[arg(long)]
    dry_run: bool,
  },

  /// Unified customer sheet: BAN/SUB/STATUS columns, many BANs per file.
  Unified {
    file: PathBuf,

    /// Source label for logs and reports (defaults to the file name).
    #[arg(long)]
    source: Option<String>,

    /// Parse and preview only; write nothing.
    #[arg(long)]
    dry_run: bool,
  },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command {
    Command::Import { layout } => match layout {
      ImportLayout::Activations {
        file,
        source,
        ban,
        allow_positional,
        dry_run,
      } => {
        import_activations_cmd(
          &cli.store,
          &file,
          source,
          ban,
          allow_positional,
          dry_run,
        )
        .await
      }
      ImportLayout::Unified { file, source, dry_run } => {
        import_unified_cmd(&cli.store, &file, source, dry_run).await
      }
    },
    Command::MergeDuplicates { dry_run } => {
      merge_duplicates_cmd(&cli.store, dry_run).await
    }
    Command::Verify => verify_cmd(&cli.store).await,
  }
}

fn source_label(source: Option<String>, file: &Path) -> String {
  source.unwrap_or_else(|| {
    file
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| file.display().to_string())
  })
}

fn print_report(report: &ImportReport) {
  println!("imported from {}:", report.source);
  println!("  clients created:     {}", report.clients_created);
  println!("  bans created:        {}", report.bans_created);
  println!("  subscribers created: {}", report.subscribers_created);
  println!("  bans already there:  {}", report.bans_existing);
  println!("  rows dropped:        {}", report.rows_dropped);
  if report.clients_merged > 0 {
    println!(
      "  duplicates merged:   {} clients ({} bans moved)",
      report.clients_merged, report.bans_moved
    );
  }
  preview::print_diagnostics(&report.diagnostics);
}

// ─── Commands ────────────────────────────────────────────────────────────────

async fn import_activations_cmd(
  store_path: &Path,
  file: &Path,
  source: Option<String>,
  ban: Option<String>,
  allow_positional: bool,
  dry_run: bool,
) -> Result<()> {
  let sheet = read_sheet(file)
    .with_context(|| format!("failed to read {}", file.display()))?;

  let opts = ActivationOptions {
    allow_positional,
    ban_override: ban,
    today: Utc::now().date_naive(),
  };

  if dry_run {
    let parsed = parse_activation_sheet(&sheet, &opts)?;
    preview::print_activation(&parsed);
    return Ok(());
  }

  let store = open_store(store_path).await?;
  let label = source_label(source, file);
  let report = import_activation(&store, &sheet, &opts, &label).await?;
  print_report(&report);
  Ok(())
}

async fn import_unified_cmd(
  store_path: &Path,
  file: &Path,
  source: Option<String>,
  dry_run: bool,
) -> Result<()> {
  let sheet = read_sheet(file)
    .with_context(|| format!("failed to read {}", file.display()))?;

  if dry_run {
    let parsed = parse_unified_sheet(&sheet)?;
    preview::print_unified(&parsed);
    return Ok(());
  }

  let store = open_store(store_path).await?;
  let label = source_label(source, file);
  let report = import_unified(&store, &sheet, &label).await?;
  print_report(&report);
  Ok(())
}

async fn merge_duplicates_cmd(store_path: &Path, dry_run: bool) -> Result<()> {
  let store = open_store(store_path).await?;

  if dry_run {
    let groups = store.duplicate_groups().await?;
    if groups.is_empty() {
      println!("no duplicate clients found");
      return Ok(());
    }
    println!("{} duplicate group(s):", groups.len());
    for group in &groups {
      println!(
        "  {:?}: {} clients, principal created {}",
        group.business_name,
        group.clients.len(),
        group.clients[0].created_at.date_naive(),
      );
    }
    return Ok(());
  }

  let report = merge_duplicate_clients(&store).await?;
  println!(
    "merged {} clients across {} group(s); {} bans moved",
    report.clients_merged, report.groups, report.bans_moved
  );
  Ok(())
}

async fn verify_cmd(store_path: &Path) -> Result<()> {
  let store = open_store(store_path).await?;

  let counts = store.counts().await?;
  preview::print_counts(&counts);

  let incomplete = store
    .list_clients(&ClientQuery {
      incomplete_only: true,
      limit:           Some(20),
      offset:          None,
    })
    .await?;

  if !incomplete.is_empty() {
    println!();
    println!(
      "incomplete clients (showing {} of {}):",
      incomplete.len(),
      counts.incomplete_clients
    );
    for client in &incomplete {
      let bans = store.list_bans(client.client_id).await?;
      let numbers: Vec<&str> =
        bans.iter().map(|b| b.ban_number.as_str()).collect();
      println!("  {} (bans: {})", client.name, numbers.join(", "));
    }
  }

  Ok(())
}

async fn open_store(path: &Path) -> Result<SqliteStore> {
  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open store at {}", path.display()))
}
