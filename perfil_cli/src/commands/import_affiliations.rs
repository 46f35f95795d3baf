//! The `import-affiliations` subcommand: load a `filiados` CSV into SQLite.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use perfil_lib::{run_import, AffiliationImport, Db};

use crate::output::{print_import_report, ImportReport, OutputFormat};

/// Arguments for the `import-affiliations` subcommand.
#[derive(Args)]
pub struct ImportAffiliationsArgs {
    /// Path to the affiliations CSV file
    pub path: PathBuf,

    /// SQLite database path
    #[arg(long, env = "PERFIL_DB", default_value = "perfil.db")]
    pub db: PathBuf,

    /// Field delimiter of the CSV file
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Hide the progress spinner
    #[arg(long)]
    pub quiet: bool,
}

pub fn run(args: &ImportAffiliationsArgs, format: &OutputFormat) -> Result<()> {
    if !args.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character");
    }

    let db = Db::open(&args.db)?;
    db.init()?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(args.delimiter as u8)
        .from_path(&args.path)
        .with_context(|| format!("failed to open {}", args.path.display()))?;

    eprintln!(
        "Importing affiliations from {} into {}",
        args.path.display(),
        args.db.display()
    );

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] {pos} rows ({per_sec}) {msg}",
    )?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("importing affiliations...");

    let mut command = AffiliationImport::new();
    let result = run_import(&db, &mut reader, &mut command, |rows| pb.set_position(rows));
    pb.finish_and_clear();
    let summary = result.with_context(|| format!("import of {} failed", args.path.display()))?;

    let report = ImportReport::new(summary, command.stats());
    print_import_report(&report, format)?;
    Ok(())
}
