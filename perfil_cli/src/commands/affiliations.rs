//! The `affiliations` subcommand: list stored affiliations.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use perfil_lib::{AffiliationStatus, Db, DbAffiliationFilter};

use crate::output::{print_affiliations_csv, print_affiliations_table, print_json, OutputFormat};

/// Arguments for the `affiliations` subcommand.
#[derive(Args)]
pub struct AffiliationsArgs {
    /// SQLite database path
    #[arg(long, env = "PERFIL_DB", default_value = "perfil.db")]
    pub db: PathBuf,

    /// Voter id (titulo eleitoral)
    #[arg(long)]
    pub voter_id: Option<String>,

    /// Party abbreviation, e.g. PT
    #[arg(long)]
    pub party: Option<String>,

    /// Electoral court municipality code
    #[arg(long)]
    pub city_code: Option<String>,

    /// Status: regular, cancelado, desfiliado, or "sub judice"
    #[arg(long)]
    pub status: Option<String>,

    /// Maximum number of rows
    #[arg(long, default_value = "50")]
    pub limit: i64,
}

pub fn run(args: &AffiliationsArgs, format: &OutputFormat) -> Result<()> {
    let status = args
        .status
        .as_deref()
        .map(|s| AffiliationStatus::from_text(s).ok_or_else(|| anyhow!("Unknown status: {}", s)))
        .transpose()?;

    if args.limit < 1 {
        return Err(anyhow!("Limit must be at least 1"));
    }

    let db = Db::open(&args.db)?;
    db.init()?;

    let filter = DbAffiliationFilter {
        voter_id: args.voter_id.clone(),
        party: args.party.clone(),
        city_code: args.city_code.clone(),
        status,
        limit: Some(args.limit),
    };
    let rows = db.query_affiliations(&filter)?;

    eprintln!("{} affiliations", rows.len());

    match format {
        OutputFormat::Table => print_affiliations_table(&rows),
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Csv => print_affiliations_csv(&rows)?,
    }
    Ok(())
}
