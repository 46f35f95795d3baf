mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "perfil")]
#[command(about = "Load and query Brazilian political party affiliation data")]
struct Cli {
    /// Output format: table, json, or csv
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import party affiliations from a Brasil.io `filiados` CSV file
    ImportAffiliations(commands::import_affiliations::ImportAffiliationsArgs),
    /// List stored affiliations
    Affiliations(commands::affiliations::AffiliationsArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("perfil=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        _ => OutputFormat::Table,
    };

    match &cli.command {
        Commands::ImportAffiliations(args) => commands::import_affiliations::run(args, &format)?,
        Commands::Affiliations(args) => commands::affiliations::run(args, &format)?,
    }

    Ok(())
}
