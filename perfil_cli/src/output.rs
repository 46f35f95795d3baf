use anyhow::Result;
use perfil_lib::{AffiliationStats, DbAffiliationRow, ImportSummary};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Tabled, Serialize)]
struct AffiliationRow {
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Voter ID")]
    #[serde(rename = "Voter ID")]
    voter_id: String,
    #[tabled(rename = "Party")]
    #[serde(rename = "Party")]
    party: String,
    #[tabled(rename = "City")]
    #[serde(rename = "City")]
    city: String,
    #[tabled(rename = "Since")]
    #[serde(rename = "Since")]
    started_in: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
    #[tabled(rename = "Until")]
    #[serde(rename = "Until")]
    until: String,
}

/// Outcome of an import run, as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub rows: u64,
    pub created: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub duplicate_keys: u64,
}

impl ImportReport {
    pub fn new(summary: ImportSummary, stats: AffiliationStats) -> Self {
        Self {
            rows: summary.rows,
            created: summary.created,
            updated: stats.updated,
            unchanged: stats.unchanged,
            duplicate_keys: stats.duplicate_keys,
        }
    }
}

#[derive(Tabled)]
struct ReportLine {
    #[tabled(rename = "Result")]
    label: &'static str,
    #[tabled(rename = "Rows")]
    count: u64,
}

// -- Row builders --

fn build_affiliation_rows(rows: &[DbAffiliationRow]) -> Vec<AffiliationRow> {
    rows.iter()
        .map(|r| AffiliationRow {
            name: r.name.clone(),
            voter_id: r.voter_id.clone(),
            party: r.party.clone(),
            city: format!("{}/{}", r.city, r.state),
            started_in: r.started_in.to_string(),
            status: r.status.clone().unwrap_or_else(|| "-".to_string()),
            until: r
                .ended_in
                .or(r.canceled_in)
                .map(|d| d.to_string())
                .unwrap_or_default(),
        })
        .collect()
}

fn build_report_lines(report: &ImportReport) -> Vec<ReportLine> {
    vec![
        ReportLine {
            label: "Read",
            count: report.rows,
        },
        ReportLine {
            label: "Created",
            count: report.created,
        },
        ReportLine {
            label: "Updated",
            count: report.updated,
        },
        ReportLine {
            label: "Unchanged",
            count: report.unchanged,
        },
        ReportLine {
            label: "Duplicate keys",
            count: report.duplicate_keys,
        },
    ]
}

// -- Table output --

pub fn print_affiliations_table(rows: &[DbAffiliationRow]) {
    println!("{}", Table::new(build_affiliation_rows(rows)));
}

// -- CSV output --

pub fn print_affiliations_csv(rows: &[DbAffiliationRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for mut row in build_affiliation_rows(rows) {
        row.name = sanitize_csv_field(&row.name);
        row.city = sanitize_csv_field(&row.city);
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Prefix values a spreadsheet would evaluate as formulas.
pub fn sanitize_csv_field(value: &str) -> String {
    match value.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("\t{}", value),
        _ => value.to_string(),
    }
}

// -- Import report --

pub fn print_import_report(report: &ImportReport, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.serialize(report)?;
            wtr.flush()?;
        }
        OutputFormat::Table => {
            let mut table = Table::new(build_report_lines(report));
            table.with(Style::rounded());
            println!("{}", table);
        }
    }
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
