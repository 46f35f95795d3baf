//! CLI subcommand implementations.

pub mod affiliations;
pub mod import_affiliations;
