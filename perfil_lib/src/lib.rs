//! Library layer for Perfil: SQLite storage and the importers that load
//! Brazilian electoral datasets into it.
//!
//! The only dataset handled so far is party affiliation (`filiados`), see
//! [`affiliations`].

pub mod affiliations;
pub mod dates;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod reference;

pub use affiliations::{AffiliationImport, AffiliationStats};
pub use dates::parse_date;
pub use db::{AffiliationKey, Db, DbAffiliationFilter, DbAffiliationRow, DbError};
pub use error::ImportError;
pub use import::{run_import, ImportCommand, ImportSummary, NewRecord, Row};
pub use models::{Affiliation, AffiliationField, AffiliationStatus, City, NewAffiliation, Party};
pub use reference::ReferenceCache;
