//! Import of party affiliation records from the Brasil.io
//! `eleicoes-brasil/filiados` dataset.
//!
//! Rows are matched against stored affiliations by natural key
//! (party, city, voter id, start date, and the voter's name when the voter
//! id is long). Unmatched rows become new records; matched rows get only
//! their changed status fields written back.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::parse_date;
use crate::db::{AffiliationKey, Db, DbError};
use crate::error::ImportError;
use crate::import::{ImportCommand, NewRecord, Row};
use crate::models::{
    Affiliation, AffiliationField, AffiliationStatus, City, NewAffiliation, Party, StatusFields,
};
use crate::reference::ReferenceCache;

/// Voter ids longer than this are not trusted on their own; the name joins the key.
pub const VOTER_ID_TRUSTED_LENGTH: usize = 10;

/// Column names of the source dataset.
pub mod columns {
    pub const NAME: &str = "nome";
    pub const VOTER_ID: &str = "titulo_eleitoral";
    pub const PARTY_ABBREVIATION: &str = "sigla_partido";
    pub const PARTY_NAME: &str = "partido";
    pub const CITY_CODE: &str = "codigo_municipio";
    pub const CITY_NAME: &str = "municipio";
    pub const STATE: &str = "uf";
    pub const STARTED_IN: &str = "data_filiacao";
    pub const STATUS: &str = "situacao";
    pub const CANCELED_IN: &str = "data_cancelamento";
    pub const CANCEL_REASON: &str = "motivo_cancelamento";
    pub const ENDED_IN: &str = "data_desfiliacao";
    pub const REGULARIZED_IN: &str = "data_regularizacao";
    pub const PROCESSED_IN: &str = "data_processamento";
    pub const ELECTORAL_SECTION: &str = "secao_eleitoral";
    pub const ELECTORAL_ZONE: &str = "zona_eleitoral";
}

/// Build the lookup key for an affiliation.
///
/// `name` is only part of the key when `voter_id` is longer than
/// [`VOTER_ID_TRUSTED_LENGTH`] characters.
pub fn affiliation_key(
    name: &str,
    voter_id: &str,
    party: &Party,
    city: &City,
    started_in: NaiveDate,
) -> AffiliationKey {
    let name = (voter_id.chars().count() > VOTER_ID_TRUSTED_LENGTH).then(|| name.to_string());
    AffiliationKey {
        party_id: party.id,
        city_id: city.id,
        voter_id: voter_id.to_string(),
        started_in,
        name,
    }
}

/// Return the stored affiliation matching `key`, if any.
///
/// Several matches are a known dataset defect: a warning is logged and the
/// first one (lowest id) is returned.
pub fn get_affiliation_if_exists(
    db: &Db,
    key: &AffiliationKey,
) -> Result<Option<Affiliation>, DbError> {
    Ok(resolve_affiliation(db, key)?.0)
}

/// Like [`get_affiliation_if_exists`], also reporting whether the key was duplicated.
fn resolve_affiliation(
    db: &Db,
    key: &AffiliationKey,
) -> Result<(Option<Affiliation>, bool), DbError> {
    // One row past the first is enough to detect duplicates.
    let mut matches = db.find_affiliations(key, 2)?;
    let duplicated = matches.len() > 1;
    if duplicated {
        tracing::warn!(
            "Multiple affiliations returned for {:?}. Changing only the first.",
            key
        );
    }
    if matches.is_empty() {
        return Ok((None, false));
    }
    Ok((Some(matches.swap_remove(0)), duplicated))
}

/// Apply `fields` to `affiliation` and persist just the fields that changed.
///
/// Returns the touched fields; nothing is written when the list is empty.
pub fn update_affiliation(
    db: &Db,
    affiliation: &mut Affiliation,
    fields: StatusFields,
) -> Result<Vec<AffiliationField>, DbError> {
    let touched = affiliation.apply(fields);
    db.update_affiliation_fields(affiliation, &touched)?;
    Ok(touched)
}

impl NewRecord for NewAffiliation {
    fn insert(&self, db: &Db) -> Result<i64, ImportError> {
        Ok(db.insert_affiliation(self)?)
    }
}

/// What happened to matched rows during a run. Created rows are counted by
/// the import driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AffiliationStats {
    pub updated: u64,
    pub unchanged: u64,
    pub duplicate_keys: u64,
}

/// Import command for affiliation rows.
#[derive(Debug, Default)]
pub struct AffiliationImport {
    references: ReferenceCache,
    stats: AffiliationStats,
}

impl AffiliationImport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> AffiliationStats {
        self.stats
    }

    fn lookup(&mut self, db: &Db, key: &AffiliationKey) -> Result<Option<Affiliation>, DbError> {
        let (affiliation, duplicated) = resolve_affiliation(db, key)?;
        if duplicated {
            self.stats.duplicate_keys += 1;
        }
        Ok(affiliation)
    }
}

impl ImportCommand for AffiliationImport {
    type Record = NewAffiliation;

    fn serialize(&mut self, db: &Db, row: &Row) -> Result<Option<NewAffiliation>, ImportError> {
        let name = row.get(columns::NAME)?;
        let voter_id = row.get(columns::VOTER_ID)?;
        let party = self.references.get_party(
            db,
            row.get(columns::PARTY_ABBREVIATION)?,
            row.get(columns::PARTY_NAME)?,
        )?;
        let city = self.references.get_city(
            db,
            row.get(columns::CITY_CODE)?,
            row.get(columns::CITY_NAME)?,
            row.get(columns::STATE)?,
        )?;
        let started_in = required_date(row, columns::STARTED_IN)?;

        let key = affiliation_key(name, voter_id, &party, &city, started_in);
        let existing = self.lookup(db, &key)?;

        let fields = StatusFields {
            status: AffiliationStatus::from_text(row.get(columns::STATUS)?),
            canceled_in: parse_date(row.get(columns::CANCELED_IN)?),
            cancel_reason: row.get(columns::CANCEL_REASON)?.to_string(),
            ended_in: parse_date(row.get(columns::ENDED_IN)?),
            regularized_in: parse_date(row.get(columns::REGULARIZED_IN)?),
            processed_in: parse_date(row.get(columns::PROCESSED_IN)?),
        };

        let Some(mut affiliation) = existing else {
            let electoral_section = match row.get(columns::ELECTORAL_SECTION)? {
                "" => None,
                section => Some(section.to_string()),
            };
            tracing::debug!("New affiliation for voter {} in party {}", voter_id, party.abbreviation);
            return Ok(Some(NewAffiliation {
                name: name.to_string(),
                voter_id: voter_id.to_string(),
                party_id: party.id,
                city_id: city.id,
                started_in,
                electoral_section,
                electoral_zone: row.get(columns::ELECTORAL_ZONE)?.to_string(),
                status: fields.status,
                canceled_in: fields.canceled_in,
                cancel_reason: fields.cancel_reason,
                ended_in: fields.ended_in,
                regularized_in: fields.regularized_in,
                processed_in: fields.processed_in,
            }));
        };

        let touched = update_affiliation(db, &mut affiliation, fields)?;
        if touched.is_empty() {
            self.stats.unchanged += 1;
        } else {
            tracing::debug!(
                "Updated affiliation {}: {}",
                affiliation.id,
                touched
                    .iter()
                    .map(|f| f.column())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            self.stats.updated += 1;
        }
        Ok(None)
    }
}

fn required_date(row: &Row, column: &str) -> Result<NaiveDate, ImportError> {
    let raw = row.get(column)?;
    parse_date(raw).ok_or_else(|| ImportError::InvalidDate {
        column: column.to_string(),
        value: raw.to_string(),
    })
}
