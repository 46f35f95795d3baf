//! SQLite storage for party affiliation data.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::models::{Affiliation, AffiliationField, AffiliationStatus, City, NewAffiliation, Party};

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unknown affiliation status code in database: {0}")]
    UnknownStatus(String),
}

pub struct Db {
    conn: Connection,
}

const AFFILIATION_COLUMNS: &str = "affiliation_id, name, voter_id, party_id, city_id, started_in,
     electoral_section, electoral_zone, status, canceled_in, cancel_reason,
     ended_in, regularized_in, processed_in";

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for tests).
    #[doc(hidden)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn init(&self) -> Result<(), DbError> {
        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    // -- Reference entities --

    /// Return the party with `abbreviation`, creating it with `name` if absent.
    ///
    /// An existing party keeps its stored name.
    pub fn get_or_create_party(&self, abbreviation: &str, name: &str) -> Result<Party, DbError> {
        self.conn.execute(
            "INSERT INTO parties (abbreviation, name) VALUES (?1, ?2)
             ON CONFLICT(abbreviation) DO NOTHING",
            params![abbreviation, name],
        )?;
        let party = self.conn.query_row(
            "SELECT party_id, abbreviation, name FROM parties WHERE abbreviation = ?1",
            params![abbreviation],
            |row| {
                Ok(Party {
                    id: row.get(0)?,
                    abbreviation: row.get(1)?,
                    name: row.get(2)?,
                })
            },
        )?;
        Ok(party)
    }

    /// Return the city with `code`, creating it if absent.
    pub fn get_or_create_city(&self, code: &str, name: &str, state: &str) -> Result<City, DbError> {
        self.conn.execute(
            "INSERT INTO cities (code, name, state) VALUES (?1, ?2, ?3)
             ON CONFLICT(code) DO NOTHING",
            params![code, name, state],
        )?;
        let city = self.conn.query_row(
            "SELECT city_id, code, name, state FROM cities WHERE code = ?1",
            params![code],
            |row| {
                Ok(City {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                    state: row.get(3)?,
                })
            },
        )?;
        Ok(city)
    }

    pub fn party_count(&self) -> Result<i64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM parties", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn city_count(&self) -> Result<i64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM cities", [], |row| row.get(0))?;
        Ok(count)
    }

    // -- Affiliations --

    pub fn affiliation_count(&self) -> Result<i64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM affiliations", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Affiliations matching `key`, lowest id first, at most `limit` rows.
    pub fn find_affiliations(
        &self,
        key: &AffiliationKey,
        limit: usize,
    ) -> Result<Vec<Affiliation>, DbError> {
        let (where_clause, params_vec) = build_affiliation_key_clause(key);
        let sql = format!(
            "SELECT {} FROM affiliations {} ORDER BY affiliation_id LIMIT {}",
            AFFILIATION_COLUMNS, where_clause, limit
        );
        let param_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), RawAffiliation::from_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?.into_affiliation()?);
        }
        Ok(result)
    }

    pub fn get_affiliation(&self, affiliation_id: i64) -> Result<Option<Affiliation>, DbError> {
        let sql = format!(
            "SELECT {} FROM affiliations WHERE affiliation_id = ?1",
            AFFILIATION_COLUMNS
        );
        let raw = self
            .conn
            .query_row(&sql, params![affiliation_id], RawAffiliation::from_row)
            .optional()?;
        raw.map(RawAffiliation::into_affiliation).transpose()
    }

    /// Insert a new affiliation and return its id.
    pub fn insert_affiliation(&self, affiliation: &NewAffiliation) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO affiliations (
               name,
               voter_id,
               party_id,
               city_id,
               started_in,
               electoral_section,
               electoral_zone,
               status,
               canceled_in,
               cancel_reason,
               ended_in,
               regularized_in,
               processed_in
             )
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                affiliation.name,
                affiliation.voter_id,
                affiliation.party_id,
                affiliation.city_id,
                affiliation.started_in,
                affiliation.electoral_section,
                affiliation.electoral_zone,
                affiliation.status.map(AffiliationStatus::code),
                affiliation.canceled_in,
                affiliation.cancel_reason,
                affiliation.ended_in,
                affiliation.regularized_in,
                affiliation.processed_in,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Write only `fields` of `affiliation`; other columns are left as stored.
    ///
    /// Returns the number of rows written (0 when `fields` is empty).
    pub fn update_affiliation_fields(
        &self,
        affiliation: &Affiliation,
        fields: &[AffiliationField],
    ) -> Result<usize, DbError> {
        if fields.is_empty() {
            return Ok(0);
        }

        let mut sets = Vec::with_capacity(fields.len());
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::with_capacity(fields.len() + 1);
        for (idx, field) in fields.iter().enumerate() {
            sets.push(format!("{} = ?{}", field.column(), idx + 1));
            params_vec.push(field_value(affiliation, *field));
        }
        params_vec.push(Box::new(affiliation.id));

        let sql = format!(
            "UPDATE affiliations SET {} WHERE affiliation_id = ?{}",
            sets.join(", "),
            fields.len() + 1
        );
        let param_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let written = self.conn.execute(&sql, param_refs.as_slice())?;
        Ok(written)
    }

    /// Query affiliations with JOINed party and city data.
    /// Supports filtering by voter id, party abbreviation, city code and status.
    pub fn query_affiliations(
        &self,
        filter: &DbAffiliationFilter,
    ) -> Result<Vec<DbAffiliationRow>, DbError> {
        let mut sql = String::from(
            "SELECT a.affiliation_id, a.name, a.voter_id, p.abbreviation, c.name, c.state,
                    a.started_in, a.status, a.canceled_in, a.ended_in,
                    a.electoral_zone, a.electoral_section
             FROM affiliations a
             JOIN parties p ON a.party_id = p.party_id
             JOIN cities c ON a.city_id = c.city_id
             WHERE 1=1",
        );

        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();
        let mut param_idx = 1;

        if let Some(ref voter_id) = filter.voter_id {
            sql.push_str(&format!(" AND a.voter_id = ?{}", param_idx));
            params_vec.push(Box::new(voter_id.clone()));
            param_idx += 1;
        }
        if let Some(ref party) = filter.party {
            sql.push_str(&format!(" AND UPPER(p.abbreviation) = UPPER(?{})", param_idx));
            params_vec.push(Box::new(party.clone()));
            param_idx += 1;
        }
        if let Some(ref city_code) = filter.city_code {
            sql.push_str(&format!(" AND c.code = ?{}", param_idx));
            params_vec.push(Box::new(city_code.clone()));
            param_idx += 1;
        }
        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND a.status = ?{}", param_idx));
            params_vec.push(Box::new(status.code()));
            param_idx += 1;
        }

        let _ = param_idx;

        sql.push_str(" ORDER BY a.started_in DESC, a.affiliation_id");

        if let Some(n) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        let param_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), |row| {
            let status: Option<String> = row.get(7)?;
            Ok(DbAffiliationRow {
                affiliation_id: row.get(0)?,
                name: row.get(1)?,
                voter_id: row.get(2)?,
                party: row.get(3)?,
                city: row.get(4)?,
                state: row.get(5)?,
                started_in: row.get(6)?,
                status: status
                    .as_deref()
                    .and_then(AffiliationStatus::from_code)
                    .map(|s| s.label().to_string()),
                canceled_in: row.get(8)?,
                ended_in: row.get(9)?,
                electoral_zone: row.get(10)?,
                electoral_section: row.get(11)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

/// Natural key of an affiliation, used to find an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct AffiliationKey {
    pub party_id: i64,
    pub city_id: i64,
    pub voter_id: String,
    pub started_in: NaiveDate,
    /// Only set when the voter id alone is not trusted to identify a person.
    pub name: Option<String>,
}

fn build_affiliation_key_clause(key: &AffiliationKey) -> (String, Vec<Box<dyn ToSql>>) {
    let mut clauses = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    clauses.push("party_id = ?1");
    params.push(Box::new(key.party_id));
    clauses.push("started_in = ?2");
    params.push(Box::new(key.started_in));
    clauses.push("voter_id = ?3");
    params.push(Box::new(key.voter_id.clone()));
    clauses.push("city_id = ?4");
    params.push(Box::new(key.city_id));

    if let Some(ref name) = key.name {
        clauses.push("name = ?5");
        params.push(Box::new(name.clone()));
    }

    (format!("WHERE {}", clauses.join(" AND ")), params)
}

fn field_value(affiliation: &Affiliation, field: AffiliationField) -> Box<dyn ToSql> {
    match field {
        AffiliationField::Status => Box::new(affiliation.status.map(AffiliationStatus::code)),
        AffiliationField::CanceledIn => Box::new(affiliation.canceled_in),
        AffiliationField::CancelReason => Box::new(affiliation.cancel_reason.clone()),
        AffiliationField::EndedIn => Box::new(affiliation.ended_in),
        AffiliationField::RegularizedIn => Box::new(affiliation.regularized_in),
        AffiliationField::ProcessedIn => Box::new(affiliation.processed_in),
    }
}

/// Row as read from SQLite, before the status code is decoded.
struct RawAffiliation {
    affiliation: Affiliation,
    status: Option<String>,
}

impl RawAffiliation {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            affiliation: Affiliation {
                id: row.get(0)?,
                name: row.get(1)?,
                voter_id: row.get(2)?,
                party_id: row.get(3)?,
                city_id: row.get(4)?,
                started_in: row.get(5)?,
                electoral_section: row.get(6)?,
                electoral_zone: row.get(7)?,
                status: None,
                canceled_in: row.get(9)?,
                cancel_reason: row.get(10)?,
                ended_in: row.get(11)?,
                regularized_in: row.get(12)?,
                processed_in: row.get(13)?,
            },
            status: row.get(8)?,
        })
    }

    fn into_affiliation(self) -> Result<Affiliation, DbError> {
        let mut affiliation = self.affiliation;
        affiliation.status = match self.status {
            Some(code) => Some(
                AffiliationStatus::from_code(&code).ok_or(DbError::UnknownStatus(code))?,
            ),
            None => None,
        };
        Ok(affiliation)
    }
}

/// Filter parameters for affiliation queries.
#[derive(Debug, Default)]
pub struct DbAffiliationFilter {
    pub voter_id: Option<String>,
    pub party: Option<String>,
    pub city_code: Option<String>,
    pub status: Option<AffiliationStatus>,
    pub limit: Option<i64>,
}

/// Affiliation row with party and city names, returned by `query_affiliations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbAffiliationRow {
    pub affiliation_id: i64,
    pub name: String,
    pub voter_id: String,
    pub party: String,
    pub city: String,
    pub state: String,
    pub started_in: NaiveDate,
    pub status: Option<String>,
    pub canceled_in: Option<NaiveDate>,
    pub ended_in: Option<NaiveDate>,
    pub electoral_zone: String,
    pub electoral_section: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_db() -> Db {
        let db = Db::open_in_memory().expect("open in-memory db");
        db.init().expect("init schema");
        db
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_test_affiliation(party_id: i64, city_id: i64, voter_id: &str) -> NewAffiliation {
        NewAffiliation {
            name: "JOSE DOS SANTOS".to_string(),
            voter_id: voter_id.to_string(),
            party_id,
            city_id,
            started_in: date(2001, 9, 30),
            electoral_section: Some("0112".to_string()),
            electoral_zone: "0034".to_string(),
            status: Some(AffiliationStatus::Regular),
            canceled_in: None,
            cancel_reason: String::new(),
            ended_in: None,
            regularized_in: Some(date(2001, 10, 5)),
            processed_in: Some(date(2001, 10, 4)),
        }
    }

    fn key_for(new: &NewAffiliation) -> AffiliationKey {
        AffiliationKey {
            party_id: new.party_id,
            city_id: new.city_id,
            voter_id: new.voter_id.clone(),
            started_in: new.started_in,
            name: None,
        }
    }

    #[test]
    fn test_init_idempotent() {
        let db = open_test_db();
        db.init().expect("second init");
        assert_eq!(db.affiliation_count().unwrap(), 0);
    }

    #[test]
    fn test_get_or_create_party_reuses_existing() {
        let db = open_test_db();
        let first = db.get_or_create_party("PT", "PARTIDO DOS TRABALHADORES").unwrap();
        let second = db.get_or_create_party("PT", "ANOTHER NAME").unwrap();
        assert_eq!(first, second);
        assert_eq!(second.name, "PARTIDO DOS TRABALHADORES");
        assert_eq!(db.party_count().unwrap(), 1);
    }

    #[test]
    fn test_get_or_create_city() {
        let db = open_test_db();
        let city = db.get_or_create_city("71072", "SAO PAULO", "SP").unwrap();
        assert_eq!(city.code, "71072");
        assert_eq!(city.state, "SP");
        let other = db.get_or_create_city("60011", "RIO DE JANEIRO", "RJ").unwrap();
        assert_ne!(city.id, other.id);
        assert_eq!(db.city_count().unwrap(), 2);
    }

    #[test]
    fn test_insert_and_get_affiliation() {
        let db = open_test_db();
        let party = db.get_or_create_party("PT", "PARTIDO DOS TRABALHADORES").unwrap();
        let city = db.get_or_create_city("71072", "SAO PAULO", "SP").unwrap();
        let new = make_test_affiliation(party.id, city.id, "0123456789");

        let id = db.insert_affiliation(&new).unwrap();
        let stored = db.get_affiliation(id).unwrap().expect("stored affiliation");

        assert_eq!(stored.name, new.name);
        assert_eq!(stored.started_in, new.started_in);
        assert_eq!(stored.status, Some(AffiliationStatus::Regular));
        assert_eq!(stored.electoral_section.as_deref(), Some("0112"));
        assert_eq!(stored.regularized_in, Some(date(2001, 10, 5)));
    }

    #[test]
    fn test_get_affiliation_missing() {
        let db = open_test_db();
        assert!(db.get_affiliation(42).unwrap().is_none());
    }

    #[test]
    fn test_find_affiliations_orders_by_id() {
        let db = open_test_db();
        let party = db.get_or_create_party("PT", "PARTIDO DOS TRABALHADORES").unwrap();
        let city = db.get_or_create_city("71072", "SAO PAULO", "SP").unwrap();
        let new = make_test_affiliation(party.id, city.id, "0123456789");
        let first = db.insert_affiliation(&new).unwrap();
        let second = db.insert_affiliation(&new).unwrap();

        let found = db.find_affiliations(&key_for(&new), 2).unwrap();
        let ids: Vec<i64> = found.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![first, second]);

        let limited = db.find_affiliations(&key_for(&new), 1).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, first);
    }

    #[test]
    fn test_find_affiliations_name_clause() {
        let db = open_test_db();
        let party = db.get_or_create_party("PT", "PARTIDO DOS TRABALHADORES").unwrap();
        let city = db.get_or_create_city("71072", "SAO PAULO", "SP").unwrap();
        let new = make_test_affiliation(party.id, city.id, "012345678901");
        db.insert_affiliation(&new).unwrap();

        let mut key = key_for(&new);
        key.name = Some("SOMEONE ELSE".to_string());
        assert!(db.find_affiliations(&key, 2).unwrap().is_empty());

        key.name = Some(new.name.clone());
        assert_eq!(db.find_affiliations(&key, 2).unwrap().len(), 1);
    }

    #[test]
    fn test_find_affiliations_other_start_date() {
        let db = open_test_db();
        let party = db.get_or_create_party("PT", "PARTIDO DOS TRABALHADORES").unwrap();
        let city = db.get_or_create_city("71072", "SAO PAULO", "SP").unwrap();
        let new = make_test_affiliation(party.id, city.id, "0123456789");
        db.insert_affiliation(&new).unwrap();

        let mut key = key_for(&new);
        key.started_in = date(2010, 1, 1);
        assert!(db.find_affiliations(&key, 2).unwrap().is_empty());
    }

    #[test]
    fn test_update_affiliation_fields_writes_only_listed_columns() {
        let db = open_test_db();
        let party = db.get_or_create_party("PT", "PARTIDO DOS TRABALHADORES").unwrap();
        let city = db.get_or_create_city("71072", "SAO PAULO", "SP").unwrap();
        let id = db
            .insert_affiliation(&make_test_affiliation(party.id, city.id, "0123456789"))
            .unwrap();

        let mut local = db.get_affiliation(id).unwrap().unwrap();
        local.status = Some(AffiliationStatus::Canceled);
        // Changed in memory but not listed, so it must not reach the database.
        local.cancel_reason = "NOT LISTED".to_string();

        let written = db
            .update_affiliation_fields(&local, &[AffiliationField::Status])
            .unwrap();
        assert_eq!(written, 1);

        let stored = db.get_affiliation(id).unwrap().unwrap();
        assert_eq!(stored.status, Some(AffiliationStatus::Canceled));
        assert_eq!(stored.cancel_reason, "");
    }

    #[test]
    fn test_update_affiliation_fields_empty_is_noop() {
        let db = open_test_db();
        let party = db.get_or_create_party("PT", "PARTIDO DOS TRABALHADORES").unwrap();
        let city = db.get_or_create_city("71072", "SAO PAULO", "SP").unwrap();
        let id = db
            .insert_affiliation(&make_test_affiliation(party.id, city.id, "0123456789"))
            .unwrap();
        let local = db.get_affiliation(id).unwrap().unwrap();
        assert_eq!(db.update_affiliation_fields(&local, &[]).unwrap(), 0);
    }

    #[test]
    fn test_update_affiliation_fields_sets_null() {
        let db = open_test_db();
        let party = db.get_or_create_party("PT", "PARTIDO DOS TRABALHADORES").unwrap();
        let city = db.get_or_create_city("71072", "SAO PAULO", "SP").unwrap();
        let id = db
            .insert_affiliation(&make_test_affiliation(party.id, city.id, "0123456789"))
            .unwrap();

        let mut local = db.get_affiliation(id).unwrap().unwrap();
        local.status = None;
        local.processed_in = None;
        db.update_affiliation_fields(
            &local,
            &[AffiliationField::Status, AffiliationField::ProcessedIn],
        )
        .unwrap();

        let stored = db.get_affiliation(id).unwrap().unwrap();
        assert_eq!(stored.status, None);
        assert_eq!(stored.processed_in, None);
        assert_eq!(stored.regularized_in, Some(date(2001, 10, 5)));
    }

    #[test]
    fn test_unknown_status_code_is_error() {
        let db = open_test_db();
        let party = db.get_or_create_party("PT", "PARTIDO DOS TRABALHADORES").unwrap();
        let city = db.get_or_create_city("71072", "SAO PAULO", "SP").unwrap();
        let id = db
            .insert_affiliation(&make_test_affiliation(party.id, city.id, "0123456789"))
            .unwrap();
        db.conn
            .execute(
                "UPDATE affiliations SET status = 'Z' WHERE affiliation_id = ?1",
                params![id],
            )
            .unwrap();

        let err = db.get_affiliation(id).unwrap_err();
        assert!(matches!(err, DbError::UnknownStatus(ref code) if code == "Z"));
    }

    // --- query_affiliations ---

    fn setup_test_db_with_affiliations() -> Db {
        let db = open_test_db();
        let pt = db.get_or_create_party("PT", "PARTIDO DOS TRABALHADORES").unwrap();
        let psdb = db
            .get_or_create_party("PSDB", "PARTIDO DA SOCIAL DEMOCRACIA BRASILEIRA")
            .unwrap();
        let sp = db.get_or_create_city("71072", "SAO PAULO", "SP").unwrap();
        let rj = db.get_or_create_city("60011", "RIO DE JANEIRO", "RJ").unwrap();

        db.insert_affiliation(&make_test_affiliation(pt.id, sp.id, "0000000001"))
            .unwrap();
        let mut canceled = make_test_affiliation(psdb.id, rj.id, "0000000002");
        canceled.status = Some(AffiliationStatus::Canceled);
        canceled.started_in = date(2011, 4, 2);
        db.insert_affiliation(&canceled).unwrap();
        db.insert_affiliation(&make_test_affiliation(psdb.id, sp.id, "0000000001"))
            .unwrap();
        db
    }

    #[test]
    fn test_query_affiliations_no_filter() {
        let db = setup_test_db_with_affiliations();
        let rows = db.query_affiliations(&DbAffiliationFilter::default()).unwrap();
        assert_eq!(rows.len(), 3);
        // Most recent start date first
        assert_eq!(rows[0].voter_id, "0000000002");
        assert_eq!(rows[0].city, "RIO DE JANEIRO");
        assert_eq!(rows[0].status.as_deref(), Some("Cancelado"));
    }

    #[test]
    fn test_query_affiliations_filter_voter_id() {
        let db = setup_test_db_with_affiliations();
        let filter = DbAffiliationFilter {
            voter_id: Some("0000000001".to_string()),
            ..Default::default()
        };
        let rows = db.query_affiliations(&filter).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_query_affiliations_filter_party_case_insensitive() {
        let db = setup_test_db_with_affiliations();
        let filter = DbAffiliationFilter {
            party: Some("psdb".to_string()),
            ..Default::default()
        };
        let rows = db.query_affiliations(&filter).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.party == "PSDB"));
    }

    #[test]
    fn test_query_affiliations_combined_filters() {
        let db = setup_test_db_with_affiliations();
        let filter = DbAffiliationFilter {
            city_code: Some("71072".to_string()),
            status: Some(AffiliationStatus::Regular),
            limit: Some(1),
            ..Default::default()
        };
        let rows = db.query_affiliations(&filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state, "SP");
    }
}
