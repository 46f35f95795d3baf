//! Party and city lookups shared by import commands.

use std::collections::HashMap;

use crate::db::{Db, DbError};
use crate::models::{City, Party};

/// Memoises get-or-create lookups for the lifetime of one import run.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    parties: HashMap<String, Party>,
    cities: HashMap<String, City>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a party by abbreviation, creating it on first sight.
    pub fn get_party(&mut self, db: &Db, abbreviation: &str, name: &str) -> Result<Party, DbError> {
        if let Some(party) = self.parties.get(abbreviation) {
            return Ok(party.clone());
        }
        let party = db.get_or_create_party(abbreviation, name)?;
        self.parties.insert(abbreviation.to_string(), party.clone());
        Ok(party)
    }

    /// Resolve a city by electoral court code, creating it on first sight.
    pub fn get_city(&mut self, db: &Db, code: &str, name: &str, state: &str) -> Result<City, DbError> {
        if let Some(city) = self.cities.get(code) {
            return Ok(city.clone());
        }
        let city = db.get_or_create_city(code, name, state)?;
        self.cities.insert(code.to_string(), city.clone());
        Ok(city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_db() -> Db {
        let db = Db::open_in_memory().expect("open in-memory db");
        db.init().expect("init schema");
        db
    }

    #[test]
    fn test_get_party_cached() {
        let db = open_test_db();
        let mut cache = ReferenceCache::new();
        let first = cache.get_party(&db, "PT", "PARTIDO DOS TRABALHADORES").unwrap();

        // A row removed behind the cache's back is still served from memory.
        db.conn().execute("DELETE FROM parties", []).unwrap();
        let second = cache.get_party(&db, "PT", "PARTIDO DOS TRABALHADORES").unwrap();
        assert_eq!(first, second);
        assert_eq!(db.party_count().unwrap(), 0);
    }

    #[test]
    fn test_get_city_creates_once() {
        let db = open_test_db();
        let mut cache = ReferenceCache::new();
        cache.get_city(&db, "71072", "SAO PAULO", "SP").unwrap();
        cache.get_city(&db, "71072", "SAO PAULO", "SP").unwrap();
        cache.get_city(&db, "60011", "RIO DE JANEIRO", "RJ").unwrap();
        assert_eq!(db.city_count().unwrap(), 2);
    }

    #[test]
    fn test_get_party_reuses_rows_from_previous_runs() {
        let db = open_test_db();
        let existing = db.get_or_create_party("MDB", "MOVIMENTO DEMOCRATICO BRASILEIRO").unwrap();
        let mut cache = ReferenceCache::new();
        let party = cache.get_party(&db, "MDB", "MDB").unwrap();
        assert_eq!(party.id, existing.id);
        assert_eq!(party.name, "MOVIMENTO DEMOCRATICO BRASILEIRO");
    }
}
