//! Domain types for party affiliation records.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Registration status of an affiliation, stored as a one-letter code.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffiliationStatus {
    #[serde(rename = "R")]
    Regular,
    #[serde(rename = "C")]
    Canceled,
    #[serde(rename = "D")]
    Disaffiliated,
    #[serde(rename = "S")]
    SubJudice,
}

impl AffiliationStatus {
    pub const ALL: [AffiliationStatus; 4] = [
        AffiliationStatus::Regular,
        AffiliationStatus::Canceled,
        AffiliationStatus::Disaffiliated,
        AffiliationStatus::SubJudice,
    ];

    /// Code persisted in the `status` column.
    pub fn code(self) -> &'static str {
        match self {
            AffiliationStatus::Regular => "R",
            AffiliationStatus::Canceled => "C",
            AffiliationStatus::Disaffiliated => "D",
            AffiliationStatus::SubJudice => "S",
        }
    }

    /// Human-readable label, as published in the source dataset.
    pub fn label(self) -> &'static str {
        match self {
            AffiliationStatus::Regular => "Regular",
            AffiliationStatus::Canceled => "Cancelado",
            AffiliationStatus::Disaffiliated => "Desfiliado",
            AffiliationStatus::SubJudice => "Sub judice",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Map raw dataset text (e.g. `"CANCELADO"`, `"sub judice"`) to a status.
    ///
    /// Unknown text yields `None`, which is stored as a null status.
    pub fn from_text(text: &str) -> Option<Self> {
        STATUS_LOOKUP.get(&normalize_status_key(text)).copied()
    }
}

impl std::fmt::Display for AffiliationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Reverse lookup from normalized label to status, built once per process.
static STATUS_LOOKUP: LazyLock<HashMap<String, AffiliationStatus>> = LazyLock::new(|| {
    AffiliationStatus::ALL
        .into_iter()
        .map(|status| (normalize_status_key(status.label()), status))
        .collect()
});

/// Upper-case and replace spaces with underscores.
pub fn normalize_status_key(text: &str) -> String {
    text.to_uppercase().replace(' ', "_")
}

/// A political party, keyed by its abbreviation (e.g. `PT`, `MDB`).
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Party {
    pub id: i64,
    pub abbreviation: String,
    pub name: String,
}

/// A municipality, keyed by its electoral court code.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct City {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub state: String,
}

/// The six fields an import may change on an existing affiliation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusFields {
    pub status: Option<AffiliationStatus>,
    pub canceled_in: Option<NaiveDate>,
    pub cancel_reason: String,
    pub ended_in: Option<NaiveDate>,
    pub regularized_in: Option<NaiveDate>,
    pub processed_in: Option<NaiveDate>,
}

/// Columns of an affiliation that the updater can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliationField {
    Status,
    CanceledIn,
    CancelReason,
    EndedIn,
    RegularizedIn,
    ProcessedIn,
}

impl AffiliationField {
    pub fn column(self) -> &'static str {
        match self {
            AffiliationField::Status => "status",
            AffiliationField::CanceledIn => "canceled_in",
            AffiliationField::CancelReason => "cancel_reason",
            AffiliationField::EndedIn => "ended_in",
            AffiliationField::RegularizedIn => "regularized_in",
            AffiliationField::ProcessedIn => "processed_in",
        }
    }
}

impl std::fmt::Display for AffiliationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// A stored affiliation.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Affiliation {
    pub id: i64,
    pub name: String,
    pub voter_id: String,
    pub party_id: i64,
    pub city_id: i64,
    pub started_in: NaiveDate,
    pub electoral_section: Option<String>,
    pub electoral_zone: String,
    pub status: Option<AffiliationStatus>,
    pub canceled_in: Option<NaiveDate>,
    pub cancel_reason: String,
    pub ended_in: Option<NaiveDate>,
    pub regularized_in: Option<NaiveDate>,
    pub processed_in: Option<NaiveDate>,
}

impl Affiliation {
    /// Assign every field of `fields` that differs from the current value.
    ///
    /// Returns the touched fields in column order; an empty vec means the
    /// record already matched.
    pub fn apply(&mut self, fields: StatusFields) -> Vec<AffiliationField> {
        let mut touched = Vec::new();
        if self.status != fields.status {
            self.status = fields.status;
            touched.push(AffiliationField::Status);
        }
        if self.canceled_in != fields.canceled_in {
            self.canceled_in = fields.canceled_in;
            touched.push(AffiliationField::CanceledIn);
        }
        if self.cancel_reason != fields.cancel_reason {
            self.cancel_reason = fields.cancel_reason;
            touched.push(AffiliationField::CancelReason);
        }
        if self.ended_in != fields.ended_in {
            self.ended_in = fields.ended_in;
            touched.push(AffiliationField::EndedIn);
        }
        if self.regularized_in != fields.regularized_in {
            self.regularized_in = fields.regularized_in;
            touched.push(AffiliationField::RegularizedIn);
        }
        if self.processed_in != fields.processed_in {
            self.processed_in = fields.processed_in;
            touched.push(AffiliationField::ProcessedIn);
        }
        touched
    }
}

/// An affiliation that has not been written yet.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewAffiliation {
    pub name: String,
    pub voter_id: String,
    pub party_id: i64,
    pub city_id: i64,
    pub started_in: NaiveDate,
    pub electoral_section: Option<String>,
    pub electoral_zone: String,
    pub status: Option<AffiliationStatus>,
    pub canceled_in: Option<NaiveDate>,
    pub cancel_reason: String,
    pub ended_in: Option<NaiveDate>,
    pub regularized_in: Option<NaiveDate>,
    pub processed_in: Option<NaiveDate>,
}
