//! Client model
//!
//! A registered pantry client. Optional fields are rendered as `NULL` in the
//! backup statement.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::statement::{InsertStatement, StatementBuilder};

/// A pantry client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Primary key
    pub client_id: i64,

    pub first_name: String,

    pub last_name: String,

    /// Social security number ("Withheld" when not provided)
    pub ssn: String,

    #[serde(default)]
    pub birthday: Option<NaiveDate>,

    pub address: String,

    pub city: String,

    #[serde(default)]
    pub telephone: Option<String>,

    pub gender: String,

    /// Free-form notes (at most 256 characters)
    #[serde(default)]
    pub notes: Option<String>,

    /// When this record was last updated
    pub valid_as_of: NaiveDateTime,
}

impl InsertStatement for Client {
    fn as_insert_statement(&self) -> String {
        StatementBuilder::new("client")
            .int("client_id", self.client_id)
            .text("first_name", &self.first_name)
            .text("last_name", &self.last_name)
            .text("ssn", &self.ssn)
            .text("address", &self.address)
            .text("city", &self.city)
            .opt_text("telephone", self.telephone.as_deref())
            .text("gender", &self.gender)
            .timestamp("valid_as_of", self.valid_as_of)
            .opt_date("birthday", self.birthday)
            .opt_text("notes", self.notes.as_deref())
            .finish()
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}
