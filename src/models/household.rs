//! Household member model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::statement::{InsertStatement, StatementBuilder};

/// A person living in a client's household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdMember {
    /// Primary key
    pub household_member_id: i64,

    /// Client this member belongs to
    pub client_id: i64,

    pub name: String,

    #[serde(default)]
    pub birthday: Option<NaiveDate>,

    pub gender: String,

    /// Relationship to the client
    pub relationship: String,
}

impl InsertStatement for HouseholdMember {
    fn as_insert_statement(&self) -> String {
        StatementBuilder::new("household")
            .int("client_id", self.client_id)
            .int("household_member_id", self.household_member_id)
            .text("name", &self.name)
            .opt_date("birthday", self.birthday)
            .text("gender", &self.gender)
            .text("relationship", &self.relationship)
            .finish()
    }
}

impl fmt::Display for HouseholdMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.relationship)
    }
}
