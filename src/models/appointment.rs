//! Appointment model
//!
//! A scheduled or completed pantry visit. `pounds` stays empty until the
//! visit has happened.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::statement::{InsertStatement, StatementBuilder};

/// A client visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Primary key
    pub appointment_id: i64,

    /// Client this appointment belongs to
    pub client_id: i64,

    /// Scheduled date and time
    pub date: NaiveDateTime,

    /// Pounds of food received
    #[serde(default)]
    pub pounds: Option<i64>,
}

impl Appointment {
    /// Whether the visit has been completed
    pub fn is_completed(&self) -> bool {
        self.pounds.is_some()
    }
}

impl InsertStatement for Appointment {
    fn as_insert_statement(&self) -> String {
        StatementBuilder::new("appointment")
            .int("appointment_id", self.appointment_id)
            .int("client_id", self.client_id)
            .timestamp("date", self.date)
            .opt_int("pounds", self.pounds)
            .finish()
    }
}
