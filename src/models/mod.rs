//! Record models for the pantry dataset
//!
//! These are the three collections that make up a full backup: clients,
//! their appointments, and household members. Each record renders itself as
//! one canonical `INSERT` statement line.

pub mod appointment;
pub mod client;
pub mod collection;
pub mod household;
pub mod statement;

pub use appointment::Appointment;
pub use client::Client;
pub use collection::Collection;
pub use household::HouseholdMember;
pub use statement::{InsertStatement, StatementBuilder};
