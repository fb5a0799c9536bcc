//! The record collections covered by a backup

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three record sets in the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Clients,
    Appointments,
    Households,
}

impl Collection {
    /// Every collection, in the order a backup dumps them
    pub const ALL: [Collection; 3] = [
        Collection::Clients,
        Collection::Appointments,
        Collection::Households,
    ];

    /// Tag used in dump file names
    pub fn file_tag(&self) -> &'static str {
        match self {
            Collection::Clients => "Clients",
            Collection::Appointments => "Appointments",
            Collection::Households => "Households",
        }
    }

    /// Lowercase noun used in progress labels and errors
    pub fn noun(&self) -> &'static str {
        match self {
            Collection::Clients => "client",
            Collection::Appointments => "appointment",
            Collection::Households => "household",
        }
    }

    /// Table the statements insert into
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Clients => "client",
            Collection::Appointments => "appointment",
            Collection::Households => "household",
        }
    }

    /// File name of the JSON record store for this collection
    pub fn records_file_name(&self) -> &'static str {
        match self {
            Collection::Clients => "clients.json",
            Collection::Appointments => "appointments.json",
            Collection::Households => "household.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_tag())
    }
}
