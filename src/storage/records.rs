//! Record sources a backup reads from
//!
//! The backup only needs "fetch every record of a collection in a stable
//! order" and "close the connection". `RecordSource` is that seam; the
//! JSON-file implementation below backs the command-line tools.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::config::paths::PantryPaths;
use crate::error::{PantryError, PantryResult};
use crate::models::{Appointment, Client, Collection, HouseholdMember};

use super::file_io::read_json;

/// Data connection owned by a backup run for its whole duration
pub trait RecordSource: Send {
    /// All clients, ordered by primary key
    fn clients(&mut self) -> PantryResult<Vec<Client>>;

    /// All appointments, ordered by primary key
    fn appointments(&mut self) -> PantryResult<Vec<Appointment>>;

    /// All household members, ordered by primary key
    fn household_members(&mut self) -> PantryResult<Vec<HouseholdMember>>;

    /// Release the connection; later fetches fail
    fn close(&mut self) -> PantryResult<()>;
}

/// Record source reading the JSON record files under the data directory
#[derive(Debug)]
pub struct JsonRecordSource {
    paths: PantryPaths,
    open: bool,
}

impl JsonRecordSource {
    /// Open a source over the given paths
    pub fn open(paths: PantryPaths) -> PantryResult<Self> {
        if !paths.data_dir().is_dir() {
            return Err(PantryError::Config(format!(
                "Data directory {} does not exist; run `pantry-backup init` first",
                paths.data_dir().display()
            )));
        }
        Ok(Self { paths, open: true })
    }

    /// Whether `close` has not been called yet
    pub fn is_open(&self) -> bool {
        self.open
    }

    fn load<T>(&self, collection: Collection) -> PantryResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        if !self.open {
            return Err(PantryError::fetch(
                collection.noun(),
                "the data connection is closed",
            ));
        }
        load_records(&self.paths.records_file(collection))
            .map_err(|e| PantryError::fetch(collection.noun(), e.to_string()))
    }
}

fn load_records<T: DeserializeOwned>(path: &Path) -> PantryResult<Vec<T>> {
    read_json::<Vec<T>, _>(path)
}

impl RecordSource for JsonRecordSource {
    fn clients(&mut self) -> PantryResult<Vec<Client>> {
        let mut records: Vec<Client> = self.load(Collection::Clients)?;
        records.sort_by_key(|c| c.client_id);
        Ok(records)
    }

    fn appointments(&mut self) -> PantryResult<Vec<Appointment>> {
        let mut records: Vec<Appointment> = self.load(Collection::Appointments)?;
        records.sort_by_key(|a| a.appointment_id);
        Ok(records)
    }

    fn household_members(&mut self) -> PantryResult<Vec<HouseholdMember>> {
        let mut records: Vec<HouseholdMember> = self.load(Collection::Households)?;
        records.sort_by_key(|h| h.household_member_id);
        Ok(records)
    }

    fn close(&mut self) -> PantryResult<()> {
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::file_io::write_json_atomic;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_source() -> (JsonRecordSource, PantryPaths, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PantryPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        let source = JsonRecordSource::open(paths.clone()).unwrap();
        (source, paths, temp_dir)
    }

    fn appointment(id: i64) -> Appointment {
        Appointment {
            appointment_id: id,
            client_id: 1,
            date: NaiveDate::from_ymd_opt(2015, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            pounds: None,
        }
    }

    #[test]
    fn test_missing_files_are_empty_collections() {
        let (mut source, _paths, _temp) = create_test_source();
        assert!(source.clients().unwrap().is_empty());
        assert!(source.household_members().unwrap().is_empty());
    }

    #[test]
    fn test_records_sorted_by_key() {
        let (mut source, paths, _temp) = create_test_source();
        let records = vec![appointment(5), appointment(2), appointment(9)];
        write_json_atomic(paths.records_file(Collection::Appointments), &records).unwrap();

        let ids: Vec<i64> = source
            .appointments()
            .unwrap()
            .iter()
            .map(|a| a.appointment_id)
            .collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_closed_source_fails() {
        let (mut source, _paths, _temp) = create_test_source();
        source.close().unwrap();
        assert!(!source.is_open());

        let err = source.clients().unwrap_err();
        assert!(matches!(
            err,
            PantryError::RecordFetch {
                collection: "client",
                ..
            }
        ));
    }

    #[test]
    fn test_corrupt_file_is_fetch_error() {
        let (mut source, paths, _temp) = create_test_source();
        std::fs::write(paths.records_file(Collection::Households), "{oops").unwrap();

        let err = source.household_members().unwrap_err();
        assert!(matches!(err, PantryError::RecordFetch { .. }));
    }

    #[test]
    fn test_open_requires_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PantryPaths::with_base_dir(temp_dir.path().join("missing"));
        assert!(JsonRecordSource::open(paths).is_err());
    }
}
