//! Storage initialization
//!
//! Handles first-run setup: directories and empty record files.

use crate::config::paths::PantryPaths;
use crate::error::PantryError;
use crate::models::{Appointment, Client, Collection, HouseholdMember};

use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Creates the data directory and an empty record file for every collection
/// that does not have one yet. Existing files are left untouched.
pub fn initialize_storage(paths: &PantryPaths) -> Result<Vec<Collection>, PantryError> {
    paths.ensure_directories()?;

    let mut created = Vec::new();
    for collection in Collection::ALL {
        let path = paths.records_file(collection);
        if path.exists() {
            continue;
        }
        match collection {
            Collection::Clients => write_json_atomic(&path, &Vec::<Client>::new())?,
            Collection::Appointments => write_json_atomic(&path, &Vec::<Appointment>::new())?,
            Collection::Households => write_json_atomic(&path, &Vec::<HouseholdMember>::new())?,
        }
        created.push(collection);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_record_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PantryPaths::with_base_dir(temp_dir.path().to_path_buf());

        let created = initialize_storage(&paths).unwrap();
        assert_eq!(created, Collection::ALL.to_vec());
        for collection in Collection::ALL {
            let contents = std::fs::read_to_string(paths.records_file(collection)).unwrap();
            assert_eq!(contents.trim(), "[]");
        }
    }

    #[test]
    fn test_initialize_keeps_existing_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PantryPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.records_file(Collection::Clients), "[ ]").unwrap();

        let created = initialize_storage(&paths).unwrap();
        assert_eq!(created, vec![Collection::Appointments, Collection::Households]);
        let contents = std::fs::read_to_string(paths.records_file(Collection::Clients)).unwrap();
        assert_eq!(contents, "[ ]");
    }
}
