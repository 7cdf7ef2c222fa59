//! File-backed inventory source.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, warn};

use super::csv_parser::parse_inventory;
use super::vehicles_model::VehicleRecord;
use super::vehicles_traits::VehicleSourceTrait;
use crate::errors::{DataSourceError, Result};

/// Loads the inventory from a CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl VehicleSourceTrait for CsvFileSource {
    async fn load(&self) -> Result<Vec<VehicleRecord>> {
        let content = tokio::fs::read(&self.path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                DataSourceError::Missing(self.path.clone())
            } else {
                DataSourceError::Unreadable {
                    path: self.path.clone(),
                    source: e,
                }
            }
        })?;
        debug!("Read {} bytes from {}", content.len(), self.path.display());

        let parsed = parse_inventory(&content)?;
        for warning in &parsed.warnings {
            warn!("{}: {}", self.path.display(), warning.message);
        }
        Ok(parsed.records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "VIN,Year,Make,\"Photo Url List\"").unwrap();
        writeln!(file, "A,2024,Honda,\"a.jpg|b.jpg\"").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "B,2023,Ford").unwrap();

        let source = CsvFileSource::new(file.path());
        let records = source.load().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].photo_url_list, "a.jpg|b.jpg");
        assert_eq!(records[1].make, "Ford");
    }

    #[tokio::test]
    async fn test_missing_file_is_a_data_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvFileSource::new(dir.path().join("absent.csv"));

        let err = source.load().await.unwrap_err();
        assert!(matches!(
            err,
            Error::DataSource(DataSourceError::Missing(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvFileSource::new(dir.path());

        let err = source.load().await.unwrap_err();
        assert!(matches!(err, Error::DataSource(_)));
    }
}
