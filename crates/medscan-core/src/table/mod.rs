//! Immutable medicine reference table.
//!
//! Loaded once at startup and shared read-only. Row order is significant:
//! duplicate names resolve to the first row, and substring and fuzzy ties
//! resolve to the earliest name.

mod csv_source;

pub use csv_source::*;

use std::collections::HashMap;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::MedicineRecord;
use crate::resolver::token_sort_key;

/// Reference table errors.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),
}

pub type TableResult<T> = Result<T, TableError>;

/// A distinct name with its first row and precomputed token-sort key.
#[derive(Debug, Clone)]
struct NameEntry {
    row: usize,
    sort_key: String,
}

/// Ordered, read-only table of medicine records.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    records: Vec<MedicineRecord>,
    /// Normalized name → first row carrying it
    first_by_name: HashMap<String, usize>,
    /// Distinct names in first-appearance order
    names: Vec<NameEntry>,
    fingerprint: String,
    skipped_rows: usize,
}

impl ReferenceTable {
    /// Build a table from records in order. Records with an empty name are skipped.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MedicineRecord>,
    {
        let mut table = Self::default();
        let mut hasher = Sha256::new();

        for record in records {
            if record.name.is_empty() {
                table.skipped_rows += 1;
                continue;
            }

            hasher.update(record.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(record.description.as_deref().unwrap_or("").as_bytes());
            hasher.update([0u8]);
            hasher.update(record.side_effects.as_deref().unwrap_or("").as_bytes());
            hasher.update([b'\n']);

            let row = table.records.len();
            if !table.first_by_name.contains_key(&record.name) {
                table.first_by_name.insert(record.name.clone(), row);
                table.names.push(NameEntry {
                    row,
                    sort_key: token_sort_key(&record.name),
                });
            }
            table.records.push(record);
        }

        table.fingerprint = hex::encode(hasher.finalize());
        table
    }

    /// Load a dataset, choosing the reader by file extension.
    ///
    /// `.csv` files are parsed directly; `.db`, `.sqlite` and `.sqlite3` files
    /// are read from the `medicines` table.
    pub fn load<P: AsRef<Path>>(path: P) -> TableResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let table = match extension.as_str() {
            "csv" => Self::from_csv_path(path)?,
            "db" | "sqlite" | "sqlite3" => {
                let db = Database::open_read_only(path)?;
                Self::from_database(&db)?
            }
            other => return Err(TableError::UnsupportedFormat(other.to_string())),
        };

        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            distinct_names = table.distinct_names(),
            skipped_rows = table.skipped_rows(),
            sha256 = %table.fingerprint(),
            "Loaded medicine reference table"
        );

        Ok(table)
    }

    /// Read every record from a reference database, in insertion order.
    pub fn from_database(db: &Database) -> TableResult<Self> {
        Ok(Self::from_records(db.list_medicines()?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in table order.
    pub fn records(&self) -> &[MedicineRecord] {
        &self.records
    }

    /// Number of distinct normalized names.
    pub fn distinct_names(&self) -> usize {
        self.names.len()
    }

    /// Rows dropped at load time because their name was empty.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Hex SHA-256 over the loaded rows, in order.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// First record whose name equals an already-normalized name.
    pub fn find_exact(&self, name: &str) -> Option<&MedicineRecord> {
        self.first_by_name.get(name).map(|&row| &self.records[row])
    }

    /// First record whose name contains an already-normalized fragment.
    pub fn find_containing(&self, fragment: &str) -> Option<&MedicineRecord> {
        self.records.iter().find(|r| r.name.contains(fragment))
    }

    /// Distinct names with their token-sort keys, in first-appearance order.
    pub fn fuzzy_candidates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .map(|entry| (self.records[entry.row].name.as_str(), entry.sort_key.as_str()))
    }
}
