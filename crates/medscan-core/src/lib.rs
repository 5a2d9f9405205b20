//! MedScan Core Library
//!
//! Resolves the text read off a medicine package to a row of a reference
//! dataset.
//!
//! # Architecture
//!
//! ```text
//! Photo → OCR → Entity extraction ─┐
//!          │                       │ candidate name (optional)
//!          └── extracted text ─────┤
//!                                  ▼
//!                              Resolver ── ReferenceTable (read-only)
//!                                  │
//!            ┌─────────────┬───────┴───────┬──────────────────┐
//!            ▼             ▼               ▼                  ▼
//!          exact       substring      fuzzy(candidate)   fuzzy(full text)
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (MedicineRecord, MatchTier, ResolutionResult)
//! - [`table`]: The immutable reference table and its CSV reader
//! - [`db`]: SQLite storage for reference datasets
//! - [`resolver`]: Normalization, token-sort fuzzy matching and the fallback chain

pub mod db;
pub mod models;
pub mod resolver;
pub mod table;

// Re-export commonly used types
pub use db::{Database, DbError};
pub use models::{MatchTier, MedicineRecord, ResolutionResult, ResolvedMedicine};
pub use resolver::{FuzzyMatcher, Resolver, FUZZY_ACCEPT_THRESHOLD};
pub use table::{read_csv_records, ReferenceTable, TableError};
