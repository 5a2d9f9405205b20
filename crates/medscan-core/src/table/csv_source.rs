//! CSV dataset reader.

use std::io::Read;
use std::path::Path;

use super::{ReferenceTable, TableError, TableResult};
use crate::models::MedicineRecord;

/// Header of the medicine name column.
pub const NAME_COLUMN: &str = "Name of medicine";
/// Header of the description column (optional).
pub const DESCRIPTION_COLUMN: &str = "Full Description";
/// Header of the side effects column (optional).
pub const SIDE_EFFECTS_COLUMN: &str = "Side Effects";

/// Column positions resolved from the header row.
struct Columns {
    name: usize,
    description: Option<usize>,
    side_effects: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> TableResult<Self> {
        let position = |wanted: &str| headers.iter().position(|h| h.trim() == wanted);

        Ok(Self {
            name: position(NAME_COLUMN)
                .ok_or_else(|| TableError::MissingColumn(NAME_COLUMN.to_string()))?,
            description: position(DESCRIPTION_COLUMN),
            side_effects: position(SIDE_EFFECTS_COLUMN),
        })
    }

    fn record(&self, row: &csv::StringRecord) -> MedicineRecord {
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(str::to_string);
        MedicineRecord::new(
            row.get(self.name).unwrap_or(""),
            field(self.description),
            field(self.side_effects),
        )
    }
}

impl ReferenceTable {
    /// Load a table from a CSV file with a header row.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> TableResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Load a table from any CSV source with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> TableResult<Self> {
        Ok(Self::from_records(read_csv_records(reader)?))
    }
}

/// Parse CSV rows into records, in file order.
pub fn read_csv_records<R: Read>(reader: R) -> TableResult<Vec<MedicineRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let columns = Columns::from_headers(reader.headers()?)?;

    let mut records = Vec::new();
    for row in reader.records() {
        records.push(columns.record(&row?));
    }
    Ok(records)
}
