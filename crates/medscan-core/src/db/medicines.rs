//! Medicine table operations.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::MedicineRecord;

impl Database {
    /// Append many rows in one transaction, keeping their order.
    pub fn import_medicines(&mut self, records: &[MedicineRecord]) -> DbResult<usize> {
        let tx = self.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO medicines (name, description, side_effects) VALUES (?1, ?2, ?3)",
            )?;
            for record in records {
                stmt.execute(params![record.name, record.description, record.side_effects])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// All medicines in insertion order.
    ///
    /// Names are re-normalized on the way out, since rows may have been
    /// written by other tools.
    pub fn list_medicines(&self) -> DbResult<Vec<MedicineRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, description, side_effects FROM medicines ORDER BY id")?;
        let rows = stmt.query_map([], row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Number of stored medicine rows.
    pub fn count_medicines(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM medicines", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MedicineRecord> {
    let name: String = row.get(0)?;
    Ok(MedicineRecord::new(&name, row.get(1)?, row.get(2)?))
}
