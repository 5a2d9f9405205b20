//! SQLite schema definition.

/// Reference database schema.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Medicine reference table
-- ============================================================================

CREATE TABLE IF NOT EXISTS medicines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,      -- preserves dataset row order
    name TEXT NOT NULL,                        -- normalized, not unique
    description TEXT,
    side_effects TEXT
);

CREATE INDEX IF NOT EXISTS idx_medicines_name ON medicines(name);
"#;
