//! Reference dataset models.

use serde::{Deserialize, Serialize};

use crate::resolver::normalize_name;

/// Fallback text when a record carries no description.
pub const NO_DESCRIPTION: &str = "No description available";

/// Fallback text when a record carries no side effects.
pub const NO_SIDE_EFFECTS: &str = "No side effects listed";

/// A single row of the medicine reference dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineRecord {
    /// Normalized medicine name (lowercase, trimmed). Not unique across the table.
    pub name: String,
    /// Full description of the medicine
    pub description: Option<String>,
    /// Known side effects
    pub side_effects: Option<String>,
}

impl MedicineRecord {
    /// Create a record, normalizing the name and dropping blank text fields.
    pub fn new(name: &str, description: Option<String>, side_effects: Option<String>) -> Self {
        Self {
            name: normalize_name(name),
            description: non_blank(description),
            side_effects: non_blank(side_effects),
        }
    }

    /// Description, or the standard fallback text.
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION)
    }

    /// Side effects, or the standard fallback text.
    pub fn side_effects_or_default(&self) -> &str {
        self.side_effects.as_deref().unwrap_or(NO_SIDE_EFFECTS)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
