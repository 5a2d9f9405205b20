//! Resolution outcome models.

use serde::{Deserialize, Serialize};

use super::MedicineRecord;

/// Which fallback stage produced a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MatchTier {
    /// Extracted entity equals a table name
    ExactMed7,
    /// Extracted entity is contained in a table name
    PartialMed7,
    /// Extracted entity matched a table name fuzzily
    FuzzyAfterMed7Fail,
    /// No entity extracted; the whole OCR text matched a table name fuzzily
    FuzzyNoEntity,
}

impl MatchTier {
    /// Stable label reported to clients as `match_type`.
    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::ExactMed7 => "Med7 direct match",
            MatchTier::PartialMed7 => "Partial match using Med7 token",
            MatchTier::FuzzyAfterMed7Fail => "Fuzzy match after Med7 fail",
            MatchTier::FuzzyNoEntity => "Fuzzy match (Med7 not detected)",
        }
    }

    /// Whether this tier was decided by the fuzzy matcher.
    pub fn is_fuzzy(&self) -> bool {
        matches!(self, MatchTier::FuzzyAfterMed7Fail | MatchTier::FuzzyNoEntity)
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A successful resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedMedicine {
    /// Matched table name
    pub name: String,
    /// First table row carrying the matched name
    pub record: MedicineRecord,
    /// Stage that produced the match
    pub tier: MatchTier,
    /// Fuzzy score (0-100), present for fuzzy tiers only
    pub score: Option<u8>,
}

/// Outcome of resolving one scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ResolutionResult {
    Resolved(ResolvedMedicine),
    Unresolved,
}

impl ResolutionResult {
    /// The resolved medicine, if any.
    pub fn resolved(&self) -> Option<&ResolvedMedicine> {
        match self {
            ResolutionResult::Resolved(medicine) => Some(medicine),
            ResolutionResult::Unresolved => None,
        }
    }

    /// The tier that matched, if any.
    pub fn tier(&self) -> Option<MatchTier> {
        self.resolved().map(|m| m.tier)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionResult::Resolved(_))
    }
}
