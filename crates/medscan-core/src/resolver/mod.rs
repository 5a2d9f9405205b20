//! Medicine resolver.
//!
//! Fallback chain, first success wins:
//! 1. Extracted entity equals a table name
//! 2. Extracted entity is a substring of a table name
//! 3. Extracted entity fuzzy-matches a table name
//! 4. No entity: the whole OCR text fuzzy-matches a table name

mod fuzzy;
mod normalizer;

pub use fuzzy::*;
pub use normalizer::*;

use crate::models::{MatchTier, MedicineRecord, ResolutionResult, ResolvedMedicine};
use crate::table::ReferenceTable;

/// A fuzzy match is accepted only when its score is strictly above this.
pub const FUZZY_ACCEPT_THRESHOLD: u8 = 60;

/// Resolves scanned text against a reference table.
pub struct Resolver<'a> {
    table: &'a ReferenceTable,
    matcher: FuzzyMatcher,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a loaded table.
    pub fn new(table: &'a ReferenceTable) -> Self {
        Self {
            table,
            matcher: FuzzyMatcher::new(),
        }
    }

    /// Resolve OCR text plus an optional extracted drug name.
    ///
    /// A blank candidate counts as absent.
    pub fn resolve(&self, extracted_text: &str, candidate_name: Option<&str>) -> ResolutionResult {
        match normalize_candidate(candidate_name) {
            Some(candidate) => self.resolve_candidate(&candidate),
            None => {
                tracing::debug!("No entity extracted, fuzzy matching full text");
                self.resolve_fuzzy(extracted_text, MatchTier::FuzzyNoEntity)
            }
        }
    }

    fn resolve_candidate(&self, candidate: &str) -> ResolutionResult {
        if let Some(record) = self.table.find_exact(candidate) {
            tracing::debug!(candidate, "Exact match");
            return resolved(record, MatchTier::ExactMed7, None);
        }

        tracing::debug!(candidate, "No exact match, trying substring");
        if let Some(record) = self.table.find_containing(candidate) {
            return resolved(record, MatchTier::PartialMed7, None);
        }

        tracing::debug!(candidate, "No substring match, trying fuzzy");
        self.resolve_fuzzy(candidate, MatchTier::FuzzyAfterMed7Fail)
    }

    fn resolve_fuzzy(&self, query: &str, tier: MatchTier) -> ResolutionResult {
        let Some(best) = self
            .matcher
            .best_match_keyed(query, self.table.fuzzy_candidates())
        else {
            return ResolutionResult::Unresolved;
        };

        tracing::debug!(candidate = best.candidate, score = best.score, "Best fuzzy match");

        if best.score <= FUZZY_ACCEPT_THRESHOLD {
            return ResolutionResult::Unresolved;
        }

        match self.table.find_exact(best.candidate) {
            Some(record) => resolved(record, tier, Some(best.score)),
            None => ResolutionResult::Unresolved,
        }
    }

    /// Get the fuzzy matcher for direct access.
    pub fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }
}

fn resolved(record: &MedicineRecord, tier: MatchTier, score: Option<u8>) -> ResolutionResult {
    ResolutionResult::Resolved(ResolvedMedicine {
        name: record.name.clone(),
        record: record.clone(),
        tier,
        score,
    })
}
