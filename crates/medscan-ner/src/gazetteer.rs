//! Lexicon-based drug extractor.
//!
//! Tags word tokens that match a drug lexicon, tolerating small OCR errors
//! on longer words.

use std::collections::HashSet;

use async_trait::async_trait;
use strsim::jaro_winkler;

use crate::extraction::{Entity, EntityExtractor, ExtractionResult};

/// Minimum Jaro-Winkler similarity for a near-miss token to count as a drug.
const FUZZY_TOKEN_THRESHOLD: f64 = 0.92;

/// Tokens shorter than this must hit the lexicon exactly.
const MIN_FUZZY_TOKEN_LEN: usize = 5;

/// Tokens shorter than this are never tagged.
const MIN_TOKEN_LEN: usize = 3;

/// Common generic names found on medicine packaging.
pub const DEFAULT_LEXICON: &[&str] = &[
    // Analgesics / antipyretics
    "paracetamol", "acetaminophen", "ibuprofen", "aspirin", "diclofenac", "naproxen",
    "aceclofenac", "tramadol", "mefenamic", "nimesulide", "ketorolac", "etoricoxib",
    // Antibiotics
    "amoxicillin", "azithromycin", "ciprofloxacin", "doxycycline", "cefixime",
    "cephalexin", "clavulanate", "levofloxacin", "metronidazole", "ofloxacin",
    "ceftriaxone", "clarithromycin",
    // Antihistamines
    "cetirizine", "levocetirizine", "loratadine", "fexofenadine", "montelukast",
    "chlorpheniramine",
    // GI
    "omeprazole", "pantoprazole", "rabeprazole", "esomeprazole", "ranitidine",
    "famotidine", "domperidone", "ondansetron", "loperamide",
    // Cardio / metabolic
    "metformin", "glimepiride", "atorvastatin", "rosuvastatin", "amlodipine",
    "telmisartan", "losartan", "metoprolol", "clopidogrel", "insulin",
    // Other
    "prednisolone", "dexamethasone", "salbutamol", "levothyroxine", "folic",
    "multivitamin", "cholecalciferol", "ivermectin", "albendazole", "fluconazole",
];

/// Local extractor backed by a word lexicon.
#[derive(Debug, Clone, Default)]
pub struct GazetteerExtractor {
    terms: HashSet<String>,
    /// Terms long enough for near-miss matching
    fuzzy_terms: Vec<String>,
}

impl GazetteerExtractor {
    /// Create an extractor with the built-in lexicon.
    pub fn new() -> Self {
        let mut extractor = Self::default();
        extractor.extend(DEFAULT_LEXICON.iter().copied());
        extractor
    }

    /// Create an extractor with only the given terms.
    pub fn with_terms<'t, I>(terms: I) -> Self
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut extractor = Self::default();
        extractor.extend(terms);
        extractor
    }

    /// Add terms. Multi-word terms contribute their first word only.
    pub fn extend<'t, I>(&mut self, terms: I)
    where
        I: IntoIterator<Item = &'t str>,
    {
        for term in terms {
            let Some(word) = term.split_whitespace().next() else {
                continue;
            };
            let word = word.to_lowercase();
            if !is_taggable(&word) {
                continue;
            }
            if word.chars().count() >= MIN_FUZZY_TOKEN_LEN && !self.terms.contains(&word) {
                self.fuzzy_terms.push(word.clone());
            }
            self.terms.insert(word);
        }
    }

    /// Number of distinct lexicon terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Tag every lexicon token in `text`, in text order. Offsets are byte offsets.
    pub fn tag(&self, text: &str) -> Vec<Entity> {
        tokens(text)
            .filter(|&(start, end)| self.is_drug_token(&text[start..end]))
            .map(|(start, end)| Entity::drug(&text[start..end], start, end))
            .collect()
    }

    fn is_drug_token(&self, token: &str) -> bool {
        let lower = token.to_lowercase();
        if !is_taggable(&lower) {
            return false;
        }
        if self.terms.contains(&lower) {
            return true;
        }
        if lower.chars().count() < MIN_FUZZY_TOKEN_LEN {
            return false;
        }
        self.fuzzy_terms
            .iter()
            .any(|term| jaro_winkler(&lower, term) >= FUZZY_TOKEN_THRESHOLD)
    }
}

#[async_trait]
impl EntityExtractor for GazetteerExtractor {
    async fn extract(&self, text: &str) -> ExtractionResult<Vec<Entity>> {
        Ok(self.tag(text))
    }

    fn backend(&self) -> &'static str {
        "gazetteer"
    }
}

/// Long enough and not purely numeric.
fn is_taggable(word: &str) -> bool {
    word.chars().count() >= MIN_TOKEN_LEN && word.chars().any(|c| c.is_alphabetic())
}

/// Byte ranges of maximal alphanumeric runs.
fn tokens(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut chars = text.char_indices().peekable();
    std::iter::from_fn(move || {
        while let Some(&(_, c)) = chars.peek() {
            if c.is_alphanumeric() {
                break;
            }
            chars.next();
        }
        let (start, _) = *chars.peek()?;
        let mut end = start;
        while let Some(&(idx, c)) = chars.peek() {
            if !c.is_alphanumeric() {
                break;
            }
            end = idx + c.len_utf8();
            chars.next();
        }
        Some((start, end))
    })
}
