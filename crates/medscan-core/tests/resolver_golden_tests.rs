//! Golden tests for the medicine resolver.
//!
//! Each case pins the tier and matched name for a small fixed table.

use medscan_core::models::{MatchTier, MedicineRecord, ResolutionResult};
use medscan_core::{ReferenceTable, Resolver, FUZZY_ACCEPT_THRESHOLD};

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    table: &'static [&'static str],
    extracted_text: &'static str,
    candidate: Option<&'static str>,
    expected: Option<(&'static str, MatchTier)>,
}

fn make_table(names: &[&str]) -> ReferenceTable {
    ReferenceTable::from_records(names.iter().map(|name| {
        MedicineRecord::new(
            name,
            Some(format!("About {}", name.trim())),
            Some(format!("Side effects of {}", name.trim())),
        )
    }))
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "exact-entity",
            table: &["paracetamol"],
            extracted_text: "Paracetamol Tablets IP 500mg",
            candidate: Some("paracetamol"),
            expected: Some(("paracetamol", MatchTier::ExactMed7)),
        },
        GoldenCase {
            id: "partial-entity",
            table: &["paracetamol500"],
            extracted_text: "Paracetamol",
            candidate: Some("paracetamol"),
            expected: Some(("paracetamol500", MatchTier::PartialMed7)),
        },
        GoldenCase {
            id: "fuzzy-entity-typo",
            table: &["ibuprofen"],
            extracted_text: "Ibuprofin 200",
            candidate: Some("ibuprofin"),
            expected: Some(("ibuprofen", MatchTier::FuzzyAfterMed7Fail)),
        },
        GoldenCase {
            id: "fuzzy-full-text",
            table: &["ibuprofen", "aspirin"],
            extracted_text: "aspirin tablet",
            candidate: None,
            expected: Some(("aspirin", MatchTier::FuzzyNoEntity)),
        },
        GoldenCase {
            id: "unrecognized-entity",
            table: &["ibuprofen", "aspirin"],
            extracted_text: "xyzzynotadrug",
            candidate: Some("xyzzynotadrug"),
            expected: None,
        },
        GoldenCase {
            id: "empty-table-entity",
            table: &[],
            extracted_text: "aspirin",
            candidate: Some("aspirin"),
            expected: None,
        },
        GoldenCase {
            id: "empty-table-text",
            table: &[],
            extracted_text: "aspirin",
            candidate: None,
            expected: None,
        },
        GoldenCase {
            id: "mixed-case-table",
            table: &["  Dolo 650 Tablet "],
            extracted_text: "DOLO 650",
            candidate: Some("Dolo 650 Tablet"),
            expected: Some(("dolo 650 tablet", MatchTier::ExactMed7)),
        },
        GoldenCase {
            id: "partial-first-in-order",
            table: &["crocin advance", "crocin pain relief"],
            extracted_text: "Crocin",
            candidate: Some("crocin"),
            expected: Some(("crocin advance", MatchTier::PartialMed7)),
        },
        GoldenCase {
            id: "word-order-text",
            table: &["azithral 500 tablet"],
            extracted_text: "TABLET Azithral-500",
            candidate: None,
            expected: Some(("azithral 500 tablet", MatchTier::FuzzyNoEntity)),
        },
        GoldenCase {
            id: "en-dash-splits-tokens",
            table: &["650 dolo"],
            extracted_text: "dolo\u{2013}650",
            candidate: None,
            expected: Some(("650 dolo", MatchTier::FuzzyNoEntity)),
        },
        GoldenCase {
            id: "score-exactly-threshold",
            table: &["abcxyzw"],
            extracted_text: "abc",
            candidate: None,
            expected: None,
        },
        GoldenCase {
            id: "score-one-above-threshold",
            table: &["abcdefghjkmnpqrs"],
            extracted_text: "abcdefg",
            candidate: None,
            expected: Some(("abcdefghjkmnpqrs", MatchTier::FuzzyNoEntity)),
        },
    ]
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        let table = make_table(case.table);
        let resolver = Resolver::new(&table);

        let result = resolver.resolve(case.extracted_text, case.candidate);

        match case.expected {
            Some((name, tier)) => {
                let medicine = result
                    .resolved()
                    .unwrap_or_else(|| panic!("Case {}: expected a match", case.id));
                assert_eq!(medicine.name, name, "Case {}: name mismatch", case.id);
                assert_eq!(medicine.tier, tier, "Case {}: tier mismatch", case.id);
                assert_eq!(medicine.record.name, name, "Case {}: record mismatch", case.id);
            }
            None => assert_eq!(
                result,
                ResolutionResult::Unresolved,
                "Case {}: expected no match",
                case.id
            ),
        }
    }
}

#[test]
fn test_unrecognized_scores_below_threshold() {
    let table = make_table(&["ibuprofen", "aspirin"]);
    let resolver = Resolver::new(&table);

    let best = resolver
        .matcher()
        .best_match("xyzzynotadrug", table.fuzzy_candidates().map(|(name, _)| name))
        .unwrap();
    assert!(best.score <= FUZZY_ACCEPT_THRESHOLD, "score was {}", best.score);
}

#[test]
fn test_fuzzy_tiers_report_scores() {
    let table = make_table(&["ibuprofen"]);
    let resolver = Resolver::new(&table);

    let result = resolver.resolve("", Some("ibuprofin"));
    let medicine = result.resolved().unwrap();
    assert_eq!(medicine.score, Some(89));
}

#[test]
fn test_duplicate_names_resolve_to_first_row() {
    let table = ReferenceTable::from_records(vec![
        MedicineRecord::new("cetirizine", Some("first".into()), None),
        MedicineRecord::new("cetirizine", Some("second".into()), None),
    ]);
    let resolver = Resolver::new(&table);

    for candidate in [Some("cetirizine"), Some("cetiri"), Some("cetirizin"), None] {
        let result = resolver.resolve("cetirizine", candidate);
        let medicine = result.resolved().unwrap();
        assert_eq!(
            medicine.record.description.as_deref(),
            Some("first"),
            "candidate {:?}",
            candidate
        );
    }
}

#[test]
fn test_threshold_boundary_scores() {
    let table = make_table(&["abcxyzw", "abcdefghjkmnpqrs"]);
    let resolver = Resolver::new(&table);
    let matcher = resolver.matcher();

    assert_eq!(matcher.score("abc", "abcxyzw"), FUZZY_ACCEPT_THRESHOLD);
    assert_eq!(matcher.score("abcdefg", "abcdefghjkmnpqrs"), FUZZY_ACCEPT_THRESHOLD + 1);
}
