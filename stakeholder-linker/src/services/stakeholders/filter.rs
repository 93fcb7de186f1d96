//! Search filtering and ordering of the fetched stakeholder list

use feruca::{Collator, Tailoring};
use std::cmp::Ordering;

use super::models::Stakeholder;

/// Trim and lower-case a raw search term
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// CLDR root collation with punctuation significant and no byte tiebreak,
/// so canonically equal names compare `Equal`
pub fn name_collator() -> Collator {
    Collator::new(Tailoring::default(), false, false)
}

/// Locale-aware name ordering (accents and case are secondary to the letter)
pub fn compare_names(collator: &mut Collator, a: &Stakeholder, b: &Stakeholder) -> Ordering {
    collator.collate(a.name.as_str(), b.name.as_str())
}

fn matches(stakeholder: &Stakeholder, term: &str) -> bool {
    stakeholder.name.to_lowercase().contains(term) || stakeholder.id.to_lowercase().contains(term)
}

/// Derive the display list: keep rows whose name or id contains the term
/// (all rows for an empty term), then sort by name.
pub fn filter_and_sort(stakeholders: &[Stakeholder], term: &str) -> Vec<Stakeholder> {
    let term = normalize_term(term);

    let mut display: Vec<Stakeholder> = if term.is_empty() {
        stakeholders.to_vec()
    } else {
        stakeholders.iter().filter(|s| matches(s, &term)).cloned().collect()
    };

    let mut collator = name_collator();
    display.sort_by(|a, b| compare_names(&mut collator, a, b));
    display
}
