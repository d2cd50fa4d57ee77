//! Grouping attribution entries into display sections.

use serde::Serialize;

use crate::attribution::{EntryKind, LawEntry, build_law_entries};
use crate::error::AttributionError;
use crate::result::ComputedTaxResult;
use crate::state::StateCode;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub entries: Vec<LawEntry>,
}

impl Section {
    /// Net of the section's entries.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.amount).sum()
    }

    pub fn is_deduction(&self) -> bool {
        self.entries.iter().all(|e| e.kind == EntryKind::Deduction)
    }
}

/// Group `entries` by section in first-seen order, then order each section by
/// descending magnitude.
///
/// The sort is stable, so equal magnitudes keep their rule-table order.
pub fn group_and_sort(entries: Vec<LawEntry>) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    for entry in entries {
        match sections.iter_mut().find(|s| s.title == entry.section) {
            Some(section) => section.entries.push(entry),
            None => sections.push(Section {
                title: entry.section.clone(),
                entries: vec![entry],
            }),
        }
    }

    for section in &mut sections {
        section
            .entries
            .sort_by(|a, b| b.amount.abs().total_cmp(&a.amount.abs()));
    }

    sections
}

/// Build and group in one step.
pub fn attribute(
    result: &ComputedTaxResult,
    state: StateCode,
) -> Result<Vec<Section>, AttributionError> {
    Ok(group_and_sort(build_law_entries(result, state)?))
}
