//! # Aggregation
//!
//! Per-document statistics over refined entities:
//!
//! - [`resolve_types`]: one label per display string (majority vote);
//! - [`frequency`]: how often each display string occurs;
//! - [`rank_by_frequency`]: count-ranked list with stable ties, used for noun
//!   chunks.

use std::collections::{BTreeMap, HashMap};

use crate::refiner::ProcessedEntity;

/// Display string → resolved entity label ("" when unknown)
pub type EntityTypeIndex = BTreeMap<String, String>;

/// Display string → number of occurrences
pub type FrequencyTable = BTreeMap<String, usize>;

/// (title-cased noun chunk, count), most frequent first
pub type NounChunkFrequency = Vec<(String, usize)>;

/// Picks the most frequent non-empty label for each display string.
///
/// "Jane Doe" seen three times as PERSON and once as ORG resolves to PERSON.
/// Ties go to the label encountered first. Display strings that were only
/// ever seen without a label map to "".
pub fn resolve_types(entities: &[ProcessedEntity<'_>]) -> EntityTypeIndex {
    // labels per display string, in first-seen order
    let mut votes: HashMap<&str, Vec<(&str, usize)>> = HashMap::new();

    for entity in entities {
        let labels = votes.entry(entity.display.as_str()).or_default();
        let label = entity.span.label();
        if label.is_empty() {
            continue;
        }
        match labels.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => labels.push((label, 1)),
        }
    }

    votes
        .into_iter()
        .map(|(display, labels)| {
            let mut best: Option<(&str, usize)> = None;
            for (label, count) in labels {
                if best.map_or(true, |(_, c)| count > c) {
                    best = Some((label, count));
                }
            }
            let label = best.map(|(l, _)| l).unwrap_or_default();
            (display.to_string(), label.to_string())
        })
        .collect()
}

/// Counts occurrences of each display string.
pub fn frequency(entities: &[ProcessedEntity<'_>]) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for entity in entities.iter().filter(|e| !e.display.is_empty()) {
        *table.entry(entity.display.clone()).or_insert(0) += 1;
    }
    table
}

/// Counts `items` and sorts them by count, most frequent first. Items with the
/// same count keep the order in which they were first seen.
pub fn rank_by_frequency<I>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut ranked: Vec<(String, usize)> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for item in items {
        match position.get(&item) {
            Some(&i) => ranked[i].1 += 1,
            None => {
                position.insert(item.clone(), ranked.len());
                ranked.push((item, 1));
            }
        }
    }

    // stable: ties stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// The `n` most frequent entries of a table, ties broken alphabetically.
pub fn most_common(table: &FrequencyTable, n: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = table.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}
