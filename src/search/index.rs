//! Selector lists derived from a snapshot: distinct municipalities and
//! distinct regional keys.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::data::normalize::normalize;
use crate::data::record::{ContactRecord, RegionalRecord};

/// Case/accent-folded order first, so "Água Doce" sorts among the "A"s.
/// Ties put the unaccented spelling first, then lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    normalize(a)
        .cmp(&normalize(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Non-empty values, deduplicated by exact string, in locale order.
pub fn distinct_sorted<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut distinct: Vec<String> = values
        .into_iter()
        .filter(|value| !value.is_empty() && seen.insert(*value))
        .map(str::to_string)
        .collect();
    distinct.sort_by(|a, b| locale_cmp(a, b));
    distinct
}

pub fn distinct_municipalities(contacts: &[ContactRecord]) -> Vec<String> {
    distinct_sorted(contacts.iter().map(ContactRecord::municipality))
}

pub fn distinct_regional_keys(regionals: &[RegionalRecord]) -> Vec<String> {
    distinct_sorted(regionals.iter().map(RegionalRecord::regional_key))
}
