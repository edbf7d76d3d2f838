//! Contact and regional queries over a loaded [`Snapshot`].
//!
//! Name matching is accent/case-insensitive containment; municipality and
//! REPDEC matching is exact, since those values come from the selector lists.

pub mod index;
pub mod view;

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::data::normalize::normalize;
use crate::data::record::{ContactRecord, RegionalRecord};
use crate::data::store::Snapshot;

pub use index::{distinct_municipalities, distinct_regional_keys, distinct_sorted, locale_cmp};
pub use view::{
    contact_card, messages, regional_report, ContactCard, FieldValue, MemberRow, RegionalReport,
    RegionalSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    /// No usable filter value was supplied; distinct from "nothing matched".
    EmptyCriteria,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCriteria => write!(f, "no search criteria supplied"),
        }
    }
}

impl std::error::Error for QueryError {}

/// Outcome of a regional lookup. Both parts empty means the key has no data.
#[derive(Debug, Clone, Serialize)]
pub struct RegionalSearch<'a> {
    pub regional_info: Option<&'a RegionalRecord>,
    pub member_contacts: Vec<&'a ContactRecord>,
}

impl RegionalSearch<'_> {
    pub fn is_not_found(&self) -> bool {
        self.regional_info.is_none() && self.member_contacts.is_empty()
    }
}

/// Contacts whose coordinator name contains `name_query` (folded) and whose
/// municipality equals `city_query`. An empty query side matches everything,
/// but both sides empty is [`QueryError::EmptyCriteria`].
pub fn search_contacts<'a>(
    snapshot: &'a Snapshot,
    name_query: &str,
    city_query: &str,
) -> Result<Vec<&'a ContactRecord>, QueryError> {
    let name_query = normalize(name_query.trim());
    if name_query.is_empty() && city_query.is_empty() {
        return Err(QueryError::EmptyCriteria);
    }

    let matches: Vec<&ContactRecord> = snapshot
        .contacts()
        .iter()
        .filter(|contact| {
            let name_match =
                name_query.is_empty() || normalize(contact.coordinator_name()).contains(&name_query);
            let city_match = city_query.is_empty() || contact.municipality() == city_query;
            name_match && city_match
        })
        .collect();

    debug!(
        name = %name_query,
        city = city_query,
        matches = matches.len(),
        "contact search"
    );
    Ok(matches)
}

/// Regional office record for `regional_key` plus every contact under it.
pub fn search_by_regional<'a>(
    snapshot: &'a Snapshot,
    regional_key: &str,
) -> Result<RegionalSearch<'a>, QueryError> {
    if regional_key.is_empty() {
        return Err(QueryError::EmptyCriteria);
    }

    let result = RegionalSearch {
        regional_info: snapshot.regional_by_key(regional_key),
        member_contacts: snapshot
            .contacts()
            .iter()
            .filter(|contact| contact.regional_key() == regional_key)
            .collect(),
    };

    debug!(
        regional = regional_key,
        found = result.regional_info.is_some(),
        members = result.member_contacts.len(),
        "regional search"
    );
    Ok(result)
}

/// The regional office a contact belongs to, if the REPDEC sheet lists it.
pub fn regional_for<'a>(
    snapshot: &'a Snapshot,
    contact: &ContactRecord,
) -> Option<&'a RegionalRecord> {
    snapshot.regional_by_key(contact.regional_key())
}
