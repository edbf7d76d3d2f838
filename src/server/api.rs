use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::data::store::{LoadReport, Snapshot, SnapshotStore, StoreState};
use crate::search::view::{contact_card, messages, regional_report, ContactCard, RegionalReport};
use crate::search::{search_by_regional, search_contacts, QueryError};

#[derive(Debug)]
pub enum SearchPayloadError {
    Criteria(&'static str),
    Serialize(serde_json::Error),
}

impl fmt::Display for SearchPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Criteria(message) => write!(f, "{message}"),
            Self::Serialize(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SearchPayloadError {}

impl From<serde_json::Error> for SearchPayloadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub loaded: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<LoadReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactSearchResponse {
    pub status: &'static str,
    pub count: usize,
    pub contacts: Vec<ContactCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionalSearchResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub report: RegionalReport,
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "contatos-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn status_payload(store: &SnapshotStore) -> Result<String, serde_json::Error> {
    let StoreState {
        snapshot,
        last_error,
    } = store.state();
    let message = match (&snapshot, &last_error) {
        (_, Some(_)) => messages::LOAD_FAILED,
        (Some(_), None) => messages::LOADED,
        (None, None) => messages::LOADING,
    };
    serde_json::to_string_pretty(&StatusResponse {
        loaded: snapshot.is_some(),
        message: message.to_string(),
        last_error,
        report: snapshot.map(|s| s.report().clone()),
    })
}

pub fn municipalities_payload(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({ "municipalities": snapshot.municipalities() }))
}

pub fn regionals_payload(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({ "regionals": snapshot.regional_keys() }))
}

/// `GET /api/contacts?name=..&city=..`
pub fn contacts_payload(snapshot: &Snapshot, path: &str) -> Result<String, SearchPayloadError> {
    let query = parse_query(path);
    let name = query.get("name").map(String::as_str).unwrap_or("");
    let city = query.get("city").map(String::as_str).unwrap_or("");

    let matches = match search_contacts(snapshot, name, city) {
        Ok(matches) => matches,
        Err(QueryError::EmptyCriteria) => {
            return Err(SearchPayloadError::Criteria(messages::MISSING_CONTACT_CRITERIA))
        }
    };

    let contacts: Vec<ContactCard> = matches
        .into_iter()
        .map(|contact| contact_card(snapshot, contact))
        .collect();
    let response = ContactSearchResponse {
        status: "ok",
        count: contacts.len(),
        message: contacts.is_empty().then_some(messages::NO_CONTACTS),
        contacts,
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

/// `GET /api/regionals/search?key=..`
pub fn regional_payload(snapshot: &Snapshot, path: &str) -> Result<String, SearchPayloadError> {
    let query = parse_query(path);
    let key = query.get("key").map(String::as_str).unwrap_or("");

    let search = match search_by_regional(snapshot, key) {
        Ok(search) => search,
        Err(QueryError::EmptyCriteria) => {
            return Err(SearchPayloadError::Criteria(messages::MISSING_REGIONAL))
        }
    };

    let response = RegionalSearchResponse {
        status: "ok",
        report: regional_report(key, &search),
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

/// Decode the query string of `path` (`+` and percent escapes included).
/// A repeated key keeps its last value.
pub fn parse_query(path: &str) -> HashMap<String, String> {
    let query = path.split_once('?').map(|(_, q)| q).unwrap_or("");
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_percent_decoded() {
        let query = parse_query("/api/contacts?name=Jo%C3%A3o+Silva&city=S%C3%A3o%20Jos%C3%A9");
        assert_eq!(query.get("name").map(String::as_str), Some("João Silva"));
        assert_eq!(query.get("city").map(String::as_str), Some("São José"));
    }

    #[test]
    fn missing_query_is_empty() {
        assert!(parse_query("/api/contacts").is_empty());
    }

    #[test]
    fn empty_store_reports_loading() {
        let store = SnapshotStore::new();
        let body = status_payload(&store).expect("status serializes");
        assert!(body.contains("\"loaded\": false"));
        assert!(body.contains(messages::LOADING));
    }
}
