//! Loaded datasets as an immutable snapshot, and the shared slot that swaps
//! snapshots on reload.
//!
//! A snapshot is built once per successful load and never mutated. Reloading
//! builds a fresh one and replaces the `Arc` in a single step, so readers see
//! either the complete old data or the complete new data.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{info, warn};

use crate::data::record::{ContactRecord, RegionalRecord};
use crate::data::source::{DataSource, FetchError, RawDatasets};
use crate::data::table::parse;
use crate::search::index::{distinct_municipalities, distinct_regional_keys};

#[derive(Debug)]
pub enum LoadError {
    Fetch(FetchError),
    Runtime(std::io::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "failed to load datasets: {err}"),
            Self::Runtime(err) => write!(f, "failed to start load runtime: {err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

impl From<FetchError> for LoadError {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err)
    }
}

/// Counts from one load, before and after dropping blank rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub loaded_at: String,
    pub contact_headers: Vec<String>,
    pub contact_rows_parsed: usize,
    pub contacts_retained: usize,
    pub regional_headers: Vec<String>,
    pub regional_rows_parsed: usize,
    pub regionals_retained: usize,
    pub municipalities: usize,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    contact_headers: Vec<String>,
    contacts: Vec<ContactRecord>,
    regional_headers: Vec<String>,
    regionals: Vec<RegionalRecord>,
    /// REPDEC key -> index of the first regional row carrying it.
    regional_by_key: HashMap<String, usize>,
    municipalities: Vec<String>,
    regional_keys: Vec<String>,
    report: LoadReport,
}

impl Snapshot {
    /// Parse both exports and keep only rows that carry data.
    pub fn from_texts(contacts_text: &str, regionals_text: &str) -> Self {
        Self::build(contacts_text, regionals_text, "inline")
    }

    fn build(contacts_text: &str, regionals_text: &str, source: &str) -> Self {
        let contacts_table = parse(contacts_text);
        let regionals_table = parse(regionals_text);
        let contact_rows_parsed = contacts_table.rows.len();
        let regional_rows_parsed = regionals_table.rows.len();

        let contacts: Vec<ContactRecord> = contacts_table
            .rows
            .into_iter()
            .map(ContactRecord::new)
            .filter(ContactRecord::is_retained)
            .collect();
        let regionals: Vec<RegionalRecord> = regionals_table
            .rows
            .into_iter()
            .map(RegionalRecord::new)
            .filter(RegionalRecord::is_retained)
            .collect();

        let mut regional_by_key = HashMap::new();
        for (idx, regional) in regionals.iter().enumerate() {
            regional_by_key
                .entry(regional.regional_key().to_string())
                .or_insert(idx);
        }

        let municipalities = distinct_municipalities(&contacts);
        let regional_keys = distinct_regional_keys(&regionals);

        let report = LoadReport {
            source: source.to_string(),
            loaded_at: chrono::Utc::now().to_rfc3339(),
            contact_headers: contacts_table.headers.clone(),
            contact_rows_parsed,
            contacts_retained: contacts.len(),
            regional_headers: regionals_table.headers.clone(),
            regional_rows_parsed,
            regionals_retained: regionals.len(),
            municipalities: municipalities.len(),
        };

        Snapshot {
            contact_headers: contacts_table.headers,
            contacts,
            regional_headers: regionals_table.headers,
            regionals,
            regional_by_key,
            municipalities,
            regional_keys,
            report,
        }
    }

    pub fn contact_headers(&self) -> &[String] {
        &self.contact_headers
    }

    pub fn contacts(&self) -> &[ContactRecord] {
        &self.contacts
    }

    pub fn regional_headers(&self) -> &[String] {
        &self.regional_headers
    }

    pub fn regionals(&self) -> &[RegionalRecord] {
        &self.regionals
    }

    /// Distinct municipalities for the city selector, sorted.
    pub fn municipalities(&self) -> &[String] {
        &self.municipalities
    }

    /// Distinct REPDEC keys for the regional selector, sorted.
    pub fn regional_keys(&self) -> &[String] {
        &self.regional_keys
    }

    /// First regional row whose key equals `key` exactly.
    pub fn regional_by_key(&self, key: &str) -> Option<&RegionalRecord> {
        self.regional_by_key
            .get(key)
            .and_then(|&idx| self.regionals.get(idx))
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

/// Fetch both exports from `source` and build a snapshot. Nothing is shared
/// until the caller decides to install the result.
pub async fn load(source: &dyn DataSource) -> Result<Snapshot, LoadError> {
    let RawDatasets {
        contacts,
        regionals,
    } = source.fetch().await?;
    Ok(Snapshot::build(&contacts, &regionals, &source.describe()))
}

/// Current snapshot and the message of the last failed load, read and
/// written together.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub snapshot: Option<Arc<Snapshot>>,
    pub last_error: Option<String>,
}

/// Shared holder of the current snapshot.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    state: RwLock<StoreState>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        store.replace(snapshot);
        store
    }

    /// Snapshot and last error from a single read of the store.
    pub fn state(&self) -> StoreState {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Current snapshot, or `None` before the first successful load.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.state().snapshot
    }

    /// Message of the most recent failed load, cleared by a successful one.
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error
    }

    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.snapshot = Some(Arc::clone(&snapshot));
        guard.last_error = None;
        snapshot
    }

    /// Load from `source` and install the result. On failure the previous
    /// snapshot stays in place and the error is remembered for status output.
    pub async fn reload(&self, source: &dyn DataSource) -> Result<Arc<Snapshot>, LoadError> {
        match load(source).await {
            Ok(snapshot) => {
                let report = snapshot.report();
                info!(
                    source = %report.source,
                    contacts = report.contacts_retained,
                    regionals = report.regionals_retained,
                    municipalities = report.municipalities,
                    "datasets loaded"
                );
                Ok(self.replace(snapshot))
            }
            Err(err) => {
                warn!(error = %err, "dataset load failed; keeping previous snapshot");
                self.record_failure(err.to_string());
                Err(err)
            }
        }
    }

    /// [`reload`](Self::reload) for synchronous callers (CLI, server loop).
    /// Must not be called from inside an async runtime.
    pub fn reload_blocking(&self, source: &dyn DataSource) -> Result<Arc<Snapshot>, LoadError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(LoadError::Runtime)?;
        runtime.block_on(self.reload(source))
    }

    fn record_failure(&self, message: String) {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.last_error = Some(message);
    }
}
