//! Sheet ingestion: parsing, record views, data sources and the snapshot store.

pub mod normalize;
pub mod record;
pub mod source;
pub mod store;
pub mod table;

pub use normalize::normalize;
pub use record::{ContactRecord, Record, RegionalRecord};
pub use source::{DataSource, FetchError, FileSource, HttpSource, RawDatasets, StaticSource};
pub use store::{load, LoadError, LoadReport, Snapshot, SnapshotStore, StoreState};
pub use table::{parse, ParsedTable};
