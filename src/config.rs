//! Runtime settings read from the environment.
//!
//! `CONTATOS_BIND` sets the server address. Both `CONTATOS_COMPDEC_PATH` and
//! `CONTATOS_REPDEC_PATH` switch loading to local files; otherwise the sheets
//! are fetched from `CONTATOS_COMPDEC_URL` / `CONTATOS_REPDEC_URL` (defaulting
//! to the published exports).

use std::path::PathBuf;

use crate::data::source::{
    DataSource, FileSource, HttpSource, DEFAULT_COMPDEC_URL, DEFAULT_REPDEC_URL,
};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Http {
        compdec_url: String,
        repdec_url: String,
    },
    Files {
        compdec_path: PathBuf,
        repdec_path: PathBuf,
    },
}

impl SourceConfig {
    pub fn build(&self) -> Box<dyn DataSource> {
        match self {
            Self::Http {
                compdec_url,
                repdec_url,
            } => Box::new(HttpSource::new(compdec_url.clone(), repdec_url.clone())),
            Self::Files {
                compdec_path,
                repdec_path,
            } => Box::new(FileSource::new(compdec_path.clone(), repdec_path.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub source: SourceConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = var("CONTATOS_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let source = match (var("CONTATOS_COMPDEC_PATH"), var("CONTATOS_REPDEC_PATH")) {
            (Some(compdec_path), Some(repdec_path)) => SourceConfig::Files {
                compdec_path: PathBuf::from(compdec_path),
                repdec_path: PathBuf::from(repdec_path),
            },
            _ => SourceConfig::Http {
                compdec_url: var("CONTATOS_COMPDEC_URL")
                    .unwrap_or_else(|| DEFAULT_COMPDEC_URL.to_string()),
                repdec_url: var("CONTATOS_REPDEC_URL")
                    .unwrap_or_else(|| DEFAULT_REPDEC_URL.to_string()),
            },
        };

        Config { bind_addr, source }
    }
}
