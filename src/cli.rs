use std::io;
use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::data::source::DataSource;
use crate::data::record::ContactRecord;
use crate::data::store::{Snapshot, SnapshotStore};
use crate::search::view::{contact_card, messages, regional_report, ContactCard};
use crate::search::{search_by_regional, search_contacts, QueryError};
use crate::server::{self, AppState};

const USAGE: &str = "usage: contatos <serve|search|regional|list|check>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Search,
    Regional,
    List,
    Check,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("search") => Some(Command::Search),
        Some("regional") => Some(Command::Regional),
        Some("list") => Some(Command::List),
        Some("check") => Some(Command::Check),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let config = Config::from_env();
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(&config),
        Some(Command::Search) => handle_search(&config, args),
        Some(Command::Regional) => handle_regional(&config, args),
        Some(Command::List) => handle_list(&config, args),
        Some(Command::Check) => handle_check(&config),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

/// Positional arguments after the command name, flags removed.
fn positional(args: &[String]) -> Vec<&str> {
    args.iter()
        .skip(2)
        .map(String::as_str)
        .filter(|arg| !arg.starts_with("--"))
        .collect()
}

fn load_snapshot(config: &Config) -> Result<Arc<Snapshot>, i32> {
    let store = SnapshotStore::new();
    let source = config.source.build();
    store.reload_blocking(source.as_ref()).map_err(|err| {
        eprintln!("{}", messages::LOAD_FAILED);
        eprintln!("{err}");
        1
    })
}

fn handle_serve(config: &Config) -> i32 {
    let source = config.source.build();
    let store = initial_store(source.as_ref());

    match server::run_server(&config.bind_addr, AppState::new(store, source)) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

/// A failed first load still yields a store; data routes answer 503 until
/// POST /api/reload succeeds.
fn initial_store(source: &dyn DataSource) -> Arc<SnapshotStore> {
    let store = Arc::new(SnapshotStore::new());
    if let Err(err) = store.reload_blocking(source) {
        warn!(error = %err, source = %source.describe(), "initial load failed; serving without data");
    }
    store
}

fn handle_search(config: &Config, args: &[String]) -> i32 {
    let rest = positional(args);
    let name = rest.first().copied().unwrap_or("");
    let city = rest.get(1).copied().unwrap_or("");
    let as_csv = args.iter().any(|arg| arg == "--csv");

    // Validate before touching the network.
    if name.trim().is_empty() && city.is_empty() {
        eprintln!("{}", messages::MISSING_CONTACT_CRITERIA);
        return 2;
    }

    let snapshot = match load_snapshot(config) {
        Ok(snapshot) => snapshot,
        Err(code) => return code,
    };

    let matches = match search_contacts(&snapshot, name, city) {
        Ok(matches) => matches,
        Err(QueryError::EmptyCriteria) => {
            eprintln!("{}", messages::MISSING_CONTACT_CRITERIA);
            return 2;
        }
    };
    if matches.is_empty() {
        eprintln!("{}", messages::NO_CONTACTS);
    }

    if as_csv {
        return match write_contacts_csv(&snapshot, &matches, io::stdout()) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("failed to write csv: {err}");
                1
            }
        };
    }

    let cards: Vec<ContactCard> = matches
        .into_iter()
        .map(|contact| contact_card(&snapshot, contact))
        .collect();
    print_json(&cards)
}

/// Matched contact rows as CSV, columns in the sheet's header order.
pub fn write_contacts_csv<W: io::Write>(
    snapshot: &Snapshot,
    contacts: &[&ContactRecord],
    out: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(snapshot.contact_headers())?;
    for contact in contacts {
        writer.write_record(
            contact
                .record()
                .ordered(snapshot.contact_headers())
                .map(|(_, value)| value),
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn handle_regional(config: &Config, args: &[String]) -> i32 {
    let Some(key) = positional(args).first().copied().filter(|key| !key.is_empty()) else {
        eprintln!("{}", messages::MISSING_REGIONAL);
        eprintln!("usage: contatos regional <REPDEC>");
        return 2;
    };

    let snapshot = match load_snapshot(config) {
        Ok(snapshot) => snapshot,
        Err(code) => return code,
    };

    match search_by_regional(&snapshot, key) {
        Ok(search) => {
            let report = regional_report(key, &search);
            if let Some(message) = &report.message {
                eprintln!("{message}");
            }
            print_json(&report)
        }
        Err(QueryError::EmptyCriteria) => {
            eprintln!("{}", messages::MISSING_REGIONAL);
            2
        }
    }
}

fn handle_list(config: &Config, args: &[String]) -> i32 {
    let which = positional(args).first().copied().unwrap_or("");
    if !matches!(which, "municipalities" | "regionals") {
        eprintln!("usage: contatos list <municipalities|regionals>");
        return 2;
    }

    let snapshot = match load_snapshot(config) {
        Ok(snapshot) => snapshot,
        Err(code) => return code,
    };
    let values = if which == "municipalities" {
        snapshot.municipalities()
    } else {
        snapshot.regional_keys()
    };
    for value in values {
        println!("{value}");
    }
    0
}

fn handle_check(config: &Config) -> i32 {
    let snapshot = match load_snapshot(config) {
        Ok(snapshot) => snapshot,
        Err(code) => return code,
    };
    let report = snapshot.report();
    println!(
        "load complete: contacts={}/{}, regionals={}/{}, municipalities={}, source='{}'",
        report.contacts_retained,
        report.contact_rows_parsed,
        report.regionals_retained,
        report.regional_rows_parsed,
        report.municipalities,
        report.source
    );
    0
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize result: {err}");
            1
        }
    }
}
