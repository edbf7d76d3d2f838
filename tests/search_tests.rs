//! End-to-end: fixture exports -> file source -> snapshot -> queries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use contatos::data::{FileSource, Snapshot, SnapshotStore, StaticSource};
use contatos::search::{
    contact_card, regional_for, regional_report, search_by_regional, search_contacts, QueryError,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_snapshot() -> Arc<Snapshot> {
    let store = SnapshotStore::new();
    let source = FileSource::new(fixture_path("compdec.csv"), fixture_path("repdec.csv"));
    store.reload_blocking(&source).expect("fixtures load")
}

#[test]
fn fixtures_load_and_filter_blank_rows() {
    let snapshot = fixture_snapshot();
    let report = snapshot.report();
    assert_eq!(report.contact_rows_parsed, 7);
    assert_eq!(report.contacts_retained, 5);
    assert_eq!(report.regional_rows_parsed, 5);
    assert_eq!(report.regionals_retained, 3);
    assert!(report.source.starts_with("files: "));
}

#[test]
fn selector_lists_are_sorted_and_distinct() {
    let snapshot = fixture_snapshot();
    assert_eq!(
        snapshot.municipalities(),
        ["Blumenau", "Gaspar", "Içara", "Pomerode", "São José"]
    );
    assert_eq!(
        snapshot.regional_keys(),
        [
            "REPDEC Blumenau",
            "REPDEC Grande Florianópolis",
            "REPDEC Joinville"
        ]
    );
}

#[test]
fn quoted_cells_are_kept_whole() {
    let snapshot = fixture_snapshot();
    let joao = &snapshot.contacts()[0];
    assert_eq!(
        joao.field("Outros Contatos"),
        "(47) 99999-0001, (47) 99999-0002"
    );
    assert_eq!(snapshot.contacts()[3].coordinator_name(), "Pedro Álvares");
}

#[test]
fn accent_insensitive_name_search() {
    let snapshot = fixture_snapshot();
    let found = search_contacts(&snapshot, "conceicao", "").expect("criteria given");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].municipality(), "Gaspar");

    let found = search_contacts(&snapshot, "PEDRO ALVARES", "").expect("criteria given");
    assert_eq!(found.len(), 1);
}

#[test]
fn city_only_search_includes_rows_without_coordinator() {
    let snapshot = fixture_snapshot();
    let found = search_contacts(&snapshot, "", "Pomerode").expect("criteria given");
    assert_eq!(found.len(), 1);
    let card = contact_card(&snapshot, found[0]);
    assert_eq!(card.title, "Nome não informado");
    assert_eq!(
        card.regional.map(|r| r.chief),
        Some("Carlos Chefe".to_string())
    );
}

#[test]
fn empty_search_is_rejected() {
    let snapshot = fixture_snapshot();
    assert_eq!(
        search_contacts(&snapshot, " ", ""),
        Err(QueryError::EmptyCriteria)
    );
}

#[test]
fn regional_search_joins_both_sheets() {
    let snapshot = fixture_snapshot();
    let search = search_by_regional(&snapshot, "REPDEC Blumenau").expect("key given");
    let info = search.regional_info.expect("office row");
    assert_eq!(info.assistant_name(), "Beatriz Auxiliar");
    let municipalities: Vec<&str> = search
        .member_contacts
        .iter()
        .map(|c| c.municipality())
        .collect();
    assert_eq!(municipalities, vec!["Blumenau", "Gaspar", "Pomerode"]);
}

#[test]
fn regional_outcomes_for_partial_data() {
    let snapshot = fixture_snapshot();

    let criciuma = search_by_regional(&snapshot, "REPDEC Criciúma").expect("key given");
    assert!(criciuma.regional_info.is_none());
    assert_eq!(criciuma.member_contacts.len(), 1);

    let joinville = search_by_regional(&snapshot, "REPDEC Joinville").expect("key given");
    let report = regional_report("REPDEC Joinville", &joinville);
    assert!(!report.not_found);
    assert_eq!(
        report.message.as_deref(),
        Some("Nenhum município associado a esta regional foi encontrado.")
    );

    let unknown = search_by_regional(&snapshot, "REPDEC Lages").expect("key given");
    assert!(unknown.is_not_found());
}

#[test]
fn reverse_enrichment_matches_regional_search() {
    let snapshot = fixture_snapshot();
    for contact in snapshot.contacts() {
        let direct = regional_for(&snapshot, contact);
        let via_search = search_by_regional(&snapshot, contact.regional_key())
            .expect("fixture contacts all carry a key")
            .regional_info;
        assert_eq!(direct, via_search);
    }
}

#[test]
fn failed_reload_leaves_search_results_unchanged() {
    let store = SnapshotStore::new();
    let good = FileSource::new(fixture_path("compdec.csv"), fixture_path("repdec.csv"));
    store.reload_blocking(&good).expect("fixtures load");

    let before: Vec<String> = {
        let snapshot = store.current().expect("loaded");
        search_contacts(&snapshot, "a", "")
            .expect("criteria given")
            .iter()
            .map(|c| c.coordinator_name().to_string())
            .collect()
    };

    let broken = FileSource::new(fixture_path("compdec.csv"), fixture_path("missing.csv"));
    assert!(store.reload_blocking(&broken).is_err());

    let snapshot = store.current().expect("still loaded");
    let after: Vec<String> = search_contacts(&snapshot, "a", "")
        .expect("criteria given")
        .iter()
        .map(|c| c.coordinator_name().to_string())
        .collect();
    assert_eq!(before, after);
    assert!(store.last_error().is_some());
}

#[test]
fn header_only_exports_load_as_empty() {
    let store = SnapshotStore::new();
    let snapshot = store
        .reload_blocking(&StaticSource::new(
            "Coordenador,Municipio,REPDEC",
            "REPDEC,CH_REPDEC",
        ))
        .expect("static load");
    assert!(snapshot.contacts().is_empty());
    assert!(snapshot.regionals().is_empty());
    assert_eq!(snapshot.contact_headers(), ["Coordenador", "Municipio", "REPDEC"]);
    assert!(snapshot.municipalities().is_empty());
}
