//! Loading catalog documents from disk.

use masquerade::catalog::{Catalog, CatalogError};

use crate::support::{repo_data, write_file, LEXICON, PERSONAS};

#[test]
fn loads_documents_from_disk() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let lexicon = write_file(tmp.path(), "lexicon.json", LEXICON);
    let personas = write_file(tmp.path(), "personas.json", PERSONAS);

    let catalog = Catalog::load(&lexicon, &personas).expect("catalog should load");
    assert_eq!(catalog.personas.len(), 3);
    assert_eq!(catalog.lexicon.emotions().len(), 4);
}

#[test]
fn missing_file_names_the_document() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let lexicon = write_file(tmp.path(), "lexicon.json", LEXICON);
    let personas = tmp.path().join("nope.json");

    let err = Catalog::load(&lexicon, &personas).expect_err("personas file is missing");
    assert!(matches!(err, CatalogError::Read { document: "personas", .. }));
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn malformed_json_is_rejected() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let lexicon = write_file(tmp.path(), "lexicon.json", "{ not json");
    let personas = write_file(tmp.path(), "personas.json", PERSONAS);

    let err = Catalog::load(&lexicon, &personas).expect_err("lexicon is malformed");
    assert!(matches!(err, CatalogError::Parse { document: "lexicon", .. }));
}

#[test]
fn shipped_documents_are_consistent() {
    let catalog = Catalog::load(&repo_data("lexicons.json"), &repo_data("personas.json"))
        .expect("shipped data should validate");
    assert!(!catalog.personas.is_empty());
    assert!(!catalog.lexicon.political().is_empty());
}
