//! Document-set and kill-list export through the registry.

use xmlpipes_core::cast::checksum;
use xmlpipes_core::Generation;
use xmlpipes_indexer::{DocumentExporter, KillListExporter};

use crate::common::{registry, Book, Workspace};

#[test]
fn test_core_export_embeds_schema_and_documents() {
    let workspace = Workspace::new();
    let registry = registry();
    let exporter = DocumentExporter::for_class::<Book>(&workspace.config, &registry);

    let mut dune = Book::new(1, "Dune");
    dune.authors = Some("Frank Herbert");
    dune.volumes = Some(6);
    dune.tags = Some(vec!["sf", "classic"]);
    exporter
        .export(Generation::Core, "books", &[dune, Book::new(2, "Emma")])
        .unwrap();

    let xml = workspace.read("books_core_source.xml");
    assert!(xml.contains(r#"<sphinx:attr name="volumes" type="int" bits="8" default="1"/>"#));
    assert!(xml.contains(r#"<sphinx:attr name="deleted" type="bool" default="0"/>"#));
    assert!(xml.contains(r#"<sphinx:attr name="published_at" type="timestamp"/>"#));
    assert!(xml.contains("<authors>Frank Herbert</authors>"));
    assert!(xml.contains("<volumes>6</volumes>"));
    assert!(xml.contains("<published_at>1287579577</published_at>"));
    assert!(xml.contains(&format!(
        "<tags>{},{}</tags>",
        checksum("sf"),
        checksum("classic")
    )));
    assert_eq!(xml.matches("<sphinx:document ").count(), 2);
}

#[test]
fn test_missing_accessor_keeps_schema_default_and_omits_element() {
    let workspace = Workspace::new();
    let registry = registry();
    let exporter = DocumentExporter::for_class::<Book>(&workspace.config, &registry);

    exporter
        .export(Generation::Core, "books", &[Book::new(2, "Emma")])
        .unwrap();

    let xml = workspace.read("books_core_source.xml");
    assert!(xml.contains(&format!(
        r#"<sphinx:attr name="tags" type="multi" default="{},{}"/>"#,
        checksum("x"),
        checksum("y")
    )));
    assert!(!xml.contains("<tags>"));
    assert!(!xml.contains("<authors>"));
}

#[test]
fn test_source_defaults_apply_per_source() {
    let workspace = Workspace::new();
    let registry = registry();
    let exporter = DocumentExporter::for_class::<Book>(&workspace.config, &registry);

    exporter
        .export(Generation::Delta, "manga", &[Book::new(3, "Akira")])
        .unwrap();

    let xml = workspace.read("manga_delta_source.xml");
    assert!(xml.contains(r#"<sphinx:attr name="volumes" type="int" bits="8" default="3"/>"#));
}

#[test]
fn test_titles_has_no_delta() {
    let workspace = Workspace::new();
    let registry = registry();
    let exporter = DocumentExporter::for_class::<Book>(&workspace.config, &registry);

    let written = exporter
        .export(Generation::Delta, "titles", &[Book::new(3, "Akira")])
        .unwrap();
    assert!(written.is_none());
    assert!(!workspace.exists("titles_delta_source.xml"));

    exporter
        .export(Generation::Core, "titles", &[Book::new(3, "Akira")])
        .unwrap();
    let xml = workspace.read("titles_core_source.xml");
    assert!(!xml.contains("volumes"));
}

#[test]
fn test_killlist_replaces_delta() {
    let workspace = Workspace::new();
    let registry = registry();
    let exporter = DocumentExporter::for_class::<Book>(&workspace.config, &registry);
    exporter
        .export(Generation::Delta, "books", &[Book::new(3, "Akira")])
        .unwrap();

    KillListExporter::for_class::<Book>(&workspace.config, &registry)
        .export("books", &[Book::new(3, "Akira"), Book::new(5, "Ran")])
        .unwrap();

    let xml = workspace.read("books_delta_source.xml");
    assert!(!xml.contains("<sphinx:document"));
    assert!(xml.contains("<id>3</id>"));
    assert!(xml.contains("<id>5</id>"));
}
