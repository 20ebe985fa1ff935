//! The `Simple` strategy end to end.

use xmlpipes_indexer::{MergeOptions, MergeRange, RebuildOptions, Simple};

use crate::common::{registry, Book, RecordingController, Workspace};

#[test]
fn test_index_writes_core_and_empty_delta_then_rebuilds() {
    let workspace = Workspace::new();
    let registry = registry();
    let controller = RecordingController::default();
    let simple = Simple::for_class::<Book>(&workspace.config, &registry, &controller).unwrap();
    assert_eq!(simple.index_declaration().name(), "books");

    simple
        .index(&[Book::new(1, "Dune")], &RebuildOptions::default())
        .unwrap();

    assert!(workspace.read("books_core_source.xml").contains("<title>Dune</title>"));
    assert!(!workspace.read("books_delta_source.xml").contains("<sphinx:document"));
    assert_eq!(
        *controller.calls.borrow(),
        ["rebuild books_delta", "rebuild books_core"]
    );
}

#[test]
fn test_clean_empties_both_generations() {
    let workspace = Workspace::new();
    let registry = registry();
    let controller = RecordingController {
        running: true,
        ..Default::default()
    };
    let simple = Simple::for_class::<Book>(&workspace.config, &registry, &controller).unwrap();

    simple.clean(&RebuildOptions::default()).unwrap();

    assert!(workspace.exists("books_core_source.xml"));
    assert!(workspace.exists("books_delta_source.xml"));
    assert_eq!(
        *controller.calls.borrow(),
        ["rebuild books_delta --rotate", "rebuild books_core --rotate"]
    );
}

#[test]
fn test_merge_exports_delta_and_merges() {
    let workspace = Workspace::new();
    let registry = registry();
    let controller = RecordingController::default();
    let simple = Simple::for_class::<Book>(&workspace.config, &registry, &controller).unwrap();

    let options = MergeOptions::default().with_range(MergeRange::new("deleted", 0, 0));
    simple.merge(&[Book::new(7, "Ran")], &options).unwrap();

    assert!(workspace.read("books_delta_source.xml").contains(r#"id="7""#));
    assert_eq!(
        *controller.calls.borrow(),
        ["rebuild books_delta", "merge books_core books_delta deleted 0 0"]
    );
}

#[test]
fn test_kill_writes_killlist_and_merges() {
    let workspace = Workspace::new();
    let registry = registry();
    let controller = RecordingController::default();
    let simple = Simple::for_class::<Book>(&workspace.config, &registry, &controller).unwrap();

    simple.kill(&[4_u64, 2], &MergeOptions::default()).unwrap();

    let xml = workspace.read("books_delta_source.xml");
    assert!(xml.find("<id>4</id>") < xml.find("<id>2</id>"));
    assert_eq!(
        *controller.calls.borrow(),
        ["rebuild books_delta", "merge books_core books_delta"]
    );
}
