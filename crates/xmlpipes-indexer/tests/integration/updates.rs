//! Live attribute updates.

use std::collections::BTreeMap;

use xmlpipes_core::{Error, Value};
use xmlpipes_indexer::MergeCoordinator;

use crate::common::{
    registry, Book, RecordingClient, RecordingController, RefusingClient, Workspace,
};

fn updates(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_update_casts_values_per_document() {
    let workspace = Workspace::new();
    let registry = registry();
    let controller = RecordingController::default();
    let client = RecordingClient::default();
    let coordinator = MergeCoordinator::for_class::<Book>(&workspace.config, &registry, &controller)
        .with_client(&client);

    coordinator
        .update_attributes(
            "books",
            &[Book::new(31212, "Dune"), Book::new(34523, "Emma")],
            &updates(&[
                ("deleted", Value::from(true)),
                ("volumes", Value::from("8")),
                ("bogus", Value::from(1)),
            ]),
        )
        .unwrap();

    let recorded = client.updates.borrow();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].index, "books");
    assert_eq!(recorded[0].attributes, ["volumes", "deleted"]);
    assert_eq!(
        recorded[0].values.get(&31212),
        Some(&vec![Value::Int(8), Value::Int(1)])
    );
    assert_eq!(recorded[0].values.len(), 2);
}

#[test]
fn test_update_ignores_non_extern_indexes() {
    let workspace = Workspace::new();
    let registry = registry();
    let controller = RecordingController::default();
    let client = RecordingClient::default();
    let coordinator = MergeCoordinator::for_class::<Book>(&workspace.config, &registry, &controller)
        .with_client(&client);

    coordinator
        .update_attributes("titles", &[1_u64], &updates(&[("deleted", Value::from(true))]))
        .unwrap();
    coordinator
        .update_attributes("bogus", &[1_u64], &updates(&[("deleted", Value::from(true))]))
        .unwrap();
    coordinator
        .update_attributes("books", &[1_u64], &updates(&[("bogus", Value::from(true))]))
        .unwrap();

    assert!(client.updates.borrow().is_empty());
}

#[test]
fn test_update_propagates_cast_errors() {
    let workspace = Workspace::new();
    let registry = registry();
    let controller = RecordingController::default();
    let client = RecordingClient::default();
    let coordinator = MergeCoordinator::for_class::<Book>(&workspace.config, &registry, &controller)
        .with_client(&client);

    let err = coordinator
        .update_attributes(
            "books",
            &[1_u64],
            &updates(&[("published_at", Value::from("not a date"))]),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Cast { .. }));
    assert!(client.updates.borrow().is_empty());
}

#[test]
fn test_update_sends_one_row_per_document() {
    let workspace = Workspace::new();
    let registry = registry();
    let controller = RecordingController::default();
    let client = RecordingClient::default();
    let coordinator = MergeCoordinator::for_class::<Book>(&workspace.config, &registry, &controller)
        .with_client(&client);

    coordinator
        .update_attributes(
            "books",
            &[7_u64, 3, 7],
            &updates(&[("deleted", Value::from(true)), ("volumes", Value::from(8))]),
        )
        .unwrap();
    coordinator
        .update_attributes(
            "books",
            &[Book::new(9, "Dune"), Book::new(9, "Dune Messiah")],
            &updates(&[("deleted", Value::from(false))]),
        )
        .unwrap();

    let recorded = client.updates.borrow();
    assert_eq!(recorded[0].attributes, ["volumes", "deleted"]);
    assert_eq!(recorded[0].values.len(), 2);
    assert_eq!(recorded[0].values.get(&7), Some(&vec![Value::Int(8), Value::Int(1)]));
    assert_eq!(recorded[0].values.get(&3), Some(&vec![Value::Int(8), Value::Int(1)]));
    assert_eq!(recorded[1].values.get(&9), Some(&vec![Value::Int(0)]));
}

#[test]
fn test_update_propagates_transport_errors() {
    let workspace = Workspace::new();
    let registry = registry();
    let controller = RecordingController::default();
    let client = RefusingClient;
    let coordinator = MergeCoordinator::for_class::<Book>(&workspace.config, &registry, &controller)
        .with_client(&client);

    let err = coordinator
        .update_attributes("books", &[1_u64], &updates(&[("deleted", Value::from(true))]))
        .unwrap_err();
    assert!(matches!(err, Error::Client { .. }));
    assert!(err.is_retryable());
    let source = std::error::Error::source(&err)
        .and_then(|e| e.downcast_ref::<std::io::Error>())
        .unwrap();
    assert_eq!(source.kind(), std::io::ErrorKind::ConnectionRefused);
}
