//! Transport failures reaching the caller.

use std::io;

use xmlpipes_core::Error;
use xmlpipes_search::{PageOptions, RegistrySearch};

use crate::common::{Book, RecordingClient, RefusingClient, hit, registry};

#[test]
fn test_refused_connection_reaches_caller() {
    let registry = registry();
    let search = registry.search::<Book>(["dune"]);

    let err = search.results(&RefusingClient).unwrap_err();
    assert!(matches!(err, Error::Client { .. }));
    let source = std::error::Error::source(&err)
        .and_then(|e| e.downcast_ref::<io::Error>())
        .unwrap();
    assert_eq!(source.kind(), io::ErrorKind::ConnectionRefused);
    assert!(!search.is_populated());
}

#[test]
fn test_failed_query_is_retried_on_next_access() {
    let registry = registry();
    let search = registry.search::<Book>(["dune"]);

    assert!(search.document_ids(&RefusingClient).is_err());
    assert!(search.documents(&RefusingClient, &registry).is_err());
    assert!(!search.is_populated());

    let client = RecordingClient::with_matches(vec![hit::<Book>(3)]);
    assert_eq!(search.document_ids(&client).unwrap(), [3]);
    assert!(search.is_populated());
    assert_eq!(client.requests.borrow().len(), 1);
}

#[test]
fn test_paginated_totals_surface_refusal() {
    let page = registry()
        .search::<Book>(["dune"])
        .paginate(PageOptions::page(2));
    assert!(matches!(
        page.total_entries(&RefusingClient),
        Err(Error::Client { .. })
    ));
    assert!(!page.search().is_populated());
}
