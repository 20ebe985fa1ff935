//! Resolving hits back into application instances.

use xmlpipes_core::{Error, Match};
use xmlpipes_search::{PageOptions, RegistrySearch};

use crate::common::{Author, Book, Draft, RecordingClient, hit, registry};

#[test]
fn test_documents_resolve_by_class_tag() {
    let registry = registry();
    let client = RecordingClient::with_matches(vec![hit::<Book>(4), hit::<Author>(9)]);
    let search = registry.search_all(["frank"]);

    let documents: Vec<_> = search
        .documents(&client, &registry)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].downcast_ref::<Book>(), Some(&Book { id: 4 }));
    assert_eq!(documents[1].downcast_ref::<Author>(), Some(&Author { id: 9 }));
    assert_eq!(search.document_ids(&client).unwrap(), [4, 9]);
    assert_eq!(client.requests.borrow().len(), 1);
}

#[test]
fn test_each_document_visits_in_order() {
    let registry = registry();
    let client = RecordingClient::with_matches(vec![hit::<Book>(2), hit::<Book>(1)]);
    let search = registry.search::<Book>(["x"]);

    let mut ids = Vec::new();
    search
        .each_document(&client, &registry, |document| ids.push(document.document_id()))
        .unwrap();
    assert_eq!(ids, [2, 1]);
}

#[test]
fn test_missing_hook_is_not_implemented() {
    let registry = registry();
    let client = RecordingClient::with_matches(vec![hit::<Draft>(1)]);
    let search = registry.search::<Draft>(["x"]);

    let mut documents = search.documents(&client, &registry).unwrap();
    let err = documents.next().unwrap().err().unwrap();
    assert!(matches!(err, Error::NotImplemented { .. }));
}

#[test]
fn test_unknown_tag_fails_only_that_hit() {
    let registry = registry();
    let client = RecordingClient::with_matches(vec![Match::default(), hit::<Book>(3)]);
    let search = registry.search_all(["x"]);

    let results: Vec<_> = search.documents(&client, &registry).unwrap().collect();
    assert!(matches!(results[0], Err(Error::UnknownClassTag(0))));
    assert_eq!(results[1].as_ref().unwrap().document_id(), 3);
}

#[test]
fn test_pagination_totals() {
    let registry = registry();
    let client = RecordingClient {
        total_found: Some(130),
        total: Some(120),
        ..Default::default()
    };
    let page = registry
        .search::<Book>(["x"])
        .paginate(PageOptions::page(12).per_page(10));

    assert_eq!(page.total_entries(&client).unwrap(), 130);
    assert_eq!(page.total_pages(&client).unwrap(), 12);
    assert_eq!(page.next_page(&client).unwrap(), None);
    assert_eq!(page.previous_page(), Some(11));
    assert!(!page.out_of_bounds(&client).unwrap());
}
