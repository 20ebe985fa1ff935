//! Request assembly from registry-scoped searches.

use chrono::{TimeZone, Utc};
use xmlpipes_core::{CLASS_TAG_ATTRIBUTE, FilterValues, MatchMode, SortMode, Value, class_tag};
use xmlpipes_search::{
    ClassScope, Order, PageOptions, RegistrySearch, Search, SearchOptions, StarPattern,
};

use crate::common::{Author, Book, RecordingClient, registry};

#[test]
fn test_single_class_request() {
    let registry = registry();
    let start = Utc.timestamp_opt(0, 0).unwrap();
    let end = Utc.timestamp_opt(1_287_579_577, 0).unwrap();

    let request = registry
        .search::<Book>(["dune"])
        .conditions([("title", "messiah")])
        .with_range("published_at", start, end)
        .without("volumes", vec![Value::Null, Value::from(2)])
        .order(Order::attribute("volumes"))
        .request();

    assert_eq!(request.query, "dune @title messiah");
    assert_eq!(request.indexes, "books_core,books_delta");
    assert_eq!(request.match_mode, MatchMode::Extended);
    assert_eq!(request.sort_mode, SortMode::AttrAsc);
    assert_eq!(request.sort_by.as_deref(), Some("volumes"));

    assert_eq!(request.filters.len(), 3);
    assert_eq!(request.filters[0].attribute, CLASS_TAG_ATTRIBUTE);
    assert_eq!(
        request.filters[1].values,
        FilterValues::Range(Value::Int(0), Value::Int(1_287_579_577))
    );
    assert!(request.filters[2].exclude);
    assert_eq!(
        request.filters[2].values,
        FilterValues::Values(vec![Value::Int(0), Value::Int(2)])
    );
}

#[test]
fn test_cross_class_request() {
    let registry = registry();
    let search = registry
        .search::<Book>(["frank"])
        .in_class(ClassScope::for_class::<Author>(&registry))
        .with("born_at", 0)
        .with("volumes", 1);

    let request = search.request();
    assert_eq!(request.indexes, "books_core,books_delta,authors_core");
    assert_eq!(
        request.filters[0].values,
        FilterValues::Values(vec![
            Value::Int(i64::from(class_tag::<Book>())),
            Value::Int(i64::from(class_tag::<Author>())),
        ])
    );
    assert_eq!(request.filters.len(), 3);
}

#[test]
fn test_search_all() {
    let registry = registry();
    let search = registry.search_all(["x"]);
    assert_eq!(
        search.indexes(),
        "books_core,books_delta,authors_core,drafts_core"
    );
    assert_eq!(search.classes().len(), 3);
}

#[test]
fn test_unscoped_search_hits_every_index() {
    let request = Search::new(["x"]).with("anything", 1).request();
    assert_eq!(request.indexes, "*");
    assert_eq!(request.filters.len(), 1);
    assert_eq!(request.filters[0].attribute, "anything");
}

#[test]
fn test_refinements_do_not_touch_the_base() {
    let registry = registry();
    let base = registry.search::<Book>(["dune"]);
    let refined = base
        .with("volumes", 3)
        .order("volumes DESC")
        .star(StarPattern::default());

    assert!(base.filters().is_empty());
    assert_eq!(base.sort_by(), None);
    assert_eq!(base.query(), "dune");
    assert_eq!(refined.query(), "*dune*");
    assert_ne!(base, refined);
}

#[test]
fn test_options_match_chained_calls() {
    let registry = registry();
    let chained = Search::new(["dune"])
        .in_class(ClassScope::for_class::<Book>(&registry))
        .conditions("@title messiah")
        .with("volumes", 3)
        .order("volumes DESC")
        .limit(5);

    let options = SearchOptions {
        classes: vec![ClassScope::for_class::<Book>(&registry)],
        conditions: vec!["@title messiah".into()],
        with: vec![("volumes".to_string(), Value::from(3).into())],
        order: vec!["volumes DESC".into()],
        limit: Some(5),
        ..Default::default()
    };

    assert_eq!(Search::with_options(["dune"], options), chained);
}

#[test]
fn test_paginated_request_reaches_client() {
    let registry = registry();
    let client = RecordingClient::default();
    let page = registry
        .search::<Book>(["dune"])
        .paginate(PageOptions::page(3).per_page(30));

    page.results(&client).unwrap();
    page.results(&client).unwrap();

    let requests = client.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].offset, Some(60));
    assert_eq!(requests[0].limit, Some(30));
}
