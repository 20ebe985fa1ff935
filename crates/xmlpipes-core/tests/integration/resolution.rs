//! Class-tag resolution of search hits.

use std::collections::BTreeMap;

use xmlpipes_core::{class_tag, Error, Match, Value, CLASS_TAG_ATTRIBUTE};

use crate::common::{registry, Article, Book};

fn hit(id: u64, tag: u32) -> Match {
    Match {
        document_id: id,
        attributes: BTreeMap::from([(CLASS_TAG_ATTRIBUTE.to_string(), Value::from(tag))]),
    }
}

#[test]
fn test_every_registered_type_round_trips() {
    let registry = registry();
    for class in registry.classes() {
        assert_eq!(registry.class_for_tag(class.tag()), Some(class.name()));
    }
}

#[test]
fn test_resolve_book() {
    let registry = registry();
    let document = registry.resolve(&hit(7, class_tag::<Book>())).unwrap();
    let book = document.downcast_ref::<Book>().unwrap();
    assert_eq!(book, &Book::new(7, "loaded"));
}

#[test]
fn test_resolve_article_is_not_implemented() {
    let registry = registry();
    let result = registry.resolve(&hit(7, class_tag::<Article>()));
    assert!(matches!(result, Err(Error::NotImplemented { .. })));
}

#[test]
fn test_hit_without_tag_is_unknown() {
    let registry = registry();
    let result = registry.resolve(&Match {
        document_id: 7,
        attributes: BTreeMap::new(),
    });
    assert!(matches!(result, Err(Error::UnknownClassTag(0))));
}
