//! Common fixtures and test doubles for the search integration tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use xmlpipes_core::{
    AttributeOptions, CLASS_TAG_ATTRIBUTE, Document, Error, Index, Indexable, Match,
    QueryRequest, QueryResult, Registry, Result, SearchClient, Value, class_tag,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: u64,
}

impl Document for Book {
    fn document_id(&self) -> u64 {
        self.id
    }
}

impl Indexable for Book {
    const TYPE_NAME: &'static str = "Book";

    fn from_document_id(id: u64) -> Result<Self> {
        Ok(Book { id })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: u64,
}

impl Document for Author {
    fn document_id(&self) -> u64 {
        self.id
    }
}

impl Indexable for Author {
    const TYPE_NAME: &'static str = "Author";

    fn from_document_id(id: u64) -> Result<Self> {
        Ok(Author { id })
    }
}

/// A type registered without a lookup hook.
#[derive(Debug)]
pub struct Draft;

impl Document for Draft {
    fn document_id(&self) -> u64 {
        0
    }
}

impl Indexable for Draft {
    const TYPE_NAME: &'static str = "Draft";
}

/// Registry with "books" (deltas; volumes, published_at), "authors"
/// (born_at) and "drafts".
pub fn registry() -> Registry {
    let mut books = Index::of::<Book>("books");
    books.enable_deltas();
    books
        .schema()
        .field("title")
        .integer("volumes", AttributeOptions::new())
        .unwrap()
        .timestamp("published_at", AttributeOptions::new())
        .unwrap();

    let mut authors = Index::of::<Author>("authors");
    authors
        .schema()
        .field("name")
        .timestamp("born_at", AttributeOptions::new())
        .unwrap();

    let mut drafts = Index::of::<Draft>("drafts");
    drafts.schema().field("body");

    let mut registry = Registry::new();
    registry
        .register::<Book>(books)
        .register::<Author>(authors)
        .register::<Draft>(drafts);
    registry
}

/// A hit tagged as `T`.
pub fn hit<T: Indexable>(id: u64) -> Match {
    Match {
        document_id: id,
        attributes: BTreeMap::from([(
            CLASS_TAG_ATTRIBUTE.to_string(),
            Value::Int(i64::from(class_tag::<T>())),
        )]),
    }
}

/// Client that answers every query with the same hits and records the
/// requests it saw.
#[derive(Default)]
pub struct RecordingClient {
    pub matches: Vec<Match>,
    pub total_found: Option<u64>,
    pub total: Option<u64>,
    pub requests: RefCell<Vec<QueryRequest>>,
}

impl RecordingClient {
    pub fn with_matches(matches: Vec<Match>) -> Self {
        let count = matches.len() as u64;
        Self {
            matches,
            total_found: Some(count),
            total: Some(count),
            ..Default::default()
        }
    }
}

impl SearchClient for RecordingClient {
    fn query(&self, request: &QueryRequest) -> Result<QueryResult> {
        self.requests.borrow_mut().push(request.clone());
        Ok(QueryResult {
            matches: self.matches.clone(),
            total_found: self.total_found,
            total: self.total,
        })
    }

    fn update_attributes(
        &self,
        _index: &str,
        _attributes: &[String],
        _values: &BTreeMap<u64, Vec<Value>>,
    ) -> Result<()> {
        Ok(())
    }
}

/// Client whose daemon refuses every connection.
pub struct RefusingClient;

impl SearchClient for RefusingClient {
    fn query(&self, _request: &QueryRequest) -> Result<QueryResult> {
        Err(Error::client_with_source(
            "searchd unreachable",
            std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        ))
    }

    fn update_attributes(
        &self,
        _index: &str,
        _attributes: &[String],
        _values: &BTreeMap<u64, Vec<Value>>,
    ) -> Result<()> {
        Ok(())
    }
}
