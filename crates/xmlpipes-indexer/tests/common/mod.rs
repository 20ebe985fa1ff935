//! Common fixtures and test doubles for the indexer integration tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use xmlpipes_core::{
    AttributeOptions, Config, Document, Error, Index, Indexable, QueryRequest, QueryResult,
    Registry, Result, SearchClient, Value,
};
use xmlpipes_indexer::{Controller, MergeOptions, RebuildOptions};

/// A book with every attribute type the `books` index declares.
#[derive(Debug, Clone)]
pub struct Book {
    pub id: u64,
    pub title: &'static str,
    pub authors: Option<&'static str>,
    pub volumes: Option<i64>,
    pub deleted: bool,
    pub tags: Option<Vec<&'static str>>,
}

impl Book {
    pub fn new(id: u64, title: &'static str) -> Self {
        Self {
            id,
            title,
            authors: None,
            volumes: None,
            deleted: false,
            tags: None,
        }
    }
}

impl Document for Book {
    fn document_id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "title" => Some(self.title.to_string()),
            "authors" => self.authors.map(str::to_string),
            _ => None,
        }
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "volumes" => self.volumes.map(Value::from),
            "deleted" => Some(Value::from(self.deleted)),
            "published_at" => Some(Value::from(
                Utc.timestamp_opt(1_287_579_577, 0).single()?,
            )),
            "tags" => self.tags.clone().map(Value::from),
            _ => None,
        }
    }
}

impl Indexable for Book {
    const TYPE_NAME: &'static str = "Book";
}

/// Registry with `Book` indexed as "books" (deltas, sources "books" and
/// "manga") and "titles".
pub fn registry() -> Registry {
    let mut books = Index::of::<Book>("books");
    books.enable_deltas();
    books
        .schema()
        .field("title")
        .field("authors")
        .integer("volumes", AttributeOptions::new().with_bits(8).with_default(1))
        .unwrap()
        .boolean("deleted", AttributeOptions::new().with_default(false))
        .unwrap()
        .timestamp("published_at", AttributeOptions::new())
        .unwrap()
        .multi("tags", AttributeOptions::new().with_default(vec!["x", "y"]))
        .unwrap();
    books.source(Some("manga")).default("volumes", 3);

    let mut titles = Index::of::<Book>("titles");
    titles.schema().field("title");

    let mut registry = Registry::new();
    registry.register::<Book>(books).register::<Book>(titles);
    registry
}

/// Temporary pipes directory and a config pointing at it.
pub struct Workspace {
    pub dir: TempDir,
    pub config: Config,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path(), "test").with_pipes_path(dir.path().join("pipes"));
        Self { dir, config }
    }

    pub fn read(&self, file: &str) -> String {
        std::fs::read_to_string(self.config.pipes_path().join(file)).unwrap()
    }

    pub fn exists(&self, file: &str) -> bool {
        self.config.pipes_path().join(file).exists()
    }
}

/// Controller that records every call and always succeeds.
#[derive(Default)]
pub struct RecordingController {
    pub calls: RefCell<Vec<String>>,
    pub running: bool,
}

impl Controller for RecordingController {
    fn rebuild(&self, index: &str, options: &RebuildOptions) -> Result<i32> {
        let rotate = if options.rotate { " --rotate" } else { "" };
        self.calls.borrow_mut().push(format!("rebuild {index}{rotate}"));
        Ok(0)
    }

    fn merge(&self, dst: &str, src: &str, options: &MergeOptions) -> Result<i32> {
        let mut call = format!("merge {dst} {src}");
        for range in &options.ranges {
            call.push_str(&format!(" {} {} {}", range.attribute, range.min, range.max));
        }
        self.calls.borrow_mut().push(call);
        Ok(0)
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn pid(&self) -> Option<u32> {
        None
    }
}

/// One recorded attribute update.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub index: String,
    pub attributes: Vec<String>,
    pub values: BTreeMap<u64, Vec<Value>>,
}

/// Search client that records attribute updates.
#[derive(Default)]
pub struct RecordingClient {
    pub updates: RefCell<Vec<Update>>,
}

impl SearchClient for RecordingClient {
    fn query(&self, _request: &QueryRequest) -> Result<QueryResult> {
        Ok(QueryResult::default())
    }

    fn update_attributes(
        &self,
        index: &str,
        attributes: &[String],
        values: &BTreeMap<u64, Vec<Value>>,
    ) -> Result<()> {
        self.updates.borrow_mut().push(Update {
            index: index.to_string(),
            attributes: attributes.to_vec(),
            values: values.clone(),
        });
        Ok(())
    }
}

/// Search client whose daemon is never reachable.
pub struct RefusingClient;

impl RefusingClient {
    fn refused() -> Error {
        Error::client_with_source(
            "searchd unreachable",
            std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        )
    }
}

impl SearchClient for RefusingClient {
    fn query(&self, _request: &QueryRequest) -> Result<QueryResult> {
        Err(Self::refused())
    }

    fn update_attributes(
        &self,
        _index: &str,
        _attributes: &[String],
        _values: &BTreeMap<u64, Vec<Value>>,
    ) -> Result<()> {
        Err(Self::refused())
    }
}
