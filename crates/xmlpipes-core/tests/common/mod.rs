//! Fixture types shared by the integration tests.

use xmlpipes_core::{AttributeOptions, Document, Index, Indexable, Registry, Result, Value};

/// A book, indexed twice ("titles" and "books").
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub volumes: Option<i64>,
    pub deleted: bool,
}

impl Book {
    pub fn new(id: u64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            volumes: None,
            deleted: false,
        }
    }
}

impl Document for Book {
    fn document_id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "title" => Some(self.title.clone()),
            _ => None,
        }
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "volumes" => self.volumes.map(Value::from),
            "deleted" => Some(Value::from(self.deleted)),
            _ => None,
        }
    }
}

impl Indexable for Book {
    const TYPE_NAME: &'static str = "Book";

    fn from_document_id(id: u64) -> Result<Self> {
        Ok(Book::new(id, "loaded"))
    }
}

/// An article with no resolution hook.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: u64,
}

impl Document for Article {
    fn document_id(&self) -> u64 {
        self.id
    }
}

impl Indexable for Article {
    const TYPE_NAME: &'static str = "Article";
}

/// Registry with `Book` ("titles", "books") and `Article` ("articles").
pub fn registry() -> Registry {
    let mut titles = Index::of::<Book>("titles");
    titles.schema().field("title");

    let mut books = Index::of::<Book>("books");
    books.enable_deltas();
    books
        .schema()
        .field("title")
        .integer("volumes", AttributeOptions::new().with_bits(8).with_default(1))
        .unwrap()
        .boolean("deleted", AttributeOptions::new().with_default(false))
        .unwrap();
    books.source(Some("manga")).default("volumes", 1);

    let mut articles = Index::of::<Article>("articles");
    articles.schema().field("body");

    let mut registry = Registry::new();
    registry
        .register::<Book>(titles)
        .register::<Book>(books)
        .register::<Article>(articles);
    registry
}
