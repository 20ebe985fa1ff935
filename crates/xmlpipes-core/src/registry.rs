//! Application-type capability and the class-tag registry.
//!
//! Application types opt in by implementing [`Document`] (identifier plus
//! field/attribute accessors) and [`Indexable`] (a stable type name and an
//! instance-resolution hook), then registering their index declarations:
//!
//! ```
//! use xmlpipes_core::{Document, Index, Indexable, Registry};
//!
//! struct Book { id: u64, title: String }
//!
//! impl Document for Book {
//!     fn document_id(&self) -> u64 { self.id }
//!     fn field(&self, name: &str) -> Option<String> {
//!         (name == "title").then(|| self.title.clone())
//!     }
//! }
//!
//! impl Indexable for Book {
//!     const TYPE_NAME: &'static str = "Book";
//! }
//!
//! let mut books = Index::of::<Book>("books");
//! books.schema().field("title");
//!
//! let mut registry = Registry::new();
//! registry.register::<Book>(books);
//! assert_eq!(registry.class_for_tag(1809255439), Some("Book"));
//! ```
//!
//! Hits carry the class tag of the type that exported them, so a
//! heterogeneous result set can be turned back into typed instances with
//! [`Registry::resolve`].

use std::any::{Any, TypeId};
use std::collections::BTreeSet;

use crate::cast;
use crate::client::Match;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::{Index, IndexDescriptor};
use crate::schema::{Attribute, CLASS_TAG_ATTRIBUTE};
use crate::value::Value;

/// An exportable, identifiable application object.
///
/// Accessors return `None` when the object has no value for that name; the
/// corresponding element is then omitted from the exported document.
pub trait Document: Any {
    /// Stable document identifier.
    fn document_id(&self) -> u64;

    /// Text of a full-text field.
    fn field(&self, _name: &str) -> Option<String> {
        None
    }

    /// Raw (uncast) attribute value.
    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }
}

impl dyn Document {
    /// Borrow as a concrete type.
    pub fn downcast_ref<T: Document>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }

    /// Convert into a concrete type.
    pub fn downcast<T: Document>(self: Box<Self>) -> Option<Box<T>> {
        let any: Box<dyn Any> = self;
        any.downcast().ok()
    }
}

/// Anything that names a document: an identifier or a document itself.
pub trait AsDocumentId {
    /// The document identifier.
    fn as_document_id(&self) -> u64;
}

impl AsDocumentId for u64 {
    fn as_document_id(&self) -> u64 {
        *self
    }
}

impl<T: Document> AsDocumentId for T {
    fn as_document_id(&self) -> u64 {
        self.document_id()
    }
}

/// A type whose documents can be indexed and searched.
pub trait Indexable: Document + Sized {
    /// Stable type name; its checksum is the class tag.
    const TYPE_NAME: &'static str;

    /// Load the instance with the given document identifier.
    ///
    /// # Errors
    ///
    /// Defaults to [`Error::NotImplemented`].
    fn from_document_id(_id: u64) -> Result<Self> {
        Err(Error::not_implemented(Self::TYPE_NAME))
    }
}

/// Class tag of an indexable type.
pub fn class_tag<T: Indexable>() -> u32 {
    cast::checksum(T::TYPE_NAME)
}

type Resolver = fn(u64) -> Result<Box<dyn Document>>;

fn resolve_as<T: Indexable>(id: u64) -> Result<Box<dyn Document>> {
    Ok(Box::new(T::from_document_id(id)?))
}

/// A registered application type and its indexes.
#[derive(Debug, Clone)]
pub struct RegisteredClass {
    name: &'static str,
    tag: u32,
    type_id: TypeId,
    indexes: Vec<Index>,
    resolve: Resolver,
}

impl RegisteredClass {
    /// Type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Class tag.
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Declared indexes, in declaration order.
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Look up an index by name.
    pub fn index_named(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name() == name)
    }

    /// Queryable generation names across all indexes.
    pub fn generation_names(&self) -> Vec<String> {
        self.indexes
            .iter()
            .flat_map(Index::generation_names)
            .collect()
    }

    /// Declared attributes across all indexes, first declaration wins.
    pub fn attributes(&self) -> Vec<&Attribute> {
        let mut seen = BTreeSet::new();
        self.indexes
            .iter()
            .flat_map(|i| i.schema_ref().declared_attributes())
            .filter(|a| seen.insert(a.name().to_string()))
            .collect()
    }
}

/// Tag-to-type registry populated at index-declaration time.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    classes: Vec<RegisteredClass>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an index for `T`, replacing an earlier index of the same
    /// name.
    pub fn register<T: Indexable>(&mut self, mut index: Index) -> &mut Self {
        index.bind(T::TYPE_NAME);

        let position = match self
            .classes
            .iter()
            .position(|c| c.type_id == TypeId::of::<T>())
        {
            Some(position) => position,
            None => {
                self.classes.push(RegisteredClass {
                    name: T::TYPE_NAME,
                    tag: class_tag::<T>(),
                    type_id: TypeId::of::<T>(),
                    indexes: Vec::new(),
                    resolve: resolve_as::<T>,
                });
                self.classes.len() - 1
            }
        };

        let class = &mut self.classes[position];
        class.indexes.retain(|i| i.name() != index.name());
        log::debug!("Registered index '{}' for {}", index.name(), class.name);
        class.indexes.push(index);
        self
    }

    /// Registered types, in registration order.
    pub fn classes(&self) -> &[RegisteredClass] {
        &self.classes
    }

    /// Registration of `T`, if any.
    pub fn class_of<T: Indexable>(&self) -> Option<&RegisteredClass> {
        self.classes
            .iter()
            .find(|c| c.type_id == TypeId::of::<T>())
    }

    /// Registration with the given type name.
    pub fn class_named(&self, name: &str) -> Option<&RegisteredClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Type name registered under a class tag.
    pub fn class_for_tag(&self, tag: u32) -> Option<&'static str> {
        self.classes.iter().find(|c| c.tag == tag).map(|c| c.name)
    }

    /// Indexes declared for `T`.
    pub fn indexes_of<T: Indexable>(&self) -> &[Index] {
        self.class_of::<T>()
            .map(RegisteredClass::indexes)
            .unwrap_or_default()
    }

    /// Resolve a hit to its application instance via the hit's class tag.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownClassTag`] if no registered type owns the tag
    /// - whatever the type's [`Indexable::from_document_id`] returns
    pub fn resolve(&self, hit: &Match) -> Result<Box<dyn Document>> {
        let tag = hit
            .attributes
            .get(CLASS_TAG_ATTRIBUTE)
            .and_then(Value::as_i64)
            .and_then(|tag| u32::try_from(tag).ok())
            .unwrap_or_default();

        let class = self
            .classes
            .iter()
            .find(|c| c.tag == tag)
            .ok_or(Error::UnknownClassTag(tag))?;
        (class.resolve)(hit.document_id)
    }

    /// Daemon configuration sections for every registered index.
    pub fn descriptors(&self, config: &Config) -> Vec<IndexDescriptor> {
        self.classes
            .iter()
            .flat_map(|c| c.indexes.iter())
            .flat_map(|i| i.descriptors(config))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
