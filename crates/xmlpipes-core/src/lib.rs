//! Core types for XMLPipes.
//!
//! XMLPipes lets an application declare searchable types, export their
//! documents as xmlpipe2 document-sets for the Sphinx indexer, and query the
//! search daemon. This crate holds everything the exporter and the query
//! builder share.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      xmlpipes-core                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Value + cast (bool/int/float/timestamp/multi/ordinal)      │
//! │  Schema (Field, Attribute, class tag)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Index (core/delta generations, Source, descriptors)       │
//! │  Config (paths, daemon address, index option defaults)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Document / Indexable traits + Registry (tag → type)       │
//! │  SearchClient trait (QueryRequest, QueryResult, Filter)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The exporter and coordinator live in `xmlpipes-indexer`; the query
//! builder lives in `xmlpipes-search`.

pub mod cast;
pub mod client;
pub mod config;
pub mod error;
pub mod index;
pub mod registry;
pub mod schema;
pub mod value;

// Re-exports
pub use client::{
    Filter, FilterValues, Match, MatchMode, QueryRequest, QueryResult, SearchClient, SortMode,
};
pub use config::{Config, IndexOption};
pub use error::{Error, Result};
pub use index::{
    DistributedIndex, Generation, Index, IndexDescriptor, LocalIndex, Source, SourceDescriptor,
};
pub use registry::{class_tag, AsDocumentId, Document, Indexable, RegisteredClass, Registry};
pub use schema::{
    Attribute, AttributeOptions, AttributeType, Field, Schema, CLASS_TAG_ATTRIBUTE,
};
pub use value::Value;
