//! XMLPipes umbrella crate.
//!
//! Re-exports the XMLPipes components. The core types are always
//! available; export and lifecycle control sit behind `indexer`, query
//! building behind `search`.

pub use xmlpipes_core as core;
pub use xmlpipes_core::{Config, Document, Error, Index, Indexable, Registry, Result, Value};

#[cfg(feature = "indexer")]
pub use xmlpipes_indexer as indexer;

#[cfg(feature = "search")]
pub use xmlpipes_search as search;
