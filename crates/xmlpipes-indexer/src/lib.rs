//! Document export and index lifecycle for XMLPipes.
//!
//! Declared indexes (see `xmlpipes-core`) are fed to the Sphinx indexer as
//! xmlpipe2 document-sets. This crate writes those document-sets, writes
//! kill-lists for soft deletion, and sequences rebuilds and delta merges
//! through an external [`Controller`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      xmlpipes-indexer                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Simple (first index + first source of a type)              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  MergeCoordinator ──► Controller (CommandController)        │
//! │         │       └───► SearchClient (attribute updates)      │
//! │         ▼                                                    │
//! │  DocumentExporter / KillListExporter                        │
//! │         │                                                    │
//! │         ▼                                                    │
//! │  DocsetWriter (quick-xml) ──► atomic_write (tempfile)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use xmlpipes_indexer::{CommandController, DocumentExporter, MergeCoordinator};
//!
//! let exporter = DocumentExporter::for_class::<Book>(&config, &registry);
//! exporter.export(Generation::Delta, "books", &changed_books)?;
//!
//! let controller = CommandController::new(&config);
//! MergeCoordinator::for_class::<Book>(&config, &registry, &controller)
//!     .merge("books", &MergeOptions::default())?;
//! ```

pub mod atomic;
pub mod controller;
pub mod coordinator;
pub mod export;
pub mod render;
pub mod strategy;

// Re-exports
pub use atomic::atomic_write;
pub use controller::{CommandController, Controller, MergeOptions, MergeRange, RebuildOptions};
pub use coordinator::MergeCoordinator;
pub use export::{DocumentExporter, KillListExporter};
pub use render::{render_documents, render_killlist, DocsetWriter};
pub use strategy::Simple;
