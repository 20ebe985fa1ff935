//! Query building and result handling for XMLPipes.
//!
//! [`Search`] assembles a [`QueryRequest`](xmlpipes_core::QueryRequest) from
//! free-text terms, extended conditions, attribute filters, and ordering,
//! then runs it once through a
//! [`SearchClient`](xmlpipes_core::SearchClient). Hits carry the class tag
//! of the type that exported them, so a search spanning several types
//! resolves every hit back to the right application instance.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     xmlpipes-search                        │
//! ├────────────────────────────────────────────────────────────┤
//! │  Registry ──search::<T>()──► Search ──paginate()──► Paginated
//! │                                │                           │
//! │   StarPattern (regex) ─────────┤ query()                   │
//! │   FilterInput ─────────────────┤ with / without            │
//! │                                ▼                           │
//! │                          QueryRequest ──► SearchClient     │
//! │                                              │             │
//! │                     Documents ◄── Registry::resolve        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use xmlpipes_search::{Order, PageOptions, RegistrySearch};
//!
//! let page = registry
//!     .search::<Book>(["dune"])
//!     .with("deleted", false)
//!     .order(Order::attribute("published_at"))
//!     .paginate(PageOptions::page(2));
//!
//! for book in page.documents(&client, &registry)? {
//!     println!("{}", book?.document_id());
//! }
//! ```

pub mod documents;
pub mod filter;
pub mod paginate;
pub mod search;
pub mod star;

// Re-exports
pub use documents::Documents;
pub use filter::FilterInput;
pub use paginate::{DEFAULT_PER_PAGE, PageOptions, Paginated, page_count};
pub use search::{ALL_INDEXES, ClassScope, Conditions, Order, RegistrySearch, Search, SearchOptions};
pub use star::{DEFAULT_TOKEN, StarPattern, star_query};
