//! Search daemon client boundary.
//!
//! The daemon's wire protocol is not implemented here. Query execution and
//! live attribute updates go through the [`SearchClient`] trait; callers
//! plug in whatever transport they use.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::value::Value;

/// How query terms are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchMode {
    /// All terms must match.
    #[default]
    All,
    /// Any term may match.
    Any,
    /// Terms form an exact phrase.
    Phrase,
    /// Boolean query syntax.
    Boolean,
    /// Extended query syntax (field and proximity operators).
    Extended,
    /// Extended query syntax, second revision.
    Extended2,
    /// Filter-only scan without full-text matching.
    FullScan,
}

impl MatchMode {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::All => "all",
            MatchMode::Any => "any",
            MatchMode::Phrase => "phrase",
            MatchMode::Boolean => "boolean",
            MatchMode::Extended => "extended",
            MatchMode::Extended2 => "extended2",
            MatchMode::FullScan => "fullscan",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(MatchMode::All),
            "any" => Ok(MatchMode::Any),
            "phrase" => Ok(MatchMode::Phrase),
            "boolean" => Ok(MatchMode::Boolean),
            "extended" => Ok(MatchMode::Extended),
            "extended2" => Ok(MatchMode::Extended2),
            "fullscan" => Ok(MatchMode::FullScan),
            other => Err(Error::config(format!("Unknown match mode '{other}'"))),
        }
    }
}

/// How results are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    /// By relevance.
    #[default]
    Relevance,
    /// By attribute, ascending.
    AttrAsc,
    /// By attribute, descending.
    AttrDesc,
    /// By time segments, then relevance.
    TimeSegments,
    /// SQL-like `ORDER BY` clause.
    Extended,
    /// Arithmetic expression.
    Expr,
}

impl SortMode {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::AttrAsc => "attr_asc",
            SortMode::AttrDesc => "attr_desc",
            SortMode::TimeSegments => "time_segments",
            SortMode::Extended => "extended",
            SortMode::Expr => "expr",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = Error;

    /// Accepts the wire names plus `asc`/`desc` shorthands.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" | "attr_asc" => Ok(SortMode::AttrAsc),
            "desc" | "attr_desc" => Ok(SortMode::AttrDesc),
            "relevance" => Ok(SortMode::Relevance),
            "time_segments" => Ok(SortMode::TimeSegments),
            "extended" => Ok(SortMode::Extended),
            "expr" => Ok(SortMode::Expr),
            other => Err(Error::config(format!("Unknown sort mode '{other}'"))),
        }
    }
}

/// Values a filter matches.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValues {
    /// Any of these values.
    Values(Vec<Value>),
    /// Inclusive range.
    Range(Value, Value),
}

/// Attribute filter attached to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Attribute name.
    pub attribute: String,
    /// Matched values.
    pub values: FilterValues,
    /// Exclude matching documents instead of keeping them.
    pub exclude: bool,
}

impl Filter {
    /// Create a filter.
    pub fn new(attribute: impl Into<String>, values: FilterValues, exclude: bool) -> Self {
        Self {
            attribute: attribute.into(),
            values,
            exclude,
        }
    }
}

/// A fully assembled query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryRequest {
    /// Query text.
    pub query: String,
    /// Comma-separated index names, or `*`.
    pub indexes: String,
    /// Match mode.
    pub match_mode: MatchMode,
    /// Sort mode.
    pub sort_mode: SortMode,
    /// Sort clause or attribute.
    pub sort_by: Option<String>,
    /// Attribute filters.
    pub filters: Vec<Filter>,
    /// Result offset.
    pub offset: Option<u32>,
    /// Result limit.
    pub limit: Option<u32>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Match {
    /// Document identifier.
    pub document_id: u64,
    /// Attribute values returned with the hit.
    pub attributes: BTreeMap<String, Value>,
}

/// Result set of one query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    /// Hits, in daemon order.
    pub matches: Vec<Match>,
    /// Total number of matching documents, if reported.
    pub total_found: Option<u64>,
    /// Number of matches retrievable, if reported.
    pub total: Option<u64>,
}

/// Blocking client for the search daemon.
///
/// Transport failures are returned as [`Error::Client`] and are never
/// retried by XMLPipes.
pub trait SearchClient {
    /// Execute a query.
    fn query(&self, request: &QueryRequest) -> Result<QueryResult>;

    /// Update attribute values in place, keyed by document id.
    fn update_attributes(
        &self,
        index: &str,
        attributes: &[String],
        values: &BTreeMap<u64, Vec<Value>>,
    ) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================
