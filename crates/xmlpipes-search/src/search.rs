//! Immutable query builder.
//!
//! Every chainable method returns a new [`Search`] and leaves the receiver
//! untouched, so a base search can be refined in several directions:
//!
//! ```rust,ignore
//! let base = registry.search::<Book>(["dune"]);
//! let recent = base.with_range("published_at", start, end);
//! let by_title = base.order(Order::attribute("title"));
//! ```
//!
//! A search executes at most once. The first call to [`Search::results`]
//! queries the daemon and caches the result set; later accessors reuse it
//! until [`Search::repopulate`] is called. Derived searches start
//! unpopulated.
//!
//! | Call | Match mode | Sort mode | Sort by |
//! |------|------------|-----------|---------|
//! | (none) | all | relevance | - |
//! | `conditions(..)` | extended | | |
//! | `order(Order::expr("a DESC"))` | | extended | `a DESC` |
//! | `order(Order::attribute("a"))` | | attr_asc | `a` |
//! | `order(Order::Relevance)` | | relevance | cleared |

use std::cell::OnceCell;
use std::collections::BTreeMap;

use xmlpipes_core::{
    CLASS_TAG_ATTRIBUTE, Config, Document, Filter, FilterValues, Indexable, MatchMode, QueryRequest,
    QueryResult, RegisteredClass, Registry, Result, SearchClient, SortMode, Value, class_tag,
};

use crate::documents::Documents;
use crate::filter::FilterInput;
use crate::star::StarPattern;

/// Index wildcard used when a search targets no particular type.
pub const ALL_INDEXES: &str = "*";

/// An application type a search is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassScope {
    name: &'static str,
    tag: u32,
    indexes: Vec<String>,
    attributes: Vec<String>,
}

impl ClassScope {
    /// Scope over a registered type's indexes and attributes.
    pub fn of(class: &RegisteredClass) -> Self {
        Self {
            name: class.name(),
            tag: class.tag(),
            indexes: class.generation_names(),
            attributes: class
                .attributes()
                .into_iter()
                .map(|a| a.name().to_string())
                .collect(),
        }
    }

    /// Scope for `T` as registered in `registry`.
    ///
    /// An unregistered type still restricts hits by its class tag but
    /// contributes no index names or attributes.
    pub fn for_class<T: Indexable>(registry: &Registry) -> Self {
        registry.class_of::<T>().map_or_else(
            || Self {
                name: T::TYPE_NAME,
                tag: class_tag::<T>(),
                indexes: Vec::new(),
                attributes: Vec::new(),
            },
            Self::of,
        )
    }

    /// Type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Class tag.
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Queryable generation names.
    pub fn indexes(&self) -> &[String] {
        &self.indexes
    }

    /// Declared attribute names.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

impl From<&RegisteredClass> for ClassScope {
    fn from(class: &RegisteredClass) -> Self {
        Self::of(class)
    }
}

/// Extended-syntax conditions appended to the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conditions {
    /// Appended verbatim.
    Text(String),
    /// Rendered as `@field value` pairs.
    Fields(Vec<(String, String)>),
}

impl Conditions {
    fn render(&self) -> String {
        match self {
            Conditions::Text(text) => text.clone(),
            Conditions::Fields(pairs) => pairs
                .iter()
                .map(|(field, value)| format!("@{field} {value}"))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<&str> for Conditions {
    fn from(text: &str) -> Self {
        Conditions::Text(text.to_string())
    }
}

impl From<String> for Conditions {
    fn from(text: String) -> Self {
        Conditions::Text(text)
    }
}

impl From<Vec<(&str, &str)>> for Conditions {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        Conditions::Fields(
            pairs
                .into_iter()
                .map(|(f, v)| (f.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Conditions {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Conditions::from(Vec::from(pairs))
    }
}

impl From<BTreeMap<String, String>> for Conditions {
    fn from(pairs: BTreeMap<String, String>) -> Self {
        Conditions::Fields(pairs.into_iter().collect())
    }
}

/// Result ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    /// Sort expression used verbatim, e.g. `@weight DESC, title ASC`.
    Expr(String),
    /// Ascending by one attribute.
    Attribute(String),
    /// Daemon relevance; clears explicit ordering.
    Relevance,
}

impl Order {
    /// Verbatim sort expression.
    pub fn expr(expr: impl Into<String>) -> Self {
        Order::Expr(expr.into())
    }

    /// Ascending attribute sort.
    pub fn attribute(name: impl Into<String>) -> Self {
        Order::Attribute(name.into())
    }
}

impl From<&str> for Order {
    fn from(expr: &str) -> Self {
        Order::expr(expr)
    }
}

/// Typed form of every search refinement, applied in one step by
/// [`Search::with_options`].
///
/// Refinements apply in field order: classes, conditions, filters, order,
/// then the scalar overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// Types to restrict the search to.
    pub classes: Vec<ClassScope>,
    /// Conditions appended to the query.
    pub conditions: Vec<Conditions>,
    /// Inclusive filters.
    pub with: Vec<(String, FilterInput)>,
    /// Exclusive filters.
    pub without: Vec<(String, FilterInput)>,
    /// Orderings, accumulated.
    pub order: Vec<Order>,
    /// Star-rewrite the query with this token pattern.
    pub star: Option<StarPattern>,
    /// Match mode override.
    pub match_mode: Option<MatchMode>,
    /// Sort mode override.
    pub sort_mode: Option<SortMode>,
    /// Result offset.
    pub offset: Option<u32>,
    /// Result limit.
    pub limit: Option<u32>,
}

/// An immutable, lazily executed search.
#[derive(Debug, Clone, Default)]
pub struct Search {
    terms: Vec<String>,
    conditions: String,
    filters: Vec<Filter>,
    sort_by: Vec<String>,
    derived_match_mode: MatchMode,
    match_mode: Option<MatchMode>,
    derived_sort_mode: SortMode,
    sort_mode: Option<SortMode>,
    classes: Vec<ClassScope>,
    offset: Option<u32>,
    limit: Option<u32>,
    star: Option<StarPattern>,
    populated: OnceCell<QueryResult>,
}

impl Search {
    /// Search for free-text `terms` across every index.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Search for `terms` with every refinement in `options` applied.
    pub fn with_options<I, S>(terms: I, options: SearchOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut search = Self::new(terms);
        search.classes.extend(options.classes);
        for conditions in &options.conditions {
            search.push_conditions(conditions);
        }
        for (attribute, input) in options.with {
            search.push_filter(&attribute, input, false);
        }
        for (attribute, input) in options.without {
            search.push_filter(&attribute, input, true);
        }
        for order in &options.order {
            search.push_order(order);
        }
        search.star = options.star;
        search.match_mode = options.match_mode;
        search.sort_mode = options.sort_mode;
        search.offset = options.offset;
        search.limit = options.limit;
        search
    }

    /// Copy of this search without its cached results.
    fn derive(&self) -> Self {
        Self {
            populated: OnceCell::new(),
            ..self.clone()
        }
    }

    // ------------------------------------------------------------------------
    // Refinements
    // ------------------------------------------------------------------------

    /// Restrict to one more type.
    pub fn in_class(&self, class: impl Into<ClassScope>) -> Self {
        let mut next = self.derive();
        next.classes.push(class.into());
        next
    }

    /// Append conditions and switch to extended matching.
    ///
    /// Field names are not checked against declared attributes; every pair
    /// becomes a free-text `@field value` condition.
    pub fn conditions(&self, conditions: impl Into<Conditions>) -> Self {
        let mut next = self.derive();
        next.push_conditions(&conditions.into());
        next
    }

    /// Keep documents whose attribute equals (any element of) `value`.
    pub fn with(&self, attribute: &str, value: impl Into<Value>) -> Self {
        self.filtered(attribute, FilterInput::Value(value.into()), false)
    }

    /// Keep documents whose attribute lies in `min..=max`.
    pub fn with_range(&self, attribute: &str, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.filtered(attribute, FilterInput::range(min, max), false)
    }

    /// Drop documents whose attribute equals (any element of) `value`.
    pub fn without(&self, attribute: &str, value: impl Into<Value>) -> Self {
        self.filtered(attribute, FilterInput::Value(value.into()), true)
    }

    /// Drop documents whose attribute lies in `min..=max`.
    pub fn without_range(
        &self,
        attribute: &str,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> Self {
        self.filtered(attribute, FilterInput::range(min, max), true)
    }

    /// Add an ordering.
    pub fn order(&self, order: impl Into<Order>) -> Self {
        let mut next = self.derive();
        next.push_order(&order.into());
        next
    }

    /// Override the match mode.
    pub fn using_match_mode(&self, mode: MatchMode) -> Self {
        Self {
            match_mode: Some(mode),
            ..self.derive()
        }
    }

    /// Override the sort mode.
    pub fn using_sort_mode(&self, mode: SortMode) -> Self {
        Self {
            sort_mode: Some(mode),
            ..self.derive()
        }
    }

    /// Star-rewrite the query with `pattern`.
    pub fn star(&self, pattern: StarPattern) -> Self {
        Self {
            star: Some(pattern),
            ..self.derive()
        }
    }

    /// Set the result offset.
    pub fn offset(&self, offset: u32) -> Self {
        Self {
            offset: Some(offset),
            ..self.derive()
        }
    }

    /// Set the result limit.
    pub fn limit(&self, limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..self.derive()
        }
    }

    fn push_conditions(&mut self, conditions: &Conditions) {
        self.conditions.push(' ');
        self.conditions.push_str(&conditions.render());
        self.derived_match_mode = MatchMode::Extended;
    }

    fn filtered(&self, attribute: &str, input: FilterInput, exclude: bool) -> Self {
        let mut next = self.derive();
        next.push_filter(attribute, input, exclude);
        next
    }

    fn push_filter(&mut self, attribute: &str, input: FilterInput, exclude: bool) {
        if !self.filterable(attribute) {
            log::warn!("Ignoring filter on undeclared attribute '{attribute}'");
            return;
        }
        let filter = Filter::new(attribute, input.normalize(), exclude);
        if !self.filters.contains(&filter) {
            self.filters.push(filter);
        }
    }

    /// Unscoped searches accept any attribute; scoped ones only those some
    /// target type declares.
    fn filterable(&self, attribute: &str) -> bool {
        self.classes.is_empty()
            || self
                .classes
                .iter()
                .any(|c| c.attributes.iter().any(|a| a == attribute))
    }

    fn push_order(&mut self, order: &Order) {
        match order {
            Order::Expr(expr) => {
                self.sort_by.push(expr.clone());
                self.derived_sort_mode = SortMode::Extended;
            }
            Order::Attribute(name) => {
                self.sort_by.push(name.clone());
                self.derived_sort_mode = SortMode::AttrAsc;
            }
            Order::Relevance => {
                self.sort_by.clear();
                self.derived_sort_mode = SortMode::Relevance;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Request assembly
    // ------------------------------------------------------------------------

    /// Star-rewrite the query with the default pattern if `config` enables
    /// star matching; otherwise the search is returned unchanged.
    pub fn star_if_allowed(&self, config: &Config) -> Self {
        if config.allow_star() {
            self.star(StarPattern::default())
        } else {
            log::debug!("Star matching is disabled, leaving query as is");
            self.clone()
        }
    }

    /// Query text: terms, then conditions, star-rewritten if enabled, trimmed.
    pub fn query(&self) -> String {
        let mut query = self.terms.join(" ");
        query.push_str(&self.conditions);
        if let Some(star) = &self.star {
            query = star.apply(&query);
        }
        query.trim().to_string()
    }

    /// Comma-joined generation names of the target types, or `*`.
    ///
    /// Types with no registered indexes fall back to `*`; the class-tag
    /// filter still restricts hits to them.
    pub fn indexes(&self) -> String {
        let names: Vec<&str> = self
            .classes
            .iter()
            .flat_map(|c| c.indexes.iter().map(String::as_str))
            .collect();
        if names.is_empty() {
            if !self.classes.is_empty() {
                log::warn!(
                    "No indexes registered for {}, searching all indexes",
                    self.classes
                        .iter()
                        .map(ClassScope::name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            return ALL_INDEXES.to_string();
        }
        names.join(",")
    }

    /// Effective match mode.
    pub fn match_mode(&self) -> MatchMode {
        self.match_mode.unwrap_or(self.derived_match_mode)
    }

    /// Effective sort mode.
    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode.unwrap_or(self.derived_sort_mode)
    }

    /// Accumulated sort clause.
    pub fn sort_by(&self) -> Option<String> {
        (!self.sort_by.is_empty()).then(|| self.sort_by.join(", "))
    }

    /// Caller-supplied filters, without the class-tag restriction.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Target types.
    pub fn classes(&self) -> &[ClassScope] {
        &self.classes
    }

    /// Class-tag restriction, present whenever the search is scoped.
    fn internal_filter(&self) -> Option<Filter> {
        (!self.classes.is_empty()).then(|| {
            let tags = self
                .classes
                .iter()
                .map(|c| Value::Int(i64::from(c.tag)))
                .collect();
            Filter::new(CLASS_TAG_ATTRIBUTE, FilterValues::Values(tags), false)
        })
    }

    /// The request sent to the daemon.
    pub fn request(&self) -> QueryRequest {
        QueryRequest {
            query: self.query(),
            indexes: self.indexes(),
            match_mode: self.match_mode(),
            sort_mode: self.sort_mode(),
            sort_by: self.sort_by(),
            filters: self
                .internal_filter()
                .into_iter()
                .chain(self.filters.iter().cloned())
                .collect(),
            offset: self.offset,
            limit: self.limit,
        }
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Whether results have been fetched.
    pub fn is_populated(&self) -> bool {
        self.populated.get().is_some()
    }

    /// Result set, querying the daemon on first use.
    ///
    /// # Errors
    ///
    /// Client failures propagate unchanged; nothing is cached on failure.
    pub fn results(&self, client: &dyn SearchClient) -> Result<&QueryResult> {
        if let Some(results) = self.populated.get() {
            return Ok(results);
        }
        let request = self.request();
        log::debug!("Querying '{}' on {}", request.query, request.indexes);
        let results = client.query(&request)?;
        Ok(self.populated.get_or_init(|| results))
    }

    /// Drop cached results and query again.
    pub fn repopulate(&mut self, client: &dyn SearchClient) -> Result<&QueryResult> {
        self.populated = OnceCell::new();
        self.results(client)
    }

    /// Document ids of the hits, in daemon order.
    pub fn document_ids(&self, client: &dyn SearchClient) -> Result<Vec<u64>> {
        Ok(self
            .results(client)?
            .matches
            .iter()
            .map(|hit| hit.document_id)
            .collect())
    }

    /// Hits resolved to application instances.
    pub fn documents<'a>(
        &'a self,
        client: &dyn SearchClient,
        registry: &'a Registry,
    ) -> Result<Documents<'a>> {
        Ok(Documents::new(&self.results(client)?.matches, registry))
    }

    /// Call `f` with each resolved instance, stopping at the first failure.
    pub fn each_document<F>(
        &self,
        client: &dyn SearchClient,
        registry: &Registry,
        mut f: F,
    ) -> Result<()>
    where
        F: FnMut(Box<dyn Document>),
    {
        for document in self.documents(client, registry)? {
            f(document?);
        }
        Ok(())
    }
}

impl PartialEq for Search {
    fn eq(&self, other: &Self) -> bool {
        self.query() == other.query()
            && self.filters == other.filters
            && self.classes == other.classes
            && self.conditions == other.conditions
            && self.match_mode() == other.match_mode()
            && self.sort_mode() == other.sort_mode()
            && self.sort_by == other.sort_by
            && self.star == other.star
            && self.offset == other.offset
            && self.limit == other.limit
    }
}

/// Starting searches from a registry.
pub trait RegistrySearch {
    /// Search restricted to `T`.
    fn search<T: Indexable>(&self, terms: impl IntoIterator<Item = impl Into<String>>) -> Search;

    /// Search restricted to every registered type.
    fn search_all(&self, terms: impl IntoIterator<Item = impl Into<String>>) -> Search;
}

impl RegistrySearch for Registry {
    fn search<T: Indexable>(&self, terms: impl IntoIterator<Item = impl Into<String>>) -> Search {
        Search::new(terms).in_class(ClassScope::for_class::<T>(self))
    }

    fn search_all(&self, terms: impl IntoIterator<Item = impl Into<String>>) -> Search {
        let mut search = Search::new(terms);
        search.classes = self.classes().iter().map(ClassScope::of).collect();
        search
    }
}

// ============================================================================
// Tests
// ============================================================================
