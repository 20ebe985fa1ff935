//! Page-oriented view over a search.
//!
//! ```text
//! offset        = (page - 1) * per_page
//! total_pages   = ceil(total / per_page)      0 when total is unreported
//! next_page     = page + 1                    none on or past the last page
//! previous_page = page - 1                    none on page 1
//! out_of_bounds = page > total_pages
//! ```

use xmlpipes_core::{QueryResult, Registry, Result, SearchClient};

use crate::documents::Documents;
use crate::search::Search;

/// Page size used when none is given.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Which page to fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageOptions {
    /// 1-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Page size; defaults to [`DEFAULT_PER_PAGE`].
    pub per_page: Option<u32>,
}

impl PageOptions {
    /// Options for `page` at the default page size.
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: None,
        }
    }

    /// Set the page size.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

/// Number of pages needed for `total` hits.
pub fn page_count(total: Option<u64>, per_page: u32) -> u64 {
    total.map_or(0, |total| total.div_ceil(u64::from(per_page.max(1))))
}

/// One page of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated {
    search: Search,
    current_page: u32,
    per_page: u32,
}

impl Paginated {
    fn new(search: &Search, options: PageOptions) -> Self {
        let current_page = options.page.unwrap_or(1).max(1);
        let per_page = options.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
        let offset = (current_page - 1).saturating_mul(per_page);
        Self {
            search: search.limit(per_page).offset(offset),
            current_page,
            per_page,
        }
    }

    /// The page's underlying search, with limit and offset applied.
    pub fn search(&self) -> &Search {
        &self.search
    }

    /// 1-based page number.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Page size.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Index of the page's first hit.
    pub fn offset(&self) -> u32 {
        (self.current_page - 1).saturating_mul(self.per_page)
    }

    /// The page preceding this one.
    pub fn previous_page(&self) -> Option<u32> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    /// Result set of this page.
    pub fn results(&self, client: &dyn SearchClient) -> Result<&QueryResult> {
        self.search.results(client)
    }

    /// Hits on this page resolved to application instances.
    pub fn documents<'a>(
        &'a self,
        client: &dyn SearchClient,
        registry: &'a Registry,
    ) -> Result<Documents<'a>> {
        self.search.documents(client, registry)
    }

    /// Total number of matching documents, 0 if unreported.
    pub fn total_entries(&self, client: &dyn SearchClient) -> Result<u64> {
        Ok(self.results(client)?.total_found.unwrap_or(0))
    }

    /// Number of pages the retrievable hits span.
    pub fn total_pages(&self, client: &dyn SearchClient) -> Result<u64> {
        Ok(page_count(self.results(client)?.total, self.per_page))
    }

    /// The page following this one, if any.
    pub fn next_page(&self, client: &dyn SearchClient) -> Result<Option<u32>> {
        let total_pages = self.total_pages(client)?;
        Ok((u64::from(self.current_page) < total_pages).then(|| self.current_page + 1))
    }

    /// Whether this page lies past the last one.
    pub fn out_of_bounds(&self, client: &dyn SearchClient) -> Result<bool> {
        Ok(u64::from(self.current_page) > self.total_pages(client)?)
    }
}

impl Search {
    /// Page view of this search.
    pub fn paginate(&self, options: PageOptions) -> Paginated {
        Paginated::new(self, options)
    }
}

// ============================================================================
// Tests
// ============================================================================
