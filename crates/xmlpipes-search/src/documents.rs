//! Materializing search hits into application instances.

use std::slice;

use xmlpipes_core::{Document, Match, Registry, Result};

/// Iterator resolving each hit through the registry, in daemon order.
///
/// Every item is resolved independently; an unknown class tag or a failed
/// lookup yields an error for that hit only.
pub struct Documents<'a> {
    hits: slice::Iter<'a, Match>,
    registry: &'a Registry,
}

impl<'a> Documents<'a> {
    /// Iterate over `hits`.
    pub fn new(hits: &'a [Match], registry: &'a Registry) -> Self {
        Self {
            hits: hits.iter(),
            registry,
        }
    }
}

impl Iterator for Documents<'_> {
    type Item = Result<Box<dyn Document>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.hits.next().map(|hit| self.registry.resolve(hit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hits.size_hint()
    }
}

impl ExactSizeIterator for Documents<'_> {}
