//! Application-level indexing cycle for types with a single index.

use std::collections::BTreeMap;

use xmlpipes_core::{
    AsDocumentId, Config, Document, Error, Generation, Index, Indexable, Registry, Result,
    SearchClient, Source, Value,
};

use crate::controller::{Controller, MergeOptions, RebuildOptions};
use crate::coordinator::MergeCoordinator;
use crate::export::DocumentExporter;

/// Binds a type's first index and that index's first source.
///
/// ```text
/// clean  : core = [],   delta = [],   rebuild
/// index  : core = docs, delta = [],   rebuild
/// merge  :              delta = docs, merge
/// kill   :              kill-list,    merge
/// ```
pub struct Simple<'a> {
    config: &'a Config,
    index: &'a Index,
    source: &'a Source,
    coordinator: MergeCoordinator<'a>,
}

impl<'a> Simple<'a> {
    /// Strategy for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `T` has no registered index or its first
    /// index has no source.
    pub fn for_class<T: Indexable>(
        config: &'a Config,
        registry: &'a Registry,
        controller: &'a dyn Controller,
    ) -> Result<Self> {
        let indexes = registry.indexes_of::<T>();
        let index = indexes
            .first()
            .ok_or_else(|| Error::config(format!("{} has no registered index", T::TYPE_NAME)))?;
        let source = index
            .sources()
            .first()
            .ok_or_else(|| Error::config(format!("Index '{}' has no source", index.name())))?;

        Ok(Self {
            config,
            index,
            source,
            coordinator: MergeCoordinator::new(config, std::slice::from_ref(index), controller),
        })
    }

    /// Attach the search client used by [`Simple::update_attributes`].
    pub fn with_client(mut self, client: &'a dyn SearchClient) -> Self {
        self.coordinator = self.coordinator.with_client(client);
        self
    }

    /// The bound index.
    pub fn index_declaration(&self) -> &Index {
        self.index
    }

    fn exporter(&self) -> DocumentExporter<'a> {
        DocumentExporter::new(self.config, std::slice::from_ref(self.index))
    }

    fn empty_delta(&self) -> Result<()> {
        self.exporter()
            .export::<Empty>(Generation::Delta, self.source.name(), &[])
            .map(drop)
    }

    /// Empty both generations and rebuild.
    pub fn clean(&self, options: &RebuildOptions) -> Result<()> {
        self.exporter()
            .export::<Empty>(Generation::Core, self.source.name(), &[])?;
        self.empty_delta()?;
        self.coordinator.index(self.index.name(), options)
    }

    /// Export `documents` as core, empty the delta, and rebuild.
    pub fn index<D: Document>(&self, documents: &[D], options: &RebuildOptions) -> Result<()> {
        self.exporter()
            .export(Generation::Core, self.source.name(), documents)?;
        self.empty_delta()?;
        self.coordinator.index(self.index.name(), options)
    }

    /// Export `documents` as delta and merge it into core.
    pub fn merge<D: Document>(&self, documents: &[D], options: &MergeOptions) -> Result<()> {
        self.exporter()
            .export(Generation::Delta, self.source.name(), documents)?;
        self.coordinator.merge(self.index.name(), options)
    }

    /// Kill `documents` (ids or documents) and merge.
    pub fn kill<I: AsDocumentId>(&self, documents: &[I], options: &MergeOptions) -> Result<()> {
        self.coordinator.kill(self.index.name(), documents, options)
    }

    /// Update attribute values in place.
    pub fn update_attributes<I: AsDocumentId>(
        &self,
        documents: &[I],
        updates: &BTreeMap<String, Value>,
    ) -> Result<()> {
        self.coordinator
            .update_attributes(self.index.name(), documents, updates)
    }
}

/// Placeholder document type for empty exports.
enum Empty {}

impl Document for Empty {
    fn document_id(&self) -> u64 {
        match *self {}
    }
}
