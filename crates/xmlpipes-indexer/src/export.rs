//! Document-set and kill-list export.
//!
//! Exports are addressed by source name across the indexes of one
//! application type, and land at the source's deterministic path for the
//! chosen generation:
//!
//! | Export | Path |
//! |--------|------|
//! | core documents | `{pipes_path}/{source}_core_source.xml` |
//! | delta documents | `{pipes_path}/{source}_delta_source.xml` |
//! | kill-list | `{pipes_path}/{source}_delta_source.xml` |
//!
//! Unknown sources, and delta exports for indexes without deltas, are
//! silent no-ops reported as `Ok(None)`.

use std::io::Write;
use std::path::PathBuf;

use xmlpipes_core::{
    AsDocumentId, Config, Document, Generation, Index, Indexable, Registry, Result, Source,
};

use crate::atomic::atomic_write;
use crate::render::DocsetWriter;

/// Find a source by name across `indexes`, first declaration wins.
fn find_source<'a>(indexes: &'a [Index], name: &str) -> Option<(&'a Index, &'a Source)> {
    indexes
        .iter()
        .find_map(|index| index.source_named(name).map(|source| (index, source)))
}

/// Writes document-sets for one application type's sources.
#[derive(Debug, Clone, Copy)]
pub struct DocumentExporter<'a> {
    config: &'a Config,
    indexes: &'a [Index],
}

impl<'a> DocumentExporter<'a> {
    /// Exporter over an explicit set of indexes.
    pub fn new(config: &'a Config, indexes: &'a [Index]) -> Self {
        Self { config, indexes }
    }

    /// Exporter over every index registered for `T`.
    pub fn for_class<T: Indexable>(config: &'a Config, registry: &'a Registry) -> Self {
        Self::new(config, registry.indexes_of::<T>())
    }

    /// Export `documents` to a generation of `source`.
    ///
    /// Returns the written path, or `None` when the export was a no-op.
    pub fn export<D: Document>(
        &self,
        generation: Generation,
        source: &str,
        documents: &[D],
    ) -> Result<Option<PathBuf>> {
        self.write(generation, source, documents.len(), |writer| {
            documents.iter().try_for_each(|d| writer.document(d))
        })
    }

    /// Export `documents` after passing each through `transform`.
    pub fn export_with<D, U, F>(
        &self,
        generation: Generation,
        source: &str,
        documents: &[D],
        mut transform: F,
    ) -> Result<Option<PathBuf>>
    where
        U: Document,
        F: FnMut(&D) -> U,
    {
        self.write(generation, source, documents.len(), |writer| {
            documents
                .iter()
                .try_for_each(|d| writer.document(&transform(d)))
        })
    }

    fn write<F>(
        &self,
        generation: Generation,
        source: &str,
        count: usize,
        render: F,
    ) -> Result<Option<PathBuf>>
    where
        F: FnOnce(&mut DocsetWriter<'_, &mut dyn Write>) -> Result<()>,
    {
        let Some((index, source)) = find_source(self.indexes, source) else {
            log::debug!("No source named '{source}', skipping {generation} export");
            return Ok(None);
        };
        if generation == Generation::Delta && !index.has_deltas() {
            log::debug!("Index '{}' has no deltas, skipping delta export", index.name());
            return Ok(None);
        }

        let path = source.path(self.config, generation);
        atomic_write(&path, |out| {
            let mut writer = DocsetWriter::begin(out, index, source)?;
            render(&mut writer)?;
            writer.finish().map(drop)
        })?;

        log::debug!("Exported {count} document(s) to {}", path.display());
        Ok(Some(path))
    }
}

/// Writes kill-lists into a source's delta document-set.
#[derive(Debug, Clone, Copy)]
pub struct KillListExporter<'a> {
    config: &'a Config,
    indexes: &'a [Index],
}

impl<'a> KillListExporter<'a> {
    /// Exporter over an explicit set of indexes.
    pub fn new(config: &'a Config, indexes: &'a [Index]) -> Self {
        Self { config, indexes }
    }

    /// Exporter over every index registered for `T`.
    pub fn for_class<T: Indexable>(config: &'a Config, registry: &'a Registry) -> Self {
        Self::new(config, registry.indexes_of::<T>())
    }

    /// Write a kill-list of `documents` (ids or documents) to `source`'s
    /// delta path.
    ///
    /// Returns the written path, or `None` when the export was a no-op.
    pub fn export<I: AsDocumentId>(&self, source: &str, documents: &[I]) -> Result<Option<PathBuf>> {
        let Some((index, source)) = find_source(self.indexes, source) else {
            log::debug!("No source named '{source}', skipping kill-list");
            return Ok(None);
        };
        if !index.has_deltas() {
            log::debug!("Index '{}' has no deltas, skipping kill-list", index.name());
            return Ok(None);
        }

        let ids: Vec<u64> = documents.iter().map(AsDocumentId::as_document_id).collect();
        let path = source.delta_path(self.config);
        atomic_write(&path, |out| {
            let mut writer = DocsetWriter::begin(out, index, source)?;
            writer.killlist(&ids)?;
            writer.finish().map(drop)
        })?;

        log::debug!("Wrote kill-list of {} id(s) to {}", ids.len(), path.display());
        Ok(Some(path))
    }
}

// ============================================================================
// Tests
// ============================================================================
