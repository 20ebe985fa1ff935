//! Core/delta lifecycle coordination.
//!
//! The coordinator decides which generations to rebuild and in which order,
//! then hands the work to a [`Controller`]:
//!
//! | Operation | Deltas enabled | Deltas disabled |
//! |-----------|----------------|-----------------|
//! | `index` | rebuild delta, rebuild core | rebuild core |
//! | `merge` | rebuild delta, merge delta → core | no-op |
//! | `kill` | kill-list, rebuild delta, merge | no-op |
//!
//! Every call is synchronous. A non-zero exit status becomes
//! [`Error::CommandFailed`] and stops the sequence. Unknown index names are
//! silent no-ops.

use std::collections::{BTreeMap, BTreeSet};

use xmlpipes_core::{
    AsDocumentId, Config, Error, Index, Indexable, Registry, Result, SearchClient, Value,
};

use crate::controller::{Controller, MergeOptions, MergeRange, RebuildOptions};
use crate::export::KillListExporter;

/// Drives rebuilds, merges, kill-lists, and live attribute updates for one
/// application type's indexes.
pub struct MergeCoordinator<'a> {
    config: &'a Config,
    indexes: &'a [Index],
    controller: &'a dyn Controller,
    client: Option<&'a dyn SearchClient>,
}

impl<'a> MergeCoordinator<'a> {
    /// Coordinator over an explicit set of indexes.
    pub fn new(config: &'a Config, indexes: &'a [Index], controller: &'a dyn Controller) -> Self {
        Self {
            config,
            indexes,
            controller,
            client: None,
        }
    }

    /// Coordinator over every index registered for `T`.
    pub fn for_class<T: Indexable>(
        config: &'a Config,
        registry: &'a Registry,
        controller: &'a dyn Controller,
    ) -> Self {
        Self::new(config, registry.indexes_of::<T>(), controller)
    }

    /// Attach the search client used for live attribute updates.
    pub fn with_client(mut self, client: &'a dyn SearchClient) -> Self {
        self.client = Some(client);
        self
    }

    fn index_named(&self, name: &str) -> Option<&'a Index> {
        self.indexes.iter().find(|i| i.name() == name)
    }

    /// Rebuild an index: delta first when enabled, then core.
    pub fn index(&self, name: &str, options: &RebuildOptions) -> Result<()> {
        let Some(index) = self.index_named(name) else {
            log::debug!("No index named '{name}', nothing to rebuild");
            return Ok(());
        };

        let options = RebuildOptions {
            rotate: options.rotate || self.controller.is_running(),
            ..options.clone()
        };
        if index.has_deltas() {
            self.rebuild(&index.delta_name(), &options)?;
        }
        self.rebuild(&index.core_name(), &options)
    }

    /// Rebuild the delta generation and merge it into core.
    ///
    /// Ranges naming attributes the index does not declare are dropped.
    pub fn merge(&self, name: &str, options: &MergeOptions) -> Result<()> {
        let Some(index) = self.index_named(name) else {
            log::debug!("No index named '{name}', nothing to merge");
            return Ok(());
        };
        if !index.has_deltas() {
            log::debug!("Index '{name}' has no deltas, nothing to merge");
            return Ok(());
        }

        let options = MergeOptions {
            rotate: options.rotate || self.controller.is_running(),
            ranges: merge_ranges(index, &options.ranges)?,
            ..options.clone()
        };

        self.rebuild(&index.delta_name(), &options.rebuild_options())?;

        let (dst, src) = (index.core_name(), index.delta_name());
        log::info!("Merging {src} into {dst}");
        let status = self.controller.merge(&dst, &src, &options)?;
        check_status(format!("merge {dst} {src}"), status)
    }

    /// Write a kill-list for `documents` to the index's first source, then
    /// merge.
    pub fn kill<I: AsDocumentId>(
        &self,
        name: &str,
        documents: &[I],
        options: &MergeOptions,
    ) -> Result<()> {
        let Some(index) = self.index_named(name) else {
            log::debug!("No index named '{name}', nothing to kill");
            return Ok(());
        };
        let Some(source) = index.sources().first() else {
            return Ok(());
        };

        KillListExporter::new(self.config, std::slice::from_ref(index))
            .export(source.name(), documents)?;
        self.merge(name, options)
    }

    /// Update attribute values in place on the daemon.
    ///
    /// Only indexes with `docinfo = extern` support this; others, and maps
    /// with no declared attribute, are silent no-ops.
    ///
    /// # Errors
    ///
    /// - [`Error::Client`] if no client is attached or the update fails
    /// - cast errors for values that do not fit their attribute
    pub fn update_attributes<I: AsDocumentId>(
        &self,
        name: &str,
        documents: &[I],
        updates: &BTreeMap<String, Value>,
    ) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let Some(index) = self.index_named(name) else {
            return Ok(());
        };
        if index.docinfo().as_deref() != Some("extern") {
            log::debug!("Index '{name}' does not use extern docinfo, skipping update");
            return Ok(());
        }

        // One row per document; repeated ids would misalign the update.
        let mut seen = BTreeSet::new();
        let ids: Vec<u64> = documents
            .iter()
            .map(AsDocumentId::as_document_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let mut attributes = Vec::new();
        let mut values: BTreeMap<u64, Vec<Value>> = BTreeMap::new();

        for attribute in index.attributes() {
            let Some(raw) = updates.get(attribute.name()) else {
                continue;
            };
            let value = attribute.cast(raw)?;
            for id in &ids {
                values.entry(*id).or_default().push(value.clone());
            }
            attributes.push(attribute.name().to_string());
        }

        if attributes.is_empty() {
            log::debug!("No declared attributes in update for '{name}'");
            return Ok(());
        }

        let client = self
            .client
            .ok_or_else(|| Error::client("No search client attached for attribute updates"))?;
        log::info!(
            "Updating {} on {} document(s) in '{name}'",
            attributes.join(", "),
            ids.len()
        );
        client.update_attributes(index.name(), &attributes, &values)
    }

    fn rebuild(&self, generation: &str, options: &RebuildOptions) -> Result<()> {
        log::info!("Rebuilding {generation}");
        let status = self.controller.rebuild(generation, options)?;
        check_status(format!("rebuild {generation}"), status)
    }
}

fn check_status(command: String, status: i32) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        Err(Error::CommandFailed { command, status })
    }
}

/// Keep ranges on declared attributes, casting their bounds.
fn merge_ranges(index: &Index, ranges: &[MergeRange]) -> Result<Vec<MergeRange>> {
    let mut kept = Vec::with_capacity(ranges.len());
    for range in ranges {
        match index.schema_ref().attribute_named(&range.attribute) {
            Some(attribute) => kept.push(MergeRange {
                attribute: range.attribute.clone(),
                min: attribute.cast(&range.min)?,
                max: attribute.cast(&range.max)?,
            }),
            None => log::warn!(
                "Dropping merge range on undeclared attribute '{}' of '{}'",
                range.attribute,
                index.name()
            ),
        }
    }
    Ok(kept)
}

// ============================================================================
// Tests
// ============================================================================
