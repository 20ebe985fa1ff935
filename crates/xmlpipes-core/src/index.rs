//! Index and source declarations.
//!
//! An [`Index`] belongs to one application type and owns a [`Schema`] plus an
//! ordered, uniqued-by-name list of [`Source`]s. Each index has a *core*
//! generation and, once [`Index::enable_deltas`] is called, a *delta*
//! generation declared as a child of core:
//!
//! ```text
//! books (distributed)
//!   ├── books_core  ← books_core_source, manga_core_source
//!   └── books_delta ← books_delta_source, manga_delta_source   (parent: books_core)
//! ```
//!
//! [`Index::descriptors`] projects this into plain data for whatever writes
//! the daemon's configuration file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::cast;
use crate::config::{check_index_option, Config, IndexOption, INDEX_OPTION_KEYS};
use crate::error::Result;
use crate::registry::Indexable;
use crate::schema::{Attribute, Field, Schema};
use crate::value::Value;

/// One of the two parallel index generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    /// Large, rarely rebuilt body of the index.
    Core,
    /// Small, frequently rebuilt index of recent changes.
    Delta,
}

impl Generation {
    /// Lowercase name used in generated index and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::Core => "core",
            Generation::Delta => "delta",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A data source feeding an index.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    name: String,
    defaults: BTreeMap<String, Value>,
    fixup_utf8: bool,
}

impl Source {
    /// Create a source with no defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: BTreeMap::new(),
            fixup_utf8: false,
        }
    }

    /// Source name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a raw default for an attribute, embedded in the document-set
    /// preamble (cast through the attribute at export time).
    pub fn default(&mut self, attribute: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.defaults.insert(attribute.into(), value.into());
        self
    }

    /// Ask the daemon to replace invalid UTF-8 in this source's stream.
    pub fn fixup_utf8(&mut self) -> &mut Self {
        self.fixup_utf8 = true;
        self
    }

    /// Whether UTF-8 fixup is requested.
    pub fn has_fixup_utf8(&self) -> bool {
        self.fixup_utf8
    }

    /// Raw per-attribute defaults.
    pub fn defaults(&self) -> &BTreeMap<String, Value> {
        &self.defaults
    }

    /// Generated source name for a generation: `{name}_{generation}_source`.
    pub fn generation_name(&self, generation: Generation) -> String {
        format!("{}_{}_source", self.name, generation)
    }

    /// `{name}_core_source`
    pub fn core_name(&self) -> String {
        self.generation_name(Generation::Core)
    }

    /// `{name}_delta_source`
    pub fn delta_name(&self) -> String {
        self.generation_name(Generation::Delta)
    }

    /// Document-set path for a generation.
    pub fn path(&self, config: &Config, generation: Generation) -> PathBuf {
        config
            .pipes_path()
            .join(format!("{}.xml", self.generation_name(generation)))
    }

    /// `{pipes_path}/{name}_core_source.xml`
    pub fn core_path(&self, config: &Config) -> PathBuf {
        self.path(config, Generation::Core)
    }

    /// `{pipes_path}/{name}_delta_source.xml`
    pub fn delta_path(&self, config: &Config) -> PathBuf {
        self.path(config, Generation::Delta)
    }

    fn descriptor(&self, config: &Config, generation: Generation) -> SourceDescriptor {
        let path = self.path(config, generation);
        SourceDescriptor {
            name: self.generation_name(generation),
            kind: "xmlpipe2",
            command: format!("cat {}", path.display()),
            parent: match generation {
                Generation::Core => None,
                Generation::Delta => Some(self.core_name()),
            },
            fixup_utf8: generation == Generation::Core && self.fixup_utf8,
        }
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// Source section of the daemon configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescriptor {
    /// Generated source name.
    pub name: String,
    /// Source type, always `xmlpipe2`.
    pub kind: &'static str,
    /// Command the indexer runs to read the document-set.
    pub command: String,
    /// Parent source (delta sources inherit from core).
    pub parent: Option<String>,
    /// UTF-8 fixup flag (core only).
    pub fixup_utf8: bool,
}

/// Plain (local) index section of the daemon configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalIndex {
    /// Generation name (`{index}_core` / `{index}_delta`).
    pub name: String,
    /// On-disk path prefix for the index files.
    pub path: PathBuf,
    /// Sources feeding this generation.
    pub sources: Vec<SourceDescriptor>,
    /// Parent index (delta inherits from core).
    pub parent: Option<String>,
    /// Tuning directives.
    pub options: BTreeMap<String, IndexOption>,
}

/// Distributed index aggregating the local generations.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributedIndex {
    /// Index name.
    pub name: String,
    /// Local generation names, core first.
    pub locals: Vec<String>,
}

/// One index section of the daemon configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexDescriptor {
    /// Plain index generation.
    Local(LocalIndex),
    /// Aggregate over the generations.
    Distributed(DistributedIndex),
}

impl IndexDescriptor {
    /// Section name.
    pub fn name(&self) -> &str {
        match self {
            IndexDescriptor::Local(index) => &index.name,
            IndexDescriptor::Distributed(index) => &index.name,
        }
    }
}

// ============================================================================
// Index
// ============================================================================

/// A named, searchable index of one application type.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    name: String,
    klass: String,
    schema: Schema,
    sources: Vec<Source>,
    deltas: bool,
    options: BTreeMap<String, IndexOption>,
}

impl Index {
    /// Declare an index owned by the type named `klass`.
    pub fn new(name: impl Into<String>, klass: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            klass: klass.into(),
            schema: Schema::new(),
            sources: Vec::new(),
            deltas: false,
            options: BTreeMap::new(),
        }
    }

    /// Declare an index owned by `T`.
    pub fn of<T: Indexable>(name: impl Into<String>) -> Self {
        Self::new(name, T::TYPE_NAME)
    }

    pub(crate) fn bind(&mut self, klass: &str) {
        self.klass = klass.to_string();
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning application type.
    pub fn klass(&self) -> &str {
        &self.klass
    }

    /// Class tag written into every exported document.
    pub fn class_tag(&self) -> u32 {
        cast::checksum(&self.klass)
    }

    /// Mutable schema; creates the default source (named after the index)
    /// if no source exists yet.
    pub fn schema(&mut self) -> &mut Schema {
        if self.sources.is_empty() {
            self.sources.push(Source::new(self.name.clone()));
        }
        &mut self.schema
    }

    /// Declared schema.
    pub fn schema_ref(&self) -> &Schema {
        &self.schema
    }

    /// Declare a source, replacing any existing source of the same name.
    /// `None` names the source after the index.
    pub fn source(&mut self, name: Option<&str>) -> &mut Source {
        let name = name.unwrap_or(&self.name).to_string();
        self.sources.retain(|s| s.name != name);
        self.sources.push(Source::new(name));
        let last = self.sources.len() - 1;
        &mut self.sources[last]
    }

    /// Sources in declaration order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Look up a source by name.
    pub fn source_named(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Enable the delta generation.
    pub fn enable_deltas(&mut self) -> &mut Self {
        self.deltas = true;
        self
    }

    /// Whether the delta generation is enabled.
    pub fn has_deltas(&self) -> bool {
        self.deltas
    }

    /// Override a tuning directive for this index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for unknown directives.
    pub fn set(&mut self, key: &str, value: impl Into<IndexOption>) -> Result<&mut Self> {
        check_index_option(key)?;
        self.options.insert(key.to_string(), value.into());
        Ok(self)
    }

    /// Per-index tuning overrides.
    pub fn options(&self) -> &BTreeMap<String, IndexOption> {
        &self.options
    }

    /// Declared fields.
    pub fn fields(&self) -> &[Field] {
        self.schema.fields()
    }

    /// Attributes, class tag first.
    pub fn attributes(&self) -> &[Attribute] {
        self.schema.attributes()
    }

    /// Attribute storage mode: the explicit `docinfo` override, else
    /// `extern` when any attribute is declared.
    pub fn docinfo(&self) -> Option<String> {
        match self.options.get("docinfo") {
            Some(value) => Some(value.to_string()),
            None if !self.schema.declared_attributes().is_empty() => Some("extern".to_string()),
            None => None,
        }
    }

    /// `{name}_core`
    pub fn core_name(&self) -> String {
        format!("{}_core", self.name)
    }

    /// `{name}_delta`
    pub fn delta_name(&self) -> String {
        format!("{}_delta", self.name)
    }

    /// Name of one generation.
    pub fn generation_name(&self, generation: Generation) -> String {
        match generation {
            Generation::Core => self.core_name(),
            Generation::Delta => self.delta_name(),
        }
    }

    /// Queryable generation names: core, then delta when enabled.
    pub fn generation_names(&self) -> Vec<String> {
        let mut names = vec![self.core_name()];
        if self.deltas {
            names.push(self.delta_name());
        }
        names
    }

    /// Daemon configuration sections for this index: core, delta (when
    /// enabled), then the distributed aggregate.
    pub fn descriptors(&self, config: &Config) -> Vec<IndexDescriptor> {
        let mut descriptors = vec![IndexDescriptor::Local(self.core(config))];
        if self.deltas {
            descriptors.push(IndexDescriptor::Local(self.delta(config)));
        }
        descriptors.push(IndexDescriptor::Distributed(DistributedIndex {
            name: self.name.clone(),
            locals: self.generation_names(),
        }));
        descriptors
    }

    fn core(&self, config: &Config) -> LocalIndex {
        let mut options = BTreeMap::new();
        for key in INDEX_OPTION_KEYS {
            if let Some(value) = self
                .options
                .get(*key)
                .or_else(|| config.index_options.get(*key))
            {
                options.insert((*key).to_string(), value.clone());
            }
        }
        if !options.contains_key("docinfo")
            && let Some(docinfo) = self.docinfo()
        {
            options.insert("docinfo".to_string(), IndexOption::Str(docinfo));
        }

        LocalIndex {
            name: self.core_name(),
            path: config.searchd_file_path().join(self.core_name()),
            sources: self
                .sources
                .iter()
                .map(|s| s.descriptor(config, Generation::Core))
                .collect(),
            parent: None,
            options,
        }
    }

    fn delta(&self, config: &Config) -> LocalIndex {
        LocalIndex {
            name: self.delta_name(),
            path: config.searchd_file_path().join(self.delta_name()),
            sources: self
                .sources
                .iter()
                .map(|s| s.descriptor(config, Generation::Delta))
                .collect(),
            parent: Some(self.core_name()),
            options: BTreeMap::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
