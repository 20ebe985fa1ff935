//! Explicit XMLPipes configuration.
//!
//! A `Config` is constructed by the caller and handed to every component that
//! needs paths, daemon addressing, or index-option defaults. Path settings
//! left unset are derived from `root` and `environment`:
//!
//! | Setting | Derived default |
//! |---------|-----------------|
//! | `pipes_path` | `{root}/tmp/{environment}` |
//! | `searchd_file_path` | `{root}/sphinx/{environment}` |
//! | `config_file` | `{root}/config/{environment}.sphinx.conf` |
//! | `pid_file` | `{root}/tmp/searchd.{environment}.pid` |
//!
//! # Example
//!
//! ```
//! use xmlpipes_core::Config;
//!
//! let config = Config::from_toml_str(r#"
//!     root = "/srv/app"
//!     environment = "production"
//!     port = 9313
//!
//!     [index_options]
//!     enable_star = true
//! "#).unwrap();
//!
//! assert_eq!(config.pipes_path().to_str(), Some("/srv/app/tmp/production"));
//! assert!(config.allow_star());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-index tuning directives the daemon understands.
pub const INDEX_OPTION_KEYS: &[&str] = &[
    "docinfo",
    "mlock",
    "morphology",
    "min_stemming_len",
    "stopwords",
    "wordforms",
    "exceptions",
    "min_word_len",
    "charset_dictpath",
    "charset_type",
    "charset_table",
    "ignore_chars",
    "min_prefix_len",
    "min_infix_len",
    "prefix_fields",
    "infix_fields",
    "prefix_field_names",
    "infix_field_names",
    "enable_star",
    "expand_keywords",
    "ngram_len",
    "ngram_chars",
    "phrase_boundary",
    "phrase_boundary_step",
    "blend_chars",
    "html_strip",
    "html_index_attrs",
    "html_remove_elements",
    "preopen",
    "ondisk_dict",
    "inplace_enable",
    "inplace_hit_gap",
    "inplace_docinfo_gap",
    "inplace_reloc_factor",
    "inplace_write_factor",
    "index_exact_words",
    "overshort_step",
    "stopword_step",
    "hitless_words",
];

/// Value of an index tuning directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexOption {
    /// Flag (`0`/`1` in the daemon's config).
    Bool(bool),
    /// Number.
    Int(i64),
    /// Single word or path.
    Str(String),
    /// List of words (e.g. field names).
    List(Vec<String>),
}

impl IndexOption {
    /// Whether the option is set to a truthy value.
    pub fn is_truthy(&self) -> bool {
        match self {
            IndexOption::Bool(v) => *v,
            IndexOption::Int(v) => *v != 0,
            IndexOption::Str(v) => !v.is_empty() && v != "0",
            IndexOption::List(v) => !v.is_empty(),
        }
    }
}

impl fmt::Display for IndexOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexOption::Bool(v) => write!(f, "{}", u8::from(*v)),
            IndexOption::Int(v) => write!(f, "{v}"),
            IndexOption::Str(v) => f.write_str(v),
            IndexOption::List(v) => f.write_str(&v.join(", ")),
        }
    }
}

impl From<bool> for IndexOption {
    fn from(v: bool) -> Self {
        IndexOption::Bool(v)
    }
}

impl From<i64> for IndexOption {
    fn from(v: i64) -> Self {
        IndexOption::Int(v)
    }
}

impl From<&str> for IndexOption {
    fn from(v: &str) -> Self {
        IndexOption::Str(v.to_string())
    }
}

impl From<Vec<&str>> for IndexOption {
    fn from(v: Vec<&str>) -> Self {
        IndexOption::List(v.into_iter().map(str::to_string).collect())
    }
}

/// Validate an index option key.
pub fn check_index_option(key: &str) -> Result<()> {
    if INDEX_OPTION_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(Error::config(format!("Unknown index option '{key}'")))
    }
}

/// XMLPipes configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application root directory.
    pub root: PathBuf,

    /// Environment name (e.g. "development", "production").
    pub environment: String,

    /// Directory for exported document-sets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipes_path: Option<PathBuf>,

    /// Directory for the daemon's index files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchd_file_path: Option<PathBuf>,

    /// Path of the daemon's configuration file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,

    /// Path of the daemon's pid file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid_file: Option<PathBuf>,

    /// Daemon address.
    ///
    /// This and `port` and `max_matches` are not read here. They are for
    /// the caller's [`SearchClient`](crate::SearchClient) transport.
    pub address: String,

    /// Daemon port.
    pub port: u16,

    /// Maximum matches the daemon keeps per query.
    pub max_matches: u32,

    /// Directory holding the indexer binary (searched on `PATH` if unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_path: Option<PathBuf>,

    /// Name of the indexer binary.
    pub indexer_binary_name: String,

    /// Global index tuning defaults, overridable per index.
    pub index_options: BTreeMap<String, IndexOption>,
}

fn default_index_options() -> BTreeMap<String, IndexOption> {
    BTreeMap::from([("charset_type".to_string(), IndexOption::from("utf-8"))])
}

impl Default for Config {
    fn default() -> Self {
        Self::new(".", "development")
    }
}

impl Config {
    /// Create a configuration with every setting derived from `root` and
    /// `environment`.
    pub fn new(root: impl Into<PathBuf>, environment: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            environment: environment.into(),
            pipes_path: None,
            searchd_file_path: None,
            config_file: None,
            pid_file: None,
            address: "127.0.0.1".to_string(),
            port: 9312,
            max_matches: 1000,
            bin_path: None,
            indexer_binary_name: "indexer".to_string(),
            index_options: default_index_options(),
        }
    }

    /// Parse a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed TOML or unknown index options.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| Error::config(format!("Invalid TOML: {e}")))?;

        let options = std::mem::take(&mut config.index_options);
        config.index_options = default_index_options();
        for (key, value) in options {
            config.set_index_option(&key, value)?;
        }
        Ok(config)
    }

    /// Load a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Drop every override, keeping only `root` and `environment`.
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.root), std::mem::take(&mut self.environment));
    }

    /// Set the document-set directory.
    pub fn with_pipes_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pipes_path = Some(path.into());
        self
    }

    /// Set the index file directory.
    pub fn with_searchd_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.searchd_file_path = Some(path.into());
        self
    }

    /// Set the daemon configuration file path.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Set the pid file path.
    pub fn with_pid_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pid_file = Some(path.into());
        self
    }

    /// Set the directory holding the indexer binary.
    pub fn with_bin_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bin_path = Some(path.into());
        self
    }

    /// Set the daemon address and port.
    pub fn with_address(mut self, address: impl Into<String>, port: u16) -> Self {
        self.address = address.into();
        self.port = port;
        self
    }

    /// Set a global index option.
    ///
    /// Enabling `enable_star` also sets `min_prefix_len` to `1`, since star
    /// matching needs prefixes indexed.
    pub fn set_index_option(&mut self, key: &str, value: impl Into<IndexOption>) -> Result<()> {
        check_index_option(key)?;
        let value = value.into();
        if key == "enable_star" && value.is_truthy() {
            self.index_options
                .insert("min_prefix_len".to_string(), IndexOption::Int(1));
        }
        self.index_options.insert(key.to_string(), value);
        Ok(())
    }

    /// Whether star (wildcard) matching is enabled globally.
    pub fn allow_star(&self) -> bool {
        self.index_options
            .get("enable_star")
            .is_some_and(IndexOption::is_truthy)
    }

    /// Directory for exported document-sets.
    pub fn pipes_path(&self) -> PathBuf {
        self.pipes_path
            .clone()
            .unwrap_or_else(|| self.root.join("tmp").join(&self.environment))
    }

    /// Directory for the daemon's index files.
    pub fn searchd_file_path(&self) -> PathBuf {
        self.searchd_file_path
            .clone()
            .unwrap_or_else(|| self.root.join("sphinx").join(&self.environment))
    }

    /// Path of the daemon's configuration file.
    pub fn config_file(&self) -> PathBuf {
        self.config_file.clone().unwrap_or_else(|| {
            self.root
                .join("config")
                .join(format!("{}.sphinx.conf", self.environment))
        })
    }

    /// Path of the daemon's pid file.
    pub fn pid_file(&self) -> PathBuf {
        self.pid_file.clone().unwrap_or_else(|| {
            self.root
                .join("tmp")
                .join(format!("searchd.{}.pid", self.environment))
        })
    }

    /// Full path (or bare name) of the indexer binary.
    pub fn indexer_binary(&self) -> PathBuf {
        match &self.bin_path {
            Some(dir) => dir.join(&self.indexer_binary_name),
            None => PathBuf::from(&self.indexer_binary_name),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
