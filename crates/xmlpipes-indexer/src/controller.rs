//! Indexer process control.
//!
//! Rebuilding and merging index generations is delegated to the daemon's
//! `indexer` binary through the [`Controller`] trait. [`CommandController`]
//! runs the binary synchronously:
//!
//! ```text
//! indexer --config "<config_file>" <index> [--rotate]
//! indexer --config "<config_file>" --merge <dst> <src> [--rotate]
//!         [--merge-dst-range <attr> <min> <max>]...
//! ```
//!
//! Writing the configuration file the binary reads is not handled here.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use xmlpipes_core::{Config, Error, Result, Value};

/// Options for rebuilding one generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildOptions {
    /// Stream indexer output instead of capturing it.
    pub verbose: bool,
    /// Ask a running daemon to rotate to the new files.
    pub rotate: bool,
}

/// Inclusive attribute range a merged document must fall into to survive.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRange {
    /// Attribute name.
    pub attribute: String,
    /// Lower bound.
    pub min: Value,
    /// Upper bound.
    pub max: Value,
}

impl MergeRange {
    /// Create a range.
    pub fn new(attribute: impl Into<String>, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            min: min.into(),
            max: max.into(),
        }
    }
}

/// Options for merging a delta generation into core.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOptions {
    /// Stream indexer output instead of capturing it.
    pub verbose: bool,
    /// Ask a running daemon to rotate to the new files.
    pub rotate: bool,
    /// Destination filters; every range must hold for a document to survive.
    pub ranges: Vec<MergeRange>,
}

impl MergeOptions {
    /// Add a destination range filter.
    pub fn with_range(mut self, range: MergeRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Rebuild options carrying the same output and rotation settings.
    pub fn rebuild_options(&self) -> RebuildOptions {
        RebuildOptions {
            verbose: self.verbose,
            rotate: self.rotate,
        }
    }
}

/// Controls the external indexer and reports on the daemon.
pub trait Controller {
    /// Rebuild one generation; returns the exit status.
    fn rebuild(&self, index: &str, options: &RebuildOptions) -> Result<i32>;

    /// Merge `src` into `dst`; returns the exit status.
    fn merge(&self, dst: &str, src: &str, options: &MergeOptions) -> Result<i32>;

    /// Whether the search daemon is running.
    fn is_running(&self) -> bool;

    /// Process id of the search daemon, if known.
    fn pid(&self) -> Option<u32>;
}

/// [`Controller`] that runs the indexer binary.
#[derive(Debug, Clone)]
pub struct CommandController {
    indexer: PathBuf,
    config_file: PathBuf,
    pid_file: PathBuf,
}

impl CommandController {
    /// Controller using the binary and files named by `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            indexer: config.indexer_binary(),
            config_file: config.config_file(),
            pid_file: config.pid_file(),
        }
    }

    /// Arguments for a rebuild.
    pub fn rebuild_args(&self, index: &str, options: &RebuildOptions) -> Vec<String> {
        let mut args = vec![
            "--config".to_string(),
            self.config_file.display().to_string(),
            index.to_string(),
        ];
        if options.rotate {
            args.push("--rotate".to_string());
        }
        args
    }

    /// Arguments for a merge.
    pub fn merge_args(&self, dst: &str, src: &str, options: &MergeOptions) -> Vec<String> {
        let mut args = vec![
            "--config".to_string(),
            self.config_file.display().to_string(),
            "--merge".to_string(),
            dst.to_string(),
            src.to_string(),
        ];
        if options.rotate {
            args.push("--rotate".to_string());
        }
        for range in &options.ranges {
            args.extend([
                "--merge-dst-range".to_string(),
                range.attribute.clone(),
                range.min.to_string(),
                range.max.to_string(),
            ]);
        }
        args
    }

    fn run(&self, args: Vec<String>, verbose: bool) -> Result<i32> {
        let rendered = format!("{} {}", self.indexer.display(), args.join(" "));
        log::debug!("Running {rendered}");

        let mut command = Command::new(&self.indexer);
        command.args(&args);

        let status = if verbose {
            command
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| Error::io_with_path(e, &self.indexer))?
        } else {
            let output = command
                .output()
                .map_err(|e| Error::io_with_path(e, &self.indexer))?;
            log::debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
            output.status
        };

        let code = status.code().unwrap_or(-1);
        if code != 0 {
            log::warn!("`{rendered}` exited with status {code}");
        }
        Ok(code)
    }
}

impl Controller for CommandController {
    fn rebuild(&self, index: &str, options: &RebuildOptions) -> Result<i32> {
        self.run(self.rebuild_args(index, options), options.verbose)
    }

    fn merge(&self, dst: &str, src: &str, options: &MergeOptions) -> Result<i32> {
        self.run(self.merge_args(dst, src, options), options.verbose)
    }

    fn is_running(&self) -> bool {
        self.pid().is_some_and(process_exists)
    }

    fn pid(&self) -> Option<u32> {
        fs::read_to_string(&self.pid_file)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

#[cfg(target_os = "linux")]
fn process_exists(pid: u32) -> bool {
    std::path::Path::new("/proc").join(pid.to_string()).exists()
}

// Without procfs, a present pid file is taken as a running daemon.
#[cfg(not(target_os = "linux"))]
fn process_exists(_pid: u32) -> bool {
    true
}

// ============================================================================
// Tests
// ============================================================================
