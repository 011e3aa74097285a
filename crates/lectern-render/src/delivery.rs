//! Size policy: how a finished document reaches its surface.
//!
//! Surfaces accept HTML directly only up to a fixed size. Anything larger is
//! written to a per-destination temp file and the surface loads that file.

use std::fs;
use std::path::{Path, PathBuf};

use lectern_core::config::{Config, DEFAULT_LARGE_DOCUMENT_THRESHOLD};
use lectern_core::error::LecternError;
use lectern_core::models::Channel;

/// How a document is handed to a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Inject the HTML directly.
    Inline(String),
    /// Load the surface from this file.
    File(PathBuf),
}

impl Delivery {
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPolicy {
    threshold: usize,
    primary_file: PathBuf,
    secondary_file: PathBuf,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl DeliveryPolicy {
    #[must_use]
    pub fn new(threshold: usize, primary_file: PathBuf, secondary_file: PathBuf) -> Self {
        Self {
            threshold: if threshold == 0 {
                DEFAULT_LARGE_DOCUMENT_THRESHOLD
            } else {
                threshold
            },
            primary_file,
            secondary_file,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.render.large_document_threshold,
            config.large_document_path(Channel::Primary),
            config.large_document_path(Channel::Secondary),
        )
    }

    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether a document of `size` bytes must go through a file.
    #[must_use]
    pub fn needs_file(&self, size: usize) -> bool {
        size > self.threshold
    }

    /// Temp file used for oversized documents bound for `channel`.
    #[must_use]
    pub fn file_for(&self, channel: Channel) -> &Path {
        match channel {
            Channel::Secondary => &self.secondary_file,
            Channel::Primary | Channel::External => &self.primary_file,
        }
    }

    /// Decide how `html` reaches a `channel` surface, writing the temp file
    /// when the document is too large. A later document for the same channel
    /// overwrites the file.
    pub fn prepare(&self, channel: Channel, html: String) -> Result<Delivery, LecternError> {
        if !self.needs_file(html.len()) {
            return Ok(Delivery::Inline(html));
        }
        let path = self.file_for(channel);
        write_document(path, &html)?;
        let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        log::info!(
            "{channel} document of {} bytes delivered via {}",
            html.len(),
            absolute.display()
        );
        Ok(Delivery::File(absolute))
    }
}

fn write_document(path: &Path, html: &str) -> Result<(), LecternError> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            LecternError::Io(format!("create {}: {err}", parent.display()))
        })?;
    }
    fs::write(path, html).map_err(|err| LecternError::Io(format!("write {}: {err}", path.display())))
}
