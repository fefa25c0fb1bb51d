//! Document-level metadata read from the leading comments of an entry file.
//!
//! ```text
//! //! @GlobalTitle My Service API
//! //! @GlobalVersion 1.0.0
//! //! @GlobalDescription Sample service
//!
//! use axum::Router;
//! ```

use log::{debug, warn};
use std::fs;
use std::path::Path;

const TITLE_DIRECTIVE: &str = "@GlobalTitle ";
const VERSION_DIRECTIVE: &str = "@GlobalVersion ";
const DESCRIPTION_DIRECTIVE: &str = "@GlobalDescription ";

/// Title, version and description of the generated document.
///
/// Fields left out of the entry file stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalMetadata {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl GlobalMetadata {
    /// Reads metadata from the entry file at `path`.
    ///
    /// This is best-effort: an unreadable file yields empty metadata and a warning.
    pub fn read(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(source) => Self::parse(&source),
            Err(e) => {
                warn!("Could not read entry file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Scans leading comment lines of `source` for global directives.
    ///
    /// Scanning stops at the first line that is neither blank nor a comment, so directives
    /// must precede the module's first item or attribute.
    pub fn parse(source: &str) -> Self {
        let mut metadata = Self::default();

        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some(comment) = line.strip_prefix("//") else {
                break;
            };
            // `//!` and `///` carry the same directives as plain `//`
            let text = comment
                .strip_prefix('!')
                .or_else(|| comment.strip_prefix('/'))
                .unwrap_or(comment)
                .trim();

            if let Some(value) = text.strip_prefix(TITLE_DIRECTIVE) {
                metadata.title = value.trim().to_string();
            } else if let Some(value) = text.strip_prefix(VERSION_DIRECTIVE) {
                metadata.version = value.trim().to_string();
            } else if let Some(value) = text.strip_prefix(DESCRIPTION_DIRECTIVE) {
                metadata.description = value.trim().to_string();
            }
        }

        debug!("Global metadata: {:?}", metadata);
        metadata
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.version.is_empty() && self.description.is_empty()
    }
}
