//! Shared types passed from discovery to the build.

use crate::config::Config;
use crate::paths;
use serde::Serialize;
use std::path::PathBuf;

/// One page to transform. Only tracks what the build needs.
///
/// Both fields are path fragments; the [`Config`] supplies the directories
/// they live under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Source file, relative to the build directory (`href` in the manifest).
    pub href: String,
    /// Output file, relative to the dist directory (`dest` in the page's metadata).
    pub dest: String,
}

impl Page {
    pub fn new(href: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            dest: dest.into(),
        }
    }

    /// The file to transform.
    pub fn source(&self, config: &Config) -> PathBuf {
        paths::resolve(&config.build_dir, &self.href)
    }

    /// Where the transformed page is written.
    pub fn destination(&self, config: &Config) -> PathBuf {
        paths::resolve(&config.dist_dir, &self.dest)
    }
}
