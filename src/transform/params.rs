//! Parameter types handed to an [`XsltBackend`](super::XsltBackend).
//!
//! - [`StylesheetParams`]: values for the stylesheet's top-level
//!   `<xsl:param>` declarations, bound once at compile time. Values are OS
//!   strings so a build directory that is not valid UTF-8 reaches the
//!   processor byte for byte.
//! - [`OutputProperties`]: serialization settings (`<xsl:output>`), fixed
//!   for every stylesheet an engine compiles.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;

/// Stylesheet parameters by name. Iterates in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylesheetParams(BTreeMap<String, OsString>);

impl StylesheetParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// The parameters every site stylesheet receives: `srcdir` and `destdir`.
    ///
    /// Both are the absolute build directory. The dist directory is not
    /// passed; stylesheets that write side outputs write them into the build
    /// tree.
    pub fn for_build_dir(build_dir: &Path) -> io::Result<Self> {
        let dir = std::path::absolute(build_dir)?.into_os_string();
        Ok(Self::new().with("srcdir", dir.clone()).with("destdir", dir))
    }

    pub fn get(&self, name: &str) -> Option<&OsStr> {
        self.0.get(name).map(OsString::as_os_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OsStr)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_os_str()))
    }
}

/// How transformation results are serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputProperties {
    /// `html`, `xml` or `text`.
    pub method: String,
    pub indent: bool,
}

impl Default for OutputProperties {
    /// Indented HTML.
    fn default() -> Self {
        Self {
            method: "html".to_string(),
            indent: true,
        }
    }
}
