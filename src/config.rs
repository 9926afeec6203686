//! Build configuration.
//!
//! The build reads its directory layout from `build_config.xml`, normally at
//! the project root:
//!
//! ```xml
//! <site>
//!   <sourcedir>src</sourcedir>
//!   <builddir>build</builddir>
//!   <distdir>dist</distdir>
//!   <buildsitexml>build/site.xml</buildsitexml>
//!   <distindexhtml>dist/index.html</distindexhtml>
//!   <site2html>tools/xslt/site2html.xsl</site2html>
//!   <page2html>tools/xslt/page2html.xsl</page2html>
//! </site>
//! ```
//!
//! ## Lookup rules
//!
//! Every lookup, the `site` element included, expects exactly one matching
//! element anywhere below its parent. Zero matches is
//! [`ConfigError::ElementNotFound`], more than one is
//! [`ConfigError::AmbiguousElement`]. Values are trimmed, and a value that is
//! blank after trimming is [`ConfigError::EmptyValue`].
//!
//! ## Relative paths
//!
//! [`Config::load`] keeps the values exactly as written.
//! [`Config::load_anchored`], used by the CLI, resolves them against the
//! config file's directory, so a build started from anywhere sees the same
//! layout.

use crate::paths;
use crate::xml::{Document, Element, XmlError, XmlParser};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "build_config.xml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Couldn't read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: XmlError,
    },
    #[error("element not found: <{0}>")]
    ElementNotFound(String),
    #[error("ambiguous element: more than one <{0}>")]
    AmbiguousElement(String),
    #[error("empty value in <{0}>")]
    EmptyValue(String),
}

/// Directory layout and stylesheets for one site build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Hand-written page sources.
    pub source_dir: PathBuf,
    /// Preprocessed pages; page hrefs are relative to this.
    pub build_dir: PathBuf,
    /// Final HTML output; page dests are relative to this.
    pub dist_dir: PathBuf,
    /// The site manifest listing every page.
    pub site_manifest: PathBuf,
    /// Where the site index is written.
    pub index_html: PathBuf,
    /// Stylesheet turning the manifest into the index.
    pub index_stylesheet: PathBuf,
    /// Stylesheet turning one page into HTML.
    pub page_stylesheet: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let document = XmlParser::new()
            .parse_file(path)
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_document(&document)
    }

    /// Load `path` and anchor relative paths at the file's directory.
    pub fn load_anchored(path: &Path) -> Result<Self, ConfigError> {
        let absolute = std::path::absolute(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let config = Self::load(&absolute)?;
        Ok(match absolute.parent() {
            Some(dir) => config.anchored_at(dir),
            None => config,
        })
    }

    /// Parse config text. `origin` only labels errors.
    pub fn parse_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let document = XmlParser::new()
            .parse_str(text)
            .map_err(|source| ConfigError::Read {
                path: origin.to_path_buf(),
                source,
            })?;
        Self::from_document(&document)
    }

    fn from_document(document: &Document) -> Result<Self, ConfigError> {
        let site = only_element(document.elements_by_tag_name("site"), "site")?;
        Ok(Self {
            source_dir: path_field(site, "sourcedir")?,
            build_dir: path_field(site, "builddir")?,
            dist_dir: path_field(site, "distdir")?,
            site_manifest: path_field(site, "buildsitexml")?,
            index_html: path_field(site, "distindexhtml")?,
            index_stylesheet: path_field(site, "site2html")?,
            page_stylesheet: path_field(site, "page2html")?,
        })
    }

    /// Resolve every relative path against `base`. Absolute paths are kept.
    pub fn anchored_at(&self, base: &Path) -> Self {
        Self {
            source_dir: paths::resolve(base, &self.source_dir),
            build_dir: paths::resolve(base, &self.build_dir),
            dist_dir: paths::resolve(base, &self.dist_dir),
            site_manifest: paths::resolve(base, &self.site_manifest),
            index_html: paths::resolve(base, &self.index_html),
            index_stylesheet: paths::resolve(base, &self.index_stylesheet),
            page_stylesheet: paths::resolve(base, &self.page_stylesheet),
        }
    }
}

fn only_element<'a>(found: Vec<&'a Element>, name: &str) -> Result<&'a Element, ConfigError> {
    match found.as_slice() {
        [] => Err(ConfigError::ElementNotFound(name.to_string())),
        [one] => Ok(*one),
        _ => Err(ConfigError::AmbiguousElement(name.to_string())),
    }
}

/// The one `name` element under `parent`, read as a trimmed path.
fn path_field(parent: &Element, name: &str) -> Result<PathBuf, ConfigError> {
    let element = only_element(parent.descendants_by_tag_name(name), name)?;
    let text = element.text_content();
    let value = text.trim();
    if value.is_empty() {
        return Err(ConfigError::EmptyValue(name.to_string()));
    }
    Ok(PathBuf::from(value))
}

/// Returns a documented default `build_config.xml`.
pub fn stock_config_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<!--
  buildsite configuration.

  Every element is required and must appear exactly once. Relative paths
  are resolved against the directory containing this file.
-->
<site>
  <!-- Hand-written page sources. -->
  <sourcedir>src</sourcedir>
  <!-- Preprocessed pages. Page hrefs in the site manifest are relative to this. -->
  <builddir>build</builddir>
  <!-- Generated HTML. Page dest attributes are relative to this. -->
  <distdir>dist</distdir>
  <!-- Site manifest: a <site> with one <page href="..."/> per page. -->
  <buildsitexml>build/site.xml</buildsitexml>
  <!-- Output for the site index. -->
  <distindexhtml>dist/index.html</distindexhtml>
  <!-- Stylesheet applied to the site manifest to produce the index. -->
  <site2html>tools/xslt/site2html.xsl</site2html>
  <!-- Stylesheet applied to every page. -->
  <page2html>tools/xslt/page2html.xsl</page2html>
</site>
"#
}
