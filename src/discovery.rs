//! Page discovery.
//!
//! The site manifest lists pages by source only:
//!
//! ```xml
//! <site>
//!   <page href="intro.xml"/>
//!   <page href="chapters/one.xml"/>
//! </site>
//! ```
//!
//! Each page's own document names its output on the root element:
//!
//! ```xml
//! <page dest="introduction.html">...</page>
//! ```
//!
//! so authors rename outputs without touching the manifest. Hrefs are relative
//! to the build directory: the manifest is read after preprocessing has copied
//! pages there.
//!
//! Discovery is all-or-nothing. Any unreadable document or missing attribute
//! fails the whole call and no pages are returned.

use crate::config::Config;
use crate::paths;
use crate::types::Page;
use crate::xml::{Document, XmlError, XmlParser};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Couldn't read site XML {path}: {source}")]
    Site {
        path: PathBuf,
        #[source]
        source: XmlError,
    },
    #[error("Couldn't read page XML {path}: {source}")]
    Page {
        path: PathBuf,
        #[source]
        source: XmlError,
    },
    #[error("<{element}> in {path} has no {attribute} attribute")]
    MissingAttribute {
        path: PathBuf,
        element: String,
        attribute: &'static str,
    },
}

/// Loads [`Page`]s for one config.
///
/// The XML parser is created on first use and reused for every document read
/// afterwards, across calls too.
pub struct PageFactory<'a> {
    config: &'a Config,
    parser: Option<XmlParser>,
}

impl<'a> PageFactory<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            parser: None,
        }
    }

    fn parser(&mut self) -> &mut XmlParser {
        self.parser.get_or_insert_with(XmlParser::new)
    }

    fn load_site(&mut self) -> Result<Document, BuildError> {
        let path = self.config.site_manifest.clone();
        debug!("Loading site XML: {}", path.display());
        self.parser()
            .parse_file(&path)
            .map_err(|source| BuildError::Site { path, source })
    }

    fn load_page(&mut self, href: &str) -> Result<Page, BuildError> {
        let path = paths::resolve(&self.config.build_dir, href);
        debug!("Loading page XML: {}", path.display());
        let document = match self.parser().parse_file(&path) {
            Ok(document) => document,
            Err(source) => return Err(BuildError::Page { path, source }),
        };
        let root = document.root();
        let dest = root
            .attribute("dest")
            .ok_or_else(|| BuildError::MissingAttribute {
                path: path.clone(),
                element: root.name().to_string(),
                attribute: "dest",
            })?;
        Ok(Page::new(href, dest))
    }

    /// Every page in the site, in manifest order.
    pub fn site_pages(&mut self) -> Result<Vec<Page>, BuildError> {
        let site = self.load_site()?;
        let mut hrefs = Vec::new();
        for element in site.elements_by_tag_name("page") {
            let href = element
                .attribute("href")
                .ok_or_else(|| BuildError::MissingAttribute {
                    path: self.config.site_manifest.clone(),
                    element: element.name().to_string(),
                    attribute: "href",
                })?;
            hrefs.push(href.to_string());
        }

        let mut pages = Vec::with_capacity(hrefs.len());
        for href in &hrefs {
            let page = self.load_page(href)?;
            debug!("Discovered page: {} -> {}", page.href, page.dest);
            pages.push(page);
        }
        Ok(pages)
    }
}

/// Discover every page of the site described by `config`.
pub fn discover(config: &Config) -> Result<Vec<Page>, BuildError> {
    PageFactory::new(config).site_pages()
}
