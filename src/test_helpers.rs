//! Shared test utilities.
//!
//! Every test starts from a private copy of `fixtures/site/`, a complete
//! two-page site:
//!
//! ```text
//! build_config.xml
//! build/site.xml            <page href="a.xml"/> <page href="b.xml"/>
//! build/a.xml               dest="a.html"
//! build/b.xml               dest="b.html"
//! tools/xslt/site2html.xsl
//! tools/xslt/page2html.xsl
//! ```
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let config = fixture_config(tmp.path());
//! write_page(&config, "c.xml", "c.html", "Third");
//! write_manifest(&config, &["a.xml", "c.xml"]);
//!
//! let pages = discover(&config).unwrap();
//! assert_eq!(page_dests(&pages), vec!["a.html", "c.html"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::config::{CONFIG_FILENAME, Config};
use crate::types::Page;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Load the fixture's config, anchored at `root`.
pub fn fixture_config(root: &Path) -> Config {
    Config::load_anchored(&root.join(CONFIG_FILENAME)).unwrap()
}

// =========================================================================
// Writers
// =========================================================================

/// Write a page document under the build directory, creating parent dirs.
pub fn write_page(config: &Config, href: &str, dest: &str, title: &str) {
    let path = config.build_dir.join(href);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        path,
        format!("<page dest=\"{dest}\" title=\"{title}\">\n  <p>{title}</p>\n</page>\n"),
    )
    .unwrap();
}

/// Replace the site manifest with one listing `hrefs` in order.
pub fn write_manifest(config: &Config, hrefs: &[&str]) {
    let mut xml = String::from("<site title=\"Fixture\">\n");
    for href in hrefs {
        xml.push_str(&format!("  <page href=\"{href}\"/>\n"));
    }
    xml.push_str("</site>\n");
    std::fs::write(&config.site_manifest, xml).unwrap();
}

// =========================================================================
// Lookups and extractors
// =========================================================================

/// Find a page by href. Panics if not found.
pub fn find_page<'a>(pages: &'a [Page], href: &str) -> &'a Page {
    pages.iter().find(|p| p.href == href).unwrap_or_else(|| {
        let hrefs: Vec<&str> = pages.iter().map(|p| p.href.as_str()).collect();
        panic!("page '{href}' not found. Available: {hrefs:?}")
    })
}

/// All page destinations in order.
pub fn page_dests(pages: &[Page]) -> Vec<&str> {
    pages.iter().map(|p| p.dest.as_str()).collect()
}
