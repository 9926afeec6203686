//! # buildsite
//!
//! Builds a static HTML site from XML pages with two XSLT stylesheets: one
//! for the site index, one for every page.
//!
//! # Pipeline
//!
//! ```text
//! 1. Config      build_config.xml  →  Config           (directories + stylesheets)
//! 2. Index       site.xml          →  dist/index.html  (site2html)
//! 3. Discovery   site.xml + pages  →  [Page]           (href from manifest, dest from page)
//! 4. Pages       build/<href>      →  dist/<dest>      (page2html, one per page)
//! ```
//!
//! Each phase fails the whole build and maps to its own exit status; see
//! [`site::SiteError::exit_code`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `build_config.xml` loading and the stock config |
//! | [`discovery`] | Reads the site manifest and each page's `dest` attribute |
//! | [`transform`] | XSLT backend seam, compiled-stylesheet cache, `xsltproc` backend |
//! | [`site`] | Runs the phases in order and owns the exit-code mapping |
//! | [`types`] | [`Page`](types::Page): where a page comes from and where it goes |
//! | [`xml`] | Small element tree over `quick-xml` for the control documents |
//! | [`paths`] | Joining config directories with relative references |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Output Names Live In The Page
//!
//! The manifest only says which pages exist. Each page names its own output
//! file with a `dest` attribute on its root element, so renaming an output
//! never touches the manifest.
//!
//! ## One Compile Per Stylesheet
//!
//! Stylesheets are compiled once per build by a
//! [`TransformEngine`](transform::TransformEngine) and reused for every
//! page. Both receive the same `$srcdir` and `$destdir` parameters: the
//! absolute build directory. Existing stylesheets look page metadata up
//! through `$srcdir` and write nothing through `$destdir`, so the two are
//! kept identical.
//!
//! ## External XSLT Processor
//!
//! The transformation itself is delegated to `xsltproc` through the
//! [`XsltBackend`](transform::XsltBackend) trait. Everything else (config,
//! manifest, page metadata) is read in-process with `quick-xml`.
//!
//! # Testing
//!
//! Unit tests and `tests/build_site.rs` swap the processor for an in-process
//! backend and run with a plain `cargo test`. The tests in
//! `tests/xsltproc.rs` drive the real `xsltproc` and are `#[ignore]`d, since
//! they need libxslt installed:
//!
//! ```text
//! cargo test --test xsltproc -- --ignored
//! ```

pub mod config;
pub mod discovery;
pub mod output;
pub mod paths;
pub mod site;
pub mod transform;
pub mod types;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_helpers;
