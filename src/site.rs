//! The whole build, start to finish.
//!
//! ```text
//! 1. Config      build_config.xml       → Config
//! 2. Index       site.xml  ─site2html→  dist/index.html
//! 3. Discovery   site.xml + page XML    → [Page]
//! 4. Pages       build/<href> ─page2html→ dist/<dest>   (per page, in order)
//! ```
//!
//! Every step is fatal. Nothing is retried and no page is skipped: the first
//! failure stops the build and is reported as a [`SiteError`] whose
//! [`exit_code`](SiteError::exit_code) names the failing phase. Because
//! discovery runs to completion before the first page transform, a discovery
//! failure leaves every page untouched.

use crate::config::{Config, ConfigError};
use crate::discovery::{self, BuildError};
use crate::transform::{
    StylesheetParams, TransformEngine, TransformError, XsltBackend, XsltprocBackend,
};
use crate::types::Page;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Index error: {0}")]
    Index(#[source] TransformError),
    #[error("Discovery error: {0}")]
    Discovery(#[from] BuildError),
    #[error("Page error ({href}): {source}")]
    Page {
        href: String,
        #[source]
        source: TransformError,
    },
    #[error("Couldn't clean {path}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Couldn't write report: {0}")]
    Report(#[source] serde_json::Error),
}

impl SiteError {
    /// Process exit status for this failure. Distinct per phase.
    pub fn exit_code(&self) -> u8 {
        match self {
            SiteError::Config(_) => 1,
            SiteError::Index(_) => 2,
            SiteError::Discovery(_) => 3,
            SiteError::Page { .. } => 4,
            SiteError::Clean { .. } => 5,
            SiteError::Report(_) => 6,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Empty the dist directory before writing anything.
    pub clean: bool,
}

/// What a successful build produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub dist_dir: PathBuf,
    pub index: PathBuf,
    pub pages: Vec<BuiltPage>,
    pub stylesheets_compiled: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuiltPage {
    pub page: Page,
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Load the config at `config_path` and build the site with `xsltproc`.
pub fn run(config_path: &Path, options: &BuildOptions) -> Result<BuildReport, SiteError> {
    let config = Config::load_anchored(config_path)?;
    build_site(&config, options)
}

/// Build the site with the production backend.
pub fn build_site(config: &Config, options: &BuildOptions) -> Result<BuildReport, SiteError> {
    build_site_with_backend(&XsltprocBackend::new(), config, options)
}

/// Build the site using a specific backend (allows testing with mock).
pub fn build_site_with_backend(
    backend: &impl XsltBackend,
    config: &Config,
    options: &BuildOptions,
) -> Result<BuildReport, SiteError> {
    if options.clean {
        info!("Cleaning dist directory: {}", config.dist_dir.display());
        clean_directory(&config.dist_dir).map_err(|source| SiteError::Clean {
            path: config.dist_dir.clone(),
            source,
        })?;
    }

    // Parameters are bound when the first stylesheet compiles, so failing to
    // compute them is an index failure.
    let params = StylesheetParams::for_build_dir(&config.build_dir).map_err(|err| {
        SiteError::Index(TransformError::Compile {
            stylesheet: config.index_stylesheet.clone(),
            source: err.into(),
        })
    })?;
    let mut engine = TransformEngine::new(backend, params);

    info!("Generating index: {}", config.index_html.display());
    engine
        .transform(
            &config.index_stylesheet,
            &config.site_manifest,
            &config.index_html,
        )
        .map_err(SiteError::Index)?;

    let pages = discovery::discover(config)?;
    info!("Generating {} pages", pages.len());

    let mut built = Vec::with_capacity(pages.len());
    for page in pages {
        let source_path = page.source(config);
        let dest_path = page.destination(config);
        engine
            .transform(&config.page_stylesheet, &source_path, &dest_path)
            .map_err(|source| SiteError::Page {
                href: page.href.clone(),
                source,
            })?;
        built.push(BuiltPage {
            page,
            source: source_path,
            dest: dest_path,
        });
    }

    Ok(BuildReport {
        dist_dir: config.dist_dir.clone(),
        index: config.index_html.clone(),
        pages: built,
        stylesheets_compiled: engine.compiled_count(),
    })
}

/// Load the config and discover pages without transforming anything.
pub fn check_site(config_path: &Path) -> Result<(Config, Vec<Page>), SiteError> {
    let config = Config::load_anchored(config_path)?;
    let pages = discovery::discover(&config)?;
    Ok((config, pages))
}

/// Remove everything inside `dir`, keeping `dir` itself. Creates it if missing.
///
/// The directory is kept so anything serving it (a dev server, say) keeps
/// pointing at the same inode.
fn clean_directory(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        return fs::create_dir_all(dir);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
