//! The transform step: compile (once), then apply.

use super::backend::{BackendError, XsltBackend};
use super::cache::StylesheetCache;
use super::params::{OutputProperties, StylesheetParams};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Couldn't compile stylesheet {stylesheet}: {source}")]
    Compile {
        stylesheet: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Couldn't transform {} -> {} with {}: {source}", .input.display(), .dest.display(), .stylesheet.display())]
    Execute {
        stylesheet: PathBuf,
        input: PathBuf,
        dest: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Couldn't create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Runs stylesheet transforms for one build.
///
/// Every stylesheet compiled by an engine gets the same parameters and
/// output properties. Compiled stylesheets are cached by path for the
/// engine's lifetime, so independent engines never share compiled state.
pub struct TransformEngine<B: XsltBackend> {
    backend: B,
    params: StylesheetParams,
    output: OutputProperties,
    cache: StylesheetCache<B::Stylesheet>,
}

impl<B: XsltBackend> TransformEngine<B> {
    /// Engine producing indented HTML.
    pub fn new(backend: B, params: StylesheetParams) -> Self {
        Self {
            backend,
            params,
            output: OutputProperties::default(),
            cache: StylesheetCache::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of distinct stylesheets compiled so far.
    pub fn compiled_count(&self) -> usize {
        self.cache.len()
    }

    /// Transform `source` into `dest` with the stylesheet at `stylesheet`.
    ///
    /// Overwrites `dest` and creates its parent directory. A failed
    /// transform may leave a partial `dest` behind.
    pub fn transform(
        &mut self,
        stylesheet: &Path,
        source: &Path,
        dest: &Path,
    ) -> Result<(), TransformError> {
        let backend = &self.backend;
        let params = &self.params;
        let output = &self.output;
        let cached = self.cache.contains(stylesheet);
        let compiled = self
            .cache
            .get_or_compile(stylesheet, || {
                debug!("Compiling stylesheet: {}", stylesheet.display());
                backend.compile(stylesheet, params, output)
            })
            .map_err(|source| TransformError::Compile {
                stylesheet: stylesheet.to_path_buf(),
                source,
            })?;
        if cached {
            debug!("Using compiled stylesheet: {}", stylesheet.display());
        }

        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| TransformError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        info!(
            "Transforming ({}): {} -> {}",
            stylesheet.display(),
            source.display(),
            dest.display()
        );
        backend
            .apply(compiled, source, dest)
            .map_err(|err| TransformError::Execute {
                stylesheet: stylesheet.to_path_buf(),
                input: source.to_path_buf(),
                dest: dest.to_path_buf(),
                source: err,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::backend::tests::{MockBackend, RecordedOp};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Fixture {
        tmp: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            fs::write(tmp.path().join("page.xsl"), "<xsl:stylesheet/>").unwrap();
            fs::write(tmp.path().join("site.xsl"), "<xsl:stylesheet/>").unwrap();
            fs::write(tmp.path().join("broken.xsl"), "not a stylesheet").unwrap();
            fs::write(tmp.path().join("a.xml"), "<page title='A'/>").unwrap();
            fs::write(tmp.path().join("b.xml"), "<page title='B'/>").unwrap();
            Self { tmp }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.tmp.path().join(name)
        }
    }

    fn engine() -> TransformEngine<MockBackend> {
        TransformEngine::new(
            MockBackend::new(),
            StylesheetParams::new()
                .with("srcdir", "/abs/build")
                .with("destdir", "/abs/build"),
        )
    }

    #[test]
    fn same_stylesheet_compiles_once() {
        let f = Fixture::new();
        let mut engine = engine();

        engine
            .transform(&f.path("page.xsl"), &f.path("a.xml"), &f.path("a.html"))
            .unwrap();
        engine
            .transform(&f.path("page.xsl"), &f.path("b.xml"), &f.path("b.html"))
            .unwrap();

        assert_eq!(engine.backend().compile_count(), 1);
        assert_eq!(engine.compiled_count(), 1);
        assert_eq!(
            engine.backend().applied_dests(),
            vec![f.path("a.html"), f.path("b.html")]
        );
    }

    #[test]
    fn each_stylesheet_compiles_once() {
        let f = Fixture::new();
        let mut engine = engine();
        for _ in 0..2 {
            engine
                .transform(&f.path("site.xsl"), &f.path("a.xml"), &f.path("index.html"))
                .unwrap();
            engine
                .transform(&f.path("page.xsl"), &f.path("a.xml"), &f.path("a.html"))
                .unwrap();
        }
        assert_eq!(engine.backend().compile_count(), 2);
    }

    #[test]
    fn params_are_bound_at_compile() {
        let f = Fixture::new();
        let mut engine = engine();
        engine
            .transform(&f.path("page.xsl"), &f.path("a.xml"), &f.path("a.html"))
            .unwrap();

        let ops = engine.backend().get_operations();
        assert_eq!(
            ops[0],
            RecordedOp::Compile {
                stylesheet: f.path("page.xsl"),
                params: vec![
                    ("destdir".to_string(), "/abs/build".to_string()),
                    ("srcdir".to_string(), "/abs/build".to_string()),
                ],
            }
        );
    }

    #[test]
    fn writes_destination() {
        let f = Fixture::new();
        let mut engine = engine();
        engine
            .transform(&f.path("page.xsl"), &f.path("a.xml"), &f.path("a.html"))
            .unwrap();
        let html = fs::read_to_string(f.path("a.html")).unwrap();
        assert!(html.contains("<page title='A'/>"));
    }

    #[test]
    fn creates_destination_directory() {
        let f = Fixture::new();
        let mut engine = engine();
        let dest = f.path("dist/chapters/a.html");
        engine
            .transform(&f.path("page.xsl"), &f.path("a.xml"), &dest)
            .unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn broken_stylesheet_is_compile_error() {
        let f = Fixture::new();
        let mut engine = engine();
        let err = engine
            .transform(&f.path("broken.xsl"), &f.path("a.xml"), &f.path("a.html"))
            .unwrap_err();
        assert!(matches!(err, TransformError::Compile { .. }));
        assert!(!f.path("a.html").exists());
        assert_eq!(engine.compiled_count(), 0);
    }

    #[test]
    fn missing_stylesheet_is_compile_error() {
        let f = Fixture::new();
        let mut engine = engine();
        let err = engine
            .transform(&f.path("nope.xsl"), &f.path("a.xml"), &f.path("a.html"))
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::Compile { source: BackendError::Io(_), .. }
        ));
    }

    #[test]
    fn missing_source_is_execute_error() {
        let f = Fixture::new();
        let mut engine = engine();
        let err = engine
            .transform(&f.path("page.xsl"), &f.path("gone.xml"), &f.path("a.html"))
            .unwrap_err();
        assert!(matches!(err, TransformError::Execute { input, .. } if input == f.path("gone.xml")));
    }

    #[test]
    fn unwritable_destination_directory_is_error() {
        let f = Fixture::new();
        fs::write(f.path("blocker"), "a file, not a directory").unwrap();
        let mut engine = engine();
        let err = engine
            .transform(&f.path("page.xsl"), &f.path("a.xml"), &f.path("blocker/a.html"))
            .unwrap_err();
        assert!(matches!(err, TransformError::CreateDir { .. }));
    }

    #[test]
    fn engines_do_not_share_cache() {
        let f = Fixture::new();
        let mut first = engine();
        let mut second = engine();
        first
            .transform(&f.path("page.xsl"), &f.path("a.xml"), &f.path("a.html"))
            .unwrap();
        second
            .transform(&f.path("page.xsl"), &f.path("b.xml"), &f.path("b.html"))
            .unwrap();
        assert_eq!(first.backend().compile_count(), 1);
        assert_eq!(second.backend().compile_count(), 1);
    }
}
