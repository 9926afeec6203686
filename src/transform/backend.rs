//! XSLT backend trait and shared types.
//!
//! The [`XsltBackend`] trait is the seam to the external XSLT processor. It
//! has two operations: compile a stylesheet once, then apply the compiled
//! form to any number of documents.
//!
//! The production implementation is
//! [`XsltprocBackend`](super::xsltproc::XsltprocBackend).

use super::params::{OutputProperties, StylesheetParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid stylesheet: {0}")]
    InvalidStylesheet(String),
    #[error("Transformation failed: {0}")]
    Failed(String),
}

/// Trait for XSLT processors.
///
/// `compile` may be expensive; callers are expected to keep the returned
/// stylesheet and reuse it (see [`TransformEngine`](super::TransformEngine)).
pub trait XsltBackend {
    /// A compiled stylesheet with its parameters and output settings bound.
    type Stylesheet;

    /// Compile the stylesheet at `path`.
    fn compile(
        &self,
        path: &Path,
        params: &StylesheetParams,
        output: &OutputProperties,
    ) -> Result<Self::Stylesheet, BackendError>;

    /// Transform the XML document at `source`, writing the result to `dest`.
    fn apply(
        &self,
        stylesheet: &Self::Stylesheet,
        source: &Path,
        dest: &Path,
    ) -> Result<(), BackendError>;
}

impl<B: XsltBackend + ?Sized> XsltBackend for &B {
    type Stylesheet = B::Stylesheet;

    fn compile(
        &self,
        path: &Path,
        params: &StylesheetParams,
        output: &OutputProperties,
    ) -> Result<Self::Stylesheet, BackendError> {
        (**self).compile(path, params, output)
    }

    fn apply(
        &self,
        stylesheet: &Self::Stylesheet,
        source: &Path,
        dest: &Path,
    ) -> Result<(), BackendError> {
        (**self).apply(stylesheet, source, dest)
    }
}
