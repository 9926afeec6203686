//! XSLT transformation.
//!
//! | Piece | Role |
//! |---|---|
//! | [`XsltBackend`] | Seam to the XSLT processor: `compile` + `apply` |
//! | [`XsltprocBackend`] | Production backend, drives `xsltproc` |
//! | [`TransformEngine`] | Binds parameters, caches compiled stylesheets, creates output dirs |
//! | [`StylesheetParams`], [`OutputProperties`] | What gets bound at compile time |
//!
//! The engine is generic over the backend so the build can be exercised
//! against a recording mock.

pub mod backend;
mod cache;
pub mod engine;
mod params;
pub mod xsltproc;

pub use backend::{BackendError, XsltBackend};
pub use cache::StylesheetCache;
pub use engine::{TransformEngine, TransformError};
pub use params::{OutputProperties, StylesheetParams};
pub use xsltproc::XsltprocBackend;
