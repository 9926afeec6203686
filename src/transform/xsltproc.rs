//! Backend driving libxslt's command-line processor, `xsltproc`.
//!
//! `xsltproc` has no compiled-stylesheet handle that outlives a process, so
//! "compiling" here means:
//!
//! 1. Read the stylesheet and check it is well-formed XML with an XSLT root
//!    (`xsl:stylesheet`, `xsl:transform`, or a literal result element carrying
//!    `xsl:version`). Broken stylesheets fail at compile time, before any
//!    output is written.
//! 2. Write a wrapper stylesheet into a private temp directory. The wrapper
//!    imports the real stylesheet and declares the engine's `<xsl:output>`.
//!    An importing stylesheet has higher import precedence, so its output
//!    settings win over whatever the real stylesheet declares.
//!
//! Applying runs `xsltproc --output <dest> --stringparam ... <wrapper> <source>`.
//! The wrapper directory is removed when the compiled stylesheet is dropped.

use super::backend::{BackendError, XsltBackend};
use super::params::{OutputProperties, StylesheetParams};
use crate::xml::{Element, XmlError, XmlParser};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const XSLT_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

/// Left as-is in a `file://` URL: unreserved characters and the separator.
const FILE_PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Runs transforms through an external `xsltproc` binary.
#[derive(Debug, Clone)]
pub struct XsltprocBackend {
    program: PathBuf,
}

impl XsltprocBackend {
    /// Uses `xsltproc` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("xsltproc")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for XsltprocBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// A checked stylesheet plus its wrapper on disk.
#[derive(Debug)]
pub struct XsltprocStylesheet {
    wrapper: PathBuf,
    params: StylesheetParams,
    _dir: TempDir,
}

impl XsltBackend for XsltprocBackend {
    type Stylesheet = XsltprocStylesheet;

    fn compile(
        &self,
        path: &Path,
        params: &StylesheetParams,
        output: &OutputProperties,
    ) -> Result<XsltprocStylesheet, BackendError> {
        let document = XmlParser::new().parse_file(path).map_err(|e| match e {
            XmlError::Io(err) => BackendError::Io(err),
            other => BackendError::InvalidStylesheet(format!("{}: {other}", path.display())),
        })?;
        check_stylesheet_root(document.root())
            .map_err(|msg| BackendError::InvalidStylesheet(format!("{}: {msg}", path.display())))?;

        let absolute = std::path::absolute(path)?;
        let dir = tempfile::Builder::new().prefix("buildsite-xsl-").tempdir()?;
        let wrapper = dir.path().join("wrapper.xsl");
        fs::write(&wrapper, wrapper_stylesheet(&absolute, output))?;

        Ok(XsltprocStylesheet {
            wrapper,
            params: params.clone(),
            _dir: dir,
        })
    }

    fn apply(
        &self,
        stylesheet: &XsltprocStylesheet,
        source: &Path,
        dest: &Path,
    ) -> Result<(), BackendError> {
        let mut command = Command::new(&self.program);
        command.arg("--output").arg(dest);
        for (name, value) in stylesheet.params.iter() {
            command.arg("--stringparam").arg(name).arg(value);
        }
        command.arg(&stylesheet.wrapper).arg(source);

        let result = command.output()?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(BackendError::Failed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                result.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Accept `xsl:stylesheet`, `xsl:transform`, or a simplified stylesheet.
///
/// Only namespace declarations on the root are consulted.
fn check_stylesheet_root(root: &Element) -> Result<(), String> {
    let (prefix, local) = split_qname(root.name());
    if matches!(local, "stylesheet" | "transform")
        && namespace_for(root, prefix) == Some(XSLT_NAMESPACE)
    {
        return Ok(());
    }
    // Simplified syntax: <html xsl:version="1.0" xmlns:xsl="...">
    if let Some(decl) = xslt_prefix(root)
        && root.attribute(&format!("{decl}:version")).is_some()
    {
        return Ok(());
    }
    Err(format!("not an XSLT stylesheet (root element <{}>)", root.name()))
}

fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

fn namespace_for<'a>(element: &'a Element, prefix: Option<&str>) -> Option<&'a str> {
    match prefix {
        Some(prefix) => element.attribute(&format!("xmlns:{prefix}")),
        None => element.attribute("xmlns"),
    }
}

/// The prefix bound to the XSLT namespace on `root`, if any.
fn xslt_prefix(root: &Element) -> Option<String> {
    ["xsl", "xslt"]
        .into_iter()
        .find(|prefix| namespace_for(root, Some(*prefix)) == Some(XSLT_NAMESPACE))
        .map(str::to_string)
}

fn wrapper_stylesheet(import: &Path, output: &OutputProperties) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xsl:stylesheet version="1.0" xmlns:xsl="{XSLT_NAMESPACE}">
  <xsl:import href="{href}"/>
  <xsl:output method="{method}" indent="{indent}"/>
</xsl:stylesheet>
"#,
        href = file_url(import),
        method = output.method,
        indent = if output.indent { "yes" } else { "no" },
    )
}

/// `file://` URL for an absolute path, percent-encoding anything that is not
/// safe inside both a URL path and an XML attribute.
fn file_url(path: &Path) -> String {
    let encoded = percent_encode(path.as_os_str().as_encoded_bytes(), FILE_PATH_ENCODE_SET);
    format!("file://{encoded}")
}
