//! Tests against a real `xsltproc`.
//!
//! These need libxslt's `xsltproc` on `PATH`, so they are ignored by default.
//!
//! Run with: cargo test --test xsltproc -- --ignored

use buildsite::config::Config;
use buildsite::site::{self, BuildOptions};
use buildsite::transform::{StylesheetParams, TransformEngine, TransformError, XsltprocBackend};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PAGE_XSL: &str = r#"<?xml version="1.0"?>
<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:output method="xml"/>
  <xsl:param name="srcdir"/>
  <xsl:template match="/page">
    <html><body><h1><xsl:value-of select="@title"/></h1><p><xsl:value-of select="$srcdir"/></p></body></html>
  </xsl:template>
</xsl:stylesheet>
"#;

fn engine(build_dir: &Path) -> TransformEngine<XsltprocBackend> {
    TransformEngine::new(
        XsltprocBackend::new(),
        StylesheetParams::for_build_dir(build_dir).unwrap(),
    )
}

#[test]
#[ignore]
fn page_title_becomes_heading() {
    let tmp = TempDir::new().unwrap();
    let xsl = tmp.path().join("page2html.xsl");
    let src = tmp.path().join("a.xml");
    fs::write(&xsl, PAGE_XSL).unwrap();
    fs::write(&src, r#"<page title="Home"/>"#).unwrap();

    let mut engine = engine(tmp.path());
    let dest = tmp.path().join("dist/a.html");
    engine.transform(&xsl, &src, &dest).unwrap();

    let html = fs::read_to_string(&dest).unwrap();
    assert!(html.contains("<h1>Home</h1>"), "got: {html}");
    // Output settings come from the engine, not the stylesheet's method="xml".
    assert!(!html.starts_with("<?xml"), "got: {html}");
    assert!(html.contains(&tmp.path().to_string_lossy().into_owned()));
}

#[test]
#[ignore]
fn stylesheet_compiled_once_for_many_pages() {
    let tmp = TempDir::new().unwrap();
    let xsl = tmp.path().join("page2html.xsl");
    fs::write(&xsl, PAGE_XSL).unwrap();

    let mut engine = engine(tmp.path());
    for name in ["a", "b", "c"] {
        let src = tmp.path().join(format!("{name}.xml"));
        fs::write(&src, format!(r#"<page title="{name}"/>"#)).unwrap();
        engine
            .transform(&xsl, &src, &tmp.path().join(format!("dist/{name}.html")))
            .unwrap();
    }

    assert_eq!(engine.compiled_count(), 1);
    let c = fs::read_to_string(tmp.path().join("dist/c.html")).unwrap();
    assert!(c.contains("<h1>c</h1>"));
}

#[test]
#[ignore]
fn malformed_source_is_execute_error() {
    let tmp = TempDir::new().unwrap();
    let xsl = tmp.path().join("page2html.xsl");
    let src = tmp.path().join("bad.xml");
    fs::write(&xsl, PAGE_XSL).unwrap();
    fs::write(&src, "<page").unwrap();

    let err = engine(tmp.path())
        .transform(&xsl, &src, &tmp.path().join("bad.html"))
        .unwrap_err();
    assert!(matches!(err, TransformError::Execute { .. }));
}

#[test]
#[ignore]
fn fixture_site_builds() {
    let tmp = TempDir::new().unwrap();
    copy_dir(
        &Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site"),
        tmp.path(),
    );
    let config = Config::load_anchored(&tmp.path().join("build_config.xml")).unwrap();

    site::build_site(&config, &BuildOptions::default()).unwrap();

    let index = fs::read_to_string(tmp.path().join("dist/index.html")).unwrap();
    // The index looks each page's dest and title up through $srcdir.
    assert!(index.contains(r#"<a href="a.html">Home</a>"#), "got: {index}");
    assert!(index.contains(r#"<a href="b.html">About</a>"#), "got: {index}");

    let about = fs::read_to_string(tmp.path().join("dist/b.html")).unwrap();
    assert!(about.contains("<h1>About</h1>"), "got: {about}");
}

fn copy_dir(src: &Path, dst: &Path) {
    for entry in fs::read_dir(src).unwrap() {
        let path = entry.unwrap().path();
        let target = dst.join(path.file_name().unwrap());
        if path.is_dir() {
            fs::create_dir_all(&target).unwrap();
            copy_dir(&path, &target);
        } else {
            fs::copy(&path, &target).unwrap();
        }
    }
}
