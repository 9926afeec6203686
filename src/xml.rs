//! Just enough XML to read the build's control documents.
//!
//! The build config, the site manifest and the per-page metadata files are
//! all tiny. They are read into an owned [`Document`] tree so callers can ask
//! DOM-style questions ("every `page` element", "the text of `builddir`")
//! without dealing with the streaming reader.
//!
//! Lookups match qualified names exactly, as written in the document. Comments
//! and processing instructions are skipped.
//!
//! ## Entities
//!
//! Besides the five predefined entities and character references, general
//! entities declared in the doctype are expanded:
//!
//! ```xml
//! <!DOCTYPE site SYSTEM "site.dtd" [
//!   <!ENTITY build "build">
//! ]>
//! <site><builddir>&build;</builddir></site>
//! ```
//!
//! The internal subset is read first, then a local external DTD (resolved
//! against the document's directory, [`XmlParser::parse_file`] only). The
//! first declaration of a name wins. Replacement text is inserted as text,
//! never parsed as markup. Parameter entities and external entities are not
//! expanded.

use crate::paths;
use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// `<!ENTITY name "value">` or `<!ENTITY name 'value'>`.
static ENTITY_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<!ENTITY\s+([^\s%"'<>]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#).unwrap()
});

/// System literal of the doctype's external ID.
static EXTERNAL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*[^\s\[]+\s+(?:SYSTEM|PUBLIC\s+(?:"[^"]*"|'[^']*'))\s+(?:"([^"]*)"|'([^']*)')"#)
        .unwrap()
});

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parse error: {0}")]
    Parse(#[from] quick_xml::Error),
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("Encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// A parsed document. Always has exactly one root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Document {
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Every element named `name` in document order, the root included.
    pub fn elements_by_tag_name(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        if self.root.name == name {
            found.push(&self.root);
        }
        self.root.collect_descendants(name, &mut found);
        found
    }
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value with entities resolved, or `None` if absent.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Descendant elements named `name` in document order, excluding `self`.
    pub fn descendants_by_tag_name(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if let Node::Element(element) = child {
                if element.name == name {
                    found.push(element);
                }
                element.collect_descendants(name, found);
            }
        }
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }
}

/// Reads documents into [`Document`] trees.
///
/// Holds the read buffer between documents, so one parser reading many small
/// files allocates once. No other state carries over from one parse to the
/// next.
#[derive(Debug, Default)]
pub struct XmlParser {
    buf: Vec<u8>,
}

impl XmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the file at `path`. A relative external DTD resolves against
    /// the file's directory.
    pub fn parse_file(&mut self, path: &Path) -> Result<Document, XmlError> {
        let file = File::open(path)?;
        self.read_document(Reader::from_reader(BufReader::new(file)), path.parent())
    }

    /// Parse `text`. Only the doctype's internal subset is read.
    pub fn parse_str(&mut self, text: &str) -> Result<Document, XmlError> {
        self.read_document(Reader::from_str(text), None)
    }

    fn read_document<R: BufRead>(
        &mut self,
        mut reader: Reader<R>,
        base: Option<&Path>,
    ) -> Result<Document, XmlError> {
        self.buf.clear();
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut entities = Entities::default();

        loop {
            match reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => {
                    open.push(start_element(&reader, &e, &entities)?);
                }
                Event::Empty(e) => {
                    let element = start_element(&reader, &e, &entities)?;
                    close_element(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| XmlError::Malformed("unexpected end tag".into()))?;
                    close_element(&mut open, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    append_text(&mut open, &text)?;
                }
                Event::CData(e) => {
                    let text = reader.decoder().decode(&e)?;
                    append_text(&mut open, &text)?;
                }
                Event::GeneralRef(e) => {
                    let text = match e.resolve_char_ref()? {
                        Some(ch) => ch.to_string(),
                        None => {
                            let name = reader.decoder().decode(&e)?;
                            entities
                                .resolve(&name)
                                .ok_or_else(|| {
                                    XmlError::Malformed(format!(
                                        "unknown entity reference &{name};"
                                    ))
                                })?
                                .to_string()
                        }
                    };
                    append_text(&mut open, &text)?;
                }
                Event::DocType(e) => {
                    let doctype = reader.decoder().decode(&e)?;
                    entities = Entities::from_doctype(&doctype, base);
                }
                Event::Eof => break,
                _ => {}
            }
            self.buf.clear();
        }

        if let Some(unclosed) = open.last() {
            return Err(XmlError::Malformed(format!(
                "unclosed element <{}>",
                unclosed.name
            )));
        }
        root.map(|root| Document { root })
            .ok_or_else(|| XmlError::Malformed("no root element".into()))
    }
}

fn start_element<R: BufRead>(
    reader: &Reader<R>,
    e: &BytesStart,
    entities: &Entities,
) -> Result<Element, XmlError> {
    let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = reader.decoder().decode(attr.key.as_ref())?.into_owned();
        let value = attr
            .decode_and_unescape_value_with(reader.decoder(), |name| entities.resolve(name))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn close_element(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::Malformed(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

fn append_text(open: &mut [Element], text: &str) -> Result<(), XmlError> {
    match open.last_mut() {
        Some(parent) => {
            if let Some(Node::Text(previous)) = parent.children.last_mut() {
                previous.push_str(text);
            } else {
                parent.children.push(Node::Text(text.to_string()));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::Malformed("text outside the root element".into())),
    }
}

/// General entities declared in a doctype, with replacement text expanded.
#[derive(Debug, Default)]
struct Entities {
    values: HashMap<String, String>,
}

impl Entities {
    fn from_doctype(doctype: &str, base: Option<&Path>) -> Self {
        let mut declared: Vec<(String, String)> = Vec::new();
        collect_declarations(doctype, &mut declared);
        if let Some(dtd) = external_dtd(doctype, base) {
            collect_declarations(&dtd, &mut declared);
        }
        Self::expand(declared)
    }

    /// Expand references inside replacement text. Entities that refer to
    /// undeclared or circular names stay undeclared.
    fn expand(mut pending: Vec<(String, String)>) -> Self {
        let mut entities = Self::default();
        while !pending.is_empty() {
            let mut resolved = Vec::new();
            let mut unresolved = Vec::new();
            for (name, raw) in pending {
                let expanded = unescape_with(&raw, |n| entities.resolve(n)).map(Cow::into_owned);
                match expanded {
                    Ok(value) => resolved.push((name, value)),
                    Err(_) => unresolved.push((name, raw)),
                }
            }
            if resolved.is_empty() {
                break;
            }
            entities.values.extend(resolved);
            pending = unresolved;
        }
        entities
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        resolve_predefined_entity(name).or_else(|| self.values.get(name).map(String::as_str))
    }
}

fn collect_declarations(dtd: &str, declared: &mut Vec<(String, String)>) {
    for caps in ENTITY_DECL.captures_iter(dtd) {
        let name = &caps[1];
        if declared.iter().any(|(n, _)| n == name) {
            continue;
        }
        let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        declared.push((name.to_string(), value.to_string()));
    }
}

/// Text of a local external DTD. Unreadable or remote DTDs give `None`.
fn external_dtd(doctype: &str, base: Option<&Path>) -> Option<String> {
    let caps = EXTERNAL_ID.captures(doctype)?;
    let system = caps.get(1).or_else(|| caps.get(2))?.as_str();
    if system.contains("://") {
        return None;
    }
    fs::read_to_string(paths::resolve(base?, system)).ok()
}
