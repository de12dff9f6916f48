//! Generic XML element tree
//!
//! [`Tag`] keeps everything needed to write an element back the way it was
//! read: attribute order, namespace prefixes, and the interleaving of child
//! elements, text and comments.

use super::escape::{escape_text, escape_value};
use super::namespace::Namespaces;
use crate::error::{XlsxError, XlsxResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::io::BufRead;

/// One attribute of a [`Tag`], name in `prefix:local` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A child of a [`Tag`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Tag),
    Text(String),
    Comment(String),
    /// Writes nothing; [`Tag::fragments`] splits its output here
    SplicePoint,
}

impl From<Tag> for Node {
    fn from(tag: Tag) -> Self {
        Node::Element(tag)
    }
}

/// An XML element with ordered attributes and mixed children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<Attr>,
    pub children: Vec<Node>,
}

impl Tag {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attr<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.attrs.push(Attr::new(name, value));
        self
    }

    pub fn with_child<N: Into<Node>>(mut self, child: N) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Value of the first attribute called `name`
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Overwrite the first attribute called `name`, or append it
    pub fn set_attr<S: Into<String>>(&mut self, name: &str, value: S) {
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value.into(),
            None => self.attrs.push(Attr::new(name, value)),
        }
    }

    /// Remove the first attribute called `name`, if present
    pub fn delete_attr(&mut self, name: &str) {
        if let Some(i) = self.attrs.iter().position(|a| a.name == name) {
            self.attrs.remove(i);
        }
    }

    /// Child elements, skipping text and comments
    pub fn elements(&self) -> impl Iterator<Item = &Tag> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(tag) => Some(tag),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Tag> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(tag) => Some(tag),
            _ => None,
        })
    }

    /// First child element called `name`
    pub fn child(&self, name: &str) -> Option<&Tag> {
        self.elements().find(|t| t.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Tag> {
        self.elements_mut().find(|t| t.name == name)
    }

    /// Index in `children` of the first element called `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, Node::Element(t) if t.name == name))
    }

    /// Number of child elements called `name`
    pub fn count(&self, name: &str) -> usize {
        self.elements().filter(|t| t.name == name).count()
    }

    /// Concatenated character data of all descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(tag) => tag.collect_text(out),
                Node::Comment(_) | Node::SplicePoint => {}
            }
        }
    }

    /// Parse the root element of a document
    ///
    /// Declarations, processing instructions and anything outside the root
    /// element are dropped.
    pub fn parse<R: BufRead>(reader: R) -> XlsxResult<Tag> {
        let mut xml = Reader::from_reader(reader);
        let mut buf = Vec::new();

        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let start = e.into_owned();
                    return parse_element(&mut xml, &start, &Namespaces::default());
                }
                Event::Empty(e) => {
                    return start_tag(&e, &Namespaces::default()).map(|(tag, _)| tag);
                }
                Event::Eof => {
                    return Err(XlsxError::Malformed("document has no root element".into()))
                }
                _ => {}
            }
            buf.clear();
        }
    }

    pub fn parse_str(s: &str) -> XlsxResult<Tag> {
        Self::parse(s.as_bytes())
    }

    /// Serialize this element, always with an explicit end tag
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    pub fn write_to(&self, out: &mut String) {
        self.write_start(out);
        for node in &self.children {
            match node {
                Node::Element(tag) => tag.write_to(out),
                Node::Text(text) => escape_text(out, text),
                Node::Comment(comment) => write_comment(out, comment),
                Node::SplicePoint => {}
            }
        }
        self.write_end(out);
    }

    pub fn write_start(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            out.push_str("=\"");
            escape_value(out, &attr.value);
            out.push('"');
        }
        out.push('>');
    }

    pub fn write_end(&self, out: &mut String) {
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Serialize, splitting the output at every [`Node::SplicePoint`]
    ///
    /// A tree with `n` splice points yields `n + 1` fragments.
    pub fn fragments(&self) -> Vec<String> {
        let mut parts = vec![String::new()];
        self.write_fragments(&mut parts);
        parts
    }

    fn write_fragments(&self, parts: &mut Vec<String>) {
        if let Some(out) = parts.last_mut() {
            self.write_start(out);
        }
        for node in &self.children {
            match node {
                Node::Element(tag) => tag.write_fragments(parts),
                Node::SplicePoint => parts.push(String::new()),
                Node::Text(text) => {
                    if let Some(out) = parts.last_mut() {
                        escape_text(out, text);
                    }
                }
                Node::Comment(comment) => {
                    if let Some(out) = parts.last_mut() {
                        write_comment(out, comment);
                    }
                }
            }
        }
        if let Some(out) = parts.last_mut() {
            self.write_end(out);
        }
    }
}

fn write_comment(out: &mut String, comment: &str) {
    out.push_str("<!--");
    out.push_str(comment);
    out.push_str("-->");
}

fn decode(bytes: &[u8]) -> XlsxResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XlsxError::Malformed(format!("invalid UTF-8: {}", e)))
}

/// Build the element for a start tag, returning the scope for its children
fn start_tag(start: &BytesStart<'_>, parent: &Namespaces) -> XlsxResult<(Tag, Namespaces)> {
    let mut raw = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XlsxError::Malformed(e.to_string()))?;
        raw.push(Attr::new(
            decode(attr.key.as_ref())?,
            attr.unescape_value()?.into_owned(),
        ));
    }

    let scope = parent.enter(raw.iter().map(|a| (a.name.as_str(), a.value.as_str())));
    let name = scope.element_name(&decode(start.name().as_ref())?);
    let attrs = raw
        .into_iter()
        .map(|a| Attr {
            name: scope.attribute_name(&a.name),
            value: a.value,
        })
        .collect();

    Ok((
        Tag {
            name,
            attrs,
            children: Vec::new(),
        },
        scope,
    ))
}

fn parse_element<R: BufRead>(
    xml: &mut Reader<R>,
    start: &BytesStart<'_>,
    parent: &Namespaces,
) -> XlsxResult<Tag> {
    let (mut tag, scope) = start_tag(start, parent)?;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let child = e.into_owned();
                tag.children
                    .push(Node::Element(parse_element(xml, &child, &scope)?));
            }
            Event::Empty(e) => {
                let (child, _) = start_tag(&e, &scope)?;
                tag.children.push(Node::Element(child));
            }
            Event::End(_) => return Ok(tag),
            Event::Text(e) => tag.children.push(Node::Text(e.unescape()?.into_owned())),
            Event::CData(e) => tag.children.push(Node::Text(decode(&e)?)),
            Event::Comment(e) => tag.children.push(Node::Comment(decode(&e)?)),
            Event::Eof => {
                return Err(XlsxError::Malformed(format!(
                    "document ends inside <{}>",
                    tag.name
                )))
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
}
