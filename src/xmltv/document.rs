//! Owned XMLTV element tree
//!
//! Attribute values and text are kept exactly as they appeared in the source
//! (still escaped), so writing an untouched node back out reproduces it.
//! Accessors that compare values unescape on demand.

use std::borrow::Cow;

use quick_xml::escape::{escape, unescape};

pub const CHANNEL_TAG: &str = "channel";
pub const PROGRAMME_TAG: &str = "programme";

/// A parsed XMLTV document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

/// A single node in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Escaped character data
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    raw_value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Attribute {
    /// Build from a value exactly as it appears between the quotes in XML
    pub fn from_raw(key: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            raw_value: raw_value.into(),
        }
    }

    /// Build from a plain value, escaping it for output
    pub fn new(key: impl Into<String>, value: &str) -> Self {
        Self::from_raw(key, escape(value))
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// Unescaped value; malformed entity references are returned verbatim
    pub fn value(&self) -> Cow<'_, str> {
        unescape(&self.raw_value).unwrap_or(Cow::Borrowed(self.raw_value.as_str()))
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: &str) -> Self {
        self.attributes.push(Attribute::new(key, value));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(escape(text).into_owned()));
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Unescaped value of the first attribute named `key`
    pub fn attr(&self, key: &str) -> Option<Cow<'_, str>> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(Attribute::value)
    }

    /// Direct element children
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Direct element children with the given tag
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.is(name))
    }

    /// Count of elements named `name` anywhere below this element
    pub fn count_descendants(&self, name: &str) -> usize {
        let mut count = 0;
        let mut stack: Vec<&Element> = vec![self];
        while let Some(element) = stack.pop() {
            for child in element.elements() {
                if child.is(name) {
                    count += 1;
                }
                stack.push(child);
            }
        }
        count
    }

    /// Concatenated unescaped text of direct text and CDATA children
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(raw) => {
                    out.push_str(&unescape(raw).unwrap_or(Cow::Borrowed(raw.as_str())))
                }
                Node::CData(data) => out.push_str(data),
                _ => {}
            }
        }
        out
    }
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn channels(&self) -> impl Iterator<Item = &Element> {
        self.root.elements_named(CHANNEL_TAG)
    }

    pub fn programmes(&self) -> impl Iterator<Item = &Element> {
        self.root.elements_named(PROGRAMME_TAG)
    }
}
