//! XMLTV document handling: owned tree, parser and serializer

pub mod document;
pub mod parser;
pub mod writer;

pub use document::{Attribute, Document, Element, Node};
pub use parser::parse_document;
pub use writer::{to_xml_string, write_file};
