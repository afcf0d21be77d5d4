//! XMLTV serializer
//!
//! Wraps surviving channels and programmes in a fresh `<tv>` root and writes
//! them with an XML declaration, one element per line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::config::defaults::DEFAULT_ROOT_TAG;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::xmltv::document::{Element, Node};

/// Serialize `channels` then `programmes` under a new root to any writer
pub fn write_filtered<W: Write>(
    sink: W,
    channels: &[Element],
    programmes: &[Element],
    indent_size: usize,
) -> SourceResult<()> {
    let mut xml = Writer::new_with_indent(sink, b' ', indent_size);

    emit(&mut xml, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(&mut xml, Event::Start(BytesStart::new(DEFAULT_ROOT_TAG)))?;
    for element in channels.iter().chain(programmes) {
        write_element(&mut xml, element)?;
    }
    emit(&mut xml, Event::End(BytesEnd::new(DEFAULT_ROOT_TAG)))?;

    xml.into_inner()
        .flush()
        .map_err(|e| SourceError::write_error(e.to_string()))
}

/// Serialize to an in-memory string
pub fn to_xml_string(
    channels: &[Element],
    programmes: &[Element],
    indent_size: usize,
) -> SourceResult<String> {
    let mut buffer = Vec::new();
    write_filtered(&mut buffer, channels, programmes, indent_size)?;
    String::from_utf8(buffer).map_err(|e| SourceError::write_error(e.to_string()))
}

/// Write the filtered document to `path`
pub fn write_file(
    path: &Path,
    channels: &[Element],
    programmes: &[Element],
    indent_size: usize,
) -> AppResult<()> {
    let file = File::create(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_filtered(BufWriter::new(file), channels, programmes, indent_size)?;
    info!("Output written to: {}", path.display());
    Ok(())
}

/// Write one element and its subtree without recursion
fn write_element<W: Write>(xml: &mut Writer<W>, element: &Element) -> SourceResult<()> {
    enum Step<'a> {
        Open(&'a Element),
        Leaf(&'a Node),
        Close(&'a str),
    }

    let mut stack = vec![Step::Open(element)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Open(element) => {
                let mut start = BytesStart::new(element.name.as_str());
                for attr in &element.attributes {
                    // Stored values are already escaped; the byte form is written as-is
                    start.push_attribute((attr.key.as_bytes(), attr.raw_value().as_bytes()));
                }

                if element.children.is_empty() {
                    emit(xml, Event::Empty(start))?;
                    continue;
                }

                emit(xml, Event::Start(start))?;
                stack.push(Step::Close(element.name.as_str()));
                for child in element.children.iter().rev() {
                    stack.push(match child {
                        Node::Element(child) => Step::Open(child),
                        leaf => Step::Leaf(leaf),
                    });
                }
            }
            Step::Leaf(Node::Text(raw)) => {
                emit(xml, Event::Text(BytesText::from_escaped(raw.as_str())))?
            }
            Step::Leaf(Node::CData(data)) => {
                emit(xml, Event::CData(BytesCData::new(data.as_str())))?
            }
            Step::Leaf(Node::Comment(text)) => {
                emit(xml, Event::Comment(BytesText::from_escaped(text.as_str())))?
            }
            Step::Leaf(Node::Element(child)) => stack.push(Step::Open(child)),
            Step::Close(name) => emit(xml, Event::End(BytesEnd::new(name)))?,
        }
    }
    Ok(())
}

fn emit<W: Write>(xml: &mut Writer<W>, event: Event<'_>) -> SourceResult<()> {
    xml.write_event(event)
        .map_err(|e| SourceError::write_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::xmltv::parser::parse_document;

    fn programme() -> Element {
        Element::new("programme")
            .with_attribute("start", "20240101120000 +0000")
            .with_attribute("channel", "news.uk")
            .with_child(Element::new("title").with_text("Fish & Chips"))
            .with_child(Element::new("icon").with_attribute("src", "http://x/y.png"))
    }

    #[test]
    fn test_output_layout() {
        let channel = Element::new("channel")
            .with_attribute("id", "news.uk")
            .with_child(Element::new("display-name").with_text("News"));
        let xml = to_xml_string(&[channel], &[programme()], 2).unwrap();

        let lines: Vec<&str> = xml.lines().collect();
        assert_eq!(lines[0], r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        assert_eq!(lines[1], "<tv>");
        assert_eq!(lines[2], r#"  <channel id="news.uk">"#);
        assert_eq!(lines[3], "    <display-name>News</display-name>");
        assert_eq!(lines[4], "  </channel>");
        assert_eq!(
            lines[5],
            r#"  <programme start="20240101120000 +0000" channel="news.uk">"#
        );
        assert_eq!(lines[6], "    <title>Fish &amp; Chips</title>");
        assert_eq!(lines[7], r#"    <icon src="http://x/y.png"/>"#);
        assert_eq!(lines[8], "  </programme>");
        assert_eq!(lines[9], "</tv>");
    }

    #[test]
    fn test_output_parses_back() {
        let xml = to_xml_string(&[], &[programme()], 2).unwrap();
        let document = parse_document(&xml, &mut Diagnostics::new()).unwrap();
        let parsed = document.programmes().next().unwrap();
        assert_eq!(parsed, &programme());
    }

    #[test]
    fn test_mixed_content_is_written_unchanged() {
        let source = "<tv><programme channel=\"a\"><desc>Hello <b>bold</b> world</desc></programme></tv>";
        let document = parse_document(source, &mut Diagnostics::new()).unwrap();
        let programmes: Vec<Element> = document.programmes().cloned().collect();

        let xml = to_xml_string(&[], &programmes, 2).unwrap();
        assert!(xml.contains("<desc>Hello <b>bold</b> world</desc>"));
    }

    #[test]
    fn test_empty_output_has_root() {
        let xml = to_xml_string(&[], &[], 2).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<tv>"));
        assert!(xml.trim_end().ends_with("</tv>"));
    }
}
