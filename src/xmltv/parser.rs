//! Quick-XML based XMLTV parser
//!
//! Builds an owned [`Document`] from XMLTV content. A strict pass is tried
//! first; if it fails a lenient pass recovers what it can: end-tag names are
//! not checked, mismatched elements are closed by name, stray end tags are
//! ignored and a hard syntax error truncates the document at that point as
//! long as a root element had been opened.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info};

use crate::diagnostics::{Diagnostics, Warning};
use crate::errors::{SourceError, SourceResult};
use crate::xmltv::document::{Attribute, Document, Element, Node};

const SOURCE_TYPE: &str = "XMLTV";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Strict,
    Lenient,
}

/// Parse XMLTV content, falling back to lenient recovery
pub fn parse_document(content: &str, diagnostics: &mut Diagnostics) -> SourceResult<Document> {
    let document = match parse_with_mode(content, Mode::Strict, diagnostics) {
        Ok(document) => document,
        Err(strict_error) => {
            info!("XML parsing error: {}", strict_error);
            info!("Attempting to parse with error recovery...");
            let document = parse_with_mode(content, Mode::Lenient, diagnostics).map_err(|e| {
                SourceError::parse_error(
                    SOURCE_TYPE,
                    format!("{strict_error}; recovery also failed: {e}"),
                )
            })?;
            diagnostics.warn(Warning::Document {
                message: format!("Document parsed with error recovery after: {strict_error}"),
            });
            document
        }
    };

    if document.root.name != "tv" {
        diagnostics.warn(Warning::Document {
            message: format!(
                "Root element is <{}>, expected <tv>",
                document.root.name
            ),
        });
    }

    debug!(
        "Parsed XMLTV document with {} top-level nodes",
        document.root.children.len()
    );
    Ok(document)
}

/// Parse with end-name checks on, without any recovery
pub fn parse_strict(content: &str) -> SourceResult<Document> {
    parse_with_mode(content, Mode::Strict, &mut Diagnostics::new())
}

fn parse_with_mode(
    content: &str,
    mode: Mode,
    diagnostics: &mut Diagnostics,
) -> SourceResult<Document> {
    let mut reader = Reader::from_str(content);
    if mode == Mode::Lenient {
        reader.config_mut().check_end_names = false;
    }

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                let position = reader.buffer_position();
                if mode == Mode::Lenient && (!stack.is_empty() || root.is_some()) {
                    diagnostics.warn(Warning::Document {
                        message: format!(
                            "Truncating document at byte {position} after error: {e}"
                        ),
                    });
                    break;
                }
                return Err(SourceError::parse_error(
                    SOURCE_TYPE,
                    format!("{e} at byte {position}"),
                ));
            }
        };

        match event {
            Event::Start(ref e) => {
                if root.is_some() && stack.is_empty() {
                    if mode == Mode::Strict {
                        return Err(SourceError::parse_error(
                            SOURCE_TYPE,
                            "multiple root elements",
                        ));
                    }
                    // Lenient: ignore anything after the root closed
                    reader.read_to_end(e.name()).ok();
                    continue;
                }
                stack.push(element_from_start(e, mode)?);
            }

            Event::Empty(ref e) => {
                let element = element_from_start(e, mode)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(element)),
                    None if root.is_none() => root = Some(element),
                    None if mode == Mode::Strict => {
                        return Err(SourceError::parse_error(
                            SOURCE_TYPE,
                            "multiple root elements",
                        ));
                    }
                    None => {}
                }
            }

            Event::End(ref e) => {
                let name = decode_name(e.name().as_ref())?;
                match mode {
                    Mode::Strict => close_top(&mut stack, &mut root),
                    Mode::Lenient => {
                        if let Some(index) = stack.iter().rposition(|el| el.name == name) {
                            while stack.len() > index {
                                close_top(&mut stack, &mut root);
                            }
                        } else {
                            debug!("Ignoring stray end tag </{}>", name);
                        }
                    }
                }
            }

            Event::Text(ref e) => {
                let text = std::str::from_utf8(e)
                    .map_err(|e| SourceError::parse_error(SOURCE_TYPE, format!("Invalid UTF-8 in text: {e}")))?;
                if let Some(parent) = stack.last_mut() {
                    if !text.trim().is_empty() {
                        parent.children.push(Node::Text(text.to_string()));
                    }
                }
            }

            Event::CData(ref e) => {
                let text = std::str::from_utf8(e)
                    .map_err(|e| SourceError::parse_error(SOURCE_TYPE, format!("Invalid UTF-8 in CDATA: {e}")))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::CData(text.to_string()));
                }
            }

            Event::Comment(ref e) => {
                if let (Some(parent), Ok(text)) = (stack.last_mut(), std::str::from_utf8(e)) {
                    parent.children.push(Node::Comment(text.to_string()));
                }
            }

            Event::Eof => break,

            _ => {} // Declarations, doctype and processing instructions are regenerated on output
        }
    }

    if !stack.is_empty() {
        if mode == Mode::Strict {
            return Err(SourceError::parse_error(
                SOURCE_TYPE,
                format!("unclosed element <{}>", stack[stack.len() - 1].name),
            ));
        }
        diagnostics.warn(Warning::Document {
            message: format!("Closing {} unterminated element(s) at end of input", stack.len()),
        });
        while !stack.is_empty() {
            close_top(&mut stack, &mut root);
        }
    }

    root.map(Document::new).ok_or_else(|| SourceError::MissingRoot {
        source_type: SOURCE_TYPE.to_string(),
    })
}

/// Pop the innermost open element and attach it to its parent (or make it the root)
fn close_top(stack: &mut Vec<Element>, root: &mut Option<Element>) {
    if let Some(element) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(Node::Element(element)),
            None => {
                if root.is_none() {
                    *root = Some(element);
                }
            }
        }
    }
}

fn element_from_start(start: &BytesStart, mode: Mode) -> SourceResult<Element> {
    let mut element = Element::new(decode_name(start.name().as_ref())?);

    let mut attributes = start.attributes();
    if mode == Mode::Lenient {
        attributes.with_checks(false);
    }
    for attr in attributes {
        let attr = match attr {
            Ok(attr) => attr,
            Err(e) if mode == Mode::Strict => {
                return Err(SourceError::parse_error(
                    SOURCE_TYPE,
                    format!("Invalid attribute on <{}>: {e}", element.name),
                ));
            }
            Err(_) => continue,
        };
        let key = std::str::from_utf8(attr.key.as_ref());
        let value = std::str::from_utf8(&attr.value);
        if let (Ok(key), Ok(value)) = (key, value) {
            element.attributes.push(Attribute::from_raw(key, value));
        }
    }
    Ok(element)
}

fn decode_name(name: &[u8]) -> SourceResult<String> {
    std::str::from_utf8(name)
        .map(str::to_string)
        .map_err(|e| SourceError::parse_error(SOURCE_TYPE, format!("Invalid UTF-8 in XML element name: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE tv SYSTEM "xmltv.dtd">
<tv generator-info-name="test">
  <channel id="bbc1.uk">
    <display-name>BBC One</display-name>
    <icon src="http://example.com/a.png" />
  </channel>
  <programme start="20240101120000 +0000" channel="bbc1.uk">
    <title lang="en">News &amp; Weather</title>
    <desc>Headlines</desc>
  </programme>
</tv>"#;

    #[test]
    fn test_parse_sample_document() {
        let mut diagnostics = Diagnostics::new();
        let document = parse_document(SAMPLE, &mut diagnostics).unwrap();

        assert_eq!(document.root.name, "tv");
        assert_eq!(document.root.attr("generator-info-name").unwrap(), "test");
        assert_eq!(document.channels().count(), 1);
        assert_eq!(document.programmes().count(), 1);
        assert!(diagnostics.is_empty());

        let channel = document.channels().next().unwrap();
        assert_eq!(channel.attr("id").unwrap(), "bbc1.uk");
        assert_eq!(channel.elements().count(), 2);

        let programme = document.programmes().next().unwrap();
        let title = programme.elements_named("title").next().unwrap();
        assert_eq!(title.text(), "News & Weather");
        assert_eq!(title.attr("lang").unwrap(), "en");
    }

    #[test]
    fn test_whitespace_text_is_dropped() {
        let document = parse_strict("<tv>\n  <channel id=\"a\">\n  </channel>\n</tv>").unwrap();
        let channel = document.channels().next().unwrap();
        assert!(channel.children.is_empty());
        assert_eq!(document.root.children.len(), 1);
    }

    #[test]
    fn test_mixed_content_keeps_inner_spaces() {
        let document =
            parse_strict("<tv><programme channel=\"a\"><desc>Hello <b>bold</b> world</desc></programme></tv>")
                .unwrap();
        let desc = document.programmes().next().unwrap().elements().next().unwrap();
        assert_eq!(desc.text(), "Hello  world");
        assert_eq!(desc.children.len(), 3);
    }

    #[test]
    fn test_mismatched_end_tag_recovers() {
        let content = "<tv><channel id=\"a\"><display-name>A</channel><channel id=\"b\"/></tv>";
        assert!(parse_strict(content).is_err());

        let mut diagnostics = Diagnostics::new();
        let document = parse_document(content, &mut diagnostics).unwrap();
        let ids: Vec<String> = document
            .channels()
            .map(|c| c.attr("id").unwrap().into_owned())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn test_unterminated_document_recovers() {
        let content = "<tv><channel id=\"a\"/><programme channel=\"a\" start=\"20240101000000\"><title>T</title>";
        let mut diagnostics = Diagnostics::new();
        let document = parse_document(content, &mut diagnostics).unwrap();
        assert_eq!(document.channels().count(), 1);
        assert_eq!(document.programmes().count(), 1);
    }

    #[test]
    fn test_garbage_is_fatal() {
        let mut diagnostics = Diagnostics::new();
        let err = parse_document("this is not xml at all", &mut diagnostics).unwrap_err();
        assert!(err.to_string().contains("XMLTV"));
    }

    #[test]
    fn test_unexpected_root_name_warns() {
        let mut diagnostics = Diagnostics::new();
        parse_document("<guide><channel id=\"a\"/></guide>", &mut diagnostics).unwrap();
        assert_eq!(diagnostics.warnings().len(), 1);
    }
}
