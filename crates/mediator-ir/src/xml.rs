//! XML reader and writer
//!
//! The reader materializes a whole document as a [`Node`] tree; the writer
//! renders a tree back into a byte buffer. Both are built on `quick-xml`.

use crate::document::{Declaration, Document, DocumentMetadata};
use crate::metadata::Position;
use crate::node::Node;
use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;
use tracing::trace;

/// Reads XML bytes into a [`Document`]
#[derive(Debug, Default)]
pub struct XmlReader;

impl XmlReader {
    /// Create a new reader
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a complete document.
    ///
    /// Line ends are normalized first: `\r\n` and a lone `\r` both read as
    /// `\n`. A `&#13;` reference still yields a carriage return.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] for non UTF-8 input and [`Error::Malformed`]
    /// when the input is not a well-formed document with a single root.
    pub fn read(&self, bytes: &[u8]) -> Result<Document> {
        let input = normalize_line_ends(std::str::from_utf8(bytes)?);
        let input: &str = &input;
        let mut reader = Reader::from_str(input);

        let mut declaration = None;
        let mut stack: Vec<Node> = Vec::new();
        let mut root: Option<Node> = None;

        loop {
            let offset = to_offset(reader.buffer_position());
            let event = reader.read_event().map_err(|e| {
                Error::malformed(
                    Position::from_offset(input, to_offset(reader.error_position())),
                    e.to_string(),
                )
            })?;
            let at = || Position::from_offset(input, offset);

            match event {
                Event::Decl(decl) => {
                    declaration = Some(read_declaration(&decl, at())?);
                }
                Event::Start(start) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(Error::malformed(at(), "content after the root element"));
                    }
                    stack.push(read_start(&start, at())?);
                }
                Event::Empty(start) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(Error::malformed(at(), "content after the root element"));
                    }
                    let node = read_start(&start, at())?;
                    close(node, &mut stack, &mut root);
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| Error::malformed(at(), "unexpected closing tag"))?;
                    close(node, &mut stack, &mut root);
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| Error::malformed(at(), e.to_string()))?;
                    append_text(&text, &mut stack, at())?;
                }
                Event::CData(data) => {
                    let text = std::str::from_utf8(&data)?;
                    append_text(text, &mut stack, at())?;
                }
                Event::Eof => {
                    if let Some(open) = stack.last() {
                        return Err(Error::malformed(
                            at(),
                            format!("unexpected end of document inside <{}>", open.name),
                        ));
                    }
                    break;
                }
                // Comments, processing instructions and DOCTYPE carry no data
                _ => {}
            }
        }

        let root = root.ok_or_else(|| {
            Error::malformed(Position::from_offset(input, 0), "document has no root element")
        })?;
        trace!("Read XML document with root <{}>", root.name);

        Ok(Document::with_metadata(root, DocumentMetadata { declaration }))
    }
}

fn normalize_line_ends(input: &str) -> Cow<'_, str> {
    if input.contains('\r') {
        Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(input)
    }
}

fn to_offset<T: TryInto<usize>>(position: T) -> usize {
    position.try_into().unwrap_or(usize::MAX)
}

fn utf8(bytes: &[u8], position: Position) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::malformed(position, e.to_string()))
}

fn read_start(start: &BytesStart<'_>, position: Position) -> Result<Node> {
    let mut node = Node::new(utf8(start.name().as_ref(), position)?);
    node.position = Some(position);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| Error::malformed(position, e.to_string()))?;
        let key = utf8(attribute.key.as_ref(), position)?.to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| Error::malformed(position, e.to_string()))?;
        node.set_attribute(key, value.into_owned());
    }

    Ok(node)
}

fn read_declaration(decl: &BytesDecl<'_>, position: Position) -> Result<Declaration> {
    let version = decl
        .version()
        .map_err(|e| Error::malformed(position, e.to_string()))?;
    let encoding = match decl.encoding() {
        Some(value) => {
            let value = value.map_err(|e| Error::malformed(position, e.to_string()))?;
            Some(decl_field(&value, position)?)
        }
        None => None,
    };
    let standalone = match decl.standalone() {
        Some(value) => {
            let value = value.map_err(|e| Error::malformed(position, e.to_string()))?;
            Some(decl_field(&value, position)?)
        }
        None => None,
    };

    Ok(Declaration {
        version: decl_field(&version, position)?,
        encoding,
        standalone,
    })
}

fn decl_field(value: &Cow<'_, [u8]>, position: Position) -> Result<String> {
    utf8(value, position).map(str::to_string)
}

fn append_text(text: &str, stack: &mut [Node], position: Position) -> Result<()> {
    match stack.last_mut() {
        Some(node) => {
            node.push_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(Error::malformed(
            position,
            "character data outside the root element",
        )),
    }
}

fn close(mut node: Node, stack: &mut [Node], root: &mut Option<Node>) {
    // Indentation between child elements is not content
    if !node.children.is_empty() && !node.has_significant_text() {
        node.text = None;
    }

    match stack.last_mut() {
        Some(parent) => {
            parent.add_child(node);
        }
        None => *root = Some(node),
    }
}

/// Options controlling how a tree is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Declaration written before the root element, if any
    pub declaration: Option<Declaration>,
    /// Number of spaces per nesting level; `None` writes everything on one line
    pub indent: Option<usize>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            declaration: Some(Declaration::default()),
            indent: None,
        }
    }
}

/// Renders a [`Node`] tree as XML bytes
#[derive(Debug, Default)]
pub struct XmlWriter {
    options: WriterOptions,
}

impl XmlWriter {
    /// Create a writer with the given options
    #[must_use]
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }

    /// Render `root` into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the underlying writer fails.
    pub fn write(&self, root: &Node) -> Result<Vec<u8>> {
        let mut writer = match self.options.indent {
            Some(width) if width > 0 => Writer::new_with_indent(Vec::new(), b' ', width),
            _ => Writer::new(Vec::new()),
        };

        if let Some(decl) = &self.options.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new(
                    &decl.version,
                    decl.encoding.as_deref(),
                    decl.standalone.as_deref(),
                )))
                .map_err(|e| Error::Write(e.to_string()))?;
        }

        write_node(&mut writer, root)?;
        Ok(writer.into_inner())
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = node.text.as_deref().filter(|t| !t.is_empty());
    if node.children.is_empty() && text.is_none() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::Write(e.to_string()))?;
    if let Some(text) = text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| Error::Write(e.to_string()))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(|e| Error::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> Result<Document> {
        XmlReader::new().read(input.as_bytes())
    }

    #[test]
    fn test_read_simple_document() {
        let doc = read(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<oldschema>
    <oldid>1234</oldid>
    <oldname>TEST</oldname>
</oldschema>"#,
        )
        .unwrap();

        assert_eq!(doc.root.name, "oldschema");
        assert!(doc.root.text.is_none());
        assert_eq!(doc.root.children.len(), 2);
        assert_eq!(doc.root.child_text("oldid"), Some("1234"));

        let decl = doc.metadata.declaration.unwrap();
        assert_eq!(decl.version, "1.0");
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));
        assert!(decl.standalone.is_none());
    }

    #[test]
    fn test_read_records_positions() {
        let doc = read("<a>\n  <b>x</b>\n</a>").unwrap();
        let b = doc.root.find_child("b").unwrap();
        let pos = b.position.unwrap();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn test_read_unescapes_text_and_attributes() {
        let doc = read(r#"<a note="x &amp; y">1 &lt; 2</a>"#).unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("1 < 2"));
        assert_eq!(doc.root.attributes.get("note").map(String::as_str), Some("x & y"));
    }

    #[test]
    fn test_read_cdata_and_comments() {
        let doc = read("<a><!-- note --><![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("<raw>"));
    }

    #[test]
    fn test_read_empty_element() {
        let doc = read("<a><b/></a>").unwrap();
        let b = doc.root.find_child("b").unwrap();
        assert!(b.text.is_none());
        assert!(b.children.is_empty());
    }

    #[test]
    fn test_read_keeps_leaf_whitespace() {
        let doc = read("<a> padded </a>").unwrap();
        assert_eq!(doc.root.text.as_deref(), Some(" padded "));
    }

    #[test]
    fn test_read_normalizes_line_ends() {
        let doc = read("<a>one\r\ntwo\rthree</a>").unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("one\ntwo\nthree"));
    }

    #[test]
    fn test_read_keeps_escaped_carriage_return() {
        let doc = read("<a>x&#13;\r\ny</a>").unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("x\r\ny"));
    }

    #[test]
    fn test_read_positions_with_crlf() {
        let doc = read("<a>\r\n  <b>x</b>\r\n</a>").unwrap();
        let pos = doc.root.find_child("b").unwrap().position.unwrap();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn test_read_rejects_mismatched_tags() {
        let err = read("<a><b></a></b>").unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_read_rejects_unclosed_root() {
        let err = read("<a><b>text</b>").unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_read_rejects_empty_input() {
        let err = read("   ").unwrap_err();
        assert!(err.to_string().contains("no root element"));
    }

    #[test]
    fn test_read_rejects_second_root() {
        let err = read("<a/><b/>").unwrap_err();
        assert!(err.to_string().contains("after the root element"));
    }

    #[test]
    fn test_read_rejects_text_outside_root() {
        let err = read("hello <a/>").unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_read_rejects_invalid_utf8() {
        let err = XmlReader::new().read(&[b'<', b'a', 0xff, b'>']).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_write_compact_with_declaration() {
        let mut root = Node::new("newschema");
        root.add_child(Node::with_text("newid", "1234"));
        root.add_child(Node::new("newdata"));

        let bytes = XmlWriter::default().write(&root).unwrap();
        let xml = String::from_utf8(bytes).unwrap();

        assert_eq!(
            xml,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><newschema><newid>1234</newid><newdata/></newschema>"#
        );
    }

    #[test]
    fn test_write_escapes_text() {
        let root = Node::with_text("a", "x < y & z");
        let options = WriterOptions {
            declaration: None,
            indent: None,
        };
        let xml = String::from_utf8(XmlWriter::new(options).write(&root).unwrap()).unwrap();
        assert_eq!(xml, "<a>x &lt; y &amp; z</a>");
    }

    #[test]
    fn test_write_indented() {
        let mut root = Node::new("a");
        root.add_child(Node::with_text("b", "1"));
        let options = WriterOptions {
            declaration: None,
            indent: Some(4),
        };
        let xml = String::from_utf8(XmlWriter::new(options).write(&root).unwrap()).unwrap();
        assert_eq!(xml, "<a>\n    <b>1</b>\n</a>");
    }

    #[test]
    fn test_write_then_read_preserves_tree() {
        let mut root = Node::new("a");
        root.set_attribute("kind", "x\"y");
        root.add_child(Node::with_text("b", "<&>"));

        let bytes = XmlWriter::default().write(&root).unwrap();
        let doc = XmlReader::new().read(&bytes).unwrap();

        assert_eq!(doc.root.attributes.get("kind").map(String::as_str), Some("x\"y"));
        assert_eq!(doc.root.child_text("b"), Some("<&>"));
    }
}
