//! A full-featured host built on the quick-xml tokenizer.

use super::{HostCapabilities, XmlHost};
use crate::diagnostic::{DiagnosticMessage, DiagnosticMessageBuilder, Location};
use crate::dom::{
    Attribute, DocumentOrigin, NodeId, NodeKind, ParseErrorInfo, XmlDocument, serialize_node,
    split_qname,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace of the error document produced for malformed input.
pub const PARSERERROR_NAMESPACE: &str = "http://www.mozilla.org/newlayout/xml/parsererror.xml";

/// How [`QuickXmlHost`] records a failed parse in the returned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorReporting {
    /// Replace the document with a `parsererror` root whose text describes
    /// the failure, followed by a `sourcetext` element quoting the
    /// offending line.
    #[default]
    ErrorDocument,
    /// Keep whatever was built before the failure and fill the document's
    /// parse-error property bag.
    ParseErrorProperty,
}

/// Errors found while tokenizing or assembling a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("XML syntax error: {message}")]
    XmlSyntax {
        message: String,
        /// Byte offset where the error occurred.
        position: Option<u64>,
    },

    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String, position: usize },

    #[error("Mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("Invalid XML structure: {message}")]
    InvalidStructure { message: String, position: usize },

    #[error("Empty XML document: no root element found")]
    EmptyDocument,

    #[error("Invalid XML: multiple root elements")]
    MultipleRoots { position: usize },
}

impl SyntaxError {
    /// Byte offset of the failure, when known.
    pub fn position(&self) -> Option<usize> {
        match self {
            SyntaxError::XmlSyntax { position, .. } => {
                position.and_then(|p| usize::try_from(p).ok())
            }
            SyntaxError::UnexpectedEof { position, .. }
            | SyntaxError::MismatchedEndTag { position, .. }
            | SyntaxError::InvalidStructure { position, .. }
            | SyntaxError::MultipleRoots { position } => Some(*position),
            SyntaxError::EmptyDocument => None,
        }
    }

    /// Non-zero error code stored in the parse-error property bag.
    pub fn error_code(&self) -> i32 {
        match self {
            SyntaxError::XmlSyntax { .. } => 1,
            SyntaxError::UnexpectedEof { .. } => 2,
            SyntaxError::MismatchedEndTag { .. } => 3,
            SyntaxError::InvalidStructure { .. } => 4,
            SyntaxError::EmptyDocument => 5,
            SyntaxError::MultipleRoots { .. } => 6,
        }
    }

    /// Convert to a [`DiagnosticMessage`], locating the failure in `source`.
    pub fn to_diagnostic(&self, source: &str) -> DiagnosticMessage {
        let builder = match self {
            SyntaxError::XmlSyntax { message, .. } => {
                DiagnosticMessageBuilder::error("XML Syntax Error")
                    .with_code("X-2-1")
                    .problem(message.clone())
            }
            SyntaxError::UnexpectedEof { expected, .. } => {
                DiagnosticMessageBuilder::error("Unexpected End of XML Input")
                    .with_code("X-2-2")
                    .problem(format!(
                        "The XML document ended unexpectedly; expected {}",
                        expected
                    ))
            }
            SyntaxError::MismatchedEndTag {
                expected, found, ..
            } => DiagnosticMessageBuilder::error("Mismatched XML End Tag")
                .with_code("X-2-3")
                .problem(format!(
                    "End tag </{}> does not match start tag <{}>",
                    found, expected
                ))
                .add_detail(format!("Expected: </{}>", expected))
                .add_hint("Check that all opening tags have matching closing tags?"),
            SyntaxError::InvalidStructure { message, .. } => {
                DiagnosticMessageBuilder::error("Invalid XML Structure")
                    .with_code("X-2-4")
                    .problem(message.clone())
            }
            SyntaxError::EmptyDocument => DiagnosticMessageBuilder::error("Empty XML Document")
                .with_code("X-2-5")
                .problem("The XML document contains no root element"),
            SyntaxError::MultipleRoots { .. } => {
                DiagnosticMessageBuilder::error("Multiple XML Root Elements")
                    .with_code("X-2-6")
                    .problem("An XML document must have exactly one root element")
                    .add_hint("Wrap the elements in a single root element?")
            }
        };
        match self.position() {
            Some(offset) => builder
                .with_location(Location::from_offset(source, offset))
                .build(),
            None => builder.build(),
        }
    }
}

/// Host backed by quick-xml and the crate's own arena tree.
///
/// Supports every capability: namespaced and plain construction, parsing
/// (with whitespace-only text preserved) and serialization.
#[derive(Debug, Clone, Default)]
pub struct QuickXmlHost {
    error_reporting: ErrorReporting,
}

impl QuickXmlHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_reporting(error_reporting: ErrorReporting) -> Self {
        Self { error_reporting }
    }

    pub fn error_reporting(&self) -> ErrorReporting {
        self.error_reporting
    }

    /// Parse markup, returning the failure as an error instead of recording
    /// it in a document.
    ///
    /// ```
    /// use xmlkit::host::QuickXmlHost;
    ///
    /// let doc = QuickXmlHost::new().parse_document("<root><child/></root>").unwrap();
    /// let root = doc.document_element().unwrap();
    /// assert_eq!(doc.node_name(root), "root");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the markup is not a well-formed document.
    pub fn parse_document(&self, text: &str) -> Result<XmlDocument, SyntaxError> {
        let mut parser = XmlParser::new(text);
        parser.parse()?;
        Ok(parser.doc)
    }

    fn error_document(text: &str, err: &SyntaxError) -> XmlDocument {
        let location = err.position().map(|p| Location::from_offset(text, p));
        let mut doc = XmlDocument::new();
        doc.set_origin(DocumentOrigin::Parsed);

        let root = doc.create_element_ns(Some(PARSERERROR_NAMESPACE), "parsererror");
        doc.link_child(doc.root(), root);

        let mut message = format!("XML Parsing Error: {}", err);
        if let Some(location) = location {
            message.push_str(&format!(
                "\nLine Number {}, Column {}:",
                location.line, location.column
            ));
        }
        let message = doc.create_text_node(&message);
        doc.link_child(root, message);

        if let Some(location) = location {
            let sourcetext = doc.create_element_ns(Some(PARSERERROR_NAMESPACE), "sourcetext");
            let line = source_line(text, location.line);
            let pointer = format!("{}^", "-".repeat(location.column.saturating_sub(1)));
            let quoted = doc.create_text_node(&format!("{}\n{}", line, pointer));
            doc.link_child(root, sourcetext);
            doc.link_child(sourcetext, quoted);
        }
        doc
    }
}

fn source_line(text: &str, line: usize) -> &str {
    text.lines().nth(line.saturating_sub(1)).unwrap_or_default()
}

fn is_xml_mime_type(mime_type: &str) -> bool {
    matches!(
        mime_type,
        "text/xml" | "application/xml" | "application/xhtml+xml"
    ) || mime_type.ends_with("+xml")
}

impl XmlHost for QuickXmlHost {
    fn name(&self) -> &str {
        "quick-xml"
    }

    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities::full()
    }

    fn create_document(
        &self,
        namespace: Option<&str>,
        qualified_name: Option<&str>,
    ) -> Option<XmlDocument> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        let mut doc = XmlDocument::new();
        match qualified_name.filter(|name| !name.is_empty()) {
            Some(name) => {
                let root = doc.create_element_ns(namespace, name);
                doc.link_child(doc.root(), root);
            }
            None => doc.set_default_namespace(namespace.map(str::to_string)),
        }
        Some(doc)
    }

    fn create_empty_document(&self) -> Option<XmlDocument> {
        Some(XmlDocument::new())
    }

    fn parse_from_string(&self, text: &str, mime_type: &str) -> Option<XmlDocument> {
        if !is_xml_mime_type(mime_type) {
            tracing::debug!(mime_type, "quick-xml host refuses non-XML content type");
            return None;
        }

        let mut parser = XmlParser::new(text);
        let err = match parser.parse() {
            Ok(()) => return Some(parser.doc),
            Err(err) => err,
        };
        tracing::debug!(error = %err, "markup failed to parse");

        match self.error_reporting {
            ErrorReporting::ErrorDocument => Some(Self::error_document(text, &err)),
            ErrorReporting::ParseErrorProperty => {
                let location = err
                    .position()
                    .map(|p| Location::from_offset(text, p))
                    .unwrap_or(Location { line: 0, column: 0 });
                let mut doc = parser.doc;
                doc.set_parse_error(Some(ParseErrorInfo {
                    error_code: err.error_code(),
                    reason: err.to_string(),
                    line: location.line,
                    column: location.column,
                    source_text: source_line(text, location.line).to_string(),
                }));
                Some(doc)
            }
        }
    }

    fn serialize_to_string(&self, doc: &XmlDocument, node: NodeId) -> Option<String> {
        doc.contains(node).then(|| serialize_node(doc, node))
    }
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    id: NodeId,
    name: String,
    start: usize,
    /// Length of the namespace scope before this element's declarations.
    scope_mark: usize,
}

/// Internal parser state.
///
/// Nodes are linked into the document as soon as they are read, so a
/// failed parse leaves the well-formed prefix in place.
struct XmlParser<'a> {
    reader: Reader<&'a [u8]>,
    doc: XmlDocument,
    stack: Vec<OpenElement>,
    /// In-scope prefix bindings, innermost last; `""` is the default namespace.
    scope: Vec<(String, String)>,
    has_root: bool,
}

impl<'a> XmlParser<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        reader.config_mut().check_end_names = false;

        let mut doc = XmlDocument::new();
        doc.set_origin(DocumentOrigin::Parsed);

        Self {
            reader,
            doc,
            stack: Vec::new(),
            scope: Vec::new(),
            has_root: false,
        }
    }

    fn parse(&mut self) -> Result<(), SyntaxError> {
        loop {
            let event_start = self.position();

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let (id, mark) = self.open_element(&e, event_start)?;
                    self.stack.push(OpenElement {
                        id,
                        name: qname_of(&e),
                        start: event_start,
                        scope_mark: mark,
                    });
                }
                Ok(Event::Empty(e)) => {
                    let (_, mark) = self.open_element(&e, event_start)?;
                    self.scope.truncate(mark);
                }
                Ok(Event::End(e)) => {
                    let found = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    let open = self.stack.pop().ok_or_else(|| SyntaxError::InvalidStructure {
                        message: format!("Unexpected closing tag </{}>", found),
                        position: event_start,
                    })?;
                    if open.name != found {
                        return Err(SyntaxError::MismatchedEndTag {
                            expected: open.name,
                            found,
                            position: event_start,
                        });
                    }
                    self.scope.truncate(open.scope_mark);
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|err| SyntaxError::XmlSyntax {
                        message: format!("Invalid text content: {}", err),
                        position: Some(event_start as u64),
                    })?;
                    match self.stack.last() {
                        Some(parent) => {
                            let parent = parent.id;
                            let id = self.doc.create_text_node(&text);
                            self.doc.link_child(parent, id);
                        }
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(SyntaxError::InvalidStructure {
                                message: "Text is not allowed outside the document element"
                                    .to_string(),
                                position: event_start,
                            });
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    let Some(parent) = self.stack.last().map(|open| open.id) else {
                        return Err(SyntaxError::InvalidStructure {
                            message: "CDATA is not allowed outside the document element"
                                .to_string(),
                            position: event_start,
                        });
                    };
                    let text = String::from_utf8_lossy(&e).to_string();
                    let id = self.doc.create_cdata_section(&text);
                    self.doc.link_child(parent, id);
                }
                Ok(Event::Comment(e)) => {
                    let text = String::from_utf8_lossy(&e).to_string();
                    let id = self.doc.create_comment(&text);
                    self.link_to_current(id);
                }
                Ok(Event::PI(e)) => {
                    let target = String::from_utf8_lossy(e.target()).to_string();
                    let data = String::from_utf8_lossy(e.content()).trim_start().to_string();
                    let data = (!data.is_empty()).then_some(data);
                    let id = self
                        .doc
                        .create_processing_instruction(&target, data.as_deref());
                    self.link_to_current(id);
                }
                Ok(Event::Decl(_) | Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SyntaxError::XmlSyntax {
                        message: e.to_string(),
                        position: Some(self.reader.error_position()),
                    });
                }
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(SyntaxError::UnexpectedEof {
                expected: format!("closing tag </{}>", open.name),
                position: open.start,
            });
        }
        if !self.has_root {
            return Err(SyntaxError::EmptyDocument);
        }
        Ok(())
    }

    fn position(&self) -> usize {
        usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX)
    }

    /// Create an element from a start tag, bind its namespace declarations
    /// and link it under the current parent. Returns the element and the
    /// scope length to restore when it closes.
    fn open_element(
        &mut self,
        e: &BytesStart<'_>,
        event_start: usize,
    ) -> Result<(NodeId, usize), SyntaxError> {
        if self.stack.is_empty() {
            if self.has_root {
                return Err(SyntaxError::MultipleRoots {
                    position: event_start,
                });
            }
            self.has_root = true;
        }

        let name = qname_of(e);
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| SyntaxError::XmlSyntax {
                message: format!("Invalid attribute: {}", err),
                position: Some(event_start as u64),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(|err| SyntaxError::XmlSyntax {
                message: format!("Invalid attribute value: {}", err),
                position: Some(event_start as u64),
            })?;
            attributes.push(Attribute::new(key, value.into_owned()));
        }

        let mark = self.scope.len();
        for attr in &attributes {
            if let Some(prefix) = attr.declared_prefix() {
                self.scope.push((prefix.to_string(), attr.value.clone()));
            }
        }
        for attr in &mut attributes {
            if attr.namespace.is_none() {
                if let (Some(prefix), _) = split_qname(&attr.name) {
                    attr.namespace = self.lookup(prefix).map(str::to_string);
                }
            }
        }

        let namespace = self
            .lookup(split_qname(&name).0.unwrap_or(""))
            .map(str::to_string);
        let id = self.doc.create_node(NodeKind::Element {
            name,
            namespace,
            attributes,
        });
        self.link_to_current(id);
        Ok((id, mark))
    }

    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.scope
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
            .filter(|ns| !ns.is_empty())
    }

    fn link_to_current(&mut self, id: NodeId) {
        let parent = self
            .stack
            .last()
            .map_or_else(|| self.doc.root(), |open| open.id);
        self.doc.link_child(parent, id);
    }
}

fn qname_of(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::XML_NAMESPACE;

    fn parse(text: &str) -> XmlDocument {
        QuickXmlHost::new().parse_document(text).unwrap()
    }

    #[test]
    fn test_parse_simple() {
        let doc = parse("<root><child attr=\"v\">text</child></root>");
        let root = doc.document_element().unwrap();
        assert_eq!(doc.node_name(root), "root");
        let child = doc.first_child(root).unwrap();
        assert_eq!(doc.attribute(child, "attr"), Some("v"));
        let text = doc.first_child(child).unwrap();
        assert_eq!(doc.node_value(text), Some("text"));
        assert_eq!(doc.origin(), DocumentOrigin::Parsed);
    }

    #[test]
    fn test_whitespace_text_is_kept() {
        let doc = parse("<root>a<b/> <c/></root>");
        let root = doc.document_element().unwrap();
        let names: Vec<&str> = doc.children(root).map(|id| doc.node_name(id)).collect();
        assert_eq!(names, vec!["#text", "b", "#text", "c"]);
    }

    #[test]
    fn test_entities_and_cdata() {
        let doc = parse("<r a='&lt;x&gt;'>1 &amp; 2<![CDATA[<raw> &amp;]]></r>");
        let root = doc.document_element().unwrap();
        assert_eq!(doc.attribute(root, "a"), Some("<x>"));
        let values: Vec<&str> = doc
            .children(root)
            .filter_map(|id| doc.node_value(id))
            .collect();
        assert_eq!(values, vec!["1 & 2", "<raw> &amp;"]);
    }

    #[test]
    fn test_namespace_resolution() {
        let doc = parse(
            "<p:root xmlns:p='urn:p' xmlns='urn:d'><child/><p:x xml:space='preserve'/></p:root>",
        );
        let root = doc.document_element().unwrap();
        assert_eq!(doc.namespace_uri(root), Some("urn:p"));
        let children: Vec<NodeId> = doc.children(root).collect();
        assert_eq!(doc.namespace_uri(children[0]), Some("urn:d"));
        assert_eq!(doc.namespace_uri(children[1]), Some("urn:p"));
        assert_eq!(
            doc.attributes(children[1])[0].namespace.as_deref(),
            Some(XML_NAMESPACE)
        );
    }

    #[test]
    fn test_namespace_scope_ends_with_element() {
        let doc = parse("<root><a xmlns='urn:a'/><b/></root>");
        let root = doc.document_element().unwrap();
        let children: Vec<NodeId> = doc.children(root).collect();
        assert_eq!(doc.namespace_uri(children[0]), Some("urn:a"));
        assert_eq!(doc.namespace_uri(children[1]), None);
    }

    #[test]
    fn test_comments_and_pis_around_root() {
        let doc = parse("<?xml version='1.0'?><!-- head --><?pi data?><root/>");
        let kinds: Vec<&str> = doc
            .children(doc.root())
            .map(|id| doc.node_name(id))
            .collect();
        assert_eq!(kinds, vec!["#comment", "pi", "root"]);
    }

    #[test]
    fn test_syntax_errors() {
        let host = QuickXmlHost::new();
        assert!(matches!(
            host.parse_document("<a></b>"),
            Err(SyntaxError::MismatchedEndTag { .. })
        ));
        assert!(matches!(
            host.parse_document("<a><b></b>"),
            Err(SyntaxError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            host.parse_document(""),
            Err(SyntaxError::EmptyDocument)
        ));
        assert!(matches!(
            host.parse_document("<a/><b/>"),
            Err(SyntaxError::MultipleRoots { .. })
        ));
        assert!(matches!(
            host.parse_document("<a/>text"),
            Err(SyntaxError::InvalidStructure { .. })
        ));
        assert!(host.parse_document("</a>").is_err());
    }

    #[test]
    fn test_mismatched_tag_diagnostic() {
        let source = "<root>\n  <a></b>\n</root>";
        let err = QuickXmlHost::new().parse_document(source).unwrap_err();
        let diag = err.to_diagnostic(source);
        assert_eq!(diag.code.as_deref(), Some("X-2-3"));
        assert_eq!(diag.location, Some(Location { line: 2, column: 6 }));
    }

    #[test]
    fn test_error_document_shape() {
        let doc = QuickXmlHost::new()
            .parse_from_string("<root>\n<a></b>\n</root>", "text/xml")
            .unwrap();
        let root = doc.document_element().unwrap();
        assert_eq!(doc.node_name(root), "parsererror");
        assert_eq!(doc.namespace_uri(root), Some(PARSERERROR_NAMESPACE));

        let message = doc.first_child(root).unwrap();
        assert!(doc.node_value(message).unwrap().starts_with("XML Parsing Error:"));

        let sourcetext = doc.next_sibling(message).unwrap();
        assert_eq!(doc.node_name(sourcetext), "sourcetext");
        let quoted = doc.first_child(sourcetext).unwrap();
        assert_eq!(doc.node_value(quoted), Some("<a></b>\n---^"));
    }

    #[test]
    fn test_parse_error_property_keeps_prefix() {
        let host = QuickXmlHost::with_error_reporting(ErrorReporting::ParseErrorProperty);
        let doc = host.parse_from_string("<root><a>ok</a><b></c></root>", "text/xml").unwrap();

        let info = doc.parse_error().unwrap();
        assert_eq!(info.error_code, 3);
        assert!(info.reason.contains("expected </b>"));
        assert_eq!(info.line, 1);

        let root = doc.document_element().unwrap();
        assert_eq!(doc.child_count(root), 2);
    }

    #[test]
    fn test_unsupported_mime_type() {
        assert!(QuickXmlHost::new().parse_from_string("<r/>", "text/html").is_none());
        assert!(QuickXmlHost::new().parse_from_string("<r/>", "image/svg+xml").is_some());
    }

    #[test]
    fn test_create_document_without_root_keeps_namespace() {
        let doc = QuickXmlHost::new().create_document(Some("urn:x"), None).unwrap();
        assert_eq!(doc.document_element(), None);
        assert_eq!(doc.default_namespace(), Some("urn:x"));
    }
}
