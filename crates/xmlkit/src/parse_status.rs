//! Parse-failure detection.
//!
//! Hosts report a failed parse in different places. [`get_parse_status`]
//! checks each [`DiagnosticConvention`] in priority order and returns the
//! first non-empty diagnostic, or [`PARSED_OK`] when none applies. It never
//! fails.

use crate::dom::{DocumentOrigin, NodeKind, XmlDocument};
use crate::strategy::DiagnosticConvention;
use crate::text::get_text;
use serde::{Deserialize, Serialize};

/// Diagnostic text of a document without parse errors.
pub const PARSED_OK: &str = "Document contains no parsing errors";

/// Diagnostic text when there is no document, or the parser produced no root.
pub const PARSED_EMPTY: &str = "Document is empty";

/// Diagnostic text for a recorded failure that came without a reason.
pub const PARSED_UNKNOWN_ERROR: &str = "Not well-formed or other error";

/// Name of the element hosts use to report a failed parse.
pub const PARSERERROR_ELEMENT: &str = "parsererror";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseState {
    Ok,
    Error,
}

/// Outcome of [`get_parse_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStatus {
    pub state: ParseState,
    /// [`PARSED_OK`] when `state` is `Ok`, the normalized diagnostic otherwise.
    pub text: String,
}

impl ParseStatus {
    pub fn ok() -> Self {
        Self {
            state: ParseState::Ok,
            text: PARSED_OK.to_string(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            state: ParseState::Error,
            text: text.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.state == ParseState::Ok
    }
}

/// Inspect a loaded document for parse errors.
///
/// ```
/// use xmlkit::dom::XmlDocument;
/// use xmlkit::parse_status::{PARSED_EMPTY, PARSED_OK, get_parse_status};
/// use xmlkit::strategy::DiagnosticConvention;
///
/// let order = DiagnosticConvention::DEFAULT_ORDER;
/// assert_eq!(get_parse_status(Some(&XmlDocument::new()), &order).text, PARSED_OK);
/// assert_eq!(get_parse_status(None, &order).text, PARSED_EMPTY);
/// ```
pub fn get_parse_status(doc: Option<&XmlDocument>, order: &[DiagnosticConvention]) -> ParseStatus {
    for &convention in order {
        let found = match convention {
            DiagnosticConvention::AbsentDocument => absent_document(doc),
            DiagnosticConvention::ErrorDocument => doc.and_then(error_document),
            DiagnosticConvention::NestedErrorElement => doc.and_then(nested_error_element),
            DiagnosticConvention::ParseErrorProperty => doc.and_then(parse_error_property),
        };
        match found {
            Some(text) if !text.is_empty() => {
                tracing::trace!(convention = convention.name(), "parse error found");
                return ParseStatus::error(text);
            }
            _ => {}
        }
    }
    ParseStatus::ok()
}

fn absent_document(doc: Option<&XmlDocument>) -> Option<String> {
    match doc {
        None => Some(PARSED_EMPTY.to_string()),
        Some(doc)
            if doc.origin() == DocumentOrigin::Parsed
                && doc.document_element().is_none() =>
        {
            Some(PARSED_EMPTY.to_string())
        }
        Some(_) => None,
    }
}

/// Leading text of the `parsererror` root, then the `sourcetext` that follows it.
fn error_document(doc: &XmlDocument) -> Option<String> {
    let root = doc.document_element()?;
    if doc.local_name(root) != Some(PARSERERROR_ELEMENT) {
        return None;
    }

    let mut text = String::new();
    let mut children = doc.children(root).peekable();
    while let Some(&child) = children.peek() {
        match &doc.node(child).kind {
            NodeKind::Text { content } | NodeKind::CData { content } => text.push_str(content),
            _ => break,
        }
        children.next();
    }

    if let Some(sourcetext) = children.find(|&id| doc.local_name(id) == Some("sourcetext")) {
        text.push('\n');
        text.push_str(&get_text(doc, sourcetext, false));
    }
    if text.is_empty() {
        text = get_text(doc, root, false);
    }
    Some(text)
}

fn nested_error_element(doc: &XmlDocument) -> Option<String> {
    let root = doc.document_element()?;
    let found = doc
        .descendants(root)
        .find(|&id| doc.local_name(id) == Some(PARSERERROR_ELEMENT))?;
    let mut text = get_text(doc, found, false);
    text.push('\n');
    Some(text)
}

fn parse_error_property(doc: &XmlDocument) -> Option<String> {
    let info = doc.parse_error()?;
    if info.error_code == 0 {
        return None;
    }
    if info.reason.is_empty() {
        Some(PARSED_UNKNOWN_ERROR.to_string())
    } else {
        Some(info.reason.clone())
    }
}
