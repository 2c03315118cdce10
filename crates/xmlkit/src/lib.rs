//! Uniform XML handling over pluggable host engines.
//!
//! XML engines disagree on the details: whether a document constructor
//! honours namespaces and prefixes, where a failed parse is reported, what a
//! "text" value means. This crate puts one contract on top of any
//! [`XmlHost`]:
//!
//! - [`create_document`]: build an optionally namespaced and rooted document,
//!   falling back across construction strategies and restoring prefixes a
//!   host dropped
//! - [`get_parse_status`]: detect a failed parse wherever the host recorded it
//! - [`copy_child_nodes`], [`move_child_nodes`], [`clear_child_nodes`]: move
//!   children between documents with validated, all-or-nothing semantics
//! - [`get_text`] and [`strip_tags`]: `xml:space`-aware text extraction
//! - [`xmlize`]: turn any `Serialize` value into an XML document
//!
//! The crate-level functions use a default [`Xmlkit`] on the bundled
//! [`QuickXmlHost`](host::QuickXmlHost). Build your own kit to use another
//! host or configuration.
//!
//! # Example
//!
//! ```rust
//! use xmlkit::{PARSED_OK, create_document, get_parse_status, get_text};
//!
//! let doc = create_document(Some("http://example.com/ns"), Some("ex:test")).unwrap();
//! let root = doc.document_element().unwrap();
//! assert_eq!(doc.tag_name(root), Some("ex:test"));
//! assert_eq!(get_parse_status(Some(&doc)).text, PARSED_OK);
//!
//! let parsed = xmlkit::parse_from_string(
//!     "<root xml:space='preserve'>a <![CDATA[ b ]]></root>",
//!     "text/xml",
//! )
//! .unwrap();
//! assert_eq!(get_text(&parsed, parsed.root(), true), "a  b ");
//! ```

pub mod catalog;
pub mod config;
pub mod diagnostic;
pub mod dom;
pub mod error;
pub mod factory;
pub mod host;
pub mod kit;
pub mod parse_status;
pub mod strategy;
pub mod text;
pub mod tree_ops;
pub mod xmlize;

pub use config::XmlkitConfig;
pub use dom::{NodeId, XmlDocument};
pub use error::{Error, Result};
pub use factory::create_document_element;
pub use host::XmlHost;
pub use kit::{Xmlkit, default_kit};
pub use parse_status::{PARSED_EMPTY, PARSED_OK, PARSED_UNKNOWN_ERROR, ParseState, ParseStatus};
pub use text::{get_text, strip_tags};
pub use tree_ops::{
    TransferMode, clear_child_nodes, copy_child_nodes, copy_child_nodes_with,
    copy_child_nodes_within, move_child_nodes, move_child_nodes_with, move_child_nodes_within,
};
pub use xmlize::{XmlizeOptions, xmlize, xmlize_value};

/// Build a document with the default kit.
///
/// # Errors
///
/// Returns [`Error::UnsupportedConfiguration`] if no construction strategy
/// succeeds.
pub fn create_document(
    namespace: Option<&str>,
    qualified_name: Option<&str>,
) -> Result<XmlDocument> {
    default_kit().create_document(namespace, qualified_name)
}

/// Report whether a loaded document parsed cleanly, using the default kit.
pub fn get_parse_status(doc: Option<&XmlDocument>) -> ParseStatus {
    default_kit().get_parse_status(doc)
}

/// Diagnostic text for a loaded document; [`PARSED_OK`] when it parsed cleanly.
pub fn get_parse_error_text(doc: Option<&XmlDocument>) -> String {
    default_kit().get_parse_error_text(doc)
}

/// Parse markup with the default kit's host.
pub fn parse_from_string(text: &str, mime_type: &str) -> Option<XmlDocument> {
    default_kit().parse_from_string(text, mime_type)
}

/// Serialize a node with the default kit's host.
pub fn serialize_to_string(doc: &XmlDocument, node: NodeId) -> Option<String> {
    default_kit().serialize_to_string(doc, node)
}
