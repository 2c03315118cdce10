//! XML host engines.
//!
//! A host is whatever actually builds, parses and serializes documents.
//! Hosts differ in what they can do; each one declares its
//! [`HostCapabilities`] up front and returns `None` from the operations it
//! does not support. The rest of the crate never asks a host for more than it
//! declared.

mod quick;

pub use quick::{ErrorReporting, QuickXmlHost, SyntaxError};

use crate::dom::{NodeId, XmlDocument};

/// What a host can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostCapabilities {
    /// `create_document` honours a namespace URI and qualified root name.
    pub namespaced_constructor: bool,
    /// `create_empty_document` is available.
    pub plain_constructor: bool,
    /// `parse_from_string` is available.
    pub markup_parser: bool,
    /// `serialize_to_string` is available.
    pub serializer: bool,
}

impl HostCapabilities {
    /// Every capability present.
    pub const fn full() -> Self {
        Self {
            namespaced_constructor: true,
            plain_constructor: true,
            markup_parser: true,
            serializer: true,
        }
    }
}

/// An XML engine the kit can drive.
pub trait XmlHost: Send + Sync {
    /// Short name for logs and diagnostics.
    fn name(&self) -> &str;

    fn capabilities(&self) -> HostCapabilities;

    /// Build a document whose root element is `qualified_name` in
    /// `namespace`. Hosts are allowed to drop or rewrite the prefix; callers
    /// check the result.
    fn create_document(
        &self,
        _namespace: Option<&str>,
        _qualified_name: Option<&str>,
    ) -> Option<XmlDocument> {
        None
    }

    /// Build an empty document with no namespace support.
    fn create_empty_document(&self) -> Option<XmlDocument> {
        None
    }

    /// Parse markup. A malformed input still yields a document; how the
    /// failure is recorded in it is host-specific.
    fn parse_from_string(&self, _text: &str, _mime_type: &str) -> Option<XmlDocument> {
        None
    }

    /// Serialize `node` of `doc` to markup.
    fn serialize_to_string(&self, _doc: &XmlDocument, _node: NodeId) -> Option<String> {
        None
    }
}
