//! Node type definitions.
//!
//! `NodeKind` carries the per-type payload of a node. Navigation links
//! (parent, children, siblings) are stored in `NodeData`, not here.

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace of `xmlns` and `xmlns:*` declaration attributes.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// The kind of an XML node and its associated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node; there is exactly one per `XmlDocument`.
    Document,

    /// A container for a forest of sibling nodes.
    DocumentFragment,

    /// An element node, e.g. `<svg:rect width="2">`.
    Element {
        /// The qualified name exactly as created or parsed (`svg:rect`).
        name: String,
        /// Namespace URI, if any.
        namespace: Option<String>,
        attributes: Vec<Attribute>,
    },

    /// Character data, entity references already resolved.
    Text { content: String },

    /// A CDATA section; the content is never escaped.
    CData { content: String },

    Comment { content: String },

    ProcessingInstruction {
        target: String,
        data: Option<String>,
    },
}

impl NodeKind {
    /// Create an element payload, deriving nothing from the name.
    pub fn element(name: impl Into<String>, namespace: Option<String>) -> Self {
        NodeKind::Element {
            name: name.into(),
            namespace,
            attributes: Vec::new(),
        }
    }

    /// Short name of the node type for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Document => "#document",
            NodeKind::DocumentFragment => "#document-fragment",
            NodeKind::Element { .. } => "element",
            NodeKind::Text { .. } => "#text",
            NodeKind::CData { .. } => "#cdata-section",
            NodeKind::Comment { .. } => "#comment",
            NodeKind::ProcessingInstruction { .. } => "processing instruction",
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, NodeKind::Element { .. })
    }

    /// Whether this node may hold children at all.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Document | NodeKind::DocumentFragment | NodeKind::Element { .. }
        )
    }
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name (`xml:space`, `xmlns:p`, `id`).
    pub name: String,
    /// Value with entity references resolved.
    pub value: String,
    /// Namespace URI after resolution, if any.
    pub namespace: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = match split_qname(&name) {
            (Some("xml"), _) => Some(XML_NAMESPACE.to_string()),
            (Some("xmlns"), _) => Some(XMLNS_NAMESPACE.to_string()),
            (None, "xmlns") => Some(XMLNS_NAMESPACE.to_string()),
            _ => None,
        };
        Self {
            name,
            value: value.into(),
            namespace,
        }
    }

    /// If this attribute declares a namespace, the prefix it binds
    /// (`""` for the default namespace).
    pub fn declared_prefix(&self) -> Option<&str> {
        match split_qname(&self.name) {
            (Some("xmlns"), local) => Some(local),
            (None, "xmlns") => Some(""),
            _ => None,
        }
    }
}

/// Splits a qualified name into its prefix and local name.
///
/// Only the first colon separates.
///
/// ```
/// use xmlkit::dom::split_qname;
///
/// assert_eq!(split_qname("svg:rect"), (Some("svg"), "rect"));
/// assert_eq!(split_qname("div"), (None, "div"));
/// ```
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.find(':') {
        Some(pos) => (Some(&qname[..pos]), &qname[pos + 1..]),
        None => (None, qname),
    }
}
