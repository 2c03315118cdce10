//! Arena-based XML document tree.
//!
//! All nodes of a document live in a `Vec<NodeData>` owned by the
//! [`XmlDocument`] and are addressed by [`NodeId`], a newtype over
//! `NonZeroU32`. A `NodeId` is only meaningful for the document that issued
//! it; the document is the node's owner, so there is no separate
//! back-reference to keep in sync.
//!
//! Moving a node to another document is an import (deep copy into the
//! destination arena) followed by a detach from the source. The source arena
//! keeps the detached slots, but they are no longer reachable from its root.

mod node;
mod serialize;

pub use node::{Attribute, NodeKind, XML_NAMESPACE, XMLNS_NAMESPACE, split_qname};
pub use serialize::serialize_node;

use crate::error::{Error, Result};
use std::num::NonZeroU32;

/// A typed index into a document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index)
            .ok()
            .and_then(NonZeroU32::new)
            .expect("arena index must fit in a non-zero u32");
        Self(raw)
    }

    fn as_index(self) -> usize {
        self.0.get() as usize
    }
}

/// Storage for a single node in the document arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// How a document came into existence.
///
/// Diagnostics only treat a missing document element as a failure for
/// documents that came out of a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentOrigin {
    #[default]
    Constructed,
    Parsed,
}

/// Parse-error property bag, for hosts that report failures on the
/// document object instead of in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseErrorInfo {
    /// Zero means "no error".
    pub error_code: i32,
    pub reason: String,
    pub line: usize,
    pub column: usize,
    /// The source line the error was found on.
    pub source_text: String,
}

/// An XML document.
///
/// Navigation goes through `&XmlDocument`, mutation through
/// `&mut XmlDocument`.
///
/// ```
/// use xmlkit::dom::XmlDocument;
///
/// let mut doc = XmlDocument::new();
/// let root = doc.create_element("root");
/// doc.append_child(doc.root(), root).unwrap();
/// assert_eq!(doc.document_element(), Some(root));
/// assert_eq!(doc.node_name(root), "root");
/// ```
#[derive(Debug, Clone)]
pub struct XmlDocument {
    /// Index 0 is a placeholder so that `NodeId` can be non-zero.
    nodes: Vec<NodeData>,
    root: NodeId,
    origin: DocumentOrigin,
    parse_error: Option<ParseErrorInfo>,
    default_namespace: Option<String>,
}

impl XmlDocument {
    /// Creates a new empty document holding only the Document node.
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(16);
        nodes.push(NodeData::new(NodeKind::Document));
        nodes.push(NodeData::new(NodeKind::Document));
        Self {
            nodes,
            root: NodeId::from_index(1),
            origin: DocumentOrigin::Constructed,
            parse_error: None,
            default_namespace: None,
        }
    }

    /// The Document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The single top-level element, if any.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .find(|&id| self.node(id).kind.is_element())
    }

    pub fn origin(&self) -> DocumentOrigin {
        self.origin
    }

    pub fn set_origin(&mut self, origin: DocumentOrigin) {
        self.origin = origin;
    }

    pub fn parse_error(&self) -> Option<&ParseErrorInfo> {
        self.parse_error.as_ref()
    }

    pub fn set_parse_error(&mut self, info: Option<ParseErrorInfo>) {
        self.parse_error = info;
    }

    /// Namespace requested for a document that was created without a root.
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    pub fn set_default_namespace(&mut self, namespace: Option<String>) {
        self.default_namespace = namespace;
    }

    // --- Node access ---

    /// Whether `id` addresses a node of this document.
    pub fn contains(&self, id: NodeId) -> bool {
        id.as_index() < self.nodes.len()
    }

    /// Returns `Err(InvalidNode)` unless `id` addresses a node of this document.
    pub fn check(&self, id: NodeId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(Error::InvalidNode(id))
        }
    }

    /// # Panics
    ///
    /// Panics if `id` does not refer to a node of this document.
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.as_index())
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// DOM `nodeName`: the qualified name for elements, the target for
    /// processing instructions, `#text`, `#cdata-section`, `#comment`,
    /// `#document` or `#document-fragment` otherwise.
    pub fn node_name(&self, id: NodeId) -> &str {
        match &self.node(id).kind {
            NodeKind::Element { name, .. } => name,
            NodeKind::ProcessingInstruction { target, .. } => target,
            NodeKind::Text { .. } => "#text",
            NodeKind::CData { .. } => "#cdata-section",
            NodeKind::Comment { .. } => "#comment",
            NodeKind::Document => "#document",
            NodeKind::DocumentFragment => "#document-fragment",
        }
    }

    /// DOM `nodeValue`: character data for text-like nodes, `None` otherwise.
    pub fn node_value(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text { content }
            | NodeKind::CData { content }
            | NodeKind::Comment { content } => Some(content),
            NodeKind::ProcessingInstruction { data, .. } => data.as_deref(),
            _ => None,
        }
    }

    /// Qualified name of an element, prefix included.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn prefix(&self, id: NodeId) -> Option<&str> {
        self.tag_name(id).and_then(|name| split_qname(name).0)
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.tag_name(id).map(|name| split_qname(name).1)
    }

    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { namespace, .. } => namespace.as_deref(),
            _ => None,
        }
    }

    /// Attributes of an element; empty for other nodes.
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.node(id).kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Value of an attribute by qualified name.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set or replace an attribute on an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        self.check(id)?;
        match &mut self.node_mut(id).kind {
            NodeKind::Element { attributes, .. } => {
                match attributes.iter_mut().find(|a| a.name == name) {
                    Some(existing) => existing.value = value.to_string(),
                    None => attributes.push(Attribute::new(name, value)),
                }
                Ok(())
            }
            _ => Err(Error::hierarchy(format!(
                "cannot set attribute `{}` on a non-element node",
                name
            ))),
        }
    }

    /// Change an element's qualified name and namespace in place, keeping
    /// its attributes and children.
    pub fn rename_element(
        &mut self,
        id: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> Result<()> {
        self.check(id)?;
        match &mut self.node_mut(id).kind {
            NodeKind::Element {
                name,
                namespace: ns,
                ..
            } => {
                *name = qualified_name.to_string();
                *ns = namespace.filter(|n| !n.is_empty()).map(str::to_string);
                Ok(())
            }
            _ => Err(Error::hierarchy("only elements can be renamed")),
        }
    }

    // --- Factories ---

    /// Allocates a detached node.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(NodeData::new(kind));
        NodeId::from_index(index)
    }

    /// Creates an element with no namespace.
    pub fn create_element(&mut self, qualified_name: &str) -> NodeId {
        self.create_node(NodeKind::element(qualified_name, None))
    }

    /// Creates an element in `namespace`, keeping the prefix of
    /// `qualified_name` verbatim.
    pub fn create_element_ns(&mut self, namespace: Option<&str>, qualified_name: &str) -> NodeId {
        let namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        self.create_node(NodeKind::element(qualified_name, namespace))
    }

    pub fn create_text_node(&mut self, content: &str) -> NodeId {
        self.create_node(NodeKind::Text {
            content: content.to_string(),
        })
    }

    pub fn create_cdata_section(&mut self, content: &str) -> NodeId {
        self.create_node(NodeKind::CData {
            content: content.to_string(),
        })
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.create_node(NodeKind::Comment {
            content: content.to_string(),
        })
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: Option<&str>) -> NodeId {
        self.create_node(NodeKind::ProcessingInstruction {
            target: target.to_string(),
            data: data.map(str::to_string),
        })
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.create_node(NodeKind::DocumentFragment)
    }

    // --- Navigation ---

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.node(id).first_child,
        }
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        self.node(id).first_child.is_some()
    }

    /// A node and its ancestors, walking up to the Document node.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: Some(id),
        }
    }

    /// All descendants of a node in document order, the node itself excluded.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Elements below the Document node whose qualified name is `name`;
    /// `"*"` matches every element.
    pub fn get_elements_by_tag_name(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .filter(|&id| match self.tag_name(id) {
                Some(tag) => name == "*" || tag == name,
                None => false,
            })
            .collect()
    }

    // --- Mutation ---

    /// Appends `child` as the last child of `parent`.
    ///
    /// A child that already has a parent is detached first. Appending a
    /// document fragment appends its children instead, leaving the
    /// fragment empty.
    ///
    /// # Errors
    ///
    /// `InvalidNode` for foreign ids, `HierarchyRequest` when the result
    /// would not be a legal tree (cycles, non-container parents, a second
    /// document element, text directly under the Document node).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;

        if matches!(self.node(child).kind, NodeKind::DocumentFragment) {
            let children: Vec<NodeId> = self.children(child).collect();
            for grandchild in &children {
                self.check_insertable(parent, *grandchild, &children)?;
            }
            for grandchild in children {
                self.detach(grandchild);
                self.link_child(parent, grandchild);
            }
            return Ok(());
        }

        self.check_insertable(parent, child, &[])?;
        self.detach(child);
        self.link_child(parent, child);
        Ok(())
    }

    /// Validates that `child` may become a child of `parent`, given that
    /// `batch` holds the other nodes being inserted in the same operation.
    pub(crate) fn check_insertable(
        &self,
        parent: NodeId,
        child: NodeId,
        batch: &[NodeId],
    ) -> Result<()> {
        let parent_kind = &self.node(parent).kind;
        if !parent_kind.is_container() {
            return Err(Error::hierarchy(format!(
                "a {} node cannot have children",
                self.node_name(parent)
            )));
        }
        if matches!(self.node(child).kind, NodeKind::Document) {
            return Err(Error::hierarchy("a document node cannot be inserted"));
        }
        if self.ancestors(parent).any(|a| a == child) {
            return Err(Error::hierarchy(format!(
                "cannot insert <{}> into itself or one of its descendants",
                self.node_name(child)
            )));
        }
        if matches!(parent_kind, NodeKind::Document) {
            self.check_document_child(parent, &self.node(child).kind, child, batch)?;
        }
        Ok(())
    }

    fn check_document_child(
        &self,
        document: NodeId,
        kind: &NodeKind,
        child: NodeId,
        batch: &[NodeId],
    ) -> Result<()> {
        match kind {
            NodeKind::Element { .. } => {
                let existing = self
                    .children(document)
                    .filter(|&id| id != child && self.node(id).kind.is_element())
                    .count();
                let batched = batch
                    .iter()
                    .filter(|&&id| id != child && self.node(id).kind.is_element())
                    .count();
                if existing + batched > 0 {
                    return Err(Error::hierarchy(
                        "a document can only have one document element",
                    ));
                }
                Ok(())
            }
            NodeKind::Comment { .. } | NodeKind::ProcessingInstruction { .. } => Ok(()),
            _ => Err(Error::hierarchy(format!(
                "a {} node cannot be a child of the document",
                kind.type_name()
            ))),
        }
    }

    /// Links a detached node as the last child of `parent` without checks.
    pub(crate) fn link_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.node(child).parent.is_none(),
            "child already has a parent; detach it first"
        );

        self.node_mut(child).parent = Some(parent);

        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
            self.node_mut(parent).last_child = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
            self.node_mut(parent).last_child = Some(child);
        }
    }

    /// Detaches a node from its parent. The node stays allocated.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };

        let prev = self.node(id).prev_sibling;
        let next = self.node(id).next_sibling;

        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }

        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        let node = self.node_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Copies `node` of `source` into this document as a new detached node.
    ///
    /// # Errors
    ///
    /// `InvalidNode` if `node` is not in `source`; `HierarchyRequest` for
    /// Document nodes, which cannot be imported.
    pub fn import_node(&mut self, source: &XmlDocument, node: NodeId, deep: bool) -> Result<NodeId> {
        source.check(node)?;
        if matches!(source.node(node).kind, NodeKind::Document) {
            return Err(Error::hierarchy("a document node cannot be imported"));
        }
        let snapshot = Snapshot::capture(source, node, deep);
        Ok(self.materialize(snapshot))
    }

    /// Copies `node` within this document as a new detached node.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> Result<NodeId> {
        self.check(node)?;
        if matches!(self.node(node).kind, NodeKind::Document) {
            return Err(Error::hierarchy("a document node cannot be cloned in place"));
        }
        let snapshot = Snapshot::capture(self, node, deep);
        Ok(self.materialize(snapshot))
    }

    /// Allocates the captured nodes and links each under its copied parent.
    /// Returns the copy of the subtree root.
    fn materialize(&mut self, snapshot: Snapshot) -> NodeId {
        let mut created: Vec<NodeId> = Vec::with_capacity(snapshot.entries.len());
        for (kind, parent) in snapshot.entries {
            let id = self.create_node(kind);
            if let Some(parent) = parent {
                self.link_child(created[parent], id);
            }
            created.push(id);
        }
        created[0]
    }

    /// Number of arena slots in use, detached nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned copy of a subtree, used to move nodes between arenas.
///
/// Entries are in document order. Each one holds the position of its
/// parent's entry, so a parent always precedes its children.
struct Snapshot {
    entries: Vec<(NodeKind, Option<usize>)>,
}

impl Snapshot {
    fn capture(doc: &XmlDocument, id: NodeId, deep: bool) -> Self {
        let mut entries = Vec::new();
        let mut pending = vec![(id, None)];
        while let Some((node, parent)) = pending.pop() {
            let slot = entries.len();
            entries.push((doc.node(node).kind.clone(), parent));
            if deep {
                // Reversed so that popping yields document order.
                let children: Vec<NodeId> = doc.children(node).collect();
                pending.extend(children.into_iter().rev().map(|child| (child, Some(slot))));
            }
        }
        Snapshot { entries }
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a XmlDocument,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over a node and its ancestors.
pub struct Ancestors<'a> {
    doc: &'a XmlDocument,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).parent;
        Some(current)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    doc: &'a XmlDocument,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        if let Some(child) = self.doc.first_child(current) {
            self.next = Some(child);
            return Some(current);
        }

        let mut cursor = current;
        loop {
            if cursor == self.root {
                self.next = None;
                break;
            }
            if let Some(sibling) = self.doc.next_sibling(cursor) {
                self.next = Some(sibling);
                break;
            }
            match self.doc.parent(cursor) {
                Some(parent) => cursor = parent,
                None => {
                    self.next = None;
                    break;
                }
            }
        }
        Some(current)
    }
}
