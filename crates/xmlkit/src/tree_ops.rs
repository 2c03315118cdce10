//! Copy, move and clear child nodes.
//!
//! Every operation validates its whole request before touching either tree,
//! so an `Err` always leaves both documents as they were.

use crate::dom::{NodeId, NodeKind, XmlDocument};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// What happens to the destination's existing children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferMode {
    /// Keep them; the transferred nodes follow them.
    ///
    /// A Document node holds a single element, so an incoming element takes
    /// the place of the current document element there. Comments and
    /// processing instructions under the Document node are kept.
    #[default]
    Append,
    /// Remove them all first.
    Replace,
}

/// Deep-copy every child of `from` and append the copies to `to`, in order.
///
/// `from` is left untouched. Copying one Document node into another swaps
/// the destination's document element for the copied one.
pub fn copy_child_nodes(
    from_doc: &XmlDocument,
    from: NodeId,
    to_doc: &mut XmlDocument,
    to: NodeId,
) -> Result<()> {
    copy_child_nodes_with(from_doc, from, to_doc, to, TransferMode::default())
}

pub fn copy_child_nodes_with(
    from_doc: &XmlDocument,
    from: NodeId,
    to_doc: &mut XmlDocument,
    to: NodeId,
    mode: TransferMode,
) -> Result<()> {
    from_doc.check(from)?;
    to_doc.check(to)?;
    let children: Vec<NodeId> = from_doc.children(from).collect();
    let kinds: Vec<&NodeKind> = children.iter().map(|&id| from_doc.kind(id)).collect();
    check_destination(to_doc, to, &kinds, mode)?;
    let brings_element = kinds.iter().any(|kind| kind.is_element());

    make_room(to_doc, to, brings_element, mode);
    for child in &children {
        let copy = to_doc.import_node(from_doc, *child, true)?;
        to_doc.link_child(to, copy);
    }
    tracing::trace!(count = children.len(), ?mode, "copied child nodes");
    Ok(())
}

/// Move every child of `from` to the end of `to`, in order.
///
/// `from` ends up with no children; the moved subtrees now belong to
/// `to_doc`.
pub fn move_child_nodes(
    from_doc: &mut XmlDocument,
    from: NodeId,
    to_doc: &mut XmlDocument,
    to: NodeId,
) -> Result<()> {
    move_child_nodes_with(from_doc, from, to_doc, to, TransferMode::default())
}

pub fn move_child_nodes_with(
    from_doc: &mut XmlDocument,
    from: NodeId,
    to_doc: &mut XmlDocument,
    to: NodeId,
    mode: TransferMode,
) -> Result<()> {
    copy_child_nodes_with(from_doc, from, to_doc, to, mode)?;
    clear(from_doc, from);
    Ok(())
}

/// [`copy_child_nodes_with`] inside a single document. `from == to` is a no-op.
pub fn copy_child_nodes_within(
    doc: &mut XmlDocument,
    from: NodeId,
    to: NodeId,
    mode: TransferMode,
) -> Result<()> {
    doc.check(from)?;
    doc.check(to)?;
    if from == to {
        return Ok(());
    }
    let children: Vec<NodeId> = doc.children(from).collect();
    let kinds: Vec<&NodeKind> = children.iter().map(|&id| doc.kind(id)).collect();
    check_destination(doc, to, &kinds, mode)?;
    let brings_element = kinds.iter().any(|kind| kind.is_element());

    // Clone before clearing: `from` may live inside `to`.
    let mut copies = Vec::with_capacity(children.len());
    for child in children {
        copies.push(doc.clone_node(child, true)?);
    }
    make_room(doc, to, brings_element, mode);
    for copy in copies {
        doc.link_child(to, copy);
    }
    Ok(())
}

/// [`move_child_nodes_with`] inside a single document. `from == to` is a no-op.
///
/// # Errors
///
/// `HierarchyRequest` if `to` is one of the moved nodes or lies below one.
pub fn move_child_nodes_within(
    doc: &mut XmlDocument,
    from: NodeId,
    to: NodeId,
    mode: TransferMode,
) -> Result<()> {
    doc.check(from)?;
    doc.check(to)?;
    if from == to {
        return Ok(());
    }
    let children: Vec<NodeId> = doc.children(from).collect();
    if let Some(&ancestor) = children.iter().find(|&&c| doc.ancestors(to).any(|a| a == c)) {
        return Err(Error::hierarchy(format!(
            "cannot move <{}> into itself or one of its descendants",
            doc.node_name(ancestor)
        )));
    }
    let kinds: Vec<&NodeKind> = children.iter().map(|&id| doc.kind(id)).collect();
    check_destination(doc, to, &kinds, mode)?;
    let brings_element = kinds.iter().any(|kind| kind.is_element());

    make_room(doc, to, brings_element, mode);
    for child in children {
        doc.detach(child);
        doc.link_child(to, child);
    }
    Ok(())
}

/// Remove every child of `node`. A node without children is left as is.
pub fn clear_child_nodes(doc: &mut XmlDocument, node: NodeId) -> Result<()> {
    doc.check(node)?;
    clear(doc, node);
    Ok(())
}

fn clear(doc: &mut XmlDocument, node: NodeId) {
    while let Some(child) = doc.first_child(node) {
        doc.detach(child);
    }
}

/// Remove what the transfer displaces from `to`.
fn make_room(doc: &mut XmlDocument, to: NodeId, brings_element: bool, mode: TransferMode) {
    match mode {
        TransferMode::Replace => clear(doc, to),
        TransferMode::Append => {
            if brings_element && matches!(doc.kind(to), NodeKind::Document) {
                if let Some(current) = doc.document_element() {
                    doc.detach(current);
                }
            }
        }
    }
}

/// Check that nodes of `incoming` kinds may become children of `to`.
fn check_destination(
    doc: &XmlDocument,
    to: NodeId,
    incoming: &[&NodeKind],
    mode: TransferMode,
) -> Result<()> {
    let kind = doc.kind(to);
    if !kind.is_container() {
        return Err(Error::hierarchy(format!(
            "a {} node cannot have children",
            kind.type_name()
        )));
    }
    if !matches!(kind, NodeKind::Document) {
        return Ok(());
    }

    // Any current document element is displaced, so only incoming ones count.
    let mut elements = 0;
    for kind in incoming {
        match kind {
            NodeKind::Element { .. } => elements += 1,
            NodeKind::Comment { .. } | NodeKind::ProcessingInstruction { .. } => {}
            other => {
                return Err(Error::hierarchy(format!(
                    "a {} node cannot be a child of the document",
                    other.type_name()
                )));
            }
        }
    }
    if elements > 1 {
        return Err(Error::hierarchy(
            "a document can only have one document element",
        ));
    }
    Ok(())
}
