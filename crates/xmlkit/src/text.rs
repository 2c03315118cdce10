//! Text content extraction.

use crate::dom::{NodeId, NodeKind, XmlDocument};

/// Concatenated character data below `node`, in document order.
///
/// Text and CDATA nodes contribute their values; comments and processing
/// instructions contribute nothing. When `normalize_whitespace` is set, each
/// fragment outside an `xml:space="preserve"` scope has its whitespace runs
/// collapsed to a single space. Fragments are joined without separators.
///
/// An id that is not part of `doc` yields an empty string.
///
/// ```
/// use xmlkit::host::QuickXmlHost;
/// use xmlkit::text::get_text;
///
/// let doc = QuickXmlHost::new()
///     .parse_document("<p>one  <b>two</b>\n three</p>")
///     .unwrap();
/// let root = doc.document_element().unwrap();
/// assert_eq!(get_text(&doc, root, true), "one two three");
/// assert_eq!(get_text(&doc, root, false), "one  two\n three");
/// ```
pub fn get_text(doc: &XmlDocument, node: NodeId, normalize_whitespace: bool) -> String {
    if !doc.contains(node) {
        return String::new();
    }

    let mut out = String::new();
    let mut stack = vec![(node, preserve_in_scope(doc, node))];
    while let Some((id, preserve)) = stack.pop() {
        match &doc.node(id).kind {
            NodeKind::Text { content } | NodeKind::CData { content } => {
                if normalize_whitespace && !preserve {
                    push_collapsed(&mut out, content);
                } else {
                    out.push_str(content);
                }
            }
            NodeKind::Comment { .. } | NodeKind::ProcessingInstruction { .. } => {}
            NodeKind::Document | NodeKind::DocumentFragment | NodeKind::Element { .. } => {
                let children: Vec<NodeId> = doc.children(id).collect();
                for &child in children.iter().rev() {
                    stack.push((child, space_flag(doc, child).unwrap_or(preserve)));
                }
            }
        }
    }
    out
}

/// The `xml:space` setting of an element, if it has a meaningful one.
fn space_flag(doc: &XmlDocument, id: NodeId) -> Option<bool> {
    match doc.attribute(id, "xml:space") {
        Some("preserve") => Some(true),
        Some("default") => Some(false),
        _ => None,
    }
}

/// Whether whitespace is preserved at `node`, from the nearest ancestor-or-self
/// carrying `xml:space`.
fn preserve_in_scope(doc: &XmlDocument, node: NodeId) -> bool {
    doc.ancestors(node)
        .find_map(|id| space_flag(doc, id))
        .unwrap_or(false)
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn push_collapsed(out: &mut String, fragment: &str) {
    let mut in_run = false;
    for c in fragment.chars() {
        if is_xml_whitespace(c) {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
}

/// Remove every `<...>` run from markup text.
///
/// This is a textual operation: no parsing happens, and a lone `<` or an
/// empty `<>` is left alone.
///
/// ```
/// use xmlkit::text::strip_tags;
///
/// assert_eq!(
///     strip_tags("<root>this<s> could</s> be <a>wron</a>g</root>"),
///     "this could be wrong"
/// );
/// ```
pub fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) if close > 0 => rest = &after[close + 1..],
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
