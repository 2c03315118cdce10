//! XML markup serializer for document subtrees.
//!
//! Output is self-contained: a namespace that is not declared by the
//! serialized subtree itself gets an explicit `xmlns` declaration on the
//! first element that needs it.

use super::{NodeId, NodeKind, XML_NAMESPACE, XmlDocument, split_qname};
use quick_xml::escape::{escape, partial_escape};

/// Serialize `id` and its descendants to markup.
///
/// Serializing the Document node concatenates its children without an XML
/// declaration.
///
/// ```
/// use xmlkit::dom::{XmlDocument, serialize_node};
///
/// let mut doc = XmlDocument::new();
/// let root = doc.create_element_ns(Some("urn:x"), "x:root");
/// doc.append_child(doc.root(), root).unwrap();
/// assert_eq!(serialize_node(&doc, doc.root()), r#"<x:root xmlns:x="urn:x"/>"#);
/// ```
pub fn serialize_node(doc: &XmlDocument, id: NodeId) -> String {
    let mut out = String::new();
    let mut scope = NamespaceScope::default();
    let mut pending = vec![Step::Enter(id)];
    while let Some(step) = pending.pop() {
        match step {
            Step::Enter(node) => write_node(doc, node, &mut out, &mut scope, &mut pending),
            Step::Close { name, scope_mark } => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
                scope.truncate(scope_mark);
            }
        }
    }
    out
}

/// Work left for the serializer, innermost last.
enum Step<'a> {
    Enter(NodeId),
    /// Write the end tag of an element and drop its namespace bindings.
    Close { name: &'a str, scope_mark: usize },
}

/// Prefix bindings in effect, innermost last.
#[derive(Default)]
struct NamespaceScope {
    bindings: Vec<(String, String)>,
}

impl NamespaceScope {
    fn lookup(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    fn bind(&mut self, prefix: &str, namespace: &str) {
        self.bindings.push((prefix.to_string(), namespace.to_string()));
    }

    fn truncate(&mut self, len: usize) {
        self.bindings.truncate(len);
    }
}

/// Push `id`'s children so that they are entered in document order.
fn push_children<'a>(doc: &'a XmlDocument, id: NodeId, pending: &mut Vec<Step<'a>>) {
    let children: Vec<NodeId> = doc.children(id).collect();
    pending.extend(children.into_iter().rev().map(Step::Enter));
}

/// Write the markup that opens `id`, or all of it for leaf nodes. Element
/// children and end tags are left on `pending`.
fn write_node<'a>(
    doc: &'a XmlDocument,
    id: NodeId,
    out: &mut String,
    scope: &mut NamespaceScope,
    pending: &mut Vec<Step<'a>>,
) {
    match &doc.node(id).kind {
        NodeKind::Document | NodeKind::DocumentFragment => push_children(doc, id, pending),
        NodeKind::Element {
            name,
            namespace,
            attributes,
        } => {
            let mark = scope.bindings.len();
            out.push('<');
            out.push_str(name);

            for attr in attributes {
                if let Some(prefix) = attr.declared_prefix() {
                    scope.bind(prefix, &attr.value);
                }
            }

            let mut extra: Vec<(String, String)> = Vec::new();
            let (prefix, _) = split_qname(name);
            let prefix = prefix.unwrap_or("");
            match namespace.as_deref() {
                Some(ns) if scope.lookup(prefix) != Some(ns) => {
                    extra.push((prefix.to_string(), ns.to_string()));
                }
                None if prefix.is_empty() && scope.lookup("").is_some_and(|ns| !ns.is_empty()) => {
                    extra.push((String::new(), String::new()));
                }
                _ => {}
            }
            for attr in attributes {
                if attr.declared_prefix().is_some() {
                    continue;
                }
                if let (Some(attr_prefix), Some(ns)) =
                    (split_qname(&attr.name).0, attr.namespace.as_deref())
                {
                    if scope.lookup(attr_prefix) != Some(ns)
                        && !extra.iter().any(|(p, _)| p == attr_prefix)
                    {
                        extra.push((attr_prefix.to_string(), ns.to_string()));
                    }
                }
            }

            for attr in attributes {
                write_attribute(out, &attr.name, &attr.value);
            }
            for (prefix, ns) in &extra {
                if prefix.is_empty() {
                    write_attribute(out, "xmlns", ns);
                } else {
                    write_attribute(out, &format!("xmlns:{prefix}"), ns);
                }
                scope.bind(prefix, ns);
            }

            if doc.has_child_nodes(id) {
                out.push('>');
                pending.push(Step::Close {
                    name,
                    scope_mark: mark,
                });
                push_children(doc, id, pending);
            } else {
                out.push_str("/>");
                scope.truncate(mark);
            }
        }
        NodeKind::Text { content } => out.push_str(&partial_escape(content.as_str())),
        NodeKind::CData { content } => {
            // `]]>` cannot appear inside a section; split it across two.
            out.push_str("<![CDATA[");
            out.push_str(&content.replace("]]>", "]]]]><![CDATA[>"));
            out.push_str("]]>");
        }
        NodeKind::Comment { content } => {
            out.push_str("<!--");
            out.push_str(content);
            out.push_str("-->");
        }
        NodeKind::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            if let Some(data) = data.as_deref().filter(|d| !d.is_empty()) {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
    }
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_mixed_content() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("root");
        doc.append_child(doc.root(), root).unwrap();
        doc.set_attribute(root, "title", "a \"quoted\" <title>").unwrap();
        let text = doc.create_text_node("1 < 2 & 3");
        let cdata = doc.create_cdata_section("<raw>");
        let comment = doc.create_comment(" note ");
        let empty = doc.create_element("empty");
        for id in [text, cdata, comment, empty] {
            doc.append_child(root, id).unwrap();
        }

        insta::assert_snapshot!(
            serialize_node(&doc, doc.root()),
            @r#"<root title="a &quot;quoted&quot; &lt;title&gt;">1 &lt; 2 &amp; 3<![CDATA[<raw>]]><!-- note --><empty/></root>"#
        );
    }

    #[test]
    fn test_declares_namespace_once() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element_ns(Some("urn:a"), "a:root");
        let child = doc.create_element_ns(Some("urn:a"), "a:child");
        let other = doc.create_element_ns(Some("urn:b"), "item");
        doc.append_child(doc.root(), root).unwrap();
        doc.append_child(root, child).unwrap();
        doc.append_child(child, other).unwrap();

        assert_eq!(
            serialize_node(&doc, root),
            r#"<a:root xmlns:a="urn:a"><a:child><item xmlns="urn:b"/></a:child></a:root>"#
        );
    }

    #[test]
    fn test_existing_declaration_is_reused() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element_ns(Some("urn:a"), "a:root");
        doc.append_child(doc.root(), root).unwrap();
        doc.set_attribute(root, "xmlns:a", "urn:a").unwrap();

        assert_eq!(serialize_node(&doc, root), r#"<a:root xmlns:a="urn:a"/>"#);
    }

    #[test]
    fn test_unprefixed_child_undeclares_default() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element_ns(Some("urn:d"), "root");
        let plain = doc.create_element("plain");
        doc.append_child(doc.root(), root).unwrap();
        doc.append_child(root, plain).unwrap();

        assert_eq!(
            serialize_node(&doc, root),
            r#"<root xmlns="urn:d"><plain xmlns=""/></root>"#
        );
    }

    #[test]
    fn test_processing_instruction() {
        let mut doc = XmlDocument::new();
        let pi = doc.create_processing_instruction("xml-stylesheet", Some("href=\"a.xsl\""));
        doc.append_child(doc.root(), pi).unwrap();
        assert_eq!(
            serialize_node(&doc, doc.root()),
            r#"<?xml-stylesheet href="a.xsl"?>"#
        );
    }

    #[test]
    fn test_deeply_nested_elements() {
        let depth = 100_000;
        let mut doc = XmlDocument::new();
        let mut parent = doc.root();
        for _ in 0..depth {
            let child = doc.create_element_ns(Some("urn:n"), "n:e");
            doc.append_child(parent, child).unwrap();
            parent = child;
        }

        let markup = serialize_node(&doc, doc.root());
        assert!(markup.starts_with(r#"<n:e xmlns:n="urn:n"><n:e>"#));
        assert!(markup.ends_with("<n:e/></n:e></n:e>"));
        assert_eq!(markup.matches("xmlns:n").count(), 1);
        assert_eq!(markup.matches("</n:e>").count(), depth - 1);
    }
}
