//! Document construction across hosts.
//!
//! Each strategy of the kit's [`StrategyTable`] is tried in order. A
//! document a strategy produces is checked before it is returned: the root
//! element must carry exactly the requested qualified name. A host that
//! dropped or rewrote only the prefix is corrected in place; anything else
//! rejects the strategy.

use crate::dom::{DocumentOrigin, NodeId, XmlDocument, split_qname};
use crate::error::{Error, Result};
use crate::host::XmlHost;
use crate::strategy::{ConstructionStrategy, StrategyTable};
use quick_xml::escape::escape;

/// Build a document, optionally namespaced and rooted.
///
/// Empty strings count as absent. With a namespace but no root name the
/// result is an empty document that remembers the namespace as its default.
///
/// # Errors
///
/// Returns [`Error::UnsupportedConfiguration`] when no strategy of `table`
/// could build the document.
pub fn create_document(
    host: &dyn XmlHost,
    table: &StrategyTable,
    namespace: Option<&str>,
    qualified_name: Option<&str>,
) -> Result<XmlDocument> {
    let namespace = namespace.filter(|ns| !ns.is_empty());
    let qualified_name = qualified_name.filter(|name| !name.is_empty());
    let mut attempted = Vec::new();

    for &strategy in table.construction() {
        attempted.push(strategy.name());
        let produced = match strategy {
            ConstructionStrategy::NativeNamespaced => {
                host.create_document(namespace, qualified_name)
            }
            ConstructionStrategy::MarkupFallback => match qualified_name {
                Some(name) => {
                    let markup = root_markup(namespace, name);
                    host.parse_from_string(&markup, "text/xml")
                }
                // A parser cannot produce a document without a root.
                None => None,
            },
            ConstructionStrategy::NativePlain => host
                .create_empty_document()
                .and_then(|doc| add_root(doc, namespace, qualified_name)),
        };

        let Some(doc) = produced else {
            tracing::trace!(
                strategy = strategy.name(),
                host = host.name(),
                "strategy produced nothing"
            );
            continue;
        };

        match conform(doc, namespace, qualified_name, strategy) {
            Some(doc) => {
                tracing::debug!(
                    strategy = strategy.name(),
                    host = host.name(),
                    namespace,
                    qualified_name,
                    "document created"
                );
                return Ok(doc);
            }
            None => {
                tracing::trace!(strategy = strategy.name(), "document rejected");
            }
        }
    }

    Err(Error::UnsupportedConfiguration {
        namespace: namespace.map(str::to_string),
        qualified_name: qualified_name.map(str::to_string),
        attempted,
    })
}

/// Create an element named `local_name` in the document's default namespace
/// and make it the document element.
///
/// # Errors
///
/// Returns `Error::HierarchyRequest` if the document already has a
/// document element.
pub fn create_document_element(doc: &mut XmlDocument, local_name: &str) -> Result<NodeId> {
    let namespace = doc.default_namespace().map(str::to_string);
    let element = doc.create_element_ns(namespace.as_deref(), local_name);
    doc.append_child(doc.root(), element)?;
    Ok(element)
}

/// `<prefix:name xmlns:prefix="ns"/>`, or `<name xmlns="ns"/>` without a prefix.
fn root_markup(namespace: Option<&str>, qualified_name: &str) -> String {
    match (namespace, split_qname(qualified_name).0) {
        (Some(ns), Some(prefix)) => {
            format!("<{} xmlns:{}=\"{}\"/>", qualified_name, prefix, escape(ns))
        }
        (Some(ns), None) => format!("<{} xmlns=\"{}\"/>", qualified_name, escape(ns)),
        (None, _) => format!("<{}/>", qualified_name),
    }
}

fn add_root(
    mut doc: XmlDocument,
    namespace: Option<&str>,
    qualified_name: Option<&str>,
) -> Option<XmlDocument> {
    match qualified_name {
        Some(name) => {
            let root = doc.create_element_ns(namespace, name);
            doc.append_child(doc.root(), root).ok()?;
        }
        None => doc.set_default_namespace(namespace.map(str::to_string)),
    }
    Some(doc)
}

/// Check a produced document against the request, restoring a dropped or
/// rewritten prefix. `None` rejects the document.
fn conform(
    mut doc: XmlDocument,
    namespace: Option<&str>,
    qualified_name: Option<&str>,
    strategy: ConstructionStrategy,
) -> Option<XmlDocument> {
    doc.set_origin(DocumentOrigin::Constructed);
    if doc.parse_error().is_some_and(|info| info.error_code != 0) {
        return None;
    }

    let Some(name) = qualified_name else {
        if doc.document_element().is_some() {
            return None;
        }
        if doc.default_namespace().is_none() {
            doc.set_default_namespace(namespace.map(str::to_string));
        }
        return Some(doc);
    };

    let root = doc.document_element()?;
    let (prefix, local) = split_qname(name);
    if doc.local_name(root) != Some(local) {
        return None;
    }

    let name_kept = doc.tag_name(root) == Some(name);
    let namespace_kept = doc.namespace_uri(root) == namespace;
    if name_kept && namespace_kept {
        return Some(doc);
    }

    tracing::warn!(
        strategy = strategy.name(),
        expected = name,
        found = doc.tag_name(root).unwrap_or_default(),
        "host rewrote the root element name; restoring it"
    );
    doc.rename_element(root, namespace, name).ok()?;
    if let (Some(prefix), Some(ns)) = (prefix, namespace) {
        let declaration = format!("xmlns:{}", prefix);
        if doc.attribute(root, &declaration) != Some(ns) {
            doc.set_attribute(root, &declaration, ns).ok()?;
        }
    }
    Some(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_markup() {
        assert_eq!(
            root_markup(Some("urn:a&b"), "p:root"),
            r#"<p:root xmlns:p="urn:a&amp;b"/>"#
        );
        assert_eq!(root_markup(Some("urn:d"), "root"), r#"<root xmlns="urn:d"/>"#);
        assert_eq!(root_markup(None, "root"), "<root/>");
    }

    #[test]
    fn test_conform_restores_prefix() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element_ns(Some("urn:x"), "test");
        doc.append_child(doc.root(), root).unwrap();

        let doc = conform(
            doc,
            Some("urn:x"),
            Some("someprefix:test"),
            ConstructionStrategy::NativeNamespaced,
        )
        .unwrap();
        let root = doc.document_element().unwrap();
        assert_eq!(doc.tag_name(root), Some("someprefix:test"));
        assert_eq!(doc.attribute(root, "xmlns:someprefix"), Some("urn:x"));
    }

    #[test]
    fn test_conform_rejects_other_names() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("other");
        doc.append_child(doc.root(), root).unwrap();
        assert!(conform(doc, None, Some("test"), ConstructionStrategy::NativePlain).is_none());

        let empty = XmlDocument::new();
        assert!(conform(empty, None, Some("test"), ConstructionStrategy::NativePlain).is_none());
    }

    #[test]
    fn test_create_document_element_uses_default_namespace() {
        let mut doc = XmlDocument::new();
        doc.set_default_namespace(Some("urn:d".to_string()));
        let root = create_document_element(&mut doc, "root").unwrap();
        assert_eq!(doc.namespace_uri(root), Some("urn:d"));
        assert!(create_document_element(&mut doc, "second").is_err());
    }
}
