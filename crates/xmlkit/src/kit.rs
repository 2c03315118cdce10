//! The [`Xmlkit`] facade and the process-wide default kit.

use crate::config::XmlkitConfig;
use crate::dom::{NodeId, XmlDocument};
use crate::error::Result;
use crate::factory;
use crate::host::{QuickXmlHost, XmlHost};
use crate::parse_status::{self, ParseStatus};
use crate::strategy::StrategyTable;
use crate::text;
use crate::tree_ops;
use crate::xmlize;
use once_cell::sync::Lazy;
use serde::Serialize;

static DEFAULT_KIT: Lazy<Xmlkit> = Lazy::new(|| Xmlkit::new(QuickXmlHost::new()));

/// The kit used by the crate-level functions: a [`QuickXmlHost`] with the
/// default configuration, created on first use.
pub fn default_kit() -> &'static Xmlkit {
    &DEFAULT_KIT
}

/// A host bound to a resolved [`StrategyTable`].
///
/// ```
/// use xmlkit::{Xmlkit, host::QuickXmlHost};
///
/// let kit = Xmlkit::new(QuickXmlHost::new());
/// let doc = kit.create_document(Some("urn:example"), Some("ex:test")).unwrap();
/// let root = doc.document_element().unwrap();
/// assert_eq!(doc.tag_name(root), Some("ex:test"));
/// assert!(kit.get_parse_status(Some(&doc)).is_ok());
/// ```
pub struct Xmlkit {
    host: Box<dyn XmlHost>,
    table: StrategyTable,
    config: XmlkitConfig,
}

impl std::fmt::Debug for Xmlkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Xmlkit")
            .field("host", &self.host.name())
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl Xmlkit {
    pub fn new(host: impl XmlHost + 'static) -> Self {
        Self::with_config(host, XmlkitConfig::default())
    }

    pub fn with_config(host: impl XmlHost + 'static, config: XmlkitConfig) -> Self {
        let table = StrategyTable::resolve(host.capabilities(), &config);
        if table.construction().is_empty() {
            tracing::warn!(
                host = host.name(),
                "host offers no usable construction strategy; create_document will fail"
            );
        }
        Self {
            host: Box::new(host),
            table,
            config,
        }
    }

    /// A kit on the bundled quick-xml host, set up from `config`.
    pub fn from_config(config: XmlkitConfig) -> Self {
        let host = QuickXmlHost::with_error_reporting(config.parser.error_reporting);
        Self::with_config(host, config)
    }

    pub fn host(&self) -> &dyn XmlHost {
        self.host.as_ref()
    }

    pub fn table(&self) -> &StrategyTable {
        &self.table
    }

    pub fn config(&self) -> &XmlkitConfig {
        &self.config
    }

    /// See [`factory::create_document`].
    pub fn create_document(
        &self,
        namespace: Option<&str>,
        qualified_name: Option<&str>,
    ) -> Result<XmlDocument> {
        factory::create_document(self.host.as_ref(), &self.table, namespace, qualified_name)
    }

    /// Parse markup with the host. `None` if the host has no parser or
    /// refuses the content type.
    pub fn parse_from_string(&self, text: &str, mime_type: &str) -> Option<XmlDocument> {
        if !self.host.capabilities().markup_parser {
            tracing::debug!(host = self.host.name(), "host has no markup parser");
            return None;
        }
        self.host.parse_from_string(text, mime_type)
    }

    /// Serialize a node with the host, falling back to the built-in
    /// serializer when the host has none.
    pub fn serialize_to_string(&self, doc: &XmlDocument, node: NodeId) -> Option<String> {
        if self.host.capabilities().serializer {
            self.host.serialize_to_string(doc, node)
        } else {
            doc.contains(node)
                .then(|| crate::dom::serialize_node(doc, node))
        }
    }

    /// See [`parse_status::get_parse_status`]; uses the kit's convention order.
    pub fn get_parse_status(&self, doc: Option<&XmlDocument>) -> ParseStatus {
        parse_status::get_parse_status(doc, self.table.diagnostics())
    }

    /// Just the diagnostic text: [`parse_status::PARSED_OK`] when there is no error.
    pub fn get_parse_error_text(&self, doc: Option<&XmlDocument>) -> String {
        self.get_parse_status(doc).text
    }

    pub fn copy_child_nodes(
        &self,
        from_doc: &XmlDocument,
        from: NodeId,
        to_doc: &mut XmlDocument,
        to: NodeId,
    ) -> Result<()> {
        tree_ops::copy_child_nodes(from_doc, from, to_doc, to)
    }

    pub fn move_child_nodes(
        &self,
        from_doc: &mut XmlDocument,
        from: NodeId,
        to_doc: &mut XmlDocument,
        to: NodeId,
    ) -> Result<()> {
        tree_ops::move_child_nodes(from_doc, from, to_doc, to)
    }

    pub fn clear_child_nodes(&self, doc: &mut XmlDocument, node: NodeId) -> Result<()> {
        tree_ops::clear_child_nodes(doc, node)
    }

    pub fn get_text(&self, doc: &XmlDocument, node: NodeId, normalize_whitespace: bool) -> String {
        text::get_text(doc, node, normalize_whitespace)
    }

    pub fn strip_tags(&self, markup: &str) -> String {
        text::strip_tags(markup)
    }

    /// [`xmlize::xmlize_with`] using the kit's configured layout.
    pub fn xmlize<T: Serialize + ?Sized>(&self, value: &T, tag_name: &str) -> Result<String> {
        xmlize::xmlize_with(value, tag_name, &self.config.xmlize.options())
    }
}
