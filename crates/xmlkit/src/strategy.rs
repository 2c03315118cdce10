//! Construction strategies and diagnostic conventions.
//!
//! Hosts disagree on how documents are built and on how a failed parse shows
//! up in the result. Instead of probing the host on every call, a kit
//! resolves a [`StrategyTable`] once from the host's declared capabilities
//! and the configured preference order.

use crate::config::XmlkitConfig;
use crate::host::HostCapabilities;
use serde::{Deserialize, Serialize};

/// A way of building a document on some host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstructionStrategy {
    /// The host's namespace-aware document constructor.
    NativeNamespaced,
    /// Serialize equivalent markup and hand it to the host parser.
    MarkupFallback,
    /// The host's plain constructor; the root element is added afterwards.
    NativePlain,
}

impl ConstructionStrategy {
    /// Default preference order.
    pub const DEFAULT_ORDER: [ConstructionStrategy; 3] = [
        ConstructionStrategy::NativeNamespaced,
        ConstructionStrategy::MarkupFallback,
        ConstructionStrategy::NativePlain,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConstructionStrategy::NativeNamespaced => "native-namespaced",
            ConstructionStrategy::MarkupFallback => "markup-fallback",
            ConstructionStrategy::NativePlain => "native-plain",
        }
    }

    /// Whether a host with `caps` can run this strategy at all.
    pub fn is_available(self, caps: HostCapabilities) -> bool {
        match self {
            ConstructionStrategy::NativeNamespaced => caps.namespaced_constructor,
            ConstructionStrategy::MarkupFallback => caps.markup_parser,
            ConstructionStrategy::NativePlain => caps.plain_constructor,
        }
    }
}

/// A place where a host may have recorded a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticConvention {
    /// No document at all, or a parsed document without a root element.
    AbsentDocument,
    /// The document element itself is a `parsererror` element.
    ErrorDocument,
    /// A `parsererror` element somewhere below the root.
    NestedErrorElement,
    /// A non-zero code in the document's parse-error property bag.
    ParseErrorProperty,
}

impl DiagnosticConvention {
    /// Default priority order.
    pub const DEFAULT_ORDER: [DiagnosticConvention; 4] = [
        DiagnosticConvention::AbsentDocument,
        DiagnosticConvention::ErrorDocument,
        DiagnosticConvention::NestedErrorElement,
        DiagnosticConvention::ParseErrorProperty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DiagnosticConvention::AbsentDocument => "absent-document",
            DiagnosticConvention::ErrorDocument => "error-document",
            DiagnosticConvention::NestedErrorElement => "nested-error-element",
            DiagnosticConvention::ParseErrorProperty => "parse-error-property",
        }
    }
}

/// The strategies a kit will use, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyTable {
    construction: Vec<ConstructionStrategy>,
    diagnostics: Vec<DiagnosticConvention>,
}

impl StrategyTable {
    /// Keep the configured strategies the host can run, dropping repeats.
    ///
    /// ```
    /// use xmlkit::config::XmlkitConfig;
    /// use xmlkit::host::HostCapabilities;
    /// use xmlkit::strategy::{ConstructionStrategy, StrategyTable};
    ///
    /// let caps = HostCapabilities { markup_parser: true, ..Default::default() };
    /// let table = StrategyTable::resolve(caps, &XmlkitConfig::default());
    /// assert_eq!(table.construction(), &[ConstructionStrategy::MarkupFallback]);
    /// ```
    pub fn resolve(caps: HostCapabilities, config: &XmlkitConfig) -> Self {
        let mut construction = Vec::new();
        for &strategy in &config.construction.order {
            if construction.contains(&strategy) {
                continue;
            }
            if strategy.is_available(caps) {
                construction.push(strategy);
            } else {
                tracing::trace!(strategy = strategy.name(), "construction strategy unavailable");
            }
        }

        let mut diagnostics = Vec::new();
        for &convention in &config.diagnostics.order {
            if !diagnostics.contains(&convention) {
                diagnostics.push(convention);
            }
        }

        tracing::debug!(
            construction = ?construction.iter().map(|s| s.name()).collect::<Vec<_>>(),
            diagnostics = ?diagnostics.iter().map(|c| c.name()).collect::<Vec<_>>(),
            "resolved strategy table"
        );

        Self {
            construction,
            diagnostics,
        }
    }

    pub fn construction(&self) -> &[ConstructionStrategy] {
        &self.construction
    }

    pub fn diagnostics(&self) -> &[DiagnosticConvention] {
        &self.diagnostics
    }
}
