//! Error types for xmlkit.
//!
//! Parse failures are not errors here: a document that failed to parse
//! is still a document, and [`get_parse_status`](crate::get_parse_status)
//! reports the failure as data.

use crate::diagnostic::{DiagnosticMessage, DiagnosticMessageBuilder};
use crate::dom::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No construction strategy of the host produced the requested document.
    #[error(
        "Unsupported configuration: no construction strategy can build a document \
         (namespace {namespace:?}, root {qualified_name:?})"
    )]
    UnsupportedConfiguration {
        namespace: Option<String>,
        qualified_name: Option<String>,
        /// Names of the strategies that were tried, in order.
        attempted: Vec<&'static str>,
    },

    /// A node id that does not address a node of the document it was used with.
    #[error("Invalid node: {0:?} does not belong to this document")]
    InvalidNode(NodeId),

    /// A tree mutation that would produce an illegal tree.
    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    /// `xmlize` was handed a value serde could not convert.
    #[error("Value cannot be xmlized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn hierarchy(msg: impl Into<String>) -> Self {
        Self::HierarchyRequest(msg.into())
    }

    /// Convert this error to a [`DiagnosticMessage`] with its catalog code.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            Error::UnsupportedConfiguration {
                namespace,
                qualified_name,
                attempted,
            } => {
                let mut builder = DiagnosticMessageBuilder::error("Unsupported Document Configuration")
                    .with_code("X-1-1")
                    .problem("No construction strategy of the host can build the requested document")
                    .add_info(format!(
                        "Namespace: {}",
                        namespace.as_deref().unwrap_or("(none)")
                    ))
                    .add_info(format!(
                        "Root element: {}",
                        qualified_name.as_deref().unwrap_or("(none)")
                    ));
                if attempted.is_empty() {
                    builder = builder
                        .add_detail("The host offers no document constructor and no parser")
                        .add_hint("Use a host that can at least parse markup?");
                } else {
                    builder = builder.add_detail(format!("Tried: {}", attempted.join(", ")));
                }
                builder.build()
            }

            Error::InvalidNode(id) => DiagnosticMessageBuilder::error("Invalid Node")
                .with_code("X-3-1")
                .problem(format!("Node {:?} does not belong to this document", id))
                .add_hint("Was the node id taken from a different document?")
                .build(),

            Error::HierarchyRequest(message) => {
                DiagnosticMessageBuilder::error("Hierarchy Request Error")
                    .with_code("X-3-2")
                    .problem(message.clone())
                    .build()
            }

            Error::Serialization(err) => DiagnosticMessageBuilder::error("Value Not Serializable")
                .with_code("X-4-1")
                .problem(err.to_string())
                .build(),

            Error::Config(err) => DiagnosticMessageBuilder::error("Invalid Configuration")
                .with_code("X-5-1")
                .problem(err.to_string())
                .build(),

            Error::Io(err) => DiagnosticMessageBuilder::error("I/O Error")
                .with_code("X-5-2")
                .problem(err.to_string())
                .build(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
