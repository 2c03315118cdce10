//! Structured diagnostic messages.
//!
//! Every failure the crate can describe, whether it is returned as an
//! [`Error`](crate::Error) or embedded in a host's parse-error document, can
//! be rendered as a [`DiagnosticMessage`]: a code from the
//! [catalog](crate::catalog), a short title, an optional problem statement,
//! bulleted details and hints.

use serde::{Deserialize, Serialize};

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Error,
    Warning,
    Info,
}

/// How a detail item is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailKind {
    /// Rendered with a `✖` bullet.
    Error,
    /// Rendered with an `ℹ` bullet.
    Info,
}

/// A position in markup text, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Compute the line and column of a byte offset in `source`.
    ///
    /// Offsets past the end are clamped to the end of the text.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = source
            .get(..offset)
            .unwrap_or_else(|| &source[..floor_char_boundary(source, offset)]);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |p| p + 1);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// A single bullet in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    pub kind: DetailKind,
    pub content: String,
}

/// A diagnostic message.
///
/// Structure:
/// 1. **Code**: optional catalog code (e.g. `"X-2-1"`)
/// 2. **Title**: brief message
/// 3. **Problem**: what went wrong
/// 4. **Details**: specific information, one fact per bullet
/// 5. **Hints**: optional guidance, phrased as a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub title: String,
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<DetailItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    /// Set the catalog code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Documentation URL of this message's code, if it has one.
    pub fn docs_url(&self) -> Option<&str> {
        self.code
            .as_ref()
            .and_then(|code| crate::catalog::get_docs_url(code))
    }

    /// Render as plain text.
    ///
    /// ```text
    /// Error [X-2-3]: Mismatched XML End Tag
    /// End tag </b> does not match start tag <a>
    /// ✖ Expected: </a>
    /// ℹ At line 1, column 4
    /// ? Check that all opening tags have matching closing tags?
    /// ```
    pub fn to_text(&self) -> String {
        let kind_str = match self.kind {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Info => "Info",
        };

        let mut lines = Vec::with_capacity(2 + self.details.len() + self.hints.len());
        match &self.code {
            Some(code) => lines.push(format!("{} [{}]: {}", kind_str, code, self.title)),
            None => lines.push(format!("{}: {}", kind_str, self.title)),
        }
        if let Some(problem) = &self.problem {
            lines.push(problem.clone());
        }
        for detail in &self.details {
            let bullet = match detail.kind {
                DetailKind::Error => "✖",
                DetailKind::Info => "ℹ",
            };
            lines.push(format!("{} {}", bullet, detail.content));
        }
        if let Some(location) = &self.location {
            lines.push(format!(
                "ℹ At line {}, column {}",
                location.line, location.column
            ));
        }
        for hint in &self.hints {
            lines.push(format!("? {}", hint));
        }
        lines.join("\n")
    }
}

/// Builder for [`DiagnosticMessage`].
///
/// ```
/// use xmlkit::diagnostic::DiagnosticMessageBuilder;
///
/// let msg = DiagnosticMessageBuilder::error("Mismatched XML End Tag")
///     .with_code("X-2-3")
///     .problem("End tag </b> does not match start tag <a>")
///     .add_detail("Expected: </a>")
///     .add_hint("Check that all opening tags have matching closing tags?")
///     .build();
/// assert!(msg.to_text().starts_with("Error [X-2-3]"));
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::error(title),
        }
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::warning(title),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    pub fn problem(mut self, problem: impl Into<String>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    pub fn add_detail(mut self, content: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Error,
            content: content.into(),
        });
        self
    }

    pub fn add_info(mut self, content: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Info,
            content: content.into(),
        });
        self
    }

    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.message.location = Some(location);
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }
}
