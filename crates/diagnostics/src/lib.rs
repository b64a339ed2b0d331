//! Diagnostics for the cboragen schema compiler.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Span`], [`LineIndex`], and the
//! [`Diagnostics`] accumulator used to report errors, warnings, and notes
//! from the lexer, parser, and import driver. Diagnostic codes are defined
//! in the [`codes`] module; caret rendering lives in [`render`].

#![warn(missing_docs)]

/// Diagnostic ID constants auto-generated from `spec/diagnostics.json`.
pub mod codes;
/// Caret-and-gutter rendering of diagnostics against source text.
pub mod render;

pub use render::render_diagnostics;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// ── Span ─────────────────────────────────────────────────────────────────

/// Half-open byte range `[start, end)` in a source buffer.
///
/// All strings the AST exposes are slices of the caller-owned source; a
/// `Span` is the durable, copyable way to point back into it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers zero bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Extract the spanned text from `source`, clamping both ends to the
    /// source length (and down to char boundaries, so a span produced
    /// against a different buffer can never panic).
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        let start = floor_char_boundary(source, self.start.min(source.len()));
        let end = floor_char_boundary(source, self.end.min(source.len())).max(start);
        &source[start..end]
    }
}

/// Largest index `<= pos` that is a valid UTF-8 char boundary.
fn floor_char_boundary(s: &str, pos: usize) -> usize {
    let mut p = pos.min(s.len());
    while p > 0 && !s.is_char_boundary(p) {
        p -= 1;
    }
    p
}

// ── LineIndex ────────────────────────────────────────────────────────────

/// Maps byte offsets in a source string to 1-based line and column pairs.
///
/// The index stores the byte offset of the start of every line
/// (`line_starts[0]` is always 0, the start of line 1). It is built in O(n)
/// and each lookup is O(log n) via binary search. Construction is deferred
/// to rendering time; parsing never pays for it.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build a `LineIndex` from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0usize];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 1-based `(line, column)` pair.
    ///
    /// Offsets past the end of the source clamp to the last line; the
    /// column keeps counting from that line's start.
    pub fn resolve(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let col = offset - self.line_starts[line];
        (line + 1, col + 1)
    }

    /// The text of the line containing `offset` (trailing `\r`/`\n`
    /// stripped) together with its 1-based line number.
    pub fn line_text<'s>(&self, offset: usize, source: &'s str) -> (&'s str, usize) {
        let (line, _) = self.resolve(offset);
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(source.len());
        let mut text = &source[start..end];
        if let Some(t) = text.strip_suffix('\n') {
            text = t;
        }
        if let Some(t) = text.strip_suffix('\r') {
            text = t;
        }
        (text, line)
    }

    /// Byte offset of the start of the given 1-based line.
    ///
    /// Returns `None` if `line` is out of bounds (or zero).
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|l| self.line_starts.get(l).copied())
    }

    /// Total number of lines (at least 1, even for empty input).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

// ── Severity / Diagnostic ────────────────────────────────────────────────

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Hard error — the input is invalid.
    Error,
    /// Warning — the input may produce unexpected results.
    Warning,
    /// Informational note.
    Note,
}

/// A secondary message attached to a [`Diagnostic`], optionally pointing at
/// its own span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Optional byte span the note refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// The note text.
    pub message: String,
}

/// A diagnostic message produced by the lexer, parser, or import driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"CBG2101"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Optional byte span in the source input that this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Secondary notes, rendered as `help:` lines.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<Note>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warning` diagnostic.
    pub fn warning(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warning, message, span)
    }

    /// Shorthand for a `Note` diagnostic.
    pub fn note(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Note, message, span)
    }

    /// Attach a secondary note (builder pattern).
    pub fn with_note(mut self, span: Option<Span>, message: impl Into<String>) -> Self {
        self.notes.push(Note {
            span,
            message: message.into(),
        });
        self
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
///
/// Auto-generated from `spec/diagnostics.json` at build time.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

// ── Accumulator ──────────────────────────────────────────────────────────

/// Ordered, append-only collection of diagnostics.
///
/// The parser seeds one of these per parse; the driver appends to it per
/// resolved file. Diagnostics own their message strings, so the accumulator
/// may outlive the AST (and the source buffer) it was produced against.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn push(&mut self, diag: Diagnostic) {
        self.items.push(diag);
    }

    /// Append a diagnostic of the given severity with a span.
    pub fn emit(
        &mut self,
        severity: Severity,
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Span,
    ) {
        self.push(Diagnostic::new(id, severity, message, Some(span)));
    }

    /// Append an error with a span.
    pub fn error(&mut self, id: impl Into<Cow<'static, str>>, message: impl Into<String>, span: Span) {
        self.push(Diagnostic::error(id, message, Some(span)));
    }

    /// Append a warning with a span.
    pub fn warning(
        &mut self,
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Span,
    ) {
        self.push(Diagnostic::warning(id, message, Some(span)));
    }

    /// Append an error carrying one secondary note.
    pub fn error_with_note(
        &mut self,
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Span,
        note_span: Option<Span>,
        note: impl Into<String>,
    ) {
        self.push(Diagnostic::error(id, message, Some(span)).with_note(note_span, note));
    }

    /// Whether any `Error`-severity diagnostic has been recorded.
    pub fn has_errors(&self) -> bool {
        self.items
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Number of `Error`-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Total number of diagnostics of any severity.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no diagnostics have been recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The diagnostics in emission order.
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Iterate over the diagnostics in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Move all diagnostics out of `other`, appending them here.
    pub fn append(&mut self, other: &mut Diagnostics) {
        self.items.append(&mut other.items);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
