//! Caret-and-gutter rendering of diagnostics.
//!
//! Produces compiler-style reports: a severity head line, a `-->` source
//! location, the offending line in a numbered gutter, a caret underline,
//! and `help:` lines for any attached notes. Color is a presentation flag
//! only — with color disabled the output is byte-identical minus the ANSI
//! escapes.

use std::io::{self, Write};

use crate::{Diagnostic, LineIndex, Severity};

// ── Colors ──────────────────────────────────────────────────────────────

/// ANSI escape palette for diagnostic rendering.
///
/// Uses only standard 16-color codes. `OFF` substitutes empty strings so
/// the same format strings serve both modes.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    /// Bold modifier, applied to severity heads.
    pub bold: &'static str,
    /// Error severity color.
    pub red: &'static str,
    /// Warning severity color.
    pub yellow: &'static str,
    /// Gutter and arrow color.
    pub blue: &'static str,
    /// `help:` tag color.
    pub cyan: &'static str,
    /// Return to default.
    pub reset: &'static str,
}

impl Colors {
    /// Colors enabled (ANSI escape codes).
    pub const ON: Self = Self {
        bold: "\x1b[1m",
        red: "\x1b[31m",
        yellow: "\x1b[33m",
        blue: "\x1b[34m",
        cyan: "\x1b[36m",
        reset: "\x1b[0m",
    };

    /// Colors disabled (empty strings).
    pub const OFF: Self = Self {
        bold: "",
        red: "",
        yellow: "",
        blue: "",
        cyan: "",
        reset: "",
    };

    /// Create colors based on enabled flag.
    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }
}

// ── Rendering ───────────────────────────────────────────────────────────

/// Render all diagnostics against their source, one report per diagnostic.
///
/// `source` must be the exact buffer the diagnostics were produced from;
/// spans are clamped against it, so a mismatched buffer degrades the output
/// rather than panicking. The line index is built here, once per call.
pub fn render_diagnostics<W: Write>(
    w: &mut W,
    source: &str,
    filename: &str,
    diagnostics: &[Diagnostic],
    use_color: bool,
) -> io::Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    let colors = Colors::new(use_color);
    let index = LineIndex::new(source);
    for diag in diagnostics {
        render_one(w, source, filename, &index, diag, colors)?;
    }
    Ok(())
}

/// Render diagnostics into a `String` (convenience for tests and tools).
pub fn render_to_string(
    source: &str,
    filename: &str,
    diagnostics: &[Diagnostic],
    use_color: bool,
) -> String {
    let mut buf = Vec::new();
    render_diagnostics(&mut buf, source, filename, diagnostics, use_color)
        .expect("Vec<u8> write never fails");
    String::from_utf8(buf).expect("renderer emits UTF-8")
}

fn severity_color(severity: Severity, c: Colors) -> &'static str {
    match severity {
        Severity::Error => c.red,
        Severity::Warning => c.yellow,
        Severity::Note => "",
    }
}

fn render_one<W: Write>(
    w: &mut W,
    source: &str,
    filename: &str,
    index: &LineIndex,
    diag: &Diagnostic,
    c: Colors,
) -> io::Result<()> {
    writeln!(
        w,
        "{}{}{}:{} {}",
        c.bold,
        severity_color(diag.severity, c),
        diag.severity,
        c.reset,
        diag.message
    )?;

    if let Some(span) = diag.span {
        let anchor = span.start.min(source.len());
        let (line, col) = index.resolve(anchor);
        let (text, line_num) = index.line_text(anchor, source);
        let width = line_num.to_string().len();
        let pad = " ".repeat(width + 2);

        writeln!(
            w,
            "{}{}-->{} {}:{}:{}",
            " ".repeat(width + 1),
            c.blue,
            c.reset,
            filename,
            line,
            col
        )?;
        writeln!(w, "{}{}|{}", pad, c.blue, c.reset)?;
        writeln!(w, "{} {} |{} {}", c.blue, line_num, c.reset, text)?;

        // Underline covers the span up to the end of the line, at least one caret.
        let line_start = anchor - (col - 1);
        let line_end = line_start + text.len();
        let carets = span.end.min(line_end).saturating_sub(anchor).max(1);
        writeln!(
            w,
            "{}{}|{} {}{}",
            pad,
            c.blue,
            c.reset,
            " ".repeat(col - 1),
            "^".repeat(carets)
        )?;

        for note in &diag.notes {
            writeln!(
                w,
                "{}{}={} {}help:{} {}",
                pad, c.blue, c.reset, c.cyan, c.reset, note.message
            )?;
        }
    } else {
        for note in &diag.notes {
            writeln!(w, "  {}={} {}help:{} {}", c.blue, c.reset, c.cyan, c.reset, note.message)?;
        }
    }

    writeln!(w)
}
