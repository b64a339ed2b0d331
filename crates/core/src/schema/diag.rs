pub use cboragen_diagnostics::{
    Diagnostic, Diagnostics, LineIndex, Note, Severity, Span, codes, explain,
    render::{Colors, render_to_string},
    render_diagnostics,
};
