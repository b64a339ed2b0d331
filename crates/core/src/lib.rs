//! cboragen core library.
//!
//! Provides lexing and parsing of cboragen schema files into a zero-copy
//! AST, plus the import-resolution driver. The main entry points are
//! [`parse`] for a single source buffer and [`load_modules`] /
//! [`parse_modules`] for multi-file resolution.
//!
//! The AST borrows from the caller-owned source buffer; the buffer must
//! outlive every schema parsed from it.

#![warn(missing_docs)]

/// Schema grammar: lexer, parser, AST, and serialization helpers.
pub mod schema;
/// Import resolution: loads and parses the transitive import closure.
pub mod resolve;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parser
pub use schema::parser::{ParseOutput, parse};

// AST
pub use schema::ast::{
    ArrayLen, Definition, EnumVariant, Field, FloatKind, Import, IntKind, Schema, TypeExpr,
    UnionVariant,
};

// Lexer
pub use schema::lexer::{Lexer, TokKind, Token};

// Diagnostics (re-exported from the diagnostics crate)
pub use schema::diag::{Diagnostic, Diagnostics, Severity, Span, codes, render_diagnostics};

// Import driver
pub use resolve::{Module, ResolvedModule, load_modules, parse_modules};

// Serialization helpers
pub use schema::dump::{summarize, to_pretty_json};
