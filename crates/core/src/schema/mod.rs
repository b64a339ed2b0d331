/// Schema abstract syntax tree types.
pub mod ast;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// Serialization and summary helpers for the AST.
pub mod dump;
/// Schema lexer — classifies source bytes into a closed token alphabet.
pub mod lexer;
/// Schema parser — converts tokens into an AST.
pub mod parser;
