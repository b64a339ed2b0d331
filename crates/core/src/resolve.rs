//! Import resolution.
//!
//! A schema imports other schema files with `ns = @import("path")`. This
//! driver walks the transitive import closure in two phases:
//!
//! 1. [`load_modules`] reads every imported file into owned
//!    [`ResolvedModule`] buffers, following imports recursively. Paths
//!    resolve against the importing file's directory; a namespace that was
//!    already loaded is never read or parsed again; an unreadable file is a
//!    warning, not an abort.
//! 2. [`parse_modules`] parses each loaded buffer into a [`Module`] whose
//!    AST borrows from it.
//!
//! The split keeps the zero-copy discipline honest: the AST always borrows
//! from a buffer the caller owns, so there is no self-referential struct
//! and no hidden copy. Phase 1 parses each file once just to walk its
//! imports (into a scratch sink); phase 2's parse is the one whose
//! diagnostics the caller sees.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::ast::Schema;
use crate::schema::parser::{ParseOutput, parse};
use cboragen_diagnostics::{Diagnostic, Diagnostics, codes};

/// An imported schema file loaded into memory, ready to be parsed.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    /// The namespace the file was imported under.
    pub namespace: String,
    /// The resolved filesystem path it was read from.
    pub path: PathBuf,
    /// The file contents. Parsed schemas borrow from this buffer.
    pub text: String,
}

/// A parsed imported module.
#[derive(Debug)]
pub struct Module<'a> {
    /// The namespace the module is referenced through (`ns.Type`).
    pub namespace: &'a str,
    /// The path the module was read from (for diagnostics rendering).
    pub path: &'a Path,
    /// The parsed schema, borrowing from the loaded buffer.
    pub schema: Schema<'a>,
    /// Diagnostics from parsing this module's buffer.
    pub diagnostics: Diagnostics,
}

/// Load the transitive import closure of an already-parsed root schema.
///
/// `base_dir` is the directory of the root schema file; every import path
/// in the root resolves against it, and every transitive import resolves
/// against its importing file's directory. Namespaces are first-come:
/// a namespace already loaded is skipped (idempotence).
///
/// I/O failures produce `CBG3101` warnings in `diags` and resolution
/// continues; the returned list contains every file that could be read.
pub fn load_modules(
    root: &Schema<'_>,
    base_dir: &Path,
    diags: &mut Diagnostics,
) -> Vec<ResolvedModule> {
    let mut loaded = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    // (namespace, path to read, import span in the *root* source if any)
    let mut queue: Vec<(String, PathBuf, Option<cboragen_diagnostics::Span>)> = root
        .imports
        .iter()
        .map(|imp| {
            (
                imp.namespace.to_string(),
                base_dir.join(imp.path),
                Some(imp.span),
            )
        })
        .collect();

    // Breadth-first in source order, so "first import wins" is predictable.
    let mut next = 0;
    while next < queue.len() {
        let (namespace, path, span) = queue[next].clone();
        next += 1;
        if !seen.insert(namespace.clone()) {
            continue;
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                // Spans from transitive files would point into the wrong
                // buffer; only root-level imports carry one.
                diags.push(Diagnostic::warning(
                    codes::DRIVER_MISSING_IMPORT,
                    format!("cannot read imported schema '{}': {err}", path.display()),
                    span,
                ));
                continue;
            }
        };

        // Walk this file's imports before handing the buffer over. The
        // scratch parse exists only to read the import list; the caller
        // gets this file's real diagnostics from `parse_modules`.
        let parsed = parse(&text);
        let next_base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        for imp in &parsed.schema.imports {
            queue.push((imp.namespace.to_string(), next_base.join(imp.path), None));
        }
        drop(parsed);

        loaded.push(ResolvedModule {
            namespace,
            path,
            text,
        });
    }

    loaded
}

/// Parse every loaded module buffer. The returned modules borrow from
/// `files`, which must outlive them.
pub fn parse_modules(files: &[ResolvedModule]) -> Vec<Module<'_>> {
    files
        .iter()
        .map(|file| {
            let ParseOutput {
                schema,
                diagnostics,
            } = parse(&file.text);
            Module {
                namespace: &file.namespace,
                path: &file.path,
                schema,
                diagnostics,
            }
        })
        .collect()
}
