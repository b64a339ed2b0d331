//! Serialization and summary helpers for the AST.

use std::fmt::Write;

use super::ast::{ArrayLen, Schema, TypeExpr};

/// Serialize a schema to a pretty-printed JSON string.
pub fn to_pretty_json(schema: &Schema<'_>) -> String {
    serde_json::to_string_pretty(schema).expect("Schema serialization cannot fail")
}

/// Render a one-screen human summary of a schema: imports, then each
/// definition with a brief shape of its type.
pub fn summarize(schema: &Schema<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "schema: {} import{}, {} definition{}",
        schema.imports.len(),
        plural(schema.imports.len()),
        schema.definitions.len(),
        plural(schema.definitions.len()),
    );
    if !schema.imports.is_empty() {
        out.push('\n');
        for import in &schema.imports {
            let _ = writeln!(out, "import {} = \"{}\"", import.namespace, import.path);
        }
    }
    if !schema.definitions.is_empty() {
        out.push('\n');
        for def in &schema.definitions {
            let _ = writeln!(out, "{} = {}", def.name, type_brief(&def.ty));
        }
    }
    out
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// One-line shape of a type expression. Compound bodies show their entry
/// counts instead of their entries.
fn type_brief(ty: &TypeExpr<'_>) -> String {
    match ty {
        TypeExpr::Bool { .. } => "bool".into(),
        TypeExpr::String { .. } => "string".into(),
        TypeExpr::Bytes { .. } => "[]u8".into(),
        TypeExpr::Int { int, .. } => int.to_string(),
        TypeExpr::Float { float, .. } => float.to_string(),
        TypeExpr::Option { inner, .. } => format!("?{}", type_brief(inner)),
        TypeExpr::Array { len, elem, .. } => match len {
            ArrayLen::Variable => format!("[]{}", type_brief(elem)),
            ArrayLen::Fixed { count } => format!("[{count}]{}", type_brief(elem)),
            ArrayLen::External { field } => format!("[.{field}]{}", type_brief(elem)),
        },
        TypeExpr::Struct { fields, .. } => {
            format!("struct ({} field{})", fields.len(), plural(fields.len()))
        }
        TypeExpr::Enum { variants, .. } => {
            format!("enum ({} variant{})", variants.len(), plural(variants.len()))
        }
        TypeExpr::Union { variants, .. } => {
            format!("union ({} variant{})", variants.len(), plural(variants.len()))
        }
        TypeExpr::Named { name, .. } => (*name).to_string(),
        TypeExpr::Qualified {
            namespace, name, ..
        } => format!("{namespace}.{name}"),
    }
}
