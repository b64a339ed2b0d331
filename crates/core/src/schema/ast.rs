//! Schema abstract syntax tree.
//!
//! Every string in the AST is a slice of the source buffer it was parsed
//! from (`&'a str`); the buffer must outlive the AST. The one exception is
//! a multi-line doc comment, whose joined text is owned (`Cow::Owned`).
//! Nothing here is mutated after parsing returns.

use std::borrow::Cow;

use cboragen_diagnostics::Span;
use serde::Serialize;

/// A parsed schema file: its imports followed by its type definitions.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Schema<'a> {
    /// Imports in source order.
    pub imports: Vec<Import<'a>>,
    /// Top-level type definitions in source order.
    pub definitions: Vec<Definition<'a>>,
}

/// A namespace import: `geo = @import("geo.cbg")`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Import<'a> {
    /// The local namespace the imported schema is referenced through.
    pub namespace: &'a str,
    /// The import path, byte-literal as written between the quotes.
    pub path: &'a str,
    /// Source span of the whole import form.
    pub span: Span,
}

/// A top-level type definition: `Name = <type>`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Definition<'a> {
    /// Doc comment attached to this definition, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Cow<'a, str>>,
    /// The defined type name (always capitalized).
    pub name: &'a str,
    /// The right-hand side type expression.
    pub ty: TypeExpr<'a>,
    /// Source span of the whole definition.
    pub span: Span,
    /// Source span of just the name.
    pub name_span: Span,
}

/// Fixed- and variable-width integer kinds.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IntKind {
    /// Unsigned, 1 argument byte on the wire.
    U8,
    /// Unsigned, 2 argument bytes.
    U16,
    /// Unsigned, 4 argument bytes.
    U32,
    /// Unsigned, 8 argument bytes.
    U64,
    /// Signed, 1 argument byte.
    I8,
    /// Signed, 2 argument bytes.
    I16,
    /// Signed, 4 argument bytes.
    I32,
    /// Signed, 8 argument bytes.
    I64,
    /// Unsigned, minimally encoded.
    Uvarint,
    /// Signed, minimally encoded.
    Ivarint,
}

/// Floating-point kinds.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FloatKind {
    /// IEEE 754 half precision.
    F16,
    /// IEEE 754 single precision.
    F32,
    /// IEEE 754 double precision.
    F64,
}

/// How an array's length is determined.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "len", rename_all = "snake_case")]
pub enum ArrayLen<'a> {
    /// `[]T` — length carried in the wire header.
    Variable,
    /// `[N]T` — length fixed by the schema.
    Fixed {
        /// The declared element count.
        count: u64,
    },
    /// `[.field]T` — length taken from a sibling struct field.
    External {
        /// Name of the sibling field holding the count.
        field: &'a str,
    },
}

/// A type expression. Closed sum: every consumer matches exhaustively, so a
/// new form is a compile error at each use site.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr<'a> {
    /// `bool`.
    Bool {
        /// Source span.
        span: Span,
    },
    /// `string` (UTF-8 text).
    String {
        /// Source span.
        span: Span,
    },
    /// Raw bytes. Produced only by `[]u8`.
    Bytes {
        /// Source span.
        span: Span,
    },
    /// An integer scalar.
    Int {
        /// Width and signedness.
        int: IntKind,
        /// Source span.
        span: Span,
    },
    /// A floating-point scalar.
    Float {
        /// Precision.
        float: FloatKind,
        /// Source span.
        span: Span,
    },
    /// `?T` — an optional value.
    Option {
        /// The wrapped type.
        inner: Box<TypeExpr<'a>>,
        /// Source span.
        span: Span,
    },
    /// `[]T`, `[N]T`, or `[.field]T`.
    Array {
        /// Length discipline.
        len: ArrayLen<'a>,
        /// Element type.
        elem: Box<TypeExpr<'a>>,
        /// Source span.
        span: Span,
    },
    /// `struct { ... }` with ranked fields.
    Struct {
        /// Fields in source order.
        fields: Vec<Field<'a>>,
        /// Source span.
        span: Span,
    },
    /// `enum { ... }` with tagged unit variants.
    Enum {
        /// Variants in source order.
        variants: Vec<EnumVariant<'a>>,
        /// Source span.
        span: Span,
    },
    /// `union { ... }` with tagged, optionally payload-carrying variants.
    Union {
        /// Variants in source order.
        variants: Vec<UnionVariant<'a>>,
        /// Source span.
        span: Span,
    },
    /// A reference to a type defined in the same file.
    Named {
        /// The referenced definition name.
        name: &'a str,
        /// Source span.
        span: Span,
    },
    /// A reference through an imported namespace: `ns.Name`.
    Qualified {
        /// The import namespace.
        namespace: &'a str,
        /// The referenced definition name.
        name: &'a str,
        /// Source span.
        span: Span,
    },
}

impl TypeExpr<'_> {
    /// Source span of this type expression.
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Bool { span }
            | TypeExpr::String { span }
            | TypeExpr::Bytes { span }
            | TypeExpr::Int { span, .. }
            | TypeExpr::Float { span, .. }
            | TypeExpr::Option { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Struct { span, .. }
            | TypeExpr::Enum { span, .. }
            | TypeExpr::Union { span, .. }
            | TypeExpr::Named { span, .. }
            | TypeExpr::Qualified { span, .. } => *span,
        }
    }
}

/// A struct field: `rank name: type`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Field<'a> {
    /// Doc comment attached to this field, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Cow<'a, str>>,
    /// The field's stable wire rank (its index in the encoded array).
    pub rank: u64,
    /// The field name.
    pub name: &'a str,
    /// The field's declared type.
    pub ty: TypeExpr<'a>,
    /// Source span of the whole field.
    pub span: Span,
    /// Source span of just the name.
    pub name_span: Span,
}

/// An enum variant: `tag name`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnumVariant<'a> {
    /// Doc comment attached to this variant, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Cow<'a, str>>,
    /// The variant's stable wire tag.
    pub tag: u64,
    /// The variant name.
    pub name: &'a str,
    /// Source span of the variant.
    pub span: Span,
}

/// A union variant: `tag name` or `tag name: type`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnionVariant<'a> {
    /// Doc comment attached to this variant, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Cow<'a, str>>,
    /// The variant's stable wire tag (also the CBOR tag number when a
    /// payload is present).
    pub tag: u64,
    /// The variant name.
    pub name: &'a str,
    /// The payload type, if the variant carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<TypeExpr<'a>>,
    /// Source span of the variant.
    pub span: Span,
}

impl std::fmt::Display for IntKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            IntKind::U8 => "u8",
            IntKind::U16 => "u16",
            IntKind::U32 => "u32",
            IntKind::U64 => "u64",
            IntKind::I8 => "i8",
            IntKind::I16 => "i16",
            IntKind::I32 => "i32",
            IntKind::I64 => "i64",
            IntKind::Uvarint => "uvarint",
            IntKind::Ivarint => "ivarint",
        })
    }
}

impl std::fmt::Display for FloatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FloatKind::F16 => "f16",
            FloatKind::F32 => "f32",
            FloatKind::F64 => "f64",
        })
    }
}
