//! Schema parser.
//!
//! A hand-written recursive-descent parser with one token of lookahead
//! (plus a second-token peek for import disambiguation) and panic-mode
//! recovery. Parsing never fails outright: every error is recorded into the
//! [`Diagnostics`] accumulator, the parser resynchronizes, and a best-effort
//! [`Schema`] is always returned. Callers gate on
//! [`Diagnostics::has_errors`] before trusting the result.
//!
//! Recovery discipline: exactly one diagnostic per panic-mode episode. At
//! the top level the parser skips to the next plausible top-level form (a
//! type name, doc comment, or identifier at the start of a line); inside a
//! `{ ... }` body it skips to the next `,`, newline, or `}`.

use std::borrow::Cow;

use super::ast::{
    ArrayLen, Definition, EnumVariant, Field, FloatKind, Import, IntKind, Schema, TypeExpr,
    UnionVariant,
};
use super::lexer::{Lexer, TokKind, Token};
use cboragen_diagnostics::{Diagnostic, Diagnostics, Span, codes};

/// Result of parsing one schema source buffer.
#[derive(Debug)]
pub struct ParseOutput<'a> {
    /// The parsed schema. Partial (but structurally valid) when
    /// `diagnostics.has_errors()` is true.
    pub schema: Schema<'a>,
    /// Diagnostics produced during lexing and parsing, in source order.
    pub diagnostics: Diagnostics,
}

/// Parse a schema source buffer.
///
/// The returned AST borrows from `source`; `source` must outlive it.
pub fn parse(source: &str) -> ParseOutput<'_> {
    Parser::new(source).parse()
}

// ─── Parser Implementation ─────────────────────────────────────────────────

struct Parser<'a> {
    lexer: Lexer<'a>,
    /// One-token lookahead.
    tok: Token<'a>,
    /// Whether `tok` directly follows a newline (or the start of input).
    /// Drives top-level panic-mode synchronization.
    at_line_start: bool,
    diags: Diagnostics,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let mut diags = Diagnostics::new();
        let tok = lexer.next(&mut diags);
        Self {
            lexer,
            tok,
            at_line_start: true,
            diags,
        }
    }

    // ── Token navigation ────────────────────────────────────────────────

    fn bump(&mut self) {
        self.at_line_start = self.tok.kind == TokKind::Newline;
        self.tok = self.lexer.next(&mut self.diags);
    }

    fn at(&self, kind: TokKind) -> bool {
        self.tok.kind == kind
    }

    /// Peek the kinds of the next two tokens without consuming anything.
    ///
    /// The lexer is cloned (it is just a position) and speculative lexing
    /// goes into a scratch sink, so no diagnostic is ever duplicated.
    fn peek_two(&self) -> (TokKind, TokKind) {
        let mut lexer = self.lexer.clone();
        let mut scratch = Diagnostics::new();
        let first = lexer.next(&mut scratch).kind;
        let second = lexer.next(&mut scratch).kind;
        (first, second)
    }

    fn skip_newlines(&mut self) {
        while self.at(TokKind::Newline) {
            self.bump();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.tok.kind, TokKind::Comma | TokKind::Newline) {
            self.bump();
        }
    }

    // ── Error reporting and recovery ────────────────────────────────────

    /// Report an error at the current token, unless the token is `Invalid`
    /// (the lexer already diagnosed it; a second report would double up).
    fn error_at_tok(&mut self, id: &'static str, message: String) {
        if self.tok.kind != TokKind::Invalid {
            self.diags.error(id, message, self.tok.span);
        }
    }

    /// Consume the current token if it matches, otherwise report and
    /// return `None` (the caller decides how to recover).
    fn expect(&mut self, kind: TokKind) -> Option<Token<'a>> {
        if self.tok.kind == kind {
            let tok = self.tok;
            self.bump();
            Some(tok)
        } else {
            self.error_at_tok(
                codes::PARSE_EXPECTED_TOKEN,
                format!(
                    "expected {}, found {}",
                    kind.describe(),
                    self.tok.kind.describe()
                ),
            );
            None
        }
    }

    /// Top-level panic mode: advance past the offending token, then skip
    /// until a token that could start a top-level form appears at the start
    /// of a line, or the input ends.
    fn recover_top_level(&mut self) {
        if !self.at(TokKind::Eof) {
            self.bump();
        }
        loop {
            match self.tok.kind {
                TokKind::Eof => break,
                TokKind::TypeIdent | TokKind::DocComment | TokKind::Ident
                    if self.at_line_start =>
                {
                    break;
                }
                _ => self.bump(),
            }
        }
    }

    /// Body panic mode: skip to the next `,`, newline, or `}`.
    fn recover_in_body(&mut self) {
        while !matches!(
            self.tok.kind,
            TokKind::Comma | TokKind::Newline | TokKind::RBrace | TokKind::Eof
        ) {
            self.bump();
        }
    }

    // ── Doc comments ────────────────────────────────────────────────────

    /// Gather a run of `///` lines into one doc string.
    ///
    /// A single line borrows from the source; multiple lines are joined
    /// with `\n` into an owned buffer. The newline after the final doc line
    /// is consumed, so the documented form is the next token.
    fn take_doc(&mut self) -> Option<Cow<'a, str>> {
        if !self.at(TokKind::DocComment) {
            return None;
        }
        let first = self.tok.doc_text();
        self.bump();
        let mut rest: Vec<&'a str> = Vec::new();
        while self.at(TokKind::Newline) {
            self.bump();
            if self.at(TokKind::DocComment) {
                rest.push(self.tok.doc_text());
                self.bump();
            } else {
                break;
            }
        }
        if rest.is_empty() {
            Some(Cow::Borrowed(first))
        } else {
            let mut joined = String::with_capacity(
                first.len() + rest.iter().map(|l| l.len() + 1).sum::<usize>(),
            );
            joined.push_str(first);
            for line in rest {
                joined.push('\n');
                joined.push_str(line);
            }
            Some(Cow::Owned(joined))
        }
    }

    // ── Integers ────────────────────────────────────────────────────────

    /// Parse the current `Integer` token as a `u64`, consuming it either way.
    fn parse_u64(&mut self) -> Option<u64> {
        let tok = self.tok;
        self.bump();
        match tok.text.parse::<u64>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.diags.error(
                    codes::PARSE_INTEGER_OVERFLOW,
                    format!(
                        "integer literal '{}' does not fit in 64 unsigned bits",
                        tok.text
                    ),
                    tok.span,
                );
                None
            }
        }
    }

    // ── Top level ───────────────────────────────────────────────────────

    fn parse(mut self) -> ParseOutput<'a> {
        let mut schema = Schema::default();
        loop {
            self.skip_newlines();
            if self.at(TokKind::Eof) {
                break;
            }
            let doc = self.take_doc();
            if self.at(TokKind::Eof) {
                break; // dangling doc at end of input attaches to nothing
            }
            match self.tok.kind {
                TokKind::TypeIdent => {
                    if let Some(def) = self.parse_typedef(doc) {
                        schema.definitions.push(def);
                    }
                }
                TokKind::Ident if self.import_ahead() => {
                    if let Some(import) = self.parse_import() {
                        schema.imports.push(import);
                    }
                }
                TokKind::Ident => {
                    // `=` `@` did not follow, so this is not an import.
                    self.diags.push(
                        Diagnostic::error(
                            codes::PARSE_TOP_LEVEL,
                            format!(
                                "expected a type definition or import, found identifier '{}'",
                                self.tok.text
                            ),
                            Some(self.tok.span),
                        )
                        .with_note(None, "type definitions start with an uppercase name"),
                    );
                    self.recover_top_level();
                }
                _ => {
                    self.error_at_tok(
                        codes::PARSE_TOP_LEVEL,
                        format!(
                            "expected a type definition or import, found {}",
                            self.tok.kind.describe()
                        ),
                    );
                    self.recover_top_level();
                }
            }
        }
        ParseOutput {
            schema,
            diagnostics: self.diags,
        }
    }

    /// Whether the current `identifier` begins an import (`ns = @import(...)`).
    fn import_ahead(&self) -> bool {
        let (first, second) = self.peek_two();
        first == TokKind::Eq && second == TokKind::At
    }

    fn parse_import(&mut self) -> Option<Import<'a>> {
        let namespace = self.tok.text;
        let start = self.tok.span;
        self.bump();
        if self.expect(TokKind::Eq).is_none() || self.expect(TokKind::At).is_none() {
            self.recover_top_level();
            return None;
        }
        if !(self.at(TokKind::Ident) && self.tok.text == "import") {
            self.error_at_tok(
                codes::PARSE_EXPECTED_TOKEN,
                format!("expected 'import', found {}", self.tok.kind.describe()),
            );
            self.recover_top_level();
            return None;
        }
        self.bump();
        if self.expect(TokKind::LParen).is_none() {
            self.recover_top_level();
            return None;
        }
        let path_tok = if self.at(TokKind::Str) {
            let tok = self.tok;
            self.bump();
            tok
        } else {
            self.error_at_tok(
                codes::PARSE_EXPECTED_TOKEN,
                format!(
                    "expected string literal import path, found {}",
                    self.tok.kind.describe()
                ),
            );
            self.recover_top_level();
            return None;
        };
        let Some(close) = self.expect(TokKind::RParen) else {
            self.recover_top_level();
            return None;
        };
        Some(Import {
            namespace,
            path: string_contents(path_tok.text),
            span: start.merge(close.span),
        })
    }

    fn parse_typedef(&mut self, doc: Option<Cow<'a, str>>) -> Option<Definition<'a>> {
        let name = self.tok.text;
        let name_span = self.tok.span;
        self.bump();
        if self.expect(TokKind::Eq).is_none() {
            self.recover_top_level();
            return None;
        }
        let Some(ty) = self.parse_type_expr() else {
            self.recover_top_level();
            return None;
        };
        Some(Definition {
            doc,
            name,
            span: name_span.merge(ty.span()),
            name_span,
            ty,
        })
    }

    // ── Type expressions ────────────────────────────────────────────────

    fn parse_type_expr(&mut self) -> Option<TypeExpr<'a>> {
        let span = self.tok.span;
        if let Some(int) = int_kind(self.tok.kind) {
            self.bump();
            return Some(TypeExpr::Int { int, span });
        }
        if let Some(float) = float_kind(self.tok.kind) {
            self.bump();
            return Some(TypeExpr::Float { float, span });
        }
        match self.tok.kind {
            TokKind::KwBool => {
                self.bump();
                Some(TypeExpr::Bool { span })
            }
            TokKind::KwString => {
                self.bump();
                Some(TypeExpr::String { span })
            }
            TokKind::Question => {
                self.bump();
                let inner = self.parse_type_expr()?;
                Some(TypeExpr::Option {
                    span: span.merge(inner.span()),
                    inner: Box::new(inner),
                })
            }
            TokKind::LBracket => self.parse_array(),
            TokKind::KwStruct => self.parse_struct(span),
            TokKind::KwEnum => self.parse_enum(span),
            TokKind::KwUnion => self.parse_union(span),
            TokKind::TypeIdent => {
                let name = self.tok.text;
                self.bump();
                Some(TypeExpr::Named { name, span })
            }
            TokKind::Ident => {
                // Only a qualified `ns.Type` reference starts lowercase.
                let (next, _) = self.peek_two();
                if next != TokKind::Dot {
                    self.error_at_tok(
                        codes::PARSE_EXPECTED_TYPE,
                        format!(
                            "expected a type expression, found identifier '{}'",
                            self.tok.text
                        ),
                    );
                    return None;
                }
                let namespace = self.tok.text;
                self.bump();
                self.expect(TokKind::Dot)?;
                if !self.at(TokKind::TypeIdent) {
                    self.error_at_tok(
                        codes::PARSE_EXPECTED_TOKEN,
                        format!(
                            "expected type identifier after '{namespace}.', found {}",
                            self.tok.kind.describe()
                        ),
                    );
                    return None;
                }
                let name_tok = self.tok;
                self.bump();
                Some(TypeExpr::Qualified {
                    namespace,
                    name: name_tok.text,
                    span: span.merge(name_tok.span),
                })
            }
            _ => {
                self.error_at_tok(
                    codes::PARSE_EXPECTED_TYPE,
                    format!(
                        "expected a type expression, found {}",
                        self.tok.kind.describe()
                    ),
                );
                None
            }
        }
    }

    fn parse_array(&mut self) -> Option<TypeExpr<'a>> {
        let open = self.tok.span;
        self.bump();
        let len = match self.tok.kind {
            TokKind::RBracket => {
                self.bump();
                ArrayLen::Variable
            }
            TokKind::Integer => {
                let count = self.parse_u64()?;
                self.expect(TokKind::RBracket)?;
                ArrayLen::Fixed { count }
            }
            TokKind::Dot => {
                self.bump();
                let field = match self.tok.kind {
                    TokKind::Ident | TokKind::Integer => {
                        let text = self.tok.text;
                        self.bump();
                        text
                    }
                    _ => {
                        self.error_at_tok(
                            codes::PARSE_MALFORMED_ARRAY,
                            format!(
                                "expected a sibling field name after '.', found {}",
                                self.tok.kind.describe()
                            ),
                        );
                        return None;
                    }
                };
                self.expect(TokKind::RBracket)?;
                ArrayLen::External { field }
            }
            _ => {
                self.error_at_tok(
                    codes::PARSE_MALFORMED_ARRAY,
                    format!(
                        "malformed array specifier: expected ']', a length, or '.field', found {}",
                        self.tok.kind.describe()
                    ),
                );
                return None;
            }
        };
        let elem = self.parse_type_expr()?;
        let span = open.merge(elem.span());
        // `[]u8` is the byte-string form, not an array of 1-byte items.
        if len == ArrayLen::Variable && matches!(elem, TypeExpr::Int { int: IntKind::U8, .. }) {
            return Some(TypeExpr::Bytes { span });
        }
        Some(TypeExpr::Array {
            len,
            elem: Box::new(elem),
            span,
        })
    }

    // ── Compound bodies ─────────────────────────────────────────────────

    /// Drive a `{ ... }` body: skip separators, detect the closing brace,
    /// parse entries via `entry`, and enforce the separator rule between
    /// entries. Returns the span of the closing brace (or where it should
    /// have been).
    fn parse_body(&mut self, what: &str, mut entry: impl FnMut(&mut Self)) -> Option<Span> {
        self.bump(); // the struct/enum/union keyword
        self.expect(TokKind::LBrace)?;
        loop {
            self.skip_separators();
            match self.tok.kind {
                TokKind::RBrace => {
                    let span = self.tok.span;
                    self.bump();
                    return Some(span);
                }
                TokKind::Eof => {
                    self.diags.error(
                        codes::PARSE_EXPECTED_TOKEN,
                        format!("expected '}}' to close this {what} before end of input"),
                        self.tok.span,
                    );
                    return Some(self.tok.span);
                }
                _ => {}
            }
            entry(self);
            // Every entry must be followed by a separator or the close.
            match self.tok.kind {
                TokKind::Comma | TokKind::Newline | TokKind::RBrace | TokKind::Eof => {}
                _ => {
                    self.error_at_tok(
                        codes::PARSE_MISSING_SEPARATOR,
                        format!(
                            "missing separator before {}; {what} entries are separated by ',' or a newline",
                            self.tok.kind.describe()
                        ),
                    );
                    self.recover_in_body();
                }
            }
        }
    }

    fn parse_struct(&mut self, kw_span: Span) -> Option<TypeExpr<'a>> {
        let mut fields = Vec::new();
        let close = self.parse_body("struct", |p| {
            let doc = p.take_doc();
            if matches!(p.tok.kind, TokKind::RBrace | TokKind::Eof) {
                return; // dangling doc before the close
            }
            match p.parse_field(doc) {
                Some(field) => fields.push(field),
                None => p.recover_in_body(),
            }
        })?;
        Some(TypeExpr::Struct {
            fields,
            span: kw_span.merge(close),
        })
    }

    fn parse_field(&mut self, doc: Option<Cow<'a, str>>) -> Option<Field<'a>> {
        if !self.at(TokKind::Integer) {
            self.error_at_tok(
                codes::PARSE_EXPECTED_TOKEN,
                format!(
                    "expected field rank (integer literal), found {}",
                    self.tok.kind.describe()
                ),
            );
            return None;
        }
        let rank_span = self.tok.span;
        let rank = self.parse_u64()?;
        let (name, name_span) = self.parse_member_name("field", true)?;
        self.expect(TokKind::Colon)?;
        let ty = self.parse_type_expr()?;
        Some(Field {
            doc,
            rank,
            name,
            span: rank_span.merge(ty.span()),
            name_span,
            ty,
        })
    }

    fn parse_enum(&mut self, kw_span: Span) -> Option<TypeExpr<'a>> {
        let mut variants = Vec::new();
        let close = self.parse_body("enum", |p| {
            let doc = p.take_doc();
            if matches!(p.tok.kind, TokKind::RBrace | TokKind::Eof) {
                return;
            }
            match p.parse_enum_variant(doc) {
                Some(variant) => variants.push(variant),
                None => p.recover_in_body(),
            }
        })?;
        Some(TypeExpr::Enum {
            variants,
            span: kw_span.merge(close),
        })
    }

    fn parse_enum_variant(&mut self, doc: Option<Cow<'a, str>>) -> Option<EnumVariant<'a>> {
        if !self.at(TokKind::Integer) {
            self.error_at_tok(
                codes::PARSE_EXPECTED_TOKEN,
                format!(
                    "expected variant tag (integer literal), found {}",
                    self.tok.kind.describe()
                ),
            );
            return None;
        }
        let tag_span = self.tok.span;
        let tag = self.parse_u64()?;
        let (name, name_span) = self.parse_member_name("variant", false)?;
        Some(EnumVariant {
            doc,
            tag,
            name,
            span: tag_span.merge(name_span),
        })
    }

    fn parse_union(&mut self, kw_span: Span) -> Option<TypeExpr<'a>> {
        let mut variants = Vec::new();
        let close = self.parse_body("union", |p| {
            let doc = p.take_doc();
            if matches!(p.tok.kind, TokKind::RBrace | TokKind::Eof) {
                return;
            }
            match p.parse_union_variant(doc) {
                Some(variant) => variants.push(variant),
                None => p.recover_in_body(),
            }
        })?;
        Some(TypeExpr::Union {
            variants,
            span: kw_span.merge(close),
        })
    }

    fn parse_union_variant(&mut self, doc: Option<Cow<'a, str>>) -> Option<UnionVariant<'a>> {
        if !self.at(TokKind::Integer) {
            self.error_at_tok(
                codes::PARSE_EXPECTED_TOKEN,
                format!(
                    "expected variant tag (integer literal), found {}",
                    self.tok.kind.describe()
                ),
            );
            return None;
        }
        let tag_span = self.tok.span;
        let tag = self.parse_u64()?;
        let (name, name_span) = self.parse_member_name("variant", false)?;
        let mut span = tag_span.merge(name_span);
        let payload = if self.at(TokKind::Colon) {
            self.bump();
            let ty = self.parse_type_expr()?;
            span = span.merge(ty.span());
            Some(ty)
        } else {
            None
        };
        Some(UnionVariant {
            doc,
            tag,
            name,
            payload,
            span,
        })
    }

    /// Parse a field or variant name. Fields additionally permit bare
    /// integers (numerically-named fields).
    fn parse_member_name(
        &mut self,
        what: &str,
        allow_integer: bool,
    ) -> Option<(&'a str, Span)> {
        let ok = match self.tok.kind {
            TokKind::Ident | TokKind::TypeIdent => true,
            TokKind::Integer => allow_integer,
            _ => false,
        };
        if !ok {
            self.error_at_tok(
                codes::PARSE_EXPECTED_TOKEN,
                format!("expected {what} name, found {}", self.tok.kind.describe()),
            );
            return None;
        }
        let tok = self.tok;
        self.bump();
        Some((tok.text, tok.span))
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// The bytes between a string literal's quotes, exactly as written.
/// Escapes are not processed: import paths are byte-literal.
fn string_contents(text: &str) -> &str {
    let s = text.strip_prefix('"').unwrap_or(text);
    s.strip_suffix('"').unwrap_or(s)
}

fn int_kind(kind: TokKind) -> Option<IntKind> {
    Some(match kind {
        TokKind::KwU8 => IntKind::U8,
        TokKind::KwU16 => IntKind::U16,
        TokKind::KwU32 => IntKind::U32,
        TokKind::KwU64 => IntKind::U64,
        TokKind::KwI8 => IntKind::I8,
        TokKind::KwI16 => IntKind::I16,
        TokKind::KwI32 => IntKind::I32,
        TokKind::KwI64 => IntKind::I64,
        TokKind::KwUvarint => IntKind::Uvarint,
        TokKind::KwIvarint => IntKind::Ivarint,
        _ => return None,
    })
}

fn float_kind(kind: TokKind) -> Option<FloatKind> {
    Some(match kind {
        TokKind::KwF16 => FloatKind::F16,
        TokKind::KwF32 => FloatKind::F32,
        TokKind::KwF64 => FloatKind::F64,
        _ => return None,
    })
}
