//! cboragen CLI — parse cboragen schema files and inspect the result.
//!
//! Default mode parses the file, prints an AST summary to stdout, and
//! renders diagnostics to stderr; the exit code is 1 when any error
//! diagnostic was produced. `--tokens` dumps the raw token stream instead,
//! `--json` swaps the summary for the full AST as JSON, and `--resolve`
//! additionally walks the import closure.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use cboragen_core::{
    Lexer, TokKind, load_modules, parse, parse_modules, summarize, to_pretty_json,
};
use cboragen_diagnostics::{Diagnostics, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cboragen",
    version,
    about = "cboragen schema compiler — parse schema files and print the AST"
)]
struct Cli {
    /// Schema file to parse.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print one line per token instead of parsing.
    #[arg(long)]
    tokens: bool,

    /// Print the AST as pretty JSON instead of a summary.
    #[arg(long, conflicts_with = "tokens")]
    json: bool,

    /// Also resolve imports, relative to the file's directory.
    #[arg(long, conflicts_with = "tokens")]
    resolve: bool,

    /// Suppress ANSI colors in diagnostic output.
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(2);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("cannot read '{}'", cli.file.display()))?;
    let filename = cli.file.display().to_string();
    // Color is for interactive terminals only; pipes get clean bytes.
    let use_color = !cli.no_color && io::stderr().is_terminal();

    if cli.tokens {
        let diags = print_tokens(&source)?;
        render(&source, &filename, &diags, use_color)?;
        return Ok(if diags.has_errors() { 1 } else { 0 });
    }

    let result = parse(&source);
    let mut had_errors = result.diagnostics.has_errors();
    render(&source, &filename, &result.diagnostics, use_color)?;

    if cli.json {
        println!("{}", to_pretty_json(&result.schema));
    } else {
        print!("{}", summarize(&result.schema));
    }

    if cli.resolve {
        let base_dir = cli.file.parent().unwrap_or(Path::new("."));
        let mut driver_diags = Diagnostics::new();
        let files = load_modules(&result.schema, base_dir, &mut driver_diags);
        render(&source, &filename, &driver_diags, use_color)?;

        let modules = parse_modules(&files);
        if !modules.is_empty() {
            println!();
        }
        for (file, module) in files.iter().zip(&modules) {
            had_errors |= module.diagnostics.has_errors();
            render(
                &file.text,
                &file.path.display().to_string(),
                &module.diagnostics,
                use_color,
            )?;
            println!(
                "namespace {}: {} definitions ({})",
                module.namespace,
                module.schema.definitions.len(),
                module.path.display()
            );
        }
    }

    Ok(if had_errors { 1 } else { 0 })
}

// ── Token listing ───────────────────────────────────────────────────────

/// Dump the token stream, one line per token:
/// `<start>..<end>  <tag>  "<text>"` (text only for literals, identifiers,
/// and doc comments). Lexical diagnostics are returned for rendering.
fn print_tokens(source: &str) -> Result<Diagnostics> {
    let mut lexer = Lexer::new(source);
    let mut diags = Diagnostics::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    loop {
        let tok = lexer.next(&mut diags);
        if tok.kind.carries_text() {
            writeln!(
                out,
                "{}..{}  {}  {:?}",
                tok.span.start,
                tok.span.end,
                tok.kind.name(),
                tok.text
            )?;
        } else {
            writeln!(
                out,
                "{}..{}  {}",
                tok.span.start,
                tok.span.end,
                tok.kind.name()
            )?;
        }
        if tok.kind == TokKind::Eof {
            break;
        }
    }
    Ok(diags)
}

// ── Diagnostics rendering ───────────────────────────────────────────────

fn render(source: &str, filename: &str, diags: &Diagnostics, use_color: bool) -> Result<()> {
    if diags.is_empty() {
        return Ok(());
    }
    let stderr = io::stderr();
    let mut err = stderr.lock();
    render_diagnostics(&mut err, source, filename, diags.as_slice(), use_color)?;
    Ok(())
}
