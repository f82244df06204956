//! C wrappers around quoted fragments
//!
//! Every capture becomes a `qq_value` local initialised from the input
//! array. A statement fragment runs in its own block and every capture is
//! copied to the output array afterwards; an expression fragment is the
//! value of a GNU statement expression. `#line` points compiler
//! diagnostics at the quoting source.

use std::fmt::Write;

use quasiquote_runtime::abi::{ENTRY_SYMBOL, ERROR_SYMBOL, HEADER_NAME, NAMES_SYMBOL, NAME_COUNT_SYMBOL};

use crate::site::{CallSite, QuoteKind};

/// Render the wrapper for `code` quoted at `site`, capturing `names`
pub fn render(kind: QuoteKind, code: &str, site: &CallSite, names: &[String]) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_wrapper(&mut out, kind, code, site, names);
    out
}

fn write_wrapper(
    out: &mut String,
    kind: QuoteKind,
    code: &str,
    site: &CallSite,
    names: &[String],
) -> std::fmt::Result {
    writeln!(out, "/* quasiquote {} fragment from {} */", kind, site)?;
    writeln!(out, "#include <stdio.h>")?;
    writeln!(out, "#include <stdlib.h>")?;
    writeln!(out, "#include <string.h>")?;
    writeln!(out, "#include \"{}\"", HEADER_NAME)?;
    writeln!(out)?;

    writeln!(out, "const char *{} = NULL;", ERROR_SYMBOL)?;
    write!(out, "const char *const {}[] = {{", NAMES_SYMBOL)?;
    for name in names {
        write!(out, "\"{}\", ", name)?;
    }
    writeln!(out, "NULL}};")?;
    writeln!(out, "const size_t {} = {};", NAME_COUNT_SYMBOL, names.len())?;
    writeln!(out)?;

    writeln!(out, "int")?;
    writeln!(
        out,
        "{}(const qq_value *__qq_in, qq_value *__qq_out, qq_value *__qq_ret)",
        ENTRY_SYMBOL
    )?;
    writeln!(out, "{{")?;
    for (i, name) in names.iter().enumerate() {
        writeln!(out, "    qq_value {} = __qq_in[{}];", name, i)?;
    }
    writeln!(out, "    (void)__qq_in;")?;
    writeln!(out, "    (void)__qq_out;")?;
    writeln!(out)?;

    let line = site.line;
    let file = c_string_body(&site.unit.to_string_lossy());
    match kind {
        QuoteKind::Stmt => {
            writeln!(out, "    /* BEGIN USER BLOCK */")?;
            writeln!(out, "#line {} \"{}\"", line, file)?;
            writeln!(out, "    {{")?;
            write_code(out, code)?;
            writeln!(out, "    }}")?;
            writeln!(out, "    /* END USER BLOCK */")?;
            writeln!(out)?;
            for (i, name) in names.iter().enumerate() {
                writeln!(out, "    __qq_out[{}] = {};", i, name)?;
            }
            writeln!(out, "    *__qq_ret = qq_nothing();")?;
        }
        QuoteKind::Expr => {
            writeln!(out, "    /* BEGIN USER BLOCK */")?;
            writeln!(out, "    *__qq_ret = ({{")?;
            writeln!(out, "#line {} \"{}\"", line, file)?;
            write_code(out, code)?;
            writeln!(out, "    /* END USER BLOCK */")?;
            writeln!(out, "    ;}});")?;
        }
    }
    writeln!(out, "    return 0;")?;
    writeln!(out, "}}")
}

fn write_code(out: &mut String, code: &str) -> std::fmt::Result {
    out.push_str(code);
    if !code.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

/// Escape `raw` for use between double quotes in C
fn c_string_body(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}
