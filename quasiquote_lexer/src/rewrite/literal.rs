//! Host string literals for rewritten call arguments

/// Render `text` as a host string literal.
///
/// Single quotes are used unless the text contains a single quote and no
/// double quote. Backslashes, the chosen quote and control characters are
/// escaped, so the literal always fits on one line.
pub fn string_literal(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c == '\x7f' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Decode a literal produced by [`string_literal`].
///
/// Returns `None` for text that is not a plain quoted literal using only
/// the escapes `string_literal` emits.
pub fn parse_string_literal(literal: &str) -> Option<String> {
    let quote = literal.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let body = literal.strip_prefix(quote)?.strip_suffix(quote)?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(string_literal("    body"), "'    body'");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(string_literal("a\nb\\c\td"), r"'a\nb\\c\td'");
        assert_eq!(string_literal("\x01\x7f"), r"'\x01\x7f'");
        assert_eq!(string_literal("αβ"), "'αβ'");
    }

    #[test]
    fn test_quote_choice() {
        assert_eq!(string_literal("it's"), "\"it's\"");
        assert_eq!(string_literal("say \"hi\""), "'say \"hi\"'");
        assert_eq!(string_literal("'both\""), r#"'\'both"'"#);
    }

    #[test]
    fn test_parse_reverses_render() {
        for text in ["", "int x = 1;\n", "it's", "'q\"", "tab\there", "\x02"] {
            assert_eq!(parse_string_literal(&string_literal(text)).as_deref(), Some(text));
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_string_literal("body"), None);
        assert_eq!(parse_string_literal("'open"), None);
        assert_eq!(parse_string_literal(r"'\q'"), None);
    }
}
