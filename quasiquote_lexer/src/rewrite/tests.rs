//! Tests for the quote rewriter

use super::*;
use crate::codec::transform_source;
use crate::error::LexError;
use crate::lexer::tokenize;
use pretty_assertions::assert_eq;

fn rewrite(source: &str) -> Vec<Token> {
    rewrite_tokens(tokenize(source).unwrap()).unwrap()
}

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

// ==================== Block form ====================

#[test]
fn test_block_quote() {
    assert_eq!(
        transform_source("with $qq:\n    body").unwrap(),
        "qq._quote_stmt(0, '    body')\n\n"
    );
}

#[test]
fn test_block_quote_followed_by_code() {
    assert_eq!(
        transform_source("with $qq:\n    body\nout").unwrap(),
        "qq._quote_stmt(0, '    body\\n')\n\nout"
    );
}

#[test]
fn test_block_quote_tokens_anchor_at_with() {
    let tokens = rewrite("x = 1\nwith $c:\n    int y = 2;\n");
    let start = tokens.iter().position(|t| t.text == "c").unwrap();
    let call = &tokens[start..start + 10];
    assert_eq!(
        texts(call),
        vec!["c", ".", "_quote_stmt", "(", "0", ",", "'    int y = 2;\\n'", ")", "\n", "\n"]
    );
    assert_eq!(call[0].start, Pos::new(2, 0));
    assert_eq!(call[2].start, Pos::new(2, 2));
    assert_eq!(call[6].start, Pos::new(2, 17));
    assert_eq!(call[8].kind, TokenKind::Newline);
    assert_eq!(call[9].kind, TokenKind::Nl);
    assert_eq!(call[9].start, Pos::new(3, 0));
}

#[test]
fn test_block_quote_keeps_following_rows() {
    let source = "with $c:\n    a;\n    b;\n    c;\nafter = 1\n";
    let out = transform_source(source).unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines[0], "c._quote_stmt(0, '    a;\\n    b;\\n    c;\\n')");
    assert_eq!(lines[4], "after = 1");
}

#[test]
fn test_nested_block_quote_column_and_dedent() {
    let source = "def f():\n    with $c:\n        a;\n            b;\n    return 1\n";
    let out = transform_source(source).unwrap();
    assert_eq!(
        out,
        "def f():\n    c._quote_stmt(4, '        a;\\n            b;\\n')\n\n\n    return 1\n"
    );
}

#[test]
fn test_block_body_collects_each_line_once() {
    let source = "with $c:\n    int x = f(1,\n              2);\n    x += 1;\n";
    let tokens = rewrite(source);
    let literal = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
    assert_eq!(
        parse_string_literal(&literal.text).unwrap(),
        "    int x = f(1,\n              2);\n    x += 1;\n"
    );
}

#[test]
fn test_block_body_keeps_rows_of_continued_string() {
    let source = "with $c:\n    s = \"a\\\n    b\";\nz\n";
    let tokens = rewrite(source);
    let literal = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
    assert_eq!(
        parse_string_literal(&literal.text).unwrap(),
        "    s = \"a\\\n    b\";\n"
    );
    assert_eq!(tokens.iter().filter(|t| t.text == "z").count(), 1);
}

#[test]
fn test_block_body_keeps_blank_lines() {
    let tokens = rewrite("with $c:\n    a;\n\n    b;\n");
    let literal = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
    assert_eq!(parse_string_literal(&literal.text).unwrap(), "    a;\n\n    b;\n");
}

#[test]
fn test_with_statement_passes_through() {
    let source = "with open(p) as f:\n    f.read()\n";
    assert_eq!(transform_source(source).unwrap(), source);
}

#[test]
fn test_with_sigil_without_block_passes_through() {
    // No indented block follows the header
    let tokens = rewrite("with $qq: x\n");
    assert_eq!(texts(&tokens)[..5], ["with", "$", "qq", ":", "x"]);
}

#[test]
fn test_short_window_is_not_a_match() {
    let tokens = rewrite("with");
    assert_eq!(texts(&tokens), vec!["with", "", ""]);
}

#[test]
fn test_block_header_with_space_error_token() {
    let mut tokens = tokenize("with $qq:\n    body\n").unwrap();
    let space = Token::synthesized(TokenKind::ErrorToken, " ", Pos::new(1, 4));
    tokens.insert(1, space);
    let out = rewrite_tokens(tokens).unwrap();
    assert_eq!(texts(&out)[..3], ["qq", ".", "_quote_stmt"]);
}

#[test]
fn test_sigil_reported_as_operator() {
    let mut tokens = tokenize("[$qq|body|]").unwrap();
    tokens[1].kind = TokenKind::Op;
    let out = rewrite_tokens(tokens).unwrap();
    assert_eq!(texts(&out)[..3], ["qq", ".", "_quote_expr"]);
}

// ==================== Inline form ====================

#[test]
fn test_inline_quote() {
    assert_eq!(
        transform_source("[$qq|body|]").unwrap(),
        "qq._quote_expr(0, '     body')"
    );
}

#[test]
fn test_inline_quote_in_expression() {
    assert_eq!(
        transform_source("y = [$c|x + 1|] * 2\n").unwrap(),
        "y = c._quote_expr(4, '        x + 1') * 2\n"
    );
}

#[test]
fn test_inline_quote_spanning_lines() {
    let source = "y = [$c|a +\n       b|]\nz = 3\n";
    let tokens = rewrite(source);
    let literal = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
    assert_eq!(
        parse_string_literal(&literal.text).unwrap(),
        "        a +\n       b"
    );

    let out = transform_source(source).unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "z = 3");
}

#[test]
fn test_inline_quote_with_continued_string() {
    let source = "y = [$c|f(\"a\\\n b\")|] + 1\n";
    let tokens = rewrite(source);
    let literal = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
    assert_eq!(
        parse_string_literal(&literal.text).unwrap(),
        "        f(\"a\\\n b\")"
    );

    let close = tokens.iter().position(|t| t.text == ")").unwrap();
    assert_eq!(texts(&tokens[close + 1..close + 3]), vec!["+", "1"]);
}

#[test]
fn test_inline_pipe_not_followed_by_bracket() {
    let tokens = rewrite("[$c|a | b|]");
    let literal = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
    assert_eq!(parse_string_literal(&literal.text).unwrap(), "    a | b");
}

#[test]
fn test_empty_inline_quote() {
    let tokens = rewrite("[$c||]");
    let literal = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
    assert_eq!(parse_string_literal(&literal.text).unwrap(), "    ");
}

#[test]
fn test_list_literal_passes_through() {
    let source = "x = [a | b, c]\n";
    assert_eq!(transform_source(source).unwrap(), source);
}

#[test]
fn test_unterminated_inline_quote() {
    let err = rewrite_tokens(tokenize("x = [$c|a]\n").unwrap()).unwrap_err();
    assert_eq!(
        err,
        LexError::UnterminatedQuote {
            name: "c".to_string(),
            pos: Pos::new(1, 6),
        }
    );
}
