//! Tolerant parser for Gradle (Groovy DSL) build descriptors
//!
//! No attempt is made to understand Groovy. The parser recognizes exactly
//! the shape the patcher needs: statements made of word/string tokens,
//! optionally followed by a `{ ... }` block of nested statements. Comments
//! (`//`, `#`, `/* */`), string literals and parenthesized call arguments
//! are skipped or folded into tokens so braces inside them cannot confuse
//! block matching.
//!
//! Unbalanced braces and unterminated strings are the only hard failures.

use crate::descriptor::{Arg, Block, Directive};
use std::fmt;

/// Parse failure with the offending line
#[derive(Debug, Clone)]
pub struct ParseError {
    /// What went wrong
    pub message: String,
    /// 1-based line number
    pub line: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.line)
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for stockly_core::Error {
    fn from(err: ParseError) -> Self {
        stockly_core::Error::descriptor(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Str,
    Comma,
    Semicolon,
    OpenBrace,
    CloseBrace,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    text: String,
    start: usize,
    end: usize,
    line: usize,
}

/// Parse source text into top-level directives
pub fn parse(source: &str) -> Result<Vec<Directive>, ParseError> {
    let tokens = tokenize(source)?;
    let mut pos = 0;
    parse_directives(&tokens, &mut pos, 0)
}

fn parse_directives(
    tokens: &[Token],
    pos: &mut usize,
    depth: usize,
) -> Result<Vec<Directive>, ParseError> {
    let mut directives = Vec::new();

    loop {
        let Some(token) = tokens.get(*pos) else {
            if depth > 0 {
                let line = tokens.last().map_or(1, |t| t.line);
                return Err(ParseError {
                    message: "Unclosed block at end of input".to_string(),
                    line,
                });
            }
            return Ok(directives);
        };

        match token.kind {
            TokenKind::CloseBrace => {
                if depth > 0 {
                    // caller consumes the brace
                    return Ok(directives);
                }
                return Err(ParseError {
                    message: "Unexpected '}'".to_string(),
                    line: token.line,
                });
            }
            TokenKind::Semicolon | TokenKind::Comma => {
                // stray separator
                *pos += 1;
            }
            TokenKind::OpenBrace => {
                // anonymous block; keep its children so nested lookups still work
                let open = token.clone();
                *pos += 1;
                let children = parse_directives(tokens, pos, depth + 1)?;
                let close = expect_close(tokens, pos, open.line)?;
                directives.push(Directive {
                    name: String::new(),
                    args: Vec::new(),
                    span: open.start..open.start,
                    block: Some(Block {
                        directives: children,
                        open: open.end,
                        close: close.start,
                    }),
                });
            }
            TokenKind::Word | TokenKind::Str => {
                directives.push(parse_statement(tokens, pos, depth)?);
            }
        }
    }
}

fn parse_statement(
    tokens: &[Token],
    pos: &mut usize,
    depth: usize,
) -> Result<Directive, ParseError> {
    let first = tokens[*pos].clone();
    *pos += 1;

    let mut args: Vec<Arg> = Vec::new();
    let mut last_line = first.line;
    let mut last_end = first.end;
    let mut prev_was_comma = false;
    let mut ended_by_semicolon = false;

    while let Some(token) = tokens.get(*pos) {
        match token.kind {
            TokenKind::OpenBrace | TokenKind::CloseBrace => break,
            TokenKind::Semicolon => {
                *pos += 1;
                ended_by_semicolon = true;
                break;
            }
            _ => {
                // a trailing comma continues the statement across lines
                if token.line > last_line && !prev_was_comma {
                    break;
                }
                prev_was_comma = token.kind == TokenKind::Comma;
                args.push(Arg {
                    text: token.text.clone(),
                    span: token.start..token.end,
                });
                last_line = token.line;
                last_end = token.end;
                *pos += 1;
            }
        }
    }

    // a block belongs to the statement only when its brace opens on the
    // statement's last line
    let block = match tokens.get(*pos) {
        Some(open) if !ended_by_semicolon
            && open.kind == TokenKind::OpenBrace
            && open.line == last_line =>
        {
            let open = open.clone();
            *pos += 1;
            let children = parse_directives(tokens, pos, depth + 1)?;
            let close = expect_close(tokens, pos, open.line)?;
            Some(Block {
                directives: children,
                open: open.end,
                close: close.start,
            })
        }
        _ => None,
    };

    Ok(Directive {
        name: first.text,
        args,
        span: first.start..last_end,
        block,
    })
}

fn expect_close(tokens: &[Token], pos: &mut usize, open_line: usize) -> Result<Token, ParseError> {
    match tokens.get(*pos) {
        Some(token) if token.kind == TokenKind::CloseBrace => {
            let token = token.clone();
            *pos += 1;
            Ok(token)
        }
        _ => Err(ParseError {
            message: format!("Unclosed block opened at line {}", open_line),
            line: open_line,
        }),
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'\n' => {
                line += 1;
                i += 1;
            }
            b' ' | b'\t' | b'\r' => i += 1,
            b'#' => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i, &mut line),
            b'{' => {
                tokens.push(single(TokenKind::OpenBrace, "{", i, line));
                i += 1;
            }
            b'}' => {
                tokens.push(single(TokenKind::CloseBrace, "}", i, line));
                i += 1;
            }
            b',' => {
                tokens.push(single(TokenKind::Comma, ",", i, line));
                i += 1;
            }
            b';' => {
                tokens.push(single(TokenKind::Semicolon, ";", i, line));
                i += 1;
            }
            b'\'' | b'"' => {
                let start = i;
                let start_line = line;
                i = scan_string(bytes, i, &mut line).ok_or_else(|| ParseError {
                    message: "Unterminated string literal".to_string(),
                    line: start_line,
                })?;
                tokens.push(Token {
                    kind: TokenKind::Str,
                    text: source[start..i].to_string(),
                    start,
                    end: i,
                    line: start_line,
                });
            }
            _ => {
                let start = i;
                let start_line = line;
                i = scan_word(bytes, i, &mut line).ok_or_else(|| ParseError {
                    message: "Unterminated call arguments".to_string(),
                    line: start_line,
                })?;
                tokens.push(Token {
                    kind: TokenKind::Word,
                    text: source[start..i].to_string(),
                    start,
                    end: i,
                    line: start_line,
                });
            }
        }
    }

    Ok(tokens)
}

fn single(kind: TokenKind, text: &str, at: usize, line: usize) -> Token {
    Token {
        kind,
        text: text.to_string(),
        start: at,
        end: at + 1,
        line,
    }
}

fn skip_line_comment(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

fn skip_block_comment(bytes: &[u8], mut i: usize, line: &mut usize) -> usize {
    i += 2;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            *line += 1;
        } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
            return i + 2;
        }
        i += 1;
    }
    i
}

/// Scan a quoted string starting at the opening quote; returns the offset
/// just past the closing quote
fn scan_string(bytes: &[u8], mut i: usize, line: &mut usize) -> Option<usize> {
    let quote = bytes[i];
    i += 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => {
                *line += 1;
                i += 1;
            }
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Scan a word token; parenthesized call arguments are folded into the
/// token so commas and braces inside them stay invisible to the parser
fn scan_word(bytes: &[u8], mut i: usize, line: &mut usize) -> Option<usize> {
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' | b'{' | b'}' | b',' | b';' | b'\'' | b'"' | b'#' => break,
            b'/' if matches!(bytes.get(i + 1), Some(&b'/') | Some(&b'*')) => break,
            b'(' => i = scan_parens(bytes, i, line)?,
            _ => i += 1,
        }
    }
    Some(i)
}

fn scan_parens(bytes: &[u8], mut i: usize, line: &mut usize) -> Option<usize> {
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'\'' | b'"' => i = scan_string(bytes, i, line)?,
            b'\n' => {
                *line += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parses_empty_block() {
        let directives = parse("android { }").unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].name, "android");
        assert!(directives[0].block.as_ref().unwrap().directives.is_empty());
    }

    #[test]
    fn test_parses_statement_args() {
        let directives = parse("minifyEnabled false\n").unwrap();
        assert_eq!(directives[0].name, "minifyEnabled");
        assert_eq!(directives[0].args[0].text, "false");
    }

    #[test]
    fn test_call_args_hide_inner_commas_and_braces() {
        let directives =
            parse("proguardFiles getDefaultProguardFile('proguard-android.txt'), 'rules.pro'\n")
                .unwrap();
        assert_eq!(directives.len(), 1);
        let d = &directives[0];
        assert_eq!(d.name, "proguardFiles");
        assert_eq!(d.args.len(), 3);
        assert_eq!(d.args[1].text, ",");
        assert_eq!(d.args[2].text, "'rules.pro'");
    }

    #[test]
    fn test_braces_in_strings_and_comments_ignored() {
        let source = r#"
android {
    // a comment with { braces }
    /* and a block
       comment } */
    applicationId "com.example.{weird}"
}
"#;
        let directives = parse(source).unwrap();
        assert_eq!(directives.len(), 1);
        let block = directives[0].block.as_ref().unwrap();
        assert_eq!(block.directives.len(), 1);
        assert_eq!(block.directives[0].name, "applicationId");
    }

    #[test]
    fn test_unbalanced_open_is_error() {
        let err = parse("android {\n    buildTypes {\n}\n").unwrap_err();
        assert!(err.message.contains("Unclosed"));
    }

    #[test]
    fn test_unbalanced_close_is_error() {
        let err = parse("android { }\n}\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let err = parse("applicationId \"oops\n").unwrap_err();
        assert!(err.message.contains("Unterminated string"));
    }

    #[test]
    fn test_semicolon_separates_statements() {
        let directives = parse("a 1; b 2\n").unwrap();
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[1].name, "b");
    }

    #[test]
    fn test_trailing_comma_continues_statement() {
        let directives = parse("proguardFiles 'a.pro',\n    'b.pro'\n").unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].args.len(), 3);
    }

    // Tiny generator for nested descriptor shapes: leaves are `key value`
    // statements, interior nodes are named blocks.
    #[derive(Debug, Clone)]
    enum Node {
        Leaf(String),
        Block(String, Vec<Node>),
    }

    fn render(nodes: &[Node], depth: usize, out: &mut String) {
        let pad = "    ".repeat(depth);
        for node in nodes {
            match node {
                Node::Leaf(name) => out.push_str(&format!("{pad}{name} true\n")),
                Node::Block(name, children) => {
                    out.push_str(&format!("{pad}{name} {{\n"));
                    render(children, depth + 1, out);
                    out.push_str(&format!("{pad}}}\n"));
                }
            }
        }
    }

    fn count(nodes: &[Node]) -> usize {
        nodes
            .iter()
            .map(|n| match n {
                Node::Leaf(_) => 1,
                Node::Block(_, children) => 1 + count(children),
            })
            .sum()
    }

    fn count_parsed(directives: &[crate::descriptor::Directive]) -> usize {
        directives
            .iter()
            .map(|d| {
                1 + d
                    .block
                    .as_ref()
                    .map_or(0, |b| count_parsed(&b.directives))
            })
            .sum()
    }

    fn node_strategy() -> impl Strategy<Value = Node> {
        let name = "[a-z][a-zA-Z0-9]{0,8}";
        name.prop_map(Node::Leaf).prop_recursive(3, 24, 4, move |inner| {
            ("[a-z][a-zA-Z0-9]{0,8}", prop::collection::vec(inner, 0..4))
                .prop_map(|(n, c)| Node::Block(n, c))
        })
    }

    proptest! {
        #[test]
        fn prop_generated_descriptors_parse_with_same_shape(
            nodes in prop::collection::vec(node_strategy(), 0..4)
        ) {
            let mut source = String::new();
            render(&nodes, 0, &mut source);

            let directives = parse(&source).unwrap();
            prop_assert_eq!(count(&nodes), count_parsed(&directives));
        }
    }
}
