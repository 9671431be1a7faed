//! Tokenizer for Compy source text.
//!
//! Character-driven rather than whitespace-split, since Compy has
//! multi-character operators (`:=`, `==`, `!=`, `<=`, `>=`, `is-not`)
//! that never occur as their own whitespace-delimited words.

use compy_core::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokKind {
    Ident,
    Int,
    Str,
    // Punctuation / operators, carried verbatim in `Token::text`.
    Punct,
    /// End of a physical source line; statements never span lines, so
    /// this is what the parser groups tokens by.
    Newline,
    Eof,
}

#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn is(&self, s: &str) -> bool {
        self.text == s
    }
}

pub struct LexError {
    pub msg: String,
    pub span: Span,
}

/// Multi-character operators, longest first so the scanner's greedy
/// match never splits `==` into two `=` tokens.
const OPERATORS: &[&str] = &[
    ":=", "==", "!=", "<=", ">=", "->", "(", ")", ",", "+", "-", "*", "/", "%", "=", "<", ">", ":",
];

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut line = 1u32;
    let mut col = 0u32;

    let advance = |i: &mut usize, line: &mut u32, col: &mut u32| {
        if bytes[*i] == b'\n' {
            *line += 1;
            *col = 0;
        } else {
            *col += 1;
        }
        *i += 1;
    };

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c == '\n' {
            tokens.push(Token {
                kind: TokKind::Newline,
                text: String::new(),
                span: Span::at(line, col),
            });
            advance(&mut i, &mut line, &mut col);
            continue;
        }

        if c.is_whitespace() {
            advance(&mut i, &mut line, &mut col);
            continue;
        }

        if c == '#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                advance(&mut i, &mut line, &mut col);
            }
            continue;
        }

        let start_line = line;
        let start_col = col;

        if c == '"' {
            let mut value = String::new();
            advance(&mut i, &mut line, &mut col);
            loop {
                if i >= bytes.len() {
                    return Err(LexError {
                        msg: "unterminated string literal".to_string(),
                        span: Span::at(start_line, start_col),
                    });
                }
                let ch = bytes[i] as char;
                if ch == '"' {
                    advance(&mut i, &mut line, &mut col);
                    break;
                }
                if ch == '\\' {
                    advance(&mut i, &mut line, &mut col);
                    if i >= bytes.len() {
                        return Err(LexError {
                            msg: "unterminated escape in string literal".to_string(),
                            span: Span::at(start_line, start_col),
                        });
                    }
                    let esc = bytes[i] as char;
                    value.push(match esc {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '"' => '"',
                        '\\' => '\\',
                        other => {
                            return Err(LexError {
                                msg: format!("unknown escape sequence '\\{other}'"),
                                span: Span::at(line, col),
                            });
                        }
                    });
                    advance(&mut i, &mut line, &mut col);
                    continue;
                }
                if ch == '\0' {
                    return Err(LexError {
                        msg: "string literal may not contain a NUL byte".to_string(),
                        span: Span::at(start_line, start_col),
                    });
                }
                if ch == '\n' {
                    return Err(LexError {
                        msg: "string literal may not contain a raw newline".to_string(),
                        span: Span::at(start_line, start_col),
                    });
                }
                value.push(ch);
                advance(&mut i, &mut line, &mut col);
            }
            let end_col = col;
            tokens.push(Token {
                kind: TokKind::Str,
                text: value,
                span: Span::new(start_line, start_col, start_line, end_col),
            });
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                advance(&mut i, &mut line, &mut col);
            }
            let text = source[start..i].to_string();
            tokens.push(Token {
                kind: TokKind::Int,
                text,
                span: Span::new(start_line, start_col, start_line, col),
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() {
                let ch = bytes[i] as char;
                // A hyphen only extends the identifier when it is itself
                // followed by a letter (`is-not`); `x-1` must still lex as
                // `x`, `-`, `1` so subtraction without spaces still works.
                let hyphen_continues_ident =
                    ch == '-' && bytes.get(i + 1).is_some_and(|b| (*b as char).is_alphabetic());
                if ch.is_alphanumeric() || ch == '_' || hyphen_continues_ident {
                    advance(&mut i, &mut line, &mut col);
                } else {
                    break;
                }
            }
            let text = source[start..i].to_string();
            tokens.push(Token {
                kind: TokKind::Ident,
                text,
                span: Span::new(start_line, start_col, start_line, col),
            });
            continue;
        }

        let rest = &source[i..];
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            for _ in 0..op.len() {
                advance(&mut i, &mut line, &mut col);
            }
            tokens.push(Token {
                kind: TokKind::Punct,
                text: (*op).to_string(),
                span: Span::new(start_line, start_col, start_line, col),
            });
            continue;
        }

        return Err(LexError {
            msg: format!("unexpected character '{c}'"),
            span: Span::at(start_line, start_col),
        });
    }

    tokens.push(Token {
        kind: TokKind::Eof,
        text: String::new(),
        span: Span::at(line, col),
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<String> {
        lex(src).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn lexes_operators_longest_match_first() {
        assert_eq!(texts("x := 1"), vec!["x", ":=", "1", ""]);
        assert_eq!(texts("a == b"), vec!["a", "==", "b", ""]);
        assert_eq!(texts("a is-not b"), vec!["a", "is-not", "b", ""]);
    }

    #[test]
    fn lexes_string_with_escapes() {
        let toks = lex(r#""hi\n""#).unwrap();
        assert_eq!(toks[0].kind, TokKind::Str);
        assert_eq!(toks[0].text, "hi\n");
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(lex("\"abc").is_err());
    }

    #[test]
    fn skips_comments() {
        assert_eq!(texts("x # trailing comment\ny"), vec!["x", "", "y", ""]);
    }

    #[test]
    fn emits_newline_tokens() {
        let kinds: Vec<_> = lex("x\ny").unwrap().into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokKind::Ident, TokKind::Newline, TokKind::Ident, TokKind::Eof]
        );
    }
}
