//! Recursive-descent parser for pointcut expressions.
//!
//! Grammar (precedence low → high):
//!
//! ```text
//! expr    := or
//! or      := and (("||" | "or") and)*
//! and     := unary (("&&" | "and") unary)*
//! unary   := ("!" | "not") unary | primary
//! primary := "(" expr ")" | atom
//! atom    := ("scope" | "type" | "member") "(" STRING ")"
//! ```

use weft_core::errors::ExpressionError;

use super::ast::{Atom, AtomKind, Expr};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    AndOp,
    OrOp,
    NotOp,
    Ident(String),
    Str(String),
}

#[derive(Debug)]
struct Spanned {
    token: Token,
    span: (usize, usize),
}

fn lex(source: &str) -> Result<Vec<Spanned>, ExpressionError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'(' => {
                tokens.push(Spanned {
                    token: Token::LParen,
                    span: (start, start + 1),
                });
                i += 1;
            }
            b')' => {
                tokens.push(Spanned {
                    token: Token::RParen,
                    span: (start, start + 1),
                });
                i += 1;
            }
            b'!' => {
                tokens.push(Spanned {
                    token: Token::NotOp,
                    span: (start, start + 1),
                });
                i += 1;
            }
            b'&' => {
                if bytes.get(i + 1) == Some(&b'&') {
                    tokens.push(Spanned {
                        token: Token::AndOp,
                        span: (start, start + 2),
                    });
                    i += 2;
                } else {
                    return Err(ExpressionError::new(
                        source,
                        (start, start + 1),
                        "expected '&&'",
                    ));
                }
            }
            b'|' => {
                if bytes.get(i + 1) == Some(&b'|') {
                    tokens.push(Spanned {
                        token: Token::OrOp,
                        span: (start, start + 2),
                    });
                    i += 2;
                } else {
                    return Err(ExpressionError::new(
                        source,
                        (start, start + 1),
                        "expected '||'",
                    ));
                }
            }
            b'"' => {
                i += 1;
                let content_start = i;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(ExpressionError::new(
                        source,
                        (start, bytes.len()),
                        "unterminated string literal",
                    ));
                }
                let value = source[content_start..i].to_string();
                i += 1; // closing quote
                tokens.push(Spanned {
                    token: Token::Str(value),
                    span: (start, i),
                });
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                let word = &source[start..i];
                let token = match word {
                    "and" => Token::AndOp,
                    "or" => Token::OrOp,
                    "not" => Token::NotOp,
                    _ => Token::Ident(word.to_string()),
                };
                tokens.push(Spanned {
                    token,
                    span: (start, i),
                });
            }
            _ => {
                return Err(ExpressionError::new(
                    source,
                    (start, start + 1),
                    "unexpected character",
                ));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<(Token, (usize, usize))> {
        let t = self.tokens.get(self.pos).map(|t| (t.token.clone(), t.span));
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn end_span(&self) -> (usize, usize) {
        let end = self.source.len();
        (end, end)
    }

    fn error(&self, span: (usize, usize), message: &str) -> ExpressionError {
        ExpressionError::new(self.source, span, message)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ExpressionError> {
        match self.peek() {
            Some(t) if t.token == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => Err(self.error(t.span, what)),
            None => Err(self.error(self.end_span(), what)),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(t) if t.token == Token::OrOp) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary()?;
        while matches!(self.peek(), Some(t) if t.token == Token::AndOp) {
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        if matches!(self.peek(), Some(t) if t.token == Token::NotOp) {
            self.pos += 1;
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        match self.advance() {
            Some((Token::LParen, _)) => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen, "expected ')'")?;
                Ok(inner)
            }
            Some((token, span)) => {
                let (ident, ident_span) = match token {
                    Token::Ident(name) => (name, span),
                    _ => {
                        return Err(self.error(span, "expected 'scope', 'type', or 'member'"));
                    }
                };
                let kind = match ident.as_str() {
                    "scope" => AtomKind::Scope,
                    "type" => AtomKind::Type,
                    "member" => AtomKind::Member,
                    _ => {
                        return Err(self.error(ident_span, "unknown predicate"));
                    }
                };
                self.expect(Token::LParen, "expected '(' after predicate name")?;
                let (raw, str_span) = match self.advance() {
                    Some((Token::Str(value), span)) => (value, span),
                    Some((_, span)) => {
                        return Err(self.error(span, "expected string literal"));
                    }
                    None => {
                        let span = self.end_span();
                        return Err(self.error(span, "expected string literal"));
                    }
                };
                self.expect(Token::RParen, "expected ')' after pattern")?;

                let (pattern, subtypes) = match (kind, raw.strip_suffix('+')) {
                    (AtomKind::Type, Some(stripped)) => (stripped.to_string(), true),
                    _ => (raw, false),
                };
                if pattern.is_empty() {
                    return Err(self.error(str_span, "empty pattern"));
                }

                let span = (ident_span.0, str_span.1 + 1);
                Ok(Expr::Atom(Atom {
                    kind,
                    pattern,
                    subtypes,
                    span,
                }))
            }
            None => {
                let span = self.end_span();
                Err(self.error(span, "unexpected end of expression"))
            }
        }
    }
}

/// Parse a pointcut expression into its AST.
pub fn parse(source: &str) -> Result<Expr, ExpressionError> {
    let tokens = lex(source)?;
    if tokens.is_empty() {
        return Err(ExpressionError::new(source, (0, 0), "empty expression"));
    }
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    let expr = parser.parse_or()?;
    if let Some(t) = parser.peek() {
        return Err(parser.error(t.span, "trailing input after expression"));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_atom() {
        let expr = parse(r#"type("com.acme.*")"#).unwrap();
        match expr {
            Expr::Atom(atom) => {
                assert_eq!(atom.kind, AtomKind::Type);
                assert_eq!(atom.pattern, "com.acme.*");
                assert!(!atom.subtypes);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn subtype_suffix_on_type_atoms() {
        let expr = parse(r#"type("com.acme.Base+")"#).unwrap();
        match expr {
            Expr::Atom(atom) => {
                assert_eq!(atom.pattern, "com.acme.Base");
                assert!(atom.subtypes);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn precedence_not_over_and_over_or() {
        // a || b && !c  parses as  a || (b && (!c))
        let expr = parse(r#"scope("a") || scope("b") && !scope("c")"#).unwrap();
        match expr {
            Expr::Or(_, right) => match *right {
                Expr::And(_, ref r) => assert!(matches!(**r, Expr::Not(_))),
                ref other => panic!("unexpected: {other:?}"),
            },
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn word_operators_accepted() {
        let expr = parse(r#"type("A") and not member("b") or scope("s")"#).unwrap();
        assert!(matches!(expr, Expr::Or(_, _)));
    }

    #[test]
    fn parens_override_precedence() {
        let expr = parse(r#"(scope("a") || scope("b")) && type("T")"#).unwrap();
        assert!(matches!(expr, Expr::And(_, _)));
    }

    #[test]
    fn error_spans_point_at_offender() {
        let source = r#"type("A") && junk("B")"#;
        let err = parse(source).unwrap_err();
        assert_eq!(&source[err.span.0..err.span.1], "junk");
        assert_eq!(err.expression, source);
    }

    #[test]
    fn unterminated_string_reported() {
        let err = parse(r#"type("A"#).unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn empty_expression_rejected() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }
}
