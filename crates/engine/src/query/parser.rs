//! Recursive-descent parser for the query grammar in §4.3:
//!
//! ```text
//! or       := and (OR and)*
//! and      := not (AND? not)*          // AND is optional: adjacency means AND
//! not      := NOT? primary
//! primary  := "(" or ")" | term
//! term     := fieldTerm | keyword
//! fieldTerm:= ident ":" value
//! value    := qstring | rangeExpr | wildValue | ident
//! rangeExpr:= "[" bound "TO" bound "]"
//! keyword  := ident | qstring
//! ```

use super::ast::Filter;
use super::errors::QueryParseError;
use super::lexer::{lex, Token};
use super::range;

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

/// Compiles a query string into a [`Filter`] tree. An empty (or
/// whitespace-only) query, and the bare string `*`, both compile to
/// [`Filter::All`].
pub fn compile(query: &str) -> Result<Filter, QueryParseError> {
    let trimmed = query.trim();
    if trimmed.is_empty() || trimmed == "*" {
        return Ok(Filter::All);
    }
    let tokens = lex(query).map_err(|(pos, msg)| QueryParseError::new(pos, msg))?;
    let mut parser = Parser { tokens, pos: 0 };
    let filter = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        let pos = parser.tokens[parser.pos].1;
        return Err(QueryParseError::new(pos, "unexpected trailing input"));
    }
    Ok(filter)
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn current_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, p)| *p)
            .unwrap_or_else(|| self.tokens.last().map(|(_, p)| p + 1).unwrap_or(0))
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].0.clone();
        self.pos += 1;
        t
    }

    fn expect(&mut self, want: &Token) -> Result<(), QueryParseError> {
        if self.peek() == Some(want) {
            self.pos += 1;
            Ok(())
        } else {
            Err(QueryParseError::new(
                self.current_pos(),
                format!("expected {:?}", want),
            ))
        }
    }

    fn parse_or(&mut self) -> Result<Filter, QueryParseError> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Filter::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Filter, QueryParseError> {
        let mut left = self.parse_not()?;
        loop {
            if self.peek() == Some(&Token::And) {
                self.advance();
            } else if self.can_start_not() {
                // implicit AND: two terms back to back
            } else {
                break;
            }
            let right = self.parse_not()?;
            left = Filter::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn can_start_not(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Not) | Some(Token::LParen) | Some(Token::Word(_)) | Some(Token::QString(_))
        )
    }

    fn parse_not(&mut self) -> Result<Filter, QueryParseError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.parse_primary()?;
            Ok(Filter::Not(Box::new(inner)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Filter, QueryParseError> {
        if self.peek() == Some(&Token::LParen) {
            self.advance();
            if self.peek() == Some(&Token::RParen) {
                return Err(QueryParseError::new(self.current_pos(), "empty group"));
            }
            let inner = self.parse_or()?;
            self.expect(&Token::RParen)?;
            Ok(inner)
        } else {
            self.parse_term()
        }
    }

    fn parse_term(&mut self) -> Result<Filter, QueryParseError> {
        if let Some(Token::Word(name)) = self.peek().cloned() {
            if self.peek_at(1) == Some(&Token::Colon) {
                self.advance(); // ident
                self.advance(); // colon
                return self.parse_value(name);
            }
        }

        match self.peek().cloned() {
            Some(Token::Word(w)) => {
                self.advance();
                if w == "*" {
                    Ok(Filter::All)
                } else {
                    Ok(Filter::Keyword(w))
                }
            }
            Some(Token::QString(s)) => {
                self.advance();
                Ok(Filter::Keyword(s))
            }
            other => Err(QueryParseError::new(
                self.current_pos(),
                format!("expected a term, found {:?}", other),
            )),
        }
    }

    fn parse_value(&mut self, field: String) -> Result<Filter, QueryParseError> {
        let is_timestamp_field = field == "timestamp" || field == "time";
        match self.peek().cloned() {
            Some(Token::LBracket) => {
                self.advance();
                let start_raw = self.parse_bound_token()?;
                self.expect_to()?;
                let end_raw = self.parse_bound_token()?;
                self.expect(&Token::RBracket)?;
                if is_timestamp_field {
                    Ok(Filter::TimestampRange {
                        start: range::parse_bound(&start_raw),
                        end: range::parse_bound(&end_raw),
                    })
                } else {
                    Ok(Filter::NumericRange {
                        field,
                        start: range::parse_numeric_bound(&start_raw),
                        end: range::parse_numeric_bound(&end_raw),
                    })
                }
            }
            Some(Token::QString(s)) => {
                self.advance();
                Ok(Filter::Field {
                    name: field,
                    value: s,
                    exact: true,
                })
            }
            Some(Token::Word(w)) => {
                self.advance();
                if w.contains('*') {
                    Ok(Filter::Wildcard { field, pattern: w })
                } else {
                    Ok(Filter::Field {
                        name: field,
                        value: w,
                        exact: true,
                    })
                }
            }
            other => Err(QueryParseError::new(
                self.current_pos(),
                format!("expected a value after '{}:', found {:?}", field, other),
            )),
        }
    }

    fn expect_to(&mut self) -> Result<(), QueryParseError> {
        match self.peek().cloned() {
            Some(Token::Word(ref w)) if w == "TO" => {
                self.advance();
                Ok(())
            }
            other => Err(QueryParseError::new(
                self.current_pos(),
                format!("expected 'TO', found {:?}", other),
            )),
        }
    }

    fn parse_bound_token(&mut self) -> Result<String, QueryParseError> {
        match self.peek().cloned() {
            Some(Token::Word(w)) => {
                self.advance();
                Ok(w)
            }
            Some(Token::QString(s)) => {
                self.advance();
                Ok(s)
            }
            // An empty bound, e.g. `[ TO now]`, is written as an immediate
            // TO or RBracket — leave the token unconsumed and treat as "".
            Some(Token::RBracket) => Ok(String::new()),
            other => Err(QueryParseError::new(
                self.current_pos(),
                format!("expected a range bound, found {:?}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_star_are_tautologies() {
        assert_eq!(compile("").unwrap(), Filter::All);
        assert_eq!(compile("   ").unwrap(), Filter::All);
        assert_eq!(compile("*").unwrap(), Filter::All);
    }

    #[test]
    fn field_term_with_explicit_and() {
        let f = compile("level:ERROR AND service:api").unwrap();
        assert_eq!(
            f,
            Filter::And(
                Box::new(Filter::Field {
                    name: "level".into(),
                    value: "ERROR".into(),
                    exact: true
                }),
                Box::new(Filter::Field {
                    name: "service".into(),
                    value: "api".into(),
                    exact: true
                }),
            )
        );
    }

    #[test]
    fn adjacent_terms_are_implicit_and() {
        let f = compile("level:ERROR service:api").unwrap();
        assert!(matches!(f, Filter::And(_, _)));
    }

    #[test]
    fn or_binds_looser_than_and() {
        let f = compile("level:ERROR AND a:b OR c:d").unwrap();
        match f {
            Filter::Or(left, right) => {
                assert!(matches!(*left, Filter::And(_, _)));
                assert!(matches!(*right, Filter::Field { .. }));
            }
            other => panic!("expected Or at top, got {:?}", other),
        }
    }

    #[test]
    fn not_applies_to_the_immediate_primary() {
        let f = compile("NOT level:DEBUG").unwrap();
        assert!(matches!(f, Filter::Not(_)));
    }

    #[test]
    fn parens_group_an_or_expression() {
        let f = compile("(level:ERROR OR level:WARN) AND service:api").unwrap();
        match f {
            Filter::And(left, _) => assert!(matches!(*left, Filter::Or(_, _))),
            other => panic!("expected And at top, got {:?}", other),
        }
    }

    #[test]
    fn numeric_range_compiles() {
        let f = compile("status:[200 TO 299]").unwrap();
        assert_eq!(
            f,
            Filter::NumericRange {
                field: "status".into(),
                start: Some(200.0),
                end: Some(299.0),
            }
        );
    }

    #[test]
    fn timestamp_field_compiles_to_timestamp_range() {
        let f = compile("timestamp:[2026-01-01 TO 2026-02-01]").unwrap();
        assert!(matches!(f, Filter::TimestampRange { .. }));
    }

    #[test]
    fn wildcard_value_compiles_to_wildcard_filter() {
        let f = compile("message:*timeout*").unwrap();
        assert_eq!(
            f,
            Filter::Wildcard {
                field: "message".into(),
                pattern: "*timeout*".into()
            }
        );
    }

    #[test]
    fn quoted_field_value_is_exact() {
        let f = compile(r#"message:"connection refused""#).unwrap();
        assert_eq!(
            f,
            Filter::Field {
                name: "message".into(),
                value: "connection refused".into(),
                exact: true,
            }
        );
    }

    #[test]
    fn bare_keyword_with_no_colon() {
        let f = compile("timeout").unwrap();
        assert_eq!(f, Filter::Keyword("timeout".into()));
    }

    #[test]
    fn unmatched_paren_is_a_parse_error() {
        let err = compile("(level:ERROR").unwrap_err();
        assert!(err.message.contains("RParen") || err.message.len() > 0);
    }

    #[test]
    fn empty_group_is_a_parse_error() {
        assert!(compile("()").is_err());
    }
}
