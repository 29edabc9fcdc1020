//! Tokenizer for the Lucene-ish query language (§4.3).
//!
//! Deliberately simple: whitespace-separated words, a handful of structural
//! characters, and double-quoted strings. `AND`/`OR`/`NOT` are recognized as
//! reserved words only when they appear as a standalone, exact-case token —
//! `android` or `no` are ordinary words.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    And,
    Or,
    Not,
    QString(String),
    Word(String),
}

/// `(token, byte offset the token started at)`.
pub fn lex(input: &str) -> Result<Vec<(Token, usize)>, (usize, String)> {
    // Indexed by char, not byte, so multi-byte UTF-8 (accented words, quoted
    // non-ASCII text, ...) lexes correctly instead of splitting a codepoint.
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let (byte_pos, c) = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                out.push((Token::LParen, byte_pos));
                i += 1;
            }
            ')' => {
                out.push((Token::RParen, byte_pos));
                i += 1;
            }
            '[' => {
                out.push((Token::LBracket, byte_pos));
                i += 1;
            }
            ']' => {
                out.push((Token::RBracket, byte_pos));
                i += 1;
            }
            ':' => {
                out.push((Token::Colon, byte_pos));
                i += 1;
            }
            '"' => {
                let start = byte_pos;
                i += 1;
                let mut s = String::new();
                let mut closed = false;
                while i < chars.len() {
                    let (_, ch) = chars[i];
                    if ch == '\\' && i + 1 < chars.len() {
                        let (_, next) = chars[i + 1];
                        if next == '"' || next == '\\' {
                            s.push(next);
                            i += 2;
                            continue;
                        }
                    }
                    if ch == '"' {
                        closed = true;
                        i += 1;
                        break;
                    }
                    s.push(ch);
                    i += 1;
                }
                if !closed {
                    return Err((start, "unterminated quoted string".to_string()));
                }
                out.push((Token::QString(s), start));
            }
            _ => {
                let start = byte_pos;
                let mut s = String::new();
                while i < chars.len() {
                    let (_, ch) = chars[i];
                    if ch.is_whitespace() || "()[]:\"".contains(ch) {
                        break;
                    }
                    s.push(ch);
                    i += 1;
                }
                let token = match s.as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    _ => Token::Word(s),
                };
                out.push((token, start));
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_field_term_and_reserved_words() {
        let toks: Vec<Token> = lex("level:ERROR AND service:api")
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            toks,
            vec![
                Token::Word("level".into()),
                Token::Colon,
                Token::Word("ERROR".into()),
                Token::And,
                Token::Word("service".into()),
                Token::Colon,
                Token::Word("api".into()),
            ]
        );
    }

    #[test]
    fn reserved_words_are_case_sensitive() {
        let toks: Vec<Token> = lex("android").unwrap().into_iter().map(|(t, _)| t).collect();
        assert_eq!(toks, vec![Token::Word("android".into())]);
    }

    #[test]
    fn quoted_strings_support_escapes() {
        let toks = lex(r#"message:"say \"hi\"""#).unwrap();
        assert_eq!(toks[2].0, Token::QString("say \"hi\"".to_string()));
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(lex(r#"message:"oops"#).is_err());
    }

    #[test]
    fn multibyte_utf8_lexes_as_whole_characters() {
        let toks: Vec<Token> = lex(r#"message:"café""#).unwrap().into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            toks,
            vec![
                Token::Word("message".into()),
                Token::Colon,
                Token::QString("café".to_string()),
            ]
        );
    }

    #[test]
    fn range_bracket_tokens() {
        let toks: Vec<Token> = lex("status:[200 TO 299]")
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            toks,
            vec![
                Token::Word("status".into()),
                Token::Colon,
                Token::LBracket,
                Token::Word("200".into()),
                Token::Word("TO".into()),
                Token::Word("299".into()),
                Token::RBracket,
            ]
        );
    }
}
