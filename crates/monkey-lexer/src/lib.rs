//! Context-sensitive lexer for Monkey.
//!
//! Lexing is a pure function of the source text, an offset and the set of
//! terminals the parser can currently accept. The valid set only affects
//! the keyword/identifier split: a reserved word lexes as a keyword when
//! that keyword is acceptable, and as an identifier otherwise. Everything
//! else is context free, which keeps incremental re-lexing trivial.

mod cursor;

use cursor::Cursor;
use monkey_syntax::SyntaxKind::{self, *};
use monkey_syntax::{GreenToken, SyntaxSet};
use text_size::TextSize;

/// One lexed token. `text_len` spans the leading trivia and the token
/// text together; `leading_len` is the trivia prefix alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub leading_len: TextSize,
    pub text_len: TextSize,
}

impl Token {
    pub fn green(self) -> GreenToken {
        GreenToken::new(self.kind, self.leading_len, self.text_len)
    }
}

pub struct Lexer<'text> {
    text: &'text str,
}

impl<'text> Lexer<'text> {
    pub fn new(text: &'text str) -> Self {
        Self { text }
    }

    /// Lexes the token starting at `offset`, trivia included. At the end
    /// of input this returns a zero-width `EOF` token carrying whatever
    /// trailing trivia remains, so consecutive calls always make the
    /// token stream cover the whole text.
    pub fn token_at(&self, offset: TextSize, valid: SyntaxSet) -> Token {
        let tail = &self.text[usize::from(offset)..];
        let mut cursor = Cursor::new(tail);

        cursor.advance_while(|c| c.is_ascii_whitespace());
        let leading_len = cursor.pos_within_token();

        if cursor.len() == TextSize::new(0) {
            return Token { kind: EOF, leading_len, text_len: leading_len };
        }

        let kind = match cursor.advance() {
            '(' => L_PAREN,
            ')' => R_PAREN,
            '[' => L_BRACKET,
            ']' => R_BRACKET,
            '{' => L_BRACE,
            '}' => R_BRACE,
            ',' => COMMA,
            ';' => SEMICOLON,
            ':' => COLON,
            '+' => PLUS,
            '-' => MINUS,
            '*' => STAR,
            '/' => SLASH,
            '<' => LT,
            '>' => GT,
            '=' => {
                if cursor.peek() == '=' {
                    cursor.advance();
                    EQ_EQ
                } else {
                    EQ
                }
            }
            '!' => {
                if cursor.peek() == '=' {
                    cursor.advance();
                    NOT_EQ
                } else {
                    BANG
                }
            }
            '0'..='9' => {
                cursor.advance_while(|c| c.is_ascii_digit());
                INT
            }
            'A'..='Z' | 'a'..='z' | '_' => {
                cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');

                let start = usize::from(offset + leading_len);
                let end = usize::from(offset + cursor.pos_within_token());
                word_kind(&self.text[start..end], valid)
            }
            '"' => string(&mut cursor),
            _ => ERROR_TOKEN,
        };

        Token { kind, leading_len, text_len: cursor.pos_within_token() }
    }
}

/// Reserved words lex as keywords only in positions where the parser
/// can take them; elsewhere they degrade to identifiers, so `let` stays
/// usable as, say, a hash key without confusing recovery.
fn word_kind(word: &str, valid: SyntaxSet) -> SyntaxKind {
    match SyntaxKind::from_keyword(word) {
        Some(keyword) => {
            if valid.contains(keyword) || !valid.contains(IDENT) {
                keyword
            } else {
                IDENT
            }
        }
        None => IDENT,
    }
}

/// `"`-delimited, no escapes. An unterminated string lexes as an error
/// token running to the end of the line.
fn string(cursor: &mut Cursor<'_>) -> SyntaxKind {
    cursor.advance_while(|c| c != '"' && c != '\n');
    if cursor.peek() == '"' {
        cursor.advance();
        STRING
    } else {
        ERROR_TOKEN
    }
}
