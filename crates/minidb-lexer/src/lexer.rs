// SQL lexer for the minidb shell.
//
// Converts one statement line into a stream of tokens. Uses memchr for
// accelerated string scanning. Tracks line/column for diagnostics.

use memchr::memchr;
use tracing::debug;

use crate::token::{Span, Token, TokenKind};

/// Lexer that produces a stream of tokens from one statement line.
///
/// `next_token` never fails: unrecognized characters come back as
/// [`TokenKind::Illegal`] tokens, and calls past the end keep returning the
/// end-of-input token. The `Iterator` impl yields every token through the
/// end-of-input token once, then fuses.
pub struct Lexer<'a> {
    /// The source bytes. Classification is single-byte ASCII.
    src: &'a [u8],
    /// Current byte offset into src.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Set once the iterator has yielded the end-of-input token.
    fused: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given statement text.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            fused: false,
        }
    }

    /// Tokenize the entire input into a Vec of tokens, end-of-input
    /// token included.
    #[must_use]
    pub fn tokenize(source: &'a str) -> Vec<Token> {
        Self::new(source).collect()
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;

        if self.pos >= self.src.len() {
            return Token {
                kind: TokenKind::Eof,
                literal: String::new(),
                span: Span::new(start as u32, start as u32),
                line: start_line,
                col: start_col,
            };
        }

        let ch = self.src[self.pos];
        let (kind, literal) = match ch {
            // Single-character operators and punctuation
            b'(' => self.lex_single(TokenKind::LeftParen),
            b')' => self.lex_single(TokenKind::RightParen),
            b',' => self.lex_single(TokenKind::Comma),
            b'-' => self.lex_single(TokenKind::Minus),
            b'+' => self.lex_single(TokenKind::Plus),
            b'*' => self.lex_single(TokenKind::Star),
            b';' => self.lex_single(TokenKind::Semicolon),
            b'=' => self.lex_single(TokenKind::Eq),

            // Comparison operators with one-byte lookahead
            b'>' => self.lex_gt(),
            b'<' => self.lex_lt(),

            // String literals, either quote character
            b'\'' | b'"' => self.lex_string(ch),

            // Identifiers and keywords
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_identifier(),

            // Numbers
            b'0'..=b'9' => self.lex_number(),

            _ => {
                self.advance();
                let s = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
                (TokenKind::Illegal, s)
            }
        };

        Token {
            kind,
            literal,
            span: Span::new(start as u32, self.pos as u32),
            line: start_line,
            col: start_col,
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn advance(&mut self) -> u8 {
        let ch = self.src[self.pos];
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    /// Skip runs of space, tab, newline, and carriage return.
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Per-category tokenizers
    // -----------------------------------------------------------------------

    fn lex_single(&mut self, kind: TokenKind) -> (TokenKind, String) {
        let ch = self.advance();
        (kind, (ch as char).to_string())
    }

    /// Lex `>` or `>=`.
    fn lex_gt(&mut self) -> (TokenKind, String) {
        self.advance(); // skip >
        if self.peek() == Some(b'=') {
            self.advance();
            (TokenKind::Ge, ">=".to_owned())
        } else {
            (TokenKind::Gt, ">".to_owned())
        }
    }

    /// Lex `<` or `<=`.
    fn lex_lt(&mut self) -> (TokenKind, String) {
        self.advance(); // skip <
        if self.peek() == Some(b'=') {
            self.advance();
            (TokenKind::Le, "<=".to_owned())
        } else {
            (TokenKind::Lt, "<".to_owned())
        }
    }

    /// Lex a quoted string. Either quote character opens one; the closing
    /// quote must match it. No escape sequences. An unterminated string
    /// captures everything to end of input. Uses memchr for fast quote
    /// search.
    fn lex_string(&mut self, quote: u8) -> (TokenKind, String) {
        self.advance(); // skip opening quote
        let content_start = self.pos;

        match memchr(quote, &self.src[self.pos..]) {
            Some(offset) => {
                for _ in 0..offset {
                    self.advance();
                }
                let value =
                    String::from_utf8_lossy(&self.src[content_start..self.pos]).into_owned();
                self.advance(); // the closing quote
                (TokenKind::Str, value)
            }
            None => {
                // Unterminated: the literal runs to end of input and the
                // next call reports end-of-input.
                while self.pos < self.src.len() {
                    self.advance();
                }
                let value = String::from_utf8_lossy(&self.src[content_start..]).into_owned();
                (TokenKind::Str, value)
            }
        }
    }

    /// Lex an identifier or keyword.
    fn lex_identifier(&mut self) -> (TokenKind, String) {
        let start = self.pos;
        self.advance(); // first character already validated

        while self.pos < self.src.len() {
            let ch = self.src[self.pos];
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();

        // The keyword kind carries the canonical tag; the literal keeps the
        // case the user typed.
        if let Some(kw) = TokenKind::lookup_keyword(&text) {
            debug!(word = %text, kind = %kw, "keyword lookup");
            (kw, text)
        } else {
            (TokenKind::Id, text)
        }
    }

    /// Lex an integer literal: a run of decimal digits.
    fn lex_number(&mut self) -> (TokenKind, String) {
        let start = self.pos;
        self.advance(); // first digit already validated

        while self.pos < self.src.len() && self.src[self.pos].is_ascii_digit() {
            self.advance();
        }

        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        (TokenKind::Number, text)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.fused {
            return None;
        }
        let tok = self.next_token();
        if tok.kind == TokenKind::Eof {
            self.fused = true;
        }
        Some(tok)
    }
}
