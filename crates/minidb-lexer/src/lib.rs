// SQL lexical front end for the minidb shell.
//
// Hand-written single-pass tokenizer. One `Lexer` is created per statement
// line and drained to the end-of-input token.

pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{Span, Token, TokenKind};
