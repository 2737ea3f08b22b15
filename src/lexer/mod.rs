//! Lexical analysis for Runiq
//!
//! Converts source text into a flat stream of tokens using ordered,
//! anchored regular-expression rules.

mod sexpr_scanner;
mod token;

pub use sexpr_scanner::SExprScanner;
pub use token::{Token, TokenKind};

use crate::error::Result;

/// Tokenizes `source` in one call
pub fn lex(source: &str) -> Result<Vec<Token>> {
    SExprScanner::new(source).scan_tokens()
}
