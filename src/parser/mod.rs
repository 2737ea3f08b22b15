//! Runiq Parser Module
//!
//! Parses token streams into the [`Node`] tree shared by programs and values.

mod ast;
mod sexpr_parser;

pub use ast::{
    format_number, head_name, is_call_ready, is_invocable, render_list, Node, QUOTE_KEY,
};
pub use sexpr_parser::SExprParser;

use crate::error::Result;
use crate::lexer::Token;

/// Parses tokens in one call
pub fn parse(tokens: Vec<Token>) -> Result<Node> {
    SExprParser::new(tokens).parse()
}
