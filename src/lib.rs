//! # Runiq - a homoiconic S-expression language
//!
//! Programs are nested lists. Text is lexed into tokens, parsed into a
//! [`Node`] tree, and reduced by an [`Interpreter`] until a single value is
//! left. Sibling lists reduce concurrently, quoting withholds data from
//! reduction, and every step is paid for out of a metered budget.
//!
//! ## Quick Start
//!
//! ```rust
//! use runiq::{Config, Node};
//!
//! # fn main() -> runiq::Result<()> {
//! let runtime = tokio::runtime::Runtime::new().expect("runtime");
//! let result = runtime.block_on(runiq::run("(+ 1 (* 2 3))", vec![], None, Config::default()))?;
//! assert_eq!(result, Node::Number(7.0));
//! # Ok(())
//! # }
//! ```
//!
//! ### Lexing and parsing
//!
//! ```rust
//! use runiq::{Parser, Scanner};
//!
//! # fn main() -> runiq::Result<()> {
//! let tokens = Scanner::new("(foo '(bar 1))").scan_tokens()?;
//! let ast = Parser::new(tokens).parse()?;
//! assert_eq!(ast.to_string(), r#"[["foo",{"'":["bar",1]}]]"#);
//! # Ok(())
//! # }
//! ```
//!
//! ## Language Overview
//!
//! - `(f a b)` invokes `f` once every list argument has reduced
//! - `'(f a b)` and `[a b]` are quoted: they stay data
//! - `((+ 1 2) (* 3 4))` reduces both children and keeps the last
//! - `(lambda a b '(+ a b) 1)` binds `a` and returns a lambda over `b`
//!
//! ## Architecture
//!
//! ```text
//! Source Code → Scanner → Tokens → Parser → Node → Interpreter → Node
//!                                               ↑
//!                                    Library (functions, types,
//!                                    constants, preprocessors)
//! ```
//!
//! ### Main Components
//!
//! - [`Scanner`] - Tokenizes source code
//! - [`Parser`] - Builds the [`Node`] tree
//! - [`Interpreter`] - Reduction engine with gas metering
//! - [`Library`] / [`LibraryTable`] - Name resolution and the standard library
//! - [`Storage`] / [`MemoryStorage`] - Key-path store for impure builtins
//! - [`Config`] - Budget, toggles and checks

#![allow(clippy::new_without_default)]

/// Version of the Runiq interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod lexer;
pub mod library;
pub mod parser;
pub mod runtime;
pub mod types;

// Re-export main types
pub use error::{Error, ErrorSeverity, ParseError, Result};
pub use lexer::{lex, SExprScanner, Token, TokenKind};
pub use library::{
    CallContext, Function, Library, LibraryTable, NativeFunction, PreprocessContext,
    Preprocessor, TypeCaster,
};
pub use parser::{parse, Node, SExprParser};
pub use runtime::{
    Config, Event, Interpreter, InterpreterState, MemoryStorage, Scope, Storage,
};
pub use types::Signature;

use std::sync::Arc;

/// Type alias for the S-expression scanner (lexer).
/// Converts raw source text into tokens for the parser.
pub type Scanner = SExprScanner;

/// Type alias for the S-expression parser.
/// Converts tokens into a [`Node`] tree.
pub type Parser = SExprParser;

/// Lexes, parses and runs `source` with the standard library
///
/// A fresh interpreter is created per call, so the budget in `config`
/// applies to this run alone.
pub async fn run(
    source: &str,
    argv: Vec<Node>,
    event: Option<Event>,
    config: Config,
) -> Result<Node> {
    config.validate()?;
    let program = parse(lex(source)?)?;
    let interpreter = Interpreter::new(Arc::new(LibraryTable::new()), config);
    interpreter.run(program, argv, event).await
}
