//! Error types for the Runiq lexer, parser and interpreter

use crate::parser::Node;
use thiserror::Error;

/// Runiq errors
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Remaining input matched no lexical rule
    ///
    /// **Triggered by:** Characters outside every token class, unterminated strings or comments
    /// **Example:** `(foo {bar})` (braces are not part of the syntax)
    #[error("Lex error at line {line}, column {column}: unexpected input near `{snippet}`")]
    Lex {
        /// Line number where lexing stopped
        line: usize,
        /// Column number where lexing stopped
        column: usize,
        /// Start of the input that could not be tokenized
        snippet: String,
    },

    /// Structural parse failure
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The program handed to the interpreter was absent
    #[error("Bad input: cannot evaluate an empty program")]
    BadInput,

    /// Balance exhausted or deadline passed
    ///
    /// **Triggered by:** Any quote, invocation or sequence once the budget is spent
    /// **Prevention:** Raise `balance` / `timeout_ms` in [`crate::Config`]
    #[error("Out of gas while reducing {node}")]
    OutOfGas {
        /// The list being reduced when the budget ran out
        node: Box<Node>,
    },

    /// Argument count mismatch against a declared signature
    ///
    /// **Example:** `(+ 1 2 3)` when `+` declares two numeric inputs
    #[error("Signature error in `{name}`: {message}")]
    Signature {
        /// Function name
        name: String,
        /// What went wrong
        message: String,
    },

    /// Impure function rejected by configuration
    #[error("Impure function `{name}` is not allowed")]
    Impurity {
        /// Function name
        name: String,
    },

    /// Malformed higher-level construct (binding forms, lambdas, preprocessor forms)
    #[error("Missing definition: {0}")]
    MissingDefinition(String),

    /// Value of the wrong shape handed to a builtin
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected type
        expected: String,
        /// Actual type
        got: String,
    },

    /// Raised explicitly by a program
    #[error("{message}")]
    Thrown {
        /// Message supplied by the program
        message: String,
    },

    /// Assertion failed
    ///
    /// **Example:** `(assert false "boom")`
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Assertion failure message
        message: String,
    },

    /// Invalid interpreter configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Delimiter and literal errors raised by the parser
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// More lists were opened than closed
    #[error("Missing closing parentheses! Found {found} parentheses, but expected {expected}")]
    MismatchedOpen {
        /// Close delimiters seen
        found: usize,
        /// Open delimiters seen
        expected: usize,
    },

    /// A close delimiter had nothing to close
    #[error("Too many closing parentheses! Found {found} parentheses, but expected {expected}")]
    MismatchedClose {
        /// Close delimiters seen, including the offending one
        found: usize,
        /// Open delimiters seen
        expected: usize,
    },

    /// Back-tick literal is not valid JSON
    #[error("Invalid JSON at line {line}, character {column}: {message}")]
    InvalidInlineJson {
        /// Line of the literal
        line: usize,
        /// Column of the literal
        column: usize,
        /// Decoder message
        message: String,
    },

    /// Number token that does not parse as a number
    #[error("Invalid number `{literal}` at line {line}, character {column}")]
    InvalidNumber {
        /// Raw token text
        literal: String,
        /// Line of the token
        line: usize,
        /// Column of the token
        column: usize,
    },
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Fatal error that cannot be recovered from
    Fatal,
    /// Recoverable error that may be retried
    Recoverable,
    /// Warning that doesn't prevent execution
    Warning,
}

impl Error {
    /// Create a type error from an expected type name and the offending node
    pub fn type_error(expected: impl Into<String>, got: &Node) -> Self {
        Error::TypeError {
            expected: expected.into(),
            got: got.type_name().to_string(),
        }
    }

    /// Create a signature error
    pub fn signature(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Signature {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::Lex { .. } => ErrorSeverity::Fatal,
            Error::Parse(_) => ErrorSeverity::Fatal,
            Error::BadInput => ErrorSeverity::Fatal,
            Error::Config(_) => ErrorSeverity::Fatal,
            Error::AssertionFailed { .. } => ErrorSeverity::Fatal,

            // A fresh budget lets the same program run again
            Error::OutOfGas { .. } => ErrorSeverity::Recoverable,
            Error::Impurity { .. } => ErrorSeverity::Recoverable,
            Error::Thrown { .. } => ErrorSeverity::Recoverable,

            Error::TypeError { .. } => ErrorSeverity::Warning,

            _ => ErrorSeverity::Recoverable,
        }
    }
}

/// Result type for Runiq operations
pub type Result<T> = std::result::Result<T, Error>;
