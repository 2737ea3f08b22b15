use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Token text; string tokens keep their quotes but have `\"` unescaped,
    /// identifiers drop a trailing keyword marker
    pub lexeme: String,
    /// Line number where token appears (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
    /// Identifier carried a trailing `:` marker (reserved for keyword arguments)
    #[serde(default)]
    pub keyword: bool,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme,
            line,
            column,
            keyword: false,
        }
    }
}

/// All token types emitted by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    Open,
    /// `)`
    Close,
    /// `'(`
    QuoteOpen,
    /// `[`
    OpenArray,
    /// `]`
    CloseArray,

    // Atoms
    /// Operator or bare word
    Identifier,
    /// Numeric literal, including `0b`/`0o`/`0x` forms
    Number,
    /// Number with a unit suffix such as `10px` (kept as text)
    SuffixedNumber,
    /// Double-quoted string
    String,
    /// Back-tick delimited inline JSON
    Json,
}

impl TokenKind {
    /// Whether this token opens a list frame
    pub fn is_open(self) -> bool {
        matches!(self, TokenKind::Open | TokenKind::QuoteOpen | TokenKind::OpenArray)
    }

    /// Whether this token closes a list frame
    pub fn is_close(self) -> bool {
        matches!(self, TokenKind::Close | TokenKind::CloseArray)
    }
}
