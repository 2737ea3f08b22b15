use super::ast::Node;
use crate::error::{ParseError, Result};
use crate::lexer::{Token, TokenKind};

/// An open list under construction
struct Frame {
    items: Vec<Node>,
    quoted: bool,
}

impl Frame {
    fn new(quoted: bool) -> Self {
        Frame {
            items: Vec::new(),
            quoted,
        }
    }

    fn close(self) -> Node {
        let list = Node::List(self.items);
        if self.quoted {
            Node::quote(list)
        } else {
            list
        }
    }
}

/// Parser for Runiq token streams
pub struct SExprParser {
    tokens: Vec<Token>,
}

impl SExprParser {
    /// Creates a new parser from a token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        SExprParser { tokens }
    }

    /// Parses the tokens into a list of top-level forms
    ///
    /// The result is canonicalized, so structurally identical sources
    /// produce equal trees.
    pub fn parse(&mut self) -> Result<Node> {
        let mut stack = vec![Frame::new(false)];
        let mut opened = 0usize;
        let mut closed = 0usize;

        for token in std::mem::take(&mut self.tokens) {
            let kind = token.kind;

            if kind.is_open() {
                opened += 1;
                stack.push(Frame::new(kind != TokenKind::Open));
                continue;
            }

            if kind.is_close() {
                closed += 1;
                if stack.len() < 2 {
                    return Err(ParseError::MismatchedClose {
                        found: closed,
                        expected: opened,
                    }
                    .into());
                }
                let node = stack.pop().map(Frame::close).unwrap_or_default();
                if let Some(parent) = stack.last_mut() {
                    parent.items.push(node);
                }
                continue;
            }

            let atom = atom(token)?;
            if let Some(current) = stack.last_mut() {
                current.items.push(atom);
            }
        }

        if opened > closed {
            return Err(ParseError::MismatchedOpen {
                found: closed,
                expected: opened,
            }
            .into());
        }

        let root = stack.pop().map(|frame| Node::List(frame.items)).unwrap_or_default();
        Ok(root.canonicalize())
    }
}

/// Converts a non-delimiter token into a leaf node
fn atom(token: Token) -> Result<Node> {
    match token.kind {
        TokenKind::Number => parse_number(&token).map(Node::Number),
        TokenKind::String => Ok(Node::String(strip_delimiters(&token.lexeme))),
        TokenKind::Json => {
            let body = strip_delimiters(&token.lexeme);
            serde_json::from_str::<serde_json::Value>(&body)
                .map(Node::from_json)
                .map_err(|e| {
                    ParseError::InvalidInlineJson {
                        line: token.line,
                        column: token.column,
                        message: e.to_string(),
                    }
                    .into()
                })
        }
        _ => Ok(Node::String(token.lexeme)),
    }
}

/// Drops the first and last character (quotes or back-ticks)
fn strip_delimiters(lexeme: &str) -> String {
    let mut chars = lexeme.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

fn parse_number(token: &Token) -> Result<f64> {
    let text = token.lexeme.to_ascii_lowercase();
    let radix = [("0b", 2u32), ("0o", 8), ("0x", 16)]
        .into_iter()
        .find_map(|(prefix, radix)| text.strip_prefix(prefix).map(|digits| (digits, radix)));

    let parsed = match radix {
        // Accumulate in f64 so long literals degrade in precision instead of failing
        Some((digits, radix)) => digits
            .chars()
            .map(|c| c.to_digit(radix))
            .try_fold(0f64, |acc, d| d.map(|d| acc * radix as f64 + d as f64)),
        None => text.parse::<f64>().ok(),
    };

    parsed.ok_or_else(|| {
        ParseError::InvalidNumber {
            literal: token.lexeme.clone(),
            line: token.line,
            column: token.column,
        }
        .into()
    })
}
