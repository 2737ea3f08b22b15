use super::token::{Token, TokenKind};
use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;

/// Lexical rules, tried in order against the unconsumed input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Open,
    Close,
    QuoteOpen,
    Whitespace,
    Comment,
    Number,
    String,
    Json,
    Identifier,
    OpenArray,
    CloseArray,
}

const IDENT_START: &str = r"$A-Za-z_\~!@\#%\^\&*\-=+/|:'<,>.?\x{7F}-\x{FFFF}";
const IDENT_CONTINUE: &str = r"$\w\~!@\#%\^\&*\-=+/|:'<,>.?\x{7F}-\x{FFFF}";

lazy_static! {
    static ref RULES: Vec<(Rule, Regex)> = {
        let identifier = format!("^[{}][{}]*", IDENT_START, IDENT_CONTINUE);
        [
            (Rule::Open, r"^\("),
            (Rule::Close, r"^\)"),
            (Rule::QuoteOpen, r"^'\("),
            (Rule::Whitespace, r"^\s+"),
            (Rule::Comment, r"^;(?:[^;][\s\S]*?)?;"),
            (
                Rule::Number,
                r"(?i)^(?:0b[01]+|0o[0-7]+|0x[0-9a-f]+|-?\d*\.?\d+(?:e[+-]?\d+)?)([a-z%]+)?",
            ),
            (Rule::String, r#"^"[^\\"]*(?:\\[\s\S][^\\"]*)*""#),
            (Rule::Json, r"^`(?:[^`][\s\S]*?)?`"),
            (Rule::Identifier, identifier.as_str()),
            (Rule::OpenArray, r"^\["),
            (Rule::CloseArray, r"^\]"),
        ]
        .into_iter()
        .map(|(rule, pattern)| (rule, Regex::new(pattern).expect("lexer rule must compile")))
        .collect()
    };
}

/// Scanner for Runiq S-expression source
pub struct SExprScanner {
    /// Cleaned source text
    source: String,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Byte offset of the unconsumed input
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
}

impl SExprScanner {
    /// Creates a new scanner; the source is cleaned up front
    pub fn new(source: &str) -> Self {
        SExprScanner {
            source: clean(source),
            tokens: Vec::new(),
            current: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scans all tokens from source code and returns them as a vector
    ///
    /// Whitespace and comments are consumed but never emitted.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        // Every iteration consumes at least one character, so the input
        // length bounds the loop; anything beyond that is a stuck cursor.
        let limit = self.source.chars().count();
        let mut iterations = 0usize;

        while !self.is_at_end() {
            if iterations > limit || !self.scan_token() {
                return Err(self.lex_error());
            }
            iterations += 1;
        }

        Ok(std::mem::take(&mut self.tokens))
    }

    /// Tries each rule in order; returns false if none matched
    fn scan_token(&mut self) -> bool {
        let rest = &self.source[self.current..];

        let Some((rule, matched, suffixed)) = RULES.iter().find_map(|(rule, regex)| {
            regex.captures(rest).and_then(|caps| {
                let whole = caps.get(0)?;
                (!whole.as_str().is_empty()).then(|| (*rule, whole.as_str(), caps.get(1).is_some()))
            })
        }) else {
            return false;
        };

        let matched = matched.to_string();
        let (line, column) = (self.line, self.column);
        let mut consumed = matched.len();

        let token = match rule {
            Rule::Whitespace | Rule::Comment => None,
            Rule::Open => Some(Token::new(TokenKind::Open, matched.clone(), line, column)),
            Rule::Close => Some(Token::new(TokenKind::Close, matched.clone(), line, column)),
            Rule::QuoteOpen => Some(Token::new(TokenKind::QuoteOpen, matched.clone(), line, column)),
            Rule::OpenArray => Some(Token::new(TokenKind::OpenArray, matched.clone(), line, column)),
            Rule::CloseArray => Some(Token::new(TokenKind::CloseArray, matched.clone(), line, column)),
            Rule::Number if suffixed => Some(Token::new(
                TokenKind::SuffixedNumber,
                matched.clone(),
                line,
                column,
            )),
            Rule::Number => Some(Token::new(TokenKind::Number, matched.clone(), line, column)),
            Rule::String => Some(Token::new(
                TokenKind::String,
                matched.replace("\\\"", "\""),
                line,
                column,
            )),
            Rule::Json => Some(Token::new(TokenKind::Json, matched.clone(), line, column)),
            Rule::Identifier => {
                let mut token = Token::new(TokenKind::Identifier, matched.clone(), line, column);
                if let Some(marker) = keyword_marker(&rest[consumed..]) {
                    token.keyword = true;
                    consumed += marker;
                }
                Some(token)
            }
        };

        if let Some(token) = token {
            self.tokens.push(token);
        }
        self.advance(consumed);
        true
    }

    /// Moves the cursor forward, keeping line and column in step
    fn advance(&mut self, bytes: usize) {
        let end = self.current + bytes;
        for c in self.source[self.current..end].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.current = end;
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn lex_error(&self) -> Error {
        let snippet: String = self.source[self.current..].chars().take(24).collect();
        tracing::error!(line = self.line, column = self.column, "lexer failed near `{}`", snippet);
        Error::Lex {
            line: self.line,
            column: self.column,
            snippet,
        }
    }
}

/// Strips a byte-order mark and carriage returns, and trims trailing whitespace
fn clean(source: &str) -> String {
    let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);
    source.replace('\r', "").trim_end().to_string()
}

/// Length of a `:` keyword marker (optionally preceded by horizontal
/// whitespace) at the start of `rest`; a `::` pair is not a marker
fn keyword_marker(rest: &str) -> Option<usize> {
    let spaces = rest
        .char_indices()
        .find(|(_, c)| *c == '\n' || !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let after = &rest[spaces..];
    if after.starts_with(':') && !after.starts_with("::") {
        Some(spaces + 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        SExprScanner::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(
            kinds("( ) '( [ ]"),
            vec![
                TokenKind::Open,
                TokenKind::Close,
                TokenKind::QuoteOpen,
                TokenKind::OpenArray,
                TokenKind::CloseArray
            ]
        );
    }

    #[test]
    fn test_numbers_and_suffixes() {
        let tokens = SExprScanner::new("0b101 0o17 0xFF -3.5 1e3 10px 100%").scan_tokens().unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::SuffixedNumber,
                TokenKind::SuffixedNumber
            ]
        );
        assert_eq!(tokens[5].lexeme, "10px");
    }

    #[test]
    fn test_comments_and_whitespace_are_dropped() {
        assert_eq!(
            kinds("(foo ;a comment; bar)\n;;"),
            vec![
                TokenKind::Open,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Close
            ]
        );
    }

    #[test]
    fn test_string_unescapes_quotes() {
        let tokens = SExprScanner::new(r#""say \"hi\"""#).scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, r#""say "hi"""#);
    }

    #[test]
    fn test_operators_are_identifiers() {
        let tokens = SExprScanner::new("+ - <= != |> -baz").scan_tokens().unwrap();
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Identifier));
        assert_eq!(tokens[5].lexeme, "-baz");
    }

    #[test]
    fn test_keyword_marker() {
        let tokens = SExprScanner::new("(key : 1)").scan_tokens().unwrap();
        assert_eq!(tokens[1].lexeme, "key");
        assert!(tokens[1].keyword);
        assert_eq!(tokens[2].kind, TokenKind::Number);
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = SExprScanner::new("(a\n  b)").scan_tokens().unwrap();
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
    }

    #[test]
    fn test_bom_and_carriage_returns() {
        assert_eq!(kinds("\u{FEFF}(a)\r\n  "), vec![TokenKind::Open, TokenKind::Identifier, TokenKind::Close]);
    }

    #[test]
    fn test_unmatched_input_fails() {
        let err = SExprScanner::new("(foo {bar})").scan_tokens().unwrap_err();
        assert!(matches!(err, Error::Lex { line: 1, column: 6, .. }));
    }
}
