//! String, base64, regular expression and URI functions

use super::{arg, quoted_list, str_arg};
use crate::error::{Error, Result};
use crate::library::LibraryTable;
use crate::parser::Node;
use crate::types::Signature;
use base64::{engine::general_purpose, Engine as _};
use regex::Regex;

fn text(op: fn(&str) -> String) -> impl Fn(&crate::library::CallContext<'_>, Vec<Node>) -> Result<Node> {
    move |_, args| Ok(Node::String(op(&arg(&args, 0).to_text())))
}

/// Register string functions
pub fn register(library: &mut LibraryTable) {
    let one = || Signature::positional(&["string"]);
    library
        .define_fn("str.concat", Signature::Any, |_, args| {
            Ok(Node::String(args.iter().map(Node::to_text).collect()))
        })
        .define_fn("str.uppercase", one(), text(str::to_uppercase))
        .define_fn("str.lowercase", one(), text(str::to_lowercase))
        .define_fn("str.trim", one(), text(|s| s.trim().to_string()))
        .define_fn("str.capitalize", one(), text(capitalize))
        .define_fn("str.length", one(), |_, args| {
            Ok(Node::Number(arg(&args, 0).to_text().chars().count() as f64))
        })
        .define_fn("str.split", Signature::positional(&["string", "string"]), |_, args| {
            let source = arg(&args, 0).to_text();
            let separator = arg(&args, 1).to_text();
            let parts: Vec<Node> = if separator.is_empty() {
                source.chars().map(|c| Node::String(c.to_string())).collect()
            } else {
                source.split(separator.as_str()).map(Node::from).collect()
            };
            Ok(quoted_list(parts))
        })
        .define_fn("str.encode64", one(), |_, args| {
            Ok(Node::String(general_purpose::STANDARD.encode(arg(&args, 0).to_text())))
        })
        .define_fn("str.decode64", one(), |_, args| {
            let bytes = general_purpose::STANDARD
                .decode(str_arg(&args, 0)?)
                .map_err(|e| invalid("base64 text", e))?;
            String::from_utf8(bytes)
                .map(Node::String)
                .map_err(|e| invalid("UTF-8 text", e))
        })
        .define_fn("regexp.exec", Signature::positional(&["string", "string"]), |_, args| {
            let pattern = Regex::new(str_arg(&args, 0)?).map_err(|e| invalid("regular expression", e))?;
            Ok(pattern
                .find(&arg(&args, 1).to_text())
                .map_or(Node::Null, |found| Node::Number(found.start() as f64)))
        })
        .define_fn("regexp.test", Signature::positional(&["string", "string"]), |_, args| {
            let pattern = Regex::new(str_arg(&args, 0)?).map_err(|e| invalid("regular expression", e))?;
            Ok(Node::Bool(pattern.is_match(&arg(&args, 1).to_text())))
        })
        .define_fn("uri.host", one(), |_, args| {
            let parsed = url::Url::parse(str_arg(&args, 0)?).map_err(|e| invalid("URL", e))?;
            Ok(parsed.host_str().map_or(Node::Null, Node::from))
        });
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn invalid(expected: &str, error: impl std::fmt::Display) -> Error {
    Error::TypeError {
        expected: expected.to_string(),
        got: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hello"), "Hello");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("élan"), "Élan");
    }
}
