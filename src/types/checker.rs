//! Declared input signatures and the runtime arity check

use crate::error::{Error, Result};
use crate::parser::Node;
use serde::{Deserialize, Serialize};

/// Trailing marker that makes a positional signature variadic
pub const REST_MARKER: &str = "...";

/// Declared inputs of a function
///
/// Type tags are descriptive; only the argument count is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Signature {
    /// Any number of arguments of any type
    Any,
    /// No arguments allowed
    Nothing,
    /// Positional type tags, optionally followed by the rest marker
    Positional {
        /// Tag per position (`number`, `list`, `string`, ...)
        types: Vec<String>,
        /// Extra arguments allowed after the tagged ones
        rest: bool,
    },
}

impl Signature {
    /// Builds a positional signature; a trailing `...` tag makes it variadic
    pub fn positional(tags: &[&str]) -> Self {
        let rest = tags.last() == Some(&REST_MARKER);
        let types = tags
            .iter()
            .take(tags.len() - usize::from(rest))
            .map(|t| t.to_string())
            .collect();
        Signature::Positional { types, rest }
    }

    /// Number of required positions, if fixed
    pub fn arity(&self) -> Option<usize> {
        match self {
            Signature::Any => None,
            Signature::Nothing => Some(0),
            Signature::Positional { rest: true, .. } => None,
            Signature::Positional { types, .. } => Some(types.len()),
        }
    }
}

/// Checks `args` against the declared signature of `name`
///
/// A missing signature is unchecked.
pub fn check_arity(name: &str, signature: Option<&Signature>, args: &[Node]) -> Result<()> {
    match signature {
        None | Some(Signature::Any) => Ok(()),
        Some(Signature::Nothing) if !args.is_empty() => Err(Error::signature(
            name,
            format!("`{}` doesn't permit any arguments!", name),
        )),
        Some(Signature::Nothing) => Ok(()),
        Some(Signature::Positional { rest: true, .. }) => Ok(()),
        Some(Signature::Positional { types, .. }) if types.len() != args.len() => {
            Err(Error::signature(
                name,
                format!(
                    "`{}` expected {} argument(s) ({}) but got {}",
                    name,
                    types.len(),
                    types.join(", "),
                    args.len()
                ),
            ))
        }
        Some(Signature::Positional { .. }) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_rest_marker() {
        let sig = Signature::positional(&["string", "..."]);
        assert_eq!(sig.arity(), None);
        assert!(check_arity("let", Some(&sig), &[]).is_ok());
    }

    #[test]
    fn test_exact_arity() {
        let sig = Signature::positional(&["number", "number"]);
        let args = [Node::Number(1.0), Node::Number(2.0), Node::Number(3.0)];
        assert!(check_arity("+", Some(&sig), &args[..2]).is_ok());
        let err = check_arity("+", Some(&sig), &args).unwrap_err();
        assert!(matches!(err, Error::Signature { ref name, .. } if name == "+"));
    }

    #[test]
    fn test_nothing_and_any() {
        let one = [Node::Null];
        assert!(check_arity("argv", Some(&Signature::Nothing), &one).is_err());
        assert!(check_arity("argv", Some(&Signature::Nothing), &[]).is_ok());
        assert!(check_arity("list", Some(&Signature::Any), &one).is_ok());
        assert!(check_arity("free", None, &one).is_ok());
    }
}
