//! Type casters
//!
//! A caster runs when a called name resolves to no function. It receives
//! every argument of the call.

use super::{arg, quoted_list};
use crate::error::Result;
use crate::library::LibraryTable;
use crate::parser::Node;
use std::collections::BTreeMap;

/// Register type casters
pub fn register(library: &mut LibraryTable) {
    library
        .define_type("number", |args: &[Node]| -> Result<Node> {
            Ok(Node::Number(arg(args, 0).to_number()))
        })
        .define_type("string", |args: &[Node]| -> Result<Node> {
            Ok(Node::String(arg(args, 0).to_text()))
        })
        .define_type("bool", |args: &[Node]| -> Result<Node> {
            Ok(Node::Bool(arg(args, 0).truthy()))
        })
        .define_type("null", |_: &[Node]| -> Result<Node> { Ok(Node::Null) })
        .define_type("list", |args: &[Node]| -> Result<Node> {
            Ok(quoted_list(args.to_vec()))
        })
        .define_type("hash", |args: &[Node]| -> Result<Node> { Ok(hashize(args)) })
        .alias_type("#", "hash")
        .define_type("entity", |args: &[Node]| -> Result<Node> {
            Ok(arg(args, 0).clone())
        });
}

/// Pairs up alternating keys and values; a trailing key maps to null
pub fn hashize(args: &[Node]) -> Node {
    let map: BTreeMap<String, Node> = args
        .chunks(2)
        .map(|pair| (pair[0].to_text(), arg(pair, 1).clone()))
        .collect();
    Node::Map(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hashize_pairs() {
        let args = [Node::from("a"), Node::Number(1.0), Node::from("b")];
        assert_eq!(hashize(&args), Node::from(json!({"a": 1, "b": null})));
    }
}
