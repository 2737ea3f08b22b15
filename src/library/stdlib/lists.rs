//! List functions
//!
//! Higher-order functions (`list.map`, `list.filter`, ...) cannot call a
//! lambda directly. They emit a finalizer list holding one `call` per
//! element plus the original elements; once every call has reduced, the
//! finalizer combines the results.

use super::{arg, list_arg, quoted_list};
use crate::error::Result;
use crate::library::LibraryTable;
use crate::parser::Node;
use crate::types::Signature;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// How a finalizer combines originals with the per-element results
type Combine = fn(Vec<Node>, Vec<Node>) -> Node;

/// Register list functions
pub fn register(library: &mut LibraryTable) {
    let one = || Signature::positional(&["list"]);
    library
        .define_fn("list.length", one(), |_, args| {
            Ok(Node::Number(list_arg(&args, 0)?.len() as f64))
        })
        .define_fn("list.first", one(), |_, args| {
            Ok(element(list_arg(&args, 0)?.first()))
        })
        .define_fn("list.last", one(), |_, args| {
            Ok(element(list_arg(&args, 0)?.last()))
        })
        .define_fn("list.nth", Signature::positional(&["list", "number"]), |_, args| {
            let items = list_arg(&args, 0)?;
            let index = arg(&args, 1).to_number();
            let item = (index >= 0.0 && index.fract() == 0.0)
                .then(|| items.get(index as usize))
                .flatten();
            Ok(element(item))
        })
        .define_fn("list.concat", Signature::positional(&["list", "..."]), |_, args| {
            let mut joined = Vec::new();
            for index in 0..args.len() {
                joined.extend_from_slice(list_arg(&args, index)?);
            }
            Ok(quoted_list(joined))
        })
        .define_fn("list.reverse", one(), |_, args| {
            let mut items = list_arg(&args, 0)?.to_vec();
            items.reverse();
            Ok(quoted_list(items))
        })
        .define_fn("list.reduce", Signature::positional(&["list", "list", "*"]), |_, args| {
            reduce(list_arg(&args, 0)?, list_arg(&args, 1)?, arg(&args, 2))
        });

    mapper(library, "list.map", |_, results| quoted_list(results));
    mapper(library, "list.filter", |originals, results| {
        quoted_list(select(originals, &results, true))
    });
    mapper(library, "list.reject", |originals, results| {
        quoted_list(select(originals, &results, false))
    });
    mapper(library, "list.every", |_, results| {
        Node::Bool(results.iter().all(Node::truthy))
    });
    mapper(library, "list.some", |_, results| {
        Node::Bool(results.iter().any(Node::truthy))
    });
    mapper(library, "list.find", |originals, results| {
        match results.iter().position(Node::truthy) {
            Some(index) => element(originals.get(index)),
            None => Node::Null,
        }
    });
    mapper(library, "list.find-index", |_, results| {
        let index = results.iter().position(Node::truthy);
        Node::Number(index.map_or(-1.0, |i| i as f64))
    });
    mapper(library, "list.find-last", |originals, results| {
        match results.iter().rposition(Node::truthy) {
            Some(index) => element(originals.get(index)),
            None => Node::Null,
        }
    });
    mapper(library, "list.partition", |originals, results| {
        let kept = select(originals.clone(), &results, true);
        let rejected = select(originals, &results, false);
        quoted_list(vec![Node::List(kept), Node::List(rejected)])
    });
    mapper(library, "list.group-by", |originals, results| {
        let mut groups: BTreeMap<String, Node> = BTreeMap::new();
        for (original, key) in originals.into_iter().zip(&results) {
            if let Node::List(members) = groups
                .entry(key.to_text())
                .or_insert_with(|| Node::List(Vec::new()))
            {
                members.push(original);
            }
        }
        Node::Map(groups)
    });
    mapper(library, "list.sort-by", |originals, results| {
        let mut keyed: Vec<(Node, Node)> = results.into_iter().zip(originals).collect();
        keyed.sort_by(|(a, _), (b, _)| order(a, b));
        quoted_list(keyed.into_iter().map(|(_, original)| original).collect())
    });
}

/// `(list.reduce items fn init)`: nests one `call` per element around the
/// accumulator, so each call waits for the previous one
fn reduce(items: &[Node], function: &[Node], init: &Node) -> Result<Node> {
    let function = quoted_list(function.to_vec());
    let seed = match init {
        Node::List(_) => Node::quote(init.clone()),
        other => other.clone(),
    };
    if items.is_empty() {
        return Ok(seed);
    }
    Ok(items.iter().fold(seed, |accumulator, item| {
        Node::List(vec![
            Node::from("call"),
            function.clone(),
            accumulator,
            element(Some(item)),
        ])
    }))
}

/// Sort key order: numbers numerically, strings lexically, otherwise by text
fn order(a: &Node, b: &Node) -> Ordering {
    match (a, b) {
        (Node::Number(x), Node::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Node::String(x), Node::String(y)) => x.cmp(y),
        _ => a.to_text().cmp(&b.to_text()),
    }
}

/// Registers `name` and its finalizer `_name-finalize`
fn mapper(library: &mut LibraryTable, name: &str, combine: Combine) {
    let finalizer = format!("_{}-finalize", name);
    let emitted = finalizer.clone();

    library.define_fn(name, Signature::positional(&["list", "list"]), move |_, args| {
        let items = list_arg(&args, 0)?;
        let function = list_arg(&args, 1)?;

        let mut afterward = Vec::with_capacity(items.len() + 2);
        afterward.push(Node::from(emitted.as_str()));
        for item in items {
            afterward.push(Node::List(vec![
                Node::from("call"),
                quoted_list(function.to_vec()),
                item.clone(),
            ]));
        }
        afterward.push(quoted_list(items.to_vec()));
        Ok(Node::List(afterward))
    });

    library.define_fn(&finalizer, Signature::positional(&["list", "..."]), move |_, mut args| {
        let originals = match args.pop() {
            Some(Node::List(items)) => items,
            _ => Vec::new(),
        };
        Ok(combine(originals, args))
    });
}

fn select(originals: Vec<Node>, results: &[Node], keep: bool) -> Vec<Node> {
    originals
        .into_iter()
        .zip(results)
        .filter(|(_, result)| result.truthy() == keep)
        .map(|(original, _)| original)
        .collect()
}

/// List elements come back quoted so they are not reduced as programs
fn element(item: Option<&Node>) -> Node {
    match item {
        Some(node) if node.is_list() => Node::quote(node.clone()),
        Some(node) => node.clone(),
        None => Node::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select() {
        let originals = vec![Node::Number(1.0), Node::Number(2.0), Node::Number(3.0)];
        let results = vec![Node::Bool(false), Node::Bool(true), Node::Number(1.0)];
        assert_eq!(
            select(originals.clone(), &results, true),
            vec![Node::Number(2.0), Node::Number(3.0)]
        );
        assert_eq!(select(originals, &results, false), vec![Node::Number(1.0)]);
    }

    #[test]
    fn test_reduce_nests_calls() {
        let function = vec![Node::from("f")];
        let items = vec![Node::Number(1.0), Node::from(json!([2]))];
        assert_eq!(
            reduce(&items, &function, &Node::Number(0.0)).unwrap(),
            Node::from(json!([
                "call", {"'": ["f"]},
                ["call", {"'": ["f"]}, 0, 1],
                {"'": [2]}
            ]))
        );
        assert_eq!(
            reduce(&[], &function, &Node::from(json!([1]))).unwrap(),
            Node::from(json!({"'": [1]}))
        );
    }

    #[test]
    fn test_sort_key_order() {
        assert_eq!(order(&Node::Number(2.0), &Node::Number(10.0)), Ordering::Less);
        assert_eq!(order(&Node::from("b"), &Node::from("a")), Ordering::Greater);
        assert_eq!(order(&Node::Number(f64::NAN), &Node::Number(1.0)), Ordering::Equal);
    }

    #[test]
    fn test_element_quotes_lists() {
        let list = Node::from(json!([1, 2]));
        assert_eq!(element(Some(&list)), Node::quote(list.clone()));
        assert_eq!(element(None), Node::Null);
    }
}
