//! Hash (map) functions

use super::{arg, quoted_list, str_arg};
use crate::error::{Error, Result};
use crate::library::LibraryTable;
use crate::parser::Node;
use crate::types::Signature;
use std::collections::BTreeMap;

fn map_arg(args: &[Node], index: usize) -> Result<&BTreeMap<String, Node>> {
    match arg(args, index) {
        Node::Map(map) => Ok(map),
        other => Err(Error::type_error("hash", other)),
    }
}

/// Register hash functions
pub fn register(library: &mut LibraryTable) {
    library
        .define_fn("hash.fetch", Signature::positional(&["hash", "string"]), |_, args| {
            let map = map_arg(&args, 0)?;
            let key = arg(&args, 1).to_text();
            Ok(match map.get(&key) {
                Some(value) if value.is_list() => Node::quote(value.clone()),
                Some(value) => value.clone(),
                None => Node::Null,
            })
        })
        .define_fn("hash.set", Signature::positional(&["hash", "string", "*"]), |_, args| {
            let mut map = map_arg(&args, 0)?.clone();
            map.insert(arg(&args, 1).to_text(), arg(&args, 2).clone());
            Ok(Node::Map(map))
        })
        .define_fn("hash.keys", Signature::positional(&["hash"]), |_, args| {
            let keys = map_arg(&args, 0)?.keys().map(|k| Node::from(k.as_str())).collect();
            Ok(quoted_list(keys))
        })
        .define_fn("hash.values", Signature::positional(&["hash"]), |_, args| {
            let values = map_arg(&args, 0)?.values().cloned().collect();
            Ok(quoted_list(values))
        })
        .define_fn("hash.to-json", Signature::positional(&["*"]), |_, args| {
            serde_json::to_string(&arg(&args, 0).to_json())
                .map(Node::String)
                .map_err(|e| Error::TypeError {
                    expected: "serializable value".to_string(),
                    got: e.to_string(),
                })
        })
        .define_fn("hash.from-json", Signature::positional(&["string"]), |_, args| {
            let source = str_arg(&args, 0)?;
            let value: serde_json::Value = serde_json::from_str(source).map_err(|e| Error::TypeError {
                expected: "JSON text".to_string(),
                got: e.to_string(),
            })?;
            Ok(match Node::from(value) {
                list @ Node::List(_) => Node::quote(list),
                other => other,
            })
        });
}
