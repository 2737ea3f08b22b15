//! Builtins over the interpreter's key-path storage

use super::{arg, str_arg};
use crate::library::LibraryTable;
use crate::parser::Node;
use crate::types::Signature;

/// Register storage functions
pub fn register(library: &mut LibraryTable) {
    library
        .define_impure_fn("store.get", Signature::positional(&["string"]), |ctx, args| {
            Ok(match ctx.storage.get(str_arg(&args, 0)?) {
                Some(value) if value.is_list() => Node::quote(value),
                Some(value) => value,
                None => Node::Null,
            })
        })
        .define_impure_fn("store.has", Signature::positional(&["string"]), |ctx, args| {
            Ok(Node::Bool(ctx.storage.has(str_arg(&args, 0)?)))
        })
        .define_impure_fn("store.set", Signature::positional(&["string", "*"]), |ctx, args| {
            let value = arg(&args, 1).clone();
            ctx.storage.set(str_arg(&args, 0)?, value.clone())?;
            Ok(match value {
                Node::List(_) => Node::quote(value),
                other => other,
            })
        });
}
