//! Standard library for Runiq
//!
//! Registered into [`LibraryTable::new`]. Functions receive their arguments
//! already reduced and unquoted; list-valued results are programs unless
//! wrapped in a quote.

pub mod constants;
pub mod control;
pub mod crypto;
pub mod define;
pub mod hashes;
pub mod lists;
pub mod math;
pub mod storage;
pub mod strings;
pub mod time;
pub mod types;

use crate::error::{Error, Result};
use crate::library::LibraryTable;
use crate::parser::Node;

/// Register all standard library functions, types, constants and preprocessors
pub fn register_all(library: &mut LibraryTable) {
    constants::register(library);
    types::register(library);
    math::register(library);
    control::register(library);
    define::register(library);
    lists::register(library);
    hashes::register(library);
    strings::register(library);
    crypto::register(library);
    time::register(library);
    storage::register(library);
}

static NULL: Node = Node::Null;

/// Argument at `index`, or null when absent
pub(crate) fn arg(args: &[Node], index: usize) -> &Node {
    args.get(index).unwrap_or(&NULL)
}

/// Argument at `index` as a string
pub(crate) fn str_arg<'a>(args: &'a [Node], index: usize) -> Result<&'a str> {
    let node = arg(args, index);
    node.as_str().ok_or_else(|| Error::type_error("string", node))
}

/// Argument at `index` as list items
pub(crate) fn list_arg(args: &[Node], index: usize) -> Result<&[Node]> {
    let node = arg(args, index);
    node.as_list().ok_or_else(|| Error::type_error("list", node))
}

/// Wraps items as quoted data so they are not reduced as a program
pub(crate) fn quoted_list(items: Vec<Node>) -> Node {
    Node::quote(Node::List(items))
}
