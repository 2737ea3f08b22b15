//! Arithmetic, comparison, logic and `math.*` functions

use super::arg;
use crate::error::Result;
use crate::library::{CallContext, LibraryTable};
use crate::parser::Node;
use crate::types::Signature;

fn binary() -> Signature {
    Signature::positional(&["number", "number"])
}

fn unary() -> Signature {
    Signature::positional(&["number"])
}

/// Register math functions
pub fn register(library: &mut LibraryTable) {
    library
        .define_fn("+", binary(), |_, args| Ok(add(arg(&args, 0), arg(&args, 1))))
        .define_fn("-", binary(), numeric(|a, b| a - b))
        .define_fn("*", binary(), numeric(|a, b| a * b))
        .define_fn("/", binary(), numeric(|a, b| a / b))
        .define_fn("%", binary(), numeric(|a, b| a % b));

    library
        .define_fn("=", binary(), |_, args| Ok(Node::Bool(arg(&args, 0) == arg(&args, 1))))
        .alias_function("==", "=")
        .define_fn("!=", binary(), |_, args| Ok(Node::Bool(arg(&args, 0) != arg(&args, 1))))
        .define_fn(">", binary(), compare(|o| o == std::cmp::Ordering::Greater))
        .define_fn("<", binary(), compare(|o| o == std::cmp::Ordering::Less))
        .define_fn(">=", binary(), compare(|o| o != std::cmp::Ordering::Less))
        .define_fn("<=", binary(), compare(|o| o != std::cmp::Ordering::Greater));

    let pair = || Signature::positional(&["*", "*"]);
    library
        .define_fn("and", pair(), |_, args| {
            let (a, b) = (arg(&args, 0), arg(&args, 1));
            Ok(if a.truthy() { b.clone() } else { a.clone() })
        })
        .define_fn("or", pair(), |_, args| {
            let (a, b) = (arg(&args, 0), arg(&args, 1));
            Ok(if a.truthy() { a.clone() } else { b.clone() })
        })
        .define_fn("xor", pair(), |_, args| {
            Ok(Node::Bool(arg(&args, 0).truthy() != arg(&args, 1).truthy()))
        })
        .define_fn("not", Signature::positional(&["*"]), |_, args| {
            Ok(Node::Bool(!arg(&args, 0).truthy()))
        });

    library
        .define_fn("math.abs", unary(), float(f64::abs))
        .define_fn("math.ceil", unary(), float(f64::ceil))
        .define_fn("math.floor", unary(), float(f64::floor))
        .define_fn("math.round", unary(), float(round))
        .define_fn("math.sqrt", unary(), float(f64::sqrt))
        .define_fn("math.exp", unary(), float(f64::exp))
        .define_fn("math.log", unary(), float(f64::ln))
        .define_fn("math.pow", binary(), numeric(f64::powf))
        .define_fn("math.min", binary(), numeric(f64::min))
        .define_fn("math.max", binary(), numeric(f64::max))
        .define_fn("math.rand", Signature::Nothing, |ctx, _| Ok(Node::Number(ctx.random())));
}

/// Addition with text coercion: any textual or structured operand concatenates
pub fn add(a: &Node, b: &Node) -> Node {
    let textual = |n: &Node| matches!(n, Node::String(_) | Node::List(_) | Node::Map(_) | Node::Quote(_));
    if textual(a) || textual(b) {
        Node::String(format!("{}{}", a.to_text(), b.to_text()))
    } else {
        Node::Number(a.to_number() + b.to_number())
    }
}

/// Rounds half up, like the host language's `Math.round`
fn round(n: f64) -> f64 {
    (n + 0.5).floor()
}

type NativeResult = Result<Node>;

fn numeric(op: fn(f64, f64) -> f64) -> impl Fn(&CallContext<'_>, Vec<Node>) -> NativeResult {
    move |_, args| Ok(Node::Number(op(arg(&args, 0).to_number(), arg(&args, 1).to_number())))
}

fn float(op: fn(f64) -> f64) -> impl Fn(&CallContext<'_>, Vec<Node>) -> NativeResult {
    move |_, args| Ok(Node::Number(op(arg(&args, 0).to_number())))
}

fn compare(
    accept: fn(std::cmp::Ordering) -> bool,
) -> impl Fn(&CallContext<'_>, Vec<Node>) -> NativeResult {
    move |_, args| {
        let ordering = match (arg(&args, 0), arg(&args, 1)) {
            (Node::String(a), Node::String(b)) => Some(a.cmp(b)),
            (a, b) => a.to_number().partial_cmp(&b.to_number()),
        };
        Ok(Node::Bool(ordering.map_or(false, accept)))
    }
}
