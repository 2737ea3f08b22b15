//! Control forms: closures, branching, binding, events and timing
//!
//! None of these evaluate anything themselves. Each one rewrites its
//! arguments into a new list that the interpreter reduces on a later pass.

use super::{arg, list_arg, quoted_list, str_arg};
use crate::error::{Error, Result};
use crate::library::{CallContext, Function, LibraryTable};
use crate::parser::{head_name, Node};
use crate::types::Signature;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Separator between the stages of a `compose` pipeline
pub const COMPOSE_DELIMITER: &str = "|>";

/// Register control functions
pub fn register(library: &mut LibraryTable) {
    library
        .define_fn("lambda", Signature::Any, |_, args| lambda(args))
        .define_fn("call", Signature::positional(&["list", "..."]), |_, args| call(args))
        .define_fn("ycomb", Signature::positional(&["list", "..."]), |_, args| ycomb(args))
        .define_fn(
            "if",
            Signature::positional(&["bool", "list", "string", "list"]),
            |_, args| {
                let branch = if arg(&args, 0).truthy() { 1 } else { 3 };
                Ok(args.into_iter().nth(branch).unwrap_or_default())
            },
        )
        .define_fn("identity", Signature::Any, |_, args| {
            Ok(args.into_iter().next().unwrap_or_default())
        })
        .define_fn("let", Signature::positional(&["string", "..."]), |ctx, _| bind(ctx.list))
        .define_fn(
            "event",
            Signature::positional(&["string", "string", "list"]),
            react,
        )
        .define_function("after", After)
        .define_fn("eval", Signature::positional(&["string"]), |_, args| {
            let source = str_arg(&args, 0)?;
            crate::parser::parse(crate::lexer::lex(source)?)
        })
        .define_fn("argv", Signature::Nothing, |ctx, _| Ok(quoted_list(ctx.argv.to_vec())))
        .define_fn("compose", Signature::Any, |_, args| Ok(compose(args)))
        .alias_function(COMPOSE_DELIMITER, "compose")
        .define_fn("stack", Signature::positional(&["list", "..."]), |_, args| stack(args))
        .define_fn("series", Signature::Any, |_, args| {
            Ok(Node::List(vec![Node::from("stack"), quoted_list(args)]))
        })
        .alias_function("$", "series")
        .define_fn("sequence", Signature::Any, |_, args| Ok(sequence(args)));

    library
        .define_fn("error.throw", Signature::positional(&["string"]), |_, args| {
            Err(Error::Thrown {
                message: arg(&args, 0).to_text(),
            })
        })
        .define_fn("assert", Signature::positional(&["*", "..."]), |_, args| {
            if arg(&args, 0).truthy() {
                return Ok(Node::Bool(true));
            }
            let message = match args.get(1) {
                Some(message) => message.to_text(),
                None => "Assertion failed!".to_string(),
            };
            Err(Error::AssertionFailed { message })
        })
        .define_impure_fn("print", Signature::Any, |ctx, args| {
            let line: Vec<String> = args.iter().map(Node::to_text).collect();
            tracing::info!(step = ctx.id, "{}", line.join(" "));
            Ok(args.into_iter().next().unwrap_or_default())
        });
}

/// Builds a closure and applies whatever parameters follow its body
///
/// Non-list arguments before the first list name the parameters; the first
/// list is the body; the remaining arguments are bound positionally. With
/// every name bound the substituted body is returned for reduction,
/// otherwise a quoted lambda over the unbound names.
pub fn lambda(args: Vec<Node>) -> Result<Node> {
    let mut names = Vec::new();
    let mut body = None;
    let mut params = Vec::new();

    for node in args {
        match (node, body.is_some()) {
            (Node::List(items), false) => body = Some(items),
            (Node::List(items), true) => params.push(quoted_list(items)),
            (other, false) => names.push(other),
            (other, true) => params.push(other),
        }
    }

    let body = body.ok_or_else(|| Error::MissingDefinition("lambda has no body".to_string()))?;
    let bound = params.len().min(names.len());
    let bindings: HashMap<String, Node> = names
        .iter()
        .map(Node::to_text)
        .zip(params)
        .collect();
    let executable = substitute(&bindings, body);

    let leftovers: Vec<Node> = names.into_iter().skip(bound).collect();
    if leftovers.is_empty() {
        return Ok(Node::List(executable));
    }

    let mut partial = Vec::with_capacity(leftovers.len() + 2);
    partial.push(Node::from("lambda"));
    partial.extend(leftovers);
    partial.push(quoted_list(executable));
    Ok(quoted_list(partial))
}

/// Replaces bound names throughout `items`
///
/// Nested lambdas keep their own names; quoted lists are rewritten too.
fn substitute(bindings: &HashMap<String, Node>, items: Vec<Node>) -> Vec<Node> {
    items
        .into_iter()
        .map(|node| match node {
            Node::List(inner) if head_name(&inner) != Some("lambda") => {
                Node::List(substitute(bindings, inner))
            }
            Node::Quote(inner) => match *inner {
                Node::List(quoted) => quoted_list(substitute(bindings, quoted)),
                other => Node::quote(other),
            },
            Node::String(name) => bindings.get(&name).cloned().unwrap_or(Node::String(name)),
            other => other,
        })
        .collect()
}

fn call(args: Vec<Node>) -> Result<Node> {
    let mut invocation = list_arg(&args, 0)?.to_vec();
    invocation.extend(args.into_iter().skip(1));
    Ok(Node::List(invocation))
}

/// Hands a lambda a copy of itself as its first parameter
fn ycomb(args: Vec<Node>) -> Result<Node> {
    let function = list_arg(&args, 0)?.to_vec();
    let mut invocation = function.clone();
    invocation.push(Node::List(function));
    invocation.extend(args.into_iter().skip(1));
    Ok(Node::List(invocation))
}

/// `(let name what rest...)`: replaces `name` with `what` throughout `rest`
///
/// Works on the raw call so `what` keeps its quoting.
fn bind(list: &[Node]) -> Result<Node> {
    let mut forms = list.iter().skip(1).cloned();
    let name = match forms.next() {
        Some(Node::String(name)) => name,
        other => {
            return Err(Error::MissingDefinition(format!(
                "let expects a name, got {}",
                other.unwrap_or_default()
            )))
        }
    };
    let what = forms.next().unwrap_or_default();
    Ok(Node::List(lettify(&name, &what, forms.collect())))
}

fn lettify(name: &str, what: &Node, items: Vec<Node>) -> Vec<Node> {
    items
        .into_iter()
        .map(|node| match node {
            Node::List(inner) => Node::List(lettify(name, what, inner)),
            Node::String(token) if token == name => what.clone(),
            other => other,
        })
        .collect()
}

/// `(event name placeholder reaction)`: the reaction with the payload
/// substituted when the run's event matches, otherwise null
fn react(ctx: &CallContext<'_>, args: Vec<Node>) -> Result<Node> {
    let Some(event) = ctx.event else {
        return Ok(Node::Null);
    };
    if !event.matches(&arg(&args, 0).to_text()) {
        return Ok(Node::Null);
    }
    let placeholder = arg(&args, 1).to_text();
    let reaction = list_arg(&args, 2)?.to_vec();
    Ok(Node::List(populate(reaction, &placeholder, &event.payload)))
}

fn populate(items: Vec<Node>, placeholder: &str, payload: &Node) -> Vec<Node> {
    items
        .into_iter()
        .map(|node| match node {
            Node::List(inner) if head_name(&inner) != Some("lambda") => {
                Node::List(populate(inner, placeholder, payload))
            }
            Node::String(token) if token == placeholder => payload.clone(),
            other => other,
        })
        .collect()
}

/// `(compose a b |> c |> d e)` nests each stage into the next:
/// `(d e (c (a b)))`
pub fn compose(args: Vec<Node>) -> Node {
    let mut stages = args
        .split(|node| node.as_str() == Some(COMPOSE_DELIMITER))
        .map(<[Node]>::to_vec);
    let first = stages.next().unwrap_or_default();
    stages.fold(Node::List(first), |inner, mut stage| {
        stage.push(inner);
        Node::List(stage)
    })
}

/// `(stack steps previous)`: runs the next step, feeding the remainder back
fn stack(args: Vec<Node>) -> Result<Node> {
    let mut steps = list_arg(&args, 0)?.to_vec();
    if steps.is_empty() {
        return Ok(Node::quote(arg(&args, 1).clone()));
    }
    let step = steps.remove(0);
    Ok(Node::List(vec![Node::from("stack"), quoted_list(steps), step]))
}

/// `(sequence a b c)` becomes `(identity c (identity b (identity a)))`:
/// every step is reduced and the last one's value is kept
fn sequence(args: Vec<Node>) -> Node {
    args.into_iter()
        .fold(None, |inner: Option<Node>, step| {
            let mut link = vec![Node::from("identity"), step];
            link.extend(inner);
            Some(Node::List(link))
        })
        .unwrap_or_default()
}

/// `(after ms list)`: yields `list` once `ms` milliseconds have passed
pub struct After;

#[async_trait]
impl Function for After {
    fn signature(&self) -> Option<Signature> {
        Some(Signature::positional(&["number", "list"]))
    }

    async fn call(&self, _ctx: &CallContext<'_>, args: Vec<Node>) -> Result<Node> {
        let millis = arg(&args, 0).to_number();
        let delay = if millis.is_finite() && millis > 0.0 {
            Duration::from_millis(millis as u64)
        } else {
            Duration::ZERO
        };
        tokio::time::sleep(delay).await;
        Ok(args.into_iter().nth(1).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nodes(value: serde_json::Value) -> Vec<Node> {
        match Node::from(value) {
            Node::List(items) => items,
            other => vec![other],
        }
    }

    #[test]
    fn test_lambda_full_application() {
        let args = nodes(json!(["a", "b", ["+", "a", "b"], 1, 2]));
        assert_eq!(lambda(args).unwrap(), Node::from(json!(["+", 1, 2])));
    }

    #[test]
    fn test_lambda_partial_application() {
        let args = nodes(json!(["a", "b", "c", ["+", "a", ["-", "b", "c"]], 1, 2]));
        assert_eq!(
            lambda(args).unwrap(),
            Node::from(json!({"'": ["lambda", "c", {"'": ["+", 1, ["-", 2, "c"]]}]}))
        );
    }

    #[test]
    fn test_lambda_keeps_nested_lambda_names() {
        let args = nodes(json!(["x", ["f", "x", ["lambda", "x", {"'": ["x"]}]], 5]));
        assert_eq!(
            lambda(args).unwrap(),
            Node::from(json!(["f", 5, ["lambda", "x", {"'": ["x"]}]]))
        );
    }

    #[test]
    fn test_lambda_without_body() {
        let err = lambda(nodes(json!(["a", "b"]))).unwrap_err();
        assert!(matches!(err, Error::MissingDefinition(_)));
    }

    #[test]
    fn test_compose_nests_stages() {
        let args = nodes(json!(["+", 3, 4, "|>", "-", 22, "|>", "*", 7]));
        assert_eq!(compose(args), Node::from(json!(["*", 7, ["-", 22, ["+", 3, 4]]])));
    }

    #[test]
    fn test_let_rewrites_raw_list() {
        let list = nodes(json!(["let", "x", {"'": [1, 2]}, "f", "x", ["g", "x"]]));
        assert_eq!(
            bind(&list).unwrap(),
            Node::from(json!(["f", {"'": [1, 2]}, ["g", {"'": [1, 2]}]]))
        );
    }

    #[test]
    fn test_ycomb_passes_itself() {
        let args = nodes(json!([["lambda", "f", "n", {"'": ["f"]}], 8]));
        assert_eq!(
            ycomb(args).unwrap(),
            Node::from(json!([
                "lambda", "f", "n", {"'": ["f"]},
                ["lambda", "f", "n", {"'": ["f"]}],
                8
            ]))
        );
    }

    #[test]
    fn test_sequence_chains_identity() {
        let args = nodes(json!([["+", 1, 2], ["+", 3, 4], 5]));
        assert_eq!(
            sequence(args),
            Node::from(json!(["identity", 5, ["identity", ["+", 3, 4], ["identity", ["+", 1, 2]]]]))
        );
        assert_eq!(sequence(vec![]), Node::Null);
    }

    #[test]
    fn test_stack_steps() {
        let next = stack(nodes(json!([[["+", 1, 2], ["+", 3, 4]]]))).unwrap();
        assert_eq!(
            next,
            Node::from(json!(["stack", {"'": [["+", 3, 4]]}, ["+", 1, 2]]))
        );
        let done = stack(vec![Node::List(vec![]), Node::Number(7.0)]).unwrap();
        assert_eq!(done, Node::quote(Node::Number(7.0)));
    }
}
