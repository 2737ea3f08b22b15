//! The `define` preprocessor
//!
//! `(define add a b '(+ a b))` followed by `(add 1 2)` runs as
//! `(lambda a b '(+ a b) 1 2)`.

use crate::error::{Error, Result};
use crate::library::{LibraryTable, PreprocessContext};
use crate::parser::Node;

/// Register the `define` preprocessor
pub fn register(library: &mut LibraryTable) {
    library.define_preprocessor("define", expand);
}

/// A named lambda collected from a `define` form
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// Name calls are matched on
    pub name: String,
    /// Parameter names
    pub params: Vec<Node>,
    /// Quoted body
    pub body: Node,
}

impl Definition {
    /// Reads `define name params... 'body`
    pub fn from_form(form: &[Node]) -> Result<Self> {
        let name = match form.get(1) {
            Some(Node::String(name)) => name.clone(),
            _ => return Err(malformed("a name")),
        };

        let mut params = Vec::new();
        for node in &form[2..] {
            match node {
                Node::String(_) => params.push(node.clone()),
                Node::Quote(inner) if inner.is_list() => {
                    return Ok(Definition {
                        name,
                        params,
                        body: node.clone(),
                    })
                }
                _ => break,
            }
        }
        Err(malformed("a quoted body"))
    }

    /// Rewrites every call to this definition in `node`, innermost first
    pub fn apply(&self, node: Node) -> Node {
        match node {
            Node::List(items) => {
                let mut items: Vec<Node> = items.into_iter().map(|item| self.apply(item)).collect();
                if items.first().and_then(Node::as_str) == Some(self.name.as_str()) {
                    let args = items.split_off(1);
                    items.clear();
                    items.push(Node::from("lambda"));
                    items.extend(self.params.iter().cloned());
                    items.push(self.body.clone());
                    items.extend(args);
                }
                Node::List(items)
            }
            Node::Quote(inner) => Node::quote(self.apply(*inner)),
            other => other,
        }
    }
}

fn expand(_ctx: &PreprocessContext<'_>, form: Vec<Node>, program: Vec<Node>) -> Result<Vec<Node>> {
    let definition = Definition::from_form(&form)?;
    tracing::debug!(name = %definition.name, "expanding definition");
    Ok(program.into_iter().map(|node| definition.apply(node)).collect())
}

fn malformed(missing: &str) -> Error {
    Error::MissingDefinition(format!("define expects {}", missing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: serde_json::Value) -> Vec<Node> {
        match Node::from(value) {
            Node::List(items) => items,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_rewrites_nested_calls() {
        let definition =
            Definition::from_form(&form(json!(["define", "add", "a", "b", {"'": ["+", "a", "b"]}])))
                .unwrap();
        let program = Node::from(json!(["add", 1, ["add", 2, 3]]));
        assert_eq!(
            definition.apply(program),
            Node::from(json!([
                "lambda", "a", "b", {"'": ["+", "a", "b"]}, 1,
                ["lambda", "a", "b", {"'": ["+", "a", "b"]}, 2, 3]
            ]))
        );
    }

    #[test]
    fn test_malformed_forms() {
        assert!(Definition::from_form(&form(json!(["define"]))).is_err());
        assert!(Definition::from_form(&form(json!(["define", "f", "a"]))).is_err());
        assert!(Definition::from_form(&form(json!(["define", "f", 1, {"'": ["a"]}]))).is_err());
    }
}
