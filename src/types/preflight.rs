//! Read-only scan for invoked names the library cannot resolve

use crate::library::Library;
use crate::parser::Node;
use crate::runtime::{ensure_sufficient_stack, Scope};
use std::collections::HashSet;

/// Walks `program` and returns every invoked name that resolves to no
/// function, preprocessor, type caster or constant, in first-seen order
///
/// Each name is reported (and logged) once. Quoted sub-trees are scanned too.
/// Lists headed by a library scope are checked inside that scope, the way
/// the interpreter reduces them.
pub fn preflight(library: &dyn Library, program: &Node) -> Vec<String> {
    let mut scan = Preflight {
        library,
        scope: Scope::global(),
        seen: HashSet::new(),
        unresolved: Vec::new(),
    };
    scan.visit(program);
    scan.unresolved
}

struct Preflight<'a> {
    library: &'a dyn Library,
    scope: Scope,
    seen: HashSet<String>,
    unresolved: Vec<String>,
}

impl Preflight<'_> {
    fn visit(&mut self, node: &Node) {
        ensure_sufficient_stack(|| match node {
            Node::List(items) => {
                let enclosing = self.scope.clone();
                if let Some(name) = node.head_name() {
                    if !is_quote_marker(name) && !self.resolves(name) && self.seen.insert(name.to_string()) {
                        tracing::warn!(name, "preflight: `{}` is not defined", name);
                        self.unresolved.push(name.to_string());
                    }
                    if self.library.lookup_scope(name, &self.scope) {
                        self.scope = self.scope.push(name);
                    }
                }
                for item in items {
                    self.visit(item);
                }
                self.scope = enclosing;
            }
            Node::Quote(inner) => self.visit(inner),
            _ => {}
        })
    }

    fn resolves(&self, name: &str) -> bool {
        let library = self.library;
        library.lookup_function(name, &self.scope).is_some()
            || library.lookup_preprocessor(name, &self.scope).is_some()
            || library.lookup_type_caster(name, &self.scope).is_some()
            || library.lookup_constant(name, &self.scope).is_some()
    }
}

fn is_quote_marker(name: &str) -> bool {
    name == "quote" || name == crate::parser::QUOTE_KEY
}
