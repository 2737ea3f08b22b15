//! Key-path storage handed to impure builtins

use crate::error::{Error, Result};
use crate::parser::Node;
use dashmap::DashMap;
use std::collections::BTreeMap;

/// Mutable key-path store
///
/// Paths are dot separated (`user.name`, `items.0`); numeric segments index
/// into lists. The interpreter never reads or writes storage itself, it only
/// hands the handle to functions through their call context.
pub trait Storage: Send + Sync {
    /// Value at `path`, if any
    fn get(&self, path: &str) -> Option<Node>;

    /// Stores `value` at `path`, creating intermediate maps as needed
    ///
    /// A numeric segment may replace a list element or append one past the
    /// end; anything further out is a `TypeError`.
    fn set(&self, path: &str, value: Node) -> Result<()>;

    /// Whether a value exists at `path`
    fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Snapshot of everything stored, as a map node
    fn export(&self) -> Node;
}

/// In-memory [`Storage`] keyed by the first path segment
#[derive(Debug, Default)]
pub struct MemoryStorage {
    roots: DashMap<String, Node>,
}

impl MemoryStorage {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded from a map node; other nodes yield an empty store
    pub fn from_node(node: Node) -> Self {
        let storage = Self::new();
        if let Node::Map(map) = node {
            for (key, value) in map {
                storage.roots.insert(key, value);
            }
        }
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, path: &str) -> Option<Node> {
        let mut segments = path.split('.');
        let root = segments.next()?;
        let entry = self.roots.get(root)?;
        let mut node = entry.value();
        for segment in segments {
            node = child(node, segment)?;
        }
        Some(node.clone())
    }

    fn set(&self, path: &str, value: Node) -> Result<()> {
        let mut segments: Vec<&str> = path.split('.').collect();
        let root = segments.remove(0);
        if segments.is_empty() {
            self.roots.insert(root.to_string(), value);
            return Ok(());
        }
        let mut entry = self.roots.entry(root.to_string()).or_insert(Node::Null);
        assign(entry.value_mut(), &segments, value)
    }

    fn export(&self) -> Node {
        Node::Map(
            self.roots
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect::<BTreeMap<_, _>>(),
        )
    }
}

fn child<'a>(node: &'a Node, segment: &str) -> Option<&'a Node> {
    match node {
        Node::Map(map) => map.get(segment),
        Node::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        Node::Quote(inner) => child(inner, segment),
        _ => None,
    }
}

fn assign(target: &mut Node, segments: &[&str], value: Node) -> Result<()> {
    let Some((segment, rest)) = segments.split_first() else {
        *target = value;
        return Ok(());
    };

    if let (Node::List(items), Ok(index)) = (&mut *target, segment.parse::<usize>()) {
        if index > items.len() {
            return Err(Error::TypeError {
                expected: format!("list index at most {}", items.len()),
                got: segment.to_string(),
            });
        }
        if index == items.len() {
            items.push(Node::Null);
        }
        return assign(&mut items[index], rest, value);
    }

    if !matches!(target, Node::Map(_)) {
        *target = Node::Map(BTreeMap::new());
    }
    match target {
        Node::Map(map) => {
            let slot = map.entry(segment.to_string()).or_insert(Node::Null);
            assign(slot, rest, value)
        }
        _ => Ok(()),
    }
}
