use crate::parser::Node;
use serde::{Deserialize, Serialize};

/// Name of the event pattern that matches every event
pub const WILDCARD: &str = "*";

/// External event handed to a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event name matched by `(event name ...)`
    pub name: String,
    /// Value substituted for the payload placeholder
    #[serde(default)]
    pub payload: Node,
}

impl Event {
    /// Creates an event
    pub fn new(name: impl Into<String>, payload: Node) -> Self {
        Event {
            name: name.into(),
            payload,
        }
    }

    /// Whether `pattern` (an event name or the wildcard) matches this event
    pub fn matches(&self, pattern: &str) -> bool {
        pattern == WILDCARD || pattern == self.name
    }
}
