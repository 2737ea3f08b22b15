//! Scope frames threaded through reduction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stack of named scope frames, outermost first
///
/// The empty stack is the global scope. Library lookups walk the frames
/// innermost first before falling back to the global table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    frames: Vec<String>,
}

impl Scope {
    /// The global scope
    pub fn global() -> Self {
        Scope { frames: Vec::new() }
    }

    /// A scope stack with the given frames, outermost first
    pub fn from_frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Scope {
            frames: frames.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a new stack with `name` pushed as the innermost frame
    pub fn push(&self, name: &str) -> Scope {
        let mut frames = self.frames.clone();
        frames.push(name.to_string());
        Scope { frames }
    }

    /// Check if this is the global scope
    pub fn is_global(&self) -> bool {
        self.frames.is_empty()
    }

    /// Innermost frame name
    pub fn innermost(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    /// Frames, outermost first
    pub fn frames(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.frames.iter().map(String::as_str)
    }

    /// Number of frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            write!(f, "<global>")
        } else {
            write!(f, "{}", self.frames.join("/"))
        }
    }
}
