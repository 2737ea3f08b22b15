//! Wall-clock functions
//!
//! Both read the system clock, so both are impure.

use crate::library::LibraryTable;
use crate::parser::Node;
use crate::types::Signature;
use chrono::{SecondsFormat, Utc};

/// Register time functions
pub fn register(library: &mut LibraryTable) {
    library
        .define_impure_fn("time.now", Signature::Nothing, |_, _| {
            Ok(Node::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)))
        })
        .define_impure_fn("time.timestamp", Signature::Nothing, |_, _| {
            Ok(Node::Number(Utc::now().timestamp_millis() as f64))
        });
}
