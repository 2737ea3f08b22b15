//! Named constants

use crate::library::LibraryTable;
use crate::parser::Node;
use std::f64::consts;

/// Register constants
pub fn register(library: &mut LibraryTable) {
    library
        .define_constant("true", Node::Bool(true))
        .define_constant("false", Node::Bool(false))
        .define_constant("null", Node::Null)
        .define_constant("PHI", Node::Number(1.618033988))
        .define_constant("PI", Node::Number(consts::PI))
        .define_constant("E", Node::Number(consts::E))
        .define_constant("TAU", Node::Number(consts::TAU))
        .define_constant("LN2", Node::Number(consts::LN_2))
        .define_constant("LN10", Node::Number(consts::LN_10))
        .define_constant("LOG2E", Node::Number(consts::LOG2_E))
        .define_constant("LOG10E", Node::Number(consts::LOG10_E))
        .define_constant("SQRT2", Node::Number(consts::SQRT_2));
}
