//! # Runiq signatures and checks
//!
//! Functions may declare their inputs with a [`Signature`]. The interpreter
//! enforces argument counts at call time ([`check_arity`]) and can scan a
//! whole program for unresolvable names before running it ([`preflight`]).
//!
//! ```text
//! Signature::Any                               ; (list 1 2 3)
//! Signature::Nothing                           ; (argv)
//! Signature::positional(&["number", "number"]) ; (+ 1 2)
//! Signature::positional(&["string", "..."])    ; (let x 1 ...)
//! ```

mod checker;
mod preflight;

pub use checker::{check_arity, Signature, REST_MARKER};
pub use preflight::preflight;
