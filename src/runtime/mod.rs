//! Runtime execution for Runiq programs

mod config;
mod event;
mod interpreter;
mod meter;
mod rng;
mod scope;
mod stack;
mod storage;

pub use config::{Config, DEFAULT_FUNCTION_MISSING};
pub use event::{Event, WILDCARD};
pub use interpreter::{Interpreter, InterpreterState};
pub use meter::Meter;
pub use rng::SeededRng;
pub use scope::Scope;
pub use stack::{ensure_sufficient_stack, StackGuarded};
pub use storage::{MemoryStorage, Storage};
