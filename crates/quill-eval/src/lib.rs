//! Quill evaluator: runs parsed programs against a persistent namespace.
//!
//! The crate's public boundary is [`evaluate`]: snippet text in, a
//! [`Reply`] out. No error ever escapes it; syntax errors, placement
//! errors, and runtime faults all become the reply's `err` string.

mod builtins;
mod compile;
mod console;
mod engine;
mod error;
mod evaluator;
mod namespace;
mod rewrite;
mod value;

pub use compile::{check_placement, CompileError};
pub use console::{CaptureGuard, Console};
pub use engine::{evaluate, Reply};
pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use namespace::Namespace;
pub use rewrite::rewrite_trailing_expr;
pub use value::{FunctionValue, Value};
