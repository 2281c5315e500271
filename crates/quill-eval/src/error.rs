//! Runtime errors and internal control-flow signals.

use quill_types::Span;
use thiserror::Error;

use crate::value::Value;

pub type EvalResult<T> = Result<T, EvalError>;

/// A runtime fault, or one of the evaluator's internal control-flow
/// signals.
///
/// `Return`, `Break`, and `Continue` ride the error channel the same way
/// faults do, but they are absorbed by the function-call and loop machinery
/// and can never reach the engine boundary: the placement checks reject
/// programs that misplace them.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error("{span}: name '{name}' is not defined")]
    UndefinedName { name: String, span: Span },

    #[error("{span}: {message}")]
    TypeMismatch { message: String, span: Span },

    #[error("{span}: {message}")]
    Arithmetic { message: String, span: Span },

    #[error("{span}: index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize, span: Span },

    #[error("{span}: key '{key}' not found")]
    KeyNotFound { key: String, span: Span },

    #[error("{span}: {name}() takes {expected} argument(s), got {got}")]
    WrongArity {
        name: String,
        expected: String,
        got: usize,
        span: Span,
    },

    #[error("{span}: {message}")]
    AssertionFailed { message: String, span: Span },

    /// Raised by the `fail` builtin.
    #[error("{span}: {message}")]
    Failure { message: String, span: Span },

    #[error("{span}: maximum call depth ({limit}) exceeded")]
    CallDepthExceeded { limit: usize, span: Span },

    // ── Control-flow signals ──
    #[error("'return' outside of a function")]
    Return(Value),

    #[error("'break' outside of a loop")]
    Break(Span),

    #[error("'continue' outside of a loop")]
    Continue(Span),
}

impl EvalError {
    pub fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        Self::TypeMismatch {
            message: message.into(),
            span,
        }
    }

    pub fn arithmetic(message: impl Into<String>, span: Span) -> Self {
        Self::Arithmetic {
            message: message.into(),
            span,
        }
    }
}
