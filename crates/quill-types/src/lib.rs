//! Shared types for the Quill pipeline.
//!
//! Defines the AST node types, source spans, and structured syntax
//! errors used by the lexer, parser, and evaluator.

mod error;
mod span;
pub mod ast;

pub use error::{ErrorCategory, ErrorCode, QuillError, SyntaxErrors, MAX_ERRORS};
pub use span::{SourceFile, Span};
