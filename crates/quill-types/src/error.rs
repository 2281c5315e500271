use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum number of syntax errors collected before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Structure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Structure => write!(f, "structure"),
        }
    }
}

/// Numeric error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const INVALID_NUMBER: Self = Self(102);
    pub const UNEXPECTED_CHARACTER: Self = Self(103);
    pub const INVALID_ESCAPE: Self = Self(104);
    pub const INVALID_ASSIGN_TARGET: Self = Self(105);
    pub const DUPLICATE_MAP_KEY: Self = Self(106);

    // ── Structure errors (E600–E699) ──
    pub const NESTING_LIMIT_EXCEEDED: Self = Self(600);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            600..=699 => ErrorCategory::Structure,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured syntax error from the lexer or parser.
///
/// Carries enough context (span plus the offending source line) that a
/// caller can render a diagnostic without re-reading the snippet.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{span}: {code} [{category}] {message}")]
pub struct QuillError {
    /// Source name (for snippets, `<snippet>`).
    pub file: String,
    /// Numeric error code.
    pub code: ErrorCode,
    /// Category derived from the code.
    pub category: ErrorCategory,
    /// Human-readable message.
    pub message: String,
    /// Source location.
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line the span starts on.
    pub source_line: String,
}

impl QuillError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
        }
    }
}

/// Syntax errors collected during lexing or parsing.
///
/// Stores at most [`MAX_ERRORS`] errors but keeps counting past the cap so
/// the total is still reported accurately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxErrors {
    pub errors: Vec<QuillError>,
    pub total: usize,
}

impl SyntaxErrors {
    pub fn empty() -> Self {
        Self {
            errors: Vec::new(),
            total: 0,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total > 0
    }

    pub fn at_limit(&self) -> bool {
        self.total >= MAX_ERRORS
    }

    /// Add an error, respecting the storage cap.
    pub fn push(&mut self, error: QuillError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total += 1;
    }

    /// The first collected error, if any.
    pub fn first(&self) -> Option<&QuillError> {
        self.errors.first()
    }
}

impl Default for SyntaxErrors {
    fn default() -> Self {
        Self::empty()
    }
}
