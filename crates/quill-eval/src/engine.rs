//! The evaluation boundary.

use serde::{Deserialize, Serialize};

use quill_parser::parse_source;
use quill_types::{SourceFile, SyntaxErrors};

use crate::compile::check_placement;
use crate::console::Console;
use crate::evaluator::Evaluator;
use crate::namespace::Namespace;
use crate::rewrite::rewrite_trailing_expr;

/// The outcome of evaluating one snippet: captured output, or an error
/// message. Exactly one of the two is non-empty (both empty for a snippet
/// that succeeds silently).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reply {
    pub out: String,
    pub err: String,
}

impl Reply {
    fn failure(err: impl Into<String>) -> Self {
        Self {
            out: String::new(),
            err: err.into(),
        }
    }
}

/// Evaluate one snippet against the shared namespace.
///
/// Nothing escapes this function: lex, parse, and placement errors, as
/// well as every runtime fault, are converted into the reply's `err`
/// string here. On success `out` holds the captured output with trailing
/// whitespace trimmed. Output captured before a mid-execution fault is
/// discarded; namespace mutations made before the fault persist.
pub fn evaluate(snippet: &str, ns: &mut Namespace, console: &Console) -> Reply {
    let source_file = SourceFile::new("<snippet>", snippet);
    let (program, errors) = parse_source(&source_file);
    let Some(program) = program else {
        tracing::debug!(total = errors.total, "snippet failed to parse");
        return Reply::failure(render_syntax_errors(&errors));
    };

    let program = rewrite_trailing_expr(program);

    if let Err(err) = check_placement(&program) {
        tracing::debug!(error = %err, "snippet failed placement checks");
        return Reply::failure(err.to_string());
    }

    let guard = console.capture();
    let mut evaluator = Evaluator::new(ns, console);
    match evaluator.run(&program) {
        Ok(()) => {
            let out = guard.finish();
            Reply {
                out: out.trim_end().to_string(),
                err: String::new(),
            }
        }
        Err(err) => {
            // Dropping the guard discards whatever was printed before the
            // fault and restores the prior sink.
            drop(guard);
            tracing::debug!(error = %err, "snippet failed during execution");
            Reply::failure(err.to_string())
        }
    }
}

/// Render collected syntax errors as the reply's error text: one line per
/// stored error, plus a count for any past the storage cap.
fn render_syntax_errors(errors: &SyntaxErrors) -> String {
    let mut lines: Vec<String> = errors.errors.iter().map(|e| e.to_string()).collect();
    let overflow = errors.total.saturating_sub(errors.errors.len());
    if overflow > 0 {
        lines.push(format!("... and {overflow} more error(s)"));
    }
    lines.join("\n")
}
