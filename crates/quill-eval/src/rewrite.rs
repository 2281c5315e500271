//! The trailing-expression rewrite.

use quill_types::ast::{Program, Stmt};

/// If the program's last top-level statement is a bare expression, replace
/// it with a display statement carrying the same span, so the REPL echoes
/// its value. Everything else is left untouched.
///
/// This is the only producer of [`Stmt::Show`] in the pipeline.
pub fn rewrite_trailing_expr(mut program: Program) -> Program {
    if let Some(Stmt::Expr(tail)) = program.stmts.last() {
        let tail = tail.clone();
        program.stmts.pop();
        program.stmts.push(Stmt::Show(tail));
    }
    program
}
