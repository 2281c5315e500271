//! Structural placement checks.
//!
//! The grammar accepts `return`, `break`, and `continue` anywhere a
//! statement can appear; this pass rejects the placements the evaluator
//! must never see. Runs after the trailing-expression rewrite, before
//! execution.

use quill_types::ast::{Block, ElseBranch, FnDecl, IfStmt, Program, Stmt};
use quill_types::Span;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("{span}: 'return' outside of a function")]
    ReturnOutsideFunction { span: Span },

    #[error("{span}: '{keyword}' outside of a loop")]
    LoopControlOutsideLoop {
        keyword: &'static str,
        span: Span,
    },

    #[error("{span}: duplicate parameter '{name}' in fn {func}()")]
    DuplicateParam {
        func: String,
        name: String,
        span: Span,
    },
}

/// Validate statement placement across the whole program.
pub fn check_placement(program: &Program) -> Result<(), CompileError> {
    let ctx = Context {
        in_function: false,
        in_loop: false,
    };
    check_stmts(&program.stmts, ctx)
}

#[derive(Clone, Copy)]
struct Context {
    in_function: bool,
    in_loop: bool,
}

fn check_stmts(stmts: &[Stmt], ctx: Context) -> Result<(), CompileError> {
    for stmt in stmts {
        check_stmt(stmt, ctx)?;
    }
    Ok(())
}

fn check_block(block: &Block, ctx: Context) -> Result<(), CompileError> {
    check_stmts(&block.stmts, ctx)
}

fn check_stmt(stmt: &Stmt, ctx: Context) -> Result<(), CompileError> {
    match stmt {
        Stmt::FnDecl(decl) => check_fn_decl(decl),
        Stmt::If(ifs) => check_if(ifs, ctx),
        Stmt::While(w) => check_block(
            &w.body,
            Context {
                in_loop: true,
                ..ctx
            },
        ),
        Stmt::For(f) => check_block(
            &f.body,
            Context {
                in_loop: true,
                ..ctx
            },
        ),
        Stmt::Return(r) if !ctx.in_function => {
            Err(CompileError::ReturnOutsideFunction { span: r.span })
        }
        Stmt::Break(span) if !ctx.in_loop => Err(CompileError::LoopControlOutsideLoop {
            keyword: "break",
            span: *span,
        }),
        Stmt::Continue(span) if !ctx.in_loop => Err(CompileError::LoopControlOutsideLoop {
            keyword: "continue",
            span: *span,
        }),
        _ => Ok(()),
    }
}

fn check_if(ifs: &IfStmt, ctx: Context) -> Result<(), CompileError> {
    check_block(&ifs.then_block, ctx)?;
    match &ifs.else_branch {
        Some(ElseBranch::ElseIf(elif)) => check_if(elif, ctx),
        Some(ElseBranch::Block(block)) => check_block(block, ctx),
        None => Ok(()),
    }
}

fn check_fn_decl(decl: &FnDecl) -> Result<(), CompileError> {
    for (i, param) in decl.params.iter().enumerate() {
        if decl.params[..i].iter().any(|p| p.name == param.name) {
            return Err(CompileError::DuplicateParam {
                func: decl.name.name.clone(),
                name: param.name.clone(),
                span: param.span,
            });
        }
    }
    // A function body starts a fresh context: `return` becomes legal,
    // and an enclosing loop does not license `break` inside the body.
    check_block(
        &decl.body,
        Context {
            in_function: true,
            in_loop: false,
        },
    )
}
