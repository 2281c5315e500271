//! Statement parsing.

use crate::parser::{Parser, MAX_BLOCK_DEPTH};
use quill_lexer::token::TokenKind;
use quill_types::ast::*;
use quill_types::ErrorCode;

impl<'src> Parser<'src> {
    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        if self.block_depth >= MAX_BLOCK_DEPTH {
            self.error_at(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("maximum block nesting depth is {MAX_BLOCK_DEPTH}"),
                start,
            );
            return None;
        }
        self.block_depth += 1;
        self.skip_newlines();
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            } else {
                self.synchronize();
            }
            self.skip_newlines();
        }
        self.block_depth -= 1;
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Some(Block { stmts, span })
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        self.skip_newlines();
        if self.at_end() || self.check(&TokenKind::RBrace) {
            return None;
        }
        match self.peek_kind() {
            TokenKind::Fn => self.parse_fn_decl(),
            TokenKind::If => self.parse_if_stmt().map(Stmt::If),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Break => {
                let span = self.advance().span;
                self.expect_newline_or_eof();
                Some(Stmt::Break(span))
            }
            TokenKind::Continue => {
                let span = self.advance().span;
                self.expect_newline_or_eof();
                Some(Stmt::Continue(span))
            }
            TokenKind::Assert => self.parse_assert_stmt(),
            _ => self.parse_expr_or_assign(),
        }
    }

    /// Parse an expression statement, or an assignment if an `=` follows.
    fn parse_expr_or_assign(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression()?;
        if self.check(&TokenKind::Eq) {
            self.advance(); // eat `=`
            let (root, path) = self.expr_to_assign_target(expr)?;
            let value = self.parse_expression()?;
            let span = root.span.merge(self.previous_span());
            self.expect_newline_or_eof();
            return Some(Stmt::Assign(AssignStmt {
                root,
                path,
                value,
                span,
            }));
        }
        let span = expr.span;
        self.expect_newline_or_eof();
        Some(Stmt::Expr(ExprStmt { expr, span }))
    }

    /// Decompose an already-parsed expression into an assignment target:
    /// a root variable plus a path of index/field steps.
    fn expr_to_assign_target(&mut self, expr: Expr) -> Option<(Ident, Vec<PathSeg>)> {
        let mut path_rev: Vec<PathSeg> = Vec::new();
        let mut current = expr;
        loop {
            match current.kind {
                ExprKind::Identifier(name) => {
                    let root = Ident::new(name, current.span);
                    path_rev.reverse();
                    return Some((root, path_rev));
                }
                ExprKind::Index { object, index } => {
                    path_rev.push(PathSeg::Index(*index));
                    current = *object;
                }
                ExprKind::FieldAccess { object, field } => {
                    path_rev.push(PathSeg::Field(field));
                    current = *object;
                }
                _ => {
                    self.error_at(
                        ErrorCode::INVALID_ASSIGN_TARGET,
                        "invalid assignment target; expected a variable, index, or field",
                        current.span,
                    );
                    return None;
                }
            }
        }
    }

    /// `fn name(params) { body }`
    fn parse_fn_decl(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `fn`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        self.expect_newline_or_eof();
        Some(Stmt::FnDecl(FnDecl {
            name,
            params,
            body,
            span,
        }))
    }

    /// `if cond { ... } [else if ... | else { ... }]`
    pub(crate) fn parse_if_stmt(&mut self) -> Option<IfStmt> {
        let start = self.current_span();
        self.advance(); // eat `if`
        let condition = self.parse_expression()?;
        let then_block = self.parse_block()?;
        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                // An else-if chain nests like a block.
                if self.block_depth >= MAX_BLOCK_DEPTH {
                    self.error_at_current(
                        ErrorCode::NESTING_LIMIT_EXCEEDED,
                        format!("maximum block nesting depth is {MAX_BLOCK_DEPTH}"),
                    );
                    return None;
                }
                self.block_depth += 1;
                let elif = self.parse_if_stmt();
                self.block_depth -= 1;
                Some(ElseBranch::ElseIf(Box::new(elif?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        self.expect_newline_or_eof();
        Some(IfStmt {
            condition,
            then_block,
            else_branch,
            span,
        })
    }

    /// `while cond { ... }`
    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `while`
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        self.expect_newline_or_eof();
        Some(Stmt::While(WhileStmt {
            condition,
            body,
            span,
        }))
    }

    /// `for item [, index] in iterable { ... }`
    fn parse_for_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `for`
        let item = self.expect_identifier()?;
        let index = if self.eat(&TokenKind::Comma) {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        self.expect(&TokenKind::In)?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        self.expect_newline_or_eof();
        Some(Stmt::For(ForStmt {
            item,
            index,
            iterable,
            body,
            span,
        }))
    }

    /// `return [expr]`
    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `return`
        let value = if self.check(&TokenKind::Newline)
            || self.check(&TokenKind::RBrace)
            || self.at_end()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let span = start.merge(self.previous_span());
        self.expect_newline_or_eof();
        Some(Stmt::Return(ReturnStmt { value, span }))
    }

    /// `assert expr [, "message"]`
    fn parse_assert_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `assert`
        let condition = self.parse_expression()?;
        let message = if self.eat(&TokenKind::Comma) {
            match self.peek_kind().clone() {
                TokenKind::StringLit(s) => {
                    self.advance();
                    Some(s)
                }
                _ => {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!(
                            "expected string literal after ',', got '{}'",
                            self.peek_kind()
                        ),
                    );
                    return None;
                }
            }
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        self.expect_newline_or_eof();
        Some(Stmt::Assert(AssertStmt {
            condition,
            message,
            span,
        }))
    }
}
