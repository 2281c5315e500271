//! Core parser infrastructure: token cursor, error reporting, helpers.

use quill_lexer::token::{Token, TokenKind};
use quill_types::{ast, ErrorCode, QuillError, SourceFile, Span, SyntaxErrors};

/// Maximum expression nesting depth before the parser bails out.
pub(crate) const MAX_EXPR_DEPTH: u32 = 64;

/// Maximum block nesting depth (braces and else-if chains).
pub(crate) const MAX_BLOCK_DEPTH: u32 = 64;

/// The Quill parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and attempts recovery at statement boundaries.
pub struct Parser<'src> {
    /// The token stream.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    source_file: &'src SourceFile,
    /// Collected errors.
    errors: SyntaxErrors,
    /// Current expression nesting depth.
    pub(crate) expr_depth: u32,
    /// Current block nesting depth.
    pub(crate) block_depth: u32,
}

/// Result of parsing.
pub struct ParseResult {
    /// The parsed program. Present even when errors were collected; callers
    /// that care must check `errors` first.
    pub program: Option<ast::Program>,
    pub errors: SyntaxErrors,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and its source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: SyntaxErrors::empty(),
            expr_depth: 0,
            block_depth: 0,
        }
    }

    /// Parse the token stream into a [`ast::Program`].
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program: Some(program),
            errors: self.errors,
        }
    }

    fn parse_program(&mut self) -> ast::Program {
        let mut stmts: Vec<ast::Stmt> = Vec::new();
        self.skip_newlines();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
            self.skip_newlines();
        }
        let span = match (stmts.first(), stmts.last()) {
            (Some(first), Some(last)) => first.span().merge(last.span()),
            _ => Span::point(1, 1),
        };
        ast::Program { stmts, span }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream should end with Eof")
        })
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Newline Handling ──────────────────────────────────────────────────────

    /// Skip all consecutive newline tokens.
    pub(crate) fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Expect a statement terminator: newline, end of input, or a closing
    /// brace (which belongs to the enclosing block).
    pub(crate) fn expect_newline_or_eof(&mut self) {
        if self.at_end() {
            return;
        }
        if self.check(&TokenKind::Newline) {
            self.advance();
            self.skip_newlines();
        } else if !self.check(&TokenKind::RBrace) {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected newline, got '{}'", self.peek_kind()),
            );
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits
    /// an error and returns `None`.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect an identifier token. Returns the name and span.
    pub(crate) fn expect_identifier(&mut self) -> Option<ast::Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(ast::Ident::new(name, span))
            }
            other if other.is_keyword() => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("'{other}' is a reserved word and cannot be used as a name"),
                );
                None
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Report an error at the current token position.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at a specific span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        self.errors.push(QuillError::new(
            &self.source_file.name,
            code,
            message,
            span,
            source_line,
        ));
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.at_limit()
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until a statement boundary, to resume after an error.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.check(&TokenKind::Newline) {
                self.advance();
                self.skip_newlines();
                return;
            }
            match self.peek_kind() {
                TokenKind::Fn
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Assert
                | TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
