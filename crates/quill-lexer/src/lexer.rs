//! Core Quill lexer: source text to a token stream.
//!
//! - Newline-separated statements (no semicolons): `\n` is a token
//! - Single-line comments stripped (`// ...`)
//! - String literals with `\n`, `\t`, `\r`, `\\`, `\"` escapes
//! - Error recovery: collects up to the shared error cap instead of
//!   stopping at the first problem

use quill_types::{ErrorCode, QuillError, SourceFile, Span, SyntaxErrors};

use crate::token::{Token, TokenKind};

/// The Quill lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`quill_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Source file for error context.
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Collected errors.
    errors: SyntaxErrors,
}

/// Result of lexing: tokens plus any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    /// Errors encountered during lexing.
    pub errors: SyntaxErrors,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: SyntaxErrors::empty(),
        }
    }

    /// Lex the entire source into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            if self.errors.at_limit() {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
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

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces and tabs (NOT newlines; those are tokens).
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == b' ' || ch == b'\t' || ch == b'\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip a single-line comment (`// ...`), leaving the newline in place.
    /// Returns `true` if a comment was consumed.
    fn skip_comment(&mut self) -> bool {
        if self.peek() == Some(b'/') && self.peek_at(1) == Some(b'/') {
            while let Some(ch) = self.peek() {
                if ch == b'\n' {
                    break;
                }
                self.advance();
            }
            true
        } else {
            false
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token. Invalid characters are reported and skipped in a
    /// loop, so a long run of them cannot grow the stack.
    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            while self.skip_comment() {
                self.skip_whitespace();
            }

            if self.at_end() {
                return Token::new(TokenKind::Eof, self.current_span());
            }

            let start_line = self.line;
            let start_col = self.col;
            let start_pos = self.pos;
            let ch = match self.advance() {
                Some(ch) => ch,
                None => return Token::new(TokenKind::Eof, self.current_span()),
            };

            let single = |lexer: &Self, kind: TokenKind| {
                Token::new(kind, lexer.span_from(start_line, start_col))
            };

            return match ch {
                b'\n' => single(self, TokenKind::Newline),

                b'"' => self.scan_string(start_line, start_col),
                b'0'..=b'9' => self.scan_number(start_line, start_col, start_pos),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                    self.scan_identifier(start_line, start_col, start_pos)
                }

                b'+' => single(self, TokenKind::Plus),
                b'-' => single(self, TokenKind::Minus),
                b'*' => single(self, TokenKind::Star),
                b'/' => single(self, TokenKind::Slash),
                b'%' => single(self, TokenKind::Percent),

                b'=' => {
                    if self.peek() == Some(b'=') {
                        self.advance();
                        single(self, TokenKind::EqEq)
                    } else {
                        single(self, TokenKind::Eq)
                    }
                }
                b'!' => {
                    if self.peek() == Some(b'=') {
                        self.advance();
                        single(self, TokenKind::BangEq)
                    } else {
                        let span = self.span_from(start_line, start_col);
                        self.emit_error(
                            ErrorCode::UNEXPECTED_CHARACTER,
                            "unexpected character '!'; use 'not' for negation or '!=' for inequality",
                            span,
                        );
                        if self.errors.at_limit() {
                            return Token::new(TokenKind::Eof, self.current_span());
                        }
                        continue;
                    }
                }
                b'<' => {
                    if self.peek() == Some(b'=') {
                        self.advance();
                        single(self, TokenKind::LessEq)
                    } else {
                        single(self, TokenKind::Less)
                    }
                }
                b'>' => {
                    if self.peek() == Some(b'=') {
                        self.advance();
                        single(self, TokenKind::GreaterEq)
                    } else {
                        single(self, TokenKind::Greater)
                    }
                }

                b'(' => single(self, TokenKind::LParen),
                b')' => single(self, TokenKind::RParen),
                b'[' => single(self, TokenKind::LBracket),
                b']' => single(self, TokenKind::RBracket),
                b'{' => single(self, TokenKind::LBrace),
                b'}' => single(self, TokenKind::RBrace),
                b',' => single(self, TokenKind::Comma),
                b'.' => single(self, TokenKind::Dot),
                b':' => single(self, TokenKind::Colon),

                _ => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("unexpected character '{}'", ch as char),
                        span,
                    );
                    if self.errors.at_limit() {
                        return Token::new(TokenKind::Eof, self.current_span());
                    }
                    continue;
                }
            };
        }
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a string literal. The opening `"` is already consumed.
    ///
    /// Contents are accumulated as bytes so multi-byte UTF-8 sequences
    /// pass through untouched; the source is valid UTF-8 to begin with.
    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Token {
        let mut bytes: Vec<u8> = Vec::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        span,
                    );
                    let value = String::from_utf8_lossy(&bytes).into_owned();
                    return Token::new(TokenKind::StringLit(value), span);
                }
                Some(b'"') => {
                    self.advance();
                    let span = self.span_from(start_line, start_col);
                    let value = String::from_utf8_lossy(&bytes).into_owned();
                    return Token::new(TokenKind::StringLit(value), span);
                }
                Some(b'\\') => {
                    self.advance();
                    match self.advance() {
                        Some(b'n') => bytes.push(b'\n'),
                        Some(b't') => bytes.push(b'\t'),
                        Some(b'r') => bytes.push(b'\r'),
                        Some(b'\\') => bytes.push(b'\\'),
                        Some(b'"') => bytes.push(b'"'),
                        other => {
                            let span = Span::point(self.line, self.col.saturating_sub(1).max(1));
                            let shown = other.map(|c| c as char).unwrap_or(' ');
                            self.emit_error(
                                ErrorCode::INVALID_ESCAPE,
                                format!("invalid escape sequence '\\{shown}'"),
                                span,
                            );
                        }
                    }
                }
                Some(ch) => {
                    self.advance();
                    bytes.push(ch);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a number. The first digit is already consumed.
    fn scan_number(&mut self, start_line: u32, start_col: u32, start_pos: usize) -> Token {
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        // A decimal point only counts when a digit follows; `xs.0` style
        // member syntax does not exist, but `1.foo()` should not eat the dot.
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance();
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }

        let span = self.span_from(start_line, start_col);
        let text = std::str::from_utf8(&self.source[start_pos..self.pos]).unwrap_or("");
        match text.parse::<f64>() {
            Ok(value) => Token::new(TokenKind::NumberLit(value), span),
            Err(_) => {
                self.emit_error(
                    ErrorCode::INVALID_NUMBER,
                    format!("invalid number literal '{text}'"),
                    span,
                );
                Token::new(TokenKind::NumberLit(0.0), span)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    /// Scan an identifier or keyword. The first character is already consumed.
    fn scan_identifier(&mut self, start_line: u32, start_col: u32, start_pos: usize) -> Token {
        while let Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') = self.peek() {
            self.advance();
        }
        let span = self.span_from(start_line, start_col);
        let text = std::str::from_utf8(&self.source[start_pos..self.pos]).unwrap_or("");
        match TokenKind::keyword(text) {
            Some(kind) => Token::new(kind, span),
            None => Token::new(TokenKind::Identifier(text.to_string()), span),
        }
    }
}
