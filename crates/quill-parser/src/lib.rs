//! Quill parser: token stream to AST.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser};

use quill_lexer::Lexer;
use quill_types::{ast::Program, SourceFile, SyntaxErrors};

/// Lex and parse a source file in one step.
///
/// Lex errors and parse errors land in the same collection; the program is
/// `None` whenever any were reported.
pub fn parse_source(source_file: &SourceFile) -> (Option<Program>, SyntaxErrors) {
    let lexed = Lexer::new(source_file).lex();
    if lexed.errors.has_errors() {
        return (None, lexed.errors);
    }
    let result = Parser::new(lexed.tokens, source_file).parse();
    if result.errors.has_errors() {
        (None, result.errors)
    } else {
        (result.program, result.errors)
    }
}
