//! Integration tests for the Quill parser.

use quill_parser::parse_source;
use quill_types::ast::*;
use quill_types::{ErrorCode, SourceFile, SyntaxErrors};

/// Parse source into a Program (panics on errors).
fn parse(source: &str) -> Program {
    let sf = SourceFile::new("<snippet>", source);
    let (program, errors) = parse_source(&sf);
    if errors.has_errors() {
        panic!(
            "parse errors:\n{}",
            errors
                .errors
                .iter()
                .map(|e| format!("  [{}] {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
    program.expect("no program after successful parse")
}

/// Parse source expected to fail; returns the collected errors.
fn parse_errors(source: &str) -> SyntaxErrors {
    let sf = SourceFile::new("<snippet>", source);
    let (program, errors) = parse_source(&sf);
    assert!(errors.has_errors(), "expected parse errors");
    assert!(program.is_none(), "no program expected on failure");
    errors
}

fn first_code(errors: &SyntaxErrors) -> ErrorCode {
    errors.first().expect("at least one error").code
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn empty_program() {
    let prog = parse("");
    assert!(prog.stmts.is_empty());
}

#[test]
fn simple_assignment() {
    let prog = parse("x = 5");
    assert_eq!(prog.stmts.len(), 1);
    match &prog.stmts[0] {
        Stmt::Assign(a) => {
            assert_eq!(a.root.name, "x");
            assert!(a.path.is_empty());
            assert_eq!(a.value.kind, ExprKind::NumberLit(5.0));
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn indexed_assignment_builds_path() {
    let prog = parse("xs[0] = 9");
    match &prog.stmts[0] {
        Stmt::Assign(a) => {
            assert_eq!(a.root.name, "xs");
            assert_eq!(a.path.len(), 1);
            assert!(matches!(&a.path[0], PathSeg::Index(_)));
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn field_assignment_builds_path() {
    let prog = parse("point.x = 1");
    match &prog.stmts[0] {
        Stmt::Assign(a) => {
            assert_eq!(a.root.name, "point");
            match &a.path[0] {
                PathSeg::Field(f) => assert_eq!(f.name, "x"),
                other => panic!("expected field segment, got {other:?}"),
            }
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn nested_path_assignment() {
    let prog = parse("m.inner[2] = nil");
    match &prog.stmts[0] {
        Stmt::Assign(a) => {
            assert_eq!(a.root.name, "m");
            assert_eq!(a.path.len(), 2);
            assert!(matches!(&a.path[0], PathSeg::Field(_)));
            assert!(matches!(&a.path[1], PathSeg::Index(_)));
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn bare_expression_statement() {
    let prog = parse("1 + 2");
    assert!(matches!(&prog.stmts[0], Stmt::Expr(_)));
}

#[test]
fn parser_never_emits_show() {
    let prog = parse("x = 1\nx");
    assert!(prog.stmts.iter().all(|s| !matches!(s, Stmt::Show(_))));
}

#[test]
fn fn_decl() {
    let prog = parse("fn add(a, b) {\n  return a + b\n}");
    match &prog.stmts[0] {
        Stmt::FnDecl(f) => {
            assert_eq!(f.name.name, "add");
            assert_eq!(f.params.len(), 2);
            assert_eq!(f.body.stmts.len(), 1);
            assert!(matches!(&f.body.stmts[0], Stmt::Return(_)));
        }
        other => panic!("expected fn decl, got {other:?}"),
    }
}

#[test]
fn fn_decl_no_params() {
    let prog = parse("fn nop() { }");
    match &prog.stmts[0] {
        Stmt::FnDecl(f) => {
            assert!(f.params.is_empty());
            assert!(f.body.stmts.is_empty());
        }
        other => panic!("expected fn decl, got {other:?}"),
    }
}

#[test]
fn if_else_chain() {
    let prog = parse("if a {\n  x = 1\n} else if b {\n  x = 2\n} else {\n  x = 3\n}");
    match &prog.stmts[0] {
        Stmt::If(ifs) => {
            let elif = match ifs.else_branch.as_ref().expect("else branch") {
                ElseBranch::ElseIf(elif) => elif,
                other => panic!("expected else-if, got {other:?}"),
            };
            assert!(matches!(
                elif.else_branch.as_ref().expect("final else"),
                ElseBranch::Block(_)
            ));
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn while_loop() {
    let prog = parse("while n < 10 {\n  n = n + 1\n}");
    assert!(matches!(&prog.stmts[0], Stmt::While(_)));
}

#[test]
fn for_loop_with_index() {
    let prog = parse("for item, i in xs {\n  print(i, item)\n}");
    match &prog.stmts[0] {
        Stmt::For(f) => {
            assert_eq!(f.item.name, "item");
            assert_eq!(f.index.as_ref().expect("index binding").name, "i");
        }
        other => panic!("expected for, got {other:?}"),
    }
}

#[test]
fn return_with_and_without_value() {
    let prog = parse("fn f() {\n  return 1\n}\nfn g() {\n  return\n}");
    let value_of = |stmt: &Stmt| match stmt {
        Stmt::FnDecl(f) => match &f.body.stmts[0] {
            Stmt::Return(r) => r.value.clone(),
            other => panic!("expected return, got {other:?}"),
        },
        other => panic!("expected fn decl, got {other:?}"),
    };
    assert!(value_of(&prog.stmts[0]).is_some());
    assert!(value_of(&prog.stmts[1]).is_none());
}

#[test]
fn break_and_continue() {
    let prog = parse("while true {\n  break\n  continue\n}");
    match &prog.stmts[0] {
        Stmt::While(w) => {
            assert!(matches!(&w.body.stmts[0], Stmt::Break(_)));
            assert!(matches!(&w.body.stmts[1], Stmt::Continue(_)));
        }
        other => panic!("expected while, got {other:?}"),
    }
}

#[test]
fn assert_with_message() {
    let prog = parse("assert x > 0, \"x must be positive\"");
    match &prog.stmts[0] {
        Stmt::Assert(a) => {
            assert_eq!(a.message.as_deref(), Some("x must be positive"));
        }
        other => panic!("expected assert, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// Extract the single top-level expression from a one-statement program.
fn parse_expr(source: &str) -> Expr {
    let prog = parse(source);
    match prog.stmts.into_iter().next() {
        Some(Stmt::Expr(e)) => e.expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn precedence_mul_over_add() {
    let expr = parse_expr("1 + 2 * 3");
    match expr.kind {
        ExprKind::Binary { op, right, .. } => {
            assert_eq!(op, BinOp::Add);
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn parens_override_precedence() {
    let expr = parse_expr("(1 + 2) * 3");
    match expr.kind {
        ExprKind::Binary { op, left, .. } => {
            assert_eq!(op, BinOp::Mul);
            assert!(matches!(left.kind, ExprKind::Paren(_)));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn and_binds_tighter_than_or() {
    let expr = parse_expr("a or b and c");
    match expr.kind {
        ExprKind::Binary { op, right, .. } => {
            assert_eq!(op, BinOp::Or);
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinOp::And,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn unary_stacks() {
    let expr = parse_expr("not not a");
    match expr.kind {
        ExprKind::Unary { op, operand } => {
            assert_eq!(op, UnaryOp::Not);
            assert!(matches!(
                operand.kind,
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    ..
                }
            ));
        }
        other => panic!("expected unary, got {other:?}"),
    }
}

#[test]
fn call_with_args() {
    let expr = parse_expr("min(a, b + 1)");
    match expr.kind {
        ExprKind::Call { callee, args } => {
            assert!(matches!(callee.kind, ExprKind::Identifier(ref n) if n == "min"));
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn chained_postfix() {
    let expr = parse_expr("grid[0][1]");
    match expr.kind {
        ExprKind::Index { object, .. } => {
            assert!(matches!(object.kind, ExprKind::Index { .. }));
        }
        other => panic!("expected index, got {other:?}"),
    }
}

#[test]
fn field_then_call() {
    // `m.f(1)` is a call whose callee is a field access.
    let expr = parse_expr("m.f(1)");
    match expr.kind {
        ExprKind::Call { callee, args } => {
            assert!(matches!(callee.kind, ExprKind::FieldAccess { .. }));
            assert_eq!(args.len(), 1);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn list_literal_multiline() {
    let expr = parse_expr("[\n  1,\n  2,\n  3\n]");
    match expr.kind {
        ExprKind::ListLit(elems) => assert_eq!(elems.len(), 3),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn map_literal_keys() {
    let expr = parse_expr("{ name: \"ada\", \"the age\": 36 }");
    match expr.kind {
        ExprKind::MapLit(entries) => {
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].key, "name");
            assert_eq!(entries[1].key, "the age");
        }
        other => panic!("expected map, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn unbalanced_paren() {
    let errors = parse_errors("(1 + 2");
    assert_eq!(first_code(&errors), ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn chained_comparison_rejected() {
    let errors = parse_errors("1 < 2 < 3");
    assert_eq!(first_code(&errors), ErrorCode::UNEXPECTED_TOKEN);
    assert!(errors.first().expect("error").message.contains("chained"));
}

#[test]
fn invalid_assignment_target() {
    let errors = parse_errors("1 + 2 = 3");
    assert_eq!(first_code(&errors), ErrorCode::INVALID_ASSIGN_TARGET);
}

#[test]
fn call_is_not_assignment_target() {
    let errors = parse_errors("f() = 3");
    assert_eq!(first_code(&errors), ErrorCode::INVALID_ASSIGN_TARGET);
}

#[test]
fn keyword_as_name_rejected() {
    let errors = parse_errors("fn while() { }");
    assert_eq!(first_code(&errors), ErrorCode::UNEXPECTED_TOKEN);
    assert!(errors.first().expect("error").message.contains("reserved"));
}

#[test]
fn missing_in_for_loop() {
    let errors = parse_errors("for item xs { }");
    assert_eq!(first_code(&errors), ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn two_statements_one_line_rejected() {
    let errors = parse_errors("x = 1 y = 2");
    assert_eq!(first_code(&errors), ErrorCode::UNEXPECTED_TOKEN);
    assert!(errors.first().expect("error").message.contains("newline"));
}

#[test]
fn recovery_collects_multiple_errors() {
    let errors = parse_errors("(1\n)2\n(3");
    assert!(errors.total >= 2);
}

#[test]
fn duplicate_map_key_rejected() {
    let errors = parse_errors("{ a: 1, b: 2, a: 3 }");
    assert_eq!(first_code(&errors), ErrorCode::DUPLICATE_MAP_KEY);
    assert!(errors.first().expect("error").message.contains("'a'"));
}

#[test]
fn duplicate_string_map_key_rejected() {
    let errors = parse_errors("{ \"k\": 1, k: 2 }");
    assert_eq!(first_code(&errors), ErrorCode::DUPLICATE_MAP_KEY);
}

#[test]
fn deep_nesting_hits_limit() {
    let source = format!("{}1{}", "(".repeat(80), ")".repeat(80));
    let errors = parse_errors(&source);
    assert!(errors
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::NESTING_LIMIT_EXCEEDED));
}

#[test]
fn deep_unary_chain_hits_limit() {
    // Stacked unary operators count against the same depth cap as
    // parentheses, so pathological chains fail as a parse error instead
    // of exhausting the stack.
    let source = format!("{}1", "-".repeat(100_000));
    let errors = parse_errors(&source);
    assert!(errors
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::NESTING_LIMIT_EXCEEDED));

    let source = format!("{}true", "not ".repeat(100_000));
    let errors = parse_errors(&source);
    assert!(errors
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::NESTING_LIMIT_EXCEEDED));
}

#[test]
fn deep_block_nesting_hits_limit() {
    let source = "while true {\n".repeat(10_000);
    let errors = parse_errors(&source);
    assert!(errors
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::NESTING_LIMIT_EXCEEDED));
}

#[test]
fn deep_else_if_chain_hits_limit() {
    let mut source = String::from("if a {\n}");
    for _ in 0..10_000 {
        source.push_str(" else if a {\n}");
    }
    let errors = parse_errors(&source);
    assert!(errors
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::NESTING_LIMIT_EXCEEDED));
}
