//! Engine-boundary tests: persistence, capture isolation, containment.

use quill_eval::{evaluate, Console, Namespace, Reply, Value};

struct Session {
    ns: Namespace,
    console: Console,
}

impl Session {
    fn new() -> Self {
        Self {
            ns: Namespace::new(),
            console: Console::new(),
        }
    }

    fn eval(&mut self, code: &str) -> Reply {
        evaluate(code, &mut self.ns, &self.console)
    }
}

#[test]
fn trailing_expression_auto_displays() {
    let mut s = Session::new();
    let reply = s.eval("1 + 1");
    assert_eq!(reply.out, "2");
    assert_eq!(reply.err, "");
}

#[test]
fn non_expression_tail_is_silent() {
    let mut s = Session::new();
    let reply = s.eval("x = 5");
    assert_eq!(reply.out, "");
    assert_eq!(reply.err, "");
}

#[test]
fn namespace_persists_across_calls() {
    let mut s = Session::new();
    assert_eq!(s.eval("x = 5").err, "");
    assert_eq!(s.eval("x").out, "5");
    assert_eq!(s.eval("fn double(n) {\n  return n * 2\n}").err, "");
    assert_eq!(s.eval("double(x)").out, "10");
}

#[test]
fn malformed_syntax_leaves_namespace_untouched() {
    let mut s = Session::new();
    let reply = s.eval("x = = 5");
    assert_eq!(reply.out, "");
    assert!(!reply.err.is_empty());
    assert!(s.ns.is_empty());
}

#[test]
fn syntax_error_text_carries_position_and_code() {
    let mut s = Session::new();
    let reply = s.eval("f(1, 2");
    assert!(reply.err.contains("E100"), "{}", reply.err);
    assert!(reply.err.contains("1:"), "{}", reply.err);
}

#[test]
fn partial_mutation_persists_through_a_fault() {
    let mut s = Session::new();
    let reply = s.eval("y = 1\nfail(\"boom\")");
    assert!(reply.err.contains("boom"));
    assert_eq!(s.ns.get("y"), Some(&Value::Number(1.0)));
    // The namespace is usable afterwards.
    assert_eq!(s.eval("y + 1").out, "2");
}

#[test]
fn output_before_a_fault_is_discarded() {
    let mut s = Session::new();
    let reply = s.eval("print(\"gone\")\nfail(\"boom\")");
    assert_eq!(reply.out, "");
    assert!(reply.err.contains("boom"));
}

#[test]
fn capture_restored_after_success_and_failure() {
    let mut s = Session::new();
    s.eval("print(\"first\")");
    s.eval("fail(\"second\")");
    // A fresh capture opened now must start empty: nothing leaked from
    // either evaluation, and the sink stack is back where it started.
    let guard = s.console.capture();
    s.console.write_out("fresh");
    assert_eq!(guard.finish(), "fresh");
}

#[test]
fn back_to_back_outputs_never_interleave() {
    let mut s = Session::new();
    let first = s.eval("print(\"a\")\nprint(\"b\")\ndone = true");
    let second = s.eval("print(\"c\")\ndone = true");
    assert_eq!(first.out, "a\nb");
    assert_eq!(second.out, "c");
}

#[test]
fn trailing_whitespace_is_trimmed() {
    let mut s = Session::new();
    assert_eq!(s.eval("print(\"a\")\nx = 1").out, "a");
    assert_eq!(s.eval("print(\"a \")\nx = 1").out, "a");
}

#[test]
fn nil_result_echoes() {
    // A trailing expression displays its value even when that value is
    // nil; only non-expression tails stay silent.
    let mut s = Session::new();
    assert_eq!(s.eval("nil").out, "nil");
    assert_eq!(s.eval("print(\"hi\")").out, "hi\nnil");
    assert_eq!(s.eval("x = nil").out, "");
}

#[test]
fn pathological_input_gets_an_error_reply() {
    // Deeply stacked operators and long invalid runs must come back as
    // ordinary error replies, leaving the session alive.
    let mut s = Session::new();
    let unary = format!("{}1", "-".repeat(200_000));
    let reply = s.eval(&unary);
    assert_eq!(reply.out, "");
    assert!(reply.err.contains("E600"), "{}", reply.err);

    let garbage = "@".repeat(500_000);
    let reply = s.eval(&garbage);
    assert_eq!(reply.out, "");
    assert!(reply.err.contains("E103"), "{}", reply.err);

    assert_eq!(s.eval("1 + 1").out, "2");
}

#[test]
fn empty_snippet_is_a_successful_no_op() {
    let mut s = Session::new();
    let reply = s.eval("");
    assert_eq!(reply.out, "");
    assert_eq!(reply.err, "");
}

#[test]
fn comments_only_snippet_is_a_no_op() {
    let mut s = Session::new();
    let reply = s.eval("// just a comment\n");
    assert_eq!(reply.out, "");
    assert_eq!(reply.err, "");
}

#[test]
fn reply_serializes_as_out_and_err() {
    let reply = Reply {
        out: "5".to_string(),
        err: String::new(),
    };
    let json = serde_json::to_string(&reply).expect("serialize");
    assert_eq!(json, "{\"out\":\"5\",\"err\":\"\"}");
    let back: Reply = serde_json::from_str("{\"out\":\"\",\"err\":\"bad\"}").expect("deserialize");
    assert_eq!(back.err, "bad");
}

#[test]
fn redefinition_overwrites() {
    let mut s = Session::new();
    s.eval("x = 1");
    s.eval("x = \"now a string\"");
    assert_eq!(s.eval("x").out, "now a string");
    s.eval("fn x() {\n  return 7\n}");
    assert_eq!(s.eval("x()").out, "7");
}
