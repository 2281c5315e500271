//! Builtin functions, dispatched by name at the call site.

use quill_types::Span;

use crate::console::Console;
use crate::error::{EvalError, EvalResult};
use crate::value::Value;

pub(crate) const BUILTIN_NAMES: &[&str] = &[
    "print", "len", "str", "num", "type", "range", "push", "keys", "abs", "min", "max", "fail",
];

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

pub(crate) fn call_builtin(
    name: &str,
    args: Vec<Value>,
    span: Span,
    console: &Console,
) -> EvalResult<Value> {
    match name {
        "print" => print(args, console),
        "len" => len(args, span),
        "str" => stringify(args, span),
        "num" => num(args, span),
        "type" => type_of(args, span),
        "range" => range(args, span),
        "push" => push(args, span),
        "keys" => keys(args, span),
        "abs" => abs(args, span),
        "min" => fold_extremum(args, span, "min", f64::min),
        "max" => fold_extremum(args, span, "max", f64::max),
        "fail" => fail(args, span),
        _ => Err(EvalError::UndefinedName {
            name: name.to_string(),
            span,
        }),
    }
}

fn expect_arity(name: &str, args: &[Value], expected: usize, span: Span) -> EvalResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::WrongArity {
            name: name.to_string(),
            expected: expected.to_string(),
            got: args.len(),
            span,
        })
    }
}

/// `print(a, b, ...)` writes a space-joined line to the output sink.
fn print(args: Vec<Value>, console: &Console) -> EvalResult<Value> {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    console.write_out(&line);
    console.write_out("\n");
    Ok(Value::Nil)
}

fn len(args: Vec<Value>, span: Span) -> EvalResult<Value> {
    expect_arity("len", &args, 1, span)?;
    let n = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(entries) => entries.len(),
        other => {
            return Err(EvalError::type_mismatch(
                format!("len() takes a string, list, or map, got {}", other.type_name()),
                span,
            ))
        }
    };
    Ok(Value::Number(n as f64))
}

fn stringify(args: Vec<Value>, span: Span) -> EvalResult<Value> {
    expect_arity("str", &args, 1, span)?;
    Ok(Value::Str(args[0].to_string()))
}

fn num(args: Vec<Value>, span: Span) -> EvalResult<Value> {
    expect_arity("num", &args, 1, span)?;
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Number).map_err(|_| {
            EvalError::type_mismatch(format!("cannot convert \"{s}\" to a number"), span)
        }),
        other => Err(EvalError::type_mismatch(
            format!("cannot convert {} to a number", other.type_name()),
            span,
        )),
    }
}

fn type_of(args: Vec<Value>, span: Span) -> EvalResult<Value> {
    expect_arity("type", &args, 1, span)?;
    Ok(Value::Str(args[0].type_name().to_string()))
}

/// `range(stop)`, `range(start, stop)`, or `range(start, stop, step)`.
fn range(args: Vec<Value>, span: Span) -> EvalResult<Value> {
    let numbers: Vec<f64> = args
        .iter()
        .map(|v| match v {
            Value::Number(n) => Ok(*n),
            other => Err(EvalError::type_mismatch(
                format!("range() takes numbers, got {}", other.type_name()),
                span,
            )),
        })
        .collect::<EvalResult<_>>()?;
    let (start, stop, step) = match numbers.as_slice() {
        [stop] => (0.0, *stop, 1.0),
        [start, stop] => (*start, *stop, 1.0),
        [start, stop, step] => (*start, *stop, *step),
        _ => {
            return Err(EvalError::WrongArity {
                name: "range".to_string(),
                expected: "1 to 3".to_string(),
                got: args.len(),
                span,
            })
        }
    };
    if step == 0.0 {
        return Err(EvalError::arithmetic("range() step cannot be zero", span));
    }
    let mut items = Vec::new();
    let mut current = start;
    while (step > 0.0 && current < stop) || (step < 0.0 && current > stop) {
        items.push(Value::Number(current));
        current += step;
    }
    Ok(Value::List(items))
}

/// `push(list, item)` returns a new list with the item appended.
fn push(args: Vec<Value>, span: Span) -> EvalResult<Value> {
    expect_arity("push", &args, 2, span)?;
    let mut args = args;
    let item = args.pop().expect("arity checked");
    match args.pop() {
        Some(Value::List(mut items)) => {
            items.push(item);
            Ok(Value::List(items))
        }
        Some(other) => Err(EvalError::type_mismatch(
            format!("push() takes a list, got {}", other.type_name()),
            span,
        )),
        None => unreachable!("arity checked"),
    }
}

/// `keys(map)` returns the map's keys as a list of strings, in key order.
fn keys(args: Vec<Value>, span: Span) -> EvalResult<Value> {
    expect_arity("keys", &args, 1, span)?;
    match &args[0] {
        Value::Map(entries) => Ok(Value::List(
            entries.keys().map(|k| Value::Str(k.clone())).collect(),
        )),
        other => Err(EvalError::type_mismatch(
            format!("keys() takes a map, got {}", other.type_name()),
            span,
        )),
    }
}

fn abs(args: Vec<Value>, span: Span) -> EvalResult<Value> {
    expect_arity("abs", &args, 1, span)?;
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(n.abs())),
        other => Err(EvalError::type_mismatch(
            format!("abs() takes a number, got {}", other.type_name()),
            span,
        )),
    }
}

/// `min`/`max` over two-or-more numbers, or over a single list of numbers.
fn fold_extremum(
    args: Vec<Value>,
    span: Span,
    name: &str,
    pick: fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    let candidates: Vec<Value> = if let [Value::List(items)] = args.as_slice() {
        items.clone()
    } else {
        args
    };
    if candidates.is_empty() {
        return Err(EvalError::WrongArity {
            name: name.to_string(),
            expected: "at least 1".to_string(),
            got: 0,
            span,
        });
    }
    let mut best: Option<f64> = None;
    for value in &candidates {
        match value {
            Value::Number(n) => {
                best = Some(match best {
                    Some(b) => pick(b, *n),
                    None => *n,
                });
            }
            other => {
                return Err(EvalError::type_mismatch(
                    format!("{name}() takes numbers, got {}", other.type_name()),
                    span,
                ))
            }
        }
    }
    Ok(Value::Number(best.expect("non-empty candidates")))
}

/// `fail(msg)` raises a runtime failure carrying the message.
fn fail(args: Vec<Value>, span: Span) -> EvalResult<Value> {
    let message = match args.as_slice() {
        [] => "failure".to_string(),
        [single] => single.to_string(),
        _ => {
            return Err(EvalError::WrongArity {
                name: "fail".to_string(),
                expected: "0 or 1".to_string(),
                got: args.len(),
                span,
            })
        }
    };
    Err(EvalError::Failure { message, span })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::point(1, 1)
    }

    fn call(name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let console = Console::new();
        call_builtin(name, args, span(), &console)
    }

    #[test]
    fn len_counts_chars_not_bytes() {
        let result = call("len", vec![Value::Str("héllo".into())]).expect("len");
        assert_eq!(result, Value::Number(5.0));
    }

    #[test]
    fn range_variants() {
        let three = call("range", vec![Value::Number(3.0)]).expect("range");
        assert_eq!(
            three,
            Value::List(vec![
                Value::Number(0.0),
                Value::Number(1.0),
                Value::Number(2.0)
            ])
        );
        let down = call(
            "range",
            vec![Value::Number(3.0), Value::Number(0.0), Value::Number(-1.0)],
        )
        .expect("range");
        assert_eq!(
            down,
            Value::List(vec![
                Value::Number(3.0),
                Value::Number(2.0),
                Value::Number(1.0)
            ])
        );
    }

    #[test]
    fn range_zero_step_is_an_error() {
        assert!(matches!(
            call(
                "range",
                vec![Value::Number(0.0), Value::Number(3.0), Value::Number(0.0)]
            ),
            Err(EvalError::Arithmetic { .. })
        ));
    }

    #[test]
    fn push_returns_a_new_list() {
        let original = Value::List(vec![Value::Number(1.0)]);
        let pushed = call("push", vec![original.clone(), Value::Number(2.0)]).expect("push");
        assert_eq!(
            pushed,
            Value::List(vec![Value::Number(1.0), Value::Number(2.0)])
        );
        assert_eq!(original, Value::List(vec![Value::Number(1.0)]));
    }

    #[test]
    fn num_parses_and_rejects() {
        assert_eq!(
            call("num", vec![Value::Str(" 2.5 ".into())]).expect("num"),
            Value::Number(2.5)
        );
        assert!(matches!(
            call("num", vec![Value::Str("not a number".into())]),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn min_max_over_args_and_lists() {
        assert_eq!(
            call("min", vec![Value::Number(3.0), Value::Number(1.0)]).expect("min"),
            Value::Number(1.0)
        );
        let list = Value::List(vec![
            Value::Number(4.0),
            Value::Number(9.0),
            Value::Number(2.0),
        ]);
        assert_eq!(call("max", vec![list]).expect("max"), Value::Number(9.0));
    }

    #[test]
    fn fail_raises_with_message() {
        match call("fail", vec![Value::Str("boom".into())]) {
            Err(EvalError::Failure { message, .. }) => assert_eq!(message, "boom"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn wrong_arity_reports_counts() {
        match call("len", vec![]) {
            Err(EvalError::WrongArity { expected, got, .. }) => {
                assert_eq!(expected, "1");
                assert_eq!(got, 0);
            }
            other => panic!("expected arity error, got {other:?}"),
        }
    }
}
