//! Runtime values.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use quill_types::ast::Block;

/// A runtime value.
///
/// Lists and maps are plain owned containers; interior assignment is done
/// by rebuilding the containing value rather than through shared mutation.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Function(Rc<FunctionValue>),
}

/// A user-declared function: `fn name(params) { body }`.
#[derive(Debug)]
pub struct FunctionValue {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
}

impl Value {
    /// The value's type name, as reported by the `type` builtin and used
    /// in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
        }
    }

    /// Truthiness: `nil`, `false`, `0`, `""`, `[]`, and `{}` are falsy;
    /// everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
            Value::Function(_) => true,
        }
    }

    /// Structural equality, as used by `==` and `!=`.
    ///
    /// `NaN` is not equal to itself. Two functions are never equal, not
    /// even a function compared with itself.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structural_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.structural_eq(vb))
            }
            (Value::Function(_), Value::Function(_)) => false,
            _ => false,
        }
    }
}

/// Identity-flavored equality for tests and container comparisons:
/// structural for data, pointer identity for functions.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => self.structural_eq(other),
        }
    }
}

/// Write a number the way the language displays it: integral values
/// without a trailing `.0`.
fn fmt_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

/// Write a value as it appears inside a container: strings quoted,
/// everything else as its plain display.
fn fmt_element(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Str(s) => {
            write!(f, "\"")?;
            for ch in s.chars() {
                match ch {
                    '"' => write!(f, "\\\"")?,
                    '\\' => write!(f, "\\\\")?,
                    '\n' => write!(f, "\\n")?,
                    '\t' => write!(f, "\\t")?,
                    _ => write!(f, "{ch}")?,
                }
            }
            write!(f, "\"")
        }
        other => write!(f, "{other}"),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => fmt_number(f, *n),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Nil => write!(f, "nil"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_element(f, item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                if entries.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: ")?;
                    fmt_element(f, value)?;
                }
                write!(f, " }}")
            }
            Value::Function(func) => write!(f, "<fn {}>", func.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_types::Span;

    fn list(items: Vec<Value>) -> Value {
        Value::List(items)
    }

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Number(-3.0).to_string(), "-3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(0.0).to_string(), "0");
    }

    #[test]
    fn container_display() {
        let v = list(vec![
            Value::Number(1.0),
            Value::Str("hi".into()),
            Value::Nil,
        ]);
        assert_eq!(v.to_string(), "[1, \"hi\", nil]");

        let mut m = BTreeMap::new();
        m.insert("name".to_string(), Value::Str("ada".into()));
        m.insert("age".to_string(), Value::Number(36.0));
        assert_eq!(Value::Map(m).to_string(), "{ age: 36, name: \"ada\" }");
        assert_eq!(Value::Map(BTreeMap::new()).to_string(), "{}");
    }

    #[test]
    fn top_level_strings_display_raw() {
        assert_eq!(Value::Str("no quotes".into()).to_string(), "no quotes");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::List(Vec::new()).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(Value::Str(" ".into()).is_truthy());
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        let nan = Value::Number(f64::NAN);
        assert!(!nan.structural_eq(&nan));
    }

    #[test]
    fn functions_are_never_structurally_equal() {
        let func = Value::Function(Rc::new(FunctionValue {
            name: "f".into(),
            params: Vec::new(),
            body: Block {
                stmts: Vec::new(),
                span: Span::point(1, 1),
            },
        }));
        assert!(!func.structural_eq(&func));
        // But identity equality holds for the same Rc.
        assert_eq!(func, func.clone());
    }

    #[test]
    fn nested_structural_equality() {
        let a = list(vec![Value::Number(1.0), list(vec![Value::Str("x".into())])]);
        let b = list(vec![Value::Number(1.0), list(vec![Value::Str("x".into())])]);
        assert!(a.structural_eq(&b));
        let c = list(vec![Value::Number(1.0), list(vec![Value::Str("y".into())])]);
        assert!(!a.structural_eq(&c));
    }
}
