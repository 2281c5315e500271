//! Tree-walking evaluator.

use std::collections::BTreeMap;
use std::rc::Rc;

use quill_types::ast::*;
use quill_types::Span;

use crate::builtins;
use crate::console::Console;
use crate::error::{EvalError, EvalResult};
use crate::namespace::Namespace;
use crate::value::{FunctionValue, Value};

/// Maximum function-call nesting before execution is aborted. Keeps
/// runaway recursion inside the error channel instead of overflowing
/// the real stack.
const MAX_CALL_DEPTH: usize = 64;

/// Walks a program against the shared namespace.
///
/// Top-level code reads and writes the namespace directly. Each function
/// call layers one local frame over it; name lookup consults the innermost
/// frame and then the namespace, nothing in between. There are no
/// closures: a function sees its own locals and the global bindings as
/// they are at call time.
pub struct Evaluator<'a> {
    ns: &'a mut Namespace,
    console: &'a Console,
    frames: Vec<BTreeMap<String, Value>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(ns: &'a mut Namespace, console: &'a Console) -> Self {
        Self {
            ns,
            console,
            frames: Vec::new(),
        }
    }

    /// Execute every statement in order. Mutations made before a fault
    /// stay in the namespace.
    pub fn run(&mut self, program: &Program) -> EvalResult<()> {
        for stmt in &program.stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════════

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Assign(assign) => self.exec_assign(assign),
            Stmt::FnDecl(decl) => {
                let func = Value::Function(Rc::new(FunctionValue {
                    name: decl.name.name.clone(),
                    params: decl.params.iter().map(|p| p.name.clone()).collect(),
                    body: decl.body.clone(),
                }));
                self.assign_name(&decl.name.name, func);
                Ok(())
            }
            Stmt::If(ifs) => self.exec_if(ifs),
            Stmt::While(w) => self.exec_while(w),
            Stmt::For(f) => self.exec_for(f),
            Stmt::Return(r) => {
                let value = match &r.value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Nil,
                };
                Err(EvalError::Return(value))
            }
            Stmt::Break(span) => Err(EvalError::Break(*span)),
            Stmt::Continue(span) => Err(EvalError::Continue(*span)),
            Stmt::Assert(assert) => self.exec_assert(assert),
            Stmt::Expr(es) => {
                self.eval_expr(&es.expr)?;
                Ok(())
            }
            Stmt::Show(es) => {
                let value = self.eval_expr(&es.expr)?;
                self.console.write_out(&format!("{value}\n"));
                Ok(())
            }
        }
    }

    fn exec_block(&mut self, block: &Block) -> EvalResult<()> {
        for stmt in &block.stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_if(&mut self, ifs: &IfStmt) -> EvalResult<()> {
        if self.eval_expr(&ifs.condition)?.is_truthy() {
            return self.exec_block(&ifs.then_block);
        }
        match &ifs.else_branch {
            Some(ElseBranch::ElseIf(elif)) => self.exec_if(elif),
            Some(ElseBranch::Block(block)) => self.exec_block(block),
            None => Ok(()),
        }
    }

    fn exec_while(&mut self, w: &WhileStmt) -> EvalResult<()> {
        while self.eval_expr(&w.condition)?.is_truthy() {
            match self.exec_block(&w.body) {
                Ok(()) | Err(EvalError::Continue(_)) => {}
                Err(EvalError::Break(_)) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn exec_for(&mut self, f: &ForStmt) -> EvalResult<()> {
        let iterable = self.eval_expr(&f.iterable)?;
        let items: Vec<Value> = match iterable {
            Value::List(items) => items,
            Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
            Value::Map(entries) => entries.keys().map(|k| Value::Str(k.clone())).collect(),
            other => {
                return Err(EvalError::type_mismatch(
                    format!("cannot iterate over {}", other.type_name()),
                    f.iterable.span,
                ))
            }
        };
        for (i, item) in items.into_iter().enumerate() {
            self.assign_name(&f.item.name, item);
            if let Some(index) = &f.index {
                self.assign_name(&index.name, Value::Number(i as f64));
            }
            match self.exec_block(&f.body) {
                Ok(()) | Err(EvalError::Continue(_)) => {}
                Err(EvalError::Break(_)) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn exec_assert(&mut self, assert: &AssertStmt) -> EvalResult<()> {
        if self.eval_expr(&assert.condition)?.is_truthy() {
            return Ok(());
        }
        let message = match &assert.message {
            Some(msg) => format!("assertion failed: {msg}"),
            None => "assertion failed".to_string(),
        };
        Err(EvalError::AssertionFailed {
            message,
            span: assert.span,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Names and Assignment
    // ══════════════════════════════════════════════════════════════════════════

    /// Resolve a name: innermost frame, then the namespace.
    fn lookup(&self, name: &str, span: Span) -> EvalResult<Value> {
        if let Some(value) = self.frames.last().and_then(|f| f.get(name)) {
            return Ok(value.clone());
        }
        if let Some(value) = self.ns.get(name) {
            return Ok(value.clone());
        }
        Err(EvalError::UndefinedName {
            name: name.to_string(),
            span,
        })
    }

    /// Bind a name: into the innermost frame when inside a function,
    /// otherwise into the namespace.
    fn assign_name(&mut self, name: &str, value: Value) {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.insert(name.to_string(), value);
            }
            None => self.ns.set(name, value),
        }
    }

    fn exec_assign(&mut self, assign: &AssignStmt) -> EvalResult<()> {
        let value = self.eval_expr(&assign.value)?;
        if assign.path.is_empty() {
            self.assign_name(&assign.root.name, value);
            return Ok(());
        }
        // Interior assignment rebuilds the root value and stores it back
        // where the root was found, so `xs[0] = v` inside a function
        // updates a global `xs` instead of shadowing it.
        let root = self.lookup(&assign.root.name, assign.root.span)?;
        let updated = self.store_in(root, &assign.path, value)?;
        let name = &assign.root.name;
        match self.frames.last_mut() {
            Some(frame) if frame.contains_key(name) => {
                frame.insert(name.clone(), updated);
            }
            _ => self.ns.set(name.as_str(), updated),
        }
        Ok(())
    }

    /// Recursively rebuild `target` with `value` stored at the end of
    /// `path`. Intermediate steps must already exist; only the final map
    /// step may create a new key.
    fn store_in(&mut self, target: Value, path: &[PathSeg], value: Value) -> EvalResult<Value> {
        let Some(seg) = path.first() else {
            return Ok(value);
        };
        let rest = &path[1..];
        match (target, seg) {
            (Value::List(mut items), PathSeg::Index(index_expr)) => {
                let idx = self.eval_list_index(index_expr, items.len())?;
                let inner = items[idx].clone();
                items[idx] = self.store_in(inner, rest, value)?;
                Ok(Value::List(items))
            }
            (Value::Map(mut entries), seg) => {
                let key = self.eval_map_key(seg)?;
                if rest.is_empty() {
                    entries.insert(key, value);
                    return Ok(Value::Map(entries));
                }
                let inner = entries.get(&key).cloned().ok_or_else(|| {
                    EvalError::KeyNotFound {
                        key: key.clone(),
                        span: seg_span(seg),
                    }
                })?;
                let rebuilt = self.store_in(inner, rest, value)?;
                entries.insert(key, rebuilt);
                Ok(Value::Map(entries))
            }
            (other, seg) => Err(EvalError::type_mismatch(
                format!("cannot assign into a {}", other.type_name()),
                seg_span(seg),
            )),
        }
    }

    fn eval_map_key(&mut self, seg: &PathSeg) -> EvalResult<String> {
        match seg {
            PathSeg::Field(field) => Ok(field.name.clone()),
            PathSeg::Index(expr) => match self.eval_expr(expr)? {
                Value::Str(key) => Ok(key),
                other => Err(EvalError::type_mismatch(
                    format!("map keys are strings, got {}", other.type_name()),
                    expr.span,
                )),
            },
        }
    }

    fn eval_list_index(&mut self, expr: &Expr, len: usize) -> EvalResult<usize> {
        match self.eval_expr(expr)? {
            Value::Number(n) => resolve_index(n, len, expr.span),
            other => Err(EvalError::type_mismatch(
                format!("list index must be a number, got {}", other.type_name()),
                expr.span,
            )),
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::NumberLit(n) => Ok(Value::Number(*n)),
            ExprKind::StringLit(s) => Ok(Value::Str(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),
            ExprKind::NilLit => Ok(Value::Nil),
            ExprKind::ListLit(elems) => {
                let items = elems
                    .iter()
                    .map(|e| self.eval_expr(e))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::List(items))
            }
            ExprKind::MapLit(entries) => {
                let mut map = BTreeMap::new();
                for entry in entries {
                    let value = self.eval_expr(&entry.value)?;
                    map.insert(entry.key.clone(), value);
                }
                Ok(Value::Map(map))
            }
            ExprKind::Identifier(name) => self.lookup(name, expr.span),
            ExprKind::Call { callee, args } => self.eval_call(callee, args, expr.span),
            ExprKind::Index { object, index } => self.eval_index(object, index),
            ExprKind::FieldAccess { object, field } => {
                let value = self.eval_expr(object)?;
                match value {
                    Value::Map(entries) => {
                        entries
                            .get(&field.name)
                            .cloned()
                            .ok_or_else(|| EvalError::KeyNotFound {
                                key: field.name.clone(),
                                span: field.span,
                            })
                    }
                    other => Err(EvalError::type_mismatch(
                        format!("'.' requires a map, got {}", other.type_name()),
                        field.span,
                    )),
                }
            }
            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right, expr.span),
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Neg => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(EvalError::type_mismatch(
                            format!("unary '-' requires a number, got {}", other.type_name()),
                            expr.span,
                        )),
                    },
                }
            }
            ExprKind::Paren(inner) => self.eval_expr(inner),
        }
    }

    fn eval_index(&mut self, object: &Expr, index: &Expr) -> EvalResult<Value> {
        let container = self.eval_expr(object)?;
        match container {
            Value::List(items) => {
                let idx = self.eval_list_index(index, items.len())?;
                Ok(items[idx].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let idx = self.eval_list_index(index, chars.len())?;
                Ok(Value::Str(chars[idx].to_string()))
            }
            Value::Map(entries) => match self.eval_expr(index)? {
                Value::Str(key) => {
                    entries
                        .get(&key)
                        .cloned()
                        .ok_or_else(|| EvalError::KeyNotFound {
                            key,
                            span: index.span,
                        })
                }
                other => Err(EvalError::type_mismatch(
                    format!("map keys are strings, got {}", other.type_name()),
                    index.span,
                )),
            },
            other => Err(EvalError::type_mismatch(
                format!("cannot index a {}", other.type_name()),
                object.span,
            )),
        }
    }

    fn eval_binary(&mut self, left: &Expr, op: BinOp, right: &Expr, span: Span) -> EvalResult<Value> {
        // `and`/`or` short-circuit and always produce a bool.
        match op {
            BinOp::And => {
                if !self.eval_expr(left)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval_expr(right)?;
                return Ok(Value::Bool(right.is_truthy()));
            }
            BinOp::Or => {
                if self.eval_expr(left)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let right = self.eval_expr(right)?;
                return Ok(Value::Bool(right.is_truthy()));
            }
            _ => {}
        }

        let lhs = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;
        match op {
            BinOp::Eq => Ok(Value::Bool(lhs.structural_eq(&rhs))),
            BinOp::NotEq => Ok(Value::Bool(!lhs.structural_eq(&rhs))),
            BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => {
                self.compare(lhs, op, rhs, span)
            }
            BinOp::Add => match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => finite(a + b, span),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (Value::List(mut a), Value::List(b)) => {
                    a.extend(b);
                    Ok(Value::List(a))
                }
                (l, r) => Err(self.op_mismatch(op, &l, &r, span)),
            },
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => match op {
                    BinOp::Sub => finite(a - b, span),
                    BinOp::Mul => finite(a * b, span),
                    BinOp::Div => {
                        if b == 0.0 {
                            Err(EvalError::arithmetic("division by zero", span))
                        } else {
                            finite(a / b, span)
                        }
                    }
                    BinOp::Mod => {
                        if b == 0.0 {
                            Err(EvalError::arithmetic("modulo by zero", span))
                        } else {
                            finite(a % b, span)
                        }
                    }
                    _ => unreachable!("arithmetic op"),
                },
                (l, r) => Err(self.op_mismatch(op, &l, &r, span)),
            },
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn compare(&self, lhs: Value, op: BinOp, rhs: Value, span: Span) -> EvalResult<Value> {
        let ordering_holds = match (&lhs, &rhs) {
            (Value::Number(a), Value::Number(b)) => match op {
                BinOp::Less => a < b,
                BinOp::Greater => a > b,
                BinOp::LessEq => a <= b,
                BinOp::GreaterEq => a >= b,
                _ => unreachable!("comparison op"),
            },
            (Value::Str(a), Value::Str(b)) => match op {
                BinOp::Less => a < b,
                BinOp::Greater => a > b,
                BinOp::LessEq => a <= b,
                BinOp::GreaterEq => a >= b,
                _ => unreachable!("comparison op"),
            },
            _ => return Err(self.op_mismatch(op, &lhs, &rhs, span)),
        };
        Ok(Value::Bool(ordering_holds))
    }

    fn op_mismatch(&self, op: BinOp, lhs: &Value, rhs: &Value, span: Span) -> EvalError {
        EvalError::type_mismatch(
            format!(
                "'{}' is not defined for {} and {}",
                op.as_str(),
                lhs.type_name(),
                rhs.type_name()
            ),
            span,
        )
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════════

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> EvalResult<Value> {
        let args: Vec<Value> = args
            .iter()
            .map(|a| self.eval_expr(a))
            .collect::<EvalResult<_>>()?;

        // A named call resolves user functions first, builtins second, so
        // a user `fn len(...)` shadows the builtin.
        if let ExprKind::Identifier(name) = &callee.kind {
            let resolved = self
                .frames
                .last()
                .and_then(|f| f.get(name))
                .cloned()
                .or_else(|| self.ns.get(name).cloned());
            return match resolved {
                Some(Value::Function(func)) => self.call_function(func, args, span),
                Some(other) => Err(EvalError::type_mismatch(
                    format!("'{name}' is a {}, not a function", other.type_name()),
                    callee.span,
                )),
                None if builtins::is_builtin(name) => {
                    builtins::call_builtin(name, args, span, self.console)
                }
                None => Err(EvalError::UndefinedName {
                    name: name.clone(),
                    span: callee.span,
                }),
            };
        }

        match self.eval_expr(callee)? {
            Value::Function(func) => self.call_function(func, args, span),
            other => Err(EvalError::type_mismatch(
                format!("a {} is not callable", other.type_name()),
                callee.span,
            )),
        }
    }

    fn call_function(
        &mut self,
        func: Rc<FunctionValue>,
        args: Vec<Value>,
        span: Span,
    ) -> EvalResult<Value> {
        if args.len() != func.params.len() {
            return Err(EvalError::WrongArity {
                name: func.name.clone(),
                expected: func.params.len().to_string(),
                got: args.len(),
                span,
            });
        }
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(EvalError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
                span,
            });
        }
        let frame: BTreeMap<String, Value> =
            func.params.iter().cloned().zip(args).collect();
        self.frames.push(frame);
        let result = self.exec_block(&func.body);
        self.frames.pop();
        match result {
            Ok(()) => Ok(Value::Nil),
            Err(EvalError::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }
}

fn seg_span(seg: &PathSeg) -> Span {
    match seg {
        PathSeg::Index(expr) => expr.span,
        PathSeg::Field(field) => field.span,
    }
}

/// Resolve a possibly-negative index against a container length.
fn resolve_index(n: f64, len: usize, span: Span) -> EvalResult<usize> {
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(EvalError::type_mismatch(
            format!("index must be an integer, got {n}"),
            span,
        ));
    }
    let raw = n as i64;
    let resolved = if raw < 0 { raw + len as i64 } else { raw };
    if resolved < 0 || resolved as usize >= len {
        return Err(EvalError::IndexOutOfRange {
            index: raw,
            len,
            span,
        });
    }
    Ok(resolved as usize)
}

/// Reject non-finite arithmetic results.
fn finite(n: f64, span: Span) -> EvalResult<Value> {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(EvalError::arithmetic("arithmetic result is not finite", span))
    }
}
