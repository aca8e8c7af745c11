#![allow(dead_code)]

use xpr_core::ast::*;
use xpr_core::error::Error;
use xpr_core::ops::BinOpKind;
use xpr_core::visit::{walk_call, walk_convert, walk_lambda, ExprRewriter};
use xpr_core::Result;
use xpr_interpret::intrinsics::{compile_call, expr_constant};
use std::sync::Arc;

pub fn int_param(name: &str) -> Param {
    Param::new(name, Ty::Int)
}

pub fn int_fn() -> Ty {
    Ty::expr(vec![Ty::Int], Ty::Int)
}

pub fn add(lhs: Expr, rhs: Expr) -> Expr {
    Expr::binop(BinOpKind::Add, lhs, rhs)
}

pub fn mul(lhs: Expr, rhs: Expr) -> Expr {
    Expr::binop(BinOpKind::Mul, lhs, rhs)
}

/// `|x| x + 2`
pub fn add_two() -> TypedExpr {
    let x = int_param("x");
    TypedExpr::new(vec![x.clone()], add(Expr::parameter(&x), Expr::int(2)))
}

/// `|x| quote(|y| y + x)`
pub fn adder_factory() -> TypedExpr {
    let x = int_param("x");
    let y = int_param("y");
    TypedExpr::new(
        vec![x.clone()],
        Expr::quote(vec![y.clone()], add(Expr::parameter(&y), Expr::parameter(&x))),
    )
}

pub fn value_of(expr: &TypedExpr) -> Expr {
    expr_constant(expr)
}

/// `callee.Compile()(args..)`
pub fn compiled(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::invoke(compile_call(callee), args)
}

fn int_lambda(body: impl FnOnce(Expr) -> Expr) -> Value {
    let x = int_param("x");
    let body = body(Expr::parameter(&x));
    Value::Expr(TypedExpr::new(vec![x], body))
}

/// `Fixtures::Getter()` returns `|x| x * 2`.
pub fn getter() -> Expr {
    let handle = FnHandle::static_fn("Fixtures", "Getter", |_| {
        Ok(int_lambda(|x| mul(x, Expr::int(2))))
    });
    Expr::call(None, handle, vec![], int_fn())
}

/// `Fixtures::DirtyGetter(argument)` returns `|x| x + argument`.
pub fn dirty_getter(argument: Expr) -> Expr {
    let handle = FnHandle::static_fn("Fixtures", "DirtyGetter", |args| match args {
        [Value::Int(argument)] => {
            let argument = *argument;
            Ok(int_lambda(move |x| add(x, Expr::int(argument))))
        }
        _ => Err(Error::target("DirtyGetter expects an int")),
    });
    Expr::call(None, handle, vec![argument], int_fn())
}

/// `Fixtures::GetGetter()` returns a plain function yielding 1.
pub fn get_getter() -> Expr {
    let handle = FnHandle::static_fn("Fixtures", "GetGetter", |_| {
        Ok(Value::function(0, |_| Ok(Value::Int(1))))
    });
    Expr::call(None, handle, vec![], Ty::function(vec![], Ty::Int))
}

fn expect_array(value: &Value) -> Result<Arc<[Value]>> {
    match value {
        Value::Array(values) => Ok(values.clone()),
        other => Err(Error::target(format!("expected array, got {}", other.type_name()))),
    }
}

/// `Seq::Where(items, predicate)`
pub fn where_(items: Expr, predicate: Expr) -> Expr {
    let handle = FnHandle::static_fn("Seq", "Where", |args| match args {
        [items, Value::Function(predicate)] => {
            let mut kept = Vec::new();
            for item in expect_array(items)?.iter() {
                if predicate.call(std::slice::from_ref(item))? == Value::Bool(true) {
                    kept.push(item.clone());
                }
            }
            Ok(Value::array(kept))
        }
        _ => Err(Error::target("Where expects items and a predicate")),
    });
    let ty = items.ty();
    Expr::call(None, handle, vec![items, predicate], ty)
}

/// `Seq::Single(items, predicate)`
pub fn single(items: Expr, predicate: Expr) -> Expr {
    let handle = FnHandle::static_fn("Seq", "Single", |args| match args {
        [items, Value::Function(predicate)] => {
            let mut found = None;
            for item in expect_array(items)?.iter() {
                if predicate.call(std::slice::from_ref(item))? == Value::Bool(true) {
                    if found.is_some() {
                        return Err(Error::target("sequence contains more than one matching element"));
                    }
                    found = Some(item.clone());
                }
            }
            found.ok_or_else(|| Error::target("sequence contains no matching element"))
        }
        _ => Err(Error::target("Single expects items and a predicate")),
    });
    Expr::call(None, handle, vec![items, predicate], Ty::Int)
}

#[derive(Default)]
struct DuplicateParameters {
    seen: Vec<ParamId>,
    duplicates: Vec<String>,
}

impl ExprRewriter for DuplicateParameters {
    fn rewrite_lambda(&mut self, lambda: &Arc<ExprLambda>) -> Result<Arc<ExprLambda>> {
        for param in &lambda.params {
            if self.seen.contains(&param.id()) {
                self.duplicates.push(param.name().to_string());
            }
            self.seen.push(param.id());
        }
        walk_lambda(self, lambda)
    }
}

pub fn assert_no_duplicate_parameters(expr: &TypedExpr) {
    let mut check = DuplicateParameters::default();
    check.rewrite_expr(&expr.to_expr()).expect("walk failed");
    assert!(
        check.duplicates.is_empty(),
        "duplicate parameters {:?} in {}",
        check.duplicates,
        expr
    );
}

#[derive(Default)]
struct Evaluations {
    found: Vec<String>,
}

impl ExprRewriter for Evaluations {
    fn rewrite_call(&mut self, expr: &Expr, call: &ExprCall) -> Result<Expr> {
        if call.handle.intrinsic().is_some() {
            self.found.push(expr.to_string());
        }
        walk_call(self, expr, call)
    }
}

pub fn assert_no_evaluations(expr: &TypedExpr) {
    let mut check = Evaluations::default();
    check.rewrite_expr(&expr.to_expr()).expect("walk failed");
    assert!(check.found.is_empty(), "evaluations left: {:?}", check.found);
}

#[derive(Default)]
struct Converts {
    found: Vec<String>,
}

impl ExprRewriter for Converts {
    fn rewrite_convert(&mut self, expr: &Expr, convert: &ExprConvert) -> Result<Expr> {
        self.found.push(expr.to_string());
        walk_convert(self, expr, convert)
    }
}

pub fn assert_no_converts(expr: &TypedExpr) {
    let mut check = Converts::default();
    check.rewrite_expr(&expr.to_expr()).expect("walk failed");
    assert!(check.found.is_empty(), "converts left: {:?}", check.found);
}
