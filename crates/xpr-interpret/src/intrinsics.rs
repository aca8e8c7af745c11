//! Host handles for evaluating, compiling and invoking expression values from inside a tree.
//!
//! Handles are invoked without the evaluator that runs the enclosing tree, so every expression
//! value they apply or compile is lowered with the process-wide [`config::backend`], not the
//! backend of that evaluator.

use crate::config;
use crate::scope::{invoke_value, EvaluationResult, EvaluationScope};
use std::sync::OnceLock;
use xpr_core::ast::*;
use xpr_core::error::Error;
use xpr_core::Result;

fn expect_expr<'a>(value: Option<&'a Value>, site: &str) -> Result<&'a TypedExpr> {
    match value {
        None | Some(Value::Null) => Err(Error::NullCallee {
            expr: site.to_string(),
        }),
        Some(Value::Expr(expr)) => Ok(expr),
        Some(other) => Err(Error::NotAnExpression {
            found: other.type_name(),
        }),
    }
}

/// Applies an expression value to arguments, lowering with [`config::backend`] when the body is
/// not interpretable.
pub fn apply(expr: &TypedExpr, args: &[Value]) -> Result<Value> {
    let backend = config::backend();
    match EvaluationScope::root(backend.clone()).try_evaluate(&expr.to_expr())? {
        EvaluationResult::Value(function) => invoke_value(&function, args),
        EvaluationResult::NotInterpretable => {
            let compiled = backend.lower(expr.params(), expr.body())?;
            compiled(args)
        }
    }
}

/// `Expr::Evaluate(expr, args..)`
#[derive(Debug)]
pub struct EvaluateExpr;

impl Handle for EvaluateExpr {
    fn name(&self) -> &str {
        "Evaluate"
    }
    fn declaring_type(&self) -> &str {
        "Expr"
    }
    fn is_static(&self) -> bool {
        true
    }
    fn invoke(&self, _target: Option<&Value>, args: &[Value]) -> Result<Value> {
        let (callee, args) = match args.split_first() {
            Some((callee, args)) => (Some(callee), args),
            None => (None, args),
        };
        let expr = expect_expr(callee, "Expr::Evaluate")?;
        apply(expr, args)
    }
    fn intrinsic(&self) -> Option<Intrinsic> {
        Some(Intrinsic::EvaluateExpr)
    }
}

/// `expr.Compile()`
#[derive(Debug)]
pub struct CompileExpr;

impl Handle for CompileExpr {
    fn name(&self) -> &str {
        "Compile"
    }
    fn declaring_type(&self) -> &str {
        "Expr"
    }
    fn is_static(&self) -> bool {
        false
    }
    fn invoke(&self, target: Option<&Value>, _args: &[Value]) -> Result<Value> {
        let expr = expect_expr(target, "Expr.Compile")?;
        let compiled = config::backend().lower(expr.params(), expr.body())?;
        Ok(Value::function(expr.params().len(), move |args| compiled(args)))
    }
    fn intrinsic(&self) -> Option<Intrinsic> {
        Some(Intrinsic::CompileExpr)
    }
}

/// `function.Invoke(args..)`
#[derive(Debug)]
pub struct InvokeFunction;

impl Handle for InvokeFunction {
    fn name(&self) -> &str {
        "Invoke"
    }
    fn declaring_type(&self) -> &str {
        "Function"
    }
    fn is_static(&self) -> bool {
        false
    }
    fn invoke(&self, target: Option<&Value>, args: &[Value]) -> Result<Value> {
        match target {
            Some(function) => invoke_value(function, args),
            None => Err(Error::NotInvocable {
                found: "null".to_string(),
            }),
        }
    }
    fn intrinsic(&self) -> Option<Intrinsic> {
        Some(Intrinsic::InvokeFunction)
    }
}

pub fn evaluate_handle() -> HandleRef {
    static HANDLE: OnceLock<HandleRef> = OnceLock::new();
    HANDLE.get_or_init(|| HandleRef::new(EvaluateExpr)).clone()
}

pub fn compile_handle() -> HandleRef {
    static HANDLE: OnceLock<HandleRef> = OnceLock::new();
    HANDLE.get_or_init(|| HandleRef::new(CompileExpr)).clone()
}

pub fn invoke_handle() -> HandleRef {
    static HANDLE: OnceLock<HandleRef> = OnceLock::new();
    HANDLE.get_or_init(|| HandleRef::new(InvokeFunction)).clone()
}

/// Constant node holding an expression value.
pub fn expr_constant(expr: &TypedExpr) -> Expr {
    Expr::constant(Value::Expr(expr.clone()), Ty::Expr(expr.signature()))
}

/// `Expr::Evaluate(callee, args..)`
pub fn evaluate_call(callee: Expr, args: Vec<Expr>) -> Expr {
    let ty = callee.ty().ret().cloned().unwrap_or(Ty::Any);
    let mut all = Vec::with_capacity(args.len() + 1);
    all.push(callee);
    all.extend(args);
    Expr::call(None, evaluate_handle(), all, ty)
}

/// `callee.Compile()`
pub fn compile_call(callee: Expr) -> Expr {
    let ty = match callee.ty() {
        Ty::Expr(signature) => Ty::Function(signature),
        _ => Ty::Any,
    };
    Expr::call(Some(callee), compile_handle(), vec![], ty)
}

/// `function.Invoke(args..)`
pub fn invoke_call(function: Expr, args: Vec<Expr>) -> Expr {
    let ty = function.ty().ret().cloned().unwrap_or(Ty::Any);
    Expr::call(Some(function), invoke_handle(), args, ty)
}
