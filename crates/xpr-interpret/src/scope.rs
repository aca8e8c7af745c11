//! Tree-walking interpreter.
//!
//! Scopes form a chain of parameter bindings. Evaluating a node yields either a value or
//! [`EvaluationResult::NotInterpretable`], which every enclosing node propagates untouched; the
//! caller then lowers the smallest enclosing lambda (or the whole tree) instead.

use crate::lowering::LoweringBackend;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};
use xpr_core::ast::*;
use xpr_core::error::Error;
use xpr_core::passes::bind_open_parameters;
use xpr_core::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    Value(Value),
    NotInterpretable,
}

impl EvaluationResult {
    pub fn is_not_interpretable(&self) -> bool {
        matches!(self, EvaluationResult::NotInterpretable)
    }
    pub fn into_value(self) -> Option<Value> {
        match self {
            EvaluationResult::Value(value) => Some(value),
            EvaluationResult::NotInterpretable => None,
        }
    }
}

macro_rules! try_value {
    ($result:expr) => {
        match $result? {
            EvaluationResult::Value(value) => value,
            EvaluationResult::NotInterpretable => return Ok(EvaluationResult::NotInterpretable),
        }
    };
}

macro_rules! try_values {
    ($result:expr) => {
        match $result? {
            Some(values) => values,
            None => return Ok(EvaluationResult::NotInterpretable),
        }
    };
}

/// Invokes a function value; anything else is not invocable.
pub fn invoke_value(callee: &Value, args: &[Value]) -> Result<Value> {
    match callee {
        Value::Function(func) => func.call(args),
        other => Err(Error::NotInvocable {
            found: other.type_name(),
        }),
    }
}

pub struct EvaluationScope {
    variables: HashMap<ParamId, Value>,
    parent: Option<Arc<EvaluationScope>>,
    backend: Arc<dyn LoweringBackend>,
}

impl EvaluationScope {
    pub fn root(backend: Arc<dyn LoweringBackend>) -> Arc<Self> {
        Arc::new(Self {
            variables: HashMap::new(),
            parent: None,
            backend,
        })
    }

    pub fn child(self: &Arc<Self>, params: &[Param], args: &[Value]) -> Arc<Self> {
        Arc::new(Self {
            variables: params
                .iter()
                .map(Param::id)
                .zip(args.iter().cloned())
                .collect(),
            parent: Some(self.clone()),
            backend: self.backend.clone(),
        })
    }

    pub fn backend(&self) -> &Arc<dyn LoweringBackend> {
        &self.backend
    }

    pub fn lookup(&self, param: &Param) -> Result<Value> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.variables.get(&param.id()) {
                return Ok(value.clone());
            }
            match &scope.parent {
                Some(parent) => scope = parent.as_ref(),
                None => {
                    return Err(Error::MissingParameter {
                        name: param.name().to_string(),
                    })
                }
            }
        }
    }

    /// The lambda with every parameter it reads from this scope chain bound to its value.
    pub fn close_over(&self, lambda: &Arc<ExprLambda>) -> Result<Arc<ExprLambda>> {
        bind_open_parameters(lambda, |param| self.lookup(param))
    }

    pub fn try_evaluate(self: &Arc<Self>, expr: &Expr) -> Result<EvaluationResult> {
        let value = match expr.kind() {
            ExprKind::Constant(c) => c.value.clone(),
            ExprKind::Parameter(p) => self.lookup(p)?,
            ExprKind::Member(m) => {
                if m.handle.is_static() {
                    m.handle.invoke(None, &[])?
                } else {
                    let target =
                        try_value!(self.try_evaluate_target(m.target.as_ref(), &m.handle));
                    m.handle.invoke(Some(&target), &[])?
                }
            }
            ExprKind::Call(c) => {
                let args = try_values!(self.try_evaluate_all(&c.args));
                if c.handle.is_static() {
                    c.handle.invoke(None, &args)?
                } else {
                    let target =
                        try_value!(self.try_evaluate_target(c.target.as_ref(), &c.handle));
                    c.handle.invoke(Some(&target), &args)?
                }
            }
            ExprKind::UnOp(u) => {
                let Some(handle) = u.handle.as_ref().filter(|h| h.is_static()) else {
                    trace!(op = %u.op, "primitive unary operator is left to the backend");
                    return Ok(EvaluationResult::NotInterpretable);
                };
                let operand = try_value!(self.try_evaluate(&u.operand));
                handle.invoke(None, &[operand])?
            }
            ExprKind::BinOp(b) => {
                let Some(handle) = b.handle.as_ref().filter(|h| h.is_static()) else {
                    trace!(op = %b.op, "primitive binary operator is left to the backend");
                    return Ok(EvaluationResult::NotInterpretable);
                };
                let lhs = try_value!(self.try_evaluate(&b.lhs));
                let rhs = try_value!(self.try_evaluate(&b.rhs));
                handle.invoke(None, &[lhs, rhs])?
            }
            ExprKind::Convert(c) => {
                let operand = try_value!(self.try_evaluate(&c.operand));
                match &c.handle {
                    Some(handle) => handle.invoke(None, &[operand])?,
                    None => operand.convert_to(&c.ty)?,
                }
            }
            ExprKind::NewArray(a) => Value::array(try_values!(self.try_evaluate_all(&a.elements))),
            ExprKind::Invocation(i) => {
                let args = try_values!(self.try_evaluate_all(&i.args));
                let callee = try_value!(self.try_evaluate(&i.callee));
                invoke_value(&callee, &args)?
            }
            ExprKind::Lambda(l) => Value::Function(self.lambda_function(l)),
            ExprKind::Quote(l) => Value::Expr(TypedExpr::from_lambda(self.close_over(l)?)),
        };
        Ok(EvaluationResult::Value(value))
    }

    fn try_evaluate_target(
        self: &Arc<Self>,
        target: Option<&Expr>,
        handle: &HandleRef,
    ) -> Result<EvaluationResult> {
        match target {
            Some(target) => self.try_evaluate(target),
            None => Err(Error::target(format!(
                "instance member {} has no target",
                handle.key()
            ))),
        }
    }

    fn try_evaluate_all(self: &Arc<Self>, exprs: &[Expr]) -> Result<Option<Vec<Value>>> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            match self.try_evaluate(expr)? {
                EvaluationResult::Value(value) => values.push(value),
                EvaluationResult::NotInterpretable => return Ok(None),
            }
        }
        Ok(Some(values))
    }

    /// Function value for a lambda. Each call interprets the body in a child scope; a body the
    /// interpreter cannot handle is closed over this scope and lowered instead.
    fn lambda_function(self: &Arc<Self>, lambda: &Arc<ExprLambda>) -> ValueFunction {
        let scope = self.clone();
        let lambda = lambda.clone();
        ValueFunction::new(lambda.params.len(), move |args| {
            let child = scope.child(&lambda.params, args);
            match child.try_evaluate(&lambda.body)? {
                EvaluationResult::Value(value) => Ok(value),
                EvaluationResult::NotInterpretable => {
                    debug!(
                        backend = scope.backend.name(),
                        "lambda body `{}` is not interpretable, lowering it", lambda.body
                    );
                    let closed = scope.close_over(&lambda)?;
                    let compiled = scope.backend.lower(&closed.params, &closed.body)?;
                    compiled(args)
                }
            }
        })
    }
}
