//! Lowering of expression trees into executable closures.
//!
//! Parameters are resolved to frame slots when a tree is lowered, so running a compiled unit
//! never consults the tree again.

use crate::error::lowering_error;
use crate::lowering_bail;
use crate::scope::invoke_value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use xpr_core::ast::*;
use xpr_core::error::Error;
use xpr_core::ops::{eval_binop, eval_unop, BinOpKind};
use xpr_core::passes::{bind_open_parameters, open_parameters};
use xpr_core::Result;

/// Executable unit produced by a backend; takes the lambda's arguments in order.
pub type CompiledFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Turns a lambda into an executable unit.
pub trait LoweringBackend: Send + Sync {
    fn name(&self) -> &str;
    fn lower(&self, params: &[Param], body: &Expr) -> Result<CompiledFn>;
}

/// Activation record of one call to a lowered lambda.
struct Frame {
    values: Vec<Value>,
    parent: Option<Arc<Frame>>,
}

impl Frame {
    fn lookup(&self, up: usize, index: usize) -> Result<Value> {
        let mut frame = self;
        for _ in 0..up {
            frame = frame
                .parent
                .as_deref()
                .ok_or_else(|| lowering_error("frame chain is shorter than the lexical depth"))?;
        }
        frame
            .values
            .get(index)
            .cloned()
            .ok_or_else(|| lowering_error(format!("frame slot {} is out of range", index)))
    }
}

type Code = Arc<dyn Fn(&Arc<Frame>) -> Result<Value> + Send + Sync>;

fn code<F>(f: F) -> Code
where
    F: Fn(&Arc<Frame>) -> Result<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn run_all(codes: &[Code], frame: &Arc<Frame>) -> Result<Vec<Value>> {
    codes.iter().map(|c| c(frame)).collect()
}

/// Backend compiling trees into nested Rust closures.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClosureBackend;

impl LoweringBackend for ClosureBackend {
    fn name(&self) -> &str {
        "closure"
    }

    fn lower(&self, params: &[Param], body: &Expr) -> Result<CompiledFn> {
        let mut lowerer = Lowerer {
            scopes: vec![params.iter().map(Param::id).collect()],
        };
        let body = lowerer.lower(body)?;
        let arity = params.len();
        debug!(arity, "lowered expression tree");
        Ok(Arc::new(move |args: &[Value]| {
            if args.len() != arity {
                return Err(Error::ArgumentCount {
                    expected: arity,
                    found: args.len(),
                    expr: "compiled unit".to_string(),
                });
            }
            body(&Arc::new(Frame {
                values: args.to_vec(),
                parent: None,
            }))
        }))
    }
}

struct Lowerer {
    scopes: Vec<Vec<ParamId>>,
}

impl Lowerer {
    fn resolve(&self, param: &Param) -> Result<(usize, usize)> {
        for (up, scope) in self.scopes.iter().rev().enumerate() {
            if let Some(index) = scope.iter().position(|id| *id == param.id()) {
                return Ok((up, index));
            }
        }
        Err(Error::MissingParameter {
            name: param.name().to_string(),
        })
    }

    fn lower_all(&mut self, exprs: &[Expr]) -> Result<Vec<Code>> {
        exprs.iter().map(|e| self.lower(e)).collect()
    }

    fn lower(&mut self, expr: &Expr) -> Result<Code> {
        match expr.kind() {
            ExprKind::Constant(c) => {
                let value = c.value.clone();
                Ok(code(move |_| Ok(value.clone())))
            }
            ExprKind::Parameter(p) => {
                let (up, index) = self.resolve(p)?;
                Ok(code(move |f| f.lookup(up, index)))
            }
            ExprKind::Member(m) => self.lower_member(m),
            ExprKind::Call(c) => self.lower_call(c),
            ExprKind::UnOp(u) => {
                let operand = self.lower(&u.operand)?;
                let op = u.op;
                Ok(match u.handle.clone() {
                    Some(handle) => code(move |f| handle.invoke(None, &[operand(f)?])),
                    None => code(move |f| eval_unop(op, &operand(f)?)),
                })
            }
            ExprKind::BinOp(b) => self.lower_binop(b),
            ExprKind::Convert(c) => {
                let operand = self.lower(&c.operand)?;
                let ty = c.ty.clone();
                Ok(match c.handle.clone() {
                    Some(handle) => code(move |f| handle.invoke(None, &[operand(f)?])),
                    None => code(move |f| operand(f)?.convert_to(&ty)),
                })
            }
            ExprKind::NewArray(a) => {
                let elements = self.lower_all(&a.elements)?;
                Ok(code(move |f| Ok(Value::array(run_all(&elements, f)?))))
            }
            ExprKind::Invocation(i) => {
                let callee = self.lower(&i.callee)?;
                let args = self.lower_all(&i.args)?;
                Ok(code(move |f| {
                    let callee = callee(f)?;
                    invoke_value(&callee, &run_all(&args, f)?)
                }))
            }
            ExprKind::Lambda(l) => self.lower_lambda(l),
            ExprKind::Quote(l) => self.lower_quote(expr, l),
        }
    }

    fn lower_member(&mut self, member: &ExprMember) -> Result<Code> {
        let handle = member.handle.clone();
        if handle.is_static() {
            return Ok(code(move |_| handle.invoke(None, &[])));
        }
        let Some(target) = &member.target else {
            lowering_bail!("instance member {} has no target", handle.key());
        };
        let target = self.lower(target)?;
        Ok(code(move |f| handle.invoke(Some(&target(f)?), &[])))
    }

    fn lower_call(&mut self, call: &ExprCall) -> Result<Code> {
        let handle = call.handle.clone();
        if handle.is_static() {
            let args = self.lower_all(&call.args)?;
            return Ok(code(move |f| handle.invoke(None, &run_all(&args, f)?)));
        }
        let Some(target) = &call.target else {
            lowering_bail!("instance method {} has no target", handle.key());
        };
        let target = self.lower(target)?;
        let args = self.lower_all(&call.args)?;
        Ok(code(move |f| {
            let target = target(f)?;
            handle.invoke(Some(&target), &run_all(&args, f)?)
        }))
    }

    fn lower_binop(&mut self, binop: &ExprBinOp) -> Result<Code> {
        let lhs = self.lower(&binop.lhs)?;
        let rhs = self.lower(&binop.rhs)?;
        let op = binop.op;
        if let Some(handle) = binop.handle.clone() {
            return Ok(code(move |f| handle.invoke(None, &[lhs(f)?, rhs(f)?])));
        }
        Ok(match op {
            BinOpKind::And => code(move |f| match lhs(f)? {
                Value::Bool(false) => Ok(Value::Bool(false)),
                Value::Bool(true) => rhs(f),
                other => eval_binop(op, &other, &rhs(f)?),
            }),
            BinOpKind::Or => code(move |f| match lhs(f)? {
                Value::Bool(true) => Ok(Value::Bool(true)),
                Value::Bool(false) => rhs(f),
                other => eval_binop(op, &other, &rhs(f)?),
            }),
            _ => code(move |f| eval_binop(op, &lhs(f)?, &rhs(f)?)),
        })
    }

    fn lower_lambda(&mut self, lambda: &Arc<ExprLambda>) -> Result<Code> {
        self.scopes.push(lambda.params.iter().map(Param::id).collect());
        let body = self.lower(&lambda.body);
        self.scopes.pop();
        let body = body?;
        let arity = lambda.params.len();
        Ok(code(move |f| {
            let parent = f.clone();
            let body = body.clone();
            Ok(Value::function(arity, move |args| {
                body(&Arc::new(Frame {
                    values: args.to_vec(),
                    parent: Some(parent.clone()),
                }))
            }))
        }))
    }

    /// A quote evaluates to its lambda with the enclosing parameters it reads bound to their
    /// current values.
    fn lower_quote(&mut self, expr: &Expr, lambda: &Arc<ExprLambda>) -> Result<Code> {
        let mut slots = HashMap::new();
        for param in open_parameters(expr)? {
            slots.insert(param.id(), self.resolve(&param)?);
        }
        let lambda = lambda.clone();
        Ok(code(move |f| {
            let closed = bind_open_parameters(&lambda, |param| match slots.get(&param.id()) {
                Some((up, index)) => f.lookup(*up, *index),
                None => Err(Error::MissingParameter {
                    name: param.name().to_string(),
                }),
            })?;
            Ok(Value::Expr(TypedExpr::from_lambda(closed)))
        }))
    }
}
