//! Inlines expression values at the sites that evaluate or compile them.
//!
//! Recognised sites are `Expr::Evaluate(f, args..)`, `f.Compile()(args..)` and
//! `f.Compile().Invoke(args..)`. The callee `f` is resolved to a lambda (a quote directly,
//! anything else by evaluating it), its body is expanded, its parameters are replaced by the
//! argument trees, and the result is expanded again. Other trees are left alone.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;
use xpr_core::ast::*;
use xpr_core::error::Error;
use xpr_core::passes::{has_open_parameters, substitute_parameters};
use xpr_core::visit::{walk_call, walk_convert, walk_invocation, ExprRewriter};
use xpr_core::Result;
use xpr_interpret::{config, evaluate_closed, LoweringBackend};

pub struct ExpressionExpander {
    backend: Arc<dyn LoweringBackend>,
}

impl ExpressionExpander {
    pub fn new(backend: Arc<dyn LoweringBackend>) -> Self {
        Self { backend }
    }

    /// Expander using the process-wide backend.
    pub fn from_config() -> Self {
        Self::new(config::backend())
    }

    pub fn expand(&mut self, expr: &TypedExpr) -> Result<TypedExpr> {
        let lambda = self.rewrite_lambda(expr.lambda())?;
        Ok(TypedExpr::from_lambda(lambda))
    }

    pub fn expand_expr(&mut self, expr: &Expr) -> Result<Expr> {
        self.rewrite_expr(expr)
    }

    fn resolve_callee(&self, callee: &Expr) -> Result<Arc<ExprLambda>> {
        if let ExprKind::Quote(lambda) = callee.kind() {
            return Ok(lambda.clone());
        }
        if has_open_parameters(callee)? {
            return Err(Error::OpenParameter {
                expr: callee.to_string(),
            });
        }
        match evaluate_closed(callee, &self.backend)? {
            Some(Value::Expr(expr)) => Ok(expr.lambda().clone()),
            Some(Value::Null) => Err(Error::NullCallee {
                expr: callee.to_string(),
            }),
            Some(other) => Err(Error::NotAnExpression {
                found: other.type_name(),
            }),
            None => Err(Error::OpenParameter {
                expr: callee.to_string(),
            }),
        }
    }

    /// Replaces the call site by the callee's body applied to `args`.
    fn substitute_expression(&mut self, site: &Expr, callee: &Expr, args: &[Expr]) -> Result<Expr> {
        let lambda = self.resolve_callee(callee)?;
        if lambda.params.len() != args.len() {
            return Err(Error::ArgumentCount {
                expected: lambda.params.len(),
                found: args.len(),
                expr: site.to_string(),
            });
        }
        let visited = self.rewrite_lambda(&lambda)?;
        let substitutions: HashMap<ParamId, Expr> = visited
            .params
            .iter()
            .map(Param::id)
            .zip(args.iter().cloned())
            .collect();
        let body = substitute_parameters(&visited.body, &substitutions)?;
        trace!("inlined `{}` at `{}`", callee, site);
        self.rewrite_expr(&body)
    }
}

fn compiled_target(expr: &Expr) -> Option<&Expr> {
    match expr.kind() {
        ExprKind::Call(call) if call.handle.intrinsic() == Some(Intrinsic::CompileExpr) => {
            call.target.as_ref()
        }
        _ => None,
    }
}

impl ExprRewriter for ExpressionExpander {
    fn rewrite_invocation(&mut self, expr: &Expr, invocation: &ExprInvocation) -> Result<Expr> {
        let base = walk_invocation(self, expr, invocation)?;
        if let ExprKind::Invocation(invocation) = base.kind() {
            if let Some(callee) = compiled_target(&invocation.callee) {
                return self.substitute_expression(&base, callee, &invocation.args);
            }
        }
        Ok(base)
    }

    fn rewrite_call(&mut self, expr: &Expr, call: &ExprCall) -> Result<Expr> {
        let base = walk_call(self, expr, call)?;
        let ExprKind::Call(call) = base.kind() else {
            return Ok(base);
        };
        match call.handle.intrinsic() {
            Some(Intrinsic::EvaluateExpr) => {
                if let Some((callee, args)) = call.args.split_first() {
                    return self.substitute_expression(&base, callee, args);
                }
            }
            Some(Intrinsic::InvokeFunction) => {
                if let Some(callee) = call.target.as_ref().and_then(compiled_target) {
                    return self.substitute_expression(&base, callee, &call.args);
                }
            }
            _ => {}
        }
        Ok(base)
    }

    /// Identity conversions left behind by substitution are dropped; user-defined conversions
    /// are kept.
    fn rewrite_convert(&mut self, expr: &Expr, convert: &ExprConvert) -> Result<Expr> {
        let base = walk_convert(self, expr, convert)?;
        if let ExprKind::Convert(convert) = base.kind() {
            if convert.handle.is_none() && convert.operand.ty() == convert.ty {
                return Ok(convert.operand.clone());
            }
        }
        Ok(base)
    }
}

/// Expands `expr` with the process-wide backend.
pub fn expand_expressions(expr: &TypedExpr) -> Result<TypedExpr> {
    ExpressionExpander::from_config().expand(expr)
}
