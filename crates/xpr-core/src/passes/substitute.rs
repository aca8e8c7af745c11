use crate::ast::*;
use crate::passes::open_parameters;
use crate::visit::ExprRewriter;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Replaces parameter occurrences by the mapped expressions.
///
/// Every lambda met on the way, including lambdas inside the replacements, is rebuilt with fresh
/// parameter identities, so splicing one tree into several places never shares a binding.
pub struct ParameterSubstitutor {
    substitutions: HashMap<ParamId, Expr>,
}

impl ParameterSubstitutor {
    pub fn new(substitutions: HashMap<ParamId, Expr>) -> Self {
        Self { substitutions }
    }
}

impl ExprRewriter for ParameterSubstitutor {
    fn rewrite_parameter(&mut self, expr: &Expr, param: &Param) -> Result<Expr> {
        match self.substitutions.get(&param.id()) {
            Some(replacement) => substitute_parameters(replacement, &HashMap::new()),
            None => Ok(expr.clone()),
        }
    }

    fn rewrite_lambda(&mut self, lambda: &Arc<ExprLambda>) -> Result<Arc<ExprLambda>> {
        let params: Vec<Param> = lambda.params.iter().map(Param::refresh).collect();
        for (old, new) in lambda.params.iter().zip(&params) {
            self.substitutions.insert(old.id(), Expr::parameter(new));
        }
        let body = self.rewrite_expr(&lambda.body)?;
        Ok(Arc::new(ExprLambda {
            params,
            body,
            ret: lambda.ret.clone(),
        }))
    }
}

pub fn substitute_parameters(expr: &Expr, substitutions: &HashMap<ParamId, Expr>) -> Result<Expr> {
    ParameterSubstitutor::new(substitutions.clone()).rewrite_expr(expr)
}

pub fn substitute_lambda(
    lambda: &Arc<ExprLambda>,
    substitutions: &HashMap<ParamId, Expr>,
) -> Result<Arc<ExprLambda>> {
    ParameterSubstitutor::new(substitutions.clone()).rewrite_lambda(lambda)
}

/// Replaces every open parameter of `lambda` by a constant holding the value `lookup` finds for
/// it, yielding a closed lambda that no longer depends on the surrounding scope.
pub fn bind_open_parameters(
    lambda: &Arc<ExprLambda>,
    mut lookup: impl FnMut(&Param) -> Result<Value>,
) -> Result<Arc<ExprLambda>> {
    let open = open_parameters(&Expr::new(ExprKind::Lambda(lambda.clone())))?;
    if open.is_empty() {
        return Ok(lambda.clone());
    }
    let mut substitutions = HashMap::with_capacity(open.len());
    for param in open {
        let value = lookup(&param)?;
        substitutions.insert(param.id(), Expr::constant(value, param.ty().clone()));
    }
    substitute_lambda(lambda, &substitutions)
}
