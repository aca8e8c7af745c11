use crate::passes::ExpressionExpander;
use xpr_core::ast::{Expr, TypedExpr, Value};
use xpr_core::error::Error;
use xpr_core::Result;
use xpr_interpret::config;

/// Expansion and evaluation for expression values, using the process-wide configuration.
pub trait TypedExprExt {
    /// Inlines every reachable evaluate/compile site.
    fn expand_expressions(&self) -> Result<TypedExpr>;
    /// Expands, then applies the lambda to `args` through the configured evaluator.
    fn evaluate(&self, args: &[Value]) -> Result<Value>;
}

impl TypedExprExt for TypedExpr {
    fn expand_expressions(&self) -> Result<TypedExpr> {
        ExpressionExpander::from_config().expand(self)
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        if args.len() != self.params().len() {
            return Err(Error::ArgumentCount {
                expected: self.params().len(),
                found: args.len(),
                expr: self.to_string(),
            });
        }
        let expanded = self.expand_expressions()?;
        let args = expanded
            .params()
            .iter()
            .zip(args)
            .map(|(param, value)| Expr::constant(value.clone(), param.ty().clone()))
            .collect();
        config::evaluator().evaluate(&Expr::invoke(expanded.to_expr(), args))
    }
}
