use crate::ast::*;
use crate::visit::{walk_lambda, ExprRewriter};
use crate::Result;
use std::sync::Arc;

/// Collects parameter occurrences not bound by an enclosing lambda of the walked tree.
#[derive(Default)]
struct OpenParameterCollector {
    bound: Vec<ParamId>,
    open: Vec<Param>,
}

impl ExprRewriter for OpenParameterCollector {
    fn rewrite_parameter(&mut self, expr: &Expr, param: &Param) -> Result<Expr> {
        if !self.bound.contains(&param.id()) && !self.open.contains(param) {
            self.open.push(param.clone());
        }
        Ok(expr.clone())
    }

    fn rewrite_lambda(&mut self, lambda: &Arc<ExprLambda>) -> Result<Arc<ExprLambda>> {
        let depth = self.bound.len();
        self.bound.extend(lambda.params.iter().map(Param::id));
        let result = walk_lambda(self, lambda);
        self.bound.truncate(depth);
        result
    }
}

/// Open parameters in order of first occurrence.
pub fn open_parameters(expr: &Expr) -> Result<Vec<Param>> {
    let mut collector = OpenParameterCollector::default();
    collector.rewrite_expr(expr)?;
    Ok(collector.open)
}

pub fn has_open_parameters(expr: &Expr) -> Result<bool> {
    Ok(!open_parameters(expr)?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::BinOpKind;

    #[test]
    fn test_bound_parameters_are_not_open() {
        let x = Param::new("x", Ty::Int);
        let lambda = Expr::lambda(vec![x.clone()], Expr::parameter(&x));
        assert!(!has_open_parameters(&lambda).unwrap());
        assert!(has_open_parameters(&Expr::parameter(&x)).unwrap());
    }

    #[test]
    fn test_outer_parameter_inside_inner_lambda_is_open() {
        let x = Param::new("x", Ty::Int);
        let y = Param::new("y", Ty::Int);
        let inner = Expr::lambda(
            vec![y.clone()],
            Expr::binop(BinOpKind::Add, Expr::parameter(&x), Expr::parameter(&y)),
        );
        assert_eq!(open_parameters(&inner).unwrap(), vec![x.clone()]);
        let outer = Expr::lambda(vec![x.clone()], inner);
        assert!(open_parameters(&outer).unwrap().is_empty());
    }

    #[test]
    fn test_quote_binds_its_parameters() {
        let y = Param::new("y", Ty::Int);
        let quote = Expr::quote(vec![y.clone()], Expr::parameter(&y));
        assert!(!has_open_parameters(&quote).unwrap());
    }
}
