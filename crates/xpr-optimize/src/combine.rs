//! Boolean composition of lambdas with the same parameter list.

use crate::{opt_bail, opt_ensure};
use itertools::Itertools;
use std::collections::HashMap;
use xpr_core::ast::*;
use xpr_core::ops::BinOpKind;
use xpr_core::passes::substitute_parameters;
use xpr_core::Result;

/// `|p..| e0(p..) && e1(p..) && ..`, evaluated left to right with short-circuiting.
pub fn combine_via_and_also(exprs: &[TypedExpr]) -> Result<TypedExpr> {
    combine(exprs, BinOpKind::And)
}

/// `|p..| e0(p..) || e1(p..) || ..`
pub fn combine_via_or_else(exprs: &[TypedExpr]) -> Result<TypedExpr> {
    combine(exprs, BinOpKind::Or)
}

pub fn and_also(lhs: &TypedExpr, rhs: &TypedExpr) -> Result<TypedExpr> {
    combine(&[lhs.clone(), rhs.clone()], BinOpKind::And)
}

pub fn or_else(lhs: &TypedExpr, rhs: &TypedExpr) -> Result<TypedExpr> {
    combine(&[lhs.clone(), rhs.clone()], BinOpKind::Or)
}

fn combine(exprs: &[TypedExpr], op: BinOpKind) -> Result<TypedExpr> {
    let Some((first, rest)) = exprs.split_first() else {
        opt_bail!("no expressions to combine");
    };
    let params = first.params().to_vec();
    let mut body = first.body().clone();
    for expr in rest {
        let types_match = expr.params().len() == params.len()
            && expr
                .params()
                .iter()
                .zip(&params)
                .all(|(a, b)| a.ty() == b.ty());
        opt_ensure!(
            types_match,
            "parameters ({}) differ from ({})",
            expr.params().iter().map(|p| p.ty()).join(", "),
            params.iter().map(|p| p.ty()).join(", ")
        );
        let substitutions: HashMap<ParamId, Expr> = expr
            .params()
            .iter()
            .zip(&params)
            .map(|(old, new)| (old.id(), Expr::parameter(new)))
            .collect();
        let rhs = substitute_parameters(expr.body(), &substitutions)?;
        body = Expr::binop(op, body, rhs);
    }
    Ok(TypedExpr::new(params, body))
}
