//! Rebuilding tree walk. Every hook receives the original node and returns the replacement;
//! the `walk_*` functions rewrite children and reuse the original node when none changed.

use crate::ast::*;
use crate::Result;
use std::sync::Arc;

pub trait ExprRewriter: Sized {
    fn rewrite_expr(&mut self, expr: &Expr) -> Result<Expr> {
        walk_expr(self, expr)
    }
    fn rewrite_constant(&mut self, expr: &Expr, _constant: &ExprConstant) -> Result<Expr> {
        Ok(expr.clone())
    }
    fn rewrite_parameter(&mut self, expr: &Expr, _param: &Param) -> Result<Expr> {
        Ok(expr.clone())
    }
    fn rewrite_member(&mut self, expr: &Expr, member: &ExprMember) -> Result<Expr> {
        walk_member(self, expr, member)
    }
    fn rewrite_call(&mut self, expr: &Expr, call: &ExprCall) -> Result<Expr> {
        walk_call(self, expr, call)
    }
    fn rewrite_unop(&mut self, expr: &Expr, unop: &ExprUnOp) -> Result<Expr> {
        walk_unop(self, expr, unop)
    }
    fn rewrite_binop(&mut self, expr: &Expr, binop: &ExprBinOp) -> Result<Expr> {
        walk_binop(self, expr, binop)
    }
    fn rewrite_convert(&mut self, expr: &Expr, convert: &ExprConvert) -> Result<Expr> {
        walk_convert(self, expr, convert)
    }
    fn rewrite_new_array(&mut self, expr: &Expr, array: &ExprNewArray) -> Result<Expr> {
        walk_new_array(self, expr, array)
    }
    fn rewrite_invocation(&mut self, expr: &Expr, invocation: &ExprInvocation) -> Result<Expr> {
        walk_invocation(self, expr, invocation)
    }
    /// Shared by lambda and quote nodes.
    fn rewrite_lambda(&mut self, lambda: &Arc<ExprLambda>) -> Result<Arc<ExprLambda>> {
        walk_lambda(self, lambda)
    }
}

pub fn walk_expr<R: ExprRewriter>(r: &mut R, expr: &Expr) -> Result<Expr> {
    match expr.kind() {
        ExprKind::Constant(c) => r.rewrite_constant(expr, c),
        ExprKind::Parameter(p) => r.rewrite_parameter(expr, p),
        ExprKind::Member(m) => r.rewrite_member(expr, m),
        ExprKind::Call(c) => r.rewrite_call(expr, c),
        ExprKind::UnOp(u) => r.rewrite_unop(expr, u),
        ExprKind::BinOp(b) => r.rewrite_binop(expr, b),
        ExprKind::Convert(c) => r.rewrite_convert(expr, c),
        ExprKind::NewArray(a) => r.rewrite_new_array(expr, a),
        ExprKind::Invocation(i) => r.rewrite_invocation(expr, i),
        ExprKind::Lambda(l) => {
            let lambda = r.rewrite_lambda(l)?;
            Ok(if Arc::ptr_eq(&lambda, l) {
                expr.clone()
            } else {
                Expr::new(ExprKind::Lambda(lambda))
            })
        }
        ExprKind::Quote(l) => {
            let lambda = r.rewrite_lambda(l)?;
            Ok(if Arc::ptr_eq(&lambda, l) {
                expr.clone()
            } else {
                Expr::new(ExprKind::Quote(lambda))
            })
        }
    }
}

/// Rewrites each element; `None` when every element came back unchanged.
pub fn rewrite_list<R: ExprRewriter>(r: &mut R, exprs: &[Expr]) -> Result<Option<Vec<Expr>>> {
    let mut changed = false;
    let mut out = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let new = r.rewrite_expr(expr)?;
        changed |= !new.ptr_eq(expr);
        out.push(new);
    }
    Ok(changed.then_some(out))
}

fn rewrite_opt<R: ExprRewriter>(r: &mut R, expr: Option<&Expr>) -> Result<(Option<Expr>, bool)> {
    match expr {
        Some(expr) => {
            let new = r.rewrite_expr(expr)?;
            let changed = !new.ptr_eq(expr);
            Ok((Some(new), changed))
        }
        None => Ok((None, false)),
    }
}

pub fn walk_member<R: ExprRewriter>(r: &mut R, expr: &Expr, member: &ExprMember) -> Result<Expr> {
    let (target, changed) = rewrite_opt(r, member.target.as_ref())?;
    if !changed {
        return Ok(expr.clone());
    }
    Ok(Expr::new(ExprKind::Member(ExprMember {
        target,
        ..member.clone()
    })))
}

pub fn walk_call<R: ExprRewriter>(r: &mut R, expr: &Expr, call: &ExprCall) -> Result<Expr> {
    let (target, target_changed) = rewrite_opt(r, call.target.as_ref())?;
    let args = rewrite_list(r, &call.args)?;
    if !target_changed && args.is_none() {
        return Ok(expr.clone());
    }
    Ok(Expr::new(ExprKind::Call(ExprCall {
        target,
        handle: call.handle.clone(),
        args: args.unwrap_or_else(|| call.args.clone()),
        ty: call.ty.clone(),
    })))
}

pub fn walk_unop<R: ExprRewriter>(r: &mut R, expr: &Expr, unop: &ExprUnOp) -> Result<Expr> {
    let operand = r.rewrite_expr(&unop.operand)?;
    if operand.ptr_eq(&unop.operand) {
        return Ok(expr.clone());
    }
    Ok(Expr::new(ExprKind::UnOp(ExprUnOp {
        operand,
        ..unop.clone()
    })))
}

pub fn walk_binop<R: ExprRewriter>(r: &mut R, expr: &Expr, binop: &ExprBinOp) -> Result<Expr> {
    let lhs = r.rewrite_expr(&binop.lhs)?;
    let rhs = r.rewrite_expr(&binop.rhs)?;
    if lhs.ptr_eq(&binop.lhs) && rhs.ptr_eq(&binop.rhs) {
        return Ok(expr.clone());
    }
    Ok(Expr::new(ExprKind::BinOp(ExprBinOp {
        lhs,
        rhs,
        ..binop.clone()
    })))
}

pub fn walk_convert<R: ExprRewriter>(r: &mut R, expr: &Expr, convert: &ExprConvert) -> Result<Expr> {
    let operand = r.rewrite_expr(&convert.operand)?;
    if operand.ptr_eq(&convert.operand) {
        return Ok(expr.clone());
    }
    Ok(Expr::new(ExprKind::Convert(ExprConvert {
        operand,
        ..convert.clone()
    })))
}

pub fn walk_new_array<R: ExprRewriter>(r: &mut R, expr: &Expr, array: &ExprNewArray) -> Result<Expr> {
    match rewrite_list(r, &array.elements)? {
        Some(elements) => Ok(Expr::new(ExprKind::NewArray(ExprNewArray {
            elem_ty: array.elem_ty.clone(),
            elements,
        }))),
        None => Ok(expr.clone()),
    }
}

pub fn walk_invocation<R: ExprRewriter>(
    r: &mut R,
    expr: &Expr,
    invocation: &ExprInvocation,
) -> Result<Expr> {
    let callee = r.rewrite_expr(&invocation.callee)?;
    let args = rewrite_list(r, &invocation.args)?;
    if callee.ptr_eq(&invocation.callee) && args.is_none() {
        return Ok(expr.clone());
    }
    Ok(Expr::new(ExprKind::Invocation(ExprInvocation {
        callee,
        args: args.unwrap_or_else(|| invocation.args.clone()),
        ty: invocation.ty.clone(),
    })))
}

pub fn walk_lambda<R: ExprRewriter>(r: &mut R, lambda: &Arc<ExprLambda>) -> Result<Arc<ExprLambda>> {
    let body = r.rewrite_expr(&lambda.body)?;
    if body.ptr_eq(&lambda.body) {
        return Ok(lambda.clone());
    }
    Ok(Arc::new(ExprLambda {
        params: lambda.params.clone(),
        body,
        ret: lambda.ret.clone(),
    }))
}
