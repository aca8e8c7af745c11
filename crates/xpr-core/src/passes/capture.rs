use crate::ast::*;
use crate::holder::{holder_depth, holder_slot, slot_path};
use crate::visit::ExprRewriter;
use crate::Result;

#[derive(Default)]
struct CapturedValuesCollector {
    values: Vec<Value>,
}

impl ExprRewriter for CapturedValuesCollector {
    fn rewrite_constant(&mut self, expr: &Expr, constant: &ExprConstant) -> Result<Expr> {
        if !constant.value.is_null() {
            self.values.push(constant.value.clone());
        }
        Ok(expr.clone())
    }
}

/// Non-null constant values in walk order. The parametrizer assigns holder positions in the
/// same order.
pub fn captured_values(expr: &Expr) -> Result<Vec<Value>> {
    let mut collector = CapturedValuesCollector::default();
    collector.rewrite_expr(expr)?;
    Ok(collector.values)
}

struct CapturedValuesParametrizer {
    holder: Param,
    depth: usize,
    visited: usize,
}

impl ExprRewriter for CapturedValuesParametrizer {
    fn rewrite_constant(&mut self, expr: &Expr, constant: &ExprConstant) -> Result<Expr> {
        if constant.value.is_null() {
            return Ok(expr.clone());
        }
        let path = slot_path(self.visited, self.depth);
        self.visited += 1;
        let last = path.len() - 1;
        let read = path
            .into_iter()
            .enumerate()
            .fold(Expr::parameter(&self.holder), |target, (level, slot)| {
                let ty = if level == last { Ty::Any } else { Ty::Holder };
                Expr::member(Some(target), holder_slot(slot), ty)
            });
        Ok(Expr::convert(read, constant.ty.clone()))
    }
}

/// Rewrites each non-null constant into a typed read from the holder parameter. `count` is the
/// number of captured values, which fixes the holder depth.
pub fn parametrize(expr: &Expr, holder: &Param, count: usize) -> Result<Expr> {
    debug!(count, "parametrizing captured values");
    let mut parametrizer = CapturedValuesParametrizer {
        holder: holder.clone(),
        depth: holder_depth(count),
        visited: 0,
    };
    parametrizer.rewrite_expr(expr)
}
