//! Textual forms of expression trees: a readable rendering for diagnostics and the shape key
//! that identifies trees equal up to non-null constant values.

use crate::ast::*;
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter, Write};

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            ExprKind::Constant(c) => write!(f, "{}", c.value),
            ExprKind::Parameter(p) => write!(f, "{}", p),
            ExprKind::Member(m) => match &m.target {
                Some(target) => write!(f, "{}.{}", target, m.handle.name()),
                None => write!(f, "{}::{}", m.handle.declaring_type(), m.handle.name()),
            },
            ExprKind::Call(c) => {
                match &c.target {
                    Some(target) => write!(f, "{}.{}", target, c.handle.name())?,
                    None => write!(f, "{}::{}", c.handle.declaring_type(), c.handle.name())?,
                }
                write!(f, "({})", c.args.iter().join(", "))
            }
            ExprKind::UnOp(u) => write!(f, "{}{}", u.op, u.operand),
            ExprKind::BinOp(b) => write!(f, "({} {} {})", b.lhs, b.op, b.rhs),
            ExprKind::Convert(c) => write!(f, "({} as {})", c.operand, c.ty),
            ExprKind::NewArray(a) => write!(f, "[{}]", a.elements.iter().join(", ")),
            ExprKind::Invocation(i) => match i.callee.kind() {
                ExprKind::Lambda(_) => write!(f, "({})({})", i.callee, i.args.iter().join(", ")),
                _ => write!(f, "{}({})", i.callee, i.args.iter().join(", ")),
            },
            ExprKind::Lambda(l) => write!(f, "|{}| {}", l.params.iter().join(", "), l.body),
            ExprKind::Quote(l) => write!(f, "quote(|{}| {})", l.params.iter().join(", "), l.body),
        }
    }
}

impl Debug for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Canonical key of a tree's shape. Non-null constants print only their type, lambda
/// parameters print by binding position, so two trees differing only in captured values
/// share a key. Null constants stay distinct because they are never captured.
pub fn shape_key(expr: &Expr) -> String {
    let mut printer = ShapePrinter::default();
    printer.print(expr);
    printer.out
}

/// Handles are keyed by identity; the name is only for reading keys in logs.
fn handle_key(handle: &HandleRef) -> String {
    format!("{}@{}", handle.key(), handle.id())
}

#[derive(Default)]
struct ShapePrinter {
    out: String,
    bound: HashMap<ParamId, usize>,
}

impl ShapePrinter {
    fn print(&mut self, expr: &Expr) {
        match expr.kind() {
            ExprKind::Constant(c) if c.value.is_null() => self.push(format_args!("null:{}", c.ty)),
            ExprKind::Constant(c) => self.push(format_args!("$:{}", c.ty)),
            ExprKind::Parameter(p) => match self.bound.get(&p.id()).copied() {
                Some(index) => self.push(format_args!("p{}", index)),
                None => self.push(format_args!("free:{}{}:{}", p.name(), p.id(), p.ty())),
            },
            ExprKind::Member(m) => {
                self.push(format_args!("member[{}:{}](", handle_key(&m.handle), m.ty));
                if let Some(target) = &m.target {
                    self.print(target);
                }
                self.out.push(')');
            }
            ExprKind::Call(c) => {
                self.push(format_args!("call[{}:{}](", handle_key(&c.handle), c.ty));
                if let Some(target) = &c.target {
                    self.print(target);
                }
                self.out.push(';');
                self.print_list(&c.args);
                self.out.push(')');
            }
            ExprKind::UnOp(u) => {
                self.push(format_args!("unop[{}", u.op));
                self.print_handle(u.handle.as_ref());
                self.push(format_args!(":{}](", u.ty));
                self.print(&u.operand);
                self.out.push(')');
            }
            ExprKind::BinOp(b) => {
                self.push(format_args!("binop[{}", b.op));
                self.print_handle(b.handle.as_ref());
                self.push(format_args!(":{}](", b.ty));
                self.print(&b.lhs);
                self.out.push(',');
                self.print(&b.rhs);
                self.out.push(')');
            }
            ExprKind::Convert(c) => {
                self.out.push_str("convert[");
                self.print_handle(c.handle.as_ref());
                self.push(format_args!(":{}](", c.ty));
                self.print(&c.operand);
                self.out.push(')');
            }
            ExprKind::NewArray(a) => {
                self.push(format_args!("array[{}](", a.elem_ty));
                self.print_list(&a.elements);
                self.out.push(')');
            }
            ExprKind::Invocation(i) => {
                self.push(format_args!("invoke[{}](", i.ty));
                self.print(&i.callee);
                self.out.push(';');
                self.print_list(&i.args);
                self.out.push(')');
            }
            ExprKind::Lambda(l) => self.print_lambda("lambda", l),
            ExprKind::Quote(l) => self.print_lambda("quote", l),
        }
    }

    fn print_lambda(&mut self, tag: &str, lambda: &ExprLambda) {
        self.push(format_args!("{}(", tag));
        for param in &lambda.params {
            let index = self.bound.len();
            self.bound.insert(param.id(), index);
            self.push(format_args!("p{}:{},", index, param.ty()));
        }
        self.push(format_args!("->{})(", lambda.ret));
        self.print(&lambda.body);
        self.out.push(')');
    }

    fn print_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.print(expr);
        }
    }

    fn print_handle(&mut self, handle: Option<&HandleRef>) {
        if let Some(handle) = handle {
            self.push(format_args!("@{}", handle_key(handle)));
        }
    }

    fn push(&mut self, args: std::fmt::Arguments<'_>) {
        // writing to a String cannot fail
        let _ = self.out.write_fmt(args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::BinOpKind;

    fn add_const(value: i64) -> Expr {
        let x = Param::new("x", Ty::Int);
        Expr::lambda(
            vec![x.clone()],
            Expr::binop(BinOpKind::Add, Expr::parameter(&x), Expr::int(value)),
        )
    }

    #[test]
    fn test_display() {
        assert_eq!(add_const(2).to_string(), "|x| (x + 2)");
    }

    #[test]
    fn test_shape_ignores_constant_values_and_param_identity() {
        assert_eq!(shape_key(&add_const(2)), shape_key(&add_const(40)));
    }

    #[test]
    fn test_shape_distinguishes_null_and_types() {
        let int_null = Expr::null(Ty::nullable(Ty::Int));
        let int_value = Expr::constant(1i64, Ty::nullable(Ty::Int));
        assert_ne!(shape_key(&int_null), shape_key(&int_value));
        assert_ne!(shape_key(&Expr::int(1)), shape_key(&Expr::float(1.0)));
    }

    #[test]
    fn test_shape_distinguishes_handles_with_same_name() {
        let first = FnHandle::static_fn("Math", "Apply", |args| Ok(args[0].clone()));
        let second = FnHandle::static_fn("Math", "Apply", |args| Ok(args[0].clone()));
        let apply = |handle: &HandleRef| Expr::call(None, handle.clone(), vec![Expr::int(5)], Ty::Int);
        assert_ne!(shape_key(&apply(&first)), shape_key(&apply(&second)));
        assert_eq!(shape_key(&apply(&first)), shape_key(&apply(&first.clone())));
    }
}
