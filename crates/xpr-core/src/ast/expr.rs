use crate::ast::{HandleRef, Param, Ty, TypeFunction, Value};
use crate::ops::{BinOpKind, UnOpKind};
use std::ops::Deref;
use std::sync::Arc;

/// Immutable, shared expression node.
#[derive(Clone)]
pub struct Expr(Arc<ExprKind>);

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Constant(ExprConstant),
    Parameter(Param),
    Member(ExprMember),
    Call(ExprCall),
    UnOp(ExprUnOp),
    BinOp(ExprBinOp),
    Convert(ExprConvert),
    NewArray(ExprNewArray),
    Invocation(ExprInvocation),
    Lambda(Arc<ExprLambda>),
    /// Quoted lambda: evaluates to an expression value instead of a function.
    Quote(Arc<ExprLambda>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprConstant {
    pub value: Value,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprMember {
    pub target: Option<Expr>,
    pub handle: HandleRef,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprCall {
    pub target: Option<Expr>,
    pub handle: HandleRef,
    pub args: Vec<Expr>,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprUnOp {
    pub op: UnOpKind,
    pub operand: Expr,
    /// User-defined operator; primitive when absent.
    pub handle: Option<HandleRef>,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBinOp {
    pub op: BinOpKind,
    pub lhs: Expr,
    pub rhs: Expr,
    pub handle: Option<HandleRef>,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprConvert {
    pub operand: Expr,
    pub ty: Ty,
    pub handle: Option<HandleRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprNewArray {
    pub elem_ty: Ty,
    pub elements: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprInvocation {
    pub callee: Expr,
    pub args: Vec<Expr>,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprLambda {
    pub params: Vec<Param>,
    pub body: Expr,
    pub ret: Ty,
}

impl ExprLambda {
    pub fn new(params: Vec<Param>, body: Expr) -> Self {
        let ret = body.ty();
        Self { params, body, ret }
    }
    pub fn signature(&self) -> TypeFunction {
        TypeFunction::new(
            self.params.iter().map(|p| p.ty().clone()).collect(),
            self.ret.clone(),
        )
    }
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr(Arc::new(kind))
    }
    pub fn kind(&self) -> &ExprKind {
        &self.0
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn ty(&self) -> Ty {
        match self.kind() {
            ExprKind::Constant(c) => c.ty.clone(),
            ExprKind::Parameter(p) => p.ty().clone(),
            ExprKind::Member(m) => m.ty.clone(),
            ExprKind::Call(c) => c.ty.clone(),
            ExprKind::UnOp(u) => u.ty.clone(),
            ExprKind::BinOp(b) => b.ty.clone(),
            ExprKind::Convert(c) => c.ty.clone(),
            ExprKind::NewArray(a) => Ty::array(a.elem_ty.clone()),
            ExprKind::Invocation(i) => i.ty.clone(),
            ExprKind::Lambda(l) => Ty::Function(l.signature()),
            ExprKind::Quote(l) => Ty::Expr(l.signature()),
        }
    }

    pub fn constant(value: impl Into<Value>, ty: Ty) -> Self {
        Expr::new(ExprKind::Constant(ExprConstant {
            value: value.into(),
            ty,
        }))
    }
    pub fn null(ty: Ty) -> Self {
        Expr::constant(Value::Null, ty)
    }
    pub fn int(value: i64) -> Self {
        Expr::constant(value, Ty::Int)
    }
    pub fn float(value: f64) -> Self {
        Expr::constant(value, Ty::Float)
    }
    pub fn bool(value: bool) -> Self {
        Expr::constant(value, Ty::Bool)
    }
    pub fn string(value: &str) -> Self {
        Expr::constant(value, Ty::String)
    }
    pub fn parameter(param: &Param) -> Self {
        Expr::new(ExprKind::Parameter(param.clone()))
    }

    pub fn member(target: Option<Expr>, handle: HandleRef, ty: Ty) -> Self {
        Expr::new(ExprKind::Member(ExprMember { target, handle, ty }))
    }
    pub fn call(target: Option<Expr>, handle: HandleRef, args: Vec<Expr>, ty: Ty) -> Self {
        Expr::new(ExprKind::Call(ExprCall {
            target,
            handle,
            args,
            ty,
        }))
    }
    pub fn unop(op: UnOpKind, operand: Expr) -> Self {
        let ty = op.result_ty(&operand.ty());
        Expr::new(ExprKind::UnOp(ExprUnOp {
            op,
            operand,
            handle: None,
            ty,
        }))
    }
    pub fn unop_with(op: UnOpKind, operand: Expr, handle: HandleRef, ty: Ty) -> Self {
        Expr::new(ExprKind::UnOp(ExprUnOp {
            op,
            operand,
            handle: Some(handle),
            ty,
        }))
    }
    /// Primitive binary operator; the result type follows the operands.
    pub fn binop(op: BinOpKind, lhs: Expr, rhs: Expr) -> Self {
        let ty = op.result_ty(&lhs.ty(), &rhs.ty());
        Expr::new(ExprKind::BinOp(ExprBinOp {
            op,
            lhs,
            rhs,
            handle: None,
            ty,
        }))
    }
    pub fn binop_with(op: BinOpKind, lhs: Expr, rhs: Expr, handle: HandleRef, ty: Ty) -> Self {
        Expr::new(ExprKind::BinOp(ExprBinOp {
            op,
            lhs,
            rhs,
            handle: Some(handle),
            ty,
        }))
    }
    pub fn convert(operand: Expr, ty: Ty) -> Self {
        Expr::new(ExprKind::Convert(ExprConvert {
            operand,
            ty,
            handle: None,
        }))
    }
    pub fn convert_with(operand: Expr, ty: Ty, handle: HandleRef) -> Self {
        Expr::new(ExprKind::Convert(ExprConvert {
            operand,
            ty,
            handle: Some(handle),
        }))
    }
    pub fn new_array(elem_ty: Ty, elements: Vec<Expr>) -> Self {
        Expr::new(ExprKind::NewArray(ExprNewArray { elem_ty, elements }))
    }
    pub fn invoke(callee: Expr, args: Vec<Expr>) -> Self {
        let ty = callee.ty().ret().cloned().unwrap_or(Ty::Any);
        Expr::new(ExprKind::Invocation(ExprInvocation { callee, args, ty }))
    }
    pub fn lambda(params: Vec<Param>, body: Expr) -> Self {
        Expr::new(ExprKind::Lambda(Arc::new(ExprLambda::new(params, body))))
    }
    pub fn quote(params: Vec<Param>, body: Expr) -> Self {
        Expr::new(ExprKind::Quote(Arc::new(ExprLambda::new(params, body))))
    }

    pub fn as_lambda(&self) -> Option<&Arc<ExprLambda>> {
        match self.kind() {
            ExprKind::Lambda(l) => Some(l),
            _ => None,
        }
    }
    pub fn as_constant(&self) -> Option<&ExprConstant> {
        match self.kind() {
            ExprKind::Constant(c) => Some(c),
            _ => None,
        }
    }
}

impl Deref for Expr {
    type Target = ExprKind;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Expr::new(kind)
    }
}

impl From<&Param> for Expr {
    fn from(param: &Param) -> Self {
        Expr::parameter(param)
    }
}
