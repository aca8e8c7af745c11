use crate::ast::{Expr, ExprKind, ExprLambda, Param, TypeFunction};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Expression value: a lambda tree carried as data, with its declared signature.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    lambda: Arc<ExprLambda>,
}

impl TypedExpr {
    pub fn new(params: Vec<Param>, body: Expr) -> Self {
        Self {
            lambda: Arc::new(ExprLambda::new(params, body)),
        }
    }
    pub fn from_lambda(lambda: Arc<ExprLambda>) -> Self {
        Self { lambda }
    }
    /// Accepts lambda and quote nodes.
    pub fn try_from_expr(expr: &Expr) -> Option<Self> {
        match expr.kind() {
            ExprKind::Lambda(l) | ExprKind::Quote(l) => Some(Self::from_lambda(l.clone())),
            _ => None,
        }
    }

    pub fn params(&self) -> &[Param] {
        &self.lambda.params
    }
    pub fn body(&self) -> &Expr {
        &self.lambda.body
    }
    pub fn lambda(&self) -> &Arc<ExprLambda> {
        &self.lambda
    }
    pub fn signature(&self) -> TypeFunction {
        self.lambda.signature()
    }
    /// The lambda as an expression node.
    pub fn to_expr(&self) -> Expr {
        Expr::new(ExprKind::Lambda(self.lambda.clone()))
    }
    pub fn to_quote(&self) -> Expr {
        Expr::new(ExprKind::Quote(self.lambda.clone()))
    }
}

impl Display for TypedExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_expr())
    }
}
