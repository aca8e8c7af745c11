use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Static type attached to every expression node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    Unit,
    Bool,
    Int,
    Float,
    String,
    /// Untyped host value, e.g. the result of a holder slot read.
    Any,
    Nullable(Box<Ty>),
    Array(Box<Ty>),
    /// Host object type, identified by name.
    Object(String),
    Function(TypeFunction),
    /// Expression value whose lambda has the given signature.
    Expr(TypeFunction),
    /// Parameter holder node.
    Holder,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeFunction {
    pub params: Vec<Ty>,
    pub ret: Box<Ty>,
}

impl TypeFunction {
    pub fn new(params: Vec<Ty>, ret: Ty) -> Self {
        Self {
            params,
            ret: Box::new(ret),
        }
    }
}

impl Ty {
    pub fn object(name: impl Into<String>) -> Self {
        Ty::Object(name.into())
    }
    pub fn nullable(ty: Ty) -> Self {
        Ty::Nullable(Box::new(ty))
    }
    pub fn array(ty: Ty) -> Self {
        Ty::Array(Box::new(ty))
    }
    pub fn function(params: Vec<Ty>, ret: Ty) -> Self {
        Ty::Function(TypeFunction::new(params, ret))
    }
    pub fn expr(params: Vec<Ty>, ret: Ty) -> Self {
        Ty::Expr(TypeFunction::new(params, ret))
    }
    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Int | Ty::Float)
    }
    /// Return type of a function or expression type.
    pub fn ret(&self) -> Option<&Ty> {
        match self {
            Ty::Function(func) | Ty::Expr(func) => Some(&func.ret),
            _ => None,
        }
    }
}

impl Display for TypeFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn({}) -> {}", self.params.iter().join(", "), self.ret)
    }
}

impl Display for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Unit => f.write_str("unit"),
            Ty::Bool => f.write_str("bool"),
            Ty::Int => f.write_str("int"),
            Ty::Float => f.write_str("float"),
            Ty::String => f.write_str("string"),
            Ty::Any => f.write_str("any"),
            Ty::Nullable(inner) => write!(f, "{}?", inner),
            Ty::Array(inner) => write!(f, "[{}]", inner),
            Ty::Object(name) => f.write_str(name),
            Ty::Function(func) => write!(f, "{}", func),
            Ty::Expr(func) => write!(f, "expr<{}>", func),
            Ty::Holder => f.write_str("holder"),
        }
    }
}
