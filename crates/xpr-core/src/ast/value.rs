use crate::ast::{Ty, TypedExpr};
use crate::error::Error;
use crate::holder::ParameterHolder;
use crate::Result;
use itertools::Itertools;
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

pub type NativeFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// Invocable host value: either produced by evaluating a lambda or supplied by the host.
#[derive(Clone)]
pub struct ValueFunction {
    arity: usize,
    func: Arc<NativeFn>,
}

impl ValueFunction {
    pub fn new(arity: usize, func: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self {
            arity,
            func: Arc::new(func),
        }
    }
    pub fn arity(&self) -> usize {
        self.arity
    }
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        if args.len() != self.arity {
            return Err(Error::ArgumentCount {
                expected: self.arity,
                found: args.len(),
                expr: format!("{:?}", self),
            });
        }
        (self.func)(args)
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl Debug for ValueFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn/{}>", self.arity)
    }
}

/// Opaque host object, compared by reference.
#[derive(Clone)]
pub struct ObjectRef {
    type_name: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<Arc<str>>, value: T) -> Self {
        Self {
            type_name: type_name.into(),
            inner: Arc::new(value),
        }
    }
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl Debug for ObjectRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.type_name)
    }
}

#[derive(Clone)]
pub enum Value {
    Null,
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Arc<str>),
    Array(Arc<[Value]>),
    Object(ObjectRef),
    Function(ValueFunction),
    Expr(TypedExpr),
    Holder(Arc<ParameterHolder>),
}

impl Value {
    pub fn string(value: impl Into<Arc<str>>) -> Self {
        Value::String(value.into())
    }
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(values.into())
    }
    pub fn object<T: Any + Send + Sync>(type_name: impl Into<Arc<str>>, value: T) -> Self {
        Value::Object(ObjectRef::new(type_name, value))
    }
    pub fn function(
        arity: usize,
        func: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Value::Function(ValueFunction::new(arity, func))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
    pub fn as_expr(&self) -> Option<&TypedExpr> {
        match self {
            Value::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Unit => "unit".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Object(obj) => obj.type_name().to_string(),
            Value::Function(func) => format!("fn/{}", func.arity()),
            Value::Expr(expr) => Ty::Expr(expr.signature()).to_string(),
            Value::Holder(_) => "holder".to_string(),
        }
    }

    /// Value-level conversion used by convert nodes without a user operator.
    pub fn convert_to(&self, ty: &Ty) -> Result<Value> {
        match (self, ty) {
            (_, Ty::Any) => Ok(self.clone()),
            (Value::Null, Ty::Nullable(_)) => Ok(Value::Null),
            (_, Ty::Nullable(inner)) => self.convert_to(inner),
            (Value::Null, Ty::Int | Ty::Float | Ty::Bool | Ty::Unit) => Err(Error::target(format!(
                "null cannot be converted to {}",
                ty
            ))),
            (Value::Null, _) => Ok(Value::Null),
            (Value::Int(v), Ty::Float) => Ok(Value::Float(*v as f64)),
            (Value::Float(v), Ty::Int) => Ok(Value::Int(*v as i64)),
            (Value::Int(_), Ty::Int)
            | (Value::Float(_), Ty::Float)
            | (Value::Bool(_), Ty::Bool)
            | (Value::Unit, Ty::Unit)
            | (Value::String(_), Ty::String)
            | (Value::Array(_), Ty::Array(_))
            | (Value::Object(_), Ty::Object(_))
            | (Value::Function(_), Ty::Function(_))
            | (Value::Expr(_), Ty::Expr(_))
            | (Value::Holder(_), Ty::Holder) => Ok(self.clone()),
            _ => Err(Error::target(format!(
                "invalid cast from {} to {}",
                self.type_name(),
                ty
            ))),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Expr(a), Value::Expr(b)) => a == b,
            (Value::Holder(a), Value::Holder(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}
impl From<TypedExpr> for Value {
    fn from(value: TypedExpr) -> Self {
        Value::Expr(value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Unit => f.write_str("()"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Array(values) => write!(f, "[{}]", values.iter().join(", ")),
            Value::Object(obj) => write!(f, "{:?}", obj),
            Value::Function(func) => write!(f, "{:?}", func),
            Value::Expr(expr) => write!(f, "{}", expr),
            Value::Holder(_) => f.write_str("<holder>"),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
