#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use xpr_core::ast::*;
use xpr_core::error::Error;
use xpr_core::Result;
use xpr_interpret::{ClosureBackend, CompiledFn, LoweringBackend};

/// Host object with a mutable field.
pub struct Holder {
    pub field: AtomicI64,
}

pub fn holder_ty() -> Ty {
    Ty::object("Holder")
}

pub fn holder(field: i64) -> Value {
    Value::object(
        "Holder",
        Holder {
            field: AtomicI64::new(field),
        },
    )
}

pub fn set_field(value: &Value, field: i64) {
    if let Some(holder) = value.as_object().and_then(|o| o.downcast_ref::<Holder>()) {
        holder.field.store(field, Ordering::SeqCst);
    }
}

fn read_field(target: &Value) -> Result<i64> {
    target
        .as_object()
        .and_then(|o| o.downcast_ref::<Holder>())
        .map(|h| h.field.load(Ordering::SeqCst))
        .ok_or_else(|| Error::target(format!("{} is not a Holder", target.type_name())))
}

pub fn field_handle() -> HandleRef {
    static HANDLE: OnceLock<HandleRef> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            FnHandle::instance("Holder", "Field", |target, _| read_field(target).map(Value::Int))
        })
        .clone()
}

/// `holder.Add(x)` returns the field plus `x`.
pub fn add_method() -> HandleRef {
    static HANDLE: OnceLock<HandleRef> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            FnHandle::instance("Holder", "Add", |target, args| {
                let field = read_field(target)?;
                match args {
                    [Value::Int(x)] => Ok(Value::Int(field + x)),
                    _ => Err(Error::target("Holder.Add expects one int")),
                }
            })
        })
        .clone()
}

pub fn answer_handle() -> HandleRef {
    static HANDLE: OnceLock<HandleRef> = OnceLock::new();
    HANDLE
        .get_or_init(|| FnHandle::static_fn("Holder", "Answer", |_| Ok(Value::Int(42))))
        .clone()
}

pub fn failing_handle() -> HandleRef {
    static HANDLE: OnceLock<HandleRef> = OnceLock::new();
    HANDLE
        .get_or_init(|| FnHandle::static_fn("Holder", "Fail", |_| Err(Error::target("host failure"))))
        .clone()
}

/// User-defined `+` over ints.
pub fn user_add() -> HandleRef {
    static HANDLE: OnceLock<HandleRef> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            FnHandle::static_fn("Checked", "op_Addition", |args| match args {
                [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a + b)),
                _ => Err(Error::target("op_Addition expects two ints")),
            })
        })
        .clone()
}

/// User-defined conversion from int to string.
pub fn int_to_string() -> HandleRef {
    static HANDLE: OnceLock<HandleRef> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            FnHandle::static_fn("Checked", "op_Implicit", |args| match args {
                [Value::Int(v)] => Ok(Value::string(v.to_string())),
                _ => Err(Error::target("op_Implicit expects an int")),
            })
        })
        .clone()
}

pub fn user_sum(lhs: Expr, rhs: Expr) -> Expr {
    Expr::binop_with(xpr_core::ops::BinOpKind::Add, lhs, rhs, user_add(), Ty::Int)
}

/// Backend counting how often it lowers a tree.
#[derive(Default)]
pub struct CountingBackend {
    inner: ClosureBackend,
    lowered: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
    pub fn lowered(&self) -> usize {
        self.lowered.load(Ordering::SeqCst)
    }
}

impl LoweringBackend for CountingBackend {
    fn name(&self) -> &str {
        "counting"
    }
    fn lower(&self, params: &[Param], body: &Expr) -> Result<CompiledFn> {
        self.lowered.fetch_add(1, Ordering::SeqCst);
        self.inner.lower(params, body)
    }
}
