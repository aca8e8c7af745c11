use crate::ast::Value;
use crate::error::Error;
use crate::Result;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Well-known host methods the engine treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    /// `Evaluate(expr, args..)`: static, the expression value is the first argument.
    EvaluateExpr,
    /// `expr.Compile()`: instance, yields a function value.
    CompileExpr,
    /// `function.Invoke(args..)`: instance.
    InvokeFunction,
}

/// Reference to a host field, property, method or operator.
pub trait Handle: Send + Sync {
    fn name(&self) -> &str;
    fn declaring_type(&self) -> &str;
    fn is_static(&self) -> bool;
    /// `target` is `None` for static handles.
    fn invoke(&self, target: Option<&Value>, args: &[Value]) -> Result<Value>;
    fn intrinsic(&self) -> Option<Intrinsic> {
        None
    }
}

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Shared handle. Each `HandleRef::new` gets a process-unique id; clones share it and equality
/// compares it, so two handles with the same name stay distinct operations.
#[derive(Clone)]
pub struct HandleRef {
    id: u64,
    inner: Arc<dyn Handle>,
}

impl HandleRef {
    pub fn new(handle: impl Handle + 'static) -> Self {
        HandleRef {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            inner: Arc::new(handle),
        }
    }
    pub fn id(&self) -> u64 {
        self.id
    }
    /// Readable name, `Type::name` for static and `Type.name` for instance handles.
    pub fn key(&self) -> String {
        let sep = if self.is_static() { "::" } else { "." };
        format!("{}{}{}", self.declaring_type(), sep, self.name())
    }
}

impl Deref for HandleRef {
    type Target = dyn Handle;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl PartialEq for HandleRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Debug for HandleRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

type HandleFn = dyn Fn(Option<&Value>, &[Value]) -> Result<Value> + Send + Sync;

/// Handle backed by a Rust closure.
pub struct FnHandle {
    declaring_type: String,
    name: String,
    is_static: bool,
    func: Box<HandleFn>,
}

impl FnHandle {
    pub fn instance(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        func: impl Fn(&Value, &[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> HandleRef {
        let name = name.into();
        let declaring_type = declaring_type.into();
        let label = format!("{}.{}", declaring_type, name);
        HandleRef::new(FnHandle {
            declaring_type,
            name,
            is_static: false,
            func: Box::new(move |target, args| match target {
                Some(target) => func(target, args),
                None => Err(Error::target(format!("{} invoked without a target", label))),
            }),
        })
    }

    pub fn static_fn(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> HandleRef {
        HandleRef::new(FnHandle {
            declaring_type: declaring_type.into(),
            name: name.into(),
            is_static: true,
            func: Box::new(move |_, args| func(args)),
        })
    }
}

impl Handle for FnHandle {
    fn name(&self) -> &str {
        &self.name
    }
    fn declaring_type(&self) -> &str {
        &self.declaring_type
    }
    fn is_static(&self) -> bool {
        self.is_static
    }
    fn invoke(&self, target: Option<&Value>, args: &[Value]) -> Result<Value> {
        (self.func)(target, args)
    }
}
