//! Evaluator that compiles one unit per tree shape.
//!
//! Non-null constants are lifted out of the tree into a parameter holder, so trees that differ
//! only in captured values hit the same compiled unit. Units are never evicted.

use crate::evaluator::ExpressionEvaluator;
use crate::lowering::{CompiledFn, LoweringBackend};
use std::sync::Arc;
use tracing::{debug, trace};
use xpr_core::ast::{Expr, Param, Ty, Value};
use xpr_core::collections::ConcurrentMap;
use xpr_core::holder::ParameterHolderFactory;
use xpr_core::passes::{captured_values, parametrize};
use xpr_core::pretty::shape_key;
use xpr_core::Result;

pub struct CachingEvaluator {
    backend: Arc<dyn LoweringBackend>,
    factory: ParameterHolderFactory,
    compiled: ConcurrentMap<String, CompiledFn>,
}

impl CachingEvaluator {
    pub fn new(backend: Arc<dyn LoweringBackend>) -> Self {
        Self::with_factory(backend, ParameterHolderFactory::new())
    }
    pub fn with_factory(backend: Arc<dyn LoweringBackend>, factory: ParameterHolderFactory) -> Self {
        Self {
            backend,
            factory,
            compiled: ConcurrentMap::new(),
        }
    }

    /// Number of retained compiled units.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    fn compile_shape(&self, expr: &Expr, count: usize) -> Result<CompiledFn> {
        let holder = Param::new("holder", Ty::Holder);
        let body = parametrize(expr, &holder, count)?;
        self.backend.lower(std::slice::from_ref(&holder), &body)
    }
}

impl ExpressionEvaluator for CachingEvaluator {
    fn name(&self) -> &str {
        "cache"
    }

    fn evaluate(&self, expr: &Expr) -> Result<Value> {
        let key = shape_key(expr);
        let captured = captured_values(expr)?;
        let count = captured.len();
        let holder = self.factory.create(captured)?;
        let compiled = match self.compiled.get_cloned(&key) {
            Some(compiled) => {
                trace!(captured = count, "compiled unit cache hit");
                compiled
            }
            None => {
                debug!(captured = count, "compiling unit for new tree shape");
                // racing writers may both compile; the first insert wins
                let compiled = self.compile_shape(expr, count)?;
                self.compiled.get_or_insert(key, compiled)
            }
        };
        let arg = holder.map(Value::Holder).unwrap_or(Value::Null);
        compiled(&[arg])
    }
}
