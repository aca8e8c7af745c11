use crate::cache::CachingEvaluator;
use crate::lowering::LoweringBackend;
use crate::scope::{EvaluationResult, EvaluationScope};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use xpr_core::ast::{Expr, Value, ValueFunction};
use xpr_core::error::Error;
use xpr_core::passes::has_open_parameters;
use xpr_core::Result;

/// Produces the value of a closed expression tree.
pub trait ExpressionEvaluator: Send + Sync {
    fn name(&self) -> &str;
    fn evaluate(&self, expr: &Expr) -> Result<Value>;
}

/// Lowers the whole tree on every call.
pub struct CompilingEvaluator {
    backend: Arc<dyn LoweringBackend>,
}

impl CompilingEvaluator {
    pub fn new(backend: Arc<dyn LoweringBackend>) -> Self {
        Self { backend }
    }
}

impl ExpressionEvaluator for CompilingEvaluator {
    fn name(&self) -> &str {
        "compile"
    }
    fn evaluate(&self, expr: &Expr) -> Result<Value> {
        let compiled = self.backend.lower(&[], expr)?;
        compiled(&[])
    }
}

/// Interprets the tree, lowering only what the interpreter cannot handle.
pub struct InterpretingEvaluator {
    backend: Arc<dyn LoweringBackend>,
}

impl InterpretingEvaluator {
    pub fn new(backend: Arc<dyn LoweringBackend>) -> Self {
        Self { backend }
    }
}

impl ExpressionEvaluator for InterpretingEvaluator {
    fn name(&self) -> &str {
        "interpret"
    }
    fn evaluate(&self, expr: &Expr) -> Result<Value> {
        interpret(expr, &self.backend)
    }
}

pub fn interpret(expr: &Expr, backend: &Arc<dyn LoweringBackend>) -> Result<Value> {
    match EvaluationScope::root(backend.clone()).try_evaluate(expr)? {
        EvaluationResult::Value(value) => Ok(value),
        EvaluationResult::NotInterpretable => {
            debug!(backend = backend.name(), "`{}` is not interpretable, lowering it", expr);
            let compiled = backend.lower(&[], expr)?;
            compiled(&[])
        }
    }
}

/// Value of `expr` when it has no open parameters; `None` otherwise.
pub fn evaluate_closed(expr: &Expr, backend: &Arc<dyn LoweringBackend>) -> Result<Option<Value>> {
    if has_open_parameters(expr)? {
        return Ok(None);
    }
    interpret(expr, backend).map(Some)
}

/// Zero-argument function that interprets `expr` on every call.
pub fn expression_function(expr: Expr, backend: Arc<dyn LoweringBackend>) -> ValueFunction {
    ValueFunction::new(0, move |_| interpret(&expr, &backend))
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorStrategy {
    #[display("compile")]
    Compile,
    #[display("interpret")]
    Interpret,
    #[default]
    #[display("cache")]
    Cache,
}

impl EvaluatorStrategy {
    pub fn build(self, backend: Arc<dyn LoweringBackend>) -> Arc<dyn ExpressionEvaluator> {
        match self {
            EvaluatorStrategy::Compile => Arc::new(CompilingEvaluator::new(backend)),
            EvaluatorStrategy::Interpret => Arc::new(InterpretingEvaluator::new(backend)),
            EvaluatorStrategy::Cache => Arc::new(CachingEvaluator::new(backend)),
        }
    }
}

impl FromStr for EvaluatorStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compile" => Ok(EvaluatorStrategy::Compile),
            "interpret" => Ok(EvaluatorStrategy::Interpret),
            "cache" => Ok(EvaluatorStrategy::Cache),
            other => Err(Error::Configuration(format!(
                "unknown evaluator strategy `{}`, expected compile, interpret or cache",
                other
            ))),
        }
    }
}
