//! Process-wide evaluator and lowering backend.
//!
//! Both are chosen once: the first read fixes the default, and installing after that fails.
//! The default evaluator strategy comes from `XPR_EVALUATOR` (`compile`, `interpret` or
//! `cache`).

use crate::evaluator::{EvaluatorStrategy, ExpressionEvaluator};
use crate::lowering::{ClosureBackend, LoweringBackend};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};
use xpr_core::error::Error;
use xpr_core::Result;

pub const EVALUATOR_ENV: &str = "XPR_EVALUATOR";

static BACKEND: OnceLock<Arc<dyn LoweringBackend>> = OnceLock::new();
static EVALUATOR: OnceLock<Arc<dyn ExpressionEvaluator>> = OnceLock::new();

impl EvaluatorStrategy {
    pub fn from_env() -> Self {
        match std::env::var(EVALUATOR_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|err| {
                warn!(%err, "falling back to the default evaluator strategy");
                EvaluatorStrategy::default()
            }),
            Err(_) => EvaluatorStrategy::default(),
        }
    }
}

pub fn backend() -> Arc<dyn LoweringBackend> {
    BACKEND.get_or_init(|| Arc::new(ClosureBackend)).clone()
}

pub fn install_backend(backend: Arc<dyn LoweringBackend>) -> Result<()> {
    let name = backend.name().to_string();
    BACKEND
        .set(backend)
        .map_err(|_| Error::Configuration("lowering backend is already configured".to_string()))?;
    info!(backend = %name, "installed lowering backend");
    Ok(())
}

pub fn evaluator() -> Arc<dyn ExpressionEvaluator> {
    EVALUATOR
        .get_or_init(|| {
            let strategy = EvaluatorStrategy::from_env();
            info!(%strategy, "using default evaluator");
            strategy.build(backend())
        })
        .clone()
}

pub fn install_evaluator(evaluator: Arc<dyn ExpressionEvaluator>) -> Result<()> {
    let name = evaluator.name().to_string();
    EVALUATOR
        .set(evaluator)
        .map_err(|_| Error::Configuration("evaluator is already configured".to_string()))?;
    info!(evaluator = %name, "installed evaluator");
    Ok(())
}
