//! Evaluation of expression trees: the tree-walking interpreter, the lowering backend that
//! compiles trees to closures, and the evaluator strategies built on both.

pub mod cache;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod intrinsics;
pub mod lowering;
pub mod scope;

pub use cache::CachingEvaluator;
pub use evaluator::{
    evaluate_closed, expression_function, CompilingEvaluator, EvaluatorStrategy,
    ExpressionEvaluator, InterpretingEvaluator,
};
pub use lowering::{ClosureBackend, CompiledFn, LoweringBackend};
pub use scope::{EvaluationResult, EvaluationScope};
