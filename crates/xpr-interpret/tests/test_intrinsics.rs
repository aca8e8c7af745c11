mod support;

use pretty_assertions::assert_eq;
use support::*;
use xpr_core::ast::*;
use xpr_core::error::Error;
use xpr_core::ops::BinOpKind;
use xpr_core::Result;
use xpr_interpret::intrinsics::{apply, compile_call, evaluate_call, expr_constant, invoke_call};
use xpr_interpret::{CompilingEvaluator, ExpressionEvaluator, InterpretingEvaluator};

/// `|x| x + 2`
fn add_two() -> TypedExpr {
    let x = Param::new("x", Ty::Int);
    TypedExpr::new(
        vec![x.clone()],
        Expr::binop(BinOpKind::Add, Expr::parameter(&x), Expr::int(2)),
    )
}

fn evaluators() -> Vec<Box<dyn ExpressionEvaluator>> {
    vec![
        Box::new(InterpretingEvaluator::new(CountingBackend::new())),
        Box::new(CompilingEvaluator::new(CountingBackend::new())),
    ]
}

#[test]
fn apply_runs_expression_value() -> Result<()> {
    assert_eq!(apply(&add_two(), &[Value::Int(5)])?, Value::Int(7));
    assert!(matches!(
        apply(&add_two(), &[]),
        Err(Error::ArgumentCount { expected: 1, found: 0, .. })
    ));
    Ok(())
}

#[test]
fn evaluate_compile_and_invoke_run_in_place() -> Result<()> {
    let f = expr_constant(&add_two());
    let trees = [
        evaluate_call(f.clone(), vec![Expr::int(1)]),
        Expr::invoke(compile_call(f.clone()), vec![Expr::int(1)]),
        invoke_call(compile_call(f), vec![Expr::int(1)]),
    ];
    for evaluator in evaluators() {
        for tree in &trees {
            assert_eq!(evaluator.evaluate(tree)?, Value::Int(3), "{} on {}", evaluator.name(), tree);
        }
    }
    Ok(())
}

#[test]
fn evaluating_null_expression_fails() {
    let null = Expr::null(Ty::expr(vec![Ty::Int], Ty::Int));
    for evaluator in evaluators() {
        let err = evaluator
            .evaluate(&evaluate_call(null.clone(), vec![Expr::int(1)]))
            .unwrap_err();
        assert!(matches!(err, Error::NullCallee { .. }), "{}", err);
    }
}

#[test]
fn call_types_follow_the_signature() {
    let f = expr_constant(&add_two());
    assert_eq!(evaluate_call(f.clone(), vec![Expr::int(1)]).ty(), Ty::Int);
    assert_eq!(compile_call(f).ty(), Ty::function(vec![Ty::Int], Ty::Int));
}

#[test]
fn nested_expression_values_lower_with_configured_backend() -> Result<()> {
    let injected = CountingBackend::new();
    let evaluator = InterpretingEvaluator::new(injected.clone());
    let tree = evaluate_call(expr_constant(&add_two()), vec![Expr::int(4)]);
    assert_eq!(evaluator.evaluate(&tree)?, Value::Int(6));
    // the body `x + 2` is lowered by the process-wide backend
    assert_eq!(injected.lowered(), 0);
    Ok(())
}
