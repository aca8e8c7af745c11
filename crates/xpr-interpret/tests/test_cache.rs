mod support;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use support::*;
use xpr_core::ast::*;
use xpr_core::error::Error;
use xpr_core::holder::ParameterHolderFactory;
use xpr_core::ops::BinOpKind;
use xpr_core::Result;
use xpr_interpret::{CachingEvaluator, ExpressionEvaluator, InterpretingEvaluator};

fn field_plus_one(object: Value) -> Expr {
    Expr::binop(
        BinOpKind::Add,
        Expr::member(Some(Expr::constant(object, holder_ty())), field_handle(), Ty::Int),
        Expr::int(1),
    )
}

fn int_array(count: i64) -> Expr {
    Expr::new_array(Ty::Int, (0..count).map(Expr::int).collect())
}

#[test]
fn same_shape_compiles_once() -> Result<()> {
    let backend = CountingBackend::new();
    let evaluator = CachingEvaluator::new(backend.clone());

    let first = evaluator.evaluate(&field_plus_one(holder(10)))?;
    let second = evaluator.evaluate(&field_plus_one(holder(20)))?;

    assert_eq!(first, Value::Int(11));
    assert_eq!(second, Value::Int(21));
    assert_eq!(backend.lowered(), 1);
    assert_eq!(evaluator.len(), 1);
    Ok(())
}

#[test]
fn different_shapes_compile_separately() -> Result<()> {
    let backend = CountingBackend::new();
    let evaluator = CachingEvaluator::new(backend.clone());
    evaluator.evaluate(&Expr::binop(BinOpKind::Add, Expr::int(1), Expr::int(2)))?;
    evaluator.evaluate(&Expr::binop(BinOpKind::Mul, Expr::int(1), Expr::int(2)))?;
    evaluator.evaluate(&Expr::binop(BinOpKind::Add, Expr::float(1.0), Expr::float(2.0)))?;
    assert_eq!(backend.lowered(), 3);
    assert_eq!(evaluator.len(), 3);
    Ok(())
}

#[test]
fn same_named_handles_compile_separately() -> Result<()> {
    let backend = CountingBackend::new();
    let evaluator = CachingEvaluator::new(backend.clone());
    let interpreter = InterpretingEvaluator::new(CountingBackend::new());
    let double = FnHandle::static_fn("Math", "Apply", |args| match args {
        [Value::Int(v)] => Ok(Value::Int(v * 2)),
        _ => Err(Error::target("Apply expects an int")),
    });
    let negate = FnHandle::static_fn("Math", "Apply", |args| match args {
        [Value::Int(v)] => Ok(Value::Int(-v)),
        _ => Err(Error::target("Apply expects an int")),
    });
    let doubled = Expr::call(None, double, vec![Expr::int(5)], Ty::Int);
    let negated = Expr::call(None, negate, vec![Expr::int(5)], Ty::Int);

    assert_eq!(evaluator.evaluate(&doubled)?, Value::Int(10));
    assert_eq!(evaluator.evaluate(&negated)?, interpreter.evaluate(&negated)?);
    assert_eq!(evaluator.evaluate(&negated)?, Value::Int(-5));
    assert_eq!(backend.lowered(), 2);
    assert_eq!(evaluator.len(), 2);
    Ok(())
}

#[test]
fn null_constants_stay_in_the_tree() -> Result<()> {
    let backend = CountingBackend::new();
    let evaluator = CachingEvaluator::new(backend.clone());
    let ty = Ty::nullable(Ty::Int);
    let eq = |lhs: Expr| Expr::binop(BinOpKind::Eq, lhs, Expr::null(ty.clone()));

    assert_eq!(evaluator.evaluate(&eq(Expr::null(ty.clone())))?, Value::Bool(true));
    assert_eq!(
        evaluator.evaluate(&eq(Expr::constant(3i64, ty.clone())))?,
        Value::Bool(false)
    );
    assert_eq!(backend.lowered(), 2);
    Ok(())
}

#[test]
fn tree_without_captures_runs_without_holder() -> Result<()> {
    let evaluator = CachingEvaluator::new(CountingBackend::new());
    let value = evaluator.evaluate(&Expr::null(Ty::String))?;
    assert_eq!(value, Value::Null);
    Ok(())
}

#[test]
fn captured_values_reach_every_holder_level() -> Result<()> {
    let evaluator = CachingEvaluator::new(CountingBackend::new());
    for count in [6, 54, 438, 512] {
        let expected = Value::array((0..count).map(Value::Int).collect());
        assert_eq!(evaluator.evaluate(&int_array(count))?, expected, "count {}", count);
    }
    Ok(())
}

#[test]
fn too_many_captured_values_are_rejected() {
    let backend = CountingBackend::new();
    let evaluator = CachingEvaluator::new(backend.clone());
    let err = evaluator.evaluate(&int_array(513)).unwrap_err();
    assert!(matches!(err, Error::Capacity { count: 513, limit: 512 }));
    assert_eq!(err.to_string(), "Can process 512 parameters max, got 513");
    // rejected before anything is compiled
    assert_eq!(backend.lowered(), 0);
}

#[test]
fn capacity_can_be_lowered() {
    let evaluator = CachingEvaluator::with_factory(
        CountingBackend::new(),
        ParameterHolderFactory::with_capacity(2),
    );
    assert!(evaluator.evaluate(&int_array(2)).is_ok());
    assert!(matches!(
        evaluator.evaluate(&int_array(3)),
        Err(Error::Capacity { count: 3, limit: 2 })
    ));
}

#[test]
fn concurrent_misses_converge_on_one_unit() -> Result<()> {
    let evaluator = Arc::new(CachingEvaluator::new(CountingBackend::new()));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let evaluator = evaluator.clone();
            thread::spawn(move || {
                let tree = Expr::binop(BinOpKind::Mul, Expr::int(i), Expr::int(2));
                evaluator.evaluate(&tree)
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let value = handle.join().expect("evaluation thread panicked")?;
        assert_eq!(value, Value::Int(i as i64 * 2));
    }
    assert_eq!(evaluator.len(), 1);
    Ok(())
}

#[test]
fn lambdas_and_quotes_evaluate_through_cache() -> Result<()> {
    let evaluator = CachingEvaluator::new(CountingBackend::new());
    let x = Param::new("x", Ty::Int);
    let y = Param::new("y", Ty::Int);
    let tree = Expr::invoke(
        Expr::lambda(
            vec![x.clone()],
            Expr::quote(
                vec![y.clone()],
                Expr::binop(
                    BinOpKind::Add,
                    Expr::binop(BinOpKind::Mul, Expr::parameter(&x), Expr::int(3)),
                    Expr::parameter(&y),
                ),
            ),
        ),
        vec![Expr::int(5)],
    );
    let value = evaluator.evaluate(&tree)?;
    let Some(expr) = value.as_expr() else {
        panic!("expected expression value, got {:?}", value);
    };
    // the quoted body reads 3 through the holder, bound as a constant when x was closed over
    let applied = Expr::invoke(expr.to_expr(), vec![Expr::int(1)]);
    let interpreted = InterpretingEvaluator::new(CountingBackend::new()).evaluate(&applied)?;
    assert_eq!(interpreted, Value::Int(16));
    Ok(())
}
