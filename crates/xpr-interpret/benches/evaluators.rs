use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use xpr_core::ast::{Expr, Param, Ty, Value};
use xpr_core::ops::BinOpKind;
use xpr_interpret::{
    CachingEvaluator, ClosureBackend, CompilingEvaluator, ExpressionEvaluator,
    InterpretingEvaluator, LoweringBackend,
};

/// `(|x| (x + k) * 3 - x)(k)` for a varying constant `k`.
fn tree(k: i64) -> Expr {
    let x = Param::new("x", Ty::Int);
    let body = Expr::binop(
        BinOpKind::Sub,
        Expr::binop(
            BinOpKind::Mul,
            Expr::binop(BinOpKind::Add, Expr::parameter(&x), Expr::int(k)),
            Expr::int(3),
        ),
        Expr::parameter(&x),
    );
    Expr::invoke(Expr::lambda(vec![x], body), vec![Expr::int(k)])
}

fn bench_evaluators(c: &mut Criterion) {
    let backend: Arc<dyn LoweringBackend> = Arc::new(ClosureBackend);
    let evaluators: Vec<Box<dyn ExpressionEvaluator>> = vec![
        Box::new(CompilingEvaluator::new(backend.clone())),
        Box::new(InterpretingEvaluator::new(backend.clone())),
        Box::new(CachingEvaluator::new(backend)),
    ];
    let trees: Vec<Expr> = (0..16).map(tree).collect();
    for evaluator in &evaluators {
        c.bench_function(&format!("evaluate_{}", evaluator.name()), |b| {
            b.iter(|| {
                for (k, tree) in trees.iter().enumerate() {
                    let value = evaluator.evaluate(black_box(tree)).unwrap();
                    assert_eq!(value, Value::Int(5 * k as i64));
                }
            })
        });
    }
}

criterion_group!(benches, bench_evaluators);
criterion_main!(benches);
