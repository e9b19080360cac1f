//! Benchmarks for the dataflow engine.
//!
//! Measures a full engine run (catalog, edges, solver, chains) on synthetic procedures:
//! - Long straight-line blocks
//! - Deeply nested counted loops
//! - Batches of procedures through the pass scheduler

extern crate hlsflow;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hlsflow::{
    compiler::{CompilerContext, PassScheduler},
    ir::{BinaryOp, Expression, Procedure, ProcedureBuilder, StmtId, SymbolId},
    DataflowEngine, EngineConfig,
};
use std::hint::black_box;

fn add(lhs: SymbolId, rhs: SymbolId) -> Expression {
    Expression::binary(BinaryOp::Add, Expression::load(lhs), Expression::load(rhs))
}

/// `v[i % vars] = v[(i + 1) % vars] + v[(i + 2) % vars]`, `count` times.
fn straight_line(name: &str, count: usize, vars: usize) -> Procedure {
    let mut b = ProcedureBuilder::new(name);
    let v: Vec<_> = (0..vars).map(|i| b.local(&format!("v{i}"))).collect();
    let stmts: Vec<StmtId> = (0..count)
        .map(|i| b.assign(v[i % vars], add(v[(i + 1) % vars], v[(i + 2) % vars])))
        .collect();
    let root = b.sequence(stmts);
    b.finish(root).unwrap()
}

/// `depth` nested `for (i = 0; i < n; i = i + 1)` loops around an accumulation.
fn nested_loops(depth: usize) -> Procedure {
    let mut b = ProcedureBuilder::new("nested");
    let acc = b.local("acc");
    let n = b.parameter("n");
    let counters: Vec<_> = (0..depth).map(|i| b.local(&format!("i{i}"))).collect();

    let mut body = b.assign(acc, add(acc, counters[depth - 1]));
    for &i in counters.iter().rev() {
        let init = b.assign(i, Expression::constant(0));
        let step = b.assign(
            i,
            Expression::binary(BinaryOp::Add, Expression::load(i), Expression::constant(1)),
        );
        let test = Expression::binary(BinaryOp::Lt, Expression::load(i), Expression::load(n));
        let lp = b.for_loop(Some(init), test, Some(step), body);
        body = b.sequence(vec![lp]);
    }
    b.finish(body).unwrap()
}

/// Benchmark a full run on straight-line code of growing length.
fn bench_straight_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("straight_line");
    let engine = DataflowEngine::new(EngineConfig::minimal());

    for count in [64, 256, 1024] {
        let procedure = straight_line("straight", count, 16);
        group.bench_with_input(BenchmarkId::from_parameter(count), &procedure, |b, p| {
            b.iter(|| black_box(engine.run(black_box(p)).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark a full run on nested loops, where the two-pass policy re-walks inner bodies.
fn bench_nested_loops(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_loops");
    let engine = DataflowEngine::new(EngineConfig::minimal());

    for depth in [1, 4, 8] {
        let procedure = nested_loops(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &procedure, |b, p| {
            b.iter(|| black_box(engine.run(black_box(p)).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark the scheduler over a batch, with and without rayon.
fn bench_scheduler(c: &mut Criterion) {
    let procedures: Vec<_> = (0..32)
        .map(|i| straight_line(&format!("proc{i}"), 128, 8))
        .collect();

    for parallel in [false, true] {
        let scheduler = PassScheduler::new(EngineConfig::default().with_parallel(parallel));
        let name = if parallel {
            "scheduler_parallel"
        } else {
            "scheduler_sequential"
        };
        c.bench_function(name, |b| {
            b.iter(|| {
                let ctx = CompilerContext::new();
                scheduler.run(black_box(&procedures), &ctx).unwrap();
                black_box(ctx.finding_count())
            });
        });
    }
}

criterion_group!(
    benches,
    bench_straight_line,
    bench_nested_loops,
    bench_scheduler
);
criterion_main!(benches);
