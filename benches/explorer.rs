//! Walk-throughput benchmarks for the state-space explorer.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use pathscope::prelude::*;

/// A chain of `depth` relational diamonds over distinct symbols.
fn diamond_chain(depth: usize) -> ControlFlowGraph {
    let mut builder = CfgBuilder::new();
    let entry = builder.block();
    let mut current = entry;

    for index in 0..depth {
        let then_block = builder.block();
        let else_block = builder.block();
        let merge = builder.block();

        let symbol = builder.symbol(Symbol::new(
            format!("x{index}"),
            SymbolKind::Local,
            TypeHint::Integer,
        ));
        let read = builder.operation(OperationKind::SymbolRead(symbol));
        let bound = builder.operation(OperationKind::Literal(Literal::Number(
            (index as i64).into(),
        )));
        let compare = builder.operation(OperationKind::Comparison {
            operator: ComparisonOperator::GreaterThan,
            left: read,
            right: bound,
        });
        for op in [read, bound, compare] {
            builder.append(current, op).unwrap();
        }
        builder
            .terminate(
                current,
                Terminator::Branch {
                    condition: compare,
                    true_target: then_block,
                    false_target: else_block,
                },
            )
            .unwrap();
        builder.terminate(then_block, Terminator::Jump(merge)).unwrap();
        builder.terminate(else_block, Terminator::Jump(merge)).unwrap();
        current = merge;
    }

    builder
        .terminate(current, Terminator::Return { value: None })
        .unwrap();
    builder.finish(entry).unwrap()
}

/// A counting loop with an unconstrained continue decision.
fn counting_loop() -> ControlFlowGraph {
    let mut builder = CfgBuilder::new();
    let entry = builder.block();
    let header = builder.block();
    let body = builder.block();
    let exit = builder.block();

    let i = builder.symbol(Symbol::new("i", SymbolKind::Local, TypeHint::Integer));
    let zero = builder.operation(OperationKind::Literal(Literal::Number(0.into())));
    let init = builder.operation(OperationKind::Assignment { target: i, value: zero });
    builder.append(entry, zero).unwrap();
    builder.append(entry, init).unwrap();
    builder.terminate(entry, Terminator::Jump(header)).unwrap();

    let condition = builder.operation(OperationKind::Invocation {
        instance: None,
        method: "MoveNext".into(),
        arguments: Vec::new(),
    });
    builder.append(header, condition).unwrap();
    builder
        .terminate(
            header,
            Terminator::Branch {
                condition,
                true_target: body,
                false_target: exit,
            },
        )
        .unwrap();

    let bump = builder.operation(OperationKind::Increment { target: i });
    builder.append(body, bump).unwrap();
    builder.terminate(body, Terminator::Jump(header)).unwrap();
    builder
        .terminate(exit, Terminator::Return { value: None })
        .unwrap();
    builder.finish(entry).unwrap()
}

fn bench_explorer(c: &mut Criterion) {
    let engine = SymbolicEngine::new();

    let shallow = diamond_chain(8);
    c.bench_function("diamond_chain_8", |b| {
        b.iter(|| black_box(engine.analyze(black_box(&shallow))))
    });

    let deep = diamond_chain(64);
    c.bench_function("diamond_chain_64", |b| {
        b.iter(|| black_box(engine.analyze(black_box(&deep))))
    });

    let looped = counting_loop();
    c.bench_function("counting_loop", |b| {
        b.iter(|| black_box(engine.analyze(black_box(&looped))))
    });
}

criterion_group!(benches, bench_explorer);
criterion_main!(benches);
