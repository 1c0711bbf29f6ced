//! # Integration-Scheme Benchmark
//!
//! Compares the per-step cost of the fixed-stencil integrators against the
//! exponential-Euler path on the same conditionally linear test equation,
//! and measures the one-time cost of the symbolic compilation itself.
//!
//! The stencils evaluate the compiled drift one to four times per step; the
//! exponential step evaluates the two decomposition coefficients instead.
//! Compilation (parsing, expansion, collection, code generation) happens
//! once per equation set and is expected to be amortized over a long
//! simulation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use odegen::{build_integrator, exponential_euler, DiffEquation, EquationSet, Scheme};

const DT: f64 = 0.01;
const STEPS: usize = 1_000;

fn run(step: &odegen::StepFn, params: &[f64]) -> f64 {
    let mut x = 1.0;
    let mut t = 0.0;
    for _ in 0..STEPS {
        x = step(x, t, params);
        t += DT;
    }
    x
}

fn benchmark_steppers(c: &mut Criterion) {
    let equation = DiffEquation::ode("x", "-k * x + c");
    let params = [0.3, 2.0]; // alphabetical: c, k

    let mut group = c.benchmark_group("One-Step Integrators");
    for scheme in [Scheme::Euler, Scheme::Rk4, Scheme::Exponential] {
        let step = build_integrator(&equation, Some(scheme), DT)
            .expect("failed to build integrator");
        group.bench_function(scheme.name(), |b| {
            b.iter(|| run(black_box(&step), black_box(&params)))
        });
    }
    group.finish();
}

fn benchmark_compilation(c: &mut Criterion) {
    let mut eqs = EquationSet::new();
    eqs.push(DiffEquation::ode(
        "m",
        "0.1 * (V + 40) / (1 - exp(-(V + 40) / 10)) * (1 - m) - 4.0 * exp(-(V + 65) / 18) * m",
    ));
    eqs.push(DiffEquation::ode("v", "(-v + w**2) / tau"));
    eqs.push(DiffEquation::ode("w", "-w / tau"));

    c.bench_function("exponential_euler compilation", |b| {
        b.iter(|| exponential_euler(black_box(&eqs), "dt").expect("compilation failed"))
    });
}

criterion_group!(benches, benchmark_steppers, benchmark_compilation);
criterion_main!(benches);
