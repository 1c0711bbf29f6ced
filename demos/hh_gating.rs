//! Compiles the Hodgkin-Huxley m-gate equation with the exponential-Euler
//! generator and simulates it at a clamped membrane potential.
//!
//! The gating equation `dm/dt = alpha(V) * (1 - m) - beta(V) * m` is linear
//! in `m` but arbitrarily nonlinear in `V`, which is exactly the class the
//! exponential integrator solves exactly per step. Run with:
//!
//! ```bash
//! cargo run --example hh_gating
//! ```

use std::collections::HashMap;

use odegen::{conditionally_linear_system, exponential_euler, DiffEquation, EquationSet};
use odegen::render::render;

fn main() {
    let mut eqs = EquationSet::new();
    eqs.push(DiffEquation::ode(
        "m",
        "0.1 * (V + 40) / (1 - exp(-(V + 40) / 10)) * (1 - m) - 4.0 * exp(-(V + 65) / 18) * m",
    ));

    let system = conditionally_linear_system(&eqs).expect("equation is conditionally linear");
    for (variable, decomposition) in &system {
        println!("d{variable}/dt = A*{variable} + B with");
        println!("  A = {}", render(&decomposition.coefficient));
        println!("  B = {}", render(&decomposition.constant));
    }

    let update = exponential_euler(&eqs, "dt").expect("compilation failed");
    println!("\ngenerated update:\n{update}\n");

    // Simulate the gate at a clamped potential; m converges to the
    // steady-state activation alpha / (alpha + beta).
    let v = -30.0;
    let dt = 0.01;
    let mut env: HashMap<String, f64> = HashMap::from([
        ("m".to_string(), 0.05),
        ("V".to_string(), v),
        ("dt".to_string(), dt),
    ]);
    for step in 0..=500 {
        if step % 100 == 0 {
            println!("t = {:5.2} ms   m = {:.6}", step as f64 * dt, env["m"]);
        }
        update.apply(&mut env).expect("update failed");
    }

    let alpha = 0.1 * (v + 40.0) / (1.0 - (-(v + 40.0) / 10.0).exp());
    let beta = 4.0 * (-(v + 65.0) / 18.0).exp();
    println!("steady state: {:.6}", alpha / (alpha + beta));
}
