//! Exponential-Euler update generation.
//!
//! For a conditionally linear equation `dx/dt = A*x + B` with `A` and `B`
//! frozen over one step, the exact solution after a step of size `dt` is
//!
//! ```text
//! x(t + dt) = (x + B/A) * exp(A*dt) - B/A
//! ```
//!
//! This module turns the decompositions produced by the `linear` module into
//! that update, in two forms:
//!
//! - `exponential_euler` emits the update as ordered assignment statements
//!   (a `GeneratedUpdate`), suitable for an execution layer that compiles
//!   and caches generated source.
//! - `exponential_integrator` builds a step closure directly, for use as a
//!   drop-in scheme in the integrator dispatcher.
//!
//! Generation is two-phase: every variable's update is first computed into a
//! `_var` temporary, and only after all temporaries are computed are the
//! variables reassigned. A variable's update therefore never observes
//! another variable's already-updated value within the same step.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::EquationError;
use crate::expr::Expr;
use crate::functions::Function;
use crate::linear::{conditionally_linear_system, DiffEquation, EquationSet};
use crate::parse::parse;
use crate::render::render;
use crate::types::StepFn;

/// An ordered sequence of assignment statements advancing an equation set by
/// one step.
///
/// The statements use the same textual grammar the parser accepts; binding
/// `dt`, time and all free symbols to values makes them executable. `apply`
/// is a reference executor for exactly that, used by the test suite and
/// small simulations; production execution layers are expected to compile
/// the text themselves and cache it by variable-set signature.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedUpdate {
    statements: Vec<String>,
}

impl GeneratedUpdate {
    /// The statements in execution order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// The statements joined into one source block.
    pub fn code(&self) -> String {
        self.statements.join("\n")
    }

    /// Executes the update against an environment of symbol values.
    ///
    /// Every statement is parsed and evaluated in order; assigned values
    /// (including the `_var` temporaries and `_BA_var` hoists) are written
    /// back into the environment. The environment must bind `dt` and every
    /// free symbol of the compiled equations.
    pub fn apply(&self, env: &mut HashMap<String, f64>) -> Result<(), EquationError> {
        for statement in &self.statements {
            match parse(statement)? {
                Expr::Assign(target, value) => {
                    let value = value.eval(env)?;
                    env.insert(target, value);
                }
                _ => unreachable!("generated statements are assignments"),
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for GeneratedUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Generates the exponential-Euler update for a conditionally linear set.
///
/// Per variable `x` with decomposition `(A, B)`:
/// - `A == 0`: `_x = x + dt*B` (the equation is independent of `x`'s own
///   rate, so the forward step is already exact)
/// - `B != 0`: `B/A` is hoisted into `_BA_x` once, then
///   `_x = (x + _BA_x) * exp(A*dt) - _BA_x`
/// - `B == 0`: `_x = x * exp(A*dt)`
///
/// After all update expressions, one `x = _x` reassignment per variable is
/// appended in the original variable order.
///
/// # Arguments
/// * `eqs` - The equation set to compile
/// * `dt_name` - The symbol name the emitted code uses for the step size
///
/// # Example
/// ```
/// use odegen::{exponential_euler, DiffEquation, EquationSet};
///
/// let mut eqs = EquationSet::new();
/// eqs.push(DiffEquation::ode("w", "-w / tau"));
/// let update = exponential_euler(&eqs, "dt").unwrap();
/// assert_eq!(update.statements().len(), 2);
/// ```
pub fn exponential_euler(
    eqs: &EquationSet,
    dt_name: &str,
) -> Result<GeneratedUpdate, EquationError> {
    let system = conditionally_linear_system(eqs)?;

    let mut statements = Vec::with_capacity(2 * system.len());
    for (variable, decomposition) in &system {
        let x = Expr::symbol(variable.clone());
        let dt = Expr::symbol(dt_name);
        let a = &decomposition.coefficient;
        let b = &decomposition.constant;

        let update = if a.is_zero() {
            // _x = x + dt*B
            Expr::add(x, Expr::mul(dt, b.clone()))
        } else if !b.is_zero() {
            // Hoist B/A so the exponential expression does not recompute it.
            let ba = Expr::mul(b.clone(), Expr::recip(a.clone()));
            let ba_name = format!("_BA_{variable}");
            statements.push(format!("{} = {}", ba_name, render(&ba)));
            let ba = Expr::symbol(ba_name);
            // _x = (x + _BA_x) * exp(A*dt) - _BA_x
            Expr::add(
                Expr::mul(
                    Expr::add(x, ba.clone()),
                    Expr::call(Function::Exp, vec![Expr::mul(a.clone(), dt)]),
                ),
                Expr::neg(ba),
            )
        } else {
            // _x = x * exp(A*dt)
            Expr::mul(x, Expr::call(Function::Exp, vec![Expr::mul(a.clone(), dt)]))
        };

        statements.push(format!("_{} = {}", variable, render(&update)));
    }

    // Commit phase: all variables advance from the same pre-step snapshot.
    for (variable, _) in &system {
        statements.push(format!("{variable} = _{variable}"));
    }

    Ok(GeneratedUpdate { statements })
}

/// Builds an exponential-Euler step closure for a single equation.
///
/// The decomposition `(A, B)` is extracted once; at each step both parts are
/// evaluated with the current bindings and the closed-form update is
/// applied. Parameters are bound in the order of
/// [`DiffEquation::param_names`].
///
/// # Errors
/// Fails like `conditionally_linear_system`: on stochastic equations (before
/// any symbolic work), on callable-only drifts and on equations that are not
/// conditionally linear.
pub fn exponential_integrator(
    equation: &DiffEquation,
    dt: f64,
) -> Result<StepFn, EquationError> {
    if equation.is_stochastic() {
        return Err(EquationError::Stochastic);
    }

    let eqs = EquationSet::from(vec![equation.clone()]);
    let mut system = conditionally_linear_system(&eqs)?;
    let (variable, decomposition) = system.remove(0);

    decomposition.coefficient.check_evaluable()?;
    decomposition.constant.check_evaluable()?;
    let params = equation.param_names()?;

    Ok(Arc::new(move |y, t, args| {
        let mut bindings = HashMap::with_capacity(params.len() + 2);
        bindings.insert(variable.clone(), y);
        bindings.insert("t".to_string(), t);
        for (name, value) in params.iter().zip(args.iter()) {
            bindings.insert(name.clone(), *value);
        }
        let a = decomposition
            .coefficient
            .eval(&bindings)
            .expect("coefficient was validated when the integrator was built");
        let b = decomposition
            .constant
            .eval(&bindings)
            .expect("constant was validated when the integrator was built");
        if a == 0.0 {
            y + dt * b
        } else if b != 0.0 {
            let ba = b / a;
            (y + ba) * (a * dt).exp() - ba
        } else {
            y * (a * dt).exp()
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::Noise;

    fn env(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn test_zero_rate_reduces_to_forward_euler() {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode("x", "c"));
        let update = exponential_euler(&eqs, "dt").unwrap();

        let mut state = env(&[("x", 1.0), ("c", 0.3), ("dt", 0.5)]);
        update.apply(&mut state).unwrap();
        assert!((state["x"] - (1.0 + 0.5 * 0.3)).abs() < 1e-15);
    }

    #[test]
    fn test_homogeneous_update() {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode("x", "-k * x"));
        let update = exponential_euler(&eqs, "dt").unwrap();
        // No B/A hoist for a homogeneous equation.
        assert_eq!(update.statements().len(), 2);

        let mut state = env(&[("x", 2.0), ("k", 0.5), ("dt", 0.25)]);
        update.apply(&mut state).unwrap();
        assert!((state["x"] - 2.0 * (-0.5f64 * 0.25).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_single_step_is_exact_for_any_dt() {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode("x", "-k * x + c"));
        let update = exponential_euler(&eqs, "dt").unwrap();

        // The scheme is the closed-form solution, so even a large step is
        // exact for the frozen-coefficient equation.
        for dt in [1e-3, 0.1, 2.0, 10.0] {
            let (x0, k, c) = (2.0, 0.5, 0.3);
            let mut state = env(&[("x", x0), ("k", k), ("c", c), ("dt", dt)]);
            update.apply(&mut state).unwrap();

            let (a, b) = (-k, c);
            let exact = (x0 + b / a) * (a * dt).exp() - b / a;
            assert!(
                (state["x"] - exact).abs() < 1e-12,
                "dt={dt}: {} != {exact}",
                state["x"]
            );
        }
    }

    #[test]
    fn test_ba_hoisted_once() {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode("x", "-k * x + c"));
        let update = exponential_euler(&eqs, "dt").unwrap();

        let hoists: Vec<&String> = update
            .statements()
            .iter()
            .filter(|s| s.starts_with("_BA_x = "))
            .collect();
        assert_eq!(hoists.len(), 1);
        // The exponential expression reuses the hoisted name.
        assert!(update.statements()[1].contains("_BA_x"));
    }

    #[test]
    fn test_trajectory_converges_to_analytic_solution() {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode("x", "-k * x + c"));
        let update = exponential_euler(&eqs, "dt").unwrap();

        let (x0, k, c) = (1.0, 2.0, 0.4);
        let (a, b) = (-k, c);
        let t_end = 1.0;
        let dt = 1e-3;
        let steps = (t_end / dt) as usize;

        let mut state = env(&[("x", x0), ("k", k), ("c", c), ("dt", dt)]);
        for _ in 0..steps {
            update.apply(&mut state).unwrap();
        }
        let exact = (x0 + b / a) * (a * t_end).exp() - b / a;
        assert!((state["x"] - exact).abs() < 1e-12);
    }

    #[test]
    fn test_synchronous_commit() {
        // Each variable is linear in itself and references the other; both
        // updates must read the pre-step snapshot.
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode("v", "-v + w"));
        eqs.push(DiffEquation::ode("w", "-w + v"));
        let update = exponential_euler(&eqs, "dt").unwrap();

        let (v0, w0, dt) = (1.0, -0.5, 0.3);
        let mut state = env(&[("v", v0), ("w", w0), ("dt", dt)]);
        update.apply(&mut state).unwrap();

        // A = -1, B = other variable, so B/A = -other.
        let expected_v = (v0 - w0) * (-dt).exp() + w0;
        let expected_w = (w0 - v0) * (-dt).exp() + v0;
        assert!((state["v"] - expected_v).abs() < 1e-12);
        assert!((state["w"] - expected_w).abs() < 1e-12);

        // Emission order must not affect the result.
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode("w", "-w + v"));
        eqs.push(DiffEquation::ode("v", "-v + w"));
        let update = exponential_euler(&eqs, "dt").unwrap();
        let mut swapped = env(&[("v", v0), ("w", w0), ("dt", dt)]);
        update.apply(&mut swapped).unwrap();
        assert!((swapped["v"] - state["v"]).abs() < 1e-15);
        assert!((swapped["w"] - state["w"]).abs() < 1e-15);
    }

    #[test]
    fn test_custom_dt_symbol() {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode("x", "-x"));
        let update = exponential_euler(&eqs, "h").unwrap();
        assert!(update.code().contains("h"));
        let mut state = env(&[("x", 1.0), ("h", 0.5)]);
        update.apply(&mut state).unwrap();
        assert!((state["x"] - (-0.5f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_stochastic_rejected() {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::sde("x", "-x", Noise::Constant(0.1)));
        assert!(matches!(
            exponential_euler(&eqs, "dt"),
            Err(EquationError::Stochastic)
        ));
    }

    #[test]
    fn test_integrator_closure_matches_generated_text() {
        let equation = DiffEquation::ode("x", "-k * x + c");
        let dt = 0.7;
        let step = exponential_integrator(&equation, dt).unwrap();

        let (x0, k, c) = (2.0, 0.5, 0.3);
        let stepped = step(x0, 0.0, &[c, k]); // params alphabetical: c, k

        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode("x", "-k * x + c"));
        let update = exponential_euler(&eqs, "dt").unwrap();
        let mut state = env(&[("x", x0), ("k", k), ("c", c), ("dt", dt)]);
        update.apply(&mut state).unwrap();

        assert!((stepped - state["x"]).abs() < 1e-12);
    }
}
