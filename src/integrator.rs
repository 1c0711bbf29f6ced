//! Integration-scheme registry and one-step integrator construction.
//!
//! Given a differential equation (drift plus optional diffusion) and a
//! scheme name, `build_integrator` returns a one-step update callable. The
//! deterministic schemes other than `exponential` are closed-form stencils
//! over evaluations of the drift at one or more stage points per step; the
//! `exponential` scheme delegates to the symbolic exponential-Euler path;
//! the Milstein variants additionally evaluate the diffusion and combine it
//! with one standard-normal increment scaled by `sqrt(dt)` per step.
//!
//! Every returned step function is a pure function of its inputs (the
//! stochastic steps draw their increment fresh each call); no state is
//! retained across calls, so step functions can be applied to whole
//! populations in parallel with `step_batch`.

use std::str::FromStr;
use std::sync::Arc;

use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;

use crate::equation::Equation;
use crate::errors::IntegratorError;
use crate::exponential::exponential_integrator;
use crate::linear::{DiffEquation, Noise, Rhs};
use crate::types::{RhsFn, StepFn};

/// Convergence threshold and iteration cap for the implicit schemes'
/// fixed-point iteration.
const FIXED_POINT_EPSILON: f64 = 1e-12;
const FIXED_POINT_MAX_ITERS: usize = 256;

/// The registry of one-step integration schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Forward Euler, the most unstable integrator known; accuracy is O(dt)
    Euler,
    /// Explicit midpoint method (parametric RK2 with beta = 1/2)
    Midpoint,
    /// Heun's method, the explicit trapezoid rule (beta = 1)
    Heun,
    /// Ralston's second-order Runge-Kutta (beta = 2/3)
    Rk2,
    /// Kutta's third-order method
    Rk3,
    /// Classical fourth-order Runge-Kutta
    Rk4,
    /// The 3/8-rule alternative fourth-order Runge-Kutta
    Rk4Alternative,
    /// Backward Euler, solved by fixed-point iteration
    BackwardEuler,
    /// Trapezoidal rule, solved by fixed-point iteration
    Trapezoidal,
    /// Exponential Euler over the conditionally linear decomposition
    Exponential,
    /// Derivative-free Milstein, Ito interpretation
    Milstein,
    /// Explicit alias of the Ito Milstein scheme
    MilsteinIto,
    /// Derivative-free Milstein, Stratonovich interpretation
    MilsteinStra,
}

impl Scheme {
    /// The scheme's registry name.
    pub fn name(&self) -> &'static str {
        match self {
            Scheme::Euler => "euler",
            Scheme::Midpoint => "midpoint",
            Scheme::Heun => "heun",
            Scheme::Rk2 => "rk2",
            Scheme::Rk3 => "rk3",
            Scheme::Rk4 => "rk4",
            Scheme::Rk4Alternative => "rk4_alternative",
            Scheme::BackwardEuler => "backward_euler",
            Scheme::Trapezoidal => "trapezoidal",
            Scheme::Exponential => "exponential",
            Scheme::Milstein => "milstein",
            Scheme::MilsteinIto => "milstein_ito",
            Scheme::MilsteinStra => "milstein_stra",
        }
    }

    /// Whether the scheme consumes a diffusion term.
    pub fn is_stochastic(&self) -> bool {
        matches!(
            self,
            Scheme::Milstein | Scheme::MilsteinIto | Scheme::MilsteinStra
        )
    }
}

impl FromStr for Scheme {
    type Err = IntegratorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "euler" => Ok(Scheme::Euler),
            "midpoint" => Ok(Scheme::Midpoint),
            "heun" => Ok(Scheme::Heun),
            "rk2" => Ok(Scheme::Rk2),
            "rk3" => Ok(Scheme::Rk3),
            "rk4" => Ok(Scheme::Rk4),
            "rk4_alternative" => Ok(Scheme::Rk4Alternative),
            "backward_euler" => Ok(Scheme::BackwardEuler),
            "trapezoidal" => Ok(Scheme::Trapezoidal),
            "exponential" => Ok(Scheme::Exponential),
            "milstein" => Ok(Scheme::Milstein),
            "milstein_ito" => Ok(Scheme::MilsteinIto),
            "milstein_stra" => Ok(Scheme::MilsteinStra),
            other => Err(IntegratorError::UnknownScheme(other.to_string())),
        }
    }
}

/// Builds the one-step integrator for an equation.
///
/// When no scheme is requested, a stochastic equation selects `milstein`
/// and a deterministic one selects `euler`. Scheme preconditions are
/// checked before any symbolic work: the exponential scheme refuses
/// stochastic equations, and the Milstein variants refuse equations without
/// a diffusion term.
///
/// # Example
/// ```
/// use odegen::{build_integrator, DiffEquation, Scheme};
///
/// let eq = DiffEquation::ode("x", "-x + sin(t)");
/// let step = build_integrator(&eq, Some(Scheme::Rk4), 0.01).unwrap();
/// let x1 = step(1.0, 0.0, &[]);
/// assert!(x1 < 1.0);
/// ```
pub fn build_integrator(
    equation: &DiffEquation,
    scheme: Option<Scheme>,
    dt: f64,
) -> Result<StepFn, IntegratorError> {
    let stochastic = equation.is_stochastic();
    let scheme = match scheme {
        Some(scheme) => scheme,
        None if stochastic => Scheme::Milstein,
        None => Scheme::Euler,
    };

    // Precondition checks come first; no symbolic work before them.
    if scheme == Scheme::Exponential && stochastic {
        return Err(IntegratorError::StochasticExponential);
    }
    if scheme.is_stochastic() && !stochastic {
        return Err(IntegratorError::MissingDiffusion(scheme.name()));
    }

    if scheme == Scheme::Exponential {
        return Ok(exponential_integrator(equation, dt)?);
    }

    let f = drift_fn(equation)?;
    if scheme.is_stochastic() {
        let g = noise_fn(equation)?;
        let stratonovich = scheme == Scheme::MilsteinStra;
        return Ok(milstein(f, g, dt, stratonovich));
    }

    Ok(match scheme {
        Scheme::Euler => euler(f, dt),
        Scheme::Midpoint => rk2(f, dt, 0.5),
        Scheme::Heun => rk2(f, dt, 1.0),
        Scheme::Rk2 => rk2(f, dt, 2.0 / 3.0),
        Scheme::Rk3 => rk3(f, dt),
        Scheme::Rk4 => rk4(f, dt),
        Scheme::Rk4Alternative => rk4_alternative(f, dt),
        Scheme::BackwardEuler => backward_euler(f, dt),
        Scheme::Trapezoidal => trapezoidal(f, dt),
        Scheme::Exponential
        | Scheme::Milstein
        | Scheme::MilsteinIto
        | Scheme::MilsteinStra => unreachable!("dispatched above"),
    })
}

/// Applies a step function to a whole population of states in parallel.
///
/// All states advance with the same time and parameters; this matches the
/// synchronous-step semantics of simulating a population governed by one
/// equation.
pub fn step_batch(step: &StepFn, states: &[f64], t: f64, params: &[f64]) -> Vec<f64> {
    states.par_iter().map(|&y| step(y, t, params)).collect()
}

fn drift_fn(equation: &DiffEquation) -> Result<RhsFn, IntegratorError> {
    match &equation.drift {
        Rhs::Func(f) => Ok(f.clone()),
        Rhs::Source(text) => {
            // The shared layout of `param_names` covers a textual diffusion
            // term too, so drift and diffusion read one parameter slice.
            let params = equation.param_names()?;
            let compiled = Equation::new(text.clone())?;
            Ok(compiled.rhs_fn_with_params(&equation.variable, &params)?)
        }
    }
}

fn noise_fn(equation: &DiffEquation) -> Result<RhsFn, IntegratorError> {
    match &equation.noise {
        Some(Noise::Constant(value)) => {
            let value = *value;
            Ok(Arc::new(move |_, _, _| value))
        }
        Some(Noise::Func(g)) => Ok(g.clone()),
        Some(Noise::Source(text)) => {
            let compiled = Equation::new(text.clone())?;
            let params = match &equation.drift {
                Rhs::Source(_) => equation.param_names()?,
                // Callable drift: the layout is the diffusion's own symbols.
                Rhs::Func(_) => compiled.param_names(&equation.variable),
            };
            Ok(compiled.rhs_fn_with_params(&equation.variable, &params)?)
        }
        None => Err(IntegratorError::MissingDiffusion("milstein")),
    }
}

/// Forward Euler: `y + dt * f(y, t)`.
fn euler(f: RhsFn, dt: f64) -> StepFn {
    Arc::new(move |y0, t, args| y0 + dt * f(y0, t, args))
}

/// Parametric second-order Runge-Kutta.
///
/// `beta` selects the member of the family: 1/2 is the explicit midpoint
/// method, 2/3 is Ralston's method, 1 is Heun's method.
fn rk2(f: RhsFn, dt: f64, beta: f64) -> StepFn {
    Arc::new(move |y0, t, args| {
        let k1 = f(y0, t, args);
        let k2 = f(y0 + beta * dt * k1, t + beta * dt, args);
        y0 + dt * ((1.0 - 1.0 / (2.0 * beta)) * k1 + 1.0 / (2.0 * beta) * k2)
    })
}

/// Kutta's third-order method.
fn rk3(f: RhsFn, dt: f64) -> StepFn {
    Arc::new(move |y0, t, args| {
        let k1 = f(y0, t, args);
        let k2 = f(y0 + dt / 2.0 * k1, t + dt / 2.0, args);
        let k3 = f(y0 - dt * k1 + 2.0 * dt * k2, t + dt, args);
        y0 + dt / 6.0 * (k1 + 4.0 * k2 + k3)
    })
}

/// Classical fourth-order Runge-Kutta: four stages with weights 1, 2, 2, 1
/// over `dt/6`.
fn rk4(f: RhsFn, dt: f64) -> StepFn {
    Arc::new(move |y0, t, args| {
        let k1 = f(y0, t, args);
        let k2 = f(y0 + dt / 2.0 * k1, t + dt / 2.0, args);
        let k3 = f(y0 + dt / 2.0 * k2, t + dt / 2.0, args);
        let k4 = f(y0 + dt * k3, t + dt, args);
        y0 + dt / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
    })
}

/// The 3/8-rule member of the fourth-order Runge-Kutta family.
fn rk4_alternative(f: RhsFn, dt: f64) -> StepFn {
    Arc::new(move |y0, t, args| {
        let k1 = f(y0, t, args);
        let k2 = f(y0 + dt / 3.0 * k1, t + dt / 3.0, args);
        let k3 = f(y0 - dt / 3.0 * k1 + dt * k2, t + 2.0 * dt / 3.0, args);
        let k4 = f(y0 + dt * k1 - dt * k2 + dt * k3, t + dt, args);
        y0 + dt / 8.0 * (k1 + 3.0 * k2 + 3.0 * k3 + k4)
    })
}

/// Backward Euler via fixed-point iteration.
fn backward_euler(f: RhsFn, dt: f64) -> StepFn {
    Arc::new(move |y0, t, args| {
        let mut y1 = y0 + dt * f(y0, t, args);
        let mut y2 = y0 + dt * f(y1, t, args);
        for _ in 0..FIXED_POINT_MAX_ITERS {
            if (y1 - y2).abs() < FIXED_POINT_EPSILON {
                break;
            }
            y1 = y2;
            y2 = y0 + dt * f(y1, t, args);
        }
        y2
    })
}

/// Trapezoidal rule via fixed-point iteration.
fn trapezoidal(f: RhsFn, dt: f64) -> StepFn {
    Arc::new(move |y0, t, args| {
        let dy0 = f(y0, t, args);
        let mut y1 = y0 + dt * dy0;
        let mut y2 = y0 + dt / 2.0 * (dy0 + f(y1, t + dt, args));
        for _ in 0..FIXED_POINT_MAX_ITERS {
            if (y1 - y2).abs() < FIXED_POINT_EPSILON {
                break;
            }
            y1 = y2;
            y2 = y0 + dt / 2.0 * (dy0 + f(y1, t + dt, args));
        }
        y2
    })
}

/// Derivative-free Milstein step.
///
/// One standard-normal increment is drawn per step; the derivative of the
/// diffusion is approximated with a second diffusion evaluation at the
/// Euler predictor. The Ito correction is `(g(y_bar) - g(y)) / (2*sqrt(dt))
/// * (dW^2 - dt)`; the Stratonovich variant drops the `- dt`.
fn milstein(f: RhsFn, g: RhsFn, dt: f64, stratonovich: bool) -> StepFn {
    Arc::new(move |y0, t, args| {
        let xi: f64 = rand::thread_rng().sample(StandardNormal);
        let dt_sqrt = dt.sqrt();
        let dw = dt_sqrt * xi;
        let df = dt * f(y0, t, args);
        let g_n = g(y0, t, args);
        let y_bar = y0 + df + g_n * dt_sqrt;
        let g_bar = g(y_bar, t + dt, args);
        let correction = if stratonovich {
            (g_bar - g_n) / (2.0 * dt_sqrt) * (dw * dw)
        } else {
            (g_bar - g_n) / (2.0 * dt_sqrt) * (dw * dw - dt)
        };
        y0 + df + g_n * dw + correction
    })
}
