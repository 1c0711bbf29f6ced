//! Symbolic differential-equation compiler with an exponential-Euler code
//! generator and a registry of classical fixed-step integrators.
//!
//! This crate takes the right-hand side of a differential equation as
//! ordinary arithmetic source text and derives a numerical one-step update
//! for it. The core is a symbolic pipeline: a bidirectional translator
//! between expression text and an algebra tree, an extractor that decides
//! whether an equation is *conditionally linear* in its own state variable,
//! and a generator that turns the resulting decomposition into the exact
//! exponential-integrator update. A scheme dispatcher wraps the pipeline
//! together with the classical explicit, implicit and stochastic stencils.
//!
//! # Features
//!
//! - Text-to-tree-to-text expression translation with round-trip stability
//! - Conditional-linearity detection with hard rejection on failure
//! - Exact exponential-Euler updates, emitted as source text or as a step
//!   closure
//! - Euler, midpoint, Heun, Runge-Kutta 2/3/4, implicit and Milstein
//!   stencils behind one dispatcher
//!
//! # Example
//!
//! ```rust
//! use odegen::{exponential_euler, DiffEquation, EquationSet};
//!
//! // A Hodgkin-Huxley style gating variable: linear in m, arbitrary in V.
//! let mut eqs = EquationSet::new();
//! eqs.push(DiffEquation::ode(
//!     "m",
//!     "0.1 * (V + 40) / (1 - exp(-(V + 40) / 10)) * (1 - m) - 4.0 * exp(-(V + 65) / 18) * m",
//! ));
//!
//! // Compile the exact one-step update.
//! let update = exponential_euler(&eqs, "dt").unwrap();
//! println!("{update}");
//! ```
//!
//! ```rust
//! use odegen::{build_integrator, DiffEquation, Scheme};
//!
//! // Or build a classical stepper directly from the drift.
//! let eq = DiffEquation::ode("x", "-x + sin(t)");
//! let step = build_integrator(&eq, Some(Scheme::Rk4), 0.01).unwrap();
//! let x1 = step(1.0, 0.0, &[]);
//! assert!(x1 < 1.0);
//! ```

pub use equation::Equation;
pub use exponential::{exponential_euler, exponential_integrator, GeneratedUpdate};
pub use integrator::{build_integrator, step_batch, Scheme};
pub use linear::{
    conditionally_linear_system, DiffEquation, EquationSet, LinearDecomposition, Noise, Rhs,
};
pub use types::{RhsFn, StepFn};

pub mod prelude {
    pub use crate::equation::Equation;
    pub use crate::expr::Expr;
    pub use crate::exponential::{exponential_euler, GeneratedUpdate};
    pub use crate::integrator::{build_integrator, Scheme};
    pub use crate::linear::{DiffEquation, EquationSet};
    pub use crate::parse::parse;
    pub use crate::render::render;
}

/// Compiled textual right-hand sides
pub mod equation;
/// Error types for the various failure modes
pub mod errors;
/// Exponential-Euler update generation
pub mod exponential;
/// Symbolic expression tree representation
pub mod expr;
/// Canonical function and constant name tables
pub mod functions;
/// Scheme registry and one-step integrator construction
pub mod integrator;
/// Conditionally linear system extraction
pub mod linear;
/// Translation of expression text into symbolic trees
pub mod parse;
/// Serialization of symbolic trees back to expression text
pub mod render;
/// Shared callable type aliases
pub mod types;
