//! Conditionally linear system extraction.
//!
//! A differential equation is conditionally linear when its right-hand side
//! is an affine function of its own state variable: `dx/dt = A*x + B` where
//! neither `A` nor `B` contains `x` (both may depend arbitrarily on other
//! variables and time). Typical Hodgkin-Huxley gating equations fall into
//! this category.
//!
//! This module defines the equation containers (`DiffEquation`,
//! `EquationSet`) and the extraction algorithm: each derivative expression
//! is parsed, algebraically expanded, and collected as a polynomial in its
//! own variable. Terms of degree one form the coefficient `A`, terms of
//! degree zero form `B`. Any higher degree or non-polynomial dependency on
//! the variable is a hard rejection, not an approximation.

use crate::errors::EquationError;
use crate::expr::Expr;
use crate::parse::parse;
use crate::types::RhsFn;

/// The right-hand side of a differential equation.
///
/// The surrounding framework supplies either the textual source of the
/// expression or a ready-made callable. Symbolic compilation (the
/// exponential path) requires the source; the fixed-stencil integrators
/// accept both.
#[derive(Clone)]
pub enum Rhs {
    /// Expression source text in the grammar of the `parse` module
    Source(String),
    /// A native callable `(state, t, params) -> f64`
    Func(RhsFn),
}

impl Rhs {
    /// The textual source, when available.
    pub fn source(&self) -> Option<&str> {
        match self {
            Rhs::Source(text) => Some(text),
            Rhs::Func(_) => None,
        }
    }
}

impl std::fmt::Debug for Rhs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rhs::Source(text) => f.debug_tuple("Source").field(text).finish(),
            Rhs::Func(_) => f.debug_tuple("Func").field(&"<callable>").finish(),
        }
    }
}

impl From<&str> for Rhs {
    fn from(text: &str) -> Self {
        Rhs::Source(text.to_string())
    }
}

impl From<String> for Rhs {
    fn from(text: String) -> Self {
        Rhs::Source(text)
    }
}

impl From<RhsFn> for Rhs {
    fn from(func: RhsFn) -> Self {
        Rhs::Func(func)
    }
}

/// The diffusion term of a stochastic differential equation.
///
/// The framework declares the noise as a constant amplitude, a callable, or
/// expression source text; a constant amplitude of zero means the equation
/// is deterministic after all.
#[derive(Clone)]
pub enum Noise {
    Constant(f64),
    Func(RhsFn),
    Source(String),
}

impl std::fmt::Debug for Noise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Noise::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Noise::Func(_) => f.debug_tuple("Func").field(&"<callable>").finish(),
            Noise::Source(text) => f.debug_tuple("Source").field(text).finish(),
        }
    }
}

/// One differential equation: a state variable, its drift and optional noise.
#[derive(Debug, Clone)]
pub struct DiffEquation {
    pub variable: String,
    pub drift: Rhs,
    pub noise: Option<Noise>,
}

impl DiffEquation {
    /// A deterministic equation `d<variable>/dt = drift`.
    pub fn ode(variable: impl Into<String>, drift: impl Into<Rhs>) -> Self {
        DiffEquation {
            variable: variable.into(),
            drift: drift.into(),
            noise: None,
        }
    }

    /// A stochastic equation with the given diffusion term.
    pub fn sde(variable: impl Into<String>, drift: impl Into<Rhs>, noise: Noise) -> Self {
        DiffEquation {
            variable: variable.into(),
            drift: drift.into(),
            noise: Some(noise),
        }
    }

    /// Whether the equation carries a non-zero diffusion term.
    ///
    /// The framework's declaration is trusted: a callable or textual noise
    /// term counts as stochastic without inspecting it; only a constant
    /// amplitude of exactly zero is deterministic.
    pub fn is_stochastic(&self) -> bool {
        match &self.noise {
            None => false,
            Some(Noise::Constant(value)) => *value != 0.0,
            Some(_) => true,
        }
    }

    /// The parameter names a compiled right-hand side expects, in order:
    /// the free symbols of the drift (and of a textual diffusion term, when
    /// present) other than the state variable and `t`, alphabetically.
    pub fn param_names(&self) -> Result<Vec<String>, EquationError> {
        let source = self
            .drift
            .source()
            .ok_or_else(|| EquationError::MissingSource(self.variable.clone()))?;
        let mut names: std::collections::BTreeSet<String> =
            parse(source)?.symbols().into_iter().collect();
        if let Some(Noise::Source(text)) = &self.noise {
            names.extend(parse(text)?.symbols());
        }
        Ok(names
            .into_iter()
            .filter(|name| *name != self.variable && name != "t")
            .collect())
    }
}

/// An ordered set of differential equations.
///
/// The order only determines the ordering of generated output; derivatives
/// are not mutually dependent within one synchronous step.
#[derive(Debug, Clone, Default)]
pub struct EquationSet {
    equations: Vec<DiffEquation>,
}

impl EquationSet {
    pub fn new() -> Self {
        EquationSet {
            equations: Vec::new(),
        }
    }

    /// Appends an equation, keeping insertion order.
    pub fn push(&mut self, equation: DiffEquation) {
        self.equations.push(equation);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffEquation> {
        self.equations.iter()
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    /// Whether any equation in the set carries a non-zero diffusion term.
    pub fn is_stochastic(&self) -> bool {
        self.equations.iter().any(DiffEquation::is_stochastic)
    }

    /// The state variables in declaration order.
    pub fn variables(&self) -> Vec<&str> {
        self.equations
            .iter()
            .map(|eq| eq.variable.as_str())
            .collect()
    }
}

impl From<Vec<DiffEquation>> for EquationSet {
    fn from(equations: Vec<DiffEquation>) -> Self {
        EquationSet { equations }
    }
}

/// The affine decomposition of one derivative: `dx/dt = A*x + B`.
///
/// Invariant: neither expression contains the variable it decomposes.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearDecomposition {
    /// The coefficient `A` of the variable's own value
    pub coefficient: Expr,
    /// The variable-free remainder `B`
    pub constant: Expr,
}

/// Extracts the conditionally linear decomposition of every equation.
///
/// For every variable `x` with derivative expression `expr`, returns a pair
/// `(A, B)` such that the derivative equals `A*x + B` and neither part
/// contains `x`. The returned mapping preserves the equation set's order.
///
/// # Errors
/// - `EquationError::Stochastic` if the set has a diffusion term; this is
///   checked before any symbolic work
/// - `EquationError::MissingSource` if a drift was supplied as a callable
/// - `EquationError::NotConditionallyLinear` if a derivative has degree two
///   or higher in its own variable, or depends on it non-polynomially
///
/// # Example
/// ```
/// use odegen::{conditionally_linear_system, DiffEquation, EquationSet};
///
/// let mut eqs = EquationSet::new();
/// eqs.push(DiffEquation::ode("v", "(-v + w**2) / tau"));
/// eqs.push(DiffEquation::ode("w", "-w / tau"));
/// let system = conditionally_linear_system(&eqs).unwrap();
/// assert_eq!(system[0].0, "v");
/// ```
pub fn conditionally_linear_system(
    eqs: &EquationSet,
) -> Result<Vec<(String, LinearDecomposition)>, EquationError> {
    if eqs.is_stochastic() {
        return Err(EquationError::Stochastic);
    }

    let mut system = Vec::with_capacity(eqs.len());
    for equation in eqs.iter() {
        let source = equation
            .drift
            .source()
            .ok_or_else(|| EquationError::MissingSource(equation.variable.clone()))?;
        let expanded = parse(source)?.expand();

        let decomposition = if expanded.depends_on(&equation.variable) {
            collect_linear(&expanded, &equation.variable).ok_or_else(|| {
                EquationError::NotConditionallyLinear {
                    variable: equation.variable.clone(),
                    expression: source.to_string(),
                }
            })?
        } else {
            // The derivative does not involve the variable at all.
            LinearDecomposition {
                coefficient: Expr::Number(0.0),
                constant: expanded,
            }
        };
        system.push((equation.variable.clone(), decomposition));
    }

    Ok(system)
}

/// Collects an expanded expression as a degree-one polynomial in `variable`.
///
/// Every additive term is classified by its degree in the variable; the
/// degree-one coefficients and the degree-zero terms form the two buckets of
/// the decomposition. Returns `None` when any term falls outside them.
fn collect_linear(expr: &Expr, variable: &str) -> Option<LinearDecomposition> {
    let mut linear: Vec<Expr> = Vec::new();
    let mut constant: Vec<Expr> = Vec::new();

    for term in additive_terms(expr) {
        let mut degree: i64 = 0;
        let mut coefficient: Vec<Expr> = Vec::new();

        for factor in multiplicative_factors(&term) {
            match &factor {
                Expr::Symbol(symbol) if symbol.name == variable => degree += 1,
                Expr::Pow(base, exponent) => {
                    if let (Expr::Symbol(symbol), Expr::Number(n)) = (&**base, &**exponent) {
                        if symbol.name == variable {
                            if n.fract() != 0.0 {
                                return None;
                            }
                            degree += *n as i64;
                            continue;
                        }
                    }
                    // A power not headed by the variable must be free of it.
                    if factor.depends_on(variable) {
                        return None;
                    }
                    coefficient.push(factor);
                }
                _ => {
                    if factor.depends_on(variable) {
                        return None;
                    }
                    coefficient.push(factor);
                }
            }
        }

        match degree {
            0 => constant.push(term),
            1 => linear.push(product(coefficient)),
            _ => return None,
        }
    }

    if linear.is_empty() {
        return None;
    }
    Some(LinearDecomposition {
        coefficient: sum(linear).simplify(),
        constant: sum(constant).simplify(),
    })
}

/// Flattens nested additions into a list of terms.
fn additive_terms(expr: &Expr) -> Vec<Expr> {
    let mut terms = Vec::new();
    fn walk(expr: &Expr, terms: &mut Vec<Expr>) {
        match expr {
            Expr::Add(left, right) => {
                walk(left, terms);
                walk(right, terms);
            }
            other => terms.push(other.clone()),
        }
    }
    walk(expr, &mut terms);
    terms
}

/// Flattens nested multiplications into a list of factors.
fn multiplicative_factors(expr: &Expr) -> Vec<Expr> {
    let mut factors = Vec::new();
    fn walk(expr: &Expr, factors: &mut Vec<Expr>) {
        match expr {
            Expr::Mul(left, right) => {
                walk(left, factors);
                walk(right, factors);
            }
            other => factors.push(other.clone()),
        }
    }
    walk(expr, &mut factors);
    factors
}

fn sum(terms: Vec<Expr>) -> Expr {
    let mut iter = terms.into_iter();
    match iter.next() {
        None => Expr::Number(0.0),
        Some(first) => iter.fold(first, Expr::add),
    }
}

fn product(factors: Vec<Expr>) -> Expr {
    let mut iter = factors.into_iter();
    match iter.next() {
        None => Expr::Number(1.0),
        Some(first) => iter.fold(first, Expr::mul),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn eval(expr: &Expr, pairs: &[(&str, f64)]) -> f64 {
        let env: HashMap<String, f64> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        expr.eval(&env).unwrap()
    }

    fn decompose(variable: &str, drift: &str) -> Result<LinearDecomposition, EquationError> {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode(variable, drift));
        let mut system = conditionally_linear_system(&eqs)?;
        Ok(system.remove(0).1)
    }

    #[test]
    fn test_affine_decomposition() {
        let decomposition = decompose("x", "-k * x + c").unwrap();
        assert_eq!(eval(&decomposition.coefficient, &[("k", 3.0)]), -3.0);
        assert_eq!(eval(&decomposition.constant, &[("c", 0.25)]), 0.25);
        assert!(!decomposition.coefficient.depends_on("x"));
        assert!(!decomposition.constant.depends_on("x"));
    }

    #[test]
    fn test_decomposition_through_division() {
        // (-v + w**2) / tau -> A = -1/tau, B = w**2/tau
        let decomposition = decompose("v", "(-v + w**2) / tau").unwrap();
        assert_eq!(eval(&decomposition.coefficient, &[("tau", 2.0)]), -0.5);
        assert_eq!(
            eval(&decomposition.constant, &[("w", 3.0), ("tau", 2.0)]),
            4.5
        );
    }

    #[test]
    fn test_homogeneous_decomposition() {
        let decomposition = decompose("w", "-w / tau").unwrap();
        assert_eq!(eval(&decomposition.coefficient, &[("tau", 4.0)]), -0.25);
        assert!(decomposition.constant.is_zero());
    }

    #[test]
    fn test_variable_free_derivative() {
        let decomposition = decompose("x", "c * sin(t)").unwrap();
        assert!(decomposition.coefficient.is_zero());
        assert_eq!(
            eval(
                &decomposition.constant,
                &[("c", 2.0), ("t", std::f64::consts::FRAC_PI_2)]
            ),
            2.0
        );
    }

    #[test]
    fn test_gating_equation() {
        // alpha * (1 - m) - beta * m -> A = -(alpha + beta), B = alpha
        let decomposition = decompose("m", "alpha * (1 - m) - beta * m").unwrap();
        assert_eq!(
            eval(&decomposition.coefficient, &[("alpha", 2.0), ("beta", 3.0)]),
            -5.0
        );
        assert_eq!(eval(&decomposition.constant, &[("alpha", 2.0)]), 2.0);
    }

    #[test]
    fn test_quadratic_rejected() {
        let result = decompose("x", "x*x");
        assert!(matches!(
            result,
            Err(EquationError::NotConditionallyLinear { variable, expression })
                if variable == "x" && expression == "x*x"
        ));
        assert!(decompose("x", "x**2 + 1").is_err());
    }

    #[test]
    fn test_transcendental_dependency_rejected() {
        assert!(matches!(
            decompose("x", "exp(x) + 1"),
            Err(EquationError::NotConditionallyLinear { .. })
        ));
        assert!(decompose("x", "1 / x").is_err());
    }

    #[test]
    fn test_expanded_square_rejected() {
        // (x + 1)**2 expands to a degree-two polynomial
        assert!(decompose("x", "(x + 1)**2").is_err());
    }

    #[test]
    fn test_stochastic_set_rejected() {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::sde("x", "-x", Noise::Constant(0.2)));
        assert!(matches!(
            conditionally_linear_system(&eqs),
            Err(EquationError::Stochastic)
        ));
    }

    #[test]
    fn test_zero_constant_noise_is_deterministic() {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::sde("x", "-x", Noise::Constant(0.0)));
        assert!(!eqs.is_stochastic());
        assert!(conditionally_linear_system(&eqs).is_ok());
    }

    #[test]
    fn test_callable_drift_needs_source() {
        let mut eqs = EquationSet::new();
        let f: RhsFn = std::sync::Arc::new(|y, _, _| -y);
        eqs.push(DiffEquation::ode("x", Rhs::Func(f)));
        assert!(matches!(
            conditionally_linear_system(&eqs),
            Err(EquationError::MissingSource(variable)) if variable == "x"
        ));
    }

    #[test]
    fn test_order_preserved() {
        let mut eqs = EquationSet::new();
        eqs.push(DiffEquation::ode("w", "-w"));
        eqs.push(DiffEquation::ode("v", "-v"));
        eqs.push(DiffEquation::ode("u", "-u"));
        let system = conditionally_linear_system(&eqs).unwrap();
        let order: Vec<&str> = system.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(order, vec!["w", "v", "u"]);
    }
}
