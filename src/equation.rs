//! Compiled textual right-hand sides.
//!
//! This module provides the `Equation` type which represents a mathematical
//! expression that can be evaluated against an array of input values. The
//! expression text is parsed into a symbolic tree on creation and validated
//! so that later evaluation cannot fail on unknown functions or statements.
//!
//! # Example
//!
//! ```
//! use odegen::Equation;
//!
//! let eq = Equation::new("2*x + y**2".to_string()).unwrap();
//! let result = eq.eval(&[1.0, 2.0]).unwrap(); // Evaluates to 6.0
//! assert_eq!(result, 6.0);
//! ```
//!
//! # Variable Handling
//!
//! Variables can be specified either:
//! - Automatically extracted and sorted alphabetically using `new()`
//! - Explicitly mapped to indices using `from_var_map()`
//!
//! Input arrays must match the variable ordering. An `Equation` can also be
//! turned into a step-ready callable with `rhs_fn`, which binds one symbol
//! to the state variable, `t` to the time argument and the remaining
//! symbols, alphabetically, to the parameter slice.

use std::collections::HashMap;

use colored::Colorize;
use itertools::Itertools;

use crate::errors::EquationError;
use crate::expr::Expr;
use crate::parse::parse;
use crate::types::RhsFn;

/// Represents a mathematical expression that can be evaluated.
///
/// This struct holds the original expression string, its symbolic tree and
/// the mapping from variable names to input-array indices. The tree is
/// validated on creation: every symbol must be covered by the variable map
/// and every function call must resolve to a canonical operator, so that
/// evaluation only fails on malformed input lengths.
#[derive(Clone)]
pub struct Equation {
    expression_str: String,
    ast: Expr,
    var_map: HashMap<String, u32>,
    sorted_variables: Vec<String>,
}

impl std::fmt::Debug for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{{\n")?;
        writeln!(f, "    {}: {}\n", "Equation".cyan(), self.expression_str)?;
        writeln!(f, "    {}: {:?}\n", "Variables".cyan(), self.var_map)?;
        writeln!(
            f,
            "    {}: {:?}\n",
            "Sorted Variables".cyan(),
            self.sorted_variables
        )?;
        writeln!(f, "}}")?;
        Ok(())
    }
}

impl Equation {
    /// Creates a new `Equation` from a string representation.
    ///
    /// The variable names are extracted from the expression automatically
    /// and sorted alphabetically; input arrays are expected in that order.
    /// For explicit control over the ordering, use `from_var_map()`.
    ///
    /// # Example
    /// ```
    /// # use odegen::Equation;
    /// let eq = Equation::new("2*x + y**2".to_string()).unwrap();
    /// let result = eq.eval(&[1.0, 2.0]).unwrap(); // x=1, y=2 -> 2*1 + 2^2 = 6
    /// assert_eq!(result, 6.0);
    /// ```
    pub fn new(expression_str: String) -> Result<Self, EquationError> {
        let ast = parse(&expression_str)?;
        let var_map: HashMap<String, u32> = ast
            .symbols()
            .into_iter()
            .enumerate()
            .map(|(i, v)| (v, i as u32))
            .collect();
        Self::build(ast, var_map, expression_str)
    }

    /// Creates a new `Equation` from a map of variable names to indices.
    ///
    /// This allows explicit control over variable ordering by specifying the
    /// mapping between variable names and their positions in input arrays.
    /// The map may contain variables that do not occur in the expression.
    ///
    /// # Example
    /// ```
    /// # use odegen::Equation;
    /// # use std::collections::HashMap;
    /// let mut vars = HashMap::new();
    /// vars.insert("y".to_string(), 0); // y will be first in input arrays
    /// vars.insert("x".to_string(), 1); // x will be second
    ///
    /// let eq = Equation::from_var_map("2*x + y**2".to_string(), &vars).unwrap();
    /// let result = eq.eval(&[2.0, 1.0]).unwrap(); // y=2, x=1 -> 2*1 + 2^2 = 6
    /// assert_eq!(result, 6.0);
    /// ```
    pub fn from_var_map(
        expression_str: String,
        variables: &HashMap<String, u32>,
    ) -> Result<Self, EquationError> {
        let ast = parse(&expression_str)?;
        Self::build(ast, variables.clone(), expression_str)
    }

    /// Core builder used by both constructors.
    ///
    /// Validates that every symbol in the tree has an index in the variable
    /// map and that the tree is evaluable (no user-defined functions, no
    /// assignment statements).
    fn build(
        ast: Expr,
        var_map: HashMap<String, u32>,
        expression_str: String,
    ) -> Result<Self, EquationError> {
        let mut missing = Vec::new();
        for symbol in ast.symbols() {
            if !var_map.contains_key(&symbol) {
                missing.push(symbol);
            }
        }
        if !missing.is_empty() {
            return Err(EquationError::VariableNotFound(missing.join(", ")));
        }

        ast.check_evaluable()?;

        let sorted_variables: Vec<String> = var_map
            .iter()
            .sorted_by_key(|(_, &idx)| idx)
            .map(|(var, _)| var.clone())
            .collect();

        Ok(Self {
            expression_str,
            ast,
            var_map,
            sorted_variables,
        })
    }

    /// Evaluates the expression for the given input values.
    ///
    /// # Arguments
    /// * `values` - Array of f64 values corresponding to variables in order
    ///
    /// # Errors
    /// Returns `EquationError::VariableNotFound` if the length of values
    /// doesn't match the number of variables.
    pub fn eval(&self, values: &[f64]) -> Result<f64, EquationError> {
        self.validate_input_length(values)?;
        let bindings: HashMap<String, f64> = self
            .sorted_variables
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect();
        Ok(self.ast.eval(&bindings)?)
    }

    /// Builds a step-ready callable `(state, t, params) -> f64`.
    ///
    /// The symbol `variable` is bound to the state argument and `t` to the
    /// time argument; every other symbol of the expression is bound, in
    /// alphabetical order, to the parameter slice. The slice passed at call
    /// time must have exactly the length of `param_names(variable)`.
    ///
    /// # Example
    /// ```
    /// # use odegen::Equation;
    /// let eq = Equation::new("-k * x".to_string()).unwrap();
    /// let f = eq.rhs_fn("x").unwrap();
    /// assert_eq!(f(2.0, 0.0, &[0.5]), -1.0); // k = 0.5
    /// ```
    pub fn rhs_fn(&self, variable: &str) -> Result<RhsFn, EquationError> {
        let params = self.param_names(variable);
        self.rhs_fn_with_params(variable, &params)
    }

    /// Like `rhs_fn`, but with an explicitly supplied parameter layout.
    ///
    /// Used when several expressions (a drift and a textual diffusion, for
    /// example) must read one shared parameter slice: `params` is the union
    /// layout and may contain names this expression does not use. Every
    /// symbol of the expression must be the state variable, `t`, or listed
    /// in `params`.
    pub fn rhs_fn_with_params(
        &self,
        variable: &str,
        params: &[String],
    ) -> Result<RhsFn, EquationError> {
        for name in self.ast.symbols() {
            if name != variable && name != "t" && !params.contains(&name) {
                return Err(EquationError::VariableNotFound(name));
            }
        }
        let params = params.to_vec();
        let ast = self.ast.clone();
        let variable = variable.to_string();
        Ok(std::sync::Arc::new(move |y, t, args| {
            let mut bindings = HashMap::with_capacity(params.len() + 2);
            bindings.insert(variable.clone(), y);
            bindings.insert("t".to_string(), t);
            for (name, value) in params.iter().zip(args.iter()) {
                bindings.insert(name.clone(), *value);
            }
            ast.eval(&bindings)
                .expect("expression was validated when the equation was compiled")
        }))
    }

    /// The parameter names a `rhs_fn` for `variable` expects, in order.
    pub fn param_names(&self, variable: &str) -> Vec<String> {
        self.ast
            .symbols()
            .into_iter()
            .filter(|name| name != variable && name != "t")
            .collect()
    }

    /// Returns the symbolic tree of the expression.
    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Returns the map of variable names to their indices.
    pub fn variables(&self) -> &HashMap<String, u32> {
        &self.var_map
    }

    /// Returns the original expression string.
    pub fn expression_str(&self) -> &str {
        &self.expression_str
    }

    /// Returns the variables sorted by their input-array index.
    pub fn sorted_variables(&self) -> &[String] {
        &self.sorted_variables
    }

    /// Validates that the input array length matches the number of variables.
    fn validate_input_length(&self, values: &[f64]) -> Result<(), EquationError> {
        if values.len() != self.sorted_variables.len() {
            return Err(EquationError::VariableNotFound(format!(
                "expected {} input values, got {}",
                self.sorted_variables.len(),
                values.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equation() {
        let eq = Equation::new("2*x + y**2".to_string()).unwrap();
        let result = eq.eval(&[1.0, 2.0]).unwrap();
        assert_eq!(result, 6.0);
    }

    #[test]
    fn test_from_var_map() {
        let eq = Equation::from_var_map(
            "2*x + y**2".to_string(),
            &HashMap::from([("x".to_string(), 1), ("y".to_string(), 0)]),
        )
        .unwrap();
        let result = eq.eval(&[2.0, 1.0]).unwrap();
        assert_eq!(result, 6.0);
    }

    #[test]
    fn test_from_var_map_missing_variable() {
        let result = Equation::from_var_map(
            "2*x + y**2".to_string(),
            &HashMap::from([("x".to_string(), 0)]),
        );
        assert!(matches!(result, Err(EquationError::VariableNotFound(_))));
    }

    #[test]
    fn test_unknown_function_rejected_at_build() {
        let result = Equation::new("mylib.rates(x)".to_string());
        assert!(matches!(result, Err(EquationError::Eval(_))));
    }

    #[test]
    fn test_eval_invalid_length() {
        let eq = Equation::new("2*x + y**2".to_string()).unwrap();
        assert!(eq.eval(&[1.0]).is_err());
    }

    #[test]
    fn test_rhs_fn() {
        let eq = Equation::new("-x + sin(t)".to_string()).unwrap();
        let f = eq.rhs_fn("x").unwrap();
        let value = f(1.0, 0.0, &[]);
        assert_eq!(value, -1.0);
        let value = f(0.0, std::f64::consts::FRAC_PI_2, &[]);
        assert!((value - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_rhs_fn_params_alphabetical() {
        let eq = Equation::new("a * x + b".to_string()).unwrap();
        assert_eq!(eq.param_names("x"), vec!["a".to_string(), "b".to_string()]);
        let f = eq.rhs_fn("x").unwrap();
        assert_eq!(f(2.0, 0.0, &[3.0, 1.0]), 7.0);
    }
}
