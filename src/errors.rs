//! Error types for the odegen crate.
//!
//! This module defines the various error types that can occur during expression
//! parsing, numeric evaluation, linear-system extraction and integrator
//! construction. The main error types are:
//!
//! - `SyntaxError`: Errors while tokenizing or parsing expression text
//! - `EvalError`: Errors while numerically evaluating a symbolic tree
//! - `EquationError`: High-level errors when compiling equation sets
//! - `IntegratorError`: Errors when dispatching an integration scheme
//!
//! Each error type implements the standard Error trait and provides detailed
//! error messages. Lower-level errors convert into the higher-level ones via
//! `From`, so `?` can be used across the compilation pipeline.

use thiserror::Error;

/// Errors that can occur while translating expression text into a symbolic tree.
///
/// Unsupported constructs are rejected here rather than producing a partial
/// tree; the offending construct is always named in the message.
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// Error when a bitwise operator is used where the textual language
    /// expects its arithmetic or logical spelling
    #[error("The operator \"{operator}\" is not supported, use \"{replacement}\" instead.")]
    UnsupportedOperator {
        operator: &'static str,
        replacement: &'static str,
    },
    /// Error when a function call carries keyword arguments
    #[error("Keyword arguments are not supported: \"{0}\"")]
    KeywordArguments(String),
    /// Error when a function call carries a variable-length argument list
    #[error("Variable number of arguments is not supported")]
    VariadicArguments,
    /// Error when a comparison chains more than two operands
    #[error("Can only handle single comparisons like a<b, not a<b<c")]
    ChainedComparison,
    /// Error when an assignment has more than one target
    #[error("Only support syntax like a=b, not a=b=c")]
    MultipleAssignment,
    /// Error when the input uses a construct outside the supported grammar
    #[error("Unknown syntax: {construct} in \"{text}\"")]
    UnknownSyntax { construct: String, text: String },
    /// Error when a number literal cannot be read
    #[error("Invalid number literal: \"{0}\"")]
    InvalidNumber(String),
    /// Error when a character has no meaning in the expression language
    #[error("Unexpected character: {0:?}")]
    UnexpectedCharacter(char),
    /// Error when a token appears in a position where it cannot be parsed
    #[error("Unexpected token: expected {expected}, got \"{got}\"")]
    UnexpectedToken { expected: String, got: String },
    /// Error when the input ends in the middle of an expression
    #[error("Unexpected end of input")]
    UnexpectedEnd,
}

/// Errors that can occur when evaluating a symbolic tree numerically.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Error when a symbol has no value bound to it
    #[error("Symbol not bound to a value: {0}")]
    UnboundSymbol(String),
    /// Error when a user-defined function has no numeric implementation
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
    /// Error when a canonical function receives the wrong number of arguments
    #[error("Function {function} expects {expected} argument(s), got {got}")]
    WrongArity {
        function: &'static str,
        expected: usize,
        got: usize,
    },
    /// Error when an assignment statement is evaluated as a value
    #[error("An assignment statement has no value")]
    Assignment,
}

/// High-level errors that can occur when compiling differential equations.
///
/// This enum represents the various ways that equation parsing, linear-system
/// extraction and update generation can fail. It wraps the lower-level syntax
/// and evaluation errors.
#[derive(Error, Debug)]
pub enum EquationError {
    /// Error when the exponential state updater is applied to a stochastic system
    #[error("Cannot solve stochastic equations with this state updater.")]
    Stochastic,
    /// Error when a derivative is not an affine function of its own variable
    #[error("The expression \"{expression}\", defining the variable {variable}, could not be separated into linear components")]
    NotConditionallyLinear {
        variable: String,
        expression: String,
    },
    /// Error when symbolic work is requested but only a callable was supplied
    #[error("No expression source available for variable {0}")]
    MissingSource(String),
    /// Error when a variable is not found in the provided variable map
    #[error("Variable not found in equation: {0}")]
    VariableNotFound(String),
    /// Error when parsing the expression text
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// Error when the expression cannot be evaluated numerically
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Errors that can occur when building a one-step integrator.
#[derive(Error, Debug)]
pub enum IntegratorError {
    /// Error when the scheme name is not in the registry
    #[error("Unknown integration method: {0}")]
    UnknownScheme(String),
    /// Error when a stochastic scheme is requested without a diffusion term
    #[error("The \"{0}\" scheme requires a diffusion term")]
    MissingDiffusion(&'static str),
    /// Error when the exponential scheme is requested on a stochastic equation
    #[error("The exponential scheme is only defined for deterministic equations")]
    StochasticExponential,
    /// Error when compiling the drift or diffusion expression
    #[error(transparent)]
    Equation(#[from] EquationError),
}
