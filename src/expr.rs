//! Expression module for representing arithmetic as symbolic trees.
//!
//! This module defines the core expression types used to represent the
//! right-hand side of a differential equation in a form that supports
//! algebraic manipulation and numeric evaluation. The main types are:
//!
//! - `Expr`: An enum representing different kinds of symbolic expressions
//! - `Symbol`: A named variable together with its domain tag
//!
//! The expression tree is built recursively using `Box<Expr>` for nested
//! expressions and can be:
//! - Serialized back to expression text (see the `render` module)
//! - Algebraically expanded for the linear-coefficient collection step
//! - Simplified using constant folding and identity rules
//! - Evaluated numerically against a set of symbol bindings
//!
//! Supported node kinds form a closed set: numbers, symbolic constants,
//! symbols, addition, multiplication, powers, modulo, comparisons, boolean
//! connectives, function calls and single-target assignments. Anything
//! outside this set fails translation instead of producing a partial tree.
//!
//! # Normal form
//!
//! Addition and multiplication are the only primitive binary arithmetic
//! connectives. The parser rewrites division into multiplication by a
//! reciprocal power, subtraction and unary minus into multiplication by
//! `-1`, and floor division into a `floor` call. The collection step in the
//! `linear` module relies on this normal form.
//!
//! # Immutability
//!
//! Every transform (`expand`, `simplify`, `substitute`) produces a new tree;
//! trees are never mutated in place, so decompositions of independent
//! variables never share mutable state.

use std::collections::HashMap;

use crate::errors::EvalError;
use crate::functions::{Constant, Function};

/// Name of the argument inserted into zero-arity function calls so they stay
/// representable in the tree. Rewritten to an empty symbol before printing.
pub(crate) const PLACEHOLDER_ARG: &str = "_placeholder_arg";

/// Domain tag attached to a symbol.
///
/// The time symbols `t` and `dt` are known to be real and non-negative;
/// every other identifier is a plain real-valued symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Real,
    RealPositive,
}

/// A named variable in an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub domain: Domain,
}

impl Symbol {
    /// Creates a symbol, tagging `t` and `dt` as real and non-negative.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let domain = if name == "t" || name == "dt" {
            Domain::RealPositive
        } else {
            Domain::Real
        };
        Symbol { name, domain }
    }

    pub(crate) fn placeholder() -> Self {
        Symbol {
            name: PLACEHOLDER_ARG.to_string(),
            domain: Domain::Real,
        }
    }
}

/// Relational comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    /// The operator's textual spelling.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }
}

/// The callee of a function call.
///
/// Identifiers found in the function table resolve to their canonical
/// operator; everything else (including dotted attribute paths whose final
/// attribute is unknown) is kept verbatim as a user-defined function name.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Builtin(Function),
    User(String),
}

impl Callee {
    /// The textual name printed for this callee.
    pub fn name(&self) -> &str {
        match self {
            Callee::Builtin(function) => function.name(),
            Callee::User(name) => name,
        }
    }
}

/// An expression tree node.
///
/// The variant set is closed; the serializer and evaluator match on it
/// exhaustively, so an unsupported construct can only be rejected at parse
/// time, never discovered later as an unknown node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A floating point literal
    Number(f64),
    /// A symbolic constant (`pi`, `e`, `inf`)
    Constant(Constant),
    /// A named variable
    Symbol(Symbol),
    /// Addition of two expressions
    Add(Box<Expr>, Box<Expr>),
    /// Multiplication of two expressions
    Mul(Box<Expr>, Box<Expr>),
    /// Exponentiation of an expression by another expression
    Pow(Box<Expr>, Box<Expr>),
    /// Modulo of two expressions
    Mod(Box<Expr>, Box<Expr>),
    /// A single relational comparison
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    /// Logical conjunction
    And(Box<Expr>, Box<Expr>),
    /// Logical disjunction
    Or(Box<Expr>, Box<Expr>),
    /// Logical negation
    Not(Box<Expr>),
    /// A function call
    Call(Callee, Vec<Expr>),
    /// A single-target assignment statement
    Assign(String, Box<Expr>),
}

impl Expr {
    /// Creates a number literal.
    pub fn number(value: f64) -> Expr {
        Expr::Number(value)
    }

    /// Creates a symbol node.
    pub fn symbol(name: impl Into<String>) -> Expr {
        Expr::Symbol(Symbol::new(name))
    }

    /// Creates an addition node.
    pub fn add(left: Expr, right: Expr) -> Expr {
        Expr::Add(Box::new(left), Box::new(right))
    }

    /// Creates a multiplication node.
    pub fn mul(left: Expr, right: Expr) -> Expr {
        Expr::Mul(Box::new(left), Box::new(right))
    }

    /// Creates a power node.
    pub fn pow(base: Expr, exponent: Expr) -> Expr {
        Expr::Pow(Box::new(base), Box::new(exponent))
    }

    /// Negation as multiplication by `-1`, the tree's normal form.
    pub fn neg(expr: Expr) -> Expr {
        Expr::mul(Expr::Number(-1.0), expr)
    }

    /// Reciprocal as a `-1` power, the tree's normal form for division.
    pub fn recip(expr: Expr) -> Expr {
        Expr::pow(expr, Expr::Number(-1.0))
    }

    /// Creates a call to a canonical function.
    pub fn call(function: Function, args: Vec<Expr>) -> Expr {
        Expr::Call(Callee::Builtin(function), args)
    }

    /// Whether this node is the literal zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Number(value) if *value == 0.0)
    }

    /// Whether the symbol `name` occurs anywhere in the tree.
    pub fn depends_on(&self, name: &str) -> bool {
        match self {
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Symbol(symbol) => symbol.name == name,
            Expr::Add(left, right)
            | Expr::Mul(left, right)
            | Expr::Pow(left, right)
            | Expr::Mod(left, right)
            | Expr::Compare(_, left, right)
            | Expr::And(left, right)
            | Expr::Or(left, right) => left.depends_on(name) || right.depends_on(name),
            Expr::Not(inner) => inner.depends_on(name),
            Expr::Call(_, args) => args.iter().any(|arg| arg.depends_on(name)),
            Expr::Assign(_, value) => value.depends_on(name),
        }
    }

    /// Collects the names of all symbols in the tree, sorted.
    ///
    /// The placeholder argument of zero-arity calls and empty symbol names
    /// are excluded; they are serialization artifacts, not variables.
    pub fn symbols(&self) -> Vec<String> {
        let mut names = std::collections::HashSet::new();
        self.collect_symbols(&mut names);
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names
    }

    fn collect_symbols(&self, names: &mut std::collections::HashSet<String>) {
        match self {
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Symbol(symbol) => {
                if !symbol.name.is_empty() && symbol.name != PLACEHOLDER_ARG {
                    names.insert(symbol.name.clone());
                }
            }
            Expr::Add(left, right)
            | Expr::Mul(left, right)
            | Expr::Pow(left, right)
            | Expr::Mod(left, right)
            | Expr::Compare(_, left, right)
            | Expr::And(left, right)
            | Expr::Or(left, right) => {
                left.collect_symbols(names);
                right.collect_symbols(names);
            }
            Expr::Not(inner) => inner.collect_symbols(names),
            Expr::Call(_, args) => {
                for arg in args {
                    arg.collect_symbols(names);
                }
            }
            Expr::Assign(_, value) => value.collect_symbols(names),
        }
    }

    /// Replaces every occurrence of the symbol `name` with `replacement`.
    ///
    /// Returns a new tree; the original is left untouched.
    pub fn substitute(&self, name: &str, replacement: &Expr) -> Expr {
        match self {
            Expr::Number(_) | Expr::Constant(_) => self.clone(),
            Expr::Symbol(symbol) => {
                if symbol.name == name {
                    replacement.clone()
                } else {
                    self.clone()
                }
            }
            Expr::Add(left, right) => Expr::add(
                left.substitute(name, replacement),
                right.substitute(name, replacement),
            ),
            Expr::Mul(left, right) => Expr::mul(
                left.substitute(name, replacement),
                right.substitute(name, replacement),
            ),
            Expr::Pow(base, exponent) => Expr::pow(
                base.substitute(name, replacement),
                exponent.substitute(name, replacement),
            ),
            Expr::Mod(left, right) => Expr::Mod(
                Box::new(left.substitute(name, replacement)),
                Box::new(right.substitute(name, replacement)),
            ),
            Expr::Compare(op, left, right) => Expr::Compare(
                *op,
                Box::new(left.substitute(name, replacement)),
                Box::new(right.substitute(name, replacement)),
            ),
            Expr::And(left, right) => Expr::And(
                Box::new(left.substitute(name, replacement)),
                Box::new(right.substitute(name, replacement)),
            ),
            Expr::Or(left, right) => Expr::Or(
                Box::new(left.substitute(name, replacement)),
                Box::new(right.substitute(name, replacement)),
            ),
            Expr::Not(inner) => Expr::Not(Box::new(inner.substitute(name, replacement))),
            Expr::Call(callee, args) => Expr::Call(
                callee.clone(),
                args.iter()
                    .map(|arg| arg.substitute(name, replacement))
                    .collect(),
            ),
            Expr::Assign(target, value) => Expr::Assign(
                target.clone(),
                Box::new(value.substitute(name, replacement)),
            ),
        }
    }

    /// Distributes multiplication over addition throughout the tree.
    ///
    /// Products of sums are multiplied out and non-negative integer powers
    /// of sums are expanded into repeated products. The result is a sum of
    /// terms in which no factor is itself an addition, which is the form the
    /// linear-coefficient collection expects. Negative and symbolic
    /// exponents are left in place; they are non-polynomial dependencies and
    /// the collection step rejects them if they involve the state variable.
    pub fn expand(&self) -> Expr {
        match self {
            Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) => self.clone(),
            Expr::Add(left, right) => Expr::add(left.expand(), right.expand()),
            Expr::Mul(left, right) => distribute(left.expand(), right.expand()),
            Expr::Pow(base, exponent) => {
                let base = base.expand();
                let exponent = exponent.expand();
                if let Expr::Number(n) = exponent {
                    let integral = n.fract() == 0.0 && (2.0..=16.0).contains(&n);
                    if integral && matches!(base, Expr::Add(_, _)) {
                        let mut product = base.clone();
                        for _ in 1..(n as i64) {
                            product = distribute(product, base.clone());
                        }
                        return product;
                    }
                }
                Expr::pow(base, exponent)
            }
            Expr::Mod(left, right) => {
                Expr::Mod(Box::new(left.expand()), Box::new(right.expand()))
            }
            Expr::Compare(op, left, right) => Expr::Compare(
                *op,
                Box::new(left.expand()),
                Box::new(right.expand()),
            ),
            Expr::And(left, right) => {
                Expr::And(Box::new(left.expand()), Box::new(right.expand()))
            }
            Expr::Or(left, right) => {
                Expr::Or(Box::new(left.expand()), Box::new(right.expand()))
            }
            Expr::Not(inner) => Expr::Not(Box::new(inner.expand())),
            Expr::Call(callee, args) => Expr::Call(
                callee.clone(),
                args.iter().map(|arg| arg.expand()).collect(),
            ),
            Expr::Assign(target, value) => {
                Expr::Assign(target.clone(), Box::new(value.expand()))
            }
        }
    }

    /// Simplifies the expression by folding constants and applying basic
    /// algebraic identities.
    ///
    /// # Constant Folding
    /// - Evaluates constant expressions: 2 + 3 → 5
    /// - Simplifies operations with special constants: x * 0 → 0
    ///
    /// # Identity Rules
    /// - Additive identity: x + 0 → x
    /// - Multiplicative identity: x * 1 → x
    /// - Zero exponent: x^0 → 1
    /// - First power: x^1 → x
    ///
    /// This is deliberately not a general simplifier; it normalizes the
    /// coefficient sums produced by the collection step so that a vanishing
    /// coefficient is recognizable as the literal zero.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) => self.clone(),

            Expr::Add(left, right) => {
                let l = left.simplify();
                let r = right.simplify();
                match (&l, &r) {
                    // Fold constants: 1 + 2 -> 3
                    (Expr::Number(a), Expr::Number(b)) => Expr::Number(a + b),
                    // Identity: x + 0 -> x
                    (expr, Expr::Number(zero)) | (Expr::Number(zero), expr) if *zero == 0.0 => {
                        expr.clone()
                    }
                    _ => Expr::add(l, r),
                }
            }

            Expr::Mul(left, right) => {
                let l = left.simplify();
                let r = right.simplify();
                match (&l, &r) {
                    // Fold constants: 2 * 3 -> 6
                    (Expr::Number(a), Expr::Number(b)) => Expr::Number(a * b),
                    // Zero property: x * 0 -> 0
                    (Expr::Number(zero), _) | (_, Expr::Number(zero)) if *zero == 0.0 => {
                        Expr::Number(0.0)
                    }
                    // Identity: x * 1 -> x
                    (expr, Expr::Number(one)) | (Expr::Number(one), expr) if *one == 1.0 => {
                        expr.clone()
                    }
                    _ => Expr::mul(l, r),
                }
            }

            Expr::Pow(base, exponent) => {
                let b = base.simplify();
                let e = exponent.simplify();
                match (&b, &e) {
                    // Fold constants when the result is representable
                    (Expr::Number(a), Expr::Number(n)) if a.powf(*n).is_finite() => {
                        Expr::Number(a.powf(*n))
                    }
                    // x^0 -> 1
                    (_, Expr::Number(zero)) if *zero == 0.0 => Expr::Number(1.0),
                    // x^1 -> x
                    (expr, Expr::Number(one)) if *one == 1.0 => expr.clone(),
                    _ => Expr::pow(b, e),
                }
            }

            Expr::Mod(left, right) => {
                let l = left.simplify();
                let r = right.simplify();
                match (&l, &r) {
                    (Expr::Number(a), Expr::Number(b)) if *b != 0.0 => {
                        Expr::Number(python_mod(*a, *b))
                    }
                    _ => Expr::Mod(Box::new(l), Box::new(r)),
                }
            }

            Expr::Compare(op, left, right) => Expr::Compare(
                *op,
                Box::new(left.simplify()),
                Box::new(right.simplify()),
            ),
            Expr::And(left, right) => {
                Expr::And(Box::new(left.simplify()), Box::new(right.simplify()))
            }
            Expr::Or(left, right) => {
                Expr::Or(Box::new(left.simplify()), Box::new(right.simplify()))
            }
            Expr::Not(inner) => Expr::Not(Box::new(inner.simplify())),
            Expr::Call(callee, args) => Expr::Call(
                callee.clone(),
                args.iter().map(|arg| arg.simplify()).collect(),
            ),
            Expr::Assign(target, value) => {
                Expr::Assign(target.clone(), Box::new(value.simplify()))
            }
        }
    }

    /// Evaluates the tree against a set of symbol bindings.
    ///
    /// Comparisons and boolean connectives evaluate to `1.0`/`0.0` over
    /// numeric truthiness; modulo follows the sign convention of the
    /// textual language. Assignments are statements, not values, and fail.
    pub fn eval(&self, bindings: &HashMap<String, f64>) -> Result<f64, EvalError> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Constant(constant) => Ok(constant.value()),
            Expr::Symbol(symbol) => bindings
                .get(&symbol.name)
                .copied()
                .ok_or_else(|| EvalError::UnboundSymbol(symbol.name.clone())),
            Expr::Add(left, right) => Ok(left.eval(bindings)? + right.eval(bindings)?),
            Expr::Mul(left, right) => Ok(left.eval(bindings)? * right.eval(bindings)?),
            Expr::Pow(base, exponent) => Ok(base.eval(bindings)?.powf(exponent.eval(bindings)?)),
            Expr::Mod(left, right) => Ok(python_mod(left.eval(bindings)?, right.eval(bindings)?)),
            Expr::Compare(op, left, right) => {
                let l = left.eval(bindings)?;
                let r = right.eval(bindings)?;
                let truth = match op {
                    CompareOp::Lt => l < r,
                    CompareOp::Le => l <= r,
                    CompareOp::Gt => l > r,
                    CompareOp::Ge => l >= r,
                    CompareOp::Eq => l == r,
                    CompareOp::Ne => l != r,
                };
                Ok(truth as u8 as f64)
            }
            Expr::And(left, right) => {
                let truth = left.eval(bindings)? != 0.0 && right.eval(bindings)? != 0.0;
                Ok(truth as u8 as f64)
            }
            Expr::Or(left, right) => {
                let truth = left.eval(bindings)? != 0.0 || right.eval(bindings)? != 0.0;
                Ok(truth as u8 as f64)
            }
            Expr::Not(inner) => Ok((inner.eval(bindings)? == 0.0) as u8 as f64),
            Expr::Call(callee, args) => {
                let function = match callee {
                    Callee::Builtin(function) => function,
                    Callee::User(name) => return Err(EvalError::UnknownFunction(name.clone())),
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.eval(bindings)?);
                }
                function.eval(&values)
            }
            Expr::Assign(_, _) => Err(EvalError::Assignment),
        }
    }

    /// Checks that the tree can be evaluated once its symbols are bound.
    ///
    /// Rejects user-defined function calls (no numeric implementation) and
    /// assignment statements. Used to fail early when compiling a
    /// right-hand side into a callable.
    pub(crate) fn check_evaluable(&self) -> Result<(), EvalError> {
        match self {
            Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) => Ok(()),
            Expr::Add(left, right)
            | Expr::Mul(left, right)
            | Expr::Pow(left, right)
            | Expr::Mod(left, right)
            | Expr::Compare(_, left, right)
            | Expr::And(left, right)
            | Expr::Or(left, right) => {
                left.check_evaluable()?;
                right.check_evaluable()
            }
            Expr::Not(inner) => inner.check_evaluable(),
            Expr::Call(Callee::User(name), _) => Err(EvalError::UnknownFunction(name.clone())),
            Expr::Call(Callee::Builtin(_), args) => {
                for arg in args {
                    arg.check_evaluable()?;
                }
                Ok(())
            }
            Expr::Assign(_, _) => Err(EvalError::Assignment),
        }
    }
}

/// Multiplies two expanded expressions, distributing over any additions.
fn distribute(left: Expr, right: Expr) -> Expr {
    match (left, right) {
        (Expr::Add(a, b), right) => {
            Expr::add(distribute(*a, right.clone()), distribute(*b, right))
        }
        (left, Expr::Add(a, b)) => Expr::add(distribute(left.clone(), *a), distribute(left, *b)),
        (left, right) => Expr::mul(left, right),
    }
}

/// Modulo with the textual language's sign convention: the result takes the
/// sign of the divisor.
pub(crate) fn python_mod(a: f64, b: f64) -> f64 {
    a - b * (a / b).floor()
}
