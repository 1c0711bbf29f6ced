//! Serialization of symbolic trees back to expression text.
//!
//! This is the emit direction of the expression renderer. Printing applies
//! minimal parenthesization: numbers, bare symbols, constants and function
//! calls print without parentheses, every other sub-expression is wrapped.
//! This intentionally produces redundant-but-correct parentheses instead of
//! a precedence-optimal printer, so `3 + 4 * 5` may come back as
//! `3 + (4 * 5)` but never as `(3) + ((4) * (5))`.
//!
//! Canonical operators print their textual alias (`ceil`, not the ceiling
//! operator's internal name) and symbolic constants print as `pi`/`e`/`inf`.
//! Boolean connectives print as `(a) and (b)` / `(a) or (b)`, negation as
//! `not (a)`, comparisons print their operator verbatim and modulo prints as
//! `((a)%(b))`. Before printing, the placeholder argument of zero-arity
//! calls is rewritten to an empty symbol so `f()` round-trips as `f()`.
//!
//! The node set is closed and the printer matches it exhaustively, so there
//! is no "unknown syntax" failure at this stage; unsupported constructs were
//! already rejected at parse time.

use itertools::Itertools;

use crate::expr::{Expr, Symbol, PLACEHOLDER_ARG};

/// Serializes a symbolic tree to expression text.
///
/// # Example
/// ```
/// use odegen::parse::parse;
/// use odegen::render::render;
///
/// let tree = parse("ceil(x) / tau").unwrap();
/// assert_eq!(render(&tree), "ceil(x) * (tau ** (-1))");
/// ```
pub fn render(expr: &Expr) -> String {
    let empty = Expr::Symbol(Symbol {
        name: String::new(),
        domain: crate::expr::Domain::Real,
    });
    let cleaned = expr.substitute(PLACEHOLDER_ARG, &empty);
    render_node(&cleaned)
}

fn render_node(expr: &Expr) -> String {
    match expr {
        Expr::Number(value) => value.to_string(),
        Expr::Constant(constant) => constant.name().to_string(),
        Expr::Symbol(symbol) => symbol.name.clone(),
        Expr::Add(left, right) => format!("{} + {}", element(left), element(right)),
        Expr::Mul(left, right) => format!("{} * {}", element(left), element(right)),
        Expr::Pow(base, exponent) => format!("{} ** {}", element(base), element(exponent)),
        Expr::Mod(left, right) => {
            format!("(({})%({}))", render_node(left), render_node(right))
        }
        Expr::Compare(op, left, right) => {
            format!("{} {} {}", element(left), op.symbol(), element(right))
        }
        Expr::And(left, right) => {
            format!("({}) and ({})", render_node(left), render_node(right))
        }
        Expr::Or(left, right) => {
            format!("({}) or ({})", render_node(left), render_node(right))
        }
        Expr::Not(inner) => format!("not ({})", render_node(inner)),
        Expr::Call(callee, args) => format!(
            "{}({})",
            callee.name(),
            args.iter().map(render_node).join(", ")
        ),
        Expr::Assign(target, value) => format!("{} = {}", target, render_node(value)),
    }
}

/// Prints a sub-expression, parenthesizing unless it is a terminal or a call.
fn element(expr: &Expr) -> String {
    match expr {
        Expr::Number(value) if *value >= 0.0 => render_node(expr),
        Expr::Symbol(_) | Expr::Constant(_) | Expr::Call(_, _) => render_node(expr),
        _ => format!("({})", render_node(expr)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use std::collections::HashMap;

    /// Rendered text must evaluate to the same value as the original text,
    /// even when the printed form differs syntactically.
    fn assert_round_trip(text: &str, pairs: &[(&str, f64)]) {
        let env: HashMap<String, f64> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        let tree = parse(text).unwrap();
        let rendered = render(&tree);
        let reparsed = parse(&rendered)
            .unwrap_or_else(|e| panic!("rendered text {rendered:?} failed to parse: {e}"));
        let original = tree.eval(&env).unwrap();
        let round_tripped = reparsed.eval(&env).unwrap();
        assert!(
            (original - round_tripped).abs() < 1e-12,
            "{text:?} -> {rendered:?}: {original} != {round_tripped}"
        );
    }

    #[test]
    fn test_round_trip_arithmetic() {
        assert_round_trip("3 + 4 * 5", &[]);
        assert_round_trip("a / b - c", &[("a", 7.0), ("b", 2.0), ("c", 0.5)]);
        assert_round_trip("-x ** 2 + x / 3", &[("x", 1.7)]);
        assert_round_trip("7 // 2 + 7 % 3", &[]);
        assert_round_trip(
            "0.1 * (V + 40) / (1 - exp(-(V + 40) / 10))",
            &[("V", -30.0)],
        );
    }

    #[test]
    fn test_round_trip_functions_and_constants() {
        assert_round_trip("exp(x) + log(y)", &[("x", 0.3), ("y", 2.0)]);
        assert_round_trip("ceil(x) + floor(x)", &[("x", 2.4)]);
        assert_round_trip("sin(pi * x) + e", &[("x", 0.25)]);
        assert_round_trip("hypot(a, b) + arctan2(a, b)", &[("a", 3.0), ("b", 4.0)]);
    }

    #[test]
    fn test_round_trip_booleans() {
        assert_round_trip("x < 1 and y > 2", &[("x", 0.0), ("y", 3.0)]);
        assert_round_trip("not x == y or x <= y", &[("x", 1.0), ("y", 1.0)]);
    }

    #[test]
    fn test_ceiling_renders_as_alias() {
        let tree = parse("ceil(x)").unwrap();
        assert_eq!(render(&tree), "ceil(x)");
    }

    #[test]
    fn test_constant_renders_as_alias() {
        let tree = parse("2 * pi").unwrap();
        assert_eq!(render(&tree), "2 * pi");
    }

    #[test]
    fn test_boolean_rendering() {
        let tree = parse("a and b").unwrap();
        assert_eq!(render(&tree), "(a) and (b)");
        let tree = parse("not a").unwrap();
        assert_eq!(render(&tree), "not (a)");
    }

    #[test]
    fn test_modulo_rendering() {
        let tree = parse("a % b").unwrap();
        assert_eq!(render(&tree), "((a)%(b))");
    }

    #[test]
    fn test_zero_arity_call_prints_empty() {
        let tree = parse("noise()").unwrap();
        assert_eq!(render(&tree), "noise()");
    }

    #[test]
    fn test_assignment_rendering() {
        let tree = parse("x = y + 1").unwrap();
        assert_eq!(render(&tree), "x = y + 1");
        let tree = parse("x += 1").unwrap();
        assert_eq!(render(&tree), "x = x + 1");
    }

    #[test]
    fn test_terminal_sub_expressions_stay_bare() {
        let tree = parse("3 + 4 * 5").unwrap();
        assert_eq!(render(&tree), "3 + (4 * 5)");
    }
}
