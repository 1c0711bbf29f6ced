//! Canonical function and constant tables of the expression language.
//!
//! The textual language exposes a fixed set of mathematical functions (`exp`,
//! `log`, `ceil`, ...) and constants (`pi`, `e`, `inf`). Both are modeled as
//! closed enums with a lookup in each direction:
//!
//! - `from_name` resolves a textual identifier to its canonical operator at
//!   parse time; unknown names simply fail the lookup and are kept as
//!   user-defined function names.
//! - `name` returns the textual alias that the serializer prints, so a
//!   canonical operator always round-trips to the identifier the language
//!   documents (e.g. the ceiling operator prints as `ceil`).
//!
//! Each operator also carries its numeric implementation, used by the
//! tree-walking evaluator and by compiled right-hand sides.

use crate::errors::EvalError;

/// A canonical mathematical function of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Real,
    Imag,
    Conjugate,
    Sign,
    Abs,
    Cos,
    Sin,
    Tan,
    Sinc,
    Arcsin,
    Arccos,
    Arctan,
    Arctan2,
    Cosh,
    Sinh,
    Tanh,
    Arcsinh,
    Arccosh,
    Arctanh,
    Ceiling,
    Floor,
    Log,
    Log2,
    Log1p,
    Log10,
    Exp,
    Expm1,
    Exp2,
    Hypot,
    Sqrt,
    Min,
    Max,
    Cbrt,
    Int,
}

impl Function {
    /// Resolves a textual identifier against the function table.
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "real" => Function::Real,
            "imag" => Function::Imag,
            "conjugate" => Function::Conjugate,
            "sign" => Function::Sign,
            "abs" => Function::Abs,
            "cos" => Function::Cos,
            "sin" => Function::Sin,
            "tan" => Function::Tan,
            "sinc" => Function::Sinc,
            "arcsin" => Function::Arcsin,
            "arccos" => Function::Arccos,
            "arctan" => Function::Arctan,
            "arctan2" => Function::Arctan2,
            "cosh" => Function::Cosh,
            "sinh" => Function::Sinh,
            "tanh" => Function::Tanh,
            "arcsinh" => Function::Arcsinh,
            "arccosh" => Function::Arccosh,
            "arctanh" => Function::Arctanh,
            "ceil" => Function::Ceiling,
            "floor" => Function::Floor,
            "log" => Function::Log,
            "log2" => Function::Log2,
            "log1p" => Function::Log1p,
            "log10" => Function::Log10,
            "exp" => Function::Exp,
            "expm1" => Function::Expm1,
            "exp2" => Function::Exp2,
            "hypot" => Function::Hypot,
            "sqrt" => Function::Sqrt,
            "min" => Function::Min,
            "max" => Function::Max,
            "cbrt" => Function::Cbrt,
            "int" => Function::Int,
            _ => return None,
        };
        Some(function)
    }

    /// Returns the textual alias used when serializing the operator.
    pub fn name(&self) -> &'static str {
        match self {
            Function::Real => "real",
            Function::Imag => "imag",
            Function::Conjugate => "conjugate",
            Function::Sign => "sign",
            Function::Abs => "abs",
            Function::Cos => "cos",
            Function::Sin => "sin",
            Function::Tan => "tan",
            Function::Sinc => "sinc",
            Function::Arcsin => "arcsin",
            Function::Arccos => "arccos",
            Function::Arctan => "arctan",
            Function::Arctan2 => "arctan2",
            Function::Cosh => "cosh",
            Function::Sinh => "sinh",
            Function::Tanh => "tanh",
            Function::Arcsinh => "arcsinh",
            Function::Arccosh => "arccosh",
            Function::Arctanh => "arctanh",
            Function::Ceiling => "ceil",
            Function::Floor => "floor",
            Function::Log => "log",
            Function::Log2 => "log2",
            Function::Log1p => "log1p",
            Function::Log10 => "log10",
            Function::Exp => "exp",
            Function::Expm1 => "expm1",
            Function::Exp2 => "exp2",
            Function::Hypot => "hypot",
            Function::Sqrt => "sqrt",
            Function::Min => "min",
            Function::Max => "max",
            Function::Cbrt => "cbrt",
            Function::Int => "int",
        }
    }

    /// Number of arguments the operator expects.
    pub fn arity(&self) -> usize {
        match self {
            Function::Arctan2 | Function::Hypot | Function::Min | Function::Max => 2,
            _ => 1,
        }
    }

    /// Evaluates the operator on numeric arguments.
    ///
    /// The implementations follow the numeric conventions of the execution
    /// scope the original language binds at runtime: `sign(0)` is `0`,
    /// `sinc` is the normalized cardinal sine and `int` truncates toward
    /// zero.
    pub fn eval(&self, args: &[f64]) -> Result<f64, EvalError> {
        if args.len() != self.arity() {
            return Err(EvalError::WrongArity {
                function: self.name(),
                expected: self.arity(),
                got: args.len(),
            });
        }
        let x = args[0];
        let value = match self {
            // The algebra is real-valued, so the complex accessors collapse.
            Function::Real => x,
            Function::Imag => 0.0,
            Function::Conjugate => x,
            Function::Sign => {
                if x == 0.0 {
                    0.0
                } else {
                    x.signum()
                }
            }
            Function::Abs => x.abs(),
            Function::Cos => x.cos(),
            Function::Sin => x.sin(),
            Function::Tan => x.tan(),
            Function::Sinc => {
                if x == 0.0 {
                    1.0
                } else {
                    let px = std::f64::consts::PI * x;
                    px.sin() / px
                }
            }
            Function::Arcsin => x.asin(),
            Function::Arccos => x.acos(),
            Function::Arctan => x.atan(),
            Function::Arctan2 => x.atan2(args[1]),
            Function::Cosh => x.cosh(),
            Function::Sinh => x.sinh(),
            Function::Tanh => x.tanh(),
            Function::Arcsinh => x.asinh(),
            Function::Arccosh => x.acosh(),
            Function::Arctanh => x.atanh(),
            Function::Ceiling => x.ceil(),
            Function::Floor => x.floor(),
            Function::Log => x.ln(),
            Function::Log2 => x.log2(),
            Function::Log1p => x.ln_1p(),
            Function::Log10 => x.log10(),
            Function::Exp => x.exp(),
            Function::Expm1 => x.exp_m1(),
            Function::Exp2 => x.exp2(),
            Function::Hypot => x.hypot(args[1]),
            Function::Sqrt => x.sqrt(),
            Function::Min => x.min(args[1]),
            Function::Max => x.max(args[1]),
            Function::Cbrt => x.cbrt(),
            Function::Int => x.trunc(),
        };
        Ok(value)
    }
}

/// A symbolic constant of the expression language.
///
/// Constants keep their identity through symbolic transforms so that
/// serialization restores the textual alias instead of a decimal expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
    Infinity,
}

impl Constant {
    /// Resolves a textual identifier against the constant table.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            "inf" => Some(Constant::Infinity),
            _ => None,
        }
    }

    /// Returns the textual alias used when serializing the constant.
    pub fn name(&self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
            Constant::Infinity => "inf",
        }
    }

    /// Numeric value of the constant.
    pub fn value(&self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
            Constant::Infinity => f64::INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        let functions = [
            Function::Real,
            Function::Sign,
            Function::Abs,
            Function::Sinc,
            Function::Arctan2,
            Function::Ceiling,
            Function::Floor,
            Function::Log1p,
            Function::Hypot,
            Function::Min,
            Function::Cbrt,
            Function::Int,
        ];
        for function in functions {
            assert_eq!(Function::from_name(function.name()), Some(function));
        }
    }

    #[test]
    fn test_ceiling_alias() {
        assert_eq!(Function::Ceiling.name(), "ceil");
        assert_eq!(Function::from_name("ceil"), Some(Function::Ceiling));
        assert_eq!(Function::from_name("ceiling"), None);
    }

    #[test]
    fn test_eval() {
        assert_eq!(Function::Sign.eval(&[0.0]).unwrap(), 0.0);
        assert_eq!(Function::Sign.eval(&[-3.0]).unwrap(), -1.0);
        assert_eq!(Function::Sinc.eval(&[0.0]).unwrap(), 1.0);
        assert_eq!(Function::Int.eval(&[-2.7]).unwrap(), -2.0);
        assert_eq!(Function::Hypot.eval(&[3.0, 4.0]).unwrap(), 5.0);
        assert!((Function::Log.eval(&[std::f64::consts::E]).unwrap() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_eval_arity() {
        let result = Function::Exp.eval(&[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(crate::errors::EvalError::WrongArity { expected: 1, got: 2, .. })
        ));
    }

    #[test]
    fn test_constants() {
        assert_eq!(Constant::from_name("pi"), Some(Constant::Pi));
        assert_eq!(Constant::Pi.value(), std::f64::consts::PI);
        assert_eq!(Constant::Infinity.name(), "inf");
        assert!(Constant::Infinity.value().is_infinite());
        assert_eq!(Constant::from_name("tau"), None);
    }
}
