//! Translation of expression text into symbolic trees.
//!
//! This module is the parse direction of the expression renderer. It
//! tokenizes arithmetic source text and builds an `Expr` tree, applying the
//! normalizations the algebra relies on:
//!
//! - `a / b` becomes `a * b**-1`
//! - `a - b` becomes `a + (-1) * b` (and unary minus becomes `(-1) * e`)
//! - `a // b` becomes `floor(a * b**-1)`
//! - `x op= y` becomes `x = x op y` for the five augmented arithmetic
//!   operators
//! - a call with zero arguments receives a single placeholder argument so
//!   that zero-arity calls stay representable in the tree
//!
//! Identifiers found in the constant table become symbolic constants, `t`
//! and `dt` are tagged real and non-negative, and every other identifier is
//! a plain real symbol. Call names (or dotted attribute paths, resolved by
//! their final attribute) are looked up in the function table; unknown names
//! are kept as user-defined functions.
//!
//! Constructs outside the grammar fail translation with a `SyntaxError`
//! naming the construct: keyword arguments, variadic argument lists, chained
//! comparisons, multi-target assignments, attribute access outside a call,
//! and the bitwise operators `^`, `&` and `|` (which suggest `**`, `and` and
//! `or` instead).

use crate::errors::SyntaxError;
use crate::expr::{Callee, CompareOp, Expr, Symbol};
use crate::functions::{Constant, Function};

/// Augmented assignment operators, resolved from a fixed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AugOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    And,
    Or,
    Not,
    Assign,
    AugAssign(AugOp),
    LParen,
    RParen,
    Comma,
    Dot,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(value) => value.to_string(),
            Token::Ident(name) => name.clone(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::StarStar => "**".to_string(),
            Token::Slash => "/".to_string(),
            Token::SlashSlash => "//".to_string(),
            Token::Percent => "%".to_string(),
            Token::Lt => "<".to_string(),
            Token::Le => "<=".to_string(),
            Token::Gt => ">".to_string(),
            Token::Ge => ">=".to_string(),
            Token::EqEq => "==".to_string(),
            Token::Ne => "!=".to_string(),
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
            Token::Not => "not".to_string(),
            Token::Assign => "=".to_string(),
            Token::AugAssign(op) => match op {
                AugOp::Add => "+=".to_string(),
                AugOp::Sub => "-=".to_string(),
                AugOp::Mul => "*=".to_string(),
                AugOp::Div => "/=".to_string(),
                AugOp::Pow => "**=".to_string(),
            },
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Comma => ",".to_string(),
            Token::Dot => ".".to_string(),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            ' ' | '\t' | '\r' | '\n' => pos += 1,
            '0'..='9' => {
                let (token, next) = lex_number(&chars, pos)?;
                tokens.push(token);
                pos = next;
            }
            '.' => {
                // A dot starts a number only when a digit follows; otherwise
                // it is the attribute separator.
                if pos + 1 < chars.len() && chars[pos + 1].is_ascii_digit() {
                    let (token, next) = lex_number(&chars, pos)?;
                    tokens.push(token);
                    pos = next;
                } else {
                    tokens.push(Token::Dot);
                    pos += 1;
                }
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_')
                {
                    pos += 1;
                }
                let word: String = chars[start..pos].iter().collect();
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Ident(word),
                });
            }
            '+' => {
                if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(Token::AugAssign(AugOp::Add));
                    pos += 2;
                } else {
                    tokens.push(Token::Plus);
                    pos += 1;
                }
            }
            '-' => {
                if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(Token::AugAssign(AugOp::Sub));
                    pos += 2;
                } else {
                    tokens.push(Token::Minus);
                    pos += 1;
                }
            }
            '*' => {
                if chars.get(pos + 1) == Some(&'*') {
                    if chars.get(pos + 2) == Some(&'=') {
                        tokens.push(Token::AugAssign(AugOp::Pow));
                        pos += 3;
                    } else {
                        tokens.push(Token::StarStar);
                        pos += 2;
                    }
                } else if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(Token::AugAssign(AugOp::Mul));
                    pos += 2;
                } else {
                    tokens.push(Token::Star);
                    pos += 1;
                }
            }
            '/' => {
                if chars.get(pos + 1) == Some(&'/') {
                    tokens.push(Token::SlashSlash);
                    pos += 2;
                } else if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(Token::AugAssign(AugOp::Div));
                    pos += 2;
                } else {
                    tokens.push(Token::Slash);
                    pos += 1;
                }
            }
            '%' => {
                tokens.push(Token::Percent);
                pos += 1;
            }
            '<' => {
                if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    pos += 2;
                } else {
                    tokens.push(Token::Lt);
                    pos += 1;
                }
            }
            '>' => {
                if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    pos += 2;
                } else {
                    tokens.push(Token::Gt);
                    pos += 1;
                }
            }
            '=' => {
                if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(Token::EqEq);
                    pos += 2;
                } else {
                    tokens.push(Token::Assign);
                    pos += 1;
                }
            }
            '!' => {
                if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(Token::Ne);
                    pos += 2;
                } else {
                    return Err(SyntaxError::UnexpectedCharacter('!'));
                }
            }
            // Bitwise operators are rejected outright with the spelling the
            // language expects instead.
            '^' => {
                return Err(SyntaxError::UnsupportedOperator {
                    operator: "^",
                    replacement: "**",
                })
            }
            '&' => {
                return Err(SyntaxError::UnsupportedOperator {
                    operator: "&",
                    replacement: "and",
                })
            }
            '|' => {
                return Err(SyntaxError::UnsupportedOperator {
                    operator: "|",
                    replacement: "or",
                })
            }
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                pos += 1;
            }
            other => return Err(SyntaxError::UnexpectedCharacter(other)),
        }
    }

    Ok(tokens)
}

fn lex_number(chars: &[char], start: usize) -> Result<(Token, usize), SyntaxError> {
    let mut pos = start;
    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos < chars.len() && chars[pos] == '.' {
        pos += 1;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
        let mut exp_pos = pos + 1;
        if exp_pos < chars.len() && (chars[exp_pos] == '+' || chars[exp_pos] == '-') {
            exp_pos += 1;
        }
        if exp_pos < chars.len() && chars[exp_pos].is_ascii_digit() {
            pos = exp_pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    let literal: String = chars[start..pos].iter().collect();
    let value = literal
        .parse::<f64>()
        .map_err(|_| SyntaxError::InvalidNumber(literal.clone()))?;
    Ok((Token::Number(value), pos))
}

/// Parses expression text into a symbolic tree.
///
/// Accepts a single expression or a single (possibly augmented) assignment
/// statement. Anything outside the supported grammar fails with a
/// `SyntaxError` naming the offending construct.
///
/// # Example
/// ```
/// use odegen::parse::parse;
///
/// let tree = parse("-k * x + c").unwrap();
/// assert!(tree.depends_on("x"));
/// ```
pub fn parse(text: &str) -> Result<Expr, SyntaxError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(SyntaxError::UnexpectedEnd);
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let expr = parser.parse_statement()?;

    match parser.current() {
        None => Ok(expr),
        // A second `=` after a completed assignment is a chained target.
        Some(Token::Assign) if matches!(expr, Expr::Assign(_, _)) => {
            Err(SyntaxError::MultipleAssignment)
        }
        Some(token) => Err(SyntaxError::UnexpectedToken {
            expected: "end of input".to_string(),
            got: token.describe(),
        }),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    // Tokens are borrowed from the underlying slice 'a, not from self, so a
    // held token does not block advancing the cursor.
    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<(), SyntaxError> {
        match self.current() {
            Some(current) if *current == token => {
                self.advance();
                Ok(())
            }
            Some(current) => Err(SyntaxError::UnexpectedToken {
                expected: expected.to_string(),
                got: current.describe(),
            }),
            None => Err(SyntaxError::UnexpectedEnd),
        }
    }

    fn parse_statement(&mut self) -> Result<Expr, SyntaxError> {
        if let (Some(Token::Ident(name)), Some(next)) = (self.peek(0), self.peek(1)) {
            match next {
                Token::Assign => {
                    let target = name.clone();
                    self.advance();
                    self.advance();
                    let value = self.parse_or()?;
                    return Ok(Expr::Assign(target, Box::new(value)));
                }
                Token::AugAssign(op) => {
                    // x op= y is the plain assignment x = x op y.
                    let target = name.clone();
                    let op = *op;
                    self.advance();
                    self.advance();
                    let rhs = self.parse_or()?;
                    let lhs = Expr::symbol(target.clone());
                    let value = match op {
                        AugOp::Add => Expr::add(lhs, rhs),
                        AugOp::Sub => Expr::add(lhs, Expr::neg(rhs)),
                        AugOp::Mul => Expr::mul(lhs, rhs),
                        AugOp::Div => Expr::mul(lhs, Expr::recip(rhs)),
                        AugOp::Pow => Expr::pow(lhs, rhs),
                    };
                    return Ok(Expr::Assign(target, Box::new(value)));
                }
                _ => {}
            }
        }
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and()?;
        while matches!(self.current(), Some(Token::Or)) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_not()?;
        while matches!(self.current(), Some(Token::And)) {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, SyntaxError> {
        if matches!(self.current(), Some(Token::Not)) {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_additive()?;
        if let Some(op) = self.current().and_then(compare_op) {
            self.advance();
            let right = self.parse_additive()?;
            if self.current().and_then(compare_op).is_some() {
                return Err(SyntaxError::ChainedComparison);
            }
            return Ok(Expr::Compare(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_term()?;
        loop {
            match self.current() {
                Some(Token::Plus) => {
                    self.advance();
                    let right = self.parse_term()?;
                    left = Expr::add(left, right);
                }
                Some(Token::Minus) => {
                    // a - b is a + (-1)*b in the tree's normal form.
                    self.advance();
                    let right = self.parse_term()?;
                    left = Expr::add(left, Expr::neg(right));
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            match self.current() {
                Some(Token::Star) => {
                    self.advance();
                    let right = self.parse_unary()?;
                    left = Expr::mul(left, right);
                }
                Some(Token::Slash) => {
                    // a / b is a * b**-1 in the tree's normal form.
                    self.advance();
                    let right = self.parse_unary()?;
                    left = Expr::mul(left, Expr::recip(right));
                }
                Some(Token::SlashSlash) => {
                    self.advance();
                    let right = self.parse_unary()?;
                    left = Expr::call(
                        Function::Floor,
                        vec![Expr::mul(left, Expr::recip(right))],
                    );
                }
                Some(Token::Percent) => {
                    self.advance();
                    let right = self.parse_unary()?;
                    left = Expr::Mod(Box::new(left), Box::new(right));
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        match self.current() {
            Some(Token::Minus) => {
                self.advance();
                let inner = self.parse_unary()?;
                Ok(Expr::neg(inner))
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.parse_atom()?;
        if matches!(self.current(), Some(Token::StarStar)) {
            self.advance();
            // Right associative; the exponent may carry a unary sign.
            let exponent = self.parse_unary()?;
            return Ok(Expr::pow(base, exponent));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.current().cloned().ok_or(SyntaxError::UnexpectedEnd)?;
        match token {
            Token::Number(value) => {
                self.advance();
                Ok(Expr::Number(value))
            }
            Token::Ident(name) => {
                self.advance();
                let mut path = vec![name];
                while matches!(self.current(), Some(Token::Dot)) {
                    self.advance();
                    match self.current().cloned() {
                        Some(Token::Ident(attr)) => {
                            self.advance();
                            path.push(attr);
                        }
                        Some(other) => {
                            return Err(SyntaxError::UnexpectedToken {
                                expected: "attribute name".to_string(),
                                got: other.describe(),
                            })
                        }
                        None => return Err(SyntaxError::UnexpectedEnd),
                    }
                }
                if matches!(self.current(), Some(Token::LParen)) {
                    self.advance();
                    let mut args = self.parse_arguments()?;
                    self.expect(Token::RParen, ")")?;
                    if args.is_empty() {
                        args.push(Expr::Symbol(Symbol::placeholder()));
                    }
                    return Ok(Expr::Call(resolve_callee(&path), args));
                }
                if path.len() > 1 {
                    return Err(SyntaxError::UnknownSyntax {
                        construct: "attribute access outside a function call".to_string(),
                        text: path.join("."),
                    });
                }
                let name = path.remove(0);
                if let Some(constant) = Constant::from_name(&name) {
                    Ok(Expr::Constant(constant))
                } else {
                    Ok(Expr::symbol(name))
                }
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_or()?;
                self.expect(Token::RParen, ")")?;
                Ok(inner)
            }
            other => Err(SyntaxError::UnexpectedToken {
                expected: "a number, identifier or parenthesized expression".to_string(),
                got: other.describe(),
            }),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        if matches!(self.current(), Some(Token::RParen)) {
            return Ok(args);
        }
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some(Token::Ident(name)), Some(Token::Assign)) => {
                    return Err(SyntaxError::KeywordArguments(name.clone()));
                }
                (Some(Token::Star), _) => return Err(SyntaxError::VariadicArguments),
                (Some(Token::StarStar), _) => {
                    return Err(SyntaxError::KeywordArguments("**".to_string()));
                }
                _ => {}
            }
            args.push(self.parse_or()?);
            match self.current() {
                Some(Token::Comma) => {
                    self.advance();
                    // Allow a trailing comma before the closing parenthesis.
                    if matches!(self.current(), Some(Token::RParen)) {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(args)
    }
}

fn compare_op(token: &Token) -> Option<CompareOp> {
    match token {
        Token::Lt => Some(CompareOp::Lt),
        Token::Le => Some(CompareOp::Le),
        Token::Gt => Some(CompareOp::Gt),
        Token::Ge => Some(CompareOp::Ge),
        Token::EqEq => Some(CompareOp::Eq),
        Token::Ne => Some(CompareOp::Ne),
        _ => None,
    }
}

fn resolve_callee(path: &[String]) -> Callee {
    // Dotted paths resolve by their final attribute, so a qualified call to
    // a table function (`np.exp`) still maps to the canonical operator.
    let last = path.last().map(String::as_str).unwrap_or_default();
    if let Some(function) = Function::from_name(last) {
        Callee::Builtin(function)
    } else {
        Callee::User(path.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn eval(text: &str, pairs: &[(&str, f64)]) -> f64 {
        let env: HashMap<String, f64> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        parse(text).unwrap().eval(&env).unwrap()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("1 + 2 * 3", &[]), 7.0);
        assert_eq!(eval("(1 + 2) * 3", &[]), 9.0);
        assert_eq!(eval("2 ** 3 ** 2", &[]), 512.0);
        assert_eq!(eval("-2 ** 2", &[]), -4.0);
        assert_eq!(eval("2 ** -1", &[]), 0.5);
    }

    #[test]
    fn test_division_normalization() {
        let tree = parse("a / b").unwrap();
        // a / b is stored as a * b**-1
        assert!(matches!(tree, Expr::Mul(_, _)));
        assert_eq!(eval("a / b", &[("a", 6.0), ("b", 3.0)]), 2.0);
    }

    #[test]
    fn test_floor_division() {
        let tree = parse("7 // 2").unwrap();
        assert!(matches!(
            tree,
            Expr::Call(Callee::Builtin(Function::Floor), _)
        ));
        assert_eq!(eval("7 // 2", &[]), 3.0);
    }

    #[test]
    fn test_subtraction_normalization() {
        let tree = parse("a - b").unwrap();
        assert!(matches!(tree, Expr::Add(_, _)));
        assert_eq!(eval("a - b", &[("a", 1.0), ("b", 4.0)]), -3.0);
    }

    #[test]
    fn test_modulo() {
        assert_eq!(eval("7 % 3", &[]), 1.0);
        assert_eq!(eval("-7 % 3", &[]), 2.0);
    }

    #[test]
    fn test_constants_and_domains() {
        assert!(matches!(
            parse("pi").unwrap(),
            Expr::Constant(Constant::Pi)
        ));
        match parse("t").unwrap() {
            Expr::Symbol(symbol) => {
                assert_eq!(symbol.domain, crate::expr::Domain::RealPositive)
            }
            other => panic!("expected symbol, got {other:?}"),
        }
    }

    #[test]
    fn test_function_table_lookup() {
        assert!(matches!(
            parse("exp(x)").unwrap(),
            Expr::Call(Callee::Builtin(Function::Exp), _)
        ));
        assert!(matches!(
            parse("ceil(x)").unwrap(),
            Expr::Call(Callee::Builtin(Function::Ceiling), _)
        ));
    }

    #[test]
    fn test_dotted_call_resolves_by_attribute() {
        assert!(matches!(
            parse("np.exp(x)").unwrap(),
            Expr::Call(Callee::Builtin(Function::Exp), _)
        ));
        match parse("mylib.rates(x)").unwrap() {
            Expr::Call(Callee::User(name), _) => assert_eq!(name, "mylib.rates"),
            other => panic!("expected user call, got {other:?}"),
        }
    }

    #[test]
    fn test_attribute_outside_call() {
        let result = parse("np.pi + 1");
        assert!(matches!(result, Err(SyntaxError::UnknownSyntax { .. })));
    }

    #[test]
    fn test_zero_arity_call_gets_placeholder() {
        match parse("noise()").unwrap() {
            Expr::Call(_, args) => {
                assert_eq!(args.len(), 1);
                assert!(matches!(
                    &args[0],
                    Expr::Symbol(symbol) if symbol.name == crate::expr::PLACEHOLDER_ARG
                ));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_bitwise_operators_suggest_replacements() {
        for (text, replacement) in [("a & b", "and"), ("a | b", "or"), ("a ^ b", "**")] {
            match parse(text) {
                Err(SyntaxError::UnsupportedOperator { replacement: r, .. }) => {
                    assert_eq!(r, replacement)
                }
                other => panic!("expected unsupported-operator error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_keyword_arguments_rejected() {
        assert!(matches!(
            parse("f(a=1)"),
            Err(SyntaxError::KeywordArguments(name)) if name == "a"
        ));
    }

    #[test]
    fn test_variadic_arguments_rejected() {
        assert!(matches!(
            parse("f(*args)"),
            Err(SyntaxError::VariadicArguments)
        ));
    }

    #[test]
    fn test_chained_comparison_rejected() {
        assert!(matches!(
            parse("a < b < c"),
            Err(SyntaxError::ChainedComparison)
        ));
    }

    #[test]
    fn test_multiple_assignment_rejected() {
        assert!(matches!(
            parse("a = b = c"),
            Err(SyntaxError::MultipleAssignment)
        ));
    }

    #[test]
    fn test_augmented_assignment() {
        match parse("x += y").unwrap() {
            Expr::Assign(target, value) => {
                assert_eq!(target, "x");
                let env: HashMap<String, f64> =
                    [("x".to_string(), 1.0), ("y".to_string(), 2.0)].into();
                assert_eq!(value.eval(&env).unwrap(), 3.0);
            }
            other => panic!("expected assignment, got {other:?}"),
        }
        match parse("x **= 2").unwrap() {
            Expr::Assign(_, value) => {
                let env: HashMap<String, f64> = [("x".to_string(), 3.0)].into();
                assert_eq!(value.eval(&env).unwrap(), 9.0);
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_boolean_operators() {
        assert_eq!(eval("1 < 2 and 3 < 4", &[]), 1.0);
        assert_eq!(eval("1 < 2 and 4 < 3", &[]), 0.0);
        assert_eq!(eval("1 < 2 or 4 < 3", &[]), 1.0);
        assert_eq!(eval("not 1 > 2", &[]), 1.0);
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(matches!(
            parse("a b"),
            Err(SyntaxError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(parse(""), Err(SyntaxError::UnexpectedEnd)));
        assert!(matches!(parse("   "), Err(SyntaxError::UnexpectedEnd)));
    }
}
