//! # Molar fraction rules
//!
//! A precursor contributes `fraction(x)` moles per mole of target, where x is the doping variable.
//! Three kinds of rules are available behind the `MolarFraction` trait:
//! - `ConstantFraction`: the fraction does not depend on x (host lattice formers like Al2O3)
//! - `ClosureFraction`: any Rust closure `f64 -> Result<f64, String>`
//! - `ExpressionFraction`: an arithmetic expression in x, e.g. "1 - x" or "x/2", turned into a
//!   symbolic expression of RustedSciThe and evaluated by it. This is the form used in synthesis
//!   task files.
//!
//! ```rust, ignore
//! let rule = FractionRule::expression("1 - x")?;
//! assert_eq!(rule.fraction(0.25)?, 0.75);
//! ```
use RustedSciThe::symbolic::symbolic_engine::Expr;
use enum_dispatch::enum_dispatch;
use std::fmt;
use std::sync::Arc;

use super::synthesis_errors::{SynthesisError, SynthesisResult};

#[enum_dispatch]
pub trait MolarFraction {
    /// molar fraction at the doping variable x; negative and non-finite values are errors
    fn fraction(&self, x: f64) -> Result<f64, String>;
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantFraction(pub f64);

impl MolarFraction for ConstantFraction {
    fn fraction(&self, _x: f64) -> Result<f64, String> {
        valid_fraction(self.0)
    }

    fn describe(&self) -> String {
        self.0.to_string()
    }
}

type FractionFn = dyn Fn(f64) -> Result<f64, String> + Send + Sync;

#[derive(Clone)]
pub struct ClosureFraction {
    label: String,
    function: Arc<FractionFn>,
}

impl ClosureFraction {
    pub fn new<F>(label: &str, function: F) -> Self
    where
        F: Fn(f64) -> Result<f64, String> + Send + Sync + 'static,
    {
        Self {
            label: label.to_string(),
            function: Arc::new(function),
        }
    }
}

impl fmt::Debug for ClosureFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureFraction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl MolarFraction for ClosureFraction {
    fn fraction(&self, x: f64) -> Result<f64, String> {
        valid_fraction((self.function)(x)?)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionFraction {
    text: String,
    expr: Expr,
}

impl ExpressionFraction {
    pub fn new(text: &str) -> SynthesisResult<Self> {
        let expr = parse_fraction_expression(text).map_err(|reason| {
            SynthesisError::InvalidExpression {
                expression: text.to_string(),
                reason,
            }
        })?;
        Ok(Self {
            text: text.trim().to_string(),
            expr,
        })
    }
}

impl MolarFraction for ExpressionFraction {
    fn fraction(&self, x: f64) -> Result<f64, String> {
        let function = self.expr.lambdify(vec!["x"]);
        valid_fraction(function(vec![x])).map_err(|reason| format!("{} ({})", reason, self.text))
    }

    fn describe(&self) -> String {
        self.text.clone()
    }
}

#[enum_dispatch(MolarFraction)]
#[derive(Debug, Clone)]
pub enum FractionRule {
    Constant(ConstantFraction),
    Closure(ClosureFraction),
    Expression(ExpressionFraction),
}

impl FractionRule {
    pub fn constant(value: f64) -> Self {
        FractionRule::Constant(ConstantFraction(value))
    }

    pub fn closure<F>(label: &str, function: F) -> Self
    where
        F: Fn(f64) -> Result<f64, String> + Send + Sync + 'static,
    {
        FractionRule::Closure(ClosureFraction::new(label, function))
    }

    pub fn expression(text: &str) -> SynthesisResult<Self> {
        Ok(FractionRule::Expression(ExpressionFraction::new(text)?))
    }
}

fn valid_fraction(value: f64) -> Result<f64, String> {
    if !value.is_finite() {
        Err(format!("molar fraction evaluates to {}", value))
    } else if value < 0.0 {
        Err(format!("molar fraction evaluates to the negative value {}", value))
    } else {
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    X,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LeftBracket,
    RightBracket,
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut number = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        number.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if number.matches('.').count() > 1 || !number.chars().any(|d| d.is_ascii_digit()) {
                    return Err(format!("{:?} is not a number", number));
                }
                let value = number
                    .parse::<f64>()
                    .map_err(|e| format!("{:?} is not a number: {}", number, e))?;
                tokens.push(Token::Number(value));
                continue;
            }
            'x' => Token::X,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LeftBracket,
            ')' => Token::RightBracket,
            other => {
                return Err(format!(
                    "unexpected character {:?}, only numbers, x, + - * / ^ and brackets are allowed",
                    other
                ));
            }
        };
        tokens.push(token);
        chars.next();
    }
    Ok(tokens)
}

/// Recursive descent over
/// ```text
/// expression = term (("+" | "-") term)*
/// term       = unary (("*" | "/") unary)*
/// unary      = "-" unary | power
/// power      = atom ("^" unary)?
/// atom       = number | "x" | "(" expression ")"
/// ```
/// `+ - * /` group from the left, `^` from the right.
struct ExpressionParser {
    tokens: Vec<Token>,
    position: usize,
}

impl ExpressionParser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.position).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        self.position += 1;
        token
    }

    fn expression(&mut self) -> Result<Expr, String> {
        let mut left = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.position += 1;
                    left = left + self.term()?;
                }
                Some(Token::Minus) => {
                    self.position += 1;
                    left = left - self.term()?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn term(&mut self) -> Result<Expr, String> {
        let mut left = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.position += 1;
                    left = left * self.unary()?;
                }
                Some(Token::Slash) => {
                    self.position += 1;
                    left = left / self.unary()?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(Token::Minus) {
            self.position += 1;
            return Ok(-self.unary()?);
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, String> {
        let base = self.atom()?;
        if self.peek() == Some(Token::Caret) {
            self.position += 1;
            let exponent = self.unary()?;
            return Ok(base.pow(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Number(value)) => Ok(Expr::Const(value)),
            Some(Token::X) => Ok(Expr::Var("x".to_owned())),
            Some(Token::LeftBracket) => {
                let inner = self.expression()?;
                match self.next() {
                    Some(Token::RightBracket) => Ok(inner),
                    _ => Err("unclosed '('".to_string()),
                }
            }
            Some(token) => Err(format!("missing operand before {:?}", token)),
            None => Err("expression ends with an operator".to_string()),
        }
    }
}

fn parse_fraction_expression(text: &str) -> Result<Expr, String> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err("expression is empty".to_string());
    }
    let mut parser = ExpressionParser {
        tokens,
        position: 0,
    };
    let expr = parser.expression()?;
    match parser.peek() {
        None => Ok(expr),
        Some(Token::RightBracket) => Err("unmatched ')'".to_string()),
        Some(token) => Err(format!("missing operator before {:?}", token)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_fraction() {
        let rule = FractionRule::constant(2.0);
        assert_eq!(rule.fraction(0.3).unwrap(), 2.0);
        assert_eq!(rule.describe(), "2");
        assert!(FractionRule::constant(f64::NAN).fraction(0.3).is_err());
    }

    #[test]
    fn test_closure_fraction() {
        let rule = FractionRule::closure("1 - x", |x| Ok(1.0 - x));
        assert_relative_eq!(rule.fraction(0.02).unwrap(), 0.98);
        assert_eq!(rule.describe(), "1 - x");

        let failing = FractionRule::closure("broken", |_| Err("no value".to_string()));
        assert_eq!(failing.fraction(0.5), Err("no value".to_string()));

        let infinite = FractionRule::closure("1/(x - 0.5)", |x| Ok(1.0 / (x - 0.5)));
        assert!(infinite.fraction(0.5).is_err());
    }

    #[test]
    fn test_expression_fraction() {
        let rule = FractionRule::expression("1 - x").unwrap();
        assert_relative_eq!(rule.fraction(0.25).unwrap(), 0.75, epsilon = 1e-12);
        let rule = FractionRule::expression("x/2").unwrap();
        assert_relative_eq!(rule.fraction(0.04).unwrap(), 0.02, epsilon = 1e-12);
        let rule = FractionRule::expression("2*(1 - x)").unwrap();
        assert_relative_eq!(rule.fraction(0.5).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(rule.describe(), "2*(1 - x)");
    }

    #[test]
    fn test_negative_fractions_are_errors() {
        assert!(FractionRule::constant(-1.0).fraction(0.3).is_err());
        let rule = FractionRule::closure("x - 0.5", |x| Ok(x - 0.5));
        assert!(rule.fraction(0.25).is_err());
        assert_relative_eq!(rule.fraction(0.75).unwrap(), 0.25, epsilon = 1e-12);
        let rule = FractionRule::expression("x - 0.5").unwrap();
        assert!(rule.fraction(0.25).is_err());
        assert_eq!(FractionRule::constant(0.0).fraction(0.3), Ok(0.0));
    }

    #[test]
    fn test_operators_group_from_the_left() {
        let cases = [
            ("1-x-0.5", 0.25, 0.25),
            ("1 - x - 0.01", 0.25, 0.74),
            ("2/x/2", 0.25, 4.0),
            ("8/2*x", 0.25, 1.0),
            ("1 - x + 0.5", 0.25, 1.25),
            ("2^3^0", 0.25, 2.0),
            ("3*x - x^2", 0.25, 0.6875),
        ];
        for (text, x, expected) in cases {
            let rule = FractionRule::expression(text).unwrap();
            assert_relative_eq!(rule.fraction(x).unwrap(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_unary_minus_and_exponents() {
        let rule = FractionRule::expression("2^x").unwrap();
        assert_relative_eq!(rule.fraction(0.25).unwrap(), 2f64.powf(0.25), epsilon = 1e-12);
        let rule = FractionRule::expression("2^-x").unwrap();
        assert_relative_eq!(rule.fraction(0.25).unwrap(), 2f64.powf(-0.25), epsilon = 1e-12);
        let rule = FractionRule::expression("1 + x*-2").unwrap();
        assert_relative_eq!(rule.fraction(0.25).unwrap(), 0.5, epsilon = 1e-12);
        let rule = FractionRule::expression("-x + 1").unwrap();
        assert_relative_eq!(rule.fraction(0.25).unwrap(), 0.75, epsilon = 1e-12);
        // ^ binds tighter than unary minus
        let rule = FractionRule::expression("1 - -x^2").unwrap();
        assert_relative_eq!(rule.fraction(0.5).unwrap(), 1.25, epsilon = 1e-12);
        let rule = FractionRule::expression(".5*x").unwrap();
        assert_relative_eq!(rule.fraction(0.5).unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_expressions() {
        for text in [
            "", "  ", "1 - y", "x x", "2*", "(1 - x", "1 - x)", "*x", "ln(x)", "1 -- ", ".",
            "1.2.3", "2x", "x(1)", "1 2", "2^", "()", "x..5",
        ] {
            assert!(
                matches!(
                    FractionRule::expression(text),
                    Err(SynthesisError::InvalidExpression { .. })
                ),
                "{:?} should be rejected",
                text
            );
        }
    }
}
