mod calculus;
mod eval;
mod expr;
mod parser;
mod solve;

use thiserror::Error;

pub use expr::{format_number, Expr, Func};
pub use parser::parse;
pub use solve::{solve, Solutions};

#[derive(Debug, Error)]
pub enum MathError {
    #[error("could not parse expression: {0}")]
    Parse(String),
    #[error("expression contains the unbound symbol '{0}'")]
    UnboundSymbol(char),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Evaluate a normalized arithmetic expression to a number.
pub fn evaluate(input: &str) -> Result<f64, MathError> {
    parse(input)?.eval()
}

/// Symbolic derivative of a normalized expression, rendered back to text.
pub fn derivative(input: &str, var: char) -> Result<String, MathError> {
    Ok(parse(input)?.differentiate(var)?.to_string())
}

/// Indefinite integral of a normalized expression, rendered back to text
/// without the constant term.
pub fn integral(input: &str, var: char) -> Result<String, MathError> {
    Ok(parse(input)?.integrate(var)?.to_string())
}

/// Solve `lhs = rhs` for `var`.
pub fn solve_equation(lhs: &str, rhs: &str, var: char) -> Result<Solutions, MathError> {
    solve(&parse(lhs)?, &parse(rhs)?, var)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_arithmetic() {
        assert_eq!(evaluate("5 * 3").unwrap(), 15.0);
    }

    #[test]
    fn end_to_end_derivative() {
        assert_eq!(derivative("x^3", 'x').unwrap(), "3*x^2");
    }

    #[test]
    fn end_to_end_solve() {
        assert_eq!(
            solve_equation("x^2", "9", 'x').unwrap(),
            Solutions::Roots(vec![-3.0, 3.0])
        );
    }
}
