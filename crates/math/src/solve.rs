use crate::expr::Expr;
use crate::MathError;

/// Highest polynomial degree the solver will expand to. Anything denser is
/// reported as unsupported instead of ground through.
const MAX_DEGREE: usize = 8;

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub enum Solutions {
    /// The equation reduced to `0 = 0`; every value satisfies it.
    All,
    /// Real roots, possibly empty (e.g. a negative discriminant).
    Roots(Vec<f64>),
}

/// Solve `lhs = rhs` for `var` by collapsing both sides into a polynomial.
/// Linear and quadratic forms are solved exactly; higher degrees and
/// non-polynomial shapes are refused.
pub fn solve(lhs: &Expr, rhs: &Expr, var: char) -> Result<Solutions, MathError> {
    let difference = Expr::sub(lhs.clone(), rhs.clone());
    let mut coefficients = polynomial_coefficients(&difference, var).ok_or_else(|| {
        MathError::Unsupported("only polynomial equations can be solved locally".to_string())
    })?;

    while coefficients.len() > 1 && coefficients.last().is_some_and(|c| c.abs() < EPSILON) {
        coefficients.pop();
    }

    match coefficients.as_slice() {
        [constant] if constant.abs() < EPSILON => Ok(Solutions::All),
        [_] => Ok(Solutions::Roots(Vec::new())),
        [c0, c1] => Ok(Solutions::Roots(vec![-c0 / c1])),
        [c0, c1, c2] => {
            let discriminant = c1 * c1 - 4.0 * c2 * c0;
            if discriminant < -EPSILON {
                return Ok(Solutions::Roots(Vec::new()));
            }
            let sqrt_d = discriminant.max(0.0).sqrt();
            let mut roots = vec![(-c1 - sqrt_d) / (2.0 * c2), (-c1 + sqrt_d) / (2.0 * c2)];
            roots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            roots.dedup_by(|a, b| (*a - *b).abs() < EPSILON);
            Ok(Solutions::Roots(roots))
        }
        _ => Err(MathError::Unsupported(format!(
            "degree-{} equations",
            coefficients.len() - 1
        ))),
    }
}

/// Coefficients in ascending degree order, or None when the expression is not
/// a polynomial in `var`. Other free symbols also yield None; a second
/// unknown means there is nothing to solve numerically.
fn polynomial_coefficients(expr: &Expr, var: char) -> Option<Vec<f64>> {
    match expr {
        Expr::Num(value) => Some(vec![*value]),
        Expr::Sym(name) if *name == var => Some(vec![0.0, 1.0]),
        Expr::Sym(_) => None,
        Expr::Add(lhs, rhs) => Some(combine(
            polynomial_coefficients(lhs, var)?,
            polynomial_coefficients(rhs, var)?,
            1.0,
        )),
        Expr::Sub(lhs, rhs) => Some(combine(
            polynomial_coefficients(lhs, var)?,
            polynomial_coefficients(rhs, var)?,
            -1.0,
        )),
        Expr::Neg(inner) => Some(
            polynomial_coefficients(inner, var)?
                .into_iter()
                .map(|c| -c)
                .collect(),
        ),
        Expr::Mul(lhs, rhs) => convolve(
            polynomial_coefficients(lhs, var)?,
            polynomial_coefficients(rhs, var)?,
        ),
        Expr::Div(lhs, rhs) => {
            let denominator = polynomial_coefficients(rhs, var)?;
            if denominator.len() != 1 || denominator[0].abs() < EPSILON {
                return None;
            }
            Some(
                polynomial_coefficients(lhs, var)?
                    .into_iter()
                    .map(|c| c / denominator[0])
                    .collect(),
            )
        }
        Expr::Pow(base, exponent) => {
            let n = exponent.as_num()?;
            if n < 0.0 || n.fract() != 0.0 || n as usize > MAX_DEGREE {
                return None;
            }
            let base = polynomial_coefficients(base, var)?;
            let mut result = vec![1.0];
            for _ in 0..n as usize {
                result = convolve(result, base.clone())?;
            }
            Some(result)
        }
        Expr::Call(..) => None,
    }
}

fn combine(lhs: Vec<f64>, rhs: Vec<f64>, sign: f64) -> Vec<f64> {
    let mut out = vec![0.0; lhs.len().max(rhs.len())];
    for (index, value) in lhs.iter().enumerate() {
        out[index] += value;
    }
    for (index, value) in rhs.iter().enumerate() {
        out[index] += sign * value;
    }
    out
}

fn convolve(lhs: Vec<f64>, rhs: Vec<f64>) -> Option<Vec<f64>> {
    if lhs.len() + rhs.len() > MAX_DEGREE + 2 {
        return None;
    }
    let mut out = vec![0.0; lhs.len() + rhs.len() - 1];
    for (i, a) in lhs.iter().enumerate() {
        for (j, b) in rhs.iter().enumerate() {
            out[i + j] += a * b;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn roots(lhs: &str, rhs: &str) -> Solutions {
        solve(&parse(lhs).unwrap(), &parse(rhs).unwrap(), 'x').unwrap()
    }

    #[test]
    fn linear_equation() {
        assert_eq!(roots("2*x + 1", "7"), Solutions::Roots(vec![3.0]));
    }

    #[test]
    fn quadratic_equation() {
        assert_eq!(roots("x^2", "9"), Solutions::Roots(vec![-3.0, 3.0]));
    }

    #[test]
    fn repeated_root_is_deduplicated() {
        assert_eq!(roots("x^2 - 2*x + 1", "0"), Solutions::Roots(vec![1.0]));
    }

    #[test]
    fn negative_discriminant_has_no_real_roots() {
        assert_eq!(roots("x^2 + 1", "0"), Solutions::Roots(Vec::new()));
    }

    #[test]
    fn identity_satisfied_everywhere() {
        assert_eq!(roots("x + 1", "x + 1"), Solutions::All);
    }

    #[test]
    fn second_unknown_is_refused() {
        let result = solve(&parse("x + y").unwrap(), &parse("3").unwrap(), 'x');
        assert!(result.is_err());
    }

    #[test]
    fn solves_for_other_variables() {
        let result = solve(&parse("2*a").unwrap(), &parse("10").unwrap(), 'a').unwrap();
        assert_eq!(result, Solutions::Roots(vec![5.0]));
    }
}
