use crate::expr::{Expr, Func};
use crate::MathError;

impl Expr {
    /// Symbolic derivative with respect to `var`. Covers the forms the
    /// extractor can produce: polynomials, quotients, constant powers,
    /// exponentials, and the trig/log/sqrt functions with chain rule.
    pub fn differentiate(&self, var: char) -> Result<Expr, MathError> {
        let derivative = match self {
            Expr::Num(_) => Expr::Num(0.0),
            Expr::Sym(name) => {
                if *name == var {
                    Expr::Num(1.0)
                } else {
                    Expr::Num(0.0)
                }
            }
            Expr::Add(lhs, rhs) => Expr::add(lhs.differentiate(var)?, rhs.differentiate(var)?),
            Expr::Sub(lhs, rhs) => Expr::sub(lhs.differentiate(var)?, rhs.differentiate(var)?),
            Expr::Mul(lhs, rhs) => Expr::add(
                Expr::mul(lhs.differentiate(var)?, (**rhs).clone()),
                Expr::mul((**lhs).clone(), rhs.differentiate(var)?),
            ),
            Expr::Div(lhs, rhs) => Expr::div(
                Expr::sub(
                    Expr::mul(lhs.differentiate(var)?, (**rhs).clone()),
                    Expr::mul((**lhs).clone(), rhs.differentiate(var)?),
                ),
                Expr::pow((**rhs).clone(), Expr::Num(2.0)),
            ),
            Expr::Pow(base, exponent) => match (base.as_num(), exponent.as_num()) {
                // u^n -> n * u^(n-1) * u'
                (_, Some(n)) => Expr::mul(
                    Expr::mul(
                        Expr::Num(n),
                        Expr::pow((**base).clone(), Expr::Num(n - 1.0)),
                    ),
                    base.differentiate(var)?,
                ),
                // c^u -> c^u * ln(c) * u'
                (Some(c), None) => Expr::mul(
                    Expr::mul(self.clone(), Expr::Num(c.ln())),
                    exponent.differentiate(var)?,
                ),
                _ => {
                    return Err(MathError::Unsupported(
                        "derivative of a variable-to-variable power".to_string(),
                    ))
                }
            },
            Expr::Neg(inner) => Expr::Neg(Box::new(inner.differentiate(var)?)),
            Expr::Call(func, arg) => {
                let inner = arg.differentiate(var)?;
                let outer = match func {
                    Func::Sin => Expr::call(Func::Cos, (**arg).clone()),
                    Func::Cos => Expr::Neg(Box::new(Expr::call(Func::Sin, (**arg).clone()))),
                    Func::Tan => Expr::div(
                        Expr::Num(1.0),
                        Expr::pow(Expr::call(Func::Cos, (**arg).clone()), Expr::Num(2.0)),
                    ),
                    Func::Exp => Expr::call(Func::Exp, (**arg).clone()),
                    Func::Ln => Expr::div(Expr::Num(1.0), (**arg).clone()),
                    Func::Sqrt => Expr::div(
                        Expr::Num(1.0),
                        Expr::mul(Expr::Num(2.0), Expr::call(Func::Sqrt, (**arg).clone())),
                    ),
                    Func::Floor => {
                        return Err(MathError::Unsupported(
                            "derivative of floor".to_string(),
                        ))
                    }
                };
                Expr::mul(outer, inner)
            }
        };

        Ok(derivative.simplify())
    }

    /// Indefinite integral with respect to `var`, without the constant term.
    /// Handles linear combinations of power, trig, and exponential atoms;
    /// anything fancier is reported as unsupported rather than guessed at.
    pub fn integrate(&self, var: char) -> Result<Expr, MathError> {
        let integral = match self {
            expr if !expr.contains_symbol(var) => {
                Expr::mul(expr.clone(), Expr::Sym(var))
            }
            Expr::Sym(_) => Expr::div(
                Expr::pow(Expr::Sym(var), Expr::Num(2.0)),
                Expr::Num(2.0),
            ),
            Expr::Add(lhs, rhs) => Expr::add(lhs.integrate(var)?, rhs.integrate(var)?),
            Expr::Sub(lhs, rhs) => Expr::sub(lhs.integrate(var)?, rhs.integrate(var)?),
            Expr::Neg(inner) => Expr::Neg(Box::new(inner.integrate(var)?)),
            Expr::Mul(lhs, rhs) => match (lhs.as_num(), rhs.as_num()) {
                (Some(_), _) => Expr::mul((**lhs).clone(), rhs.integrate(var)?),
                (_, Some(_)) => Expr::mul((**rhs).clone(), lhs.integrate(var)?),
                _ => {
                    return Err(MathError::Unsupported(
                        "integral of a general product".to_string(),
                    ))
                }
            },
            Expr::Div(lhs, rhs) => match rhs.as_num() {
                Some(_) => Expr::div(lhs.integrate(var)?, (**rhs).clone()),
                None => {
                    return Err(MathError::Unsupported(
                        "integral of a general quotient".to_string(),
                    ))
                }
            },
            Expr::Pow(base, exponent) => match (&**base, exponent.as_num()) {
                (Expr::Sym(name), Some(n)) if *name == var && n != -1.0 => Expr::div(
                    Expr::pow(Expr::Sym(var), Expr::Num(n + 1.0)),
                    Expr::Num(n + 1.0),
                ),
                (Expr::Sym(name), Some(n)) if *name == var && n == -1.0 => {
                    Expr::call(Func::Ln, Expr::Sym(var))
                }
                _ => {
                    return Err(MathError::Unsupported(
                        "integral of that power form".to_string(),
                    ))
                }
            },
            Expr::Call(func, arg) => match (&**arg, func) {
                (Expr::Sym(name), Func::Sin) if *name == var => {
                    Expr::Neg(Box::new(Expr::call(Func::Cos, Expr::Sym(var))))
                }
                (Expr::Sym(name), Func::Cos) if *name == var => {
                    Expr::call(Func::Sin, Expr::Sym(var))
                }
                (Expr::Sym(name), Func::Exp) if *name == var => {
                    Expr::call(Func::Exp, Expr::Sym(var))
                }
                _ => {
                    return Err(MathError::Unsupported(format!(
                        "integral of {}",
                        func.name()
                    )))
                }
            },
            _ => {
                return Err(MathError::Unsupported(
                    "integral of that expression".to_string(),
                ))
            }
        };

        Ok(integral.simplify())
    }
}
