use crate::expr::{Expr, Func};
use crate::MathError;

impl Expr {
    /// Numeric evaluation. Free symbols are an error here; the caller decides
    /// whether that means "defer to the remote evaluator" or "give up".
    pub fn eval(&self) -> Result<f64, MathError> {
        match self {
            Expr::Num(value) => Ok(*value),
            Expr::Sym(name) => Err(MathError::UnboundSymbol(*name)),
            Expr::Add(lhs, rhs) => Ok(lhs.eval()? + rhs.eval()?),
            Expr::Sub(lhs, rhs) => Ok(lhs.eval()? - rhs.eval()?),
            Expr::Mul(lhs, rhs) => Ok(lhs.eval()? * rhs.eval()?),
            Expr::Div(lhs, rhs) => {
                let denominator = rhs.eval()?;
                if denominator == 0.0 {
                    return Err(MathError::Unsupported("division by zero".to_string()));
                }
                Ok(lhs.eval()? / denominator)
            }
            Expr::Pow(base, exponent) => Ok(base.eval()?.powf(exponent.eval()?)),
            Expr::Neg(inner) => Ok(-inner.eval()?),
            Expr::Call(func, arg) => {
                let value = arg.eval()?;
                Ok(match func {
                    Func::Sin => value.sin(),
                    Func::Cos => value.cos(),
                    Func::Tan => value.tan(),
                    Func::Exp => value.exp(),
                    Func::Ln => value.ln(),
                    Func::Sqrt => value.sqrt(),
                    Func::Floor => value.floor(),
                })
            }
        }
    }

    pub fn contains_symbol(&self, name: char) -> bool {
        match self {
            Expr::Num(_) => false,
            Expr::Sym(sym) => *sym == name,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => lhs.contains_symbol(name) || rhs.contains_symbol(name),
            Expr::Neg(inner) => inner.contains_symbol(name),
            Expr::Call(_, arg) => arg.contains_symbol(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::MathError;

    #[test]
    fn evaluates_arithmetic() {
        assert_eq!(parse("5 * 3").unwrap().eval().unwrap(), 15.0);
        assert_eq!(parse("2 / 4").unwrap().eval().unwrap(), 0.5);
    }

    #[test]
    fn evaluates_constants_and_functions() {
        let value = parse("cos(0) + sqrt(9)").unwrap().eval().unwrap();
        assert!((value - 4.0).abs() < 1e-9);
    }

    #[test]
    fn modulo_desugars_to_floor() {
        assert_eq!(parse("7 % 3").unwrap().eval().unwrap(), 1.0);
    }

    #[test]
    fn free_symbol_is_an_error() {
        let err = parse("x + 1").unwrap().eval().unwrap_err();
        assert!(matches!(err, MathError::UnboundSymbol('x')));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(parse("1 / 0").unwrap().eval().is_err());
    }
}
