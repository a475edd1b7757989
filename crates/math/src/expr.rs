use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
    Floor,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Exp => "exp",
            Func::Ln => "ln",
            Func::Sqrt => "sqrt",
            Func::Floor => "floor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "exp" => Some(Func::Exp),
            "ln" | "log" => Some(Func::Ln),
            "sqrt" => Some(Func::Sqrt),
            "floor" => Some(Func::Floor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Sym(char),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    pub fn num(value: f64) -> Expr {
        Expr::Num(value)
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Add(Box::new(lhs), Box::new(rhs))
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Sub(Box::new(lhs), Box::new(rhs))
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Mul(Box::new(lhs), Box::new(rhs))
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Div(Box::new(lhs), Box::new(rhs))
    }

    pub fn pow(base: Expr, exponent: Expr) -> Expr {
        Expr::Pow(Box::new(base), Box::new(exponent))
    }

    pub fn call(func: Func, arg: Expr) -> Expr {
        Expr::Call(func, Box::new(arg))
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Expr::Num(value) => Some(*value),
            _ => None,
        }
    }

    /// Constant folding plus the obvious identities (`x + 0`, `1 * x`,
    /// `x ^ 1`, double negation). Enough to keep derivative output readable;
    /// not a full canonicalizer.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Num(_) | Expr::Sym(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (lhs.as_num(), rhs.as_num()) {
                    (Some(a), Some(b)) => Expr::Num(a + b),
                    (Some(a), None) if a == 0.0 => rhs,
                    (None, Some(b)) if b == 0.0 => lhs,
                    _ => Expr::add(lhs, rhs),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (lhs.as_num(), rhs.as_num()) {
                    (Some(a), Some(b)) => Expr::Num(a - b),
                    (None, Some(b)) if b == 0.0 => lhs,
                    (Some(a), None) if a == 0.0 => Expr::Neg(Box::new(rhs)),
                    _ => Expr::sub(lhs, rhs),
                }
            }
            Expr::Mul(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (lhs.as_num(), rhs.as_num()) {
                    (Some(a), Some(b)) => Expr::Num(a * b),
                    (Some(a), None) if a == 0.0 => Expr::Num(0.0),
                    (None, Some(b)) if b == 0.0 => Expr::Num(0.0),
                    (Some(a), None) if a == 1.0 => rhs,
                    (None, Some(b)) if b == 1.0 => lhs,
                    _ => Expr::mul(lhs, rhs),
                }
            }
            Expr::Div(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (lhs.as_num(), rhs.as_num()) {
                    (Some(a), Some(b)) if b != 0.0 => Expr::Num(a / b),
                    (Some(a), None) if a == 0.0 => Expr::Num(0.0),
                    (None, Some(b)) if b == 1.0 => lhs,
                    _ => Expr::div(lhs, rhs),
                }
            }
            Expr::Pow(base, exponent) => {
                let (base, exponent) = (base.simplify(), exponent.simplify());
                match (base.as_num(), exponent.as_num()) {
                    (Some(a), Some(b)) => Expr::Num(a.powf(b)),
                    (None, Some(b)) if b == 1.0 => base,
                    (None, Some(b)) if b == 0.0 => Expr::Num(1.0),
                    _ => Expr::pow(base, exponent),
                }
            }
            Expr::Neg(inner) => {
                let inner = inner.simplify();
                match inner {
                    Expr::Num(value) => Expr::Num(-value),
                    Expr::Neg(unwrapped) => *unwrapped,
                    other => Expr::Neg(Box::new(other)),
                }
            }
            Expr::Call(func, arg) => Expr::call(*func, arg.simplify()),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(..) => 3,
            Expr::Pow(..) => 4,
            Expr::Num(_) | Expr::Sym(_) | Expr::Call(..) => 5,
        }
    }

    fn fmt_child(&self, child: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if child.precedence() < self.precedence() {
            write!(f, "({child})")
        } else {
            write!(f, "{child}")
        }
    }

    /// Right operands of `-` and `/` need parens at equal precedence too:
    /// `x - (y + z)` is not `x - y + z`.
    fn fmt_right_strict(&self, child: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if child.precedence() <= self.precedence() {
            write!(f, "({child})")
        } else {
            write!(f, "{child}")
        }
    }
}

/// Format a numeric result the way a person would say it: integers without a
/// trailing ".0", everything else rounded to a sane precision.
pub fn format_number(value: f64) -> String {
    if value.is_nan() || value.is_infinite() {
        return value.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let rounded = format!("{value:.6}");
    rounded.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(value) => write!(f, "{}", format_number(*value)),
            Expr::Sym(name) => write!(f, "{name}"),
            Expr::Add(lhs, rhs) => {
                self.fmt_child(lhs, f)?;
                write!(f, " + ")?;
                self.fmt_child(rhs, f)
            }
            Expr::Sub(lhs, rhs) => {
                self.fmt_child(lhs, f)?;
                write!(f, " - ")?;
                self.fmt_right_strict(rhs, f)
            }
            Expr::Mul(lhs, rhs) => {
                self.fmt_child(lhs, f)?;
                write!(f, "*")?;
                self.fmt_child(rhs, f)
            }
            Expr::Div(lhs, rhs) => {
                self.fmt_child(lhs, f)?;
                write!(f, "/")?;
                self.fmt_right_strict(rhs, f)
            }
            Expr::Pow(base, exponent) => {
                self.fmt_child(base, f)?;
                write!(f, "^")?;
                // Right operand of ^ binds tighter in print form.
                if exponent.precedence() <= self.precedence() {
                    write!(f, "({exponent})")
                } else {
                    write!(f, "{exponent}")
                }
            }
            Expr::Neg(inner) => {
                write!(f, "-")?;
                self.fmt_child(inner, f)
            }
            Expr::Call(func, arg) => write!(f, "{}({arg})", func.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplify_folds_constants() {
        let expr = Expr::add(Expr::num(2.0), Expr::mul(Expr::num(3.0), Expr::num(4.0)));
        assert_eq!(expr.simplify(), Expr::Num(14.0));
    }

    #[test]
    fn simplify_drops_identities() {
        let expr = Expr::mul(Expr::num(1.0), Expr::pow(Expr::Sym('x'), Expr::num(1.0)));
        assert_eq!(expr.simplify(), Expr::Sym('x'));
    }

    #[test]
    fn display_uses_minimal_parens() {
        let expr = Expr::mul(
            Expr::add(Expr::Sym('x'), Expr::num(1.0)),
            Expr::num(2.0),
        );
        assert_eq!(expr.to_string(), "(x + 1)*2");
    }

    #[test]
    fn numbers_format_without_trailing_zeroes() {
        assert_eq!(format_number(15.0), "15");
        assert_eq!(format_number(0.5), "0.5");
    }
}
