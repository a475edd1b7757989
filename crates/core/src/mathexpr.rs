use once_cell::sync::Lazy;
use regex::Regex;

/// Which math handler the remainder is destined for. Calculus covers the
/// derivative and integral handlers; Solve has its own small grammar via
/// [`parse_equation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathPath {
    Calculus,
    Arithmetic,
}

/// Text following the last filler connective ("of"/"for") is the payload:
/// "derivative of x^2" carries "x^2", "find it for x + 1" carries "x + 1".
static TRAILING_CONNECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^.*\b(?:of|for)\b\s*(.+)$").expect("valid connective regex"));

static SOLVE_FOR_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfor\s+([a-zA-Z])\b").expect("valid solve-for regex"));

/// Normalize an informal spoken/typed expression into evaluator syntax.
///
/// Spoken power forms are rewritten to `^` before the connective strip so the
/// "of" in "to the power of" cannot swallow the head of the expression.
pub fn extract(remainder: &str, path: MathPath) -> String {
    let mut expr = spell_out_powers(remainder.trim());

    if let Some(captures) = TRAILING_CONNECTIVE.captures(&expr) {
        expr = captures[1].trim().to_string();
    }

    expr = normalize_glyphs(&expr);

    if path == MathPath::Arithmetic {
        expr = spell_out_operators(&expr);
    }

    expr.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when alphabetic residue survives normalization, ignoring the
/// constants `pi` and `e`. Residue means an unbound symbol the local
/// evaluator cannot resolve, so the arithmetic handler defers to the remote
/// evaluation service instead.
pub fn has_symbolic_residue(expr: &str) -> bool {
    expr.replace("pi", "")
        .replace('e', "")
        .chars()
        .any(|c| c.is_ascii_alphabetic())
}

/// An equation ready for the solver: both sides normalized, plus the variable
/// of interest. Without an explicit "for <letter>" clause the variable
/// defaults to `x`; without an `=` the remainder is treated as
/// `expression = 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub lhs: String,
    pub rhs: String,
    pub variable: char,
}

pub fn parse_equation(remainder: &str) -> Equation {
    let variable = SOLVE_FOR_CLAUSE
        .captures(remainder)
        .and_then(|captures| captures[1].chars().next())
        .map(|c| c.to_ascii_lowercase())
        .unwrap_or('x');

    let cleaned = SOLVE_FOR_CLAUSE.replace(remainder, " ");
    let cleaned = normalize_glyphs(&spell_out_powers(cleaned.trim()));

    let (lhs, rhs) = match cleaned.split_once('=') {
        Some((left, right)) => (left.trim().to_string(), right.trim().to_string()),
        None => (cleaned.trim().to_string(), "0".to_string()),
    };

    Equation { lhs, rhs, variable }
}

fn spell_out_powers(expr: &str) -> String {
    expr.replace("to the power of", "^")
        .replace("to the power", "^")
        .replace("power of", "^")
}

fn normalize_glyphs(expr: &str) -> String {
    expr.replace('×', "*").replace('÷', "/")
}

/// Spoken operator words, replaced case-sensitively. "divided by" goes first
/// so its "divided" never survives as residue.
fn spell_out_operators(expr: &str) -> String {
    expr.replace("divided by", "/")
        .replace("times", "*")
        .replace("plus", "+")
        .replace("minus", "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spoken_multiplication() {
        assert_eq!(extract("5 times 3", MathPath::Arithmetic), "5 * 3");
    }

    #[test]
    fn unicode_division_glyph() {
        assert_eq!(extract("2 ÷ 4", MathPath::Arithmetic), "2 / 4");
    }

    #[test]
    fn trailing_connective_keeps_payload() {
        assert_eq!(extract("of x^2 + 1", MathPath::Calculus), "x^2 + 1");
        assert_eq!(
            extract("the area for 2 * pi", MathPath::Calculus),
            "2 * pi"
        );
    }

    #[test]
    fn spoken_power_becomes_caret_before_connective_strip() {
        assert_eq!(extract("x to the power of 2", MathPath::Calculus), "x ^ 2");
    }

    #[test]
    fn residue_guard_trips_on_free_symbols() {
        assert!(has_symbolic_residue("x + y"));
        assert!(!has_symbolic_residue("5 * 3"));
        assert!(!has_symbolic_residue("2 * pi + e"));
    }

    #[test]
    fn equation_defaults_to_x_equals_zero_form() {
        let equation = parse_equation("x^2 - 9");
        assert_eq!(equation.lhs, "x^2 - 9");
        assert_eq!(equation.rhs, "0");
        assert_eq!(equation.variable, 'x');
    }

    #[test]
    fn equation_with_explicit_sides_and_variable() {
        let equation = parse_equation("2*a + 1 = 7 for a");
        assert_eq!(equation.lhs, "2*a + 1");
        assert_eq!(equation.rhs, "7");
        assert_eq!(equation.variable, 'a');
    }
}
