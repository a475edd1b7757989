use crate::expr::{Expr, Func};
use crate::MathError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    LParen,
    RParen,
}

fn lex(input: &str) -> Result<Vec<Token>, MathError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                // Accept ** as an alternative power spelling.
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Caret);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| MathError::Parse(format!("bad number literal '{literal}'")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphabetic() {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(MathError::Parse(format!("unexpected character '{other}'")));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Expr, MathError> {
        let mut lhs = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                lhs = Expr::add(lhs, self.term()?);
            } else if self.eat(&Token::Minus) {
                lhs = Expr::sub(lhs, self.term()?);
            } else {
                return Ok(lhs);
            }
        }
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<Expr, MathError> {
        let mut lhs = self.unary()?;
        loop {
            if self.eat(&Token::Star) {
                lhs = Expr::mul(lhs, self.unary()?);
            } else if self.eat(&Token::Slash) {
                lhs = Expr::div(lhs, self.unary()?);
            } else if self.eat(&Token::Percent) {
                // Modulo only makes sense on evaluated numbers; represent it
                // as a call-free form the evaluator handles directly.
                let rhs = self.unary()?;
                lhs = Expr::sub(
                    lhs.clone(),
                    Expr::mul(
                        rhs.clone(),
                        Expr::call(Func::Floor, Expr::div(lhs, rhs)),
                    ),
                );
            } else {
                return Ok(lhs);
            }
        }
    }

    // unary := '-' unary | power
    fn unary(&mut self) -> Result<Expr, MathError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.power()
    }

    // power := atom ('^' unary)?   (right associative)
    fn power(&mut self) -> Result<Expr, MathError> {
        let base = self.atom()?;
        if self.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return Ok(Expr::pow(base, exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, MathError> {
        match self.bump() {
            Some(Token::Number(value)) => Ok(Expr::Num(value)),
            Some(Token::Ident(ident)) => self.ident(ident),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(MathError::Parse("missing closing parenthesis".to_string()));
                }
                Ok(inner)
            }
            Some(token) => Err(MathError::Parse(format!("unexpected token {token:?}"))),
            None => Err(MathError::Parse("expression ended unexpectedly".to_string())),
        }
    }

    fn ident(&mut self, ident: String) -> Result<Expr, MathError> {
        if let Some(func) = Func::from_name(&ident) {
            if !self.eat(&Token::LParen) {
                return Err(MathError::Parse(format!(
                    "function '{ident}' needs a parenthesized argument"
                )));
            }
            let arg = self.expr()?;
            if !self.eat(&Token::RParen) {
                return Err(MathError::Parse("missing closing parenthesis".to_string()));
            }
            return Ok(Expr::call(func, arg));
        }

        match ident.as_str() {
            "pi" => Ok(Expr::Num(std::f64::consts::PI)),
            "e" => Ok(Expr::Num(std::f64::consts::E)),
            single if single.chars().count() == 1 => {
                Ok(Expr::Sym(single.chars().next().unwrap_or('x')))
            }
            other => Err(MathError::Parse(format!("unknown name '{other}'"))),
        }
    }
}

/// Parse evaluator syntax (the output of the expression extractor) into an
/// AST. Multi-letter names must be known functions or constants; single
/// letters are free symbols.
pub fn parse(input: &str) -> Result<Expr, MathError> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return Err(MathError::Parse("empty expression".to_string()));
    }

    let mut parser = Parser {
        tokens,
        position: 0,
    };
    let expr = parser.expr()?;

    if parser.position != parser.tokens.len() {
        return Err(MathError::Parse("trailing input after expression".to_string()));
    }

    Ok(expr)
}
