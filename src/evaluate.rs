//! Expression-evaluator surface consumed by an external driver.
//!
//! A small recursive-descent parser over `+ − * / ^` (the latter
//! right-associative), unary `−`, parenthesized grouping, the constants
//! `pi`/`e`, and the function set `sqrt cbrt root ln log log10 exp sin
//! cos tan cot csc abs`. Grounded the same way a calculator REPL
//! composes a numeric backend — see
//! `other_examples/dbe012fd_ivan-saorin-folio-mcp__folio-core-src-number.rs.rs`,
//! which wraps exactly this kind of decimal core behind a thin
//! expression surface. Everything here composes [`BigDecimal`]
//! operations; no tokenizer UI, REPL loop, or CLI color output lives in
//! this crate.

use std::fmt;

use crate::bigdecimal::BigDecimal;
use crate::bigint::BigInt;
use crate::constants;
use crate::error::{DecimalError, DecimalResult};
use crate::rounding::RoundingPolicy;

/// Extra fractional digits carried through intermediate steps so that
/// rounding the final result to the caller's `precision` doesn't itself
/// accumulate error across several chained operations.
const GUARD_DIGITS: u32 = 10;

#[derive(Clone, PartialEq)]
enum Token {
    Num(BigDecimal),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
    End,
}

fn tokenize(expr: &str) -> DecimalResult<Vec<Token>> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b' ' | b'\t' | b'\n' | b'\r' => i += 1,
            b'+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            b'-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            b'*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            b'/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            b'^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            b'(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            b')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            b',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            b'0'..=b'9' | b'.' => {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if i < bytes.len() && bytes[i] == b'.' {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mark = i;
                    i += 1;
                    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
                        i += 1;
                    }
                    if i < bytes.len() && bytes[i].is_ascii_digit() {
                        while i < bytes.len() && bytes[i].is_ascii_digit() {
                            i += 1;
                        }
                    } else {
                        i = mark;
                    }
                }
                let literal = &expr[start..i];
                let value: BigDecimal = literal
                    .parse()
                    .map_err(|_| DecimalError::MalformedNumeric(literal.to_string()))?;
                tokens.push(Token::Num(value));
            }
            b'a'..=b'z' | b'A'..=b'Z' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                tokens.push(Token::Ident(expr[start..i].to_ascii_lowercase()));
            }
            other => {
                return Err(DecimalError::MalformedNumeric(format!(
                    "unexpected character '{}' in expression",
                    other as char
                )));
            }
        }
    }
    tokens.push(Token::End);
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Working precision for intermediate transcendental/division steps.
    wp: u32,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, t: &Token) -> DecimalResult<()> {
        if self.peek() == t {
            self.advance();
            Ok(())
        } else {
            Err(DecimalError::MalformedNumeric(format!(
                "expected {:?}, found {:?}",
                t,
                self.peek()
            )))
        }
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> DecimalResult<BigDecimal> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Token::Plus => {
                    self.advance();
                    lhs = lhs.add(&self.parse_term()?);
                }
                Token::Minus => {
                    self.advance();
                    lhs = lhs.sub(&self.parse_term()?);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    // term := power (('*' | '/') power)*
    fn parse_term(&mut self) -> DecimalResult<BigDecimal> {
        let mut lhs = self.parse_power()?;
        loop {
            match self.peek() {
                Token::Star => {
                    self.advance();
                    lhs = lhs.mul(&self.parse_power()?);
                }
                Token::Slash => {
                    self.advance();
                    let rhs = self.parse_power()?;
                    lhs = lhs.divide_with_policy(&rhs, self.wp, RoundingPolicy::HalfEven)?;
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    // power := unary ('^' power)?   (right-associative)
    fn parse_power(&mut self) -> DecimalResult<BigDecimal> {
        let base = self.parse_unary()?;
        if *self.peek() == Token::Caret {
            self.advance();
            let exponent = self.parse_power()?;
            return base.power(&exponent, self.wp);
        }
        Ok(base)
    }

    // unary := '-' unary | primary
    fn parse_unary(&mut self) -> DecimalResult<BigDecimal> {
        if *self.peek() == Token::Minus {
            self.advance();
            return Ok(self.parse_unary()?.neg());
        }
        if *self.peek() == Token::Plus {
            self.advance();
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_args(&mut self) -> DecimalResult<Vec<BigDecimal>> {
        self.expect(&Token::LParen)?;
        let mut args = vec![self.parse_expr()?];
        while *self.peek() == Token::Comma {
            self.advance();
            args.push(self.parse_expr()?);
        }
        self.expect(&Token::RParen)?;
        Ok(args)
    }

    // primary := NUMBER | IDENT ['(' args ')'] | '(' expr ')'
    fn parse_primary(&mut self) -> DecimalResult<BigDecimal> {
        match self.advance() {
            Token::Num(n) => Ok(n),
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => self.eval_ident(&name),
            other => Err(DecimalError::MalformedNumeric(format!(
                "unexpected token {:?}",
                other
            ))),
        }
    }

    fn eval_ident(&mut self, name: &str) -> DecimalResult<BigDecimal> {
        match name {
            "pi" => return Ok(constants::pi().round(self.wp as i32, RoundingPolicy::HalfEven)),
            "e" => return Ok(constants::e().round(self.wp as i32, RoundingPolicy::HalfEven)),
            _ => {}
        }
        if name == "root" {
            let args = self.parse_args()?;
            if args.len() != 2 {
                return Err(DecimalError::invalid("evaluate", "root(x, n) takes exactly two arguments"));
            }
            return nth_root(&args[0], &args[1], self.wp);
        }

        let args = self.parse_args()?;
        if args.len() != 1 {
            return Err(DecimalError::invalid("evaluate", format!("{} takes exactly one argument", name)));
        }
        let x = &args[0];
        match name {
            "sqrt" => x.sqrt(self.wp),
            "cbrt" => nth_root(x, &BigDecimal::from_i64(3), self.wp),
            "ln" => x.ln(self.wp),
            "log" | "log10" => {
                let numerator = x.ln(self.wp)?;
                numerator.divide_with_policy(&constants::ln10(), self.wp, RoundingPolicy::HalfEven)
            }
            "exp" => x.exp(self.wp),
            "sin" => sin(x, self.wp),
            "cos" => cos(x, self.wp),
            "tan" => {
                let s = sin(x, self.wp)?;
                let c = cos(x, self.wp)?;
                s.divide_with_policy(&c, self.wp, RoundingPolicy::HalfEven)
            }
            "cot" => {
                let s = sin(x, self.wp)?;
                let c = cos(x, self.wp)?;
                c.divide_with_policy(&s, self.wp, RoundingPolicy::HalfEven)
            }
            "csc" => {
                let s = sin(x, self.wp)?;
                BigDecimal::one().divide_with_policy(&s, self.wp, RoundingPolicy::HalfEven)
            }
            "abs" => Ok(x.abs()),
            other => Err(DecimalError::invalid("evaluate", format!("unknown identifier '{}'", other))),
        }
    }
}

/// `sin(x)` via the defining Taylor series on `x` reduced into
/// `[0, 2π)` first, so the series converges in a handful of terms
/// regardless of the caller's input magnitude.
fn sin(x: &BigDecimal, wp: u32) -> DecimalResult<BigDecimal> {
    let r = reduce_mod_2pi(x, wp)?;
    sin_taylor(&r, wp)
}

fn cos(x: &BigDecimal, wp: u32) -> DecimalResult<BigDecimal> {
    let r = reduce_mod_2pi(x, wp)?;
    cos_taylor(&r, wp)
}

fn reduce_mod_2pi(x: &BigDecimal, wp: u32) -> DecimalResult<BigDecimal> {
    let pi = constants::pi();
    let two_pi = pi.add(&pi);
    let quotient = x.divide_with_policy(&two_pi, 0, RoundingPolicy::Floor)?;
    Ok(x.sub(&quotient.mul(&two_pi)))
}

const TAYLOR_MAX_ITERS: i64 = 300;

fn sin_taylor(x: &BigDecimal, wp: u32) -> DecimalResult<BigDecimal> {
    let threshold = BigDecimal::new(BigInt::one(), wp as i32);
    let x2 = x.mul(x);
    let mut term = x.clone();
    let mut sum = x.clone();
    let mut k: i64 = 1;
    while k <= TAYLOR_MAX_ITERS {
        let denom = BigDecimal::from_i64((2 * k) * (2 * k + 1));
        term = term.mul(&x2).neg().divide_with_policy(&denom, wp, RoundingPolicy::HalfEven)?;
        sum = sum.add(&term);
        if term.abs() < threshold {
            break;
        }
        k += 1;
    }
    Ok(sum)
}

fn cos_taylor(x: &BigDecimal, wp: u32) -> DecimalResult<BigDecimal> {
    let threshold = BigDecimal::new(BigInt::one(), wp as i32);
    let x2 = x.mul(x);
    let mut term = BigDecimal::one();
    let mut sum = BigDecimal::one();
    let mut k: i64 = 1;
    while k <= TAYLOR_MAX_ITERS {
        let denom = BigDecimal::from_i64((2 * k - 1) * (2 * k));
        term = term.mul(&x2).neg().divide_with_policy(&denom, wp, RoundingPolicy::HalfEven)?;
        sum = sum.add(&term);
        if term.abs() < threshold {
            break;
        }
        k += 1;
    }
    Ok(sum)
}

/// Require `n` to already be an integer-valued `BigDecimal` (no
/// fractional remainder after truncation), returning that integer.
fn require_integer_index(n: &BigDecimal, op: &'static str) -> DecimalResult<i64> {
    let truncated = n.round(0, RoundingPolicy::Down);
    if truncated != *n {
        return Err(DecimalError::invalid(op, "index must be an integer"));
    }
    truncated
        .to_string()
        .parse::<i64>()
        .map_err(|_| DecimalError::domain(op, "index too large to evaluate"))
}

/// General `n`-th root via Newton's method: `y ← ((n−1)y + x/y^(n−1)) / n`.
/// `n` must be a nonzero integer; odd negative `n` is handled as the
/// reciprocal of the corresponding positive root.
fn nth_root(x: &BigDecimal, n: &BigDecimal, wp: u32) -> DecimalResult<BigDecimal> {
    const OP: &str = "root";
    let n_val = require_integer_index(n, OP)?;
    if n_val == 0 {
        return Err(DecimalError::domain(OP, "index must be nonzero"));
    }
    if x.is_zero() {
        return Ok(BigDecimal::new(BigInt::zero(), wp as i32));
    }
    let n_abs = n_val.unsigned_abs();
    if x.is_negative() && n_abs % 2 == 0 {
        return Err(DecimalError::domain(OP, "even root of a negative number"));
    }
    if n_abs == 1 {
        let result = x.clone();
        return if n_val < 0 { BigDecimal::one().divide_with_policy(&result, wp, RoundingPolicy::HalfEven) } else { Ok(result) };
    }

    let negative_result = x.is_negative();
    let magnitude = x.abs();
    let seed: f64 = magnitude.to_string().parse().unwrap_or(1.0);
    let seed_root = seed.powf(1.0 / n_abs as f64).max(1e-12);
    let mut y: BigDecimal = format!("{:.12}", seed_root)
        .parse()
        .unwrap_or_else(|_| BigDecimal::one());
    y = y.round(wp as i32, RoundingPolicy::HalfEven);

    let n_dec = BigDecimal::from_i64(n_abs as i64);
    let n_minus_1 = BigDecimal::from_i64(n_abs as i64 - 1);
    let mut prev: Option<BigDecimal> = None;
    for _ in 0..100 {
        let y_pow = y.power(&n_minus_1, wp)?;
        let term = magnitude.divide_with_policy(&y_pow, wp, RoundingPolicy::HalfEven)?;
        let next = n_minus_1
            .mul(&y)
            .add(&term)
            .divide_with_policy(&n_dec, wp, RoundingPolicy::HalfEven)?;
        if let Some(p) = &prev {
            if *p == next {
                y = next;
                break;
            }
        }
        prev = Some(y);
        y = next;
    }

    let mut result = if negative_result { y.neg() } else { y };
    if n_val < 0 {
        result = BigDecimal::one().divide_with_policy(&result, wp, RoundingPolicy::HalfEven)?;
    }
    Ok(result)
}

/// Parse and evaluate a single arithmetic expression, returning the
/// result rounded to `precision` fractional digits under `HALF_EVEN`.
/// Intermediate division/transcendental steps carry [`GUARD_DIGITS`]
/// extra digits of working precision so that chained operations don't
/// compound rounding error into the final figure.
pub fn evaluate(expression: &str, precision: u32) -> DecimalResult<BigDecimal> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0, wp: precision + GUARD_DIGITS };
    let result = parser.parse_expr()?;
    if *parser.peek() != Token::End {
        return Err(DecimalError::MalformedNumeric(format!(
            "trailing input at token {:?}",
            parser.peek()
        )));
    }
    Ok(result.round(precision as i32, RoundingPolicy::HalfEven))
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "Num({})", n),
            Token::Ident(s) => write!(f, "Ident({})", s),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Caret => write!(f, "'^'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::End => write!(f, "<end>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_arithmetic_precedence() {
        let r = evaluate("2 + 3 * 4", 10).unwrap();
        assert_eq!(r, "14".parse().unwrap());
    }

    #[test]
    fn caret_is_right_associative() {
        // 2^3^2 = 2^(3^2) = 2^9 = 512, not (2^3)^2 = 64.
        let r = evaluate("2^3^2", 10).unwrap();
        assert_eq!(r, "512".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn unary_minus_and_parens() {
        let r = evaluate("-(3 + 4) * 2", 10).unwrap();
        assert_eq!(r, "-14".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn spec_divide_scenario() {
        let r = evaluate("100 * 12 - 23/17", 50).unwrap();
        assert_eq!(r.to_string(), "1198.64705882352941176470588235294117647058823529411765");
    }

    #[test]
    fn sqrt_and_power() {
        let r = evaluate("sqrt(9) + 2^10", 10).unwrap();
        assert_eq!(r, "1027".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn root_two_args() {
        let r = evaluate("root(27, 3)", 10).unwrap();
        assert_eq!(r, "3".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn cbrt_negative() {
        let r = evaluate("cbrt(-8)", 10).unwrap();
        assert_eq!(r, "-2".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn trig_identity_sin_squared_plus_cos_squared() {
        let r = evaluate("sin(1) * sin(1) + cos(1) * cos(1)", 20).unwrap();
        assert_eq!(r.round(15, RoundingPolicy::HalfEven), BigDecimal::one().round(15, RoundingPolicy::HalfEven));
    }

    #[test]
    fn log10_of_known_power() {
        let r = evaluate("log10(1000)", 10).unwrap();
        assert_eq!(r.round(5, RoundingPolicy::HalfEven), "3".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn constants_pi_and_e() {
        let r = evaluate("pi", 10).unwrap();
        assert_eq!(r.to_string(), "3.1415926536");
    }

    #[test]
    fn division_by_zero_errors() {
        assert!(evaluate("1 / 0", 10).is_err());
    }

    #[test]
    fn malformed_expression_errors() {
        assert!(evaluate("1 + * 2", 10).is_err());
        assert!(evaluate("(1 + 2", 10).is_err());
    }

    #[test]
    fn abs_of_negative() {
        let r = evaluate("abs(-5.5)", 10).unwrap();
        assert_eq!(r, "5.5".parse::<BigDecimal>().unwrap());
    }
}
