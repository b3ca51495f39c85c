//! Restricted literal evaluator.
//!
//! Accepts the subset of Python literal syntax that legitimately shows up as
//! a C constant value: numeric literals, arithmetic on them, and tuples.
//! Nothing here can name, call, or import anything.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Maximum parenthesis/unary nesting accepted by the parser.
const MAX_DEPTH: usize = 64;

/// A value produced by evaluating a literal expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Tuple(Vec<Literal>),
}

impl Literal {
    fn kind(&self) -> &'static str {
        match self {
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Tuple(_) => "tuple",
        }
    }
}

impl fmt::Display for Literal {
    /// Render as a Python literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", format_float(*v)),
            Literal::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Format a finite float so that it reads back as a Python float.
///
/// `Debug` always keeps a decimal point or an exponent (`100.0`, `1e20`),
/// both of which Python accepts.
pub fn format_float(v: f64) -> String {
    format!("{:?}", v)
}

/// Reasons a token is not an acceptable literal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiteralError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character `{ch}` at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid numeric literal `{0}`")]
    InvalidNumber(String),

    #[error("integer overflow")]
    Overflow,

    #[error("result is not a finite number")]
    NonFinite,

    #[error("division by zero")]
    DivisionByZero,

    #[error("negative shift count")]
    NegativeShift,

    #[error("unsupported operand type(s) for {op}: {lhs} and {rhs}")]
    Operands {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("bad operand type for unary {op}: {operand}")]
    UnaryOperand {
        op: &'static str,
        operand: &'static str,
    },

    #[error("expression nested too deeply")]
    TooDeep,
}

/// Evaluate `src` under the restricted grammar.
pub fn evaluate(src: &str) -> Result<Literal, LiteralError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(LiteralError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expression_list()?;
    match parser.peek() {
        None => Ok(value),
        Some(tok) => Err(LiteralError::UnexpectedToken(tok.describe())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Shl,
    Shr,
    Amp,
    Pipe,
    Caret,
    Tilde,
}

impl Op {
    fn symbol(self) -> &'static str {
        match self {
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Star => "*",
            Op::Slash => "/",
            Op::DoubleSlash => "//",
            Op::Percent => "%",
            Op::Shl => "<<",
            Op::Shr => ">>",
            Op::Amp => "&",
            Op::Pipe => "|",
            Op::Caret => "^",
            Op::Tilde => "~",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Op(Op),
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Int(v) => format!("number `{}`", v),
            Token::Float(v) => format!("number `{}`", v),
            Token::Op(op) => format!("operator `{}`", op.symbol()),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Comma => "`,`".to_string(),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>, LiteralError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let rest = &bytes[i..];

        let (token, width) = match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'0'..=b'9' => lex_number(src, i)?,
            b'.' if bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => lex_number(src, i)?,
            b'(' => (Token::LParen, 1),
            b')' => (Token::RParen, 1),
            b',' => (Token::Comma, 1),
            b'+' => (Token::Op(Op::Plus), 1),
            b'-' => (Token::Op(Op::Minus), 1),
            b'*' => (Token::Op(Op::Star), 1),
            b'/' if rest.starts_with(b"//") => (Token::Op(Op::DoubleSlash), 2),
            b'/' => (Token::Op(Op::Slash), 1),
            b'%' => (Token::Op(Op::Percent), 1),
            b'<' if rest.starts_with(b"<<") => (Token::Op(Op::Shl), 2),
            b'>' if rest.starts_with(b">>") => (Token::Op(Op::Shr), 2),
            b'&' => (Token::Op(Op::Amp), 1),
            b'|' => (Token::Op(Op::Pipe), 1),
            b'^' => (Token::Op(Op::Caret), 1),
            b'~' => (Token::Op(Op::Tilde), 1),
            _ => {
                let ch = src[i..].chars().next().unwrap_or('\u{fffd}');
                return Err(LiteralError::UnexpectedChar { ch, offset: i });
            }
        };

        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

/// Lex one numeric literal starting at `start`, returning the token and its byte width.
fn lex_number(src: &str, start: usize) -> Result<(Token, usize), LiteralError> {
    let bytes = src.as_bytes();
    let mut end = start;

    let radix = match bytes.get(start..start + 2) {
        Some([b'0', b'x' | b'X']) => Some(16),
        Some([b'0', b'o' | b'O']) => Some(8),
        Some([b'0', b'b' | b'B']) => Some(2),
        _ => None,
    };

    let token = if let Some(radix) = radix {
        end += 2;
        while end < bytes.len() && (bytes[end] as char).is_digit(radix) {
            end += 1;
        }
        let digits = &src[start + 2..end];
        if digits.is_empty() {
            return Err(LiteralError::InvalidNumber(src[start..end].to_string()));
        }
        let value = i64::from_str_radix(digits, radix).map_err(|_| LiteralError::Overflow)?;
        Token::Int(value)
    } else {
        let mut is_float = false;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end < bytes.len() && bytes[end] == b'.' {
            is_float = true;
            end += 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
        if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
            let mut exp = end + 1;
            if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
                exp += 1;
            }
            let digits_start = exp;
            while exp < bytes.len() && bytes[exp].is_ascii_digit() {
                exp += 1;
            }
            if exp == digits_start {
                return Err(LiteralError::InvalidNumber(src[start..exp].to_string()));
            }
            is_float = true;
            end = exp;
        }

        let text = &src[start..end];
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| LiteralError::InvalidNumber(text.to_string()))?;
            if !value.is_finite() {
                return Err(LiteralError::NonFinite);
            }
            Token::Float(value)
        } else {
            // Python rejects `010`; C would read it as octal, so refusing is the safe reading.
            if text.len() > 1 && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
                return Err(LiteralError::InvalidNumber(text.to_string()));
            }
            Token::Int(text.parse().map_err(|_| LiteralError::Overflow)?)
        }
    };

    // Suffixes such as `10u` or `1.0f` are C, not Python.
    if end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
        let mut bad_end = end;
        while bad_end < bytes.len()
            && (bytes[bad_end].is_ascii_alphanumeric() || bytes[bad_end] == b'_')
        {
            bad_end += 1;
        }
        return Err(LiteralError::InvalidNumber(src[start..bad_end].to_string()));
    }

    Ok((token, end - start))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat_op(&mut self, ops: &[Op]) -> Option<Op> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn enter(&mut self) -> Result<(), LiteralError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(LiteralError::TooDeep);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// `expr (',' expr)* [',']`; a comma anywhere makes the result a tuple.
    fn expression_list(&mut self) -> Result<Literal, LiteralError> {
        let first = self.or_expr()?;
        if self.peek() != Some(&Token::Comma) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            if matches!(self.peek(), None | Some(Token::RParen)) {
                break;
            }
            items.push(self.or_expr()?);
        }
        Ok(Literal::Tuple(items))
    }

    fn or_expr(&mut self) -> Result<Literal, LiteralError> {
        let mut lhs = self.xor_expr()?;
        while let Some(op) = self.eat_op(&[Op::Pipe]) {
            let rhs = self.xor_expr()?;
            lhs = binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn xor_expr(&mut self) -> Result<Literal, LiteralError> {
        let mut lhs = self.and_expr()?;
        while let Some(op) = self.eat_op(&[Op::Caret]) {
            let rhs = self.and_expr()?;
            lhs = binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Literal, LiteralError> {
        let mut lhs = self.shift_expr()?;
        while let Some(op) = self.eat_op(&[Op::Amp]) {
            let rhs = self.shift_expr()?;
            lhs = binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn shift_expr(&mut self) -> Result<Literal, LiteralError> {
        let mut lhs = self.arith_expr()?;
        while let Some(op) = self.eat_op(&[Op::Shl, Op::Shr]) {
            let rhs = self.arith_expr()?;
            lhs = binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn arith_expr(&mut self) -> Result<Literal, LiteralError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.eat_op(&[Op::Plus, Op::Minus]) {
            let rhs = self.term()?;
            lhs = binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Literal, LiteralError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.eat_op(&[Op::Star, Op::Slash, Op::DoubleSlash, Op::Percent]) {
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Literal, LiteralError> {
        if let Some(op) = self.eat_op(&[Op::Minus, Op::Plus, Op::Tilde]) {
            self.enter()?;
            let operand = self.unary();
            self.leave();
            return unary(op, operand?);
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Literal, LiteralError> {
        match self.next() {
            Some(Token::Int(v)) => Ok(Literal::Int(v)),
            Some(Token::Float(v)) => Ok(Literal::Float(v)),
            Some(Token::LParen) => {
                if self.peek() == Some(&Token::RParen) {
                    self.pos += 1;
                    return Ok(Literal::Tuple(Vec::new()));
                }
                self.enter()?;
                let inner = self.expression_list();
                self.leave();
                let inner = inner?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(tok) => Err(LiteralError::UnexpectedToken(tok.describe())),
                    None => Err(LiteralError::UnexpectedEnd),
                }
            }
            Some(tok) => Err(LiteralError::UnexpectedToken(tok.describe())),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }
}

fn unary(op: Op, operand: Literal) -> Result<Literal, LiteralError> {
    match (op, operand) {
        (Op::Plus, v @ (Literal::Int(_) | Literal::Float(_))) => Ok(v),
        (Op::Minus, Literal::Int(v)) => v.checked_neg().map(Literal::Int).ok_or(LiteralError::Overflow),
        (Op::Minus, Literal::Float(v)) => Ok(Literal::Float(-v)),
        (Op::Tilde, Literal::Int(v)) => Ok(Literal::Int(!v)),
        (op, operand) => Err(LiteralError::UnaryOperand {
            op: op.symbol(),
            operand: operand.kind(),
        }),
    }
}

fn binary(op: Op, lhs: Literal, rhs: Literal) -> Result<Literal, LiteralError> {
    match (&lhs, &rhs) {
        (Literal::Int(a), Literal::Int(b)) => int_binary(op, *a, *b),
        (Literal::Int(_) | Literal::Float(_), Literal::Int(_) | Literal::Float(_))
            if is_arithmetic(op) =>
        {
            float_binary(op, as_f64(&lhs), as_f64(&rhs))
        }
        _ => Err(LiteralError::Operands {
            op: op.symbol(),
            lhs: lhs.kind(),
            rhs: rhs.kind(),
        }),
    }
}

fn is_arithmetic(op: Op) -> bool {
    matches!(
        op,
        Op::Plus | Op::Minus | Op::Star | Op::Slash | Op::DoubleSlash | Op::Percent
    )
}

fn as_f64(v: &Literal) -> f64 {
    match v {
        Literal::Int(i) => *i as f64,
        Literal::Float(f) => *f,
        Literal::Tuple(_) => f64::NAN,
    }
}

fn int_binary(op: Op, a: i64, b: i64) -> Result<Literal, LiteralError> {
    let value = match op {
        Op::Plus => a.checked_add(b),
        Op::Minus => a.checked_sub(b),
        Op::Star => a.checked_mul(b),
        Op::Slash => {
            if b == 0 {
                return Err(LiteralError::DivisionByZero);
            }
            return float_binary(Op::Slash, a as f64, b as f64);
        }
        Op::DoubleSlash => {
            if b == 0 {
                return Err(LiteralError::DivisionByZero);
            }
            a.checked_div(b).map(|q| {
                if (a % b != 0) && ((a < 0) != (b < 0)) {
                    q - 1
                } else {
                    q
                }
            })
        }
        Op::Percent => {
            if b == 0 {
                return Err(LiteralError::DivisionByZero);
            }
            a.checked_rem(b).map(|r| if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r })
        }
        Op::Shl => {
            if b < 0 {
                return Err(LiteralError::NegativeShift);
            }
            if a == 0 {
                Some(0)
            } else if b >= 63 {
                None
            } else {
                a.checked_mul(1i64 << b)
            }
        }
        Op::Shr => {
            if b < 0 {
                return Err(LiteralError::NegativeShift);
            }
            Some(if b >= 64 {
                if a < 0 {
                    -1
                } else {
                    0
                }
            } else {
                a >> b
            })
        }
        Op::Amp => Some(a & b),
        Op::Pipe => Some(a | b),
        Op::Caret => Some(a ^ b),
        Op::Tilde => {
            return Err(LiteralError::Operands {
                op: "~",
                lhs: "int",
                rhs: "int",
            })
        }
    };
    value.map(Literal::Int).ok_or(LiteralError::Overflow)
}

fn float_binary(op: Op, a: f64, b: f64) -> Result<Literal, LiteralError> {
    let value = match op {
        Op::Plus => a + b,
        Op::Minus => a - b,
        Op::Star => a * b,
        Op::Slash | Op::DoubleSlash | Op::Percent if b == 0.0 => {
            return Err(LiteralError::DivisionByZero)
        }
        Op::Slash => a / b,
        Op::DoubleSlash => (a / b).floor(),
        Op::Percent => {
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                r + b
            } else {
                r
            }
        }
        _ => {
            return Err(LiteralError::Operands {
                op: op.symbol(),
                lhs: "float",
                rhs: "float",
            })
        }
    };

    if value.is_finite() {
        Ok(Literal::Float(value))
    } else {
        Err(LiteralError::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str) -> Literal {
        evaluate(src).unwrap()
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(eval("42"), Literal::Int(42));
        assert_eq!(eval("0x1F"), Literal::Int(31));
        assert_eq!(eval("0o17"), Literal::Int(15));
        assert_eq!(eval("0b101"), Literal::Int(5));
        assert_eq!(eval("2.5"), Literal::Float(2.5));
        assert_eq!(eval(".5"), Literal::Float(0.5));
        assert_eq!(eval("1e3"), Literal::Float(1000.0));
        assert_eq!(eval("0"), Literal::Int(0));
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        assert_eq!(eval("(16 * 1024 * 1024)"), Literal::Int(16 * 1024 * 1024));
        assert_eq!(eval("1 + 2 * 3"), Literal::Int(7));
        assert_eq!(eval("(1 + 2) * 3"), Literal::Int(9));
        assert_eq!(eval("1 << 4 | 1"), Literal::Int(17));
        assert_eq!(eval("-2 * 3"), Literal::Int(-6));
        assert_eq!(eval("~0"), Literal::Int(-1));
        assert_eq!(eval("6 ^ 3 & 1"), Literal::Int(7));
    }

    #[test]
    fn test_division_semantics() {
        assert_eq!(eval("7 / 2"), Literal::Float(3.5));
        assert_eq!(eval("8 / 4"), Literal::Float(2.0));
        assert_eq!(eval("7 // 2"), Literal::Int(3));
        assert_eq!(eval("-7 // 2"), Literal::Int(-4));
        assert_eq!(eval("-7 % 3"), Literal::Int(2));
        assert_eq!(eval("7 % -3"), Literal::Int(-2));
        assert_eq!(eval("1.5 * 2"), Literal::Float(3.0));
    }

    #[test]
    fn test_tuples() {
        assert_eq!(
            eval("1,2"),
            Literal::Tuple(vec![Literal::Int(1), Literal::Int(2)])
        );
        assert_eq!(
            eval("(1.0, 0.5, 0)"),
            Literal::Tuple(vec![
                Literal::Float(1.0),
                Literal::Float(0.5),
                Literal::Int(0)
            ])
        );
        assert_eq!(eval("(3,)"), Literal::Tuple(vec![Literal::Int(3)]));
        assert_eq!(eval("()"), Literal::Tuple(vec![]));
        assert_eq!(eval("(7)"), Literal::Int(7));
    }

    #[test]
    fn test_rejects_non_literals() {
        assert!(matches!(
            evaluate("VKY_OTHER"),
            Err(LiteralError::UnexpectedChar { ch: 'V', .. })
        ));
        assert!(evaluate("__import__('os')").is_err());
        assert!(evaluate("'text'").is_err());
        assert!(evaluate("1.5f").is_err());
        assert!(evaluate("10u").is_err());
        assert!(evaluate("010").is_err());
        assert_eq!(evaluate(""), Err(LiteralError::Empty));
        assert_eq!(evaluate("   "), Err(LiteralError::Empty));
        assert_eq!(evaluate("(1"), Err(LiteralError::UnexpectedEnd));
        assert!(evaluate("1 2").is_err());
    }

    #[test]
    fn test_evaluation_errors() {
        assert_eq!(evaluate("1 / 0"), Err(LiteralError::DivisionByZero));
        assert_eq!(evaluate("1 % 0"), Err(LiteralError::DivisionByZero));
        assert_eq!(evaluate("1 << 70"), Err(LiteralError::Overflow));
        assert_eq!(evaluate("1 << -1"), Err(LiteralError::NegativeShift));
        assert_eq!(
            evaluate("99999999999999999999"),
            Err(LiteralError::Overflow)
        );
        assert_eq!(evaluate("1e308 * 10"), Err(LiteralError::NonFinite));
        assert!(matches!(
            evaluate("(1, 2) + 1"),
            Err(LiteralError::Operands { op: "+", .. })
        ));
        assert!(matches!(
            evaluate("1.5 << 1"),
            Err(LiteralError::Operands { op: "<<", .. })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(evaluate(&deep), Err(LiteralError::TooDeep));

        let minus = format!("{}1", "-".repeat(200));
        assert_eq!(evaluate(&minus), Err(LiteralError::TooDeep));
    }

    #[test]
    fn test_display_as_python() {
        assert_eq!(eval("128").to_string(), "128");
        assert_eq!(eval("100.0").to_string(), "100.0");
        assert_eq!(eval("1,2").to_string(), "(1, 2)");
        assert_eq!(eval("(5,)").to_string(), "(5,)");
        assert_eq!(eval("((1, 2), 3.5)").to_string(), "((1, 2), 3.5)");
        assert_eq!(eval("()").to_string(), "()");
    }
}
