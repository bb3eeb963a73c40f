use num_traits::Float;
use std::str::FromStr;

/// Numeric types a formula can be evaluated with.
///
/// Literals are read with the type's own `FromStr` implementation, everything
/// else goes through [`Float`]. This is implemented for every type meeting both
/// bounds, i.e. `f32` and `f64`.
pub trait Scalar: Float + FromStr {}

impl<T: Float + FromStr> Scalar for T {}

/// Number of operands an operator consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Prefix operators and functions: `~x`, `sin(x)`
    Unary,
    /// Infix operators: `x + y`
    Binary,
}

impl Arity {
    /// Number of values popped from the evaluation stack
    pub fn operands(self) -> usize {
        match self {
            Self::Unary => 1,
            Self::Binary => 2,
        }
    }
}

/// Entries of the operator catalog.
///
/// The catalog is closed: these are the only operators and functions a formula
/// can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `+`
    Plus,
    /// binary `-`
    Minus,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `^`, real-valued power
    Pow,
    /// `~`, unary minus
    Neg,
    /// `sin`
    Sin,
    /// `cos`
    Cos,
    /// `tan`
    Tan,
    /// `atan`
    Atan,
    /// `exp`
    Exp,
    /// `abs`
    Abs,
    /// `sign`, returns -1, 0 or 1
    Sign,
    /// `sqr`, squares its operand
    Sqr,
    /// `sqrt`
    Sqrt,
    /// `log`, natural logarithm
    Log,
}

/// Precedence of the `(` scope marker. It is lower than every operator, so
/// nothing is ever popped past it by precedence.
pub const PAREN_PRECEDENCE: u8 = 0;

impl Op {
    /// Every catalog entry, in catalog order
    pub const ALL: [Op; 16] = [
        Op::Plus,
        Op::Minus,
        Op::Mul,
        Op::Div,
        Op::Pow,
        Op::Neg,
        Op::Sin,
        Op::Cos,
        Op::Tan,
        Op::Atan,
        Op::Exp,
        Op::Abs,
        Op::Sign,
        Op::Sqr,
        Op::Sqrt,
        Op::Log,
    ];

    /// How the operator is written in formulas and in postfix strings
    pub fn spelling(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::Neg => "~",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Atan => "atan",
            Self::Exp => "exp",
            Self::Abs => "abs",
            Self::Sign => "sign",
            Self::Sqr => "sqr",
            Self::Sqrt => "sqrt",
            Self::Log => "log",
        }
    }

    /// Get the operator precedence. Operators with higher precedence should be
    /// evaluated first.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Plus | Self::Minus => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 3,
            _ => 4,
        }
    }

    /// Get the operator arity
    pub fn arity(self) -> Arity {
        match self {
            Self::Plus | Self::Minus | Self::Mul | Self::Div | Self::Pow => Arity::Binary,
            _ => Arity::Unary,
        }
    }

    /// Check if the operator is a named function (`sin`, `sqrt`, ...) rather
    /// than a single character symbol
    pub fn is_function(self) -> bool {
        self.spelling().len() > 1
    }

    /// Look up the single character operator spelled `c`. Parentheses are not
    /// operators.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '^' => Some(Self::Pow),
            '~' => Some(Self::Neg),
            _ => None,
        }
    }

    /// Look up any catalog entry by its spelling
    pub fn from_spelling(spelling: &str) -> Option<Self> {
        crate::util::OPERATORS.get(spelling).copied()
    }

    /// Apply a unary operator to `x`. Binary operators leave `x` untouched.
    pub fn apply_unary<T: Float>(self, x: T) -> T {
        match self {
            Self::Neg => -x,
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Atan => x.atan(),
            Self::Exp => x.exp(),
            Self::Abs => x.abs(),
            Self::Sign => {
                if x > T::zero() {
                    T::one()
                } else if x < T::zero() {
                    -T::one()
                } else {
                    T::zero()
                }
            }
            Self::Sqr => x * x,
            Self::Sqrt => x.sqrt(),
            Self::Log => x.ln(),
            Self::Plus | Self::Minus | Self::Mul | Self::Div | Self::Pow => x,
        }
    }

    /// Apply a binary operator to `left` and `right`. Unary operators apply
    /// to `right` only.
    pub fn apply_binary<T: Float>(self, left: T, right: T) -> T {
        match self {
            Self::Plus => left + right,
            Self::Minus => left - right,
            Self::Mul => left * right,
            Self::Div => left / right,
            Self::Pow => left.powf(right),
            unary => unary.apply_unary(right),
        }
    }
}

/// Tokens of a compiled postfix sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Numeric literal, as written: digits and at most one decimal point
    Number(String),
    /// Reference to a declared variable, by slot index
    Variable(usize),
    /// Operator or function from the catalog
    Op(Op),
}
