use crate::error::EvalError;
use crate::token::{Arity, Op};
use num_traits::Float;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::ops;

/// Expression trees, built directly from Rust operators instead of from a
/// formula string.
///
/// # Examples
///
/// ```
/// # use rpn_formula::Ast;
/// // normal density with sigma = 1 and mu = 1
/// let x = Ast::var(0);
/// let density = Ast::from(1.0) / Ast::from(2.0 * std::f64::consts::PI).sqrt()
///     * (Ast::from(-0.5) * (x - 1.0.into()).sqr()).exp();
/// let value = density.eval(&[1.0_f64]).unwrap();
/// assert!((value - 0.398_942_280_4).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub enum Ast {
    /// A constant value
    Constant(f64),
    /// A variable, by slot in the bound values
    Variable(usize),
    /// op(<arg>)
    Unary(Op, Box<Ast>),
    /// <left> op <right>
    Binary(Op, Box<Ast>, Box<Ast>),
}

impl PartialEq<Self> for Ast {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ast::Constant(v), Ast::Constant(v2)) => v.to_le_bytes() == v2.to_le_bytes(),
            (Ast::Variable(slot), Ast::Variable(slot2)) => slot == slot2,
            (Ast::Unary(op, a), Ast::Unary(op2, a2)) => op == op2 && a == a2,
            (Ast::Binary(op, a, b), Ast::Binary(op2, a2, b2)) => op == op2 && a == a2 && b == b2,
            _ => false,
        }
    }
}
impl Eq for Ast {}

impl Hash for Ast {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Ast::Constant(v) => {
                state.write_u8(0);
                v.to_le_bytes().hash(state)
            }
            Ast::Variable(slot) => {
                state.write_u8(1);
                slot.hash(state)
            }
            Ast::Unary(op, a) => {
                state.write_u8(2);
                op.hash(state);
                a.hash(state);
            }
            Ast::Binary(op, a, b) => {
                state.write_u8(3);
                op.hash(state);
                a.hash(state);
                b.hash(state);
            }
        }
    }
}

impl Ast {
    /// The variable bound to `slot`
    pub fn var(slot: usize) -> Self {
        Self::Variable(slot)
    }

    /// A constant
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    fn unary(self, op: Op) -> Self {
        Self::Unary(op, Box::new(self))
    }

    fn binary(self, op: Op, right: Self) -> Self {
        Self::Binary(op, Box::new(self), Box::new(right))
    }

    /// `self ^ exponent`
    pub fn pow(self, exponent: Self) -> Self {
        self.binary(Op::Pow, exponent)
    }

    /// Sine, in radians
    pub fn sin(self) -> Self {
        self.unary(Op::Sin)
    }

    /// Cosine, in radians
    pub fn cos(self) -> Self {
        self.unary(Op::Cos)
    }

    /// Tangent, in radians
    pub fn tan(self) -> Self {
        self.unary(Op::Tan)
    }

    /// Cotangent, as `1 / tan(self)`
    pub fn ctan(self) -> Self {
        Self::Constant(1.0) / self.tan()
    }

    /// Arctangent
    pub fn atan(self) -> Self {
        self.unary(Op::Atan)
    }

    /// Natural exponential
    pub fn exp(self) -> Self {
        self.unary(Op::Exp)
    }

    /// Natural logarithm
    pub fn log(self) -> Self {
        self.unary(Op::Log)
    }

    /// Absolute value
    pub fn abs(self) -> Self {
        self.unary(Op::Abs)
    }

    /// -1, 0 or 1
    pub fn sign(self) -> Self {
        self.unary(Op::Sign)
    }

    /// Square
    pub fn sqr(self) -> Self {
        self.unary(Op::Sqr)
    }

    /// Square root
    pub fn sqrt(self) -> Self {
        self.unary(Op::Sqrt)
    }

    /// Evaluate the tree with `values[slot]` for every variable.
    ///
    /// Constants are converted to `T`, which can lose precision for types
    /// narrower than `f64`.
    pub fn eval<T: Float>(&self, values: &[T]) -> Result<T, EvalError> {
        match *self {
            Self::Constant(value) => Ok(num_traits::cast(value).unwrap_or_else(T::nan)),
            Self::Variable(slot) => {
                values
                    .get(slot)
                    .copied()
                    .ok_or(EvalError::UnboundVariable {
                        slot,
                        available: values.len(),
                    })
            }
            Self::Unary(op, ref arg) => {
                let arg = arg.eval(values)?;
                Ok(op.apply_unary(arg))
            }
            Self::Binary(op, ref left, ref right) => {
                let left = left.eval(values)?;
                let right = right.eval(values)?;
                Ok(op.apply_binary(left, right))
            }
        }
    }

    /// If the AST node correspond to a constant, get `Some(constant)`. Else,
    /// get `None`
    pub fn value(&self) -> Option<f64> {
        if let Self::Constant(value) = *self {
            Some(value)
        } else {
            None
        }
    }

    /// Optimize the AST by doing constants propagation
    #[must_use]
    pub fn optimize(self) -> Self {
        match self {
            Self::Variable(_) | Self::Constant(_) => self,
            Self::Unary(op, arg) => {
                let arg = arg.optimize();
                if let Some(arg) = arg.value() {
                    return Self::Constant(op.apply_unary(arg));
                }
                return Self::Unary(op, Box::new(arg));
            }
            Self::Binary(op, left, right) => {
                let left = left.optimize();
                let right = right.optimize();
                if let (Some(left), Some(right)) = (left.value(), right.value()) {
                    return Self::Constant(op.apply_binary(left, right));
                }
                return Self::Binary(op, Box::new(left), Box::new(right));
            }
        }
    }

    /// Slots of the variables used by the tree
    ///
    /// # Examples
    /// ```
    /// # use rpn_formula::Ast;
    /// let ast = Ast::var(2) * Ast::var(0).sin() + Ast::var(2);
    /// assert_eq!(ast.variables().into_iter().collect::<Vec<_>>(), [0, 2]);
    /// ```
    pub fn variables(&self) -> BTreeSet<usize> {
        let mut variables = BTreeSet::new();
        self.inner_variables(&mut variables);
        variables
    }

    fn inner_variables(&self, variables: &mut BTreeSet<usize>) {
        match *self {
            Self::Constant(_) => {}
            Self::Variable(slot) => {
                variables.insert(slot);
            }
            Self::Unary(_, ref arg) => arg.inner_variables(variables),
            Self::Binary(_, ref left, ref right) => {
                left.inner_variables(variables);
                right.inner_variables(variables);
            }
        }
    }

    /// Number of operands the root operator takes, if the root is an operator
    pub fn arity(&self) -> Option<Arity> {
        match *self {
            Self::Unary(op, _) | Self::Binary(op, _, _) => Some(op.arity()),
            Self::Constant(_) | Self::Variable(_) => None,
        }
    }
}

impl From<f64> for Ast {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl ops::Neg for Ast {
    type Output = Self;

    fn neg(self) -> Self {
        self.unary(Op::Neg)
    }
}

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for Ast {
            type Output = Self;

            fn $method(self, right: Self) -> Self {
                self.binary($op, right)
            }
        }
    };
}

binary_operator!(Add, add, Op::Plus);
binary_operator!(Sub, sub, Op::Minus);
binary_operator!(Mul, mul, Op::Mul);
binary_operator!(Div, div, Op::Div);
