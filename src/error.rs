//! Error types for compiling and evaluating formulas

use thiserror::Error;

/// Errors reported while compiling a formula string. They are all final for
/// the given input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// No `:` between the variable list and the expression
    #[error("missing ':' after the variable list")]
    MissingDelimiter,
    /// A declared variable is not an identifier starting with a latin letter
    #[error("invalid variable name '{0}': variables must start with a latin letter")]
    InvalidVariableName(String),
    /// Nothing left after the `:`
    #[error("empty expression after ':'")]
    EmptyExpression,
    /// Parentheses do not match
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
    /// A `.` outside of a number, or a number with several dots
    #[error("invalid decimal point at position {0}")]
    InvalidDecimalPoint(usize),
    /// Neither a number, a declared variable nor an operator
    #[error("unknown token '{token}' at position {position}")]
    UnknownToken {
        /// Offending text
        token: String,
        /// Offset in the expression body, whitespace removed
        position: usize,
    },
    /// An operator does not have enough operands
    #[error("missing operand for '{0}'")]
    MissingOperand(&'static str),
    /// The expression does not reduce to exactly one value
    #[error("malformed expression: {0} values instead of one")]
    MalformedExpression(usize),
}

/// Errors reported while evaluating a compiled formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Binding count differs from the declared variable count
    #[error("expected {expected} variable values, got {actual}")]
    VariableCountMismatch {
        /// Declared variables
        expected: usize,
        /// Supplied values
        actual: usize,
    },
    /// Stack underflow while applying an operator
    #[error("missing operand for '{0}'")]
    MissingOperand(&'static str),
    /// More or less than one value left once every token was consumed
    #[error("malformed postfix sequence: {0} values left instead of one")]
    MalformedPostfix(usize),
    /// Literal that the numeric type can not represent
    #[error("invalid numeric literal '{0}'")]
    InvalidLiteral(String),
    /// Expression tree refers to a slot past the supplied values
    #[error("variable slot {slot} is unbound, only {available} values supplied")]
    UnboundVariable {
        /// Referenced slot
        slot: usize,
        /// Supplied values
        available: usize,
    },
}

/// Any error from the one-shot [`eval`](fn.eval.html) function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The formula string was rejected
    #[error("CompileError: {0}")]
    Compile(#[from] CompileError),
    /// The compiled formula could not be evaluated
    #[error("EvalError: {0}")]
    Eval(#[from] EvalError),
}
