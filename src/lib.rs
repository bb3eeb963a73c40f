#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(
    clippy::needless_return,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

//! rpn-formula, a crate to compile mathematical formulas once and evaluate
//! them many times.
//!
//! A formula declares its variables before a `:` and gives an infix
//! expression after it. The easiest way to use this crate is with the
//! [`eval`](fn.eval.html) function, which takes one value per declared
//! variable, in declaration order:
//!
//! ```
//! assert_eq!(rpn_formula::eval("x y : x * y + 2", &[3.0, 5.0]), Ok(17.0));
//! assert_eq!(rpn_formula::eval(": 3 + 5 * 2", &[]), Ok(13.0));
//! ```
//!
//! It is also possible to separate the compilation from the evaluation of a
//! formula with the [`Formula`](struct.Formula.html) type. This allow to reuse
//! the same formula with different values for variables.
//!
//! ```
//! use rpn_formula::Formula;
//!
//! let formula = Formula::compile("c b : 3 / c + b").unwrap();
//! assert_eq!(formula.postfix_string(), "3c/b+");
//! assert_eq!(formula.evaluate(&[1.0, 5.0]), Ok(8.0));
//! assert_eq!(formula.evaluate(&[1.0, 10.0]), Ok(13.0));
//! ```
//!
//! # Language definition
//!
//! A formula is written `<variables> : <expression>`.
//!
//! - variables are separated by single spaces. Names start with a latin
//!   letter and continue with latin letters, digits or `_`. The list can be
//!   empty;
//! - spaces in the expression are ignored;
//! - numbers are unsigned decimal literals: `12`, `0.5`, `.5`;
//! - left and right parenthesis;
//! - mathematical operators: `+` for addition, `-` for subtraction,
//!   `*` for multiplication, `/` for division and `^` for exponentiation
//!   (`powf`). A `-` at the start of the expression or right after another
//!   operator or `(` is a unary minus, which can also be written `~`;
//! - function call: `sin(x)`, `atan(2)`. The following functions are
//!   accessible: `sin`, `cos`, `tan`, `atan`, `exp`, `log` (natural
//!   logarithm), `abs`, `sign`, `sqr` (square) and `sqrt`.
//!
//! Any other symbol, and any name that was not declared, is rejected.
//!
//! Binary operators are left associative, `^` included: `2^3^2` is `64`.
//! Unary minus and functions bind tighter than every binary operator:
//! `-x^2` is `(-x)^2`.
//!
//! # Technical details
//!
//! The expression is converted to postfix notation with the shunting-yard
//! algorithm, and evaluated with a value stack. Evaluation is generic over
//! the floating point type and only reads the compiled formula, so a single
//! [`Formula`](struct.Formula.html) can be shared between threads.
//!
//! The [`Ast`](enum.Ast.html) type gives the same capabilities for
//! expressions built in Rust code rather than parsed from strings.

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod ast;
mod error;
mod formula;
mod lexer;
mod parser;
mod proptests;
mod token;
mod util;
mod variables;

pub use ast::Ast;
pub use error::{CompileError, Error, EvalError};
pub use formula::{eval, Formula};
pub use lexer::is_variable;
pub use token::{Arity, Op, Scalar, Token};
pub use util::OPERATORS;
pub use variables::VariableTable;
