use crate::ast::Ast;
use crate::error::{CompileError, Error, EvalError};
use crate::lexer::scan;
use crate::parser::{assemble, check_arity};
use crate::token::{Arity, Op, Scalar, Token};
use crate::util::{count_char, strip_body};
use crate::variables::VariableTable;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Compile `input` and evaluate it once with `bindings`.
///
/// Returns `Ok(result)` if the evaluation is successful, or `Err(cause)` if
/// compiling or evaluating the formula failed.
///
/// # Example
///
/// ```
/// # use rpn_formula::eval;
///
/// assert_eq!(eval(": 45 - 2^3", &[]), Ok(37.0));
/// assert_eq!(eval("a : 3 * a", &[-5.0]), Ok(-15.0));
/// ```
pub fn eval<T: Scalar>(input: &str, bindings: &[T]) -> Result<T, Error> {
    Ok(Formula::compile(input)?.evaluate(bindings)?)
}

/// A compiled formula: its declared variables and the postfix form of its
/// expression.
///
/// A formula is immutable once compiled. Evaluation only reads it, so one
/// formula can be shared and evaluated from several threads at once.
///
/// # Examples
/// ```
/// # use rpn_formula::Formula;
/// let formula = Formula::compile("x y : x * y + sin(x)").unwrap();
/// assert_eq!(formula.postfix_string(), "xy*xsin+");
/// assert_eq!(formula.variable_count(), 2);
/// assert_eq!(formula.evaluate(&[0.0, 4.0]), Ok(0.0));
/// assert_eq!(formula.evaluate(&[2.0_f32, 4.0]), Ok(8.0 + 2.0_f32.sin()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    variables: VariableTable,
    postfix: Vec<Token>,
}

impl Formula {
    /// Compile a formula written as `<variables> : <expression>`.
    ///
    /// # Examples
    /// ```
    /// # use rpn_formula::{CompileError, Formula};
    /// // A valid formula
    /// assert!(Formula::compile("x : x + 5 * 2").is_ok());
    /// // a constant one
    /// assert!(Formula::compile(": 5 * 2").is_ok());
    /// // invalid formulas
    /// assert_eq!(Formula::compile("x + 5"), Err(CompileError::MissingDelimiter));
    /// assert_eq!(Formula::compile("x : (x + 5"), Err(CompileError::UnbalancedParentheses));
    /// ```
    pub fn compile(input: &str) -> Result<Self, CompileError> {
        let delimiter = input.find(':').ok_or(CompileError::MissingDelimiter)?;
        let variables = VariableTable::parse(&input[..delimiter])?;

        let body = strip_body(&input[delimiter..]);
        if body.is_empty() {
            return Err(CompileError::EmptyExpression);
        }
        if count_char(&body, '(') != count_char(&body, ')') {
            return Err(CompileError::UnbalancedParentheses);
        }
        check_decimal_points(&body)?;

        let occurrences = scan(&body, &variables);
        let postfix = assemble(&body, &occurrences, &variables)?;
        check_arity(&postfix)?;

        let formula = Self { variables, postfix };
        debug!("compiled '{}' to '{}'", body, formula);
        Ok(formula)
    }

    /// Postfix form of the expression, tokens concatenated without separators.
    /// Unary minus is written `~`.
    ///
    /// # Examples
    /// ```
    /// # use rpn_formula::Formula;
    /// let formula = Formula::compile("x : x + x - x / x * x").unwrap();
    /// assert_eq!(formula.postfix_string(), "xx+xx/x*-");
    /// ```
    pub fn postfix_string(&self) -> String {
        self.to_string()
    }

    /// Number of values expected by [`evaluate`](#method.evaluate)
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Declared variables
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    /// Postfix tokens
    pub fn tokens(&self) -> &[Token] {
        &self.postfix
    }

    /// Check if the expression does not use any declared variable
    pub fn is_constant(&self) -> bool {
        !self
            .postfix
            .iter()
            .any(|token| matches!(token, Token::Variable(_)))
    }

    /// Evaluate the formula with one value per declared variable, in
    /// declaration order.
    ///
    /// Arithmetic is not checked: division by zero, `log` of a negative value
    /// and similar produce the infinities and NaNs of the numeric type.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rpn_formula::{EvalError, Formula};
    /// let formula = Formula::compile("x a b : (x - 1)^(a - 1) * (x + 1)^(b + 1)").unwrap();
    /// assert_eq!(formula.evaluate(&[3.0, 3.0, 2.0]), Ok(256.0));
    /// assert_eq!(
    ///     formula.evaluate(&[3.0, 3.0]),
    ///     Err(EvalError::VariableCountMismatch { expected: 3, actual: 2 })
    /// );
    /// ```
    pub fn evaluate<T: Scalar>(&self, bindings: &[T]) -> Result<T, EvalError> {
        if bindings.len() != self.variables.len() {
            return Err(EvalError::VariableCountMismatch {
                expected: self.variables.len(),
                actual: bindings.len(),
            });
        }
        trace!("evaluating '{}' with {} values", self, bindings.len());

        let mut values: Vec<T> = Vec::with_capacity(self.postfix.len());
        for token in &self.postfix {
            let value = match *token {
                Token::Number(ref literal) => literal
                    .parse::<T>()
                    .map_err(|_| EvalError::InvalidLiteral(literal.clone()))?,
                Token::Variable(slot) => {
                    bindings
                        .get(slot)
                        .copied()
                        .ok_or(EvalError::UnboundVariable {
                            slot,
                            available: bindings.len(),
                        })?
                }
                Token::Op(op) => {
                    let right = pop_operand(&mut values, op)?;
                    match op.arity() {
                        Arity::Unary => op.apply_unary(right),
                        Arity::Binary => {
                            let left = pop_operand(&mut values, op)?;
                            op.apply_binary(left, right)
                        }
                    }
                }
            };
            values.push(value);
        }
        single_value(values).map_err(EvalError::MalformedPostfix)
    }

    /// Rebuild the expression as an [`Ast`](enum.Ast.html) tree. Numeric
    /// literals become `f64` constants.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rpn_formula::{Ast, Formula};
    /// let formula = Formula::compile("x y : x * sqr(y)").unwrap();
    /// assert_eq!(formula.to_ast(), Ok(Ast::var(0) * Ast::var(1).sqr()));
    /// ```
    pub fn to_ast(&self) -> Result<Ast, EvalError> {
        let mut nodes = Vec::with_capacity(self.postfix.len());
        for token in &self.postfix {
            let node = match *token {
                Token::Number(ref literal) => Ast::Constant(
                    literal
                        .parse::<f64>()
                        .map_err(|_| EvalError::InvalidLiteral(literal.clone()))?,
                ),
                Token::Variable(slot) => Ast::Variable(slot),
                Token::Op(op) => {
                    let right = Box::new(pop_operand(&mut nodes, op)?);
                    match op.arity() {
                        Arity::Unary => Ast::Unary(op, right),
                        Arity::Binary => {
                            let left = Box::new(pop_operand(&mut nodes, op)?);
                            Ast::Binary(op, left, right)
                        }
                    }
                }
            };
            nodes.push(node);
        }
        single_value(nodes).map_err(EvalError::MalformedPostfix)
    }
}

impl FromStr for Formula {
    type Err = CompileError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::compile(input)
    }
}

impl Display for Formula {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        for token in &self.postfix {
            match *token {
                Token::Number(ref literal) => fmt.write_str(literal)?,
                Token::Variable(slot) => fmt.write_str(self.variables.name(slot).unwrap_or("?"))?,
                Token::Op(op) => fmt.write_str(op.spelling())?,
            }
        }
        Ok(())
    }
}

fn pop_operand<V>(stack: &mut Vec<V>, op: Op) -> Result<V, EvalError> {
    stack.pop().ok_or(EvalError::MissingOperand(op.spelling()))
}

/// Take the only value of `stack`, or give the number of values left
fn single_value<V>(mut stack: Vec<V>) -> Result<V, usize> {
    match stack.pop() {
        Some(value) if stack.is_empty() => Ok(value),
        Some(_) => Err(stack.len() + 1),
        None => Err(0),
    }
}

/// Dots are only allowed inside numbers, and must be followed by a digit
fn check_decimal_points(body: &str) -> Result<(), CompileError> {
    if body.ends_with('.') {
        return Err(CompileError::InvalidDecimalPoint(body.len() - 1));
    }
    if body.starts_with('.') {
        return Err(CompileError::InvalidDecimalPoint(0));
    }
    for (position, _) in body.match_indices('.') {
        let next = body[position + 1..].chars().next();
        if !next.map_or(false, |c| c.is_ascii_digit()) {
            return Err(CompileError::InvalidDecimalPoint(position));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{E, PI};
    use test_case::test_case;

    fn compile(input: &str) -> Formula {
        Formula::compile(input).unwrap()
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "{} is not within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test_case("x : -x" => "x~" ; "unary minus")]
    #[test_case("x : x + x - x / x * x" => "xx+xx/x*-" ; "precedence")]
    #[test_case("x : sin(x)" => "xsin" ; "function")]
    #[test_case("x : x^(0.3415234)" => "x0.3415234^" ; "power")]
    #[test_case("x : 0.411313 + .5 - x" => "0.411313.5+x-" ; "leading dot")]
    #[test_case("x : -5 + 56.23424 - .51241 / 0.4321 * 4 / 10" => "5~56.23424+.512410.4321/4*10/-" ; "literal arithmetics")]
    #[test_case("v1 v2 v3 p1 p2 p3 m : (p1^2 + p2^2 + p3^2) / (2 * m) + .5 * (v1^2 + v2^2 + v3^2) " => "p12^p22^+p32^+2m*/.5v12^v22^+v32^+*+" ; "kinetic energy")]
    #[test_case("x a b : (x - 1)^(a - 1) * (x + 1)^(b + 1)" => "x1-a1-^x1+b1+^*" ; "parenthesised powers")]
    #[test_case("x y t : x * cos(y) / exp(t) + 10" => "xycos*texp/10+" ; "functions between operators")]
    #[test_case(": 2*2" => "22*" ; "no variables")]
    #[test_case("x : x" => "x" ; "single variable")]
    fn postfix(input: &str) -> String {
        compile(input).postfix_string()
    }

    #[test]
    fn functions() {
        let cases: [(&str, f64, f64); 10] = [
            ("x : sin(x)", PI / 4.0, (PI / 4.0).sin()),
            ("x : cos(x)", PI / 4.0, (PI / 4.0).cos()),
            ("x : tan(x)", PI / 4.0, (PI / 4.0).tan()),
            ("x : atan(x)", PI / 4.0, (PI / 4.0).atan()),
            ("x : abs(x)", -PI / 4.0, PI / 4.0),
            ("x : sign(x)", -PI / 4.0, -1.0),
            ("x : sqr(x)", 2.0_f64.sqrt(), 2.0),
            ("x : sqrt(x)", 5.0, 5.0_f64.sqrt()),
            ("x : log(x)", E, 1.0),
            ("x : exp(x)", 1.0, E),
        ];
        for (input, x, expected) in &cases {
            let formula = compile(input);
            assert_eq!(formula.variable_count(), 1);
            assert_close(formula.evaluate(&[*x]).unwrap(), *expected, f64::EPSILON * 3.0);
        }
    }

    #[test]
    fn evaluate() {
        let formula = compile("x a b : (x - 1)^(a - 1) * (x + 1)^(b + 1)");
        assert_eq!(formula.variable_count(), 3);
        assert_close(formula.evaluate(&[1.0, 1.0, 1.0]).unwrap(), 4.0, f64::EPSILON);
        assert_close(formula.evaluate(&[1.0, 100.0, 100.0]).unwrap(), 0.0, f64::EPSILON);
        assert_close(formula.evaluate(&[-1.0, 100.0, 100.0]).unwrap(), 0.0, f64::EPSILON);
        assert_close(formula.evaluate(&[3.0, 3.0, 2.0]).unwrap(), 256.0, f64::EPSILON);

        let formula = compile("x : 0.411313 + .5 - x");
        assert_close(formula.evaluate(&[0.411313]).unwrap(), 0.5, f64::EPSILON);

        let formula = compile("x : x^(0.3415234)");
        assert_close(formula.evaluate(&[E]).unwrap(), E.powf(0.3415234), f64::EPSILON);

        let formula = compile("x : -5 + 56.23424 - .51241 / 0.4321 * 4 / 10");
        assert_close(formula.evaluate(&[100.0]).unwrap(), 50.7599, 1e-5);

        let formula =
            compile("v1 v2 v3 p1 p2 p3 m : (p1^2 + p2^2 + p3^2) / (2 * m) + .5 * (v1^2 + v2^2 + v3^2) ");
        assert_eq!(formula.variable_count(), 7);
        assert_close(
            formula.evaluate(&[1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]).unwrap(),
            4.5,
            1e-8,
        );

        let formula = compile("x y t : x * cos(y) / exp(t) + 10");
        assert_close(formula.evaluate(&[2.0, PI, 10.0]).unwrap(), 9.99991, 1e-6);
    }

    #[test]
    fn prefix_operators() {
        assert_eq!(compile("x : --x").evaluate(&[3.0]), Ok(3.0));
        assert_eq!(compile("x : -sin(x)").evaluate(&[0.5]), Ok(-(0.5_f64.sin())));
        assert_eq!(compile("x : 2^-x").evaluate(&[1.0]), Ok(0.5));
        assert_eq!(compile("x : ~x*2").evaluate(&[1.5]), Ok(-3.0));
        // unary minus binds tighter than power
        assert_eq!(compile("x : -x^2").evaluate(&[3.0]), Ok(9.0));
    }

    #[test]
    fn ieee_semantics() {
        assert!(compile("x : 1/x").evaluate::<f64>(&[0.0]).unwrap().is_infinite());
        assert!(compile("x : log(x)").evaluate::<f64>(&[-1.0]).unwrap().is_nan());
        assert!(compile("x : x^0.5").evaluate::<f32>(&[-4.0]).unwrap().is_nan());
    }

    #[test]
    fn single_precision() {
        let formula = compile("x y : x / y");
        assert_eq!(formula.evaluate(&[1.0_f32, 4.0]), Ok(0.25_f32));
    }

    #[test]
    fn constant() {
        let formula = compile(": 2*2");
        assert!(formula.is_constant());
        assert_eq!(formula.variable_count(), 0);
        assert_eq!(formula.evaluate::<f64>(&[]), Ok(4.0));
        assert!(!compile("x : x").is_constant());

        // functions alone do not make the expression depend on the variables
        let formula = compile("x : sin(2)");
        assert!(formula.is_constant());
        assert_eq!(formula.postfix_string(), "2sin");
        assert_eq!(formula.evaluate(&[7.0]), Ok(2.0_f64.sin()));
    }

    #[test]
    fn duplicated_variable_uses_last_slot() {
        let formula = compile("x x : x");
        assert_eq!(formula.variable_count(), 2);
        assert_eq!(formula.evaluate(&[1.0, 2.0]), Ok(2.0));
    }

    #[test]
    fn variable_count_mismatch() {
        let formula = compile("x y : x + y");
        assert_eq!(
            formula.evaluate(&[1.0]),
            Err(EvalError::VariableCountMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            formula.evaluate(&[1.0, 2.0, 3.0]),
            Err(EvalError::VariableCountMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test_case("x + 1" => CompileError::MissingDelimiter ; "no delimiter")]
    #[test_case("1x : 1" => CompileError::InvalidVariableName("1x".into()) ; "digit first")]
    #[test_case("x :   " => CompileError::EmptyExpression ; "empty body")]
    #[test_case("x : (x + 1))" => CompileError::UnbalancedParentheses ; "extra closing")]
    #[test_case("x : )x(" => CompileError::UnbalancedParentheses ; "reversed")]
    #[test_case("x : .5 + x." => CompileError::InvalidDecimalPoint(4) ; "trailing dot")]
    #[test_case("x : .x" => CompileError::InvalidDecimalPoint(0) ; "leading dot")]
    #[test_case("x : x + 1.*2" => CompileError::InvalidDecimalPoint(3) ; "dot before operator")]
    #[test_case("x : 1.5.5" => CompileError::InvalidDecimalPoint(3) ; "two dots")]
    #[test_case("x : x + y" => CompileError::UnknownToken { token: "y".into(), position: 2 } ; "undeclared")]
    #[test_case("x : 2x" => CompileError::UnknownToken { token: "x".into(), position: 1 } ; "implicit product")]
    #[test_case("x : x%2" => CompileError::UnknownToken { token: "%".into(), position: 1 } ; "stray symbol after a variable")]
    #[test_case("x : x +" => CompileError::MissingOperand("+") ; "dangling operator")]
    #[test_case("x : ()" => CompileError::MalformedExpression(0) ; "empty parentheses")]
    #[test_case("x : 2(x)" => CompileError::MalformedExpression(2) ; "missing operator")]
    fn compile_errors(input: &str) -> CompileError {
        Formula::compile(input).unwrap_err()
    }

    #[test]
    fn idempotent() {
        let input = "x y : sqrt(sqr(x) + sqr(y)) * sign(x - y)";
        assert_eq!(compile(input).postfix_string(), compile(input).postfix_string());
        assert_eq!(input.parse::<Formula>(), Formula::compile(input));
    }

    #[test]
    fn to_ast() {
        let formula = compile("x y : -x + 2.5 * y");
        let ast = formula.to_ast().unwrap();
        assert_eq!(
            ast,
            Ast::Binary(
                Op::Plus,
                Box::new(Ast::Unary(Op::Neg, Box::new(Ast::Variable(0)))),
                Box::new(Ast::Binary(
                    Op::Mul,
                    Box::new(Ast::Constant(2.5)),
                    Box::new(Ast::Variable(1))
                )),
            )
        );
        assert_eq!(ast.eval(&[1.0, 2.0]), formula.evaluate(&[1.0, 2.0]));
    }

    #[test]
    fn concurrent_evaluation() {
        let formula = compile("x y : x * y + sin(x)");
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4_u8)
                .map(|i| {
                    let formula = &formula;
                    scope.spawn(move || formula.evaluate(&[f64::from(i), 2.0]))
                })
                .collect();
            for (i, handle) in (0..4_u8).zip(handles) {
                let x = f64::from(i);
                assert_eq!(handle.join().unwrap(), Ok(x * 2.0 + x.sin()));
            }
        });
    }

    #[test]
    fn one_shot() {
        assert_eq!(eval("a b : a / b", &[1.0, 8.0]), Ok(0.125));
        assert_eq!(
            eval("a b : a / b", &[1.0]).unwrap_err().to_string(),
            "EvalError: expected 2 variable values, got 1"
        );
        assert_eq!(
            eval::<f64>("a : b", &[1.0]).unwrap_err().to_string(),
            "CompileError: unknown token 'b' at position 0"
        );
    }
}
