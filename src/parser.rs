use crate::error::CompileError;
use crate::lexer::{is_variable_part, Lexeme, Occurrence};
use crate::token::{Arity, Op, Token, PAREN_PRECEDENCE};
use crate::util::{is_operator_symbol, opens_operand};
use crate::variables::VariableTable;

/// Entries of the operator stack
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Paren,
    Op(Op),
}

impl Pending {
    fn precedence(self) -> u8 {
        match self {
            Self::Paren => PAREN_PRECEDENCE,
            Self::Op(op) => op.precedence(),
        }
    }
}

/// Convert an infix expression body to postfix tokens with the shunting-yard
/// algorithm.
///
/// `occurrences` must be the sorted output of [`scan`](../lexer/fn.scan.html)
/// for the same body and `variables`. Numbers, parentheses and single
/// character operators are read directly from `body`; anything else is an
/// unknown token.
pub fn assemble(
    body: &str,
    occurrences: &[Occurrence],
    variables: &VariableTable,
) -> Result<Vec<Token>, CompileError> {
    let bytes = body.as_bytes();
    let mut output = Vec::new();
    let mut operators = Vec::new();
    let mut cursor = occurrences.iter().peekable();
    let mut i = 0;

    while i < bytes.len() {
        if let Some(occurrence) = cursor.next_if(|occurrence| occurrence.position == i) {
            match occurrence.lexeme {
                Lexeme::Variable(slot) => output.push(Token::Variable(slot)),
                Lexeme::Function(op) => push_operator(op, &mut operators, &mut output),
            }
            i += occurrence.len;
            continue;
        }

        let c = char::from(bytes[i]);
        match c {
            '0'..='9' | '.' => {
                let len = body[i..]
                    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                    .unwrap_or(body.len() - i);
                let literal = &body[i..i + len];
                if let Some(extra) = literal.match_indices('.').nth(1) {
                    return Err(CompileError::InvalidDecimalPoint(i + extra.0));
                }
                output.push(Token::Number(literal.to_owned()));
                i += len;
                continue;
            }
            '(' => operators.push(Pending::Paren),
            ')' => loop {
                match operators.pop() {
                    Some(Pending::Paren) => break,
                    Some(Pending::Op(op)) => output.push(Token::Op(op)),
                    None => return Err(CompileError::UnbalancedParentheses),
                }
            },
            c => match Op::from_symbol(c) {
                Some(op) => {
                    let op = if op == Op::Minus && (i == 0 || opens_operand(char::from(bytes[i - 1])))
                    {
                        Op::Neg
                    } else {
                        op
                    };
                    push_operator(op, &mut operators, &mut output);
                }
                None => return Err(unknown_token(body, i, variables)),
            },
        }
        i += 1;
    }

    while let Some(pending) = operators.pop() {
        match pending {
            Pending::Op(op) => output.push(Token::Op(op)),
            Pending::Paren => return Err(CompileError::UnbalancedParentheses),
        }
    }
    Ok(output)
}

/// Push `op` on the operator stack. Binary operators first move every stacked
/// operator of higher or equal precedence to the output; prefix operators bind
/// to what follows them and are pushed as is.
fn push_operator(op: Op, operators: &mut Vec<Pending>, output: &mut Vec<Token>) {
    if op.arity() == Arity::Binary {
        while let Some(&top) = operators.last() {
            if top.precedence() < op.precedence() {
                break;
            }
            operators.pop();
            if let Pending::Op(top) = top {
                output.push(Token::Op(top));
            }
        }
    }
    operators.push(Pending::Op(op));
}

/// The token starting at `position`. A declared name or a function keyword
/// left unmatched by the scanner is not itself unknown: the stray character
/// glued to it is reported instead, when there is one.
fn unknown_token(body: &str, position: usize, variables: &VariableTable) -> CompileError {
    let rest = &body[position..];
    let len = match rest.find(|c: char| !is_variable_part(c)) {
        Some(0) => rest.chars().next().map_or(0, char::len_utf8),
        Some(len) => len,
        None => rest.len(),
    };
    let run = &rest[..len];

    if variables.slot(run).is_some() || Op::from_spelling(run).is_some() {
        let stray = rest[len..]
            .char_indices()
            .find(|&(_, c)| !(is_variable_part(c) || c == '.' || is_operator_symbol(c)));
        if let Some((offset, c)) = stray {
            return CompileError::UnknownToken {
                token: c.to_string(),
                position: position + len + offset,
            };
        }
    }
    CompileError::UnknownToken {
        token: run.to_owned(),
        position,
    }
}

/// Check that every operator of `tokens` finds its operands and that the
/// sequence reduces to a single value.
pub fn check_arity(tokens: &[Token]) -> Result<(), CompileError> {
    let mut depth = 0usize;
    for token in tokens {
        match token {
            Token::Number(_) | Token::Variable(_) => depth += 1,
            Token::Op(op) => {
                let operands = op.arity().operands();
                if depth < operands {
                    return Err(CompileError::MissingOperand(op.spelling()));
                }
                depth = depth - operands + 1;
            }
        }
    }
    if depth == 1 {
        Ok(())
    } else {
        Err(CompileError::MalformedExpression(depth))
    }
}
