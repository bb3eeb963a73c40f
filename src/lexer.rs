use crate::token::Op;
use crate::util::is_operator_symbol;
use crate::variables::VariableTable;

#[must_use]
/// Check if `ident` is a valid variable name: a latin letter followed by
/// latin letters, digits or `_`.
///
/// # Examples
///
/// ```
/// # use rpn_formula::is_variable;
///
/// assert_eq!(is_variable("p1"), true);
/// assert_eq!(is_variable("x_max"), true);
/// assert_eq!(is_variable("2b"), false);
/// ```
pub fn is_variable(ident: &str) -> bool {
    let mut chars = ident.chars();
    // Check first char
    if !chars.next().map_or(false, is_variable_start) {
        return false;
    }
    // Check all others
    for c in chars {
        if !is_variable_part(c) {
            return false;
        }
    }
    return true;
}

/// What was found at an occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme {
    /// A declared variable, resolved to its slot
    Variable(usize),
    /// A named function from the catalog
    Function(Op),
}

/// A variable or function keyword standing on its own in an expression body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// Byte offset in the body
    pub position: usize,
    /// Length of the matched spelling
    pub len: usize,
    /// What was matched
    pub lexeme: Lexeme,
}

/// Find every genuine occurrence of a declared variable or of a named function
/// in `body`, sorted by position.
///
/// An occurrence is genuine when it is flanked on both sides by an operator
/// symbol or by the end of the body, so `x` is not found inside `exp` and
/// `sqr` is not found inside `sqrt`. When two candidates match at the same
/// position the first scanned one wins: variables are scanned before
/// functions.
pub fn scan(body: &str, variables: &VariableTable) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();

    for (name, slot) in variables.resolved() {
        push_genuine(body, name, Lexeme::Variable(slot), &mut occurrences);
    }
    for op in Op::ALL.iter().filter(|op| op.is_function()) {
        push_genuine(body, op.spelling(), Lexeme::Function(*op), &mut occurrences);
    }

    // stable sort, so the first scanned candidate stays first
    occurrences.sort_by_key(|occurrence| occurrence.position);
    occurrences.dedup_by_key(|occurrence| occurrence.position);

    if !occurrences
        .iter()
        .any(|occurrence| matches!(occurrence.lexeme, Lexeme::Variable(_)))
    {
        warn!("expression '{}' does not depend on the variables", body);
    }
    occurrences
}

fn push_genuine(body: &str, spelling: &str, lexeme: Lexeme, occurrences: &mut Vec<Occurrence>) {
    for (position, _) in body.match_indices(spelling) {
        if is_standalone(body, position, spelling.len()) {
            trace!("found '{}' at {}", spelling, position);
            occurrences.push(Occurrence {
                position,
                len: spelling.len(),
                lexeme,
            });
        }
    }
}

/// Check that the `len` bytes at `position` are not part of a longer run
fn is_standalone(body: &str, position: usize, len: usize) -> bool {
    let left = body[..position]
        .chars()
        .next_back()
        .map_or(true, is_operator_symbol);
    let right = body[position + len..]
        .chars()
        .next()
        .map_or(true, is_operator_symbol);
    left && right
}

/// Check if `c` can appear at the first character of a variable
fn is_variable_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Check if `c` can appear inside a variable
pub(crate) fn is_variable_part(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}
