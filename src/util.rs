use crate::token::Op;
use hashbrown::HashMap;

/// Characters that act as operator symbols or parentheses in an expression
/// body. Identifiers and numbers are delimited by these.
pub const OPERATOR_SYMBOLS: [char; 8] = ['(', ')', '+', '-', '*', '/', '^', '~'];

lazy_static! {
    /// Operator catalog, indexed by spelling
    pub static ref OPERATORS: HashMap<&'static str, Op> = {
        let mut map = HashMap::with_capacity(Op::ALL.len());
        for op in Op::ALL {
            map.insert(op.spelling(), op);
        }
        map
    };
}

/// Check if `c` is one of the single character operator symbols, parentheses
/// included
pub fn is_operator_symbol(c: char) -> bool {
    OPERATOR_SYMBOLS.contains(&c)
}

/// Check if an operator written right after `c` has no operand on its left.
/// This is what makes a `-` a unary minus.
pub fn opens_operand(c: char) -> bool {
    c == '(' || Op::from_symbol(c).is_some()
}

/// Remove whitespace and `:` from an expression body
pub fn strip_body(body: &str) -> String {
    body.chars()
        .filter(|&c| !c.is_whitespace() && c != ':')
        .collect()
}

/// Count how many times `c` appears in `s`
pub fn count_char(s: &str, c: char) -> usize {
    s.chars().filter(|&other| other == c).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_map_is_complete() {
        assert_eq!(OPERATORS.len(), Op::ALL.len());
        assert_eq!(OPERATORS.get("atan"), Some(&Op::Atan));
        assert_eq!(OPERATORS.get("~"), Some(&Op::Neg));
        assert!(OPERATORS.get("(").is_none());
    }

    #[test]
    fn symbols() {
        for c in &OPERATOR_SYMBOLS {
            assert!(is_operator_symbol(*c));
        }
        for c in &['x', '1', '.', '_', ':', ' '] {
            assert!(!is_operator_symbol(*c));
        }
        assert!(opens_operand('('));
        assert!(opens_operand('^'));
        assert!(!opens_operand(')'));
        assert!(!opens_operand('x'));
    }

    #[test]
    fn strip() {
        assert_eq!(strip_body(" x *\t(y - 1) "), "x*(y-1)");
        assert_eq!(strip_body(": 2 : 2"), "22");
        assert_eq!(count_char("((x)+(y", '('), 3);
        assert_eq!(count_char("", ')'), 0);
    }
}
