use crate::error::CompileError;
use crate::lexer::is_variable;
use hashbrown::HashMap;

/// Declared variables of a formula, mapping names to slots in the binding
/// vector.
///
/// Slots are given in declaration order. When a name is declared twice the
/// later slot is the one used by the expression, but the earlier slot still
/// counts: `x x : x` takes two values and reads the second one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    names: Vec<String>,
    slots: HashMap<String, usize>,
}

impl VariableTable {
    /// Parse the declaration header, the part of a formula before `:`.
    ///
    /// Names are separated by single spaces. An empty header declares no
    /// variables at all.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rpn_formula::VariableTable;
    /// let table = VariableTable::parse("x y z").unwrap();
    /// assert_eq!(table.len(), 3);
    /// assert_eq!(table.slot("y"), Some(1));
    ///
    /// assert!(VariableTable::parse("x 2y").is_err());
    /// ```
    pub fn parse(header: &str) -> Result<Self, CompileError> {
        let header = header.trim_end();
        let mut table = Self::default();
        if header.is_empty() {
            return Ok(table);
        }

        for name in header.split(' ') {
            if !is_variable(name) {
                return Err(CompileError::InvalidVariableName(name.to_owned()));
            }
            let slot = table.names.len();
            table.names.push(name.to_owned());
            table.slots.insert(name.to_owned(), slot);
        }
        Ok(table)
    }

    /// Number of declared slots
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if no variable was declared
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Slot used for `name`, if it was declared
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    /// Name declared at `slot`
    pub fn name(&self, slot: usize) -> Option<&str> {
        self.names.get(slot).map(String::as_str)
    }

    /// Declared names, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Distinct names with the slot each one resolves to
    pub(crate) fn resolved(&self) -> impl Iterator<Item = (&str, usize)> {
        self.names
            .iter()
            .enumerate()
            .filter(move |(slot, name)| self.slots.get(*name) == Some(slot))
            .map(|(slot, name)| (name.as_str(), slot))
    }
}
