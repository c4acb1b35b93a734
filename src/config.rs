use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    code::{Code, CodeLocation},
    error::{CodeError, ConfigError},
};

/// Callable behind a unary operator. Receives the enclosing code and the
/// location of the operator occurrence so it can raise a [`CodeError`] with
/// a faithful source pointer.
pub type UnaryFn = Rc<dyn Fn(&Code, CodeLocation, f32) -> Result<f32, CodeError>>;

/// Callable behind a binary operator. Same contract as [`UnaryFn`], with
/// both operands already evaluated.
pub type BinaryFn = Rc<dyn Fn(&Code, CodeLocation, f32, f32) -> Result<f32, CodeError>>;

/// Shared handle to a [`Config`]. Configurations are reference-shared so
/// many expressions can be parsed against the same grammar.
pub type ConfigRef = Rc<RefCell<Config>>;

/// Associativity of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// Groups from left to right: `a + b + c` is `(a + b) + c`.
    Left,
    /// Groups from right to left: `a ** b ** c` is `a ** (b ** c)`.
    Right,
}

impl fmt::Display for Associativity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// A unary operator, usable in prefix or suffix position depending on which
/// group of the configuration it is registered in.
#[derive(Clone)]
pub struct UnaryOperator {
    /// Operator symbol, a run of operator characters.
    pub symbol:  String,
    /// Function to call when the operator operates on a value.
    pub operate: UnaryFn,
}

impl UnaryOperator {
    /// Creates a unary operator from a symbol and its callable.
    pub fn new<F>(symbol: impl Into<String>, operate: F) -> Self
        where F: Fn(&Code, CodeLocation, f32) -> Result<f32, CodeError> + 'static
    {
        Self { symbol:  symbol.into(),
               operate: Rc::new(operate), }
    }
}

impl fmt::Debug for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnaryOperator")
         .field("symbol", &self.symbol)
         .finish_non_exhaustive()
    }
}

/// A binary operator with its associativity.
#[derive(Clone)]
pub struct BinaryOperator {
    /// Operator symbol, a run of operator characters.
    pub symbol:  String,
    /// Associativity of the operator.
    pub assoc:   Associativity,
    /// Function to call when the operator operates on two values.
    pub operate: BinaryFn,
}

impl BinaryOperator {
    /// Creates a binary operator from a symbol, associativity and callable.
    pub fn new<F>(symbol: impl Into<String>, assoc: Associativity, operate: F) -> Self
        where F: Fn(&Code, CodeLocation, f32, f32) -> Result<f32, CodeError> + 'static
    {
        Self { symbol: symbol.into(),
               assoc,
               operate: Rc::new(operate) }
    }
}

impl fmt::Debug for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryOperator")
         .field("symbol", &self.symbol)
         .field("assoc", &self.assoc)
         .finish_non_exhaustive()
    }
}

/// Parser and evaluator configuration: the grammar as data.
///
/// The parser resolves prefix, suffix and binary operators against these
/// tables at parse time, so the operator set can be extended, re-ranked or
/// shrunk between parses without touching the parser itself.
///
/// `Config::default()` installs the standard operator preset; use
/// [`Config::empty`] to start from a blank grammar.
///
/// ## Example
/// ```
/// use flexpr::{Config, UnaryOperator};
///
/// let mut config = Config::default();
/// config.add_prefix_op(UnaryOperator::new("++", |_, _, x| Ok(x + 1.0)))
///       .unwrap();
/// assert!(config.has_prefix_op("++"));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// All unary operators usable in prefix position.
    pub prefix_ops: Vec<UnaryOperator>,
    /// All unary operators usable in suffix position.
    pub suffix_ops: Vec<UnaryOperator>,
    /// All binary operators. Registration alone is not enough for the
    /// parser to see one; it must also appear in `precedence_rows`.
    pub binary_ops: Vec<BinaryOperator>,

    /// Binary operator precedence table.
    ///
    /// The outer list is ordered from the most precedent row to the least.
    /// Each row holds indices into `binary_ops` that bind with the same
    /// tightness. An operator appears in at most one row; operators in no
    /// row are invisible to the parser.
    pub precedence_rows: Vec<Vec<usize>>,
}

impl Config {
    /// Creates a configuration with no operators at all.
    #[must_use]
    pub fn empty() -> Self {
        Self { prefix_ops:      Vec::new(),
               suffix_ops:      Vec::new(),
               binary_ops:      Vec::new(),
               precedence_rows: Vec::new(), }
    }

    // Prefix operators

    /// Appends a new unary prefix operator.
    ///
    /// # Errors
    /// Fails with [`ConfigError::LogicError`] when the symbol is already
    /// registered as a prefix operator.
    pub fn add_prefix_op(&mut self, op: UnaryOperator) -> Result<(), ConfigError> {
        if self.has_prefix_op(&op.symbol) {
            return Err(ConfigError::LogicError(format!(
                "unary prefix operator '{}' already exists",
                op.symbol
            )));
        }
        self.prefix_ops.push(op);
        Ok(())
    }

    /// Removes a unary prefix operator.
    ///
    /// # Errors
    /// Fails with [`ConfigError::InvalidArgument`] when no such operator is
    /// registered.
    pub fn remove_prefix_op(&mut self, symbol: &str) -> Result<(), ConfigError> {
        let index = self.find_prefix_op(symbol)
                        .ok_or_else(|| unknown_operator("unary prefix", symbol))?;
        self.prefix_ops.remove(index);
        Ok(())
    }

    /// Finds the index of a unary prefix operator.
    #[must_use]
    pub fn find_prefix_op(&self, symbol: &str) -> Option<usize> {
        self.prefix_ops.iter().position(|op| op.symbol == symbol)
    }

    /// Returns true when a unary prefix operator with this symbol exists.
    #[must_use]
    pub fn has_prefix_op(&self, symbol: &str) -> bool {
        self.find_prefix_op(symbol).is_some()
    }

    /// Gets a unary prefix operator by symbol.
    ///
    /// # Errors
    /// Fails with [`ConfigError::InvalidArgument`] when no such operator is
    /// registered.
    pub fn get_prefix_op(&self, symbol: &str) -> Result<&UnaryOperator, ConfigError> {
        self.find_prefix_op(symbol)
            .map(|index| &self.prefix_ops[index])
            .ok_or_else(|| unknown_operator("unary prefix", symbol))
    }

    // Suffix operators

    /// Appends a new unary suffix operator.
    ///
    /// # Errors
    /// Fails with [`ConfigError::LogicError`] when the symbol is already
    /// registered as a suffix operator.
    pub fn add_suffix_op(&mut self, op: UnaryOperator) -> Result<(), ConfigError> {
        if self.has_suffix_op(&op.symbol) {
            return Err(ConfigError::LogicError(format!(
                "unary suffix operator '{}' already exists",
                op.symbol
            )));
        }
        self.suffix_ops.push(op);
        Ok(())
    }

    /// Removes a unary suffix operator.
    ///
    /// # Errors
    /// Fails with [`ConfigError::InvalidArgument`] when no such operator is
    /// registered.
    pub fn remove_suffix_op(&mut self, symbol: &str) -> Result<(), ConfigError> {
        let index = self.find_suffix_op(symbol)
                        .ok_or_else(|| unknown_operator("unary suffix", symbol))?;
        self.suffix_ops.remove(index);
        Ok(())
    }

    /// Finds the index of a unary suffix operator.
    #[must_use]
    pub fn find_suffix_op(&self, symbol: &str) -> Option<usize> {
        self.suffix_ops.iter().position(|op| op.symbol == symbol)
    }

    /// Returns true when a unary suffix operator with this symbol exists.
    #[must_use]
    pub fn has_suffix_op(&self, symbol: &str) -> bool {
        self.find_suffix_op(symbol).is_some()
    }

    /// Gets a unary suffix operator by symbol.
    ///
    /// # Errors
    /// Fails with [`ConfigError::InvalidArgument`] when no such operator is
    /// registered.
    pub fn get_suffix_op(&self, symbol: &str) -> Result<&UnaryOperator, ConfigError> {
        self.find_suffix_op(symbol)
            .map(|index| &self.suffix_ops[index])
            .ok_or_else(|| unknown_operator("unary suffix", symbol))
    }

    // Binary operators

    /// Appends a new binary operator. Remember to assign a precedence to the
    /// operator afterwards, or the parser will not see it.
    ///
    /// # Errors
    /// Fails with [`ConfigError::LogicError`] when the symbol is already
    /// registered as a binary operator.
    pub fn add_binary_op(&mut self, op: BinaryOperator) -> Result<(), ConfigError> {
        if self.has_binary_op(&op.symbol) {
            return Err(ConfigError::LogicError(format!(
                "binary operator '{}' already exists",
                op.symbol
            )));
        }
        self.binary_ops.push(op);
        Ok(())
    }

    /// Removes a binary operator, along with its precedence entry. Stored
    /// indices of the operators after it shift down by one.
    ///
    /// # Errors
    /// Fails with [`ConfigError::InvalidArgument`] when no such operator is
    /// registered.
    pub fn remove_binary_op(&mut self, symbol: &str) -> Result<(), ConfigError> {
        let index = self.find_binary_op(symbol)
                        .ok_or_else(|| unknown_operator("binary", symbol))?;

        self.unassign_precedence(symbol)?;
        self.binary_ops.remove(index);

        for row in &mut self.precedence_rows {
            for entry in row.iter_mut() {
                if *entry > index {
                    *entry -= 1;
                }
            }
        }

        Ok(())
    }

    /// Finds the index of a binary operator. Existence does not imply that
    /// the operator has a precedence level assigned.
    #[must_use]
    pub fn find_binary_op(&self, symbol: &str) -> Option<usize> {
        self.binary_ops.iter().position(|op| op.symbol == symbol)
    }

    /// Returns true when a binary operator with this symbol exists.
    #[must_use]
    pub fn has_binary_op(&self, symbol: &str) -> bool {
        self.find_binary_op(symbol).is_some()
    }

    /// Gets a binary operator by symbol.
    ///
    /// # Errors
    /// Fails with [`ConfigError::InvalidArgument`] when no such operator is
    /// registered.
    pub fn get_binary_op(&self, symbol: &str) -> Result<&BinaryOperator, ConfigError> {
        self.find_binary_op(symbol)
            .map(|index| &self.binary_ops[index])
            .ok_or_else(|| unknown_operator("binary", symbol))
    }

    // Precedence table

    /// Assigns a precedence level to a binary operator.
    ///
    /// When `insert_new_row` is true, an empty row is inserted at `row` and
    /// later rows shift down by one before the operator is appended to it.
    ///
    /// When `override_existing` is true and the operator already has a row,
    /// it is removed from that row first; a row left empty by the removal is
    /// deleted, and `row` is adjusted when it pointed past the deleted one.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidArgument`] when no such operator is
    ///   registered.
    /// - [`ConfigError::LogicError`] when the operator already has a row and
    ///   `override_existing` is false.
    /// - [`ConfigError::OutOfRange`] when `row` is out of range.
    pub fn assign_precedence(&mut self,
                             symbol: &str,
                             row: usize,
                             insert_new_row: bool,
                             override_existing: bool)
                             -> Result<(), ConfigError> {
        let index = self.find_binary_op(symbol)
                        .ok_or_else(|| unknown_operator("binary", symbol))?;
        let mut row = row;

        // Operator may already sit in a precedence row
        for i in 0..self.precedence_rows.len() {
            let Some(found) = self.precedence_rows[i].iter().position(|&entry| entry == index)
            else {
                continue;
            };

            if !override_existing {
                return Err(ConfigError::LogicError(format!(
                    "operator '{symbol}' already exists in precedence level {i}"
                )));
            }

            self.precedence_rows[i].remove(found);
            if self.precedence_rows[i].is_empty() {
                self.precedence_rows.remove(i);

                // Adjust the target level if we deleted a row before it
                if i < row {
                    row -= 1;
                }
            }

            break;
        }

        if insert_new_row {
            if row > self.precedence_rows.len() {
                return Err(ConfigError::OutOfRange(format!(
                    "cannot insert precedence level {row}, it is out of range"
                )));
            }
            self.precedence_rows.insert(row, Vec::new());
        }

        if row >= self.precedence_rows.len() {
            return Err(ConfigError::OutOfRange(format!(
                "cannot assign precedence level {row}, it is out of range"
            )));
        }

        self.precedence_rows[row].push(index);
        Ok(())
    }

    /// Assigns the least precedence to a binary operator, either by
    /// appending to the current lowest row or by creating a new one below
    /// it when `insert_new_row` is true.
    ///
    /// # Errors
    /// Same as [`Config::assign_precedence`].
    pub fn assign_precedence_lowest(&mut self,
                                    symbol: &str,
                                    insert_new_row: bool,
                                    override_existing: bool)
                                    -> Result<(), ConfigError> {
        let row = if insert_new_row {
            self.precedence_rows.len()
        } else {
            self.precedence_rows
                .len()
                .checked_sub(1)
                .ok_or_else(|| ConfigError::OutOfRange("the precedence table is empty".to_string()))?
        };

        self.assign_precedence(symbol, row, insert_new_row, override_existing)
    }

    /// Removes a binary operator from the precedence table, deleting its row
    /// when that row becomes empty. Unassigned operators stay registered but
    /// are invisible to the parser.
    ///
    /// # Errors
    /// Fails with [`ConfigError::InvalidArgument`] when no such operator is
    /// registered.
    pub fn unassign_precedence(&mut self, symbol: &str) -> Result<(), ConfigError> {
        let index = self.find_binary_op(symbol)
                        .ok_or_else(|| unknown_operator("binary", symbol))?;

        for i in 0..self.precedence_rows.len() {
            let Some(found) = self.precedence_rows[i].iter().position(|&entry| entry == index)
            else {
                continue;
            };

            self.precedence_rows[i].remove(found);
            if self.precedence_rows[i].is_empty() {
                self.precedence_rows.remove(i);
            }

            // The operator sits in at most one row
            break;
        }

        Ok(())
    }

    /// Gets the precedence level of a binary operator, or `None` when the
    /// operator has no precedence assigned.
    ///
    /// # Errors
    /// Fails with [`ConfigError::InvalidArgument`] when no such operator is
    /// registered.
    pub fn precedence_of(&self, symbol: &str) -> Result<Option<usize>, ConfigError> {
        let index = self.find_binary_op(symbol)
                        .ok_or_else(|| unknown_operator("binary", symbol))?;

        Ok(self.precedence_rows.iter().position(|row| row.contains(&index)))
    }
}

fn unknown_operator(group: &str, symbol: &str) -> ConfigError {
    ConfigError::InvalidArgument(format!("cannot find {group} operator '{symbol}'"))
}
