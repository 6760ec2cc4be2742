/*!
Tri-state truth values, symbol names, and assignment lists.
*/

use std::{fmt::Display, str::FromStr};

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum SymbolParseError {
    #[snafu(display("Symbol name is empty"))]
    EmptyName,
    #[snafu(display(
        "Symbol name '{}' must start with a letter and contain only letters and digits",
        name
    ))]
    InvalidName { name: String },
    #[snafu(display("'{}' is a connective keyword and cannot name a symbol", name))]
    ReservedName { name: String },
}

/// Truth value of a symbol or sentence under a model.
///
/// `Undefined` is the state of every symbol no model has assigned yet; it
/// propagates through the connectives instead of being guessed away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicValue {
    True,
    False,
    Undefined,
}

impl Default for LogicValue {
    fn default() -> Self {
        LogicValue::Undefined
    }
}

impl LogicValue {
    pub fn is_true(self) -> bool {
        self == LogicValue::True
    }

    pub fn is_false(self) -> bool {
        self == LogicValue::False
    }

    /// Three-valued conjunction. A single `False` side decides the result.
    pub fn and(self, other: LogicValue) -> LogicValue {
        match (self, other) {
            (LogicValue::False, _) | (_, LogicValue::False) => LogicValue::False,
            (LogicValue::True, LogicValue::True) => LogicValue::True,
            _ => LogicValue::Undefined,
        }
    }

    /// Three-valued disjunction. A single `True` side decides the result.
    pub fn or(self, other: LogicValue) -> LogicValue {
        match (self, other) {
            (LogicValue::True, _) | (_, LogicValue::True) => LogicValue::True,
            (LogicValue::False, LogicValue::False) => LogicValue::False,
            _ => LogicValue::Undefined,
        }
    }

    pub fn implies(self, other: LogicValue) -> LogicValue {
        match (self, other) {
            (LogicValue::False, _) | (_, LogicValue::True) => LogicValue::True,
            (LogicValue::True, LogicValue::False) => LogicValue::False,
            _ => LogicValue::Undefined,
        }
    }

    pub fn iff(self, other: LogicValue) -> LogicValue {
        self.implies(other).and(other.implies(self))
    }
}

impl std::ops::Not for LogicValue {
    type Output = LogicValue;

    fn not(self) -> Self::Output {
        match self {
            LogicValue::True => LogicValue::False,
            LogicValue::False => LogicValue::True,
            LogicValue::Undefined => LogicValue::Undefined,
        }
    }
}

impl Display for LogicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicValue::True => write!(f, "True"),
            LogicValue::False => write!(f, "False"),
            LogicValue::Undefined => write!(f, "Undefined"),
        }
    }
}

/// Newtype wrapper for a propositional symbol name.
/// Invariant: lowercase, a letter followed by letters or digits, and not a
/// connective keyword.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = SymbolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ensure!(!s.is_empty(), EmptyName);

        let name = s.to_ascii_lowercase();
        let well_formed = name
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic())
            && name.chars().all(|c| c.is_ascii_alphanumeric());
        ensure!(well_formed, InvalidName { name: s });
        ensure!(name != "and" && name != "or", ReservedName { name: s });

        Ok(Symbol(name))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A symbol paired with its assigned truth value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicSymbol {
    symbol: Symbol,
    value: LogicValue,
}

impl LogicSymbol {
    pub fn new(symbol: Symbol) -> Self {
        LogicSymbol {
            symbol,
            value: LogicValue::Undefined,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn value(&self) -> LogicValue {
        self.value
    }
}

impl Display for LogicSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.symbol, self.value)
    }
}

/// Ordered, duplicate-free list of symbols with their truth values.
///
/// Serves two roles during inference: the set of still-unassigned variables
/// and the (partial) model itself. Cloning yields an independent copy, which
/// is what makes backtracking search correct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolList {
    symbols: Vec<LogicSymbol>,
}

impl SymbolList {
    pub fn new() -> Self {
        SymbolList {
            symbols: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Adds a symbol with value `Undefined`. Re-adding an existing symbol
    /// keeps its current value.
    pub fn add(&mut self, symbol: Symbol) {
        if self.position(&symbol).is_none() {
            self.symbols.push(LogicSymbol::new(symbol));
        }
    }

    /// Adds a symbol with an explicit value, overwriting the value if the
    /// symbol is already present.
    pub fn add_with_value(&mut self, symbol: Symbol, value: LogicValue) {
        match self.position(&symbol) {
            Some(index) => self.symbols[index].value = value,
            None => self.symbols.push(LogicSymbol { symbol, value }),
        }
    }

    /// Adds every symbol of `other` that is not present yet. Values of
    /// existing symbols are left alone.
    pub fn merge(&mut self, other: &SymbolList) {
        for entry in other.iter() {
            self.add(entry.symbol().clone());
        }
    }

    fn position(&self, symbol: &Symbol) -> Option<usize> {
        self.symbols.iter().position(|s| s.symbol() == symbol)
    }

    pub fn find(&self, symbol: &Symbol) -> Option<&LogicSymbol> {
        self.symbols.iter().find(|s| s.symbol() == symbol)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.position(symbol).is_some()
    }

    /// Value lookup; a symbol not in the list reads as `Undefined`.
    pub fn value(&self, symbol: &Symbol) -> LogicValue {
        self.find(symbol).map(LogicSymbol::value).unwrap_or_default()
    }

    pub fn is_true(&self, symbol: &Symbol) -> bool {
        self.value(symbol).is_true()
    }

    pub fn is_false(&self, symbol: &Symbol) -> bool {
        self.value(symbol).is_false()
    }

    /// Sets the value of an existing symbol. Unknown symbols are ignored.
    pub fn set_value(&mut self, symbol: &Symbol, value: LogicValue) {
        if let Some(index) = self.position(symbol) {
            self.symbols[index].value = value;
        }
    }

    pub fn remove(&mut self, symbol: &Symbol) {
        if let Some(index) = self.position(symbol) {
            self.symbols.remove(index);
        }
    }

    /// Removes and returns the front symbol.
    pub fn pop_front(&mut self) -> Option<LogicSymbol> {
        if self.symbols.is_empty() {
            None
        } else {
            Some(self.symbols.remove(0))
        }
    }

    pub fn get(&self, index: usize) -> Option<&LogicSymbol> {
        self.symbols.get(index)
    }

    pub fn sort(&mut self) {
        self.symbols.sort_by(|a, b| a.symbol().cmp(b.symbol()));
    }

    /// Clone of this list with one value changed; `self` stays untouched.
    pub fn with_value(&self, symbol: &Symbol, value: LogicValue) -> SymbolList {
        let mut extended = self.clone();
        extended.set_value(symbol, value);
        extended
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogicSymbol> + '_ {
        self.symbols.iter()
    }
}

impl Display for SymbolList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut iter = self.symbols.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for entry in iter {
            write!(f, ", {}", entry)?;
        }

        Ok(())
    }
}
