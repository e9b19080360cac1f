//! Symbols and the per-procedure symbol table.
//!
//! The front end resolves names before the middle-end runs, so the engine only ever sees
//! [`SymbolId`]s. A symbol is a *variable* when it can be the target of a tracked definition:
//! locals, parameters and the flattened fields of aggregate parameters. Aggregates themselves
//! and procedure symbols (callees) are never variables.

use std::fmt;

use crate::{Error, Result};

/// Identifier of a symbol within a procedure's [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(usize);

impl SymbolId {
    /// Creates a symbol id from a raw table index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym{}", self.0)
    }
}

/// The role a symbol plays in its procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// A procedure-local scalar.
    Local,
    /// A scalar formal parameter.
    Parameter,
    /// A scalar field of an aggregate parameter, flattened into its own variable.
    Field {
        /// The aggregate this field was flattened out of
        aggregate: SymbolId,
    },
    /// An aggregate parameter. Only its fields are tracked.
    Aggregate {
        /// The flattened fields, in declaration order
        fields: Vec<SymbolId>,
    },
    /// A callee. Appears as the target of call statements.
    Procedure,
}

/// A named entry of the symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Source-level name. Flattened fields are named `aggregate.field`.
    pub name: String,
    /// What the symbol is
    pub kind: SymbolKind,
}

impl Symbol {
    /// Returns `true` if definitions of this symbol are tracked by the dataflow engine.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Local | SymbolKind::Parameter | SymbolKind::Field { .. }
        )
    }
}

/// The symbols visible inside one procedure.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a symbol and returns its id.
    pub fn add(&mut self, name: impl Into<String>, kind: SymbolKind) -> SymbolId {
        let id = SymbolId::new(self.symbols.len());
        self.symbols.push(Symbol {
            name: name.into(),
            kind,
        });
        id
    }

    /// Adds an aggregate parameter together with one flattened field variable per name.
    ///
    /// # Returns
    ///
    /// The aggregate's id followed by the field ids in the order given.
    pub fn add_aggregate(&mut self, name: &str, fields: &[&str]) -> (SymbolId, Vec<SymbolId>) {
        let aggregate = self.add(name, SymbolKind::Aggregate { fields: Vec::new() });
        let ids: Vec<SymbolId> = fields
            .iter()
            .map(|field| self.add(format!("{name}.{field}"), SymbolKind::Field { aggregate }))
            .collect();
        self.symbols[aggregate.index()].kind = SymbolKind::Aggregate {
            fields: ids.clone(),
        };
        (aggregate, ids)
    }

    /// Returns the symbol for `id`, if it belongs to this table.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// Returns the symbol for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSymbol`] if `id` is not part of this table.
    pub fn resolve(&self, id: SymbolId) -> Result<&Symbol> {
        self.get(id).ok_or(Error::UnknownSymbol(id))
    }

    /// Returns the name of `id`, or a placeholder for ids outside the table.
    #[must_use]
    pub fn name(&self, id: SymbolId) -> &str {
        self.get(id).map_or("<unknown>", |symbol| symbol.name.as_str())
    }

    /// Returns `true` if `id` names a tracked variable.
    #[must_use]
    pub fn is_variable(&self, id: SymbolId) -> bool {
        self.get(id).is_some_and(Symbol::is_variable)
    }

    /// Returns the number of symbols, variables or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if the table holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates over all symbols with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| (SymbolId::new(index), symbol))
    }

    /// Iterates over the ids of all tracked variables.
    pub fn variables(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.iter()
            .filter(|(_, symbol)| symbol.is_variable())
            .map(|(id, _)| id)
    }
}
