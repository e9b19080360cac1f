//! A procedure: a validated statement tree with its symbol table and variable reads.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::ir::{Statement, StmtId, SymbolId, SymbolTable};

static NEXT_PROCEDURE_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a built [`Procedure`].
///
/// Analysis results remember the id of the procedure they were computed for, so they cannot be
/// silently applied to a different tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcedureId(u64);

impl ProcedureId {
    pub(crate) fn next() -> Self {
        Self(NEXT_PROCEDURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ProcedureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proc{}", self.0)
    }
}

/// Identifier of a variable read within a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UseId(usize);

impl UseId {
    /// Creates a use id from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for UseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// One read of a symbol, attributed to the statement whose own expression performs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Use {
    /// The symbol read
    pub symbol: SymbolId,
    /// The statement evaluating the read
    pub statement: StmtId,
}

/// A validated procedure.
///
/// Produced by [`ProcedureBuilder::finish`](crate::ir::ProcedureBuilder::finish). Every
/// statement in the arena is reachable from the root exactly once, so the arena and the tree
/// coincide.
#[derive(Debug, Clone)]
pub struct Procedure {
    pub(crate) id: ProcedureId,
    pub(crate) name: String,
    pub(crate) symbols: SymbolTable,
    pub(crate) statements: Vec<Statement>,
    pub(crate) root: StmtId,
    pub(crate) uses: Vec<Use>,
    /// Statements in document order
    pub(crate) order: Vec<StmtId>,
    /// Document position of each statement, indexed by arena index
    pub(crate) positions: Vec<usize>,
    pub(crate) parents: Vec<Option<StmtId>>,
}

impl Procedure {
    /// Returns the process-unique id of this procedure.
    #[must_use]
    pub const fn id(&self) -> ProcedureId {
        self.id
    }

    /// Returns the procedure's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the symbol table.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Returns the root statement.
    #[must_use]
    pub const fn root(&self) -> StmtId {
        self.root
    }

    /// Returns the number of statements.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    /// Returns the statement for `id`.
    #[must_use]
    pub fn statement(&self, id: StmtId) -> Option<&Statement> {
        self.statements.get(id.index())
    }

    /// Iterates over every statement with its id, in arena order.
    pub fn statements(&self) -> impl Iterator<Item = (StmtId, &Statement)> {
        self.statements
            .iter()
            .enumerate()
            .map(|(index, stmt)| (StmtId::new(index), stmt))
    }

    /// Returns the statements in document order.
    ///
    /// Document order is a pre-order walk: sequence children in order, then before else, and
    /// loop init, step, body.
    #[must_use]
    pub fn document_order(&self) -> &[StmtId] {
        &self.order
    }

    /// Returns the document position of `id`.
    #[must_use]
    pub fn position(&self, id: StmtId) -> Option<usize> {
        self.positions.get(id.index()).copied()
    }

    /// Returns the statement directly containing `id`, or `None` for the root.
    #[must_use]
    pub fn parent(&self, id: StmtId) -> Option<StmtId> {
        self.parents.get(id.index()).copied().flatten()
    }

    /// Returns `true` if `inner` is `outer` or nested somewhere inside it.
    #[must_use]
    pub fn contains(&self, outer: StmtId, inner: StmtId) -> bool {
        let mut current = Some(inner);
        while let Some(id) = current {
            if id == outer {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Returns the number of variable reads.
    #[must_use]
    pub fn use_count(&self) -> usize {
        self.uses.len()
    }

    /// Returns the read for `id`.
    #[must_use]
    pub fn use_site(&self, id: UseId) -> Option<&Use> {
        self.uses.get(id.index())
    }

    /// Iterates over all reads in document order.
    pub fn uses(&self) -> impl Iterator<Item = (UseId, &Use)> {
        self.uses
            .iter()
            .enumerate()
            .map(|(index, site)| (UseId::new(index), site))
    }

    /// Iterates over the reads performed by `statement` itself, left to right.
    pub fn uses_in(&self, statement: StmtId) -> impl Iterator<Item = UseId> + '_ {
        self.uses()
            .filter(move |(_, site)| site.statement == statement)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use crate::test::{counted_loop, straight_line};

    #[test]
    fn test_document_order_visits_step_before_body() {
        let fixture = counted_loop();
        let procedure = &fixture.procedure;

        assert_eq!(
            procedure.document_order(),
            &[
                procedure.root(),
                fixture.before,
                fixture.lp,
                fixture.init,
                fixture.step,
                fixture.body,
                fixture.accumulate,
            ]
        );
        assert_eq!(procedure.position(fixture.step), Some(4));
        assert_eq!(procedure.position(fixture.accumulate), Some(6));
    }

    #[test]
    fn test_parents_and_containment() {
        let fixture = counted_loop();
        let procedure = &fixture.procedure;

        assert_eq!(procedure.parent(procedure.root()), None);
        assert_eq!(procedure.parent(fixture.accumulate), Some(fixture.body));
        assert_eq!(procedure.parent(fixture.step), Some(fixture.lp));
        assert!(procedure.contains(fixture.lp, fixture.accumulate));
        assert!(procedure.contains(fixture.lp, fixture.lp));
        assert!(!procedure.contains(fixture.body, fixture.step));
    }

    #[test]
    fn test_uses_attributed_to_owning_statement() {
        let fixture = counted_loop();
        let procedure = &fixture.procedure;

        // the loop test reads i and n, the step reads i, the body reads acc and i
        assert_eq!(procedure.use_count(), 5);
        assert_eq!(procedure.uses_in(fixture.lp).count(), 2);
        assert_eq!(procedure.uses_in(fixture.step).count(), 1);
        assert_eq!(procedure.uses_in(fixture.accumulate).count(), 2);
        assert_eq!(procedure.uses_in(fixture.body).count(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = straight_line();
        let b = straight_line();
        assert_ne!(a.procedure.id(), b.procedure.id());
        assert_eq!(a.procedure.name(), b.procedure.name());
    }
}
