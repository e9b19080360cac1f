//! Definition catalog.
//!
//! Enumerates every definition site of a procedure and gives each a dense index in `[0, N)`.
//! The index is the bit position used by every reaching-definitions vector of the same run.
//!
//! # Ordering
//!
//! The numbering is deterministic:
//!
//! 1. every scalar assignment, in document order (one definition each)
//! 2. every call, in document order: the destination first (if any), then one definition per
//!    by-reference argument in argument order
//!
//! A call with `K` reference outputs and a destination therefore contributes `K + 1`
//! definitions, all attributed to the call statement.

use std::fmt;

use crate::{
    ir::{Procedure, ProcedureId, StatementKind, StmtId, SymbolId},
    utils::BitVector,
    Error, Result,
};

/// Dense index of a definition within one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(usize);

impl DefId {
    /// Creates a definition id from its bit position.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the bit position of this definition.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// One definition site: a statement that may assign a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Definition {
    /// The assignment or call performing the definition
    pub statement: StmtId,
    /// The defined variable
    pub variable: SymbolId,
}

/// All definitions of a procedure with their per-variable and per-statement indexes.
#[derive(Debug, Clone)]
pub struct DefinitionCatalog {
    procedure: ProcedureId,
    definitions: Vec<Definition>,
    /// Definitions per variable, indexed by symbol index. Total over the symbol table.
    by_variable: Vec<Vec<DefId>>,
    /// Definitions per statement, indexed by arena index.
    by_statement: Vec<Vec<DefId>>,
}

impl DefinitionCatalog {
    /// Enumerates the definitions of `procedure`.
    ///
    /// # Arguments
    ///
    /// * `procedure` - The procedure to catalog
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownSymbol`] if a definition target is not in the symbol table
    /// - [`Error::NotAVariable`] if a definition target is not a scalar variable
    pub fn build(procedure: &Procedure) -> Result<Self> {
        let mut catalog = Self {
            procedure: procedure.id(),
            definitions: Vec::new(),
            by_variable: vec![Vec::new(); procedure.symbols().len()],
            by_statement: vec![Vec::new(); procedure.statement_count()],
        };

        for &id in procedure.document_order() {
            if let Some(stmt) = procedure.statement(id) {
                if let StatementKind::Assign { target, .. } = &stmt.kind {
                    catalog.add(procedure, id, *target)?;
                }
            }
        }

        for &id in procedure.document_order() {
            if let Some(stmt) = procedure.statement(id) {
                if matches!(stmt.kind, StatementKind::Call { .. }) {
                    for symbol in stmt.defined_symbols() {
                        catalog.add(procedure, id, symbol)?;
                    }
                }
            }
        }

        Ok(catalog)
    }

    fn add(&mut self, procedure: &Procedure, statement: StmtId, variable: SymbolId) -> Result<()> {
        let symbol = procedure.symbols().resolve(variable)?;
        if !symbol.is_variable() {
            return Err(Error::NotAVariable {
                symbol: variable,
                statement,
            });
        }

        let id = DefId::new(self.definitions.len());
        self.definitions.push(Definition {
            statement,
            variable,
        });
        self.by_variable[variable.index()].push(id);
        self.by_statement[statement.index()].push(id);
        Ok(())
    }

    /// Returns the id of the procedure this catalog was built for.
    #[must_use]
    pub const fn procedure(&self) -> ProcedureId {
        self.procedure
    }

    /// Returns `N`, the number of definitions and the width of every bit vector of this run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if the procedure defines nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the definition at `id`.
    #[must_use]
    pub fn get(&self, id: DefId) -> Option<&Definition> {
        self.definitions.get(id.index())
    }

    /// Iterates over all definitions in index order.
    pub fn iter(&self) -> impl Iterator<Item = (DefId, &Definition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(index, def)| (DefId::new(index), def))
    }

    /// Returns every definition of `variable`, in index order.
    ///
    /// Empty for symbols that are never defined or are not variables.
    #[must_use]
    pub fn definitions_of(&self, variable: SymbolId) -> &[DefId] {
        self.by_variable
            .get(variable.index())
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the definitions attributed to `statement`, in index order.
    #[must_use]
    pub fn definitions_at(&self, statement: StmtId) -> &[DefId] {
        self.by_statement
            .get(statement.index())
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the definitions killed by definition `id`: every other definition of the same
    /// variable.
    ///
    /// The relation is symmetric and never contains `id` itself.
    #[must_use]
    pub fn kills(&self, id: DefId) -> BitVector {
        let mut killed = BitVector::new(self.len());
        if let Some(def) = self.get(id) {
            for &other in self.definitions_of(def.variable) {
                if other != id {
                    killed.mark(other.index());
                }
            }
        }
        killed
    }

    /// Returns the KILL vector of `statement`: the union over every variable it defines of all
    /// definitions of that variable made by other statements.
    ///
    /// `None` for statements that define nothing.
    #[must_use]
    pub fn kill_set(&self, statement: StmtId) -> Option<BitVector> {
        let own = self.definitions_at(statement);
        if own.is_empty() {
            return None;
        }

        let mut killed = BitVector::new(self.len());
        for &id in own {
            if let Some(def) = self.get(id) {
                for &other in self.definitions_of(def.variable) {
                    killed.mark(other.index());
                }
            }
        }
        for &id in own {
            killed.unmark(id.index());
        }
        Some(killed)
    }

    /// Returns the GEN vector of `statement`: its own definitions.
    #[must_use]
    pub fn gen_set(&self, statement: StmtId) -> BitVector {
        BitVector::from_indices(
            self.len(),
            self.definitions_at(statement).iter().map(|id| id.index()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{CallArgument, Expression, ProcedureBuilder},
        test::straight_line,
    };

    #[test]
    fn test_assignments_before_calls() {
        let mut b = ProcedureBuilder::new("order");
        let f = b.callee("f");
        let a = b.local("a");
        let r = b.local("r");
        let x = b.local("x");
        let call = b.call(
            f,
            Some(r),
            vec![
                CallArgument::Value(Expression::load(a)),
                CallArgument::Reference(a),
            ],
        );
        let assign = b.assign(x, Expression::constant(1));
        let root = b.sequence(vec![call, assign]);
        let procedure = b.finish(root).unwrap();

        let catalog = DefinitionCatalog::build(&procedure).unwrap();
        let defs: Vec<_> = catalog
            .iter()
            .map(|(_, d)| (d.statement, d.variable))
            .collect();
        assert_eq!(defs, vec![(assign, x), (call, r), (call, a)]);
        assert_eq!(catalog.definitions_at(call), &[DefId::new(1), DefId::new(2)]);
    }

    #[test]
    fn test_straight_line_kill_sets() {
        let fixture = straight_line();
        let catalog = DefinitionCatalog::build(&fixture.procedure).unwrap();

        // x = 1; y = x; x = 2; z = x;
        assert_eq!(catalog.len(), 4);
        assert_eq!(
            catalog.definitions_of(fixture.x),
            &[DefId::new(0), DefId::new(2)]
        );

        let kill = catalog.kill_set(fixture.stmts[0]).unwrap();
        assert_eq!(kill.iter().collect::<Vec<_>>(), vec![2]);
        assert_eq!(catalog.kills(DefId::new(2)).iter().collect::<Vec<_>>(), vec![0]);
        assert!(catalog.kill_set(fixture.root).is_none());
    }

    #[test]
    fn test_gen_sets_hold_own_definitions() {
        let mut b = ProcedureBuilder::new("gen");
        let f = b.callee("f");
        let x = b.local("x");
        let r = b.local("r");
        let assign = b.assign(x, Expression::constant(1));
        let call = b.call(f, Some(r), vec![CallArgument::Reference(x)]);
        let mark = b.mark();
        let root = b.sequence(vec![assign, call, mark]);
        let procedure = b.finish(root).unwrap();
        let catalog = DefinitionCatalog::build(&procedure).unwrap();

        assert_eq!(catalog.gen_set(assign).iter().collect::<Vec<_>>(), vec![0]);
        assert_eq!(catalog.gen_set(call).iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(catalog.gen_set(mark).is_empty());
        assert_eq!(catalog.gen_set(mark).len(), 3);
    }

    #[test]
    fn test_kill_excludes_self() {
        let fixture = straight_line();
        let catalog = DefinitionCatalog::build(&fixture.procedure).unwrap();
        for (id, _) in catalog.iter() {
            assert!(!catalog.kills(id).is_marked(id.index()));
        }
    }

    #[test]
    fn test_reference_to_procedure_rejected() {
        let mut b = ProcedureBuilder::new("bad");
        let f = b.callee("f");
        let g = b.callee("g");
        let root = b.call(f, None, vec![CallArgument::Reference(g)]);
        let procedure = b.finish(root).unwrap();

        match DefinitionCatalog::build(&procedure) {
            Err(Error::NotAVariable { symbol, statement }) => {
                assert_eq!(symbol, g);
                assert_eq!(statement, root);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_assignment_to_aggregate_rejected() {
        let mut b = ProcedureBuilder::new("agg");
        let (agg, _) = b.aggregate("p", &["a"]);
        let root = b.assign(agg, Expression::constant(0));
        let procedure = b.finish(root).unwrap();

        assert!(matches!(
            DefinitionCatalog::build(&procedure),
            Err(Error::NotAVariable { .. })
        ));
    }

    #[test]
    fn test_field_definitions() {
        let mut b = ProcedureBuilder::new("fields");
        let (_, fields) = b.aggregate("p", &["re", "im"]);
        let s0 = b.assign(fields[0], Expression::constant(1));
        let s1 = b.assign(fields[1], Expression::constant(2));
        let root = b.sequence(vec![s0, s1]);
        let procedure = b.finish(root).unwrap();

        let catalog = DefinitionCatalog::build(&procedure).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.kill_set(s0).unwrap().is_empty());
    }
}
