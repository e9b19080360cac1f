//! The immutable outcome of one engine run.

use crate::{
    analysis::dataflow::{
        ControlFlowEdges, DefId, DefUseChains, Definition, DefinitionCatalog, ReachingDefinitions,
    },
    compiler::EventLog,
    ir::{Procedure, ProcedureId, StmtId, SymbolId, UseId},
    utils::BitVector,
    Result,
};

/// All annotations computed for one procedure.
///
/// Produced by [`DataflowEngine::run`](crate::DataflowEngine::run). Results are tied to the
/// [`Procedure`] they were computed for; every method that takes the procedure checks this and
/// fails with [`Error::Inconsistent`](crate::Error::Inconsistent) on a mismatch. Any change to
/// the tree requires a fresh run, since definition indices are reassigned.
#[derive(Debug, Clone)]
pub struct DataflowResults {
    pub(crate) procedure: ProcedureId,
    pub(crate) name: String,
    pub(crate) catalog: DefinitionCatalog,
    pub(crate) edges: ControlFlowEdges,
    pub(crate) reaching: ReachingDefinitions,
    pub(crate) chains: DefUseChains,
    pub(crate) events: EventLog,
}

impl DataflowResults {
    /// Returns the id of the analyzed procedure.
    #[must_use]
    pub const fn procedure_id(&self) -> ProcedureId {
        self.procedure
    }

    /// Returns the name of the analyzed procedure.
    #[must_use]
    pub fn procedure_name(&self) -> &str {
        &self.name
    }

    /// Fails unless these results were computed for `procedure`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) on a mismatch.
    pub fn ensure_matches(&self, procedure: &Procedure) -> Result<()> {
        if self.procedure == procedure.id() {
            Ok(())
        } else {
            Err(inconsistent_error!(
                "results of '{}' ({}) used with '{}' ({})",
                self.name,
                self.procedure,
                procedure.name(),
                procedure.id()
            ))
        }
    }

    /// Returns `N`, the number of definitions.
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.catalog.len()
    }

    /// Returns the definition at `id`.
    #[must_use]
    pub fn definition(&self, id: DefId) -> Option<&Definition> {
        self.catalog.get(id)
    }

    /// Returns the definitions attributed to `statement`.
    #[must_use]
    pub fn definitions_at(&self, statement: StmtId) -> &[DefId] {
        self.catalog.definitions_at(statement)
    }

    /// Returns every definition of `variable`.
    #[must_use]
    pub fn definitions_of(&self, variable: SymbolId) -> &[DefId] {
        self.catalog.definitions_of(variable)
    }

    /// Returns the IN vector of `statement`.
    #[must_use]
    pub fn in_set(&self, statement: StmtId) -> Option<&BitVector> {
        self.reaching.in_set(statement)
    }

    /// Returns the OUT vector of `statement`.
    #[must_use]
    pub fn out_set(&self, statement: StmtId) -> Option<&BitVector> {
        self.reaching.out_set(statement)
    }

    /// Returns the KILL vector of `statement`, present only for defining statements.
    #[must_use]
    pub fn kill_set(&self, statement: StmtId) -> Option<&BitVector> {
        self.reaching.kill_set(statement)
    }

    /// Returns the predecessors of `statement`.
    #[must_use]
    pub fn predecessors(&self, statement: StmtId) -> &[StmtId] {
        self.edges.predecessors(statement).unwrap_or(&[])
    }

    /// Returns the successors of `statement`.
    #[must_use]
    pub fn successors(&self, statement: StmtId) -> &[StmtId] {
        self.edges.successors(statement).unwrap_or(&[])
    }

    /// Returns the definitions reaching `use_id`.
    #[must_use]
    pub fn reaching_defs(&self, use_id: UseId) -> &[DefId] {
        self.chains.reaching_defs(use_id)
    }

    /// Returns the uses reached by `def`.
    #[must_use]
    pub fn reached_uses(&self, def: DefId) -> &[UseId] {
        self.chains.reached_uses(def)
    }

    /// Returns every use reached by any definition of `statement`, without duplicates.
    #[must_use]
    pub fn reached_uses_of_statement(&self, statement: StmtId) -> Vec<UseId> {
        let mut uses: Vec<UseId> = self
            .definitions_at(statement)
            .iter()
            .flat_map(|&def| self.reached_uses(def).iter().copied())
            .collect();
        uses.sort_unstable();
        uses.dedup();
        uses
    }

    /// Returns the definition catalog.
    #[must_use]
    pub const fn catalog(&self) -> &DefinitionCatalog {
        &self.catalog
    }

    /// Returns the control-flow edges.
    #[must_use]
    pub const fn edges(&self) -> &ControlFlowEdges {
        &self.edges
    }

    /// Returns the reaching-definitions solution.
    #[must_use]
    pub const fn reaching(&self) -> &ReachingDefinitions {
        &self.reaching
    }

    /// Returns the def/use chains.
    #[must_use]
    pub const fn chains(&self) -> &DefUseChains {
        &self.chains
    }

    /// Returns the events recorded while computing these results.
    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }
}
