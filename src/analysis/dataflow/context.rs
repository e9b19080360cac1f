//! Per-run state of the dataflow engine.

use crate::{
    analysis::dataflow::{
        ControlFlowEdges, DataflowResults, DefUseChains, DefinitionCatalog, EngineConfig,
        ReachingDefinitions, LOOP_SOLVE_PASSES,
    },
    compiler::{EventKind, EventLog},
    ir::Procedure,
    Result,
};

/// Explicit state threaded through the four analysis stages of one procedure.
///
/// Each stage stores its output in a side table owned by the context. Rebuilding a stage
/// discards the output of every stage depending on it, so vectors of a stale width can never
/// be combined with a fresh catalog. Stages whose prerequisites are missing fail with
/// [`Error::Inconsistent`](crate::Error::Inconsistent).
///
/// # Examples
///
/// ```rust
/// use hlsflow::{analysis::dataflow::DataflowContext, ir::ProcedureBuilder, EngineConfig};
///
/// let mut b = ProcedureBuilder::new("stages");
/// let root = b.mark();
/// let procedure = b.finish(root)?;
///
/// let config = EngineConfig::default();
/// let mut ctx = DataflowContext::new(&procedure, &config);
/// assert!(ctx.solve().is_err());
///
/// ctx.build_catalog()?;
/// ctx.build_edges()?;
/// ctx.solve()?;
/// ctx.build_chains()?;
/// let results = ctx.into_results()?;
/// assert_eq!(results.definition_count(), 0);
/// # Ok::<(), hlsflow::Error>(())
/// ```
#[derive(Debug)]
pub struct DataflowContext<'p> {
    procedure: &'p Procedure,
    record_events: bool,
    verify_chains: bool,
    loop_passes: usize,
    events: EventLog,
    catalog: Option<DefinitionCatalog>,
    edges: Option<ControlFlowEdges>,
    reaching: Option<ReachingDefinitions>,
    chains: Option<DefUseChains>,
}

impl<'p> DataflowContext<'p> {
    /// Creates an empty context for `procedure`.
    #[must_use]
    pub fn new(procedure: &'p Procedure, config: &EngineConfig) -> Self {
        Self {
            procedure,
            record_events: config.record_events,
            verify_chains: config.verify_chains,
            loop_passes: LOOP_SOLVE_PASSES,
            events: EventLog::new(),
            catalog: None,
            edges: None,
            reaching: None,
            chains: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_loop_passes(mut self, passes: usize) -> Self {
        self.loop_passes = passes;
        self
    }

    /// Returns the procedure under analysis.
    #[must_use]
    pub const fn procedure(&self) -> &'p Procedure {
        self.procedure
    }

    /// Returns the events recorded so far.
    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    fn note(&self, kind: EventKind, message: impl FnOnce() -> String) {
        if self.record_events {
            self.events
                .record(kind)
                .procedure(self.procedure.name())
                .message(message());
        }
    }

    /// Discards every annotation of this context.
    pub fn clear(&mut self) {
        let had_results = self.catalog.is_some()
            || self.edges.is_some()
            || self.reaching.is_some()
            || self.chains.is_some();

        self.catalog = None;
        self.edges = None;
        self.reaching = None;
        self.chains = None;

        if had_results {
            self.note(EventKind::ResultsCleared, || {
                "previous annotations discarded".to_string()
            });
        }
    }

    /// Builds the definition catalog, discarding the solution and chains.
    ///
    /// # Errors
    ///
    /// Propagates the structural errors of [`DefinitionCatalog::build`].
    pub fn build_catalog(&mut self) -> Result<&DefinitionCatalog> {
        self.reaching = None;
        self.chains = None;
        self.catalog = None;

        let catalog = DefinitionCatalog::build(self.procedure)?;
        self.note(EventKind::CatalogBuilt, || {
            format!("{} definitions", catalog.len())
        });
        Ok(self.catalog.insert(catalog))
    }

    /// Builds the control-flow edges, discarding the solution and chains.
    ///
    /// # Errors
    ///
    /// Propagates the structural errors of [`ControlFlowEdges::build`].
    pub fn build_edges(&mut self) -> Result<&ControlFlowEdges> {
        self.reaching = None;
        self.chains = None;
        self.edges = None;

        let edges = ControlFlowEdges::build(self.procedure)?;
        self.note(EventKind::EdgesBuilt, || {
            format!("{} edges", edges.edge_count())
        });
        Ok(self.edges.insert(edges))
    }

    /// Solves reaching definitions, discarding the chains.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) if the catalog or the edges
    /// have not been built.
    pub fn solve(&mut self) -> Result<&ReachingDefinitions> {
        self.chains = None;
        self.reaching = None;

        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| inconsistent_error!("solve requires the definition catalog"))?;
        let edges = self
            .edges
            .as_ref()
            .ok_or_else(|| inconsistent_error!("solve requires the control-flow edges"))?;

        let solution =
            ReachingDefinitions::solve_with_passes(self.procedure, catalog, edges, self.loop_passes)?;
        self.note(EventKind::Solved, || {
            format!(
                "{} statements, width {}",
                self.procedure.statement_count(),
                solution.width()
            )
        });
        Ok(self.reaching.insert(solution))
    }

    /// Builds the def/use chains and verifies them if configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) if the catalog or the
    /// solution is missing, or if verification finds a one-sided link.
    pub fn build_chains(&mut self) -> Result<&DefUseChains> {
        self.chains = None;

        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| inconsistent_error!("chains require the definition catalog"))?;
        let reaching = self
            .reaching
            .as_ref()
            .ok_or_else(|| inconsistent_error!("chains require reaching definitions"))?;

        let chains = DefUseChains::build(self.procedure, catalog, reaching)?;
        if self.verify_chains {
            chains.verify()?;
        }
        self.note(EventKind::ChainsBuilt, || {
            format!(
                "{} uses, {} links",
                self.procedure.use_count(),
                chains.link_count()
            )
        });
        Ok(self.chains.insert(chains))
    }

    /// Returns the catalog, if built.
    #[must_use]
    pub const fn catalog(&self) -> Option<&DefinitionCatalog> {
        self.catalog.as_ref()
    }

    /// Returns the edges, if built.
    #[must_use]
    pub const fn edges(&self) -> Option<&ControlFlowEdges> {
        self.edges.as_ref()
    }

    /// Returns the reaching-definitions solution, if solved.
    #[must_use]
    pub const fn reaching(&self) -> Option<&ReachingDefinitions> {
        self.reaching.as_ref()
    }

    /// Returns the chains, if built.
    #[must_use]
    pub const fn chains(&self) -> Option<&DefUseChains> {
        self.chains.as_ref()
    }

    /// Packages the four stage outputs into immutable results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) unless every stage has run.
    pub fn into_results(self) -> Result<DataflowResults> {
        match (self.catalog, self.edges, self.reaching, self.chains) {
            (Some(catalog), Some(edges), Some(reaching), Some(chains)) => Ok(DataflowResults {
                procedure: self.procedure.id(),
                name: self.procedure.name().to_string(),
                catalog,
                edges,
                reaching,
                chains,
                events: self.events,
            }),
            _ => Err(inconsistent_error!(
                "results of '{}' requested before every stage ran",
                self.procedure.name()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::while_loop, Error};

    #[test]
    fn test_chains_require_solution() {
        let fixture = while_loop();
        let config = EngineConfig::default();
        let mut ctx = DataflowContext::new(&fixture.procedure, &config);

        ctx.build_catalog().unwrap();
        assert!(matches!(ctx.build_chains(), Err(Error::Inconsistent { .. })));
    }

    #[test]
    fn test_rebuilding_catalog_discards_downstream() {
        let fixture = while_loop();
        let config = EngineConfig::default();
        let mut ctx = DataflowContext::new(&fixture.procedure, &config);

        ctx.build_catalog().unwrap();
        ctx.build_edges().unwrap();
        ctx.solve().unwrap();
        ctx.build_chains().unwrap();
        assert!(ctx.chains().is_some());

        ctx.build_catalog().unwrap();
        assert!(ctx.reaching().is_none());
        assert!(ctx.chains().is_none());
        assert!(ctx.edges().is_some());
    }

    #[test]
    fn test_clear_records_event() {
        let fixture = while_loop();
        let config = EngineConfig::default();
        let mut ctx = DataflowContext::new(&fixture.procedure, &config);

        ctx.clear();
        assert!(!ctx.events().has(EventKind::ResultsCleared));

        ctx.build_catalog().unwrap();
        ctx.clear();
        assert!(ctx.catalog().is_none());
        assert_eq!(ctx.events().count_kind(EventKind::ResultsCleared), 1);
    }

    #[test]
    fn test_events_disabled() {
        let fixture = while_loop();
        let config = EngineConfig::default().with_events(false);
        let mut ctx = DataflowContext::new(&fixture.procedure, &config);

        ctx.build_catalog().unwrap();
        ctx.build_edges().unwrap();
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn test_incomplete_results_rejected() {
        let fixture = while_loop();
        let config = EngineConfig::default();
        let mut ctx = DataflowContext::new(&fixture.procedure, &config);
        ctx.build_catalog().unwrap();
        assert!(matches!(ctx.into_results(), Err(Error::Inconsistent { .. })));
    }

    #[test]
    fn test_single_pass_context() {
        let fixture = while_loop();
        let config = EngineConfig::default();
        let mut ctx = DataflowContext::new(&fixture.procedure, &config).with_loop_passes(1);
        ctx.build_catalog().unwrap();
        ctx.build_edges().unwrap();
        ctx.solve().unwrap();
        let results = ctx.build_chains().unwrap();

        let read = fixture.procedure.uses_in(fixture.read).next().unwrap();
        assert_eq!(results.reaching_defs(read).len(), 1);
    }
}
