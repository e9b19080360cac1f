//! The dataflow engine driver.

use crate::{
    analysis::dataflow::{DataflowContext, DataflowResults, EngineConfig},
    ir::Procedure,
    Result,
};

/// Runs catalog, edges, solver and chains on a procedure.
///
/// The engine holds no state between runs: every call starts from a cleared
/// [`DataflowContext`], so running twice on an unchanged procedure yields identical results.
/// Independent procedures may be analyzed concurrently from different threads.
///
/// # Examples
///
/// ```rust
/// use hlsflow::{ir::{Expression, ProcedureBuilder}, DataflowEngine, EngineConfig};
///
/// let mut b = ProcedureBuilder::new("twice");
/// let x = b.local("x");
/// let s0 = b.assign(x, Expression::constant(1));
/// let s1 = b.assign(x, Expression::constant(2));
/// let root = b.sequence(vec![s0, s1]);
/// let procedure = b.finish(root)?;
///
/// let engine = DataflowEngine::new(EngineConfig::minimal());
/// let results = engine.run(&procedure)?;
/// assert_eq!(results.out_set(root).map(|v| v.iter().collect::<Vec<_>>()), Some(vec![1]));
/// # Ok::<(), hlsflow::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataflowEngine {
    config: EngineConfig,
}

impl DataflowEngine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Computes every dataflow annotation of `procedure`.
    ///
    /// # Arguments
    ///
    /// * `procedure` - The procedure to analyze
    ///
    /// # Returns
    ///
    /// The complete results, with the events recorded during the run.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownLabel`](crate::Error::UnknownLabel) for a jump to a missing label
    /// - [`Error::NotAVariable`](crate::Error::NotAVariable) for a definition of a non-variable
    /// - [`Error::Inconsistent`](crate::Error::Inconsistent) if chain verification fails
    pub fn run(&self, procedure: &Procedure) -> Result<DataflowResults> {
        let mut ctx = DataflowContext::new(procedure, &self.config);
        self.run_in(&mut ctx)?;
        ctx.into_results()
    }

    /// Runs all four stages inside an existing context, discarding whatever it held.
    ///
    /// # Errors
    ///
    /// See [`DataflowEngine::run`].
    pub fn run_in(&self, ctx: &mut DataflowContext<'_>) -> Result<()> {
        ctx.clear();
        ctx.build_catalog()?;
        ctx.build_edges()?;
        ctx.solve()?;
        ctx.build_chains()?;
        Ok(())
    }
}
