//! Pass trait for consumers of the dataflow results.

use crate::{
    analysis::dataflow::DataflowResults, compiler::context::CompilerContext, ir::Procedure,
    Result,
};

/// An analysis pass that runs on one procedure and its dataflow results.
///
/// All passes must be thread-safe (Send + Sync) so the scheduler can run them over independent
/// procedures in parallel. Passes never rewrite the tree: they store findings in the
/// [`CompilerContext`] and record events to `ctx.events`.
pub trait ProcedurePass: Send + Sync {
    /// Unique name for logging and debugging.
    fn name(&self) -> &'static str;

    /// Should this pass run on a specific procedure?
    ///
    /// Called before `run`. Override to skip procedures the pass has nothing to say about.
    fn should_run(&self, _procedure: &Procedure, _ctx: &CompilerContext) -> bool {
        true
    }

    /// Run the pass on a single procedure.
    ///
    /// Returns `true` if the pass reported any finding, `false` otherwise.
    ///
    /// # Arguments
    ///
    /// * `procedure` - The procedure the results were computed for.
    /// * `results` - The complete dataflow annotations of `procedure`.
    /// * `ctx` - The compiler context (thread-safe, uses shared reference).
    ///
    /// # Errors
    ///
    /// Returns an error if `results` do not belong to `procedure` or the pass meets an
    /// inconsistent annotation.
    fn run(
        &self,
        procedure: &Procedure,
        results: &DataflowResults,
        ctx: &CompilerContext,
    ) -> Result<bool>;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }
}
