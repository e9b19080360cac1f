//! Pass scheduler for batches of procedures.
//!
//! The `PassScheduler` runs the dataflow engine over every procedure of a batch, then each
//! enabled pass over every analyzed procedure. Procedures are independent, so both phases fan
//! out over the rayon thread pool when the configuration asks for it.

use std::{collections::HashSet, time::Instant};

use rayon::prelude::*;

use crate::{
    analysis::dataflow::{DataflowEngine, EngineConfig},
    compiler::{
        context::CompilerContext,
        pass::ProcedurePass,
        passes::{ConstantUsePass, DeadDefinitionPass, FeedbackDetectionPass},
        EventKind,
    },
    ir::Procedure,
    Error, Result,
};

/// Orchestrates the engine and the consumer passes over a batch.
///
/// Execution has two phases:
///
/// 1. **Analysis**: the [`DataflowEngine`] annotates every procedure and its results are stored
///    in the [`CompilerContext`]
/// 2. **Passes**: each pass runs over every procedure, in registration order
///
/// The first error aborts the batch.
pub struct PassScheduler {
    engine: DataflowEngine,
    /// Passes in execution order.
    passes: Vec<Box<dyn ProcedurePass>>,
}

impl Default for PassScheduler {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PassScheduler {
    /// Creates a scheduler with the built-in passes `config` enables.
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration, also selecting the passes.
    ///
    /// # Returns
    ///
    /// A new `PassScheduler`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let mut passes: Vec<Box<dyn ProcedurePass>> = Vec::new();
        if config.enable_feedback_detection {
            passes.push(Box::new(FeedbackDetectionPass::new()));
        }
        if config.enable_constant_uses {
            passes.push(Box::new(ConstantUsePass::new()));
        }
        if config.enable_dead_definitions {
            passes.push(Box::new(DeadDefinitionPass::new()));
        }

        Self {
            engine: DataflowEngine::new(config),
            passes,
        }
    }

    /// Appends a pass after the registered ones.
    pub fn add_pass(&mut self, pass: Box<dyn ProcedurePass>) {
        self.passes.push(pass);
    }

    /// Returns the names of the registered passes, in execution order.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Returns the engine used for the analysis phase.
    #[must_use]
    pub const fn engine(&self) -> &DataflowEngine {
        &self.engine
    }

    fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    fn ensure_unique_names(procedures: &[Procedure]) -> Result<()> {
        let mut seen = HashSet::new();
        for procedure in procedures {
            if !seen.insert(procedure.name()) {
                return Err(Error::Malformed(format!(
                    "duplicate procedure name '{}' in batch",
                    procedure.name()
                )));
            }
        }
        Ok(())
    }

    /// Analyzes one procedure and stores its results.
    fn analyze(&self, procedure: &Procedure, ctx: &CompilerContext) -> Result<()> {
        let results = self.engine.run(procedure).inspect_err(|err| {
            ctx.events
                .record(EventKind::Error)
                .procedure(procedure.name())
                .message(err.to_string());
        })?;
        ctx.events.merge(results.events());
        ctx.set_results(procedure.name(), results);
        Ok(())
    }

    /// Runs the dataflow engine over every procedure of the batch.
    ///
    /// # Errors
    ///
    /// Returns the first engine error, or [`Error::Malformed`] if two procedures share a name.
    pub fn analyze_all(&self, procedures: &[Procedure], ctx: &CompilerContext) -> Result<()> {
        Self::ensure_unique_names(procedures)?;

        if self.config().parallel {
            procedures
                .par_iter()
                .try_for_each(|procedure| self.analyze(procedure, ctx))
        } else {
            procedures
                .iter()
                .try_for_each(|procedure| self.analyze(procedure, ctx))
        }
    }

    /// Runs one pass on one procedure.
    ///
    /// Returns `true` if the pass reported findings.
    fn run_on_procedure(
        pass: &dyn ProcedurePass,
        procedure: &Procedure,
        ctx: &CompilerContext,
    ) -> Result<bool> {
        if !pass.should_run(procedure, ctx) {
            return Ok(false);
        }
        let results = ctx.results(procedure.name()).ok_or_else(|| {
            inconsistent_error!(
                "pass '{}' scheduled before '{}' was analyzed",
                pass.name(),
                procedure.name()
            )
        })?;
        pass.run(procedure, &results, ctx).inspect_err(|err| {
            ctx.events
                .record(EventKind::Error)
                .procedure(procedure.name())
                .pass(pass.name())
                .message(err.to_string());
        })
    }

    /// Runs one pass over the batch.
    ///
    /// Returns the number of procedures the pass reported findings on.
    fn run_pass(
        &self,
        pass: &dyn ProcedurePass,
        procedures: &[Procedure],
        ctx: &CompilerContext,
    ) -> Result<usize> {
        let reported: Vec<bool> = if self.config().parallel {
            procedures
                .par_iter()
                .map(|procedure| Self::run_on_procedure(pass, procedure, ctx))
                .collect::<Result<_>>()?
        } else {
            procedures
                .iter()
                .map(|procedure| Self::run_on_procedure(pass, procedure, ctx))
                .collect::<Result<_>>()?
        };
        Ok(reported.into_iter().filter(|&changed| changed).count())
    }

    /// Analyzes a batch and runs every registered pass on it.
    ///
    /// # Arguments
    ///
    /// * `procedures` - The batch. Names must be unique.
    /// * `ctx` - The compiler context receiving results, findings and events.
    ///
    /// # Returns
    ///
    /// The number of (pass, procedure) pairs that reported findings. Findings are stored in
    /// `ctx`, events are accumulated in `ctx.events`.
    ///
    /// # Errors
    ///
    /// Returns the first engine or pass error, after logging it as an [`EventKind::Error`].
    /// Results stored before the error stay in `ctx`. An empty batch only logs a warning.
    pub fn run(&self, procedures: &[Procedure], ctx: &CompilerContext) -> Result<usize> {
        let started = Instant::now();
        if procedures.is_empty() {
            ctx.events.record(EventKind::Warning).message("empty batch");
            return Ok(0);
        }
        self.analyze_all(procedures, ctx)?;

        let record = self.config().record_events;
        let mut total = 0;
        for pass in &self.passes {
            if record {
                ctx.events
                    .record(EventKind::PassStarted)
                    .pass(pass.name())
                    .message(pass.description());
            }

            let reported = self.run_pass(pass.as_ref(), procedures, ctx)?;
            total += reported;

            if record {
                ctx.events
                    .record(EventKind::PassCompleted)
                    .pass(pass.name())
                    .message(format!(
                        "{reported} of {} procedures reported findings",
                        procedures.len()
                    ));
            }
        }

        for procedure in procedures {
            ctx.mark_processed(procedure.name());
        }
        if record {
            ctx.events.record(EventKind::Info).message(format!(
                "batch of {} procedures finished in {:?}",
                procedures.len(),
                started.elapsed()
            ));
        }
        Ok(total)
    }
}
