//! Compiler context shared by the pass scheduler and the passes.
//!
//! The [`CompilerContext`] holds the dataflow results of every analyzed procedure and the
//! findings the passes report on them, keyed by procedure name.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};

use crate::{
    analysis::dataflow::DataflowResults,
    compiler::{
        events::EventLog,
        passes::{ConstantUse, DeadDefinition, FeedbackRead},
    },
};

/// Compiler context for a batch of procedures.
///
/// All collection fields use thread-safe types (`DashMap`, `DashSet`) so procedures can be
/// analyzed and passes run in parallel through a shared reference.
pub struct CompilerContext {
    /// Dataflow results per procedure name.
    results: DashMap<String, Arc<DataflowResults>>,

    /// Loop-carried reads per procedure.
    feedback: DashMap<String, Vec<FeedbackRead>>,

    /// Uses that always see the same constant, per procedure.
    constants: DashMap<String, Vec<ConstantUse>>,

    /// Definitions that are never read, per procedure.
    dead: DashMap<String, Vec<DeadDefinition>>,

    /// Procedures every enabled pass has run on.
    processed: DashSet<String>,

    /// Accumulated events from the engine runs and all passes.
    pub events: EventLog,
}

impl Default for CompilerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerContext {
    /// Creates an empty compiler context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: DashMap::new(),
            feedback: DashMap::new(),
            constants: DashMap::new(),
            dead: DashMap::new(),
            processed: DashSet::new(),
            events: EventLog::new(),
        }
    }

    // ── Dataflow results ────────────────────────────────────────────────

    /// Stores the results of `name`, replacing earlier ones, and returns the shared handle.
    ///
    /// Findings computed from earlier results of `name` are dropped and the procedure is no
    /// longer marked processed.
    pub fn set_results(&self, name: &str, results: DataflowResults) -> Arc<DataflowResults> {
        self.feedback.remove(name);
        self.constants.remove(name);
        self.dead.remove(name);
        self.processed.remove(name);

        let results = Arc::new(results);
        self.results.insert(name.to_string(), Arc::clone(&results));
        results
    }

    /// Returns the results of `name`, if analyzed.
    #[must_use]
    pub fn results(&self, name: &str) -> Option<Arc<DataflowResults>> {
        self.results.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Returns the number of analyzed procedures.
    #[must_use]
    pub fn procedure_count(&self) -> usize {
        self.results.len()
    }

    /// Returns the names of all analyzed procedures, sorted.
    #[must_use]
    pub fn procedure_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.results.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    // ── Processed tracking ──────────────────────────────────────────────

    /// Marks a procedure as fully processed by the pass pipeline.
    pub fn mark_processed(&self, name: &str) {
        self.processed.insert(name.to_string());
    }

    /// Checks if a procedure went through the pass pipeline.
    #[must_use]
    pub fn is_processed(&self, name: &str) -> bool {
        self.processed.contains(name)
    }

    // ── Findings ────────────────────────────────────────────────────────

    /// Replaces the feedback reads recorded for `name`.
    pub fn set_feedback(&self, name: &str, reads: Vec<FeedbackRead>) {
        self.feedback.insert(name.to_string(), reads);
    }

    /// Returns the feedback reads of `name`.
    #[must_use]
    pub fn feedback(&self, name: &str) -> Vec<FeedbackRead> {
        self.feedback
            .get(name)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Replaces the constant uses recorded for `name`.
    pub fn set_constant_uses(&self, name: &str, uses: Vec<ConstantUse>) {
        self.constants.insert(name.to_string(), uses);
    }

    /// Returns the constant uses of `name`.
    #[must_use]
    pub fn constant_uses(&self, name: &str) -> Vec<ConstantUse> {
        self.constants
            .get(name)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Replaces the dead definitions recorded for `name`.
    pub fn set_dead_definitions(&self, name: &str, dead: Vec<DeadDefinition>) {
        self.dead.insert(name.to_string(), dead);
    }

    /// Returns the dead definitions of `name`.
    #[must_use]
    pub fn dead_definitions(&self, name: &str) -> Vec<DeadDefinition> {
        self.dead
            .get(name)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Returns the total number of findings over all procedures and passes.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        let feedback: usize = self.feedback.iter().map(|r| r.len()).sum();
        let constants: usize = self.constants.iter().map(|r| r.len()).sum();
        let dead: usize = self.dead.iter().map(|r| r.len()).sum();
        feedback + constants + dead
    }

    /// Drops every result and finding. The event log is kept.
    pub fn clear(&self) {
        self.results.clear();
        self.feedback.clear();
        self.constants.clear();
        self.dead.clear();
        self.processed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::dataflow::DataflowEngine, compiler::passes::DeadReason, test::straight_line,
    };

    #[test]
    fn test_results_roundtrip_by_name() {
        let fixture = straight_line();
        let ctx = CompilerContext::new();
        let results = DataflowEngine::default().run(&fixture.procedure).unwrap();

        let stored = ctx.set_results(fixture.procedure.name(), results);
        let fetched = ctx.results("straight_line").unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
        assert_eq!(ctx.procedure_count(), 1);
        assert_eq!(ctx.procedure_names(), vec!["straight_line".to_string()]);
        assert!(ctx.results("missing").is_none());
    }

    #[test]
    fn test_findings_default_empty() {
        let ctx = CompilerContext::default();
        assert!(ctx.feedback("anything").is_empty());
        assert!(ctx.constant_uses("anything").is_empty());
        assert!(ctx.dead_definitions("anything").is_empty());
        assert_eq!(ctx.finding_count(), 0);
    }

    #[test]
    fn test_clear_keeps_events() {
        let fixture = straight_line();
        let ctx = CompilerContext::new();
        let results = DataflowEngine::default().run(&fixture.procedure).unwrap();
        ctx.set_results("straight_line", results);
        ctx.mark_processed("straight_line");
        ctx.events.info("batch done");

        ctx.clear();
        assert_eq!(ctx.procedure_count(), 0);
        assert!(!ctx.is_processed("straight_line"));
        assert_eq!(ctx.events.len(), 1);
    }

    #[test]
    fn test_new_results_drop_old_findings() {
        let fixture = straight_line();
        let ctx = CompilerContext::new();
        let engine = DataflowEngine::default();
        ctx.set_results("straight_line", engine.run(&fixture.procedure).unwrap());
        ctx.set_dead_definitions(
            "straight_line",
            vec![DeadDefinition {
                statement: fixture.stmts[1],
                reason: DeadReason::NeverRead,
            }],
        );
        ctx.mark_processed("straight_line");

        ctx.set_results("straight_line", engine.run(&fixture.procedure).unwrap());
        assert!(ctx.dead_definitions("straight_line").is_empty());
        assert!(!ctx.is_processed("straight_line"));
        assert_eq!(ctx.finding_count(), 0);
    }
}
