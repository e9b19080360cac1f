//! Feedback-variable detection for loop pipelining.
//!
//! A pipelined loop starts iteration `k + 1` before iteration `k` has finished. Every value that
//! one iteration produces and a later iteration consumes is a feedback path and constrains the
//! initiation interval. This pass finds those paths in the innermost loop of a procedure.
//!
//! # Algorithm
//!
//! 1. Pick the innermost loop: the first loop in document order without a nested loop
//! 2. Rank every statement of the loop by iteration order: the test, then the body, then the
//!    step, document order within each
//! 3. A read in the loop is a feedback read if one of its reaching definitions lies in the body
//!    or step at or after the read's own rank. Such a definition can only arrive through the
//!    back-edge.
//!
//! Definitions in the loop's init execute once before the first test and are never feedback.

use std::fmt;

use crate::{
    analysis::dataflow::{DataflowResults, DefId},
    compiler::{pass::ProcedurePass, CompilerContext, EventKind},
    ir::{Procedure, StatementKind, StmtId, SymbolId, UseId},
    Result,
};

/// A loop-carried read found by [`FeedbackDetectionPass`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRead {
    /// The variable carried across iterations
    pub variable: SymbolId,
    /// The read consuming the previous iteration's value
    pub use_id: UseId,
    /// Definitions reaching the read only across the back-edge
    pub definitions: Vec<DefId>,
}

impl fmt::Display for FeedbackRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} <-", self.variable, self.use_id)?;
        for def in &self.definitions {
            write!(f, " {def}")?;
        }
        Ok(())
    }
}

/// Position of a statement within one iteration of a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Region {
    Test,
    Body,
    Step,
}

/// The innermost loop of a procedure, split into its parts.
struct InnermostLoop {
    statement: StmtId,
    step: Option<StmtId>,
    body: StmtId,
}

impl InnermostLoop {
    fn find(procedure: &Procedure) -> Option<Self> {
        let order = procedure.document_order();
        let is_loop = |id: StmtId| procedure.statement(id).is_some_and(|s| s.is_loop());

        let statement = order.iter().copied().filter(|&id| is_loop(id)).find(|&lp| {
            !order
                .iter()
                .any(|&other| other != lp && is_loop(other) && procedure.contains(lp, other))
        })?;

        match procedure.statement(statement).map(|s| &s.kind) {
            Some(StatementKind::Loop { step, body, .. }) => Some(Self {
                statement,
                step: *step,
                body: *body,
            }),
            _ => None,
        }
    }

    /// Iteration rank of `id`, or `None` outside the iterated part of the loop.
    fn rank(&self, procedure: &Procedure, id: StmtId) -> Option<(Region, usize)> {
        let region = if id == self.statement {
            Region::Test
        } else if procedure.contains(self.body, id) {
            Region::Body
        } else if self.step.is_some_and(|step| procedure.contains(step, id)) {
            Region::Step
        } else {
            return None;
        };
        Some((region, procedure.position(id)?))
    }
}

/// Feedback detection pass.
///
/// Reports, for the innermost loop, every read that consumes a value written by a previous
/// iteration.
pub struct FeedbackDetectionPass;

impl Default for FeedbackDetectionPass {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackDetectionPass {
    /// Creates a new feedback detection pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Finds the feedback reads of `procedure`'s innermost loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) if `results` belong to a
    /// different procedure.
    pub fn detect(procedure: &Procedure, results: &DataflowResults) -> Result<Vec<FeedbackRead>> {
        results.ensure_matches(procedure)?;
        let Some(lp) = InnermostLoop::find(procedure) else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for (use_id, site) in procedure.uses() {
            let Some(read_rank) = lp.rank(procedure, site.statement) else {
                continue;
            };

            let definitions: Vec<DefId> = results
                .reaching_defs(use_id)
                .iter()
                .copied()
                .filter(|&def| {
                    results
                        .definition(def)
                        .and_then(|d| lp.rank(procedure, d.statement))
                        .is_some_and(|def_rank| def_rank >= read_rank)
                })
                .collect();

            if !definitions.is_empty() {
                found.push(FeedbackRead {
                    variable: site.symbol,
                    use_id,
                    definitions,
                });
            }
        }
        Ok(found)
    }
}

impl ProcedurePass for FeedbackDetectionPass {
    fn name(&self) -> &'static str {
        "feedback-detection"
    }

    fn description(&self) -> &'static str {
        "Finds loop-carried reads in the innermost loop"
    }

    fn should_run(&self, procedure: &Procedure, _ctx: &CompilerContext) -> bool {
        procedure
            .statements()
            .any(|(_, statement)| statement.is_loop())
    }

    fn run(
        &self,
        procedure: &Procedure,
        results: &DataflowResults,
        ctx: &CompilerContext,
    ) -> Result<bool> {
        let found = Self::detect(procedure, results)?;
        for read in &found {
            let event = ctx
                .events
                .record(EventKind::FeedbackDetected)
                .procedure(procedure.name())
                .pass(self.name())
                .message(format!(
                    "'{}' carried across iterations ({} definitions)",
                    procedure.symbols().name(read.variable),
                    read.definitions.len()
                ));
            if let Some(site) = procedure.use_site(read.use_id) {
                event.location(site.statement.index());
            }
        }

        let changed = !found.is_empty();
        ctx.set_feedback(procedure.name(), found);
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::dataflow::DataflowEngine,
        ir::{Expression, ProcedureBuilder},
        test::{counted_loop, increment, straight_line, while_loop},
    };

    fn detect(procedure: &Procedure) -> Vec<FeedbackRead> {
        let results = DataflowEngine::default().run(procedure).unwrap();
        FeedbackDetectionPass::detect(procedure, &results).unwrap()
    }

    #[test]
    fn test_while_loop_counter_is_feedback() {
        let fixture = while_loop();
        let found = detect(&fixture.procedure);

        // both reads of x see the update of the previous iteration
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|read| read.variable == fixture.x));
        assert!(found.iter().all(|read| read.definitions.len() == 1));
    }

    #[test]
    fn test_counted_loop_accumulator_and_induction() {
        let fixture = counted_loop();
        let found = detect(&fixture.procedure);
        let symbols = fixture.procedure.symbols();
        let names: Vec<_> = found.iter().map(|r| symbols.name(r.variable)).collect();

        // test `i < n`, step `i + 1`, then `acc + i` reads acc and i
        assert_eq!(names, vec!["i", "i", "acc", "i"]);

        let results = DataflowEngine::default().run(&fixture.procedure).unwrap();
        for read in &found {
            for &def in &read.definitions {
                let statement = results.definition(def).unwrap().statement;
                assert!(statement == fixture.step || statement == fixture.accumulate);
            }
        }
    }

    #[test]
    fn test_no_loop_no_feedback() {
        let fixture = straight_line();
        assert!(detect(&fixture.procedure).is_empty());
        assert!(!FeedbackDetectionPass.should_run(&fixture.procedure, &CompilerContext::new()));
    }

    #[test]
    fn test_fresh_value_each_iteration() {
        // while (c) { t = 1; y = t; }
        let mut b = ProcedureBuilder::new("fresh");
        let t = b.local("t");
        let y = b.local("y");
        let c = b.parameter("c");
        let write = b.assign(t, Expression::constant(1));
        let read = b.assign(y, Expression::load(t));
        let body = b.sequence(vec![write, read]);
        let lp = b.while_loop(Expression::load(c), body);
        let procedure = b.finish(lp).unwrap();

        assert!(detect(&procedure).is_empty());
    }

    #[test]
    fn test_innermost_loop_only() {
        // while (c) { x = x + 1; while (c) { y = y + 1; } }
        let mut b = ProcedureBuilder::new("nested");
        let x = b.local("x");
        let y = b.local("y");
        let c = b.parameter("c");
        let outer_update = b.assign(x, increment(x));
        let inner_update = b.assign(y, increment(y));
        let inner = b.while_loop(Expression::load(c), inner_update);
        let outer_body = b.sequence(vec![outer_update, inner]);
        let outer = b.while_loop(Expression::load(c), outer_body);
        let procedure = b.finish(outer).unwrap();

        let found = detect(&procedure);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].variable, y);
    }

    #[test]
    fn test_run_records_findings() {
        let fixture = while_loop();
        let results = DataflowEngine::default().run(&fixture.procedure).unwrap();
        let ctx = CompilerContext::new();

        let changed = FeedbackDetectionPass
            .run(&fixture.procedure, &results, &ctx)
            .unwrap();
        assert!(changed);
        assert_eq!(ctx.feedback("while_loop").len(), 2);
        assert_eq!(ctx.events.count_kind(EventKind::FeedbackDetected), 2);
        assert!(ctx
            .events
            .filter_kind(EventKind::FeedbackDetected)
            .all(|e| e.pass.as_deref() == Some("feedback-detection")));
    }

    #[test]
    fn test_foreign_results_rejected() {
        let a = while_loop();
        let b = while_loop();
        let results = DataflowEngine::default().run(&a.procedure).unwrap();
        assert!(FeedbackDetectionPass::detect(&b.procedure, &results).is_err());
    }
}
