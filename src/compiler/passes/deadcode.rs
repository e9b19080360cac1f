//! Dead-definition reporting.
//!
//! This pass finds definitions a dead-code rewrite may remove:
//!
//! 1. **Self copies**: `x = x`, which never changes a value
//! 2. **Unread assignments**: assignments whose definition reaches no read
//! 3. **Unused calls**: calls none of whose output definitions reach a read
//!
//! Calls without outputs are kept out of the report since they execute for their effect.
//! Removing a reported statement may expose new dead definitions; the pass does not iterate.

use std::fmt;

use crate::{
    analysis::dataflow::DataflowResults,
    compiler::{pass::ProcedurePass, CompilerContext, EventKind},
    ir::{Expression, Procedure, StatementKind, StmtId},
    Result,
};

/// Why a definition is dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeadReason {
    /// `x = x`
    SelfCopy,
    /// The assigned value reaches no read.
    NeverRead,
    /// No output of the call reaches a read.
    UnusedCall,
}

impl fmt::Display for DeadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SelfCopy => "self copy",
            Self::NeverRead => "never read",
            Self::UnusedCall => "unused call outputs",
        })
    }
}

/// A statement whose definitions may be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadDefinition {
    /// The defining statement
    pub statement: StmtId,
    /// Why it is dead
    pub reason: DeadReason,
}

impl fmt::Display for DeadDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.statement, self.reason)
    }
}

/// Dead-definition pass.
pub struct DeadDefinitionPass;

impl Default for DeadDefinitionPass {
    fn default() -> Self {
        Self::new()
    }
}

impl DeadDefinitionPass {
    /// Creates a new dead-definition pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn classify(
        procedure: &Procedure,
        results: &DataflowResults,
        id: StmtId,
    ) -> Option<DeadReason> {
        let unread = || {
            results
                .definitions_at(id)
                .iter()
                .all(|&def| results.reached_uses(def).is_empty())
        };

        match &procedure.statement(id)?.kind {
            StatementKind::Assign {
                target,
                value: Expression::Load(source),
            } if target == source => Some(DeadReason::SelfCopy),
            StatementKind::Assign { .. } if unread() => Some(DeadReason::NeverRead),
            StatementKind::Call { .. } if !results.definitions_at(id).is_empty() && unread() => {
                Some(DeadReason::UnusedCall)
            }
            _ => None,
        }
    }

    /// Finds every dead definition of `procedure`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) if `results` belong to a
    /// different procedure.
    pub fn find(procedure: &Procedure, results: &DataflowResults) -> Result<Vec<DeadDefinition>> {
        results.ensure_matches(procedure)?;

        Ok(procedure
            .document_order()
            .iter()
            .filter_map(|&statement| {
                Self::classify(procedure, results, statement)
                    .map(|reason| DeadDefinition { statement, reason })
            })
            .collect())
    }
}

impl ProcedurePass for DeadDefinitionPass {
    fn name(&self) -> &'static str {
        "dead-definitions"
    }

    fn description(&self) -> &'static str {
        "Finds self copies and definitions that reach no read"
    }

    fn should_run(&self, procedure: &Procedure, _ctx: &CompilerContext) -> bool {
        procedure
            .statements()
            .any(|(_, statement)| !statement.defined_symbols().is_empty())
    }

    fn run(
        &self,
        procedure: &Procedure,
        results: &DataflowResults,
        ctx: &CompilerContext,
    ) -> Result<bool> {
        let found = Self::find(procedure, results)?;
        for dead in &found {
            let rendered = procedure
                .statement(dead.statement)
                .map(|s| s.render(procedure.symbols()))
                .unwrap_or_default();
            ctx.events
                .record(EventKind::DeadDefinition)
                .procedure(procedure.name())
                .location(dead.statement.index())
                .pass(self.name())
                .message(format!("{rendered}: {}", dead.reason));
        }

        let changed = !found.is_empty();
        ctx.set_dead_definitions(procedure.name(), found);
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::dataflow::DataflowEngine,
        ir::{CallArgument, ProcedureBuilder},
        test::{straight_line, while_loop},
    };

    fn find(procedure: &Procedure) -> Vec<DeadDefinition> {
        let results = DataflowEngine::default().run(procedure).unwrap();
        DeadDefinitionPass::find(procedure, &results).unwrap()
    }

    #[test]
    fn test_straight_line_tail_definitions() {
        let fixture = straight_line();
        let found = find(&fixture.procedure);

        // y and z are never read afterwards
        let statements: Vec<_> = found.iter().map(|d| d.statement).collect();
        assert_eq!(statements, vec![fixture.stmts[1], fixture.stmts[3]]);
        assert!(found.iter().all(|d| d.reason == DeadReason::NeverRead));
    }

    #[test]
    fn test_self_copy() {
        // x = 1; x = x; return x;
        let mut b = ProcedureBuilder::new("copy");
        let x = b.local("x");
        let first = b.assign(x, Expression::constant(1));
        let copy = b.assign(x, Expression::load(x));
        let ret = b.ret(Some(Expression::load(x)));
        let root = b.sequence(vec![first, copy, ret]);
        let procedure = b.finish(root).unwrap();

        let found = find(&procedure);
        assert_eq!(
            found,
            vec![DeadDefinition {
                statement: copy,
                reason: DeadReason::SelfCopy
            }]
        );
    }

    #[test]
    fn test_loop_carried_value_is_live() {
        let fixture = while_loop();
        let found = find(&fixture.procedure);

        // y = x is never read, x = x + 1 feeds the next iteration
        let statements: Vec<_> = found.iter().map(|d| d.statement).collect();
        assert_eq!(statements, vec![fixture.read]);
    }

    #[test]
    fn test_unused_call_outputs() {
        // r = f(&a); g(&b); return b;
        let mut b = ProcedureBuilder::new("calls");
        let r = b.local("r");
        let a = b.local("a");
        let out = b.local("b");
        let f = b.callee("f");
        let g = b.callee("g");
        let unused = b.call(f, Some(r), vec![CallArgument::Reference(a)]);
        let used = b.call(g, None, vec![CallArgument::Reference(out)]);
        let effect = b.call(g, None, Vec::new());
        let ret = b.ret(Some(Expression::load(out)));
        let root = b.sequence(vec![unused, used, effect, ret]);
        let procedure = b.finish(root).unwrap();

        let found = find(&procedure);
        assert_eq!(
            found,
            vec![DeadDefinition {
                statement: unused,
                reason: DeadReason::UnusedCall
            }]
        );
    }

    #[test]
    fn test_run_records_locations() {
        let fixture = straight_line();
        let results = DataflowEngine::default().run(&fixture.procedure).unwrap();
        let ctx = CompilerContext::new();

        assert!(DeadDefinitionPass
            .run(&fixture.procedure, &results, &ctx)
            .unwrap());
        let locations: Vec<_> = ctx
            .events
            .filter_kind(EventKind::DeadDefinition)
            .filter_map(|e| e.location)
            .collect();
        assert_eq!(
            locations,
            vec![fixture.stmts[1].index(), fixture.stmts[3].index()]
        );
    }
}
