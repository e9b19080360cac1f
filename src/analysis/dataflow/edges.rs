//! Control-flow edges of the structured tree.
//!
//! A single walk attaches an ordered, duplicate-free predecessor list to every statement. The
//! walk threads `p`, the predecessor flowing in from above (none at the root):
//!
//! | Statement   | Edges added                                                             |
//! |-------------|-------------------------------------------------------------------------|
//! | Sequence    | `p` → node; `p` → first child; each child → next child                  |
//! | Conditional | `p` → node; `p` → then; `p` → else                                      |
//! | Loop        | `p` → init; entry → body; body → step; back → body; entry, back → node  |
//! | Jump/Branch | `p` → node; node → every label of the same name                         |
//! | Scope       | `p` → node; `p` → body                                                  |
//! | other       | `p` → node                                                              |
//!
//! For loops, `entry` is the init statement or `p` when there is none, and `back` is the step
//! statement or the body itself for a test-only loop. Fallthrough edges out of unconditional
//! jumps are kept; the tree shape alone decides them.
//!
//! Successor lists are the exact inverse of the predecessor lists and exist for diagnostics.

use std::collections::HashMap;

use crate::{
    ir::{Procedure, ProcedureId, StatementKind, StmtId},
    Error, Result,
};

/// Predecessor and successor lists for every statement of a procedure.
#[derive(Debug, Clone)]
pub struct ControlFlowEdges {
    procedure: ProcedureId,
    predecessors: Vec<Vec<StmtId>>,
    successors: Vec<Vec<StmtId>>,
}

impl ControlFlowEdges {
    /// Computes the edges of `procedure`.
    ///
    /// # Arguments
    ///
    /// * `procedure` - The procedure to walk
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownLabel`] if a jump or branch names a label that no statement
    /// defines.
    pub fn build(procedure: &Procedure) -> Result<Self> {
        let mut labels: HashMap<&str, Vec<StmtId>> = HashMap::new();
        for (id, stmt) in procedure.statements() {
            if let StatementKind::Label { name } = &stmt.kind {
                labels.entry(name.as_str()).or_default().push(id);
            }
        }

        let mut builder = EdgeBuilder {
            procedure,
            labels,
            predecessors: vec![Vec::new(); procedure.statement_count()],
        };
        builder.solve(procedure.root(), None)?;

        let mut successors = vec![Vec::new(); procedure.statement_count()];
        for &id in procedure.document_order() {
            for &pred in &builder.predecessors[id.index()] {
                push_unique(&mut successors[pred.index()], id);
            }
        }

        Ok(Self {
            procedure: procedure.id(),
            predecessors: builder.predecessors,
            successors,
        })
    }

    /// Returns the id of the procedure these edges were built for.
    #[must_use]
    pub const fn procedure(&self) -> ProcedureId {
        self.procedure
    }

    /// Returns the number of statements covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predecessors.len()
    }

    /// Returns `true` if no statement is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predecessors.is_empty()
    }

    /// Returns the predecessors of `statement` in insertion order.
    ///
    /// `None` if `statement` is not part of the procedure.
    #[must_use]
    pub fn predecessors(&self, statement: StmtId) -> Option<&[StmtId]> {
        self.predecessors.get(statement.index()).map(Vec::as_slice)
    }

    /// Returns the successors of `statement`.
    ///
    /// `None` if `statement` is not part of the procedure.
    #[must_use]
    pub fn successors(&self, statement: StmtId) -> Option<&[StmtId]> {
        self.successors.get(statement.index()).map(Vec::as_slice)
    }

    /// Returns the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.predecessors.iter().map(Vec::len).sum()
    }

    /// Iterates over all edges as `(from, to)` pairs, grouped by target in arena order.
    pub fn edges(&self) -> impl Iterator<Item = (StmtId, StmtId)> + '_ {
        self.predecessors
            .iter()
            .enumerate()
            .flat_map(|(to, preds)| preds.iter().map(move |&from| (from, StmtId::new(to))))
    }
}

fn push_unique(list: &mut Vec<StmtId>, id: StmtId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

struct EdgeBuilder<'a> {
    procedure: &'a Procedure,
    labels: HashMap<&'a str, Vec<StmtId>>,
    predecessors: Vec<Vec<StmtId>>,
}

impl<'a> EdgeBuilder<'a> {
    fn add(&mut self, node: StmtId, pred: Option<StmtId>) {
        if let Some(pred) = pred {
            push_unique(&mut self.predecessors[node.index()], pred);
        }
    }

    fn kind(&self, id: StmtId) -> Result<&'a StatementKind> {
        self.procedure
            .statement(id)
            .map(|stmt| &stmt.kind)
            .ok_or_else(|| inconsistent_error!("statement {} is not part of the procedure", id))
    }

    /// Adds every edge of the subtree rooted at `id`, with `p` flowing in from above.
    fn solve(&mut self, id: StmtId, p: Option<StmtId>) -> Result<()> {
        match self.kind(id)? {
            StatementKind::Sequence(children) => {
                self.add(id, p);
                let mut prev = p;
                for &child in children {
                    self.solve(child, prev)?;
                    prev = Some(child);
                }
            }
            StatementKind::Conditional {
                then_branch,
                else_branch,
                ..
            } => {
                let (then_branch, else_branch) = (*then_branch, *else_branch);
                self.add(id, p);
                self.solve(then_branch, p)?;
                if let Some(else_branch) = else_branch {
                    self.solve(else_branch, p)?;
                }
            }
            StatementKind::Loop {
                init, step, body, ..
            } => {
                let (init, step, body) = (*init, *step, *body);
                let entry = match init {
                    Some(init) => {
                        self.solve(init, p)?;
                        Some(init)
                    }
                    None => p,
                };
                self.add(id, entry);

                self.solve(body, entry)?;
                if let Some(step) = step {
                    self.solve(step, Some(body))?;
                }

                // The second walk of the body only differs from the first by the predecessor
                // flowing in, so only the statements that receive it need revisiting.
                let back = step.unwrap_or(body);
                self.enter(body, Some(back))?;
                self.add(id, Some(back));
            }
            StatementKind::Jump { label } | StatementKind::Branch { label, .. } => {
                self.add(id, p);
                let targets = self
                    .labels
                    .get(label.as_str())
                    .cloned()
                    .ok_or_else(|| Error::UnknownLabel {
                        label: label.clone(),
                        statement: id,
                    })?;
                for target in targets {
                    self.add(target, Some(id));
                }
            }
            StatementKind::Scope(body) => {
                let body = *body;
                self.add(id, p);
                self.solve(body, p)?;
            }
            StatementKind::Assign { .. }
            | StatementKind::Store { .. }
            | StatementKind::Call { .. }
            | StatementKind::Label { .. }
            | StatementKind::Mark
            | StatementKind::Return(_)
            | StatementKind::Eval(_) => self.add(id, p),
        }
        Ok(())
    }

    /// Adds `p` everywhere [`EdgeBuilder::solve`] would add it for the subtree at `id`, without
    /// re-adding the subtree's internal edges.
    fn enter(&mut self, id: StmtId, p: Option<StmtId>) -> Result<()> {
        match self.kind(id)? {
            StatementKind::Sequence(children) => {
                let first = children.first().copied();
                self.add(id, p);
                if let Some(first) = first {
                    self.enter(first, p)?;
                }
            }
            StatementKind::Conditional {
                then_branch,
                else_branch,
                ..
            } => {
                let (then_branch, else_branch) = (*then_branch, *else_branch);
                self.add(id, p);
                self.enter(then_branch, p)?;
                if let Some(else_branch) = else_branch {
                    self.enter(else_branch, p)?;
                }
            }
            StatementKind::Loop { init, body, .. } => match (*init, *body) {
                (Some(init), _) => self.enter(init, p)?,
                (None, body) => {
                    self.add(id, p);
                    self.enter(body, p)?;
                }
            },
            StatementKind::Scope(body) => {
                let body = *body;
                self.add(id, p);
                self.enter(body, p)?;
            }
            _ => self.add(id, p),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{Expression, ProcedureBuilder},
        test::{counted_loop, while_loop},
    };

    fn preds(edges: &ControlFlowEdges, id: StmtId) -> Vec<StmtId> {
        edges.predecessors(id).unwrap().to_vec()
    }

    #[test]
    fn test_sequence_chain() {
        let mut b = ProcedureBuilder::new("seq");
        let s0 = b.mark();
        let s1 = b.mark();
        let s2 = b.mark();
        let root = b.sequence(vec![s0, s1, s2]);
        let procedure = b.finish(root).unwrap();
        let edges = ControlFlowEdges::build(&procedure).unwrap();

        assert!(preds(&edges, root).is_empty());
        assert!(preds(&edges, s0).is_empty());
        assert_eq!(preds(&edges, s1), vec![s0]);
        assert_eq!(preds(&edges, s2), vec![s1]);
        assert_eq!(edges.successors(s0).unwrap(), &[s1]);
    }

    #[test]
    fn test_conditional_branches_share_predecessor() {
        let mut b = ProcedureBuilder::new("cond");
        let c = b.local("c");
        let head = b.mark();
        let then = b.mark();
        let other = b.mark();
        let cond = b.conditional(Expression::load(c), then, Some(other));
        let tail = b.mark();
        let root = b.sequence(vec![head, cond, tail]);
        let procedure = b.finish(root).unwrap();
        let edges = ControlFlowEdges::build(&procedure).unwrap();

        assert_eq!(preds(&edges, cond), vec![head]);
        assert_eq!(preds(&edges, then), vec![head]);
        assert_eq!(preds(&edges, other), vec![head]);
        assert_eq!(preds(&edges, tail), vec![cond]);
    }

    #[test]
    fn test_while_loop_back_edge() {
        let fixture = while_loop();
        let edges = ControlFlowEdges::build(&fixture.procedure).unwrap();

        // x = 0; while (c) { y = x; x = x + 1; }
        assert_eq!(preds(&edges, fixture.lp), vec![fixture.init, fixture.body]);
        assert_eq!(preds(&edges, fixture.body), vec![fixture.init, fixture.body]);
        assert_eq!(preds(&edges, fixture.read), vec![fixture.init, fixture.body]);
        assert_eq!(preds(&edges, fixture.update), vec![fixture.read]);
    }

    #[test]
    fn test_counted_loop_edges() {
        let fixture = counted_loop();
        let edges = ControlFlowEdges::build(&fixture.procedure).unwrap();

        assert_eq!(preds(&edges, fixture.init), vec![fixture.before]);
        assert_eq!(preds(&edges, fixture.body), vec![fixture.init, fixture.step]);
        assert_eq!(preds(&edges, fixture.step), vec![fixture.body]);
        assert_eq!(preds(&edges, fixture.lp), vec![fixture.init, fixture.step]);
        assert!(!preds(&edges, fixture.lp).contains(&fixture.before));
    }

    #[test]
    fn test_jump_to_label() {
        let mut b = ProcedureBuilder::new("jump");
        let c = b.local("c");
        let branch = b.branch(Expression::load(c), "out");
        let middle = b.mark();
        let label = b.label("out");
        let root = b.sequence(vec![branch, middle, label]);
        let procedure = b.finish(root).unwrap();
        let edges = ControlFlowEdges::build(&procedure).unwrap();

        assert_eq!(preds(&edges, label), vec![branch, middle]);
        assert_eq!(edges.successors(branch).unwrap(), &[middle, label]);
    }

    #[test]
    fn test_backward_jump_keeps_fallthrough() {
        let mut b = ProcedureBuilder::new("backward");
        let label = b.label("top");
        let jump = b.jump("top");
        let after = b.mark();
        let root = b.sequence(vec![label, jump, after]);
        let procedure = b.finish(root).unwrap();
        let edges = ControlFlowEdges::build(&procedure).unwrap();

        assert_eq!(preds(&edges, label), vec![jump]);
        assert_eq!(preds(&edges, after), vec![jump]);
    }

    #[test]
    fn test_unknown_label() {
        let mut b = ProcedureBuilder::new("dangling");
        let jump = b.jump("nowhere");
        let root = b.sequence(vec![jump]);
        let procedure = b.finish(root).unwrap();

        match ControlFlowEdges::build(&procedure) {
            Err(Error::UnknownLabel { label, statement }) => {
                assert_eq!(label, "nowhere");
                assert_eq!(statement, jump);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_nested_loops_reach_inner_entry() {
        let mut b = ProcedureBuilder::new("nested");
        let c = b.local("c");
        let inner_body = b.mark();
        let inner = b.while_loop(Expression::load(c), inner_body);
        let outer_body = b.sequence(vec![inner]);
        let outer = b.while_loop(Expression::load(c), outer_body);
        let procedure = b.finish(outer).unwrap();
        let edges = ControlFlowEdges::build(&procedure).unwrap();

        // the outer back-edge flows into the inner loop and its body
        assert_eq!(preds(&edges, inner), vec![inner_body, outer_body]);
        assert_eq!(preds(&edges, inner_body), vec![inner_body, outer_body]);
        assert_eq!(preds(&edges, outer), vec![outer_body]);
    }

    #[test]
    fn test_scope_first_in_loop_body_gets_back_edge() {
        let mut b = ProcedureBuilder::new("scoped_loop");
        let c = b.local("c");
        let head = b.mark();
        let inner = b.mark();
        let scope = b.scope(inner);
        let tail = b.mark();
        let body = b.sequence(vec![scope, tail]);
        let lp = b.while_loop(Expression::load(c), body);
        let root = b.sequence(vec![head, lp]);
        let procedure = b.finish(root).unwrap();
        let edges = ControlFlowEdges::build(&procedure).unwrap();

        assert_eq!(preds(&edges, scope), vec![head, body]);
        assert_eq!(preds(&edges, inner), vec![head, body]);
        assert_eq!(preds(&edges, tail), vec![scope]);
        assert_eq!(preds(&edges, lp), vec![head, body]);
    }

    #[test]
    fn test_no_duplicate_predecessors() {
        let fixture = while_loop();
        let edges = ControlFlowEdges::build(&fixture.procedure).unwrap();
        for &id in fixture.procedure.document_order() {
            let list = preds(&edges, id);
            let mut dedup = list.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(list.len(), dedup.len());
        }
    }
}
