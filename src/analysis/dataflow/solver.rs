//! Reaching-definitions solver.
//!
//! A structured gen/kill solver over the statement tree. Every statement owns an IN and an OUT
//! vector of width `N`; assignments and calls also own a KILL vector.
//!
//! # Algorithm
//!
//! Visiting a statement first merges the OUT vectors of all its predecessors into its IN
//! vector. IN only ever grows during a run; OUT is overwritten on every visit.
//!
//! - passthrough statements (jump, branch, label, mark, return, store, eval): `OUT = IN`
//! - assignment and call: `OUT = (IN - KILL) ∪ GEN`
//! - sequence: children in order; `OUT = OUT(last child)`, or `IN` when empty
//! - conditional: `OUT = OUT(then) ∪ OUT(else)`, or `OUT(then) ∪ IN` without an else
//! - loop: init once, then body and step [`LOOP_SOLVE_PASSES`] times, then the loop statement
//!   merges its predecessors (entry and back-edge) again and `OUT = IN`
//! - scope: body; `OUT = OUT(body)`
//!
//! The fixed pass count makes the walk linear in the size of the tree. It is an
//! approximation: see [`LOOP_SOLVE_PASSES`].

use crate::{
    analysis::dataflow::{ControlFlowEdges, DefinitionCatalog, LOOP_SOLVE_PASSES},
    ir::{Procedure, ProcedureId, StatementKind, StmtId},
    utils::BitVector,
    Result,
};

/// IN, OUT and KILL vectors for every statement of a procedure.
#[derive(Debug, Clone)]
pub struct ReachingDefinitions {
    procedure: ProcedureId,
    width: usize,
    in_sets: Vec<BitVector>,
    out_sets: Vec<BitVector>,
    kill_sets: Vec<Option<BitVector>>,
}

impl ReachingDefinitions {
    /// Solves reaching definitions for `procedure`.
    ///
    /// # Arguments
    ///
    /// * `procedure` - The procedure to solve
    /// * `catalog` - Its definition catalog, fixing the vector width
    /// * `edges` - Its control-flow edges
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) if `catalog` or `edges` were
    /// built for a different procedure.
    pub fn solve(
        procedure: &Procedure,
        catalog: &DefinitionCatalog,
        edges: &ControlFlowEdges,
    ) -> Result<Self> {
        Self::solve_with_passes(procedure, catalog, edges, LOOP_SOLVE_PASSES)
    }

    pub(crate) fn solve_with_passes(
        procedure: &Procedure,
        catalog: &DefinitionCatalog,
        edges: &ControlFlowEdges,
        loop_passes: usize,
    ) -> Result<Self> {
        if catalog.procedure() != procedure.id() {
            return Err(inconsistent_error!(
                "definition catalog of {} used to solve {}",
                catalog.procedure(),
                procedure.id()
            ));
        }
        if edges.procedure() != procedure.id() || edges.len() != procedure.statement_count() {
            return Err(inconsistent_error!(
                "control-flow edges of {} used to solve {}",
                edges.procedure(),
                procedure.id()
            ));
        }

        let width = catalog.len();
        let count = procedure.statement_count();
        let kill_sets = (0..count)
            .map(|index| catalog.kill_set(StmtId::new(index)))
            .collect();
        let gen_sets = (0..count)
            .map(|index| catalog.gen_set(StmtId::new(index)))
            .collect();

        let mut solver = Solver {
            procedure,
            edges,
            loop_passes,
            in_sets: vec![BitVector::new(width); count],
            out_sets: vec![BitVector::new(width); count],
            kill_sets,
            gen_sets,
        };
        solver.visit(procedure.root())?;

        Ok(Self {
            procedure: procedure.id(),
            width,
            in_sets: solver.in_sets,
            out_sets: solver.out_sets,
            kill_sets: solver.kill_sets,
        })
    }

    /// Returns the id of the procedure this solution belongs to.
    #[must_use]
    pub const fn procedure(&self) -> ProcedureId {
        self.procedure
    }

    /// Returns `N`, the width of every vector.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the definitions reaching the point before `statement`.
    #[must_use]
    pub fn in_set(&self, statement: StmtId) -> Option<&BitVector> {
        self.in_sets.get(statement.index())
    }

    /// Returns the definitions reaching the point after `statement`.
    #[must_use]
    pub fn out_set(&self, statement: StmtId) -> Option<&BitVector> {
        self.out_sets.get(statement.index())
    }

    /// Returns the KILL vector of `statement`, present only for assignments and calls that
    /// define at least one variable.
    #[must_use]
    pub fn kill_set(&self, statement: StmtId) -> Option<&BitVector> {
        self.kill_sets.get(statement.index())?.as_ref()
    }
}

struct Solver<'a> {
    procedure: &'a Procedure,
    edges: &'a ControlFlowEdges,
    loop_passes: usize,
    in_sets: Vec<BitVector>,
    out_sets: Vec<BitVector>,
    kill_sets: Vec<Option<BitVector>>,
    gen_sets: Vec<BitVector>,
}

impl Solver<'_> {
    /// `IN(id) |= OUT(pred)` for every predecessor.
    fn merge_predecessors(&mut self, id: StmtId) -> Result<()> {
        let edges = self.edges;
        let preds = edges
            .predecessors(id)
            .ok_or_else(|| inconsistent_error!("statement {} has no predecessor list", id))?;
        for pred in preds {
            self.in_sets[id.index()].merge(&self.out_sets[pred.index()]);
        }
        Ok(())
    }

    fn pass_through(&mut self, id: StmtId) {
        let index = id.index();
        self.out_sets[index].copy_from(&self.in_sets[index]);
    }

    fn copy_out(&mut self, id: StmtId, from: StmtId) {
        let value = self.out_sets[from.index()].clone();
        self.out_sets[id.index()] = value;
    }

    fn visit(&mut self, id: StmtId) -> Result<()> {
        let procedure = self.procedure;
        let stmt = procedure
            .statement(id)
            .ok_or_else(|| inconsistent_error!("statement {} is not part of the procedure", id))?;

        self.merge_predecessors(id)?;

        match &stmt.kind {
            StatementKind::Assign { .. } | StatementKind::Call { .. } => {
                self.pass_through(id);
                let index = id.index();
                if let Some(kill) = &self.kill_sets[index] {
                    self.out_sets[index].subtract(kill);
                }
                self.out_sets[index].merge(&self.gen_sets[index]);
            }
            StatementKind::Sequence(children) => {
                for &child in children {
                    self.visit(child)?;
                }
                match children.last() {
                    Some(&last) => self.copy_out(id, last),
                    None => self.pass_through(id),
                }
            }
            StatementKind::Conditional {
                then_branch,
                else_branch,
                ..
            } => {
                self.visit(*then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.visit(*else_branch)?;
                }

                self.copy_out(id, *then_branch);
                let other = match else_branch {
                    Some(else_branch) => self.out_sets[else_branch.index()].clone(),
                    None => self.in_sets[id.index()].clone(),
                };
                self.out_sets[id.index()].merge(&other);
            }
            StatementKind::Loop {
                init, step, body, ..
            } => {
                if let Some(init) = init {
                    self.visit(*init)?;
                }
                for _ in 0..self.loop_passes {
                    self.visit(*body)?;
                    if let Some(step) = step {
                        self.visit(*step)?;
                    }
                }
                self.merge_predecessors(id)?;
                self.pass_through(id);
            }
            StatementKind::Scope(body) => {
                self.visit(*body)?;
                self.copy_out(id, *body);
            }
            StatementKind::Jump { .. }
            | StatementKind::Branch { .. }
            | StatementKind::Label { .. }
            | StatementKind::Mark
            | StatementKind::Return(_)
            | StatementKind::Store { .. }
            | StatementKind::Eval(_) => self.pass_through(id),
        }
        Ok(())
    }
}
