//! Human-readable renderings of [`DataflowResults`].

use std::{collections::HashMap, fmt::Write};

use crate::{
    analysis::dataflow::DataflowResults,
    ir::{Procedure, StatementKind, StmtId},
    utils::{escape_dot, BitVector},
    Result,
};

fn depth(procedure: &Procedure, id: StmtId) -> usize {
    let mut depth = 0;
    let mut current = procedure.parent(id);
    while let Some(parent) = current {
        depth += 1;
        current = procedure.parent(parent);
    }
    depth
}

fn ids<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Maps the last statement of every loop iteration (the step, or the body without one) to its
/// loop. Edges leaving such a statement into its own loop are back-edges.
fn iteration_ends(procedure: &Procedure) -> HashMap<StmtId, StmtId> {
    procedure
        .statements()
        .filter_map(|(id, stmt)| match &stmt.kind {
            StatementKind::Loop { step, body, .. } => Some((step.unwrap_or(*body), id)),
            _ => None,
        })
        .collect()
}

fn vector(v: Option<&BitVector>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v} {v:?}"))
}

impl DataflowResults {
    /// Lists predecessors and the IN, OUT and KILL vectors of every statement in document
    /// order, indented by nesting depth.
    ///
    /// # Arguments
    ///
    /// * `procedure` - The procedure these results were computed for
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) if `procedure` is not the
    /// analyzed procedure.
    pub fn dump_dataflow(&self, procedure: &Procedure) -> Result<String> {
        self.ensure_matches(procedure)?;
        let symbols = procedure.symbols();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "dataflow of '{}': {} statements, {} definitions",
            procedure.name(),
            procedure.statement_count(),
            self.definition_count()
        );

        for &id in procedure.document_order() {
            let Some(stmt) = procedure.statement(id) else {
                continue;
            };
            let indent = "  ".repeat(depth(procedure, id));
            let _ = writeln!(
                out,
                "{indent}{id} {}: {}",
                stmt.kind_name(),
                stmt.render(symbols)
            );
            let _ = writeln!(out, "{indent}    preds: [{}]", ids(self.predecessors(id)));
            let defs = self.definitions_at(id);
            if !defs.is_empty() {
                let _ = writeln!(out, "{indent}    defs:  [{}]", ids(defs));
            }
            let _ = writeln!(out, "{indent}    IN:    {}", vector(self.in_set(id)));
            let _ = writeln!(out, "{indent}    OUT:   {}", vector(self.out_set(id)));
            if let Some(kill) = self.kill_set(id) {
                let _ = writeln!(out, "{indent}    KILL:  {}", vector(Some(kill)));
            }
        }
        Ok(out)
    }

    /// Lists every definition with the uses it reaches, then every use with its reaching
    /// definitions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) if `procedure` is not the
    /// analyzed procedure.
    pub fn dump_chains(&self, procedure: &Procedure) -> Result<String> {
        self.ensure_matches(procedure)?;
        let symbols = procedure.symbols();

        let mut out = String::new();
        let _ = writeln!(out, "definitions of '{}':", procedure.name());
        for (def, definition) in self.catalog.iter() {
            let uses = self.reached_uses(def);
            let _ = writeln!(
                out,
                "  {def} {} @ {}: {} uses [{}]",
                symbols.name(definition.variable),
                definition.statement,
                uses.len(),
                ids(uses)
            );
        }

        let _ = writeln!(out, "uses of '{}':", procedure.name());
        for (use_id, site) in procedure.uses() {
            let _ = writeln!(
                out,
                "  {use_id} {} @ {} <- [{}]",
                symbols.name(site.symbol),
                site.statement,
                ids(self.reaching_defs(use_id))
            );
        }
        Ok(out)
    }

    /// Renders the predecessor graph in Graphviz DOT format.
    ///
    /// Edges from a jump or branch to its label are dashed; loop back-edges (edges from the end
    /// of an iteration into the same loop) are drawn in blue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) if `procedure` is not the
    /// analyzed procedure.
    pub fn edges_to_dot(&self, procedure: &Procedure) -> Result<String> {
        self.ensure_matches(procedure)?;
        let symbols = procedure.symbols();

        let mut dot = String::new();
        dot.push_str("digraph Dataflow {\n");
        let _ = writeln!(dot, "    label=\"{}\";", escape_dot(procedure.name()));
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n\n");

        for &id in procedure.document_order() {
            let Some(stmt) = procedure.statement(id) else {
                continue;
            };
            let label = format!("{id} {}", stmt.render(symbols));
            let style = if id == procedure.root() {
                ", style=filled, fillcolor=lightgreen"
            } else if stmt.is_compound() {
                ", style=rounded"
            } else {
                ""
            };
            let _ = writeln!(
                dot,
                "    S{} [label=\"{}\"{style}];",
                id.index(),
                escape_dot(&label)
            );
        }

        dot.push('\n');

        let ends = iteration_ends(procedure);
        for (from, to) in self.edges.edges() {
            let is_jump = matches!(
                procedure.statement(to).map(|s| &s.kind),
                Some(StatementKind::Label { .. })
            ) && procedure
                .statement(from)
                .is_some_and(|s| s.jump_target().is_some());
            let is_back = ends
                .get(&from)
                .is_some_and(|&lp| procedure.contains(lp, to));

            let style = match (is_jump, is_back) {
                (true, _) => " [style=dashed]",
                (false, true) => " [color=blue]",
                (false, false) => "",
            };
            let _ = writeln!(dot, "    S{} -> S{}{style};", from.index(), to.index());
        }

        dot.push_str("}\n");
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analysis::dataflow::DataflowEngine,
        ir::ProcedureBuilder,
        test::{conditional, straight_line, while_loop},
        Error,
    };

    #[test]
    fn test_dump_dataflow_lists_vectors() {
        let fixture = straight_line();
        let results = DataflowEngine::default().run(&fixture.procedure).unwrap();
        let dump = results.dump_dataflow(&fixture.procedure).unwrap();

        assert!(dump.starts_with("dataflow of 'straight_line': 5 statements, 4 definitions"));
        // x = 2 kills x = 1
        assert!(dump.contains("x = 2"));
        assert!(dump.contains("KILL:  1000 {0}"));
        assert!(dump.contains("OUT:   0111 {1, 2, 3}"));
    }

    #[test]
    fn test_dump_chains_both_directions() {
        let fixture = conditional();
        let results = DataflowEngine::default().run(&fixture.procedure).unwrap();
        let dump = results.dump_chains(&fixture.procedure).unwrap();

        assert!(dump.contains("definitions of 'conditional':"));
        assert!(dump.contains("uses of 'conditional':"));
        assert!(dump.contains("d0 x @"));
        assert!(dump.contains("<- [d0, d1]"));
    }

    #[test]
    fn test_edges_to_dot_marks_back_edges() {
        let fixture = while_loop();
        let results = DataflowEngine::default().run(&fixture.procedure).unwrap();
        let dot = results.edges_to_dot(&fixture.procedure).unwrap();

        assert!(dot.starts_with("digraph Dataflow {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains(&format!(
            "S{} -> S{} [color=blue];",
            fixture.body.index(),
            fixture.lp.index()
        )));
        assert!(dot.contains(&format!(
            "S{} -> S{};",
            fixture.init.index(),
            fixture.lp.index()
        )));
    }

    #[test]
    fn test_edges_to_dot_dashes_jumps() {
        let mut b = ProcedureBuilder::new("jumps");
        let jump = b.jump("end");
        let label = b.label("end");
        let root = b.sequence(vec![jump, label]);
        let procedure = b.finish(root).unwrap();
        let results = DataflowEngine::default().run(&procedure).unwrap();
        let dot = results.edges_to_dot(&procedure).unwrap();

        assert!(dot.contains(&format!(
            "S{} -> S{} [style=dashed];",
            jump.index(),
            label.index()
        )));
    }

    #[test]
    fn test_dumps_reject_other_procedure() {
        let a = straight_line();
        let b = straight_line();
        let results = DataflowEngine::default().run(&a.procedure).unwrap();

        assert!(matches!(
            results.dump_dataflow(&b.procedure),
            Err(Error::Inconsistent { .. })
        ));
        assert!(results.dump_chains(&b.procedure).is_err());
        assert!(results.edges_to_dot(&b.procedure).is_err());
    }
}
