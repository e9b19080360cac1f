//! Constant-use discovery.
//!
//! A read is constant when every definition reaching it assigns the same integer literal. The
//! pass reports such reads so a constant-propagation rewrite can replace them; it does not fold
//! expressions itself. Call outputs are never constant.

use std::fmt;

use crate::{
    analysis::dataflow::DataflowResults,
    compiler::{pass::ProcedurePass, CompilerContext, EventKind},
    ir::{Procedure, StatementKind, SymbolId, UseId},
    Result,
};

/// A read that always observes the same constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantUse {
    /// The read
    pub use_id: UseId,
    /// The variable read
    pub variable: SymbolId,
    /// The value every reaching definition assigns
    pub value: i64,
}

impl fmt::Display for ConstantUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) = {}", self.use_id, self.variable, self.value)
    }
}

/// Constant-use pass.
pub struct ConstantUsePass;

impl Default for ConstantUsePass {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantUsePass {
    /// Creates a new constant-use pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the constant every definition reaching `use_id` assigns, if there is one.
    fn constant_value(
        procedure: &Procedure,
        results: &DataflowResults,
        use_id: UseId,
    ) -> Option<i64> {
        let defs = results.reaching_defs(use_id);
        if defs.is_empty() {
            return None;
        }

        let mut agreed = None;
        for &def in defs {
            let statement = results.definition(def)?.statement;
            let assigned = match &procedure.statement(statement)?.kind {
                StatementKind::Assign { value, .. } => value.as_constant()?,
                _ => return None,
            };
            match agreed {
                None => agreed = Some(assigned),
                Some(seen) if seen != assigned => return None,
                Some(_) => {}
            }
        }
        agreed
    }

    /// Finds every constant read of `procedure`, in use order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) if `results` belong to a
    /// different procedure.
    pub fn discover(procedure: &Procedure, results: &DataflowResults) -> Result<Vec<ConstantUse>> {
        results.ensure_matches(procedure)?;

        Ok(procedure
            .uses()
            .filter_map(|(use_id, site)| {
                Self::constant_value(procedure, results, use_id).map(|value| ConstantUse {
                    use_id,
                    variable: site.symbol,
                    value,
                })
            })
            .collect())
    }
}

impl ProcedurePass for ConstantUsePass {
    fn name(&self) -> &'static str {
        "constant-uses"
    }

    fn description(&self) -> &'static str {
        "Finds reads whose reaching definitions all assign the same constant"
    }

    fn run(
        &self,
        procedure: &Procedure,
        results: &DataflowResults,
        ctx: &CompilerContext,
    ) -> Result<bool> {
        let found = Self::discover(procedure, results)?;
        for constant in &found {
            let event = ctx
                .events
                .record(EventKind::ConstantUse)
                .procedure(procedure.name())
                .pass(self.name())
                .message(format!(
                    "'{}' is always {}",
                    procedure.symbols().name(constant.variable),
                    constant.value
                ));
            if let Some(site) = procedure.use_site(constant.use_id) {
                event.location(site.statement.index());
            }
        }

        let changed = !found.is_empty();
        ctx.set_constant_uses(procedure.name(), found);
        Ok(changed)
    }
}
