//! Def/use chains.
//!
//! For every read `u` of variable `V` performed by statement `s`, the reaching definitions of
//! `u` are the definitions of `V` marked in `IN(s)`. Reads see the vector *before* their
//! statement, so an assignment's own definition never reaches the reads on its right-hand side
//! in the same execution. Inside a loop, the definition from a previous iteration does reach
//! them across the back-edge.
//!
//! Each link is recorded in both directions, so the use-to-definitions lists and the
//! definition-to-uses lists are exact inverses.

use crate::{
    analysis::dataflow::{DefId, DefinitionCatalog, ReachingDefinitions},
    ir::{Procedure, ProcedureId, UseId},
    Result,
};

/// Use-to-definition and definition-to-use links of a procedure.
#[derive(Debug, Clone)]
pub struct DefUseChains {
    procedure: ProcedureId,
    reaching: Vec<Vec<DefId>>,
    reached: Vec<Vec<UseId>>,
}

impl DefUseChains {
    /// Links every variable read of `procedure` with the definitions reaching it.
    ///
    /// # Arguments
    ///
    /// * `procedure` - The procedure whose reads are linked
    /// * `catalog` - Its definition catalog
    /// * `solution` - Its reaching-definitions solution
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) if `catalog` or `solution`
    /// belong to a different procedure, or if a read's statement has no IN vector.
    pub fn build(
        procedure: &Procedure,
        catalog: &DefinitionCatalog,
        solution: &ReachingDefinitions,
    ) -> Result<Self> {
        if catalog.procedure() != procedure.id() || solution.procedure() != procedure.id() {
            return Err(inconsistent_error!(
                "chains for {} requested from catalog {} and solution {}",
                procedure.id(),
                catalog.procedure(),
                solution.procedure()
            ));
        }
        if solution.width() != catalog.len() {
            return Err(inconsistent_error!(
                "solution width {} does not match {} definitions",
                solution.width(),
                catalog.len()
            ));
        }

        let mut reaching = vec![Vec::new(); procedure.use_count()];
        let mut reached = vec![Vec::new(); catalog.len()];

        for (use_id, site) in procedure.uses() {
            let in_set = solution.in_set(site.statement).ok_or_else(|| {
                inconsistent_error!("statement {} of {} has no IN vector", site.statement, use_id)
            })?;

            for index in in_set {
                let def = DefId::new(index);
                let Some(definition) = catalog.get(def) else {
                    return Err(inconsistent_error!("IN vector marks unknown {}", def));
                };
                if definition.variable == site.symbol {
                    reaching[use_id.index()].push(def);
                    reached[index].push(use_id);
                }
            }
        }

        Ok(Self {
            procedure: procedure.id(),
            reaching,
            reached,
        })
    }

    /// Returns the id of the procedure these chains belong to.
    #[must_use]
    pub const fn procedure(&self) -> ProcedureId {
        self.procedure
    }

    /// Returns the definitions reaching `use_id`, in index order.
    #[must_use]
    pub fn reaching_defs(&self, use_id: UseId) -> &[DefId] {
        self.reaching.get(use_id.index()).map_or(&[], Vec::as_slice)
    }

    /// Returns the uses reached by `def`, in document order.
    #[must_use]
    pub fn reached_uses(&self, def: DefId) -> &[UseId] {
        self.reached.get(def.index()).map_or(&[], Vec::as_slice)
    }

    /// Returns the total number of links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.reaching.iter().map(Vec::len).sum()
    }

    /// Checks that both directions of every link are present and nothing dangles.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`](crate::Error::Inconsistent) naming the first broken link.
    pub fn verify(&self) -> Result<()> {
        for (use_index, defs) in self.reaching.iter().enumerate() {
            let use_id = UseId::new(use_index);
            for def in defs {
                if !self.reached_uses(*def).contains(&use_id) {
                    return Err(inconsistent_error!(
                        "{} reaches {} but does not list it",
                        def,
                        use_id
                    ));
                }
            }
        }
        for (def_index, uses) in self.reached.iter().enumerate() {
            let def = DefId::new(def_index);
            for use_id in uses {
                if use_id.index() >= self.reaching.len() {
                    return Err(inconsistent_error!("{} lists unknown {}", def, use_id));
                }
                if !self.reaching_defs(*use_id).contains(&def) {
                    return Err(inconsistent_error!(
                        "{} lists {} which does not see it",
                        def,
                        use_id
                    ));
                }
            }
        }
        Ok(())
    }
}
