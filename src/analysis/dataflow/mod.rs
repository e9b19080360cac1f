//! Reaching-definitions dataflow over the structured statement tree.
//!
//! The engine computes, for every statement, which definitions may reach it, and links each
//! variable read with those definitions. It is intraprocedural and tracks scalar variables only:
//! stores and loads through memory are not definitions or uses.
//!
//! # Architecture
//!
//! Four stages run in a fixed order, each stored in a side table keyed by arena index:
//!
//! - [`DefinitionCatalog`]: dense numbering `[0, N)` of every definition site plus the
//!   per-variable kill map
//! - [`ControlFlowEdges`]: predecessor (and successor) lists from a single tree walk
//! - [`ReachingDefinitions`]: IN/OUT/KILL bit vectors of width `N` with the bounded
//!   [`LOOP_SOLVE_PASSES`] loop policy
//! - [`DefUseChains`]: reaching definitions per use and reached uses per definition
//!
//! [`DataflowContext`] threads the per-run state through the stages and
//! [`DataflowEngine`] drives a full run, producing [`DataflowResults`].
//!
//! # Example
//!
//! ```rust
//! use hlsflow::prelude::*;
//!
//! // x = 0; while (c) { y = x; x = x + 1; }
//! let mut b = ProcedureBuilder::new("counter");
//! let x = b.local("x");
//! let y = b.local("y");
//! let c = b.parameter("c");
//! let init = b.assign(x, Expression::constant(0));
//! let read = b.assign(y, Expression::load(x));
//! let bump = b.assign(x, Expression::binary(BinaryOp::Add, Expression::load(x), Expression::constant(1)));
//! let body = b.sequence(vec![read, bump]);
//! let lp = b.while_loop(Expression::load(c), body);
//! let root = b.sequence(vec![init, lp]);
//! let procedure = b.finish(root)?;
//!
//! let results = DataflowEngine::default().run(&procedure)?;
//! let use_of_x = procedure.uses_in(read).next().unwrap();
//! assert_eq!(results.reaching_defs(use_of_x).len(), 2);
//! # Ok::<(), hlsflow::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are `Send` and `Sync`. The engine keeps no global state, so
//! independent procedures can be analyzed in parallel.

mod catalog;
mod chains;
mod config;
mod context;
mod dump;
mod edges;
mod engine;
mod results;
mod solver;

pub use catalog::{DefId, Definition, DefinitionCatalog};
pub use chains::DefUseChains;
pub use config::{EngineConfig, LOOP_SOLVE_PASSES};
pub use context::DataflowContext;
pub use edges::ControlFlowEdges;
pub use engine::DataflowEngine;
pub use results::DataflowResults;
pub use solver::ReachingDefinitions;
