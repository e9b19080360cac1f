// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # hlsflow
//!
//! The dataflow middle-end of a source-to-hardware compiler. `hlsflow` works on the structured
//! statement tree a front end produces (sequences, conditionals, counted loops, assignments,
//! calls, jumps and labels) and annotates it with everything later hardware passes need to know
//! about how values flow through a procedure.
//!
//! ## Features
//!
//! - **Control-flow edges** - Predecessor sets for every statement, including loop back-edges
//!   and `goto`/branch edges to labels
//! - **Reaching definitions** - An iterative bit-vector gen/kill solver with a fixed two-pass
//!   loop policy, linear in the size of the tree
//! - **Def/use chains** - Exact, mutually inverse links between every variable read and the
//!   definitions that reach it
//! - **Consumer passes** - Feedback-variable detection for pipelined loops, constant-use
//!   discovery and dead-definition reporting
//! - **Parallel batches** - Independent procedures are analyzed concurrently
//!
//! ## Quick Start
//!
//! ```rust
//! use hlsflow::prelude::*;
//!
//! // a = 1; b = a + 2;
//! let mut builder = ProcedureBuilder::new("kernel");
//! let a = builder.local("a");
//! let b = builder.local("b");
//! let s1 = builder.assign(a, Expression::constant(1));
//! let s2 = builder.assign(
//!     b,
//!     Expression::binary(BinaryOp::Add, Expression::load(a), Expression::constant(2)),
//! );
//! let root = builder.sequence(vec![s1, s2]);
//! let procedure = builder.finish(root)?;
//!
//! let results = DataflowEngine::default().run(&procedure)?;
//! assert_eq!(results.definition_count(), 2);
//!
//! let read_of_a = procedure.uses_in(s2).next().unwrap();
//! let defs: Vec<_> = results.reaching_defs(read_of_a).to_vec();
//! assert_eq!(results.definition(defs[0]).map(|d| d.statement), Some(s1));
//! # Ok::<(), hlsflow::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! Every engine invocation rebuilds all annotations from scratch, in this order:
//!
//! 1. [`analysis::dataflow::DefinitionCatalog`] - dense numbering of every definition site
//! 2. [`analysis::dataflow::ControlFlowEdges`] - predecessor sets from a single tree walk
//! 3. [`analysis::dataflow::ReachingDefinitions`] - IN/OUT/KILL vectors per statement
//! 4. [`analysis::dataflow::DefUseChains`] - reaching definitions per use and reached uses per
//!    definition
//!
//! The [`compiler`] module schedules the engine over many procedures and runs the consumer
//! passes on its results.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Every error is fatal: the engine never
//! hands out partially annotated results.
//!
//! ```rust
//! use hlsflow::{ir::ProcedureBuilder, DataflowEngine, Error};
//!
//! let mut builder = ProcedureBuilder::new("broken");
//! let jump = builder.jump("nowhere");
//! let procedure = builder.finish(jump)?;
//!
//! match DataflowEngine::default().run(&procedure) {
//!     Err(Error::UnknownLabel { label, .. }) => println!("dangling goto {label}"),
//!     Err(e) => println!("other error: {e}"),
//!     Ok(_) => unreachable!(),
//! }
//! # Ok::<(), hlsflow::Error>(())
//! ```

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use hlsflow::prelude::*;
///
/// let mut builder = ProcedureBuilder::new("empty");
/// let root = builder.sequence(Vec::new());
/// let procedure = builder.finish(root)?;
/// let results = DataflowEngine::default().run(&procedure)?;
/// assert_eq!(results.definition_count(), 0);
/// # Ok::<(), hlsflow::Error>(())
/// ```
pub mod prelude;

/// The structured statement tree the engine analyzes.
///
/// Procedures are arenas of statements addressed by [`ir::StmtId`], built bottom-up through
/// [`ir::ProcedureBuilder`]. The builder validates the tree shape and enumerates every variable
/// read so that the analyses can attach results to stable ids.
pub mod ir;

/// Dataflow analyses over the statement tree.
///
/// - [`analysis::dataflow`] - definition catalog, control-flow edges, reaching definitions and
///   def/use chains, plus the [`DataflowEngine`] driving them
pub mod analysis;

/// Pass scheduling, shared compilation state, event logging and the passes that consume
/// def/use chains.
pub mod compiler;

/// Small self-contained helpers shared across the crate.
pub mod utils;

/// `hlsflow` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust
/// use hlsflow::{ir::Procedure, DataflowEngine, Result};
///
/// fn definitions(procedure: &Procedure) -> Result<usize> {
///     Ok(DataflowEngine::default().run(procedure)?.definition_count())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `hlsflow` Error type
///
/// The main error type for all operations in this crate. See [`error::Error`](Error) for the
/// individual variants.
pub use error::Error;

pub use analysis::dataflow::{DataflowEngine, DataflowResults, EngineConfig};
