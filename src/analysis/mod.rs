//! Program analysis over the structured statement tree.
//!
//! # Architecture
//!
//! - [`dataflow`] - definition catalog, control-flow edges, reaching definitions and def/use
//!   chains
//!
//! # Usage
//!
//! ```rust
//! use hlsflow::analysis::dataflow::{DataflowEngine, EngineConfig};
//! use hlsflow::ir::ProcedureBuilder;
//!
//! let mut b = ProcedureBuilder::new("noop");
//! let root = b.mark();
//! let procedure = b.finish(root)?;
//!
//! let results = DataflowEngine::new(EngineConfig::minimal()).run(&procedure)?;
//! assert!(results.predecessors(root).is_empty());
//! # Ok::<(), hlsflow::Error>(())
//! ```

pub mod dataflow;
