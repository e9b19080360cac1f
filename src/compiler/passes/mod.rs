//! Built-in passes consuming def/use chains.
//!
//! Each pass reads the [`DataflowResults`](crate::DataflowResults) of one procedure and reports
//! findings into the [`CompilerContext`](crate::compiler::CompilerContext). None of them rewrites
//! the tree.
//!
//! | Pass | Description |
//! |------|-------------|
//! | [`FeedbackDetectionPass`] | Loop-carried reads of the innermost loop, for pipelining |
//! | [`ConstantUsePass`] | Reads that always observe the same constant |
//! | [`DeadDefinitionPass`] | Self copies and definitions that reach no read |
//!
//! # Pass Execution
//!
//! Passes are executed by the [`PassScheduler`](crate::compiler::PassScheduler) after the
//! dataflow engine has analyzed every procedure of the batch. Each pass implements the
//! [`ProcedurePass`](crate::compiler::ProcedurePass) trait.

mod constants;
mod deadcode;
mod feedback;

pub use constants::{ConstantUse, ConstantUsePass};
pub use deadcode::{DeadDefinition, DeadDefinitionPass, DeadReason};
pub use feedback::{FeedbackDetectionPass, FeedbackRead};
