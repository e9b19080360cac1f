//! # hlsflow Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the hlsflow library. Import this module to get quick access to the essential
//! types for building procedures and analyzing them.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all hlsflow operations
pub use crate::Error;

/// The result type used throughout hlsflow
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The dataflow engine, its configuration and the results it produces
pub use crate::analysis::dataflow::{DataflowEngine, DataflowResults, EngineConfig};

// ================================================================================================
// Statement Tree
// ================================================================================================

/// Building and inspecting procedures
pub use crate::ir::{
    BinaryOp, CallArgument, Expression, Procedure, ProcedureBuilder, Statement, StatementKind,
    StmtId, SymbolId, SymbolKind, UnaryOp, Use, UseId,
};

// ================================================================================================
// Analysis Results
// ================================================================================================

/// Definition sites and the bit vectors indexed by them
pub use crate::analysis::dataflow::{DefId, Definition, LOOP_SOLVE_PASSES};

/// Fixed-width bit vector used for IN/OUT/KILL sets
pub use crate::utils::BitVector;

// ================================================================================================
// Compiler Passes
// ================================================================================================

/// Pass scheduling and shared compilation state
pub use crate::compiler::{
    CompilerContext, ConstantUsePass, DeadDefinitionPass, EventKind, EventLog,
    FeedbackDetectionPass, PassScheduler, ProcedurePass,
};
