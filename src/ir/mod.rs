//! Structured statement-tree IR.
//!
//! # Key Components
//!
//! - [`SymbolTable`] / [`SymbolId`] - resolved names, with aggregate parameters flattened into
//!   scalar field variables
//! - [`Expression`] - side-effect-free expression trees; [`Expression::Load`] is the only
//!   tracked variable read
//! - [`Statement`] / [`StatementKind`] - the statement sum type, stored in an arena and
//!   addressed by [`StmtId`]
//! - [`Procedure`] - a validated tree plus its enumerated variable reads ([`Use`])
//! - [`ProcedureBuilder`] - bottom-up construction and validation

mod builder;
mod expr;
mod procedure;
mod stmt;
mod symbol;

pub use builder::ProcedureBuilder;
pub use expr::{BinaryOp, Expression, UnaryOp};
pub use procedure::{Procedure, ProcedureId, Use, UseId};
pub use stmt::{CallArgument, Statement, StatementKind, StmtId};
pub use symbol::{Symbol, SymbolId, SymbolKind, SymbolTable};
