use thiserror::Error;

use crate::ir::{StmtId, SymbolId};

macro_rules! inconsistent_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Inconsistent {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Inconsistent {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// None of these errors is recoverable. The engine's precondition is a well-formed statement
/// tree produced by an earlier compiler pass, so every variant describes either a malformed
/// input tree or a caller that invoked the analysis stages out of order. Callers are expected
/// to abort the enclosing compilation with the diagnostic carried by the error.
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::UnknownLabel`] - A jump or branch names a label that does not exist
/// - [`Error::NotAVariable`] - A definition target does not resolve to a scalar variable
/// - [`Error::UnknownSymbol`] - A symbol id is not part of the procedure's symbol table
/// - [`Error::Malformed`] - The builder rejected the statement tree
///
/// ## Consistency Errors
/// - [`Error::Inconsistent`] - A stage ran without its prerequisites, or results were
///   combined with a procedure they were not computed for
///
/// # Examples
///
/// ```rust
/// use hlsflow::{ir::ProcedureBuilder, DataflowEngine, Error};
///
/// let mut builder = ProcedureBuilder::new("broken");
/// let jump = builder.jump("missing");
/// let body = builder.sequence(vec![jump]);
/// let procedure = builder.finish(body)?;
///
/// match DataflowEngine::default().run(&procedure) {
///     Err(Error::UnknownLabel { label, .. }) => assert_eq!(label, "missing"),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// # Ok::<(), hlsflow::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A jump or branch targets a label that no `Label` statement defines.
    ///
    /// Raised by the control-flow edge builder. The associated statement is the jump or
    /// branch that carries the dangling target.
    #[error("Statement {statement} jumps to unknown label '{label}'")]
    UnknownLabel {
        /// The label name that could not be resolved
        label: String,
        /// The jump or branch statement
        statement: StmtId,
    },

    /// A definition site does not resolve to a scalar variable.
    ///
    /// Raised by the definition catalog when an assignment target, a call destination or a
    /// by-reference call argument names a symbol that is not a variable (for example a
    /// procedure symbol or an unflattened aggregate).
    #[error("Symbol {symbol} defined by statement {statement} is not a variable")]
    NotAVariable {
        /// The offending symbol
        symbol: SymbolId,
        /// The statement that tries to define it
        statement: StmtId,
    },

    /// A symbol id that is not part of the procedure's symbol table.
    #[error("Unknown symbol - {0}")]
    UnknownSymbol(SymbolId),

    /// The statement tree was rejected while it was being built.
    #[error("Malformed statement tree - {0}")]
    Malformed(String),

    /// The analysis stages were invoked out of order, or their results do not belong to the
    /// procedure being analyzed.
    ///
    /// The error includes the source location where the inconsistency was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the missing or mismatched annotation
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Inconsistent - {file}:{line}: {message}")]
    Inconsistent {
        /// The message to be printed for the Inconsistent error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}
