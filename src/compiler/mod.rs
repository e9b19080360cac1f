//! Compiler infrastructure around the dataflow engine.
//!
//! This module provides the layer between the analyses and the later hardware passes:
//!
//! - [`crate::analysis`] - catalog, edges, reaching definitions and def/use chains
//! - [`compiler`](self) - batch scheduling, shared state, event logging and the passes that
//!   consume the chains
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Compiler Pipeline                           │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  CompilerContext              Shared per-batch state             │
//! │    ├─ DataflowResults         (per procedure, behind Arc)        │
//! │    ├─ Findings                (feedback, constants, dead defs)   │
//! │    └─ EventLog                                                   │
//! │                                                                  │
//! │  PassScheduler                2-phase batch execution            │
//! │    ├─ Phase 1: Analysis       (engine over every procedure)      │
//! │    └─ Phase 2: Passes         (each pass over every procedure)   │
//! │    Procedures fan out over rayon when configured                 │
//! │                                                                  │
//! │  ProcedurePass trait          Interface for all passes           │
//! │    ├─ should_run()            Cheap per-procedure filter         │
//! │    └─ run()                   Reads results, stores findings     │
//! │                                                                  │
//! │  Passes (3 built-in)          Reports, never rewrites            │
//! │    ├─ FeedbackDetectionPass   Loop-carried reads                 │
//! │    ├─ ConstantUsePass         Reads of a single constant         │
//! │    └─ DeadDefinitionPass      Self copies, unread definitions    │
//! │                                                                  │
//! │  EventLog                     Stage activity and findings        │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use hlsflow::compiler::{CompilerContext, PassScheduler};
//! use hlsflow::ir::{Expression, ProcedureBuilder};
//!
//! let mut b = ProcedureBuilder::new("kernel");
//! let x = b.local("x");
//! let y = b.local("y");
//! let s0 = b.assign(x, Expression::constant(3));
//! let s1 = b.assign(y, Expression::load(x));
//! let root = b.sequence(vec![s0, s1]);
//! let procedure = b.finish(root)?;
//!
//! let ctx = CompilerContext::new();
//! PassScheduler::default().run(&[procedure], &ctx)?;
//! assert_eq!(ctx.constant_uses("kernel")[0].value, 3);
//! assert_eq!(ctx.dead_definitions("kernel").len(), 1);
//! # Ok::<(), hlsflow::Error>(())
//! ```

mod context;
mod events;
mod pass;
mod passes;
mod scheduler;

pub use context::CompilerContext;
pub use events::{Event, EventBuilder, EventKind, EventLog};
pub use pass::ProcedurePass;
pub use passes::{
    ConstantUse, ConstantUsePass, DeadDefinition, DeadDefinitionPass, DeadReason,
    FeedbackDetectionPass, FeedbackRead,
};
pub use scheduler::PassScheduler;
