//! Statements of the structured tree.

use std::fmt;

use crate::ir::{Expression, SymbolId, SymbolTable};

/// Arena index of a statement within its [`Procedure`](crate::ir::Procedure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtId(usize);

impl StmtId {
    /// Creates a statement id from a raw arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One argument of a call statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArgument {
    /// Passed by value. Its loads are reads of the call statement.
    Value(Expression),
    /// Passed by reference. The callee writes it, so it is a definition of the call statement.
    Reference(SymbolId),
}

/// The shape of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// Children executed in order.
    Sequence(Vec<StmtId>),
    /// `if (condition) then_branch else else_branch`
    Conditional {
        /// Branch condition, read by the conditional itself
        condition: Expression,
        /// Taken when the condition holds
        then_branch: StmtId,
        /// Taken otherwise
        else_branch: Option<StmtId>,
    },
    /// `for (init; test; step) body`. A `while` loop has neither init nor step.
    Loop {
        /// Executed once before the first test
        init: Option<StmtId>,
        /// Loop condition, read by the loop statement itself
        test: Expression,
        /// Executed after every iteration of the body
        step: Option<StmtId>,
        /// The loop body
        body: StmtId,
    },
    /// `target = value` on a scalar variable.
    Assign {
        /// The defined variable
        target: SymbolId,
        /// The assigned value
        value: Expression,
    },
    /// `*address = value`. Not tracked as a definition.
    Store {
        /// The written address
        address: Expression,
        /// The stored value
        value: Expression,
    },
    /// `destination = callee(arguments)`
    Call {
        /// The called procedure
        callee: SymbolId,
        /// Receives the return value, if any
        destination: Option<SymbolId>,
        /// Arguments in call order
        arguments: Vec<CallArgument>,
    },
    /// `goto label`
    Jump {
        /// Target label name
        label: String,
    },
    /// `if (condition) goto label`
    Branch {
        /// Branch condition
        condition: Expression,
        /// Target label name
        label: String,
    },
    /// `name:`
    Label {
        /// The label name
        name: String,
    },
    /// A position marker with no effect.
    Mark,
    /// `return value`
    Return(Option<Expression>),
    /// A nested block.
    Scope(StmtId),
    /// An expression evaluated for its effect.
    Eval(Expression),
}

/// A statement node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// What the statement does
    pub kind: StatementKind,
}

impl Statement {
    /// Wraps a kind into a statement.
    #[must_use]
    pub const fn new(kind: StatementKind) -> Self {
        Self { kind }
    }

    /// Returns the child statements in document order.
    ///
    /// A loop lists init, step and body, matching the textual order of a C `for` header.
    #[must_use]
    pub fn children(&self) -> Vec<StmtId> {
        match &self.kind {
            StatementKind::Sequence(children) => children.clone(),
            StatementKind::Conditional {
                then_branch,
                else_branch,
                ..
            } => std::iter::once(*then_branch).chain(*else_branch).collect(),
            StatementKind::Loop {
                init, step, body, ..
            } => init.iter().chain(step).copied().chain([*body]).collect(),
            StatementKind::Scope(body) => vec![*body],
            _ => Vec::new(),
        }
    }

    /// Calls `f` for every expression this statement evaluates itself, in evaluation order.
    ///
    /// Expressions of nested statements are not visited.
    pub fn for_each_expression(&self, mut f: impl FnMut(&Expression)) {
        match &self.kind {
            StatementKind::Conditional { condition, .. }
            | StatementKind::Branch { condition, .. } => f(condition),
            StatementKind::Loop { test, .. } => f(test),
            StatementKind::Assign { value, .. } => f(value),
            StatementKind::Store { address, value } => {
                f(address);
                f(value);
            }
            StatementKind::Call { arguments, .. } => {
                for argument in arguments {
                    if let CallArgument::Value(value) = argument {
                        f(value);
                    }
                }
            }
            StatementKind::Return(Some(value)) | StatementKind::Eval(value) => f(value),
            StatementKind::Return(None)
            | StatementKind::Sequence(_)
            | StatementKind::Jump { .. }
            | StatementKind::Label { .. }
            | StatementKind::Mark
            | StatementKind::Scope(_) => {}
        }
    }

    /// Returns the symbols this statement defines, in definition-catalog order.
    ///
    /// An assignment defines its target. A call defines its destination, then each
    /// by-reference argument in argument order. Every other statement defines nothing.
    #[must_use]
    pub fn defined_symbols(&self) -> Vec<SymbolId> {
        match &self.kind {
            StatementKind::Assign { target, .. } => vec![*target],
            StatementKind::Call {
                destination,
                arguments,
                ..
            } => destination
                .iter()
                .copied()
                .chain(arguments.iter().filter_map(|argument| match argument {
                    CallArgument::Reference(symbol) => Some(*symbol),
                    CallArgument::Value(_) => None,
                }))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns `true` for statements that contain other statements.
    #[must_use]
    pub const fn is_compound(&self) -> bool {
        matches!(
            self.kind,
            StatementKind::Sequence(_)
                | StatementKind::Conditional { .. }
                | StatementKind::Loop { .. }
                | StatementKind::Scope(_)
        )
    }

    /// Returns `true` for loops.
    #[must_use]
    pub const fn is_loop(&self) -> bool {
        matches!(self.kind, StatementKind::Loop { .. })
    }

    /// Returns the label targeted by a jump or branch.
    #[must_use]
    pub fn jump_target(&self) -> Option<&str> {
        match &self.kind {
            StatementKind::Jump { label } | StatementKind::Branch { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Short kind name used in dumps.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self.kind {
            StatementKind::Sequence(_) => "sequence",
            StatementKind::Conditional { .. } => "if",
            StatementKind::Loop { .. } => "loop",
            StatementKind::Assign { .. } => "assign",
            StatementKind::Store { .. } => "store",
            StatementKind::Call { .. } => "call",
            StatementKind::Jump { .. } => "goto",
            StatementKind::Branch { .. } => "branch",
            StatementKind::Label { .. } => "label",
            StatementKind::Mark => "mark",
            StatementKind::Return(_) => "return",
            StatementKind::Scope(_) => "scope",
            StatementKind::Eval(_) => "eval",
        }
    }

    /// One-line source-like rendering of the statement itself, without nested statements.
    #[must_use]
    pub fn render(&self, symbols: &SymbolTable) -> String {
        match &self.kind {
            StatementKind::Sequence(children) => format!("{{ {} statements }}", children.len()),
            StatementKind::Conditional { condition, .. } => {
                format!("if ({})", condition.render(symbols))
            }
            StatementKind::Loop { test, .. } => format!("loop ({})", test.render(symbols)),
            StatementKind::Assign { target, value } => {
                format!("{} = {}", symbols.name(*target), value.render(symbols))
            }
            StatementKind::Store { address, value } => {
                format!("*{} = {}", address.render(symbols), value.render(symbols))
            }
            StatementKind::Call {
                callee,
                destination,
                arguments,
            } => {
                let args: Vec<String> = arguments
                    .iter()
                    .map(|argument| match argument {
                        CallArgument::Value(value) => value.render(symbols),
                        CallArgument::Reference(symbol) => format!("&{}", symbols.name(*symbol)),
                    })
                    .collect();
                let call = format!("{}({})", symbols.name(*callee), args.join(", "));
                match destination {
                    Some(destination) => format!("{} = {call}", symbols.name(*destination)),
                    None => call,
                }
            }
            StatementKind::Jump { label } => format!("goto {label}"),
            StatementKind::Branch { condition, label } => {
                format!("if ({}) goto {label}", condition.render(symbols))
            }
            StatementKind::Label { name } => format!("{name}:"),
            StatementKind::Mark => "mark".to_string(),
            StatementKind::Return(Some(value)) => format!("return {}", value.render(symbols)),
            StatementKind::Return(None) => "return".to_string(),
            StatementKind::Scope(_) => "scope".to_string(),
            StatementKind::Eval(value) => value.render(symbols),
        }
    }
}
