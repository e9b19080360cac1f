//! Side-effect-free expressions.
//!
//! Expressions appear inside statements (assignment values, conditions, call arguments). The
//! only variable read is [`Expression::Load`]; reads through memory are opaque to the engine.

use std::fmt;

use crate::ir::{SymbolId, SymbolTable};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation
    Neg,
    /// Bitwise complement
    Not,
    /// Logical negation
    LogicalNot,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Neg => "-",
            Self::Not => "~",
            Self::LogicalNot => "!",
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        })
    }
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Integer literal
    Constant(i64),
    /// Read of a scalar symbol
    Load(SymbolId),
    /// Unary operation
    Unary {
        /// The operator
        op: UnaryOp,
        /// The operand
        operand: Box<Expression>,
    },
    /// Binary operation
    Binary {
        /// The operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expression>,
        /// Right operand
        rhs: Box<Expression>,
    },
    /// Read through a computed address. Not tracked as a variable read.
    MemoryLoad(Box<Expression>),
}

impl Expression {
    /// Integer literal.
    #[must_use]
    pub const fn constant(value: i64) -> Self {
        Self::Constant(value)
    }

    /// Read of `symbol`.
    #[must_use]
    pub const fn load(symbol: SymbolId) -> Self {
        Self::Load(symbol)
    }

    /// `op operand`
    #[must_use]
    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// `lhs op rhs`
    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// `*address`
    #[must_use]
    pub fn memory(address: Expression) -> Self {
        Self::MemoryLoad(Box::new(address))
    }

    /// Returns the literal value if this is a constant.
    #[must_use]
    pub const fn as_constant(&self) -> Option<i64> {
        match self {
            Self::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the loaded symbol if this expression is a bare variable read.
    #[must_use]
    pub const fn as_load(&self) -> Option<SymbolId> {
        match self {
            Self::Load(symbol) => Some(*symbol),
            _ => None,
        }
    }

    /// Calls `f` for every symbol read, left to right.
    ///
    /// Symbols read inside a memory address count as reads; the memory cell does not.
    pub fn for_each_load(&self, f: &mut impl FnMut(SymbolId)) {
        match self {
            Self::Constant(_) => {}
            Self::Load(symbol) => f(*symbol),
            Self::Unary { operand, .. } => operand.for_each_load(f),
            Self::Binary { lhs, rhs, .. } => {
                lhs.for_each_load(f);
                rhs.for_each_load(f);
            }
            Self::MemoryLoad(address) => address.for_each_load(f),
        }
    }

    /// Returns every symbol read, left to right.
    #[must_use]
    pub fn loads(&self) -> Vec<SymbolId> {
        let mut loads = Vec::new();
        self.for_each_load(&mut |symbol| loads.push(symbol));
        loads
    }

    /// Renders the expression with source names from `symbols`.
    #[must_use]
    pub fn render(&self, symbols: &SymbolTable) -> String {
        match self {
            Self::Constant(value) => value.to_string(),
            Self::Load(symbol) => symbols.name(*symbol).to_string(),
            Self::Unary { op, operand } => format!("{op}{}", operand.render_operand(symbols)),
            Self::Binary { op, lhs, rhs } => format!(
                "{} {op} {}",
                lhs.render_operand(symbols),
                rhs.render_operand(symbols)
            ),
            Self::MemoryLoad(address) => format!("*{}", address.render_operand(symbols)),
        }
    }

    fn render_operand(&self, symbols: &SymbolTable) -> String {
        match self {
            Self::Binary { .. } => format!("({})", self.render(symbols)),
            _ => self.render(symbols),
        }
    }
}
