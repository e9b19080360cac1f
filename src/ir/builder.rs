//! Bottom-up construction of [`Procedure`]s.

use crate::{
    ir::{
        CallArgument, Expression, Procedure, ProcedureId, Statement, StatementKind, StmtId,
        SymbolId, SymbolKind, SymbolTable, Use,
    },
    Error, Result,
};

/// Builds a procedure's symbol table and statement arena.
///
/// Statements are created leaves first; every constructor returns the new statement's id so it
/// can be handed to its parent. [`ProcedureBuilder::finish`] fixes the root and validates that
/// the statements form a single tree.
///
/// # Examples
///
/// ```rust
/// use hlsflow::ir::{BinaryOp, Expression, ProcedureBuilder};
///
/// // for (i = 0; i < n; i = i + 1) { acc = acc + i; }
/// let mut b = ProcedureBuilder::new("sum");
/// let n = b.parameter("n");
/// let i = b.local("i");
/// let acc = b.local("acc");
///
/// let init = b.assign(i, Expression::constant(0));
/// let test = Expression::binary(BinaryOp::Lt, Expression::load(i), Expression::load(n));
/// let step = b.assign(i, Expression::binary(BinaryOp::Add, Expression::load(i), Expression::constant(1)));
/// let add = b.assign(acc, Expression::binary(BinaryOp::Add, Expression::load(acc), Expression::load(i)));
/// let body = b.sequence(vec![add]);
/// let root = b.for_loop(Some(init), test, Some(step), body);
///
/// let procedure = b.finish(root)?;
/// assert_eq!(procedure.use_count(), 5);
/// # Ok::<(), hlsflow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProcedureBuilder {
    name: String,
    symbols: SymbolTable,
    statements: Vec<Statement>,
}

impl ProcedureBuilder {
    /// Starts a procedure called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: SymbolTable::new(),
            statements: Vec::new(),
        }
    }

    /// Starts a procedure with an already populated symbol table.
    #[must_use]
    pub fn with_symbols(name: impl Into<String>, symbols: SymbolTable) -> Self {
        Self {
            name: name.into(),
            symbols,
            statements: Vec::new(),
        }
    }

    /// Gives access to the symbol table under construction.
    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Declares a local scalar.
    pub fn local(&mut self, name: &str) -> SymbolId {
        self.symbols.add(name, SymbolKind::Local)
    }

    /// Declares a scalar parameter.
    pub fn parameter(&mut self, name: &str) -> SymbolId {
        self.symbols.add(name, SymbolKind::Parameter)
    }

    /// Declares an aggregate parameter with flattened fields. See [`SymbolTable::add_aggregate`].
    pub fn aggregate(&mut self, name: &str, fields: &[&str]) -> (SymbolId, Vec<SymbolId>) {
        self.symbols.add_aggregate(name, fields)
    }

    /// Declares a callee.
    pub fn callee(&mut self, name: &str) -> SymbolId {
        self.symbols.add(name, SymbolKind::Procedure)
    }

    /// Adds a statement of arbitrary kind.
    pub fn push(&mut self, kind: StatementKind) -> StmtId {
        let id = StmtId::new(self.statements.len());
        self.statements.push(Statement::new(kind));
        id
    }

    /// `target = value`
    pub fn assign(&mut self, target: SymbolId, value: Expression) -> StmtId {
        self.push(StatementKind::Assign { target, value })
    }

    /// `*address = value`
    pub fn store(&mut self, address: Expression, value: Expression) -> StmtId {
        self.push(StatementKind::Store { address, value })
    }

    /// `destination = callee(arguments)`
    pub fn call(
        &mut self,
        callee: SymbolId,
        destination: Option<SymbolId>,
        arguments: Vec<CallArgument>,
    ) -> StmtId {
        self.push(StatementKind::Call {
            callee,
            destination,
            arguments,
        })
    }

    /// `goto label`
    pub fn jump(&mut self, label: &str) -> StmtId {
        self.push(StatementKind::Jump {
            label: label.to_string(),
        })
    }

    /// `if (condition) goto label`
    pub fn branch(&mut self, condition: Expression, label: &str) -> StmtId {
        self.push(StatementKind::Branch {
            condition,
            label: label.to_string(),
        })
    }

    /// `name:`
    pub fn label(&mut self, name: &str) -> StmtId {
        self.push(StatementKind::Label {
            name: name.to_string(),
        })
    }

    /// A position marker.
    pub fn mark(&mut self) -> StmtId {
        self.push(StatementKind::Mark)
    }

    /// `return value`
    pub fn ret(&mut self, value: Option<Expression>) -> StmtId {
        self.push(StatementKind::Return(value))
    }

    /// Evaluates `value` for effect.
    pub fn eval(&mut self, value: Expression) -> StmtId {
        self.push(StatementKind::Eval(value))
    }

    /// `{ children... }`
    pub fn sequence(&mut self, children: Vec<StmtId>) -> StmtId {
        self.push(StatementKind::Sequence(children))
    }

    /// `if (condition) then_branch else else_branch`
    pub fn conditional(
        &mut self,
        condition: Expression,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    ) -> StmtId {
        self.push(StatementKind::Conditional {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `for (init; test; step) body`
    pub fn for_loop(
        &mut self,
        init: Option<StmtId>,
        test: Expression,
        step: Option<StmtId>,
        body: StmtId,
    ) -> StmtId {
        self.push(StatementKind::Loop {
            init,
            test,
            step,
            body,
        })
    }

    /// `while (test) body`
    pub fn while_loop(&mut self, test: Expression, body: StmtId) -> StmtId {
        self.for_loop(None, test, None, body)
    }

    /// A nested block around `body`.
    pub fn scope(&mut self, body: StmtId) -> StmtId {
        self.push(StatementKind::Scope(body))
    }

    /// Fixes `root` as the procedure body and validates the tree.
    ///
    /// # Errors
    ///
    /// - [`Error::Malformed`] if `root` or a child id does not exist, if a statement has more
    ///   than one parent, or if a statement is not reachable from `root`
    /// - [`Error::UnknownSymbol`] if any statement mentions a symbol outside the table
    pub fn finish(self, root: StmtId) -> Result<Procedure> {
        let count = self.statements.len();
        if root.index() >= count {
            return Err(Error::Malformed(format!(
                "root {root} is not a statement of '{}'",
                self.name
            )));
        }

        let mut order = Vec::with_capacity(count);
        let mut positions = vec![usize::MAX; count];
        let mut parents = vec![None; count];
        let mut stack = vec![(root, None)];

        while let Some((id, parent)) = stack.pop() {
            let Some(stmt) = self.statements.get(id.index()) else {
                return Err(Error::Malformed(format!(
                    "statement {} references missing child {id}",
                    parent.map_or_else(|| "<root>".to_string(), |p: StmtId| p.to_string())
                )));
            };
            if positions[id.index()] != usize::MAX {
                return Err(Error::Malformed(format!(
                    "statement {id} appears more than once in the tree"
                )));
            }
            positions[id.index()] = order.len();
            parents[id.index()] = parent;
            order.push(id);

            for child in stmt.children().into_iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        if let Some(orphan) = positions.iter().position(|&p| p == usize::MAX) {
            return Err(Error::Malformed(format!(
                "statement {} is not reachable from root {root}",
                StmtId::new(orphan)
            )));
        }

        for stmt in &self.statements {
            self.check_symbols(stmt)?;
        }

        let mut uses = Vec::new();
        for &id in &order {
            self.statements[id.index()].for_each_expression(|expr| {
                expr.for_each_load(&mut |symbol| uses.push(Use {
                    symbol,
                    statement: id,
                }));
            });
        }

        Ok(Procedure {
            id: ProcedureId::next(),
            name: self.name,
            symbols: self.symbols,
            statements: self.statements,
            root,
            uses,
            order,
            positions,
            parents,
        })
    }

    fn check_symbols(&self, stmt: &Statement) -> Result<()> {
        let mut mentioned = stmt.defined_symbols();
        if let StatementKind::Call { callee, .. } = &stmt.kind {
            mentioned.push(*callee);
        }
        stmt.for_each_expression(|expr| mentioned.extend(expr.loads()));

        for symbol in mentioned {
            self.symbols.resolve(symbol)?;
        }
        Ok(())
    }
}
