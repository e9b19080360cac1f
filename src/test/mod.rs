use crate::ir::{BinaryOp, Expression, Procedure, ProcedureBuilder, StmtId, SymbolId};

/// `x = 1; y = x; x = 2; z = x;`
pub struct StraightLine {
    pub procedure: Procedure,
    pub x: SymbolId,
    pub stmts: Vec<StmtId>,
    pub root: StmtId,
}

/// `x = 1; if (c) { x = 2; } y = x;`
pub struct Conditional {
    pub procedure: Procedure,
    pub x: SymbolId,
    pub c: SymbolId,
    pub first: StmtId,
    pub inner: StmtId,
    pub cond: StmtId,
    pub join: StmtId,
}

/// `x = 0; while (c) { y = x; x = x + 1; }`
pub struct WhileLoop {
    pub procedure: Procedure,
    pub x: SymbolId,
    pub init: StmtId,
    pub lp: StmtId,
    pub body: StmtId,
    pub read: StmtId,
    pub update: StmtId,
}

/// `acc = 0; for (i = 0; i < n; i = i + 1) { acc = acc + i; }`
pub struct CountedLoop {
    pub procedure: Procedure,
    pub before: StmtId,
    pub init: StmtId,
    pub step: StmtId,
    pub body: StmtId,
    pub lp: StmtId,
    pub accumulate: StmtId,
}

// Helper function to build `var + 1`
pub fn increment(var: SymbolId) -> Expression {
    Expression::binary(BinaryOp::Add, Expression::load(var), Expression::constant(1))
}

pub fn straight_line() -> StraightLine {
    let mut b = ProcedureBuilder::new("straight_line");
    let x = b.local("x");
    let y = b.local("y");
    let z = b.local("z");

    let stmts = vec![
        b.assign(x, Expression::constant(1)),
        b.assign(y, Expression::load(x)),
        b.assign(x, Expression::constant(2)),
        b.assign(z, Expression::load(x)),
    ];
    let root = b.sequence(stmts.clone());
    let procedure = b.finish(root).unwrap();

    StraightLine {
        procedure,
        x,
        stmts,
        root,
    }
}

pub fn conditional() -> Conditional {
    let mut b = ProcedureBuilder::new("conditional");
    let x = b.local("x");
    let y = b.local("y");
    let c = b.parameter("c");

    let first = b.assign(x, Expression::constant(1));
    let inner = b.assign(x, Expression::constant(2));
    let then = b.sequence(vec![inner]);
    let cond = b.conditional(Expression::load(c), then, None);
    let join = b.assign(y, Expression::load(x));
    let root = b.sequence(vec![first, cond, join]);
    let procedure = b.finish(root).unwrap();

    Conditional {
        procedure,
        x,
        c,
        first,
        inner,
        cond,
        join,
    }
}

pub fn while_loop() -> WhileLoop {
    let mut b = ProcedureBuilder::new("while_loop");
    let x = b.local("x");
    let y = b.local("y");
    let c = b.parameter("c");

    let init = b.assign(x, Expression::constant(0));
    let read = b.assign(y, Expression::load(x));
    let update = b.assign(x, increment(x));
    let body = b.sequence(vec![read, update]);
    let lp = b.while_loop(Expression::load(c), body);
    let root = b.sequence(vec![init, lp]);
    let procedure = b.finish(root).unwrap();

    WhileLoop {
        procedure,
        x,
        init,
        lp,
        body,
        read,
        update,
    }
}

pub fn counted_loop() -> CountedLoop {
    let mut b = ProcedureBuilder::new("counted_loop");
    let acc = b.local("acc");
    let i = b.local("i");
    let n = b.parameter("n");

    let before = b.assign(acc, Expression::constant(0));
    let init = b.assign(i, Expression::constant(0));
    let step = b.assign(i, increment(i));
    let accumulate = b.assign(
        acc,
        Expression::binary(BinaryOp::Add, Expression::load(acc), Expression::load(i)),
    );
    let body = b.sequence(vec![accumulate]);
    let test = Expression::binary(BinaryOp::Lt, Expression::load(i), Expression::load(n));
    let lp = b.for_loop(Some(init), test, Some(step), body);
    let root = b.sequence(vec![before, lp]);
    let procedure = b.finish(root).unwrap();

    CountedLoop {
        procedure,
        before,
        init,
        step,
        body,
        lp,
        accumulate,
    }
}
