//! Expression AST.

/// Which join-point facet an atom tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomKind {
    Scope,
    Type,
    Member,
}

/// One primitive test: a wildcard pattern over a single facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub kind: AtomKind,
    pub pattern: String,
    /// Type atoms only: trailing `+` was present, include subtypes.
    pub subtypes: bool,
    /// Byte span of the atom in the source expression, for error reporting.
    pub span: (usize, usize),
}

/// Parsed pointcut expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Atom(Atom),
}
