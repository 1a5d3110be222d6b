//! Compilation and three-valued evaluation of pointcut expressions.
//!
//! The same compiled expression answers three progressively sharper
//! questions: "could this scope ever match", "does this type match (fast /
//! full)", and "does this member match". Facets not yet known evaluate to
//! Maybe, which propagates through the boolean operators conservatively —
//! fast answers may over-approximate but never reject a true match.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use weft_core::errors::ExpressionError;
use weft_core::types::descriptors::{MemberDescriptor, TypeDescriptor};

use super::ast::{Atom, AtomKind, Expr};
use super::parser::parse;
use super::universe::{any_supertype, TypeUniverse};
use crate::matcher::patterns::{compile_pattern, is_literal, literal_prefix};

/// Three-valued logic for partial join-point knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tri {
    True,
    False,
    Maybe,
}

impl Tri {
    fn and(self, other: Tri) -> Tri {
        match (self, other) {
            (Tri::False, _) | (_, Tri::False) => Tri::False,
            (Tri::True, Tri::True) => Tri::True,
            _ => Tri::Maybe,
        }
    }

    fn or(self, other: Tri) -> Tri {
        match (self, other) {
            (Tri::True, _) | (_, Tri::True) => Tri::True,
            (Tri::False, Tri::False) => Tri::False,
            _ => Tri::Maybe,
        }
    }

    fn not(self) -> Tri {
        match self {
            Tri::True => Tri::False,
            Tri::False => Tri::True,
            Tri::Maybe => Tri::Maybe,
        }
    }

    fn from_bool(b: bool) -> Tri {
        if b {
            Tri::True
        } else {
            Tri::False
        }
    }
}

/// Compiled atom: pattern regex plus what the atom needs at match time.
enum Node {
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
    Scope(Regex),
    Type {
        regex: Regex,
        /// Also match when any transitive supertype name matches.
        subtypes: bool,
        /// Non-empty literal prefix of the pattern, used by fast matching.
        prefix: String,
    },
    Member(Regex),
}

/// Facts known at one evaluation site. Absent facets evaluate to Maybe.
#[derive(Clone, Copy, Default)]
struct Facts<'a> {
    scope: Option<&'a str>,
    ty: Option<&'a TypeDescriptor>,
    member: Option<&'a MemberDescriptor>,
}

/// A pointcut expression compiled against one type universe.
pub struct CompiledPointcut {
    source: String,
    node: Node,
    universe: Arc<dyn TypeUniverse>,
}

impl fmt::Debug for CompiledPointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPointcut")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl CompiledPointcut {
    /// Parse and compile an expression, resolving literal type symbols
    /// against the universe. Unknown literal symbols and malformed patterns
    /// are compile-time errors carrying the offending span.
    pub fn compile(
        source: &str,
        universe: Arc<dyn TypeUniverse>,
    ) -> Result<Self, ExpressionError> {
        let expr = parse(source)?;
        let node = compile_node(source, &expr, universe.as_ref())?;
        Ok(Self {
            source: source.to_string(),
            node,
            universe,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Could any type loaded under this scope ever match?
    pub fn matches_scope(&self, scope: &str) -> bool {
        let facts = Facts {
            scope: Some(scope),
            ..Facts::default()
        };
        self.eval(&self.node, facts, false) != Tri::False
    }

    /// Conservative type-level pre-filter: cheap name-prefix tests only, no
    /// universe resolution. May over-approximate, never under-approximates.
    pub fn fast_match(&self, scope: &str, ty: &TypeDescriptor) -> bool {
        let facts = Facts {
            scope: Some(scope),
            ty: Some(ty),
            member: None,
        };
        self.eval(&self.node, facts, true) != Tri::False
    }

    /// Full type-level match: member atoms remain Maybe.
    pub fn matches_type(&self, scope: &str, ty: &TypeDescriptor) -> bool {
        let facts = Facts {
            scope: Some(scope),
            ty: Some(ty),
            member: None,
        };
        self.eval(&self.node, facts, false) != Tri::False
    }

    /// Member-level match with every facet known: no Maybe remains, so the
    /// join point matches only on a definite True.
    pub fn matches_member(
        &self,
        scope: &str,
        ty: &TypeDescriptor,
        member: &MemberDescriptor,
    ) -> bool {
        let facts = Facts {
            scope: Some(scope),
            ty: Some(ty),
            member: Some(member),
        };
        self.eval(&self.node, facts, false) == Tri::True
    }

    fn eval(&self, node: &Node, facts: Facts<'_>, fast: bool) -> Tri {
        match node {
            Node::And(a, b) => self.eval(a, facts, fast).and(self.eval(b, facts, fast)),
            Node::Or(a, b) => self.eval(a, facts, fast).or(self.eval(b, facts, fast)),
            Node::Not(inner) => self.eval(inner, facts, fast).not(),
            Node::Scope(regex) => match facts.scope {
                Some(scope) => Tri::from_bool(regex.is_match(scope)),
                None => Tri::Maybe,
            },
            Node::Member(regex) => match facts.member {
                Some(member) => Tri::from_bool(regex.is_match(&member.name)),
                None => Tri::Maybe,
            },
            Node::Type {
                regex,
                subtypes,
                prefix,
            } => {
                let Some(ty) = facts.ty else {
                    return Tri::Maybe;
                };
                if fast {
                    // Name-only containment test; subtype knowledge needs
                    // the universe, so it stays Maybe here.
                    if !prefix.is_empty() && ty.name.contains(prefix.as_str()) {
                        return Tri::Maybe;
                    }
                    if regex.is_match(&ty.name) {
                        return Tri::True;
                    }
                    return if *subtypes { Tri::Maybe } else { Tri::False };
                }
                if regex.is_match(&ty.name) {
                    return Tri::True;
                }
                if *subtypes {
                    return Tri::from_bool(any_supertype(self.universe.as_ref(), ty, |name| {
                        regex.is_match(name)
                    }));
                }
                Tri::False
            }
        }
    }
}

fn compile_node(
    source: &str,
    expr: &Expr,
    universe: &dyn TypeUniverse,
) -> Result<Node, ExpressionError> {
    match expr {
        Expr::And(a, b) => Ok(Node::And(
            Box::new(compile_node(source, a, universe)?),
            Box::new(compile_node(source, b, universe)?),
        )),
        Expr::Or(a, b) => Ok(Node::Or(
            Box::new(compile_node(source, a, universe)?),
            Box::new(compile_node(source, b, universe)?),
        )),
        Expr::Not(inner) => Ok(Node::Not(Box::new(compile_node(source, inner, universe)?))),
        Expr::Atom(atom) => compile_atom(source, atom, universe),
    }
}

fn compile_atom(
    source: &str,
    atom: &Atom,
    universe: &dyn TypeUniverse,
) -> Result<Node, ExpressionError> {
    let regex = compile_pattern(&atom.pattern)
        .map_err(|reason| ExpressionError::new(source, atom.span, reason))?;
    match atom.kind {
        AtomKind::Scope => Ok(Node::Scope(regex)),
        AtomKind::Member => Ok(Node::Member(regex)),
        AtomKind::Type => {
            // A literal (wildcard-free) symbol must exist in the universe;
            // a typo here would otherwise silently match nothing.
            if is_literal(&atom.pattern) && universe.resolve_type(&atom.pattern).is_none() {
                return Err(ExpressionError::new(
                    source,
                    atom.span,
                    format!("unknown type symbol '{}'", atom.pattern),
                ));
            }
            Ok(Node::Type {
                regex,
                subtypes: atom.subtypes,
                prefix: literal_prefix(&atom.pattern).to_string(),
            })
        }
    }
}
