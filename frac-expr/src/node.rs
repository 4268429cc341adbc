//! The expression AST.
//!
//! A [`Node`] is a closed set of variants; the differentiator and renderer match on it
//! exhaustively, so adding a variant is a compile error until every consumer handles it. Every
//! node owns its children outright. The derivative rules build several distinct subtrees out of
//! logically-equal copies of an operand, which is only sound because no subtree is ever shared
//! between siblings.
//!
//! An [`Expr`] owns exactly one root node and memoizes its rendered text.

use crate::catalog::Category;
use crate::derivative::{derivative, DerivativeError};
use crate::generate::{generate, GenOptions, GenerationTooLarge};
use once_cell::unsync::OnceCell;
use rand::Rng;
use std::fmt;

/// A terminal of the expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Leaf {
    /// The point being evaluated by the renderer. Renders as its fixed token, `Pt`.
    Point,

    /// A random complex constant. Both components are drawn independently when the leaf is
    /// materialized and are never re-rolled; renders as a two-component constructor call.
    Constant {
        /// The real component.
        re: f64,
        /// The imaginary component.
        im: f64,
    },

    /// A real scalar literal, rendered as a bare floating-point literal. The generator never
    /// produces this kind; differentiation introduces it for constants like `1.0` and `0.5`.
    Real(f64),
}

/// A node of the expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A terminal.
    Leaf(Leaf),

    /// An operator or function applied to an ordered sequence of operands. The operand count
    /// always matches the arity resolved from the catalog entry when the node was instantiated.
    Call {
        /// The name of the function, or the operator token.
        name: &'static str,

        /// The category of the catalog entry this call was drawn from.
        category: Category,

        /// The operands.
        args: Vec<Node>,
    },

    /// A three-operand conditional. The condition is drawn from the logical catalog; both
    /// branches are drawn from the simple catalog.
    Ternary {
        /// The boolean-valued condition.
        cond: Box<Node>,

        /// The value of the conditional when the condition holds.
        then: Box<Node>,

        /// The value of the conditional otherwise.
        otherwise: Box<Node>,
    },
}

impl Node {
    /// Returns the total number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Call { args, .. } => 1 + args.iter().map(Self::count).sum::<usize>(),
            Self::Ternary { cond, then, otherwise } => {
                1 + cond.count() + then.count() + otherwise.count()
            },
        }
    }

    /// Returns the depth of this subtree. A lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Call { args, .. } => {
                1 + args.iter().map(Self::depth).max().unwrap_or(0)
            },
            Self::Ternary { cond, then, otherwise } => {
                1 + cond.depth().max(then.depth()).max(otherwise.depth())
            },
        }
    }
}

/// An expression: one owned root [`Node`] plus a lazily rendered text view.
///
/// The text is computed on the first call to [`Expr::text`] and cached for the life of the
/// expression; the tree itself is immutable once built, so the cache can never go stale.
#[derive(Clone, Debug)]
pub struct Expr {
    root: Node,
    text: OnceCell<String>,
}

impl Expr {
    /// Creates an expression owning the given root node.
    pub fn new(root: Node) -> Self {
        Self { root, text: OnceCell::new() }
    }

    /// Generates a random expression with the given options.
    ///
    /// On [`GenerationTooLarge`], nothing is returned to the caller; retry with the same options
    /// and the same (continued) random source. See [`generate`].
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        opts: &GenOptions,
    ) -> Result<Self, GenerationTooLarge> {
        generate(rng, opts).map(Self::new)
    }

    /// The root node of the expression.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The rendered text of the expression, computed once and cached.
    pub fn text(&self) -> &str {
        self.text.get_or_init(|| self.root.to_string())
    }

    /// Differentiates the expression with respect to the point, returning a brand-new
    /// expression. `self` is never mutated.
    pub fn differentiate(&self) -> Result<Expr, DerivativeError> {
        derivative(&self.root).map(Expr::new)
    }
}

impl From<Node> for Expr {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt() -> Node {
        Node::Leaf(Leaf::Point)
    }

    #[test]
    fn count_and_depth() {
        let node = Node::Call {
            name: "sin",
            category: Category::Simple,
            args: vec![Node::Call {
                name: "+",
                category: Category::Simple,
                args: vec![pt(), Node::Leaf(Leaf::Real(1.0))],
            }],
        };
        assert_eq!(node.count(), 4);
        assert_eq!(node.depth(), 3);
    }

    #[test]
    fn text_is_memoized() {
        let expr = Expr::new(Node::Call {
            name: "cos",
            category: Category::Simple,
            args: vec![pt()],
        });
        let first = expr.text() as *const str;
        let second = expr.text() as *const str;
        assert_eq!(first, second);
        assert_eq!(expr.text(), "cos(Pt)");
    }

    #[test]
    fn differentiate_returns_new_expr() {
        let expr = Expr::new(Node::Call {
            name: "sin",
            category: Category::Simple,
            args: vec![pt()],
        });
        let diff = expr.differentiate().unwrap();
        assert_eq!(expr.text(), "sin(Pt)");
        assert_eq!(diff.text(), "(cos(Pt) * 1.0)");
    }

    #[test]
    fn differentiation_composes() {
        let expr = Expr::new(Node::Call {
            name: "exp",
            category: Category::Simple,
            args: vec![pt()],
        });
        let second = expr.differentiate().unwrap().differentiate().unwrap();
        assert!(!second.text().is_empty());
    }
}
