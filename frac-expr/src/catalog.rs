//! The fixed tables of functions and operators that expression trees are built from.
//!
//! There are three catalogs, one per [`Category`]. Each [`Entry`] names a function or operator,
//! declares how many operands it takes, and names the catalog its operands are drawn from. The
//! catalogs are constructed once, on first use, and are read-only afterwards.

use once_cell::sync::Lazy;
use rand::Rng;

/// The category a function or operator belongs to.
///
/// The generator and the renderer both branch on this: only [`Category::Simple`] subtrees are
/// differentiable, and comparison operands are wrapped in an absolute-value call when rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// Arithmetic operators and transcendental functions. These produce complex values and are
    /// the only category the differentiator accepts.
    Simple,

    /// Comparison operators, producing boolean values from complex operands.
    Comparison,

    /// Logical connectives over comparison results.
    Logical,
}

impl Category {
    /// Returns the catalog of entries belonging to this category.
    pub fn entries(self) -> &'static [Entry] {
        match self {
            Self::Simple => &SIMPLE,
            Self::Comparison => &COMPARISON,
            Self::Logical => &LOGICAL,
        }
    }
}

/// The number of operands an [`Entry`] accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Always exactly this many operands.
    Fixed(usize),

    /// An inclusive range. A fresh count is drawn from the range every time a node for the entry
    /// is instantiated, not once per entry.
    Range(usize, usize),
}

/// A single function or operator the generator can draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    /// The name of the function, or the operator token.
    pub name: &'static str,

    /// How many operands the entry takes.
    pub arity: Arity,

    /// The category its operands are drawn from.
    pub operands: Category,
}

impl Entry {
    /// Resolves the arity of this entry for one node instantiation, drawing from `rng` if the
    /// declared arity is a range.
    pub fn resolve_arity<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self.arity {
            Arity::Fixed(n) => n,
            Arity::Range(lo, hi) => rng.gen_range(lo..=hi),
        }
    }
}

/// Returns `true` if `name` is an operator token, rendered infix, rather than a named function
/// rendered in call syntax.
pub fn is_operator(name: &str) -> bool {
    !name.starts_with(|c: char| c.is_ascii_lowercase())
}

const fn simple(name: &'static str, arity: Arity) -> Entry {
    Entry { name, arity, operands: Category::Simple }
}

/// Arithmetic operators and transcendental functions. Operands are drawn from this same catalog,
/// so simple subtrees stay simple.
static SIMPLE: Lazy<Vec<Entry>> = Lazy::new(|| {
    vec![
        simple("+", Arity::Range(2, 4)),
        simple("-", Arity::Range(2, 4)),
        simple("*", Arity::Range(2, 4)),
        simple("/", Arity::Range(2, 4)),
        simple("sin", Arity::Fixed(1)),
        simple("cos", Arity::Fixed(1)),
        simple("tan", Arity::Fixed(1)),
        simple("asin", Arity::Fixed(1)),
        simple("acos", Arity::Fixed(1)),
        simple("atan", Arity::Fixed(1)),
        simple("sinh", Arity::Fixed(1)),
        simple("cosh", Arity::Fixed(1)),
        simple("tanh", Arity::Fixed(1)),
        simple("asinh", Arity::Fixed(1)),
        simple("acosh", Arity::Fixed(1)),
        simple("atanh", Arity::Fixed(1)),
        simple("exp", Arity::Fixed(1)),
        simple("log", Arity::Fixed(1)),
        simple("sqrt", Arity::Fixed(1)),
        simple("pow", Arity::Fixed(2)),
    ]
});

/// Comparison operators. Their operands are ordinary simple subtrees; the renderer normalizes
/// them with an absolute-value wrap so the comparison is over magnitudes.
static COMPARISON: Lazy<Vec<Entry>> = Lazy::new(|| {
    ["<", ">", "<=", ">=", "==", "!="]
        .into_iter()
        .map(|name| Entry { name, arity: Arity::Fixed(2), operands: Category::Simple })
        .collect()
});

/// Logical connectives. Operands are comparisons, so boolean-valued subtrees bottom out in the
/// simple catalog after exactly one comparison layer.
static LOGICAL: Lazy<Vec<Entry>> = Lazy::new(|| {
    ["&&", "||"]
        .into_iter()
        .map(|name| Entry { name, arity: Arity::Range(2, 4), operands: Category::Comparison })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn catalogs_are_exhaustive() {
        assert_eq!(Category::Simple.entries().len(), 20);
        assert_eq!(Category::Comparison.entries().len(), 6);
        assert_eq!(Category::Logical.entries().len(), 2);
    }

    #[test]
    fn operands_stay_in_grammar() {
        for entry in Category::Simple.entries() {
            assert_eq!(entry.operands, Category::Simple);
        }
        for entry in Category::Comparison.entries() {
            assert_eq!(entry.operands, Category::Simple);
        }
        for entry in Category::Logical.entries() {
            assert_eq!(entry.operands, Category::Comparison);
        }
    }

    #[test]
    fn range_arity_resolves_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let plus = &Category::Simple.entries()[0];
        for _ in 0..100 {
            let arity = plus.resolve_arity(&mut rng);
            assert!((2..=4).contains(&arity));
        }
    }

    #[test]
    fn operator_classification() {
        assert!(is_operator("+"));
        assert!(is_operator("<="));
        assert!(is_operator("&&"));
        assert!(!is_operator("sin"));
        assert!(!is_operator("pow"));
    }
}
