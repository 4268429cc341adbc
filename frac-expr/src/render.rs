//! Rendering of expression trees into target-language expression text.
//!
//! Rendering is a total, pure function of the tree, driven by [`std::fmt::Display`]
//! implementations. Classification happens at render time: operator calls render infix inside
//! one pair of parentheses, named functions render in call syntax, and comparison operands are
//! individually wrapped in `std::abs(..)` so that downstream numeric comparisons are over
//! magnitudes rather than raw complex values.

use crate::catalog::{is_operator, Category};
use crate::node::{Leaf, Node};
use std::fmt;

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point => write!(f, "Pt"),
            Self::Constant { re, im } => write!(f, "ValType({re:?}, {im:?})"),
            Self::Real(value) => write!(f, "{value:?}"),
        }
    }
}

/// Writes one infix operand, wrapping it in an absolute-value call for comparison operators.
fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Node, category: Category) -> fmt::Result {
    if category == Category::Comparison {
        write!(f, "std::abs({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => write!(f, "{leaf}"),
            Self::Call { name, category, args } if is_operator(name) => {
                write!(f, "(")?;
                let mut iter = args.iter();
                if let Some(operand) = iter.next() {
                    write_operand(f, operand, *category)?;
                    for operand in iter {
                        write!(f, " {name} ")?;
                        write_operand(f, operand, *category)?;
                    }
                }
                write!(f, ")")
            },
            Self::Call { name, args, .. } => {
                write!(f, "{name}(")?;
                let mut iter = args.iter();
                if let Some(arg) = iter.next() {
                    write!(f, "{arg}")?;
                    for arg in iter {
                        write!(f, ", {arg}")?;
                    }
                }
                write!(f, ")")
            },
            Self::Ternary { cond, then, otherwise } => {
                write!(f, "(({cond}) ? ({then}) : ({otherwise}))")
            },
        }
    }
}
