//! Symbolic differentiation of expression trees.
//!
//! [`derivative`] is a pure structural transform: it consumes a borrowed tree and builds a
//! brand-new one, never mutating its input. It is total over simple-category calls and leaves,
//! and fails on comparison, logical and ternary nodes, which have no derivative. Every produced
//! subtree is itself a well-formed, differentiable tree, so derivatives compose (a second
//! derivative needs no special casing).
//!
//! No algebraic simplification is applied; the derivative of `sin(Pt)` really is
//! `(cos(Pt) * 1.0)`. The renderer hands the text to an optimizing compiler anyway.

use crate::catalog::Category;
use crate::node::{Leaf, Node};
use std::{error::Error, fmt};

/// The expression contained a node kind that has no derivative.
///
/// Hitting this error is a contract violation in the caller: differentiation must only be
/// invoked on trees built from the simple catalog, and only when the active root-finding method
/// needs a derivative at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivativeError {
    /// A comparison or logical operator was encountered.
    BooleanOperator(&'static str),

    /// A ternary conditional was encountered.
    TernaryConditional,

    /// A call that is not part of the simple catalog was encountered.
    UnknownFunction(&'static str),
}

impl fmt::Display for DerivativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BooleanOperator(name) => {
                write!(f, "the boolean operator `{name}` has no derivative")
            },
            Self::TernaryConditional => {
                write!(f, "ternary conditionals have no derivative")
            },
            Self::UnknownFunction(name) => {
                write!(f, "no derivative rule for unknown function `{name}`")
            },
        }
    }
}

impl Error for DerivativeError {}

fn call(name: &'static str, args: Vec<Node>) -> Node {
    Node::Call { name, category: Category::Simple, args }
}

fn real(value: f64) -> Node {
    Node::Leaf(Leaf::Real(value))
}

/// `numerator / node`, for reciprocal-shaped factors like `1.0 / cos(u)²`.
fn inverse(numerator: f64, node: Node) -> Node {
    call("/", vec![real(numerator), node])
}

/// `node * node`, the squaring idiom used throughout the chain rules.
fn square(node: &Node) -> Node {
    call("*", vec![node.clone(), node.clone()])
}

fn product(lhs: Node, rhs: Node) -> Node {
    call("*", vec![lhs, rhs])
}

fn sqrt(node: Node) -> Node {
    call("sqrt", vec![node])
}

/// `node - 1.0`, or `1.0 - node` when `flipped`.
fn minus_one(node: Node, flipped: bool) -> Node {
    let mut args = vec![node, real(1.0)];
    if flipped {
        args.reverse();
    }
    call("-", args)
}

fn plus_one(node: Node) -> Node {
    call("+", vec![node, real(1.0)])
}

/// The chain rule: `outer * u'`, where `outer` is the derivative of the enclosing function
/// already applied to `u`.
fn chain(outer: Node, u: &Node) -> Result<Node, DerivativeError> {
    Ok(product(outer, derivative(u)?))
}

/// The generalized product rule: a sum over the operands of the product of that operand's
/// derivative with every other operand unchanged.
fn product_rule(args: &[Node]) -> Result<Node, DerivativeError> {
    let mut terms = Vec::with_capacity(args.len());
    for (index, arg) in args.iter().enumerate() {
        let mut factors = Vec::with_capacity(args.len());
        factors.push(derivative(arg)?);
        factors.extend(
            args.iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, other)| other.clone()),
        );
        terms.push(call("*", factors));
    }
    Ok(call("+", terms))
}

/// The quotient rule. The two-operand case is `(u'v - uv') / v²`; longer divisions are rewritten
/// as a product of the reciprocals of the trailing operands and differentiated through the
/// product rule.
fn quotient_rule(args: &[Node]) -> Result<Node, DerivativeError> {
    if args.len() != 2 {
        let mut factors: Vec<Node> = args[1..]
            .iter()
            .map(|divisor| inverse(1.0, divisor.clone()))
            .collect();
        factors.push(args[0].clone());
        return derivative(&call("*", factors));
    }

    let (u, v) = (&args[0], &args[1]);
    let numerator = call("-", vec![
        product(derivative(u)?, v.clone()),
        product(u.clone(), derivative(v)?),
    ]);
    Ok(call("/", vec![numerator, square(v)]))
}

/// Computes the derivative of the given tree with respect to the point variable, building a new
/// tree. The point differentiates to `1.0`; any materialized constant differentiates to `0.0`.
pub fn derivative(node: &Node) -> Result<Node, DerivativeError> {
    match node {
        Node::Leaf(Leaf::Point) => Ok(real(1.0)),
        Node::Leaf(_) => Ok(real(0.0)),
        Node::Ternary { .. } => Err(DerivativeError::TernaryConditional),
        Node::Call { name, category, args } => {
            if !matches!(category, Category::Simple) {
                return Err(DerivativeError::BooleanOperator(*name));
            }
            simple_derivative(*name, args)
        },
    }
}

/// Dispatches the derivative rule for one simple-catalog call.
fn simple_derivative(name: &'static str, args: &[Node]) -> Result<Node, DerivativeError> {
    let rule = match name {
        "+" | "-" => {
            let terms = args.iter().map(derivative).collect::<Result<_, _>>()?;
            call(name, terms)
        },
        "*" => product_rule(args)?,
        "/" => quotient_rule(args)?,
        "sin" => {
            let u = &args[0];
            chain(call("cos", vec![u.clone()]), u)?
        },
        "cos" => {
            let u = &args[0];
            chain(product(call("sin", vec![u.clone()]), real(-1.0)), u)?
        },
        "tan" => {
            let u = &args[0];
            chain(inverse(1.0, square(&call("cos", vec![u.clone()]))), u)?
        },
        "asin" | "acos" => {
            let u = &args[0];
            let numerator = if name == "acos" { -1.0 } else { 1.0 };
            chain(inverse(numerator, sqrt(minus_one(square(u), true))), u)?
        },
        "atan" => {
            let u = &args[0];
            chain(inverse(1.0, plus_one(square(u))), u)?
        },
        "sinh" => {
            let u = &args[0];
            chain(call("cosh", vec![u.clone()]), u)?
        },
        "cosh" => {
            let u = &args[0];
            chain(call("sinh", vec![u.clone()]), u)?
        },
        "tanh" => {
            let u = &args[0];
            chain(inverse(1.0, square(&call("cosh", vec![u.clone()]))), u)?
        },
        "asinh" => {
            let u = &args[0];
            chain(inverse(1.0, sqrt(plus_one(square(u)))), u)?
        },
        "acosh" => {
            let u = &args[0];
            chain(inverse(1.0, sqrt(minus_one(square(u), false))), u)?
        },
        "atanh" => {
            let u = &args[0];
            chain(inverse(1.0, minus_one(square(u), true)), u)?
        },
        "exp" => {
            let u = &args[0];
            chain(call("exp", vec![u.clone()]), u)?
        },
        "log" => {
            let u = &args[0];
            chain(inverse(1.0, u.clone()), u)?
        },
        "sqrt" => {
            let u = &args[0];
            chain(call("/", vec![real(0.5), sqrt(u.clone())]), u)?
        },
        "pow" => {
            // Differentiated through the rewrite `pow(b, e) = exp(log(b) * e)`.
            let rewritten = call("exp", vec![product(
                call("log", vec![args[0].clone()]),
                args[1].clone(),
            )]);
            derivative(&rewritten)?
        },
        _ => return Err(DerivativeError::UnknownFunction(name)),
    };
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_float_absolute_eq;
    use pretty_assertions::assert_eq;

    fn pt() -> Node {
        Node::Leaf(Leaf::Point)
    }

    fn unary(name: &'static str, arg: Node) -> Node {
        call(name, vec![arg])
    }

    /// Evaluates a differentiable tree at a real point. Only meaningful for the trees built in
    /// these tests, which keep their values real.
    fn eval(node: &Node, x: f64) -> f64 {
        match node {
            Node::Leaf(Leaf::Point) => x,
            Node::Leaf(Leaf::Real(value)) => *value,
            Node::Leaf(Leaf::Constant { re, .. }) => *re,
            Node::Call { name, args, .. } => {
                let vals: Vec<f64> = args.iter().map(|arg| eval(arg, x)).collect();
                match *name {
                    "+" => vals.iter().sum(),
                    "-" => vals[1..].iter().fold(vals[0], |acc, v| acc - v),
                    "*" => vals.iter().product(),
                    "/" => vals[1..].iter().fold(vals[0], |acc, v| acc / v),
                    "sin" => vals[0].sin(),
                    "cos" => vals[0].cos(),
                    "tan" => vals[0].tan(),
                    "asin" => vals[0].asin(),
                    "acos" => vals[0].acos(),
                    "atan" => vals[0].atan(),
                    "sinh" => vals[0].sinh(),
                    "cosh" => vals[0].cosh(),
                    "tanh" => vals[0].tanh(),
                    "asinh" => vals[0].asinh(),
                    "acosh" => vals[0].acosh(),
                    "atanh" => vals[0].atanh(),
                    "exp" => vals[0].exp(),
                    "log" => vals[0].ln(),
                    "sqrt" => vals[0].sqrt(),
                    "pow" => vals[0].powf(vals[1]),
                    other => panic!("cannot evaluate `{other}`"),
                }
            },
            Node::Ternary { .. } => panic!("cannot evaluate a ternary"),
        }
    }

    /// Approximates the derivative of `node` at `x` by central finite difference.
    fn finite_difference(node: &Node, x: f64) -> f64 {
        const DX: f64 = 1e-6;
        (eval(node, x + DX) - eval(node, x - DX)) / (2.0 * DX)
    }

    /// Checks the symbolic derivative of `node` against a finite difference at several points.
    fn check_at(node: &Node, points: &[f64]) {
        let diff = derivative(node).unwrap();
        for &x in points {
            let symbolic = eval(&diff, x);
            let numeric = finite_difference(node, x);
            assert_float_absolute_eq!(symbolic, numeric, 1e-4);
        }
    }

    #[test]
    fn leaves() {
        assert_eq!(derivative(&pt()).unwrap(), real(1.0));
        assert_eq!(
            derivative(&Node::Leaf(Leaf::Constant { re: 0.25, im: 0.75 })).unwrap(),
            real(0.0),
        );
        assert_eq!(derivative(&real(3.0)).unwrap(), real(0.0));
    }

    #[test]
    fn sin_shape() {
        let diff = derivative(&unary("sin", pt())).unwrap();
        assert_eq!(diff.to_string(), "(cos(Pt) * 1.0)");
    }

    #[test]
    fn cos_shape() {
        let diff = derivative(&unary("cos", pt())).unwrap();
        assert_eq!(diff.to_string(), "((sin(Pt) * -1.0) * 1.0)");
    }

    #[test]
    fn square_by_product_rule() {
        let diff = derivative(&call("*", vec![pt(), pt()])).unwrap();
        assert_eq!(diff.to_string(), "((1.0 * Pt) + (1.0 * Pt))");
    }

    #[test]
    fn reciprocal_by_quotient_rule() {
        let diff = derivative(&call("/", vec![real(1.0), pt()])).unwrap();
        assert_eq!(
            diff.to_string(),
            "(((0.0 * Pt) - (1.0 * 1.0)) / (Pt * Pt))",
        );
    }

    #[test]
    fn long_division_rewrites_to_reciprocals() {
        // (a / b / c)' is differentiated as (1/b * 1/c * a)'.
        let node = call("/", vec![pt(), unary("cos", pt()), unary("exp", pt())]);
        check_at(&node, &[0.3, 0.9, 1.2]);
    }

    #[test]
    fn chain_rules_match_finite_differences() {
        let inner = || call("*", vec![pt(), real(0.5)]);
        for name in ["sin", "cos", "tan", "sinh", "cosh", "tanh", "asinh", "exp"] {
            check_at(&unary(name, inner()), &[-1.2, -0.4, 0.3, 0.8, 1.5]);
        }
        // Restricted domains.
        for name in ["asin", "acos", "atanh"] {
            check_at(&unary(name, inner()), &[-1.2, -0.6, 0.2, 0.9]);
        }
        check_at(&unary("acosh", inner()), &[2.5, 3.0, 4.2]);
        for name in ["log", "sqrt"] {
            check_at(&unary(name, inner()), &[0.4, 1.1, 2.7]);
        }
        check_at(&unary("atan", inner()), &[-2.0, -0.5, 0.5, 2.0]);
    }

    #[test]
    fn pow_differentiates_through_exp_log() {
        let node = call("pow", vec![pt(), real(3.0)]);
        check_at(&node, &[0.5, 1.0, 2.0]);

        let diff = derivative(&node).unwrap();
        assert!(diff.to_string().starts_with("(exp((log(Pt) * 3.0))"));
    }

    #[test]
    fn nary_sum_and_product() {
        let node = call("+", vec![
            call("*", vec![pt(), pt(), pt()]),
            unary("sin", pt()),
            real(2.0),
        ]);
        check_at(&node, &[-1.0, 0.25, 1.75]);
    }

    #[test]
    fn derivative_is_closed_under_differentiation() {
        let node = unary("tan", call("pow", vec![pt(), real(2.0)]));
        let first = derivative(&node).unwrap();
        let second = derivative(&first).unwrap();
        assert!(second.count() > first.count());
    }

    #[test]
    fn boolean_nodes_are_rejected() {
        let cmp = Node::Call {
            name: "<",
            category: Category::Comparison,
            args: vec![pt(), pt()],
        };
        assert_eq!(derivative(&cmp), Err(DerivativeError::BooleanOperator("<")));

        let logical = Node::Call {
            name: "&&",
            category: Category::Logical,
            args: vec![cmp.clone(), cmp],
        };
        assert_eq!(derivative(&logical), Err(DerivativeError::BooleanOperator("&&")));
    }

    #[test]
    fn ternary_is_rejected() {
        let ternary = Node::Ternary {
            cond: Box::new(Node::Call {
                name: "&&",
                category: Category::Logical,
                args: vec![],
            }),
            then: Box::new(pt()),
            otherwise: Box::new(pt()),
        };
        assert_eq!(derivative(&ternary), Err(DerivativeError::TernaryConditional));
    }
}
