//! Random expression trees over a complex-valued point, their symbolic derivatives, and the
//! rendering of both into renderer-source text.
//!
//! The pipeline this crate serves is: draw a random tree from the function catalogs
//! ([`generate`]), optionally differentiate it ([`derivative`]), and render each tree to text
//! ([`Expr::text`]) for an external numerical renderer. The trees are immutable once built and
//! every computation here is pure; persistence of the rendered text lives in `frac-session`.
//!
//! # Determinism
//!
//! All randomness comes from an injected [`rand::Rng`], passed by exclusive reference into each
//! generation attempt. For a fixed seed and fixed [`GenOptions`], the generated tree and its
//! rendered text are exactly reproducible, including across the built-in retry behavior for
//! trees that outgrow the configured ceilings.
//!
//! ```
//! use frac_expr::{Expr, GenOptions};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let opts = GenOptions::default();
//! let expr = Expr::new(frac_expr::generate_retrying(
//!     &mut StdRng::seed_from_u64(42),
//!     &opts,
//! ));
//! let diff = expr.differentiate().unwrap();
//! assert!(!expr.text().is_empty());
//! assert!(!diff.text().is_empty());
//! ```

pub mod catalog;
pub mod derivative;
pub mod generate;
pub mod node;
mod render;

pub use catalog::{Arity, Category, Entry};
pub use derivative::{derivative, DerivativeError};
pub use generate::{generate, generate_retrying, GenOptions, GenerationTooLarge};
pub use node::{Expr, Leaf, Node};
