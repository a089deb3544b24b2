//! Predicate Normalization
//!
//! Passes that rewrite a predicate sub-tree so that, rendered as plain SQL,
//! it keeps the null-aware semantics of the source query language.
//!
//! Each pass takes ownership of the tree and returns a rebuilt one. The
//! generator runs them in a fixed order through [`normalize_predicate`].

/// Collapse equality chains into IN lists
pub mod in_list;
/// Negation pushdown and cancellation
pub mod negation;
/// Composite (tuple) equality expansion
pub mod equality;
/// Rewrite comparisons against NULL into IS NULL checks
pub mod null_comparison;
/// Three-valued logic expansion (optimized and conservative)
pub mod null_semantics;
/// Marker removal and constant folding
pub mod reduce;
/// Pass ordering and orchestration
pub mod pipeline;

pub use equality::expand_equality;
pub use in_list::optimize_in_lists;
pub use negation::optimize_negation;
pub use null_comparison::transform_null_comparisons;
pub use null_semantics::{
    expand_conservative, expand_optimized, is_nullable, needs_expansion, split_nullable_entries,
    Expansion,
};
pub use pipeline::{normalize_predicate, NormalizationPass, PIPELINE};
pub use reduce::reduce;
