//! Normalization Orchestration
//!
//! Runs the predicate passes in their fixed order. The generator calls
//! [`normalize_predicate`] for every WHERE, JOIN ON and CASE WHEN condition
//! before rendering it.

use crate::error::Result;
use crate::expressions::Expression;
use crate::parameters::ParameterValues;
use tracing::{debug, trace};

use super::equality::expand_equality;
use super::in_list::optimize_in_lists;
use super::negation::optimize_negation;
use super::null_comparison::transform_null_comparisons;
use super::null_semantics::{
    expand_conservative, expand_optimized, needs_expansion, split_nullable_entries, Expansion,
};
use super::reduce::reduce;

/// One step of the normalization pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationPass {
    /// Merge equality chains into IN lists
    InList,
    /// Push NOT toward the leaves
    Negation,
    /// Expand tuple equality into per-part comparisons
    Equality,
    /// Turn comparisons against NULL into IS NULL checks
    NullComparison,
    /// Make null-aware equality explicit
    NullSemantics,
    /// Drop markers and fold constants
    Reduce,
}

impl NormalizationPass {
    pub fn name(self) -> &'static str {
        match self {
            NormalizationPass::InList => "in_list",
            NormalizationPass::Negation => "negation",
            NormalizationPass::Equality => "equality",
            NormalizationPass::NullComparison => "null_comparison",
            NormalizationPass::NullSemantics => "null_semantics",
            NormalizationPass::Reduce => "reduce",
        }
    }
}

/// Pass order. Negation runs again after each pass that can introduce NOT.
pub const PIPELINE: &[NormalizationPass] = &[
    NormalizationPass::InList,
    NormalizationPass::Negation,
    NormalizationPass::Equality,
    NormalizationPass::Negation,
    NormalizationPass::NullComparison,
    NormalizationPass::NullSemantics,
    NormalizationPass::Negation,
    NormalizationPass::Reduce,
];

/// Normalize a predicate for rendering with the given parameter values.
///
/// A constant `TRUE`/`FALSE` predicate is returned as is.
pub fn normalize_predicate(expr: Expression, values: &ParameterValues) -> Result<Expression> {
    let expr = unwrap_predicate(expr);
    if expr.as_constant_bool().is_some() {
        return Ok(expr);
    }
    PIPELINE.iter().try_fold(expr, |expr, &pass| {
        trace!(pass = pass.name(), "running predicate pass");
        run_pass(pass, expr, values)
    })
}

/// Drop wrappers that mean nothing where a truth value is expected: any
/// alias, and a not-nullable marker over a search condition. Only the
/// AND/OR/NOT skeleton is walked.
fn unwrap_predicate(expr: Expression) -> Expression {
    match expr {
        Expression::Alias(alias) => unwrap_predicate(alias.this),
        Expression::NotNullable(op) if op.this.is_search_condition() => unwrap_predicate(op.this),
        Expression::And(op) => Expression::and(unwrap_predicate(op.left), unwrap_predicate(op.right)),
        Expression::Or(op) => Expression::or(unwrap_predicate(op.left), unwrap_predicate(op.right)),
        Expression::Not(op) => Expression::not(unwrap_predicate(op.this)),
        other => other,
    }
}

fn run_pass(
    pass: NormalizationPass,
    expr: Expression,
    values: &ParameterValues,
) -> Result<Expression> {
    match pass {
        NormalizationPass::InList => optimize_in_lists(expr),
        NormalizationPass::Negation => optimize_negation(expr),
        NormalizationPass::Equality => expand_equality(expr),
        NormalizationPass::NullComparison => transform_null_comparisons(expr, values),
        NormalizationPass::NullSemantics => Ok(expand_null_semantics(expr, values)),
        NormalizationPass::Reduce => reduce(expr),
    }
}

fn expand_null_semantics(expr: Expression, values: &ParameterValues) -> Expression {
    let expr = split_nullable_entries(expr, values);
    if !needs_expansion(&expr, values) {
        trace!("no nullable comparisons, skipping expansion");
        return expr;
    }
    match expand_optimized(&expr, values) {
        Expansion::Optimized(expanded) => expanded,
        Expansion::FallBack => {
            debug!("optimized null expansion not applicable, using conservative expansion");
            expand_conservative(expr, values)
        }
    }
}
