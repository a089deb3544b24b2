//! Structural Reduction
//!
//! Last step before rendering: drops the not-nullable markers the earlier
//! passes read, and folds boolean constants:
//!
//! - `p AND TRUE` -> `p`, `p AND FALSE` -> `FALSE`
//! - `p OR TRUE` -> `TRUE`, `p OR FALSE` -> `p`
//! - `NOT TRUE` -> `FALSE`, `NOT FALSE` -> `TRUE`
//!
//! These hold under three-valued logic as well. A single bottom-up pass is
//! enough because each node is folded after its children.

use crate::error::Result;
use crate::expressions::{BinaryKind, Expression};
use crate::traversal::try_map_children;

/// Strip markers and fold constants in `expr`.
pub fn reduce(expr: Expression) -> Result<Expression> {
    let expr = try_map_children(expr, reduce)?;
    let reduced = match expr {
        Expression::NotNullable(op) => op.this,
        Expression::Not(op) => match op.this.as_constant_bool() {
            Some(b) => Expression::boolean(!b),
            None => Expression::Not(op),
        },
        other => match other.into_binary() {
            Ok((BinaryKind::And, op)) => {
                match (op.left.as_constant_bool(), op.right.as_constant_bool()) {
                    (Some(false), _) | (_, Some(false)) => Expression::boolean(false),
                    (Some(true), _) => op.right,
                    (_, Some(true)) => op.left,
                    _ => Expression::and(op.left, op.right),
                }
            }
            Ok((BinaryKind::Or, op)) => {
                match (op.left.as_constant_bool(), op.right.as_constant_bool()) {
                    (Some(true), _) | (_, Some(true)) => Expression::boolean(true),
                    (Some(false), _) => op.right,
                    (_, Some(false)) => op.left,
                    _ => Expression::or(op.left, op.right),
                }
            }
            Ok((kind, op)) => Expression::binary(kind, op.left, op.right),
            Err(other) => other,
        },
    };
    Ok(reduced)
}
