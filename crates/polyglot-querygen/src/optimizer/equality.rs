//! Composite Equality Expansion
//!
//! Equality between two tuples (for example a multi-column key) is expanded
//! into per-part comparisons:
//!
//! ```text
//! (a, b) = (c, d)   ->  a = c AND b = d
//! (a, b) <> (c, d)  ->  a <> c OR b <> d
//! ```

use crate::error::{Error, Result};
use crate::expressions::{BinaryKind, Expression};
use crate::traversal::try_map_children;

/// Expand every tuple equality or inequality in `expr`.
///
/// Returns [`Error::InvalidInput`] when the two sides have different arity or
/// only one side is a tuple.
pub fn expand_equality(expr: Expression) -> Result<Expression> {
    let expr = try_map_children(expr, expand_equality)?;
    match expr.into_binary() {
        Ok((kind, op)) if matches!(kind, BinaryKind::Eq | BinaryKind::Neq) => {
            match (op.left, op.right) {
                (Expression::Tuple(left), Expression::Tuple(right)) => {
                    if left.expressions.len() != right.expressions.len() {
                        return Err(Error::invalid_input(format!(
                            "cannot compare a tuple of {} parts with a tuple of {} parts",
                            left.expressions.len(),
                            right.expressions.len()
                        )));
                    }
                    let parts = left
                        .expressions
                        .into_iter()
                        .zip(right.expressions)
                        .map(|(l, r)| Expression::binary(kind, l, r));
                    let combined = if kind == BinaryKind::Eq {
                        Expression::and_all(parts)
                    } else {
                        Expression::or_all(parts)
                    };
                    combined.ok_or_else(|| Error::invalid_input("cannot compare empty tuples"))
                }
                (Expression::Tuple(_), other) | (other, Expression::Tuple(_)) => Err(
                    Error::invalid_input(format!(
                        "cannot compare a tuple with a {}",
                        other.kind_name()
                    )),
                ),
                (left, right) => Ok(Expression::binary(kind, left, right)),
            }
        }
        Ok((kind, op)) => Ok(Expression::binary(kind, op.left, op.right)),
        Err(other) => Ok(other),
    }
}
