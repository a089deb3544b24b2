//! Negation Pushdown
//!
//! Moves NOT inward until it only wraps nodes it cannot be pushed through:
//!
//! - `NOT (a AND b)` becomes `NOT a OR NOT b`, and dually for OR
//! - `NOT NOT a` becomes `a`
//! - `NOT (a = b)` becomes `a <> b` (likewise for the other comparisons)
//! - `NOT (x IN (...))` and `NOT (x IS NULL)` flip the node's `not` flag
//! - `NOT TRUE` / `NOT FALSE` fold to the opposite constant
//!
//! Every rewrite holds under both null-aware source semantics and SQL's
//! three-valued logic, so the pass may run before and after null expansion.
//! It is idempotent.

use crate::error::Result;
use crate::expressions::{BinaryKind, Expression, In, IsNull};
use crate::traversal::try_map_children;
use crate::value::Value;

/// Push every NOT in `expr` as far toward the leaves as it goes.
pub fn optimize_negation(expr: Expression) -> Result<Expression> {
    match expr {
        Expression::Not(op) => negate(op.this),
        other => try_map_children(other, optimize_negation),
    }
}

/// Optimized form of `NOT expr`.
fn negate(expr: Expression) -> Result<Expression> {
    match expr {
        Expression::Not(op) => optimize_negation(op.this),
        Expression::Literal(Value::Boolean(b)) => Ok(Expression::boolean(!b)),
        Expression::In(in_expr) => {
            let In {
                this,
                expressions,
                not,
            } = *in_expr;
            let negated = Expression::In(Box::new(In {
                this,
                expressions,
                not: !not,
            }));
            try_map_children(negated, optimize_negation)
        }
        Expression::IsNull(is_null) => {
            let IsNull { this, not } = *is_null;
            Ok(Expression::IsNull(Box::new(IsNull {
                this: optimize_negation(this)?,
                not: !not,
            })))
        }
        other => match other.into_binary() {
            Ok((kind, op)) if kind.is_logical() => {
                // De Morgan
                let left = negate(op.left)?;
                let right = negate(op.right)?;
                Ok(if kind == BinaryKind::And {
                    Expression::or(left, right)
                } else {
                    Expression::and(left, right)
                })
            }
            Ok((kind, op)) => match kind.negated_comparison() {
                Some(negated) => Ok(Expression::binary(
                    negated,
                    optimize_negation(op.left)?,
                    optimize_negation(op.right)?,
                )),
                None => Ok(Expression::not(optimize_negation(Expression::binary(
                    kind, op.left, op.right,
                ))?)),
            },
            Err(other) => Ok(Expression::not(optimize_negation(other)?)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str) -> Expression {
        Expression::column("t", name)
    }

    #[test]
    fn test_de_morgan() {
        // NOT (a = 1 AND b < 2) -> a <> 1 OR b >= 2
        let expr = Expression::not(Expression::and(
            Expression::eq(col("a"), Expression::literal(1)),
            Expression::binary(BinaryKind::Lt, col("b"), Expression::literal(2)),
        ));
        let expected = Expression::or(
            Expression::neq(col("a"), Expression::literal(1)),
            Expression::binary(BinaryKind::Gte, col("b"), Expression::literal(2)),
        );
        assert_eq!(optimize_negation(expr).unwrap(), expected);
    }

    #[test]
    fn test_double_negation_cancels() {
        let expr = Expression::not(Expression::not(col("flag")));
        assert_eq!(optimize_negation(expr).unwrap(), col("flag"));
    }

    #[test]
    fn test_negated_is_null_and_in_flip_flag() {
        let expr = Expression::not(Expression::is_null(col("a")));
        assert_eq!(
            optimize_negation(expr).unwrap(),
            Expression::is_not_null(col("a"))
        );

        let expr = Expression::not(Expression::in_list(col("a"), vec![Expression::literal(1)]));
        assert_eq!(
            optimize_negation(expr).unwrap(),
            Expression::not_in_list(col("a"), vec![Expression::literal(1)])
        );
    }

    #[test]
    fn test_not_over_leaf_is_kept() {
        let like = Expression::Like(Box::new(crate::expressions::LikeOp {
            left: col("name"),
            right: Expression::literal("a%"),
        }));
        let expr = Expression::not(like.clone());
        assert_eq!(optimize_negation(expr).unwrap(), Expression::not(like));
    }

    #[test]
    fn test_nested_not_below_value_nodes() {
        // The NOT inside the OR operand is still pushed down
        let expr = Expression::or(
            col("a"),
            Expression::not(Expression::or(col("b"), col("c"))),
        );
        let expected = Expression::or(
            col("a"),
            Expression::and(Expression::not(col("b")), Expression::not(col("c"))),
        );
        assert_eq!(optimize_negation(expr).unwrap(), expected);
    }

    #[test]
    fn test_idempotent() {
        let expr = Expression::not(Expression::or(
            Expression::not(Expression::eq(col("a"), Expression::literal(1))),
            Expression::and(
                Expression::not(col("flag")),
                Expression::not(Expression::is_not_null(col("b"))),
            ),
        ));
        let once = optimize_negation(expr).unwrap();
        let twice = optimize_negation(once.clone()).unwrap();
        assert_eq!(once, twice);
    }
}
