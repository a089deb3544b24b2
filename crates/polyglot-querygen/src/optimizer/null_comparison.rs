//! Null Comparison Transformation
//!
//! SQL's `x = NULL` is never true, while the source language treats
//! `x == null` as a null check. Comparisons against a NULL literal, or against
//! a parameter whose current value is NULL, become IS NULL tests:
//!
//! ```text
//! x = @p   (p is NULL)  ->  x IS NULL
//! x <> @p  (p is NULL)  ->  NOT (x IS NULL)
//! ```
//!
//! The rewrite depends on the values bound for this generation call, so the
//! result is only valid for that call.

use crate::error::Result;
use crate::expressions::{BinaryKind, Expression};
use crate::parameters::ParameterValues;
use crate::traversal::try_map_children;
use crate::value::Value;

/// Rewrite equality and inequality against NULL in `expr`.
pub fn transform_null_comparisons(
    expr: Expression,
    values: &ParameterValues,
) -> Result<Expression> {
    let expr = try_map_children(expr, |child| transform_null_comparisons(child, values))?;
    match expr.into_binary() {
        Ok((kind, op)) if matches!(kind, BinaryKind::Eq | BinaryKind::Neq) => {
            let rewritten = match (is_null_value(&op.left, values), is_null_value(&op.right, values)) {
                // null == null holds in the source language
                (true, true) => Expression::boolean(kind == BinaryKind::Eq),
                (true, false) => null_check(kind, op.right),
                (false, true) => null_check(kind, op.left),
                (false, false) => Expression::binary(kind, op.left, op.right),
            };
            Ok(rewritten)
        }
        Ok((kind, op)) => Ok(Expression::binary(kind, op.left, op.right)),
        Err(other) => Ok(other),
    }
}

fn null_check(kind: BinaryKind, operand: Expression) -> Expression {
    let check = Expression::is_null(operand);
    if kind == BinaryKind::Eq {
        check
    } else {
        Expression::not(check)
    }
}

/// NULL literal, or a parameter currently bound to NULL.
///
/// An unbound parameter is not treated as NULL here; the generator reports it
/// when the parameter is rendered.
pub(crate) fn is_null_value(expr: &Expression, values: &ParameterValues) -> bool {
    match expr {
        Expression::Literal(Value::Null) => true,
        Expression::Parameter(p) => values.get(&p.name).is_some_and(Value::is_null),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str) -> Expression {
        Expression::column("t", name)
    }

    #[test]
    fn test_null_parameter_equality_becomes_is_null() {
        let values = ParameterValues::new().with("p", Value::Null);
        let expr = Expression::eq(col("StringA"), Expression::parameter("p"));
        assert_eq!(
            transform_null_comparisons(expr, &values).unwrap(),
            Expression::is_null(col("StringA"))
        );
    }

    #[test]
    fn test_null_parameter_inequality_becomes_not_is_null() {
        let values = ParameterValues::new().with("p", Value::Null);
        let expr = Expression::neq(Expression::parameter("p"), col("StringA"));
        assert_eq!(
            transform_null_comparisons(expr, &values).unwrap(),
            Expression::not(Expression::is_null(col("StringA")))
        );
    }

    #[test]
    fn test_non_null_parameter_is_kept() {
        let values = ParameterValues::new().with("p", "abc");
        let expr = Expression::eq(col("StringA"), Expression::parameter("p"));
        assert_eq!(transform_null_comparisons(expr.clone(), &values).unwrap(), expr);
    }

    #[test]
    fn test_null_literal_comparison() {
        let expr = Expression::or(
            Expression::eq(col("a"), Expression::null()),
            Expression::neq(col("b"), Expression::null()),
        );
        let expected = Expression::or(
            Expression::is_null(col("a")),
            Expression::not(Expression::is_null(col("b"))),
        );
        assert_eq!(
            transform_null_comparisons(expr, &ParameterValues::new()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_both_sides_null_fold_to_constant() {
        let values = ParameterValues::new().with("a", Value::Null).with("b", Value::Null);
        let eq = Expression::eq(Expression::parameter("a"), Expression::parameter("b"));
        assert_eq!(
            transform_null_comparisons(eq, &values).unwrap(),
            Expression::boolean(true)
        );
        let neq = Expression::neq(Expression::parameter("a"), Expression::null());
        assert_eq!(
            transform_null_comparisons(neq, &values).unwrap(),
            Expression::boolean(false)
        );
    }

    #[test]
    fn test_ordering_comparisons_untouched() {
        let values = ParameterValues::new().with("p", Value::Null);
        let expr = Expression::binary(BinaryKind::Lt, col("a"), Expression::parameter("p"));
        assert_eq!(transform_null_comparisons(expr.clone(), &values).unwrap(), expr);
    }
}
