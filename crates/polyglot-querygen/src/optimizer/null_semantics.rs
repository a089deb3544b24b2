//! Three-Valued Logic Expansion
//!
//! The source language compares with null-aware equality (`null == null` is
//! true, `null == 1` is false), while SQL's `=` and `<>` yield UNKNOWN as soon
//! as one operand is NULL. This pass rewrites the equality comparisons whose
//! operands may be NULL so the rendered SQL gives the source-language answer.
//!
//! Nullability is decided statically: columns carry a `nullable` flag and a
//! parameter is nullable exactly when its bound value is NULL. The result is
//! therefore tied to the parameter values of one generation call.
//!
//! Two strategies exist:
//!
//! - [`expand_optimized`] handles predicates where every comparison needing
//!   work is an equality or IN reachable through AND/OR only. There UNKNOWN and
//!   FALSE filter rows the same way, so only the both-NULL case of `a = b`
//!   must be added back.
//! - [`expand_conservative`] turns every affected comparison into an exactly
//!   two-valued form and is correct under any number of negations.

use crate::expressions::{Expression, In};
use crate::parameters::ParameterValues;
use crate::value::Value;

/// Outcome of [`expand_optimized`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion {
    /// The shorter rewrite is valid for the whole predicate
    Optimized(Expression),
    /// Some comparison sits in a position the short form cannot handle;
    /// use [`expand_conservative`] instead
    FallBack,
}

/// Whether `expr` may evaluate to NULL given the bound parameter values.
pub fn is_nullable(expr: &Expression, values: &ParameterValues) -> bool {
    match expr {
        Expression::Literal(value) => value.is_null(),
        Expression::Column(column) => column.nullable,
        Expression::Parameter(p) => values.get(&p.name).is_some_and(Value::is_null),
        Expression::NotNullable(_) | Expression::Count(_) | Expression::Exists(_) => false,
        Expression::Alias(alias) => is_nullable(&alias.this, values),
        Expression::Neg(op) => is_nullable(&op.this, values),
        Expression::Coalesce(op) => {
            is_nullable(&op.left, values) && is_nullable(&op.right, values)
        }
        Expression::Case(case) => {
            case.else_
                .as_ref()
                .map_or(true, |e| is_nullable(e, values))
                || case.whens.iter().any(|(_, result)| is_nullable(result, values))
        }
        // Aggregates over an empty input and scalar sub-queries without a row
        Expression::Sum(_) | Expression::Min(_) | Expression::Max(_) | Expression::Subquery(_) => {
            true
        }
        Expression::Tuple(tuple) => tuple.expressions.iter().any(|e| is_nullable(e, values)),
        other if other.is_search_condition() => false,
        other => match other.as_binary() {
            Some((_, op)) => is_nullable(&op.left, values) || is_nullable(&op.right, values),
            None => false,
        },
    }
}

/// Whether an IN list holds a NULL, directly or through a bound parameter.
pub fn in_list_has_null(in_expr: &In, values: &ParameterValues) -> bool {
    fn value_has_null(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::List(items) => items.iter().any(Value::is_null),
            _ => false,
        }
    }
    in_expr.expressions.iter().any(|e| match e {
        Expression::Literal(value) => value_has_null(value),
        Expression::Parameter(p) => values.get(&p.name).is_some_and(value_has_null),
        _ => false,
    })
}

/// Move IN entries that may be NULL at run time out of the list and into
/// null-aware comparisons, so the expansion below sees them.
///
/// ```text
/// x IN (1, b)      ->  x IN (1) OR x = b
/// x NOT IN (1, b)  ->  x NOT IN (1) AND x <> b
/// ```
///
/// Literal and parameter entries stay in the list; their NULLs are known
/// statically and the generator splits them off.
pub fn split_nullable_entries(expr: Expression, values: &ParameterValues) -> Expression {
    match expr {
        Expression::And(op) => Expression::and(
            split_nullable_entries(op.left, values),
            split_nullable_entries(op.right, values),
        ),
        Expression::Or(op) => Expression::or(
            split_nullable_entries(op.left, values),
            split_nullable_entries(op.right, values),
        ),
        Expression::Not(op) => Expression::not(split_nullable_entries(op.this, values)),
        Expression::In(in_expr) => {
            let In {
                this,
                expressions,
                not,
            } = *in_expr;
            let (kept, moved): (Vec<_>, Vec<_>) = expressions.into_iter().partition(|e| {
                matches!(e, Expression::Literal(_) | Expression::Parameter(_))
                    || !is_nullable(e, values)
            });
            if moved.is_empty() {
                return Expression::In(Box::new(In {
                    this,
                    expressions: kept,
                    not,
                }));
            }

            let residual = (!kept.is_empty()).then(|| {
                Expression::In(Box::new(In {
                    this: this.clone(),
                    expressions: kept,
                    not,
                }))
            });
            let comparisons = moved.into_iter().map(|entry| {
                if not {
                    Expression::neq(this.clone(), entry)
                } else {
                    Expression::eq(this.clone(), entry)
                }
            });
            let parts = residual.into_iter().chain(comparisons);
            let combined = if not {
                Expression::and_all(parts)
            } else {
                Expression::or_all(parts)
            };
            combined.unwrap_or_else(|| Expression::boolean(not))
        }
        other => other,
    }
}

/// Whether any comparison in the predicate structure of `expr` reads as
/// something different in SQL than in the source language.
///
/// Only the AND/OR/NOT skeleton is searched; value positions such as CASE
/// conditions are normalized separately when they are rendered.
pub fn needs_expansion(expr: &Expression, values: &ParameterValues) -> bool {
    match expr {
        Expression::And(op) | Expression::Or(op) => {
            needs_expansion(&op.left, values) || needs_expansion(&op.right, values)
        }
        Expression::Not(op) => needs_expansion(&op.this, values),
        Expression::Eq(op) | Expression::Neq(op) => {
            is_nullable(&op.left, values) || is_nullable(&op.right, values)
        }
        Expression::In(in_expr) => {
            is_nullable(&in_expr.this, values) && !in_list_has_null(in_expr, values)
        }
        _ => false,
    }
}

/// Try the short expansion, valid only in a positive filter context.
pub fn expand_optimized(expr: &Expression, values: &ParameterValues) -> Expansion {
    match optimized(expr, values) {
        Some(expanded) => Expansion::Optimized(expanded),
        None => Expansion::FallBack,
    }
}

fn optimized(expr: &Expression, values: &ParameterValues) -> Option<Expression> {
    match expr {
        Expression::And(op) => Some(Expression::and(
            optimized(&op.left, values)?,
            optimized(&op.right, values)?,
        )),
        Expression::Or(op) => Some(Expression::or(
            optimized(&op.left, values)?,
            optimized(&op.right, values)?,
        )),
        Expression::Not(op) if needs_expansion(&op.this, values) => None,
        Expression::Eq(op) => {
            if is_nullable(&op.left, values) && is_nullable(&op.right, values) {
                Some(Expression::or(
                    Expression::eq(op.left.clone(), op.right.clone()),
                    Expression::and(
                        Expression::is_null(op.left.clone()),
                        Expression::is_null(op.right.clone()),
                    ),
                ))
            } else {
                // One NULL side yields UNKNOWN, which filters like FALSE
                Some(expr.clone())
            }
        }
        Expression::Neq(_) if needs_expansion(expr, values) => None,
        Expression::In(in_expr) if in_expr.not && needs_expansion(expr, values) => None,
        other => Some(other.clone()),
    }
}

/// Rewrite every affected comparison into a form that is exactly two-valued.
///
/// ```text
/// a = b   ->  (a = b AND a IS NOT NULL AND b IS NOT NULL) OR (a IS NULL AND b IS NULL)
/// a <> b  ->  (a <> b OR a IS NULL OR b IS NULL) AND (a IS NOT NULL OR b IS NOT NULL)
/// x IN (..)      ->  x IN (..) AND x IS NOT NULL
/// x NOT IN (..)  ->  x NOT IN (..) OR x IS NULL
/// ```
///
/// Conditions on an operand that cannot be NULL are left out.
pub fn expand_conservative(expr: Expression, values: &ParameterValues) -> Expression {
    match expr {
        Expression::And(op) => Expression::and(
            expand_conservative(op.left, values),
            expand_conservative(op.right, values),
        ),
        Expression::Or(op) => Expression::or(
            expand_conservative(op.left, values),
            expand_conservative(op.right, values),
        ),
        Expression::Not(op) => Expression::not(expand_conservative(op.this, values)),
        Expression::Eq(op) => {
            let left_nullable = is_nullable(&op.left, values);
            let right_nullable = is_nullable(&op.right, values);
            let mut matched = Expression::eq(op.left.clone(), op.right.clone());
            if left_nullable {
                matched = Expression::and(matched, Expression::is_not_null(op.left.clone()));
            }
            if right_nullable {
                matched = Expression::and(matched, Expression::is_not_null(op.right.clone()));
            }
            if left_nullable && right_nullable {
                Expression::or(
                    matched,
                    Expression::and(Expression::is_null(op.left), Expression::is_null(op.right)),
                )
            } else {
                matched
            }
        }
        Expression::Neq(op) => {
            let left_nullable = is_nullable(&op.left, values);
            let right_nullable = is_nullable(&op.right, values);
            let mut differs = Expression::neq(op.left.clone(), op.right.clone());
            if left_nullable {
                differs = Expression::or(differs, Expression::is_null(op.left.clone()));
            }
            if right_nullable {
                differs = Expression::or(differs, Expression::is_null(op.right.clone()));
            }
            if left_nullable && right_nullable {
                Expression::and(
                    differs,
                    Expression::or(
                        Expression::is_not_null(op.left),
                        Expression::is_not_null(op.right),
                    ),
                )
            } else {
                differs
            }
        }
        Expression::In(in_expr)
            if is_nullable(&in_expr.this, values) && !in_list_has_null(&in_expr, values) =>
        {
            let operand = in_expr.this.clone();
            if in_expr.not {
                Expression::or(Expression::In(in_expr), Expression::is_null(operand))
            } else {
                Expression::and(Expression::In(in_expr), Expression::is_not_null(operand))
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nullable(name: &str) -> Expression {
        Expression::nullable_column("t", name)
    }

    fn required(name: &str) -> Expression {
        Expression::column("t", name)
    }

    #[test]
    fn test_nullability() {
        let values = ParameterValues::new().with("n", Value::Null).with("v", 1);
        assert!(is_nullable(&nullable("a"), &values));
        assert!(!is_nullable(&required("a"), &values));
        assert!(is_nullable(&Expression::parameter("n"), &values));
        assert!(!is_nullable(&Expression::parameter("v"), &values));
        assert!(!is_nullable(&Expression::not_nullable(nullable("a")), &values));
        let sum = Expression::binary(crate::expressions::BinaryKind::Add, required("a"), nullable("b"));
        assert!(is_nullable(&sum, &values));
        let coalesce = Expression::binary(
            crate::expressions::BinaryKind::Coalesce,
            nullable("a"),
            Expression::literal(0),
        );
        assert!(!is_nullable(&coalesce, &values));
    }

    #[test]
    fn test_required_columns_need_nothing() {
        let values = ParameterValues::new();
        let expr = Expression::eq(required("a"), required("b"));
        assert!(!needs_expansion(&expr, &values));
    }

    #[test]
    fn test_optimized_equality_of_nullable_columns() {
        let values = ParameterValues::new();
        let expr = Expression::eq(nullable("a"), nullable("b"));
        let expected = Expression::or(
            Expression::eq(nullable("a"), nullable("b")),
            Expression::and(
                Expression::is_null(nullable("a")),
                Expression::is_null(nullable("b")),
            ),
        );
        assert_eq!(expand_optimized(&expr, &values), Expansion::Optimized(expected));
    }

    #[test]
    fn test_optimized_keeps_single_nullable_side() {
        let values = ParameterValues::new();
        let expr = Expression::and(
            Expression::eq(nullable("a"), Expression::literal(1)),
            Expression::in_list(nullable("b"), vec![Expression::literal(2)]),
        );
        assert_eq!(
            expand_optimized(&expr, &values),
            Expansion::Optimized(expr.clone())
        );
    }

    #[test]
    fn test_inequality_falls_back() {
        let values = ParameterValues::new();
        let expr = Expression::or(
            Expression::eq(nullable("a"), nullable("b")),
            Expression::neq(nullable("c"), Expression::literal(1)),
        );
        assert_eq!(expand_optimized(&expr, &values), Expansion::FallBack);
    }

    #[test]
    fn test_negated_equality_falls_back() {
        let values = ParameterValues::new();
        let expr = Expression::not(Expression::eq(nullable("a"), nullable("b")));
        assert_eq!(expand_optimized(&expr, &values), Expansion::FallBack);
    }

    #[test]
    fn test_conservative_equality() {
        let values = ParameterValues::new();
        let expr = Expression::eq(nullable("a"), nullable("b"));
        let expected = Expression::or(
            Expression::and(
                Expression::and(
                    Expression::eq(nullable("a"), nullable("b")),
                    Expression::is_not_null(nullable("a")),
                ),
                Expression::is_not_null(nullable("b")),
            ),
            Expression::and(
                Expression::is_null(nullable("a")),
                Expression::is_null(nullable("b")),
            ),
        );
        assert_eq!(expand_conservative(expr, &values), expected);
    }

    #[test]
    fn test_conservative_inequality_one_nullable_side() {
        let values = ParameterValues::new();
        let expr = Expression::neq(nullable("a"), Expression::literal(1));
        let expected = Expression::or(
            Expression::neq(nullable("a"), Expression::literal(1)),
            Expression::is_null(nullable("a")),
        );
        assert_eq!(expand_conservative(expr, &values), expected);
    }

    #[test]
    fn test_conservative_in_lists() {
        let values = ParameterValues::new();
        let list = vec![Expression::literal(1), Expression::literal(2)];
        assert_eq!(
            expand_conservative(Expression::in_list(nullable("a"), list.clone()), &values),
            Expression::and(
                Expression::in_list(nullable("a"), list.clone()),
                Expression::is_not_null(nullable("a"))
            )
        );
        assert_eq!(
            expand_conservative(Expression::not_in_list(nullable("a"), list.clone()), &values),
            Expression::or(
                Expression::not_in_list(nullable("a"), list),
                Expression::is_null(nullable("a"))
            )
        );
    }

    #[test]
    fn test_nullable_in_entries_become_comparisons() {
        let values = ParameterValues::new();
        let expr = Expression::in_list(
            nullable("a"),
            vec![Expression::literal(1), nullable("b"), required("c")],
        );
        assert_eq!(
            split_nullable_entries(expr, &values),
            Expression::or(
                Expression::in_list(nullable("a"), vec![Expression::literal(1), required("c")]),
                Expression::eq(nullable("a"), nullable("b")),
            )
        );

        let expr = Expression::not_in_list(required("c"), vec![nullable("b")]);
        assert_eq!(
            split_nullable_entries(expr, &values),
            Expression::neq(required("c"), nullable("b"))
        );
    }

    #[test]
    fn test_value_entries_stay_in_list() {
        let values = ParameterValues::new().with("p", Value::Null);
        let expr = Expression::not_in_list(
            nullable("a"),
            vec![Expression::null(), Expression::parameter("p"), required("c")],
        );
        assert_eq!(split_nullable_entries(expr.clone(), &values), expr);
    }

    #[test]
    fn test_in_list_with_null_is_left_to_generator() {
        let values = ParameterValues::new().with("p", Value::List(vec![Value::Integer(1), Value::Null]));
        let expr = Expression::not_in_list(nullable("a"), vec![Expression::parameter("p")]);
        assert!(!needs_expansion(&expr, &values));
        assert_eq!(expand_conservative(expr.clone(), &values), expr);
    }
}
