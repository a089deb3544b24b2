//! IN-list Optimization
//!
//! Collapses chains of equalities against the same operand into one IN list:
//!
//! ```text
//! x = 1 OR x = 2 OR x IN (3, 4)   ->  x IN (1, 2, 3, 4)
//! x <> 1 AND x <> 2               ->  x NOT IN (1, 2)
//! ```
//!
//! Only constant or parameter values are merged; comparisons between two
//! columns are left alone. Under null-aware semantics an IN list is exactly the
//! disjunction of its equalities, so the rewrite keeps the truth value.

use crate::error::Result;
use crate::expressions::{BinaryKind, Expression, In};
use crate::traversal::try_map_children;

/// Merge equality chains in `expr` into IN lists, bottom-up.
pub fn optimize_in_lists(expr: Expression) -> Result<Expression> {
    let expr = try_map_children(expr, optimize_in_lists)?;
    let kind = match expr.as_binary() {
        Some((kind, _)) if kind.is_logical() => kind,
        _ => return Ok(expr),
    };
    let operands = flatten(expr, kind);
    Ok(merge(operands, kind))
}

/// A set of membership tests on one operand, collected from a chain.
struct Group {
    this: Expression,
    values: Vec<Expression>,
    position: usize,
    /// The operand itself while nothing has been merged into it
    original: Option<Expression>,
}

/// `x = a` under OR merges into `x IN`, `x <> a` under AND into `x NOT IN`.
fn merge(operands: Vec<Expression>, kind: BinaryKind) -> Expression {
    let negated = kind == BinaryKind::And;
    let mut groups: Vec<Group> = Vec::new();
    let mut kept: Vec<Option<Expression>> = Vec::new();

    for operand in operands {
        let original = operand.clone();
        match split_membership(operand, negated) {
            Ok((this, values)) => {
                if let Some(group) = groups.iter_mut().find(|g| g.this == this) {
                    group.values.extend(values);
                    group.original = None;
                } else {
                    groups.push(Group {
                        this,
                        values,
                        position: kept.len(),
                        original: Some(original),
                    });
                    kept.push(None);
                }
            }
            Err(other) => kept.push(Some(other)),
        }
    }

    for group in groups {
        kept[group.position] = Some(match group.original {
            Some(original) => original,
            None => Expression::In(Box::new(In {
                this: group.this,
                expressions: group.values,
                not: negated,
            })),
        });
    }

    let operands = kept.into_iter().flatten();
    let rebuilt = if negated {
        Expression::and_all(operands)
    } else {
        Expression::or_all(operands)
    };
    // Every slot in `kept` is filled, so the chain is never empty
    rebuilt.unwrap_or_else(|| Expression::boolean(negated))
}

/// Split an operand that tests membership of one expression in a set of
/// values. Anything else is handed back unchanged.
fn split_membership(
    operand: Expression,
    negated: bool,
) -> std::result::Result<(Expression, Vec<Expression>), Expression> {
    let wanted = if negated {
        BinaryKind::Neq
    } else {
        BinaryKind::Eq
    };
    match operand {
        Expression::In(in_expr)
            if in_expr.not == negated && !is_value(&in_expr.this) =>
        {
            let In {
                this, expressions, ..
            } = *in_expr;
            Ok((this, expressions))
        }
        other => match other.into_binary() {
            Ok((kind, op)) if kind == wanted => {
                if is_value(&op.right) && !is_value(&op.left) {
                    Ok((op.left, vec![op.right]))
                } else if is_value(&op.left) && !is_value(&op.right) {
                    Ok((op.right, vec![op.left]))
                } else {
                    Err(Expression::binary(kind, op.left, op.right))
                }
            }
            Ok((kind, op)) => Err(Expression::binary(kind, op.left, op.right)),
            Err(other) => Err(other),
        },
    }
}

/// Literal or parameter: something that may appear in an IN list.
fn is_value(expr: &Expression) -> bool {
    matches!(expr, Expression::Literal(_) | Expression::Parameter(_))
}

fn flatten(expr: Expression, kind: BinaryKind) -> Vec<Expression> {
    match expr.into_binary() {
        Ok((k, op)) if k == kind => {
            let mut operands = flatten(op.left, kind);
            operands.extend(flatten(op.right, kind));
            operands
        }
        Ok((k, op)) => vec![Expression::binary(k, op.left, op.right)],
        Err(other) => vec![other],
    }
}
