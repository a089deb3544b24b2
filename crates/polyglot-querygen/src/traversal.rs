//! Tree traversal utilities for the query IR.
//!
//! Traversal stays inside one predicate scope: the sub-select of an `EXISTS`
//! or a scalar sub-query is a separate query with its own predicate and is
//! not visited. Those predicates are normalized when their own SELECT is
//! generated.
//!
//! - [`DfsIter`] walks an expression depth-first, pre-order.
//! - [`ExpressionWalk`] adds `find` / `contains` helpers on top.
//! - [`try_map_children`] rebuilds a node from transformed children; passes use
//!   it for every node kind they do not rewrite themselves.

use crate::error::Result;
use crate::expressions::{
    AggFunc, Alias, Case, CountFunc, Expression, In, IsNull, LikeOp, Tuple, UnaryOp,
};

/// Direct children of an expression, left to right.
pub fn iter_children(expr: &Expression) -> Vec<&Expression> {
    match expr {
        Expression::Literal(_)
        | Expression::Column(_)
        | Expression::Parameter(_)
        | Expression::Exists(_)
        | Expression::Subquery(_) => Vec::new(),
        Expression::Not(op) | Expression::Neg(op) | Expression::NotNullable(op) => vec![&op.this],
        Expression::In(in_expr) => {
            let mut children = vec![&in_expr.this];
            children.extend(in_expr.expressions.iter());
            children
        }
        Expression::IsNull(is_null) => vec![&is_null.this],
        Expression::Like(like) => vec![&like.left, &like.right],
        Expression::Case(case) => {
            let mut children = Vec::new();
            if let Some(operand) = &case.operand {
                children.push(operand);
            }
            for (condition, result) in &case.whens {
                children.push(condition);
                children.push(result);
            }
            if let Some(else_) = &case.else_ {
                children.push(else_);
            }
            children
        }
        Expression::Count(count) => count.this.iter().collect(),
        Expression::Sum(agg) | Expression::Min(agg) | Expression::Max(agg) => vec![&agg.this],
        Expression::Alias(alias) => vec![&alias.this],
        Expression::Tuple(tuple) => tuple.expressions.iter().collect(),
        other => match other.as_binary() {
            Some((_, op)) => vec![&op.left, &op.right],
            None => Vec::new(),
        },
    }
}

/// Depth-first (pre-order) iterator over an expression tree.
pub struct DfsIter<'a> {
    stack: Vec<&'a Expression>,
}

impl<'a> DfsIter<'a> {
    pub fn new(root: &'a Expression) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for DfsIter<'a> {
    type Item = &'a Expression;

    fn next(&mut self) -> Option<Self::Item> {
        let expr = self.stack.pop()?;
        // Push in reverse so children come out left to right
        for child in iter_children(expr).into_iter().rev() {
            self.stack.push(child);
        }
        Some(expr)
    }
}

/// Search helpers over an expression tree.
pub trait ExpressionWalk {
    fn dfs(&self) -> DfsIter<'_>;

    /// First node matching `predicate` in depth-first order.
    fn find<F>(&self, predicate: F) -> Option<&Expression>
    where
        F: Fn(&Expression) -> bool;

    /// Whether this node or any descendant matches `predicate`.
    fn contains<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Expression) -> bool;
}

impl ExpressionWalk for Expression {
    fn dfs(&self) -> DfsIter<'_> {
        DfsIter::new(self)
    }

    fn find<F>(&self, predicate: F) -> Option<&Expression>
    where
        F: Fn(&Expression) -> bool,
    {
        self.dfs().find(|e| predicate(e))
    }

    fn contains<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Expression) -> bool,
    {
        self.find(predicate).is_some()
    }
}

pub fn is_parameter(expr: &Expression) -> bool {
    matches!(expr, Expression::Parameter(_))
}

/// Whether any parameter is referenced in this predicate scope.
pub fn contains_parameter(expr: &Expression) -> bool {
    expr.contains(is_parameter)
}

/// Rebuild `expr` with every direct child replaced by `f(child)`.
///
/// Leaves and sub-query nodes come back unchanged.
pub fn try_map_children<F>(expr: Expression, mut f: F) -> Result<Expression>
where
    F: FnMut(Expression) -> Result<Expression>,
{
    let mapped = match expr {
        Expression::Literal(_)
        | Expression::Column(_)
        | Expression::Parameter(_)
        | Expression::Exists(_)
        | Expression::Subquery(_) => expr,
        Expression::Not(op) => Expression::Not(Box::new(UnaryOp::new(f(op.this)?))),
        Expression::Neg(op) => Expression::Neg(Box::new(UnaryOp::new(f(op.this)?))),
        Expression::NotNullable(op) => {
            Expression::NotNullable(Box::new(UnaryOp::new(f(op.this)?)))
        }
        Expression::In(in_expr) => {
            let In {
                this,
                expressions,
                not,
            } = *in_expr;
            Expression::In(Box::new(In {
                this: f(this)?,
                expressions: expressions.into_iter().map(&mut f).collect::<Result<_>>()?,
                not,
            }))
        }
        Expression::IsNull(is_null) => Expression::IsNull(Box::new(IsNull {
            this: f(is_null.this)?,
            not: is_null.not,
        })),
        Expression::Like(like) => {
            let LikeOp { left, right } = *like;
            Expression::Like(Box::new(LikeOp {
                left: f(left)?,
                right: f(right)?,
            }))
        }
        Expression::Case(case) => {
            let Case {
                operand,
                whens,
                else_,
            } = *case;
            let operand = operand.map(&mut f).transpose()?;
            let whens = whens
                .into_iter()
                .map(|(condition, result)| -> Result<(Expression, Expression)> {
                    Ok((f(condition)?, f(result)?))
                })
                .collect::<Result<_>>()?;
            let else_ = else_.map(&mut f).transpose()?;
            Expression::Case(Box::new(Case {
                operand,
                whens,
                else_,
            }))
        }
        Expression::Count(count) => Expression::Count(Box::new(CountFunc {
            this: count.this.map(&mut f).transpose()?,
        })),
        Expression::Sum(agg) => Expression::Sum(Box::new(AggFunc { this: f(agg.this)? })),
        Expression::Min(agg) => Expression::Min(Box::new(AggFunc { this: f(agg.this)? })),
        Expression::Max(agg) => Expression::Max(Box::new(AggFunc { this: f(agg.this)? })),
        Expression::Alias(alias) => Expression::Alias(Box::new(Alias {
            this: f(alias.this)?,
            alias: alias.alias,
        })),
        Expression::Tuple(tuple) => Expression::Tuple(Box::new(Tuple {
            expressions: tuple
                .expressions
                .into_iter()
                .map(&mut f)
                .collect::<Result<_>>()?,
        })),
        other => match other.into_binary() {
            Ok((kind, op)) => Expression::binary(kind, f(op.left)?, f(op.right)?),
            Err(other) => other,
        },
    };
    Ok(mapped)
}
