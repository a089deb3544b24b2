//! Fluent Query Builder API
//!
//! Builds [`Select`] trees without spelling out every IR node.
//!
//! - **Expression helpers** ([`col`], [`nullable_col`], [`param`], [`lit`], [`null`],
//!   [`boolean`], [`alias`], [`count_star`], ...) create [`Expr`] values.
//! - **[`Expr`]** wraps an [`Expression`] and exposes operator methods (`.eq()`,
//!   `.gt()`, `.and()`, `.in_list()`, ...).
//! - **Query starters** ([`select`], [`from`]) return a [`SelectBuilder`].
//!
//! # Examples
//!
//! ```
//! use polyglot_querygen::builder::*;
//! use polyglot_querygen::{DialectType, ParameterValues};
//!
//! let command = from("Customers", "c")
//!     .select_cols([col("c", "Id"), col("c", "Name")])
//!     .where_(nullable_col("c", "City").eq(param("city")))
//!     .generate(DialectType::Generic, &ParameterValues::new().with("city", "Oslo"))
//!     .unwrap();
//! assert!(command.sql.starts_with("SELECT \"c\".\"Id\", \"c\".\"Name\"\nFROM \"Customers\" AS \"c\""));
//! ```

use crate::dialects::{Dialect, DialectType};
use crate::error::Result;
use crate::expressions::*;
use crate::parameters::{Command, ParameterValues};
use crate::value::Value;

/// Column `table.name` that never holds NULL.
pub fn col(table: &str, name: &str) -> Expr {
    Expr(Expression::column(table, name))
}

/// Column `table.name` that may hold NULL.
pub fn nullable_col(table: &str, name: &str) -> Expr {
    Expr(Expression::nullable_column(table, name))
}

/// Reference to the parameter `name`.
pub fn param(name: &str) -> Expr {
    Expr(Expression::parameter(name))
}

/// Literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr(Expression::literal(value))
}

pub fn null() -> Expr {
    Expr(Expression::null())
}

pub fn boolean(value: bool) -> Expr {
    Expr(Expression::boolean(value))
}

pub fn not(expr: Expr) -> Expr {
    expr.not()
}

pub fn and(left: Expr, right: Expr) -> Expr {
    left.and(right)
}

pub fn or(left: Expr, right: Expr) -> Expr {
    left.or(right)
}

pub fn alias(expr: Expr, name: &str) -> Expr {
    Expr(Expression::alias(expr.0, name))
}

/// Composite operand for multi-column equality.
pub fn tuple(parts: impl IntoIterator<Item = Expr>) -> Expr {
    Expr(Expression::tuple(parts.into_iter().map(|p| p.0).collect()))
}

pub fn coalesce(left: Expr, right: Expr) -> Expr {
    Expr(Expression::binary(BinaryKind::Coalesce, left.0, right.0))
}

/// `COUNT(*)`
pub fn count_star() -> Expr {
    Expr(Expression::Count(Box::new(CountFunc { this: None })))
}

pub fn count(expr: Expr) -> Expr {
    Expr(Expression::Count(Box::new(CountFunc { this: Some(expr.0) })))
}

pub fn sum(expr: Expr) -> Expr {
    Expr(Expression::Sum(Box::new(AggFunc { this: expr.0 })))
}

pub fn min_(expr: Expr) -> Expr {
    Expr(Expression::Min(Box::new(AggFunc { this: expr.0 })))
}

pub fn max_(expr: Expr) -> Expr {
    Expr(Expression::Max(Box::new(AggFunc { this: expr.0 })))
}

/// `EXISTS (<query>)`
pub fn exists(query: SelectBuilder) -> Expr {
    Expr(Expression::Exists(Box::new(Exists {
        query: query.build(),
    })))
}

/// Scalar sub-query.
pub fn subquery(query: SelectBuilder) -> Expr {
    Expr(Expression::Subquery(Box::new(query.build())))
}

/// Searched CASE: `CASE WHEN .. THEN .. END`.
pub fn case() -> CaseBuilder {
    CaseBuilder {
        case: Case {
            operand: None,
            whens: Vec::new(),
            else_: None,
        },
    }
}

/// Simple CASE: `CASE operand WHEN value THEN .. END`.
pub fn case_of(operand: Expr) -> CaseBuilder {
    CaseBuilder {
        case: Case {
            operand: Some(operand.0),
            whens: Vec::new(),
            else_: None,
        },
    }
}

/// Start a SELECT with the given projection list.
pub fn select(projection: impl IntoIterator<Item = Expr>) -> SelectBuilder {
    SelectBuilder::new().select_cols(projection)
}

/// Start a SELECT from a base table.
pub fn from(table: &str, alias: &str) -> SelectBuilder {
    SelectBuilder::new().from(table, alias)
}

/// An expression under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr(pub Expression);

impl Expr {
    pub fn into_inner(self) -> Expression {
        self.0
    }

    fn binary(self, kind: BinaryKind, other: Expr) -> Expr {
        Expr(Expression::binary(kind, self.0, other.0))
    }

    pub fn eq(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Eq, other)
    }

    pub fn neq(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Neq, other)
    }

    pub fn lt(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Lt, other)
    }

    pub fn lte(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Lte, other)
    }

    pub fn gt(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Gt, other)
    }

    pub fn gte(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Gte, other)
    }

    pub fn and(self, other: Expr) -> Expr {
        self.binary(BinaryKind::And, other)
    }

    pub fn or(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Or, other)
    }

    pub fn not(self) -> Expr {
        Expr(Expression::not(self.0))
    }

    pub fn add(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Add, other)
    }

    pub fn sub(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Sub, other)
    }

    pub fn mul(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Mul, other)
    }

    pub fn div(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Div, other)
    }

    pub fn modulo(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Mod, other)
    }

    /// String concatenation, written with the dialect's operator.
    pub fn concat(self, other: Expr) -> Expr {
        self.binary(BinaryKind::Concat, other)
    }

    pub fn neg(self) -> Expr {
        Expr(Expression::Neg(Box::new(UnaryOp::new(self.0))))
    }

    pub fn is_null(self) -> Expr {
        Expr(Expression::is_null(self.0))
    }

    pub fn is_not_null(self) -> Expr {
        Expr(Expression::is_not_null(self.0))
    }

    /// `self IN (values)`. A list literal or list-bound parameter expands to
    /// one entry per element.
    pub fn in_list(self, values: impl IntoIterator<Item = Expr>) -> Expr {
        Expr(Expression::in_list(
            self.0,
            values.into_iter().map(|v| v.0).collect(),
        ))
    }

    pub fn not_in_list(self, values: impl IntoIterator<Item = Expr>) -> Expr {
        Expr(Expression::not_in_list(
            self.0,
            values.into_iter().map(|v| v.0).collect(),
        ))
    }

    pub fn like(self, pattern: Expr) -> Expr {
        Expr(Expression::Like(Box::new(LikeOp {
            left: self.0,
            right: pattern.0,
        })))
    }

    /// Mark as never NULL, whatever the operand's own nullability.
    pub fn not_nullable(self) -> Expr {
        Expr(Expression::not_nullable(self.0))
    }

    pub fn alias(self, name: &str) -> Expr {
        alias(self, name)
    }

    pub fn asc(self) -> Ordering {
        Ordering {
            this: self.0,
            desc: false,
        }
    }

    pub fn desc(self) -> Ordering {
        Ordering {
            this: self.0,
            desc: true,
        }
    }
}

impl From<Expr> for Expression {
    fn from(expr: Expr) -> Self {
        expr.0
    }
}

impl From<Expression> for Expr {
    fn from(expression: Expression) -> Self {
        Expr(expression)
    }
}

/// Builder for CASE expressions.
pub struct CaseBuilder {
    case: Case,
}

impl CaseBuilder {
    pub fn when(mut self, condition: Expr, result: Expr) -> Self {
        self.case.whens.push((condition.0, result.0));
        self
    }

    pub fn else_(mut self, result: Expr) -> Self {
        self.case.else_ = Some(result.0);
        self
    }

    pub fn build(self) -> Expr {
        Expr(Expression::Case(Box::new(self.case)))
    }
}

/// Builder for [`Select`] nodes.
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    select: Select,
}

impl SelectBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Append terms to the projection list.
    pub fn select_cols(mut self, projection: impl IntoIterator<Item = Expr>) -> Self {
        self.select
            .projection
            .extend(projection.into_iter().map(|e| e.0));
        self
    }

    /// Project one raw expression instead of a list.
    pub fn project(mut self, expr: Expr) -> Self {
        self.select.projection_expression = Some(expr.0);
        self
    }

    /// Project `<alias>.*` of the only table source.
    pub fn star(mut self) -> Self {
        self.select.project_star = true;
        self
    }

    /// Add a base table source.
    pub fn from(mut self, table: &str, alias: &str) -> Self {
        self.select.tables.push(TableSource::table(table, alias));
        self
    }

    /// Add a derived table.
    pub fn from_subquery(mut self, query: SelectBuilder, alias: &str) -> Self {
        let mut select = query.build();
        select.alias = Some(alias.to_string());
        self.select.tables.push(TableSource::Subquery(Box::new(select)));
        self
    }

    /// Add a raw SQL derived table; `{0}`, `{1}`, ... in `sql` refer to `arguments`.
    pub fn from_sql(
        mut self,
        sql: &str,
        arguments: impl IntoIterator<Item = Expr>,
        alias: &str,
    ) -> Self {
        self.select.tables.push(TableSource::FromSql(Box::new(FromSql {
            sql: sql.to_string(),
            arguments: arguments.into_iter().map(|a| a.0).collect(),
            alias: alias.to_string(),
        })));
        self
    }

    pub fn cross_join(mut self, table: &str, alias: &str) -> Self {
        self.select.tables.push(TableSource::join(
            JoinKind::Cross,
            TableSource::table(table, alias),
            None,
        ));
        self
    }

    /// Add an `INNER JOIN ... ON on`.
    pub fn join(mut self, table: &str, alias: &str, on: Expr) -> Self {
        self.select.tables.push(TableSource::join(
            JoinKind::Inner,
            TableSource::table(table, alias),
            Some(on.0),
        ));
        self
    }

    /// Add a `LEFT JOIN ... ON on`.
    pub fn left_join(mut self, table: &str, alias: &str, on: Expr) -> Self {
        self.select.tables.push(TableSource::join(
            JoinKind::Left,
            TableSource::table(table, alias),
            Some(on.0),
        ));
        self
    }

    /// Set the predicate; a second call ANDs onto the first.
    pub fn where_(mut self, condition: Expr) -> Self {
        self.select.predicate = Some(match self.select.predicate.take() {
            Some(existing) => Expression::and(existing, condition.0),
            None => condition.0,
        });
        self
    }

    pub fn order_by(mut self, ordering: impl IntoIterator<Item = Ordering>) -> Self {
        self.select.order_by.extend(ordering);
        self
    }

    pub fn limit(mut self, limit: Expr) -> Self {
        self.select.limit = Some(limit.0);
        self
    }

    pub fn offset(mut self, offset: Expr) -> Self {
        self.select.offset = Some(offset.0);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.select.distinct = true;
        self
    }

    pub fn build(self) -> Select {
        self.select
    }

    /// Generate SQL for the built query in a built-in dialect.
    pub fn generate(self, dialect: DialectType, values: &ParameterValues) -> Result<Command> {
        Dialect::get(dialect).generate(&self.select, values)
    }
}
