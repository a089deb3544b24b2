//! Relational query IR.
//!
//! This module defines the node types an upstream query translator builds and
//! the generator renders. The tree is strictly owned: every node owns its
//! children and no node is shared between two parents, so normalization passes
//! rebuild sub-trees instead of mutating them.
//!
//! # Architecture
//!
//! | Type | Purpose |
//! |---|---|
//! | [`Expression`] | scalar and predicate nodes (columns, literals, parameters, operators, IN, CASE, aggregates, ...) |
//! | [`TableSource`] | FROM-clause sources: base tables, derived tables, raw SQL, joins |
//! | [`Select`] | the SELECT node; doubles as a derived table when it carries an alias |
//! | [`Ordering`] | one ORDER BY term |
//!
//! Column nodes refer to their table by alias name only. The name is resolved
//! when SQL is generated, never by walking the tree.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar or predicate node of the query IR.
///
/// Binary operators share the [`BinaryOp`] payload and are told apart by the
/// variant; [`BinaryKind`] gives a uniform view over them for passes that only
/// care about the operator class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    // Leaves
    Literal(Value),
    Column(Column),
    Parameter(Parameter),

    // Logical operators
    And(Box<BinaryOp>),
    Or(Box<BinaryOp>),
    Not(Box<UnaryOp>),

    // Comparison operators
    Eq(Box<BinaryOp>),
    Neq(Box<BinaryOp>),
    Lt(Box<BinaryOp>),
    Lte(Box<BinaryOp>),
    Gt(Box<BinaryOp>),
    Gte(Box<BinaryOp>),

    // Arithmetic and string operators
    Add(Box<BinaryOp>),
    Sub(Box<BinaryOp>),
    Mul(Box<BinaryOp>),
    Div(Box<BinaryOp>),
    Mod(Box<BinaryOp>),
    Concat(Box<BinaryOp>),
    Coalesce(Box<BinaryOp>),
    Neg(Box<UnaryOp>),

    // Predicates
    In(Box<In>),
    IsNull(Box<IsNull>),
    Like(Box<LikeOp>),
    Exists(Box<Exists>),

    Case(Box<Case>),

    // Aggregates
    Count(Box<CountFunc>),
    Sum(Box<AggFunc>),
    Min(Box<AggFunc>),
    Max(Box<AggFunc>),

    Alias(Box<Alias>),
    /// Composite operand of a structural equality, e.g. a multi-column key
    Tuple(Box<Tuple>),
    /// Marks an operand as never NULL; reduced away before rendering
    NotNullable(Box<UnaryOp>),
    /// Scalar sub-query
    Subquery(Box<Select>),
}

/// Operator class of a binary expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryKind {
    And,
    Or,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Coalesce,
}

impl BinaryKind {
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryKind::And | BinaryKind::Or)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryKind::Eq
                | BinaryKind::Neq
                | BinaryKind::Lt
                | BinaryKind::Lte
                | BinaryKind::Gt
                | BinaryKind::Gte
        )
    }

    /// The comparison that holds exactly when `self` is false on non-null operands.
    pub fn negated_comparison(self) -> Option<BinaryKind> {
        match self {
            BinaryKind::Eq => Some(BinaryKind::Neq),
            BinaryKind::Neq => Some(BinaryKind::Eq),
            BinaryKind::Lt => Some(BinaryKind::Gte),
            BinaryKind::Lte => Some(BinaryKind::Gt),
            BinaryKind::Gt => Some(BinaryKind::Lte),
            BinaryKind::Gte => Some(BinaryKind::Lt),
            _ => None,
        }
    }

    /// Infix operator text. Concatenation is dialect specific and coalescing is
    /// a function call, so neither has a fixed operator here.
    pub fn operator(self) -> Option<&'static str> {
        match self {
            BinaryKind::And => Some("AND"),
            BinaryKind::Or => Some("OR"),
            BinaryKind::Eq => Some("="),
            BinaryKind::Neq => Some("<>"),
            BinaryKind::Lt => Some("<"),
            BinaryKind::Lte => Some("<="),
            BinaryKind::Gt => Some(">"),
            BinaryKind::Gte => Some(">="),
            BinaryKind::Add => Some("+"),
            BinaryKind::Sub => Some("-"),
            BinaryKind::Mul => Some("*"),
            BinaryKind::Div => Some("/"),
            BinaryKind::Mod => Some("%"),
            BinaryKind::Concat | BinaryKind::Coalesce => None,
        }
    }
}

/// Column reference, qualified by the alias of the table source it reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Alias of the owning table source; resolved by name at generation time
    #[serde(default)]
    pub table: Option<String>,
    /// Whether the column may hold NULL
    #[serde(default)]
    pub nullable: bool,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = &self.table {
            write!(f, "{}.{}", table, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Reference to a caller-supplied parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryOp {
    pub left: Expression,
    pub right: Expression,
}

impl BinaryOp {
    pub fn new(left: Expression, right: Expression) -> Self {
        Self { left, right }
    }
}

/// Shared payload for `Not`, `Neg` and `NotNullable`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryOp {
    pub this: Expression,
}

impl UnaryOp {
    pub fn new(this: Expression) -> Self {
        Self { this }
    }
}

/// `x IN (v1, v2, ...)`, or `x NOT IN (...)` when `not` is set.
///
/// Values are literals or parameters; a list-valued literal or parameter
/// expands to one entry per element when rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct In {
    pub this: Expression,
    pub expressions: Vec<Expression>,
    #[serde(default)]
    pub not: bool,
}

/// `x IS NULL`, or `x IS NOT NULL` when `not` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsNull {
    pub this: Expression,
    #[serde(default)]
    pub not: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeOp {
    pub left: Expression,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exists {
    pub query: Select,
}

/// Searched (`operand` is `None`) or simple CASE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(default)]
    pub operand: Option<Expression>,
    /// Pairs of (WHEN condition, THEN result).
    pub whens: Vec<(Expression, Expression)>,
    #[serde(default)]
    pub else_: Option<Expression>,
}

/// `COUNT(*)` when `this` is `None`, otherwise `COUNT(this)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountFunc {
    #[serde(default)]
    pub this: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggFunc {
    pub this: Expression,
}

/// Alias wrapper. The alias is emitted as `AS "alias"` in projections and
/// used in place of the expression in ORDER BY.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub this: Expression,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    pub expressions: Vec<Expression>,
}

/// A FROM-clause source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    Table(TableRef),
    /// Derived table; the select must carry an alias
    Subquery(Box<Select>),
    /// Derived table from a raw SQL template
    FromSql(Box<FromSql>),
    Join(Box<Join>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub alias: String,
}

/// Raw SQL derived table.
///
/// `sql` contains positional placeholders `{0}`, `{1}`, ...; each is replaced
/// by a fresh command parameter bound to the matching argument's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromSql {
    pub sql: String,
    #[serde(default)]
    pub arguments: Vec<Expression>,
    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Cross,
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub this: TableSource,
    /// Join condition; required for inner and left joins, absent for cross joins
    #[serde(default)]
    pub on: Option<Expression>,
    pub kind: JoinKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    pub this: Expression,
    #[serde(default)]
    pub desc: bool,
}

/// The SELECT node.
///
/// Projection precedence is fixed: the explicit `projection` list, then the
/// raw `projection_expression`, then `<alias>.*` when `project_star` is set
/// and there is exactly one source, and finally the literal `1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Select {
    #[serde(default)]
    pub projection: Vec<Expression>,
    #[serde(default)]
    pub projection_expression: Option<Expression>,
    #[serde(default)]
    pub project_star: bool,
    #[serde(default)]
    pub tables: Vec<TableSource>,
    #[serde(default)]
    pub predicate: Option<Expression>,
    #[serde(default)]
    pub order_by: Vec<Ordering>,
    #[serde(default)]
    pub limit: Option<Expression>,
    #[serde(default)]
    pub offset: Option<Expression>,
    #[serde(default)]
    pub distinct: bool,
    /// Set when this select is used as a derived table
    #[serde(default)]
    pub alias: Option<String>,
}

impl Expression {
    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expression::Column(Column {
            name: name.into(),
            table: Some(table.into()),
            nullable: false,
        })
    }

    pub fn nullable_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expression::Column(Column {
            name: name.into(),
            table: Some(table.into()),
            nullable: true,
        })
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Expression::Parameter(Parameter { name: name.into() })
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn null() -> Self {
        Expression::Literal(Value::Null)
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Literal(Value::Boolean(value))
    }

    /// Build a binary expression of the given kind.
    pub fn binary(kind: BinaryKind, left: Expression, right: Expression) -> Self {
        let op = Box::new(BinaryOp::new(left, right));
        match kind {
            BinaryKind::And => Expression::And(op),
            BinaryKind::Or => Expression::Or(op),
            BinaryKind::Eq => Expression::Eq(op),
            BinaryKind::Neq => Expression::Neq(op),
            BinaryKind::Lt => Expression::Lt(op),
            BinaryKind::Lte => Expression::Lte(op),
            BinaryKind::Gt => Expression::Gt(op),
            BinaryKind::Gte => Expression::Gte(op),
            BinaryKind::Add => Expression::Add(op),
            BinaryKind::Sub => Expression::Sub(op),
            BinaryKind::Mul => Expression::Mul(op),
            BinaryKind::Div => Expression::Div(op),
            BinaryKind::Mod => Expression::Mod(op),
            BinaryKind::Concat => Expression::Concat(op),
            BinaryKind::Coalesce => Expression::Coalesce(op),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryKind::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryKind::Or, left, right)
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryKind::Eq, left, right)
    }

    pub fn neq(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryKind::Neq, left, right)
    }

    pub fn not(this: Expression) -> Self {
        Expression::Not(Box::new(UnaryOp::new(this)))
    }

    pub fn is_null(this: Expression) -> Self {
        Expression::IsNull(Box::new(IsNull { this, not: false }))
    }

    pub fn is_not_null(this: Expression) -> Self {
        Expression::IsNull(Box::new(IsNull { this, not: true }))
    }

    pub fn in_list(this: Expression, expressions: Vec<Expression>) -> Self {
        Expression::In(Box::new(In {
            this,
            expressions,
            not: false,
        }))
    }

    pub fn not_in_list(this: Expression, expressions: Vec<Expression>) -> Self {
        Expression::In(Box::new(In {
            this,
            expressions,
            not: true,
        }))
    }

    pub fn alias(this: Expression, alias: impl Into<String>) -> Self {
        Expression::Alias(Box::new(Alias {
            this,
            alias: Some(alias.into()),
        }))
    }

    pub fn tuple(expressions: Vec<Expression>) -> Self {
        Expression::Tuple(Box::new(Tuple { expressions }))
    }

    pub fn not_nullable(this: Expression) -> Self {
        Expression::NotNullable(Box::new(UnaryOp::new(this)))
    }

    /// Fold a list of operands into a left-deep AND chain.
    pub fn and_all(operands: impl IntoIterator<Item = Expression>) -> Option<Self> {
        operands.into_iter().reduce(Expression::and)
    }

    /// Fold a list of operands into a left-deep OR chain.
    pub fn or_all(operands: impl IntoIterator<Item = Expression>) -> Option<Self> {
        operands.into_iter().reduce(Expression::or)
    }

    /// The operator class and operands of a binary node.
    pub fn as_binary(&self) -> Option<(BinaryKind, &BinaryOp)> {
        let kind = match self {
            Expression::And(op) => (BinaryKind::And, op),
            Expression::Or(op) => (BinaryKind::Or, op),
            Expression::Eq(op) => (BinaryKind::Eq, op),
            Expression::Neq(op) => (BinaryKind::Neq, op),
            Expression::Lt(op) => (BinaryKind::Lt, op),
            Expression::Lte(op) => (BinaryKind::Lte, op),
            Expression::Gt(op) => (BinaryKind::Gt, op),
            Expression::Gte(op) => (BinaryKind::Gte, op),
            Expression::Add(op) => (BinaryKind::Add, op),
            Expression::Sub(op) => (BinaryKind::Sub, op),
            Expression::Mul(op) => (BinaryKind::Mul, op),
            Expression::Div(op) => (BinaryKind::Div, op),
            Expression::Mod(op) => (BinaryKind::Mod, op),
            Expression::Concat(op) => (BinaryKind::Concat, op),
            Expression::Coalesce(op) => (BinaryKind::Coalesce, op),
            _ => return None,
        };
        Some((kind.0, kind.1.as_ref()))
    }

    /// Owned counterpart of [`Expression::as_binary`]; gives the node back
    /// unchanged when it is not a binary operator.
    pub fn into_binary(self) -> std::result::Result<(BinaryKind, BinaryOp), Expression> {
        match self {
            Expression::And(op) => Ok((BinaryKind::And, *op)),
            Expression::Or(op) => Ok((BinaryKind::Or, *op)),
            Expression::Eq(op) => Ok((BinaryKind::Eq, *op)),
            Expression::Neq(op) => Ok((BinaryKind::Neq, *op)),
            Expression::Lt(op) => Ok((BinaryKind::Lt, *op)),
            Expression::Lte(op) => Ok((BinaryKind::Lte, *op)),
            Expression::Gt(op) => Ok((BinaryKind::Gt, *op)),
            Expression::Gte(op) => Ok((BinaryKind::Gte, *op)),
            Expression::Add(op) => Ok((BinaryKind::Add, *op)),
            Expression::Sub(op) => Ok((BinaryKind::Sub, *op)),
            Expression::Mul(op) => Ok((BinaryKind::Mul, *op)),
            Expression::Div(op) => Ok((BinaryKind::Div, *op)),
            Expression::Mod(op) => Ok((BinaryKind::Mod, *op)),
            Expression::Concat(op) => Ok((BinaryKind::Concat, *op)),
            Expression::Coalesce(op) => Ok((BinaryKind::Coalesce, *op)),
            other => Err(other),
        }
    }

    /// Bare literal, column or parameter, seen through alias and not-nullable
    /// wrappers.
    pub fn is_simple(&self) -> bool {
        match self {
            Expression::Literal(_) | Expression::Column(_) | Expression::Parameter(_) => true,
            Expression::Alias(alias) => alias.this.is_simple(),
            Expression::NotNullable(op) => op.this.is_simple(),
            _ => false,
        }
    }

    /// Whether the node yields a truth value in SQL (a search condition)
    /// rather than a scalar.
    pub fn is_search_condition(&self) -> bool {
        match self {
            Expression::Not(_)
            | Expression::In(_)
            | Expression::IsNull(_)
            | Expression::Like(_)
            | Expression::Exists(_) => true,
            Expression::Alias(alias) => alias.this.is_search_condition(),
            Expression::NotNullable(op) => op.this.is_search_condition(),
            _ => self
                .as_binary()
                .is_some_and(|(kind, _)| kind.is_logical() || kind.is_comparison()),
        }
    }

    /// The boolean value of a constant `TRUE`/`FALSE` literal.
    pub fn as_constant_bool(&self) -> Option<bool> {
        match self {
            Expression::Literal(Value::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the node kind, used in error messages and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Literal(_) => "literal",
            Expression::Column(_) => "column",
            Expression::Parameter(_) => "parameter",
            Expression::And(_) => "AND",
            Expression::Or(_) => "OR",
            Expression::Not(_) => "NOT",
            Expression::Eq(_) => "=",
            Expression::Neq(_) => "<>",
            Expression::Lt(_) => "<",
            Expression::Lte(_) => "<=",
            Expression::Gt(_) => ">",
            Expression::Gte(_) => ">=",
            Expression::Add(_) => "+",
            Expression::Sub(_) => "-",
            Expression::Mul(_) => "*",
            Expression::Div(_) => "/",
            Expression::Mod(_) => "%",
            Expression::Concat(_) => "concatenation",
            Expression::Coalesce(_) => "COALESCE",
            Expression::Neg(_) => "negation",
            Expression::In(_) => "IN",
            Expression::IsNull(_) => "IS NULL",
            Expression::Like(_) => "LIKE",
            Expression::Exists(_) => "EXISTS",
            Expression::Case(_) => "CASE",
            Expression::Count(_) => "COUNT",
            Expression::Sum(_) => "SUM",
            Expression::Min(_) => "MIN",
            Expression::Max(_) => "MAX",
            Expression::Alias(_) => "alias",
            Expression::Tuple(_) => "tuple",
            Expression::NotNullable(_) => "not-nullable marker",
            Expression::Subquery(_) => "subquery",
        }
    }
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableSource {
    pub fn table(name: impl Into<String>, alias: impl Into<String>) -> Self {
        TableSource::Table(TableRef {
            name: name.into(),
            schema: None,
            alias: alias.into(),
        })
    }

    pub fn join(kind: JoinKind, this: TableSource, on: Option<Expression>) -> Self {
        TableSource::Join(Box::new(Join { this, on, kind }))
    }

    /// Alias other nodes use to refer to this source.
    pub fn alias(&self) -> Option<&str> {
        match self {
            TableSource::Table(table) => Some(&table.alias),
            TableSource::Subquery(select) => select.alias.as_deref(),
            TableSource::FromSql(from_sql) => Some(&from_sql.alias),
            TableSource::Join(join) => join.this.alias(),
        }
    }
}
