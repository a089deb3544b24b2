//! Polyglot QueryGen - null-safe SQL generation from a relational query IR
//!
//! This library turns an already-translated query tree into parameterized SQL
//! text for a target database dialect.
//!
//! # Architecture
//!
//! Generation runs in two stages:
//! 1. **Optimizer** - normalizes every predicate so that, evaluated by a SQL
//!    engine, it keeps the null-aware equality semantics of the source query
//!    language ([`optimizer::normalize_predicate`])
//! 2. **Generator** - writes the SELECT, its sources, paging and the normalized
//!    predicates as SQL text and collects the referenced parameters
//!    ([`Generator`])
//!
//! Both stages read the caller's [`ParameterValues`]: a parameter bound to
//! NULL compares as `IS NULL`, and a list-valued parameter expands into the
//! entries of an IN list.
//!
//! ```
//! use polyglot_querygen::{generate, DialectType, Expression, ParameterValues, Select, TableSource};
//!
//! let select = Select {
//!     tables: vec![TableSource::table("Things", "t")],
//!     project_star: true,
//!     predicate: Some(Expression::eq(
//!         Expression::nullable_column("t", "StringA"),
//!         Expression::parameter("p"),
//!     )),
//!     ..Select::default()
//! };
//! let values = ParameterValues::new().with("p", polyglot_querygen::Value::Null);
//!
//! let command = generate(&select, &values, DialectType::Generic).unwrap();
//! assert_eq!(
//!     command.sql,
//!     "SELECT \"t\".*\nFROM \"Things\" AS \"t\"\nWHERE \"t\".\"StringA\" IS NULL"
//! );
//! assert!(command.parameters.is_empty());
//! ```

pub mod builder;
pub mod dialects;
pub mod error;
pub mod expressions;
pub mod generator;
pub mod helper;
pub mod optimizer;
pub mod parameters;
pub mod traversal;
pub mod value;

pub use dialects::{CustomDialectBuilder, Dialect, DialectType};
pub use error::{Error, Result};
pub use expressions::{
    BinaryKind, Column, Expression, FromSql, Join, JoinKind, Ordering, Select, TableRef,
    TableSource,
};
pub use generator::{Generator, GeneratorConfig};
pub use parameters::{Command, CommandParameter, ParameterValues};
pub use traversal::{DfsIter, ExpressionWalk};
pub use value::Value;

/// Generate SQL for `select` in a built-in dialect.
///
/// The parameter map must hold a value for every parameter the tree
/// references. Generation is deterministic: the same tree and values always
/// produce the same command.
pub fn generate(select: &Select, values: &ParameterValues, dialect: DialectType) -> Result<Command> {
    Dialect::get(dialect).generate(select, values)
}
