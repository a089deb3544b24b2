//! SQL Dialects
//!
//! A dialect is a named [`GeneratorConfig`]: quoting, parameter prefix,
//! boolean literals, concatenation operator and paging syntax. The traversal
//! itself never branches on the dialect.
//!
//! Built-in dialects are resolved with [`Dialect::get`]. A custom dialect is
//! derived from a built-in one with [`CustomDialectBuilder`]:
//!
//! ```
//! use polyglot_querygen::dialects::{CustomDialectBuilder, DialectType};
//!
//! let dialect = CustomDialectBuilder::new("colon_params")
//!     .based_on(DialectType::PostgreSQL)
//!     .generator_config_modifier(|gc| gc.parameter_prefix = ":")
//!     .build()
//!     .unwrap();
//! assert_eq!(dialect.generator_config().parameter_prefix, ":");
//! ```

mod generic;
mod postgres;
mod sqlite;
mod tsql;

pub use generic::GenericDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SQLiteDialect;
pub use tsql::TSQLDialect;

use crate::error::{Error, Result};
use crate::expressions::Select;
use crate::generator::{Generator, GeneratorConfig};
use crate::parameters::{Command, ParameterValues};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectType {
    /// SQL Server flavoured defaults: `"` quotes, `@` parameters, TOP paging
    #[default]
    Generic,
    TSQL,
    SQLite,
    PostgreSQL,
}

impl fmt::Display for DialectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialectType::Generic => "generic",
            DialectType::TSQL => "tsql",
            DialectType::SQLite => "sqlite",
            DialectType::PostgreSQL => "postgresql",
        };
        f.write_str(name)
    }
}

impl FromStr for DialectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "generic" => Ok(DialectType::Generic),
            "tsql" | "mssql" | "sqlserver" => Ok(DialectType::TSQL),
            "sqlite" => Ok(DialectType::SQLite),
            "postgresql" | "postgres" => Ok(DialectType::PostgreSQL),
            other => Err(Error::invalid_input(format!("unknown dialect '{}'", other))),
        }
    }
}

/// Per-dialect settings
pub trait DialectImpl {
    /// The dialect type
    fn dialect_type(&self) -> DialectType;

    /// Fragments the generator writes for this dialect
    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            dialect: Some(self.dialect_type()),
            ..GeneratorConfig::default()
        }
    }
}

/// A resolved dialect, ready to generate SQL.
#[derive(Debug, Clone)]
pub struct Dialect {
    name: String,
    dialect_type: DialectType,
    generator_config: GeneratorConfig,
}

impl Dialect {
    /// Resolve a built-in dialect.
    pub fn get(dialect_type: DialectType) -> Self {
        let generator_config = match dialect_type {
            DialectType::Generic => GenericDialect.generator_config(),
            DialectType::TSQL => TSQLDialect.generator_config(),
            DialectType::SQLite => SQLiteDialect.generator_config(),
            DialectType::PostgreSQL => PostgresDialect.generator_config(),
        };
        Self {
            name: dialect_type.to_string(),
            dialect_type,
            generator_config,
        }
    }

    /// Dialect name; the builder's name for custom dialects
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The built-in dialect this one is, or is based on
    pub fn dialect_type(&self) -> DialectType {
        self.dialect_type
    }

    pub fn generator_config(&self) -> &GeneratorConfig {
        &self.generator_config
    }

    /// Render `select` with the given parameter values.
    pub fn generate(&self, select: &Select, values: &ParameterValues) -> Result<Command> {
        Generator::new(self.generator_config.clone(), values).generate(select)
    }
}

/// Builder for dialects that tweak a built-in one.
pub struct CustomDialectBuilder {
    name: String,
    base: DialectType,
    config_modifier: Option<Box<dyn FnOnce(&mut GeneratorConfig)>>,
}

impl CustomDialectBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: DialectType::Generic,
            config_modifier: None,
        }
    }

    /// Start from this built-in dialect's settings (default: Generic)
    pub fn based_on(mut self, base: DialectType) -> Self {
        self.base = base;
        self
    }

    /// Adjust the generator config after the base dialect's settings apply
    pub fn generator_config_modifier<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut GeneratorConfig) + 'static,
    {
        self.config_modifier = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<Dialect> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::invalid_input("custom dialect name must not be empty"));
        }
        let mut dialect = Dialect::get(self.base);
        if let Some(modifier) = self.config_modifier {
            modifier(&mut dialect.generator_config);
        }
        dialect.name = name.to_string();
        Ok(dialect)
    }
}
