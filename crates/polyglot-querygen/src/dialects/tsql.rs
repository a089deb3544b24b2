//! T-SQL Dialect

use super::{DialectImpl, DialectType};
use crate::generator::{GeneratorConfig, IdentifierQuoteStyle};

/// T-SQL (SQL Server) dialect
pub struct TSQLDialect;

impl DialectImpl for TSQLDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::TSQL
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            identifier_quote_style: IdentifierQuoteStyle::BRACKET,
            // Unicode string literals: N'...'
            string_literal_prefix: "N",
            dialect: Some(DialectType::TSQL),
            ..Default::default()
        }
    }
}
