//! SQLite Dialect

use super::{DialectImpl, DialectType};
use crate::generator::{BinaryLiteralStyle, GeneratorConfig, LimitFetchStyle};

/// SQLite dialect
pub struct SQLiteDialect;

impl DialectImpl for SQLiteDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::SQLite
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            concat_operator: "||",
            // SQLite has no boolean type, so typed booleans are plain integers
            typed_true_literal: "1",
            typed_false_literal: "0",
            binary_literal_style: BinaryLiteralStyle::Quoted,
            limit_fetch_style: LimitFetchStyle::Limit,
            // OFFSET is only valid after a LIMIT; -1 means no limit
            limit_all_literal: Some("-1"),
            dialect: Some(DialectType::SQLite),
            ..Default::default()
        }
    }
}
