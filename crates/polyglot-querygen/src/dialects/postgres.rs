//! PostgreSQL Dialect

use super::{DialectImpl, DialectType};
use crate::generator::{BinaryLiteralStyle, GeneratorConfig, LimitFetchStyle};

/// PostgreSQL dialect
pub struct PostgresDialect;

impl DialectImpl for PostgresDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::PostgreSQL
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            concat_operator: "||",
            true_literal: "TRUE",
            false_literal: "FALSE",
            typed_true_literal: "TRUE",
            typed_false_literal: "FALSE",
            binary_literal_style: BinaryLiteralStyle::Bytea,
            limit_fetch_style: LimitFetchStyle::Limit,
            dialect: Some(DialectType::PostgreSQL),
            ..Default::default()
        }
    }
}
