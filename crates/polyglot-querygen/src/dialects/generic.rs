//! Generic SQL Dialect

use super::{DialectImpl, DialectType};

/// Generic dialect: the generator's defaults (`"` quotes, `@` parameters,
/// `+` concatenation, `TOP` / `OFFSET .. FETCH` paging)
pub struct GenericDialect;

impl DialectImpl for GenericDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Generic
    }
}
