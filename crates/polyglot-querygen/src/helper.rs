//! Literal and identifier formatting shared by the generator and dialects.
//!
//! Dialect differences come in through [`GeneratorConfig`] and
//! [`IdentifierQuoteStyle`]; a dialect changes how a value kind is spelled by
//! changing its config, not this code.

use crate::error::{Error, Result};
use crate::generator::{BinaryLiteralStyle, GeneratorConfig, IdentifierQuoteStyle};
use crate::value::Value;
use chrono::TimeDelta;
use std::fmt::Write as _;

/// Format a value as an inline SQL literal.
///
/// Lists have no literal form; they are only valid inside IN and are expanded
/// there before this is called.
pub fn format_literal(value: &Value, config: &GeneratorConfig) -> Result<String> {
    let sql = match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(true) => config.true_literal.to_string(),
        Value::Boolean(false) => config.false_literal.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(Error::unsupported(
                    format!("non-finite float {}", f),
                    "as a literal",
                ));
            }
            f.to_string()
        }
        Value::Text(s) => format!("{}{}", config.string_literal_prefix, quote_string(s)),
        Value::DateTime(dt) => quote_string(&dt.format(config.datetime_format).to_string()),
        Value::DateTimeOffset(dt) => {
            quote_string(&dt.format(config.datetime_offset_format).to_string())
        }
        Value::TimeSpan(ts) => quote_string(&format_time_span(*ts)),
        Value::Bytes(bytes) => format_binary(bytes, config.binary_literal_style),
        Value::List(_) => {
            return Err(Error::unsupported("list value", "outside an IN list"));
        }
    };
    Ok(sql)
}

/// Single-quote a string, doubling embedded quotes.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// `[-][d.]hh:mm:ss[.fffffff]`, fractional part in 100ns ticks.
pub fn format_time_span(ts: TimeDelta) -> String {
    let mut out = String::new();
    if ts < TimeDelta::zero() {
        out.push('-');
    }
    let abs = ts.abs();
    let total_seconds = abs.num_seconds();
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    if days > 0 {
        let _ = write!(out, "{}.", days);
    }
    let _ = write!(out, "{:02}:{:02}:{:02}", hours, minutes, seconds);
    let ticks = abs.subsec_nanos() / 100;
    if ticks > 0 {
        let _ = write!(out, ".{:07}", ticks);
    }
    out
}

fn format_binary(bytes: &[u8], style: BinaryLiteralStyle) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(hex, "{:02X}", b);
    }
    match style {
        BinaryLiteralStyle::Prefixed => format!("0x{}", hex),
        BinaryLiteralStyle::Quoted => format!("X'{}'", hex),
        BinaryLiteralStyle::Bytea => format!("'\\x{}'::bytea", hex),
    }
}

/// Wrap an identifier in the dialect's quote characters.
///
/// An embedded closing quote is escaped by doubling it. Empty identifiers
/// are rejected.
pub fn delimit_identifier(name: &str, style: IdentifierQuoteStyle) -> Result<String> {
    if name.is_empty() {
        return Err(Error::invalid_identifier("identifier must not be empty"));
    }
    let escaped = name.replace(style.end, &format!("{}{}", style.end, style.end));
    Ok(format!("{}{}{}", style.start, escaped, style.end))
}

/// Inverse of [`delimit_identifier`]. `None` when `delimited` is not a
/// well-formed delimited identifier for `style`.
pub fn strip_identifier_quotes(delimited: &str, style: IdentifierQuoteStyle) -> Option<String> {
    let inner = delimited
        .strip_prefix(style.start)?
        .strip_suffix(style.end)?;
    if inner.is_empty() {
        return None;
    }
    let doubled = format!("{}{}", style.end, style.end);
    // A lone closing quote inside the body would have ended the identifier
    if inner.replace(&doubled, "").contains(style.end) {
        return None;
    }
    Some(inner.replace(&doubled, &style.end.to_string()))
}

/// Next `{prefix}{n}` name, counting up from `*counter`, for which
/// `is_taken` returns false. `counter` is left past the returned name.
pub fn next_free_name<F>(prefix: &str, counter: &mut usize, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    loop {
        let name = format!("{}{}", prefix, counter);
        *counter += 1;
        if !is_taken(&name) {
            return name;
        }
    }
}
