//! Parameter values going in and command parameters coming out.

use crate::error::{Error, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Caller-supplied map from parameter name to its current value.
///
/// Every parameter referenced by a query must have an entry when SQL is
/// generated; a missing entry is reported as [`Error::MissingParameter`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterValues {
    values: HashMap<String, Value>,
}

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Value bound to `name`, or [`Error::MissingParameter`]. An empty name
    /// is [`Error::InvalidInput`] even when the map holds a `""` key.
    pub fn require(&self, name: &str) -> Result<&Value> {
        if name.is_empty() {
            return Err(Error::invalid_input("parameter name must not be empty"));
        }
        self.values
            .get(name)
            .ok_or_else(|| Error::MissingParameter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterValues
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = ParameterValues::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

/// A named value bound to a placeholder in generated SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandParameter {
    pub name: String,
    pub value: Value,
}

/// Output of one generation call: SQL text plus the parameters it references,
/// in order of first reference and without duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub sql: String,
    pub parameters: Vec<CommandParameter>,
}

impl Command {
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }
}
