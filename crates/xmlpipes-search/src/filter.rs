//! Filter value normalization.

use xmlpipes_core::{FilterValues, Value};

/// A filter argument as given by the caller: one value (possibly a list) or
/// an inclusive range.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterInput {
    /// Match any of the value's elements.
    Value(Value),
    /// Match the inclusive range between two values.
    Range(Value, Value),
}

impl FilterInput {
    /// Inclusive range input.
    pub fn range(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        FilterInput::Range(min.into(), max.into())
    }

    /// Normalize into the values sent to the daemon.
    ///
    /// Nulls become `0`, times become epoch seconds, and nested lists are
    /// flattened. Range endpoints take the first element of their
    /// normalized form.
    pub fn normalize(&self) -> FilterValues {
        match self {
            FilterInput::Value(value) => FilterValues::Values(flatten(value)),
            FilterInput::Range(min, max) => FilterValues::Range(endpoint(min), endpoint(max)),
        }
    }
}

impl From<Value> for FilterInput {
    fn from(value: Value) -> Self {
        FilterInput::Value(value)
    }
}

fn flatten(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => vec![Value::Int(0)],
        Value::Time(t) => vec![Value::Int(t.timestamp())],
        Value::List(items) => items.iter().flat_map(flatten).collect(),
        other => vec![other.clone()],
    }
}

fn endpoint(value: &Value) -> Value {
    flatten(value).into_iter().next().unwrap_or(Value::Int(0))
}

// ============================================================================
// Tests
// ============================================================================
