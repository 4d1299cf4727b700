use derive_more::{Deref, Display};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::errors::AppError;

/// Value Object - ticker symbol, trimmed and otherwise sent exactly as entered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, Serialize)]
#[display(fmt = "{}", _0)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: &str) -> Result<Self, AppError> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("Symbol cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Infallible for literals in tests and defaults; prefer [`Symbol::new`] for user input.
impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

/// X-axis label of a series point.
///
/// Price points carry dates (`"2024-01-02"`), daily-return points carry numeric
/// bin centres (`-0.013`). Numbers are printed the way a JS `Number` would be
/// for the values the API sends (`0`, not `0.0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, Serialize)]
#[display(fmt = "{}", _0)]
pub struct SeriesLabel(String);

impl SeriesLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SeriesLabel {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for SeriesLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(text) => Ok(Self(text)),
            serde_json::Value::Number(number) => Ok(Self(
                number.as_f64().map_or_else(|| number.to_string(), |value| value.to_string()),
            )),
            other => Err(D::Error::custom(format!("expected string or number label, got {other}"))),
        }
    }
}

/// Value Object - one `{x, y}` point of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub x: SeriesLabel,
    pub y: f64,
}

impl TimeSeriesPoint {
    pub fn new(x: impl Into<String>, y: f64) -> Self {
        Self { x: SeriesLabel::new(x), y }
    }
}
