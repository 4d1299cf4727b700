use serde::{Deserialize, Serialize};

use super::value_objects::{SeriesLabel, TimeSeriesPoint};

/// Company snapshot returned by `/stock_info`.
///
/// The upstream source reports missing values as `null`, so every field is
/// optional; the record as a whole is stored or replaced atomically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StockInfoRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub closing_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub average_volume: Option<f64>,
    #[serde(default)]
    pub profit_margin: Option<f64>,
    #[serde(default, rename = "EBITDA")]
    pub ebitda: Option<f64>,
}

impl StockInfoRecord {
    /// Label/value rows in display order; absent values render as "N/A".
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        fn text(value: &Option<String>) -> String {
            value.clone().unwrap_or_else(|| "N/A".to_string())
        }
        fn number(value: &Option<f64>) -> String {
            value.map(format_number).unwrap_or_else(|| "N/A".to_string())
        }

        vec![
            ("Symbol", text(&self.symbol)),
            ("Company Name", text(&self.company_name)),
            ("Closing Price", number(&self.closing_price)),
            ("Market Cap", number(&self.market_cap)),
            ("Volume", number(&self.volume)),
            ("Average Volume", number(&self.average_volume)),
            ("Profit Margin", number(&self.profit_margin)),
            ("EBITDA", number(&self.ebitda)),
        ]
    }
}

/// Integers print without a fractional part, everything else with up to 4 decimals.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{:.4}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Ordered series; payload order defines the x-axis order and is never changed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    pub fn new(points: Vec<TimeSeriesPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<SeriesLabel> {
        self.points.iter().map(|p| p.x.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

}

impl From<Vec<TimeSeriesPoint>> for TimeSeries {
    fn from(points: Vec<TimeSeriesPoint>) -> Self {
        Self::new(points)
    }
}

/// Latest price returned by `/stock_price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
}
