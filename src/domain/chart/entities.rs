use serde::Serialize;

use super::value_objects::{
    AxisStyle, ChartKind, Dataset, Interaction, Scales, SeriesStyle, TickStyle, ZoomMode,
    ZoomOptions,
};
use crate::domain::market_data::{SeriesLabel, TimeSeries};

const ACCENT_LINE: &str = "rgb(0, 155, 255)";
const ACCENT_AREA: &str = "rgba(0, 155, 255, 0.1)";
const ACCENT_BAR: &str = "rgba(0, 155, 255, 0.5)";
const FAINT_GRID: &str = "rgba(0,0,0,0.05)";
const MUTED_TICKS: &str = "rgba(0,0,0,0.5)";

/// Everything a drawing surface needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub labels: Vec<SeriesLabel>,
    pub dataset: Dataset,
    pub scales: Scales,
    pub interaction: Interaction,
    pub zoom: Option<ZoomOptions>,
}

impl ChartConfig {
    /// Price chart: smoothed filled line without point glyphs, zoomable on both axes.
    pub fn price_chart(series: &TimeSeries) -> Self {
        Self {
            kind: ChartKind::Line,
            labels: series.labels(),
            dataset: Dataset {
                label: "Stock Price".to_string(),
                data: series.values(),
                style: SeriesStyle {
                    border_color: Some(ACCENT_LINE.to_string()),
                    background_color: ACCENT_AREA.to_string(),
                    border_width: 2.0,
                    tension: 0.2,
                    fill: true,
                    point_radius: 0.0,
                },
            },
            scales: Scales {
                x: AxisStyle { grid_color: None, ticks: TickStyle::default() },
                y: AxisStyle {
                    grid_color: Some(FAINT_GRID.to_string()),
                    ticks: TickStyle { font_px: 12, color: MUTED_TICKS.to_string() },
                },
            },
            interaction: Interaction { intersect: false },
            zoom: Some(ZoomOptions { wheel: true, pinch: true, mode: ZoomMode::XY }),
        }
    }

    /// Daily-return histogram: plain bars, no zoom.
    pub fn daily_return_chart(series: &TimeSeries) -> Self {
        Self {
            kind: ChartKind::Bar,
            labels: series.labels(),
            dataset: Dataset {
                label: "Daily Return".to_string(),
                data: series.values(),
                style: SeriesStyle {
                    border_color: None,
                    background_color: ACCENT_BAR.to_string(),
                    border_width: 0.0,
                    tension: 0.0,
                    fill: true,
                    point_radius: 0.0,
                },
            },
            scales: Scales {
                x: AxisStyle {
                    grid_color: Some(FAINT_GRID.to_string()),
                    ticks: TickStyle { font_px: 12, color: MUTED_TICKS.to_string() },
                },
                y: AxisStyle { grid_color: None, ticks: TickStyle::default() },
            },
            interaction: Interaction { intersect: false },
            zoom: None,
        }
    }

    pub fn len(&self) -> usize {
        self.dataset.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.data.is_empty()
    }

    pub fn label_text(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.as_str()).collect()
    }

    /// Data extent in value units. Bars always include the zero baseline.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let (min, max) = self
            .dataset
            .data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        match self.kind {
            ChartKind::Bar => Some((min.min(0.0), max.max(0.0))),
            ChartKind::Line => Some((min, max)),
        }
    }
}
