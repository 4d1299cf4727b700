use derive_more::Display;
use serde::Serialize;
use strum::{AsRefStr, EnumIter, EnumString};

/// Drawing surface a chart instance is bound to.
///
/// `AsRefStr` gives the DOM id of the canvas element that backs the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr, Serialize)]
pub enum SurfaceId {
    #[display(fmt = "price chart")]
    #[strum(serialize = "price-chart")]
    PriceChart,
    #[display(fmt = "daily return chart")]
    #[strum(serialize = "daily-return-chart")]
    DailyReturnChart,
}

impl SurfaceId {
    pub fn element_id(&self) -> &str {
        self.as_ref()
    }
}

/// Value Object - Chart type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, AsRefStr, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[display(fmt = "Line")]
    #[strum(serialize = "line")]
    Line,
    #[display(fmt = "Bar")]
    #[strum(serialize = "bar")]
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ZoomMode {
    #[serde(rename = "x")]
    X,
    #[serde(rename = "y")]
    Y,
    #[serde(rename = "xy")]
    XY,
}

impl ZoomMode {
    pub fn zooms_x(&self) -> bool {
        matches!(self, ZoomMode::X | ZoomMode::XY)
    }

    pub fn zooms_y(&self) -> bool {
        matches!(self, ZoomMode::Y | ZoomMode::XY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoomOptions {
    pub wheel: bool,
    pub pinch: bool,
    pub mode: ZoomMode,
}

/// Tooltip activation. `intersect: false` activates on proximity along x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interaction {
    pub intersect: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self { intersect: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickStyle {
    pub font_px: u32,
    pub color: String,
}

impl Default for TickStyle {
    fn default() -> Self {
        Self { font_px: 12, color: "#666".to_string() }
    }
}

/// One axis: `grid_color: None` hides the grid lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AxisStyle {
    pub grid_color: Option<String>,
    pub ticks: TickStyle,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Scales {
    pub x: AxisStyle,
    pub y: AxisStyle,
}

/// How a dataset is stroked and filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStyle {
    pub border_color: Option<String>,
    pub background_color: String,
    pub border_width: f64,
    pub tension: f64,
    pub fill: bool,
    pub point_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub style: SeriesStyle,
}
