pub mod canvas_renderer;
pub mod listeners;

pub use canvas_renderer::{CanvasChart, CanvasChartBackend};
