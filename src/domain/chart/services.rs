use std::ops::Range;

use super::entities::ChartConfig;
use super::value_objects::{ChartKind, Interaction, ZoomMode};

/// Closed interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` inside the range as a 0..1 ratio.
    pub fn ratio_of(&self, value: f64) -> f64 {
        if self.span() == 0.0 { 0.5 } else { (value - self.min) / self.span() }
    }

    pub fn value_at(&self, ratio: f64) -> f64 {
        self.min + self.span() * ratio
    }

    /// Scale around `ratio`, keeping the value under it fixed, then fit inside `bounds`.
    fn zoomed(&self, factor: f64, ratio: f64, min_span: f64, bounds: AxisRange) -> AxisRange {
        let anchor = self.value_at(ratio);
        let span = (self.span() / factor).clamp(min_span.min(bounds.span()), bounds.span());
        if span >= bounds.span() {
            return bounds;
        }
        let mut min = anchor - span * ratio;
        let mut max = min + span;
        if min < bounds.min {
            min = bounds.min;
            max = min + span;
        }
        if max > bounds.max {
            max = bounds.max;
            min = max - span;
        }
        AxisRange::new(min, max)
    }

    /// `count + 1` evenly spaced tick values from min to max.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        if count == 0 {
            return vec![self.min];
        }
        let step = self.span() / count as f64;
        (0..=count).map(|i| self.min + step * i as f64).collect()
    }
}

/// Visible window of a chart in (index, value) space.
///
/// X is measured in point indices, Y in data units. The window never leaves
/// the data bounds it was fitted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomWindow {
    pub x: AxisRange,
    pub y: AxisRange,
    bounds_x: AxisRange,
    bounds_y: AxisRange,
}

const MIN_VISIBLE_POINTS: f64 = 2.0;
const Y_PADDING_RATIO: f64 = 0.05;

impl ZoomWindow {
    /// Whole-data window with 5% vertical padding (bars keep their zero baseline).
    pub fn fit(config: &ChartConfig) -> Self {
        let n = config.len() as f64;
        let x = match config.kind {
            ChartKind::Bar => AxisRange::new(-0.5, (n - 0.5).max(0.5)),
            ChartKind::Line if n <= 1.0 => AxisRange::new(-0.5, 0.5),
            ChartKind::Line => AxisRange::new(0.0, n - 1.0),
        };

        let y = match config.value_bounds() {
            None => AxisRange::new(0.0, 1.0),
            Some((min, max)) if min == max => AxisRange::new(min - 1.0, max + 1.0),
            Some((min, max)) => {
                let pad = (max - min) * Y_PADDING_RATIO;
                match config.kind {
                    ChartKind::Bar if min >= 0.0 => AxisRange::new(min, max + pad),
                    ChartKind::Bar if max <= 0.0 => AxisRange::new(min - pad, max),
                    _ => AxisRange::new(min - pad, max + pad),
                }
            }
        };

        Self { x, y, bounds_x: x, bounds_y: y }
    }

    /// Zoom by `factor` (>1 zooms in) around the anchor ratios.
    ///
    /// `anchor_y` is measured from the bottom of the plot.
    pub fn zoom(&mut self, factor: f64, anchor_x: f64, anchor_y: f64, mode: ZoomMode) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchor_x = anchor_x.clamp(0.0, 1.0);
        let anchor_y = anchor_y.clamp(0.0, 1.0);
        if mode.zooms_x() {
            self.x = self.x.zoomed(factor, anchor_x, MIN_VISIBLE_POINTS, self.bounds_x);
        }
        if mode.zooms_y() {
            let min_span = self.bounds_y.span() / 100.0;
            self.y = self.y.zoomed(factor, anchor_y, min_span, self.bounds_y);
        }
    }

    pub fn reset(&mut self) {
        self.x = self.bounds_x;
        self.y = self.bounds_y;
    }

    pub fn is_zoomed(&self) -> bool {
        self.x != self.bounds_x || self.y != self.bounds_y
    }

    /// Indices to draw: everything inside the window plus one neighbour each side.
    pub fn visible_indices(&self, len: usize) -> Range<usize> {
        if len == 0 {
            return 0..0;
        }
        let start = (self.x.min.floor() - 1.0).max(0.0) as usize;
        let end = ((self.x.max.ceil() + 1.0).max(0.0) as usize).min(len - 1);
        start.min(end)..end + 1
    }

    /// Tooltip target for a pointer at `x_ratio` across the plot.
    ///
    /// With `intersect: false` the nearest point along x always wins; with
    /// `intersect: true` the pointer must sit within a quarter slot of it.
    pub fn hit_test(&self, interaction: Interaction, x_ratio: f64, len: usize) -> Option<usize> {
        if len == 0 || !x_ratio.is_finite() {
            return None;
        }
        let position = self.x.value_at(x_ratio);
        let index = position.round().clamp(0.0, (len - 1) as f64);
        if interaction.intersect && (position - index).abs() > 0.25 {
            return None;
        }
        Some(index as usize)
    }
}

/// Every how many labels one is drawn so that at most `max_labels` fit.
pub fn label_step(visible: usize, max_labels: usize) -> usize {
    if max_labels == 0 {
        return visible.max(1);
    }
    visible.div_ceil(max_labels).max(1)
}

/// Control points for a smoothed line segment through `current`.
///
/// Neighbour-distance weighted spline; `tension == 0` yields a straight polyline.
pub fn spline_control_points(
    previous: (f64, f64),
    current: (f64, f64),
    next: (f64, f64),
    tension: f64,
) -> ((f64, f64), (f64, f64)) {
    let distance = |a: (f64, f64), b: (f64, f64)| ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
    let d01 = distance(previous, current);
    let d12 = distance(current, next);
    let total = d01 + d12;
    if total == 0.0 {
        return (current, current);
    }
    let fa = tension * d01 / total;
    let fb = tension * d12 / total;
    let dx = next.0 - previous.0;
    let dy = next.1 - previous.1;
    (
        (current.0 - fa * dx, current.1 - fa * dy),
        (current.0 + fb * dx, current.1 + fb * dy),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{TimeSeries, TimeSeriesPoint};

    fn line(values: &[f64]) -> ChartConfig {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(format!("d{i}"), *v))
            .collect::<Vec<_>>();
        ChartConfig::price_chart(&TimeSeries::new(points))
    }

    #[test]
    fn fit_pads_values() {
        let window = ZoomWindow::fit(&line(&[100.0, 120.0, 110.0]));
        assert_eq!(window.x, AxisRange::new(0.0, 2.0));
        assert!((window.y.min - 99.0).abs() < 1e-9);
        assert!((window.y.max - 121.0).abs() < 1e-9);
        assert!(!window.is_zoomed());
    }

    #[test]
    fn zoom_keeps_anchor_and_resets() {
        let values: Vec<f64> = (0..101).map(|v| v as f64).collect();
        let mut window = ZoomWindow::fit(&line(&values));
        window.zoom(2.0, 0.5, 0.5, ZoomMode::X);
        assert!((window.x.span() - 50.0).abs() < 1e-9);
        assert!((window.x.value_at(0.5) - 50.0).abs() < 1e-9);
        assert!(window.is_zoomed());
        window.reset();
        assert!(!window.is_zoomed());
    }

    #[test]
    fn zoom_out_never_exceeds_bounds() {
        let mut window = ZoomWindow::fit(&line(&[1.0, 2.0, 3.0, 4.0]));
        window.zoom(0.1, 0.9, 0.1, ZoomMode::XY);
        assert_eq!(window.x, AxisRange::new(0.0, 3.0));
        assert!(!window.is_zoomed());
    }

    #[test]
    fn nearest_point_wins_without_intersect() {
        let window = ZoomWindow::fit(&line(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        let proximity = Interaction { intersect: false };
        assert_eq!(window.hit_test(proximity, 0.0, 5), Some(0));
        assert_eq!(window.hit_test(proximity, 0.6, 5), Some(2));
        assert_eq!(window.hit_test(proximity, 1.0, 5), Some(4));
        assert_eq!(window.hit_test(proximity, 0.5, 0), None);

        let exact = Interaction { intersect: true };
        assert_eq!(window.hit_test(exact, 0.125, 5), None);
        assert_eq!(window.hit_test(exact, 0.25, 5), Some(1));
    }

    #[test]
    fn visible_indices_include_neighbours() {
        let values: Vec<f64> = (0..10).map(|v| v as f64).collect();
        let mut window = ZoomWindow::fit(&line(&values));
        assert_eq!(window.visible_indices(10), 0..10);
        window.zoom(3.0, 0.5, 0.5, ZoomMode::X);
        let range = window.visible_indices(10);
        assert!(range.start >= 1 && range.end <= 9);
        assert_eq!(window.visible_indices(0), 0..0);
    }

    #[test]
    fn label_thinning() {
        assert_eq!(label_step(250, 10), 25);
        assert_eq!(label_step(5, 10), 1);
        assert_eq!(label_step(0, 10), 1);
    }

    #[test]
    fn flat_spline_is_straight() {
        let (a, b) = spline_control_points((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), 0.0);
        assert_eq!(a, (1.0, 1.0));
        assert_eq!(b, (1.0, 1.0));
    }
}
