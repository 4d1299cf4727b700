use std::cell::RefCell;
use std::rc::Rc;

use leptos::ev;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent};

use super::listeners::{EventListenerHandle, EventOptions, listen};
use crate::application::render_adapter::{ChartBackend, ChartInstance};
use crate::domain::{
    chart::{ChartConfig, ChartKind, SurfaceId, ZoomMode, ZoomOptions, ZoomWindow, label_step, spline_control_points},
    errors::{AppError, RenderingResult},
    logging::{LogComponent, get_logger},
};

const WHEEL_ZOOM_STEP: f64 = 1.1;
const MIN_LABEL_SPACING_PX: f64 = 80.0;
const Y_TICKS: usize = 5;
const BAR_FILL_RATIO: f64 = 0.8;
const TOOLTIP_BACKGROUND: &str = "rgba(0, 0, 0, 0.8)";
const HOVER_GUIDE: &str = "rgba(0, 0, 0, 0.2)";

/// Plot rectangle inside the canvas, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PlotArea {
    fn of(canvas_width: f64, canvas_height: f64, font_px: f64) -> Self {
        let (left, right, top, bottom) = (64.0, 16.0, 16.0, font_px + 16.0);
        Self {
            left,
            top,
            width: (canvas_width - left - right).max(1.0),
            height: (canvas_height - top - bottom).max(1.0),
        }
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    fn x_ratio(&self, x: f64) -> f64 {
        (x - self.left) / self.width
    }

    /// Measured from the bottom edge.
    fn y_ratio(&self, y: f64) -> f64 {
        (self.bottom() - y) / self.height
    }
}

fn format_tick(value: f64, span: f64) -> String {
    let decimals = if span >= 100.0 {
        0
    } else if span >= 1.0 {
        2
    } else {
        4
    };
    format!("{value:.decimals$}")
}

fn format_value(value: f64) -> String {
    if value.abs() < 1.0 { format!("{value:.4}") } else { format!("{value:.2}") }
}

fn css(color: &str) -> JsValue {
    JsValue::from_str(color)
}

/// Mutable drawing state shared between the chart and its listeners.
struct ChartSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    config: ChartConfig,
    window: ZoomWindow,
    hover: Option<usize>,
    pinch_distance: Option<f64>,
}

impl ChartSurface {
    fn plot(&self) -> PlotArea {
        PlotArea::of(
            self.canvas.width() as f64,
            self.canvas.height() as f64,
            self.config.scales.x.ticks.font_px as f64,
        )
    }

    fn x_px(&self, plot: &PlotArea, index: f64) -> f64 {
        plot.left + self.window.x.ratio_of(index) * plot.width
    }

    fn y_px(&self, plot: &PlotArea, value: f64) -> f64 {
        plot.bottom() - self.window.y.ratio_of(value) * plot.height
    }

    /// Canvas pixel under a viewport position (the canvas may be CSS-scaled).
    fn canvas_point(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        let scale_x = if rect.width() > 0.0 { self.canvas.width() as f64 / rect.width() } else { 1.0 };
        let scale_y = if rect.height() > 0.0 { self.canvas.height() as f64 / rect.height() } else { 1.0 };
        ((client_x - rect.x()) * scale_x, (client_y - rect.y()) * scale_y)
    }

    fn clear(&self) {
        self.context
            .clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
    }

    fn draw(&self) -> Result<(), JsValue> {
        self.clear();
        let plot = self.plot();

        if self.config.is_empty() {
            return self.draw_empty(&plot);
        }

        self.draw_y_axis(&plot)?;
        self.draw_x_axis(&plot)?;

        let ctx = &self.context;
        ctx.save();
        ctx.begin_path();
        ctx.rect(plot.left, plot.top, plot.width, plot.height);
        ctx.clip();
        match self.config.kind {
            ChartKind::Line => self.draw_line(&plot),
            ChartKind::Bar => self.draw_bars(&plot),
        }
        ctx.restore();

        self.draw_tooltip(&plot)
    }

    fn draw_empty(&self, plot: &PlotArea) -> Result<(), JsValue> {
        let ctx = &self.context;
        ctx.set_font("14px sans-serif");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_fill_style(&css(&self.config.scales.y.ticks.color));
        ctx.fill_text("No data", plot.left + plot.width / 2.0, plot.top + plot.height / 2.0)
    }

    fn draw_y_axis(&self, plot: &PlotArea) -> Result<(), JsValue> {
        let axis = &self.config.scales.y;
        let ctx = &self.context;
        ctx.set_font(&format!("{}px sans-serif", axis.ticks.font_px));
        ctx.set_text_align("right");
        ctx.set_text_baseline("middle");

        for value in self.window.y.ticks(Y_TICKS) {
            let y = self.y_px(plot, value);
            if let Some(grid) = &axis.grid_color {
                ctx.set_stroke_style(&css(grid));
                ctx.set_line_width(1.0);
                ctx.begin_path();
                ctx.move_to(plot.left, y);
                ctx.line_to(plot.right(), y);
                ctx.stroke();
            }
            ctx.set_fill_style(&css(&axis.ticks.color));
            ctx.fill_text(&format_tick(value, self.window.y.span()), plot.left - 8.0, y)?;
        }
        Ok(())
    }

    fn draw_x_axis(&self, plot: &PlotArea) -> Result<(), JsValue> {
        let axis = &self.config.scales.x;
        let ctx = &self.context;
        ctx.set_font(&format!("{}px sans-serif", axis.ticks.font_px));
        ctx.set_text_align("center");
        ctx.set_text_baseline("top");

        let visible = self.window.visible_indices(self.config.len());
        let max_labels = (plot.width / MIN_LABEL_SPACING_PX).floor().max(1.0) as usize;
        let step = label_step(visible.len(), max_labels);

        for index in visible.step_by(step) {
            let x = self.x_px(plot, index as f64);
            if x < plot.left - 0.5 || x > plot.right() + 0.5 {
                continue;
            }
            if let Some(grid) = &axis.grid_color {
                ctx.set_stroke_style(&css(grid));
                ctx.set_line_width(1.0);
                ctx.begin_path();
                ctx.move_to(x, plot.top);
                ctx.line_to(x, plot.bottom());
                ctx.stroke();
            }
            if let Some(label) = self.config.labels.get(index) {
                ctx.set_fill_style(&css(&axis.ticks.color));
                ctx.fill_text(label.as_str(), x, plot.bottom() + 6.0)?;
            }
        }
        Ok(())
    }

    fn draw_line(&self, plot: &PlotArea) {
        let style = &self.config.dataset.style;
        let data = &self.config.dataset.data;
        let points: Vec<(f64, f64)> = self
            .window
            .visible_indices(data.len())
            .filter(|&i| data[i].is_finite())
            .map(|i| (self.x_px(plot, i as f64), self.y_px(plot, data[i])))
            .collect();
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return;
        };

        let ctx = &self.context;
        if style.fill {
            ctx.begin_path();
            trace_path(ctx, &points, style.tension);
            ctx.line_to(last.0, plot.bottom());
            ctx.line_to(first.0, plot.bottom());
            ctx.close_path();
            ctx.set_fill_style(&css(&style.background_color));
            ctx.fill();
        }

        if let Some(border) = &style.border_color {
            if style.border_width > 0.0 {
                ctx.begin_path();
                trace_path(ctx, &points, style.tension);
                ctx.set_stroke_style(&css(border));
                ctx.set_line_width(style.border_width);
                ctx.stroke();
            }
        }

        if style.point_radius > 0.0 {
            ctx.set_fill_style(&css(style.border_color.as_deref().unwrap_or(&style.background_color)));
            for (x, y) in &points {
                ctx.begin_path();
                if ctx.arc(*x, *y, style.point_radius, 0.0, std::f64::consts::TAU).is_ok() {
                    ctx.fill();
                }
            }
        }
    }

    fn draw_bars(&self, plot: &PlotArea) {
        let style = &self.config.dataset.style;
        let data = &self.config.dataset.data;
        let ctx = &self.context;

        let bar_width = (plot.width / self.window.x.span() * BAR_FILL_RATIO).max(1.0);
        let zero = self.y_px(plot, 0.0_f64.clamp(self.window.y.min, self.window.y.max));
        let stroke = style.border_color.as_ref().filter(|_| style.border_width > 0.0);

        ctx.set_fill_style(&css(&style.background_color));
        if let Some(border) = stroke {
            ctx.set_stroke_style(&css(border));
            ctx.set_line_width(style.border_width);
        }

        for index in self.window.visible_indices(data.len()) {
            let value = data[index];
            if !value.is_finite() {
                continue;
            }
            let x = self.x_px(plot, index as f64) - bar_width / 2.0;
            let y = self.y_px(plot, value);
            let (top, height) = (y.min(zero), (y - zero).abs());
            ctx.fill_rect(x, top, bar_width, height);
            if stroke.is_some() {
                ctx.stroke_rect(x, top, bar_width, height);
            }
        }
    }

    fn draw_tooltip(&self, plot: &PlotArea) -> Result<(), JsValue> {
        let Some(index) = self.hover else {
            return Ok(());
        };
        let Some(value) = self.config.dataset.data.get(index).copied().filter(|v| v.is_finite()) else {
            return Ok(());
        };
        let x = self.x_px(plot, index as f64);
        if x < plot.left || x > plot.right() {
            return Ok(());
        }
        let y = self.y_px(plot, value).clamp(plot.top, plot.bottom());

        let ctx = &self.context;
        ctx.set_stroke_style(&css(HOVER_GUIDE));
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(x, plot.top);
        ctx.line_to(x, plot.bottom());
        ctx.stroke();

        let title = self.config.labels.get(index).map(|l| l.as_str()).unwrap_or_default();
        let body = format!("{}: {}", self.config.dataset.label, format_value(value));

        ctx.set_font("12px sans-serif");
        let text_width = ctx.measure_text(title)?.width().max(ctx.measure_text(&body)?.width());
        let (box_width, box_height) = (text_width + 16.0, 40.0);

        let mut box_x = x + 10.0;
        if box_x + box_width > plot.right() {
            box_x = x - 10.0 - box_width;
        }
        let box_y = (y - box_height / 2.0).min(plot.bottom() - box_height).max(plot.top);

        ctx.set_fill_style(&css(TOOLTIP_BACKGROUND));
        ctx.fill_rect(box_x, box_y, box_width, box_height);
        ctx.set_fill_style(&css("#fff"));
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        ctx.fill_text(title, box_x + 8.0, box_y + 6.0)?;
        ctx.fill_text(&body, box_x + 8.0, box_y + 22.0)
    }
}

/// Path through `points`; with tension each segment is a cubic bezier.
fn trace_path(ctx: &CanvasRenderingContext2d, points: &[(f64, f64)], tension: f64) {
    let Some(&(x0, y0)) = points.first() else {
        return;
    };
    ctx.move_to(x0, y0);

    for i in 1..points.len() {
        let (previous, current) = (points[i - 1], points[i]);
        if tension <= 0.0 {
            ctx.line_to(current.0, current.1);
            continue;
        }
        let before = if i >= 2 { points[i - 2] } else { previous };
        let after = points.get(i + 1).copied().unwrap_or(current);
        let (_, cp1) = spline_control_points(before, previous, current, tension);
        let (cp2, _) = spline_control_points(previous, current, after, tension);
        ctx.bezier_curve_to(cp1.0, cp1.1, cp2.0, cp2.1, current.0, current.1);
    }
}

fn redraw(surface: &Rc<RefCell<ChartSurface>>) {
    if let Err(e) = surface.borrow().draw() {
        get_logger().warn(LogComponent::Infrastructure("CanvasChart"), &format!("Redraw failed: {e:?}"));
    }
}

fn zoom_at(surface: &Rc<RefCell<ChartSurface>>, client_x: f64, client_y: f64, factor: f64, mode: ZoomMode) {
    {
        let mut s = surface.borrow_mut();
        let (x, y) = s.canvas_point(client_x, client_y);
        let plot = s.plot();
        if !plot.contains(x, y) {
            return;
        }
        s.window.zoom(factor, plot.x_ratio(x), plot.y_ratio(y), mode);
    }
    redraw(surface);
}

/// Distance between the first two touches and their midpoint.
fn touch_span(event: &TouchEvent) -> Option<(f64, (f64, f64))> {
    let touches = event.touches();
    if touches.length() < 2 {
        return None;
    }
    let (a, b) = (touches.get(0)?, touches.get(1)?);
    let (ax, ay) = (a.client_x() as f64, a.client_y() as f64);
    let (bx, by) = (b.client_x() as f64, b.client_y() as f64);
    let distance = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
    Some((distance, ((ax + bx) / 2.0, (ay + by) / 2.0)))
}

/// A chart drawn on a `<canvas>` with hover tooltip and optional wheel/pinch zoom.
pub struct CanvasChart {
    surface: SurfaceId,
    inner: Rc<RefCell<ChartSurface>>,
    listeners: Vec<EventListenerHandle>,
    disposed: bool,
}

impl CanvasChart {
    pub fn attach(surface: SurfaceId, canvas: HtmlCanvasElement, config: ChartConfig) -> RenderingResult<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|e| AppError::Rendering(format!("failed to get 2D context: {e:?}")))?
            .ok_or_else(|| AppError::Rendering("2D context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AppError::Rendering("failed to cast to 2D context".to_string()))?;

        let (client_width, client_height) = (canvas.client_width(), canvas.client_height());
        if client_width > 0 && client_height > 0 {
            canvas.set_width(client_width as u32);
            canvas.set_height(client_height as u32);
        }

        let zoom = config.zoom;
        let points = config.len();
        let inner = Rc::new(RefCell::new(ChartSurface {
            window: ZoomWindow::fit(&config),
            canvas: canvas.clone(),
            context,
            config,
            hover: None,
            pinch_distance: None,
        }));

        let mut chart = Self { surface, inner, listeners: Vec::new(), disposed: false };
        let target: &EventTarget = canvas.as_ref();
        chart.bind_hover(target)?;
        if let Some(zoom) = zoom {
            chart.bind_zoom(target, zoom)?;
        }

        chart
            .inner
            .borrow()
            .draw()
            .map_err(|e| AppError::Rendering(format!("failed to draw {surface}: {e:?}")))?;

        get_logger().debug(
            LogComponent::Infrastructure("CanvasChart"),
            &format!("🎨 Drew {} points on #{}", points, surface.element_id()),
        );
        Ok(chart)
    }

    fn bind_hover(&mut self, target: &EventTarget) -> RenderingResult<()> {
        let inner = self.inner.clone();
        self.listeners.push(listen(target, ev::mousemove, &EventOptions::default(), move |event: MouseEvent| {
            let hover = {
                let s = inner.borrow();
                let (x, y) = s.canvas_point(event.client_x() as f64, event.client_y() as f64);
                let plot = s.plot();
                if plot.contains(x, y) {
                    s.window.hit_test(s.config.interaction, plot.x_ratio(x), s.config.len())
                } else {
                    None
                }
            };
            let changed = {
                let mut s = inner.borrow_mut();
                std::mem::replace(&mut s.hover, hover) != hover
            };
            if changed {
                redraw(&inner);
            }
        })?);

        let inner = self.inner.clone();
        self.listeners.push(listen(target, ev::mouseleave, &EventOptions::default(), move |_: MouseEvent| {
            if inner.borrow_mut().hover.take().is_some() {
                redraw(&inner);
            }
        })?);
        Ok(())
    }

    fn bind_zoom(&mut self, target: &EventTarget, zoom: ZoomOptions) -> RenderingResult<()> {
        if zoom.wheel {
            let inner = self.inner.clone();
            self.listeners.push(listen(target, ev::wheel, &EventOptions::active(), move |event: WheelEvent| {
                event.prevent_default();
                let factor = if event.delta_y() < 0.0 { WHEEL_ZOOM_STEP } else { 1.0 / WHEEL_ZOOM_STEP };
                zoom_at(&inner, event.client_x() as f64, event.client_y() as f64, factor, zoom.mode);
            })?);
        }

        if zoom.pinch {
            let inner = self.inner.clone();
            self.listeners.push(listen(target, ev::touchstart, &EventOptions::default(), move |event: TouchEvent| {
                inner.borrow_mut().pinch_distance = touch_span(&event).map(|(distance, _)| distance);
            })?);

            let inner = self.inner.clone();
            self.listeners.push(listen(target, ev::touchmove, &EventOptions::active(), move |event: TouchEvent| {
                let Some((distance, (cx, cy))) = touch_span(&event) else {
                    return;
                };
                event.prevent_default();
                let previous = inner.borrow_mut().pinch_distance.replace(distance);
                if let Some(previous) = previous.filter(|d| *d > 0.0) {
                    zoom_at(&inner, cx, cy, distance / previous, zoom.mode);
                }
            })?);

            let inner = self.inner.clone();
            self.listeners.push(listen(target, ev::touchend, &EventOptions::default(), move |_: TouchEvent| {
                inner.borrow_mut().pinch_distance = None;
            })?);
        }

        let inner = self.inner.clone();
        self.listeners.push(listen(target, ev::dblclick, &EventOptions::default(), move |_: MouseEvent| {
            inner.borrow_mut().window.reset();
            redraw(&inner);
        })?);
        Ok(())
    }
}

impl ChartInstance for CanvasChart {
    fn surface(&self) -> SurfaceId {
        self.surface
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for mut listener in self.listeners.drain(..) {
            listener.remove();
        }
        self.inner.borrow().clear();
        get_logger().debug(
            LogComponent::Infrastructure("CanvasChart"),
            &format!("🧹 Disposed chart on #{}", self.surface.element_id()),
        );
    }
}

impl Drop for CanvasChart {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Finds surfaces by element id in the current document.
#[derive(Debug, Default, Clone, Copy)]
pub struct CanvasChartBackend;

impl CanvasChartBackend {
    pub fn new() -> Self {
        Self
    }

    fn find_canvas(surface: SurfaceId) -> Option<HtmlCanvasElement> {
        gloo::utils::document()
            .get_element_by_id(surface.element_id())
            .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
    }
}

impl ChartBackend for CanvasChartBackend {
    type Instance = CanvasChart;

    fn surface_available(&self, surface: SurfaceId) -> bool {
        Self::find_canvas(surface).is_some()
    }

    fn attach(&mut self, surface: SurfaceId, config: ChartConfig) -> RenderingResult<CanvasChart> {
        let canvas = Self::find_canvas(surface)
            .ok_or_else(|| AppError::Rendering(format!("canvas #{} not found", surface.element_id())))?;
        CanvasChart::attach(surface, canvas, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_area_leaves_room_for_ticks() {
        let plot = PlotArea::of(800.0, 400.0, 12.0);
        assert_eq!(plot.left, 64.0);
        assert_eq!(plot.width, 720.0);
        assert_eq!(plot.bottom(), 372.0);
        assert!(plot.contains(100.0, 100.0));
        assert!(!plot.contains(10.0, 100.0));
        assert_eq!(plot.x_ratio(plot.left + plot.width / 2.0), 0.5);
        assert_eq!(plot.y_ratio(plot.bottom()), 0.0);
    }

    #[test]
    fn tiny_canvas_keeps_positive_plot() {
        let plot = PlotArea::of(10.0, 10.0, 12.0);
        assert!(plot.width >= 1.0);
        assert!(plot.height >= 1.0);
    }

    #[test]
    fn tick_precision_follows_span() {
        assert_eq!(format_tick(1234.4, 500.0), "1234");
        assert_eq!(format_tick(12.346, 10.0), "12.35");
        assert_eq!(format_tick(0.01234, 0.05), "0.0123");
        assert_eq!(format_value(-0.012345), "-0.0123");
        assert_eq!(format_value(101.456), "101.46");
    }
}
