use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use stock_predictor_wasm::domain::chart::{ChartConfig, Interaction, ZoomMode, ZoomWindow};
use stock_predictor_wasm::domain::market_data::{TimeSeries, TimeSeriesPoint};

fn price_config(values: &[i16]) -> ChartConfig {
    let points = values
        .iter()
        .enumerate()
        .map(|(i, v)| TimeSeriesPoint::new(format!("d{i}"), f64::from(*v) / 10.0))
        .collect::<Vec<_>>();
    ChartConfig::price_chart(&TimeSeries::new(points))
}

#[quickcheck]
fn zoom_never_leaves_data_bounds(values: Vec<i16>, steps: Vec<(u8, u8, u8)>) -> TestResult {
    if values.is_empty() {
        return TestResult::discard();
    }
    let config = price_config(&values);
    let fitted = ZoomWindow::fit(&config);
    let mut window = fitted;
    let eps = 1e-9 * (1.0 + fitted.x.span() + fitted.y.span());

    for (factor, ax, ay) in steps {
        let factor = 0.25 + f64::from(factor) / 64.0;
        window.zoom(factor, f64::from(ax) / 255.0, f64::from(ay) / 255.0, ZoomMode::XY);
        let inside = window.x.min >= fitted.x.min - eps
            && window.x.max <= fitted.x.max + eps
            && window.y.min >= fitted.y.min - eps
            && window.y.max <= fitted.y.max + eps;
        if !inside || window.x.span() <= 0.0 || window.y.span() <= 0.0 {
            return TestResult::failed();
        }
    }

    window.reset();
    TestResult::from_bool(window == fitted && !window.is_zoomed())
}

#[quickcheck]
fn tooltip_always_picks_a_point(len: u8, ratio: u8) -> TestResult {
    if len == 0 {
        return TestResult::discard();
    }
    let values = vec![1i16; len as usize];
    let window = ZoomWindow::fit(&price_config(&values));
    let hit = window.hit_test(Interaction::default(), f64::from(ratio) / 255.0, len as usize);
    TestResult::from_bool(hit.is_some_and(|i| i < len as usize))
}

#[test]
fn wheel_zoom_on_x_keeps_y() {
    let config = price_config(&[10, 20, 30, 40, 50, 60, 70, 80]);
    let mut window = ZoomWindow::fit(&config);
    let y = window.y;
    window.zoom(2.0, 0.5, 0.5, ZoomMode::X);
    assert!(window.is_zoomed());
    assert_eq!(window.y, y);
    assert!((window.x.span() - 3.5).abs() < 1e-9);
}

#[test]
fn chart_options_snapshot() {
    let config = price_config(&[1, 2, 3]);
    insta::assert_json_snapshot!(config.zoom, @r###"
    {
      "wheel": true,
      "pinch": true,
      "mode": "xy"
    }
    "###);
    insta::assert_json_snapshot!(config.interaction, @r###"
    {
      "intersect": false
    }
    "###);
    assert_eq!(ChartConfig::daily_return_chart(&TimeSeries::default()).zoom, None);
}
