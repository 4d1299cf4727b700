mod common;

use common::*;
use futures::executor::block_on;
use stock_predictor_wasm::application::StageOutcome;
use stock_predictor_wasm::domain::{
    errors::{FetchCause, FetchError, Stage},
    market_data::Symbol,
    predictor::RunPhase,
};

#[test]
fn failed_info_keeps_later_stages() {
    let h = Harness::new();
    let t = h.transport();
    t.respond(url(Stage::StockInfo, "AAA"), status(404));
    t.respond(url(Stage::PriceSeries, "AAA"), price_body("AAA"));
    t.respond(url(Stage::DailyReturn, "AAA"), returns_body());
    t.respond(url(Stage::Prediction, "AAA"), png(b"img"));

    let report = block_on(h.pipeline.submit_and_run(Symbol::from("AAA")));
    assert_eq!(report.info, StageOutcome::Failed(FetchError::status(Stage::StockInfo, 404)));
    assert!(report.price_series.is_applied());
    assert!(report.daily_returns.is_applied());
    assert!(report.prediction.is_applied());

    let state = h.pipeline.state();
    let state = state.borrow();
    let state = state.state();
    assert_eq!(state.error(), Some("Failed to fetch stock information: HTTP 404"));
    assert_eq!(state.phase(), RunPhase::Errored);
    assert!(state.info().is_none());
    assert_eq!(state.price_series().len(), 2);
    assert_eq!(state.prediction_url(), Some("blob:mock/1"));
    assert_eq!(h.journal().len(), 2);
}

#[test]
fn transport_and_decode_failures_are_classified() {
    let h = Harness::new();
    let t = h.transport();
    t.respond(url(Stage::StockInfo, "AAA"), Err("connection refused".to_string()));
    t.respond(url(Stage::PriceSeries, "AAA"), json(r#"{"not": "a series"}"#));
    t.respond(url(Stage::DailyReturn, "AAA"), json("not json at all"));
    t.respond(url(Stage::Prediction, "AAA"), png(b""));

    let report = block_on(h.pipeline.submit_and_run(Symbol::from("AAA")));
    assert_eq!(report.failures().len(), 4);
    assert_eq!(
        report.info,
        StageOutcome::Failed(FetchError::transport(Stage::StockInfo, "connection refused"))
    );
    for outcome in [&report.price_series, &report.daily_returns, &report.prediction] {
        match outcome {
            StageOutcome::Failed(err) => assert!(matches!(err.cause, FetchCause::Decode(_)), "{err}"),
            other => panic!("expected a decode failure, got {other:?}"),
        }
    }

    assert!(h.journal().is_empty());
    assert!(h.resources.created.borrow().is_empty());
}

#[test]
fn last_error_wins() {
    let h = Harness::new();
    let t = h.transport();
    t.respond(url(Stage::StockInfo, "AAA"), status(500));
    t.respond(url(Stage::PriceSeries, "AAA"), price_body("AAA"));
    t.respond(url(Stage::DailyReturn, "AAA"), returns_body());
    t.respond(url(Stage::Prediction, "AAA"), Err("timed out after 30000 ms".to_string()));

    block_on(h.pipeline.submit_and_run(Symbol::from("AAA")));
    assert_eq!(
        h.pipeline.state().borrow().state().error(),
        Some("Failed to fetch prediction image: network error (timed out after 30000 ms)")
    );
}

#[test]
fn unscripted_endpoints_fail_with_not_found() {
    let h = Harness::new();
    let report = block_on(h.pipeline.submit_and_run(Symbol::from("NOPE")));
    let codes: Vec<_> = report.failures().iter().map(|e| e.status_code()).collect();
    assert_eq!(codes, vec![Some(404); 4]);
    assert_eq!(h.pipeline.state().borrow().snapshot().phase, Some(RunPhase::Errored));
}
