use leptos::*;

use super::stock_form::StockInputForm;
use crate::{
    app::AppCtx,
    domain::{
        chart::SurfaceId,
        logging::LogComponent,
        market_data::Symbol,
        predictor::RunPhase,
    },
    log_debug,
};

#[component]
pub fn InputView(ctx: AppCtx) -> impl IntoView {
    let on_submit = Callback::new(move |symbol: Symbol| ctx.submit(symbol));

    view! {
        <section class="input-page">
            <h1>"Stock Predictor"</h1>
            <p>"Enter a ticker to see its price history, daily returns and a price forecast."</p>
            <StockInputForm on_submit=on_submit />
        </section>
    }
}

/// Results of the current run. Leaving the view disposes its charts and
/// prediction image and makes in-flight stages stale.
#[component]
pub fn PredictorView(ctx: AppCtx) -> impl IntoView {
    let snapshot = ctx.predictor;

    let pipeline = ctx.pipeline.clone();
    on_cleanup(move || {
        log_debug!(LogComponent::Presentation("Predictor"), "View unmounted, releasing charts");
        pipeline.charts().borrow_mut().release_all();
        pipeline.state().borrow_mut().reset();
    });

    let on_submit = Callback::new(move |symbol: Symbol| ctx.submit(symbol));

    let heading = move || snapshot.with(|s| s.symbol.clone()).unwrap_or_default();
    let loading = move || snapshot.with(|s| s.phase == Some(RunPhase::Submitted));
    let info = move || {
        snapshot.with(|s| s.info.clone()).map(|record| {
            view! {
                <div class="stock-info">
                    <h2>"Fetched Stock Information:"</h2>
                    {record
                        .display_rows()
                        .into_iter()
                        .map(|(label, value)| view! { <div>{label}": "{value}</div> })
                        .collect_view()}
                </div>
            }
        })
    };
    let error = move || {
        snapshot
            .with(|s| s.error.clone())
            .map(|message| view! { <div class="error">"Error: "{message}</div> })
    };
    let prediction = move || {
        snapshot.with(|s| s.prediction_url.clone()).map(|url| {
            view! {
                <h2 class="graph-title">"Predictions"</h2>
                <img class="prediction" src=url alt="Prediction Graph" />
            }
        })
    };

    view! {
        <section class="predictor">
            <StockInputForm on_submit=on_submit />
            <Show when=move || snapshot.with(|s| s.submitted)>
                <h1>{heading}</h1>
                <Show when=loading>
                    <div class="status">"Loading…"</div>
                </Show>
                {info}
                <h1 class="graph-title">"Stock Price"</h1>
                {error}
                <div class="canvas-container">
                    <canvas id=SurfaceId::PriceChart.element_id().to_string() />
                </div>
                <h2 class="graph-title">"Daily Return Histogram"</h2>
                <div class="canvas-container">
                    <canvas id=SurfaceId::DailyReturnChart.element_id().to_string() />
                </div>
                {prediction}
            </Show>
        </section>
    }
}
