use std::cell::RefCell;
use std::rc::Rc;

use super::render_adapter::{ChartBackend, RenderAdapter};
use crate::domain::{
    chart::{ChartConfig, SurfaceId},
    errors::{FetchError, FetchResult, Stage},
    logging::{LogComponent, LogLevel, get_logger},
    market_data::{Symbol, TimeSeries},
    predictor::{Artifact, ResourceFactory, RunContext, ViewStateController},
};
use crate::infrastructure::http::{BinaryPayload, FetchClient, HttpTransport};

/// What happened to one stage's result.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// Stored in view state (and drawn, for series).
    Applied,
    /// Fetch failed; the message went to the error slot.
    Failed(FetchError),
    /// The run was superseded before the result arrived.
    Discarded,
}

impl StageOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, StageOutcome::Applied)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub context: RunContext,
    pub info: StageOutcome,
    pub price_series: StageOutcome,
    pub daily_returns: StageOutcome,
    pub prediction: StageOutcome,
}

impl RunReport {
    pub fn outcomes(&self) -> [(Stage, &StageOutcome); 4] {
        [
            (Stage::StockInfo, &self.info),
            (Stage::PriceSeries, &self.price_series),
            (Stage::DailyReturn, &self.daily_returns),
            (Stage::Prediction, &self.prediction),
        ]
    }

    pub fn failures(&self) -> Vec<&FetchError> {
        self.outcomes()
            .into_iter()
            .filter_map(|(_, outcome)| match outcome {
                StageOutcome::Failed(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    pub fn all_applied(&self) -> bool {
        self.outcomes().iter().all(|(_, outcome)| outcome.is_applied())
    }
}

/// Runs the four-stage fetch pipeline for a symbol.
///
/// Stage 1 and 2 are issued in sequence, 3a/3b concurrently. Each result is
/// applied as soon as it resolves, tagged with the run's generation so that a
/// superseded run cannot write into the current view.
pub struct PipelineOrchestrator<T: HttpTransport, B: ChartBackend> {
    client: Rc<FetchClient<T>>,
    state: Rc<RefCell<ViewStateController>>,
    charts: Rc<RefCell<RenderAdapter<B>>>,
    resources: Rc<dyn ResourceFactory>,
}

impl<T: HttpTransport, B: ChartBackend> Clone for PipelineOrchestrator<T, B> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            state: self.state.clone(),
            charts: self.charts.clone(),
            resources: self.resources.clone(),
        }
    }
}

impl<T: HttpTransport, B: ChartBackend> PipelineOrchestrator<T, B> {
    pub fn new(
        client: Rc<FetchClient<T>>,
        state: Rc<RefCell<ViewStateController>>,
        charts: Rc<RefCell<RenderAdapter<B>>>,
        resources: Rc<dyn ResourceFactory>,
    ) -> Self {
        Self { client, state, charts, resources }
    }

    pub fn state(&self) -> &Rc<RefCell<ViewStateController>> {
        &self.state
    }

    pub fn charts(&self) -> &Rc<RefCell<RenderAdapter<B>>> {
        &self.charts
    }

    /// Open a new run. Artifacts of the previous run disappear immediately.
    pub fn submit(&self, symbol: Symbol) -> RunContext {
        let ctx = self.state.borrow_mut().begin_run(symbol);
        // The previous run's charts go with its data.
        self.charts.borrow_mut().release_all();
        ctx
    }

    pub async fn submit_and_run(&self, symbol: Symbol) -> RunReport {
        let ctx = self.submit(symbol);
        self.run(ctx).await
    }

    pub async fn run(&self, ctx: RunContext) -> RunReport {
        get_logger().info(
            LogComponent::Application("Pipeline"),
            &format!("🚀 Run #{} for {}", ctx.generation, ctx.symbol),
        );

        let info = match self.client.stock_info(&ctx.symbol).await {
            Ok(record) => self.apply(&ctx, Artifact::Info(record)),
            Err(err) => self.fail(&ctx, err),
        };

        let prices = self.client.price_series(&ctx.symbol).await;
        let price_series = self.settle_series(&ctx, SurfaceId::PriceChart, prices);

        // 3a and 3b are in flight together; each settles as soon as it resolves.
        let returns = async {
            let result = self.client.daily_returns(&ctx.symbol).await;
            self.settle_series(&ctx, SurfaceId::DailyReturnChart, result)
        };
        let prediction = async {
            let result = self.client.prediction_image(&ctx.symbol).await;
            self.settle_prediction(&ctx, result)
        };
        let (daily_returns, prediction) = futures::join!(returns, prediction);

        let report = RunReport { context: ctx, info, price_series, daily_returns, prediction };
        self.log_report(&report);
        report
    }

    fn apply(&self, ctx: &RunContext, artifact: Artifact) -> StageOutcome {
        if self.state.borrow_mut().apply(ctx, artifact) {
            StageOutcome::Applied
        } else {
            StageOutcome::Discarded
        }
    }

    fn fail(&self, ctx: &RunContext, err: FetchError) -> StageOutcome {
        if self.state.borrow_mut().record_error(ctx, err.to_string()) {
            get_logger().error(
                LogComponent::Application("Pipeline"),
                &format!("❌ Run #{}: {}", ctx.generation, err),
            );
            StageOutcome::Failed(err)
        } else {
            StageOutcome::Discarded
        }
    }

    fn settle_series(&self, ctx: &RunContext, surface: SurfaceId, result: FetchResult<TimeSeries>) -> StageOutcome {
        let series = match result {
            Ok(series) => series,
            Err(err) => return self.fail(ctx, err),
        };

        let (config, artifact) = match surface {
            SurfaceId::PriceChart => (ChartConfig::price_chart(&series), Artifact::PriceSeries(series)),
            SurfaceId::DailyReturnChart => {
                (ChartConfig::daily_return_chart(&series), Artifact::DailyReturns(series))
            }
        };

        let outcome = self.apply(ctx, artifact);
        if outcome.is_applied() {
            let rendered = self.charts.borrow_mut().render(surface, config);
            if let Err(err) = rendered {
                get_logger().error(
                    LogComponent::Application("Pipeline"),
                    &format!("Failed to draw {}: {}", surface, err),
                );
                self.state.borrow_mut().record_error(ctx, err.to_string());
            }
        }
        outcome
    }

    fn settle_prediction(&self, ctx: &RunContext, result: FetchResult<BinaryPayload>) -> StageOutcome {
        let blob = match result {
            Ok(blob) => blob,
            Err(err) => return self.fail(ctx, err),
        };

        // Stale runs never get an object URL.
        if !self.state.borrow().is_current(ctx) {
            return StageOutcome::Discarded;
        }

        match self.resources.create(&blob.bytes, &blob.content_type) {
            Ok(handle) => self.apply(ctx, Artifact::Prediction(handle)),
            Err(err) => self.fail(ctx, FetchError::decode(Stage::Prediction, err.to_string())),
        }
    }

    fn log_report(&self, report: &RunReport) {
        let summary = report
            .outcomes()
            .iter()
            .map(|(stage, outcome)| {
                let label = match outcome {
                    StageOutcome::Applied => "ok",
                    StageOutcome::Failed(_) => "failed",
                    StageOutcome::Discarded => "stale",
                };
                format!("{}={}", stage.path().trim_start_matches('/'), label)
            })
            .collect::<Vec<_>>()
            .join(" ");

        get_logger().log_with_metadata(
            LogLevel::Info,
            LogComponent::Application("Pipeline"),
            &format!("🏁 Run #{} ({}) finished", report.context.generation, report.context.symbol),
            &summary,
        );
    }
}

impl<T, B> PipelineOrchestrator<T, B>
where
    T: HttpTransport + 'static,
    B: ChartBackend + 'static,
{
    /// Open a run and drive it on the local executor.
    pub fn spawn(&self, symbol: Symbol) -> RunContext {
        let ctx = self.submit(symbol);
        let pipeline = self.clone();
        let run_ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            pipeline.run(run_ctx).await;
        });
        ctx
    }
}
