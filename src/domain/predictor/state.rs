use derive_more::Display;

use super::resource::ResourceHandle;
use crate::domain::{
    logging::{LogComponent, get_logger},
    market_data::{StockInfoRecord, Symbol, TimeSeries},
};

/// Identity of one pipeline run. Results carry it back so stale ones can be rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub generation: u64,
    pub symbol: Symbol,
}

/// A fetched result ready to be stored.
#[derive(Debug)]
pub enum Artifact {
    Info(StockInfoRecord),
    PriceSeries(TimeSeries),
    DailyReturns(TimeSeries),
    Prediction(ResourceHandle),
}

/// Notification sent to subscribers after every accepted mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StateChange {
    Submitted,
    InfoLoaded,
    PriceSeriesLoaded,
    DailyReturnsLoaded,
    PredictionLoaded,
    Errored,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RunPhase {
    Idle,
    Submitted,
    Populated,
    Errored,
}

/// What the predictor view shows.
#[derive(Debug, Default)]
pub struct PredictorState {
    symbol: Option<Symbol>,
    submitted: bool,
    generation: u64,
    info: Option<StockInfoRecord>,
    price_series: TimeSeries,
    daily_returns: TimeSeries,
    error: Option<String>,
    prediction: Option<ResourceHandle>,
}

impl PredictorState {
    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn submitted(&self) -> bool {
        self.submitted
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn info(&self) -> Option<&StockInfoRecord> {
        self.info.as_ref()
    }

    pub fn price_series(&self) -> &TimeSeries {
        &self.price_series
    }

    pub fn daily_returns(&self) -> &TimeSeries {
        &self.daily_returns
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn prediction_url(&self) -> Option<&str> {
        self.prediction.as_ref().map(ResourceHandle::url)
    }

    pub fn phase(&self) -> RunPhase {
        if !self.submitted {
            RunPhase::Idle
        } else if self.error.is_some() {
            RunPhase::Errored
        } else if self.has_artifacts() {
            RunPhase::Populated
        } else {
            RunPhase::Submitted
        }
    }

    fn has_artifacts(&self) -> bool {
        self.info.is_some()
            || !self.price_series.is_empty()
            || !self.daily_returns.is_empty()
            || self.prediction.is_some()
    }

    fn clear_artifacts(&mut self) {
        self.info = None;
        self.price_series = TimeSeries::default();
        self.daily_returns = TimeSeries::default();
        self.error = None;
        if let Some(previous) = self.prediction.take() {
            previous.release();
        }
    }
}

/// Owned copy of the displayable state, cheap enough to push into UI signals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictorSnapshot {
    pub symbol: Option<String>,
    pub submitted: bool,
    pub generation: u64,
    pub info: Option<StockInfoRecord>,
    pub error: Option<String>,
    pub prediction_url: Option<String>,
    pub price_points: usize,
    pub return_points: usize,
    pub phase: Option<RunPhase>,
}

impl From<&PredictorState> for PredictorSnapshot {
    fn from(state: &PredictorState) -> Self {
        Self {
            symbol: state.symbol().map(|s| s.value().to_string()),
            submitted: state.submitted(),
            generation: state.generation(),
            info: state.info().cloned(),
            error: state.error().map(str::to_string),
            prediction_url: state.prediction_url().map(str::to_string),
            price_points: state.price_series().len(),
            return_points: state.daily_returns().len(),
            phase: Some(state.phase()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u32);

type Subscriber = Box<dyn Fn(&PredictorState, StateChange)>;

/// Single writer of [`PredictorState`].
///
/// Every write names the run it belongs to; writes from a run that is no longer
/// current are dropped. Subscribers are called synchronously and must not
/// re-enter the controller.
#[derive(Default)]
pub struct ViewStateController {
    state: PredictorState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u32,
}

impl ViewStateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PredictorState {
        &self.state
    }

    pub fn snapshot(&self) -> PredictorSnapshot {
        PredictorSnapshot::from(&self.state)
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&PredictorState, StateChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Start a new run: bump the generation and clear everything the previous run left.
    pub fn begin_run(&mut self, symbol: Symbol) -> RunContext {
        self.state.generation += 1;
        self.state.clear_artifacts();
        self.state.symbol = Some(symbol.clone());
        self.state.submitted = true;

        get_logger().debug(
            LogComponent::Domain("ViewState"),
            &format!("Run #{} started for {}", self.state.generation, symbol),
        );
        self.notify(StateChange::Submitted);

        RunContext { generation: self.state.generation, symbol }
    }

    pub fn is_current(&self, ctx: &RunContext) -> bool {
        self.state.submitted && ctx.generation == self.state.generation
    }

    /// Store an artifact of `ctx`'s run. Returns `false` (and drops it) when stale.
    pub fn apply(&mut self, ctx: &RunContext, artifact: Artifact) -> bool {
        if !self.is_current(ctx) {
            self.log_stale(ctx, "artifact");
            return false;
        }

        let change = match artifact {
            Artifact::Info(record) => {
                self.state.info = Some(record);
                StateChange::InfoLoaded
            }
            Artifact::PriceSeries(series) => {
                self.state.price_series = series;
                StateChange::PriceSeriesLoaded
            }
            Artifact::DailyReturns(series) => {
                self.state.daily_returns = series;
                StateChange::DailyReturnsLoaded
            }
            Artifact::Prediction(handle) => {
                if let Some(previous) = self.state.prediction.replace(handle) {
                    previous.release();
                }
                StateChange::PredictionLoaded
            }
        };
        self.notify(change);
        true
    }

    /// Overwrite the error slot for `ctx`'s run. Last write wins.
    pub fn record_error(&mut self, ctx: &RunContext, message: impl Into<String>) -> bool {
        if !self.is_current(ctx) {
            self.log_stale(ctx, "error");
            return false;
        }
        self.state.error = Some(message.into());
        self.notify(StateChange::Errored);
        true
    }

    /// Back to idle (view unmount). In-flight runs become stale.
    pub fn reset(&mut self) {
        self.state.generation += 1;
        self.state.clear_artifacts();
        self.state.symbol = None;
        self.state.submitted = false;
        self.notify(StateChange::Reset);
    }

    fn notify(&self, change: StateChange) {
        for (_, subscriber) in &self.subscribers {
            subscriber(&self.state, change);
        }
    }

    fn log_stale(&self, ctx: &RunContext, what: &str) {
        get_logger().debug(
            LogComponent::Domain("ViewState"),
            &format!(
                "Discarding stale {} of run #{} ({}); current run is #{}",
                what, ctx.generation, ctx.symbol, self.state.generation
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::TimeSeriesPoint;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn series(label: &str) -> TimeSeries {
        TimeSeries::new(vec![TimeSeriesPoint::new(label, 1.0)])
    }

    #[test]
    fn phases_follow_run() {
        let mut controller = ViewStateController::new();
        assert_eq!(controller.state().phase(), RunPhase::Idle);

        let ctx = controller.begin_run(Symbol::from("AAA"));
        assert_eq!(controller.state().phase(), RunPhase::Submitted);

        assert!(controller.apply(&ctx, Artifact::PriceSeries(series("a"))));
        assert_eq!(controller.state().phase(), RunPhase::Populated);

        assert!(controller.record_error(&ctx, "first"));
        assert!(controller.record_error(&ctx, "second"));
        assert_eq!(controller.state().phase(), RunPhase::Errored);
        assert_eq!(controller.state().error(), Some("second"));
        assert_eq!(controller.state().price_series().len(), 1);
    }

    #[test]
    fn new_run_clears_and_rejects_stale_writes() {
        let mut controller = ViewStateController::new();
        let first = controller.begin_run(Symbol::from("AAA"));
        controller.apply(&first, Artifact::Info(StockInfoRecord::default()));
        controller.record_error(&first, "boom");

        let second = controller.begin_run(Symbol::from("BBB"));
        assert!(controller.state().info().is_none());
        assert!(controller.state().error().is_none());

        assert!(!controller.apply(&first, Artifact::PriceSeries(series("stale"))));
        assert!(!controller.record_error(&first, "stale"));
        assert!(controller.state().price_series().is_empty());
        assert!(controller.state().error().is_none());
        assert!(controller.is_current(&second));
    }

    #[test]
    fn superseded_prediction_is_released() {
        let released = Rc::new(RefCell::new(Vec::<String>::new()));
        let handle = |url: &str| {
            let log = released.clone();
            ResourceHandle::new(url, move |u| log.borrow_mut().push(u.to_string()))
        };

        let mut controller = ViewStateController::new();
        let ctx = controller.begin_run(Symbol::from("AAA"));
        controller.apply(&ctx, Artifact::Prediction(handle("blob:1")));
        controller.apply(&ctx, Artifact::Prediction(handle("blob:2")));
        assert_eq!(*released.borrow(), vec!["blob:1"]);
        assert_eq!(controller.state().prediction_url(), Some("blob:2"));

        controller.begin_run(Symbol::from("AAA"));
        assert_eq!(*released.borrow(), vec!["blob:1", "blob:2"]);
        assert_eq!(controller.state().prediction_url(), None);
    }

    #[test]
    fn subscribers_see_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let calls = Rc::new(Cell::new(0));
        let mut controller = ViewStateController::new();
        let log = seen.clone();
        let id = controller.subscribe(move |state, change| log.borrow_mut().push((change, state.generation())));

        let ctx = controller.begin_run(Symbol::from("AAA"));
        controller.apply(&ctx, Artifact::DailyReturns(series("x")));
        assert_eq!(
            *seen.borrow(),
            vec![(StateChange::Submitted, 1), (StateChange::DailyReturnsLoaded, 1)]
        );

        controller.unsubscribe(id);
        let counter = calls.clone();
        controller.subscribe(move |_, _| counter.set(counter.get() + 1));
        controller.reset();
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(calls.get(), 1);
        assert!(!controller.is_current(&ctx));
        assert_eq!(controller.snapshot().phase, Some(RunPhase::Idle));
    }
}
