use std::cell::RefCell;
use std::rc::Rc;

use leptos::*;
use wasm_bindgen::JsValue;

use crate::{
    application::{PipelineOrchestrator, PortfolioService, RenderAdapter},
    config::AppConfig,
    domain::{
        logging::LogComponent,
        market_data::Symbol,
        portfolio::Portfolio,
        predictor::{PredictorSnapshot, ResourceFactory, ViewStateController},
        route::Route,
    },
    infrastructure::{
        http::{FetchClient, GlooTransport},
        rendering::CanvasChartBackend,
        services::BrowserObjectUrls,
    },
    log_info, log_warn,
    presentation::{InputView, PortfolioView, PredictorView},
};

pub type BrowserPipeline = PipelineOrchestrator<GlooTransport, CanvasChartBackend>;

const STYLES: &str = r#"
.stock-app {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    min-height: 100vh;
    background: #f7f9fb;
    color: #1f2933;
}

.navbar {
    display: flex;
    justify-content: space-between;
    align-items: center;
    height: 64px;
    padding: 0 24px;
    background: white;
    box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1);
}

.brand {
    border: none;
    background: transparent;
    font-size: 18px;
    font-weight: 700;
    cursor: pointer;
}

.nav-link {
    margin-left: 16px;
    padding: 6px 12px;
    border: none;
    border-radius: 6px;
    background: transparent;
    cursor: pointer;
}

.nav-link.active {
    background: rgba(0, 155, 255, 0.1);
    color: rgb(0, 155, 255);
}

.content {
    max-width: 1000px;
    margin: 0 auto;
    padding: 24px;
}

.stock-form, .portfolio-form {
    display: flex;
    gap: 8px;
    align-items: center;
    margin-bottom: 24px;
}

.stock-form input, .portfolio-form input {
    padding: 8px 12px;
    border: 1px solid #cbd2d9;
    border-radius: 6px;
}

.stock-form button, .portfolio-form button {
    padding: 8px 16px;
    border: none;
    border-radius: 6px;
    background: rgb(0, 155, 255);
    color: white;
    cursor: pointer;
}

.form-error, .error {
    color: #c53030;
}

.graph-title {
    margin: 24px 0 12px;
}

.canvas-container {
    position: relative;
    height: 400px;
    background: white;
    border-radius: 8px;
}

.canvas-container canvas {
    width: 100%;
    height: 100%;
    touch-action: none;
}

.prediction {
    max-width: 100%;
}

.portfolio-table {
    width: 100%;
    border-collapse: collapse;
    background: white;
}

.portfolio-table th, .portfolio-table td {
    padding: 8px 12px;
    border-bottom: 1px solid #e4e7eb;
    text-align: left;
}
"#;

/// Services and signals shared by every view; created once per mounted [`App`].
#[derive(Clone)]
pub struct AppCtx {
    pub pipeline: BrowserPipeline,
    pub portfolio_service: PortfolioService<GlooTransport>,
    pub predictor: RwSignal<PredictorSnapshot>,
    pub portfolio: RwSignal<Portfolio>,
    pub route: RwSignal<Route>,
}

impl AppCtx {
    pub fn new(config: &AppConfig, initial_route: Route) -> Self {
        let client = Rc::new(FetchClient::new(
            config.api_base_url.clone(),
            GlooTransport::new(config.request_timeout_ms),
        ));
        let state = Rc::new(RefCell::new(ViewStateController::new()));
        let charts = Rc::new(RefCell::new(RenderAdapter::new(CanvasChartBackend::new())));
        let resources: Rc<dyn ResourceFactory> = Rc::new(BrowserObjectUrls);
        let predictor = create_rw_signal(state.borrow().snapshot());

        Self {
            pipeline: PipelineOrchestrator::new(client.clone(), state, charts, resources),
            portfolio_service: PortfolioService::new(client),
            predictor,
            portfolio: create_rw_signal(Portfolio::new()),
            route: create_rw_signal(initial_route),
        }
    }

    /// Switch views and record the path in history.
    pub fn navigate(&self, route: Route) {
        if self.route.get_untracked() == route {
            return;
        }
        let pushed = window()
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(route.path())));
        if let Err(e) = pushed {
            log_warn!(LogComponent::Presentation("App"), "history.pushState failed: {:?}", e);
        }
        self.route.set(route);
    }

    /// Start a run for `symbol` and show it in the predictor view.
    pub fn submit(&self, symbol: Symbol) {
        self.navigate(self.route.get_untracked().after_submit());
        self.pipeline.spawn(symbol);
    }
}

/// 📈 Root component: navbar plus the view for the current route
#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    let pathname = window().location().pathname().unwrap_or_default();
    let ctx = AppCtx::new(&config, Route::from_path(&pathname));
    log_info!(
        LogComponent::Presentation("App"),
        "🧭 Starting on {} (API: {})",
        ctx.route.get_untracked().path(),
        config.api_base_url
    );

    // The predictor view renders from this snapshot only; it never borrows the controller.
    let predictor = ctx.predictor;
    let subscription = ctx
        .pipeline
        .state()
        .borrow_mut()
        .subscribe(move |state, _| predictor.set(PredictorSnapshot::from(state)));

    let route = ctx.route;
    let popstate = window_event_listener(ev::popstate, move |_| {
        let path = window().location().pathname().unwrap_or_default();
        route.set(Route::from_path(&path));
    });

    let state = ctx.pipeline.state().clone();
    on_cleanup(move || {
        state.borrow_mut().unsubscribe(subscription);
        popstate.remove();
    });

    let navbar_ctx = ctx.clone();
    view! {
        <style>{STYLES}</style>
        <div class="stock-app">
            <Navbar ctx=navbar_ctx />
            <main class="content">
                {move || {
                    let ctx = ctx.clone();
                    match route.get() {
                        Route::Input => view! { <InputView ctx=ctx /> }.into_view(),
                        Route::Predictor => view! { <PredictorView ctx=ctx /> }.into_view(),
                        Route::Portfolio => view! { <PortfolioView ctx=ctx /> }.into_view(),
                    }
                }}
            </main>
        </div>
    }
}

#[component]
fn Navbar(ctx: AppCtx) -> impl IntoView {
    let route = ctx.route;
    let link = move |target: Route, label: &'static str, class: &'static str| {
        let ctx = ctx.clone();
        view! {
            <button
                class=class
                class:active=move || route.get() == target
                on:click=move |_| ctx.navigate(target)
            >
                {label}
            </button>
        }
    };

    view! {
        <nav class="navbar">
            {link(Route::Input, "📈 Stock Predictor", "brand")}
            <div class="nav-links">
                {link(Route::Predictor, "Predictor", "nav-link")}
                {link(Route::Portfolio, "Portfolio", "nav-link")}
            </div>
        </nav>
    }
}
