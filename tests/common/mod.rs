#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use futures::channel::oneshot;
use stock_predictor_wasm::application::{ChartBackend, ChartInstance, PipelineOrchestrator, RenderAdapter};
use stock_predictor_wasm::domain::{
    chart::{ChartConfig, SurfaceId},
    errors::{AppError, RenderingResult, Stage},
    predictor::{ResourceFactory, ResourceHandle, ViewStateController},
};
use stock_predictor_wasm::infrastructure::http::{FetchClient, HttpResponse, HttpTransport};

pub const BASE: &str = "http://api.test";

pub fn url(stage: Stage, symbol: &str) -> String {
    format!("{}{}?stock_name={}", BASE, stage.path(), symbol)
}

pub fn json(body: &str) -> Result<HttpResponse, String> {
    Ok(HttpResponse {
        status: 200,
        content_type: Some("application/json".to_string()),
        body: body.as_bytes().to_vec(),
    })
}

pub fn png(bytes: &[u8]) -> Result<HttpResponse, String> {
    Ok(HttpResponse { status: 200, content_type: Some("image/png".to_string()), body: bytes.to_vec() })
}

pub fn status(code: u16) -> Result<HttpResponse, String> {
    Ok(HttpResponse { status: code, content_type: None, body: b"oops".to_vec() })
}

struct Script {
    response: Result<HttpResponse, String>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Answers each URL from a queue of scripted responses, optionally held back
/// until the test opens a gate. Unscripted URLs get a 404.
#[derive(Default)]
pub struct MockTransport {
    scripts: RefCell<HashMap<String, VecDeque<Script>>>,
    calls: RefCell<Vec<String>>,
}

impl MockTransport {
    pub fn respond(&self, url: String, response: Result<HttpResponse, String>) {
        self.scripts
            .borrow_mut()
            .entry(url)
            .or_default()
            .push_back(Script { response, gate: None });
    }

    /// Script a response that is only delivered once the returned sender fires.
    pub fn respond_gated(&self, url: String, response: Result<HttpResponse, String>) -> oneshot::Sender<()> {
        let (open, gate) = oneshot::channel();
        self.scripts
            .borrow_mut()
            .entry(url)
            .or_default()
            .push_back(Script { response, gate: Some(gate) });
        open
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|called| *called == url).count()
    }
}

impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, String> {
        self.calls.borrow_mut().push(url.to_string());
        let script = self.scripts.borrow_mut().get_mut(url).and_then(VecDeque::pop_front);
        let Some(script) = script else {
            return status(404);
        };
        if let Some(gate) = script.gate {
            let _ = gate.await;
        }
        script.response
    }
}

/// Hands out `blob:mock/N` URLs and records releases.
#[derive(Default)]
pub struct MockResources {
    next: Cell<u32>,
    pub created: RefCell<Vec<String>>,
    pub released: Rc<RefCell<Vec<String>>>,
}

impl ResourceFactory for MockResources {
    fn create(&self, bytes: &[u8], content_type: &str) -> Result<ResourceHandle, AppError> {
        assert!(!bytes.is_empty());
        assert_eq!(content_type, "image/png");
        self.next.set(self.next.get() + 1);
        let url = format!("blob:mock/{}", self.next.get());
        self.created.borrow_mut().push(url.clone());
        let released = self.released.clone();
        Ok(ResourceHandle::new(url, move |u| released.borrow_mut().push(u.to_string())))
    }
}

pub type Journal = Rc<RefCell<Vec<String>>>;

pub struct RecordingChart {
    id: usize,
    surface: SurfaceId,
    journal: Journal,
    disposed: bool,
}

impl ChartInstance for RecordingChart {
    fn surface(&self) -> SurfaceId {
        self.surface
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.journal.borrow_mut().push(format!("dispose #{}", self.id));
        }
    }
}

/// Chart backend that writes `attach #N Surface [labels]` / `dispose #N` lines.
pub struct RecordingBackend {
    pub mounted: HashSet<SurfaceId>,
    journal: Journal,
    next_id: usize,
}

impl ChartBackend for RecordingBackend {
    type Instance = RecordingChart;

    fn surface_available(&self, surface: SurfaceId) -> bool {
        self.mounted.contains(&surface)
    }

    fn attach(&mut self, surface: SurfaceId, config: ChartConfig) -> RenderingResult<RecordingChart> {
        self.next_id += 1;
        self.journal.borrow_mut().push(format!(
            "attach #{} {:?} [{}]",
            self.next_id,
            surface,
            config.label_text().join(",")
        ));
        Ok(RecordingChart { id: self.next_id, surface, journal: self.journal.clone(), disposed: false })
    }
}

pub type TestPipeline = PipelineOrchestrator<MockTransport, RecordingBackend>;

pub struct Harness {
    pub pipeline: TestPipeline,
    pub client: Rc<FetchClient<MockTransport>>,
    pub resources: Rc<MockResources>,
    pub journal: Journal,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_mounted(&[SurfaceId::PriceChart, SurfaceId::DailyReturnChart])
    }

    pub fn with_mounted(surfaces: &[SurfaceId]) -> Self {
        let client = Rc::new(FetchClient::new(BASE, MockTransport::default()));
        let resources = Rc::new(MockResources::default());
        let journal: Journal = Rc::default();
        let backend = RecordingBackend {
            mounted: surfaces.iter().copied().collect(),
            journal: journal.clone(),
            next_id: 0,
        };
        let pipeline = PipelineOrchestrator::new(
            client.clone(),
            Rc::new(RefCell::new(ViewStateController::new())),
            Rc::new(RefCell::new(RenderAdapter::new(backend))),
            resources.clone(),
        );
        Self { pipeline, client, resources, journal }
    }

    pub fn transport(&self) -> &MockTransport {
        self.client.transport()
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    /// Successful responses for every stage of `symbol`.
    pub fn script_success(&self, symbol: &str) {
        let t = self.transport();
        t.respond(url(Stage::StockInfo, symbol), info_body(symbol));
        t.respond(url(Stage::PriceSeries, symbol), price_body(symbol));
        t.respond(url(Stage::DailyReturn, symbol), returns_body());
        t.respond(url(Stage::Prediction, symbol), png(b"\x89PNG-prediction"));
    }
}

pub fn info_body(symbol: &str) -> Result<HttpResponse, String> {
    json(&format!(
        r#"{{"symbol": "{symbol}", "company_name": "{symbol} Corp", "closing_price": 101.5,
            "market_cap": 2000000000, "volume": 1200, "average_volume": 1000,
            "profit_margin": 0.21, "EBITDA": null}}"#
    ))
}

/// Two points labelled `<symbol>-1`, `<symbol>-2` so charts reveal which run drew them.
pub fn price_body(symbol: &str) -> Result<HttpResponse, String> {
    json(&format!(r#"[{{"x": "{symbol}-1", "y": 100.0}}, {{"x": "{symbol}-2", "y": 101.5}}]"#))
}

pub fn returns_body() -> Result<HttpResponse, String> {
    json(r#"[{"x": -0.01, "y": 3}, {"x": 0.0, "y": 7}, {"x": 0.01, "y": 4}]"#)
}
