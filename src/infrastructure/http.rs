use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{
    errors::{FetchError, FetchResult, Stage},
    logging::{LogComponent, get_logger},
    market_data::{PriceQuote, StockInfoRecord, Symbol, TimeSeries},
};

pub mod gloo_transport;

pub use gloo_transport::GlooTransport;

/// Query parameter carrying the symbol on every endpoint.
pub const SYMBOL_PARAM: &str = "stock_name";

/// Raw response as seen by the fetch client.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        HttpUtils::is_success_status(self.status)
    }
}

/// Something that can perform a GET. `Err` means the request never produced a
/// response (network down, aborted, timed out).
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, String>;
}

/// How the caller wants the body interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Json,
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryPayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Binary(BinaryPayload),
}

/// GET client for the stock API. One fixed path per [`Stage`], no retries.
pub struct FetchClient<T> {
    base_url: String,
    transport: T,
}

impl<T: HttpTransport> FetchClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn url_for(&self, stage: Stage, params: &[(&str, &str)]) -> String {
        HttpUtils::build_url_with_params(&format!("{}{}", self.base_url, stage.path()), params)
    }

    pub async fn get(&self, stage: Stage, params: &[(&str, &str)], kind: PayloadKind) -> FetchResult<Payload> {
        let url = self.url_for(stage, params);
        get_logger().debug(LogComponent::Infrastructure("HTTP"), &format!("🌐 GET: {}", url));

        let response = self
            .transport
            .get(&url)
            .await
            .map_err(|e| FetchError::transport(stage, e))?;

        if !response.ok() {
            get_logger().warn(
                LogComponent::Infrastructure("HTTP"),
                &format!("HTTP error {} from {}", response.status, url),
            );
            return Err(FetchError::status(stage, response.status));
        }

        match kind {
            PayloadKind::Json => serde_json::from_slice::<Value>(&response.body)
                .map(Payload::Json)
                .map_err(|e| FetchError::decode(stage, format!("invalid JSON: {e}"))),
            PayloadKind::Binary => {
                if response.body.is_empty() {
                    return Err(FetchError::decode(stage, "empty body"));
                }
                get_logger().debug(
                    LogComponent::Infrastructure("HTTP"),
                    &format!("✅ GET response: {} bytes", response.body.len()),
                );
                Ok(Payload::Binary(BinaryPayload {
                    content_type: response
                        .content_type
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                    bytes: response.body,
                }))
            }
        }
    }

    async fn get_json<R: DeserializeOwned>(&self, stage: Stage, symbol: &Symbol) -> FetchResult<R> {
        match self.get(stage, &[(SYMBOL_PARAM, symbol.value())], PayloadKind::Json).await? {
            Payload::Json(value) => Self::decode(stage, value),
            Payload::Binary(_) => Err(FetchError::decode(stage, "expected a JSON body")),
        }
    }

    fn decode<R: DeserializeOwned>(stage: Stage, value: Value) -> FetchResult<R> {
        serde_json::from_value(value).map_err(|e| FetchError::decode(stage, e.to_string()))
    }

    pub async fn stock_info(&self, symbol: &Symbol) -> FetchResult<StockInfoRecord> {
        let value: Value = self.get_json(Stage::StockInfo, symbol).await?;
        if !value.is_object() {
            return Err(FetchError::decode(Stage::StockInfo, "expected a JSON object"));
        }
        Self::decode(Stage::StockInfo, value)
    }

    pub async fn price_series(&self, symbol: &Symbol) -> FetchResult<TimeSeries> {
        self.get_json(Stage::PriceSeries, symbol).await
    }

    pub async fn daily_returns(&self, symbol: &Symbol) -> FetchResult<TimeSeries> {
        self.get_json(Stage::DailyReturn, symbol).await
    }

    pub async fn prediction_image(&self, symbol: &Symbol) -> FetchResult<BinaryPayload> {
        match self
            .get(Stage::Prediction, &[(SYMBOL_PARAM, symbol.value())], PayloadKind::Binary)
            .await?
        {
            Payload::Binary(blob) => Ok(blob),
            Payload::Json(_) => Err(FetchError::decode(Stage::Prediction, "expected a binary body")),
        }
    }

    pub async fn stock_price(&self, symbol: &Symbol) -> FetchResult<PriceQuote> {
        self.get_json(Stage::StockPrice, symbol).await
    }
}

/// URL helpers
pub struct HttpUtils;

impl HttpUtils {
    pub fn is_success_status(status: u16) -> bool {
        (200..300).contains(&status)
    }

    /// Append percent-encoded `params` to `base_url`, keeping their order.
    pub fn build_url_with_params(base_url: &str, params: &[(&str, &str)]) -> String {
        if params.is_empty() {
            return base_url.to_string();
        }

        let query_string = params
            .iter()
            .map(|(key, value)| format!("{}={}", Self::url_encode(key), Self::url_encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", base_url, query_string)
    }

    /// RFC 3986 component encoding: unreserved characters pass, every other byte is `%XX`.
    pub fn url_encode(input: &str) -> String {
        let mut encoded = String::with_capacity(input.len());
        for byte in input.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    encoded.push(byte as char)
                }
                other => encoded.push_str(&format!("%{:02X}", other)),
            }
        }
        encoded
    }
}
