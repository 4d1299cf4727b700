use derive_more::Display;
use strum::{AsRefStr, EnumIter};

/// One network fetch of the pipeline (or the independent price lookup).
///
/// `AsRefStr` yields the endpoint path, `Display` the human description used in
/// error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum Stage {
    #[display(fmt = "stock information")]
    #[strum(serialize = "/stock_info")]
    StockInfo,
    #[display(fmt = "stock data")]
    #[strum(serialize = "/stock_data")]
    PriceSeries,
    #[display(fmt = "daily return data")]
    #[strum(serialize = "/daily_return")]
    DailyReturn,
    #[display(fmt = "prediction image")]
    #[strum(serialize = "/stock_prediction")]
    Prediction,
    #[display(fmt = "stock price")]
    #[strum(serialize = "/stock_price")]
    StockPrice,
}

impl Stage {
    pub fn path(&self) -> &str {
        self.as_ref()
    }
}

/// Why a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum FetchCause {
    #[display(fmt = "network error ({})", _0)]
    Transport(String),
    #[display(fmt = "HTTP {}", _0)]
    Status(u16),
    #[display(fmt = "malformed response ({})", _0)]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "Failed to fetch {}: {}", stage, cause)]
pub struct FetchError {
    pub stage: Stage,
    pub cause: FetchCause,
}

impl FetchError {
    pub fn transport(stage: Stage, message: impl Into<String>) -> Self {
        Self { stage, cause: FetchCause::Transport(message.into()) }
    }

    pub fn status(stage: Stage, code: u16) -> Self {
        Self { stage, cause: FetchCause::Status(code) }
    }

    pub fn decode(stage: Stage, message: impl Into<String>) -> Self {
        Self { stage, cause: FetchCause::Decode(message.into()) }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.cause {
            FetchCause::Status(code) => Some(code),
            _ => None,
        }
    }
}

impl std::error::Error for FetchError {}

/// Everything that is not a fetch failure.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    Fetch(FetchError),
    #[display(fmt = "Validation Error: {}", _0)]
    Validation(String),
    #[display(fmt = "Rendering Error: {}", _0)]
    Rendering(String),
    #[display(fmt = "Browser Error: {}", _0)]
    Browser(String),
    #[display(fmt = "Config Error: {}", _0)]
    Config(String),
}

impl std::error::Error for AppError {}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::Fetch(err)
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
pub type RenderingResult<T> = Result<T, AppError>;
