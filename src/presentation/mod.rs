pub mod portfolio;
pub mod predictor;
pub mod stock_form;

pub use portfolio::PortfolioView;
pub use predictor::{InputView, PredictorView};
pub use stock_form::StockInputForm;
