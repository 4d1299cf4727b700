use leptos::*;
use wasm_bindgen::prelude::*;

use crate::config::{AppConfig, CONFIG_ELEMENT_ID};
use crate::domain::{errors::AppError, logging::LogComponent};

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use app::App;

/// Defaults, then the inline JSON block, then query overrides.
fn load_config() -> Result<AppConfig, AppError> {
    let inline = gloo::utils::document()
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content())
        .filter(|json| !json.trim().is_empty());

    let config = match inline {
        Some(json) => AppConfig::from_json(&json)?,
        None => AppConfig::default(),
    };

    let query = gloo::utils::window().location().search().unwrap_or_default();
    config.apply_query(&query)
}

/// Install logging, read configuration and mount the UI
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let (config, problem) = match load_config() {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    domain::logging::init_logger(Box::new(infrastructure::services::ConsoleLogger::new(config.log_level)));
    domain::logging::init_time_provider(Box::new(infrastructure::services::BrowserTimeProvider::new()));

    if let Some(err) = problem {
        log_error!(LogComponent::Presentation("Initialize"), "{}; falling back to defaults", err);
    }
    log_info!(
        LogComponent::Presentation("Initialize"),
        "🚀 Stock predictor initialized (API: {}, timeout: {} ms, log level: {})",
        config.api_base_url,
        config.request_timeout_ms,
        config.log_level.to_string().trim()
    );

    mount_to_body(move || view! { <App config=config /> });
}
