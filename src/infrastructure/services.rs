//! Browser-backed implementations of domain services.

use wasm_bindgen::JsValue;

use crate::domain::{
    errors::AppError,
    logging::{LogComponent, LogEntry, LogLevel, Logger, TimeProvider, get_logger, get_time_provider},
    predictor::{ResourceFactory, ResourceHandle},
};

/// Console logger implementation for the browser
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    fn format_log_entry(entry: &LogEntry) -> String {
        let timestamp = get_time_provider().format_timestamp(entry.timestamp);
        match &entry.metadata {
            Some(metadata) => format!(
                "[{}] {} {} | {} | {}",
                timestamp, entry.level, entry.component, entry.message, metadata
            ),
            None => format!("[{}] {} {} | {}", timestamp, entry.level, entry.component, entry.message),
        }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        let formatted = JsValue::from_str(&Self::format_log_entry(&entry));
        match entry.level {
            LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&formatted),
            LogLevel::Info => web_sys::console::info_1(&formatted),
            LogLevel::Warn => web_sys::console::warn_1(&formatted),
            LogLevel::Error => web_sys::console::error_1(&formatted),
        }
    }
}

/// Wall clock from `Date.now()`
pub struct BrowserTimeProvider;

impl BrowserTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BrowserTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for BrowserTimeProvider {
    fn current_timestamp(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        let date = js_sys::Date::new(&JsValue::from_f64(timestamp as f64));
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            date.get_hours(),
            date.get_minutes(),
            date.get_seconds(),
            date.get_milliseconds()
        )
    }
}

/// `blob:` object URLs; the handle revokes its URL when released.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserObjectUrls;

impl ResourceFactory for BrowserObjectUrls {
    fn create(&self, bytes: &[u8], content_type: &str) -> Result<ResourceHandle, AppError> {
        let array = js_sys::Uint8Array::from(bytes);
        let parts = js_sys::Array::of1(&array);
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(content_type);

        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|e| AppError::Browser(format!("failed to create blob: {e:?}")))?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|e| AppError::Browser(format!("failed to create object URL: {e:?}")))?;

        Ok(ResourceHandle::new(url, |url| {
            report_revoke(url, web_sys::Url::revoke_object_url(url));
        }))
    }
}

/// Log a failed revoke at warn; returns the logged message.
pub fn report_revoke<E: std::fmt::Debug>(url: &str, result: Result<(), E>) -> Option<String> {
    let err = result.err()?;
    let message = format!("failed to revoke {url}: {err:?}");
    get_logger().warn(LogComponent::Infrastructure("ObjectUrls"), &message);
    Some(message)
}
