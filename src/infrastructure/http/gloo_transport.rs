use std::future::Future;

use futures::future::{Either, select};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;

use super::{HttpResponse, HttpTransport};
use crate::domain::logging::{LogComponent, get_logger};

/// Browser `fetch` transport with a bounded per-request timeout.
///
/// A request that outlives the timeout is aborted and reported as a transport
/// failure.
#[derive(Debug, Clone)]
pub struct GlooTransport {
    timeout_ms: u32,
}

impl GlooTransport {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }
}

impl HttpTransport for GlooTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, String> {
        let controller = web_sys::AbortController::new().ok();
        let signal = controller.as_ref().map(|c| c.signal());

        let request = async {
            let response = Request::get(url)
                .abort_signal(signal.as_ref())
                .send()
                .await
                .map_err(|e| format!("request failed: {e}"))?;

            let status = response.status();
            let content_type = response.headers().get("content-type");
            let body = response
                .binary()
                .await
                .map_err(|e| format!("failed to read response body: {e}"))?;

            Ok(HttpResponse { status, content_type, body })
        };

        match race_deadline(request, TimeoutFuture::new(self.timeout_ms)).await {
            Some(result) => result,
            None => {
                if let Some(controller) = controller {
                    controller.abort();
                }
                get_logger().warn(
                    LogComponent::Infrastructure("HTTP"),
                    &format!("⏱️ {} timed out after {} ms", url, self.timeout_ms),
                );
                Err(timeout_message(self.timeout_ms))
            }
        }
    }
}

/// Resolve `request` unless `deadline` fires first, in which case `None`.
///
/// The losing future is dropped.
pub async fn race_deadline<R, D>(request: R, deadline: D) -> Option<R::Output>
where
    R: Future,
    D: Future<Output = ()>,
{
    match select(Box::pin(request), Box::pin(deadline)).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

pub fn timeout_message(timeout_ms: u32) -> String {
    format!("timed out after {timeout_ms} ms")
}
