//! Retry state machine for failed attempts.

use std::time::Duration;

use reqwest::StatusCode;

use crate::{ErrorResult, Failure, PreparedRequest};

/// Retries consumed by one logical request.
///
/// Starts at zero and is replaced, never mutated, on each retry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryAttempt {
    count: u32,
}

impl RetryAttempt {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn count(self) -> u32 {
        self.count
    }

    pub fn next(self) -> Self {
        Self {
            count: self.count.saturating_add(1),
        }
    }

    pub fn is_initial(self) -> bool {
        self.count == 0
    }
}

/// Outcome of evaluating a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait, then re-issue the request as the given attempt.
    Retry { next: RetryAttempt, delay: Duration },
    /// Give up and reject.
    Terminal,
}

/// Decides whether a failed attempt is re-issued.
///
/// Terminal on 404, when the request did not opt into retries, or once the
/// ceiling is reached.
pub fn evaluate(
    request: &PreparedRequest,
    status: Option<StatusCode>,
    attempt: RetryAttempt,
) -> RetryDecision {
    if status == Some(StatusCode::NOT_FOUND)
        || !request.relink
        || attempt.count() >= request.retry
    {
        return RetryDecision::Terminal;
    }

    RetryDecision::Retry {
        next: attempt.next(),
        delay: Duration::from_millis(request.retry_delay_ms),
    }
}

/// Builds the normalized rejection for a terminal failure.
pub(crate) fn reject(
    request: PreparedRequest,
    attempt: RetryAttempt,
    failure: Failure,
) -> ErrorResult {
    let message = format_message(&request, attempt, &failure.upstream_message());
    ErrorResult {
        message,
        config: request,
        retries: attempt.count(),
        error: failure,
    }
}

fn format_message(request: &PreparedRequest, attempt: RetryAttempt, upstream: &str) -> String {
    let prefix = if attempt.is_initial() {
        "error occurred:".to_owned()
    } else {
        format!("Reconnecting {} times:", attempt.count())
    };
    let details = serde_json::json!({
        "baseUrl": request.base_url,
        "path": request.path,
        "error": upstream,
    });
    format!("{prefix}{details}")
}

/// Waits before the next retry attempt.
///
/// On native targets: `tokio::time::sleep`.
/// On WASM targets: a `setTimeout`-backed promise.
pub(crate) async fn wait_before_retry(delay: Duration) {
    #[cfg(feature = "tracing")]
    tracing::debug!("retrying request after {} ms", delay.as_millis());

    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(delay).await;

    #[cfg(target_arch = "wasm32")]
    wasm_sleep(delay).await;
}

#[cfg(target_arch = "wasm32")]
async fn wasm_sleep(delay: Duration) {
    use wasm_bindgen::{JsCast, JsValue};

    let millis = delay.as_millis().min(i32::MAX as u128) as f64;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let global = js_sys::global();
        let set_timeout = js_sys::Reflect::get(&global, &JsValue::from_str("setTimeout"))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok());
        match set_timeout {
            Some(set_timeout) => {
                let _ = set_timeout.call2(&global, &resolve, &JsValue::from_f64(millis));
            }
            // No timer available: resolve immediately instead of hanging.
            None => {
                let _ = resolve.call0(&JsValue::NULL);
            }
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}
