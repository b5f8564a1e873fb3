//! Backend API access.
//!
//! Two read-only JSON endpoints, both owned by the inference server. Fetches are
//! fire-and-forget `spawn_local` futures; staleness is handled by the caller
//! through the sequence gate, not by aborting requests.

use serde::Deserialize;
use std::collections::HashMap;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

pub(super) const EMOTION_ENDPOINT: &str = "/api/analyze_current_emotion";
pub(super) const PERF_ENDPOINT: &str = "/api/performance_metrics";

pub(super) const FPS_PLACEHOLDER: &str = "FPS: --";
pub(super) const INFERENCE_PLACEHOLDER: &str = "Inference: --ms";

#[derive(Debug, thiserror::Error)]
pub(super) enum ApiError {
    /// Non-2xx status. Expected from the emotion endpoint before the stream
    /// has produced its first analyzed frame.
    #[error("endpoint not ready (HTTP {0})")]
    NotReady(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed payload: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct EmotionPayload {
    #[serde(default)]
    pub(super) emotions: HashMap<String, f32>,
    pub(super) dominant_emotion: String,
    #[serde(default)]
    pub(super) error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct PerfPayload {
    #[serde(default)]
    pub(super) fps: f64,
    #[serde(default)]
    pub(super) avg_inference_time: f64,
    #[serde(default)]
    pub(super) error: Option<String>,
}

impl PerfPayload {
    pub(super) fn fps_text(&self) -> String {
        format!("FPS: {}", self.fps)
    }

    /// Inference time arrives in seconds; displayed in milliseconds.
    pub(super) fn inference_text(&self) -> String {
        format!("Inference: {:.1}ms", self.avg_inference_time * 1000.0)
    }
}

async fn fetch_json<T>(url: &str) -> Result<T, ApiError>
where
    T: for<'de> Deserialize<'de>,
{
    let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| ApiError::Network(format!("{e:?}")))?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| ApiError::Network("fetch did not yield a Response".to_string()))?;

    if !response.ok() {
        return Err(ApiError::NotReady(response.status()));
    }

    let text_promise = response
        .text()
        .map_err(|e| ApiError::Network(format!("{e:?}")))?;
    let text = JsFuture::from(text_promise)
        .await
        .map_err(|e| ApiError::Network(format!("{e:?}")))?;
    let text = text.as_string().unwrap_or_default();

    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

pub(super) async fn fetch_current_emotion() -> Result<EmotionPayload, ApiError> {
    fetch_json(EMOTION_ENDPOINT).await
}

pub(super) async fn fetch_performance() -> Result<PerfPayload, ApiError> {
    fetch_json(PERF_ENDPOINT).await
}
