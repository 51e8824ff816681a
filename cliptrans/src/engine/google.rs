//! Google Translate web endpoint engine.
//!
//! Uses the public endpoint the Google Translate web widget talks to. No API
//! key is required.
//!
//! # Request
//!
//! `GET {base}/translate_a/single?client=gtx&sl={src}&tl={dst}&dt=t&q={text}`
//!
//! # Response
//!
//! A nested JSON array. The first element is a list of segments, each of
//! which starts with the translated text of one sentence:
//!
//! ```text
//! [[["Hallo. ","Hello. ",null,null,10],["Welt","World",null,null,10]],null,"en",...]
//! ```
//!
//! The translation is the concatenation of the segments' first fields.

use super::http::{AsyncHttpClient, AsyncReqwestClient};
use super::types::{BoxFuture, EngineError, TranslationEngine, TranslationRequest};
use std::time::Duration;
use tracing::debug;

/// Default endpoint base URL.
pub const DEFAULT_GOOGLE_URL: &str = "https://translate.googleapis.com";

/// Translation engine backed by Google's web endpoint.
pub struct GoogleEngine<C: AsyncHttpClient = AsyncReqwestClient> {
    http_client: C,
    base_url: String,
    timeout: Duration,
}

impl<C: AsyncHttpClient> GoogleEngine<C> {
    /// Create an engine without probing the endpoint.
    pub fn new(http_client: C, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Create an engine and check that the endpoint is reachable.
    ///
    /// Any HTTP answer counts as reachable; only timeouts and connection
    /// failures make the engine unavailable.
    pub async fn connect(
        http_client: C,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let engine = Self::new(http_client, base_url, timeout);
        match engine.http_client.get(&engine.base_url).await {
            Ok(_) => {}
            Err(e) if e.is_response() => {}
            Err(e) => {
                return Err(EngineError::Unavailable {
                    engine: "google".to_string(),
                    reason: e.to_string(),
                })
            }
        }
        debug!(url = %engine.base_url, "Connected to Google Translate");
        Ok(engine)
    }

    fn endpoint(&self) -> String {
        format!("{}/translate_a/single", self.base_url)
    }

    async fn request(&self, request: &TranslationRequest) -> Result<String, EngineError> {
        let query = [
            ("client", "gtx"),
            ("sl", request.source_lang.as_str()),
            ("tl", request.target_lang.as_str()),
            ("dt", "t"),
            ("q", request.source_text.as_str()),
        ];

        let body = self
            .http_client
            .get_with_query(&self.endpoint(), &query)
            .await
            .map_err(|e| e.into_engine_error(self.timeout))?;

        parse_response(&body)
    }
}

impl<C: AsyncHttpClient + 'static> TranslationEngine for GoogleEngine<C> {
    fn name(&self) -> &str {
        "google"
    }

    fn translate<'a>(
        &'a mut self,
        request: &'a TranslationRequest,
    ) -> BoxFuture<'a, Result<String, EngineError>> {
        Box::pin(self.request(request))
    }
}

/// Extract the translated text from a response body.
fn parse_response(body: &[u8]) -> Result<String, EngineError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| EngineError::InvalidResponse(format!("not JSON: {}", e)))?;

    let root = value
        .as_array()
        .ok_or_else(|| EngineError::InvalidResponse("expected top-level array".to_string()))?;

    let segments = match root.first() {
        Some(serde_json::Value::Array(segments)) => segments,
        // Whitespace-only input yields a null segment list
        Some(serde_json::Value::Null) => return Ok(String::new()),
        _ => {
            return Err(EngineError::InvalidResponse(
                "missing segment list".to_string(),
            ))
        }
    };

    let mut translated = String::new();
    for segment in segments {
        if let Some(text) = segment.get(0).and_then(serde_json::Value::as_str) {
            translated.push_str(text);
        }
    }
    Ok(translated)
}
