//! LibreTranslate engine.
//!
//! `POST {base}/translate` with a JSON body:
//!
//! ```json
//! {"q": "Hello", "source": "en", "target": "ja", "format": "text", "api_key": "..."}
//! ```
//!
//! A successful answer is `{"translatedText": "..."}`. Errors come back as
//! `{"error": "..."}` with a 4xx/5xx status.

use super::http::{AsyncHttpClient, AsyncReqwestClient, HttpError};
use super::types::{BoxFuture, EngineError, TranslationEngine, TranslationRequest};
use std::time::Duration;
use tracing::debug;

/// Default LibreTranslate instance.
pub const DEFAULT_LIBRETRANSLATE_URL: &str = "https://libretranslate.com";

/// Translation engine backed by a LibreTranslate server.
pub struct LibreTranslateEngine<C: AsyncHttpClient = AsyncReqwestClient> {
    http_client: C,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl<C: AsyncHttpClient> LibreTranslateEngine<C> {
    /// Create an engine without probing the server.
    pub fn new(
        http_client: C,
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout,
        }
    }

    /// Create an engine and check that the server is reachable.
    pub async fn connect(
        http_client: C,
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let engine = Self::new(http_client, base_url, api_key, timeout);
        let probe = format!("{}/languages", engine.base_url);
        if let Err(e) = engine.http_client.get(&probe).await {
            if !e.is_response() {
                return Err(EngineError::Unavailable {
                    engine: "libretranslate".to_string(),
                    reason: e.to_string(),
                });
            }
        }
        debug!(
            url = %engine.base_url,
            has_api_key = engine.api_key.is_some(),
            "Connected to LibreTranslate"
        );
        Ok(engine)
    }

    fn request_body(&self, request: &TranslationRequest) -> String {
        let mut body = serde_json::json!({
            "q": request.source_text,
            "source": request.source_lang,
            "target": request.target_lang,
            "format": "text",
        });
        if let Some(key) = &self.api_key {
            body["api_key"] = serde_json::Value::String(key.clone());
        }
        body.to_string()
    }

    async fn request(&self, request: &TranslationRequest) -> Result<String, EngineError> {
        let url = format!("{}/translate", self.base_url);
        let body = match self
            .http_client
            .post_json(&url, &self.request_body(request))
            .await
        {
            Ok(body) => body,
            Err(HttpError::Status { status, url, body })
                if (400..500).contains(&status) && status != 429 =>
            {
                let message = error_message(&body)
                    .unwrap_or_else(|| format!("HTTP {} from {}", status, url));
                return Err(EngineError::Rejected { status, message });
            }
            Err(e) => return Err(e.into_engine_error(self.timeout)),
        };

        parse_response(&body)
    }
}

impl<C: AsyncHttpClient + 'static> TranslationEngine for LibreTranslateEngine<C> {
    fn name(&self) -> &str {
        "libretranslate"
    }

    fn translate<'a>(
        &'a mut self,
        request: &'a TranslationRequest,
    ) -> BoxFuture<'a, Result<String, EngineError>> {
        Box::pin(self.request(request))
    }
}

fn parse_response(body: &[u8]) -> Result<String, EngineError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| EngineError::InvalidResponse(format!("not JSON: {}", e)))?;

    value
        .get("translatedText")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| EngineError::InvalidResponse("missing translatedText".to_string()))
}

/// Pull the `error` field out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}
