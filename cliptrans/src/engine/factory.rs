//! Engine factory for centralized engine creation.
//!
//! [`EngineConfig`] describes one engine candidate. [`CandidateFactory`]
//! walks an ordered candidate list and returns the first engine that
//! connects, which is how the worker builds its engine at startup and after
//! every transport fault.

use super::google::{GoogleEngine, DEFAULT_GOOGLE_URL};
use super::http::{AsyncHttpClient, AsyncReqwestClient};
use super::libre::{LibreTranslateEngine, DEFAULT_LIBRETRANSLATE_URL};
use super::types::{BoxFuture, EngineError, EngineFactory, TranslationEngine};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Names accepted by [`EngineConfig::from_str`], in default preference order.
pub const ENGINE_NAMES: [&str; 2] = ["google", "libretranslate"];

/// Configuration for creating an engine.
///
/// # Example
///
/// ```
/// use cliptrans::engine::EngineConfig;
///
/// let google = EngineConfig::google();
/// let libre = EngineConfig::libretranslate("https://translate.example.org", Some("key".into()));
/// assert_eq!(google.name(), "google");
/// assert_eq!(libre.name(), "libretranslate");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineConfig {
    /// Google's public web endpoint.
    ///
    /// No API key required.
    Google {
        /// Endpoint base URL
        base_url: String,
    },

    /// A LibreTranslate server.
    ///
    /// Public instances usually require an API key; self-hosted ones do not.
    LibreTranslate {
        /// Server base URL
        base_url: String,
        /// Optional API key
        api_key: Option<String>,
    },
}

impl EngineConfig {
    /// Google at its default endpoint.
    pub fn google() -> Self {
        Self::Google {
            base_url: DEFAULT_GOOGLE_URL.to_string(),
        }
    }

    /// LibreTranslate at the given server.
    pub fn libretranslate(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::LibreTranslate {
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Returns the engine name for this configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google { .. } => "google",
            Self::LibreTranslate { .. } => "libretranslate",
        }
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        match self {
            Self::Google { base_url } | Self::LibreTranslate { base_url, .. } => base_url,
        }
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.base_url())
    }
}

impl FromStr for EngineConfig {
    type Err = String;

    /// Parse an engine name into its default configuration.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gtx" => Ok(Self::google()),
            "libretranslate" | "libre" => {
                Ok(Self::libretranslate(DEFAULT_LIBRETRANSLATE_URL, None))
            }
            other => Err(format!(
                "unknown engine '{}' (expected one of: {})",
                other,
                ENGINE_NAMES.join(", ")
            )),
        }
    }
}

/// Factory that tries engine candidates in preference order.
///
/// # Example
///
/// ```ignore
/// use cliptrans::engine::{CandidateFactory, EngineConfig, EngineFactory};
///
/// let factory = CandidateFactory::new(vec![EngineConfig::google()], Duration::from_secs(5))?;
/// let mut engine = factory.create().await?;
/// ```
pub struct CandidateFactory<C: AsyncHttpClient + Clone = AsyncReqwestClient> {
    http_client: C,
    candidates: Vec<EngineConfig>,
    timeout: Duration,
}

impl CandidateFactory<AsyncReqwestClient> {
    /// Create a factory using a reqwest client with the given timeout.
    pub fn new(candidates: Vec<EngineConfig>, timeout: Duration) -> Result<Self, EngineError> {
        let http_client =
            AsyncReqwestClient::with_timeout(timeout).map_err(|e| EngineError::Unavailable {
                engine: "http".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::with_client(http_client, candidates, timeout))
    }
}

impl<C: AsyncHttpClient + Clone + 'static> CandidateFactory<C> {
    /// Create a factory sharing `http_client` across all engines it builds.
    pub fn with_client(http_client: C, candidates: Vec<EngineConfig>, timeout: Duration) -> Self {
        Self {
            http_client,
            candidates,
            timeout,
        }
    }

    /// Candidates in preference order.
    pub fn candidates(&self) -> &[EngineConfig] {
        &self.candidates
    }

    async fn connect(&self, config: &EngineConfig) -> Result<Box<dyn TranslationEngine>, EngineError> {
        let client = self.http_client.clone();
        match config {
            EngineConfig::Google { base_url } => {
                let engine = GoogleEngine::connect(client, base_url.clone(), self.timeout).await?;
                Ok(Box::new(engine))
            }
            EngineConfig::LibreTranslate { base_url, api_key } => {
                let engine = LibreTranslateEngine::connect(
                    client,
                    base_url.clone(),
                    api_key.clone(),
                    self.timeout,
                )
                .await?;
                Ok(Box::new(engine))
            }
        }
    }

    async fn create_first(&self) -> Result<Box<dyn TranslationEngine>, EngineError> {
        let mut attempted = Vec::with_capacity(self.candidates.len());

        for config in &self.candidates {
            match self.connect(config).await {
                Ok(engine) => {
                    info!(engine = config.name(), url = config.base_url(), "Translation engine ready");
                    return Ok(engine);
                }
                Err(e) => {
                    warn!(engine = config.name(), error = %e, "Engine candidate failed");
                    attempted.push(config.name().to_string());
                }
            }
        }

        Err(EngineError::NoEngineAvailable { attempted })
    }
}

impl<C: AsyncHttpClient + Clone + 'static> EngineFactory for CandidateFactory<C> {
    fn create(&self) -> BoxFuture<'_, Result<Box<dyn TranslationEngine>, EngineError>> {
        Box::pin(self.create_first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::http::tests::MockAsyncHttpClient;
    use crate::engine::http::HttpError;
    use crate::engine::TranslationRequest;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn both() -> Vec<EngineConfig> {
        vec![
            EngineConfig::google(),
            EngineConfig::libretranslate("http://libre.test", None),
        ]
    }

    #[test]
    fn test_parse_engine_names() {
        assert_eq!("google".parse::<EngineConfig>().unwrap(), EngineConfig::google());
        assert_eq!(
            " Libre ".parse::<EngineConfig>().unwrap().name(),
            "libretranslate"
        );
        assert!("deepl".parse::<EngineConfig>().is_err());
    }

    #[tokio::test]
    async fn test_first_reachable_candidate_wins() {
        let mock = MockAsyncHttpClient::ok("[]");
        let factory = CandidateFactory::with_client(mock.clone(), both(), TIMEOUT);

        let engine = factory.create().await.unwrap();
        assert_eq!(engine.name(), "google");
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_next_candidate() {
        let mock = MockAsyncHttpClient::ok(r#"{"translatedText":"fallback"}"#)
            .then(Err(HttpError::Transport("refused".into())));
        let factory = CandidateFactory::with_client(mock, both(), TIMEOUT);

        let mut engine = factory.create().await.unwrap();
        assert_eq!(engine.name(), "libretranslate");
        let text = engine
            .translate(&TranslationRequest::new("en", "ja", "x"))
            .await
            .unwrap();
        assert_eq!(text, "fallback");
    }

    #[tokio::test]
    async fn test_all_candidates_failing() {
        let mock = MockAsyncHttpClient::new(Err(HttpError::Timeout("slow".into())));
        let factory = CandidateFactory::with_client(mock, both(), TIMEOUT);

        match factory.create().await {
            Err(EngineError::NoEngineAvailable { attempted }) => {
                assert_eq!(attempted, vec!["google", "libretranslate"]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let factory = CandidateFactory::with_client(MockAsyncHttpClient::ok(""), Vec::new(), TIMEOUT);
        assert!(matches!(
            factory.create().await,
            Err(EngineError::NoEngineAvailable { attempted }) if attempted.is_empty()
        ));
    }
}
