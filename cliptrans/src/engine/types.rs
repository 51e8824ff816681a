//! Core engine types and traits.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Boxed future returned by object-safe engine traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single translation job.
///
/// Immutable once enqueued; consumed exactly once by the worker or discarded
/// by queue backpressure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationRequest {
    /// Source language code, or `auto` for detection.
    pub source_lang: String,
    /// Target language code.
    pub target_lang: String,
    /// Text to translate.
    pub source_text: String,
}

impl TranslationRequest {
    pub fn new(
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        source_text: impl Into<String>,
    ) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            source_text: source_text.into(),
        }
    }
}

/// Errors produced by translation engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine did not answer in time for this content
    #[error("Translation timed out after {0:?}")]
    ContentTimeout(Duration),

    /// The engine refused this request
    #[error("Translation rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The engine answered with something we cannot interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The connection to the engine is broken; the engine must be rebuilt
    #[error("Transport fault: {0}")]
    TransportFault(String),

    /// One engine candidate could not be constructed
    #[error("Engine {engine} unavailable: {reason}")]
    Unavailable { engine: String, reason: String },

    /// No configured engine candidate could be constructed
    #[error("No translation engine available (tried: {})", attempted.join(", "))]
    NoEngineAvailable { attempted: Vec<String> },
}

impl EngineError {
    /// Returns true for failures tied to one request's content.
    ///
    /// These are final for that request and never trigger an engine restart.
    pub fn is_content_failure(&self) -> bool {
        matches!(
            self,
            Self::ContentTimeout(_) | Self::Rejected { .. } | Self::InvalidResponse(_)
        )
    }

    /// Returns true when the engine handle must be discarded and rebuilt.
    pub fn requires_restart(&self) -> bool {
        matches!(self, Self::TransportFault(_))
    }
}

/// A connected, stateful translation engine.
///
/// Owned exclusively by the worker task, hence `&mut self`.
pub trait TranslationEngine: Send {
    /// Engine name for logging.
    fn name(&self) -> &str;

    /// Translate one request.
    fn translate<'a>(
        &'a mut self,
        request: &'a TranslationRequest,
    ) -> BoxFuture<'a, Result<String, EngineError>>;
}

/// Builds engine instances, initially and after every transport fault.
pub trait EngineFactory: Send + Sync {
    /// Construct and connect a new engine.
    fn create(&self) -> BoxFuture<'_, Result<Box<dyn TranslationEngine>, EngineError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(EngineError::ContentTimeout(Duration::from_secs(5)).is_content_failure());
        assert!(EngineError::Rejected {
            status: 400,
            message: "bad".into()
        }
        .is_content_failure());
        assert!(EngineError::InvalidResponse("x".into()).is_content_failure());

        let fault = EngineError::TransportFault("reset".into());
        assert!(!fault.is_content_failure());
        assert!(fault.requires_restart());
    }

    #[test]
    fn test_no_engine_available_display() {
        let err = EngineError::NoEngineAvailable {
            attempted: vec!["google".into(), "libretranslate".into()],
        };
        assert_eq!(
            err.to_string(),
            "No translation engine available (tried: google, libretranslate)"
        );
    }

    #[test]
    fn test_request_new() {
        let req = TranslationRequest::new("auto", "ja", "Hello");
        assert_eq!(req.source_lang, "auto");
        assert_eq!(req.target_lang, "ja");
        assert_eq!(req.source_text, "Hello");
    }
}
