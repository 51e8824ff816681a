//! Translation engines.
//!
//! The worker talks to engines only through [`TranslationEngine`] and builds
//! them only through an [`EngineFactory`]. Concrete engines are thin HTTP
//! clients over [`AsyncHttpClient`]:
//!
//! - [`GoogleEngine`]: Google's public web endpoint (no key)
//! - [`LibreTranslateEngine`]: any LibreTranslate server
//!
//! [`CandidateFactory`] tries configured engines in order and fails with
//! [`EngineError::NoEngineAvailable`] when none connects.

mod factory;
mod google;
pub mod http;
mod libre;
mod types;

pub use factory::{CandidateFactory, EngineConfig, ENGINE_NAMES};
pub use google::{GoogleEngine, DEFAULT_GOOGLE_URL};
pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpError, DEFAULT_TIMEOUT};
pub use libre::{LibreTranslateEngine, DEFAULT_LIBRETRANSLATE_URL};
pub use types::{BoxFuture, EngineError, EngineFactory, TranslationEngine, TranslationRequest};
