//! Vista Web - Same-origin API proxy

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Forwards dashboard requests to OpenWeather, News API and Alpha Vantage,
//! injecting credentials server-side so keys never reach the browser.
//! Provider JSON is passed through unchanged; failures come back as
//! `{ "error": message, "kind": kind }`.

pub mod cache;
pub mod errors;
pub mod handlers;
pub mod server;
pub mod upstream;

// Re-export main types
pub use cache::ResponseCache;
pub use errors::ProxyError;
pub use server::{AppState, build_router, run_server};
pub use upstream::{DemoUpstream, Endpoint, HttpUpstream, Upstream, UpstreamRequest};
