//! Vista Search - Feeds behind the search coordinator

#![warn(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Each feed wraps one endpoint of the Vista proxy and implements
//! `vista_core::SearchSource`, so a view gets debouncing, stale-response
//! protection and pagination from the coordinator for free.

pub mod client;
pub mod sources;
pub mod types;

// Re-export main types
pub use client::ProxyClient;
pub use sources::{CitySearch, NewsFeed, SymbolSearch};
pub use types::{
    Article, City, CurrentWeather, NewsCategory, PricePoint, StockQuote, SymbolMatch,
    TimeInterval,
};
