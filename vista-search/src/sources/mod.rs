//! Feeds that plug into the search coordinator.
//!
//! Each feed owns a [`ProxyClient`](crate::ProxyClient) and carries the
//! coordinator policy its view is tuned for.

mod city;
mod news;
mod symbol;

pub use city::CitySearch;
pub use news::NewsFeed;
pub use symbol::SymbolSearch;
