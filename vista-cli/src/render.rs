//! Terminal rendering of feed items.

use vista_search::{Article, City, SymbolMatch};

/// One-line summary of a result.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for City {
    fn render(&self) -> String {
        format!("{} ({:.2}, {:.2})", self, self.lat, self.lon)
    }
}

impl Render for SymbolMatch {
    fn render(&self) -> String {
        format!("{:<10} {} [{}, {}]", self.symbol, self.name, self.region, self.currency)
    }
}

impl Render for Article {
    fn render(&self) -> String {
        match self.published_label() {
            Some(published) => format!("{} - {} ({})", self.title, self.source.name, published),
            None => format!("{} - {}", self.title, self.source.name),
        }
    }
}
