//! Debounced, generation-tagged search coordinator
//!
//! One coordinator backs one view (city search, symbol search, news feed).
//! It runs as an actor: commands from the view, debounce expiry and fetch
//! completions are handled one at a time by a single task that owns the
//! state, and every transition is published as a [`SearchSnapshot`].

mod actor;
mod commands;
mod handle;
mod policy;
mod source;
mod state;

pub use actor::spawn_search_coordinator;
pub use handle::SearchCoordinatorHandle;
pub use policy::SearchPolicy;
pub use source::{ResultPage, SearchRequest, SearchSource};
pub use state::{SearchSnapshot, Status};
