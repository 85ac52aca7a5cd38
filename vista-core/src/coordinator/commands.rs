//! Command definitions for the search coordinator actor.

use tokio::sync::oneshot;

use super::state::SearchSnapshot;

/// Messages a handle sends to its coordinator actor.
///
/// View events are fire-and-forget; only snapshot and shutdown requests carry
/// a response channel. Because the actor handles commands in order, a
/// snapshot reply reflects every command sent before it.
pub(crate) enum CoordinatorCommand<T> {
    /// Query text changed.
    SetQuery { text: String },
    /// Category or filter changed; fetch page 1 immediately.
    TriggerInitialLoad { filter: Option<String> },
    /// Proximity signal from the end of the rendered list.
    LoadNextPage,
    /// Read the current state after all earlier commands.
    GetSnapshot {
        responder: oneshot::Sender<SearchSnapshot<T>>,
    },
    /// Stop the actor and drop in-flight fetches.
    Shutdown { responder: oneshot::Sender<()> },
}
