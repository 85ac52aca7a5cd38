//! Handle for communicating with a search coordinator actor.

use tokio::sync::{mpsc, oneshot, watch};

use super::commands::CoordinatorCommand;
use super::state::SearchSnapshot;
use crate::errors::CoordinatorError;

/// Handle for driving a search coordinator from a view.
///
/// Cloneable; the actor stops once every handle is dropped or
/// [`shutdown`](Self::shutdown) is called, which is how a view tears its
/// coordinator down on unmount.
#[derive(Debug)]
pub struct SearchCoordinatorHandle<T> {
    sender: mpsc::Sender<CoordinatorCommand<T>>,
    snapshots: watch::Receiver<SearchSnapshot<T>>,
}

impl<T> Clone for SearchCoordinatorHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            snapshots: self.snapshots.clone(),
        }
    }
}

impl<T: Clone> SearchCoordinatorHandle<T> {
    pub(crate) fn new(
        sender: mpsc::Sender<CoordinatorCommand<T>>,
        snapshots: watch::Receiver<SearchSnapshot<T>>,
    ) -> Self {
        Self { sender, snapshots }
    }

    /// Updates the query text.
    ///
    /// Long enough queries are fetched once input has been idle for the
    /// policy's debounce window; shorter ones clear results right away.
    ///
    /// # Errors
    /// - `CoordinatorError::Shutdown` - Actor is no longer running
    pub async fn set_query(&self, text: impl Into<String>) -> Result<(), CoordinatorError> {
        self.send(CoordinatorCommand::SetQuery { text: text.into() }).await
    }

    /// Switches category or filter and fetches page 1 without debouncing.
    ///
    /// # Errors
    /// - `CoordinatorError::Shutdown` - Actor is no longer running
    pub async fn trigger_initial_load(
        &self,
        filter: Option<String>,
    ) -> Result<(), CoordinatorError> {
        self.send(CoordinatorCommand::TriggerInitialLoad { filter }).await
    }

    /// Requests the next page. Ignored unless the coordinator is idle and
    /// believes more results exist.
    ///
    /// # Errors
    /// - `CoordinatorError::Shutdown` - Actor is no longer running
    pub async fn load_next_page(&self) -> Result<(), CoordinatorError> {
        self.send(CoordinatorCommand::LoadNextPage).await
    }

    /// Returns the state after every previously sent command was handled.
    ///
    /// # Errors
    /// - `CoordinatorError::Shutdown` - Actor is no longer running
    pub async fn snapshot(&self) -> Result<SearchSnapshot<T>, CoordinatorError> {
        let (responder, rx) = oneshot::channel();
        self.send(CoordinatorCommand::GetSnapshot { responder }).await?;
        rx.await.map_err(|_| CoordinatorError::Shutdown)
    }

    /// Latest published state, without waiting on the actor.
    pub fn current(&self) -> SearchSnapshot<T> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot<T>> {
        self.snapshots.clone()
    }

    /// Waits until a published snapshot satisfies `predicate`.
    ///
    /// # Errors
    /// - `CoordinatorError::Shutdown` - Actor stopped before the condition held
    pub async fn wait_for<F>(
        &self,
        mut predicate: F,
    ) -> Result<SearchSnapshot<T>, CoordinatorError>
    where
        F: FnMut(&SearchSnapshot<T>) -> bool,
    {
        let mut receiver = self.snapshots.clone();
        let snapshot = receiver
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| CoordinatorError::Shutdown)?;
        Ok(snapshot.clone())
    }

    /// Stops the actor and drops any in-flight fetches.
    ///
    /// # Errors
    /// - `CoordinatorError::Shutdown` - Actor had already stopped
    pub async fn shutdown(&self) -> Result<(), CoordinatorError> {
        let (responder, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Shutdown { responder }).await?;
        rx.await.map_err(|_| CoordinatorError::Shutdown)
    }

    /// Checks if the actor is still running.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    async fn send(&self, command: CoordinatorCommand<T>) -> Result<(), CoordinatorError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| CoordinatorError::Shutdown)
    }
}
