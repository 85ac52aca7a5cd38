//! Actor implementation for the search coordinator.

use std::sync::Arc;

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use super::commands::CoordinatorCommand;
use super::handle::SearchCoordinatorHandle;
use super::policy::SearchPolicy;
use super::source::SearchSource;
use super::state::{
    Completion, FetchOutcome, FetchPlan, QueryChange, SearchSnapshot, SearchState,
};

const COMMAND_BUFFER: usize = 64;

/// Spawns a search coordinator actor for `source` and returns its handle.
///
/// The actor owns all coordinator state. Commands, debounce expiry and fetch
/// completions are processed one at a time, so no locking is involved and a
/// response can only be applied if its generation is still the latest.
///
/// Must be called from within a Tokio runtime.
///
/// # Examples
/// ```rust,no_run
/// # use vista_core::{ResultPage, SearchError, SearchRequest, SearchSource};
/// # #[derive(Debug)]
/// # struct Cities;
/// # #[async_trait::async_trait]
/// # impl SearchSource for Cities {
/// #     type Item = String;
/// #     async fn search(&self, _: &SearchRequest) -> Result<ResultPage<String>, SearchError> {
/// #         Ok(ResultPage::empty())
/// #     }
/// # }
/// # #[tokio::main]
/// # async fn main() {
/// use vista_core::{SearchPolicy, spawn_search_coordinator};
///
/// let handle = spawn_search_coordinator(Cities, SearchPolicy::new(3, 5, false));
/// handle.set_query("Lisbon").await.unwrap();
/// # }
/// ```
pub fn spawn_search_coordinator<S>(
    source: S,
    policy: SearchPolicy,
) -> SearchCoordinatorHandle<S::Item>
where
    S: SearchSource + 'static,
{
    let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
    let state = SearchState::new(policy);
    let (snapshots, snapshot_receiver) = watch::channel(state.snapshot());

    let actor = CoordinatorActor {
        source: Arc::new(source),
        state,
        debounce_deadline: None,
        in_flight: FuturesUnordered::new(),
        snapshots,
    };

    tokio::spawn(actor.run(receiver));

    SearchCoordinatorHandle::new(sender, snapshot_receiver)
}

struct CoordinatorActor<S: SearchSource> {
    source: Arc<S>,
    state: SearchState<S::Item>,
    debounce_deadline: Option<Instant>,
    in_flight: FuturesUnordered<BoxFuture<'static, FetchOutcome<S::Item>>>,
    snapshots: watch::Sender<SearchSnapshot<S::Item>>,
}

impl<S> CoordinatorActor<S>
where
    S: SearchSource + 'static,
{
    /// Runs the message processing loop until shutdown or until every
    /// handle is dropped. Pending fetches are dropped with the actor.
    async fn run(mut self, mut receiver: mpsc::Receiver<CoordinatorCommand<S::Item>>) {
        tracing::debug!(source = ?self.source, "Search coordinator started");

        loop {
            tokio::select! {
                biased;

                command = receiver.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command) {
                            break;
                        }
                    }
                    None => break,
                },

                Some(outcome) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.apply(outcome);
                }

                () = wait_until(self.debounce_deadline), if self.debounce_deadline.is_some() => {
                    self.debounce_deadline = None;
                    let plan = self.state.begin_reset();
                    tracing::debug!(
                        generation = plan.generation,
                        query = %plan.request.query,
                        "Debounce elapsed, fetching"
                    );
                    self.dispatch(plan);
                    self.publish();
                }
            }
        }

        tracing::debug!(
            dropped_fetches = self.in_flight.len(),
            "Search coordinator stopped"
        );
    }

    /// Handles a single command. Returns false to shut down.
    fn handle_command(&mut self, command: CoordinatorCommand<S::Item>) -> bool {
        match command {
            CoordinatorCommand::SetQuery { text } => match self.state.set_query(text) {
                QueryChange::Unchanged => {}
                QueryChange::Debounce => {
                    self.debounce_deadline = Some(Instant::now() + self.state.policy().debounce);
                    self.publish();
                }
                QueryChange::Cleared => {
                    self.debounce_deadline = None;
                    tracing::trace!("Query below minimum length, results cleared");
                    self.publish();
                }
            },

            CoordinatorCommand::TriggerInitialLoad { filter } => {
                self.debounce_deadline = None;
                let plan = self.state.trigger_initial_load(filter);
                tracing::debug!(
                    generation = plan.generation,
                    filter = ?plan.request.filter,
                    "Filter changed, fetching first page"
                );
                self.dispatch(plan);
                self.publish();
            }

            CoordinatorCommand::LoadNextPage => match self.state.begin_next_page() {
                Some(plan) => {
                    tracing::debug!(
                        generation = plan.generation,
                        page = plan.request.page,
                        "Loading next page"
                    );
                    self.dispatch(plan);
                    self.publish();
                }
                None => tracing::trace!("Next page request ignored"),
            },

            CoordinatorCommand::GetSnapshot { responder } => {
                let _ = responder.send(self.state.snapshot());
            }

            CoordinatorCommand::Shutdown { responder } => {
                tracing::debug!("Search coordinator shutting down");
                let _ = responder.send(());
                return false;
            }
        }

        true
    }

    fn dispatch(&mut self, plan: FetchPlan) {
        let source = Arc::clone(&self.source);
        self.in_flight.push(Box::pin(async move {
            let result = source.search(&plan.request).await;
            FetchOutcome {
                generation: plan.generation,
                kind: plan.kind,
                page: plan.request.page,
                result,
            }
        }));
    }

    fn apply(&mut self, outcome: FetchOutcome<S::Item>) {
        let generation = outcome.generation;
        match &outcome.result {
            Err(error) if error.is_recoverable() => {
                tracing::warn!(generation, "Search fetch failed: {}", error);
            }
            Err(error) => tracing::error!(generation, "Search source misconfigured: {}", error),
            Ok(_) => {}
        }

        match self.state.complete(outcome) {
            Completion::Applied => self.publish(),
            Completion::Stale => tracing::debug!(
                generation,
                latest = self.state.generation(),
                "Discarding stale search response"
            ),
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.snapshot());
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
