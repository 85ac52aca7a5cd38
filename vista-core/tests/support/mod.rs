//! Scripted search source shared by the coordinator integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use vista_core::{ResultPage, SearchError, SearchRequest, SearchSource};

type PageResult = Result<ResultPage<u32>, SearchError>;

#[derive(Debug)]
enum Behaviour {
    /// Serves pages out of `0..total`
    Dataset { total: u32 },
    /// Every call waits until the test resolves it
    Gated,
}

#[derive(Debug)]
struct Inner {
    behaviour: Behaviour,
    calls: Mutex<Vec<SearchRequest>>,
    gates: Mutex<Vec<(SearchRequest, Option<oneshot::Sender<PageResult>>)>>,
    fail_next: AtomicBool,
}

/// Search source whose responses are under test control.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    inner: Arc<Inner>,
}

impl ScriptedSource {
    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            inner: Arc::new(Inner {
                behaviour,
                calls: Mutex::new(Vec::new()),
                gates: Mutex::new(Vec::new()),
                fail_next: AtomicBool::new(false),
            }),
        }
    }

    /// Answers immediately from a dataset of `total` items.
    pub fn dataset(total: u32) -> Self {
        Self::with_behaviour(Behaviour::Dataset { total })
    }

    /// Holds every call until [`resolve`](Self::resolve) is called for it.
    pub fn gated() -> Self {
        Self::with_behaviour(Behaviour::Gated)
    }

    /// Makes the next dataset call fail with a transport error.
    pub fn fail_next(&self) {
        self.inner.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<SearchRequest> {
        self.inner.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().len()
    }

    /// Completes the gated call with index `call`.
    pub fn resolve(&self, call: usize, result: PageResult) {
        let gate = self.inner.gates.lock()[call]
            .1
            .take()
            .expect("gated call resolved twice");
        let _ = gate.send(result);
    }

    /// Completes the first unresolved gated call made with `filter`.
    pub fn resolve_filter(&self, filter: &str, result: PageResult) {
        let gate = self
            .inner
            .gates
            .lock()
            .iter_mut()
            .find(|(request, gate)| {
                gate.is_some() && request.filter.as_deref() == Some(filter)
            })
            .and_then(|(_, gate)| gate.take())
            .expect("no pending call for filter");
        let _ = gate.send(result);
    }

    /// Yields to the coordinator until it has issued `count` calls.
    pub async fn wait_for_calls(&self, count: usize) {
        for _ in 0..1_000 {
            if self.call_count() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "expected {count} search calls, saw {}",
            self.call_count()
        );
    }
}

#[async_trait]
impl SearchSource for ScriptedSource {
    type Item = u32;

    async fn search(&self, request: &SearchRequest) -> PageResult {
        self.inner.calls.lock().push(request.clone());

        match self.inner.behaviour {
            Behaviour::Dataset { total } => {
                if self.inner.fail_next.swap(false, Ordering::SeqCst) {
                    return Err(network_error());
                }
                let start = (request.page - 1) * request.page_size;
                let end = (start + request.page_size).min(total);
                Ok(ResultPage::new((start.min(end)..end).collect()))
            }
            Behaviour::Gated => {
                let (sender, receiver) = oneshot::channel();
                self.inner
                    .gates
                    .lock()
                    .push((request.clone(), Some(sender)));
                receiver.await.unwrap_or_else(|_| Err(network_error()))
            }
        }
    }
}

pub fn network_error() -> SearchError {
    SearchError::Transport {
        reason: "connection refused".to_string(),
    }
}

pub fn page(items: impl IntoIterator<Item = u32>) -> PageResult {
    Ok(ResultPage::new(items.into_iter().collect()))
}

/// Lets every runnable task finish before the test continues.
///
/// Under a paused clock the runtime only advances time once all tasks are
/// idle, so sleeping a millisecond doubles as a barrier.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
