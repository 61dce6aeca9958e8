//! Live View
//!
//! Keeps a displayed entity or collection in sync with the live-update hub.
//!
//! A view is **Idle** when no hub is known (or the stream ended), and
//! **Subscribed** while its background task holds the event stream open.
//! Pushed messages are merged one at a time, in arrival order, by that
//! single task; the view is **Updated** once a merge changed something.
//! Subscription problems never reach the caller: the displayed value just
//! stops changing.

use super::merge::LiveState;
use super::sse::SseDecoder;
use crate::collection::PagedCollection;
use crate::fetch::{ApiClient, FetchResponse};
use crate::resource::{normalize, Resource};
use futures_util::{pin_mut, StreamExt};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Subscription state of a [`LiveView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivePhase {
    Idle,
    Subscribed,
    Updated,
}

/// A displayed value kept up to date by server pushes
pub struct LiveView<S: LiveState> {
    http: Client,
    entrypoint: Url,
    hub_url: Option<String>,
    state: Arc<watch::Sender<S>>,
    updates: Arc<AtomicU64>,
    topics: Vec<String>,
    task: Option<JoinHandle<()>>,
}

impl LiveView<Option<Resource>> {
    /// Watch a fetched item
    pub fn item(client: &ApiClient, response: FetchResponse<Resource>) -> Self {
        Self::new(client, Some(response.data), response.hub_url)
    }
}

impl LiveView<PagedCollection> {
    /// Watch every member of a fetched page
    pub fn collection(client: &ApiClient, response: FetchResponse<PagedCollection>) -> Self {
        Self::new(client, response.data, response.hub_url)
    }
}

impl<S: LiveState> LiveView<S> {
    /// Display `initial`, subscribing to `hub_url` when one is known
    ///
    /// Must be called from within a tokio runtime for the subscription to
    /// start; otherwise the view stays idle.
    pub fn new(client: &ApiClient, initial: S, hub_url: Option<String>) -> Self {
        let (state, _) = watch::channel(initial);
        let mut view = Self {
            http: client.http().clone(),
            entrypoint: client.entrypoint().clone(),
            hub_url,
            state: Arc::new(state),
            updates: Arc::new(AtomicU64::new(0)),
            topics: Vec::new(),
            task: None,
        };
        view.open();
        view
    }

    /// Currently displayed value
    pub fn current(&self) -> S {
        self.state.borrow().clone()
    }

    /// Receiver notified after every merge
    pub fn watch(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub fn hub_url(&self) -> Option<&str> {
        self.hub_url.as_deref()
    }

    /// IRIs the open subscription listens to (empty when idle)
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn phase(&self) -> LivePhase {
        match &self.task {
            Some(task) if !task.is_finished() => {
                if self.updates.load(Ordering::Acquire) > 0 {
                    LivePhase::Updated
                } else {
                    LivePhase::Subscribed
                }
            }
            _ => LivePhase::Idle,
        }
    }

    /// Switch hubs; the current subscription is torn down when it changes
    pub fn set_hub_url(&mut self, hub_url: Option<String>) {
        if self.hub_url == hub_url {
            return;
        }
        self.hub_url = hub_url;
        self.open();
    }

    /// Display freshly fetched data, resubscribing when its topics differ
    pub fn replace(&mut self, value: S) {
        let topics = value.topics();
        self.state.send_replace(value);
        if topics != self.topics {
            self.open();
        }
    }

    /// Release the subscription and go back to idle
    pub fn close(&mut self) {
        self.topics.clear();
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(hub = ?self.hub_url, "Live updates closed");
        }
    }

    fn open(&mut self) {
        self.close();

        let Some(hub_url) = self.hub_url.clone() else {
            return;
        };
        let topics = self.state.borrow().topics();
        if topics.is_empty() {
            return;
        }

        let url = match subscription_url(&self.entrypoint, &hub_url, &topics) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(hub = %hub_url, error = %e, "Invalid live-update hub");
                return;
            }
        };
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("No async runtime, live updates disabled");
            return;
        };

        tracing::info!(hub = %hub_url, topics = topics.len(), "Live updates subscribed");

        self.updates.store(0, Ordering::Release);
        self.topics = topics;
        self.task = Some(runtime.spawn(run(
            self.http.clone(),
            url,
            Arc::clone(&self.state),
            Arc::clone(&self.updates),
        )));
    }
}

impl<S: LiveState> Drop for LiveView<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Error of [`Url`] parsing and joining
pub type UrlParseError = <Url as FromStr>::Err;

/// Hub URL with one `topic` parameter per absolute IRI
pub fn subscription_url(
    entrypoint: &Url,
    hub_url: &str,
    topics: &[String],
) -> Result<Url, UrlParseError> {
    let mut url = entrypoint.join(hub_url)?;
    for topic in topics {
        let topic = entrypoint.join(topic)?;
        url.query_pairs_mut().append_pair("topic", topic.as_str());
    }
    Ok(url)
}

async fn run<S: LiveState>(
    http: Client,
    url: Url,
    state: Arc<watch::Sender<S>>,
    updates: Arc<AtomicU64>,
) {
    let response = match http
        .get(url.clone())
        .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            tracing::debug!(hub = %url, status = response.status().as_u16(), "Live-update subscription refused");
            return;
        }
        Err(e) => {
            tracing::debug!(hub = %url, error = %e, "Live-update connection failed");
            return;
        }
    };

    let body = response.bytes_stream();
    pin_mut!(body);
    let mut decoder = SseDecoder::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::debug!(hub = %url, error = %e, "Live-update stream interrupted");
                break;
            }
        };

        for event in decoder.push(&chunk) {
            if event.event != "message" {
                continue;
            }
            let update = serde_json::from_str(&event.data)
                .map(normalize)
                .and_then(serde_json::from_value::<Resource>);
            match update {
                Ok(update) => {
                    let id = update.id.clone();
                    if state.send_if_modified(|value| value.apply(update)) {
                        updates.fetch_add(1, Ordering::AcqRel);
                        tracing::debug!(id = ?id, "Live update merged");
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring undecodable live update");
                }
            }
        }
    }

    tracing::debug!(hub = %url, "Live-update stream closed");
}
