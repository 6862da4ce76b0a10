//! Incremental loading of the news feed, one page at a time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::domain::entities::{FeedPage, NewsItem};
use crate::domain::errors::FeedError;
use crate::domain::ports::FeedPort;

/// Rule deciding whether the feed has more pages after an update.
///
/// Both compare the latest page's `total_count` with the number of items
/// accumulated so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Continuation {
    /// More data while `total_count > loaded`.
    #[default]
    Strict,
    /// More data while `total_count >= loaded`. Costs one extra fetch after
    /// the last full page.
    Inclusive,
}

impl Continuation {
    /// Whether more pages exist once `loaded` of `total_count` items arrived.
    #[must_use]
    pub const fn has_more(self, total_count: u64, loaded: usize) -> bool {
        let loaded = loaded as u64;
        match self {
            Self::Strict => total_count > loaded,
            Self::Inclusive => total_count >= loaded,
        }
    }
}

impl std::fmt::Display for Continuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Inclusive => write!(f, "inclusive"),
        }
    }
}

/// Lifecycle of the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPhase {
    /// Ready to load the next page.
    #[default]
    Idle,
    /// A page fetch is in flight.
    Loading,
    /// The feed reported no more pages. Terminal.
    Exhausted,
}

impl std::fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Accumulated feed contents. Only changed by a successful page load.
#[derive(Debug, Clone)]
pub struct PaginationState {
    items: Vec<NewsItem>,
    cursor: u32,
    has_more: bool,
}

impl PaginationState {
    /// Empty state: cursor 1, more data expected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: 1,
            has_more: true,
        }
    }

    /// Items in arrival order.
    #[must_use]
    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    /// Next page number to request.
    #[must_use]
    pub const fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Whether the feed may hold more pages.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view published to subscribers after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// Number of accumulated items.
    pub item_count: usize,
    /// Next page number to request.
    pub cursor: u32,
    /// Whether the feed may hold more pages.
    pub has_more: bool,
    /// Current lifecycle phase.
    pub phase: LoadPhase,
    /// Message of the last failed load, if it was not followed by a success.
    pub last_error: Option<String>,
}

/// Parameters of one page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Requested items per page.
    pub page_size: u32,
}

/// Completion of a page fetch started by [`PaginationController::request_next`].
#[derive(Debug)]
pub struct PageLoadedEvent {
    /// The fetch this completes.
    pub request: PageRequest,
    /// The fetched page, or why the fetch failed.
    pub result: Result<FeedPage, FeedError>,
}

/// What a load attempt did to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was appended.
    Appended {
        /// Items on the page.
        added: usize,
        /// Whether the feed may hold more pages.
        has_more: bool,
    },
    /// The fetch failed; state is unchanged and the load may be retried.
    Failed(FeedError),
    /// Nothing was requested because of the current phase.
    Skipped(LoadPhase),
    /// The completion did not belong to the fetch in flight.
    Stale,
}

/// Drives page-by-page loading of the feed.
///
/// At most one fetch is in flight: while `Loading` (or once `Exhausted`),
/// further load requests are no-ops. Completions are applied on the task
/// that owns the controller.
pub struct PaginationController {
    feed: Arc<dyn FeedPort>,
    page_size: u32,
    continuation: Continuation,
    state: PaginationState,
    phase: LoadPhase,
    in_flight: Option<PageRequest>,
    last_error: Option<String>,
    snapshot_tx: watch::Sender<FeedSnapshot>,
    event_tx: mpsc::UnboundedSender<PageLoadedEvent>,
    event_rx: mpsc::UnboundedReceiver<PageLoadedEvent>,
}

impl std::fmt::Debug for PaginationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController")
            .field("page_size", &self.page_size)
            .field("continuation", &self.continuation)
            .field("phase", &self.phase)
            .field("cursor", &self.state.cursor)
            .field("items", &self.state.items.len())
            .finish_non_exhaustive()
    }
}

impl PaginationController {
    /// Creates a controller starting at page 1 with no items.
    ///
    /// A `page_size` of zero is raised to one.
    #[must_use]
    pub fn new(feed: Arc<dyn FeedPort>, page_size: u32) -> Self {
        let state = PaginationState::new();
        let (snapshot_tx, _) = watch::channel(FeedSnapshot {
            item_count: 0,
            cursor: state.cursor,
            has_more: state.has_more,
            phase: LoadPhase::Idle,
            last_error: None,
        });
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            feed,
            page_size: page_size.max(1),
            continuation: Continuation::default(),
            state,
            phase: LoadPhase::Idle,
            in_flight: None,
            last_error: None,
            snapshot_tx,
            event_tx,
            event_rx,
        }
    }

    /// Replaces the rule deciding when the feed is exhausted.
    #[must_use]
    pub const fn with_continuation(mut self, continuation: Continuation) -> Self {
        self.continuation = continuation;
        self
    }

    /// Every item loaded so far, in arrival order.
    #[must_use]
    pub fn items(&self) -> &[NewsItem] {
        self.state.items()
    }

    /// Accumulated items, cursor and continuation flag.
    #[must_use]
    pub const fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Next page number to request.
    #[must_use]
    pub const fn cursor(&self) -> u32 {
        self.state.cursor
    }

    /// Whether the feed may hold more pages.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.state.has_more
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Items requested per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Message of the most recent failed load, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Subscribes to snapshots published after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Current state as published to subscribers.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            item_count: self.state.items.len(),
            cursor: self.state.cursor,
            has_more: self.state.has_more,
            phase: self.phase,
            last_error: self.last_error.clone(),
        }
    }

    /// Returns true when the row at `visible_index` is the last loaded item
    /// and the feed may have more, i.e. the view should ask for a new page.
    #[must_use]
    pub fn should_load_more(&self, visible_index: usize) -> bool {
        self.state.has_more && visible_index + 1 == self.state.items.len()
    }

    /// Loads the next page and applies the result before returning.
    ///
    /// Dropping the future before it resolves abandons the fetch and
    /// returns the controller to `Idle`, so the page can be requested again.
    pub async fn load_next(&mut self) -> LoadOutcome {
        let Some(request) = self.begin() else {
            return LoadOutcome::Skipped(self.phase);
        };

        let feed = Arc::clone(&self.feed);
        let mut guard = InFlightGuard {
            controller: self,
            request,
            settled: false,
        };
        let result = feed.fetch_page(request.page, request.page_size).await;
        guard.settled = true;
        guard.controller.apply(PageLoadedEvent { request, result })
    }

    /// Starts loading the next page in the background.
    ///
    /// Returns false when nothing was started. The completion must be
    /// applied with [`PaginationController::complete_next`]. A fetch task
    /// that panics completes as a transport failure.
    pub fn request_next(&mut self) -> bool {
        let Some(request) = self.begin() else {
            return false;
        };

        let feed = Arc::clone(&self.feed);
        let event_tx = self.event_tx.clone();
        let fetch =
            tokio::spawn(async move { feed.fetch_page(request.page, request.page_size).await });
        tokio::spawn(async move {
            let result = fetch.await.unwrap_or_else(|e| {
                warn!(page = request.page, error = %e, "Feed fetch task failed");
                Err(FeedError::transport(format!("feed task failed: {e}")))
            });
            let _ = event_tx.send(PageLoadedEvent { request, result });
        });
        true
    }

    /// Waits for a background load and applies it.
    ///
    /// Returns `None` when no load is in flight.
    pub async fn complete_next(&mut self) -> Option<LoadOutcome> {
        self.in_flight?;
        let event = self.event_rx.recv().await?;
        Some(self.apply(event))
    }

    /// Applies a finished page fetch.
    pub fn apply(&mut self, event: PageLoadedEvent) -> LoadOutcome {
        if self.in_flight != Some(event.request) {
            debug!(page = event.request.page, "Ignoring completion for a fetch not in flight");
            return LoadOutcome::Stale;
        }
        self.in_flight = None;

        let outcome = match event.result {
            Ok(page) => self.append(page),
            Err(e) => {
                warn!(
                    page = event.request.page,
                    kind = e.kind(),
                    error = %e,
                    "Failed to load feed page"
                );
                self.phase = LoadPhase::Idle;
                self.last_error = Some(e.to_string());
                LoadOutcome::Failed(e)
            }
        };

        self.publish();
        outcome
    }

    fn begin(&mut self) -> Option<PageRequest> {
        if self.phase != LoadPhase::Idle {
            debug!(phase = %self.phase, "Skipping page load");
            return None;
        }

        let request = PageRequest {
            page: self.state.cursor,
            page_size: self.page_size,
        };
        self.phase = LoadPhase::Loading;
        self.in_flight = Some(request);
        self.publish();

        debug!(page = request.page, page_size = request.page_size, "Loading feed page");
        Some(request)
    }

    fn append(&mut self, page: FeedPage) -> LoadOutcome {
        let added = page.len();
        let total_count = page.total_count;

        self.state.items.extend(page.items);
        self.state.cursor += 1;
        // An empty page means the feed ran dry whatever its total says.
        self.state.has_more =
            added > 0 && self.continuation.has_more(total_count, self.state.items.len());
        self.last_error = None;

        self.phase = if self.state.has_more {
            LoadPhase::Idle
        } else {
            LoadPhase::Exhausted
        };

        if self.state.has_more {
            debug!(
                added,
                loaded = self.state.items.len(),
                total_count,
                next_page = self.state.cursor,
                "Feed page appended"
            );
        } else {
            info!(loaded = self.state.items.len(), total_count, "Feed exhausted");
        }

        LoadOutcome::Appended {
            added,
            has_more: self.state.has_more,
        }
    }

    fn abandon(&mut self, request: PageRequest) {
        if self.in_flight != Some(request) {
            return;
        }
        debug!(page = request.page, "Page load cancelled");
        self.in_flight = None;
        self.phase = LoadPhase::Idle;
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

/// Reverts an awaited load that was dropped before its fetch finished.
struct InFlightGuard<'a> {
    controller: &'a mut PaginationController,
    request: PageRequest,
    settled: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.controller.abandon(self.request);
        }
    }
}
