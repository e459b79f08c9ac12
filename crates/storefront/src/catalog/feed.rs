//! Paginated, filterable view over a [`CatalogSource`].
//!
//! ```text
//! Idle ──load_initial──► Loading ──► Ready | Errored
//! Ready ──load_more────► LoadingMore ──► Ready        (failure keeps the list)
//! Ready | Errored ──refresh──► Refreshing ──► Ready | Errored
//! ```
//!
//! A load or refresh dropped before it finishes puts the feed back in the
//! status it had before the call.
//!
//! All operations take `&self`, so one feed can be shared between the task
//! driving pagination and the task rendering results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::catalog::{CatalogSource, FetchError, Product};

/// Lifecycle state of a [`CatalogFeed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// First page is loading.
    Loading,
    /// First page is reloading on a pull-to-refresh.
    Refreshing,
    /// Products are available.
    Ready,
    /// The next page is loading; the current list stays visible.
    LoadingMore,
    /// The last load or refresh failed. See [`CatalogFeed::error`].
    Errored,
}

/// Result of a [`CatalogFeed::load_more`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// A page was appended with this many products.
    Appended(usize),
    /// Another load-more was in flight, or the feed is not ready.
    Skipped,
    /// The page request failed; the cursor was not advanced.
    Failed,
    /// A refresh started while the page was loading, so it was dropped.
    Discarded,
}

#[derive(Debug)]
struct FeedState {
    items: Vec<Product>,
    page: u32,
    query: String,
    status: FeedStatus,
    error: Option<String>,
    /// Bumped on every reload so in-flight pages from an older list can be
    /// recognised and dropped.
    generation: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            query: String::new(),
            status: FeedStatus::Idle,
            error: None,
            generation: 0,
        }
    }
}

/// Paginated product feed with free-text filtering.
pub struct CatalogFeed<S> {
    source: S,
    state: Mutex<FeedState>,
    loading_more: AtomicBool,
}

/// Clears the load-more flag when the request finishes or is cancelled.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Returns the feed to a settled status if a load is dropped before it
/// writes its result.
///
/// Only acts while the generation is unchanged and the status is still the
/// in-progress one the load set, so a completed or superseded load is left
/// alone.
struct Settle<'a> {
    state: &'a Mutex<FeedState>,
    generation: u64,
    pending: FeedStatus,
    restore: FeedStatus,
    error: Option<String>,
}

impl Drop for Settle<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation != self.generation || state.status != self.pending {
            return;
        }
        debug!(status = ?self.restore, "Load cancelled, restoring feed status");
        state.status = self.restore;
        if self.restore == FeedStatus::Errored {
            state.error = self.error.take();
        }
    }
}

impl<S: CatalogSource> CatalogFeed<S> {
    /// Create an idle feed over `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(FeedState::default()),
            loading_more: AtomicBool::new(false),
        }
    }

    /// Fetch a single page straight from the source, leaving feed state alone.
    ///
    /// # Errors
    ///
    /// Returns the source's [`FetchError`] unchanged.
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<Product>, FetchError> {
        self.source.fetch_page(page).await
    }

    /// Load page 1, replacing whatever was accumulated.
    ///
    /// # Errors
    ///
    /// On failure the feed enters [`FeedStatus::Errored`] with a sticky,
    /// shopper-facing message and an empty list; the error is also returned.
    pub async fn load_initial(&self) -> Result<(), FetchError> {
        self.reload(FeedStatus::Loading).await
    }

    /// Pull-to-refresh: identical to [`Self::load_initial`] but reported as
    /// [`FeedStatus::Refreshing`] while in progress.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_initial`].
    pub async fn refresh(&self) -> Result<(), FetchError> {
        self.reload(FeedStatus::Refreshing).await
    }

    async fn reload(&self, status: FeedStatus) -> Result<(), FetchError> {
        let settle = {
            let mut state = self.state();
            let restore = match state.status {
                FeedStatus::Errored => FeedStatus::Errored,
                FeedStatus::Idle | FeedStatus::Loading | FeedStatus::Refreshing
                    if state.items.is_empty() =>
                {
                    FeedStatus::Idle
                }
                _ => FeedStatus::Ready,
            };
            state.generation += 1;
            state.status = status;
            Settle {
                state: &self.state,
                generation: state.generation,
                pending: status,
                restore,
                error: state.error.take(),
            }
        };
        let generation = settle.generation;

        let result = self.source.fetch_page(1).await;

        let mut state = self.state();
        if state.generation != generation {
            debug!("Superseded reload finished, dropping result");
            return result.map(|_| ());
        }

        match result {
            Ok(products) => {
                info!(count = products.len(), "Catalog loaded");
                state.items = products;
                state.page = 1;
                state.status = FeedStatus::Ready;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load catalog");
                state.items.clear();
                state.page = 1;
                state.status = FeedStatus::Errored;
                state.error = Some(e.user_message().to_string());
                Err(e)
            }
        }
    }

    /// Append the next page.
    ///
    /// Calls made while another load-more is in flight return
    /// [`LoadMoreOutcome::Skipped`] without touching the network. Failures
    /// are logged and leave the list and cursor unchanged, so the next call
    /// retries the same page.
    pub async fn load_more(&self) -> LoadMoreOutcome {
        if self
            .loading_more
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Load more already in flight");
            return LoadMoreOutcome::Skipped;
        }
        let _in_flight = InFlight(&self.loading_more);

        let (next_page, generation) = {
            let mut state = self.state();
            if state.status != FeedStatus::Ready {
                debug!(status = ?state.status, "Feed not ready for load more");
                return LoadMoreOutcome::Skipped;
            }
            state.status = FeedStatus::LoadingMore;
            (state.page + 1, state.generation)
        };
        let _settle = Settle {
            state: &self.state,
            generation,
            pending: FeedStatus::LoadingMore,
            restore: FeedStatus::Ready,
            error: None,
        };

        let result = self.source.fetch_page(next_page).await;

        let mut state = self.state();
        if state.generation != generation {
            debug!(page = next_page, "Feed reloaded during load more, dropping page");
            return LoadMoreOutcome::Discarded;
        }
        state.status = FeedStatus::Ready;

        match result {
            Ok(products) => {
                let count = products.len();
                state.items.extend(products);
                state.page = next_page;
                debug!(page = next_page, count, "Appended catalog page");
                LoadMoreOutcome::Appended(count)
            }
            Err(e) => {
                warn!(error = %e, page = next_page, "Failed to load more products");
                LoadMoreOutcome::Failed
            }
        }
    }

    /// Set the free-text filter. Does not touch the accumulated list.
    pub fn set_query(&self, text: impl Into<String>) {
        self.state().query = text.into();
    }

    /// Current filter text.
    #[must_use]
    pub fn query(&self) -> String {
        self.state().query.clone()
    }

    /// Accumulated products matching the current query, in feed order.
    ///
    /// Matching is a case-insensitive substring test against title or
    /// category; an empty query matches everything.
    #[must_use]
    pub fn visible_items(&self) -> Vec<Product> {
        let state = self.state();
        if state.query.is_empty() {
            return state.items.clone();
        }
        let needle = state.query.to_lowercase();
        state
            .items
            .iter()
            .filter(|product| product.matches_lowercase(&needle))
            .cloned()
            .collect()
    }

    /// Every product fetched so far, unfiltered.
    #[must_use]
    pub fn items(&self) -> Vec<Product> {
        self.state().items.clone()
    }

    /// Number of products fetched so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    /// Whether no products have been fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    /// Last page successfully loaded.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.state().page
    }

    #[must_use]
    pub fn status(&self) -> FeedStatus {
        self.state().status
    }

    /// Sticky error message from the last failed load or refresh.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status() == FeedStatus::Loading
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.status() == FeedStatus::Refreshing
    }

    #[must_use]
    pub fn is_loading_more(&self) -> bool {
        self.loading_more.load(Ordering::Acquire)
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use open_fashion_core::{Price, ProductId};
    use tokio::sync::Semaphore;

    use super::*;

    const PAGE_SIZE: u32 = 14;

    fn product(id: i64, title: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::from_cents(1000),
            category: category.to_string(),
            image: String::new(),
            description: None,
            rating: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Serves `PAGE_SIZE` products per page. Pages listed in `failing` error;
    /// when `gate` is set every request waits for a permit.
    #[derive(Default)]
    struct FakeSource {
        failing: Mutex<HashSet<u32>>,
        requested: Mutex<Vec<u32>>,
        started: AtomicUsize,
        gate: Option<Semaphore>,
    }

    impl FakeSource {
        fn gated() -> Self {
            Self {
                gate: Some(Semaphore::new(0)),
                ..Self::default()
            }
        }

        fn fail_page(&self, page: u32) {
            self.failing.lock().unwrap().insert(page);
        }

        fn heal_page(&self, page: u32) {
            self.failing.lock().unwrap().remove(&page);
        }

        fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.add_permits(1);
            }
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }

        async fn wait_for_requests(&self, n: usize) {
            while self.started.load(Ordering::SeqCst) < n {
                tokio::task::yield_now().await;
            }
        }
    }

    impl CatalogSource for FakeSource {
        async fn fetch_page(&self, page: u32) -> Result<Vec<Product>, FetchError> {
            self.requested.lock().unwrap().push(page);
            self.started.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            if self.failing.lock().unwrap().contains(&page) {
                return Err(FetchError::Status {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            let start = i64::from((page - 1) * PAGE_SIZE) + 1;
            Ok((start..start + i64::from(PAGE_SIZE))
                .map(|id| product(id, &format!("Item {id}"), "misc"))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_paginate_then_refresh() {
        let feed = CatalogFeed::new(FakeSource::default());
        assert_eq!(feed.status(), FeedStatus::Idle);

        feed.load_initial().await.unwrap();
        assert_eq!(feed.len(), 14);
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.status(), FeedStatus::Ready);

        assert_eq!(feed.load_more().await, LoadMoreOutcome::Appended(14));
        assert_eq!(feed.len(), 28);
        assert_eq!(feed.page(), 2);
        assert_eq!(feed.items()[27].id, ProductId::new(28));

        feed.refresh().await.unwrap();
        assert_eq!(feed.len(), 14);
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.source.requested(), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_initial_failure_is_sticky() {
        let source = FakeSource::default();
        source.fail_page(1);
        let feed = CatalogFeed::new(source);

        let err = feed.load_initial().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        assert_eq!(feed.status(), FeedStatus::Errored);
        assert!(feed.is_empty());
        assert_eq!(
            feed.error().as_deref(),
            Some("Failed to fetch products. Please try again.")
        );

        // Unrelated interactions leave the error in place
        feed.set_query("shirt");
        assert_eq!(feed.load_more().await, LoadMoreOutcome::Skipped);
        assert!(feed.error().is_some());

        // An explicit refresh recovers
        feed.source.heal_page(1);
        feed.refresh().await.unwrap();
        assert_eq!(feed.status(), FeedStatus::Ready);
        assert!(feed.error().is_none());
        assert_eq!(feed.len(), 14);
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_list() {
        let feed = CatalogFeed::new(FakeSource::default());
        feed.load_initial().await.unwrap();
        feed.load_more().await;

        feed.source.fail_page(1);
        assert!(feed.refresh().await.is_err());
        assert!(feed.is_empty());
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.status(), FeedStatus::Errored);
    }

    #[tokio::test]
    async fn test_load_more_failure_keeps_state_and_retries_same_page() {
        let feed = CatalogFeed::new(FakeSource::default());
        feed.load_initial().await.unwrap();

        feed.source.fail_page(2);
        assert_eq!(feed.load_more().await, LoadMoreOutcome::Failed);
        assert_eq!(feed.len(), 14);
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.status(), FeedStatus::Ready);
        assert!(feed.error().is_none());
        assert!(!feed.is_loading_more());

        feed.source.heal_page(2);
        assert_eq!(feed.load_more().await, LoadMoreOutcome::Appended(14));
        assert_eq!(feed.source.requested(), vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn test_concurrent_load_more_appends_once() {
        let feed = Arc::new(CatalogFeed::new(FakeSource::gated()));
        feed.source.release();
        feed.load_initial().await.unwrap();

        let first = tokio::spawn({
            let feed = Arc::clone(&feed);
            async move { feed.load_more().await }
        });
        feed.source.wait_for_requests(2).await;
        assert!(feed.is_loading_more());
        assert_eq!(feed.status(), FeedStatus::LoadingMore);

        assert_eq!(feed.load_more().await, LoadMoreOutcome::Skipped);

        feed.source.release();
        assert_eq!(first.await.unwrap(), LoadMoreOutcome::Appended(14));
        assert_eq!(feed.len(), 28);
        assert_eq!(feed.page(), 2);
        assert_eq!(feed.source.requested(), vec![1, 2]);
        assert!(!feed.is_loading_more());
    }

    #[tokio::test]
    async fn test_refresh_during_load_more_discards_stale_page() {
        let feed = Arc::new(CatalogFeed::new(FakeSource::gated()));
        feed.source.release();
        feed.load_initial().await.unwrap();

        let more = tokio::spawn({
            let feed = Arc::clone(&feed);
            async move { feed.load_more().await }
        });
        feed.source.wait_for_requests(2).await;

        let refresh = tokio::spawn({
            let feed = Arc::clone(&feed);
            async move { feed.refresh().await }
        });
        feed.source.wait_for_requests(3).await;
        assert!(feed.is_refreshing());

        // Completion order does not matter, the page is stale either way
        feed.source.release();
        feed.source.release();
        refresh.await.unwrap().unwrap();
        assert_eq!(more.await.unwrap(), LoadMoreOutcome::Discarded);

        assert_eq!(feed.len(), 14);
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.status(), FeedStatus::Ready);
    }

    #[tokio::test]
    async fn test_cancelled_load_more_returns_to_ready() {
        let feed = CatalogFeed::new(FakeSource::gated());
        feed.source.release();
        feed.load_initial().await.unwrap();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), feed.load_more()).await;
        assert!(timed_out.is_err());
        assert_eq!(feed.status(), FeedStatus::Ready);
        assert!(!feed.is_loading_more());
        assert_eq!(feed.page(), 1);

        feed.source.release();
        assert_eq!(feed.load_more().await, LoadMoreOutcome::Appended(14));
        assert_eq!(feed.len(), 28);
        assert_eq!(feed.page(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_refresh_restores_previous_status() {
        let feed = CatalogFeed::new(FakeSource::gated());
        feed.source.release();
        feed.load_initial().await.unwrap();

        let timed_out = tokio::time::timeout(Duration::from_millis(50), feed.refresh()).await;
        assert!(timed_out.is_err());
        assert_eq!(feed.status(), FeedStatus::Ready);
        assert_eq!(feed.len(), 14);

        feed.source.release();
        assert_eq!(feed.load_more().await, LoadMoreOutcome::Appended(14));
    }

    #[tokio::test]
    async fn test_cancelled_initial_load_keeps_sticky_error() {
        let feed = CatalogFeed::new(FakeSource::gated());
        feed.source.fail_page(1);
        feed.source.release();
        assert!(feed.load_initial().await.is_err());

        let timed_out = tokio::time::timeout(Duration::from_millis(50), feed.refresh()).await;
        assert!(timed_out.is_err());
        assert_eq!(feed.status(), FeedStatus::Errored);
        assert!(feed.error().is_some());

        let feed = CatalogFeed::new(FakeSource::gated());
        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), feed.load_initial()).await;
        assert!(timed_out.is_err());
        assert_eq!(feed.status(), FeedStatus::Idle);
        assert!(!feed.is_loading());
    }

    #[tokio::test]
    async fn test_loading_flag_during_initial_load() {
        let feed = Arc::new(CatalogFeed::new(FakeSource::gated()));
        let load = tokio::spawn({
            let feed = Arc::clone(&feed);
            async move { feed.load_initial().await }
        });
        feed.source.wait_for_requests(1).await;
        assert!(feed.is_loading());
        assert!(!feed.is_refreshing());

        feed.source.release();
        load.await.unwrap().unwrap();
        assert!(!feed.is_loading());
    }

    #[test]
    fn test_query_filters_title_or_category_in_order() {
        let feed = CatalogFeed::new(FakeSource::default());
        feed.state().items = vec![
            product(1, "Blue Shirt", "men's clothing"),
            product(2, "Hat", "accessories"),
            product(3, "T-Shirt", "women's clothing"),
        ];

        feed.set_query("shirt");
        let titles: Vec<_> = feed.visible_items().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["Blue Shirt", "T-Shirt"]);

        feed.set_query("CLOTHING");
        assert_eq!(feed.visible_items().len(), 2);

        feed.set_query("");
        assert_eq!(feed.visible_items().len(), 3);
        assert_eq!(feed.items().len(), 3);
        assert_eq!(feed.query(), "");
    }

    #[tokio::test]
    async fn test_fetch_page_does_not_touch_state() {
        let feed = CatalogFeed::new(FakeSource::default());
        let page = feed.fetch_page(3).await.unwrap();
        assert_eq!(page[0].id, ProductId::new(29));
        assert!(feed.is_empty());
        assert_eq!(feed.status(), FeedStatus::Idle);
    }
}
