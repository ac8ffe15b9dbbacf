//! News Cache
//!
//! In-memory, symbol-keyed cache of the latest upstream news batch.
//!
//! The whole cache is one immutable snapshot behind an `Arc`. A refresh
//! builds the next snapshot off to the side and swaps it in under a short
//! write lock, so readers only ever clone the `Arc` and see either the old
//! or the new batch in full. Refreshes are single-flight: at most one
//! upstream fetch runs at a time.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex as SyncMutex, RwLock};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use sentiment_core::{ItemValidationError, NewsItem, ValidationLimits};
use sentiment_news::{NewsError, NewsSource};

/// One complete refresh result
#[derive(Debug, Default)]
struct CacheSnapshot {
    by_symbol: HashMap<String, Vec<Arc<NewsItem>>>,
    item_count: usize,
    refreshed_at: Option<DateTime<Utc>>,
}

/// What a staleness-triggered refresh ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cache was fresh, possibly because a concurrent caller just refreshed it
    AlreadyFresh,
    /// This call fetched and swapped in a new batch of the given size
    Refreshed(usize),
}

/// Symbol-keyed news cache with single-flight refresh
pub struct NewsCache {
    source: Arc<dyn NewsSource>,
    limits: ValidationLimits,
    max_articles_per_refresh: usize,
    snapshot: RwLock<Arc<CacheSnapshot>>,
    /// Held for the whole decide-then-refresh sequence
    refresh_guard: Mutex<()>,
    /// Bumped after every fetch attempt, successful or not
    attempts: AtomicU64,
    /// Error of the latest attempt, `None` if it succeeded
    last_failure: SyncMutex<Option<NewsError>>,
    refresh_count: AtomicU64,
    failed_refresh_count: AtomicU64,
}

impl NewsCache {
    /// Create an empty cache fed by `source`
    pub fn new(
        source: Arc<dyn NewsSource>,
        limits: ValidationLimits,
        max_articles_per_refresh: usize,
    ) -> Self {
        info!(
            "Initialized news cache (source: {}, max {} articles per refresh)",
            source.name(),
            max_articles_per_refresh
        );
        Self {
            source,
            limits,
            max_articles_per_refresh,
            snapshot: RwLock::new(Arc::new(CacheSnapshot::default())),
            refresh_guard: Mutex::new(()),
            attempts: AtomicU64::new(0),
            last_failure: SyncMutex::new(None),
            refresh_count: AtomicU64::new(0),
            failed_refresh_count: AtomicU64::new(0),
        }
    }

    fn current(&self) -> Arc<CacheSnapshot> {
        self.snapshot.read().clone()
    }

    /// Cached items for `symbol` published within `[from, to]`, inclusive.
    ///
    /// `symbol` must already be normalized. Unknown symbols yield an empty list.
    pub fn lookup(&self, symbol: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<NewsItem> {
        let snapshot = self.current();
        let Some(items) = snapshot.by_symbol.get(symbol) else {
            return Vec::new();
        };

        items
            .iter()
            .filter(|item| item.published_within(from, to))
            .map(|item| NewsItem::clone(item))
            .collect()
    }

    /// When the last successful refresh completed, `None` before the first one
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.current().refreshed_at
    }

    /// Whether the cached batch is older than `ttl` at `now`
    pub fn needs_refresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match self.last_refresh() {
            None => true, // Never refreshed
            Some(last) => now.signed_duration_since(last) > ttl,
        }
    }

    /// Symbols present in the current snapshot
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.current().by_symbol.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Fetch a new batch and swap it in, waiting for any in-flight refresh first.
    ///
    /// On error the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<usize, NewsError> {
        let _guard = self.refresh_guard.lock().await;
        self.refresh_locked().await
    }

    /// Refresh only if the cache is stale at `now`.
    ///
    /// Callers that queue behind an in-flight refresh reuse its result once
    /// they get the guard, whether it succeeded or failed, instead of
    /// fetching again.
    pub async fn refresh_if_stale(
        &self,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<RefreshOutcome, NewsError> {
        if !self.needs_refresh(now, ttl) {
            return Ok(RefreshOutcome::AlreadyFresh);
        }

        let seen_attempts = self.attempts.load(Ordering::Acquire);
        let _guard = self.refresh_guard.lock().await;

        if self.attempts.load(Ordering::Acquire) != seen_attempts {
            debug!("Reusing the result of a concurrent refresh");
            return match self.last_failure.lock().clone() {
                Some(e) => Err(e),
                None => Ok(RefreshOutcome::AlreadyFresh),
            };
        }
        if !self.needs_refresh(now, ttl) {
            return Ok(RefreshOutcome::AlreadyFresh);
        }

        self.refresh_locked().await.map(RefreshOutcome::Refreshed)
    }

    /// Must be called with `refresh_guard` held
    async fn refresh_locked(&self) -> Result<usize, NewsError> {
        let result = self.fetch_and_swap().await;
        *self.last_failure.lock() = result.as_ref().err().cloned();
        self.attempts.fetch_add(1, Ordering::Release);
        result
    }

    #[instrument(skip(self), fields(source = %self.source.name()))]
    async fn fetch_and_swap(&self) -> Result<usize, NewsError> {
        let mut batch = match self.source.fetch_batch().await {
            Ok(batch) => batch,
            Err(e) => {
                self.failed_refresh_count.fetch_add(1, Ordering::Relaxed);
                warn!("News refresh failed, keeping previous snapshot: {}", e);
                return Err(e);
            }
        };

        if batch.len() > self.max_articles_per_refresh {
            warn!(
                "Upstream returned {} articles, truncating to {}",
                batch.len(),
                self.max_articles_per_refresh
            );
            batch.truncate(self.max_articles_per_refresh);
        }

        let now = Utc::now();
        let received = batch.len();
        let mut seen_ids = HashSet::with_capacity(received);
        let mut rejected = 0usize;
        let mut unlinked = 0usize;
        let mut by_symbol: HashMap<String, Vec<Arc<NewsItem>>> = HashMap::new();
        let mut item_count = 0usize;

        for raw in batch {
            let item = match NewsItem::from_raw(raw, &self.limits, now) {
                Ok(item) => item,
                Err(e) => {
                    rejected += 1;
                    warn!("Rejected news article: {}", e);
                    continue;
                }
            };

            if !seen_ids.insert(item.id.clone()) {
                rejected += 1;
                warn!(
                    "Rejected news article: {}",
                    ItemValidationError::DuplicateId(item.id.clone())
                );
                continue;
            }

            if item.related_symbols.is_empty() {
                unlinked += 1;
                continue;
            }

            let item = Arc::new(item);
            for symbol in &item.related_symbols {
                by_symbol
                    .entry(symbol.clone())
                    .or_default()
                    .push(Arc::clone(&item));
            }
            item_count += 1;
        }

        let symbol_count = by_symbol.len();
        let next = Arc::new(CacheSnapshot {
            by_symbol,
            item_count,
            refreshed_at: Some(Utc::now()),
        });
        *self.snapshot.write() = next;
        self.refresh_count.fetch_add(1, Ordering::Relaxed);

        if unlinked > 0 {
            debug!("Skipped {} articles with no related symbols", unlinked);
        }
        info!(
            "Refreshed news cache: {} articles across {} symbols ({} received, {} rejected)",
            item_count, symbol_count, received, rejected
        );

        Ok(item_count)
    }

    /// Get cache statistics
    pub fn stats(&self) -> NewsCacheStats {
        let snapshot = self.current();
        NewsCacheStats {
            symbols: snapshot.by_symbol.len(),
            items: snapshot.item_count,
            last_refresh: snapshot.refreshed_at,
            refresh_count: self.refresh_count.load(Ordering::Relaxed),
            failed_refresh_count: self.failed_refresh_count.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsCacheStats {
    pub symbols: usize,
    pub items: usize,
    pub last_refresh: Option<DateTime<Utc>>,
    pub refresh_count: u64,
    pub failed_refresh_count: u64,
}
