//! Polled lists that grow at the front as new rows appear upstream.
//!
//! A feed is seeded from the first fetch. Each later fetch is diffed against every
//! key seen so far; unseen rows are prepended in arrival order and stay highlighted
//! until their deadline passes. Boards whose rows change in place use `refresh`,
//! which replaces the rows and highlights only keys never seen before.

use crate::error::ApiError;
use crate::models::{PumpToken, Swap};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Identity of a polled row.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Swap {
    fn key(&self) -> &str {
        &self.transaction_hash
    }
}

impl Keyed for PumpToken {
    fn key(&self) -> &str {
        &self.token_address
    }
}

/// Keys remembered per row of capacity before the oldest are forgotten.
const KNOWN_PER_ROW: usize = 4;

#[derive(Debug, Clone)]
pub struct FeedState<T> {
    items: Vec<T>,
    known: HashSet<String>,
    known_order: VecDeque<String>,
    fresh: HashMap<String, Instant>,
    highlight: Duration,
    capacity: usize,
}

impl<T: Keyed> FeedState<T> {
    pub fn new(highlight: Duration, capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            known: HashSet::new(),
            known_order: VecDeque::new(),
            fresh: HashMap::new(),
            highlight,
            capacity: capacity.max(1),
        }
    }

    /// Replaces the feed with an initial fetch. Nothing is highlighted.
    pub fn seed(&mut self, items: Vec<T>) {
        self.known.clear();
        self.known_order.clear();
        self.fresh.clear();
        let mut kept = Vec::with_capacity(items.len().min(self.capacity));
        for item in items {
            if kept.len() == self.capacity {
                break;
            }
            if self.remember(item.key()) {
                kept.push(item);
            }
        }
        self.items = kept;
    }

    /// Prepends rows whose key has never been seen and returns how many were added.
    pub fn merge(&mut self, incoming: Vec<T>, now: Instant) -> usize {
        let deadline = now + self.highlight;
        let mut added: Vec<T> = Vec::new();
        for item in incoming {
            if self.remember(item.key()) {
                self.fresh.insert(item.key().to_string(), deadline);
                added.push(item);
            }
        }

        let count = added.len();
        if count > 0 {
            added.append(&mut self.items);
            self.items = added;
            if self.items.len() > self.capacity {
                for dropped in &self.items[self.capacity..] {
                    self.fresh.remove(dropped.key());
                }
                self.items.truncate(self.capacity);
            }
            self.forget_oldest();
        }
        count
    }

    /// Replaces every row with the latest fetch, keeping upstream order.
    ///
    /// Rows that were already present take their new values; keys never seen
    /// before are highlighted. Returns how many keys were new.
    pub fn refresh(&mut self, incoming: Vec<T>, now: Instant) -> usize {
        let deadline = now + self.highlight;
        let mut present: HashSet<String> = HashSet::with_capacity(incoming.len());
        let mut rows = Vec::with_capacity(incoming.len().min(self.capacity));
        let mut added = 0;
        for item in incoming {
            if rows.len() == self.capacity {
                break;
            }
            if !present.insert(item.key().to_string()) {
                continue;
            }
            if self.remember(item.key()) {
                self.fresh.insert(item.key().to_string(), deadline);
                added += 1;
            }
            rows.push(item);
        }

        self.fresh.retain(|key, _| present.contains(key));
        self.items = rows;
        self.forget_oldest();
        added
    }

    fn remember(&mut self, key: &str) -> bool {
        if self.known.insert(key.to_string()) {
            self.known_order.push_back(key.to_string());
            true
        } else {
            false
        }
    }

    /// Drops the oldest remembered keys once the history outgrows the feed.
    /// Keys of rows still on screen are never forgotten.
    fn forget_oldest(&mut self) {
        let limit = self.capacity.saturating_mul(KNOWN_PER_ROW);
        if self.known_order.len() <= limit {
            return;
        }

        let live: HashSet<&str> = self.items.iter().map(|item| item.key()).collect();
        let mut excess = self.known_order.len() - limit;
        let mut kept = VecDeque::with_capacity(limit);
        for key in self.known_order.drain(..) {
            if excess > 0 && !live.contains(key.as_str()) {
                self.known.remove(&key);
                excess -= 1;
            } else {
                kept.push_back(key);
            }
        }
        self.known_order = kept;
    }

    /// Number of keys currently remembered for de-duplication.
    pub fn known_len(&self) -> usize {
        self.known.len()
    }

    /// Clears highlights whose deadline has passed. Returns true if any were cleared.
    pub fn expire_highlights(&mut self, now: Instant) -> bool {
        let before = self.fresh.len();
        self.fresh.retain(|_, deadline| *deadline > now);
        self.fresh.len() != before
    }

    pub fn is_fresh(&self, key: &str) -> bool {
        self.fresh.contains_key(key)
    }

    pub fn has_fresh(&self) -> bool {
        !self.fresh.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.known.clear();
        self.known_order.clear();
        self.fresh.clear();
    }
}

#[derive(Debug)]
pub enum PollUpdate<T> {
    /// Result of the first fetch; its failure is the one the view reports.
    Initial(Result<Vec<T>, ApiError>),
    /// A later successful fetch. Failed ticks are logged and never delivered.
    Tick(Vec<T>),
}

/// Owner of a polling task. Dropping it stops the task.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Fetches once, then again every `every`, handing results to `sink`.
/// The task ends when the handle is dropped or `sink` returns false.
pub fn spawn_poller<T, F, Fut, S>(label: &'static str, every: Duration, mut fetch: F, mut sink: S) -> PollHandle
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
    S: FnMut(PollUpdate<T>) -> bool + Send + 'static,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let initial = tokio::select! {
            biased;
            _ = token.cancelled() => return,
            result = fetch() => result,
        };
        if !sink(PollUpdate::Initial(initial)) {
            return;
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                result = fetch() => result,
            };

            match result {
                Ok(items) => {
                    if !sink(PollUpdate::Tick(items)) {
                        break;
                    }
                }
                Err(err) => warn!(feed = label, error = %err, "poll tick failed, keeping current rows"),
            }
        }
        debug!(feed = label, "poller stopped");
    });

    PollHandle { cancel, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(String);

    impl Keyed for Row {
        fn key(&self) -> &str {
            &self.0
        }
    }

    fn rows(keys: &[&str]) -> Vec<Row> {
        keys.iter().map(|k| Row(k.to_string())).collect()
    }

    fn keys(feed: &FeedState<Row>) -> Vec<&str> {
        feed.items().iter().map(|r| r.0.as_str()).collect()
    }

    #[test]
    fn test_merge_prepends_only_unseen() {
        let now = Instant::now();
        let mut feed = FeedState::new(Duration::from_secs(5), 100);
        feed.seed(rows(&["c", "b", "a"]));

        let added = feed.merge(rows(&["e", "d", "c", "b"]), now);

        assert_eq!(added, 2);
        assert_eq!(feed.len(), 5);
        assert_eq!(keys(&feed), vec!["e", "d", "c", "b", "a"]);
        assert!(feed.is_fresh("e"));
        assert!(feed.is_fresh("d"));
        assert!(!feed.is_fresh("c"));
    }

    #[test]
    fn test_highlights_expire_after_delay() {
        let now = Instant::now();
        let mut feed = FeedState::new(Duration::from_secs(5), 100);
        feed.seed(rows(&["a"]));
        feed.merge(rows(&["b"]), now);

        assert!(!feed.expire_highlights(now + Duration::from_secs(4)));
        assert!(feed.is_fresh("b"));

        assert!(feed.expire_highlights(now + Duration::from_secs(5)));
        assert!(!feed.has_fresh());
        assert_eq!(keys(&feed), vec!["b", "a"]);
    }

    #[test]
    fn test_seed_is_not_highlighted_and_dedupes() {
        let mut feed = FeedState::new(Duration::from_secs(5), 100);
        feed.seed(rows(&["a", "b", "a"]));
        assert_eq!(keys(&feed), vec!["a", "b"]);
        assert!(!feed.has_fresh());
    }

    #[test]
    fn test_capacity_drops_oldest_without_resurfacing() {
        let now = Instant::now();
        let mut feed = FeedState::new(Duration::from_secs(5), 3);
        feed.seed(rows(&["c", "b", "a"]));

        feed.merge(rows(&["d"]), now);
        assert_eq!(keys(&feed), vec!["d", "c", "b"]);

        let added = feed.merge(rows(&["d", "a"]), now);
        assert_eq!(added, 0);
        assert_eq!(keys(&feed), vec!["d", "c", "b"]);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Progress(String, u32);

    impl Keyed for Progress {
        fn key(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn test_refresh_updates_rows_in_place() {
        let now = Instant::now();
        let mut feed = FeedState::new(Duration::from_secs(5), 100);
        feed.seed(vec![Progress("a".into(), 10), Progress("gone".into(), 95)]);

        let added = feed.refresh(
            vec![Progress("new".into(), 1), Progress("a".into(), 80)],
            now,
        );

        assert_eq!(added, 1);
        assert_eq!(
            feed.items(),
            &[Progress("new".into(), 1), Progress("a".into(), 80)]
        );
        assert!(feed.is_fresh("new"));
        assert!(!feed.is_fresh("a"));
    }

    #[test]
    fn test_refresh_does_not_rehighlight_returning_rows() {
        let now = Instant::now();
        let mut feed = FeedState::new(Duration::from_secs(5), 100);
        feed.seed(vec![Progress("a".into(), 10)]);

        feed.refresh(vec![Progress("b".into(), 5)], now);
        assert!(feed.is_fresh("b"));
        assert_eq!(feed.refresh(vec![Progress("a".into(), 20)], now), 0);
        assert!(!feed.has_fresh());
        assert_eq!(feed.items(), &[Progress("a".into(), 20)]);
    }

    #[test]
    fn test_known_keys_stay_bounded() {
        let now = Instant::now();
        let mut feed = FeedState::new(Duration::from_secs(5), 2);
        feed.seed(rows(&["seed"]));

        for n in 0..100 {
            feed.merge(rows(&[format!("tx{n}").as_str()]), now);
        }

        assert!(feed.known_len() <= 2 * KNOWN_PER_ROW);
        assert_eq!(keys(&feed), vec!["tx99", "tx98"]);
        // Rows still shown are remembered and never re-added.
        assert_eq!(feed.merge(rows(&["tx99", "tx98"]), now), 0);
    }

    #[test]
    fn test_bounded_history_keeps_long_lived_rows() {
        let now = Instant::now();
        let mut feed = FeedState::new(Duration::from_secs(5), 2);
        feed.seed(vec![Progress("old".into(), 1)]);

        for n in 0..50 {
            feed.refresh(
                vec![Progress("old".into(), 1), Progress(format!("t{n}"), 0)],
                now,
            );
        }

        assert!(feed.known_len() <= 2 * KNOWN_PER_ROW);
        assert_eq!(
            feed.refresh(vec![Progress("old".into(), 2)], now + Duration::from_secs(10)),
            0
        );
        assert!(!feed.is_fresh("old"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_swallows_failed_ticks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let counter = calls.clone();

        let _handle = spawn_poller(
            "test",
            Duration::from_secs(10),
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 1 {
                        Err(ApiError::Status {
                            status: 500,
                            endpoint: "test".to_string(),
                        })
                    } else {
                        Ok(vec![Row(format!("tx{n}"))])
                    }
                }
            },
            move |update| tx.send(update).is_ok(),
        );

        match rx.recv().await {
            Some(PollUpdate::Initial(Ok(items))) => assert_eq!(items, vec![Row("tx0".into())]),
            other => panic!("unexpected first update: {other:?}"),
        }
        match rx.recv().await {
            Some(PollUpdate::Tick(items)) => assert_eq!(items, vec![Row("tx2".into())]),
            other => panic!("unexpected tick: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_failure_is_delivered() {
        let (tx, mut rx) = mpsc::unbounded_channel::<PollUpdate<Row>>();
        let _handle = spawn_poller(
            "test",
            Duration::from_secs(30),
            || async { Err(ApiError::MissingApiKey) },
            move |update| tx.send(update).is_ok(),
        );

        assert!(matches!(
            rx.recv().await,
            Some(PollUpdate::Initial(Err(ApiError::MissingApiKey)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_ticks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = spawn_poller(
            "test",
            Duration::from_secs(1),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(Vec::<Row>::new()) }
            },
            |_| true,
        );

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        let seen = calls.load(Ordering::SeqCst);
        assert!(seen >= 2);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
    }
}
