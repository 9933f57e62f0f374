use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::api::ApiError;

/// Hierarchical cache key. Invalidating a key invalidates every key
/// nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryKey(segments.into_iter().map(Into::into).collect())
    }

    pub fn is_under(&self, scope: &QueryKey) -> bool {
        self.0.len() >= scope.0.len() && self.0[..scope.0.len()] == scope.0[..]
    }
}

/// Key builders for the scopes the client uses.
pub mod keys {
    use super::QueryKey;

    pub fn notes_all() -> QueryKey {
        QueryKey::new(["notes"])
    }

    pub fn notes_list() -> QueryKey {
        QueryKey::new(["notes", "list"])
    }

    pub fn note_detail(id: &str) -> QueryKey {
        QueryKey::new(["notes", "detail", id])
    }

    pub fn user_detail(id: &str) -> QueryKey {
        QueryKey::new(["users", id])
    }
}

#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// The fetch kept failing after the retry budget was spent.
    #[error("fetch failed: {0}")]
    Fetch(#[from] ApiError),
    /// A cached value could not be decoded into the requested type, or
    /// the fetch task went away before delivering a result.
    #[error("cache data error: {0}")]
    Data(String),
}

/// Tuning for staleness, retention and retry. Defaults match the
/// original client: 5 min stale window, 10 min retention, one retry.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub stale_time: Duration,
    pub gc_time: Duration,
    pub retry: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(60 * 5),
            gc_time: Duration::from_secs(60 * 10),
            retry: 1,
        }
    }
}

impl QueryConfig {
    pub fn from_windows(windows: &jotter_core::config::QueryWindows) -> Self {
        Self {
            stale_time: Duration::from_millis(windows.stale_time_ms),
            gc_time: Duration::from_millis(windows.gc_time_ms),
            retry: windows.retry,
        }
    }
}

type FetchResult = Result<Value, QueryError>;

/// Outcome of the under-lock decision for one read.
enum Plan {
    /// A usable value exists; `refresh` carries the registered
    /// background refetch when the value is past the staleness window.
    Serve {
        value: Value,
        refresh: Option<(u64, broadcast::Sender<FetchResult>)>,
    },
    /// A fetch for the key is already in flight; wait for its result.
    Join(broadcast::Receiver<FetchResult>),
    /// No usable value and nothing in flight; fetch in the foreground.
    Fetch {
        generation: u64,
        tx: broadcast::Sender<FetchResult>,
    },
}

struct Entry {
    value: Value,
    updated_at: Instant,
    last_used: Instant,
    /// Set by mutation-driven invalidation: the value must not be served
    /// again, not even as a stale placeholder.
    invalidated: bool,
}

struct CacheInner {
    entries: HashMap<QueryKey, Entry>,
    /// One fetch in flight per key at most; concurrent readers subscribe
    /// to the broadcast instead of issuing their own request.
    inflight: HashMap<QueryKey, (u64, broadcast::Sender<FetchResult>)>,
    /// Per-key issue counter. A resolving fetch commits only while its
    /// generation is still the newest, so a response superseded by an
    /// invalidation or a fresher request is discarded.
    generations: HashMap<QueryKey, u64>,
}

/// De-duplicating, staleness-aware cache over the remote facade.
///
/// Cached values are remote data; the store holds local data. The two
/// are parallel models and stay that way.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Mutex<CacheInner>>,
    config: QueryConfig,
}

impl QueryClient {
    pub fn new(config: QueryConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                entries: HashMap::new(),
                inflight: HashMap::new(),
                generations: HashMap::new(),
            })),
            config,
        }
    }

    /// Read through the cache.
    ///
    /// A fresh value is returned directly. A stale value is returned
    /// immediately while a single background refetch refreshes the
    /// entry. Misses and invalidated entries fetch in the foreground;
    /// concurrent callers for the same key share the in-flight result.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, QueryError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        match self.plan(&key) {
            Plan::Serve { value, refresh } => {
                if let Some((generation, tx)) = refresh {
                    let client = self.clone();
                    let task_key = key.clone();
                    tokio::spawn(async move {
                        let result = client.run_fetch(&fetcher).await;
                        client.settle(&task_key, generation, tx, result);
                    });
                }
                decode(value)
            }
            Plan::Join(mut rx) => {
                let result = rx
                    .recv()
                    .await
                    .map_err(|_| QueryError::Data("fetch task went away".to_string()))?;
                result.and_then(decode)
            }
            Plan::Fetch { generation, tx } => {
                // The fetch runs as its own task so it settles (and
                // unblocks any joiners) even if this caller goes away.
                let client = self.clone();
                let task_key = key.clone();
                let mut rx = tx.subscribe();
                tokio::spawn(async move {
                    let result = client.run_fetch(&fetcher).await;
                    client.settle(&task_key, generation, tx, result);
                });
                let result = rx
                    .recv()
                    .await
                    .map_err(|_| QueryError::Data("fetch task went away".to_string()))?;
                result.and_then(decode)
            }
        }
    }

    /// Decide what a read of `key` does, entirely under the lock. The
    /// lock is released before any awaiting happens.
    fn plan(&self, key: &QueryKey) -> Plan {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        let now = Instant::now();

        let cached = match inner.entries.get_mut(key) {
            Some(entry) if !entry.invalidated => {
                entry.last_used = now;
                let fresh = now.duration_since(entry.updated_at) < self.config.stale_time;
                Some((entry.value.clone(), fresh))
            }
            _ => None,
        };

        if let Some((value, fresh)) = cached {
            let refresh = if !fresh && !inner.inflight.contains_key(key) {
                let generation = next_generation(inner, key);
                let (tx, _) = broadcast::channel(1);
                inner.inflight.insert(key.clone(), (generation, tx.clone()));
                Some((generation, tx))
            } else {
                None
            };
            return Plan::Serve { value, refresh };
        }

        if let Some((_, tx)) = inner.inflight.get(key) {
            return Plan::Join(tx.subscribe());
        }

        let generation = next_generation(inner, key);
        let (tx, _) = broadcast::channel(1);
        inner.inflight.insert(key.clone(), (generation, tx.clone()));
        Plan::Fetch { generation, tx }
    }

    async fn run_fetch<T, F, Fut>(&self, fetcher: &F) -> FetchResult
    where
        T: Serialize,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempts = 0;
        loop {
            match fetcher().await {
                Ok(value) => {
                    return serde_json::to_value(&value)
                        .map_err(|err| QueryError::Data(err.to_string()));
                }
                Err(err) => {
                    if attempts >= self.config.retry {
                        return Err(QueryError::Fetch(err));
                    }
                    attempts += 1;
                    log::debug!("fetch failed ({err}), retry {attempts}");
                }
            }
        }
    }

    /// Commit a resolved fetch: drop the in-flight marker, write the
    /// value back unless the generation was superseded, and deliver the
    /// result to every waiter.
    fn settle(
        &self,
        key: &QueryKey,
        generation: u64,
        tx: broadcast::Sender<FetchResult>,
        result: FetchResult,
    ) {
        {
            let mut guard = self.inner.lock().unwrap();
            let inner = &mut *guard;
            if matches!(inner.inflight.get(key), Some((g, _)) if *g == generation) {
                inner.inflight.remove(key);
            }
            let current = inner.generations.get(key).copied().unwrap_or(0);
            if generation == current {
                if let Ok(value) = &result {
                    let now = Instant::now();
                    inner.entries.insert(
                        key.clone(),
                        Entry {
                            value: value.clone(),
                            updated_at: now,
                            last_used: now,
                            invalidated: false,
                        },
                    );
                }
            }
        }
        let _ = tx.send(result);
    }

    /// Mark every entry under `scope` so the next read refetches instead
    /// of serving cached data. In-flight fetches under the scope are
    /// detached: current waiters still receive their result, but it is
    /// never written back.
    pub fn invalidate(&self, scope: &QueryKey) {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        let touched: Vec<QueryKey> = inner
            .entries
            .keys()
            .chain(inner.inflight.keys())
            .filter(|key| key.is_under(scope))
            .cloned()
            .collect();
        for key in touched {
            if let Some(entry) = inner.entries.get_mut(&key) {
                entry.invalidated = true;
            }
            inner.inflight.remove(&key);
            *inner.generations.entry(key).or_insert(0) += 1;
        }
    }

    /// Drop the entry for `key` entirely. Delete semantics, not
    /// staleness.
    pub fn remove(&self, key: &QueryKey) {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        inner.entries.remove(key);
        inner.inflight.remove(key);
        *inner.generations.entry(key.clone()).or_insert(0) += 1;
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.lock().unwrap().entries.contains_key(key)
    }

    /// Evict entries unused for longer than the retention window.
    /// Returns how many entries were dropped.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let gc_time = self.config.gc_time;
        let mut guard = self.inner.lock().unwrap();
        let before = guard.entries.len();
        guard
            .entries
            .retain(|_, entry| now.duration_since(entry.last_used) < gc_time);
        before - guard.entries.len()
    }
}

fn next_generation(inner: &mut CacheInner, key: &QueryKey) -> u64 {
    let generation = inner.generations.entry(key.clone()).or_insert(0);
    *generation += 1;
    *generation
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, QueryError> {
    serde_json::from_value(value).map_err(|err| QueryError::Data(err.to_string()))
}
