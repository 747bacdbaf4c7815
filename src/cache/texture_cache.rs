use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use rayon::prelude::*;

use crate::cache::loader::{CacheEntry, CacheLoader};
use crate::cache::options::build_thread_pool;
use crate::foundation::error::TextureResult;
use crate::resource::location::ResourceLocation;
use crate::resource::source::ResourceSource;

/// Values published for one state, by location.
pub type TextureMap<R> = Arc<BTreeMap<ResourceLocation, Arc<R>>>;

/// Outcome of one [`TextureCache::load`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Entries found by the scan.
    pub scanned: usize,
    /// Entries built by this call.
    pub loaded: usize,
    /// Entries reused from earlier loads.
    pub reused: usize,
    /// Entries that failed to load and were left out.
    pub failed: Vec<ResourceLocation>,
}

struct Published<R> {
    map: TextureMap<R>,
    entries: Vec<(CacheEntry, Arc<R>)>,
}

struct CacheState<R, S> {
    published: HashMap<S, Published<R>>,
    // Values reachable from some published state, by content identity.
    known: HashMap<CacheEntry, Arc<R>>,
}

impl<R, S> CacheState<R, S> {
    fn rebuild_known(&mut self) {
        self.known = self
            .published
            .values()
            .flat_map(|p| p.entries.iter().cloned())
            .collect();
    }
}

/// Values built from resources, published per external state.
///
/// `load(source, state)` is the only writer: it scans the source, builds the values it has not
/// seen before on a worker pool, and publishes the complete map for `state` in one step. `get`
/// blocks until some load for the requested state has been published. A value is rebuilt only
/// when its location and content fingerprint are new to the cache.
pub struct TextureCache<R, S> {
    loader: Box<dyn CacheLoader<R>>,
    pool: rayon::ThreadPool,
    writer: Mutex<()>,
    monitor: Mutex<CacheState<R, S>>,
    published: Condvar,
    load_count: AtomicUsize,
}

impl<R, S> TextureCache<R, S>
where
    R: Send + Sync,
    S: Clone + Eq + Hash + Send + std::fmt::Debug,
{
    /// Cache driven by `loader`, building values on `threads` workers (rayon default when `None`).
    pub fn new(loader: impl CacheLoader<R> + 'static, threads: Option<usize>) -> TextureResult<Self> {
        Ok(Self {
            loader: Box::new(loader),
            pool: build_thread_pool(threads)?,
            writer: Mutex::new(()),
            monitor: Mutex::new(CacheState {
                published: HashMap::new(),
                known: HashMap::new(),
            }),
            published: Condvar::new(),
            load_count: AtomicUsize::new(0),
        })
    }

    /// Scan `source`, build what is missing and publish the result as `state`.
    ///
    /// Entries that fail to build are logged and left out; the rest are still published. Only
    /// scan failures abort the load, in which case nothing is published.
    #[tracing::instrument(skip(self, source))]
    pub fn load(&self, source: &dyn ResourceSource, state: S) -> TextureResult<LoadReport> {
        let _writer = self.writer.lock();
        let scanned = self.loader.scan(source)?;

        let (reused, missing): (Vec<_>, Vec<_>) = {
            let guard = self.monitor.lock();
            scanned
                .into_iter()
                .map(|entry| {
                    let known = guard.known.get(&entry).cloned();
                    (entry, known)
                })
                .partition(|(_, known)| known.is_some())
        };

        let built: Vec<(CacheEntry, TextureResult<R>)> = self.pool.install(|| {
            missing
                .into_par_iter()
                .map(|(entry, _)| {
                    self.load_count.fetch_add(1, Ordering::Relaxed);
                    let value = self.loader.load(source, &entry.location);
                    (entry, value)
                })
                .collect()
        });

        let mut report = LoadReport {
            scanned: reused.len() + built.len(),
            reused: reused.len(),
            ..LoadReport::default()
        };
        let mut entries = Vec::with_capacity(report.scanned);
        for (entry, value) in reused {
            if let Some(value) = value {
                entries.push((entry, value));
            }
        }
        for (entry, value) in built {
            match value {
                Ok(value) => {
                    report.loaded += 1;
                    entries.push((entry, Arc::new(value)));
                }
                Err(err) => {
                    tracing::warn!(location = %entry.location, error = %err, "texture failed to load");
                    report.failed.push(entry.location);
                }
            }
        }

        let map: BTreeMap<ResourceLocation, Arc<R>> = entries
            .iter()
            .map(|(entry, value)| (entry.location.clone(), value.clone()))
            .collect();
        {
            let mut guard = self.monitor.lock();
            guard.published.insert(
                state.clone(),
                Published {
                    map: Arc::new(map),
                    entries,
                },
            );
            guard.rebuild_known();
        }
        self.published.notify_all();

        tracing::debug!(
            ?state,
            loaded = report.loaded,
            reused = report.reused,
            failed = report.failed.len(),
            "published cache state"
        );
        Ok(report)
    }

    /// Latest map published for `state`, blocking until one exists.
    pub fn get(&self, state: &S) -> TextureMap<R> {
        let mut guard = self.monitor.lock();
        loop {
            if let Some(p) = guard.published.get(state) {
                return p.map.clone();
            }
            self.published.wait(&mut guard);
        }
    }

    /// Like [`TextureCache::get`], giving up after `timeout`.
    pub fn get_timeout(&self, state: &S, timeout: Duration) -> Option<TextureMap<R>> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            // Too far out to represent; wait without a deadline.
            return Some(self.get(state));
        };
        let mut guard = self.monitor.lock();
        loop {
            if let Some(p) = guard.published.get(state) {
                return Some(p.map.clone());
            }
            if self.published.wait_until(&mut guard, deadline).timed_out() {
                return guard.published.get(state).map(|p| p.map.clone());
            }
        }
    }

    /// Map published for `state`, without waiting.
    pub fn try_get(&self, state: &S) -> Option<TextureMap<R>> {
        self.monitor
            .lock()
            .published
            .get(state)
            .map(|p| p.map.clone())
    }

    /// Forget `state`. Values no other state uses are dropped. Returns whether it was published.
    pub fn evict(&self, state: &S) -> bool {
        let mut guard = self.monitor.lock();
        let removed = guard.published.remove(state).is_some();
        if removed {
            guard.rebuild_known();
        }
        removed
    }

    /// Number of values built so far (successful or not).
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/texture_cache.rs"]
mod tests;
