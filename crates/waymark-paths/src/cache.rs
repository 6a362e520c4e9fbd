//! Bidirectional LRU cache of computed paths.
//!
//! Entries are stored under the `(from, to)` pair they were computed for.
//! A lookup for `(a, b)` first probes `(a, b)` and then `(b, a)`, returning
//! the stored path reversed when only the opposite direction is cached.
//!
//! Entries leave the cache when they are the least recently used and room
//! is needed, when they are older than `max_age`, or when
//! [`invalidate_area`](PathCache::invalidate_area) finds that they cross a
//! changed region of the map.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use log::debug;
use waymark_core::{Area, Point};

use crate::error::{PathError, Result};
use crate::path::Path;

/// Below this `max_age` every `get` sweeps expired entries.
const EAGER_SWEEP_BELOW: Duration = Duration::from_secs(1);

/// Source of the current time for expiry decisions.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time measured from construction.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Cache settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheConfig {
    /// Maximum number of stored paths (at least 1)
    pub max_size: usize,

    /// Age after which an entry is stale
    pub max_age: Duration,

    /// Minimum time between opportunistic expiry sweeps
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            max_age: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

/// Lookup statistics.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    /// `hits / (hits + misses)`, or 0 before the first lookup
    pub hit_rate: f64,
}

type Key = (Point, Point);

struct Entry {
    path: Path,
    stored_at: Duration,
    tick: u64,
}

/// Path cache with LRU eviction, expiry and spatial invalidation.
pub struct PathCache<C: Clock = MonotonicClock> {
    config: CacheConfig,
    clock: C,
    entries: HashMap<Key, Entry>,
    // Recency order: lowest tick is the least recently used.
    recency: BTreeMap<u64, Key>,
    next_tick: u64,
    hits: u64,
    misses: u64,
    last_sweep: Duration,
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl PathCache {
    /// Create a cache timed by the wall clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, MonotonicClock::default())
    }
}

impl<C: Clock> PathCache<C> {
    /// Create a cache timed by `clock`.
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        let last_sweep = clock.now();
        Self {
            config,
            clock,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_tick: 0,
            hits: 0,
            misses: 0,
            last_sweep,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Cached path from `from` to `to`, in that direction.
    ///
    /// Counts exactly one hit or one miss. A hit marks the stored entry as
    /// most recently used.
    pub fn get(&mut self, from: Point, to: Point) -> Option<Path> {
        let now = self.clock.now();
        self.maybe_sweep(now);

        let found = self.find(from, to, now, true).and_then(|(key, reversed)| {
            self.entries.get(&key).map(|e| {
                if reversed {
                    e.path.reversed()
                } else {
                    e.path.clone()
                }
            })
        });
        match found {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        found
    }

    /// Store `path` as the route from `from` to `to`.
    ///
    /// Overwrites an existing entry for the same pair. When the pair is new
    /// and the cache is full, the least recently used entry is evicted
    /// first.
    pub fn set(&mut self, from: Point, to: Point, path: Path) -> Result<()> {
        if path.is_empty() {
            return Err(PathError::InvalidArgument(format!(
                "cannot cache an empty path for {from} -> {to}"
            )));
        }

        let key = (from, to);
        let stored_at = self.clock.now();
        if let Some(old) = self.entries.remove(&key) {
            self.recency.remove(&old.tick);
        } else if self.entries.len() >= self.config.max_size.max(1) {
            self.evict_lru();
        }

        let tick = self.bump_tick();
        self.recency.insert(tick, key);
        self.entries.insert(
            key,
            Entry {
                path,
                stored_at,
                tick,
            },
        );
        Ok(())
    }

    /// Whether a fresh path between the two points is cached, in either
    /// direction. Does not count towards the statistics.
    pub fn has(&mut self, from: Point, to: Point) -> bool {
        let now = self.clock.now();
        self.find(from, to, now, false).is_some()
    }

    /// Remove the entry stored for exactly `(from, to)`.
    pub fn delete(&mut self, from: Point, to: Point) -> bool {
        self.remove_key(&(from, to))
    }

    /// Drop every entry whose path has a point inside `area`. Returns the
    /// number of entries removed.
    pub fn invalidate_area(&mut self, area: &Area) -> usize {
        let doomed: Vec<Key> = self
            .recency
            .values()
            .filter(|key| self.entries.get(key).is_some_and(|e| e.path.crosses(area)))
            .copied()
            .collect();
        for key in &doomed {
            self.remove_key(key);
        }
        if !doomed.is_empty() {
            debug!("path cache: {} entries invalidated by {area:?}", doomed.len());
        }
        doomed.len()
    }

    /// Remove every expired entry now. Returns the number removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.clock.now();
        self.sweep(now)
    }

    /// Hit/miss counters and current size.
    pub fn get_stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
        }
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Probe `(from, to)` then `(to, from)`. Returns the key of the fresh
    /// entry found and whether it is stored in the opposite direction.
    fn find(&mut self, from: Point, to: Point, now: Duration, touch: bool) -> Option<(Key, bool)> {
        if self.probe((from, to), now, touch) {
            return Some(((from, to), false));
        }
        if from != to && self.probe((to, from), now, touch) {
            return Some(((to, from), true));
        }
        None
    }

    /// Whether `key` holds a fresh entry. Expired entries are removed.
    fn probe(&mut self, key: Key, now: Duration, touch: bool) -> bool {
        let Some(entry) = self.entries.get(&key) else {
            return false;
        };
        if self.is_expired(entry, now) {
            self.remove_key(&key);
            return false;
        }
        if touch {
            self.touch(key);
        }
        true
    }

    fn is_expired(&self, entry: &Entry, now: Duration) -> bool {
        now.saturating_sub(entry.stored_at) > self.config.max_age
    }

    fn touch(&mut self, key: Key) {
        let tick = self.bump_tick();
        if let Some(entry) = self.entries.get_mut(&key) {
            self.recency.remove(&entry.tick);
            entry.tick = tick;
            self.recency.insert(tick, key);
        }
    }

    fn bump_tick(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    fn remove_key(&mut self, key: &Key) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.recency.remove(&entry.tick);
                true
            }
            None => false,
        }
    }

    fn evict_lru(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            self.entries.remove(&key);
            debug!("path cache: evicted {} -> {}", key.0, key.1);
        }
    }

    fn maybe_sweep(&mut self, now: Duration) {
        if self.config.max_age < EAGER_SWEEP_BELOW
            || now.saturating_sub(self.last_sweep) >= self.config.cleanup_interval
        {
            self.sweep(now);
        }
    }

    fn sweep(&mut self, now: Duration) -> usize {
        self.last_sweep = now;
        let expired: Vec<Key> = self
            .recency
            .values()
            .filter(|key| self.entries.get(key).is_some_and(|e| self.is_expired(e, now)))
            .copied()
            .collect();
        for key in &expired {
            self.remove_key(key);
        }
        if !expired.is_empty() {
            debug!("path cache: swept {} expired entries", expired.len());
        }
        expired.len()
    }
}
