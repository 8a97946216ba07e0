// Read cache for resource queries
// Entries are keyed by resource + identifier and dropped either when they grow
// stale or when a successful write invalidates the resource they belong to

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    CurrentUser,
    HotelSearch,
    HotelDetails,
    MyHotel,
    HotelBookings,
    Rooms,
    Bookings,
    Favorites,
    Reviews,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::CurrentUser => "user",
            Resource::HotelSearch => "hotelSearch",
            Resource::HotelDetails => "hotelDetails",
            Resource::MyHotel => "myHotel",
            Resource::HotelBookings => "hotelBookings",
            Resource::Rooms => "rooms",
            Resource::Bookings => "bookings",
            Resource::Favorites => "favorites",
            Resource::Reviews => "reviews",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: Resource,
    pub identifier: Option<String>,
}

impl QueryKey {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            identifier: None,
        }
    }

    pub fn with_id(resource: Resource, identifier: impl ToString) -> Self {
        Self {
            resource,
            identifier: Some(identifier.to_string()),
        }
    }

    fn matches(&self, resource: Option<Resource>, identifier: Option<&str>) -> bool {
        let matches_resource = resource.map_or(true, |r| self.resource == r);
        let matches_identifier =
            identifier.map_or(true, |id| self.identifier.as_deref() == Some(id));
        matches_resource && matches_identifier
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identifier {
            Some(id) => write!(f, "{}:{}", self.resource.as_str(), id),
            None => f.write_str(self.resource.as_str()),
        }
    }
}

// What a successful write marks stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Resource(Resource),
    Key(QueryKey),
    All,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub stale_time: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(300),
            max_entries: 256,
        }
    }
}

#[derive(Debug, Default)]
struct CacheStats {
    items_count: AtomicUsize,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
    stale_count: AtomicUsize,
    eviction_count: AtomicUsize,
    invalidated_count: AtomicUsize,
    rejected_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub stale_count: usize,
    pub eviction_count: usize,
    pub invalidated_count: usize,
    pub rejected_count: usize,
}

struct CacheEntry {
    data: Bytes,
    created_at: Instant,
    last_accessed: Instant,
}

// Handed out when a fetch starts; the result is only cached if the resource
// was not invalidated while the request was in flight
#[derive(Debug, Clone)]
pub struct FetchTicket {
    key: QueryKey,
    epoch: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
    epochs: DashMap<Resource, u64>,
    global_epoch: AtomicU64,
    // Completions hold it shared, invalidations exclusive, so an epoch
    // check and its insert never straddle an invalidation
    gate: RwLock<()>,
    config: CacheConfig,
    stats: CacheStats,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            epochs: DashMap::new(),
            global_epoch: AtomicU64::new(0),
            gate: RwLock::new(()),
            config,
            stats: CacheStats::default(),
        }
    }

    // Fresh data for `key`, if any; stale entries are dropped on the way
    pub fn get(&self, key: &QueryKey) -> Option<Bytes> {
        let stale = match self.entries.get_mut(key) {
            Some(mut entry) => {
                if entry.created_at.elapsed() <= self.config.stale_time {
                    entry.last_accessed = Instant::now();
                    self.stats.hit_count.fetch_add(1, Ordering::SeqCst);
                    return Some(entry.data.clone());
                }
                true
            }
            None => false,
        };

        if stale && self.entries.remove(key).is_some() {
            self.stats.items_count.fetch_sub(1, Ordering::SeqCst);
            self.stats.stale_count.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(%key, "Cache entry went stale");
        }
        self.stats.miss_count.fetch_add(1, Ordering::SeqCst);
        None
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries
            .get(key)
            .map_or(false, |e| e.created_at.elapsed() <= self.config.stale_time)
    }

    pub fn begin_fetch(&self, key: QueryKey) -> FetchTicket {
        let epoch = self.epoch_of(key.resource);
        FetchTicket { key, epoch }
    }

    // Stores the fetched body unless the resource was invalidated after the
    // ticket was issued. Returns whether the data was cached.
    pub fn complete_fetch(&self, ticket: FetchTicket, data: Bytes) -> bool {
        let _gate = self.gate.read();
        if self.epoch_of(ticket.key.resource) != ticket.epoch {
            self.stats.rejected_count.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(key = %ticket.key, "Discarding result fetched before invalidation");
            return false;
        }

        if !self.entries.contains_key(&ticket.key) {
            while self.entries.len() >= self.config.max_entries.max(1) {
                if !self.evict_least_recently_used() {
                    break;
                }
            }
        }

        let now = Instant::now();
        let entry = CacheEntry {
            data,
            created_at: now,
            last_accessed: now,
        };
        if self.entries.insert(ticket.key, entry).is_none() {
            self.stats.items_count.fetch_add(1, Ordering::SeqCst);
        }
        true
    }

    // Removes matching entries and bumps the epochs of the affected resources
    pub fn invalidate(&self, invalidation: &Invalidation) -> usize {
        let (resource, identifier) = match invalidation {
            Invalidation::Resource(r) => (Some(*r), None),
            Invalidation::Key(key) => (Some(key.resource), key.identifier.as_deref()),
            Invalidation::All => (None, None),
        };

        let _gate = self.gate.write();
        match resource {
            Some(r) => *self.epochs.entry(r).or_insert(0) += 1,
            None => {
                self.global_epoch.fetch_add(1, Ordering::SeqCst);
            }
        }

        let keys_to_remove: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|e| e.key().matches(resource, identifier))
            .map(|e| e.key().clone())
            .collect();

        let mut removed = 0;
        for key in keys_to_remove {
            if self.entries.remove(&key).is_some() {
                self.stats.items_count.fetch_sub(1, Ordering::SeqCst);
                removed += 1;
            }
        }

        self.stats
            .invalidated_count
            .fetch_add(removed, Ordering::SeqCst);
        tracing::debug!(?invalidation, removed, "Invalidated cache entries");
        removed
    }

    pub fn clear(&self) -> usize {
        self.invalidate(&Invalidation::All)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            items_count: self.stats.items_count.load(Ordering::SeqCst),
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            stale_count: self.stats.stale_count.load(Ordering::SeqCst),
            eviction_count: self.stats.eviction_count.load(Ordering::SeqCst),
            invalidated_count: self.stats.invalidated_count.load(Ordering::SeqCst),
            rejected_count: self.stats.rejected_count.load(Ordering::SeqCst),
        }
    }

    fn epoch_of(&self, resource: Resource) -> u64 {
        let local = self.epochs.get(&resource).map_or(0, |e| *e);
        local + self.global_epoch.load(Ordering::SeqCst)
    }

    fn evict_least_recently_used(&self) -> bool {
        let oldest_key = self
            .entries
            .iter()
            .min_by_key(|e| e.last_accessed)
            .map(|e| e.key().clone());

        match oldest_key {
            Some(key) => {
                if self.entries.remove(&key).is_some() {
                    self.stats.items_count.fetch_sub(1, Ordering::SeqCst);
                    self.stats.eviction_count.fetch_add(1, Ordering::SeqCst);
                }
                true
            }
            None => false,
        }
    }
}
