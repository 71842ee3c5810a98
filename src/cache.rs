//! Daily dashboard snapshot cache.
//!
//! Keyed by (campus, campus-local calendar date). Correctness is driven by
//! explicit invalidation from the write path, not TTL; the coarse expiry
//! here is only a safety net against an invalidation that never arrived.
//! Invalidation always deletes the entry and recomputation always re-reads
//! the store, so a racing invalidate/recompute costs at most a redundant
//! recompute, never a stale read.

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;

use crate::types::DashboardSnapshot;

/// Safety-net expiry for cached snapshots.
const SNAPSHOT_MAX_AGE_SECS: i64 = 60 * 60;

/// Cache-store abstraction so the backing implementation (in-memory map,
/// distributed cache, the persistence layer itself) can change without
/// touching call sites.
pub trait SnapshotCache: Send + Sync {
    fn get(&self, campus_id: &str, date: NaiveDate) -> Option<DashboardSnapshot>;
    fn put(&self, snapshot: DashboardSnapshot);
    fn invalidate(&self, campus_id: &str, date: NaiveDate);
}

struct Entry {
    snapshot: DashboardSnapshot,
    stored_at: DateTime<Utc>,
}

/// In-process snapshot cache backed by a concurrent hash map.
pub struct MemorySnapshotCache {
    entries: DashMap<(String, NaiveDate), Entry>,
    max_age_secs: i64,
}

impl MemorySnapshotCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            max_age_secs: SNAPSHOT_MAX_AGE_SECS,
        }
    }

    #[cfg(test)]
    fn with_max_age(max_age_secs: i64) -> Self {
        Self {
            entries: DashMap::new(),
            max_age_secs,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemorySnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache for MemorySnapshotCache {
    fn get(&self, campus_id: &str, date: NaiveDate) -> Option<DashboardSnapshot> {
        let key = (campus_id.to_string(), date);
        let expired = match self.entries.get(&key) {
            Some(entry) => {
                let age = (Utc::now() - entry.stored_at).num_seconds();
                if age < self.max_age_secs {
                    return Some(entry.snapshot.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            // Past the safety net: drop it and force a recompute.
            self.entries.remove(&key);
            log::debug!("Snapshot for {campus_id}/{date} aged out of the cache");
        }
        None
    }

    fn put(&self, snapshot: DashboardSnapshot) {
        let key = (snapshot.campus_id.clone(), snapshot.date);
        self.entries.insert(
            key,
            Entry {
                snapshot,
                stored_at: Utc::now(),
            },
        );
    }

    fn invalidate(&self, campus_id: &str, date: NaiveDate) {
        if self
            .entries
            .remove(&(campus_id.to_string(), date))
            .is_some()
        {
            log::debug!("Invalidated dashboard snapshot for {campus_id}/{date}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(campus_id: &str, date: NaiveDate) -> DashboardSnapshot {
        DashboardSnapshot {
            campus_id: campus_id.to_string(),
            date,
            today_tasks: Vec::new(),
            grief_today: Vec::new(),
            accident_followup: Vec::new(),
            financial_aid_due: Vec::new(),
            overdue_birthdays: Vec::new(),
            upcoming_tasks: Vec::new(),
            at_risk_members: Vec::new(),
            disconnected_members: Vec::new(),
            total_tasks: 0,
            total_members: 0,
            computed_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = MemorySnapshotCache::new();
        let d = date(2025, 6, 1);
        cache.put(snapshot("main", d));

        let hit = cache.get("main", d).unwrap();
        assert_eq!(hit.campus_id, "main");
        assert_eq!(hit.date, d);
    }

    #[test]
    fn get_misses_other_campus_and_date() {
        let cache = MemorySnapshotCache::new();
        cache.put(snapshot("main", date(2025, 6, 1)));

        assert!(cache.get("north", date(2025, 6, 1)).is_none());
        assert!(cache.get("main", date(2025, 6, 2)).is_none());
    }

    #[test]
    fn invalidate_deletes_entry() {
        let cache = MemorySnapshotCache::new();
        let d = date(2025, 6, 1);
        cache.put(snapshot("main", d));
        cache.invalidate("main", d);
        assert!(cache.get("main", d).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_is_scoped_to_key() {
        let cache = MemorySnapshotCache::new();
        let d = date(2025, 6, 1);
        cache.put(snapshot("main", d));
        cache.put(snapshot("north", d));
        cache.invalidate("main", d);
        assert!(cache.get("north", d).is_some());
    }

    #[test]
    fn put_upserts_existing_key() {
        let cache = MemorySnapshotCache::new();
        let d = date(2025, 6, 1);
        cache.put(snapshot("main", d));
        let mut replacement = snapshot("main", d);
        replacement.total_members = 42;
        cache.put(replacement);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("main", d).unwrap().total_members, 42);
    }

    #[test]
    fn aged_out_entries_are_dropped() {
        let cache = MemorySnapshotCache::with_max_age(0);
        let d = date(2025, 6, 1);
        cache.put(snapshot("main", d));
        // max_age 0: anything already stored is expired.
        assert!(cache.get("main", d).is_none());
        assert!(cache.is_empty());
    }
}
