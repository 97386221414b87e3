// src/storage/mod.rs
use crate::models::{Change, OutreachRecord, OutreachStatus, Profile};
use anyhow::Result;
use async_trait::async_trait;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistence for profiles and the append-only change log.
///
/// `put` is an upsert keyed by profile URL: the URL never changes and
/// `last_checked` never moves backwards. Change and outreach ids are assigned
/// by the store and are not reused, even after `clear`.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, linkedin_url: &str) -> Result<Option<Profile>>;

    async fn put(&self, profile: Profile) -> Result<bool>;

    /// Store the new snapshot and append the change as one unit: either both
    /// are written or neither is. Returns the assigned change id.
    async fn record_change(&self, profile: Profile, change: Change) -> Result<i64>;

    /// Changes in creation order
    async fn list_changes(&self, founder_only: bool) -> Result<Vec<Change>>;

    /// Profiles in the order they were first stored
    async fn list_profiles(&self) -> Result<Vec<Profile>>;

    /// Returns false when the profile is not tracked
    async fn set_outreach_status(&self, linkedin_url: &str, status: OutreachStatus)
        -> Result<bool>;

    /// Deletes profiles, changes and outreach records
    async fn clear(&self) -> Result<()>;

    /// Returns the assigned outreach id
    async fn create_outreach(&self, record: OutreachRecord) -> Result<i64>;

    async fn get_outreach(&self, id: i64) -> Result<Option<OutreachRecord>>;

    /// Returns false when no record has this id
    async fn update_outreach(&self, record: &OutreachRecord) -> Result<bool>;

    /// Outreach records in creation order, optionally for one profile
    async fn list_outreach(&self, linkedin_url: Option<&str>) -> Result<Vec<OutreachRecord>>;

    /// Founder changes, newest first
    async fn recent_founder_changes(&self, limit: usize) -> Result<Vec<Change>> {
        let mut changes = self.list_changes(true).await?;
        changes.sort_by(|a, b| {
            b.detected_at
                .cmp(&a.detected_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        changes.truncate(limit);
        Ok(changes)
    }
}
