// src/storage/memory.rs
use super::ProfileStore;
use crate::models::{Change, OutreachRecord, OutreachStatus, Profile};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Session-scoped store; contents are gone when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    profiles: Vec<Profile>,
    changes: Vec<Change>,
    outreach: Vec<OutreachRecord>,
    last_change_id: i64,
    last_outreach_id: i64,
}

impl MemoryState {
    fn upsert(&mut self, mut profile: Profile) {
        match self
            .profiles
            .iter_mut()
            .find(|p| p.linkedin_url == profile.linkedin_url)
        {
            Some(existing) => {
                if existing.last_checked > profile.last_checked {
                    profile.last_checked = existing.last_checked;
                }
                *existing = profile;
            }
            None => self.profiles.push(profile),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get(&self, linkedin_url: &str) -> Result<Option<Profile>> {
        let state = self.state.lock().await;
        Ok(state
            .profiles
            .iter()
            .find(|p| p.linkedin_url == linkedin_url)
            .cloned())
    }

    async fn put(&self, profile: Profile) -> Result<bool> {
        self.state.lock().await.upsert(profile);
        Ok(true)
    }

    async fn record_change(&self, profile: Profile, mut change: Change) -> Result<i64> {
        let mut state = self.state.lock().await;
        state.last_change_id += 1;
        change.id = state.last_change_id;
        state.changes.push(change);
        state.upsert(profile);
        Ok(state.last_change_id)
    }

    async fn list_changes(&self, founder_only: bool) -> Result<Vec<Change>> {
        let state = self.state.lock().await;
        Ok(state
            .changes
            .iter()
            .filter(|c| !founder_only || c.is_founder_change)
            .cloned()
            .collect())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        Ok(self.state.lock().await.profiles.clone())
    }

    async fn set_outreach_status(
        &self,
        linkedin_url: &str,
        status: OutreachStatus,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        match state
            .profiles
            .iter_mut()
            .find(|p| p.linkedin_url == linkedin_url)
        {
            Some(profile) => {
                profile.outreach_status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.profiles.clear();
        state.changes.clear();
        state.outreach.clear();
        Ok(())
    }

    async fn create_outreach(&self, mut record: OutreachRecord) -> Result<i64> {
        let mut state = self.state.lock().await;
        state.last_outreach_id += 1;
        record.id = state.last_outreach_id;
        state.outreach.push(record);
        Ok(state.last_outreach_id)
    }

    async fn get_outreach(&self, id: i64) -> Result<Option<OutreachRecord>> {
        let state = self.state.lock().await;
        Ok(state.outreach.iter().find(|o| o.id == id).cloned())
    }

    async fn update_outreach(&self, record: &OutreachRecord) -> Result<bool> {
        let mut state = self.state.lock().await;
        match state.outreach.iter_mut().find(|o| o.id == record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_outreach(&self, linkedin_url: Option<&str>) -> Result<Vec<OutreachRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .outreach
            .iter()
            .filter(|o| linkedin_url.map_or(true, |url| o.linkedin_url == url))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    const URL: &str = "https://www.linkedin.com/in/jane";

    fn change(url: &str, founder: bool) -> Change {
        Change {
            id: 0,
            linkedin_url: url.to_string(),
            detected_at: Utc::now(),
            old_title: "PM".to_string(),
            new_title: "Founder".to_string(),
            old_company: "BigTech".to_string(),
            new_company: "Startup".to_string(),
            is_founder_change: founder,
            insight: None,
            notification_sent: false,
        }
    }

    #[tokio::test]
    async fn test_put_overwrites_without_duplicating() {
        let store = MemoryStore::new();

        let mut first = Profile::new(URL);
        first.current_title = "PM".to_string();
        store.put(first).await.unwrap();

        let mut second = Profile::new(URL);
        second.current_title = "Founder".to_string();
        store.put(second).await.unwrap();

        let profiles = store.list_profiles().await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].current_title, "Founder");
    }

    #[tokio::test]
    async fn test_last_checked_never_moves_backwards() {
        let store = MemoryStore::new();

        let mut newer = Profile::new(URL);
        newer.last_checked = Utc::now() + Duration::minutes(5);
        let newer_ts = newer.last_checked;
        store.put(newer).await.unwrap();

        let mut older = Profile::new(URL);
        older.last_checked = Utc::now() - Duration::minutes(5);
        store.put(older).await.unwrap();

        let stored = store.get(URL).await.unwrap().unwrap();
        assert_eq!(stored.last_checked, newer_ts);
    }

    #[tokio::test]
    async fn test_record_change_writes_snapshot_and_change() {
        let store = MemoryStore::new();
        store.put(Profile::new(URL)).await.unwrap();

        let mut fresh = Profile::new(URL);
        fresh.current_title = "Founder".to_string();
        let mut founder = change(URL, true);
        founder.insight = Some("Worth a call".to_string());

        let id = store.record_change(fresh, founder).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(
            store.get(URL).await.unwrap().unwrap().current_title,
            "Founder"
        );
        let changes = store.list_changes(true).await.unwrap();
        assert_eq!(changes[0].id, 1);
        assert_eq!(changes[0].insight.as_deref(), Some("Worth a call"));
    }

    #[tokio::test]
    async fn test_change_ids_are_not_reused_after_clear() {
        let store = MemoryStore::new();

        assert_eq!(store.record_change(Profile::new(URL), change(URL, true)).await.unwrap(), 1);
        assert_eq!(store.record_change(Profile::new(URL), change(URL, false)).await.unwrap(), 2);
        assert_eq!(store.list_changes(true).await.unwrap().len(), 1);
        assert_eq!(store.list_changes(false).await.unwrap().len(), 2);

        store.clear().await.unwrap();
        assert!(store.list_changes(false).await.unwrap().is_empty());
        assert!(store.list_profiles().await.unwrap().is_empty());
        assert_eq!(store.record_change(Profile::new(URL), change(URL, true)).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_outreach_status_update() {
        let store = MemoryStore::new();
        store.put(Profile::new(URL)).await.unwrap();

        assert!(store
            .set_outreach_status(URL, OutreachStatus::Contacted)
            .await
            .unwrap());
        assert!(!store
            .set_outreach_status("https://www.linkedin.com/in/nobody", OutreachStatus::Contacted)
            .await
            .unwrap());
        assert_eq!(
            store.get(URL).await.unwrap().unwrap().outreach_status,
            OutreachStatus::Contacted
        );
    }

    #[tokio::test]
    async fn test_outreach_records() {
        let store = MemoryStore::new();
        let other = "https://www.linkedin.com/in/bob";

        let first = store
            .create_outreach(OutreachRecord::new(URL, Some(1), "Email", "intro"))
            .await
            .unwrap();
        store
            .create_outreach(OutreachRecord::new(other, None, "LinkedIn", ""))
            .await
            .unwrap();

        let mut record = store.get_outreach(first).await.unwrap().unwrap();
        record.mark_as_received(Some("replied"));
        assert!(store.update_outreach(&record).await.unwrap());

        let for_jane = store.list_outreach(Some(URL)).await.unwrap();
        assert_eq!(for_jane.len(), 1);
        assert!(for_jane[0].response_received);
        assert_eq!(store.list_outreach(None).await.unwrap().len(), 2);

        let mut missing = record.clone();
        missing.id = 42;
        assert!(!store.update_outreach(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_recent_founder_changes_newest_first() {
        let store = MemoryStore::new();

        let mut old = change(URL, true);
        old.detected_at = Utc::now() - Duration::days(2);
        store.record_change(Profile::new(URL), old).await.unwrap();
        store.record_change(Profile::new(URL), change(URL, false)).await.unwrap();
        let newest = store
            .record_change(Profile::new(URL), change(URL, true))
            .await
            .unwrap();

        let recent = store.recent_founder_changes(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, newest);
    }
}
