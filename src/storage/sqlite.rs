// src/storage/sqlite.rs
use super::ProfileStore;
use crate::core::Database;
use crate::models::{Change, EducationEntry, OutreachRecord, OutreachStatus, Profile, TrackingStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

pub struct SqliteStore {
    db: Database,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    linkedin_url: String,
    first_name: String,
    last_name: String,
    current_title: String,
    current_company: String,
    previous_title: String,
    previous_company: String,
    last_checked: DateTime<Utc>,
    tracking_status: String,
    outreach_status: String,
    skills: String,
    education: String,
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile> {
        let skills: Vec<String> = serde_json::from_str(&self.skills)
            .with_context(|| format!("Corrupt skills column for {}", self.linkedin_url))?;
        let education: Vec<EducationEntry> = serde_json::from_str(&self.education)
            .with_context(|| format!("Corrupt education column for {}", self.linkedin_url))?;

        let tracking_status = TrackingStatus::parse(&self.tracking_status).unwrap_or_else(|| {
            warn!(
                "Unknown tracking status '{}' for {}",
                self.tracking_status, self.linkedin_url
            );
            TrackingStatus::Active
        });
        let outreach_status = OutreachStatus::parse(&self.outreach_status).unwrap_or_else(|| {
            warn!(
                "Unknown outreach status '{}' for {}",
                self.outreach_status, self.linkedin_url
            );
            OutreachStatus::NotContacted
        });

        Ok(Profile {
            linkedin_url: self.linkedin_url,
            first_name: self.first_name,
            last_name: self.last_name,
            current_title: self.current_title,
            current_company: self.current_company,
            previous_title: self.previous_title,
            previous_company: self.previous_company,
            last_checked: self.last_checked,
            tracking_status,
            outreach_status,
            skills,
            education,
        })
    }
}

const PROFILE_COLUMNS: &str = "linkedin_url, first_name, last_name, current_title, current_company, \
     previous_title, previous_company, last_checked, tracking_status, outreach_status, skills, education";

const CHANGE_COLUMNS: &str = "id, linkedin_url, detected_at, old_title, new_title, old_company, \
     new_company, is_founder_change, insight, notification_sent";

const OUTREACH_COLUMNS: &str =
    "id, linkedin_url, change_id, outreach_date, method, response_received, notes, follow_up_date";

/// Upsert inside the caller's transaction, keeping `last_checked` monotonic
async fn upsert_profile(conn: &mut SqliteConnection, mut profile: Profile) -> Result<()> {
    let skills = serde_json::to_string(&profile.skills)?;
    let education = serde_json::to_string(&profile.education)?;

    let existing: Option<(DateTime<Utc>,)> =
        sqlx::query_as("SELECT last_checked FROM profiles WHERE linkedin_url = ?")
            .bind(&profile.linkedin_url)
            .fetch_optional(&mut *conn)
            .await?;
    if let Some((stored,)) = existing {
        if stored > profile.last_checked {
            profile.last_checked = stored;
        }
    }

    sqlx::query(
        r#"
        INSERT INTO profiles (linkedin_url, first_name, last_name, current_title, current_company,
            previous_title, previous_company, last_checked, tracking_status, outreach_status,
            skills, education)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(linkedin_url) DO UPDATE SET
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            current_title = excluded.current_title,
            current_company = excluded.current_company,
            previous_title = excluded.previous_title,
            previous_company = excluded.previous_company,
            last_checked = excluded.last_checked,
            tracking_status = excluded.tracking_status,
            outreach_status = excluded.outreach_status,
            skills = excluded.skills,
            education = excluded.education
        "#,
    )
    .bind(&profile.linkedin_url)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.current_title)
    .bind(&profile.current_company)
    .bind(&profile.previous_title)
    .bind(&profile.previous_company)
    .bind(profile.last_checked)
    .bind(profile.tracking_status.as_str())
    .bind(profile.outreach_status.as_str())
    .bind(skills)
    .bind(education)
    .execute(&mut *conn)
    .await
    .context("Failed to store profile")?;

    Ok(())
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn get(&self, linkedin_url: &str) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE linkedin_url = ?",
            PROFILE_COLUMNS
        ))
        .bind(linkedin_url)
        .fetch_optional(self.pool())
        .await
        .context("Failed to load profile")?;

        row.map(ProfileRow::into_profile).transpose()
    }

    async fn put(&self, profile: Profile) -> Result<bool> {
        let mut tx = self.pool().begin().await?;
        upsert_profile(&mut tx, profile).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn record_change(&self, profile: Profile, change: Change) -> Result<i64> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO changes (linkedin_url, detected_at, old_title, new_title, old_company,
                new_company, is_founder_change, insight, notification_sent)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&change.linkedin_url)
        .bind(change.detected_at)
        .bind(&change.old_title)
        .bind(&change.new_title)
        .bind(&change.old_company)
        .bind(&change.new_company)
        .bind(change.is_founder_change)
        .bind(&change.insight)
        .bind(change.notification_sent)
        .execute(&mut *tx)
        .await
        .context("Failed to record change")?;
        let id = result.last_insert_rowid();

        upsert_profile(&mut tx, profile).await?;
        tx.commit().await.context("Failed to commit change")?;

        info!("Recorded change {} for {}", id, change.linkedin_url);
        Ok(id)
    }

    async fn list_changes(&self, founder_only: bool) -> Result<Vec<Change>> {
        let sql = if founder_only {
            format!(
                "SELECT {} FROM changes WHERE is_founder_change = TRUE ORDER BY id ASC",
                CHANGE_COLUMNS
            )
        } else {
            format!("SELECT {} FROM changes ORDER BY id ASC", CHANGE_COLUMNS)
        };

        let changes = sqlx::query_as::<_, Change>(&sql)
            .fetch_all(self.pool())
            .await
            .context("Failed to list changes")?;
        Ok(changes)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles ORDER BY rowid ASC",
            PROFILE_COLUMNS
        ))
        .fetch_all(self.pool())
        .await
        .context("Failed to list profiles")?;

        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    async fn set_outreach_status(
        &self,
        linkedin_url: &str,
        status: OutreachStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE profiles SET outreach_status = ? WHERE linkedin_url = ?")
            .bind(status.as_str())
            .bind(linkedin_url)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<()> {
        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM outreach").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM changes").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM profiles").execute(&mut *tx).await?;
        tx.commit().await?;
        info!("Cleared all profiles, changes and outreach records");
        Ok(())
    }

    async fn create_outreach(&self, record: OutreachRecord) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO outreach (linkedin_url, change_id, outreach_date, method,
                response_received, notes, follow_up_date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.linkedin_url)
        .bind(record.change_id)
        .bind(record.outreach_date)
        .bind(&record.method)
        .bind(record.response_received)
        .bind(&record.notes)
        .bind(record.follow_up_date)
        .execute(self.pool())
        .await
        .context("Failed to create outreach record")?;

        Ok(result.last_insert_rowid())
    }

    async fn get_outreach(&self, id: i64) -> Result<Option<OutreachRecord>> {
        let record = sqlx::query_as::<_, OutreachRecord>(&format!(
            "SELECT {} FROM outreach WHERE id = ?",
            OUTREACH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .context("Failed to load outreach record")?;
        Ok(record)
    }

    async fn update_outreach(&self, record: &OutreachRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE outreach SET change_id = ?, method = ?, response_received = ?, notes = ?,
                follow_up_date = ?
            WHERE id = ?
            "#,
        )
        .bind(record.change_id)
        .bind(&record.method)
        .bind(record.response_received)
        .bind(&record.notes)
        .bind(record.follow_up_date)
        .bind(record.id)
        .execute(self.pool())
        .await
        .context("Failed to update outreach record")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_outreach(&self, linkedin_url: Option<&str>) -> Result<Vec<OutreachRecord>> {
        let records = match linkedin_url {
            Some(url) => {
                sqlx::query_as::<_, OutreachRecord>(&format!(
                    "SELECT {} FROM outreach WHERE linkedin_url = ? ORDER BY id ASC",
                    OUTREACH_COLUMNS
                ))
                .bind(url)
                .fetch_all(self.pool())
                .await
            }
            None => {
                sqlx::query_as::<_, OutreachRecord>(&format!(
                    "SELECT {} FROM outreach ORDER BY id ASC",
                    OUTREACH_COLUMNS
                ))
                .fetch_all(self.pool())
                .await
            }
        }
        .context("Failed to list outreach records")?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn store() -> SqliteStore {
        SqliteStore::new(Database::in_memory().await.unwrap())
    }

    fn sample_profile(url: &str) -> Profile {
        let mut profile = Profile::new(url);
        profile.first_name = "Jane".to_string();
        profile.last_name = "Doe".to_string();
        profile.current_title = "Product Manager".to_string();
        profile.current_company = "BigTech".to_string();
        profile.skills = vec!["Rust".to_string(), "Leadership".to_string()];
        profile.education = vec![EducationEntry {
            school: "Test University".to_string(),
            degree: "MBA".to_string(),
            field: String::new(),
            start_year: Some(2018),
            end_year: None,
        }];
        profile
    }

    #[tokio::test]
    async fn test_profile_round_trip_and_upsert() {
        let store = store().await;
        let url = "https://www.linkedin.com/in/jane";

        store.put(sample_profile(url)).await.unwrap();
        let loaded = store.get(url).await.unwrap().unwrap();
        assert_eq!(loaded.full_name(), "Jane Doe");
        assert_eq!(loaded.skills, vec!["Rust", "Leadership"]);
        assert_eq!(loaded.education[0].start_year, Some(2018));
        assert_eq!(loaded.outreach_status, OutreachStatus::NotContacted);

        let mut updated = sample_profile(url);
        updated.current_title = "Founder".to_string();
        store.put(updated).await.unwrap();

        let profiles = store.list_profiles().await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].current_title, "Founder");
        assert!(store.get("https://www.linkedin.com/in/bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_checked_is_monotonic() {
        let store = store().await;
        let url = "https://www.linkedin.com/in/jane";

        let mut newer = sample_profile(url);
        newer.last_checked = Utc::now() + Duration::hours(1);
        let newer_ts = newer.last_checked;
        store.put(newer).await.unwrap();

        let mut older = sample_profile(url);
        older.last_checked = Utc::now() - Duration::hours(1);
        store.put(older).await.unwrap();

        let loaded = store.get(url).await.unwrap().unwrap();
        assert_eq!(loaded.last_checked.timestamp(), newer_ts.timestamp());
    }

    fn founder_change(url: &str) -> Change {
        Change {
            id: 0,
            linkedin_url: url.to_string(),
            detected_at: Utc::now(),
            old_title: "Product Manager".to_string(),
            new_title: "Founder & CEO".to_string(),
            old_company: "BigTech".to_string(),
            new_company: "Test Startup".to_string(),
            is_founder_change: true,
            insight: Some("Worth a call".to_string()),
            notification_sent: false,
        }
    }

    #[tokio::test]
    async fn test_record_change_and_list() {
        let store = store().await;
        let url = "https://www.linkedin.com/in/jane";
        store.put(sample_profile(url)).await.unwrap();

        let mut fresh = sample_profile(url);
        fresh.current_title = "Founder & CEO".to_string();
        let first = store
            .record_change(fresh.clone(), founder_change(url))
            .await
            .unwrap();

        let mut plain = founder_change(url);
        plain.is_founder_change = false;
        plain.insight = None;
        let second = store.record_change(fresh, plain).await.unwrap();
        assert!(second > first);

        assert_eq!(
            store.get(url).await.unwrap().unwrap().current_title,
            "Founder & CEO"
        );
        let founders = store.list_changes(true).await.unwrap();
        assert_eq!(founders.len(), 1);
        assert_eq!(founders[0].insight.as_deref(), Some("Worth a call"));
        assert_eq!(store.list_changes(false).await.unwrap().len(), 2);

        store.clear().await.unwrap();
        assert!(store.list_changes(false).await.unwrap().is_empty());
        let third = store
            .record_change(sample_profile(url), founder_change(url))
            .await
            .unwrap();
        assert!(third > second);
    }

    #[tokio::test]
    async fn test_record_change_rolls_back_when_snapshot_fails() {
        let store = store().await;
        let url = "https://www.linkedin.com/in/jane";

        // the change insert succeeds, the profile upsert cannot
        sqlx::query("DROP TABLE profiles")
            .execute(store.pool())
            .await
            .unwrap();

        let result = store
            .record_change(sample_profile(url), founder_change(url))
            .await;
        assert!(result.is_err());
        assert!(store.list_changes(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outreach_round_trip() {
        let store = store().await;
        let url = "https://www.linkedin.com/in/jane";

        let id = store
            .create_outreach(OutreachRecord::new(url, Some(7), "LinkedIn", "intro sent"))
            .await
            .unwrap();
        let mut record = store.get_outreach(id).await.unwrap().unwrap();
        assert_eq!(record.change_id, Some(7));
        assert_eq!(record.method, "LinkedIn");
        assert!(record.follow_up_date.is_none());

        record.set_follow_up(Utc::now() + Duration::days(2), None);
        record.mark_as_received(Some("replied"));
        assert!(store.update_outreach(&record).await.unwrap());

        let listed = store.list_outreach(Some(url)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].response_received);
        assert!(listed[0].follow_up_date.is_some());
        assert_eq!(listed[0].notes, "intro sent\n\nreplied");
        assert!(store
            .list_outreach(Some("https://www.linkedin.com/in/bob"))
            .await
            .unwrap()
            .is_empty());
        assert!(store.get_outreach(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_outreach_status_update() {
        let store = store().await;
        let url = "https://www.linkedin.com/in/jane";
        store.put(sample_profile(url)).await.unwrap();

        assert!(store
            .set_outreach_status(url, OutreachStatus::Responded)
            .await
            .unwrap());
        assert_eq!(
            store.get(url).await.unwrap().unwrap().outreach_status,
            OutreachStatus::Responded
        );
        assert!(!store
            .set_outreach_status("https://www.linkedin.com/in/nobody", OutreachStatus::Contacted)
            .await
            .unwrap());
    }
}
