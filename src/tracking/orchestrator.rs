// src/tracking/orchestrator.rs
use super::detector::ChangeDetector;
use super::error::TrackingError;
use super::normalizer::normalize;
use super::types::{
    AddOutcome, BatchAddSummary, BatchRefreshSummary, FounderChangeView, OutreachSuggestion,
    RefreshOutcome,
};
use crate::core::{ConfigManager, ProviderMode};
use crate::insight::{outreach_suggestions, InsightRequester, OpenAiClient, TextGenerator};
use crate::models::{Change, OutreachRecord, OutreachStatus, Profile, TrackingStatus};
use crate::provider::{
    CompanyRecord, DataProvider, OfflineProvider, ProviderError, ProxycurlClient,
};
use crate::storage::ProfileStore;
use crate::validator::{is_valid_company_url, is_valid_profile_url};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

/// Runs fetch → normalize → detect → insight for tracked profiles.
///
/// Fetches pass through a counting gate sized to `concurrency`. Work on a
/// single URL is serialized by a per-URL lock, so two refreshes of the same
/// profile never interleave their read-modify-write. A lock leaves the map
/// once nobody holds or waits on it.
pub struct Tracker {
    provider: Arc<dyn DataProvider>,
    store: Arc<dyn ProfileStore>,
    detector: ChangeDetector,
    insights: InsightRequester,
    concurrency: usize,
    fetch_gate: Semaphore,
    url_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Tracker {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        store: Arc<dyn ProfileStore>,
        detector: ChangeDetector,
        insights: InsightRequester,
    ) -> Self {
        Self {
            provider,
            store,
            detector,
            insights,
            concurrency: 1,
            fetch_gate: Semaphore::new(1),
            url_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        self.concurrency = concurrency;
        self.fetch_gate = Semaphore::new(concurrency);
        self
    }

    /// Wire up the provider and text generator selected by configuration
    pub async fn from_config(config: &ConfigManager, store: Arc<dyn ProfileStore>) -> Result<Self> {
        let provider: Arc<dyn DataProvider> = match config.provider.mode {
            ProviderMode::Live => Arc::new(ProxycurlClient::new(&config.provider)?),
            ProviderMode::Offline => {
                // profiles already stored count as seen, so a refresh shows the simulated switch
                let known = store
                    .list_profiles()
                    .await?
                    .into_iter()
                    .map(|p| p.linkedin_url);
                Arc::new(OfflineProvider::with_known(known))
            }
        };

        let generator: Option<Arc<dyn TextGenerator>> = match config.generator.api_key {
            Some(_) => Some(Arc::new(OpenAiClient::new(&config.generator)?)),
            None => None,
        };

        let detector = ChangeDetector::new(
            config.tracking.founder_keywords.clone(),
            config.tracking.stealth_keywords.clone(),
        );

        info!("Tracker using '{}' provider", provider.name());

        Ok(Self::new(
            provider,
            store,
            detector,
            InsightRequester::new(generator, &config.generator),
        )
        .with_concurrency(config.tracking.concurrency))
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    async fn lock_for(&self, url: &str) -> Arc<Mutex<()>> {
        let mut locks = self.url_locks.lock().await;
        locks
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Call after the guard is dropped
    async fn release_lock(&self, url: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.url_locks.lock().await;
        // the map's reference plus ours
        if Arc::strong_count(&lock) == 2 {
            locks.remove(url);
        }
    }

    async fn fetch_profile(&self, url: &str) -> Result<Profile, TrackingError> {
        let record = {
            let _permit = self
                .fetch_gate
                .acquire()
                .await
                .map_err(|e| ProviderError::Transport(e.to_string()))?;
            self.provider.fetch(url).await
        };

        let record = record.map_err(|e| {
            warn!("Fetch failed for {}: {}", url, e);
            TrackingError::Fetch(e)
        })?;

        normalize(url, &record).map_err(|e| {
            warn!("Normalization failed for {}: {}", url, e);
            e
        })
    }

    /// Start tracking a profile. Adding an already tracked profile succeeds
    /// without touching the stored snapshot.
    pub async fn add(&self, url: &str) -> AddOutcome {
        let url = url.trim();
        if !is_valid_profile_url(url) {
            return AddOutcome::failed(url, &TrackingError::Validation(url.to_string()));
        }

        let lock = self.lock_for(url).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.add_locked(url).await
        };
        self.release_lock(url, lock).await;
        outcome
    }

    async fn add_locked(&self, url: &str) -> AddOutcome {
        match self.try_add(url).await {
            Ok(true) => {
                info!("Added profile {}", url);
                AddOutcome::added(url)
            }
            Ok(false) => AddOutcome::already_tracked(url),
            Err(e) => {
                error!("Error adding profile {}: {}", url, e);
                AddOutcome::failed(url, &e)
            }
        }
    }

    async fn try_add(&self, url: &str) -> Result<bool, TrackingError> {
        if self.store.get(url).await?.is_some() {
            return Ok(false);
        }

        let profile = self.fetch_profile(url).await?;
        if !self.store.put(profile).await? {
            return Err(TrackingError::Storage(format!(
                "Error adding profile {} to storage",
                url
            )));
        }
        Ok(true)
    }

    /// Re-fetch a profile and record a change if its role moved. Untracked
    /// profiles are added instead and never yield a change.
    pub async fn refresh(&self, url: &str) -> RefreshOutcome {
        let url = url.trim();
        if !is_valid_profile_url(url) {
            return RefreshOutcome::failed(url, &TrackingError::Validation(url.to_string()));
        }

        let lock = self.lock_for(url).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.refresh_locked(url).await
        };
        self.release_lock(url, lock).await;
        outcome
    }

    async fn refresh_locked(&self, url: &str) -> RefreshOutcome {
        let stored = match self.store.get(url).await {
            Ok(stored) => stored,
            Err(e) => return RefreshOutcome::failed(url, &TrackingError::from(e)),
        };

        let Some(stored) = stored else {
            return self.add_locked(url).await.into();
        };

        match self.refresh_tracked(url, &stored).await {
            Ok(Some(change)) => RefreshOutcome::changed(url, change),
            Ok(None) => RefreshOutcome::unchanged(url),
            Err(e) => {
                error!("Error refreshing profile {}: {}", url, e);
                RefreshOutcome::failed(url, &e)
            }
        }
    }

    async fn refresh_tracked(
        &self,
        url: &str,
        stored: &Profile,
    ) -> Result<Option<Change>, TrackingError> {
        let mut fresh = self.fetch_profile(url).await?;
        fresh.inherit_statuses(stored);

        let Some(mut change) = self.detector.detect(Some(stored), &fresh) else {
            // still stored to advance last_checked
            self.store.put(fresh).await?;
            return Ok(None);
        };

        info!(
            "Change detected for {}: {} (founder: {})",
            url,
            change.description(),
            change.is_founder_change
        );

        if change.is_founder_change {
            let insight = self.insights.request_insight(&change, &fresh).await;
            change.insight = Some(insight);
        }

        // on failure nothing is written and the next refresh detects the change again
        change.id = self.store.record_change(fresh, change.clone()).await?;

        Ok(Some(change))
    }

    pub async fn batch_add(&self, urls: &[String]) -> BatchAddSummary {
        let outcomes: Vec<AddOutcome> = stream::iter(urls)
            .map(|url| self.add(url))
            .buffered(self.concurrency)
            .collect()
            .await;

        let summary = BatchAddSummary::from_outcomes(outcomes);
        info!(
            "Batch add finished: {} added, {} already tracked, {} failed",
            summary.succeeded, summary.already_tracked, summary.failed
        );
        summary
    }

    /// Refresh the given profiles, or every active tracked profile when `urls` is `None`
    pub async fn batch_refresh(&self, urls: Option<&[String]>) -> BatchRefreshSummary {
        let urls: Vec<String> = match urls {
            Some(urls) => urls.to_vec(),
            None => match self.store.list_profiles().await {
                Ok(profiles) => profiles
                    .into_iter()
                    .filter(|p| p.tracking_status == TrackingStatus::Active)
                    .map(|p| p.linkedin_url)
                    .collect(),
                Err(e) => {
                    error!("Failed to list tracked profiles: {:#}", e);
                    return BatchRefreshSummary::aborted(format!(
                        "Failed to list tracked profiles: {:#}",
                        e
                    ));
                }
            },
        };

        let outcomes: Vec<RefreshOutcome> = stream::iter(&urls)
            .map(|url| self.refresh(url))
            .buffered(self.concurrency)
            .collect()
            .await;

        let summary = BatchRefreshSummary::from_outcomes(outcomes);
        info!(
            "Batch refresh finished: {} ok, {} failed, {} changes, {} founder changes",
            summary.succeeded, summary.failed, summary.changes_detected, summary.founder_changes
        );
        summary
    }

    pub async fn profiles(&self) -> Result<Vec<Profile>> {
        self.store.list_profiles().await
    }

    pub async fn changes(&self, founder_only: bool) -> Result<Vec<Change>> {
        self.store.list_changes(founder_only).await
    }

    pub async fn recent_founder_changes(&self, limit: usize) -> Result<Vec<FounderChangeView>> {
        let changes = self.store.recent_founder_changes(limit).await?;
        let mut views = Vec::with_capacity(changes.len());
        for change in changes {
            let profile = self.store.get(&change.linkedin_url).await?;
            let (first_name, last_name, full_name) = match profile {
                Some(p) => (p.first_name.clone(), p.last_name.clone(), p.full_name()),
                None => (String::new(), String::new(), String::new()),
            };
            views.push(FounderChangeView {
                change,
                first_name,
                last_name,
                full_name,
            });
        }
        Ok(views)
    }

    pub async fn set_outreach_status(&self, url: &str, status: OutreachStatus) -> Result<bool> {
        let url = url.trim();
        let lock = self.lock_for(url).await;
        let updated = {
            let _guard = lock.lock().await;
            self.store.set_outreach_status(url, status).await
        };
        self.release_lock(url, lock).await;
        updated
    }

    /// Log an outreach attempt. A profile not yet contacted moves to contacted.
    pub async fn create_outreach(
        &self,
        url: &str,
        change_id: Option<i64>,
        method: &str,
        notes: &str,
    ) -> Result<OutreachRecord> {
        let url = url.trim();
        let lock = self.lock_for(url).await;
        let created = {
            let _guard = lock.lock().await;
            self.create_outreach_locked(url, change_id, method, notes).await
        };
        self.release_lock(url, lock).await;
        created
    }

    async fn create_outreach_locked(
        &self,
        url: &str,
        change_id: Option<i64>,
        method: &str,
        notes: &str,
    ) -> Result<OutreachRecord> {
        let Some(profile) = self.store.get(url).await? else {
            bail!("Profile {} is not tracked", url);
        };

        let mut record = OutreachRecord::new(url, change_id, method, notes);
        record.id = self.store.create_outreach(record.clone()).await?;

        if profile.outreach_status == OutreachStatus::NotContacted {
            self.store
                .set_outreach_status(url, OutreachStatus::Contacted)
                .await?;
        }

        info!("Logged {} outreach {} for {}", record.method, record.id, url);
        Ok(record)
    }

    /// Mark an outreach as answered; the profile moves to responded
    pub async fn record_response(
        &self,
        outreach_id: i64,
        notes: Option<&str>,
    ) -> Result<OutreachRecord> {
        let Some(mut record) = self.store.get_outreach(outreach_id).await? else {
            bail!("Outreach {} not found", outreach_id);
        };

        record.mark_as_received(notes);
        self.store.update_outreach(&record).await?;
        self.set_outreach_status(&record.linkedin_url, OutreachStatus::Responded)
            .await?;
        Ok(record)
    }

    pub async fn schedule_follow_up(
        &self,
        outreach_id: i64,
        date: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<OutreachRecord> {
        let Some(mut record) = self.store.get_outreach(outreach_id).await? else {
            bail!("Outreach {} not found", outreach_id);
        };

        record.set_follow_up(date, notes);
        self.store.update_outreach(&record).await?;
        Ok(record)
    }

    pub async fn outreach_records(&self, url: Option<&str>) -> Result<Vec<OutreachRecord>> {
        self.store.list_outreach(url.map(str::trim)).await
    }

    /// Unanswered outreach whose follow-up date has passed
    pub async fn due_follow_ups(&self, now: DateTime<Utc>) -> Result<Vec<OutreachRecord>> {
        Ok(self
            .store
            .list_outreach(None)
            .await?
            .into_iter()
            .filter(|record| record.needs_follow_up(now))
            .collect())
    }

    /// Analysis and talking points for the most recent founder changes.
    /// Changes whose profile is gone are skipped.
    pub async fn founder_outreach_suggestions(
        &self,
        limit: usize,
    ) -> Result<Vec<OutreachSuggestion>> {
        let mut suggestions = Vec::new();
        for change in self.store.recent_founder_changes(limit).await? {
            let Some(profile) = self.store.get(&change.linkedin_url).await? else {
                continue;
            };
            let analysis = self.insights.analyze_founder_potential(&profile).await;
            let points = outreach_suggestions(&profile, Some(&analysis.analysis));
            suggestions.push(OutreachSuggestion {
                profile,
                change,
                analysis,
                suggestions: points,
            });
        }
        Ok(suggestions)
    }

    /// Company page details for a company URL
    pub async fn company(&self, url: &str) -> Result<CompanyRecord, TrackingError> {
        let url = url.trim();
        if !is_valid_company_url(url) {
            return Err(TrackingError::Validation(url.to_string()));
        }

        let _permit = self
            .fetch_gate
            .acquire()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(self.provider.fetch_company(url).await?)
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }
}
