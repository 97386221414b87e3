use async_trait::async_trait;
use founder_tracker::core::{ConfigManager, Database};
use founder_tracker::discovery::{OfflineSearch, ProfileFinder};
use founder_tracker::insight::{fallback_insight, InsightRequester};
use founder_tracker::provider::{DataProvider, OfflineProvider, ProviderError, RawRecord};
use founder_tracker::models::OutreachStatus;
use founder_tracker::storage::{MemoryStore, ProfileStore, SqliteStore};
use founder_tracker::tracking::{AddStatus, ChangeDetector, FailureKind, Tracker};
use founder_tracker::validator::read_profile_urls;
use std::sync::Arc;

const FOUNDER_URL: &str = "https://www.linkedin.com/in/test-founder";

fn memory_tracker(provider: Arc<dyn DataProvider>) -> Tracker {
    Tracker::new(
        provider,
        Arc::new(MemoryStore::new()),
        ChangeDetector::default(),
        InsightRequester::offline(),
    )
}

/// Fails for one URL, serves a fixed employee record for the rest
struct OneBadUrl {
    bad: String,
}

#[async_trait]
impl DataProvider for OneBadUrl {
    async fn fetch(&self, linkedin_url: &str) -> Result<RawRecord, ProviderError> {
        if linkedin_url == self.bad {
            return Err(ProviderError::NotFound(linkedin_url.to_string()));
        }
        Ok(RawRecord {
            first_name: Some("Sam".to_string()),
            last_name: Some("Lee".to_string()),
            current_title: Some("Engineer".to_string()),
            current_company: Some("Acme".to_string()),
            ..Default::default()
        })
    }

    fn name(&self) -> &'static str {
        "one-bad-url"
    }
}

#[tokio::test]
async fn founder_switch_is_detected_with_insight() {
    let tracker = memory_tracker(Arc::new(OfflineProvider::new()));

    let added = tracker.add(FOUNDER_URL).await;
    assert!(added.success);
    assert_eq!(added.status, AddStatus::Added);

    let outcome = tracker.refresh(FOUNDER_URL).await;
    assert!(outcome.success);

    let change = outcome.change.expect("role change");
    assert!(change.is_founder_change);
    assert_eq!(change.old_title, "Product Manager");
    assert_eq!(change.old_company, "BigTech");
    assert_eq!(change.new_title, "Founder & CEO");
    assert_eq!(change.new_company, "Test Startup");

    let profile = tracker.store().get(FOUNDER_URL).await.unwrap().unwrap();
    assert_eq!(profile.previous_title, "Product Manager");
    assert_eq!(profile.previous_company, "BigTech");
    assert_eq!(change.insight.as_deref(), Some(fallback_insight(&profile).as_str()));

    let founder_changes = tracker.changes(true).await.unwrap();
    assert_eq!(founder_changes.len(), 1);
    assert_eq!(founder_changes[0].insight, change.insight);
}

#[tokio::test]
async fn adding_twice_keeps_one_snapshot() {
    let tracker = memory_tracker(Arc::new(OfflineProvider::new()));

    tracker.add(FOUNDER_URL).await;
    let second = tracker.add(FOUNDER_URL).await;
    assert!(second.success);
    assert_eq!(second.status, AddStatus::AlreadyTracked);

    let profiles = tracker.profiles().await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].current_title, "Product Manager");
    assert!(tracker.changes(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn batch_refresh_isolates_failures_and_keeps_order() {
    let urls: Vec<String> = ["alice", "bob", "carol"]
        .iter()
        .map(|id| format!("https://www.linkedin.com/in/{}", id))
        .collect();
    let tracker = memory_tracker(Arc::new(OneBadUrl {
        bad: urls[1].clone(),
    }))
    .with_concurrency(3);

    let summary = tracker.batch_refresh(Some(&urls)).await;
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.changes_detected, 0);

    let order: Vec<&str> = summary.details.iter().map(|d| d.url.as_str()).collect();
    assert_eq!(order, vec![urls[0].as_str(), urls[1].as_str(), urls[2].as_str()]);
    assert!(!summary.details[1].success);
    assert_eq!(summary.details[1].failure, Some(FailureKind::Fetch));

    // first refresh of an unknown profile adds it
    assert_eq!(tracker.profiles().await.unwrap().len(), 2);
}

#[tokio::test]
async fn csv_import_reports_bad_rows() {
    let csv = "name,linkedin_url\n\
               One,https://www.linkedin.com/in/one\n\
               Two,not-a-url\n\
               Three,https://linkedin.com/in/three/\n";
    let urls = read_profile_urls(csv.as_bytes()).unwrap();
    assert_eq!(urls.len(), 3);

    let tracker = memory_tracker(Arc::new(OfflineProvider::new()));
    let summary = tracker.batch_add(&urls).await;

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.already_tracked, 0);
    assert_eq!(summary.details[1].url, "not-a-url");
    assert_eq!(
        summary.details[1].status,
        AddStatus::Failed(FailureKind::Validation)
    );
}

#[tokio::test]
async fn concurrent_refreshes_of_one_profile_record_a_single_change() {
    let tracker = memory_tracker(Arc::new(OfflineProvider::new())).with_concurrency(4);
    tracker.add(FOUNDER_URL).await;

    let urls = vec![FOUNDER_URL.to_string(); 4];
    let summary = tracker.batch_refresh(Some(&urls)).await;

    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.founder_changes, 1);
    assert_eq!(tracker.changes(false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_tracking_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ConfigManager::load_from(None, |_| None).unwrap();
    config.environment.database_path = dir.path().join("tracker.db");

    {
        let db = Database::new(&config.environment.database_path).await.unwrap();
        let store: Arc<dyn ProfileStore> = Arc::new(SqliteStore::new(db));
        let tracker = Tracker::from_config(&config, store).await.unwrap();
        assert!(tracker.add(FOUNDER_URL).await.success);
    }

    let db = Database::new(&config.environment.database_path).await.unwrap();
    let store: Arc<dyn ProfileStore> = Arc::new(SqliteStore::new(db));
    let tracker = Tracker::from_config(&config, store).await.unwrap();

    let outcome = tracker.refresh(FOUNDER_URL).await;
    let change = outcome.change.expect("founder switch after restart");
    assert!(change.is_founder_change);

    let recent = tracker.recent_founder_changes(5).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].full_name, "Test User");
    assert!(recent[0].change.insight.is_some());
}

#[tokio::test]
async fn discovered_founders_flow_into_outreach() {
    let finder = ProfileFinder::new(Arc::new(OfflineSearch::new()), ChangeDetector::default());
    let report = finder
        .search_founder_profiles("fintech", Some("Berlin"), 1)
        .await
        .unwrap();
    assert_eq!(report.profiles.len(), 3);

    let (profiles, errors) = ProfileFinder::validate_and_format(&report.profiles);
    assert!(errors.is_empty());
    let urls: Vec<String> = profiles.into_iter().map(|p| p.linkedin_url).collect();

    let tracker = memory_tracker(Arc::new(OfflineProvider::new()));
    assert_eq!(tracker.batch_add(&urls).await.succeeded, 3);
    let refreshed = tracker.batch_refresh(None).await;
    assert_eq!(refreshed.founder_changes, 3);

    let suggestions = tracker.founder_outreach_suggestions(2).await.unwrap();
    assert_eq!(suggestions.len(), 2);

    let pick = &suggestions[0];
    let record = tracker
        .create_outreach(&pick.profile.linkedin_url, Some(pick.change.id), "", "")
        .await
        .unwrap();
    assert_eq!(record.method, "Email");

    let contacted = tracker
        .store()
        .get(&pick.profile.linkedin_url)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contacted.outreach_status, OutreachStatus::Contacted);
}
