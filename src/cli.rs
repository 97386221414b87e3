// src/cli.rs
use crate::core::{ConfigManager, Database};
use crate::discovery::{OfflineSearch, ProfileFinder, SearchProvider, SerpApiClient};
use crate::models::outreach::DEFAULT_OUTREACH_METHOD;
use crate::models::OutreachStatus;
use crate::provider::ProxycurlClient;
use crate::storage::SqliteStore;
use crate::tracking::{categorize, ChangeDetector, Tracker};
use crate::validator::{partition_urls, read_profile_urls_from_path};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "founder-tracker")]
#[command(about = "Track LinkedIn profiles and flag people who become founders")]
pub struct TrackerCli {
    #[command(subcommand)]
    pub command: TrackerCommand,

    /// Overrides the configured database location
    #[arg(long)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum TrackerCommand {
    /// Start tracking a profile
    Add { url: String },
    /// Re-fetch a profile and report any role change
    Refresh { url: String },
    /// Add every profile listed in a CSV file with a linkedin_url column
    Import { csv_file: PathBuf },
    /// Refresh the given profiles, or every active tracked profile
    RefreshAll { urls: Vec<String> },
    /// List tracked profiles
    Profiles,
    /// List detected changes
    Changes {
        #[arg(long)]
        founder_only: bool,
        /// Only the N most recent founder changes, with names
        #[arg(long)]
        recent: Option<usize>,
        /// Group by change category
        #[arg(long)]
        grouped: bool,
    },
    /// Set outreach status: not_contacted, contacted or responded
    Outreach { url: String, status: String },
    /// Analysis and talking points for the most recent founder changes
    Suggest {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Log an outreach attempt to a tracked profile
    Contact {
        url: String,
        #[arg(long)]
        change_id: Option<i64>,
        #[arg(long, default_value = DEFAULT_OUTREACH_METHOD)]
        method: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Record a reply to an outreach attempt
    Respond {
        id: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Schedule a follow-up (YYYY-MM-DD or RFC 3339)
    FollowUp {
        id: i64,
        date: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Unanswered outreach whose follow-up date has passed
    FollowUps,
    /// List outreach attempts, optionally for one profile
    OutreachLog { url: Option<String> },
    /// Search the web for founder profiles
    Discover {
        /// Comma separated search terms
        keywords: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Start tracking every profile found
        #[arg(long)]
        track: bool,
    },
    /// Search for founders connected to a company
    DiscoverCompany {
        company: String,
        #[arg(long)]
        location: Option<String>,
    },
    /// Print search term ideas
    SearchIdeas {
        #[arg(long)]
        industry: Option<String>,
    },
    /// Look up a company page
    Company { url: String },
    /// Remaining provider API credits
    Credits,
    /// Delete all profiles, changes and outreach
    Clear,
    /// Create the database and print the active configuration
    Init,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'", raw))?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("Invalid date '{}'", raw))?;
    Ok(midnight.and_utc())
}

fn profile_finder(config: &ConfigManager) -> Result<ProfileFinder> {
    let search: Arc<dyn SearchProvider> = match config.discovery.api_key {
        Some(_) => Arc::new(SerpApiClient::new(&config.discovery)?),
        None => Arc::new(OfflineSearch::new()),
    };
    let detector = ChangeDetector::new(
        config.tracking.founder_keywords.clone(),
        config.tracking.stealth_keywords.clone(),
    );
    Ok(ProfileFinder::new(search, detector))
}

pub async fn handle_tracker_command(cli: TrackerCli, mut config: ConfigManager) -> Result<()> {
    if let Some(path) = cli.database_path {
        config.environment.database_path = path;
    }

    let db = Database::new(&config.environment.database_path).await?;
    db.health_check().await?;
    let store = Arc::new(SqliteStore::new(db));
    let tracker = Tracker::from_config(&config, store).await?;

    match cli.command {
        TrackerCommand::Add { url } => print_json(&tracker.add(&url).await)?,

        TrackerCommand::Refresh { url } => print_json(&tracker.refresh(&url).await)?,

        TrackerCommand::Import { csv_file } => {
            if !csv_file.exists() {
                bail!("CSV file not found: {}", csv_file.display());
            }

            let urls = read_profile_urls_from_path(&csv_file)?;
            let (_, invalid) = partition_urls(&urls);
            if !invalid.is_empty() {
                warn!("{} rows in {} are not profile URLs", invalid.len(), csv_file.display());
            }
            info!("Importing {} profiles from {}", urls.len(), csv_file.display());

            print_json(&tracker.batch_add(&urls).await)?;
        }

        TrackerCommand::RefreshAll { urls } => {
            let summary = if urls.is_empty() {
                tracker.batch_refresh(None).await
            } else {
                tracker.batch_refresh(Some(&urls)).await
            };
            print_json(&summary)?;
        }

        TrackerCommand::Profiles => print_json(&tracker.profiles().await?)?,

        TrackerCommand::Changes {
            founder_only,
            recent,
            grouped,
        } => {
            if let Some(limit) = recent {
                print_json(&tracker.recent_founder_changes(limit).await?)?;
            } else {
                let changes = tracker.changes(founder_only).await?;
                if grouped {
                    print_json(&categorize(&changes))?;
                } else {
                    let scored: Vec<_> = changes
                        .iter()
                        .map(|change| {
                            json!({
                                "change": change,
                                "category": change.category(),
                                "significance": tracker.detector().significance(change),
                            })
                        })
                        .collect();
                    print_json(&scored)?;
                }
            }
        }

        TrackerCommand::Outreach { url, status } => {
            let Some(status) = OutreachStatus::parse(&status) else {
                bail!("Unknown outreach status '{}'", status);
            };
            if tracker.set_outreach_status(&url, status).await? {
                print_json(&json!({ "url": url, "outreach_status": status.as_str() }))?;
            } else {
                bail!("Profile {} is not tracked", url);
            }
        }

        TrackerCommand::Suggest { limit } => {
            print_json(&tracker.founder_outreach_suggestions(limit).await?)?
        }

        TrackerCommand::Contact {
            url,
            change_id,
            method,
            notes,
        } => print_json(
            &tracker
                .create_outreach(&url, change_id, &method, &notes)
                .await?,
        )?,

        TrackerCommand::Respond { id, notes } => {
            print_json(&tracker.record_response(id, notes.as_deref()).await?)?
        }

        TrackerCommand::FollowUp { id, date, notes } => {
            let date = parse_date(date.trim())?;
            print_json(
                &tracker
                    .schedule_follow_up(id, date, notes.as_deref())
                    .await?,
            )?;
        }

        TrackerCommand::FollowUps => print_json(&tracker.due_follow_ups(Utc::now()).await?)?,

        TrackerCommand::OutreachLog { url } => {
            print_json(&tracker.outreach_records(url.as_deref()).await?)?
        }

        TrackerCommand::Discover {
            keywords,
            location,
            page,
            track,
        } => {
            let finder = profile_finder(&config)?;
            let report = finder
                .search_founder_profiles(&keywords, location.as_deref(), page)
                .await?;

            if track {
                let (profiles, errors) = ProfileFinder::validate_and_format(&report.profiles);
                for message in &errors {
                    warn!("{}", message);
                }
                let urls: Vec<String> = profiles.into_iter().map(|p| p.linkedin_url).collect();
                print_json(&tracker.batch_add(&urls).await)?;
            } else {
                print_json(&report)?;
            }
        }

        TrackerCommand::DiscoverCompany { company, location } => {
            let finder = profile_finder(&config)?;
            print_json(&finder.search_by_company(&company, location.as_deref()).await?)?;
        }

        TrackerCommand::SearchIdeas { industry } => {
            print_json(&ProfileFinder::search_suggestions(industry.as_deref()))?
        }

        TrackerCommand::Company { url } => print_json(&tracker.company(&url).await?)?,

        TrackerCommand::Credits => {
            let client = ProxycurlClient::new(&config.provider)?;
            let balance = client.credit_balance().await?;
            print_json(&json!({ "credit_balance": balance }))?;
        }

        TrackerCommand::Clear => {
            tracker.clear().await?;
            print_json(&json!({ "cleared": true }))?;
        }

        TrackerCommand::Init => {
            config.log_summary();
            print_json(&json!({
                "database": config.environment.database_path.display().to_string(),
                "log": config.environment.log_path.display().to_string(),
                "provider": format!("{:?}", config.provider.mode),
                "concurrency": config.tracking.concurrency,
            }))?;
        }
    }

    Ok(())
}
