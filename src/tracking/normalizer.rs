// src/tracking/normalizer.rs
//! Maps a provider record onto the canonical `Profile`.
//!
//! Current role: the provider's explicit current-job fields when present,
//! each missing one filled from the derived entry. The derived entry is the
//! open-ended experience with the latest start (first listed wins a tie),
//! otherwise the latest-started experience. Previous role: the experience
//! that ended most recently among those that are not the current role,
//! using the start date for entries with no end date.

use super::error::TrackingError;
use crate::models::{EducationEntry, Profile};
use crate::provider::{RawDate, RawExperience, RawRecord};
use chrono::Utc;

/// Sort key for partial dates. Undated entries order below every dated one;
/// inside a dated entry a missing month or day counts as zero.
type DateKey = (bool, i32, i32, i32);

fn date_key(date: Option<&RawDate>) -> DateKey {
    match date {
        Some(d) if d.year.is_some() => (
            true,
            d.year.unwrap_or(0),
            d.month.unwrap_or(0),
            d.day.unwrap_or(0),
        ),
        _ => (false, 0, 0, 0),
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

/// Index of the greatest key; ties keep the earliest index
fn latest_by<F>(candidates: &[usize], key: F) -> Option<usize>
where
    F: Fn(usize) -> DateKey,
{
    let mut best: Option<(usize, DateKey)> = None;
    for &index in candidates {
        let k = key(index);
        match best {
            Some((_, best_key)) if k <= best_key => {}
            _ => best = Some((index, k)),
        }
    }
    best.map(|(index, _)| index)
}

fn select_current(experiences: &[RawExperience]) -> Option<usize> {
    let all: Vec<usize> = (0..experiences.len()).collect();
    let open_ended: Vec<usize> = all
        .iter()
        .copied()
        .filter(|&i| experiences[i].ends_at.is_none())
        .collect();

    let start_key = |i: usize| date_key(experiences[i].starts_at.as_ref());
    if open_ended.is_empty() {
        latest_by(&all, start_key)
    } else {
        latest_by(&open_ended, start_key)
    }
}

fn select_previous(experiences: &[RawExperience], current: Option<usize>) -> Option<usize> {
    let remaining: Vec<usize> = (0..experiences.len())
        .filter(|&i| Some(i) != current)
        .collect();
    latest_by(&remaining, |i| {
        let exp = &experiences[i];
        match exp.ends_at.as_ref() {
            Some(end) if end.year.is_some() => date_key(Some(end)),
            _ => date_key(exp.starts_at.as_ref()),
        }
    })
}

/// Whether an experience entry is the role the explicit fields describe.
/// Empty explicit fields match anything.
fn describes(exp: &RawExperience, title: &str, company: &str) -> bool {
    let same = |explicit: &str, value: &Option<String>| {
        explicit.is_empty() || explicit.eq_ignore_ascii_case(&text(value))
    };
    same(title, &exp.title) && same(company, &exp.company)
}

pub fn normalize(linkedin_url: &str, record: &RawRecord) -> Result<Profile, TrackingError> {
    if let Some(error) = record.error.as_deref().filter(|e| !e.trim().is_empty()) {
        return Err(TrackingError::Normalization(error.to_string()));
    }

    let mut profile = Profile::new(linkedin_url);
    profile.first_name = text(&record.first_name);
    profile.last_name = text(&record.last_name);

    // fill first/last from full_name when the split fields are missing
    if profile.first_name.is_empty() && profile.last_name.is_empty() {
        let full = text(&record.full_name);
        let mut parts = full.splitn(2, ' ');
        profile.first_name = parts.next().unwrap_or_default().to_string();
        profile.last_name = parts.next().unwrap_or_default().trim().to_string();
    }

    let experiences = record.experiences.as_deref().unwrap_or_default();
    let current = select_current(experiences);

    let explicit_title = text(&record.current_title);
    let explicit_company = text(&record.current_company);
    let derived_title = current.map(|i| text(&experiences[i].title)).unwrap_or_default();
    let derived_company = current.map(|i| text(&experiences[i].company)).unwrap_or_default();

    // the derived entry only leaves the previous-role pool when it is the current role
    let consumed = if explicit_title.is_empty() && explicit_company.is_empty() {
        current
    } else {
        current.filter(|&i| describes(&experiences[i], &explicit_title, &explicit_company))
    };

    profile.current_title = if explicit_title.is_empty() {
        derived_title
    } else {
        explicit_title
    };
    profile.current_company = if explicit_company.is_empty() {
        derived_company
    } else {
        explicit_company
    };

    if let Some(i) = select_previous(experiences, consumed) {
        profile.previous_title = text(&experiences[i].title);
        profile.previous_company = text(&experiences[i].company);
    }

    profile.skills = record
        .skills
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    profile.education = record
        .education
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|edu| EducationEntry {
            school: text(&edu.school),
            degree: text(&edu.degree_name),
            field: text(&edu.field_of_study),
            start_year: edu.starts_at.and_then(|d| d.year),
            end_year: edu.ends_at.and_then(|d| d.year),
        })
        .collect();

    profile.last_checked = Utc::now();
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::OfflineProvider;

    const URL: &str = "https://www.linkedin.com/in/jane";

    fn exp(title: &str, company: &str, start: Option<RawDate>, end: Option<RawDate>) -> RawExperience {
        RawExperience {
            title: Some(title.to_string()),
            company: Some(company.to_string()),
            starts_at: start,
            ends_at: end,
            ..Default::default()
        }
    }

    fn record(experiences: Vec<RawExperience>) -> RawRecord {
        RawRecord {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            experiences: Some(experiences),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_ended_role_is_current() {
        let raw = record(vec![
            exp("Engineer", "OldCo", Some(RawDate::ymd(2015, 1, 1)), Some(RawDate::ymd(2019, 12, 1))),
            exp("CTO", "NewCo", Some(RawDate::ymd(2020, 1, 1)), None),
        ]);
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.current_title, "CTO");
        assert_eq!(profile.current_company, "NewCo");
        assert_eq!(profile.previous_title, "Engineer");
        assert_eq!(profile.previous_company, "OldCo");
    }

    #[test]
    fn test_latest_start_wins_among_open_roles() {
        let raw = record(vec![
            exp("Advisor", "Fund", Some(RawDate::ymd(2018, 3, 1)), None),
            exp("Founder", "Startup", Some(RawDate::ymd(2023, 6, 1)), None),
        ]);
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.current_title, "Founder");
        // the other open role is the only one left, keyed by its start date
        assert_eq!(profile.previous_title, "Advisor");
    }

    #[test]
    fn test_tie_goes_to_first_listed() {
        let raw = record(vec![
            exp("Founder", "A", Some(RawDate::ymd(2023, 6, 1)), None),
            exp("Board Member", "B", Some(RawDate::ymd(2023, 6, 1)), None),
        ]);
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.current_company, "A");
    }

    #[test]
    fn test_previous_is_most_recently_ended() {
        let raw = record(vec![
            exp("Intern", "First", Some(RawDate::ymd(2010, 1, 1)), Some(RawDate::ymd(2011, 1, 1))),
            exp("Founder", "Now", Some(RawDate::ymd(2022, 1, 1)), None),
            exp("PM", "Recent", Some(RawDate::ymd(2016, 1, 1)), Some(RawDate::ymd(2021, 11, 1))),
        ]);
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.previous_title, "PM");
        assert_eq!(profile.previous_company, "Recent");
    }

    #[test]
    fn test_undated_entries_never_outrank_dated_ones() {
        let raw = record(vec![
            exp("Volunteer", "Club", None, Some(RawDate::default())),
            exp("Founder", "Now", Some(RawDate::year(2022)), None),
            exp("PM", "Recent", Some(RawDate::year(2016)), Some(RawDate::year(2021))),
        ]);
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.current_title, "Founder");
        assert_eq!(profile.previous_title, "PM");
    }

    #[test]
    fn test_no_open_role_falls_back_to_latest_start() {
        let raw = record(vec![
            exp("Engineer", "OldCo", Some(RawDate::year(2012)), Some(RawDate::year(2015))),
            exp("Lead", "MidCo", Some(RawDate::year(2016)), Some(RawDate::year(2020))),
        ]);
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.current_title, "Lead");
        assert_eq!(profile.previous_title, "Engineer");
    }

    #[test]
    fn test_single_role_leaves_previous_empty() {
        let raw = record(vec![exp("PM", "BigTech", Some(RawDate::year(2020)), None)]);
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.previous_title, "");
        assert_eq!(profile.previous_company, "");
    }

    #[test]
    fn test_missing_experiences_is_not_an_error() {
        let raw = RawRecord {
            full_name: Some("Ada Lovelace".to_string()),
            experiences: None,
            ..Default::default()
        };
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.last_name, "Lovelace");
        assert_eq!(profile.current_title, "");
        assert_eq!(profile.previous_title, "");
    }

    #[test]
    fn test_explicit_current_fields_take_precedence() {
        let mut raw = record(vec![exp("PM", "BigTech", Some(RawDate::year(2020)), None)]);
        raw.current_title = Some("Founder".to_string());
        raw.current_company = Some("Stealth".to_string());
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.current_title, "Founder");
        assert_eq!(profile.current_company, "Stealth");
    }

    #[test]
    fn test_partial_explicit_fields_are_filled_from_experience() {
        let mut raw = record(vec![exp("PM", "BigTech", Some(RawDate::year(2020)), None)]);
        raw.current_title = Some("Founder".to_string());
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.current_title, "Founder");
        assert_eq!(profile.current_company, "BigTech");

        let mut raw = record(vec![exp("PM", "BigTech", Some(RawDate::year(2020)), None)]);
        raw.current_company = Some("Stealth".to_string());
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.current_title, "PM");
        assert_eq!(profile.current_company, "Stealth");
    }

    #[test]
    fn test_explicit_role_keeps_open_experience_as_previous() {
        let mut raw = record(vec![exp("PM", "BigTech", Some(RawDate::year(2020)), None)]);
        raw.current_title = Some("Founder".to_string());
        raw.current_company = Some("Stealth".to_string());
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.previous_title, "PM");
        assert_eq!(profile.previous_company, "BigTech");
    }

    #[test]
    fn test_explicit_role_matching_experience_is_not_its_own_previous() {
        let mut raw = record(vec![
            exp("Founder", "Stealth", Some(RawDate::year(2023)), None),
            exp("PM", "BigTech", Some(RawDate::year(2019)), Some(RawDate::year(2022))),
        ]);
        raw.current_title = Some("founder".to_string());
        raw.current_company = Some("Stealth".to_string());
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.current_title, "founder");
        assert_eq!(profile.previous_title, "PM");
    }

    #[test]
    fn test_error_marker_is_rejected() {
        let err = normalize(URL, &RawRecord::with_error("Profile not found")).unwrap_err();
        assert!(matches!(err, TrackingError::Normalization(_)));
    }

    #[test]
    fn test_offline_founder_record() {
        let raw = OfflineProvider::build_record(URL, true);
        let profile = normalize(URL, &raw).unwrap();
        assert_eq!(profile.linkedin_url, URL);
        assert_eq!(profile.current_title, "Founder & CEO");
        assert_eq!(profile.current_company, "Test Startup");
        assert_eq!(profile.previous_title, "Product Manager");
        assert_eq!(profile.previous_company, "BigTech");
        assert_eq!(profile.skills.len(), 3);
        assert_eq!(profile.education[0].degree, "MBA");
        assert_eq!(profile.education[0].start_year, Some(2018));
    }
}
