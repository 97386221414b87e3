// src/models/outreach.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTREACH_METHOD: &str = "Email";

/// One contact attempt with a tracked person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OutreachRecord {
    /// Assigned by the store; zero until then.
    pub id: i64,
    pub linkedin_url: String,
    /// The change that prompted the contact, if any
    pub change_id: Option<i64>,
    pub outreach_date: DateTime<Utc>,
    pub method: String,
    pub response_received: bool,
    pub notes: String,
    pub follow_up_date: Option<DateTime<Utc>>,
}

impl OutreachRecord {
    pub fn new(linkedin_url: &str, change_id: Option<i64>, method: &str, notes: &str) -> Self {
        let method = method.trim();
        Self {
            id: 0,
            linkedin_url: linkedin_url.to_string(),
            change_id,
            outreach_date: Utc::now(),
            method: if method.is_empty() {
                DEFAULT_OUTREACH_METHOD.to_string()
            } else {
                method.to_string()
            },
            response_received: false,
            notes: notes.trim().to_string(),
            follow_up_date: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.response_received
    }

    /// Due when no response has come in and the follow-up date has passed
    pub fn needs_follow_up(&self, now: DateTime<Utc>) -> bool {
        !self.response_received && self.follow_up_date.is_some_and(|date| date <= now)
    }

    pub fn mark_as_received(&mut self, notes: Option<&str>) {
        self.response_received = true;
        if let Some(notes) = notes {
            self.append_notes(notes);
        }
    }

    pub fn set_follow_up(&mut self, date: DateTime<Utc>, notes: Option<&str>) {
        self.follow_up_date = Some(date);
        if let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) {
            self.append_notes(&format!("Follow-up notes: {}", notes));
        }
    }

    fn append_notes(&mut self, notes: &str) {
        let notes = notes.trim();
        if notes.is_empty() {
            return;
        }
        if self.notes.is_empty() {
            self.notes = notes.to_string();
        } else {
            self.notes = format!("{}\n\n{}", self.notes, notes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const URL: &str = "https://www.linkedin.com/in/jane";

    #[test]
    fn test_new_defaults_method() {
        let record = OutreachRecord::new(URL, Some(3), "  ", "intro");
        assert_eq!(record.method, "Email");
        assert_eq!(record.change_id, Some(3));
        assert!(!record.is_successful());
        assert!(record.follow_up_date.is_none());
    }

    #[test]
    fn test_follow_up_due_only_without_response() {
        let now = Utc::now();
        let mut record = OutreachRecord::new(URL, None, "LinkedIn", "");
        assert!(!record.needs_follow_up(now));

        record.set_follow_up(now + Duration::days(3), Some("ping again"));
        assert!(!record.needs_follow_up(now));
        assert!(record.needs_follow_up(now + Duration::days(3)));
        assert_eq!(record.notes, "Follow-up notes: ping again");

        record.mark_as_received(Some("Replied, call booked"));
        assert!(record.is_successful());
        assert!(!record.needs_follow_up(now + Duration::days(10)));
        assert_eq!(
            record.notes,
            "Follow-up notes: ping again\n\nReplied, call booked"
        );
    }
}
