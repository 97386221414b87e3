// src/models/change.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One detected role transition. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Change {
    /// Assigned by the store on append; zero until then.
    pub id: i64,
    pub linkedin_url: String,
    pub detected_at: DateTime<Utc>,
    pub old_title: String,
    pub new_title: String,
    pub old_company: String,
    pub new_company: String,
    pub is_founder_change: bool,
    pub insight: Option<String>,
    pub notification_sent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeCategory {
    Founder,
    Company,
    Title,
    Other,
}

impl Change {
    pub fn is_title_change(&self) -> bool {
        self.old_title != self.new_title && !self.old_title.is_empty() && !self.new_title.is_empty()
    }

    pub fn is_company_change(&self) -> bool {
        self.old_company != self.new_company
            && !self.old_company.is_empty()
            && !self.new_company.is_empty()
    }

    pub fn category(&self) -> ChangeCategory {
        if self.is_founder_change {
            ChangeCategory::Founder
        } else if self.is_company_change() && self.is_title_change() {
            ChangeCategory::Company
        } else if self.is_title_change() {
            ChangeCategory::Title
        } else {
            ChangeCategory::Other
        }
    }

    pub fn description(&self) -> String {
        match (self.is_title_change(), self.is_company_change()) {
            (true, true) => format!(
                "Changed from {} at {} to {} at {}",
                self.old_title, self.old_company, self.new_title, self.new_company
            ),
            (true, false) => format!(
                "Changed role from {} to {} at {}",
                self.old_title, self.new_title, self.new_company
            ),
            (false, true) => format!(
                "Moved from {} to {} as {}",
                self.old_company, self.new_company, self.new_title
            ),
            (false, false) => "No significant change detected".to_string(),
        }
    }
}
