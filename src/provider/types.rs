// src/provider/types.rs
use serde::{Deserialize, Deserializer, Serialize};

/// Profile record as returned by the data provider. Every field is optional;
/// the provider routinely omits data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub public_identifier: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    // Some providers hand these out directly instead of an experience list
    #[serde(default)]
    pub current_title: Option<String>,
    #[serde(default)]
    pub current_company: Option<String>,
    #[serde(default)]
    pub experiences: Option<Vec<RawExperience>>,
    #[serde(default)]
    pub education: Option<Vec<RawEducation>>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    /// Provider-side error marker
    #[serde(default)]
    pub error: Option<String>,
}

impl RawRecord {
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExperience {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub company_linkedin_profile_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub starts_at: Option<RawDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub ends_at: Option<RawDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEducation {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub degree_name: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub starts_at: Option<RawDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub ends_at: Option<RawDate>,
}

/// Company page record. Same leniency as profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub company_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub company_type: Option<String>,
    #[serde(default, alias = "hq")]
    pub headquarters: Option<Headquarters>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headquarters {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Partial date. Components that are missing or not numeric come out as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDate {
    #[serde(default, deserialize_with = "lenient_number")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub month: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub day: Option<i32>,
}

impl RawDate {
    pub fn ymd(year: i32, month: i32, day: i32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: Some(day),
        }
    }

    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Default::default()
        }
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        serde_json::Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    })
}

/// Anything other than a date object reads as no date
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<RawDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_dates() {
        let date: RawDate =
            serde_json::from_str(r#"{"year": "2021", "month": null, "day": "x"}"#).unwrap();
        assert_eq!(date.year, Some(2021));
        assert_eq!(date.month, None);
        assert_eq!(date.day, None);
    }

    #[test]
    fn test_record_tolerates_missing_and_null_fields() {
        let record: RawRecord = serde_json::from_str(
            r#"{"first_name": "Jane", "experiences": null, "skills": ["Rust"]}"#,
        )
        .unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
        assert!(record.experiences.is_none());
        assert!(record.error.is_none());
    }

    #[test]
    fn test_misshapen_dates_read_as_missing() {
        let record: RawRecord = serde_json::from_str(
            r#"{
                "experiences": [
                    {"title": "PM", "starts_at": "2020-01-01", "ends_at": 2021},
                    {"title": "CTO", "starts_at": [2022, 1], "ends_at": {"year": 2023}}
                ],
                "education": [{"school": "MIT", "starts_at": "fall 2010", "ends_at": null}]
            }"#,
        )
        .unwrap();

        let experiences = record.experiences.unwrap();
        assert_eq!(experiences.len(), 2);
        assert!(experiences[0].starts_at.is_none());
        assert!(experiences[0].ends_at.is_none());
        assert!(experiences[1].starts_at.is_none());
        assert_eq!(experiences[1].ends_at, Some(RawDate::year(2023)));

        let education = record.education.unwrap();
        assert!(education[0].starts_at.is_none());
    }

    #[test]
    fn test_company_record_reads_hq_alias() {
        let company: CompanyRecord = serde_json::from_str(
            r#"{"name": "Acme", "founded_year": "2019", "hq": {"city": "Berlin", "country": "DE"}}"#,
        )
        .unwrap();
        assert_eq!(company.name.as_deref(), Some("Acme"));
        assert_eq!(company.founded_year, Some(2019));
        assert_eq!(
            company.headquarters.and_then(|hq| hq.city).as_deref(),
            Some("Berlin")
        );
        assert!(company.website.is_none());
    }
}
