// src/validator.rs
use anyhow::{Context, Result};
use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

pub const URL_COLUMN: &str = "linkedin_url";

fn profile_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https?://(www\.)?linkedin\.com/in/([A-Za-z0-9_-]+)/?$")
            .expect("profile url pattern")
    })
}

fn company_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https?://(www\.)?linkedin\.com/company/([A-Za-z0-9_-]+)/?$")
            .expect("company url pattern")
    })
}

/// True iff `url` is a well-formed public profile URL
pub fn is_valid_profile_url(url: &str) -> bool {
    !url.is_empty() && profile_url_re().is_match(url)
}

pub fn is_valid_company_url(url: &str) -> bool {
    !url.is_empty() && company_url_re().is_match(url)
}

/// Public identifier (the `/in/<id>` segment) of a valid profile URL
pub fn profile_id_from_url(url: &str) -> Option<String> {
    profile_url_re()
        .captures(url)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Read the `linkedin_url` column of a CSV document. Values are trimmed but
/// not validated, so malformed rows surface later as per-row failures.
pub fn read_profile_urls<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().context("Failed to read CSV header")?;
    let column = headers
        .iter()
        .position(|h| h == URL_COLUMN)
        .ok_or_else(|| anyhow::anyhow!("CSV must contain a '{}' column", URL_COLUMN))?;

    let mut urls = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        // header is line 1
        let record = record.with_context(|| format!("Failed to parse CSV row {}", index + 2))?;
        match record.get(column) {
            Some(value) if !value.is_empty() => urls.push(value.to_string()),
            _ => {}
        }
    }
    Ok(urls)
}

pub fn read_profile_urls_from_path(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    read_profile_urls(file)
}

/// Split into (valid urls, row error messages)
pub fn partition_urls(urls: &[String]) -> (Vec<String>, Vec<String>) {
    let mut valid = Vec::new();
    let mut errors = Vec::new();
    for (i, url) in urls.iter().enumerate() {
        if is_valid_profile_url(url) {
            valid.push(url.clone());
        } else {
            errors.push(format!("Row {}: Invalid LinkedIn URL format: {}", i + 2, url));
        }
    }
    (valid, errors)
}

/// Comma separated keyword list, trimmed, empties dropped
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}
