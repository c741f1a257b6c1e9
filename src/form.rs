//! Submit-time validation shared by the track and album forms.

use std::{collections::BTreeMap, fmt};

use chrono::Datelike;
use thiserror::Error;

pub const MIN_YEAR: i32 = 1900;

/// Per-field messages collected on a rejected submit. Never sent anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("invalid form: {}", summary(.fields))]
pub struct ValidationError {
    pub fields: BTreeMap<Field, String>,
}

impl ValidationError {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn has(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    pub(crate) fn add(&mut self, field: Field, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub(crate) fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationError> {
        if self.fields.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn summary(fields: &BTreeMap<Field, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Title,
    Artist,
    Album,
    Year,
    Genre,
    CoverUrl,
    TrackCount,
    Duration,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Title => "title",
            Field::Artist => "artist",
            Field::Album => "album",
            Field::Year => "year",
            Field::Genre => "genre",
            Field::CoverUrl => "cover",
            Field::TrackCount => "tracks",
            Field::Duration => "duration",
        })
    }
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

pub(crate) fn require(errors: &mut ValidationError, field: Field, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

/// Year in `1900..=current_year + 1`.
pub(crate) fn parse_year(errors: &mut ValidationError, raw: &str, current_year: i32) -> Option<i32> {
    match raw.trim().parse::<i32>() {
        Ok(year) if (MIN_YEAR..=current_year + 1).contains(&year) => Some(year),
        _ => {
            errors.add(Field::Year, "Invalid year");
            None
        }
    }
}

/// Cover urls are optional but must look like http(s) when given.
pub(crate) fn check_cover(errors: &mut ValidationError, raw: &str) {
    let raw = raw.trim();
    if !raw.is_empty() && !raw.starts_with("http") {
        errors.add(Field::CoverUrl, "URL must start with http:// or https://");
    }
}

pub(crate) fn cover_or_default(raw: &str, default_cover: &str) -> String {
    match raw.trim() {
        "" => default_cover.to_string(),
        url => url.to_string(),
    }
}

/// `mm:ss` or `hh:mm:ss`; seconds and minutes after the first part stay below 60.
pub fn is_duration(raw: &str) -> bool {
    let parts: Vec<&str> = raw.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return false;
    }
    parts.iter().enumerate().all(|(i, part)| {
        let digits = !part.is_empty() && part.len() <= 3 && part.bytes().all(|b| b.is_ascii_digit());
        if !digits {
            return false;
        }
        i == 0 || (part.len() == 2 && part.parse::<u32>().is_ok_and(|n| n < 60))
    })
}
