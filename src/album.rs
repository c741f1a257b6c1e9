use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    form::{self, Field, ValidationError},
    record::{Resource, Stored},
    search::Searchable,
};

/// An album as sent to the backend. Only title and artist are mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumData {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "artista")]
    pub artist: String,
    #[serde(rename = "ano", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "genero", default)]
    pub genre: String,
    #[serde(rename = "capaUrl", default)]
    pub cover_url: String,
    #[serde(rename = "faixas", default, skip_serializing_if = "Option::is_none")]
    pub track_count: Option<u32>,
    /// Free form `mm:ss` or `hh:mm:ss`.
    #[serde(rename = "duracao", default)]
    pub duration: String,
}

impl Resource for AlbumData {
    const ENDPOINT: &'static str = "/albuns";
    const SINGULAR: &'static str = "album";
    const PLURAL: &'static str = "albums";
}

pub type Album = Stored<AlbumData>;

impl fmt::Display for AlbumData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

impl Searchable for AlbumData {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.artist.as_str()]
    }

    fn genre(&self) -> &str {
        &self.genre
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumForm {
    pub title: String,
    pub artist: String,
    pub year: String,
    pub genre: String,
    pub cover_url: String,
    pub track_count: String,
    pub duration: String,
}

impl From<&AlbumData> for AlbumForm {
    fn from(album: &AlbumData) -> Self {
        AlbumForm {
            title: album.title.clone(),
            artist: album.artist.clone(),
            // The backend keeps 0 for albums saved without a year.
            year: album
                .year
                .filter(|y| *y != 0)
                .map(|y| y.to_string())
                .unwrap_or_default(),
            genre: album.genre.clone(),
            cover_url: album.cover_url.clone(),
            track_count: album.track_count.map(|n| n.to_string()).unwrap_or_default(),
            duration: album.duration.clone(),
        }
    }
}

impl AlbumForm {
    pub fn submit(&self, default_cover: &str) -> Result<AlbumData, ValidationError> {
        self.submit_in(default_cover, form::current_year())
    }

    /// Optional fields are only checked when filled in.
    pub fn submit_in(
        &self,
        default_cover: &str,
        current_year: i32,
    ) -> Result<AlbumData, ValidationError> {
        let mut errors = ValidationError::default();

        form::require(&mut errors, Field::Title, &self.title, "Title is required");
        form::require(&mut errors, Field::Artist, &self.artist, "Artist is required");

        let year = match self.year.trim() {
            "" => None,
            raw => form::parse_year(&mut errors, raw, current_year),
        };

        let track_count = match self.track_count.trim() {
            "" => None,
            raw => match raw.parse::<u32>() {
                Ok(n) => Some(n),
                Err(_) => {
                    errors.add(Field::TrackCount, "Track count must be a whole number");
                    None
                }
            },
        };

        let duration = self.duration.trim();
        if !duration.is_empty() && !form::is_duration(duration) {
            errors.add(Field::Duration, "Duration must look like mm:ss or hh:mm:ss");
        }

        form::check_cover(&mut errors, &self.cover_url);

        errors.into_result(|| AlbumData {
            title: self.title.trim().to_string(),
            artist: self.artist.trim().to_string(),
            year,
            genre: self.genre.trim().to_string(),
            cover_url: form::cover_or_default(&self.cover_url, default_cover),
            track_count,
            duration: duration.to_string(),
        })
    }
}
