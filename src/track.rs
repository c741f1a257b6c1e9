use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    form::{self, Field, ValidationError},
    record::{Resource, Stored},
    search::Searchable,
};

/// A track as sent to the backend. Field names on the wire follow the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackData {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "artista")]
    pub artist: String,
    pub album: String,
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "genero")]
    pub genre: String,
    #[serde(rename = "capaUrl", default)]
    pub cover_url: String,
}

impl Resource for TrackData {
    const ENDPOINT: &'static str = "/musicas";
    const SINGULAR: &'static str = "track";
    const PLURAL: &'static str = "tracks";
}

pub type Track = Stored<TrackData>;

impl fmt::Display for TrackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

impl Searchable for TrackData {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.artist.as_str(),
            self.album.as_str(),
            self.genre.as_str(),
        ]
    }

    fn genre(&self) -> &str {
        &self.genre
    }
}

/// Raw form input for a track, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackForm {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub genre: String,
    pub cover_url: String,
}

impl From<&TrackData> for TrackForm {
    fn from(track: &TrackData) -> Self {
        TrackForm {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            year: track.year.to_string(),
            genre: track.genre.clone(),
            cover_url: track.cover_url.clone(),
        }
    }
}

impl TrackForm {
    /// Validate against the current calendar year.
    pub fn submit(&self, default_cover: &str) -> Result<TrackData, ValidationError> {
        self.submit_in(default_cover, form::current_year())
    }

    /// Checks every field, then builds a trimmed payload. An empty cover is
    /// replaced by `default_cover`.
    pub fn submit_in(
        &self,
        default_cover: &str,
        current_year: i32,
    ) -> Result<TrackData, ValidationError> {
        let mut errors = ValidationError::default();

        form::require(&mut errors, Field::Title, &self.title, "Title is required");
        form::require(&mut errors, Field::Artist, &self.artist, "Artist is required");
        form::require(&mut errors, Field::Album, &self.album, "Album is required");
        let year = form::parse_year(&mut errors, &self.year, current_year);
        form::require(&mut errors, Field::Genre, &self.genre, "Genre is required");
        form::check_cover(&mut errors, &self.cover_url);

        errors.into_result(|| TrackData {
            title: self.title.trim().to_string(),
            artist: self.artist.trim().to_string(),
            album: self.album.trim().to_string(),
            year: year.unwrap_or_default(),
            genre: self.genre.trim().to_string(),
            cover_url: form::cover_or_default(&self.cover_url, default_cover),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COVER: &str = "http://img/default.png";

    fn form() -> TrackForm {
        TrackForm {
            title: "A".to_string(),
            artist: "B".to_string(),
            album: "C".to_string(),
            year: "2000".to_string(),
            genre: "Rock".to_string(),
            cover_url: String::new(),
        }
    }

    #[test]
    fn empty_cover_gets_the_default() {
        let track = form().submit_in(COVER, 2026).unwrap();
        assert_eq!(track.cover_url, COVER);
        assert_eq!(track.year, 2000);
    }

    #[test]
    fn strings_are_trimmed() {
        let mut f = form();
        f.title = "  Bohemian Rhapsody ".to_string();
        f.cover_url = " https://x/c.jpg ".to_string();
        let track = f.submit_in(COVER, 2026).unwrap();
        assert_eq!(track.title, "Bohemian Rhapsody");
        assert_eq!(track.cover_url, "https://x/c.jpg");
    }

    #[test]
    fn year_limits() {
        let mut f = form();
        f.year = "1899".to_string();
        let err = f.submit_in(COVER, 2026).unwrap_err();
        assert!(err.has(Field::Year));
        assert_eq!(err.fields.len(), 1);

        f.year = "2026".to_string();
        assert!(f.submit_in(COVER, 2026).is_ok());
        f.year = "2027".to_string();
        assert!(f.submit_in(COVER, 2026).is_ok());
    }

    #[test]
    fn current_year_is_always_accepted() {
        let mut f = form();
        f.year = form::current_year().to_string();
        assert!(f.submit(COVER).is_ok());
    }

    #[test]
    fn cover_scheme() {
        let mut f = form();
        f.cover_url = "ftp://x".to_string();
        assert!(f.submit_in(COVER, 2026).unwrap_err().has(Field::CoverUrl));
        for ok in ["http://x", "https://x"] {
            f.cover_url = ok.to_string();
            assert_eq!(f.submit_in(COVER, 2026).unwrap().cover_url, ok);
        }
    }

    #[test]
    fn blank_required_fields_are_all_reported() {
        let f = TrackForm {
            title: " ".to_string(),
            ..TrackForm::default()
        };
        let err = f.submit_in(COVER, 2026).unwrap_err();
        for field in [Field::Title, Field::Artist, Field::Album, Field::Year, Field::Genre] {
            assert!(err.has(field), "{field} missing");
        }
        assert!(!err.has(Field::CoverUrl));
    }

    #[test]
    fn prefill_round_trips_a_stored_track() {
        let stored = form().submit_in(COVER, 2026).unwrap();
        let again = TrackForm::from(&stored).submit_in(COVER, 2026).unwrap();
        assert_eq!(stored, again);
    }

    #[test]
    fn wire_format_uses_backend_keys_and_no_id() {
        let track = form().submit_in(COVER, 2026).unwrap();
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["titulo"], "A");
        assert_eq!(json["ano"], 2000);
        assert_eq!(json["capaUrl"], COVER);
        assert!(json.get("id").is_none());

        let stored: Track = serde_json::from_value(serde_json::json!({
            "id": 4, "titulo": "A", "artista": "B", "album": "C",
            "ano": 2000, "genero": "Rock", "capaUrl": COVER
        }))
        .unwrap();
        assert_eq!(stored.id, crate::record::Id::Number(4));
        assert_eq!(stored.data, track);
        assert_eq!(stored.to_string(), "[4] B - A");
    }
}
