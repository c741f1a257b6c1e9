use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Identifier assigned by the backend.
///
/// json-server hands out numeric ids for seeded data and string ids for
/// records it creates itself, so both shapes are accepted. Two ids are equal
/// when they print the same, so `7` and `"7"` name the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(u64),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Id::Number(a), Id::Number(b)) => a == b,
            (Id::Text(a), Id::Text(b)) => a == b,
            (Id::Number(n), Id::Text(s)) | (Id::Text(s), Id::Number(n)) => *s == n.to_string(),
        }
    }
}

impl Eq for Id {}

impl FromStr for Id {
    type Err = std::convert::Infallible;

    /// Numeric only when the text is the number's canonical form, so `0123`
    /// stays text and reaches the backend exactly as typed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u64>() {
            Ok(n) if n.to_string() == s => Id::Number(n),
            _ => Id::Text(s.to_string()),
        })
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Id::Number(value)
    }
}

/// A payload type the backend stores under its own collection.
///
/// The payload never carries an id; a record only gets one once it has been
/// persisted, see [`Stored`].
pub trait Resource: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static {
    /// Collection path, e.g. `/musicas`.
    const ENDPOINT: &'static str;
    /// Noun used in user facing messages, e.g. `track`.
    const SINGULAR: &'static str;
    const PLURAL: &'static str;
}

/// A record as returned by the backend: its id plus the payload fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<R> {
    pub id: Id,
    #[serde(flatten)]
    pub data: R,
}

impl<R> Stored<R> {
    pub fn new(id: impl Into<Id>, data: R) -> Self {
        Stored {
            id: id.into(),
            data,
        }
    }
}

impl<R: fmt::Display> fmt::Display for Stored<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.data)
    }
}

impl<R> std::ops::Deref for Stored<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.data
    }
}
