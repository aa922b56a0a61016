use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Repository-assigned identifier. Remote tables hand out integers, snapshot
/// files usually carry strings; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MovieId(String);

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for MovieId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for MovieId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MovieId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self::from(n),
            Raw::Text(s) => Self(s),
        })
    }
}

/// A catalog record before the repository has assigned it an id.
///
/// `raw_source` is the link exactly as pasted; the playable URL is derived
/// from it on demand and never stored alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    #[serde(
        default,
        deserialize_with = "de_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<u32>,
    #[serde(
        default,
        deserialize_with = "de_blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub genre: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail: Option<String>,
    #[serde(rename = "source", alias = "raw_source", alias = "rawSource")]
    pub raw_source: String,
}

impl NewMovie {
    pub fn new(title: impl Into<String>, raw_source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            genre: None,
            description: None,
            thumbnail: None,
            raw_source: raw_source.into(),
        }
    }

    pub fn with_id(self, id: MovieId) -> MovieEntry {
        MovieEntry { id, movie: self }
    }

    /// `year • genre`, omitting whichever is missing.
    pub fn meta_line(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        if let Some(genre) = &self.genre {
            parts.push(genre.clone());
        }
        parts.join(" • ")
    }

    pub fn thumbnail_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.thumbnail.as_deref().unwrap_or(placeholder)
    }
}

/// A persisted catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieEntry {
    pub id: MovieId,
    #[serde(flatten)]
    pub movie: NewMovie,
}

impl std::ops::Deref for MovieEntry {
    type Target = NewMovie;

    fn deref(&self) -> &NewMovie {
        &self.movie
    }
}

/// Accepts a number, a numeric string, `null` or `""`. Anything that is not a
/// positive integer becomes `None` rather than failing the whole record.
fn de_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let year = match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(n)) => u32::try_from(n).ok(),
        Some(Raw::Float(f)) if f.fract() == 0.0 && f >= 1.0 && f <= u32::MAX as f64 => {
            Some(f as u32)
        }
        Some(Raw::Text(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    Ok(year.filter(|y| *y > 0))
}

fn de_blank_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_shape_parses() {
        let json = r#"{
            "id": "the-matrix-1",
            "title": "The Matrix",
            "year": 1999,
            "genre": "Sci-Fi",
            "description": "",
            "thumbnail": null,
            "source": "https://drive.google.com/file/d/abc/view"
        }"#;
        let entry: MovieEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id.as_str(), "the-matrix-1");
        assert_eq!(entry.year, Some(1999));
        assert_eq!(entry.genre.as_deref(), Some("Sci-Fi"));
        assert_eq!(entry.description, None);
        assert_eq!(entry.thumbnail, None);
        assert_eq!(entry.raw_source, "https://drive.google.com/file/d/abc/view");
    }

    #[test]
    fn test_integer_id_and_loose_year() {
        let json = r#"{"id": 42, "title": "Heat", "year": "1995", "rawSource": "x"}"#;
        let entry: MovieEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, MovieId::from(42));
        assert_eq!(entry.year, Some(1995));

        let json = r#"{"id": 1, "title": "Heat", "year": null, "genre": "", "source": "x"}"#;
        let entry: MovieEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.year, None);
        assert_eq!(entry.genre, None);
    }

    #[test]
    fn test_serializes_source_field() {
        let movie = NewMovie::new("Heat", "RAWID");
        let value = serde_json::to_value(&movie).unwrap();
        assert_eq!(value["source"], "RAWID");
        assert!(value.get("year").is_none());
    }

    #[test]
    fn test_meta_line() {
        let mut movie = NewMovie::new("Heat", "x");
        assert_eq!(movie.meta_line(), "");
        movie.year = Some(1995);
        assert_eq!(movie.meta_line(), "1995");
        movie.genre = Some("Crime".into());
        assert_eq!(movie.meta_line(), "1995 • Crime");
    }
}
