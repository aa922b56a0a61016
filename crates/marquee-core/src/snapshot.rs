//! Read-only catalog backed by a JSON snapshot (`movies.json`).

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RepositoryError;
use crate::models::{MovieEntry, MovieId, NewMovie};
use crate::repository::CatalogRepository;

#[derive(Deserialize)]
struct SnapshotRecord {
    #[serde(default)]
    id: Option<MovieId>,
    #[serde(flatten)]
    movie: NewMovie,
}

/// Parse a snapshot document: a JSON array of movie objects.
///
/// Records that do not parse, or have a blank title or link, are skipped with
/// a warning instead of failing the whole list. Records without an `id` get
/// a slug derived from the title and their position in the file.
pub fn parse_snapshot(json: &str) -> Result<Vec<MovieEntry>, RepositoryError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| RepositoryError::Parse(e.to_string()))?;

    let mut entries = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let record: SnapshotRecord = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed snapshot record");
                continue;
            }
        };
        if record.movie.title.trim().is_empty() || record.movie.raw_source.trim().is_empty() {
            warn!(index, "Skipping snapshot record without title or link");
            continue;
        }
        let id = record
            .id
            .unwrap_or_else(|| MovieId::new(format!("{}-{}", slugify(&record.movie.title), index + 1)));
        entries.push(record.movie.with_id(id));
    }
    Ok(entries)
}

/// Lowercase ASCII alphanumerics with every other run collapsed to `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "movie".to_string()
    } else {
        slug.to_string()
    }
}

/// A snapshot file on disk. List-only.
#[derive(Debug, Clone)]
pub struct StaticRepository {
    path: PathBuf,
}

impl StaticRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogRepository for StaticRepository {
    fn name(&self) -> &'static str {
        "static"
    }

    fn is_writable(&self) -> bool {
        false
    }

    async fn list(&self) -> Result<Vec<MovieEntry>, RepositoryError> {
        debug!(path = %self.path.display(), "Reading catalog snapshot");
        let content = tokio::fs::read_to_string(&self.path).await?;
        parse_snapshot(&content)
    }

    async fn create(&self, _movie: &NewMovie) -> Result<MovieEntry, RepositoryError> {
        Err(RepositoryError::Unsupported("create"))
    }

    async fn delete(&self, _id: &MovieId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unsupported("delete"))
    }
}
