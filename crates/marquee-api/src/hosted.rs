//! Read-only catalog fetched as a JSON snapshot over HTTP.

use marquee_core::error::RepositoryError;
use marquee_core::models::{MovieEntry, MovieId, NewMovie};
use marquee_core::repository::CatalogRepository;
use marquee_core::snapshot::parse_snapshot;
use reqwest::Client;
use url::Url;

use crate::error::{check_response, RemoteError};

pub struct HostedSnapshotRepository {
    url: Url,
    http: Client,
}

impl HostedSnapshotRepository {
    pub fn new(url: &str) -> Result<Self, RemoteError> {
        let url = Url::parse(url.trim()).map_err(|e| RemoteError::InvalidEndpoint {
            endpoint: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            url,
            http: Client::new(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch(&self) -> Result<String, RemoteError> {
        tracing::debug!(url = %self.url, "Fetching catalog snapshot");
        let resp = self.http.get(self.url.clone()).send().await?;
        let resp = check_response(resp, "snapshot").await?;
        Ok(resp.text().await?)
    }
}

impl CatalogRepository for HostedSnapshotRepository {
    fn name(&self) -> &'static str {
        "hosted-static"
    }

    fn is_writable(&self) -> bool {
        false
    }

    async fn list(&self) -> Result<Vec<MovieEntry>, RepositoryError> {
        let body = self.fetch().await?;
        parse_snapshot(&body)
    }

    async fn create(&self, _movie: &NewMovie) -> Result<MovieEntry, RepositoryError> {
        Err(RepositoryError::Unsupported("create"))
    }

    async fn delete(&self, _id: &MovieId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unsupported("delete"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_relative_url() {
        assert!(HostedSnapshotRepository::new("movies.json").is_err());
        let repo = HostedSnapshotRepository::new(" https://cdn.example/movies.json ").unwrap();
        assert_eq!(repo.url().as_str(), "https://cdn.example/movies.json");
    }

    #[tokio::test]
    async fn test_is_read_only() {
        let repo = HostedSnapshotRepository::new("https://cdn.example/movies.json").unwrap();
        assert!(!repo.is_writable());
        assert!(matches!(
            repo.create(&NewMovie::new("x", "y")).await,
            Err(RepositoryError::Unsupported("create"))
        ));
    }
}
