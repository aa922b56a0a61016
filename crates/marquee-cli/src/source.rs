use anyhow::{Context, Result};
use marquee_api::{HostedSnapshotRepository, RemoteTableRepository};
use marquee_core::config::{AppConfig, SourceKind};
use marquee_core::error::RepositoryError;
use marquee_core::models::{MovieEntry, MovieId, NewMovie};
use marquee_core::repository::CatalogRepository;
use marquee_core::snapshot::StaticRepository;
use marquee_core::storage::SqliteRepository;

/// The repository picked by configuration.
pub enum CatalogSource {
    Static(StaticRepository),
    Hosted(HostedSnapshotRepository),
    Remote(RemoteTableRepository),
    Sqlite(SqliteRepository),
}

impl CatalogSource {
    pub fn open(config: &AppConfig, kind: SourceKind) -> Result<Self> {
        Ok(match kind {
            SourceKind::Static => Self::Static(StaticRepository::new(config.catalog.static_path.clone())),
            SourceKind::HostedStatic => {
                let url = config
                    .catalog
                    .snapshot_url
                    .as_deref()
                    .context("catalog.snapshot_url is required for the hosted-static source")?;
                Self::Hosted(HostedSnapshotRepository::new(url)?)
            }
            SourceKind::Remote => Self::Remote(
                RemoteTableRepository::from_config(&config.remote)
                    .context("remote.endpoint is not a usable URL")?,
            ),
            SourceKind::Sqlite => {
                let path = AppConfig::ensure_db_path()?;
                Self::Sqlite(
                    SqliteRepository::open(&path)
                        .with_context(|| format!("failed to open {}", path.display()))?,
                )
            }
        })
    }
}

impl CatalogRepository for CatalogSource {
    fn name(&self) -> &'static str {
        match self {
            Self::Static(r) => r.name(),
            Self::Hosted(r) => r.name(),
            Self::Remote(r) => r.name(),
            Self::Sqlite(r) => r.name(),
        }
    }

    fn is_writable(&self) -> bool {
        match self {
            Self::Static(r) => r.is_writable(),
            Self::Hosted(r) => r.is_writable(),
            Self::Remote(r) => r.is_writable(),
            Self::Sqlite(r) => r.is_writable(),
        }
    }

    async fn list(&self) -> Result<Vec<MovieEntry>, RepositoryError> {
        match self {
            Self::Static(r) => r.list().await,
            Self::Hosted(r) => r.list().await,
            Self::Remote(r) => r.list().await,
            Self::Sqlite(r) => r.list().await,
        }
    }

    async fn create(&self, movie: &NewMovie) -> Result<MovieEntry, RepositoryError> {
        match self {
            Self::Static(r) => r.create(movie).await,
            Self::Hosted(r) => r.create(movie).await,
            Self::Remote(r) => r.create(movie).await,
            Self::Sqlite(r) => r.create(movie).await,
        }
    }

    async fn delete(&self, id: &MovieId) -> Result<(), RepositoryError> {
        match self {
            Self::Static(r) => r.delete(id).await,
            Self::Hosted(r) => r.delete(id).await,
            Self::Remote(r) => r.delete(id).await,
            Self::Sqlite(r) => r.delete(id).await,
        }
    }
}
