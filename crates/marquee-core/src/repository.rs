//! The storage seam consumed by the catalog.
//!
//! Every catalog source (snapshot file, SQLite table, remote table) implements
//! [`CatalogRepository`], so the store and the admin editor never know which
//! one they are talking to.

use std::future::Future;

use crate::error::RepositoryError;
use crate::models::{MovieEntry, MovieId, NewMovie};

/// A source of catalog rows.
///
/// `list()` order is defined by the implementation and must be stable for a
/// given repository state. Read-only sources return
/// [`RepositoryError::Unsupported`] from `create` and `delete`.
pub trait CatalogRepository: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether `create`/`delete` can succeed at all.
    fn is_writable(&self) -> bool;

    /// Fetch every row.
    fn list(&self) -> impl Future<Output = Result<Vec<MovieEntry>, RepositoryError>> + Send;

    /// Insert a row, returning it with the id the repository assigned.
    fn create(
        &self,
        movie: &NewMovie,
    ) -> impl Future<Output = Result<MovieEntry, RepositoryError>> + Send;

    /// Remove a row. Unknown ids fail with [`RepositoryError::NotFound`].
    fn delete(&self, id: &MovieId) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
