//! Shared fixtures for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::RepositoryError;
use crate::models::{MovieEntry, MovieId, NewMovie};
use crate::repository::CatalogRepository;

fn movie(id: &str, title: &str, genre: &str, description: &str, source: &str) -> MovieEntry {
    NewMovie {
        genre: Some(genre.into()),
        description: Some(description.into()),
        ..NewMovie::new(title, source)
    }
    .with_id(MovieId::from(id))
}

/// Four entries, ids "1" through "4".
pub fn sample_catalog() -> Vec<MovieEntry> {
    vec![
        movie("1", "Heat", "Crime", "A heist thriller in LA", "HEAT"),
        movie("2", "Alien", "Sci-Fi", "Horror in deep space", "https://host/open?id=ALIEN"),
        movie("3", "Amélie", "Romance", "Whimsy in Paris", "https://host/file/d/AMELIE/view"),
        movie("4", "Fargo", "crime", "Cold North Dakota", "FARGO"),
    ]
}

/// In-memory repository that assigns sequential integer ids and can be
/// told to fail its next call.
#[derive(Default)]
pub struct MemoryRepository {
    rows: Mutex<Vec<MovieEntry>>,
    next_id: AtomicUsize,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MemoryRepository {
    pub fn with_entries(rows: Vec<MovieEntry>) -> Self {
        let repo = Self::default();
        repo.next_id.store(rows.len() + 1, Ordering::SeqCst);
        *repo.rows.lock().unwrap() = rows;
        repo
    }

    pub fn fail_next_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<MovieEntry> {
        self.rows.lock().unwrap().clone()
    }

    /// Simulate an edit made by another session.
    pub fn remove_behind_our_back(&self, id: &str) {
        self.rows.lock().unwrap().retain(|e| e.id.as_str() != id);
    }

    /// Point an existing row at a different link, keeping its id.
    pub fn relink_behind_our_back(&self, id: &str, raw_source: &str) {
        for entry in self.rows.lock().unwrap().iter_mut() {
            if entry.id.as_str() == id {
                entry.movie.raw_source = raw_source.to_string();
            }
        }
    }
}

impl CatalogRepository for MemoryRepository {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn list(&self) -> Result<Vec<MovieEntry>, RepositoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Transport("connection reset".into()));
        }
        Ok(self.rows())
    }

    async fn create(&self, movie: &NewMovie) -> Result<MovieEntry, RepositoryError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Api {
                status: 500,
                message: "insert failed".into(),
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).max(1);
        let entry = movie.clone().with_id(MovieId::new(id.to_string()));
        self.rows.lock().unwrap().insert(0, entry.clone());
        Ok(entry)
    }

    async fn delete(&self, id: &MovieId) -> Result<(), RepositoryError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|e| &e.id != id);
        if rows.len() == before {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
