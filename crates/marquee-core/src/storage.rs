use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;

use crate::error::RepositoryError;
use crate::models::{MovieEntry, MovieId, NewMovie};
use crate::repository::CatalogRepository;

const SCHEMA_V1: &str = include_str!("../../../migrations/001_initial.sql");

/// SQLite-backed read-write catalog. Lists most recent first.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Transport("database connection poisoned".into()))
    }

    pub fn all_movies(&self) -> Result<Vec<MovieEntry>, RepositoryError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, year, genre, description, thumbnail, source
             FROM movies ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
            .query_map([], row_to_movie)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn insert_movie(&self, movie: &NewMovie) -> Result<MovieEntry, RepositoryError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO movies (title, year, genre, description, thumbnail, source, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                movie.title,
                movie.year,
                movie.genre,
                movie.description,
                movie.thumbnail,
                movie.raw_source,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(id, title = %movie.title, "Inserted movie");
        Ok(movie.clone().with_id(MovieId::from(id)))
    }

    pub fn delete_movie(&self, id: &MovieId) -> Result<(), RepositoryError> {
        let rowid: i64 = id
            .as_str()
            .parse()
            .map_err(|_| RepositoryError::NotFound(id.to_string()))?;
        let changed = self
            .conn()?
            .execute("DELETE FROM movies WHERE id = ?1", params![rowid])?;
        if changed == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        info!(id = rowid, "Deleted movie");
        Ok(())
    }
}

impl CatalogRepository for SqliteRepository {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn list(&self) -> Result<Vec<MovieEntry>, RepositoryError> {
        self.all_movies()
    }

    async fn create(&self, movie: &NewMovie) -> Result<MovieEntry, RepositoryError> {
        self.insert_movie(movie)
    }

    async fn delete(&self, id: &MovieId) -> Result<(), RepositoryError> {
        self.delete_movie(id)
    }
}

fn run_migrations(conn: &Connection) -> Result<(), RepositoryError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}

fn row_to_movie(row: &rusqlite::Row<'_>) -> rusqlite::Result<MovieEntry> {
    let id: i64 = row.get(0)?;
    let movie = NewMovie {
        title: row.get(1)?,
        year: row.get(2)?,
        genre: row.get(3)?,
        description: row.get(4)?,
        thumbnail: row.get(5)?,
        raw_source: row.get(6)?,
    };
    Ok(movie.with_id(MovieId::from(id)))
}
