//! In-memory catalog state: the full list, the active filter, and the
//! filtered view derived from both.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{CatalogLoadError, RepositoryError};
use crate::models::{MovieEntry, MovieId};
use crate::resolver::LinkResolver;

/// A catalog entry paired with the playable URL derived from its raw link.
///
/// Built only through [`CatalogItem::new`], so the resolved URL always
/// matches the raw link it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    entry: MovieEntry,
    resolved_source: String,
}

impl CatalogItem {
    pub fn new(entry: MovieEntry, resolver: &LinkResolver) -> Self {
        let resolved_source = resolver.resolve(&entry.raw_source);
        Self {
            entry,
            resolved_source,
        }
    }

    pub fn entry(&self) -> &MovieEntry {
        &self.entry
    }

    pub fn id(&self) -> &MovieId {
        &self.entry.id
    }

    pub fn resolved_source(&self) -> &str {
        &self.resolved_source
    }
}

impl std::ops::Deref for CatalogItem {
    type Target = MovieEntry;

    fn deref(&self) -> &MovieEntry {
        &self.entry
    }
}

/// Search text and genre. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub text: String,
    pub genre: String,
}

impl CatalogFilter {
    pub fn new(text: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            genre: genre.into().trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.genre.is_empty()
    }

    /// Text is an unanchored, case-insensitive substring of the title or the
    /// description; genre is a case-insensitive exact match. Both must hold.
    pub fn matches(&self, entry: &MovieEntry) -> bool {
        self.matches_text(entry) && self.matches_genre(entry)
    }

    fn matches_text(&self, entry: &MovieEntry) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        entry.title.to_lowercase().contains(&needle)
            || entry
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    fn matches_genre(&self, entry: &MovieEntry) -> bool {
        if self.genre.is_empty() {
            return true;
        }
        entry
            .genre
            .as_deref()
            .is_some_and(|g| g.trim().to_lowercase() == self.genre.to_lowercase())
    }
}

/// Tag handed out when a reload starts. Only the newest ticket's response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a reload ticket must be passed to finish_reload"]
pub struct ReloadTicket(u64);

/// What became of a finished reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The catalog was replaced with this many entries.
    Applied { count: usize },
    /// A newer reload was started in the meantime; this response was ignored.
    Discarded,
}

/// Catalog state consumed by the rendering layer.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    resolver: LinkResolver,
    all: Vec<CatalogItem>,
    filter: CatalogFilter,
    /// Indices into `all`, in `all` order.
    visible: Vec<usize>,
    latest_ticket: u64,
    loaded: bool,
}

impl CatalogStore {
    pub fn new(resolver: LinkResolver) -> Self {
        Self {
            resolver,
            all: Vec::new(),
            filter: CatalogFilter::default(),
            visible: Vec::new(),
            latest_ticket: 0,
            loaded: false,
        }
    }

    pub fn resolver(&self) -> &LinkResolver {
        &self.resolver
    }

    /// Every entry, in repository order.
    pub fn all(&self) -> &[CatalogItem] {
        &self.all
    }

    /// Entries passing the current filter, in repository order.
    pub fn visible(&self) -> impl Iterator<Item = &CatalogItem> + '_ {
        self.visible.iter().map(|&i| &self.all[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    /// Whether at least one reload has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, id: &MovieId) -> Option<&CatalogItem> {
        self.all.iter().find(|item| item.id() == id)
    }

    /// Distinct genres present in the catalog, sorted. Case variants collapse
    /// onto the first spelling seen.
    pub fn genres(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut genres: Vec<String> = self
            .all
            .iter()
            .filter_map(|item| item.genre.as_deref())
            .map(str::trim)
            .filter(|g| !g.is_empty() && seen.insert(g.to_lowercase()))
            .map(str::to_string)
            .collect();
        genres.sort_by_key(|g| g.to_lowercase());
        genres
    }

    pub fn set_filter(&mut self, text: impl Into<String>, genre: impl Into<String>) {
        self.filter = CatalogFilter::new(text, genre);
        self.recompute();
        debug!(
            text = %self.filter.text,
            genre = %self.filter.genre,
            visible = self.visible.len(),
            "Filter applied"
        );
    }

    /// Optimistically append a freshly created entry. The next reload replaces it.
    pub fn add_locally(&mut self, entry: MovieEntry) {
        self.all.push(CatalogItem::new(entry, &self.resolver));
        self.recompute();
    }

    /// Start a reload. Any ticket issued earlier becomes stale.
    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.latest_ticket += 1;
        ReloadTicket(self.latest_ticket)
    }

    /// Apply the repository's answer to the reload identified by `ticket`.
    ///
    /// Stale responses are dropped whether they succeeded or not. A failure
    /// leaves the current catalog untouched.
    pub fn finish_reload(
        &mut self,
        ticket: ReloadTicket,
        result: Result<Vec<MovieEntry>, RepositoryError>,
    ) -> Result<ReloadOutcome, CatalogLoadError> {
        if ticket.0 != self.latest_ticket {
            debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "Discarding stale reload response"
            );
            return Ok(ReloadOutcome::Discarded);
        }

        match result {
            Ok(entries) => {
                let count = entries.len();
                self.all = entries
                    .into_iter()
                    .map(|entry| CatalogItem::new(entry, &self.resolver))
                    .collect();
                self.loaded = true;
                self.recompute();
                info!(count, visible = self.visible.len(), "Catalog reloaded");
                Ok(ReloadOutcome::Applied { count })
            }
            Err(e) => {
                warn!(error = %e, kept = self.all.len(), "Catalog reload failed");
                Err(CatalogLoadError(e))
            }
        }
    }

    fn recompute(&mut self) {
        let filter = &self.filter;
        self.visible = self
            .all
            .iter()
            .enumerate()
            .filter(|(_, item)| filter.matches(item.entry()))
            .map(|(i, _)| i)
            .collect();
    }
}
