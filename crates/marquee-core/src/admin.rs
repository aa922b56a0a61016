//! Admin panel: turns form input into new catalog rows and guards deletes
//! behind an explicit confirmation.

use tracing::info;

use crate::error::{AdminError, ValidationError};
use crate::models::{Genre, MovieEntry, MovieId, NewMovie};
use crate::repository::CatalogRepository;
use crate::resolver::LinkResolver;
use crate::store::CatalogItem;

/// Raw admin form fields, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    pub title: String,
    pub year: String,
    /// Selected genre option; `Other` defers to `custom_genre`.
    pub genre: String,
    pub custom_genre: String,
    pub description: String,
    pub thumbnail: String,
    pub link: String,
}

/// Validate the form and build a row ready for `create`.
///
/// Title and link are required. A year that does not parse as a positive
/// integer is dropped rather than rejected.
pub fn build_entry(form: &EntryForm) -> Result<NewMovie, ValidationError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    let link = form.link.trim();
    if link.is_empty() {
        return Err(ValidationError::MissingLink);
    }

    Ok(NewMovie {
        title: title.to_string(),
        year: form.year.trim().parse::<u32>().ok().filter(|y| *y > 0),
        genre: Genre::from_form(&form.genre, &form.custom_genre).resolve(),
        description: non_blank(&form.description),
        thumbnail: non_blank(&form.thumbnail),
        raw_source: link.to_string(),
    })
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// A delete waiting for the user to confirm it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: MovieId,
    pub title: String,
}

impl PendingDelete {
    pub fn prompt(&self) -> String {
        format!("Delete \"{}\"? This cannot be undone.", self.title)
    }
}

#[derive(Debug, Default)]
pub struct AdminEditor {
    pub form: EntryForm,
    pending_delete: Option<PendingDelete>,
}

impl AdminEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build_entry(&self) -> Result<NewMovie, ValidationError> {
        build_entry(&self.form)
    }

    /// Live preview of the URL the current link field resolves to.
    pub fn resolved_preview(&self, resolver: &LinkResolver) -> String {
        resolver.resolve(&self.form.link)
    }

    /// Validate and create. The form is cleared only once the row exists; on
    /// any error it is left as typed.
    pub async fn submit<R: CatalogRepository>(
        &mut self,
        repo: &R,
    ) -> Result<MovieEntry, AdminError> {
        let movie = self.build_entry()?;
        let entry = repo.create(&movie).await?;
        info!(id = %entry.id, title = %entry.title, "Created catalog entry");
        self.form = EntryForm::default();
        Ok(entry)
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    /// First step of a delete. Nothing is removed until [`confirm_delete`](Self::confirm_delete).
    pub fn request_delete(&mut self, item: &CatalogItem) -> &PendingDelete {
        self.pending_delete.insert(PendingDelete {
            id: item.id().clone(),
            title: item.title.clone(),
        })
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Second step: delete `id`, which must match the pending request.
    pub async fn confirm_delete<R: CatalogRepository>(
        &mut self,
        repo: &R,
        id: &MovieId,
    ) -> Result<(), AdminError> {
        let pending = self.pending_delete.take().ok_or(AdminError::NoPendingDelete)?;
        if &pending.id != id {
            let err = AdminError::ConfirmationMismatch {
                pending: pending.id.to_string(),
                requested: id.to_string(),
            };
            self.pending_delete = Some(pending);
            return Err(err);
        }
        repo.delete(id).await?;
        info!(id = %id, title = %pending.title, "Deleted catalog entry");
        Ok(())
    }

    /// Pretty JSON for pasting into a snapshot file.
    pub fn export_json(movie: &NewMovie) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(movie)
    }
}
