//! Root context wiring the repository, store, playback session and admin
//! editor together. The rendering layer holds one [`Catalog`] and feeds user
//! intents into it.

use tracing::{debug, instrument, warn};

use crate::admin::{AdminEditor, PendingDelete};
use crate::config::AppConfig;
use crate::error::{AdminError, CatalogLoadError, RepositoryError};
use crate::models::{MovieEntry, MovieId};
use crate::playback::{MediaElement, MediaSignal, PlaybackSession, SessionToken};
use crate::repository::CatalogRepository;
use crate::resolver::LinkResolver;
use crate::store::{CatalogStore, ReloadOutcome, ReloadTicket};

pub struct Catalog<R, M> {
    repo: R,
    store: CatalogStore,
    session: PlaybackSession<M>,
    editor: AdminEditor,
}

impl<R: CatalogRepository, M: MediaElement> Catalog<R, M> {
    pub fn new(repo: R, resolver: LinkResolver, media: M, autoplay: bool) -> Self {
        Self {
            repo,
            store: CatalogStore::new(resolver),
            session: PlaybackSession::new(media, autoplay),
            editor: AdminEditor::new(),
        }
    }

    pub fn from_config(repo: R, config: &AppConfig, media: M) -> Self {
        Self::new(repo, config.resolver(), media, config.playback.autoplay)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn session(&self) -> &PlaybackSession<M> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PlaybackSession<M> {
        &mut self.session
    }

    pub fn editor(&self) -> &AdminEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut AdminEditor {
        &mut self.editor
    }

    /// Replace the catalog with a fresh `list()`. On failure the previous
    /// catalog stays visible.
    #[instrument(name = "reload", skip(self), fields(source = self.repo.name()))]
    pub async fn reload(&mut self) -> Result<ReloadOutcome, CatalogLoadError> {
        let ticket = self.begin_reload();
        let result = self.repo.list().await;
        self.finish_reload(ticket, result)
    }

    /// Start a reload without holding the catalog across the fetch.
    ///
    /// The caller awaits `repository().list()` itself and hands the result to
    /// [`Catalog::finish_reload`]; filter edits and selections stay possible
    /// in between. Only the most recent ticket is ever applied.
    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.store.begin_reload()
    }

    pub fn finish_reload(
        &mut self,
        ticket: ReloadTicket,
        result: Result<Vec<MovieEntry>, RepositoryError>,
    ) -> Result<ReloadOutcome, CatalogLoadError> {
        let outcome = self.store.finish_reload(ticket, result)?;
        if matches!(outcome, ReloadOutcome::Applied { .. }) {
            self.clear_stale_session();
        }
        Ok(outcome)
    }

    pub fn set_filter(&mut self, text: impl Into<String>, genre: impl Into<String>) {
        self.store.set_filter(text, genre);
    }

    /// Open the entry with `id` in the player. `None` if the id is unknown.
    pub fn select_entry(&mut self, id: &MovieId) -> Option<SessionToken> {
        let item = self.store.get(id)?.clone();
        Some(self.session.open(item))
    }

    pub fn media_signal(&mut self, token: SessionToken, signal: MediaSignal) -> bool {
        self.session.handle(token, signal)
    }

    pub fn close_player(&mut self) {
        self.session.close();
    }

    /// Create the entry described by the admin form, show it immediately,
    /// then reload so the stored id and order win.
    ///
    /// A failed follow-up reload is logged and does not undo the create.
    pub async fn submit_new_entry(&mut self) -> Result<MovieEntry, AdminError> {
        let entry = self.editor.submit(&self.repo).await?;
        self.store.add_locally(entry.clone());
        if let Err(e) = self.reload().await {
            warn!(error = %e, "Reload after create failed; keeping local entry");
        }
        Ok(entry)
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: &MovieId) -> Result<PendingDelete, AdminError> {
        let item = self
            .store
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        Ok(self.editor.request_delete(item).clone())
    }

    pub fn cancel_delete(&mut self) {
        self.editor.cancel_delete();
    }

    /// Delete the confirmed entry, then reload. The entry is never removed
    /// locally; it disappears when the repository stops returning it.
    pub async fn confirm_delete(&mut self, id: &MovieId) -> Result<(), AdminError> {
        self.editor.confirm_delete(&self.repo, id).await?;
        if let Err(e) = self.reload().await {
            warn!(error = %e, "Reload after delete failed");
        }
        Ok(())
    }

    /// Close the player if its entry is gone or now resolves elsewhere.
    fn clear_stale_session(&mut self) {
        let Some(active) = self.session.active() else {
            return;
        };
        let still_valid = self
            .store
            .get(active.id())
            .is_some_and(|item| item.resolved_source() == active.resolved_source());
        if !still_valid {
            debug!(id = %active.id(), "Closing session for an entry that changed or vanished");
            self.session.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::admin::EntryForm;
    use crate::models::NewMovie;
    use crate::playback::PlaybackStatus;
    use crate::resolver::Provider;
    use crate::testing::{sample_catalog, MemoryRepository};

    #[derive(Default)]
    struct NullMedia {
        source: String,
    }

    impl MediaElement for NullMedia {
        fn set_source(&mut self, url: &str) {
            self.source = url.to_string();
        }

        fn play(&mut self) {}

        fn pause(&mut self) {}
    }

    async fn catalog() -> Catalog<MemoryRepository, NullMedia> {
        let repo = MemoryRepository::with_entries(sample_catalog());
        let resolver = LinkResolver::new(Provider::DirectDownload, "host");
        let mut catalog = Catalog::new(repo, resolver, NullMedia::default(), true);
        catalog.reload().await.unwrap();
        catalog
    }

    #[tokio::test]
    async fn test_select_entry_plays_resolved_source() {
        let mut catalog = catalog().await;
        let token = catalog.select_entry(&MovieId::from("2")).unwrap();
        assert_eq!(
            catalog.session().media().source,
            "https://host/uc?export=download&id=ALIEN"
        );
        assert!(catalog.media_signal(token, MediaSignal::Playing));
        assert!(catalog.select_entry(&MovieId::from("99")).is_none());
    }

    #[tokio::test]
    async fn test_submit_adds_and_reloads() {
        let mut catalog = catalog().await;
        catalog.editor_mut().form = EntryForm {
            title: "Se7en".into(),
            genre: "Other".into(),
            custom_genre: "Neo-noir".into(),
            link: "SE7EN".into(),
            ..Default::default()
        };

        let entry = catalog.submit_new_entry().await.unwrap();
        assert_eq!(entry.genre.as_deref(), Some("Neo-noir"));
        // The repository puts new rows first; the reload adopts that order.
        assert_eq!(catalog.store().all()[0].id(), &entry.id);
        assert_eq!(catalog.store().all().len(), 5);
        assert_eq!(catalog.repository().list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_submit_keeps_local_entry_when_reload_fails() {
        let mut catalog = catalog().await;
        catalog.editor_mut().form.title = "Se7en".into();
        catalog.editor_mut().form.link = "SE7EN".into();
        catalog.repository().fail_next_list();

        let entry = catalog.submit_new_entry().await.unwrap();
        let last = catalog.store().all().last().unwrap();
        assert_eq!(last.id(), &entry.id);
    }

    #[tokio::test]
    async fn test_invalid_submit_touches_nothing() {
        let mut catalog = catalog().await;
        catalog.editor_mut().form.title = "No link".into();

        assert!(catalog.submit_new_entry().await.is_err());
        assert_eq!(catalog.repository().create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(catalog.store().all().len(), 4);
        assert_eq!(catalog.editor().form.title, "No link");
    }

    #[tokio::test]
    async fn test_delete_flow_reloads_and_closes_player() {
        let mut catalog = catalog().await;
        let heat = MovieId::from("1");
        catalog.select_entry(&heat).unwrap();

        let pending = catalog.request_delete(&heat).unwrap();
        assert_eq!(pending.title, "Heat");
        // Still present until confirmed.
        assert!(catalog.store().get(&heat).is_some());

        catalog.confirm_delete(&heat).await.unwrap();
        assert!(catalog.store().get(&heat).is_none());
        assert_eq!(catalog.session().status(), &PlaybackStatus::Idle);
    }

    #[tokio::test]
    async fn test_player_closes_when_link_changes_elsewhere() {
        let mut catalog = catalog().await;
        let alien = MovieId::from("2");
        let token = catalog.select_entry(&alien).unwrap();
        catalog.media_signal(token, MediaSignal::Playing);

        catalog
            .repository()
            .relink_behind_our_back("2", "https://host/file/d/ALIEN-DIRECTORS-CUT/view");
        catalog.reload().await.unwrap();

        let item = catalog.store().get(&alien).unwrap();
        assert_eq!(
            item.resolved_source(),
            "https://host/uc?export=download&id=ALIEN-DIRECTORS-CUT"
        );
        assert_eq!(catalog.session().status(), &PlaybackStatus::Idle);
        assert!(catalog.session().active().is_none());
        assert_eq!(catalog.session().media().source, "");
    }

    #[tokio::test]
    async fn test_overlapping_reloads_apply_only_the_latest() {
        let mut catalog = catalog().await;

        let first = catalog.begin_reload();
        let first_rows = catalog.repository().list().await;
        catalog.set_filter("", "crime");
        assert_eq!(catalog.store().visible_len(), 2);

        catalog.repository().remove_behind_our_back("1");
        let second = catalog.begin_reload();
        let second_rows = catalog.repository().list().await;

        assert_eq!(
            catalog.finish_reload(second, second_rows).unwrap(),
            ReloadOutcome::Applied { count: 3 }
        );
        assert_eq!(
            catalog.finish_reload(first, first_rows).unwrap(),
            ReloadOutcome::Discarded
        );

        assert!(catalog.store().get(&MovieId::from("1")).is_none());
        assert_eq!(catalog.store().filter().genre, "crime");
        let titles: Vec<_> = catalog.store().visible().map(|i| i.title.clone()).collect();
        assert_eq!(titles, vec!["Fargo"]);
    }

    #[tokio::test]
    async fn test_stale_failure_is_discarded() {
        let mut catalog = catalog().await;
        let first = catalog.begin_reload();
        let second = catalog.begin_reload();

        let failed = Err(RepositoryError::Transport("timeout".into()));
        assert_eq!(
            catalog.finish_reload(first, failed).unwrap(),
            ReloadOutcome::Discarded
        );
        let rows = catalog.repository().list().await;
        assert!(catalog.finish_reload(second, rows).is_ok());
        assert_eq!(catalog.store().all().len(), 4);
    }

    #[tokio::test]
    async fn test_request_delete_unknown_id() {
        let mut catalog = catalog().await;
        assert!(matches!(
            catalog.request_delete(&MovieId::from("99")),
            Err(AdminError::Repository(RepositoryError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_reload_reflects_other_sessions_and_keeps_valid_player() {
        let mut catalog = catalog().await;
        let token = catalog.select_entry(&MovieId::from("2")).unwrap();
        catalog.media_signal(token, MediaSignal::Playing);

        catalog.repository().remove_behind_our_back("4");
        catalog.reload().await.unwrap();

        assert!(catalog.store().get(&MovieId::from("4")).is_none());
        assert_eq!(catalog.session().status(), &PlaybackStatus::Playing);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_catalog_and_player() {
        let mut catalog = catalog().await;
        catalog.set_filter("", "crime");
        catalog.select_entry(&MovieId::from("1")).unwrap();

        catalog.repository().fail_next_list();
        assert!(catalog.reload().await.is_err());
        assert_eq!(catalog.store().visible_len(), 2);
        assert!(catalog.session().active().is_some());
    }

    #[tokio::test]
    async fn test_read_only_delete_surfaces_repository_error() {
        let repo = crate::snapshot::StaticRepository::new("unused.json");
        let mut catalog = Catalog::new(repo, LinkResolver::default(), NullMedia::default(), true);
        catalog
            .store
            .add_locally(NewMovie::new("Heat", "HEAT").with_id(MovieId::from("heat")));

        catalog.request_delete(&MovieId::from("heat")).unwrap();
        assert!(matches!(
            catalog.confirm_delete(&MovieId::from("heat")).await,
            Err(AdminError::Repository(RepositoryError::Unsupported("delete")))
        ));
        assert_eq!(catalog.store().all().len(), 1);
    }
}
