//! Playback session: the open item and the status of its media element.
//!
//! ```text
//! Idle -> Loading -> Ready | Error -> Playing <-> Paused -> Ended -> Idle
//! ```
//!
//! Media-layer signals drive the transitions. Signals that do not apply to the
//! current status are ignored, as are late signals from a source that has
//! already been replaced.

use std::fmt;

use tracing::{debug, warn};

use crate::error::PlaybackError;
use crate::store::CatalogItem;

/// The platform's media element, e.g. an HTML `<video>` or an external player.
pub trait MediaElement {
    /// Point the element at `url`. An empty string releases the current source.
    fn set_source(&mut self, url: &str);

    /// Request playback. A refusal by autoplay policy comes back as
    /// [`MediaSignal::AutoplayBlocked`].
    fn play(&mut self);

    fn pause(&mut self);
}

/// Events reported by the media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSignal {
    /// Buffering or waiting for data.
    Waiting,
    CanPlay,
    Playing,
    Paused,
    Ended,
    /// Autoplay was refused by the environment. Not an error.
    AutoplayBlocked,
    /// Fatal media error. The detail is logged, never shown.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
    Error(PlaybackError),
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading => f.write_str("loading"),
            Self::Ready => f.write_str("ready"),
            Self::Playing => f.write_str("playing"),
            Self::Paused => f.write_str("paused"),
            Self::Ended => f.write_str("ended"),
            Self::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Identifies one `open` call. Signals tagged with an older token are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(u64);

/// The single playback session. Opening a new item releases the previous
/// source before the new one starts loading.
pub struct PlaybackSession<M> {
    media: M,
    active: Option<CatalogItem>,
    status: PlaybackStatus,
    generation: u64,
    autoplay: bool,
    holds_source: bool,
}

impl<M: MediaElement> PlaybackSession<M> {
    pub fn new(media: M, autoplay: bool) -> Self {
        Self {
            media,
            active: None,
            status: PlaybackStatus::Idle,
            generation: 0,
            autoplay,
            holds_source: false,
        }
    }

    pub fn status(&self) -> &PlaybackStatus {
        &self.status
    }

    pub fn active(&self) -> Option<&CatalogItem> {
        self.active.as_ref()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    /// User-facing message while in the error state.
    pub fn error_message(&self) -> Option<String> {
        match &self.status {
            PlaybackStatus::Error(e) => Some(e.to_string()),
            _ => None,
        }
    }

    /// Open `item`, closing whatever was open first.
    pub fn open(&mut self, item: CatalogItem) -> SessionToken {
        if self.active.is_some() || self.holds_source {
            self.close();
        }

        self.generation += 1;
        let token = SessionToken(self.generation);
        let source = item.resolved_source().to_string();
        debug!(id = %item.id(), title = %item.title, "Opening playback session");
        self.active = Some(item);

        if source.is_empty() {
            warn!("Entry has no playable link");
            self.status = PlaybackStatus::Error(PlaybackError::NoPlayableLink);
            return token;
        }

        self.status = PlaybackStatus::Loading;
        self.media.set_source(&source);
        self.holds_source = true;
        if self.autoplay {
            self.media.play();
        }
        token
    }

    /// Close the session and release the media source.
    pub fn close(&mut self) {
        if self.holds_source {
            self.media.pause();
            self.media.set_source("");
            self.holds_source = false;
        }
        if let Some(item) = self.active.take() {
            debug!(id = %item.id(), "Closed playback session");
        }
        self.status = PlaybackStatus::Idle;
    }

    /// Apply a media signal. Returns whether the status changed.
    pub fn handle(&mut self, token: SessionToken, signal: MediaSignal) -> bool {
        if token.0 != self.generation || self.active.is_none() {
            debug!(?signal, "Ignoring signal from a released source");
            return false;
        }

        use PlaybackStatus as S;
        let next = match (&self.status, signal) {
            (S::Ready | S::Playing | S::Paused, MediaSignal::Waiting) => S::Loading,
            (S::Loading, MediaSignal::CanPlay) => S::Ready,
            (S::Loading, MediaSignal::AutoplayBlocked) => S::Ready,
            (S::Loading | S::Ready | S::Paused, MediaSignal::Playing) => S::Playing,
            (S::Loading | S::Playing, MediaSignal::Paused) => S::Paused,
            (S::Loading | S::Playing | S::Paused, MediaSignal::Ended) => S::Ended,
            (S::Loading | S::Ready | S::Playing | S::Paused, MediaSignal::Failed(detail)) => {
                warn!(detail = %detail, "Media error");
                S::Error(PlaybackError::MediaFailed)
            }
            (status, signal) => {
                debug!(%status, ?signal, "Signal does not apply");
                return false;
            }
        };

        debug!(from = %self.status, to = %next, "Playback transition");
        let changed = next != self.status;
        self.status = next;
        changed
    }
}
