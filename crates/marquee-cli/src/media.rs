use marquee_core::playback::MediaElement;

/// Hands the resolved URL to the system opener (browser or registered player).
#[derive(Debug, Default)]
pub struct SystemOpener {
    source: String,
    failure: Option<String>,
}

impl SystemOpener {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn take_failure(&mut self) -> Option<String> {
        self.failure.take()
    }
}

impl MediaElement for SystemOpener {
    fn set_source(&mut self, url: &str) {
        self.source = url.to_string();
        self.failure = None;
    }

    fn play(&mut self) {
        if self.source.is_empty() {
            return;
        }
        tracing::debug!(url = %self.source, "Opening with system handler");
        if let Err(e) = open::that(&self.source) {
            tracing::warn!(error = %e, "System opener failed");
            self.failure = Some(e.to_string());
        }
    }

    fn pause(&mut self) {}
}
