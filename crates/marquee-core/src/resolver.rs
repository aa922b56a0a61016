//! Turns pasted share links into URLs that can be played or opened directly.
//!
//! Resolution is advisory: it never fails and never touches the network.
//! Malformed input degrades to a best-effort string and playability is
//! confirmed later by the media element.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default host for direct-download links.
pub const DEFAULT_DOWNLOAD_HOST: &str = "drive.google.com";

static RE_FILE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/file/d/([^/?#&]+)").unwrap());

static RE_ID_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=([^&#]+)").unwrap());

/// URL-shape convention the resolver targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// File-hosting links rewritten to a `uc?export=download` URL (Google Drive).
    DirectDownload,
    /// Share pages opened as-is once they have a scheme (PikPak).
    ShareLink,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectDownload => "direct-download",
            Self::ShareLink => "share-link",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct-download" | "direct" | "drive" | "gdrive" => Ok(Self::DirectDownload),
            "share-link" | "share" | "pikpak" => Ok(Self::ShareLink),
            _ => Err(ConfigError::UnknownValue {
                kind: "provider",
                value: s.to_string(),
            }),
        }
    }
}

/// A provider bound to its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolver {
    provider: Provider,
    download_host: String,
}

impl LinkResolver {
    pub fn new(provider: Provider, download_host: impl Into<String>) -> Self {
        let host = download_host.into();
        let host = host.trim().trim_end_matches('/').to_string();
        Self {
            provider,
            download_host: if host.is_empty() {
                DEFAULT_DOWNLOAD_HOST.to_string()
            } else {
                host
            },
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn download_host(&self) -> &str {
        &self.download_host
    }

    /// Resolve `raw` for the configured provider. Empty input gives an empty string.
    pub fn resolve(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }
        match self.provider {
            Provider::DirectDownload => self.resolve_direct(raw),
            Provider::ShareLink => resolve_share(raw),
        }
    }

    fn download_prefix(&self) -> String {
        format!("https://{}/uc?export=download&id=", self.download_host)
    }

    fn resolve_direct(&self, raw: &str) -> String {
        let prefix = self.download_prefix();
        if raw.starts_with(&prefix) && raw.len() > prefix.len() {
            return raw.to_string();
        }
        format!("{prefix}{}", extract_file_id(raw))
    }
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new(Provider::DirectDownload, DEFAULT_DOWNLOAD_HOST)
    }
}

/// Find the file id in a pasted link: `/file/d/<ID>` first, then `id=<ID>`,
/// otherwise the whole (trimmed) input is taken as the id.
pub fn extract_file_id(raw: &str) -> &str {
    let raw = raw.trim();
    RE_FILE_PATH
        .captures(raw)
        .or_else(|| RE_ID_PARAM.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
}

fn resolve_share(raw: &str) -> String {
    if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

fn has_scheme(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct() -> LinkResolver {
        LinkResolver::new(Provider::DirectDownload, "host")
    }

    fn share() -> LinkResolver {
        LinkResolver::new(Provider::ShareLink, "host")
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(direct().resolve(""), "");
        assert_eq!(share().resolve(""), "");
        assert_eq!(direct().resolve("   "), "");
    }

    #[test]
    fn test_direct_file_path() {
        assert_eq!(
            direct().resolve("https://host/file/d/ABC123/view"),
            "https://host/uc?export=download&id=ABC123"
        );
        assert_eq!(
            direct().resolve("https://host/file/d/ABC123/view?usp=sharing"),
            "https://host/uc?export=download&id=ABC123"
        );
    }

    #[test]
    fn test_direct_id_param() {
        assert_eq!(
            direct().resolve("https://host/open?id=XYZ"),
            "https://host/uc?export=download&id=XYZ"
        );
        assert_eq!(
            direct().resolve("https://host/open?usp=x&id=XYZ&authuser=0"),
            "https://host/uc?export=download&id=XYZ"
        );
    }

    #[test]
    fn test_direct_bare_id() {
        assert_eq!(
            direct().resolve("  RAWID "),
            "https://host/uc?export=download&id=RAWID"
        );
    }

    #[test]
    fn test_direct_canonical_unchanged() {
        let canonical = "https://host/uc?export=download&id=Q1";
        assert_eq!(direct().resolve(canonical), canonical);
    }

    #[test]
    fn test_path_segment_wins_over_param() {
        assert_eq!(
            direct().resolve("https://host/file/d/PATH/view?id=PARAM"),
            "https://host/uc?export=download&id=PATH"
        );
    }

    #[test]
    fn test_share_link() {
        assert_eq!(share().resolve("example.com/s/abc"), "https://example.com/s/abc");
        assert_eq!(
            share().resolve("https://example.com/s/abc"),
            "https://example.com/s/abc"
        );
        assert_eq!(share().resolve("http://example.com/s/abc"), "http://example.com/s/abc");
        assert_eq!(share().resolve("HTTPS://example.com"), "HTTPS://example.com");
    }

    #[test]
    fn test_deterministic() {
        for raw in ["", "RAWID", "https://host/open?id=XYZ", "mypikpak.com/s/1", "é/file/d/"] {
            for resolver in [direct(), share()] {
                assert_eq!(resolver.resolve(raw), resolver.resolve(raw));
            }
        }
    }

    #[test]
    fn test_default_host() {
        let resolver = LinkResolver::new(Provider::DirectDownload, " ");
        assert_eq!(resolver.download_host(), DEFAULT_DOWNLOAD_HOST);
        assert_eq!(
            resolver.resolve("ID"),
            "https://drive.google.com/uc?export=download&id=ID"
        );
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("pikpak".parse::<Provider>().unwrap(), Provider::ShareLink);
        assert_eq!("Direct-Download".parse::<Provider>().unwrap(), Provider::DirectDownload);
        assert!("ftp".parse::<Provider>().is_err());
    }
}
