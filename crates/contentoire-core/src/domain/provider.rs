use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// What a provider record configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// A news API the drafting workers pull from.
    News,
    /// A sign-in method offered to users.
    Auth,
    /// A social platform posts go out to. Users pick from these codes for
    /// their enabled media.
    Media,
    /// An RSS feed the drafting workers read. `sources` holds the feed URL.
    Rss,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Auth => "auth",
            Self::Media => "media",
            Self::Rss => "rss",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news" => Ok(Self::News),
            "auth" => Ok(Self::Auth),
            "media" => Ok(Self::Media),
            "rss" => Ok(Self::Rss),
            other => Err(DomainError::Validation(format!(
                "Unknown provider kind '{other}'"
            ))),
        }
    }
}

/// Provider - a pluggable configuration record for a news source, auth method,
/// social platform or RSS feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub kind: ProviderKind,
    /// Public identifier, unique per kind (e.g. "newsapi", "google").
    pub code: String,
    pub title: String,
    pub logo: String,
    pub enabled: bool,
    /// API key for news sources, client secret for auth methods.
    pub api_key: Option<String>,
    pub sources: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating or replacing a provider.
#[derive(Debug, Clone)]
pub struct NewProvider {
    pub code: String,
    pub title: String,
    pub logo: String,
    pub enabled: bool,
    pub api_key: Option<String>,
    pub sources: Vec<String>,
}

impl NewProvider {
    fn validate(&self, kind: ProviderKind) -> Result<(), DomainError> {
        let mut missing = Vec::new();
        if self.code.trim().is_empty() {
            missing.push("code");
        }
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if kind == ProviderKind::Rss && self.sources.iter().all(|s| s.trim().is_empty()) {
            missing.push("sources");
        }
        if !missing.is_empty() {
            return Err(DomainError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        if self.code.trim().contains(char::is_whitespace) {
            return Err(DomainError::Validation(
                "Code cannot contain whitespace".to_string(),
            ));
        }
        Ok(())
    }

    fn clean_sources(sources: Vec<String>) -> Vec<String> {
        sources
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Provider {
    pub fn new(kind: ProviderKind, input: NewProvider) -> Result<Self, DomainError> {
        input.validate(kind)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            code: input.code.trim().to_lowercase(),
            title: input.title.trim().to_string(),
            logo: input.logo,
            enabled: input.enabled,
            api_key: input.api_key.filter(|k| !k.is_empty()),
            sources: NewProvider::clean_sources(input.sources),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace every editable field, keeping id, kind and creation time.
    pub fn replace(&mut self, input: NewProvider) -> Result<(), DomainError> {
        input.validate(self.kind)?;
        self.code = input.code.trim().to_lowercase();
        self.title = input.title.trim().to_string();
        self.logo = input.logo;
        self.enabled = input.enabled;
        self.api_key = input.api_key.filter(|k| !k.is_empty());
        self.sources = NewProvider::clean_sources(input.sources);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(code: &str) -> NewProvider {
        NewProvider {
            code: code.to_string(),
            title: "NewsAPI".to_string(),
            logo: "https://newsapi.org/logo.png".to_string(),
            enabled: true,
            api_key: Some("k".to_string()),
            sources: vec!["bbc-news".to_string(), " ".to_string(), "reuters".to_string()],
        }
    }

    #[test]
    fn test_new_provider_normalizes_fields() {
        let provider = Provider::new(ProviderKind::News, input(" NewsAPI ")).unwrap();
        assert_eq!(provider.code, "newsapi");
        assert_eq!(provider.sources, vec!["bbc-news", "reuters"]);
        assert!(provider.enabled);
    }

    #[test]
    fn test_inner_whitespace_in_code_rejected() {
        let err = Provider::new(ProviderKind::News, input(" news api ")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Code cannot contain whitespace"
        );
    }

    #[test]
    fn test_rss_feed_needs_its_url() {
        let mut feed = input("reuters-world");
        feed.sources = vec![" ".to_string()];
        let err = Provider::new(ProviderKind::Rss, feed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Missing required fields: sources"
        );

        // Other kinds carry no source requirement.
        let mut platform = input("twitter");
        platform.sources = Vec::new();
        assert!(Provider::new(ProviderKind::Media, platform).is_ok());
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            ProviderKind::News,
            ProviderKind::Auth,
            ProviderKind::Media,
            ProviderKind::Rss,
        ] {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
        assert!("fax".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_missing_fields_listed() {
        let mut bad = input("");
        bad.title = String::new();
        let err = Provider::new(ProviderKind::Auth, bad).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Missing required fields: code, title"
        );
    }

    #[test]
    fn test_toggle_flips_enabled() {
        let mut provider = Provider::new(ProviderKind::Auth, input("google")).unwrap();
        provider.toggle();
        assert!(!provider.enabled);
        provider.toggle();
        assert!(provider.enabled);
    }

    #[test]
    fn test_replace_keeps_identity() {
        let mut provider = Provider::new(ProviderKind::News, input("newsapi")).unwrap();
        let id = provider.id;
        let mut next = input("gnews");
        next.enabled = false;
        provider.replace(next).unwrap();
        assert_eq!(provider.id, id);
        assert_eq!(provider.code, "gnews");
        assert!(!provider.enabled);
    }
}
