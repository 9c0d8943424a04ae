use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

pub const DEFAULT_REGION: &str = "CA";
pub const DEFAULT_LANGUAGE: &str = "en";

/// A search term the news workers query their providers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchKeyword {
    pub id: Uuid,
    pub keyword: String,
    /// ISO country code, upper case.
    pub region: String,
    /// ISO language code, lower case.
    pub language: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating or replacing a keyword.
#[derive(Debug, Clone, Default)]
pub struct NewSearchKeyword {
    pub keyword: String,
    pub region: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SearchKeyword {
    pub fn new(input: NewSearchKeyword) -> Result<Self, DomainError> {
        let now = Utc::now();
        let mut keyword = Self {
            id: Uuid::new_v4(),
            keyword: String::new(),
            region: DEFAULT_REGION.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            category: None,
            sub_category: None,
            description: None,
            enabled: input.enabled,
            created_at: now,
            updated_at: now,
        };
        keyword.replace(input)?;
        keyword.updated_at = now;
        Ok(keyword)
    }

    /// Replace every editable field, keeping id and creation time.
    /// Blank region and language fall back to the defaults.
    pub fn replace(&mut self, input: NewSearchKeyword) -> Result<(), DomainError> {
        let term = input.keyword.trim();
        if term.is_empty() {
            return Err(DomainError::Validation(
                "Missing required fields: keyword".to_string(),
            ));
        }

        self.keyword = term.to_string();
        self.region = non_blank(input.region)
            .map(|r| r.to_uppercase())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        self.language = non_blank(input.language)
            .map(|l| l.to_lowercase())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        self.category = non_blank(input.category);
        self.sub_category = non_blank(input.sub_category);
        self.description = non_blank(input.description);
        self.enabled = input.enabled;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        self.updated_at = Utc::now();
    }
}
