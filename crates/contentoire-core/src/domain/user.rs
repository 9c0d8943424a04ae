use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Role granted to every registered account.
pub const USER_ROLE: &str = "user";

/// Role claim that unlocks the settings API.
pub const GLOBAL_ADMIN_ROLE: &str = "global_admin";

/// User entity - an account plus its per-user settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    /// Social platforms the user publishes to (e.g. "twitter").
    pub enabled_media: Vec<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The editable settings shown on the profile screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub display_name: String,
    pub email: String,
    pub enabled_media: Vec<String>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(email: String, display_name: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(&email),
            username: None,
            first_name: None,
            last_name: None,
            display_name,
            password_hash,
            roles: vec![USER_ROLE.to_string()],
            enabled_media: Vec::new(),
            photo_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn grant_role(&mut self, role: &str) {
        if !self.has_role(role) {
            self.roles.push(role.to_string());
        }
    }

    /// "First Last" when both names are known, otherwise the display name.
    pub fn full_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => self.display_name.clone(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            enabled_media: self.enabled_media.clone(),
        }
    }

    /// Replace the editable settings, validating them first.
    pub fn update_profile(&mut self, profile: UserProfile) -> Result<(), DomainError> {
        if profile.display_name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Display name cannot be empty".to_string(),
            ));
        }
        let email = normalize_email(&profile.email);
        if !email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".to_string()));
        }

        let mut media: Vec<String> = Vec::with_capacity(profile.enabled_media.len());
        for platform in profile.enabled_media {
            let platform = platform.trim().to_lowercase();
            if !platform.is_empty() && !media.contains(&platform) {
                media.push(platform);
            }
        }

        self.display_name = profile.display_name.trim().to_string();
        self.email = email;
        self.enabled_media = media;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `a***@example.com`, for log lines.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.len() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}
