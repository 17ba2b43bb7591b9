use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::error::CatalogError;

// ============================================================================
// Content Type
// ============================================================================

/// Kind of media a catalog record describes.
///
/// The set is closed: unknown or unspecified values are rejected at the
/// boundary and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Podcast,
    Documentary,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Podcast => "podcast",
            ContentType::Documentary => "documentary",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = CatalogError;

    /// Accepts the stored spelling and the `CONTENT_TYPE_*` enum names used by
    /// the service definitions, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "podcast" | "content_type_podcast" => Ok(ContentType::Podcast),
            "documentary" | "content_type_documentary" => Ok(ContentType::Documentary),
            "" | "content_type_unspecified" => Err(CatalogError::InvalidInput(
                "content type must be specified".to_string(),
            )),
            other => Err(CatalogError::InvalidInput(format!(
                "unknown content type '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// Content Records
// ============================================================================

/// Caller-supplied fields for creating or updating a content record.
///
/// Identifiers and timestamps are assigned by the store; anything the caller
/// might put there is not part of the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDraft {
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub language: Option<String>,
    pub duration_seconds: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub content_type: ContentType,
    pub url: Option<String>,
    pub platform_name: Option<String>,
}

impl ContentDraft {
    pub fn new(title: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            title: title.into(),
            description: None,
            tags: Vec::new(),
            language: None,
            duration_seconds: None,
            published_at: None,
            content_type,
            url: None,
            platform_name: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_duration_seconds(mut self, seconds: i32) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_platform_name(mut self, platform_name: impl Into<String>) -> Self {
        self.platform_name = Some(platform_name.into());
        self
    }

    /// Checks required fields and normalizes the tag set.
    ///
    /// Tag names are trimmed and de-duplicated (first occurrence wins); the
    /// published timestamp is truncated to microseconds, the precision the
    /// database keeps.
    pub fn validate(mut self) -> Result<Self, CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::InvalidInput("title is required".to_string()));
        }

        if let Some(duration) = self.duration_seconds.filter(|d| *d < 0) {
            return Err(CatalogError::InvalidInput(format!(
                "duration_seconds must be non-negative, got {}",
                duration
            )));
        }

        let mut seen = HashSet::new();
        let mut tags = Vec::with_capacity(self.tags.len());
        for raw in self.tags {
            let name = raw.trim();
            if name.is_empty() {
                return Err(CatalogError::InvalidInput(
                    "tag names must not be empty".to_string(),
                ));
            }
            if seen.insert(name.to_string()) {
                tags.push(name.to_string());
            }
        }
        self.tags = tags;
        self.published_at = self.published_at.map(|t| t.trunc_subsecs(6));

        Ok(self)
    }
}

/// A stored content record with its resolved tag names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Sorted by name, ascending
    pub tags: Vec<String>,
    pub language: Option<String>,
    pub duration_seconds: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub content_type: ContentType,
    pub url: Option<String>,
    pub platform_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Content {
    /// Tag names joined with single spaces, the text searched as "tag text".
    pub fn tag_text(&self) -> String {
        self.tags.join(" ")
    }
}

/// A search result: the record and the score it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub content: Content,
    /// Highest trigram similarity over title, description, platform and tags
    pub rank: f32,
}

/// Parses an RFC 3339 publication timestamp; an empty string means unpublished.
pub fn parse_published_at(raw: &str) -> Result<Option<DateTime<Utc>>, CatalogError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|t| Some(t.with_timezone(&Utc)))
        .map_err(|e| CatalogError::InvalidInput(format!("invalid published_at '{}': {}", raw, e)))
}
