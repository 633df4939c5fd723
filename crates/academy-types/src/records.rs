//! Stored entities and the input shapes used to create or change them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ApplicationStatus;

/// An academy application as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Store-assigned id.
    pub id: i64,
    /// Applicant's full name.
    pub player_name: String,
    /// Calendar date of birth.
    pub date_of_birth: NaiveDate,
    /// Free-text gender as submitted.
    pub gender: String,
    /// Program the applicant asked for (free-text category).
    pub preferred_program: String,
    /// Current review status.
    pub status: ApplicationStatus,
    /// Parent or guardian name.
    pub parent_name: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Emergency contact name, if given.
    pub emergency_contact_name: Option<String>,
    /// Emergency contact phone, if given.
    pub emergency_contact_phone: Option<String>,
    /// Creation timestamp (`YYYY-MM-DD HH:MM:SS.SSS`, UTC).
    pub created_at: String,
    /// Last update timestamp, same format as `created_at`.
    pub updated_at: String,
}

/// Fields accepted when a new application is submitted.
///
/// Status is not part of the submission; the store defaults it to
/// `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplication {
    pub player_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub preferred_program: String,
    pub parent_name: String,
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
}

/// A training or highlight video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Source URL of the video.
    pub youtube_url: String,
    pub thumbnail_url: Option<String>,
    /// Length in seconds.
    pub duration: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted when a video is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVideo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub youtube_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub duration: i64,
}

impl NewVideo {
    /// Creates a video input with an empty description and thumbnail and a
    /// zero duration.
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        youtube_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: category.into(),
            youtube_url: youtube_url.into(),
            thumbnail_url: String::new(),
            duration: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = thumbnail_url.into();
        self
    }

    pub fn with_duration(mut self, seconds: i64) -> Self {
        self.duration = seconds;
        self
    }
}

/// A partial video update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
}

impl VideoUpdate {
    /// Returns `true` when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.youtube_url.is_none()
            && self.thumbnail_url.is_none()
            && self.duration.is_none()
    }
}

/// An administrator account, consumed by the auth layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub email: String,
    /// Never serialised outward.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub last_login: Option<String>,
    pub created_at: String,
}

/// Fields accepted when an administrator is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAdminUser {
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
}
