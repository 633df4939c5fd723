//! Training video records. Full CRUD.

use academy_db::query::{fetch_page, ListQuery};
use academy_db::{Row, SharedExecutor, Statement, Value, TOUCH_UPDATED_AT_SQL};
use academy_types::{Created, NewVideo, Page, Video, VideoUpdate};

use crate::error::RecordError;
use crate::insert_statement;

const TABLE: &str = "videos";

/// Listing filter for videos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFilter {
    pub page: i64,
    pub limit: i64,
    /// Exact match on `category`.
    pub category: Option<String>,
}

impl Default for VideoFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 12,
            category: None,
        }
    }
}

/// Reads and writes the `videos` table.
#[derive(Clone)]
pub struct VideoRepository {
    db: SharedExecutor,
}

impl VideoRepository {
    pub fn new(db: SharedExecutor) -> Self {
        Self { db }
    }

    /// Lists videos, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn list(&self, filter: &VideoFilter) -> Result<Page<Video>, RecordError> {
        let query = ListQuery::new(TABLE)
            .eq("category", filter.category.as_deref())
            .page(filter.page, filter.limit);
        fetch_page(self.db.as_ref(), &query, video_from_row).await
    }

    /// Fetches one video. Returns `None` when no row has this id.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Video>, RecordError> {
        let result = self
            .db
            .execute(
                Statement::new("SELECT * FROM videos WHERE id = ?").positional(vec![id.into()]),
            )
            .await?;
        result.first().map(video_from_row).transpose()
    }

    /// Inserts a video and returns the input with the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` if the insert fails.
    pub async fn create(&self, video: &NewVideo) -> Result<Created<NewVideo>, RecordError> {
        let fields = vec![
            ("title", Value::from(&video.title)),
            ("description", Value::from(&video.description)),
            ("category", Value::from(&video.category)),
            ("youtube_url", Value::from(&video.youtube_url)),
            ("thumbnail_url", Value::from(&video.thumbnail_url)),
            ("duration", Value::from(video.duration)),
        ];
        let result = self.db.execute(insert_statement(TABLE, fields)).await?;
        let id = result.last_insert_id.ok_or(RecordError::MissingId("video"))?;

        tracing::info!(id, category = %video.category, "video created");

        Ok(Created {
            id,
            record: video.clone(),
        })
    }

    /// Writes only the supplied fields and touches `updated_at`.
    ///
    /// An empty update issues no statement and returns `false`, as does an
    /// update of a missing id.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn update(&self, id: i64, update: &VideoUpdate) -> Result<bool, RecordError> {
        let fields = update_fields(update);
        if fields.is_empty() {
            tracing::debug!(id, "empty video update, nothing to change");
            return Ok(false);
        }

        let assignments: Vec<String> = fields
            .iter()
            .map(|(column, _)| format!("{column} = :{column}"))
            .collect();
        let sql = format!(
            "UPDATE videos SET {}, updated_at = {TOUCH_UPDATED_AT_SQL} WHERE id = :id",
            assignments.join(", ")
        );

        let mut params = fields;
        params.push(("id", Value::from(id)));

        let result = self.db.execute(Statement::new(sql).named(params)).await?;
        let changed = result.rows_affected > 0;
        if changed {
            tracing::info!(id, "video updated");
        }
        Ok(changed)
    }

    /// Deletes a video. Returns `false` when no video has this id.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn delete(&self, id: i64) -> Result<bool, RecordError> {
        let result = self
            .db
            .execute(Statement::new("DELETE FROM videos WHERE id = ?").positional(vec![id.into()]))
            .await?;
        let removed = result.rows_affected > 0;
        if removed {
            tracing::info!(id, "video deleted");
        }
        Ok(removed)
    }
}

fn update_fields(update: &VideoUpdate) -> Vec<(&'static str, Value)> {
    let mut fields = Vec::new();
    if let Some(title) = &update.title {
        fields.push(("title", Value::from(title)));
    }
    if let Some(description) = &update.description {
        fields.push(("description", Value::from(description)));
    }
    if let Some(category) = &update.category {
        fields.push(("category", Value::from(category)));
    }
    if let Some(url) = &update.youtube_url {
        fields.push(("youtube_url", Value::from(url)));
    }
    if let Some(thumbnail) = &update.thumbnail_url {
        fields.push(("thumbnail_url", Value::from(thumbnail)));
    }
    if let Some(duration) = update.duration {
        fields.push(("duration", Value::from(duration)));
    }
    fields
}

fn video_from_row(row: &Row) -> Result<Video, RecordError> {
    Ok(Video {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        category: row.get("category")?,
        youtube_url: row.get("youtube_url")?,
        thumbnail_url: row.get("thumbnail_url")?,
        duration: row.get("duration")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
