//! Startup seeding: a first administrator and a couple of sample videos.
//!
//! Seeding runs after schema replay. Its failures are reported to the
//! caller, which logs them and carries on; a failed seed must not stop the
//! process from starting.

use academy_db::{SharedExecutor, Statement};
use academy_types::{NewAdminUser, NewVideo};

use crate::error::RecordError;
use crate::users::UserRepository;
use crate::videos::VideoRepository;

/// Sample videos inserted into an empty `videos` table:
/// `(title, description, category, url, duration)`.
pub const SAMPLE_VIDEOS: [(&str, &str, &str, &str, i64); 2] = [
    (
        "Ball Control Drills",
        "Essential ball control techniques.",
        "Training",
        "https://www.youtube.com/watch?v=example1",
        600,
    ),
    (
        "Academy Highlights 2024",
        "Best moments from the last season.",
        "Highlights",
        "https://www.youtube.com/watch?v=example2",
        180,
    ),
];

/// What to seed.
#[derive(Debug, Clone, Default)]
pub struct SeedOptions {
    /// Administrator to create when no account has this email. The password
    /// hash must already be computed by the auth layer.
    pub admin: Option<NewAdminUser>,
}

/// What seeding actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub videos_added: usize,
}

/// Ensures the configured administrator exists and that the video library
/// is not empty.
///
/// # Errors
///
/// Returns the first repository failure.
pub async fn seed_database(
    db: &SharedExecutor,
    options: &SeedOptions,
) -> Result<SeedReport, RecordError> {
    let mut report = SeedReport::default();

    if let Some(admin) = &options.admin {
        let users = UserRepository::new(db.clone());
        if users.find_by_email(&admin.email).await?.is_none() {
            users.create(admin).await?;
            report.admin_created = true;
            tracing::info!(email = %admin.email, "seeded administrator account");
        }
    }

    let existing = db
        .execute(Statement::new("SELECT COUNT(*) AS count FROM videos"))
        .await?
        .scalar_i64("count")?;

    if existing == 0 {
        let videos = VideoRepository::new(db.clone());
        for (title, description, category, url, duration) in SAMPLE_VIDEOS {
            let video = NewVideo::new(title, category, url)
                .with_description(description)
                .with_duration(duration);
            videos.create(&video).await?;
            report.videos_added += 1;
        }
        tracing::info!(count = report.videos_added, "seeded sample videos");
    }

    Ok(report)
}
