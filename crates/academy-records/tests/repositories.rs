use std::time::Duration;

use academy_db::{connect, replay_schema, DbSettings, SharedExecutor, Statement, SCHEMA_SQL};
use academy_records::{
    seed_database, ApplicationFilter, ApplicationRepository, RecordError, SeedOptions,
    UserRepository, VideoFilter, VideoRepository, SAMPLE_VIDEOS,
};
use academy_types::{ApplicationStatus, NewAdminUser, NewApplication, NewVideo, VideoUpdate};
use chrono::NaiveDate;

async fn test_db() -> (tempfile::TempDir, SharedExecutor) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("academy.db");
    let db = connect(&DbSettings::new(path.to_str().unwrap())).expect("should connect");
    replay_schema(db.as_ref(), SCHEMA_SQL)
        .await
        .expect("schema should replay");
    (dir, db)
}

fn submission(name: &str, program: &str) -> NewApplication {
    NewApplication {
        player_name: name.to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2012, 12, 31).unwrap(),
        gender: "female".into(),
        preferred_program: program.to_string(),
        parent_name: "Parent".into(),
        phone: "0200000000".into(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        emergency_contact_name: Some("Aunt".into()),
        emergency_contact_phone: None,
    }
}

// ── applications ─────────────────────────────────────────────────────

#[tokio::test]
async fn created_application_round_trips() {
    let (_dir, db) = test_db().await;
    let repo = ApplicationRepository::new(db);

    let input = submission("Efua Owusu", "Elite Squad");
    let created = repo.create(&input).await.expect("create should succeed");
    assert_eq!(created.record, input);

    let stored = repo
        .get_by_id(created.id)
        .await
        .unwrap()
        .expect("application should exist");
    assert_eq!(stored.id, created.id);
    assert_eq!(stored.player_name, input.player_name);
    assert_eq!(stored.date_of_birth, input.date_of_birth);
    assert_eq!(stored.gender, input.gender);
    assert_eq!(stored.preferred_program, input.preferred_program);
    assert_eq!(stored.parent_name, input.parent_name);
    assert_eq!(stored.phone, input.phone);
    assert_eq!(stored.email, input.email);
    assert_eq!(stored.emergency_contact_name, input.emergency_contact_name);
    assert_eq!(stored.emergency_contact_phone, None);
    assert_eq!(stored.status, ApplicationStatus::Pending);
}

#[tokio::test]
async fn missing_application_is_none() {
    let (_dir, db) = test_db().await;
    let repo = ApplicationRepository::new(db);
    assert!(repo.get_by_id(404).await.unwrap().is_none());
}

#[tokio::test]
async fn second_page_of_twenty_five() {
    let (_dir, db) = test_db().await;
    let repo = ApplicationRepository::new(db);
    for i in 0..25 {
        repo.create(&submission(&format!("Player {i}"), "Youth")).await.unwrap();
    }

    let page = repo
        .list(&ApplicationFilter {
            page: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.data.len(), 5);
    assert_eq!(page.total, 25);
    assert_eq!((page.page, page.limit), (2, 20));

    let first = repo.list(&ApplicationFilter::default()).await.unwrap();
    assert_eq!(first.data.len(), 20);
    assert_eq!(first.data[0].player_name, "Player 24", "newest first");
}

#[tokio::test]
async fn list_all_is_unpaged_and_newest_first() {
    let (_dir, db) = test_db().await;
    let repo = ApplicationRepository::new(db);
    for i in 0..23 {
        repo.create(&submission(&format!("Player {i}"), "Youth")).await.unwrap();
    }

    let all = repo.list_all().await.unwrap();
    assert_eq!(all.len(), 23);
    assert_eq!(all[0].player_name, "Player 22");
    assert_eq!(all[22].player_name, "Player 0");
}

#[tokio::test]
async fn totals_match_independent_counts() {
    let (_dir, db) = test_db().await;
    let repo = ApplicationRepository::new(db.clone());

    let names = ["Ada Boateng", "Kwame Ansah", "Adjoa Mensah", "Yaw Ofori", "Adwoa Darko"];
    for (i, name) in names.iter().enumerate() {
        let program = if i % 2 == 0 { "Elite Squad" } else { "Youth" };
        let created = repo.create(&submission(name, program)).await.unwrap();
        if i < 2 {
            repo.update_status(created.id, ApplicationStatus::Approved).await.unwrap();
        }
    }

    let filters = [
        (ApplicationFilter::default(), "SELECT COUNT(*) AS n FROM applications"),
        (
            ApplicationFilter {
                status: Some(ApplicationStatus::Approved),
                ..Default::default()
            },
            "SELECT COUNT(*) AS n FROM applications WHERE status = 'approved'",
        ),
        (
            ApplicationFilter {
                program: Some("Elite Squad".into()),
                ..Default::default()
            },
            "SELECT COUNT(*) AS n FROM applications WHERE preferred_program = 'Elite Squad'",
        ),
        (
            ApplicationFilter {
                search: Some("ad".into()),
                ..Default::default()
            },
            "SELECT COUNT(*) AS n FROM applications WHERE player_name LIKE '%ad%' OR email LIKE '%ad%'",
        ),
        (
            ApplicationFilter {
                status: Some(ApplicationStatus::Approved),
                program: Some("Elite Squad".into()),
                search: Some("ada".into()),
                limit: 1,
                ..Default::default()
            },
            "SELECT COUNT(*) AS n FROM applications WHERE status = 'approved' AND preferred_program = 'Elite Squad' AND (player_name LIKE '%ada%' OR email LIKE '%ada%')",
        ),
    ];

    for (filter, independent) in filters {
        let page = repo.list(&filter).await.unwrap();
        let expected = db
            .execute(Statement::new(independent))
            .await
            .unwrap()
            .scalar_i64("n")
            .unwrap();
        assert_eq!(page.total, expected, "filter {filter:?}");
        assert!(page.data.len() as i64 <= filter.limit);
    }
}

#[tokio::test]
async fn status_update_stamps_a_later_timestamp() {
    let (_dir, db) = test_db().await;
    let repo = ApplicationRepository::new(db);

    // Back to back, so create and update usually share a millisecond.
    for i in 0..40 {
        let created = repo
            .create(&submission(&format!("Nana Yeboah {i}"), "Youth"))
            .await
            .unwrap();
        assert!(repo
            .update_status(created.id, ApplicationStatus::Approved)
            .await
            .unwrap());

        let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Approved);
        assert!(
            stored.updated_at > stored.created_at,
            "{} should be after {}",
            stored.updated_at,
            stored.created_at
        );
    }
}

#[tokio::test]
async fn repeated_status_updates_keep_moving_forward() {
    let (_dir, db) = test_db().await;
    let repo = ApplicationRepository::new(db);
    let created = repo.create(&submission("Kwesi Appiah", "Youth")).await.unwrap();

    let mut previous = repo.get_by_id(created.id).await.unwrap().unwrap().updated_at;
    for status in ApplicationStatus::ALL {
        repo.update_status(created.id, status).await.unwrap();
        let current = repo.get_by_id(created.id).await.unwrap().unwrap().updated_at;
        assert!(current > previous, "{current} should be after {previous}");
        previous = current;
    }
}

#[tokio::test]
async fn status_update_of_missing_id_is_false() {
    let (_dir, db) = test_db().await;
    let repo = ApplicationRepository::new(db);
    assert!(!repo.update_status(77, ApplicationStatus::Enrolled).await.unwrap());
}

// ── videos ───────────────────────────────────────────────────────────

#[tokio::test]
async fn video_crud_cycle() {
    let (_dir, db) = test_db().await;
    let repo = VideoRepository::new(db);

    let input = NewVideo::new("Set pieces", "Training", "https://youtu.be/sp")
        .with_description("Corners and free kicks")
        .with_duration(420);
    let created = repo.create(&input).await.unwrap();

    let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Set pieces");
    assert_eq!(stored.description, "Corners and free kicks");
    assert_eq!(stored.thumbnail_url.as_deref(), Some(""));
    assert_eq!(stored.duration, 420);

    let changed = repo
        .update(
            created.id,
            &VideoUpdate {
                title: Some("Set pieces II".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(changed);

    let updated = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "Set pieces II");
    assert_eq!(updated.category, "Training", "untouched fields keep their values");
    assert_eq!(updated.duration, 420);

    assert!(repo.delete(created.id).await.unwrap());
    assert!(!repo.delete(created.id).await.unwrap());
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn video_update_stamps_a_later_timestamp() {
    let (_dir, db) = test_db().await;
    let repo = VideoRepository::new(db);

    for i in 0..40 {
        let created = repo
            .create(&NewVideo::new(format!("Rondo {i}"), "Training", "https://youtu.be/r"))
            .await
            .unwrap();
        let update = VideoUpdate {
            duration: Some(i),
            ..Default::default()
        };
        assert!(repo.update(created.id, &update).await.unwrap());

        let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert!(
            stored.updated_at > stored.created_at,
            "{} should be after {}",
            stored.updated_at,
            stored.created_at
        );
    }
}

#[tokio::test]
async fn empty_video_update_is_a_no_op() {
    let (_dir, db) = test_db().await;
    let repo = VideoRepository::new(db);
    let created = repo
        .create(&NewVideo::new("Agility", "Training", "https://youtu.be/ag"))
        .await
        .unwrap();
    let before = repo.get_by_id(created.id).await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!repo.update(created.id, &VideoUpdate::default()).await.unwrap());

    let after = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(after.updated_at, before.updated_at);
}

#[tokio::test]
async fn update_of_missing_video_is_false() {
    let (_dir, db) = test_db().await;
    let repo = VideoRepository::new(db);
    let update = VideoUpdate {
        duration: Some(10),
        ..Default::default()
    };
    assert!(!repo.update(999, &update).await.unwrap());
}

#[tokio::test]
async fn videos_filter_by_category_with_default_page_size() {
    let (_dir, db) = test_db().await;
    let repo = VideoRepository::new(db);
    for i in 0..15 {
        let category = if i < 13 { "Training" } else { "Highlights" };
        repo.create(&NewVideo::new(format!("v{i}"), category, "u")).await.unwrap();
    }

    let all = repo.list(&VideoFilter::default()).await.unwrap();
    assert_eq!(all.total, 15);
    assert_eq!(all.data.len(), 12);

    let highlights = repo
        .list(&VideoFilter {
            category: Some("Highlights".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(highlights.total, 2);
    assert!(highlights.data.iter().all(|v| v.category == "Highlights"));
}

// ── users and seeding ────────────────────────────────────────────────

fn admin(email: &str) -> NewAdminUser {
    NewAdminUser {
        email: email.to_string(),
        password_hash: "$2b$10$abcdefghijklmnopqrstuv".into(),
        full_name: "System Admin".into(),
        role: "super_admin".into(),
    }
}

#[tokio::test]
async fn duplicate_admin_email_is_rejected() {
    let (_dir, db) = test_db().await;
    let users = UserRepository::new(db);

    let created = users.create(&admin("admin@academy.test")).await.unwrap();
    let err = users.create(&admin("admin@academy.test")).await.unwrap_err();
    assert!(matches!(err, RecordError::EmailTaken(ref e) if e == "admin@academy.test"));

    let found = users.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.email, "admin@academy.test");
    assert_eq!(found.last_login, None);

    assert!(users.update_last_login(created.id).await.unwrap());
    let found = users.find_by_email("admin@academy.test").await.unwrap().unwrap();
    assert!(found.last_login.is_some());
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let (_dir, db) = test_db().await;
    let options = SeedOptions {
        admin: Some(admin("root@academy.test")),
    };

    let first = seed_database(&db, &options).await.unwrap();
    assert!(first.admin_created);
    assert_eq!(first.videos_added, SAMPLE_VIDEOS.len());

    let second = seed_database(&db, &options).await.unwrap();
    assert!(!second.admin_created);
    assert_eq!(second.videos_added, 0);

    let videos = VideoRepository::new(db).list(&VideoFilter::default()).await.unwrap();
    assert_eq!(videos.total, 2);
}
