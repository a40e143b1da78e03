//! Integration tests for the `PostgreSQL` store.
//!
//! Each test migrates a fresh schema on the database at
//! `IDEABOX_TEST_DATABASE_URL`, so tests can run in parallel and leave the
//! default schema alone.
//!
//! ```bash
//! IDEABOX_TEST_DATABASE_URL=postgres://localhost/ideabox_test \
//!     cargo test -p ideabox-integration-tests --test pg_store -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::str::FromStr;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use ideabox_core::{
    Email, IdeaNumber, IdeaStatus, NewComment, NewIdea, NewTag, Role, Slug, UserId,
};
use ideabox_web::db::{IdeaStore, PgStore, RepositoryError, TagStore, UserStore};

/// Connect to a newly created, migrated schema.
async fn fresh_store() -> (PgStore, PgPool) {
    let _ = dotenvy::dotenv();
    let url = std::env::var("IDEABOX_TEST_DATABASE_URL")
        .expect("IDEABOX_TEST_DATABASE_URL must be set");

    let schema = format!("test_{}", uuid::Uuid::new_v4().simple());
    let setup = PgPool::connect(&url).await.expect("Failed to connect");
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&setup)
        .await
        .expect("Failed to create schema");
    setup.close().await;

    let options = PgConnectOptions::from_str(&url)
        .expect("Invalid database URL")
        .options([("search_path", schema.as_str())]);
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .expect("Failed to connect to schema");

    sqlx::migrate!("../web/migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate");

    (PgStore::new(pool.clone()), pool)
}

fn email(s: &str) -> Email {
    Email::parse(s).unwrap()
}

async fn member(store: &PgStore, address: &str) -> UserId {
    let name = address.split('@').next().unwrap_or_default();
    store
        .get_or_create_user(&email(address), name)
        .await
        .unwrap()
        .id
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (IDEABOX_TEST_DATABASE_URL)"]
async fn test_first_member_is_administrator() {
    let (store, _pool) = fresh_store().await;

    let ana = store
        .get_or_create_user(&email("ana@example.com"), "ana")
        .await
        .unwrap();
    let bo = store
        .get_or_create_user(&email("bo@example.com"), "bo")
        .await
        .unwrap();
    assert_eq!(ana.role, Role::Administrator);
    assert_eq!(bo.role, Role::Visitor);

    let again = store
        .get_or_create_user(&email("ana@example.com"), "someone else")
        .await
        .unwrap();
    assert_eq!(again.id, ana.id);
    assert_eq!(again.name, "ana");

    let promoted = store
        .set_user_role(bo.id, Role::Collaborator)
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Collaborator);
    assert!(matches!(
        store.set_user_role(UserId::new(999), Role::Visitor).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (IDEABOX_TEST_DATABASE_URL)"]
async fn test_concurrent_ideas_get_sequential_numbers() {
    let (store, _pool) = fresh_store().await;
    let user_id = member(&store, "ana@example.com").await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .add_idea(user_id, &NewIdea::new(&format!("Idea number {i}"), ""))
                    .await
                    .unwrap()
                    .number
                    .as_i32()
            })
        })
        .collect();

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap());
    }
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=8).collect::<Vec<_>>());

    let recent = store.recent_ideas(3).await.unwrap();
    let recent: Vec<_> = recent.iter().map(|i| i.number.as_i32()).collect();
    assert_eq!(recent, [8, 7, 6]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (IDEABOX_TEST_DATABASE_URL)"]
async fn test_verification_key_is_single_use() {
    let (store, _pool) = fresh_store().await;
    let now = Utc::now();
    let ana = email("ana@example.com");

    store
        .save_verification(&ana, "fresh-key", now + Duration::minutes(30))
        .await
        .unwrap();
    store
        .save_verification(&ana, "stale-key", now - Duration::minutes(1))
        .await
        .unwrap();
    assert!(matches!(
        store
            .save_verification(&ana, "fresh-key", now + Duration::minutes(30))
            .await,
        Err(RepositoryError::Conflict(_))
    ));

    assert_eq!(
        store.take_verification("fresh-key", now).await.unwrap(),
        Some(ana)
    );
    assert_eq!(store.take_verification("fresh-key", now).await.unwrap(), None);
    assert_eq!(store.take_verification("stale-key", now).await.unwrap(), None);
    assert_eq!(store.take_verification("unknown", now).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (IDEABOX_TEST_DATABASE_URL)"]
async fn test_update_respond_and_comment() {
    let (store, _pool) = fresh_store().await;
    let ana = member(&store, "ana@example.com").await;
    let bo = member(&store, "bo@example.com").await;
    let idea = store
        .add_idea(ana, &NewIdea::new("Add a dark mode toggle", ""))
        .await
        .unwrap();

    let edited = store
        .update_idea(idea.number, &NewIdea::new("Add a theme picker", "Light and dark"))
        .await
        .unwrap();
    assert_eq!(edited.id, idea.id);
    assert_eq!(edited.slug.as_str(), "add-a-theme-picker");
    assert!(matches!(
        store
            .update_idea(IdeaNumber::new(42), &NewIdea::new("Nothing here", ""))
            .await,
        Err(RepositoryError::NotFound)
    ));

    let answered = store
        .set_response(idea.number, ana, IdeaStatus::Started, "On it.")
        .await
        .unwrap();
    assert_eq!(answered.status, IdeaStatus::Started);
    let response = answered.response.unwrap();
    assert_eq!(response.text, "On it.");
    assert_eq!(response.user_id, ana);

    store
        .add_comment(idea.number, bo, &NewComment::new("Please!"))
        .await
        .unwrap();
    store
        .add_comment(idea.number, ana, &NewComment::new("Noted."))
        .await
        .unwrap();
    let comments = store.comments_for(idea.id).await.unwrap();
    let authors: Vec<_> = comments.iter().map(|c| c.user_name.as_str()).collect();
    assert_eq!(authors, ["bo", "ana"]);
    assert!(matches!(
        store
            .add_comment(IdeaNumber::new(42), bo, &NewComment::new("Hello?"))
            .await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (IDEABOX_TEST_DATABASE_URL)"]
async fn test_tag_slug_is_unique() {
    let (store, _pool) = fresh_store().await;

    store
        .add_tag(&NewTag::new("Feature Request", "FF0000", true))
        .await
        .unwrap();
    assert!(matches!(
        store
            .add_tag(&NewTag::new("feature request", "00FF00", false))
            .await,
        Err(RepositoryError::Conflict(_))
    ));

    let bug = store
        .add_tag(&NewTag::new("Bug", "000000", true))
        .await
        .unwrap();
    assert!(matches!(
        store
            .update_tag(bug.id, &NewTag::new("Feature Request", "000000", true))
            .await,
        Err(RepositoryError::Conflict(_))
    ));

    let renamed = store
        .update_tag(bug.id, &NewTag::new("Defect", "111111", false))
        .await
        .unwrap();
    assert_eq!(renamed.slug.as_str(), "defect");
    assert!(!renamed.is_public);
    assert!(
        store
            .get_tag_by_slug(&Slug::from_stored("bug".to_owned()))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (IDEABOX_TEST_DATABASE_URL)"]
async fn test_removing_tag_removes_assignments() {
    let (store, _pool) = fresh_store().await;
    let ana = member(&store, "ana@example.com").await;
    let idea = store
        .add_idea(ana, &NewIdea::new("Let users vote on ideas", ""))
        .await
        .unwrap();
    let bug = store
        .add_tag(&NewTag::new("Bug", "FFFFFF", true))
        .await
        .unwrap();
    let triage = store
        .add_tag(&NewTag::new("Triage", "CCCCCC", false))
        .await
        .unwrap();

    store.assign_tag(bug.id, idea.id, ana).await.unwrap();
    store.assign_tag(bug.id, idea.id, ana).await.unwrap();
    store.assign_tag(triage.id, idea.id, ana).await.unwrap();
    let names = |tags: Vec<ideabox_web::models::Tag>| {
        tags.into_iter().map(|t| t.name).collect::<Vec<_>>()
    };
    assert_eq!(
        names(store.assigned_tags(idea.id).await.unwrap()),
        ["Bug", "Triage"]
    );

    store.unassign_tag(triage.id, idea.id).await.unwrap();
    store.unassign_tag(triage.id, idea.id).await.unwrap();
    assert_eq!(names(store.assigned_tags(idea.id).await.unwrap()), ["Bug"]);

    store.remove_tag(bug.id).await.unwrap();
    assert!(store.assigned_tags(idea.id).await.unwrap().is_empty());
    assert_eq!(names(store.all_tags().await.unwrap()), ["Triage"]);
}
