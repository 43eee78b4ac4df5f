//! Integration tests for content item CRUD and the sweep queries.
//!
//! Exercises the repository layer against a real database:
//! - Insert normalization (keywords, default state, changed_by)
//! - Patch updates and publish window changes
//! - Direct notification flag updates
//! - The three sweep queries around the window bounds

use chrono::{Duration, Utc};
use sqlx::PgPool;

use atrium_core::content::states;
use atrium_db::models::content::{CreateContentItem, UpdateContentItem};
use atrium_db::repositories::ContentRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_item(title: &str) -> CreateContentItem {
    CreateContentItem {
        content_type: "intranet.newsitem".to_string(),
        title: title.to_string(),
        creator_id: Some(1),
        keywords: None,
        parent_group_id: None,
        is_tmp: false,
        state: None,
        publish_from: None,
        publish_to: None,
        remove_after_publish_to: false,
    }
}

// ---------------------------------------------------------------------------
// Insert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn insert_applies_defaults_and_normalization(pool: PgPool) {
    let mut dto = new_item("Fresh news");
    dto.keywords = Some(" intranet , bob's news ".to_string());

    let item = ContentRepo::insert(&pool, &dto).await.unwrap();

    assert_eq!(item.content_type, "intranet.newsitem");
    assert_eq!(item.title, "Fresh news");
    assert_eq!(item.keywords.as_deref(), Some("intranet,bobs news"));
    assert_eq!(item.state, states::PUBLIC);
    assert_eq!(item.creator_id, Some(1));
    assert_eq!(item.changed_by_id, Some(1));
    assert!(!item.publish_notified);
    assert!(!item.unpublish_notified);
}

#[sqlx::test(migrations = "./migrations")]
async fn find_by_subject_requires_matching_type(pool: PgPool) {
    let item = ContentRepo::insert(&pool, &new_item("Typed lookup")).await.unwrap();
    let subject = item.subject();

    assert!(ContentRepo::find_by_subject(&pool, &subject)
        .await
        .unwrap()
        .is_some());

    let wrong_type = atrium_core::history::SubjectRef::new("intranet.event", item.id);
    assert!(ContentRepo::find_by_subject(&pool, &wrong_type)
        .await
        .unwrap()
        .is_none());
    assert!(!ContentRepo::exists(&pool, &wrong_type).await.unwrap());
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn update_patches_only_given_fields(pool: PgPool) {
    let item = ContentRepo::insert(&pool, &new_item("Before edit")).await.unwrap();

    let dto = UpdateContentItem {
        title: Some("After edit".to_string()),
        changed_by_id: Some(2),
        ..Default::default()
    };
    let updated = ContentRepo::update(&pool, item.id, &dto)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "After edit");
    assert_eq!(updated.changed_by_id, Some(2));
    assert_eq!(updated.creator_id, Some(1));
    assert_eq!(updated.state, states::PUBLIC);
    assert!(updated.updated_at >= item.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_of_missing_row_returns_none(pool: PgPool) {
    let dto = UpdateContentItem {
        title: Some("Ghost".to_string()),
        ..Default::default()
    };
    assert!(ContentRepo::update(&pool, 4242, &dto).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn set_publish_window_can_clear_bounds(pool: PgPool) {
    let now = Utc::now();
    let mut dto = new_item("Windowed");
    dto.publish_from = Some(now + Duration::days(1));
    let item = ContentRepo::insert(&pool, &dto).await.unwrap();
    assert!(item.publish_from.is_some());

    let cleared = ContentRepo::set_publish_window(&pool, item.id, None, None)
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.publish_from.is_none());
    assert!(cleared.publish_to.is_none());
}

// ---------------------------------------------------------------------------
// Notification flags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn mark_notified_sets_flags_without_touching_updated_at(pool: PgPool) {
    let item = ContentRepo::insert(&pool, &new_item("Flagged")).await.unwrap();
    let subject = item.subject();

    let affected = ContentRepo::mark_notified(&pool, &subject, Some(true), Some(false))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let fresh = ContentRepo::find(&pool, item.id).await.unwrap().unwrap();
    assert!(fresh.publish_notified);
    assert!(!fresh.unpublish_notified);
    assert_eq!(fresh.updated_at, item.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn mark_notified_on_missing_row_is_noop(pool: PgPool) {
    let subject = atrium_core::history::SubjectRef::new("intranet.newsitem", 4242);
    let affected = ContentRepo::mark_notified(&pool, &subject, Some(true), None)
        .await
        .unwrap();
    assert_eq!(affected, 0);
}

// ---------------------------------------------------------------------------
// Sweep queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn due_for_publish_picks_opened_unnotified_windows(pool: PgPool) {
    let now = Utc::now();

    let mut due = new_item("Window opened");
    due.publish_from = Some(now - Duration::hours(1));
    let due = ContentRepo::insert(&pool, &due).await.unwrap();

    let mut future = new_item("Window still closed");
    future.publish_from = Some(now + Duration::hours(1));
    ContentRepo::insert(&pool, &future).await.unwrap();

    let mut expired = new_item("Window already over");
    expired.publish_from = Some(now - Duration::hours(2));
    expired.publish_to = Some(now - Duration::hours(1));
    ContentRepo::insert(&pool, &expired).await.unwrap();

    // No publish_from at all: published on creation, never swept.
    ContentRepo::insert(&pool, &new_item("Open interval")).await.unwrap();

    let found = ContentRepo::due_for_publish(&pool, now).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, due.id);

    // Once notified, the row leaves the result set.
    ContentRepo::mark_notified(&pool, &due.subject(), Some(true), None)
        .await
        .unwrap();
    assert!(ContentRepo::due_for_publish(&pool, now).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn due_for_unpublish_picks_closed_unnotified_windows(pool: PgPool) {
    let now = Utc::now();

    let mut closed = new_item("Window closed");
    closed.publish_to = Some(now - Duration::hours(1));
    let closed = ContentRepo::insert(&pool, &closed).await.unwrap();

    let mut open = new_item("Window open");
    open.publish_to = Some(now + Duration::hours(1));
    ContentRepo::insert(&pool, &open).await.unwrap();

    let found = ContentRepo::due_for_unpublish(&pool, now).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, closed.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn due_for_removal_requires_flag_and_expiry(pool: PgPool) {
    let now = Utc::now();

    let mut removable = new_item("Remove me");
    removable.publish_to = Some(now - Duration::hours(1));
    removable.remove_after_publish_to = true;
    let removable = ContentRepo::insert(&pool, &removable).await.unwrap();

    let mut keep = new_item("Keep me");
    keep.publish_to = Some(now - Duration::hours(1));
    ContentRepo::insert(&pool, &keep).await.unwrap();

    let found = ContentRepo::due_for_removal(&pool, now).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, removable.id);

    assert!(ContentRepo::delete(&pool, &removable.subject()).await.unwrap());
    assert!(ContentRepo::due_for_removal(&pool, now).await.unwrap().is_empty());
}
