use std::sync::Arc;

use reelnotes_be::db::{
    JsonStore, Store,
    comment::{
        delete::delete_comment,
        get::{get_all_comments, get_comments_for_media},
        post::create_comment,
    },
    guestbook::get::get_guestbook_entries,
};

const LEGACY_COMMENTS: &str = r#"[
  {
    "id": "1718000000000",
    "mediaTitle": "Alien",
    "author": "Ripley",
    "text": "In space no one can hear you scream.",
    "timestamp": "2024-06-10T06:13:20.000Z"
  }
]"#;

async fn open_store(dir: &tempfile::TempDir) -> Store {
    Arc::new(JsonStore::open(dir.path()).await.unwrap())
}

#[tokio::test]
async fn test_comments_with_timestamp_ids_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("comments.json"), LEGACY_COMMENTS).unwrap();
    let store = open_store(&dir).await;

    let all = get_all_comments(&store).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "1718000000000");
    assert_eq!(all[0].author, "Ripley");

    let for_alien = get_comments_for_media("Alien", &store).await.unwrap();
    assert_eq!(for_alien.len(), 1);
}

#[tokio::test]
async fn test_old_and_new_comments_coexist() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("comments.json"), LEGACY_COMMENTS).unwrap();
    let store = open_store(&dir).await;

    let created = create_comment("Alien", "Dallas", "Get out of the vents", &store)
        .await
        .unwrap();
    assert!(uuid::Uuid::parse_str(&created.id).is_ok());

    let all = get_all_comments(&store).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, "1718000000000");
    assert_eq!(all[1].id, created.id);

    delete_comment("1718000000000", &store).await.unwrap();
    let remaining = get_all_comments(&store).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, created.id);
}

#[tokio::test]
async fn test_unreadable_comment_fails_the_listing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("comments.json"),
        r#"[{"id": "1", "mediaTitle": "Alien", "author": "Ash", "timestamp": "yesterday"}]"#,
    )
    .unwrap();
    let store = open_store(&dir).await;

    let err = get_all_comments(&store).await.unwrap_err();
    assert!(err.is_storage());
}

#[tokio::test]
async fn test_unreadable_guestbook_entry_fails_the_listing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("guestbook.json"),
        r#"[{"id": 7, "name": "Kane", "message": "hi", "timestamp": "2024-06-10T06:13:20.000Z"}]"#,
    )
    .unwrap();
    let store = open_store(&dir).await;

    let err = get_guestbook_entries(&store).await.unwrap_err();
    assert!(err.is_storage());
}
