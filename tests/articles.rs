mod common;

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::{NotSet, Set}, EntityTrait, IntoActiveModel, PaginatorTrait};

use tsuzuri::entities::article::{self, ArticleStatus};
use tsuzuri::entities::user::Role;
use tsuzuri::models::article_model::{
    ArticleFeed, ArticleFilterParams, CreateTagRequest, UpdateArticleRequest,
};
use tsuzuri::services::article_service::ArticleService;
use tsuzuri::services::tag_service::TagService;
use uuid::Uuid;

use common::{client, new_article, setup};

#[tokio::test]
async fn slugs_are_derived_and_deduplicated() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;

    let first = app.article(&editor, "Hello World", ArticleStatus::Draft).await?;
    let second = app.article(&editor, "Hello, World!", ArticleStatus::Draft).await?;
    let third = app.article(&editor, "hello world", ArticleStatus::Draft).await?;
    assert_eq!(first.summary.slug, "hello-world");
    assert_eq!(second.summary.slug, "hello-world-2");
    assert_eq!(third.summary.slug, "hello-world-3");

    let mut explicit = new_article("Another", ArticleStatus::Draft);
    explicit.slug = Some("hello-world".into());
    let err = ArticleService::create_article(&app.db, &app.policy, &editor, explicit)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SLUG_TAKEN");

    let symbols = app.article(&editor, "!!!", ArticleStatus::Draft).await?;
    assert!(symbols.summary.slug.starts_with("article-"));
    Ok(())
}

#[tokio::test]
async fn slug_race_on_write_is_reported_as_taken() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let first = app.article(&editor, "Hello World", ArticleStatus::Draft).await?;

    // a row written behind the service's back with a slug that is already used
    let stored = ArticleService::find_by_public_id(&app.db, first.summary.id).await?;
    let mut dup = stored.into_active_model().reset_all();
    dup.id = NotSet;
    dup.public_id = Set(Uuid::now_v7());
    let db_err = dup.insert(&app.db).await.unwrap_err();

    let err = ArticleService::slug_conflict(db_err);
    assert_eq!(err.code(), "SLUG_TAKEN");
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn seo_defaults_and_publish_timestamp() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let title = "A".repeat(80);

    let draft = app.article(&editor, &title, ArticleStatus::Draft).await?;
    assert_eq!(draft.seo.meta_title.as_deref().map(|t| t.chars().count()), Some(60));
    assert!(draft.summary.published_at.is_none());

    let published = ArticleService::update_article(
        &app.db,
        &app.policy,
        &editor,
        draft.summary.id,
        UpdateArticleRequest {
            status: Some(ArticleStatus::Published),
            ..Default::default()
        },
    )
    .await?;
    let stamped = published.summary.published_at.expect("published_at set on publish");

    let back = ArticleService::update_article(
        &app.db,
        &app.policy,
        &editor,
        draft.summary.id,
        UpdateArticleRequest {
            status: Some(ArticleStatus::Draft),
            ..Default::default()
        },
    )
    .await?;
    let again = ArticleService::update_article(
        &app.db,
        &app.policy,
        &editor,
        back.summary.id,
        UpdateArticleRequest {
            status: Some(ArticleStatus::Published),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(again.summary.published_at, Some(stamped));
    Ok(())
}

#[tokio::test]
async fn scheduling_needs_a_date() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;

    let err = ArticleService::create_article(
        &app.db,
        &app.policy,
        &editor,
        new_article("Later", ArticleStatus::Scheduled),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "SCHEDULE_REQUIRES_DATE");

    let mut payload = new_article("Later", ArticleStatus::Scheduled);
    payload.published_at = Some(Utc::now() + Duration::days(3));
    let scheduled = ArticleService::create_article(&app.db, &app.policy, &editor, payload).await?;
    assert_eq!(scheduled.summary.status, ArticleStatus::Scheduled);

    let err = ArticleService::get_article(&app.db, &app.policy, None, scheduled.summary.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ARTICLE_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn drafts_are_private_to_their_author_and_editors() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let other = app.user("other", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;

    let draft = app.article(&editor, "Unfinished", ArticleStatus::Draft).await?;
    app.article(&editor, "Finished", ArticleStatus::Published).await?;

    let err = ArticleService::get_article(&app.db, &app.policy, Some(&reader), draft.summary.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ARTICLE_NOT_FOUND");
    ArticleService::get_article(&app.db, &app.policy, Some(&other), draft.summary.id).await?;

    let anonymous = ArticleService::list_articles(&app.db, &app.policy, None, ArticleFilterParams::default()).await?;
    assert_eq!(anonymous.meta.total, 1);
    let as_reader =
        ArticleService::list_articles(&app.db, &app.policy, Some(&reader), ArticleFilterParams::default()).await?;
    assert_eq!(as_reader.meta.total, 1);
    let as_editor =
        ArticleService::list_articles(&app.db, &app.policy, Some(&other), ArticleFilterParams::default()).await?;
    assert_eq!(as_editor.meta.total, 2);

    let err = ArticleService::get_published_by_slug(&app.db, None, &draft.summary.slug, &client("10.0.0.1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ARTICLE_NOT_FOUND");
    ArticleService::get_published_by_slug(&app.db, None, "finished", &client("10.0.0.1")).await?;
    Ok(())
}

#[tokio::test]
async fn readers_cannot_author_articles() -> anyhow::Result<()> {
    let app = setup().await?;
    let reader = app.user("reader", Role::Reader).await?;

    let err = ArticleService::create_article(
        &app.db,
        &app.policy,
        &reader,
        new_article("Mine", ArticleStatus::Published),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");
    assert_eq!(err.status_code().as_u16(), 403);
    Ok(())
}

#[tokio::test]
async fn tags_resolve_or_fail_the_whole_write() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let rust = TagService::create_tag(
        &app.db,
        &app.policy,
        &editor,
        CreateTagRequest {
            name: "Rust Tips".into(),
            description: None,
            color: None,
        },
    )
    .await?;
    assert_eq!(rust.slug, "rust-tips");

    let mut payload = new_article("Tagged", ArticleStatus::Published);
    payload.tags = Some(vec![rust.id, rust.id]);
    let tagged = ArticleService::create_article(&app.db, &app.policy, &editor, payload).await?;
    assert_eq!(tagged.summary.tags.len(), 1);

    let mut payload = new_article("Broken", ArticleStatus::Published);
    payload.tags = Some(vec![rust.id, Uuid::now_v7()]);
    let err = ArticleService::create_article(&app.db, &app.policy, &editor, payload)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TAG_NOT_FOUND");
    assert_eq!(article::Entity::find().count(&app.db).await?, 1);

    let by_tag = ArticleService::list_published(
        &app.db,
        None,
        ArticleFilterParams {
            tag: Some("rust-tips".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(by_tag.items.len(), 1);
    assert_eq!(by_tag.items[0].id, tagged.summary.id);

    let tags = TagService::list_tags(&app.db).await?;
    assert_eq!(tags[0].article_count, 1);
    Ok(())
}

#[tokio::test]
async fn feeds_and_flags() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;
    let a = app.article(&editor, "Alpha", ArticleStatus::Published).await?;
    let b = app.article(&editor, "Beta", ArticleStatus::Published).await?;
    app.article(&editor, "Gamma", ArticleStatus::Draft).await?;

    let err = ArticleService::toggle_featured(&app.db, &app.policy, &reader, a.summary.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");

    let featured = ArticleService::toggle_featured(&app.db, &app.policy, &editor, a.summary.id).await?;
    assert!(featured.summary.is_featured);
    ArticleService::toggle_pinned(&app.db, &app.policy, &editor, b.summary.id).await?;

    let list = ArticleService::list_feed(&app.db, None, ArticleFeed::Featured).await?;
    assert_eq!(list.iter().map(|s| s.id).collect::<Vec<_>>(), vec![a.summary.id]);

    let recent = ArticleService::list_feed(&app.db, None, ArticleFeed::Recent).await?;
    assert_eq!(recent.len(), 2);

    let public = ArticleService::list_published(&app.db, None, ArticleFilterParams::default()).await?;
    assert_eq!(public.items[0].id, b.summary.id);

    let unfeatured = ArticleService::toggle_featured(&app.db, &app.policy, &editor, a.summary.id).await?;
    assert!(!unfeatured.summary.is_featured);
    Ok(())
}

#[tokio::test]
async fn deletion_respects_ownership() -> anyhow::Result<()> {
    let app = setup().await?;
    let admin = app.user("admin", Role::Admin).await?;
    let editor = app.user("editor", Role::Editor).await?;
    let other = app.user("other", Role::Editor).await?;
    let mine = app.article(&editor, "Mine", ArticleStatus::Draft).await?;
    let theirs = app.article(&other, "Theirs", ArticleStatus::Draft).await?;

    let err = ArticleService::delete_article(&app.db, &app.policy, &editor, theirs.summary.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");

    ArticleService::delete_article(&app.db, &app.policy, &editor, mine.summary.id).await?;
    ArticleService::delete_article(&app.db, &app.policy, &admin, theirs.summary.id).await?;
    assert_eq!(article::Entity::find().count(&app.db).await?, 0);
    Ok(())
}
