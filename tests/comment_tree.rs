mod common;

use sea_orm::{EntityTrait, PaginatorTrait};

use tsuzuri::entities::article::ArticleStatus;
use tsuzuri::entities::comment;
use tsuzuri::entities::comment_moderation_log::ModerationAction;
use tsuzuri::entities::comment_report::ReportReason;
use tsuzuri::entities::user::Role;
use tsuzuri::models::article_model::UpdateArticleRequest;
use tsuzuri::models::comment_model::{
    CommentFilterParams, CreateCommentRequest, ReportCommentRequest, UpdateCommentRequest,
};
use tsuzuri::services::article_service::ArticleService;
use tsuzuri::services::comment_service::CommentService;
use tsuzuri::services::moderation_service::ModerationService;
use uuid::Uuid;

use common::{client, new_article, setup};

fn reply(article: Uuid, parent: Option<Uuid>, content: &str) -> CreateCommentRequest {
    CreateCommentRequest {
        article,
        parent,
        content: content.to_string(),
    }
}

#[tokio::test]
async fn draft_rejects_comments_until_published() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;
    let draft = app.article(&editor, "Work in progress", ArticleStatus::Draft).await?;

    let err = CommentService::create_comment(
        &app.db,
        &app.policy,
        &reader,
        reply(draft.summary.id, None, "first!"),
        &client("10.0.0.1"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "ARTICLE_NOT_PUBLISHED");

    ArticleService::update_article(
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

    let pending = CommentService::create_comment(
        &app.db,
        &app.policy,
        &reader,
        reply(draft.summary.id, None, "first!"),
        &client("10.0.0.1"),
    )
    .await?;
    assert!(!pending.is_approved);
    assert_eq!(pending.depth, 0);

    let approved = CommentService::create_comment(
        &app.db,
        &app.policy,
        &editor,
        reply(draft.summary.id, None, "thanks for reading"),
        &client("10.0.0.2"),
    )
    .await?;
    assert!(approved.is_approved);

    let stored = comment::Entity::find().all(&app.db).await?;
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|c| c.ip_address.is_some()));
    Ok(())
}

#[tokio::test]
async fn comments_disabled_creates_nothing() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let mut payload = new_article("Quiet post", ArticleStatus::Published);
    payload.allow_comments = Some(false);
    let quiet = ArticleService::create_article(&app.db, &app.policy, &editor, payload).await?;

    let err = CommentService::create_comment(
        &app.db,
        &app.policy,
        &editor,
        reply(quiet.summary.id, None, "hello"),
        &client("10.0.0.1"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "COMMENTS_DISABLED");
    assert_eq!(comment::Entity::find().count(&app.db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn depth_is_capped_at_three() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let post = app.article(&editor, "Threads", ArticleStatus::Published).await?;
    let article = post.summary.id;
    let ip = client("10.0.0.1");

    let root = CommentService::create_comment(&app.db, &app.policy, &editor, reply(article, None, "0"), &ip).await?;
    let one = CommentService::create_comment(&app.db, &app.policy, &editor, reply(article, Some(root.id), "1"), &ip).await?;
    let two = CommentService::create_comment(&app.db, &app.policy, &editor, reply(article, Some(one.id), "2"), &ip).await?;
    let three = CommentService::create_comment(&app.db, &app.policy, &editor, reply(article, Some(two.id), "3"), &ip).await?;

    assert_eq!((root.depth, one.depth, two.depth, three.depth), (0, 1, 2, 3));
    assert!(two.can_reply);
    assert!(!three.can_reply);
    assert_eq!(three.parent, Some(two.id));

    let err = CommentService::create_comment(&app.db, &app.policy, &editor, reply(article, Some(three.id), "4"), &ip)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "COMMENT_DEPTH_EXCEEDED");

    let thread = CommentService::list_article_comments(&app.db, &app.policy, None, article).await?;
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].replies[0].replies[0].replies[0].id, three.id);
    Ok(())
}

#[tokio::test]
async fn parent_must_belong_to_same_article() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let first = app.article(&editor, "First", ArticleStatus::Published).await?;
    let second = app.article(&editor, "Second", ArticleStatus::Published).await?;
    let ip = client("10.0.0.1");

    let root = CommentService::create_comment(&app.db, &app.policy, &editor, reply(first.summary.id, None, "a"), &ip).await?;
    let err = CommentService::create_comment(
        &app.db,
        &app.policy,
        &editor,
        reply(second.summary.id, Some(root.id), "b"),
        &ip,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "PARENT_ARTICLE_MISMATCH");
    Ok(())
}

#[tokio::test]
async fn readers_see_only_approved_replies() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;
    let post = app.article(&editor, "Moderated", ArticleStatus::Published).await?;
    let article = post.summary.id;
    let ip = client("10.0.0.1");

    let root = CommentService::create_comment(&app.db, &app.policy, &editor, reply(article, None, "root"), &ip).await?;
    let pending = CommentService::create_comment(&app.db, &app.policy, &reader, reply(article, Some(root.id), "pending"), &ip).await?;

    let thread = CommentService::list_article_comments(&app.db, &app.policy, None, article).await?;
    assert_eq!(thread[0].reply_count, 0);

    let listed = CommentService::list_comments(&app.db, &app.policy, None, CommentFilterParams::default()).await?;
    assert_eq!(listed.meta.total, 1);

    let as_moderator =
        CommentService::list_comments(&app.db, &app.policy, Some(&editor), CommentFilterParams::default()).await?;
    assert_eq!(as_moderator.meta.total, 2);

    ModerationService::approve_comment(&app.db, &app.policy, &editor, pending.id, None).await?;
    let thread = CommentService::list_article_comments(&app.db, &app.policy, None, article).await?;
    assert_eq!(thread[0].replies.len(), 1);
    Ok(())
}

#[tokio::test]
async fn spam_is_terminal_and_logged() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;
    let post = app.article(&editor, "Spam target", ArticleStatus::Published).await?;

    let c = CommentService::create_comment(
        &app.db,
        &app.policy,
        &editor,
        reply(post.summary.id, None, "buy now"),
        &client("10.0.0.1"),
    )
    .await?;
    assert!(c.is_approved);

    let err = ModerationService::mark_spam(&app.db, &app.policy, &reader, c.id, None).await.unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");

    let spam = ModerationService::mark_spam(&app.db, &app.policy, &editor, c.id, Some("link farm".into())).await?;
    assert!(spam.is_spam);
    assert!(!spam.is_approved);

    let err = ModerationService::approve_comment(&app.db, &app.policy, &editor, c.id, None).await.unwrap_err();
    assert_eq!(err.code(), "COMMENT_IS_SPAM");
    let stored = CommentService::find_by_public_id(&app.db, c.id).await?;
    assert!(stored.is_spam);
    assert!(!stored.is_approved);

    let history = ModerationService::moderation_history(&app.db, &app.policy, &editor, c.id).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, ModerationAction::MarkedSpam);
    assert_eq!(history[0].reason.as_deref(), Some("link farm"));
    Ok(())
}

#[tokio::test]
async fn reports_are_unique_and_resolution_is_terminal() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;
    let post = app.article(&editor, "Reported", ArticleStatus::Published).await?;
    let c = CommentService::create_comment(
        &app.db,
        &app.policy,
        &editor,
        reply(post.summary.id, None, "controversial"),
        &client("10.0.0.1"),
    )
    .await?;

    let report = || ReportCommentRequest {
        reason: ReportReason::Harassment,
        description: Some("rude".into()),
    };
    let filed = ModerationService::report_comment(&app.db, &app.policy, &reader, c.id, report()).await?;
    assert!(!filed.is_resolved);

    let err = ModerationService::report_comment(&app.db, &app.policy, &reader, c.id, report()).await.unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_REPORT");

    let err = ModerationService::resolve_report(&app.db, &app.policy, &reader, filed.id).await.unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");

    let resolved = ModerationService::resolve_report(&app.db, &app.policy, &editor, filed.id).await?;
    assert!(resolved.is_resolved);
    assert_eq!(resolved.resolved_by.as_deref(), Some("editor"));
    assert!(resolved.resolved_at.is_some());

    let err = ModerationService::resolve_report(&app.db, &app.policy, &editor, filed.id).await.unwrap_err();
    assert_eq!(err.code(), "REPORT_ALREADY_RESOLVED");

    let history = ModerationService::moderation_history(&app.db, &app.policy, &editor, c.id).await?;
    let resolutions = history.iter().filter(|h| h.action == ModerationAction::ReportResolved).count();
    assert_eq!(resolutions, 1);
    Ok(())
}

#[tokio::test]
async fn edits_and_cascading_deletes() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;
    let other = app.user("other", Role::Reader).await?;
    let post = app.article(&editor, "Editable", ArticleStatus::Published).await?;
    let article = post.summary.id;
    let ip = client("10.0.0.1");

    let root = CommentService::create_comment(&app.db, &app.policy, &reader, reply(article, None, "typo"), &ip).await?;
    CommentService::create_comment(&app.db, &app.policy, &editor, reply(article, Some(root.id), "child"), &ip).await?;

    let err = CommentService::update_comment(
        &app.db,
        &app.policy,
        &other,
        root.id,
        UpdateCommentRequest { content: "hijack".into() },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");

    let edited = CommentService::update_comment(
        &app.db,
        &app.policy,
        &reader,
        root.id,
        UpdateCommentRequest { content: "fixed".into() },
    )
    .await?;
    assert!(edited.is_edited);
    assert!(edited.edited_at.is_some());
    assert_eq!(edited.content, "fixed");

    // moderators may edit someone else's comment, which lands in the log
    let moderated = CommentService::update_comment(
        &app.db,
        &app.policy,
        &editor,
        root.id,
        UpdateCommentRequest { content: "fixed [edited by staff]".into() },
    )
    .await?;
    assert_eq!(moderated.content, "fixed [edited by staff]");

    CommentService::delete_comment(&app.db, &app.policy, &editor, root.id).await?;
    assert_eq!(comment::Entity::find().count(&app.db).await?, 0);

    let history = ModerationService::moderation_history(&app.db, &app.policy, &editor, root.id).await?;
    let actions: Vec<ModerationAction> = history.iter().map(|h| h.action).collect();
    assert_eq!(actions, vec![ModerationAction::Edited, ModerationAction::Deleted]);
    Ok(())
}
