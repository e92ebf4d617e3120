//! Role based authorization.
//!
//! Every permission check in the service layer goes through
//! [`PolicyEngine::authorize`]. Rules are `(role, object, action, scope)`
//! where scope is `any` or `own`; a request is in `own` scope when the
//! actor owns the target resource. Roles inherit downwards:
//! admin > editor > reader.

use std::sync::Arc;

use casbin::{CoreApi, DefaultModel, Enforcer, MemoryAdapter, MgmtApi};

use crate::entities::user::Role;
use crate::models::auth_model::CurrentUser;
use crate::utils::app_error::AppError;

const MODEL: &str = include_str!("rbac_model.conf");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    /// Read content that is not public, such as drafts.
    Read,
    Update,
    Delete,
    Publish,
    Feature,
    Like,
    Report,
    Moderate,
    ViewAnalytics,
    Manage,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Publish => "publish",
            Action::Feature => "feature",
            Action::Like => "like",
            Action::Report => "report",
            Action::Moderate => "moderate",
            Action::ViewAnalytics => "view_analytics",
            Action::Manage => "manage",
        }
    }
}

/// Target of a permission check. Owned resources carry their owner's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Article { author_id: i64 },
    /// Any article, used for list-level checks.
    Articles,
    Comment { author_id: i64 },
    Comments,
    Tag,
    User,
    Site,
}

impl Resource {
    fn object(&self) -> &'static str {
        match self {
            Resource::Article { .. } | Resource::Articles => "article",
            Resource::Comment { .. } | Resource::Comments => "comment",
            Resource::Tag => "tag",
            Resource::User => "user",
            Resource::Site => "site",
        }
    }

    fn owner(&self) -> Option<i64> {
        match self {
            Resource::Article { author_id } | Resource::Comment { author_id } => Some(*author_id),
            _ => None,
        }
    }
}

const POLICIES: &[(&str, &str, &str, &str)] = &[
    // reader
    ("reader", "article", "like", "any"),
    ("reader", "article", "read", "own"),
    ("reader", "article", "update", "own"),
    ("reader", "article", "delete", "own"),
    ("reader", "article", "view_analytics", "own"),
    ("reader", "comment", "create", "any"),
    ("reader", "comment", "like", "any"),
    ("reader", "comment", "report", "any"),
    ("reader", "comment", "update", "own"),
    ("reader", "comment", "delete", "own"),
    // editor
    ("editor", "article", "create", "any"),
    ("editor", "article", "read", "any"),
    ("editor", "article", "update", "any"),
    ("editor", "article", "publish", "any"),
    ("editor", "article", "feature", "any"),
    ("editor", "article", "view_analytics", "any"),
    ("editor", "comment", "moderate", "any"),
    ("editor", "comment", "update", "any"),
    ("editor", "comment", "delete", "any"),
    ("editor", "tag", "create", "any"),
    // admin
    ("admin", "article", "delete", "any"),
    ("admin", "tag", "update", "any"),
    ("admin", "tag", "delete", "any"),
    ("admin", "user", "manage", "any"),
    ("admin", "site", "view_analytics", "any"),
];

const ROLE_HIERARCHY: &[(&str, &str)] = &[("admin", "editor"), ("editor", "reader")];

#[derive(Clone)]
pub struct PolicyEngine {
    enforcer: Arc<Enforcer>,
}

impl PolicyEngine {
    pub async fn new() -> Result<Self, casbin::Error> {
        let model = DefaultModel::from_str(MODEL).await?;
        let mut enforcer = Enforcer::new(model, MemoryAdapter::default()).await?;

        let rules = POLICIES
            .iter()
            .map(|(sub, obj, act, scope)| vec![sub.to_string(), obj.to_string(), act.to_string(), scope.to_string()])
            .collect();
        enforcer.add_policies(rules).await?;

        let groups = ROLE_HIERARCHY
            .iter()
            .map(|(child, parent)| vec![child.to_string(), parent.to_string()])
            .collect();
        enforcer.add_grouping_policies(groups).await?;

        tracing::info!("Policy engine loaded with {} rules", POLICIES.len());
        Ok(Self {
            enforcer: Arc::new(enforcer),
        })
    }

    pub fn role_allows(&self, role: Role, action: Action, resource: &Resource, owns: bool) -> bool {
        let scope = if owns { "own" } else { "other" };
        match self
            .enforcer
            .enforce((role.as_str(), resource.object(), action.as_str(), scope))
        {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::error!("Policy evaluation failed: {}", e);
                false
            }
        }
    }

    pub fn is_allowed(&self, actor: &CurrentUser, action: Action, resource: &Resource) -> bool {
        let owns = resource.owner() == Some(actor.id);
        self.role_allows(actor.role, action, resource, owns)
    }

    pub fn authorize(&self, actor: &CurrentUser, action: Action, resource: &Resource) -> Result<(), AppError> {
        if self.is_allowed(actor, action, resource) {
            Ok(())
        } else {
            tracing::warn!(
                "Denied {} on {} for user {} ({})",
                action.as_str(),
                resource.object(),
                actor.public_id,
                actor.role
            );
            Err(AppError::forbidden(format!(
                "You do not have permission to {} this {}",
                action.as_str().replace('_', " "),
                resource.object()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn actor(id: i64, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            public_id: Uuid::now_v7(),
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            role,
            session: None,
        }
    }

    #[tokio::test]
    async fn roles_inherit_downwards() {
        let policy = PolicyEngine::new().await.unwrap();
        let admin = actor(1, Role::Admin);
        let editor = actor(2, Role::Editor);
        let reader = actor(3, Role::Reader);

        for who in [&admin, &editor, &reader] {
            assert!(policy.is_allowed(who, Action::Create, &Resource::Comments));
            assert!(policy.is_allowed(who, Action::Like, &Resource::Articles));
        }
        assert!(policy.is_allowed(&admin, Action::Moderate, &Resource::Comments));
        assert!(policy.is_allowed(&editor, Action::Moderate, &Resource::Comments));
        assert!(!policy.is_allowed(&reader, Action::Moderate, &Resource::Comments));
    }

    #[tokio::test]
    async fn ownership_scopes_are_respected() {
        let policy = PolicyEngine::new().await.unwrap();
        let editor = actor(2, Role::Editor);
        let own = Resource::Article { author_id: 2 };
        let theirs = Resource::Article { author_id: 9 };

        assert!(policy.is_allowed(&editor, Action::Update, &theirs));
        assert!(policy.is_allowed(&editor, Action::Delete, &own));
        assert!(!policy.is_allowed(&editor, Action::Delete, &theirs));

        let reader = actor(3, Role::Reader);
        assert!(policy.is_allowed(&reader, Action::Update, &Resource::Comment { author_id: 3 }));
        assert!(!policy.is_allowed(&reader, Action::Update, &Resource::Comment { author_id: 4 }));
        assert!(policy.is_allowed(&editor, Action::Update, &Resource::Comment { author_id: 4 }));
        assert!(!policy.is_allowed(&reader, Action::Delete, &Resource::Comment { author_id: 4 }));
        assert!(policy.is_allowed(&editor, Action::Delete, &Resource::Comment { author_id: 4 }));
    }

    #[tokio::test]
    async fn role_helpers_agree_with_policy() {
        let policy = PolicyEngine::new().await.unwrap();
        for role in [Role::Admin, Role::Editor, Role::Reader] {
            let who = actor(10, role);
            assert_eq!(
                role.can_publish(),
                policy.is_allowed(&who, Action::Publish, &Resource::Articles)
            );
            assert_eq!(
                role.can_delete_others_posts(),
                policy.is_allowed(&who, Action::Delete, &Resource::Article { author_id: 11 })
            );
            assert_eq!(role.is_admin(), policy.is_allowed(&who, Action::Manage, &Resource::User));
            assert_eq!(role.is_editor(), policy.is_allowed(&who, Action::Moderate, &Resource::Comments));
        }
    }

    #[tokio::test]
    async fn authorize_returns_forbidden() {
        let policy = PolicyEngine::new().await.unwrap();
        let reader = actor(3, Role::Reader);
        let err = policy
            .authorize(&reader, Action::ViewAnalytics, &Resource::Site)
            .unwrap_err();
        assert_eq!(err.code(), "PERMISSION_DENIED");
    }
}
