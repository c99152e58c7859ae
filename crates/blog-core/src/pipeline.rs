//! Per-route access pipeline.
//!
//! A [`Chain`] names what a route needs; [`AccessPipeline::execute`] runs the
//! matching stages in a fixed order and stops at the first failure:
//!
//! 1. authenticate (mandatory, optional or not at all)
//! 2. resolve the post, then the comment nested under it
//! 3. reject tombstones on the delete route
//! 4. authorize the action against the resolved resource
//! 5. validate the request input
//!
//! The order decides which error a caller sees when several apply, so a
//! request that is both unauthorized and malformed is answered with 403 and
//! its body is never looked at.

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::domain::{Comment, Owned, Post, Principal};
use crate::error::DomainError;
use crate::policy::{self, Action};
use crate::ports::{CommentRepository, PostRepository, TokenService, UserRepository};
use crate::resolver::ResourceResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No header is an error.
    Required,
    /// No header means an anonymous caller.
    Optional,
    /// The header is not looked at.
    Anonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostLookup {
    /// Only live posts; tombstones are not found.
    Visible,
    /// Tombstones are found, then rejected before authorization.
    ForDeletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticate(AuthMode),
    ResolvePost { post_id: i32, lookup: PostLookup },
    ResolveComment { comment_id: i32 },
    RejectTombstone,
    Authorize(Action),
    Validate,
}

/// Declarative description of a route's access requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    auth: AuthMode,
    post: Option<(i32, PostLookup)>,
    comment: Option<i32>,
    action: Option<Action>,
}

impl Chain {
    fn with_auth(auth: AuthMode) -> Self {
        Self {
            auth,
            post: None,
            comment: None,
            action: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::with_auth(AuthMode::Anonymous)
    }

    pub fn authenticated() -> Self {
        Self::with_auth(AuthMode::Required)
    }

    pub fn optionally_authenticated() -> Self {
        Self::with_auth(AuthMode::Optional)
    }

    pub fn post(mut self, post_id: i32) -> Self {
        self.post = Some((post_id, PostLookup::Visible));
        self
    }

    pub fn post_for_deletion(mut self, post_id: i32) -> Self {
        self.post = Some((post_id, PostLookup::ForDeletion));
        self
    }

    /// Address a comment under its post. Both ids are needed to resolve it.
    pub fn comment(mut self, post_id: i32, comment_id: i32) -> Self {
        self.post = Some((post_id, PostLookup::Visible));
        self.comment = Some(comment_id);
        self
    }

    /// Authorize `action` against the innermost resolved resource.
    pub fn authorize(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn updating(self) -> Self {
        self.authorize(Action::Update)
    }

    pub fn deleting(self) -> Self {
        self.authorize(Action::Delete)
    }

    /// The stages to run, always in pipeline order.
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::with_capacity(6);
        if self.auth != AuthMode::Anonymous {
            stages.push(Stage::Authenticate(self.auth));
        }
        if let Some((post_id, lookup)) = self.post {
            stages.push(Stage::ResolvePost { post_id, lookup });
            if let Some(comment_id) = self.comment {
                stages.push(Stage::ResolveComment { comment_id });
            }
            if lookup == PostLookup::ForDeletion {
                stages.push(Stage::RejectTombstone);
            }
        }
        if let Some(action) = self.action {
            stages.push(Stage::Authorize(action));
        }
        stages.push(Stage::Validate);
        stages
    }
}

/// Everything the earlier stages established about a request.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub principal: Option<Principal>,
    pub post: Option<Post>,
    pub comment: Option<Comment>,
}

impl Resolved {
    pub fn principal(&self) -> Result<&Principal, DomainError> {
        self.principal
            .as_ref()
            .ok_or_else(|| missing_context("principal"))
    }

    pub fn post(&self) -> Result<&Post, DomainError> {
        self.post.as_ref().ok_or_else(|| missing_context("post"))
    }

    pub fn comment(&self) -> Result<&Comment, DomainError> {
        self.comment.as_ref().ok_or_else(|| missing_context("comment"))
    }

    /// The resource an ownership check applies to: the innermost one.
    fn target(&self) -> Option<&dyn Owned> {
        match (&self.comment, &self.post) {
            (Some(comment), _) => Some(comment as &dyn Owned),
            (None, Some(post)) => Some(post as &dyn Owned),
            (None, None) => None,
        }
    }
}

fn missing_context(what: &str) -> DomainError {
    DomainError::Internal(format!("route chain did not resolve a {what}"))
}

/// A request that passed every stage, with its validated input.
#[derive(Debug, Clone)]
pub struct Admitted<T> {
    pub resolved: Resolved,
    pub input: T,
}

/// Runs route chains against the token codec and the stores.
#[derive(Clone)]
pub struct AccessPipeline {
    authenticator: Authenticator,
    resolver: ResourceResolver,
}

impl AccessPipeline {
    pub fn new(authenticator: Authenticator, resolver: ResourceResolver) -> Self {
        Self {
            authenticator,
            resolver,
        }
    }

    pub fn from_ports(
        tokens: Arc<dyn TokenService>,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self::new(
            Authenticator::new(tokens, users),
            ResourceResolver::new(posts, comments),
        )
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn resolver(&self) -> &ResourceResolver {
        &self.resolver
    }

    /// Run `chain` for a request carrying `authorization`, then hand the
    /// resolved context to `validate`.
    pub async fn execute<T, F>(
        &self,
        chain: &Chain,
        authorization: Option<&str>,
        validate: F,
    ) -> Result<Admitted<T>, DomainError>
    where
        F: FnOnce(&Resolved) -> Result<T, DomainError>,
    {
        let mut resolved = Resolved::default();
        let mut validate = Some(validate);
        let mut input = None;

        for stage in chain.stages() {
            tracing::trace!(?stage, "running access stage");
            match stage {
                Stage::Validate => {
                    if let Some(validate) = validate.take() {
                        input = Some(validate(&resolved)?);
                    }
                }
                other => self.run_stage(other, authorization, &mut resolved).await?,
            }
        }

        let input = input.ok_or_else(|| missing_context("validated input"))?;
        Ok(Admitted { resolved, input })
    }

    /// Run `chain` for a route that takes no input.
    pub async fn admit(
        &self,
        chain: &Chain,
        authorization: Option<&str>,
    ) -> Result<Resolved, DomainError> {
        self.execute(chain, authorization, |_| Ok(()))
            .await
            .map(|admitted| admitted.resolved)
    }

    async fn run_stage(
        &self,
        stage: Stage,
        authorization: Option<&str>,
        resolved: &mut Resolved,
    ) -> Result<(), DomainError> {
        match stage {
            Stage::Authenticate(AuthMode::Required) => {
                let principal = self.authenticator.require(authorization).await?;
                tracing::debug!(user_id = principal.id, role = %principal.role, "authenticated");
                resolved.principal = Some(principal);
            }
            Stage::Authenticate(AuthMode::Optional) => {
                resolved.principal = self.authenticator.optional(authorization).await?;
            }
            Stage::Authenticate(AuthMode::Anonymous) => {}
            Stage::ResolvePost {
                post_id,
                lookup: PostLookup::Visible,
            } => {
                resolved.post = Some(self.resolver.resolve_post(post_id).await?);
            }
            Stage::ResolvePost {
                post_id,
                lookup: PostLookup::ForDeletion,
            } => {
                resolved.post = Some(self.resolver.resolve_post_for_deletion(post_id).await?);
            }
            Stage::ResolveComment { comment_id } => {
                let post_id = resolved.post()?.id;
                resolved.comment = Some(self.resolver.resolve_comment(comment_id, post_id).await?);
            }
            Stage::RejectTombstone => {
                let post = resolved.post()?;
                if post.is_deleted() {
                    return Err(DomainError::AlreadyDeleted {
                        entity: "Post",
                        id: post.id,
                    });
                }
            }
            Stage::Authorize(action) => {
                let target = resolved
                    .target()
                    .ok_or_else(|| missing_context("resource to authorize"))?;
                if let Err(err) = policy::authorize(resolved.principal.as_ref(), target, action) {
                    tracing::info!(
                        user_id = resolved.principal.as_ref().map(|p| p.id),
                        owner_id = target.owner_id(),
                        ?action,
                        "authorization denied"
                    );
                    return Err(err);
                }
            }
            Stage::Validate => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::domain::{NewComment, NewPost, NewUser, PostDraft, Role, User};
    use crate::error::RepoError;
    use crate::ports::{AuthError, TokenClaims};

    /// Tokens are `token-<id>`; anything else fails verification.
    struct FakeTokens;

    impl TokenService for FakeTokens {
        fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
            Ok(format!("token-{}", principal.id))
        }

        fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
            let id = token
                .strip_prefix("token-")
                .and_then(|id| id.parse().ok())
                .ok_or_else(|| AuthError::InvalidToken("bad signature".to_string()))?;
            Ok(TokenClaims {
                id,
                role: Role::User,
                email: String::new(),
                exp: 0,
            })
        }

        fn expiration_seconds(&self) -> i64 {
            60
        }
    }

    struct FakeUsers(HashMap<i32, User>);

    #[async_trait]
    impl UserRepository for FakeUsers {
        async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
            Ok(self.0.get(&id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            Ok(self.0.values().find(|u| u.email == email).cloned())
        }

        async fn create(&self, _user: NewUser) -> Result<User, RepoError> {
            Err(RepoError::Query("read-only".to_string()))
        }
    }

    struct FakePosts(Mutex<Vec<Post>>);

    #[async_trait]
    impl PostRepository for FakePosts {
        async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
            Ok(self.0.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn list_active(&self) -> Result<Vec<Post>, RepoError> {
            Ok(vec![])
        }

        async fn create(&self, _post: NewPost) -> Result<Post, RepoError> {
            Err(RepoError::Query("read-only".to_string()))
        }

        async fn update(&self, _id: i32, _draft: PostDraft) -> Result<Post, RepoError> {
            Err(RepoError::Query("read-only".to_string()))
        }

        async fn mark_deleted(&self, _id: i32) -> Result<Post, RepoError> {
            Err(RepoError::Query("read-only".to_string()))
        }
    }

    struct FakeComments(Vec<Comment>);

    #[async_trait]
    impl CommentRepository for FakeComments {
        async fn find_by_id(&self, id: i32, post_id: i32) -> Result<Option<Comment>, RepoError> {
            Ok(self
                .0
                .iter()
                .find(|c| c.id == id && c.post_id == post_id)
                .cloned())
        }

        async fn list_active(&self, _post_id: i32) -> Result<Vec<Comment>, RepoError> {
            Ok(vec![])
        }

        async fn create(&self, _comment: NewComment) -> Result<Comment, RepoError> {
            Err(RepoError::Query("read-only".to_string()))
        }

        async fn update(&self, _id: i32, _post_id: i32, _content: String) -> Result<Comment, RepoError> {
            Err(RepoError::Query("read-only".to_string()))
        }

        async fn mark_deleted(&self, _id: i32, _post_id: i32) -> Result<Comment, RepoError> {
            Err(RepoError::Query("read-only".to_string()))
        }
    }

    fn user(id: i32, role: Role) -> User {
        let now = Utc::now();
        User {
            id,
            email: format!("user{id}@example.com"),
            name: format!("User {id}"),
            role,
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn post(id: i32, author_id: i32, deleted: bool) -> Post {
        let now = Utc::now();
        Post {
            id,
            author_id,
            title: "Title".to_string(),
            content: "Content".to_string(),
            published: true,
            published_at: Some(now),
            deleted_at: deleted.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn comment(id: i32, post_id: i32, user_id: Option<i32>) -> Comment {
        let now = Utc::now();
        Comment {
            id,
            post_id,
            author_name: "Someone".to_string(),
            email: None,
            user_id,
            content: "Hi".to_string(),
            edited: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Users 1 (admin), 5 and 7. Post 10 by user 7, post 11 deleted, post 12 by user 5.
    /// Comment 100 by user 7 and guest comment 101 on post 10; comment 200 on post 12.
    fn pipeline() -> AccessPipeline {
        let users = [user(1, Role::Admin), user(5, Role::User), user(7, Role::User)]
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let posts = vec![post(10, 7, false), post(11, 7, true), post(12, 5, false)];
        let comments = vec![
            comment(100, 10, Some(7)),
            comment(101, 10, None),
            comment(200, 12, Some(5)),
        ];

        AccessPipeline::from_ports(
            Arc::new(FakeTokens),
            Arc::new(FakeUsers(users)),
            Arc::new(FakePosts(Mutex::new(posts))),
            Arc::new(FakeComments(comments)),
        )
    }

    fn bearer(id: i32) -> String {
        format!("Bearer token-{id}")
    }

    #[test]
    fn stages_follow_pipeline_order_whatever_the_builder_order() {
        let chain = Chain::authenticated().updating().comment(10, 100);
        assert_eq!(
            chain.stages(),
            vec![
                Stage::Authenticate(AuthMode::Required),
                Stage::ResolvePost {
                    post_id: 10,
                    lookup: PostLookup::Visible
                },
                Stage::ResolveComment { comment_id: 100 },
                Stage::Authorize(Action::Update),
                Stage::Validate,
            ]
        );

        let delete = Chain::authenticated().deleting().post_for_deletion(11);
        assert_eq!(
            &delete.stages()[2..],
            &[Stage::RejectTombstone, Stage::Authorize(Action::Delete), Stage::Validate]
        );
    }

    #[tokio::test]
    async fn required_auth_without_header_is_rejected() {
        let err = pipeline()
            .admit(&Chain::authenticated(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Unauthenticated(AuthError::MissingAuthHeader)
        ));
    }

    #[tokio::test]
    async fn optional_auth_without_header_is_anonymous() {
        let resolved = pipeline()
            .admit(&Chain::optionally_authenticated().post(10), None)
            .await
            .unwrap();
        assert!(resolved.principal.is_none());
        assert_eq!(resolved.post.unwrap().id, 10);
    }

    #[tokio::test]
    async fn optional_auth_still_rejects_a_bad_header() {
        let err = pipeline()
            .admit(&Chain::optionally_authenticated(), Some("Token abc"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Unauthenticated(AuthError::MalformedAuthHeader)
        ));

        let err = pipeline()
            .admit(&Chain::optionally_authenticated(), Some("Bearer forged"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Unauthenticated(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn vanished_user_is_an_invalid_token() {
        let err = pipeline()
            .admit(&Chain::authenticated(), Some(&bearer(99)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Unauthenticated(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn principal_comes_from_the_live_record() {
        let resolved = pipeline()
            .admit(&Chain::authenticated(), Some(&bearer(1)))
            .await
            .unwrap();
        assert_eq!(resolved.principal.unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn deleted_post_is_not_found() {
        let err = pipeline()
            .admit(&Chain::anonymous().post(11), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Post", id: 11 }));
    }

    #[tokio::test]
    async fn deleting_a_tombstone_is_a_conflict_for_any_caller() {
        let chain = Chain::authenticated().post_for_deletion(11).deleting();
        for id in [1, 5, 7] {
            let err = pipeline().admit(&chain, Some(&bearer(id))).await.unwrap_err();
            assert!(
                matches!(err, DomainError::AlreadyDeleted { entity: "Post", id: 11 }),
                "user {id} got {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn deleting_a_live_post_still_needs_ownership() {
        let chain = Chain::authenticated().post_for_deletion(10).deleting();
        let err = pipeline().admit(&chain, Some(&bearer(5))).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        let resolved = pipeline().admit(&chain, Some(&bearer(7))).await.unwrap();
        assert_eq!(resolved.post.unwrap().id, 10);
    }

    #[tokio::test]
    async fn reading_action_admits_anyone() {
        let chain = Chain::optionally_authenticated()
            .post(10)
            .authorize(Action::Read);
        let resolved = pipeline().admit(&chain, None).await.unwrap();
        assert!(resolved.principal.is_none());
    }

    #[tokio::test]
    async fn comment_under_another_post_is_not_found() {
        let chain = Chain::anonymous().comment(10, 200);
        let err = pipeline().admit(&chain, None).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Comment", id: 200 }));
    }

    #[tokio::test]
    async fn stranger_cannot_touch_a_comment_but_admin_can() {
        let chain = Chain::authenticated().comment(10, 100).updating();

        let err = pipeline().admit(&chain, Some(&bearer(5))).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        let resolved = pipeline().admit(&chain, Some(&bearer(1))).await.unwrap();
        assert_eq!(resolved.comment.unwrap().id, 100);
    }

    #[tokio::test]
    async fn guest_comment_is_admin_only() {
        let chain = Chain::authenticated().comment(10, 101).updating();
        for id in [5, 7] {
            let err = pipeline().admit(&chain, Some(&bearer(id))).await.unwrap_err();
            assert!(matches!(err, DomainError::Forbidden));
        }
        assert!(pipeline().admit(&chain, Some(&bearer(1))).await.is_ok());
    }

    #[tokio::test]
    async fn missing_resource_wins_over_ownership() {
        let chain = Chain::authenticated().post(404).updating();
        let err = pipeline().admit(&chain, Some(&bearer(5))).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn authentication_wins_over_resolution() {
        let chain = Chain::authenticated().post(404).updating();
        let err = pipeline().admit(&chain, None).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn forbidden_request_never_reaches_validation() {
        let validated = AtomicBool::new(false);
        let chain = Chain::authenticated().post(10).updating();

        let err = pipeline()
            .execute(&chain, Some(&bearer(5)), |_| {
                validated.store(true, Ordering::SeqCst);
                Err::<(), _>(DomainError::invalid("title", "bad"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Forbidden));
        assert!(!validated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn validation_sees_the_resolved_context() {
        let chain = Chain::authenticated().post(12).updating();
        let admitted = pipeline()
            .execute(&chain, Some(&bearer(5)), |resolved| {
                Ok(resolved.principal()?.id + resolved.post()?.id)
            })
            .await
            .unwrap();
        assert_eq!(admitted.input, 17);
    }
}
