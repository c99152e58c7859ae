//! Data Transfer Objects - request/response types for the API.
//!
//! Request fields are optional on the wire so that a missing field is
//! reported as a validation problem rather than a decode failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to register a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

/// Body of `POST /posts/{id}/comments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCommentRequest {
    pub author_name: Option<String>,
    pub content: Option<String>,
}

/// Body of `PUT /posts/{id}/comments/{cid}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response containing an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn bearer(access_token: String, expires_in: i64, user: UserResponse) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i32,
    pub post_id: i32,
    pub author_name: String,
    /// `None` for guest comments.
    pub user_id: Option<i32>,
    pub content: String,
    pub edited: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Active comments, oldest first. Omitted on write responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentResponse>>,
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_decode_as_none() {
        let req: CreateCommentRequest = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert!(req.author_name.is_none());
        assert_eq!(req.content.as_deref(), Some("hi"));
    }

    #[test]
    fn test_comment_request_is_camel_case() {
        let req: CreateCommentRequest =
            serde_json::from_str(r#"{"authorName":"Bob","content":"hi"}"#).unwrap();
        assert_eq!(req.author_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_auth_response_shape() {
        let user = UserResponse {
            id: 1,
            email: "a@example.com".into(),
            name: "Ann".into(),
            role: "USER".into(),
            created_at: None,
        };
        let json = serde_json::to_value(AuthResponse::bearer("tok".into(), 60, user)).unwrap();

        assert_eq!(json["accessToken"], "tok");
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresIn"], 60);
        assert!(json["user"].get("createdAt").is_none());
    }
}
