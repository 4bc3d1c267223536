//! # Request / Response Bodies
//!
//! Request fields are all optional at the serde level so a missing field
//! surfaces as a `ValidationError` envelope instead of a bare 400.

use bbs_core::error::{AppError, Result};
use bbs_core::models::{Post, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Returns the trimmed value; blank counts as missing.
fn required(field: &str, value: Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::ValidationError(format!("{field} is required"))),
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PostCreateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Name or id of the author.
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPostCreate {
    pub title: String,
    pub content: String,
    pub user: String,
}

impl PostCreateRequest {
    pub fn validate(self) -> Result<ValidPostCreate> {
        Ok(ValidPostCreate {
            title: required("title", self.title)?,
            content: required("content", self.content)?,
            user: required("user", self.user)?,
        })
    }
}

/// Anything other than title and content, including `user`, is ignored.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PostUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostUpdateRequest {
    pub fn validate(self) -> Result<(String, String)> {
        Ok((
            required("title", self.title)?,
            required("content", self.content)?,
        ))
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserCreateRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub hobby: Option<String>,
}

impl UserCreateRequest {
    pub fn validate(self) -> Result<User> {
        let name = required("name", self.name)?;
        let hobby = required("hobby", self.hobby)?;
        let age = match self.age {
            Some(age) if age >= 0 => age,
            Some(_) => return Err(AppError::ValidationError("age must not be negative".into())),
            None => return Err(AppError::ValidationError("age is required".into())),
        };
        Ok(User::new(name, age, hobby))
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub hobby: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            age: user.age,
            hobby: user.hobby,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user: UserResponse,
}

impl From<(Post, User)> for PostResponse {
    fn from((post, author): (Post, User)) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            user: author.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_requires_every_field() {
        let missing_user = PostCreateRequest {
            title: Some("TITLE".into()),
            content: Some("CONTENT".into()),
            user: None,
        };
        let err = missing_user.validate().unwrap_err();
        assert_eq!(err, AppError::ValidationError("user is required".into()));

        let blank_title = PostCreateRequest {
            title: Some("   ".into()),
            content: Some("CONTENT".into()),
            user: Some("NAME".into()),
        };
        assert!(blank_title.validate().is_err());
    }

    #[test]
    fn update_request_requires_title_and_content() {
        let ok = PostUpdateRequest {
            title: Some(" UPDATED_TITLE ".into()),
            content: Some("UPDATED_CONTENT".into()),
        };
        assert_eq!(
            ok.validate().unwrap(),
            ("UPDATED_TITLE".to_string(), "UPDATED_CONTENT".to_string())
        );

        let blank_content = PostUpdateRequest {
            title: Some("UPDATED_TITLE".into()),
            content: Some("\t".into()),
        };
        assert_eq!(
            blank_content.validate().unwrap_err(),
            AppError::ValidationError("content is required".into())
        );

        let missing_title = PostUpdateRequest {
            title: None,
            content: Some("UPDATED_CONTENT".into()),
        };
        assert_eq!(
            missing_title.validate().unwrap_err(),
            AppError::ValidationError("title is required".into())
        );
    }

    #[test]
    fn author_identifier_is_trimmed_like_user_names() {
        let post = PostCreateRequest {
            title: Some("TITLE".into()),
            content: Some("CONTENT".into()),
            user: Some(" PAD ".into()),
        }
        .validate()
        .unwrap();
        let user = UserCreateRequest {
            name: Some(" PAD ".into()),
            age: Some(25),
            hobby: Some("HOBBY".into()),
        }
        .validate()
        .unwrap();

        assert_eq!(post.user, "PAD");
        assert_eq!(user.name, post.user);
    }

    #[test]
    fn user_request_rejects_negative_age() {
        let req = UserCreateRequest {
            name: Some("NAME".into()),
            age: Some(-1),
            hobby: Some("HOBBY".into()),
        };
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn post_response_embeds_author() {
        let author = User::new("NAME", 25, "HOBBY");
        let post = Post::new(author.id, "TITLE", "CONTENT");
        let json = serde_json::to_value(PostResponse::from((post.clone(), author.clone()))).unwrap();

        assert_eq!(json["id"], post.id.to_string());
        assert_eq!(json["user"]["name"], "NAME");
        assert_eq!(json["user"]["id"], author.id.to_string());
        assert_eq!(json.as_object().unwrap().len(), 4);
    }
}
