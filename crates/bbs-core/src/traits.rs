//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Post, PostChanges, PostWithAuthor, User};
use crate::pagination::PageRequest;

/// Persistence contract for post authors.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `Conflict` when the name is already taken.
    async fn create_user(&self, user: User) -> Result<User>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>>;
}

/// Persistence contract for posts. Every read returns the post with its author.
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Fails with `NotFound` when `post.user_id` does not reference a user.
    async fn create_post(&self, post: Post) -> Result<PostWithAuthor>;
    async fn get_post(&self, id: Uuid) -> Result<Option<PostWithAuthor>>;
    /// Returns `None` when no post has this id.
    async fn update_post(&self, id: Uuid, changes: PostChanges) -> Result<Option<PostWithAuthor>>;
    /// Returns `false` when no post has this id.
    async fn delete_post(&self, id: Uuid) -> Result<bool>;
    /// Newest first.
    async fn list_posts_paginated(&self, page: PageRequest) -> Result<Vec<PostWithAuthor>>;
}
