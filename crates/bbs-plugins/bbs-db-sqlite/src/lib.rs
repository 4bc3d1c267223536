//! # bbs-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `bbs-core` domain models.

use std::str::FromStr;

use async_trait::async_trait;
use bbs_core::error::{AppError, Result};
use bbs_core::models::{Post, PostChanges, PostWithAuthor, User};
use bbs_core::pagination::PageRequest;
use bbs_core::traits::{PostRepo, UserRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          BLOB PRIMARY KEY NOT NULL,
    name        TEXT NOT NULL UNIQUE,
    age         INTEGER NOT NULL,
    hobby       TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id          BLOB PRIMARY KEY NOT NULL,
    user_id     BLOB NOT NULL REFERENCES users(id),
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at DESC, id DESC);
"#;

const SELECT_POST_WITH_AUTHOR: &str = "
    SELECT p.id AS post_id, p.title, p.content,
           p.created_at AS post_created_at, p.updated_at AS post_updated_at,
           u.id AS user_id, u.name, u.age, u.hobby,
           u.created_at AS user_created_at, u.updated_at AS user_updated_at
    FROM posts p
    JOIN users u ON u.id = p.user_id";

#[derive(Clone)]
pub struct SqliteBbsRepo {
    pool: SqlitePool,
}

impl SqliteBbsRepo {
    /// Connects to `url` and applies the schema.
    ///
    /// In-memory databases are pinned to a single connection that is never
    /// recycled, otherwise every pooled connection would see its own empty
    /// database.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new();
        if url.contains(":memory:") {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        log::info!("sqlite store ready at {url}");

        Ok(Self { pool })
    }
}

// Helper for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Result<Uuid> {
    Uuid::from_slice(blob).map_err(|e| AppError::Internal(format!("corrupt id column: {e}")))
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::Internal(e.to_string())
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: blob_to_uuid(&row.try_get::<Vec<u8>, _>("id").map_err(db_err)?)?,
        name: row.try_get("name").map_err(db_err)?,
        age: row.try_get("age").map_err(db_err)?,
        hobby: row.try_get("hobby").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

fn row_to_post_with_author(row: &SqliteRow) -> Result<PostWithAuthor> {
    let user_id = blob_to_uuid(&row.try_get::<Vec<u8>, _>("user_id").map_err(db_err)?)?;
    let post = Post {
        id: blob_to_uuid(&row.try_get::<Vec<u8>, _>("post_id").map_err(db_err)?)?,
        user_id,
        title: row.try_get("title").map_err(db_err)?,
        content: row.try_get("content").map_err(db_err)?,
        created_at: row.try_get("post_created_at").map_err(db_err)?,
        updated_at: row.try_get("post_updated_at").map_err(db_err)?,
    };
    let author = User {
        id: user_id,
        name: row.try_get("name").map_err(db_err)?,
        age: row.try_get("age").map_err(db_err)?,
        hobby: row.try_get("hobby").map_err(db_err)?,
        created_at: row.try_get("user_created_at").map_err(db_err)?,
        updated_at: row.try_get("user_updated_at").map_err(db_err)?,
    };
    Ok((post, author))
}

#[async_trait]
impl UserRepo for SqliteBbsRepo {
    async fn create_user(&self, user: User) -> Result<User> {
        sqlx::query(
            "INSERT INTO users (id, name, age, hobby, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(user.id))
        .bind(&user.name)
        .bind(user.age)
        .bind(&user.hobby)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(format!("user name '{}' is already taken", user.name))
            }
            other => db_err(other),
        })?;

        log::debug!("created user {} ({})", user.id, user.name);
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(row_to_user).transpose()
    }
}

#[async_trait]
impl PostRepo for SqliteBbsRepo {
    /// Inserts the post and reads it back joined with its author in one
    /// transaction.
    async fn create_post(&self, post: Post) -> Result<PostWithAuthor> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            "INSERT INTO posts (id, user_id, title, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(post.id))
        .bind(uuid_to_blob(post.user_id))
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::not_found("User", post.user_id)
            }
            other => db_err(other),
        })?;

        let row = sqlx::query(&format!("{SELECT_POST_WITH_AUTHOR} WHERE p.id = ?"))
            .bind(uuid_to_blob(post.id))
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
        let created = row_to_post_with_author(&row)?;

        tx.commit().await.map_err(db_err)?;
        Ok(created)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<PostWithAuthor>> {
        let row = sqlx::query(&format!("{SELECT_POST_WITH_AUTHOR} WHERE p.id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(row_to_post_with_author).transpose()
    }

    /// Only title, content and updated_at are written; `user_id` is never
    /// part of the statement.
    async fn update_post(&self, id: Uuid, changes: PostChanges) -> Result<Option<PostWithAuthor>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let current = sqlx::query(&format!("{SELECT_POST_WITH_AUTHOR} WHERE p.id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        let (mut post, author) = match current.as_ref().map(row_to_post_with_author).transpose()? {
            Some(found) => found,
            None => return Ok(None),
        };

        post.apply(changes);

        sqlx::query("UPDATE posts SET title = ?, content = ?, updated_at = ? WHERE id = ?")
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.updated_at)
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(Some((post, author)))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts_paginated(&self, page: PageRequest) -> Result<Vec<PostWithAuthor>> {
        let rows = sqlx::query(&format!(
            "{SELECT_POST_WITH_AUTHOR} ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_post_with_author).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbs_core::pagination::PagePolicy;

    async fn repo_with_user() -> (SqliteBbsRepo, User) {
        let repo = SqliteBbsRepo::new("sqlite::memory:").await.unwrap();
        let user = repo.create_user(User::new("NAME", 25, "HOBBY")).await.unwrap();
        (repo, user)
    }

    #[tokio::test]
    async fn test_create_and_get_post() {
        let (repo, user) = repo_with_user().await;

        let (created, author) = repo
            .create_post(Post::new(user.id, "TITLE", "CONTENT"))
            .await
            .expect("Failed to create post");
        assert_eq!(author, user);

        let (fetched, author) = repo.get_post(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(author.name, "NAME");
    }

    #[tokio::test]
    async fn test_create_post_for_unknown_user_is_not_found() {
        let (repo, _) = repo_with_user().await;
        let ghost = Uuid::now_v7();

        let err = repo
            .create_post(Post::new(ghost, "TITLE", "CONTENT"))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::not_found("User", ghost));
    }

    #[tokio::test]
    async fn test_duplicate_user_name_conflicts() {
        let (repo, _) = repo_with_user().await;

        let err = repo.create_user(User::new("NAME", 30, "OTHER")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_user_by_name() {
        let (repo, user) = repo_with_user().await;

        assert_eq!(repo.find_user_by_name("NAME").await.unwrap(), Some(user.clone()));
        assert_eq!(repo.get_user(user.id).await.unwrap(), Some(user));
        assert_eq!(repo.find_user_by_name("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_keeps_author() {
        let (repo, user) = repo_with_user().await;
        let (post, _) = repo.create_post(Post::new(user.id, "TITLE", "CONTENT")).await.unwrap();

        let (updated, author) = repo
            .update_post(post.id, PostChanges::new("UPDATED_TITLE", "UPDATED_CONTENT"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "UPDATED_TITLE");
        assert_eq!(updated.content, "UPDATED_CONTENT");
        assert_eq!(updated.user_id, user.id);
        assert_eq!(author.id, user.id);
        assert!(updated.updated_at >= updated.created_at);

        let (stored, _) = repo.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_missing_post_returns_none() {
        let (repo, _) = repo_with_user().await;
        let result = repo
            .update_post(Uuid::now_v7(), PostChanges::new("T", "C"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_post() {
        let (repo, user) = repo_with_user().await;
        let (post, _) = repo.create_post(Post::new(user.id, "TITLE", "CONTENT")).await.unwrap();

        assert!(repo.delete_post(post.id).await.unwrap());
        assert!(repo.get_post(post.id).await.unwrap().is_none());
        assert!(!repo.delete_post(post.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paged() {
        let (repo, user) = repo_with_user().await;
        for i in 1..=3 {
            repo.create_post(Post::new(user.id, format!("TITLE{i}"), format!("CONTENT{i}")))
                .await
                .unwrap();
        }
        let policy = PagePolicy::default();

        let first = repo
            .list_posts_paginated(PageRequest::new(Some(1), Some(2), &policy).unwrap())
            .await
            .unwrap();
        let titles: Vec<_> = first.iter().map(|(p, _)| p.title.as_str()).collect();
        assert_eq!(titles, ["TITLE3", "TITLE2"]);

        let second = repo
            .list_posts_paginated(PageRequest::new(Some(2), Some(2), &policy).unwrap())
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].0.title, "TITLE1");

        let beyond = repo
            .list_posts_paginated(PageRequest::new(Some(9), Some(2), &policy).unwrap())
            .await
            .unwrap();
        assert!(beyond.is_empty());
    }
}
