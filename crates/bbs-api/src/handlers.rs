//! # bbs-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use bbs_core::error::AppError;
use bbs_core::models::{Post, PostChanges, User};
use bbs_core::pagination::{PagePolicy, PageRequest};
use bbs_core::traits::{PostRepo, UserRepo};
use uuid::Uuid;

use crate::dto::{
    PageQuery, PostCreateRequest, PostResponse, PostUpdateRequest, UserCreateRequest, UserResponse,
};
use crate::response::{ApiError, ApiResponse};

type HandlerResult = Result<HttpResponse, ApiError>;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub users: Box<dyn UserRepo>,
    pub posts: Box<dyn PostRepo>,
    pub paging: PagePolicy,
}

/// Looks the author up by id first, then by name.
async fn resolve_author(data: &AppState, ident: &str) -> Result<User, AppError> {
    if let Ok(id) = Uuid::parse_str(ident) {
        if let Some(user) = data.users.get_user(id).await? {
            return Ok(user);
        }
    }
    data.users
        .find_user_by_name(ident)
        .await?
        .ok_or_else(|| AppError::not_found("User", ident))
}

/// POST /posts
pub async fn create_post(
    data: web::Data<AppState>,
    body: web::Json<PostCreateRequest>,
) -> HandlerResult {
    let req = body.into_inner().validate()?;
    let author = resolve_author(&data, &req.user).await?;

    let created = data
        .posts
        .create_post(Post::new(author.id, req.title, req.content))
        .await?;
    log::info!("post {} created by {}", created.0.id, created.1.name);

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/posts/{}", created.0.id)))
        .json(ApiResponse::ok(PostResponse::from(created))))
}

/// GET /posts/{id}
pub async fn get_post(data: web::Data<AppState>, path: web::Path<Uuid>) -> HandlerResult {
    let id = path.into_inner();
    let found = data
        .posts
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::not_found("Post", id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostResponse::from(found))))
}

/// PUT /posts/{id}
pub async fn update_post(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PostUpdateRequest>,
) -> HandlerResult {
    let id = path.into_inner();
    let (title, content) = body.into_inner().validate()?;

    let updated = data
        .posts
        .update_post(id, PostChanges::new(title, content))
        .await?
        .ok_or_else(|| AppError::not_found("Post", id))?;
    log::info!("post {id} updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostResponse::from(updated))))
}

/// DELETE /posts/{id}
pub async fn delete_post(data: web::Data<AppState>, path: web::Path<Uuid>) -> HandlerResult {
    let id = path.into_inner();
    if !data.posts.delete_post(id).await? {
        return Err(AppError::not_found("Post", id).into());
    }
    log::info!("post {id} deleted");

    Ok(HttpResponse::NoContent().finish())
}

/// GET /posts?page=&size=
pub async fn list_posts(data: web::Data<AppState>, query: web::Query<PageQuery>) -> HandlerResult {
    let PageQuery { page, size } = query.into_inner();
    let page = PageRequest::new(page, size, &data.paging)?;

    let posts: Vec<PostResponse> = data
        .posts
        .list_posts_paginated(page)
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// POST /users
pub async fn create_user(
    data: web::Data<AppState>,
    body: web::Json<UserCreateRequest>,
) -> HandlerResult {
    let user = body.into_inner().validate()?;
    let created = data.users.create_user(user).await?;
    log::info!("user {} registered as {}", created.id, created.name);

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/users/{}", created.id)))
        .json(ApiResponse::ok(UserResponse::from(created))))
}

/// GET /users/{id}
pub async fn get_user(data: web::Data<AppState>, path: web::Path<Uuid>) -> HandlerResult {
    let id = path.into_inner();
    let user = data
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserResponse::from(user))))
}
