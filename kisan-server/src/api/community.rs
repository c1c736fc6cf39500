use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::Utc;
use uuid::Uuid;

use kisan_types::{Comment, CommentForm, CommunityPost, FeedQuery, DEFAULT_CROP_TAG};

use super::{form_data::FormData, image_response, parse_id, AppError, AppResult};
use crate::db::repositories::{CommentRepository, LikeRepository, PostRepository};
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::views;

/// GET /community - all posts newest first, optionally ?tag=...
pub async fn feed(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Html<String>> {
    let pool = state.db.pool.clone();
    let post_repo = PostRepository::new(pool.clone());
    let comment_repo = CommentRepository::new(pool.clone());
    let like_repo = LikeRepository::new(pool);

    let tag = query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());

    let mut posts = post_repo.list(tag)?;
    for post in &mut posts {
        post.comments = comment_repo.list_for_post(&post.id)?;
    }
    let liked = like_repo.liked_post_ids(&current.user.id)?;

    Ok(Html(views::community_page(&posts, &liked, tag)))
}

/// POST /community - multipart with content, tag and an optional image
pub async fn create_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Response> {
    let mut form = FormData::read(multipart).await?;

    let Some(content) = form.text("content").map(str::to_string) else {
        return Ok(Redirect::to("/community").into_response());
    };
    let tag = form.text("tag").unwrap_or(DEFAULT_CROP_TAG).to_string();
    let image = form.take_image("image").map(|f| f.into_image());

    let post = CommunityPost {
        id: Uuid::new_v4(),
        author_id: current.user.id,
        author_name: current.user.name.clone(),
        content,
        tag,
        created_at: Utc::now(),
        has_image: image.is_some(),
        like_count: 0,
        comment_count: 0,
        comments: Vec::new(),
    };

    PostRepository::new(state.db.pool.clone()).create(&post, image.as_ref())?;
    tracing::info!("User {} created post {}", current.user.id, post.id);

    Ok(Redirect::to("/community").into_response())
}

/// POST /community/:id/comment
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let post_id = parse_id(&post_id, "post")?;
    let pool = state.db.pool.clone();

    let post = PostRepository::new(pool.clone())
        .get_by_id(&post_id)?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let content = form.content.trim();
    if content.is_empty() {
        return Ok(Redirect::to("/community").into_response());
    }

    let comment = Comment {
        id: Uuid::new_v4(),
        post_id: post.id,
        author_name: current.user.name.clone(),
        content: content.to_string(),
        created_at: Utc::now(),
    };
    CommentRepository::new(pool).create(&comment, &current.user.id)?;

    Ok(Redirect::to("/community").into_response())
}

/// POST /community/:id/like - a repeated like by the same user is ignored
pub async fn like_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post_id = parse_id(&post_id, "post")?;
    let pool = state.db.pool.clone();
    let post_repo = PostRepository::new(pool.clone());

    let post = post_repo
        .get_by_id(&post_id)?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if LikeRepository::new(pool).add_like(&post.id, &current.user.id)? {
        post_repo.update_like_count(&post.id)?;
    } else {
        tracing::debug!("User {} already liked post {}", current.user.id, post.id);
    }

    Ok(Redirect::to("/community").into_response())
}

/// GET /community/:id/image
pub async fn post_image(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post_id = parse_id(&post_id, "post")?;
    let image = PostRepository::new(state.db.pool.clone())
        .get_image(&post_id)?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    Ok(image_response(image))
}
