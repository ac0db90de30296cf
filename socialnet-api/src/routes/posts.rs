/// Feed and post endpoints
///
/// # Endpoints (session required)
///
/// - `GET /posts` - Friend feed with the viewer's name and avatar
/// - `GET /create-post` - Empty post form
/// - `POST /create-post` - Multipart `content` + optional `image`, then `303 -> /posts`

use crate::{
    app::AppState,
    error::ApiResult,
    uploads::{read_post_form, remove_image, save_image},
    views::{CreatePostView, PostsView},
};
use axum::{
    extract::{Multipart, State},
    response::Redirect,
    Json,
};
use socialnet_shared::{auth::middleware::AuthContext, CoreError};

/// Friend feed
///
/// `status` in the body is `no_friends` when the viewer has added nobody,
/// otherwise `feed` with up to the configured number of posts, newest first.
pub async fn feed(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<PostsView>> {
    let profile = state.accounts.get_profile(auth.user_id).await?;
    let feed = state
        .feed
        .build_feed(auth.user_id, state.config.feed.limit)
        .await?;

    Ok(Json(PostsView {
        username: profile.username,
        avatar_url: profile.avatar_url,
        feed,
    }))
}

pub async fn create_post_form(_auth: AuthContext) -> Json<CreatePostView> {
    Json(CreatePostView::default())
}

/// Create a post
///
/// # Errors
///
/// - `422`: no text and no image, or an image of an unsupported type
/// - `413`: upload larger than the configured limit
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<Redirect> {
    let form = read_post_form(multipart).await?;

    if form.content.trim().is_empty() && form.image.is_none() {
        return Err(CoreError::invalid("content", "Post must have text or an image").into());
    }

    let image_url = match &form.image {
        Some(image) => Some(save_image(&state.config.uploads.dir, image).await?),
        None => None,
    };

    let result = state
        .feed
        .publish_post(auth.user_id, form.content, image_url.clone())
        .await;

    if let Err(err) = result {
        if let Some(reference) = &image_url {
            remove_image(&state.config.uploads.dir, reference).await;
        }
        return Err(err.into());
    }

    Ok(Redirect::to("/posts"))
}
