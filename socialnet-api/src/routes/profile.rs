/// Profile endpoints
///
/// # Endpoints (session required)
///
/// - `GET /profile` - Own profile, counts and all own posts
/// - `POST /profile/avatar` - Multipart `image`, then `303 -> /profile`

use crate::{
    app::AppState,
    error::ApiResult,
    uploads::{read_image_form, remove_image, save_image},
    views::ProfileView,
};
use axum::{
    extract::{Multipart, State},
    response::Redirect,
    Json,
};
use socialnet_shared::{auth::middleware::AuthContext, CoreError};

/// Own profile page
///
/// Posts are not limited, unlike the friend feed.
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ProfileView>> {
    let profile = state.accounts.get_profile(auth.user_id).await?;
    let posts = state.feed.build_profile_feed(auth.user_id).await?;
    let post_count = state.feed.post_count(auth.user_id).await?;
    let friend_count = state.graph.friend_count(auth.user_id).await?;

    Ok(Json(ProfileView::new(
        profile,
        auth.user_id,
        posts,
        post_count,
        friend_count,
    )))
}

/// Replace the avatar
pub async fn update_avatar(
    State(state): State<AppState>,
    auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<Redirect> {
    let image = read_image_form(multipart)
        .await?
        .ok_or_else(|| CoreError::invalid("image", "Choose an image to upload"))?;

    let avatar_url = save_image(&state.config.uploads.dir, &image).await?;
    if let Err(err) = state
        .accounts
        .update_avatar(auth.user_id, avatar_url.clone())
        .await
    {
        remove_image(&state.config.uploads.dir, &avatar_url).await;
        return Err(err.into());
    }

    Ok(Redirect::to("/profile"))
}
