/// Friend endpoints
///
/// # Endpoints (session required)
///
/// - `GET /find-friends?name=` - Case-insensitive username search, caller excluded
/// - `POST /find-friends` - Form `friend_id`, adds `caller -> friend_id`, then `303 -> /find-friends`
///
/// # Errors
///
/// - `422`: `friend_id` missing, not a number, not positive, or the caller
/// - `404`: no user with that id
/// - `409`: already friends, in either direction

use crate::{app::AppState, error::ApiResult, views::FindFriendsView};
use axum::{
    extract::{Query, State},
    response::Redirect,
    Form, Json,
};
use serde::Deserialize;
use socialnet_shared::{auth::middleware::AuthContext, CoreError};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddFriendForm {
    #[serde(default)]
    pub friend_id: String,
}

pub async fn search(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<FindFriendsView>> {
    let results = state.graph.search(&query.name, auth.user_id).await?;

    Ok(Json(FindFriendsView {
        name: query.name,
        results: results.into_iter().map(Into::into).collect(),
    }))
}

pub async fn add_friend(
    State(state): State<AppState>,
    auth: AuthContext,
    Form(form): Form<AddFriendForm>,
) -> ApiResult<Redirect> {
    let friend_id: i64 = form
        .friend_id
        .trim()
        .parse()
        .map_err(|_| CoreError::invalid("friend_id", "Invalid friend id"))?;

    state.graph.add_friend(auth.user_id, friend_id).await?;

    Ok(Redirect::to("/find-friends"))
}
