use axum::{extract::State, Json};

use crate::backend::{AppState, CurrentUser};
use crate::database::db::queries;
use crate::database::models::{Badge, UserBadge};
use crate::error::ApiResult;

pub async fn list_badges(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Badge>>> {
    Ok(Json(queries::list_active_badges(&state.db).await?))
}

pub async fn my_badges(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<UserBadge>>> {
    Ok(Json(queries::list_user_badges(&state.db, user.user_id).await?))
}
