use axum::{extract::State, http::StatusCode, Json};

use crate::auth::{hash_password, verify_password};
use crate::backend::schemas::{check_password, normalize_email, LoginForm, RegisterRequest, TokenResponse};
use crate::backend::{AppForm, AppJson, AppState, CurrentUser};
use crate::database::db::queries;
use crate::database::models::UserRead;
use crate::error::{ApiError, ApiResult};

pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserRead>)> {
    let email = normalize_email(&req.email)?;
    check_password(&req.password)?;

    if queries::get_user_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::validation("Email already registered"));
    }

    let hash = hash_password(&req.password)?;
    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let user = match queries::create_user(&state.db, name, &email, &hash).await {
        Ok(user) => user,
        // lost a race with a concurrent registration
        Err(e) if queries::is_unique_violation(&e) => {
            return Err(ApiError::validation("Email already registered"))
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = user.user_id, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    AppForm(form): AppForm<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let email = form.username.trim().to_lowercase();

    let user = queries::get_user_by_email(&state.db, &email)
        .await?
        .filter(|u| u.is_active);

    let user = match user {
        Some(u) if verify_password(&form.password, &u.password_hash)? => u,
        _ => {
            tracing::debug!("login rejected");
            return Err(ApiError::unauthorized("Incorrect email or password"));
        }
    };

    let token = state.tokens.issue(&user.email)?;
    tracing::info!(user_id = user.user_id, "user logged in");
    Ok(Json(TokenResponse::bearer(token, state.tokens.ttl())))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserRead> {
    Json(user.into())
}

pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<StatusCode> {
    if !queries::delete_user(&state.db, user.user_id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    tracing::info!(user_id = user.user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
