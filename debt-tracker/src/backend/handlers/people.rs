use axum::{extract::State, http::StatusCode, Json};

use crate::backend::schemas::PersonCreate;
use crate::backend::{AppJson, AppState, CurrentUser};
use crate::database::db::queries;
use crate::database::models::Person;
use crate::error::{ApiError, ApiResult};

pub async fn list_people(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Person>>> {
    Ok(Json(queries::list_people(&state.db, user.user_id).await?))
}

pub async fn create_person(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(req): AppJson<PersonCreate>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    let contact = req.contact.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let person = queries::create_person(&state.db, user.user_id, name, contact).await?;
    Ok((StatusCode::CREATED, Json(person)))
}
