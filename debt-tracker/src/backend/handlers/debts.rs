use axum::{extract::State, http::StatusCode, Json};
use chrono::Duration;

use crate::backend::handlers::load_ledger;
use crate::backend::schemas::{DebtCreate, DebtRead, DebtUpdate, UpcomingQuery};
use crate::backend::{AppJson, AppPath, AppQuery, AppState, CurrentUser};
use crate::balance;
use crate::database::db::queries;
use crate::error::{ApiError, ApiResult};
use crate::util::today;

const DEFAULT_UPCOMING_DAYS: u32 = 7;
const MAX_UPCOMING_DAYS: u32 = 366;

pub async fn list_debts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<DebtRead>>> {
    let (ledger, _) = load_ledger(&state.db, user.user_id).await?;
    Ok(Json(
        ledger
            .into_iter()
            .map(|(debt, bal)| DebtRead::new(debt, &bal))
            .collect(),
    ))
}

pub async fn create_debt(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(req): AppJson<DebtCreate>,
) -> ApiResult<(StatusCode, Json<DebtRead>)> {
    let new_debt = req.validate()?;
    if let Some(person_id) = new_debt.person_id {
        ensure_person(&state, user.user_id, person_id).await?;
    }

    let debt = queries::create_debt(&state.db, user.user_id, &new_debt).await?;
    tracing::info!(user_id = user.user_id, debt_id = debt.debt_id, "debt created");

    let bal = balance::summarize(&debt, &[]);
    Ok((StatusCode::CREATED, Json(DebtRead::new(debt, &bal))))
}

/// Distinct debt types in use, for filter pickers.
pub async fn debt_types(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(queries::list_debt_types(&state.db, user.user_id).await?))
}

/// Unsettled debts due within the next `days` days, today included.
pub async fn upcoming_debts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppQuery(q): AppQuery<UpcomingQuery>,
) -> ApiResult<Json<Vec<DebtRead>>> {
    let days = q.days.unwrap_or(DEFAULT_UPCOMING_DAYS);
    if days > MAX_UPCOMING_DAYS {
        return Err(ApiError::validation(format!(
            "days must be at most {MAX_UPCOMING_DAYS}"
        )));
    }

    let from = today();
    let to = from + Duration::days(i64::from(days));
    let debts = queries::list_upcoming_debts(&state.db, user.user_id, from, to).await?;

    let mut out = Vec::with_capacity(debts.len());
    for debt in debts {
        let payments = queries::list_payments_for_debt(&state.db, debt.debt_id).await?;
        let bal = balance::summarize(&debt, &payments);
        out.push(DebtRead::new(debt, &bal));
    }
    Ok(Json(out))
}

pub async fn get_debt(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(debt_id): AppPath<i64>,
) -> ApiResult<Json<DebtRead>> {
    let debt = queries::get_debt(&state.db, user.user_id, debt_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Debt not found"))?;
    let payments = queries::list_payments_for_debt(&state.db, debt_id).await?;
    let bal = balance::summarize(&debt, &payments);
    Ok(Json(DebtRead::new(debt, &bal)))
}

pub async fn update_debt(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(debt_id): AppPath<i64>,
    AppJson(req): AppJson<DebtUpdate>,
) -> ApiResult<Json<DebtRead>> {
    let mut debt = queries::get_debt(&state.db, user.user_id, debt_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Debt not found"))?;

    req.apply(&mut debt)?;
    if let Some(person_id) = debt.person_id {
        ensure_person(&state, user.user_id, person_id).await?;
    }

    // a lowered principal can settle the debt; nothing ever unsettles it
    let payments = queries::list_payments_for_debt(&state.db, debt_id).await?;
    debt.is_settled = balance::summarize(&debt, &payments).settled;

    let debt = queries::update_debt(&state.db, &debt).await?;
    let bal = balance::summarize(&debt, &payments);
    tracing::info!(user_id = user.user_id, debt_id, "debt updated");
    Ok(Json(DebtRead::new(debt, &bal)))
}

pub async fn delete_debt(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(debt_id): AppPath<i64>,
) -> ApiResult<StatusCode> {
    if !queries::delete_debt(&state.db, user.user_id, debt_id).await? {
        return Err(ApiError::not_found("Debt not found"));
    }
    tracing::info!(user_id = user.user_id, debt_id, "debt deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_person(state: &AppState, user_id: i64, person_id: i64) -> ApiResult<()> {
    queries::get_person(&state.db, user_id, person_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("Person not found"))
}
