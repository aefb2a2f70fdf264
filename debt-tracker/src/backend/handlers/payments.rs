use axum::{extract::State, http::StatusCode, Json};

use crate::achievements;
use crate::backend::schemas::{PaymentCreate, PaymentCreated, PaymentQuery, PaymentRead};
use crate::backend::{AppJson, AppPath, AppQuery, AppState, CurrentUser};
use crate::database::db::queries;
use crate::error::{ApiError, ApiResult};

pub async fn list_payments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(debt_id): AppPath<i64>,
) -> ApiResult<Json<Vec<PaymentRead>>> {
    queries::get_debt(&state.db, user.user_id, debt_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Debt not found"))?;

    let payments = queries::list_payments_for_debt(&state.db, debt_id).await?;
    Ok(Json(payments.into_iter().map(PaymentRead::from).collect()))
}

/// Records a payment, settles the debt when it reaches zero, then
/// re-evaluates the caller's badges. Badge failures are logged only.
pub async fn add_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(debt_id): AppPath<i64>,
    AppQuery(q): AppQuery<PaymentQuery>,
    AppJson(req): AppJson<PaymentCreate>,
) -> ApiResult<(StatusCode, Json<PaymentCreated>)> {
    queries::get_debt(&state.db, user.user_id, debt_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Debt not found"))?;

    if let Some(plan_id) = q.plan_id {
        queries::get_plan(&state.db, user.user_id, plan_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Repayment plan not found"))?;
    }

    let new_payment = req.validate(q.plan_id)?;
    let (payment, bal) = queries::record_payment(&state.db, user.user_id, debt_id, &new_payment).await?;

    tracing::info!(
        user_id = user.user_id,
        debt_id,
        payment_id = payment.payment_id,
        amount = %payment.amount,
        outstanding = %bal.outstanding,
        settled = bal.settled,
        "payment recorded"
    );

    // the payment is already committed
    if let Err(e) = evaluate_badges(&state, user.user_id).await {
        tracing::error!(user_id = user.user_id, debt_id, error = %e, "badge evaluation failed");
    }

    Ok((
        StatusCode::CREATED,
        Json(PaymentCreated {
            payment: payment.into(),
            outstanding: bal.outstanding,
            is_settled: bal.settled,
        }),
    ))
}

async fn evaluate_badges(state: &AppState, user_id: i64) -> ApiResult<()> {
    let debts = queries::list_debts(&state.db, user_id).await?;
    let payments = queries::list_payments_for_user(&state.db, user_id).await?;
    let earned = achievements::earned(&achievements::stats(&debts, &payments));

    let awarded = queries::award_badges(&state.db, user_id, &earned).await?;
    for code in awarded {
        tracing::info!(user_id, badge = code.as_str(), "badge awarded");
    }
    Ok(())
}
