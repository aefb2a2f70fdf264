use std::collections::HashSet;

use axum::{extract::State, http::StatusCode, Json};
use rust_decimal::Decimal;

use crate::backend::handlers::{load_ledger, plan_debts};
use crate::backend::schemas::{PlanCreate, PlanRead, SummaryQuery};
use crate::backend::{AppJson, AppPath, AppQuery, AppState, CurrentUser};
use crate::database::db::queries;
use crate::error::{ApiError, ApiResult};
use crate::repayment::{self, Projection};
use crate::util::{now, today};

const DEFAULT_PROJECTION_DAYS: u32 = 30;
const MAX_PROJECTION_DAYS: u32 = 3650;

pub async fn list_plans(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<PlanRead>>> {
    let plans = queries::list_plans(&state.db, user.user_id).await?;
    let (ledger, _) = load_ledger(&state.db, user.user_id).await?;
    let debts = plan_debts(&ledger);

    Ok(Json(
        plans
            .into_iter()
            .map(|plan| {
                let schedule = repayment::simulate(plan.strategy, &debts, Some(plan.monthly_budget))
                    .map_err(|e| e.to_string());
                PlanRead::new(plan, schedule)
            })
            .collect(),
    ))
}

/// Simulates the chosen strategy against the caller's open debts and stores
/// the projection alongside the plan.
pub async fn create_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(req): AppJson<PlanCreate>,
) -> ApiResult<(StatusCode, Json<PlanRead>)> {
    let budget = req.budget()?;
    let (ledger, _) = load_ledger(&state.db, user.user_id).await?;
    let debts = plan_debts(&ledger);

    let schedule = repayment::simulate(req.strategy, &debts, budget)?;
    let payoff = schedule.payoff_date(today());
    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let plan = queries::create_plan(
        &state.db,
        user.user_id,
        name,
        req.strategy,
        schedule.monthly_budget,
        i64::from(schedule.months),
        schedule.total_interest,
        payoff,
    )
    .await?;

    tracing::info!(
        user_id = user.user_id,
        plan_id = plan.plan_id,
        strategy = %plan.strategy,
        months = schedule.months,
        "repayment plan created"
    );
    Ok((StatusCode::CREATED, Json(PlanRead::new(plan, Ok(schedule)))))
}

/// The stored plan with its schedule recomputed against current balances.
pub async fn get_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(plan_id): AppPath<i64>,
) -> ApiResult<Json<PlanRead>> {
    let plan = queries::get_plan(&state.db, user.user_id, plan_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Repayment plan not found"))?;

    let (ledger, _) = load_ledger(&state.db, user.user_id).await?;
    let schedule = repayment::simulate(plan.strategy, &plan_debts(&ledger), Some(plan.monthly_budget))
        .map_err(|e| e.to_string());
    Ok(Json(PlanRead::new(plan, schedule)))
}

/// Dashboard projection over the debts that pass the query's filters.
pub async fn plan_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppQuery(q): AppQuery<SummaryQuery>,
) -> ApiResult<Json<Projection>> {
    let days = q.projection_days.unwrap_or(DEFAULT_PROJECTION_DAYS);
    if days == 0 || days > MAX_PROJECTION_DAYS {
        return Err(ApiError::validation(format!(
            "projection_days must be between 1 and {MAX_PROJECTION_DAYS}"
        )));
    }

    let (ledger, payments) = load_ledger(&state.db, user.user_id).await?;
    let ledger: Vec<_> = ledger.into_iter().filter(|(d, b)| q.matches(d, b)).collect();
    let kept: HashSet<i64> = ledger.iter().map(|(d, _)| d.debt_id).collect();

    let cutoff = now();
    let past: Decimal = payments
        .iter()
        .filter(|p| p.payment_date <= cutoff && kept.contains(&p.debt_id))
        .map(|p| p.amount)
        .sum();

    Ok(Json(repayment::project(&plan_debts(&ledger), past, days, today())))
}
