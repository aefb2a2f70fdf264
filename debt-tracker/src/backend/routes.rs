use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::handlers::{auth, badges, debts, payments, people, plans};
use crate::backend::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me).delete(auth::delete_me))
        .route("/people", get(people::list_people).post(people::create_person))
        .route("/debts", get(debts::list_debts).post(debts::create_debt))
        .route("/debts/", get(debts::list_debts).post(debts::create_debt))
        .route("/debts/upcoming", get(debts::upcoming_debts))
        .route("/debts/types", get(debts::debt_types))
        .route(
            "/debts/:debt_id",
            get(debts::get_debt)
                .patch(debts::update_debt)
                .delete(debts::delete_debt),
        )
        .route(
            "/debts/:debt_id/payments",
            get(payments::list_payments).post(payments::add_payment),
        )
        .route("/plans", get(plans::list_plans).post(plans::create_plan))
        .route("/plans/summary", get(plans::plan_summary))
        .route("/plans/:plan_id", get(plans::get_plan))
        .route("/badges", get(badges::list_badges))
        .route("/me/badges", get(badges::my_badges))
}
