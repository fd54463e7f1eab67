pub mod auth;
pub mod companies;
pub mod jobs;
pub mod users;

use axum::Router;
use axum::extract::FromRef;
use axum::routing::{delete, get, patch, post, put};
use sqlx::PgPool;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: PgPool,
    pub session_ttl_hours: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Companies
        .route("/companies", get(companies::list).post(companies::create))
        .route("/companies/search", get(companies::search))
        .route("/companies/admin", get(companies::admin_list))
        .route(
            "/companies/{id}",
            get(companies::detail)
                .put(companies::update)
                .delete(companies::delete),
        )
        .route("/companies/{id}/approve", patch(companies::approve))
        // Jobs
        .route("/jobs", get(jobs::list).post(jobs::create))
        .route("/jobs/search", get(jobs::search))
        .route("/jobs/admin", get(jobs::admin_list))
        .route("/jobs/categories", get(jobs::category_stats))
        .route("/jobs/locations", get(jobs::location_stats))
        .route("/jobs/user/{user_id}", get(jobs::by_user))
        .route(
            "/jobs/{id}",
            get(jobs::detail).put(jobs::update).delete(jobs::delete),
        )
        .route("/jobs/{id}/approve", patch(jobs::approve))
        // Users
        .route("/users", get(users::list))
        .route("/users/register", post(users::register))
        .route(
            "/users/profile",
            get(users::profile).put(users::update_profile),
        )
        .route("/users/change-password", put(users::change_password))
        .route("/users/account", delete(users::delete_account))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .with_state(state)
}
