use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{AuthUser, create_session};
use crate::error::AppError;
use crate::models::user::User;
use crate::routes::api::AppState;

/// The identifier may be a username or an email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = User::find_by_identifier(&state.pool, &input.email)
        .await?
        .filter(|u| u.verify_password(&input.password))
        .ok_or(AppError::Unauthorized)?;

    let access_token = create_session(&state.pool, user.id, state.session_ttl_hours).await?;

    Ok(Json(LoginResponse { access_token, user }))
}

pub async fn me(State(pool): State<PgPool>, user: AuthUser) -> Result<Json<User>, AppError> {
    let user = User::get(&pool, user.id).await?;
    Ok(Json(user))
}
