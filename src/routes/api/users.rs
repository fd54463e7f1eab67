use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use sqlx::PgPool;

use crate::auth::{AuthUser, Role};
use crate::error::AppError;
use crate::models::user::{ChangePassword, CreateUser, UpdateProfile, User};

pub async fn register(
    State(pool): State<PgPool>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = User::register(&pool, input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn profile(
    State(pool): State<PgPool>,
    user: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = User::get(&pool, user.id).await?;
    Ok(Json(user))
}

pub async fn update_profile(
    State(pool): State<PgPool>,
    user: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> Result<Json<User>, AppError> {
    let user = User::update_profile(&pool, user.id, input).await?;
    Ok(Json(user))
}

pub async fn change_password(
    State(pool): State<PgPool>,
    user: AuthUser,
    Json(input): Json<ChangePassword>,
) -> Result<Json<serde_json::Value>, AppError> {
    User::change_password(&pool, user.id, input).await?;
    Ok(Json(
        serde_json::json!({ "message": "Password changed successfully" }),
    ))
}

pub async fn delete_account(
    State(pool): State<PgPool>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    User::deactivate(&pool, user.id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn list(State(pool): State<PgPool>, user: AuthUser) -> Result<Json<Vec<User>>, AppError> {
    user.require_role(&[Role::Admin])?;
    let users = User::list(&pool).await?;
    Ok(Json(users))
}
