use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use sqlx::PgPool;

use crate::auth::{AuthUser, Role};
use crate::error::AppError;
use crate::models::job::{
    CategoryStats, CreateJob, Job, JobAdminFilters, JobSearchFilters, LocationStats,
};

pub async fn list(State(pool): State<PgPool>) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = Job::list_public(&pool).await?;
    Ok(Json(jobs))
}

pub async fn search(
    State(pool): State<PgPool>,
    Query(filters): Query<JobSearchFilters>,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = Job::search(&pool, &filters).await?;
    Ok(Json(jobs))
}

pub async fn admin_list(
    State(pool): State<PgPool>,
    user: AuthUser,
    Query(filters): Query<JobAdminFilters>,
) -> Result<Json<Vec<Job>>, AppError> {
    user.require_role(&[Role::Admin])?;
    let jobs = Job::admin_list(&pool, &filters).await?;
    Ok(Json(jobs))
}

pub async fn category_stats(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<CategoryStats>>, AppError> {
    let stats = Job::category_stats(&pool).await?;
    Ok(Json(stats))
}

pub async fn location_stats(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<LocationStats>>, AppError> {
    let stats = Job::location_stats(&pool).await?;
    Ok(Json(stats))
}

pub async fn by_user(
    State(pool): State<PgPool>,
    Path(user_id): Path<i32>,
    _user: AuthUser,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = Job::by_user(&pool, user_id).await?;
    Ok(Json(jobs))
}

pub async fn detail(
    State(pool): State<PgPool>,
    Path(id): Path<i32>,
) -> Result<Json<Job>, AppError> {
    let job = Job::detail(&pool, id, true).await?;
    Ok(Json(job))
}

pub async fn create(
    State(pool): State<PgPool>,
    user: AuthUser,
    Json(input): Json<CreateJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    user.require_role(&[Role::User, Role::Company, Role::Admin])?;
    let job = Job::create(&pool, user.id, input).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn update(
    State(pool): State<PgPool>,
    Path(id): Path<i32>,
    user: AuthUser,
    Json(input): Json<CreateJob>,
) -> Result<Json<Job>, AppError> {
    user.require_role(&[Role::Company, Role::Admin])?;
    let job = Job::update(&pool, id, input).await?;
    Ok(Json(job))
}

pub async fn delete(
    State(pool): State<PgPool>,
    Path(id): Path<i32>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    user.require_role(&[Role::Company, Role::Admin])?;
    Job::delete(&pool, id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn approve(
    State(pool): State<PgPool>,
    Path(id): Path<i32>,
    user: AuthUser,
) -> Result<Json<Job>, AppError> {
    user.require_role(&[Role::Admin])?;
    let job = Job::approve(&pool, id).await?;
    Ok(Json(job))
}
