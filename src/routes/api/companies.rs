use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use sqlx::PgPool;

use crate::auth::{AuthUser, Role};
use crate::error::AppError;
use crate::models::company::{
    Company, CompanyAdminFilters, CompanyDetail, CompanyListing, CompanyResponse,
    CompanySearchFilters, CreateCompany,
};

pub async fn list(State(pool): State<PgPool>) -> Result<Json<Vec<CompanyListing>>, AppError> {
    let filters = CompanySearchFilters {
        keyword: None,
        location: None,
        organization_type: None,
        is_show: None,
    };
    let companies = Company::search(&pool, &filters).await?;
    Ok(Json(companies))
}

pub async fn search(
    State(pool): State<PgPool>,
    Query(filters): Query<CompanySearchFilters>,
) -> Result<Json<Vec<CompanyListing>>, AppError> {
    let companies = Company::search(&pool, &filters).await?;
    Ok(Json(companies))
}

pub async fn admin_list(
    State(pool): State<PgPool>,
    user: AuthUser,
    Query(filters): Query<CompanyAdminFilters>,
) -> Result<Json<Vec<CompanyListing>>, AppError> {
    user.require_role(&[Role::Admin])?;
    let companies = Company::admin_list(&pool, &filters).await?;
    Ok(Json(companies))
}

pub async fn detail(
    State(pool): State<PgPool>,
    Path(id): Path<i32>,
) -> Result<Json<CompanyDetail>, AppError> {
    let company = Company::detail(&pool, id, true).await?;
    Ok(Json(company))
}

pub async fn create(
    State(pool): State<PgPool>,
    user: AuthUser,
    Json(input): Json<CreateCompany>,
) -> Result<(StatusCode, Json<CompanyResponse>), AppError> {
    user.require_role(&[Role::Company, Role::Admin])?;
    let company = Company::create(&pool, input).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn update(
    State(pool): State<PgPool>,
    Path(id): Path<i32>,
    user: AuthUser,
    Json(input): Json<CreateCompany>,
) -> Result<Json<CompanyResponse>, AppError> {
    user.require_role(&[Role::Company, Role::Admin])?;
    let company = Company::update(&pool, id, input).await?;
    Ok(Json(company))
}

pub async fn delete(
    State(pool): State<PgPool>,
    Path(id): Path<i32>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    user.require_role(&[Role::Company, Role::Admin])?;
    Company::delete(&pool, id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn approve(
    State(pool): State<PgPool>,
    Path(id): Path<i32>,
    user: AuthUser,
) -> Result<Json<CompanyResponse>, AppError> {
    user.require_role(&[Role::Admin])?;
    let company = Company::approve(&pool, id).await?;
    Ok(Json(company))
}
