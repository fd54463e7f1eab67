use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::error::AppError;
use crate::models::job::JobSummary;
use crate::validation::require_nonblank;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub mst: Option<String>,
    pub logo: Option<String>,
    pub organization_type: i32,
    pub website: Option<String>,
    pub address: Option<String>,
    pub company_size: Option<i32>,
    pub founded_year: Option<i32>,
    pub email: String,
    pub description: Option<String>,
    pub insight: Option<String>,
    pub overview: Option<String>,
    pub facebook_link: Option<String>,
    pub twitter_link: Option<String>,
    pub linkedin_link: Option<String>,
    pub instagram_link: Option<String>,
    pub is_show: bool,
    pub is_waiting: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CompanyImage {
    pub id: i32,
    pub url: String,
}

/// Search/list row: the company plus its approved-job count.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CompanyListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub company: Company,
    pub open_positions: i64,
}

/// Full write response: company, gallery and approved-job count.
#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    #[serde(flatten)]
    pub company: Company,
    pub company_images: Vec<CompanyImage>,
    pub open_positions: i64,
}

/// Detail view: the company, its gallery and its job postings.
#[derive(Debug, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub company_images: Vec<CompanyImage>,
    pub open_positions: i64,
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyImage {
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompany {
    pub name: String,
    pub mst: Option<String>,
    pub logo: Option<String>,
    pub organization_type: i32,
    pub website: Option<String>,
    pub address: Option<String>,
    pub company_size: Option<i32>,
    pub founded_year: Option<i32>,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    pub description: Option<String>,
    pub insight: Option<String>,
    pub overview: Option<String>,
    pub facebook_link: Option<String>,
    pub twitter_link: Option<String>,
    pub linkedin_link: Option<String>,
    pub instagram_link: Option<String>,
    pub is_show: Option<bool>,
    #[validate(nested)]
    pub company_images: Option<Vec<CreateCompanyImage>>,
}

#[derive(Debug, Deserialize)]
pub struct CompanySearchFilters {
    pub keyword: Option<String>,
    pub location: Option<i32>,
    pub organization_type: Option<i32>,
    pub is_show: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyAdminFilters {
    pub keyword: Option<String>,
    pub location: Option<i32>,
    pub organization_type: Option<i32>,
    pub is_show: Option<bool>,
    pub is_waiting: Option<bool>,
}

impl Company {
    pub async fn create(pool: &PgPool, input: CreateCompany) -> Result<CompanyResponse, AppError> {
        input.validate()?;
        let name = require_nonblank("name", &input.name)?;
        require_nonblank("email", &input.email)?;
        Self::ensure_unique(pool, &name, &input.email, None).await?;

        let mut tx = pool.begin().await?;

        // New companies wait for admin approval regardless of caller input.
        let company = sqlx::query_as::<_, Company>(
            "INSERT INTO companies (name, mst, logo, organization_type, website, address, \
             company_size, founded_year, email, description, insight, overview, facebook_link, \
             twitter_link, linkedin_link, instagram_link, is_show, is_waiting) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, TRUE) \
             RETURNING *",
        )
        .bind(&name)
        .bind(input.mst.as_deref().map(str::trim))
        .bind(&input.logo)
        .bind(input.organization_type)
        .bind(&input.website)
        .bind(&input.address)
        .bind(input.company_size)
        .bind(input.founded_year)
        .bind(&input.email)
        .bind(&input.description)
        .bind(&input.insight)
        .bind(&input.overview)
        .bind(&input.facebook_link)
        .bind(&input.twitter_link)
        .bind(&input.linkedin_link)
        .bind(&input.instagram_link)
        .bind(input.is_show.unwrap_or(false))
        .fetch_one(&mut *tx)
        .await?;

        let mut company_images = Vec::new();
        for image in input.company_images.unwrap_or_default() {
            let saved = sqlx::query_as::<_, CompanyImage>(
                "INSERT INTO company_images (company_id, url) VALUES ($1, $2) RETURNING id, url",
            )
            .bind(company.id)
            .bind(&image.url)
            .fetch_one(&mut *tx)
            .await?;
            company_images.push(saved);
        }

        tx.commit().await?;

        Ok(CompanyResponse {
            company,
            company_images,
            open_positions: 0,
        })
    }

    pub async fn update(
        pool: &PgPool,
        id: i32,
        input: CreateCompany,
    ) -> Result<CompanyResponse, AppError> {
        input.validate()?;
        let name = require_nonblank("name", &input.name)?;
        require_nonblank("email", &input.email)?;

        Self::get(pool, id).await?;
        Self::ensure_unique(pool, &name, &input.email, Some(id)).await?;

        let mut tx = pool.begin().await?;

        let company = sqlx::query_as::<_, Company>(
            "UPDATE companies SET name = $2, mst = $3, logo = $4, organization_type = $5, \
             website = $6, address = $7, company_size = $8, founded_year = $9, email = $10, \
             description = $11, insight = $12, overview = $13, facebook_link = $14, \
             twitter_link = $15, linkedin_link = $16, instagram_link = $17, is_show = $18, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&name)
        .bind(input.mst.as_deref().map(str::trim))
        .bind(&input.logo)
        .bind(input.organization_type)
        .bind(&input.website)
        .bind(&input.address)
        .bind(input.company_size)
        .bind(input.founded_year)
        .bind(&input.email)
        .bind(&input.description)
        .bind(&input.insight)
        .bind(&input.overview)
        .bind(&input.facebook_link)
        .bind(&input.twitter_link)
        .bind(&input.linkedin_link)
        .bind(&input.instagram_link)
        .bind(input.is_show.unwrap_or(false))
        .fetch_one(&mut *tx)
        .await?;

        // Images are replaced wholesale when the field is present.
        if let Some(images) = input.company_images {
            sqlx::query("DELETE FROM company_images WHERE company_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for image in &images {
                sqlx::query("INSERT INTO company_images (company_id, url) VALUES ($1, $2)")
                    .bind(id)
                    .bind(&image.url)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        let company_images = Self::images(pool, id).await?;
        let open_positions = Self::open_positions(pool, id).await?;
        Ok(CompanyResponse {
            company,
            company_images,
            open_positions,
        })
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<Company, AppError> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company with ID {id} not found")))
    }

    /// Public search. Pending companies are never visible here; admin
    /// listings go through [`Company::admin_list`] instead.
    pub async fn search(
        pool: &PgPool,
        filters: &CompanySearchFilters,
    ) -> Result<Vec<CompanyListing>, AppError> {
        Self::search_inner(
            pool,
            filters.keyword.as_deref(),
            filters.organization_type,
            filters.location,
            filters.is_show,
            Some(false),
        )
        .await
    }

    pub async fn admin_list(
        pool: &PgPool,
        filters: &CompanyAdminFilters,
    ) -> Result<Vec<CompanyListing>, AppError> {
        Self::search_inner(
            pool,
            filters.keyword.as_deref(),
            filters.organization_type,
            filters.location,
            filters.is_show,
            filters.is_waiting,
        )
        .await
    }

    async fn search_inner(
        pool: &PgPool,
        keyword: Option<&str>,
        organization_type: Option<i32>,
        location: Option<i32>,
        is_show: Option<bool>,
        is_waiting: Option<bool>,
    ) -> Result<Vec<CompanyListing>, AppError> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        let organization_type =
            organization_type.filter(|&t| t != crate::constants::ALL_ORGANIZATION_TYPES);
        // The location filter token-matches against the comma-encoded
        // location list of any job the company owns.
        let location = location
            .filter(|&l| l != crate::constants::ALL_LOCATIONS)
            .map(|l| l.to_string());

        let listings = sqlx::query_as::<_, CompanyListing>(
            "SELECT c.*, COUNT(j.id) FILTER (WHERE NOT j.is_waiting) AS open_positions \
             FROM companies c \
             LEFT JOIN jobs j ON j.company_id = c.id \
             WHERE ($1::text IS NULL OR c.name ILIKE '%' || $1 || '%') \
               AND ($2::int IS NULL OR c.organization_type = $2) \
               AND ($3::text IS NULL OR EXISTS (\
                     SELECT 1 FROM jobs jl WHERE jl.company_id = c.id AND (\
                       jl.location = $3 OR jl.location LIKE $3 || ',%' OR \
                       jl.location LIKE '%,' || $3 || ',%' OR jl.location LIKE '%,' || $3))) \
               AND ($4::bool IS NULL OR c.is_show = $4) \
               AND ($5::bool IS NULL OR c.is_waiting = $5) \
             GROUP BY c.id \
             ORDER BY c.id",
        )
        .bind(keyword)
        .bind(organization_type)
        .bind(location)
        .bind(is_show)
        .bind(is_waiting)
        .fetch_all(pool)
        .await?;
        Ok(listings)
    }

    /// Detail view. Public callers never see a pending company; its jobs
    /// list is limited to approved postings for them as well.
    pub async fn detail(pool: &PgPool, id: i32, public: bool) -> Result<CompanyDetail, AppError> {
        let company = Self::get(pool, id).await?;
        if public && company.is_waiting {
            return Err(AppError::NotFound("Company not found".to_string()));
        }

        let company_images = Self::images(pool, id).await?;
        let open_positions = Self::open_positions(pool, id).await?;
        let jobs = JobSummary::for_company(pool, id, public).await?;

        Ok(CompanyDetail {
            company,
            company_images,
            open_positions,
            jobs,
        })
    }

    pub async fn delete(pool: &PgPool, id: i32) -> Result<(), AppError> {
        Self::get(pool, id).await?;

        let (job_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE company_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        if job_count > 0 {
            return Err(AppError::Conflict(
                "Cannot delete company with active jobs".to_string(),
            ));
        }

        // company_images cascade with the row
        sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Admin approval: Pending -> Approved, once.
    pub async fn approve(pool: &PgPool, id: i32) -> Result<CompanyResponse, AppError> {
        let company = Self::get(pool, id).await?;
        if !company.is_waiting {
            return Err(AppError::InvalidState(format!(
                "Company with ID {id} is already approved"
            )));
        }

        let company = sqlx::query_as::<_, Company>(
            "UPDATE companies SET is_waiting = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        let company_images = Self::images(pool, id).await?;
        let open_positions = Self::open_positions(pool, id).await?;
        Ok(CompanyResponse {
            company,
            company_images,
            open_positions,
        })
    }

    async fn images(pool: &PgPool, id: i32) -> Result<Vec<CompanyImage>, AppError> {
        let images = sqlx::query_as::<_, CompanyImage>(
            "SELECT id, url FROM company_images WHERE company_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        Ok(images)
    }

    async fn open_positions(pool: &PgPool, id: i32) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM jobs WHERE company_id = $1 AND NOT is_waiting",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Name/email uniqueness. On update the entity's own row is excluded so
    /// resubmitting unchanged values is not flagged as a collision.
    async fn ensure_unique(
        pool: &PgPool,
        name: &str,
        email: &str,
        exclude_id: Option<i32>,
    ) -> Result<(), AppError> {
        let name_owner: Option<(i32,)> = sqlx::query_as("SELECT id FROM companies WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if let Some((owner,)) = name_owner
            && Some(owner) != exclude_id
        {
            return Err(AppError::Conflict("Company name already exists".to_string()));
        }

        let email_owner: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM companies WHERE email = $1")
                .bind(email)
                .fetch_optional(pool)
                .await?;
        if let Some((owner,)) = email_owner
            && Some(owner) != exclude_id
        {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        Ok(())
    }
}
