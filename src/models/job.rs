use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::codes;
use crate::constants::{
    ALL_CATEGORIES, ALL_LOCATIONS, MAJOR_LOCATION_IMAGES, MAJOR_LOCATIONS,
};
use crate::error::AppError;
use crate::validation::{check_dates, check_salary, require_codes, require_nonblank};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Comma-encoded category code set, e.g. "1,2".
    pub category: String,
    /// Comma-encoded location code set.
    pub location: String,
    pub type_of_employment: i32,
    pub experience_level: i32,
    pub required_qualification: Option<i32>,
    pub gender: Option<String>,
    pub grade: Option<i32>,
    pub company_id: Option<i32>,
    pub user_id: i32,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_type: i32,
    pub benefits: Option<String>,
    pub is_featured: bool,
    pub is_waiting: bool,
    pub image_logo: Option<String>,
    pub banner_logo: Option<String>,
    pub posted_date: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub detail_description: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact posting row embedded in company detail views.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub location: String,
    pub type_of_employment: i32,
    pub experience_level: i32,
    pub is_featured: bool,
    pub posted_date: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_type: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJob {
    pub title: String,
    pub description: String,
    pub category: Vec<i32>,
    pub location: Vec<i32>,
    pub type_of_employment: i32,
    pub experience_level: i32,
    pub required_qualification: Option<i32>,
    pub gender: Option<Vec<i32>>,
    pub grade: Option<i32>,
    pub company_id: Option<i32>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_type: i32,
    pub benefits: Option<Vec<i32>>,
    pub is_featured: Option<bool>,
    pub posted_date: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub detail_description: Option<String>,
    #[validate(email(message = "Contact email must be a valid email address"))]
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub image_logo: Option<String>,
    pub banner_logo: Option<String>,
}

/// Cross-field checks plus encoding of the multi-value fields into their
/// stored form. Runs in full before any write.
struct NormalizedJob {
    title: String,
    description: String,
    category: String,
    location: String,
    gender: Option<String>,
    benefits: Option<String>,
    posted_date: DateTime<Utc>,
    deadline: DateTime<Utc>,
}

impl CreateJob {
    fn normalized(&self) -> Result<NormalizedJob, AppError> {
        let title = require_nonblank("title", &self.title)?;
        let description = require_nonblank("description", &self.description)?;
        require_codes("category", &self.category)?;
        require_codes("location", &self.location)?;
        check_salary(self.salary_type, self.salary_min, self.salary_max)?;

        let posted_date = self.posted_date.unwrap_or_else(Utc::now);
        let deadline = self
            .deadline
            .ok_or_else(|| AppError::Validation("Deadline is required".to_string()))?;
        check_dates(posted_date, deadline)?;

        Ok(NormalizedJob {
            title,
            description,
            category: codes::encode(&self.category),
            location: codes::encode(&self.location),
            gender: self.gender.as_deref().map(codes::encode),
            benefits: self.benefits.as_deref().map(codes::encode),
            posted_date,
            deadline,
        })
    }
}

/// Public search request. `type_of_employment` and `experience_level` take
/// comma-joined code lists and filter by set membership on the scalar column.
#[derive(Debug, Deserialize)]
pub struct JobSearchFilters {
    pub keyword: Option<String>,
    pub category: Option<i32>,
    pub location: Option<i32>,
    pub type_of_employment: Option<String>,
    pub experience_level: Option<String>,
    pub is_featured: Option<bool>,
    pub company_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct JobAdminFilters {
    pub keyword: Option<String>,
    pub category: Option<i32>,
    pub location: Option<i32>,
    pub type_of_employment: Option<String>,
    pub experience_level: Option<String>,
    pub is_featured: Option<bool>,
    pub company_id: Option<i32>,
    pub is_waiting: Option<bool>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub category: i32,
    pub job_count: i64,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct LocationStats {
    pub location: i32,
    pub job_count: i64,
    pub is_major_city: bool,
    pub image: Option<String>,
}

impl Job {
    pub async fn create(pool: &PgPool, user_id: i32, input: CreateJob) -> Result<Job, AppError> {
        input.validate()?;
        let n = input.normalized()?;
        if let Some(company_id) = input.company_id {
            Self::ensure_company_exists(pool, company_id).await?;
        }

        // New postings wait for admin approval.
        let job = sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (title, description, category, location, type_of_employment, \
             experience_level, required_qualification, gender, grade, company_id, user_id, \
             salary_min, salary_max, salary_type, benefits, is_featured, is_waiting, image_logo, \
             banner_logo, posted_date, deadline, detail_description, email, phone_number, address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, TRUE, \
             $17, $18, $19, $20, $21, $22, $23, $24) RETURNING *",
        )
        .bind(&n.title)
        .bind(&n.description)
        .bind(&n.category)
        .bind(&n.location)
        .bind(input.type_of_employment)
        .bind(input.experience_level)
        .bind(input.required_qualification)
        .bind(&n.gender)
        .bind(input.grade)
        .bind(input.company_id)
        .bind(user_id)
        .bind(input.salary_min)
        .bind(input.salary_max)
        .bind(input.salary_type)
        .bind(&n.benefits)
        .bind(input.is_featured.unwrap_or(false))
        .bind(&input.image_logo)
        .bind(&input.banner_logo)
        .bind(n.posted_date)
        .bind(n.deadline)
        .bind(&input.detail_description)
        .bind(&input.email)
        .bind(&input.phone_number)
        .bind(&input.address)
        .fetch_one(pool)
        .await?;
        Ok(job)
    }

    /// Wholesale update; multi-value fields have no partial add/remove
    /// semantics. Moderation state is left untouched.
    pub async fn update(pool: &PgPool, id: i32, input: CreateJob) -> Result<Job, AppError> {
        input.validate()?;
        let n = input.normalized()?;
        Self::get(pool, id).await?;
        if let Some(company_id) = input.company_id {
            Self::ensure_company_exists(pool, company_id).await?;
        }

        let job = sqlx::query_as::<_, Job>(
            "UPDATE jobs SET title = $2, description = $3, category = $4, location = $5, \
             type_of_employment = $6, experience_level = $7, required_qualification = $8, \
             gender = $9, grade = $10, company_id = $11, salary_min = $12, salary_max = $13, \
             salary_type = $14, benefits = $15, is_featured = $16, image_logo = $17, \
             banner_logo = $18, posted_date = $19, deadline = $20, detail_description = $21, \
             email = $22, phone_number = $23, address = $24, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&n.title)
        .bind(&n.description)
        .bind(&n.category)
        .bind(&n.location)
        .bind(input.type_of_employment)
        .bind(input.experience_level)
        .bind(input.required_qualification)
        .bind(&n.gender)
        .bind(input.grade)
        .bind(input.company_id)
        .bind(input.salary_min)
        .bind(input.salary_max)
        .bind(input.salary_type)
        .bind(&n.benefits)
        .bind(input.is_featured.unwrap_or(false))
        .bind(&input.image_logo)
        .bind(&input.banner_logo)
        .bind(n.posted_date)
        .bind(n.deadline)
        .bind(&input.detail_description)
        .bind(&input.email)
        .bind(&input.phone_number)
        .bind(&input.address)
        .fetch_one(pool)
        .await?;
        Ok(job)
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<Job, AppError> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job with ID {id} not found")))
    }

    /// Detail lookup. A pending job is not found for public callers.
    pub async fn detail(pool: &PgPool, id: i32, public: bool) -> Result<Job, AppError> {
        let job = Self::get(pool, id).await?;
        if public && job.is_waiting {
            return Err(AppError::NotFound("Job not found".to_string()));
        }
        Ok(job)
    }

    /// Public listing: approved jobs, most recently posted first.
    pub async fn list_public(pool: &PgPool) -> Result<Vec<Job>, AppError> {
        let filters = JobSearchFilters {
            keyword: None,
            category: None,
            location: None,
            type_of_employment: None,
            experience_level: None,
            is_featured: None,
            company_id: None,
        };
        Self::search(pool, &filters).await
    }

    pub async fn search(pool: &PgPool, filters: &JobSearchFilters) -> Result<Vec<Job>, AppError> {
        Self::search_inner(
            pool,
            filters.keyword.as_deref(),
            filters.category,
            filters.location,
            filters.type_of_employment.as_deref(),
            filters.experience_level.as_deref(),
            filters.is_featured,
            filters.company_id,
            Some(false),
        )
        .await
    }

    /// Admin listing: both moderation states unless explicitly filtered.
    pub async fn admin_list(
        pool: &PgPool,
        filters: &JobAdminFilters,
    ) -> Result<Vec<Job>, AppError> {
        Self::search_inner(
            pool,
            filters.keyword.as_deref(),
            filters.category,
            filters.location,
            filters.type_of_employment.as_deref(),
            filters.experience_level.as_deref(),
            filters.is_featured,
            filters.company_id,
            filters.is_waiting,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn search_inner(
        pool: &PgPool,
        keyword: Option<&str>,
        category: Option<i32>,
        location: Option<i32>,
        type_of_employment: Option<&str>,
        experience_level: Option<&str>,
        is_featured: Option<bool>,
        company_id: Option<i32>,
        is_waiting: Option<bool>,
    ) -> Result<Vec<Job>, AppError> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        // Single codes token-match the comma-encoded columns; the sentinel
        // "all" code drops the filter.
        let category = category
            .filter(|&c| c != ALL_CATEGORIES)
            .map(|c| c.to_string());
        let location = location
            .filter(|&l| l != ALL_LOCATIONS)
            .map(|l| l.to_string());
        let type_of_employment =
            type_of_employment.map(codes::decode).filter(|v| !v.is_empty());
        let experience_level =
            experience_level.map(codes::decode).filter(|v| !v.is_empty());

        let jobs = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs \
             WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%' \
                    OR description ILIKE '%' || $1 || '%') \
               AND ($2::text IS NULL OR category = $2 OR category LIKE $2 || ',%' \
                    OR category LIKE '%,' || $2 || ',%' OR category LIKE '%,' || $2) \
               AND ($3::text IS NULL OR location = $3 OR location LIKE $3 || ',%' \
                    OR location LIKE '%,' || $3 || ',%' OR location LIKE '%,' || $3) \
               AND ($4::int[] IS NULL OR type_of_employment = ANY($4)) \
               AND ($5::int[] IS NULL OR experience_level = ANY($5)) \
               AND ($6::bool IS NULL OR is_featured = $6) \
               AND ($7::int IS NULL OR company_id = $7) \
               AND ($8::bool IS NULL OR is_waiting = $8) \
             ORDER BY posted_date DESC",
        )
        .bind(keyword)
        .bind(category)
        .bind(location)
        .bind(type_of_employment)
        .bind(experience_level)
        .bind(is_featured)
        .bind(company_id)
        .bind(is_waiting)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }

    /// Postings owned by a user, in every moderation state.
    pub async fn by_user(pool: &PgPool, user_id: i32) -> Result<Vec<Job>, AppError> {
        let jobs = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE user_id = $1 ORDER BY posted_date DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }

    /// Admin approval: Pending -> Approved, once.
    pub async fn approve(pool: &PgPool, id: i32) -> Result<Job, AppError> {
        let job = Self::get(pool, id).await?;
        if !job.is_waiting {
            return Err(AppError::InvalidState(format!(
                "Job with ID {id} is already approved"
            )));
        }

        let job = sqlx::query_as::<_, Job>(
            "UPDATE jobs SET is_waiting = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(job)
    }

    pub async fn delete(pool: &PgPool, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Job with ID {id} not found")));
        }
        Ok(())
    }

    /// Per-category job counts over approved postings. A job listing several
    /// categories counts toward each of them.
    pub async fn category_stats(pool: &PgPool) -> Result<Vec<CategoryStats>, AppError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT category FROM jobs WHERE NOT is_waiting")
                .fetch_all(pool)
                .await?;
        let counts = codes::tally(rows.iter().map(|(c,)| c.as_str()));
        Ok(rank_by_count(counts))
    }

    /// Job counts for the fixed major-location list, zero-filled.
    pub async fn location_stats(pool: &PgPool) -> Result<Vec<LocationStats>, AppError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT location FROM jobs WHERE NOT is_waiting")
                .fetch_all(pool)
                .await?;
        let counts = codes::tally(rows.iter().map(|(l,)| l.as_str()));
        Ok(major_location_report(&counts))
    }

    async fn ensure_company_exists(pool: &PgPool, company_id: i32) -> Result<(), AppError> {
        let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!(
                "Company with ID {company_id} not found"
            )));
        }
        Ok(())
    }
}

impl JobSummary {
    pub async fn for_company(
        pool: &PgPool,
        company_id: i32,
        public: bool,
    ) -> Result<Vec<JobSummary>, AppError> {
        let jobs = sqlx::query_as::<_, JobSummary>(
            "SELECT id, title, category, location, type_of_employment, experience_level, \
             is_featured, posted_date, deadline, salary_min, salary_max, salary_type \
             FROM jobs WHERE company_id = $1 AND ($2::bool IS NULL OR is_waiting = $2) \
             ORDER BY posted_date DESC",
        )
        .bind(company_id)
        .bind(public.then_some(false))
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }
}

/// Order category counts most-popular first; equal counts order by code so
/// the report is deterministic.
fn rank_by_count(counts: HashMap<i32, i64>) -> Vec<CategoryStats> {
    let mut stats: Vec<CategoryStats> = counts
        .into_iter()
        .map(|(category, job_count)| CategoryStats {
            category,
            job_count,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.job_count
            .cmp(&a.job_count)
            .then(a.category.cmp(&b.category))
    });
    stats
}

/// Every major location appears exactly once, zero-filled when no approved
/// job references it; other locations are excluded from this report.
fn major_location_report(counts: &HashMap<i32, i64>) -> Vec<LocationStats> {
    MAJOR_LOCATIONS
        .iter()
        .enumerate()
        .map(|(i, &location)| LocationStats {
            location,
            job_count: counts.get(&location).copied().unwrap_or(0),
            is_major_city: true,
            image: MAJOR_LOCATION_IMAGES.get(i).map(|s| s.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;

    #[test]
    fn categories_rank_by_count_then_code() {
        let counts = codes::tally(["1,2", "2", "3"]);
        let stats = rank_by_count(counts);
        let pairs: Vec<(i32, i64)> = stats.iter().map(|s| (s.category, s.job_count)).collect();
        assert_eq!(pairs, vec![(2, 2), (1, 1), (3, 1)]);
    }

    #[test]
    fn multi_category_job_counts_toward_each_code() {
        let counts = codes::tally(["10,20"]);
        let stats = rank_by_count(counts);
        let pairs: Vec<(i32, i64)> = stats.iter().map(|s| (s.category, s.job_count)).collect();
        assert_eq!(pairs, vec![(10, 1), (20, 1)]);
    }

    #[test]
    fn major_locations_report_zero_for_missing_cities() {
        let counts = codes::tally([format!("{}", MAJOR_LOCATIONS[0]).as_str()]);
        let report = major_location_report(&counts);
        assert_eq!(report.len(), MAJOR_LOCATIONS.len());
        assert_eq!(report[0].job_count, 1);
        assert!(report[1..].iter().all(|s| s.job_count == 0));
        assert!(report.iter().all(|s| s.is_major_city));
    }

    #[test]
    fn major_locations_keep_companion_images_by_index() {
        let report = major_location_report(&HashMap::new());
        for (i, stats) in report.iter().enumerate() {
            assert_eq!(stats.image.as_deref(), Some(MAJOR_LOCATION_IMAGES[i]));
        }
    }

    #[test]
    fn non_major_locations_are_excluded() {
        let counts = codes::tally(["999"]);
        let report = major_location_report(&counts);
        assert!(report.iter().all(|s| s.location != 999));
        assert!(report.iter().all(|s| s.job_count == 0));
    }

    fn sample_job() -> CreateJob {
        use chrono::TimeZone;
        CreateJob {
            title: "Math Teacher".to_string(),
            description: "Teach algebra".to_string(),
            category: vec![1, 2],
            location: vec![1],
            type_of_employment: 2,
            experience_level: 1,
            required_qualification: None,
            gender: None,
            grade: None,
            company_id: None,
            salary_min: Some(1000),
            salary_max: Some(2000),
            salary_type: 1,
            benefits: Some(vec![1, 3]),
            is_featured: None,
            posted_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            deadline: Some(Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()),
            detail_description: None,
            email: None,
            phone_number: None,
            address: None,
            image_logo: None,
            banner_logo: None,
        }
    }

    #[test]
    fn normalization_encodes_multi_value_fields() {
        let n = sample_job().normalized().expect("valid job");
        assert_eq!(n.category, "1,2");
        assert_eq!(n.location, "1");
        assert_eq!(n.benefits.as_deref(), Some("1,3"));
    }

    #[test]
    fn normalization_requires_deadline_and_codes() {
        let mut missing_deadline = sample_job();
        missing_deadline.deadline = None;
        assert!(missing_deadline.normalized().is_err());

        let mut no_category = sample_job();
        no_category.category = vec![];
        assert!(no_category.normalized().is_err());

        let mut no_location = sample_job();
        no_location.location = vec![];
        assert!(no_location.normalized().is_err());
    }

    #[test]
    fn normalization_enforces_salary_and_date_rules() {
        use chrono::TimeZone;
        let mut inverted_salary = sample_job();
        inverted_salary.salary_min = Some(100);
        inverted_salary.salary_max = Some(50);
        assert!(inverted_salary.normalized().is_err());

        let mut late_deadline = sample_job();
        late_deadline.deadline = Some(Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap());
        assert!(late_deadline.normalized().is_err());

        let mut blank_title = sample_job();
        blank_title.title = "   ".to_string();
        assert!(blank_title.normalized().is_err());
    }
}
