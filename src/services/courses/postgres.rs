use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use super::CourseStore;
use crate::error::CourseStoreError;
use crate::models::{Course, CourseQuery, CourseStoreConfig};

/// Course collection stored in a PostgreSQL table:
///
/// ```sql
/// CREATE TABLE courses (
///     code     TEXT PRIMARY KEY,
///     title    TEXT NOT NULL,
///     majors   TEXT[] NOT NULL DEFAULT '{}',
///     year     INTEGER NOT NULL,
///     semester INTEGER[] NOT NULL DEFAULT '{}'
/// );
/// ```
pub struct PgCourseStore {
    pool: PgPool,
    select: String,
}

impl PgCourseStore {
    /// Connect using `config.url` (populated from `DATABASE_URL`).
    pub async fn connect(config: &CourseStoreConfig) -> Result<Self, CourseStoreError> {
        let url = config.url.as_deref().ok_or_else(|| {
            CourseStoreError::NotConfigured("set DATABASE_URL or courses.url".to_string())
        })?;

        if !is_valid_table_name(&config.table) {
            return Err(CourseStoreError::NotConfigured(format!(
                "invalid table name: {}",
                config.table
            )));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_max)
            .acquire_timeout(Duration::from_secs(config.pool_acquire_timeout.into()))
            .connect(url)
            .await
            .map_err(|e| CourseStoreError::ConnectionError(e.to_string()))?;

        Ok(Self::with_pool(pool, &config.table))
    }

    pub fn with_pool(pool: PgPool, table: &str) -> Self {
        Self {
            pool,
            select: select_statement(table),
        }
    }
}

fn select_statement(table: &str) -> String {
    format!(
        "SELECT code, title, majors, year, semester FROM {} \
         WHERE $1 = ANY(majors) AND ($2::INTEGER IS NULL OR year = $2) \
         ORDER BY code",
        table
    )
}

/// Accepts `table` or `schema.table` made of ASCII identifiers.
fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').count() <= 2
        && name.split('.').all(|part| {
            !part.is_empty()
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !part.starts_with(|c: char| c.is_ascii_digit())
        })
}

#[async_trait]
impl CourseStore for PgCourseStore {
    async fn find(&self, query: &CourseQuery) -> Result<Vec<Course>, CourseStoreError> {
        let courses: Vec<Course> = sqlx::query_as(&self.select)
            .bind(&query.major)
            .bind(query.year)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CourseStoreError::QueryError(e.to_string()))?;

        debug!(major = %query.major, year = ?query.year, count = courses.len(), "course query");
        Ok(courses)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
