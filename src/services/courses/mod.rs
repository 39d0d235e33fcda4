//! Course database abstraction.
//!
//! The study-plan path only needs "courses of a major, optionally in one
//! year", so every backend implements that single lookup.

mod json;
mod postgres;

pub use json::JsonCourseStore;
pub use postgres::PgCourseStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CourseStoreError;
use crate::models::{Course, CourseDriver, CourseQuery, CourseStoreConfig};

/// Read-only access to the course collection.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Courses whose `majors` contain `query.major` and, when set, whose
    /// `year` equals `query.year`.
    async fn find(&self, query: &CourseQuery) -> Result<Vec<Course>, CourseStoreError>;

    fn backend(&self) -> &'static str;
}

pub type SharedCourseStore = Arc<dyn CourseStore>;

/// Create a course store backend based on configuration.
pub async fn create_course_store(
    config: &CourseStoreConfig,
) -> Result<SharedCourseStore, CourseStoreError> {
    match config.driver {
        CourseDriver::Postgres => Ok(Arc::new(PgCourseStore::connect(config).await?)),
        CourseDriver::Json => Ok(Arc::new(JsonCourseStore::load(&config.json_path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_postgres_without_url_is_not_configured() {
        let config = CourseStoreConfig::default();
        let result = create_course_store(&config).await;
        assert!(matches!(result, Err(CourseStoreError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_json_driver() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.json");
        std::fs::write(
            &path,
            r#"[{"code":"DS101","title":"Statistics","majors":["Data Science"],"year":1,"semester":[1]}]"#,
        )
        .unwrap();

        let config = CourseStoreConfig {
            driver: CourseDriver::Json,
            json_path: path,
            ..Default::default()
        };
        let store = create_course_store(&config).await.unwrap();
        assert_eq!(store.backend(), "json");
        let found = store.find(&CourseQuery::new("Data Science")).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
