use std::path::Path;

use async_trait::async_trait;

use super::CourseStore;
use crate::error::CourseStoreError;
use crate::models::{Course, CourseQuery};

/// Course collection held in memory, loaded from a JSON array of courses.
#[derive(Debug, Clone, Default)]
pub struct JsonCourseStore {
    courses: Vec<Course>,
}

impl JsonCourseStore {
    pub fn load(path: &Path) -> Result<Self, CourseStoreError> {
        let content = std::fs::read_to_string(path)?;
        let courses: Vec<Course> = serde_json::from_str(&content)?;
        Ok(Self { courses })
    }

    pub fn from_courses(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[async_trait]
impl CourseStore for JsonCourseStore {
    async fn find(&self, query: &CourseQuery) -> Result<Vec<Course>, CourseStoreError> {
        Ok(self
            .courses
            .iter()
            .filter(|c| query.matches(c))
            .cloned()
            .collect())
    }

    fn backend(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, major: &str, year: i32) -> Course {
        Course {
            code: code.to_string(),
            title: "Title".to_string(),
            majors: vec![major.to_string()],
            year,
            semester: vec![1, 2],
        }
    }

    #[tokio::test]
    async fn test_find_filters_major_and_year() {
        let store = JsonCourseStore::from_courses(vec![
            course("SD101", "Software Development", 1),
            course("SD201", "Software Development", 2),
            course("DS101", "Data Science", 1),
        ]);

        let all = store
            .find(&CourseQuery::new("Software Development"))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let year_two = store
            .find(&CourseQuery::new("Software Development").with_year(Some(2)))
            .await
            .unwrap();
        assert_eq!(year_two.len(), 1);
        assert_eq!(year_two[0].code, "SD201");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            JsonCourseStore::load(&dir.path().join("missing.json")),
            Err(CourseStoreError::FileError(_))
        ));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonCourseStore::load(&path),
            Err(CourseStoreError::ParseError(_))
        ));
    }
}
