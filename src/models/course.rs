//! Course records and the study plans derived from them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A course as stored in the course database. Read-only from this crate's
/// point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub majors: Vec<String>,
    pub year: i32,
    /// Semesters the course is offered in
    #[serde(default)]
    pub semester: Vec<i32>,
}

impl Course {
    /// Label used in formatted plans, e.g. `COMP501: Computing Technology`.
    pub fn label(&self) -> String {
        format!("{}: {}", self.code, self.title)
    }

    pub fn has_major(&self, major: &str) -> bool {
        self.majors.iter().any(|m| m == major)
    }
}

/// Filter applied to the course collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseQuery {
    pub major: String,
    pub year: Option<i32>,
}

impl CourseQuery {
    pub fn new(major: impl Into<String>) -> Self {
        Self {
            major: major.into(),
            year: None,
        }
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn matches(&self, course: &Course) -> bool {
        course.has_major(&self.major) && self.year.is_none_or(|y| course.year == y)
    }
}

/// A parsed study-plan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyPlanRequest {
    pub major: String,
    /// Requested year of study (1-3), if the message named one
    pub year: Option<u32>,
}

/// Year label -> semester label -> course labels. Labels sort as strings.
pub type PlanGrid = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// A per-request study plan, discarded after formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyPlan {
    pub major: String,
    pub requested_year: Option<u32>,
    /// True when the year filter matched nothing and was dropped
    pub year_fallback: bool,
    pub grid: PlanGrid,
}

impl StudyPlan {
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, majors: &[&str], year: i32) -> Course {
        Course {
            code: code.to_string(),
            title: format!("{code} title"),
            majors: majors.iter().map(|m| m.to_string()).collect(),
            year,
            semester: vec![1],
        }
    }

    #[test]
    fn test_course_label() {
        let c = course("COMP501", &["Data Science"], 1);
        assert_eq!(c.label(), "COMP501: COMP501 title");
    }

    #[test]
    fn test_course_query_matches() {
        let c = course("COMP501", &["Data Science", "Computer Science"], 2);
        assert!(CourseQuery::new("Data Science").matches(&c));
        assert!(CourseQuery::new("Data Science").with_year(Some(2)).matches(&c));
        assert!(!CourseQuery::new("Data Science").with_year(Some(1)).matches(&c));
        assert!(!CourseQuery::new("Digital Services").matches(&c));
    }

    #[test]
    fn test_course_deserialize_defaults() {
        let c: Course =
            serde_json::from_str(r#"{"code":"X1","title":"Intro","year":1}"#).unwrap();
        assert!(c.majors.is_empty());
        assert!(c.semester.is_empty());
    }
}
