//! Study-plan lookup, grouping and text rendering.

use std::fmt::Write;

use tracing::info;

use crate::error::CourseStoreError;
use crate::models::{Course, CourseQuery, PlanGrid, StudyPlan, StudyPlanRequest};
use crate::services::courses::CourseStore;

/// Query courses for the request. When a year was requested but matched
/// nothing, the query is repeated for all years and the plan is marked.
pub async fn build_plan(
    store: &dyn CourseStore,
    request: &StudyPlanRequest,
) -> Result<StudyPlan, CourseStoreError> {
    let year = request.year.map(|y| y as i32);
    let query = CourseQuery::new(&request.major).with_year(year);
    let mut courses = store.find(&query).await?;

    let mut year_fallback = false;
    if courses.is_empty() && year.is_some() {
        info!(
            major = %request.major,
            year = ?request.year,
            "no courses for requested year, showing all years"
        );
        courses = store.find(&query.with_year(None)).await?;
        year_fallback = true;
    }

    Ok(StudyPlan {
        major: request.major.clone(),
        requested_year: request.year,
        year_fallback,
        grid: group_courses(&courses),
    })
}

/// Group course labels by `Year N` then `Semester N`. A course offered in
/// several semesters is listed under each; duplicate labels collapse.
pub fn group_courses(courses: &[Course]) -> PlanGrid {
    let mut grid = PlanGrid::new();
    for course in courses {
        for semester in &course.semester {
            grid.entry(format!("Year {}", course.year))
                .or_default()
                .entry(format!("Semester {}", semester))
                .or_default()
                .insert(course.label());
        }
    }
    grid
}

/// Render a plan as indented text. Year and semester labels sort as strings,
/// so `Year 10` would precede `Year 2`.
pub fn format_plan(plan: &StudyPlan) -> String {
    let mut out = format!("📘 Study Plan for {}", plan.major);
    if let Some(year) = plan.requested_year
        && !plan.year_fallback
    {
        let _ = write!(out, " (Year {year})");
    }
    out.push_str(":\n\n");

    if plan.year_fallback
        && let Some(year) = plan.requested_year
    {
        let _ = writeln!(out, "(No courses found for Year {year}; showing all years.)\n");
    }

    for (year, semesters) in &plan.grid {
        let _ = writeln!(out, "{year}:");
        for (semester, labels) in semesters {
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
            let _ = writeln!(out, "  {semester}: {}", labels.join(", "));
        }
        out.push('\n');
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::courses::JsonCourseStore;

    fn course(code: &str, title: &str, year: i32, semester: &[i32]) -> Course {
        Course {
            code: code.to_string(),
            title: title.to_string(),
            majors: vec!["Data Science".to_string()],
            year,
            semester: semester.to_vec(),
        }
    }

    fn store() -> JsonCourseStore {
        JsonCourseStore::from_courses(vec![
            course("DS101", "Statistics", 1, &[1]),
            course("COMP501", "Computing Technology", 1, &[1, 2]),
            course("DS201", "Machine Learning", 2, &[2]),
        ])
    }

    #[test]
    fn test_group_courses() {
        let grid = group_courses(&store_courses());
        let year_one = &grid["Year 1"];
        assert_eq!(year_one["Semester 1"].len(), 2);
        assert!(year_one["Semester 2"].contains("COMP501: Computing Technology"));
        assert!(grid["Year 2"]["Semester 2"].contains("DS201: Machine Learning"));
    }

    fn store_courses() -> Vec<Course> {
        vec![
            course("DS101", "Statistics", 1, &[1]),
            course("COMP501", "Computing Technology", 1, &[1, 2]),
            course("COMP501", "Computing Technology", 1, &[1]),
            course("DS201", "Machine Learning", 2, &[2]),
        ]
    }

    #[tokio::test]
    async fn test_format_full_plan() {
        let request = StudyPlanRequest {
            major: "Data Science".to_string(),
            year: None,
        };
        let plan = build_plan(&store(), &request).await.unwrap();
        assert_eq!(
            format_plan(&plan),
            "📘 Study Plan for Data Science:\n\n\
             Year 1:\n\
             \x20 Semester 1: COMP501: Computing Technology, DS101: Statistics\n\
             \x20 Semester 2: COMP501: Computing Technology\n\n\
             Year 2:\n\
             \x20 Semester 2: DS201: Machine Learning"
        );
    }

    #[tokio::test]
    async fn test_year_filter() {
        let request = StudyPlanRequest {
            major: "Data Science".to_string(),
            year: Some(2),
        };
        let plan = build_plan(&store(), &request).await.unwrap();
        assert!(!plan.year_fallback);
        assert_eq!(
            format_plan(&plan),
            "📘 Study Plan for Data Science (Year 2):\n\nYear 2:\n  Semester 2: DS201: Machine Learning"
        );
    }

    #[tokio::test]
    async fn test_year_fallback_shows_all_years() {
        let request = StudyPlanRequest {
            major: "Data Science".to_string(),
            year: Some(3),
        };
        let plan = build_plan(&store(), &request).await.unwrap();
        assert!(plan.year_fallback);
        assert_eq!(plan.grid.len(), 2);

        let text = format_plan(&plan);
        assert!(text.starts_with(
            "📘 Study Plan for Data Science:\n\n(No courses found for Year 3; showing all years.)\n\nYear 1:"
        ));
        assert!(text.contains("Year 2:"));
    }

    #[tokio::test]
    async fn test_unknown_major_yields_header_only() {
        let request = StudyPlanRequest {
            major: "Digital Services".to_string(),
            year: None,
        };
        let plan = build_plan(&store(), &request).await.unwrap();
        assert!(plan.is_empty());
        assert_eq!(format_plan(&plan), "📘 Study Plan for Digital Services:");
    }
}
