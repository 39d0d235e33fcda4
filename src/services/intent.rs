//! Routing of user messages to the study-plan or open-question path.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Intent, StudyPlanConfig, StudyPlanRequest};

static STUDY_PLAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)study\s*plan|course\s*list").expect("valid study-plan pattern")
});

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)year\s*([1-3])").expect("valid year pattern"));

/// Decides which branch handles a message.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, message: &str) -> Intent;
}

/// Keyword classifier: "study plan" / "course list" selects the study-plan
/// branch, anything else is an open question.
#[derive(Debug, Clone)]
pub struct RegexIntentClassifier {
    majors: Vec<String>,
    default_major: String,
}

impl RegexIntentClassifier {
    pub fn new(config: &StudyPlanConfig) -> Self {
        Self {
            majors: config.majors.clone(),
            default_major: config.default_major.clone(),
        }
    }
}

impl Default for RegexIntentClassifier {
    fn default() -> Self {
        Self::new(&StudyPlanConfig::default())
    }
}

impl IntentClassifier for RegexIntentClassifier {
    fn classify(&self, message: &str) -> Intent {
        if !is_study_plan_request(message) {
            return Intent::OpenQuestion(message.to_string());
        }

        let major = detect_major(message, &self.majors).unwrap_or(self.default_major.as_str());
        Intent::StudyPlan(StudyPlanRequest {
            major: major.to_string(),
            year: detect_year(message),
        })
    }
}

pub fn is_study_plan_request(message: &str) -> bool {
    STUDY_PLAN.is_match(message)
}

/// First major (in list order) that occurs in `text`, ignoring case.
pub fn detect_major<'a>(text: &str, majors: &'a [String]) -> Option<&'a str> {
    let text = text.to_lowercase();
    majors
        .iter()
        .find(|major| text.contains(&major.to_lowercase()))
        .map(String::as_str)
}

/// Year of study 1-3 written as `year N`.
pub fn detect_year(text: &str) -> Option<u32> {
    YEAR.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
