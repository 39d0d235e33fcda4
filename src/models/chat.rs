//! Chat request/response bodies and routed intents.

use serde::{Deserialize, Serialize};

use super::course::StudyPlanRequest;

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply to `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// What a user message is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Structured lookup against the course database
    StudyPlan(StudyPlanRequest),
    /// Free-text question answered from the document corpus
    OpenQuestion(String),
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::StudyPlan(_) => "study_plan",
            Intent::OpenQuestion(_) => "open_question",
        }
    }
}
