//! Chat turn orchestration: classify, then answer from courses or documents.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::ChatError;
use crate::models::{ChatResponse, Intent, StudyPlanRequest};
use crate::services::courses::SharedCourseStore;
use crate::services::intent::IntentClassifier;
use crate::services::llm::ChatModel;
use crate::services::retriever::Retriever;
use crate::services::study_plan::{build_plan, format_plan};
use crate::utils::{clean_model_output, extract_last_paragraph};

/// Answer returned in place of any LLM transport or parse failure.
pub const LLM_ERROR_MESSAGE: &str = "An error occurred connecting to Ollama.";

/// Long-lived handles shared by every request.
pub struct ChatService {
    classifier: Box<dyn IntentClassifier>,
    courses: SharedCourseStore,
    retriever: Retriever,
    llm: Arc<dyn ChatModel>,
    top_k: usize,
}

impl ChatService {
    pub fn new(
        classifier: Box<dyn IntentClassifier>,
        courses: SharedCourseStore,
        retriever: Retriever,
        llm: Arc<dyn ChatModel>,
        top_k: usize,
    ) -> Self {
        Self {
            classifier,
            courses,
            retriever,
            llm,
            top_k,
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Handle one user message.
    ///
    /// Course lookup and retrieval failures are returned as errors; LLM
    /// failures are logged and answered with [`LLM_ERROR_MESSAGE`].
    pub async fn handle(&self, message: &str) -> Result<ChatResponse, ChatError> {
        info!(user = %message, "chat message");

        let intent = self.classifier.classify(message);
        debug!(intent = intent.name(), "routed message");

        let answer = match intent {
            Intent::StudyPlan(request) => self.study_plan(&request).await?,
            Intent::OpenQuestion(question) => self.answer(&question).await?,
        };

        Ok(ChatResponse::new(answer))
    }

    async fn study_plan(&self, request: &StudyPlanRequest) -> Result<String, ChatError> {
        let plan = build_plan(self.courses.as_ref(), request).await?;
        Ok(format_plan(&plan))
    }

    async fn answer(&self, question: &str) -> Result<String, ChatError> {
        let context = self.retriever.retrieve(question, self.top_k).await?;
        let prompt = build_prompt(&context, question);

        match self.llm.chat(&prompt).await {
            Ok(raw) => Ok(extract_last_paragraph(&clean_model_output(&raw))),
            Err(e) => {
                error!(error = %e, model = self.llm.model(), "LLM request failed");
                Ok(LLM_ERROR_MESSAGE.to_string())
            }
        }
    }
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant. Use the provided context to answer concisely and clearly. \
         Do not guess. Only use what's found in the context.\n\n\
         Context:\n{context}\n\n\
         User Question: {question}\n\
         Answer:"
    )
}
