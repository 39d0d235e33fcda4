use std::fmt::Write as FmtWrite;

use serde::{Deserialize, Serialize};

use crate::models::ChatResponse;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Summary of a completed index build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub files: usize,
    pub chunks: usize,
    pub index_path: String,
    pub model_id: String,
    pub duration_ms: u64,
}

pub trait Formatter {
    fn format_answer(&self, answer: &ChatResponse) -> String;
    fn format_index_stats(&self, stats: &IndexStats) -> String;
    fn format_message(&self, message: &str) -> String;
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_answer(&self, answer: &ChatResponse) -> String {
        answer.response.clone()
    }

    fn format_index_stats(&self, stats: &IndexStats) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Index built at {}", stats.index_path);
        let _ = writeln!(output, "  PDF files: {}", stats.files);
        let _ = writeln!(output, "  Chunks embedded: {}", stats.chunks);
        let _ = writeln!(output, "  Embedding model: {}", stats.model_id);
        let _ = write!(output, "  Duration: {}ms", stats.duration_ms);
        output
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        let result = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        result.unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

impl Formatter for JsonFormatter {
    fn format_answer(&self, answer: &ChatResponse) -> String {
        self.render(answer)
    }

    fn format_index_stats(&self, stats: &IndexStats) -> String {
        self.render(stats)
    }

    fn format_message(&self, message: &str) -> String {
        self.render(&serde_json::json!({ "message": message }))
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}
