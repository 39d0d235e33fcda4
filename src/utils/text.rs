//! Text processing utilities for model output and extracted documents.

use std::sync::LazyLock;

use regex::Regex;

static THINK_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<think>.*?</think>").expect("valid think-block pattern")
});

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

/// Remove every markup-like `<...>` tag, keeping the text between tags.
pub fn strip_tags(text: &str) -> String {
    MARKUP_TAG.replace_all(text, "").trim().to_string()
}

/// Remove whole `<think>...</think>` reasoning blocks emitted by reasoning models.
pub fn strip_think_blocks(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").to_string()
}

/// Clean a raw model reply: drop reasoning blocks, then any remaining tags.
pub fn clean_model_output(text: &str) -> String {
    strip_tags(&strip_think_blocks(text))
}

/// Return the last non-empty line of `text`, trimmed.
///
/// Falls back to the trimmed input when every line is blank.
pub fn extract_last_paragraph(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| text.trim().to_string())
}

/// Check whether text has any non-whitespace content.
pub fn has_content(content: &str) -> bool {
    content.chars().any(|c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_last_paragraph() {
        assert_eq!(extract_last_paragraph("line1\n\nline2\nline3"), "line3");
        assert_eq!(extract_last_paragraph("only"), "only");
        assert_eq!(extract_last_paragraph("answer\n\n   \n"), "answer");
    }

    #[test]
    fn test_extract_last_paragraph_all_whitespace() {
        assert_eq!(extract_last_paragraph("  \n\t\n  "), "");
        assert_eq!(extract_last_paragraph(""), "");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>bold</b> text"), "bold text");
        assert_eq!(strip_tags("  <think>\nhmm</think>\nDone  "), "hmm\nDone");
        assert_eq!(strip_tags("a < b and c > d"), "a  d");
    }

    #[test]
    fn test_clean_model_output_drops_reasoning() {
        let raw = "<think>\nThe user asks about fees.\n\nLet me check.\n</think>\n\nFees are due in March.";
        assert_eq!(clean_model_output(raw), "Fees are due in March.");
    }

    #[test]
    fn test_clean_model_output_multiline_case_insensitive() {
        let raw = "<THINK>plan</THINK>Answer <i>here</i>";
        assert_eq!(clean_model_output(raw), "Answer here");
    }

    #[test]
    fn test_has_content() {
        assert!(!has_content(""));
        assert!(!has_content("   \n\n   "));
        assert!(has_content(" x "));
    }
}
