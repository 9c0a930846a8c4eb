use serde::Deserialize;

use crate::diff;
use crate::request::{Request, SourceKind};
use crate::response::{Finding, Metadata};

const INSTRUCTIONS: &str = r#"You are a code review assistant. Analyze the following code and identify issues.

Respond in JSON format with an array of findings:
{
  "findings": [
    {
      "category": "bug|security|performance|style|best-practice",
      "severity": "critical|high|medium|low|info",
      "line": <line_number_or_null>,
      "file_path": "<path_or_null>",
      "description": "What the issue is",
      "suggestion": "How to fix it"
    }
  ],
  "summary": "Overall assessment"
}"#;

/// Assemble the review prompt: instructions, then the payload (inline
/// code fenced with its language, or the formatted diff), then depth
/// and focus directives.
pub(crate) fn build_review_prompt(req: &Request) -> String {
    let mut prompt = String::from(INSTRUCTIONS);

    if req.source == SourceKind::Arbitrary {
        let language = req.language.as_deref().unwrap_or("");
        prompt.push_str(&format!(
            "\n\nCode to review:\n```{}\n{}\n```",
            language, req.code
        ));
    } else {
        let files = diff::parse(&req.code);
        prompt.push_str(&format!(
            "\n\nChanges to review (unified diff, one section per file):\n\n{}",
            diff::format_for_review(&files)
        ));
    }

    prompt.push_str(&format!("\n\nReview depth: {}", req.depth));

    if !req.focus.is_empty() {
        let areas: Vec<String> = req.focus.iter().map(|c| c.to_string()).collect();
        prompt.push_str(&format!(
            "\n\nReport only findings in these categories: {}",
            areas.join(", ")
        ));
    }

    prompt
}

#[derive(Debug, Deserialize)]
struct ReviewEnvelope {
    #[serde(default)]
    findings: Vec<Finding>,
    #[serde(default)]
    summary: String,
}

/// Extract findings from an LLM reply. Replies that do not parse as the
/// JSON envelope degrade to zero findings with the raw text as summary.
pub(crate) fn parse_review_response(text: &str) -> (Vec<Finding>, String) {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str::<ReviewEnvelope>(cleaned) {
        Ok(envelope) => (envelope.findings, envelope.summary),
        Err(_) => (Vec::new(), text.trim().to_string()),
    }
}

/// Review metadata for the response; diff-backed requests also carry
/// file and line counts.
pub(crate) fn build_metadata(req: &Request, model: &str) -> Metadata {
    let mut metadata = Metadata {
        source: req.source,
        model: Some(model.to_string()),
        file_count: None,
        line_count: None,
        lines_added: None,
        lines_removed: None,
    };

    if req.source != SourceKind::Arbitrary {
        let stats = diff::stats(&diff::parse(&req.code));
        metadata.file_count = Some(stats.files);
        metadata.line_count = Some(stats.lines);
        metadata.lines_added = Some(stats.added);
        metadata.lines_removed = Some(stats.removed);
    }

    metadata
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{Category, Severity};

    #[test]
    fn strips_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn parses_findings_envelope() {
        let reply = r#"```json
{
  "findings": [
    {
      "category": "security",
      "severity": "critical",
      "line": 42,
      "description": "SQL built by string concatenation",
      "suggestion": "Use a parameterized query"
    }
  ],
  "summary": "One critical issue."
}
```"#;
        let (findings, summary) = parse_review_response(reply);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::Security);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[0].line, Some(42));
        assert_eq!(summary, "One critical issue.");
    }

    #[test]
    fn falls_back_to_raw_text() {
        let reply = "The code looks fine to me overall.";
        let (findings, summary) = parse_review_response(reply);
        assert!(findings.is_empty());
        assert_eq!(summary, reply);
    }

    #[test]
    fn arbitrary_prompt_embeds_fenced_code() {
        let req = Request::arbitrary("fn main() {}", "rust");
        let prompt = build_review_prompt(&req);
        assert!(prompt.contains("```rust\nfn main() {}\n```"));
        assert!(prompt.contains("Review depth: quick"));
    }

    #[test]
    fn diff_prompt_embeds_formatted_hunks() {
        let mut req = Request::staged("/repo");
        req.code = "diff --git a/m.rs b/m.rs\n--- a/m.rs\n+++ b/m.rs\n@@ -1,2 +1,2 @@\n-old\n+new\n".to_string();
        let prompt = build_review_prompt(&req);
        assert!(prompt.contains("Status: Modified"));
        assert!(prompt.contains("@@ -1,2 +1,2 @@"));
        assert!(prompt.contains("+new"));
    }

    #[test]
    fn focus_areas_are_listed() {
        let mut req = Request::arbitrary("code", "go");
        req.focus = vec![Category::Bug, Category::Security];
        let prompt = build_review_prompt(&req);
        assert!(prompt.contains("bug, security"));
    }

    #[test]
    fn metadata_counts_for_diff_sources() {
        let mut req = Request::staged("/repo");
        req.code = "diff --git a/m.rs b/m.rs\n@@ -1,2 +1,2 @@\n-old\n+new\n ctx\n".to_string();
        let metadata = build_metadata(&req, "claude-sonnet-4-5");
        assert_eq!(metadata.file_count, Some(1));
        assert_eq!(metadata.lines_added, Some(1));
        assert_eq!(metadata.lines_removed, Some(1));
        assert_eq!(metadata.line_count, Some(3));
        assert_eq!(metadata.model.as_deref(), Some("claude-sonnet-4-5"));

        let inline = build_metadata(&Request::arbitrary("x", "rust"), "gpt-4o");
        assert!(inline.file_count.is_none());
    }
}
