use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::request::{SourceKind, ValidationError};

/// Finding classification taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Bug,
    Security,
    Performance,
    Style,
    BestPractice,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bug => write!(f, "bug"),
            Self::Security => write!(f, "security"),
            Self::Performance => write!(f, "performance"),
            Self::Style => write!(f, "style"),
            Self::BestPractice => write!(f, "best-practice"),
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bug" => Ok(Self::Bug),
            "security" => Ok(Self::Security),
            "performance" => Ok(Self::Performance),
            "style" => Ok(Self::Style),
            "best-practice" => Ok(Self::BestPractice),
            _ => Err(ValidationError::InvalidFocusArea(s.to_string())),
        }
    }
}

/// Finding severity, ordered least to most severe so findings can be
/// sorted directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A single issue reported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub severity: Severity,
    /// Line number; absent for file-level issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    /// Relative file path, for multi-file diffs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub description: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
}

/// A completed review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub findings: Vec<Finding>,
    pub summary: String,
    pub backend: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Context about what was reviewed and with what.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub source: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_added: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_removed: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_deserializes_with_optional_fields_absent() {
        let json = r#"{
            "category": "bug",
            "severity": "high",
            "description": "off-by-one in loop bound"
        }"#;
        let finding: Finding = serde_json::from_str(json).unwrap();
        assert_eq!(finding.category, Category::Bug);
        assert_eq!(finding.severity, Severity::High);
        assert!(finding.line.is_none());
        assert!(finding.suggestion.is_empty());
    }

    #[test]
    fn finding_serialization_omits_absent_fields() {
        let finding = Finding {
            category: Category::Style,
            severity: Severity::Info,
            line: None,
            file_path: None,
            description: "naming".to_string(),
            suggestion: String::new(),
            code_snippet: None,
        };
        let json = serde_json::to_string(&finding).unwrap();
        assert!(!json.contains("line"));
        assert!(!json.contains("file_path"));
        assert!(!json.contains("code_snippet"));
    }

    #[test]
    fn category_spellings() {
        assert_eq!("best-practice".parse::<Category>().unwrap(), Category::BestPractice);
        assert_eq!(Category::BestPractice.to_string(), "best-practice");
        assert_eq!(
            serde_json::to_string(&Category::BestPractice).unwrap(),
            "\"best-practice\""
        );
        assert!("maintainability".parse::<Category>().is_err());
    }

    #[test]
    fn severity_orders_by_weight() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }
}
