//! Parsing of JSON replies from the generation endpoint.
//!
//! Models tend to wrap JSON in Markdown code fences even when asked not to,
//! so the fence is stripped before parsing. A reply that still fails to parse
//! is reported with the raw text attached; no partial plan is built from it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the AI reply was not valid JSON: {reason}")]
pub struct MalformedAiResponse {
    pub reason: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRoadmap {
    pub weeks: Vec<RoadmapWeek>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapWeek {
    pub week: u8,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl MonthlyRoadmap {
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.weeks.iter().map(|w| w.tasks.len()).sum()
    }
}

/// Remove a surrounding ```` ``` ```` or ```` ```json ```` fence, if present.
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, MalformedAiResponse> {
    serde_json::from_str(strip_code_fences(raw)).map_err(|e| {
        tracing::warn!(%e, bytes = raw.len(), "Structured AI reply failed to parse");
        MalformedAiResponse {
            reason: e.to_string(),
            raw: raw.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROADMAP: &str =
        r#"{"weeks":[{"week":1,"focus":"Visibility","tasks":["Post daily","Ask for reviews"]}]}"#;

    #[test]
    fn parses_bare_json() {
        let roadmap: MonthlyRoadmap = parse_structured(ROADMAP).unwrap();
        assert_eq!(roadmap.weeks[0].focus, "Visibility");
        assert_eq!(roadmap.task_count(), 2);
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("```json\n{ROADMAP}\n```\n");
        let roadmap: MonthlyRoadmap = parse_structured(&fenced).unwrap();
        assert_eq!(roadmap.weeks.len(), 1);

        let plain_fence = format!("  ```\n{ROADMAP}\n```");
        assert!(parse_structured::<MonthlyRoadmap>(&plain_fence).is_ok());
    }

    #[test]
    fn missing_optional_fields_default() {
        let roadmap: MonthlyRoadmap = parse_structured(r#"{"weeks":[{"week":3}]}"#).unwrap();
        assert!(roadmap.weeks[0].tasks.is_empty());
    }

    #[test]
    fn malformed_reply_keeps_raw_text() {
        let raw = "Sure! Here's your plan: week 1 ...";
        let err = parse_structured::<MonthlyRoadmap>(raw).unwrap_err();
        assert_eq!(err.raw, raw);
        assert!(!err.reason.is_empty());
    }

    #[test]
    fn strip_leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
    }
}
