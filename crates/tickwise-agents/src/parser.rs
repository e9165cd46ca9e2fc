use std::collections::HashMap;

use tickwise_models::{TaskId, TaskOutput};

use crate::error::AgentError;

/// Extract the first JSON object from a string that may contain surrounding text.
///
/// Handles common model response formats:
/// - Clean JSON: `{"key": "value"}`
/// - Markdown-wrapped: ```json\n{"key": "value"}\n```
/// - Prefix text: `Here is the analysis:\n{"key": "value"}`
pub fn extract_json(text: &str) -> Result<String, AgentError> {
    let trimmed = text.trim();

    // Try parsing the whole thing as JSON first
    if trimmed.starts_with('{') && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Ok(trimmed.to_string());
    }

    // Try extracting from markdown code block
    if let Some(json_str) = extract_from_markdown_block(trimmed) {
        if serde_json::from_str::<serde_json::Value>(&json_str).is_ok() {
            return Ok(json_str);
        }
    }

    // Try finding the first { ... } pair using brace matching
    if let Some(json_str) = extract_first_object(trimmed) {
        if serde_json::from_str::<serde_json::Value>(&json_str).is_ok() {
            return Ok(json_str);
        }
    }

    Err(AgentError::Parse(format!(
        "No valid JSON object found in response (length={})",
        text.len()
    )))
}

/// Extract JSON from a markdown code block (```json ... ``` or ``` ... ```)
fn extract_from_markdown_block(text: &str) -> Option<String> {
    // Look for ```json or just ```
    let start_markers = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

    for marker in &start_markers {
        if let Some(start) = text.find(marker) {
            let json_start = start + marker.len();
            if let Some(end) = text[json_start..].find("```") {
                let extracted = text[json_start..json_start + end].trim();
                return Some(extracted.to_string());
            }
        }
    }

    None
}

/// Find the first balanced `{ ... }` in the text that parses as JSON.
///
/// Braces in surrounding prose (a stray `}` or a `{placeholder}`) are skipped:
/// a candidate that does not parse moves the scan on to the next `{`.
fn extract_first_object(text: &str) -> Option<String> {
    let mut from = 0;
    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        if let Some(end) = matching_brace(&text[start..]) {
            let candidate = &text[start..=start + end];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Some(candidate.to_string());
            }
        }
        from = start + 1;
    }

    None
}

/// Byte offset of the `}` closing the `{` that `text` starts with.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' => {
                in_string = !in_string;
            }
            '{' if !in_string => {
                depth += 1;
            }
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Turn raw engine text into a task output.
///
/// With `structured` set, the first JSON object found in the text becomes a
/// structured output; text without one is kept verbatim.
pub fn parse_task_output(raw: &str, structured: bool) -> TaskOutput {
    if structured {
        if let Some(value) = extract_json(raw)
            .ok()
            .and_then(|json| serde_json::from_str::<serde_json::Value>(&json).ok())
        {
            return TaskOutput::Structured(value);
        }
    }
    TaskOutput::Text(raw.trim().to_string())
}

/// Parse a planner reply: a JSON object mapping task ids to plan notes.
/// Non-string values are ignored.
pub fn parse_plan(raw: &str) -> Result<HashMap<TaskId, String>, AgentError> {
    let json_str = extract_json(raw)?;
    let value: serde_json::Value = serde_json::from_str(&json_str)?;
    let object = value
        .as_object()
        .ok_or_else(|| AgentError::Parse("Plan is not a JSON object".to_string()))?;

    Ok(object
        .iter()
        .filter_map(|(id, note)| {
            note.as_str()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(|n| (TaskId::new(id.as_str()), n.to_string()))
        })
        .collect())
}
