//! Defensive extraction of a `{success, reason, extractedData}` verdict from an LLM's
//! free-text response. Models routinely wrap JSON in prose or code fences, so this scans
//! for the first balanced `{...}` object rather than requiring the whole response to parse
//! as JSON.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub success: bool,
    pub reason: String,
    pub extracted_data: Value,
}

/// Strips a leading/trailing ``` fence (with or without a `json` language tag) if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        let rest = rest.trim_start_matches('\n');
        if let Some(body) = rest.strip_suffix("```") {
            return body.trim();
        }
        return rest.trim();
    }
    trimmed
}

/// Scans `text` for the first `{` and returns the substring up to its matching `}`,
/// respecting string literals so braces inside quoted values don't confuse the scan.
fn first_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extracts a verdict from `text`, falling back to `success: false` with the raw text as
/// the reason when no parseable object is found — never an error, since a malformed
/// verdict is a test failure, not a scheduler bug.
pub fn extract_verdict(text: &str) -> Verdict {
    let candidate = strip_code_fence(text);
    let object_text = first_balanced_object(candidate).unwrap_or(candidate);

    match serde_json::from_str::<Value>(object_text) {
        Ok(Value::Object(map)) => {
            let success = map.get("success").and_then(Value::as_bool).unwrap_or(false);
            let reason = map
                .get("reason")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| text.trim().to_string());
            let extracted_data = map.get("extractedData").cloned().unwrap_or(Value::Null);
            Verdict {
                success,
                reason,
                extracted_data,
            }
        }
        _ => Verdict {
            success: false,
            reason: text.trim().to_string(),
            extracted_data: Value::Null,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let v = extract_verdict(r#"{"success": true, "reason": "ok", "extractedData": {"x": 1}}"#);
        assert!(v.success);
        assert_eq!(v.reason, "ok");
        assert_eq!(v.extracted_data, serde_json::json!({"x": 1}));
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let v = extract_verdict(
            "Here is my verdict:\n{\"success\": false, \"reason\": \"button missing\"}\nThanks.",
        );
        assert!(!v.success);
        assert_eq!(v.reason, "button missing");
    }

    #[test]
    fn parses_json_in_code_fence() {
        let v = extract_verdict("```json\n{\"success\": true, \"reason\": \"done\"}\n```");
        assert!(v.success);
    }

    #[test]
    fn falls_back_to_raw_text_on_unparsable_input() {
        let v = extract_verdict("the model rambled without any structure");
        assert!(!v.success);
        assert_eq!(v.reason, "the model rambled without any structure");
    }

    #[test]
    fn braces_inside_strings_dont_break_balancing() {
        let v = extract_verdict(r#"{"success": true, "reason": "saw { in the page"}"#);
        assert!(v.success);
        assert_eq!(v.reason, "saw { in the page");
    }
}
