use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::api::error::InnerApiError;
use crate::utils::lenient::{deserialize_lenient_i32, deserialize_lenient_string, deserialize_null_as_empty};

/// Everything the model pulled out of one transcript.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub characters: Vec<ExtractedCharacter>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub locations: Vec<ExtractedLocation>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub organizations: Vec<ExtractedOrganization>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub items: Vec<ExtractedItem>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub lore: Vec<ExtractedLore>,
    #[serde(default)]
    pub session_summary: Option<ExtractedSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractedCharacter {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub species: Option<String>,
    #[serde(rename = "class", default, deserialize_with = "deserialize_lenient_string")]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_i32")]
    pub level: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_lenient_i32")]
    pub hp: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_lenient_i32")]
    pub ac: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedLocation {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_i32")]
    pub founding_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractedOrganization {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractedItem {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub rarity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractedLore {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSummary {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub chapter_title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub recap: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub outline: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub notable_quotes: Vec<Value>,
}

/// Text between the first `{` and the last `}`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Candidate JSON objects cut out of raw model text, most specific first.
///
/// A fenced block (```json ... ```) is unwrapped up to its first closing
/// fence. The brace span inside the fence and the brace span of the whole
/// reply follow as fallbacks.
pub fn json_candidates(raw: &str) -> Vec<&str> {
    let trimmed = raw.trim();
    let mut candidates = Vec::new();
    if let Some(rest) = trimmed.strip_prefix("```") {
        // drop the language tag on the opening fence line
        let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        let body = body.split_once("```").map(|(inner, _)| inner).unwrap_or(body).trim();
        if body.starts_with('{') {
            candidates.push(body);
        }
        candidates.extend(brace_span(body));
    }
    candidates.extend(brace_span(trimmed));
    candidates.dedup();
    candidates
}

/// Parses raw model output into an [`Extraction`].
pub fn parse_extraction(raw: &str) -> Result<Extraction, InnerApiError> {
    if raw.trim().is_empty() {
        return Err(InnerApiError::EmptyAiResponse);
    }
    let candidates = json_candidates(raw);
    if candidates.is_empty() {
        warn!("no JSON object found in the AI response");
        return Err(InnerApiError::UnparseableAiResponse);
    }
    let mut last_error = None;
    for json in candidates {
        match serde_json::from_str(json) {
            Ok(extraction) => return Ok(extraction),
            Err(e) => last_error = Some(e),
        }
    }
    if let Some(e) = last_error {
        warn!("failed to parse the AI response as JSON: {}", e);
    }
    Err(InnerApiError::UnparseableAiResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_fenced_response() {
        let raw = "```json\n{\"characters\": [{\"name\": \"Lita\", \"description\": \"rogue\"}]}\n```";
        let extraction = parse_extraction(raw).unwrap();
        assert_eq!(extraction.characters.len(), 1);
        assert_eq!(extraction.characters[0].name.as_deref(), Some("Lita"));
        assert!(extraction.locations.is_empty());
        assert!(extraction.session_summary.is_none());
    }

    #[test]
    fn test_fenced_response_followed_by_chatter() {
        let raw = "```json\n{\"characters\": [{\"name\": \"Lita\"}]}\n```\nLet me know if you need anything else.";
        let extraction = parse_extraction(raw).unwrap();
        assert_eq!(extraction.characters.len(), 1);
        assert_eq!(extraction.characters[0].name.as_deref(), Some("Lita"));
    }

    #[test]
    fn test_fence_with_leading_prose() {
        let raw = "```\nHere is the data: {\"items\": [{\"name\": \"Rope\"}]}\n```";
        let extraction = parse_extraction(raw).unwrap();
        assert_eq!(extraction.items.len(), 1);
        assert_eq!(extraction.items[0].name.as_deref(), Some("Rope"));
    }

    #[test]
    fn test_braces_inside_chatter() {
        let raw = "Sure! Here is the JSON:\n{\"items\": [{\"name\": \"Rope\"}], \"lore\": null}\nHope it helps.";
        let extraction = parse_extraction(raw).unwrap();
        assert_eq!(extraction.items.len(), 1);
        assert!(extraction.lore.is_empty());
    }

    #[test]
    fn test_numeric_fields_are_sanitized() {
        let raw = r#"{
            "characters": [
                {"name": "Brann", "level": "5", "hp": 31.0, "ac": "sixteen"},
                {"name": "Meek", "level": null, "hp": "unknown"}
            ],
            "locations": [{"name": "Phandalin", "foundingYear": "1451"}],
            "sessionSummary": {"title": "Ambush", "notableQuotes": ["Run!", {"quote": "Hide", "speaker": "Lita"}]}
        }"#;
        let extraction = parse_extraction(raw).unwrap();
        let brann = &extraction.characters[0];
        assert_eq!((brann.level, brann.hp, brann.ac), (Some(5), Some(31), None));
        let meek = &extraction.characters[1];
        assert_eq!((meek.level, meek.hp, meek.ac), (None, None, None));
        assert_eq!(extraction.locations[0].founding_year, Some(1451));
        let summary = extraction.session_summary.unwrap();
        assert_eq!(summary.title.as_deref(), Some("Ambush"));
        assert_eq!(summary.notable_quotes.len(), 2);
    }

    #[test]
    fn test_failures() {
        assert_matches!(parse_extraction("   "), Err(InnerApiError::EmptyAiResponse));
        assert_matches!(parse_extraction("no json here"), Err(InnerApiError::UnparseableAiResponse));
        assert_matches!(
            parse_extraction("{\"characters\": {\"name\": \"x\"}}"),
            Err(InnerApiError::UnparseableAiResponse)
        );
        assert_matches!(parse_extraction("} backwards {"), Err(InnerApiError::UnparseableAiResponse));
    }

    #[test]
    fn test_json_candidates() {
        assert_eq!(json_candidates("```\n{\"a\":1}\n```"), vec!["{\"a\":1}"]);
        assert_eq!(
            json_candidates("```json\n{\"a\":1}\n```\nmore {x}"),
            vec!["{\"a\":1}", "{\"a\":1}\n```\nmore {x}"]
        );
        assert_eq!(json_candidates("x {\"a\":{\"b\":2}} y"), vec!["{\"a\":{\"b\":2}}"]);
        assert!(json_candidates("nothing").is_empty());
    }
}
