use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// `"Quote text." (Speaker context...)`
static QUOTE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)"\s*\(([^)]+)\)"#).unwrap());
static POSSESSIVE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"['’]s?$").unwrap());

pub const UNKNOWN_SPEAKER: &str = "Unknown";

/// One entry of a session's `notableQuotes` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuoteRecord {
    pub quote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl QuoteRecord {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => non_blank(s).map(|quote| Self {
                quote,
                speaker: None,
                context: None,
            }),
            Value::Object(map) => {
                let text_field = |key: &str| map.get(key).and_then(Value::as_str).and_then(non_blank);
                let quote = text_field("quote").or_else(|| text_field("text"))?;
                Some(Self {
                    quote,
                    speaker: text_field("speaker"),
                    context: text_field("context"),
                })
            }
            _ => None,
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Normalises model output (plain strings or objects) into quote records.
/// Entries without any quote text are dropped.
pub fn normalize_quotes(values: &[Value]) -> Vec<QuoteRecord> {
    values.iter().filter_map(QuoteRecord::from_value).collect()
}

/// Reads a stored `notableQuotes` value; anything that is not an array reads as no quotes.
pub fn quotes_from_json(value: Option<&Value>) -> Vec<QuoteRecord> {
    match value {
        Some(Value::Array(values)) => normalize_quotes(values),
        _ => Vec::new(),
    }
}

pub fn quotes_to_json(quotes: &[QuoteRecord]) -> Value {
    serde_json::to_value(quotes).unwrap_or_else(|_| Value::Array(Vec::new()))
}

/// Extracts every `"text" (context)` occurrence from curated quote notes.
///
/// The speaker is the first word of the context when it starts with an
/// uppercase letter, minus any possessive suffix.
pub fn parse_quotes_text(text: &str) -> Vec<QuoteRecord> {
    QUOTE_PATTERN
        .captures_iter(text)
        .map(|caps| {
            let context = caps[2].to_string();
            let speaker = context
                .split(' ')
                .next()
                .filter(|word| word.starts_with(|c: char| c.is_ascii_uppercase()))
                .map(|word| POSSESSIVE_SUFFIX.replace(word, "").into_owned())
                .unwrap_or_else(|| UNKNOWN_SPEAKER.to_string());
            QuoteRecord {
                quote: caps[1].to_string(),
                speaker: Some(speaker),
                context: Some(context),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_quotes_text() {
        let text = r#"
"I will not fight you." (Meek refused to fight the ogre)
"Run!" (Lita's warning as the ceiling collapsed)
"Nobody move." (the innkeeper, quietly)
not a quote (ignored)
"#;
        let quotes = parse_quotes_text(text);
        assert_eq!(quotes.len(), 3);

        assert_eq!(quotes[0].quote, "I will not fight you.");
        assert_eq!(quotes[0].speaker.as_deref(), Some("Meek"));
        assert_eq!(quotes[0].context.as_deref(), Some("Meek refused to fight the ogre"));

        assert_eq!(quotes[1].speaker.as_deref(), Some("Lita"));
        assert_eq!(quotes[2].speaker.as_deref(), Some(UNKNOWN_SPEAKER));
    }

    #[test]
    fn test_curly_possessive() {
        let quotes = parse_quotes_text("\"Mine.\" (Brann’s claim on the axe)");
        assert_eq!(quotes[0].speaker.as_deref(), Some("Brann"));
    }

    #[test]
    fn test_normalize_quotes() {
        let values = vec![
            json!("  Just a line  "),
            json!({"quote": "Hold the line", "speaker": "Thorin"}),
            json!({"text": "Old key", "context": "from the tavern"}),
            json!({"speaker": "nobody"}),
            json!(""),
            json!(42),
        ];
        let quotes = normalize_quotes(&values);
        assert_eq!(
            quotes,
            vec![
                QuoteRecord {
                    quote: "Just a line".into(),
                    speaker: None,
                    context: None
                },
                QuoteRecord {
                    quote: "Hold the line".into(),
                    speaker: Some("Thorin".into()),
                    context: None
                },
                QuoteRecord {
                    quote: "Old key".into(),
                    speaker: None,
                    context: Some("from the tavern".into())
                },
            ]
        );
        assert_eq!(quotes_to_json(&quotes[..1]), json!([{"quote": "Just a line"}]));
        assert!(quotes_from_json(Some(&json!({"not": "an array"}))).is_empty());
    }
}
