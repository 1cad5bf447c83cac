//! Parse LLM output into certificate fields

use crate::error::ExtractorError;
use crate::prompt::{KEY_CITY, KEY_DATE_OF_DEATH, KEY_DECLARANT_NAME, KEY_FULL_NAME, KEY_STREET};
use actes_domain::ExtractedFields;
use serde_json::{Map, Value};
use tracing::debug;

/// Accepted keys per field; the first is the one the prompt asks for
const FULL_NAME_KEYS: &[&str] = &[KEY_FULL_NAME, "full_name", "full name", "name"];
const DATE_OF_DEATH_KEYS: &[&str] = &[KEY_DATE_OF_DEATH, "date_of_death", "date"];
const DECLARANT_NAME_KEYS: &[&str] = &[KEY_DECLARANT_NAME, "declarant_name", "declarant"];
const CITY_KEYS: &[&str] = &[KEY_CITY, "city"];
const STREET_KEYS: &[&str] = &[KEY_STREET, "street", "street address", "address"];

/// Parse an LLM JSON response into [`ExtractedFields`]
///
/// Fields are read by key, never by position. Missing keys, `null`, blank
/// strings and non-scalar values all become absent fields.
pub fn parse_llm_response(response: &str) -> Result<ExtractedFields, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let obj = json
        .as_object()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON object".to_string()))?;

    let fields = ExtractedFields {
        full_name: lookup(obj, FULL_NAME_KEYS),
        date_of_death: lookup(obj, DATE_OF_DEATH_KEYS),
        declarant_name: lookup(obj, DECLARANT_NAME_KEYS),
        city: lookup(obj, CITY_KEYS),
        street: lookup(obj, STREET_KEYS),
    };

    debug!(has_name = fields.full_name.is_some(), "parsed oracle response");

    Ok(fields)
}

/// Extract the JSON object from a response, handling markdown code blocks
/// and surrounding prose
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');

    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&trimmed[start..=end]),
        _ => Err(ExtractorError::InvalidFormat(
            "No JSON object in response".to_string(),
        )),
    }
}

/// Value of the first present key, compared case-insensitively
fn lookup(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let value = obj
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(key))
            .map(|(_, value)| value)?;
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        ExtractedFields::field(Some(text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let response = r#"{
            "dead person full name": "jean DUPONT",
            "Date of death": "03/04/2024",
            "declarant name": "marie DUPONT",
            "declarant City": "Lyon",
            "declarant street address": "12 rue Neuve"
        }"#;

        let fields = parse_llm_response(response).unwrap();
        assert_eq!(fields.full_name.as_deref(), Some("jean DUPONT"));
        assert_eq!(fields.date_of_death.as_deref(), Some("03/04/2024"));
        assert_eq!(fields.declarant_name.as_deref(), Some("marie DUPONT"));
        assert_eq!(fields.city.as_deref(), Some("Lyon"));
        assert_eq!(fields.street.as_deref(), Some("12 rue Neuve"));
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let response = r#"{
            "declarant street address": "12 rue Neuve",
            "declarant City": "Lyon",
            "dead person full name": "jean DUPONT"
        }"#;

        let fields = parse_llm_response(response).unwrap();
        assert_eq!(fields.full_name.as_deref(), Some("jean DUPONT"));
        assert_eq!(fields.street.as_deref(), Some("12 rue Neuve"));
        assert_eq!(fields.date_of_death, None);
        assert_eq!(fields.declarant_name, None);
    }

    #[test]
    fn test_blank_and_null_values_are_absent() {
        let response = r#"{
            "dead person full name": "   ",
            "Date of death": null,
            "declarant City": ["Lyon"]
        }"#;

        let fields = parse_llm_response(response).unwrap();
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn test_alternative_keys() {
        let response = r#"{"Full_Name": "anne MARTIN", "city": "Nantes", "street": "1 quai"}"#;
        let fields = parse_llm_response(response).unwrap();
        assert_eq!(fields.full_name.as_deref(), Some("anne MARTIN"));
        assert_eq!(fields.city.as_deref(), Some("Nantes"));
        assert_eq!(fields.street.as_deref(), Some("1 quai"));
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"dead person full name\": \"paul ROBERT\"}\n```";
        let fields = parse_llm_response(response).unwrap();
        assert_eq!(fields.full_name.as_deref(), Some("paul ROBERT"));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_llm_response("This is not JSON").is_err());
        assert!(parse_llm_response("{ not json }").is_err());
    }

    #[test]
    fn test_parse_json_not_object() {
        let result = parse_llm_response(r#"["jean DUPONT"]"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_trailing_comma_is_rejected() {
        let response = r#"{"dead person full name": "jean DUPONT",}"#;
        assert!(parse_llm_response(response).is_err());
    }

    #[test]
    fn test_extract_json_from_prose() {
        let response = "Here is the result: {\"a\": 1} hope it helps";
        assert_eq!(extract_json(response).unwrap(), "{\"a\": 1}");
    }
}
