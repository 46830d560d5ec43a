use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::EngineError;

/// Case- and accent-insensitive key for category names: NFKD, combining
/// marks stripped, lowercased, whitespace collapsed.
pub fn normalize_name(name: &str) -> String {
    let stripped: String = name.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trim a user-supplied name, rejecting empty or overlong values.
pub fn normalize_required_name(name: &str, what: &str) -> Result<String, EngineError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!("{what} cannot be empty")));
    }
    if trimmed.chars().count() > 120 {
        return Err(EngineError::InvalidName(format!(
            "{what} cannot exceed 120 characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim optional free text, mapping blank values to `None`.
pub fn normalize_optional_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_accents() {
        assert_eq!(normalize_name("Café  Crème"), "cafe creme");
        assert_eq!(normalize_name("FOOD & Dining"), "food & dining");
    }

    #[test]
    fn required_name_rejects_blank() {
        assert!(normalize_required_name("   ", "category").is_err());
        assert_eq!(
            normalize_required_name(" Rent ", "category").unwrap(),
            "Rent"
        );
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" x ")), Some("x".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }
}
