/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_and_long() {
        assert!(validate_required("  ", "Nama paket", 10).is_some());
        assert!(validate_required("abcdefghijk", "Nama paket", 10).is_some());
        assert!(validate_required("Paket A", "Nama paket", 10).is_none());
    }

    #[test]
    fn optional_allows_empty() {
        assert!(validate_optional("", "Catatan", 5).is_none());
        assert!(validate_optional("123456", "Catatan", 5).is_some());
    }
}
