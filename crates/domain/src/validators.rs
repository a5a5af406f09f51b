const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Checks a normalized host name: dot-separated labels of ASCII letters,
/// digits, `-` or `_`, each 1 to 63 bytes, 253 bytes in total.
pub fn validate_hostname(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".to_string());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!("name cannot exceed {MAX_NAME_LEN} characters"));
    }
    for label in name.split('.') {
        if label.is_empty() {
            return Err("name cannot contain empty labels".to_string());
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(format!("label cannot exceed {MAX_LABEL_LEN} characters"));
        }
        if let Some(c) = label
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(format!("invalid character {c:?} in label {label:?}"));
        }
    }
    Ok(())
}
