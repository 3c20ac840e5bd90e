//! Name and type-reference validation helpers.

use miette::SourceSpan;

/// Check that a step/aspect name is lower-kebab-case: lowercase letters,
/// digits, and single hyphens, starting with a letter, not ending with a
/// hyphen.
pub fn validate_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name must not be empty");
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return Some("name must start with a lowercase letter"),
    }
    let mut prev_hyphen = false;
    for c in chars {
        if c == '-' {
            if prev_hyphen {
                return Some("name must not contain consecutive hyphens");
            }
            prev_hyphen = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            prev_hyphen = false;
        } else {
            return Some("name contains an invalid character");
        }
    }
    if prev_hyphen {
        return Some("name must not end with a hyphen");
    }
    None
}

/// Check that a type reference is a dotted sequence of identifiers.
pub fn is_valid_type_ref(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    name.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Find the span of the first occurrence of a quoted name in the source, for
/// error labeling. Best-effort; parsing already succeeded at this point.
pub fn find_name_span(src: &str, name: &str) -> Option<SourceSpan> {
    let quoted = format!("\"{}\"", name);
    src.find(&quoted)
        .map(|idx| SourceSpan::from((idx + 1, name.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts_kebab_case() {
        assert!(validate_name("enrich").is_none());
        assert!(validate_name("enrich-orders2").is_none());
    }

    #[test]
    fn test_validate_name_rejects_bad_names() {
        assert!(validate_name("").is_some());
        assert!(validate_name("Enrich").is_some());
        assert!(validate_name("enrich_orders").is_some());
        assert!(validate_name("enrich--orders").is_some());
        assert!(validate_name("enrich-").is_some());
        assert!(validate_name("2enrich").is_some());
    }

    #[test]
    fn test_is_valid_type_ref() {
        assert!(is_valid_type_ref("com.acme.EnrichService"));
        assert!(is_valid_type_ref("Order"));
        assert!(!is_valid_type_ref(""));
        assert!(!is_valid_type_ref("com..acme"));
        assert!(!is_valid_type_ref("com.2acme.X"));
    }

    #[test]
    fn test_find_name_span() {
        let src = r#"name = "enrich""#;
        let span = find_name_span(src, "enrich").expect("span should be found");
        assert_eq!(span.offset(), 8);
        assert_eq!(span.len(), 6);
    }
}
