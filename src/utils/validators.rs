use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

// Referencia bancaria: dígitos y letras, con guiones opcionales.
static REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]{4,40}$").unwrap());

pub fn validate_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn validate_reference(reference: &str) -> bool {
    REFERENCE_REGEX.is_match(reference)
}

pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com"));
        assert!(validate_email("propietario.torre2@condominio.com.ve"));
        assert!(!validate_email("invalid"));
        assert!(!validate_email("@example.com"));
    }

    #[test]
    fn test_validate_reference() {
        assert!(validate_reference("00123456789"));
        assert!(validate_reference("REF-2024-0915"));
        assert!(!validate_reference("123"));
        assert!(!validate_reference("ref con espacios"));
        assert!(!validate_reference(""));
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("  hola  "), "hola");
    }
}
