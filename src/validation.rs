// Validation utilities module
// Custom validators for fields the derive attributes cannot express

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

static INSTITUTE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{2,32}$").expect("valid institute code regex"));

static PINCODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("valid pincode regex"));

/// Validates an institute code: 2-32 letters, digits, `-` or `_`
pub fn validate_institute_code(code: &str) -> Result<(), ValidationError> {
    if INSTITUTE_CODE.is_match(code) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_institute_code");
        error.message = Some("Code must be 2-32 letters, digits, '-' or '_'".into());
        Err(error)
    }
}

/// Validates a six-digit postal index number
pub fn validate_pincode(pincode: &str) -> Result<(), ValidationError> {
    if PINCODE.is_match(pincode) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_pincode");
        error.message = Some("Pincode must be six digits".into());
        Err(error)
    }
}
