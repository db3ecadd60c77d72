//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Permissive E.164-style phone pattern: optional +, 7-15 digits.
    static ref PHONE_PATTERN: Regex = Regex::new(r"^\+?[0-9]{7,15}$").expect("valid phone regex");
}

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that a geofence radius is positive and finite.
pub fn validate_radius(radius_meters: f64) -> Result<(), ValidationError> {
    if radius_meters.is_finite() && radius_meters > 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("radius_range");
        err.message = Some("Radius must be a positive number of meters".into());
        Err(err)
    }
}

/// Validates a phone number against a permissive E.164-style pattern.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_PATTERN.is_match(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Phone must be 7-15 digits with optional leading +".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Latitude tests
    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(-90.1).is_err());
    }

    #[test]
    fn test_validate_latitude_decimals() {
        assert!(validate_latitude(45.123456).is_ok());
        assert!(validate_latitude(-45.123456).is_ok());
        assert!(validate_latitude(89.999999).is_ok());
    }

    #[test]
    fn test_validate_latitude_error_message() {
        let err = validate_latitude(100.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Latitude must be between -90 and 90"
        );
    }

    // Longitude tests
    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_longitude(-180.1).is_err());
    }

    #[test]
    fn test_validate_longitude_error_message() {
        let err = validate_longitude(200.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Longitude must be between -180 and 180"
        );
    }

    // Radius tests
    #[test]
    fn test_validate_radius() {
        assert!(validate_radius(0.5).is_ok());
        assert!(validate_radius(500.0).is_ok());
        assert!(validate_radius(50_000.0).is_ok());
        assert!(validate_radius(0.0).is_err());
        assert!(validate_radius(-10.0).is_err());
    }

    #[test]
    fn test_validate_radius_non_finite() {
        assert!(validate_radius(f64::NAN).is_err());
        assert!(validate_radius(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_radius_error_message() {
        let err = validate_radius(-1.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Radius must be a positive number of meters"
        );
    }

    // Phone tests
    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+15551234567").is_ok());
        assert!(validate_phone("15551234567").is_ok());
        assert!(validate_phone("1234567").is_ok());
    }

    #[test]
    fn test_validate_phone_invalid() {
        assert!(validate_phone("").is_err());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("555-123-4567").is_err());
        assert!(validate_phone("not-a-phone").is_err());
        assert!(validate_phone("+123456789012345678").is_err());
    }
}
