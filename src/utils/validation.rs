use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

lazy_static! {
    // PAN: 5 uppercase letters, 4 digits, 1 uppercase letter. Never
    // normalised; a lowercase PAN is the donor's problem to fix.
    static ref PAN_PATTERN: Regex = Regex::new("^[A-Z]{5}[0-9]{4}[A-Z]$").unwrap();
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

pub fn is_valid_pan(pan: &str) -> bool {
    PAN_PATTERN.is_match(pan)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn validate_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError(
            "Donation amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Guest donation policy: a guest email commits the donor to supplying a
/// well-formed PAN. An absent guest email skips guest validation entirely
/// (the payer is resolved as a registered account); a PAN arriving without a
/// guest email is deliberately not rejected here.
pub fn validate_guest_identity(
    guest_email: Option<&str>,
    guest_pan: Option<&str>,
) -> Result<(), ValidationError> {
    let Some(email) = guest_email else {
        return Ok(());
    };

    if !is_valid_email(email) {
        return Err(ValidationError("Guest email is not valid".to_string()));
    }

    match guest_pan {
        None => Err(ValidationError(
            "Guest donations require a PAN".to_string(),
        )),
        Some(pan) if !is_valid_pan(pan) => {
            Err(ValidationError("Guest PAN is not valid".to_string()))
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_pattern_accepts_the_canonical_form() {
        assert!(is_valid_pan("ABCDE1234F"));
    }

    #[test]
    fn pan_pattern_rejects_lowercase_and_bad_lengths() {
        assert!(!is_valid_pan("abcde1234f"));
        assert!(!is_valid_pan("ABC1234D"));
        assert!(!is_valid_pan("ABCDE12345"));
        assert!(!is_valid_pan("ABCDE1234FF"));
        assert!(!is_valid_pan(""));
    }

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(Decimal::from(-10)).is_err());
        assert!(validate_amount(Decimal::from(1)).is_ok());
    }

    #[test]
    fn guest_email_without_pan_is_rejected() {
        let result = validate_guest_identity(Some("donor@example.com"), None);
        assert!(result.is_err());
    }

    #[test]
    fn guest_email_with_malformed_pan_is_rejected() {
        let result = validate_guest_identity(Some("donor@example.com"), Some("abcde1234f"));
        assert!(result.is_err());
    }

    #[test]
    fn guest_email_with_valid_pan_passes() {
        let result = validate_guest_identity(Some("donor@example.com"), Some("ABCDE1234F"));
        assert!(result.is_ok());
    }

    #[test]
    fn absent_guest_email_skips_guest_validation() {
        // The asymmetry is deliberate: a stray PAN without a guest email is
        // not an error, the caller is assumed to be a registered payer.
        assert!(validate_guest_identity(None, None).is_ok());
        assert!(validate_guest_identity(None, Some("ABCDE1234F")).is_ok());
        assert!(validate_guest_identity(None, Some("not-a-pan")).is_ok());
    }

    #[test]
    fn malformed_guest_email_is_rejected() {
        let result = validate_guest_identity(Some("not-an-email"), Some("ABCDE1234F"));
        assert!(result.is_err());
    }
}
