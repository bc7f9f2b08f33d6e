// src/common/validation.rs

// ---
// Validações customizadas compartilhadas pelos payloads (usadas via #[validate(custom(...))])
// ---

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use validator::ValidationError;

/// Telefone: '+' opcional seguido de 10 a 15 dígitos.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());

    if !valid {
        let mut err = ValidationError::new("phone");
        err.message = Some("Invalid phone number format".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("Amount must be positive".into());
        return Err(err);
    }
    Ok(())
}

/// Ano de fabricação: de 1900 até o ano que vem.
pub fn validate_vehicle_year(year: i32) -> Result<(), ValidationError> {
    let max = Utc::now().year() + 1;
    if !(1900..=max).contains(&year) {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &1900);
        err.add_param("max".into(), &max);
        err.message = Some("Year out of range".into());
        return Err(err);
    }
    Ok(())
}

/// Normaliza para o formato internacional (sempre com '+').
pub fn normalize_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    if trimmed.starts_with('+') {
        trimmed.to_string()
    } else {
        format!("+{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_international_and_local_phone_numbers() {
        assert!(validate_phone("+966501234567").is_ok());
        assert!(validate_phone("0501234567").is_ok());
    }

    #[test]
    fn rejects_short_or_non_numeric_phone_numbers() {
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("+96650ABC4567").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
    }

    #[test]
    fn amounts_must_be_strictly_positive() {
        assert!(validate_positive_amount(&Decimal::new(1500, 2)).is_ok());
        assert!(validate_positive_amount(&Decimal::ZERO).is_err());
        assert!(validate_positive_amount(&Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn vehicle_year_allows_next_model_year_only() {
        let next = Utc::now().year() + 1;
        assert!(validate_vehicle_year(next).is_ok());
        assert!(validate_vehicle_year(next + 1).is_err());
        assert!(validate_vehicle_year(1899).is_err());
    }

    #[test]
    fn normalize_adds_plus_prefix_once() {
        assert_eq!(normalize_phone("966501234567"), "+966501234567");
        assert_eq!(normalize_phone(" +966501234567 "), "+966501234567");
    }
}
