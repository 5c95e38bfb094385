//! Validation utilities for the CropWatch monitoring platform
//!
//! Includes remote-sensing specific checks for NDVI readings alongside
//! the general account and farm field validations.

use rust_decimal::Decimal;

use crate::types::SUPPORTED_CROPS;

// ============================================================================
// NDVI and Remote-Sensing Validations
// ============================================================================

/// Validate an NDVI reading is in the physically meaningful range
pub fn validate_ndvi_value(ndvi: f64) -> Result<(), &'static str> {
    if !ndvi.is_finite() {
        return Err("NDVI value must be a finite number");
    }
    if !(-1.0..=1.0).contains(&ndvi) {
        return Err("NDVI value must be between -1 and 1");
    }
    Ok(())
}

/// Validate cloud cover percentage
pub fn validate_cloud_cover(cloud_cover: f64) -> Result<(), &'static str> {
    if !cloud_cover.is_finite() {
        return Err("Cloud cover must be a finite number");
    }
    if !(0.0..=100.0).contains(&cloud_cover) {
        return Err("Cloud cover must be between 0 and 100%");
    }
    Ok(())
}

/// Check whether an observation is clear enough to trust for analysis
pub fn is_low_cloud(cloud_cover: f64) -> bool {
    cloud_cover <= 30.0
}

/// Validate a forecast horizon request (1-30 days)
pub fn validate_forecast_horizon(days: u32) -> Result<(), &'static str> {
    if days < 1 {
        return Err("Forecast horizon must be at least 1 day");
    }
    if days > 30 {
        return Err("Forecast horizon must be at most 30 days");
    }
    Ok(())
}

// ============================================================================
// Geographic Validations
// ============================================================================

/// Validate latitude in decimal degrees
pub fn validate_latitude(latitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    Ok(())
}

/// Validate longitude in decimal degrees
pub fn validate_longitude(longitude: Decimal) -> Result<(), &'static str> {
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

// ============================================================================
// Farm Validations
// ============================================================================

/// Validate a farm display name
pub fn validate_farm_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Farm name cannot be empty");
    }
    if trimmed.len() > 100 {
        return Err("Farm name must be at most 100 characters");
    }
    Ok(())
}

/// Validate crop type against the supported list
pub fn validate_crop_type(crop_type: &str) -> Result<(), &'static str> {
    if SUPPORTED_CROPS.contains(&crop_type) {
        Ok(())
    } else {
        Err("Unsupported crop type")
    }
}

/// Validate farmed area in hectares
pub fn validate_area_hectares(area: Decimal) -> Result<(), &'static str> {
    if area <= Decimal::ZERO {
        return Err("Area must be greater than zero");
    }
    if area > Decimal::from(100_000) {
        return Err("Area exceeds maximum supported farm size");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate phone number format
/// Accepts: 0812345678, 081-234-5678, +15551234567
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 8 {
        return Err("Phone number is too short");
    }
    if digits.len() > 15 {
        return Err("Phone number is too long");
    }
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
    {
        return Err("Phone number contains invalid characters");
    }
    Ok(())
}
