//! Form validation
//!
//! Every `*Input` form is checked before it reaches the store. Errors are
//! collected per field so a form can show all of them at once; a form with
//! any error is rejected as a whole.

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use fleet_types::{
    DriverInput, InsurancePolicyInput, LocationInput, SemiTrailerInput, TripInput, VehicleInput,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// ISO 6346 layout: owner code, category, serial, check digit
static CONTAINER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}[UJZ][0-9]{6}[0-9]$").unwrap());

/// Layout plus the ISO 6346 check digit
pub fn is_valid_container_number(value: &str) -> bool {
    if !CONTAINER_RE.is_match(value) {
        return false;
    }
    let bytes = value.as_bytes();
    let sum: u32 = bytes[..10]
        .iter()
        .enumerate()
        .map(|(i, &b)| container_char_value(b) << i)
        .sum();
    sum % 11 % 10 == u32::from(bytes[10] - b'0')
}

/// Letter values: 10 upward, skipping multiples of 11
const CONTAINER_LETTER_VALUES: [u32; 26] = [
    10, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 34, 35,
    36, 37, 38,
];

fn container_char_value(b: u8) -> u32 {
    match b {
        b'0'..=b'9' => u32::from(b - b'0'),
        _ => CONTAINER_LETTER_VALUES[usize::from(b - b'A')],
    }
}

/// A single failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field errors of one submitted form
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{}", summarize(.fields))]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

/// Accumulates field errors for one form
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
        self
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.error(field, message);
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, "is required")
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.error(field, format!("must be at most {} characters", max));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) if !v.trim().is_empty() => {
                self.check(EMAIL_RE.is_match(v.trim()), field, "is not a valid email")
            }
            _ => self,
        }
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                fields: std::mem::take(&mut self.errors),
            })
        }
    }
}

pub fn validate_driver(input: &DriverInput) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    v.required("full_name", &input.full_name)
        .max_len("full_name", &input.full_name, 120)
        .required("national_id", &input.national_id)
        .required("license_number", &input.license_number)
        .email("email", input.email.as_deref());
    v.finish()
}

pub fn validate_vehicle(input: &VehicleInput) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    v.required("plate", &input.plate)
        .max_len("plate", &input.plate, 16)
        .required("brand", &input.brand)
        .required("model", &input.model);
    if let Some(year) = input.year {
        let next_year = Utc::now().year() + 1;
        v.check(
            (1950..=next_year).contains(&year),
            "year",
            "is outside the accepted range",
        );
    }
    v.finish()
}

pub fn validate_semi_trailer(input: &SemiTrailerInput) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    v.required("plate", &input.plate)
        .max_len("plate", &input.plate, 16);
    if let Some(load) = input.max_load_kg {
        v.check(load > 0, "max_load_kg", "must be positive");
    }
    v.finish()
}

pub fn validate_insurance_policy(input: &InsurancePolicyInput) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    v.required("policy_number", &input.policy_number)
        .required("insurer", &input.insurer)
        .check(
            input.end_date >= input.start_date,
            "end_date",
            "must not be before start_date",
        )
        .check(
            input.premium >= Decimal::ZERO,
            "premium",
            "must not be negative",
        );
    v.finish()
}

pub fn validate_location(input: &LocationInput) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    v.required("name", &input.name)
        .required("city", &input.city)
        .required("country", &input.country);
    v.finish()
}

pub fn validate_trip(input: &TripInput) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    v.required("reference", &input.reference)
        .max_len("reference", &input.reference, 40)
        .check(
            input.origin_location_id != input.destination_location_id,
            "destination_location_id",
            "must differ from origin_location_id",
        );
    if let Some(container) = input.container_number.as_deref() {
        if !container.trim().is_empty() {
            v.check(
                is_valid_container_number(container.trim()),
                "container_number",
                "is not a valid ISO 6346 container number",
            );
        }
    }
    v.finish()
}
