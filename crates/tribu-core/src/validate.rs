//! Field validation for registration and profile updates.
//!
//! Registration and profile update deliberately carry *different* username
//! rules (≤10 characters at registration, 5–15 alphanumerics at update).
//! The discrepancy comes from the original deployment and is preserved
//! as-is; `username_rules_disagree_between_operations` below pins it.

use serde::Serialize;

use crate::names::normalize_name;

/// A single field-level validation failure. Violations are collected, never
/// short-circuited, so the caller can report all of them at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub reason: &'static str,
}

impl Violation {
    const fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

/// Raw registration fields as submitted, pre-normalization.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationInput<'a> {
    pub given_name: &'a str,
    pub first_family_name: &'a str,
    pub phone: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub password_confirm: &'a str,
}

fn is_exact_digits(s: &str, n: usize) -> bool {
    s.len() == n && s.bytes().all(|b| b.is_ascii_digit())
}

/// Validate a registration submission. Checks run in a fixed order and every
/// failure is collected.
pub fn validate_registration(input: &RegistrationInput<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    if input.username.chars().count() > 10 {
        violations.push(Violation::new(
            "username",
            "username must be at most 10 characters",
        ));
    }
    if !is_exact_digits(input.phone, 8) {
        violations.push(Violation::new("phone", "phone must be exactly 8 digits"));
    }
    if input.password != input.password_confirm {
        violations.push(Violation::new("password", "passwords do not match"));
    }
    if normalize_name(input.given_name).is_empty() {
        violations.push(Violation::new(
            "given_name",
            "given name must contain letters",
        ));
    }
    if normalize_name(input.first_family_name).is_empty() {
        violations.push(Violation::new(
            "first_family_name",
            "first family name must contain letters",
        ));
    }

    violations
}

/// Validate a profile-update submission (mutable fields only).
pub fn validate_profile_update(phone: &str, username: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !is_exact_digits(phone, 8) {
        violations.push(Violation::new("phone", "phone must be exactly 8 digits"));
    }
    let username_len = username.chars().count();
    if !(5..=15).contains(&username_len) || !username.bytes().all(|b| b.is_ascii_alphanumeric()) {
        violations.push(Violation::new(
            "username",
            "username must be 5-15 alphanumeric characters",
        ));
    }

    violations
}
