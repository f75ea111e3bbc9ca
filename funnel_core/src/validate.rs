//! Synchronous field validation.
//!
//! Two consumers: the step-1 personal-details gate of the lead funnel, and
//! the server-side schema for the separate lawyer-application intake.  Both
//! run before any network call and return structured errors — the funnel a
//! single blocking message, the lawyer schema per-field `{path, message}`
//! pairs.

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::errors::{FunnelError, Result};

// ─────────────────────────────────────────────────────────
// Step 1 — personal details
// ─────────────────────────────────────────────────────────

/// Raw input from the personal-details step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsInput {
    pub name: String,
    /// City display name or slug; must match the fixed catalog.
    pub location: String,
    /// Dial code chosen in the country picker, e.g. `"+91"`.
    pub country_code: String,
    /// National number digits only.
    pub whatsapp_number: String,
    pub whatsapp_consent: bool,
}

/// Country-specific phone rules, keyed by dial code.
struct PhoneRule {
    dial_code: &'static str,
    min_digits: usize,
    max_digits: usize,
    /// Digits the national number may start with; empty means any.
    leading: &'static [char],
}

/// The countries offered by the picker.  India is the default market and
/// the only one with a leading-digit rule (mobile numbers start 6–9).
const PHONE_RULES: &[PhoneRule] = &[
    PhoneRule { dial_code: "+91", min_digits: 10, max_digits: 10, leading: &['6', '7', '8', '9'] },
    PhoneRule { dial_code: "+1", min_digits: 10, max_digits: 10, leading: &[] },
    PhoneRule { dial_code: "+44", min_digits: 10, max_digits: 10, leading: &[] },
    PhoneRule { dial_code: "+971", min_digits: 9, max_digits: 9, leading: &[] },
    PhoneRule { dial_code: "+65", min_digits: 8, max_digits: 8, leading: &[] },
    PhoneRule { dial_code: "+61", min_digits: 9, max_digits: 9, leading: &[] },
];

/// Validate a WhatsApp number against the rules for `country_code`.
pub fn validate_phone(country_code: &str, number: &str) -> Result<()> {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != number.trim().len() {
        return Err(FunnelError::Validation(
            "Phone number must contain digits only".to_string(),
        ));
    }

    let rule = PHONE_RULES
        .iter()
        .find(|r| r.dial_code == country_code)
        .ok_or_else(|| {
            FunnelError::Validation(format!("Unsupported country code: {country_code}"))
        })?;

    if digits.len() < rule.min_digits || digits.len() > rule.max_digits {
        return Err(FunnelError::Validation(format!(
            "Phone number for {country_code} must be {}–{} digits",
            rule.min_digits, rule.max_digits
        )));
    }

    if !rule.leading.is_empty() {
        let first = digits.chars().next().unwrap_or('0');
        if !rule.leading.contains(&first) {
            return Err(FunnelError::Validation(format!(
                "Mobile numbers for {country_code} must start with {}",
                rule.leading.iter().collect::<String>()
            )));
        }
    }

    Ok(())
}

/// Validate the whole personal-details step.  First failure wins; the UI
/// surfaces one blocking message at a time.
pub fn validate_details(input: &DetailsInput) -> Result<()> {
    let name = input.name.trim();
    if name.len() < 2 {
        return Err(FunnelError::Validation(
            "Please enter your full name".to_string(),
        ));
    }
    if name.len() > 100 {
        return Err(FunnelError::Validation(
            "Name must be at most 100 characters".to_string(),
        ));
    }

    if !is_catalog_city(&input.location) {
        return Err(FunnelError::Validation(
            "Please select a city from the list".to_string(),
        ));
    }

    validate_phone(&input.country_code, &input.whatsapp_number)?;

    if !input.whatsapp_consent {
        return Err(FunnelError::Validation(
            "WhatsApp consent is required to proceed".to_string(),
        ));
    }

    Ok(())
}

/// Accept either the slug (`"navi-mumbai"`) or display form (`"Navi Mumbai"`).
fn is_catalog_city(location: &str) -> bool {
    let slug = location.trim().to_lowercase().replace(' ', "-");
    catalog::is_known_city(&slug)
}

// ─────────────────────────────────────────────────────────
// Lawyer application schema
// ─────────────────────────────────────────────────────────

/// An application from a lawyer wanting to join the panel.  Separate
/// funnel from lead capture; validated server-side before forwarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawyerApplication {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Bar council enrollment number.
    pub enrollment_number: String,
    pub city: String,
    pub practice_areas: Vec<String>,
    pub years_of_experience: u8,
    pub linkedin_url: Option<String>,
    pub about: Option<String>,
}

/// A single schema violation, addressed by field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        FieldError {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a lawyer application.  Unlike the funnel gate, this collects
/// *all* violations so the client can annotate every field at once.
pub fn validate_lawyer_application(app: &LawyerApplication) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let name = app.full_name.trim();
    if name.len() < 2 || name.len() > 100 {
        errors.push(FieldError::new(
            "fullName",
            "Full name must be 2–100 characters",
        ));
    }

    if !is_plausible_email(&app.email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }

    if validate_phone("+91", &app.phone).is_err() {
        errors.push(FieldError::new(
            "phone",
            "Phone must be a valid 10-digit Indian mobile number",
        ));
    }

    let enrollment = app.enrollment_number.trim();
    if enrollment.len() < 5 || enrollment.len() > 30 {
        errors.push(FieldError::new(
            "enrollmentNumber",
            "Enrollment number must be 5–30 characters",
        ));
    }

    if app.city.trim().is_empty() {
        errors.push(FieldError::new("city", "City is required"));
    }

    if app.practice_areas.is_empty() {
        errors.push(FieldError::new(
            "practiceAreas",
            "Select at least one practice area",
        ));
    } else if app.practice_areas.len() > 10 {
        errors.push(FieldError::new(
            "practiceAreas",
            "Select at most 10 practice areas",
        ));
    }

    if app.years_of_experience > 60 {
        errors.push(FieldError::new(
            "yearsOfExperience",
            "Years of experience must be 0–60",
        ));
    }

    if let Some(url) = app.linkedin_url.as_deref() {
        if !url.trim().is_empty() && !is_plausible_url(url) {
            errors.push(FieldError::new(
                "linkedinUrl",
                "Must be a valid http(s) URL",
            ));
        }
    }

    if let Some(about) = app.about.as_deref() {
        if about.len() > 2000 {
            errors.push(FieldError::new(
                "about",
                "About section must be at most 2000 characters",
            ));
        }
    }

    errors
}

/// Minimal structural email check: one `@`, non-empty local part, a dot in
/// the domain.  Deliverability is the mail provider's problem.
fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn is_plausible_url(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("https://") || url.starts_with("http://"))
        && url.len() > 10
        && !url.contains(char::is_whitespace)
}
