// ── Pre-flight validation ──
//
// Checks that run before any request is sent. A failure here never
// reaches the gateway; callers show it as a validation notice.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::model::{DomainDraft, ReportRef, UserGroupDraft};
use crate::session::Role;

pub const DOMAIN_NAME_REQUIRED: &str = "Domain name is required";
pub const GROUP_FIELDS_REQUIRED: &str =
    "AD Group Name, at least one Folder, and Associated Domain are required";
pub const REQUEST_REASON_REQUIRED: &str = "Please type a reason for your request";
pub const REJECTION_REASON_REQUIRED: &str = "Please provide a reason for rejection";
pub const MISSING_FILE_INFO: &str = "Missing file information";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));

const MIN_PASSWORD_LEN: usize = 6;
const PHONE_DIGITS: usize = 10;

// ── Admin forms ──────────────────────────────────────────────────────

pub fn domain_draft(draft: &DomainDraft) -> Result<(), CoreError> {
    if draft.name.trim().is_empty() {
        return Err(CoreError::validation(DOMAIN_NAME_REQUIRED));
    }
    Ok(())
}

pub fn user_group_draft(draft: &UserGroupDraft) -> Result<(), CoreError> {
    if draft.ad_group_name.trim().is_empty()
        || draft.folder_access.is_empty()
        || draft.associated_domain.trim().is_empty()
    {
        return Err(CoreError::validation(GROUP_FIELDS_REQUIRED));
    }
    Ok(())
}

pub fn request_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::validation(REQUEST_REASON_REQUIRED));
    }
    Ok(())
}

pub fn rejection_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::validation(REJECTION_REASON_REQUIRED));
    }
    Ok(())
}

/// Folder and file name are both needed to address a report.
pub fn report_ref(report: &ReportRef) -> Result<(), CoreError> {
    if !report.is_complete() {
        return Err(CoreError::validation(MISSING_FILE_INFO));
    }
    Ok(())
}

// ── Account forms ────────────────────────────────────────────────────

/// Form field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Phone,
    Domain,
    Password,
    ConfirmPassword,
}

/// One per-field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

fn push(errors: &mut Vec<FieldError>, field: Field, message: &'static str) {
    errors.push(FieldError { field, message });
}

fn password_errors(errors: &mut Vec<FieldError>, password: &str) {
    if password.is_empty() {
        push(errors, Field::Password, "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        push(errors, Field::Password, "Password must be at least 6 characters");
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Field errors for the login form, in display order.
pub fn login_errors(email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if email.is_empty() {
        push(&mut errors, Field::Email, "Email is required");
    } else if !is_valid_email(email) {
        push(&mut errors, Field::Email, "Email is invalid");
    }
    password_errors(&mut errors, password);
    errors
}

/// Raw signup input.
#[derive(Debug, Clone, Default)]
pub struct SignupInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub domain: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub role: Role,
}

/// Phone number with spaces and dashes removed.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// Field errors for the signup form, in display order.
pub fn signup_errors(input: &SignupInput<'_>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if input.name.trim().is_empty() {
        push(&mut errors, Field::Name, "Name is required");
    }

    if input.email.trim().is_empty() {
        push(&mut errors, Field::Email, "Email is required");
    } else if !is_valid_email(input.email.trim()) {
        push(&mut errors, Field::Email, "Invalid email format");
    }

    let phone = normalize_phone(input.phone.trim());
    if phone.is_empty() {
        push(&mut errors, Field::Phone, "Phone number is required");
    } else if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
        push(&mut errors, Field::Phone, "Phone number must be 10 digits");
    }

    if input.role == Role::User && input.domain.trim().is_empty() {
        push(&mut errors, Field::Domain, "Domain is required");
    }

    password_errors(&mut errors, input.password);

    if input.password != input.confirm_password {
        push(&mut errors, Field::ConfirmPassword, "Passwords do not match");
    }

    errors
}

/// Fold field errors into a single validation error.
pub fn into_result(errors: &[FieldError]) -> Result<(), CoreError> {
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ");
    Err(CoreError::validation(message))
}
