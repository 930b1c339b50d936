//! Contact form service
//!
//! Validates contact form submissions, stores them with status `new`, then
//! hands them to the email service in the background.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;

use crate::db::repositories::ContactRepository;
use crate::models::{ContactFormRequest, ContactSubmission, CreateContactInput};
use crate::services::email::EmailService;

const REQUIRED: &str = "Required";

/// A validation failure on one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Error types for contact service operations
#[derive(Debug, thiserror::Error)]
pub enum ContactServiceError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Where a submission came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub ip_address: String,
    pub user_agent: String,
}

/// Field rules for the contact form. Every rule runs, so one field can
/// report several messages.
pub struct ContactValidator {
    name_pattern: Regex,
    email_pattern: Regex,
    phone_pattern: Regex,
}

impl ContactValidator {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| Regex::new(pattern).map_err(|e| anyhow!("Invalid pattern {}: {}", pattern, e));
        Ok(Self {
            name_pattern: compile(r"^[a-zA-Z\s]+$")?,
            email_pattern: compile(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")?,
            phone_pattern: compile(r"^\+?[1-9]\d{0,15}$")?,
        })
    }

    /// Check a request and build the input to persist
    pub fn validate(
        &self,
        request: &ContactFormRequest,
        origin: RequestOrigin,
    ) -> Result<CreateContactInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        if let Some(name) = required(&mut errors, "fullName", &request.full_name) {
            check_length(&mut errors, "fullName", name, 2, 100, "Full name");
            if !self.name_pattern.is_match(name) {
                errors.push(FieldError::new("fullName", "Full name can only contain letters and spaces"));
            }
        }

        if let Some(email) = required(&mut errors, "email", &request.email) {
            if !self.is_valid_email(email) {
                errors.push(FieldError::new("email", "Please enter a valid email address"));
            }
            if email.is_empty() {
                errors.push(FieldError::new("email", "Email is required"));
            }
        }

        let phone = request
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty());
        if let Some(phone) = phone {
            let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
            if !self.phone_pattern.is_match(&compact) {
                errors.push(FieldError::new("phone", "Please enter a valid phone number"));
            }
        }

        if let Some(subject) = required(&mut errors, "subject", &request.subject) {
            check_length(&mut errors, "subject", subject, 5, 200, "Subject");
        }

        if let Some(message) = required(&mut errors, "message", &request.message) {
            check_length(&mut errors, "message", message, 10, 2000, "Message");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CreateContactInput {
            full_name: request.full_name.clone().unwrap_or_default(),
            email: request.email.clone().unwrap_or_default(),
            phone: phone.map(str::to_string),
            subject: request.subject.clone().unwrap_or_default(),
            message: request.message.clone().unwrap_or_default(),
            ip_address: origin.ip_address,
            user_agent: origin.user_agent,
        })
    }

    fn is_valid_email(&self, email: &str) -> bool {
        !email.starts_with('.') && !email.contains("..") && self.email_pattern.is_match(email)
    }
}

fn required<'a>(errors: &mut Vec<FieldError>, field: &str, value: &'a Option<String>) -> Option<&'a str> {
    match value {
        Some(value) => Some(value.as_str()),
        None => {
            errors.push(FieldError::new(field, REQUIRED));
            None
        }
    }
}

fn check_length(errors: &mut Vec<FieldError>, field: &str, value: &str, min: usize, max: usize, label: &str) {
    let len = value.chars().count();
    if len < min {
        errors.push(FieldError {
            field: field.to_string(),
            message: format!("{} must be at least {} characters", label, min),
        });
    }
    if len > max {
        errors.push(FieldError {
            field: field.to_string(),
            message: format!("{} must be less than {} characters", label, max),
        });
    }
}

pub struct ContactService {
    repo: Arc<dyn ContactRepository>,
    email: Arc<EmailService>,
    validator: ContactValidator,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepository>, email: Arc<EmailService>) -> Result<Self> {
        Ok(Self {
            repo,
            email,
            validator: ContactValidator::new()?,
        })
    }

    /// Validate and store a submission, then send the notification
    ///
    /// # Errors
    /// - `Validation` with every failing field
    /// - `Internal` if the submission could not be stored
    pub async fn submit(
        &self,
        request: &ContactFormRequest,
        origin: RequestOrigin,
    ) -> Result<ContactSubmission, ContactServiceError> {
        let input = self
            .validator
            .validate(request, origin)
            .map_err(ContactServiceError::Validation)?;

        let submission = self
            .repo
            .create(&input)
            .await
            .context("Failed to store contact submission")?;
        tracing::info!(id = submission.id, "Contact submission stored");

        let email = self.email.clone();
        let notified = submission.clone();
        tokio::spawn(async move {
            if let Err(e) = email.notify_contact(&notified).await {
                tracing::error!(id = notified.id, "Failed to send contact notification: {}", e);
            }
        });

        Ok(submission)
    }
}
