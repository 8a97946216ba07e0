// Input forms: local validation, one write, and mapping of server-reported
// errors back onto the inputs

mod account;
mod booking;
mod hotel;

pub use account::{ChangePasswordForm, LoginForm, ProfileForm, RegisterForm};
pub use booking::{BookingForm, RescheduleForm, ReviewForm, SearchForm};
pub use hotel::{HotelProfileForm, RoomForm};

use crate::client::TripfferClient;
use crate::error::{ApiError, ErrorCategory, FieldErrors};
use crate::validate::{self, Check};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

// At most one message per input; the first problem found wins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn check(&mut self, field: &str, result: Check) {
        if let Err(message) = result {
            self.set(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // Parses an optional `YYYY-MM-DD` input
    pub(crate) fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        if value.trim().is_empty() {
            return None;
        }
        let parsed = validate::parse_date(value);
        if parsed.is_none() {
            self.set(field, "Enter a valid date.");
        }
        parsed
    }

    // Parses a required number, recording the matching message on failure
    pub(crate) fn number<T: std::str::FromStr>(
        &mut self,
        field: &str,
        value: &str,
        missing: &str,
        invalid: &str,
    ) -> Option<T> {
        match validate::parse_number(value, missing, invalid) {
            Ok(number) => Some(number),
            Err(message) => {
                self.set(field, message);
                None
            }
        }
    }
}

impl From<FormErrors> for FieldErrors {
    fn from(errors: FormErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, message) in errors.0 {
            fields.push(field, message);
        }
        fields
    }
}

#[async_trait]
pub trait Form: Send + Sync {
    type Output: Send;

    // Input names, matching the field names the server reports errors under
    fn fields(&self) -> &'static [&'static str];

    fn validate(&self) -> FormErrors;

    // Only called once `validate` came back clean
    async fn submit(&self, client: &TripfferClient) -> Result<Self::Output, ApiError>;
}

pub struct FormController<F: Form> {
    form: F,
    phase: FormPhase,
    errors: FormErrors,
    banner: Option<String>,
}

impl<F: Form> FormController<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            phase: FormPhase::Idle,
            errors: FormErrors::new(),
            banner: None,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    // Editing an input returns the form to idle
    pub fn form_mut(&mut self) -> &mut F {
        if self.phase != FormPhase::Submitting {
            self.phase = FormPhase::Idle;
        }
        &mut self.form
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn into_form(self) -> F {
        self.form
    }

    // Validation failures never reach the network. Returns the write's
    // result on success.
    pub async fn submit(&mut self, client: &TripfferClient) -> Option<F::Output> {
        self.errors = self.form.validate();
        self.banner = None;
        if !self.errors.is_empty() {
            tracing::debug!(errors = self.errors.len(), "Form failed local validation");
            self.phase = FormPhase::Failed;
            return None;
        }

        self.phase = FormPhase::Submitting;
        match self.form.submit(client).await {
            Ok(output) => {
                self.phase = FormPhase::Succeeded;
                Some(output)
            }
            Err(err) => {
                self.apply_error(&err);
                self.phase = FormPhase::Failed;
                None
            }
        }
    }

    fn apply_error(&mut self, err: &ApiError) {
        match (err.category(), err.field_errors()) {
            (ErrorCategory::Validation | ErrorCategory::Field, Some(fields)) => {
                let known = self.form.fields();
                let mut unmatched = Vec::new();
                for (field, messages) in fields.iter() {
                    let Some(message) = messages.first() else {
                        continue;
                    };
                    if known.contains(&field) {
                        self.errors.set(field, message.clone());
                    } else {
                        unmatched.push(format!("{}: {}", field, message));
                    }
                }
                if !unmatched.is_empty() {
                    self.banner = Some(unmatched.join(" "));
                }
            }
            _ => self.banner = Some(err.user_message()),
        }
    }
}
