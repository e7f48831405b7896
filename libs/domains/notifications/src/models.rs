use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

/// A plain-text email handed to the mail service.
///
/// Wire keys are `emailFrom`, `emailTo`, `subject` and `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NotificationRequest {
    #[serde(rename = "emailFrom")]
    #[schema(example = "registry@demo.com")]
    pub from: String,
    #[serde(rename = "emailTo")]
    #[schema(example = "alex@demo.com")]
    pub to: String,
    #[schema(example = "Welcome!")]
    pub subject: String,
    #[serde(rename = "text")]
    #[schema(example = "Hello Alex, your account is ready.")]
    pub body: String,
}

impl NotificationRequest {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

fn required(value: &str) -> Option<ValidationError> {
    value
        .trim()
        .is_empty()
        .then(|| ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")))
}

fn email(value: &str) -> Option<ValidationError> {
    required(value).or_else(|| {
        (!value.validate_email()).then(|| {
            ValidationError::new("email").with_message(Cow::Borrowed("Email format is not valid"))
        })
    })
}

impl Validate for NotificationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let checks = [
            ("emailFrom", email(&self.from)),
            ("emailTo", email(&self.to)),
            ("subject", required(&self.subject)),
            ("text", required(&self.body)),
        ];
        for (field, failure) in checks {
            if let Some(err) = failure {
                errors.add(field, err);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
