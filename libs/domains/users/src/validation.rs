//! Field rules for user requests.
//!
//! Each rule is a standalone function so it can be reused outside the
//! `Validate` impls, and every rule runs even when an earlier one failed.

use crate::error::{UserError, UserResult};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

/// Maximum length of a user name, in characters
pub const NAME_MAX_CHARS: usize = 250;

/// Wire key of the name field, used for error details
pub const NAME_FIELD: &str = "full-name";
pub const EMAIL_FIELD: &str = "email";
pub const ID_FIELD: &str = "id";

/// Local part, domain, then a two or three letter top-level domain
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,3}$").unwrap());

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("blank", "Name should have a value"));
    }
    Ok(())
}

pub fn within_name_length(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > NAME_MAX_CHARS {
        let mut err = rule("length", "Name is too long");
        err.add_param(Cow::Borrowed("max"), &NAME_MAX_CHARS);
        return Err(err);
    }
    Ok(())
}

pub fn email_shape(value: &str) -> Result<(), ValidationError> {
    if !value.validate_email() || !EMAIL_PATTERN.is_match(value) {
        return Err(rule("email", "Email format is not valid"));
    }
    Ok(())
}

pub fn id_present<T>(value: &Option<T>) -> Result<(), ValidationError> {
    if value.is_none() {
        return Err(rule("required", "User id must be provided"));
    }
    Ok(())
}

/// Records every failed rule for `field` into `errors`.
pub(crate) fn collect<I>(errors: &mut ValidationErrors, field: &'static str, results: I)
where
    I: IntoIterator<Item = Result<(), ValidationError>>,
{
    for result in results {
        if let Err(err) = result {
            errors.add(field, err);
        }
    }
}

pub(crate) fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Runs `value`'s rules and folds failures into [`UserError::InvalidInput`].
///
/// Messages are ordered by field name so the text is stable.
pub fn ensure_valid<T: Validate>(value: &T) -> UserResult<()> {
    value.validate().map_err(|errors| {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        let message = fields
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .map(|err| {
                err.message
                    .as_deref()
                    .map(str::to_owned)
                    .unwrap_or_else(|| err.code.to_string())
            })
            .collect::<Vec<_>>()
            .join("; ");

        UserError::InvalidInput(message)
    })
}
