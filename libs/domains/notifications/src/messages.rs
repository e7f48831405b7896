//! Localized message lookup for notification text.
//!
//! Messages are addressed by key and locale tag. Arguments replace the
//! positional placeholders `{0}`, `{1}`, ... in the resolved template.

use std::collections::HashMap;

pub const WELCOME_SUBJECT: &str = "email.welcome.subject";
pub const WELCOME_MESSAGE: &str = "email.welcome.message";

/// Locale used when neither the requested tag nor its language is bundled.
pub const DEFAULT_LOCALE: &str = "en";

/// Resolves a message key for a locale, formatting positional arguments.
pub trait MessageSource: Send + Sync {
    fn message(&self, key: &str, args: &[&str], locale: &str) -> String;
}

/// Message catalogs compiled into the binary.
///
/// Lookup tries the exact tag (`de-AT`), then the primary language (`de`),
/// then [`DEFAULT_LOCALE`]. An unknown key renders as the key itself.
#[derive(Debug, Clone)]
pub struct BundledMessages {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl BundledMessages {
    pub fn new() -> Self {
        let mut messages = Self::empty();
        messages.insert(
            "en",
            [
                (WELCOME_SUBJECT, "Welcome!"),
                (
                    WELCOME_MESSAGE,
                    "Hello {0},\n\nyour account for {1} has been created and is ready to use.",
                ),
            ],
        );
        messages.insert(
            "de",
            [
                (WELCOME_SUBJECT, "Willkommen!"),
                (
                    WELCOME_MESSAGE,
                    "Hallo {0},\n\nIhr Konto für {1} wurde erstellt und ist einsatzbereit.",
                ),
            ],
        );
        messages
    }

    pub fn empty() -> Self {
        Self {
            catalogs: HashMap::new(),
        }
    }

    /// Adds or replaces entries in the catalog for `locale`.
    pub fn insert<'a>(
        &mut self,
        locale: &str,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        let catalog = self.catalogs.entry(normalize(locale)).or_default();
        for (key, template) in entries {
            catalog.insert(key.to_string(), template.to_string());
        }
    }

    fn lookup(&self, key: &str, locale: &str) -> Option<&str> {
        let tag = normalize(locale);
        let language = tag.split('-').next().unwrap_or_default().to_string();

        [tag, language, DEFAULT_LOCALE.to_string()]
            .iter()
            .find_map(|candidate| self.catalogs.get(candidate)?.get(key))
            .map(String::as_str)
    }
}

impl Default for BundledMessages {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSource for BundledMessages {
    fn message(&self, key: &str, args: &[&str], locale: &str) -> String {
        match self.lookup(key, locale) {
            Some(template) => format_args(template, args),
            None => {
                tracing::warn!(key, locale, "No message found for key");
                key.to_string()
            }
        }
    }
}

fn normalize(locale: &str) -> String {
    locale.trim().replace('_', "-").to_lowercase()
}

fn format_args(template: &str, args: &[&str]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |text, (index, arg)| {
            text.replace(&format!("{{{}}}", index), arg)
        })
}

/// First language tag of an `Accept-Language` header value, without weight.
///
/// Returns [`DEFAULT_LOCALE`] for empty or wildcard values.
pub fn preferred_locale(accept_language: Option<&str>) -> String {
    accept_language
        .and_then(|value| value.split(',').next())
        .and_then(|tag| tag.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .unwrap_or(DEFAULT_LOCALE)
        .to_string()
}
