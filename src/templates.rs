//! Per-form thank-you URLs and email templates.
//!
//! Templates live in a JSON document keyed by form name:
//!
//! ```json
//! {
//!   "TestForm1": {
//!     "url": "https://example.com/thanks?name={first_name}",
//!     "subject": "Thanks, {first_name}",
//!     "message": "Hi {first_name},\n\nYour download is at {url}"
//!   }
//! }
//! ```
//!
//! `subject` and `message` are optional. Without both, no thank-you email is sent.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern"));

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormTemplate {
    pub url: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A rendered thank-you email.
#[derive(Debug, Clone, PartialEq)]
pub struct ThankYou {
    pub subject: String,
    pub message: String,
}

impl FormTemplate {
    /// Thank-you page URL with the first name percent-encoded into it.
    pub fn thank_you_url(&self, first_name: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(first_name.as_bytes()).collect();
        render(&self.url, &[("first_name", &encoded)])
    }

    /// `None` unless both subject and message are configured.
    pub fn thank_you(&self, first_name: &str) -> Option<ThankYou> {
        let subject = self.subject.as_deref()?;
        let message = self.message.as_deref()?;
        let url = self.thank_you_url(first_name);

        Some(ThankYou {
            subject: render(subject, &[("first_name", first_name)]),
            message: render(message, &[("first_name", first_name), ("url", &url)]),
        })
    }
}

/// Substitutes `{name}` placeholders; unknown placeholders are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read form templates: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed form templates: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Invalid template for form {form}: {reason}")]
    Invalid { form: String, reason: String },
    #[error("No template for form {0}")]
    UnknownForm(String),
}

pub trait TemplateStore: Send + Sync {
    fn lookup(&self, form_name: &str) -> Result<FormTemplate, TemplateError>;
}

#[derive(Debug, Clone, Default)]
pub struct JsonTemplateStore {
    templates: HashMap<String, FormTemplate>,
}

impl JsonTemplateStore {
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        let templates: HashMap<String, FormTemplate> = serde_json::from_str(json)?;

        for (form, template) in &templates {
            if template.url.trim().is_empty() {
                return Err(TemplateError::Invalid {
                    form: form.clone(),
                    reason: "url is empty".to_string(),
                });
            }
        }

        Ok(Self { templates })
    }

    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        log::debug!(
            "Loaded {} form templates from {}",
            store.templates.len(),
            path.display()
        );
        Ok(store)
    }
}

impl TemplateStore for JsonTemplateStore {
    fn lookup(&self, form_name: &str) -> Result<FormTemplate, TemplateError> {
        self.templates
            .get(form_name)
            .cloned()
            .ok_or_else(|| TemplateError::UnknownForm(form_name.to_string()))
    }
}
