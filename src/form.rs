//! Typed view of a landing page form submission.

/// A submitted form, split into the fields the workflow understands and
/// everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub form_name: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub company: Option<String>,
    /// Fields with no dedicated slot, in submission order.
    pub extra: Vec<(String, String)>,
    raw: Vec<(String, String)>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FormError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
}

const REQUIRED: [&str; 4] = ["email", "first_name", "last_name", "form_name"];

impl FormSubmission {
    pub fn from_fields<I, K, V>(fields: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let raw: Vec<(String, String)> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut email = None;
        let mut first_name = None;
        let mut last_name = None;
        let mut form_name = None;
        let mut phone = None;
        let mut website = None;
        let mut company = None;
        let mut extra: Vec<(String, String)> = Vec::new();

        for (key, value) in &raw {
            let slot = match key.as_str() {
                "email" => &mut email,
                "first_name" => &mut first_name,
                "last_name" => &mut last_name,
                "form_name" => &mut form_name,
                "phone" => &mut phone,
                "website" => &mut website,
                "company" => &mut company,
                _ => {
                    match extra.iter_mut().find(|(k, _)| k == key) {
                        Some(existing) => existing.1 = value.clone(),
                        None => extra.push((key.clone(), value.clone())),
                    }
                    continue;
                }
            };
            // A later blank duplicate doesn't erase an earlier value
            if let Some(value) = non_blank(value) {
                *slot = Some(value);
            }
        }

        let email = email.ok_or(FormError::MissingField(REQUIRED[0]))?;
        let first_name = first_name.ok_or(FormError::MissingField(REQUIRED[1]))?;
        let last_name = last_name.ok_or(FormError::MissingField(REQUIRED[2]))?;
        let form_name = form_name.ok_or(FormError::MissingField(REQUIRED[3]))?;

        validate_email(&email)?;

        Ok(Self {
            email,
            first_name,
            last_name,
            form_name,
            phone,
            website,
            company,
            extra,
            raw,
        })
    }

    /// The submission exactly as received, including duplicates.
    pub fn raw_fields(&self) -> &[(String, String)] {
        &self.raw
    }

    /// Lower-cased domain part of the email address.
    pub fn domain(&self) -> String {
        self.email
            .rsplit_once('@')
            .map(|(_, domain)| domain.to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// `key: value` lines for every field not stored elsewhere on the contact.
    ///
    /// `company` is kept here as well: organisation resolution only reads it,
    /// and free-provider submitters would otherwise lose it.
    pub fn background(&self) -> Option<String> {
        let lines: Vec<String> = self
            .company
            .iter()
            .map(|company| format!("company: {}", company))
            .chain(self.extra.iter().map(|(k, v)| format!("{}: {}", k, v)))
            .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Nothing that could split or comment recipients in a To: header.
fn validate_email(email: &str) -> Result<(), FormError> {
    let forbidden = |c: char| {
        c.is_whitespace() || c.is_control() || matches!(c, ',' | ';' | '<' | '>' | '(' | ')' | '"')
    };
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').all(|label| !label.is_empty())
                && !email.chars().any(forbidden)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FormError::InvalidEmail(email.to_string()))
    }
}
