//! The landing page workflow. When a form is submitted:
//!
//! 1. find or create the submitter's organisation
//! 2. update or create the contact and link it to the organisation
//! 3. add a note recording the submission
//! 4. tell every CRM user about it
//! 5. send the submitter a thank-you email, if the form has one
//! 6. hand back the thank-you page URL

pub mod contact;
pub mod note;
pub mod notify;
pub mod organisation;

use std::sync::Arc;

use crate::form::{FormError, FormSubmission};
use crate::free_email::FreeEmailClassifier;
use crate::integrations::{Crm, CrmError};
use crate::mail::{Email, MailError, Mailer};
use crate::templates::{TemplateError, TemplateStore};

#[derive(Debug, thiserror::Error)]
pub enum LandingPageError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Crm(#[from] CrmError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

impl LandingPageError {
    /// The submitter left out something the form needs; worth a retry page.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::Form(_))
    }
}

pub struct LandingPage {
    crm: Arc<dyn Crm>,
    mailer: Arc<dyn Mailer>,
    templates: Arc<dyn TemplateStore>,
    free_domains: Arc<dyn FreeEmailClassifier>,
    debug: bool,
}

impl LandingPage {
    pub fn new(
        crm: Arc<dyn Crm>,
        mailer: Arc<dyn Mailer>,
        templates: Arc<dyn TemplateStore>,
        free_domains: Arc<dyn FreeEmailClassifier>,
    ) -> Self {
        Self {
            crm,
            mailer,
            templates,
            free_domains,
            debug: false,
        }
    }

    /// In debug mode messages are composed and logged but never sent.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Files a form submission in the CRM and returns the thank-you page URL.
    ///
    /// Nothing is written when a required field is missing. Later failures are
    /// returned as they happen; records already created stay in place.
    pub async fn process<I, K, V>(&self, fields: I) -> Result<String, LandingPageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let form = FormSubmission::from_fields(fields)?;
        log::info!("Processing form {} from {}", form.form_name, form.email);

        let template = self.templates.lookup(&form.form_name)?;

        let organisation =
            organisation::resolve(self.crm.as_ref(), self.free_domains.as_ref(), &form).await?;

        let contact = contact::upsert(self.crm.as_ref(), &form, organisation.as_ref()).await?;
        let contact_id = contact.contact_id.ok_or(CrmError::MissingId("contact"))?;

        let note = note::compose(&form, &chrono::Local::now());
        self.crm.add_contact_note(contact_id, &note).await?;
        log::debug!("Added note {:?} to contact {}", note.title, contact_id);

        let owner = self.crm.account_owner().await?;
        let users = self.crm.users().await?;
        let notification = notify::internal_notification(&owner, &users, &contact, &form.form_name);
        self.deliver(&notification).await?;

        match template.thank_you(&form.first_name) {
            Some(thanks) => {
                let email = notify::thank_you_email(&owner, &form.email, thanks);
                self.deliver(&email).await?;
            }
            None => log::debug!("Form {} has no thank-you email", form.form_name),
        }

        Ok(template.thank_you_url(&form.first_name))
    }

    async fn deliver(&self, email: &Email) -> Result<(), MailError> {
        if self.debug {
            log::info!(
                "Debug mode, not sending \"{}\" to {}:\n{}",
                email.subject,
                email.to.join(", "),
                email.body
            );
            return Ok(());
        }
        if email.to.is_empty() {
            log::warn!("No recipients for \"{}\", not sending", email.subject);
            return Ok(());
        }
        self.mailer.send(email).await
    }
}
