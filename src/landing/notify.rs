use crate::integrations::{AccountOwner, Contact, User};
use crate::mail::Email;
use crate::templates::ThankYou;

/// Broadcast to every CRM user that a form came in.
pub fn internal_notification(
    owner: &AccountOwner,
    users: &[User],
    contact: &Contact,
    form_name: &str,
) -> Email {
    Email {
        from: owner.email.clone(),
        to: users.iter().map(|u| u.email_address.clone()).collect(),
        bcc: Vec::new(),
        subject: format!(
            "Form submission: {} from {} {}",
            form_name, contact.first_name, contact.last_name
        ),
        body: format!(
            "Contact {} {} submitted form {}. Be sure to check it out.",
            contact.first_name, contact.last_name, form_name
        ),
    }
}

/// Thank-you note to the submitter, copied to the account dropbox.
pub fn thank_you_email(owner: &AccountOwner, submitter: &str, thanks: ThankYou) -> Email {
    Email {
        from: owner.email.clone(),
        to: vec![submitter.to_string()],
        bcc: owner.dropbox.iter().cloned().collect(),
        subject: thanks.subject,
        body: thanks.message,
    }
}
