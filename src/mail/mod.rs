pub mod sendmail;

use async_trait::async_trait;
use chrono::{DateTime, Local};

pub use sendmail::SendmailMailer;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl Email {
    /// Renders the message with RFC 5322 headers, ready for `sendmail -t`.
    pub fn to_message(&self, date: DateTime<Local>) -> String {
        let mut message = String::new();
        push_header(&mut message, "From", &self.from);
        push_header(&mut message, "To", &self.to.join(", "));
        if !self.bcc.is_empty() {
            push_header(&mut message, "Bcc", &self.bcc.join(", "));
        }
        push_header(&mut message, "Subject", &self.subject);
        push_header(&mut message, "Date", &date.to_rfc2822());
        push_header(&mut message, "MIME-Version", "1.0");
        push_header(&mut message, "Content-Type", "text/plain; charset=utf-8");
        push_header(&mut message, "Content-Transfer-Encoding", "8bit");
        message.push_str("\r\n");
        message.push_str(&self.body.replace("\r\n", "\n").replace('\n', "\r\n"));
        if !message.ends_with("\r\n") {
            message.push_str("\r\n");
        }
        message
    }

    /// Every address the message goes to.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to.iter().chain(self.bcc.iter()).map(String::as_str)
    }
}

// Header values never contain line breaks; a form field must not add headers.
fn push_header(message: &mut String, name: &str, value: &str) {
    let value: String = value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    message.push_str(name);
    message.push_str(": ");
    message.push_str(&value);
    message.push_str("\r\n");
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Failed to run mail transport: {0}")]
    Io(#[from] std::io::Error),
    #[error("Mail transport exited with {status}: {stderr}")]
    Rejected { status: String, stderr: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}
