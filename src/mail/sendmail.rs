use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{Email, MailError, Mailer};

pub const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";

/// Hands messages to the local MTA. Recipients are taken from the headers.
#[derive(Debug, Clone)]
pub struct SendmailMailer {
    program: PathBuf,
}

impl SendmailMailer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SendmailMailer {
    fn default() -> Self {
        Self::new(DEFAULT_SENDMAIL)
    }
}

#[async_trait]
impl Mailer for SendmailMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let message = email.to_message(chrono::Local::now());

        let mut child = Command::new(&self.program)
            .args(["-t", "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A transport that quits early reports why through its exit status.
            let written = match stdin.write_all(message.as_bytes()).await {
                Ok(()) => stdin.shutdown().await,
                Err(e) => Err(e),
            };
            match written {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::warn!("sendmail failed ({}): {}", output.status, stderr);
            return Err(MailError::Rejected {
                status: output.status.to_string(),
                stderr,
            });
        }

        log::info!(
            "Mailed \"{}\" to {}",
            email.subject,
            email.recipients().collect::<Vec<_>>().join(", ")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email {
            from: "owner@example.com".to_string(),
            to: vec!["a@example.com".to_string()],
            bcc: vec![],
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_transport() {
        let mailer = SendmailMailer::new("true");
        mailer.send(&email()).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_transport_is_an_error() {
        let mailer = SendmailMailer::new("false");
        assert!(matches!(
            mailer.send(&email()).await,
            Err(MailError::Rejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_transport_is_an_error() {
        let mailer = SendmailMailer::new("/nonexistent/sendmail");
        assert!(matches!(mailer.send(&email()).await, Err(MailError::Io(_))));
    }
}
