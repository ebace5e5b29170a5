mod inmemory;
mod smtp;

pub use inmemory::InMemoryMailer;
pub use smtp::SmtpMailer;

use lettre::message::Mailbox;

/// One rendered rappel notification for one recipient
#[derive(Debug, Clone, PartialEq)]
pub struct RappelEmail {
    pub to: Mailbox,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl RappelEmail {
    /// Fails when `to` is not a valid mailbox
    pub fn new(
        to: &str,
        subject: String,
        text_body: String,
        html_body: String,
    ) -> anyhow::Result<Self> {
        let to = to.trim().parse::<Mailbox>()?;
        Ok(Self {
            to,
            subject,
            text_body,
            html_body,
        })
    }

    /// The bare email address of the recipient
    pub fn to_address(&self) -> String {
        self.to.email.to_string()
    }
}

/// Mail transport for rappel notifications
#[async_trait::async_trait]
pub trait IMailer: Send + Sync {
    async fn send(&self, email: RappelEmail) -> anyhow::Result<()>;
}
