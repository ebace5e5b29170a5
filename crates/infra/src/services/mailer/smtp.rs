use super::{IMailer, RappelEmail};
use crate::Config;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

/// Sends rappel emails through the SMTP server given in `Config`
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let from = config.mail_from.parse::<Mailbox>()?;
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
                .port(config.smtp_port);
        if let Some((username, password)) = config.smtp_credentials() {
            builder = builder.credentials(Credentials::new(username, password));
        }
        Ok(Self {
            from,
            transport: builder.build(),
        })
    }
}

#[async_trait::async_trait]
impl IMailer for SmtpMailer {
    async fn send(&self, email: RappelEmail) -> anyhow::Result<()> {
        let to = email.to_address();
        let message = Message::builder()
            .from(self.from.clone())
            .to(email.to)
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(
                email.text_body,
                email.html_body,
            ))?;

        self.transport.send(message).await?;
        debug!("Rappel email sent to: {}", to);
        Ok(())
    }
}
