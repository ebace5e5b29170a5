mod mailer;

pub use mailer::{IMailer, InMemoryMailer, RappelEmail, SmtpMailer};
