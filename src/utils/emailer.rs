use lettre::message::{Mailbox, MessageBuilder};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::utils::config::EmailConfig;

/// Email client.
#[derive(Clone)]
pub struct Emailer {
    /// Mailbox to send email from.
    from: Mailbox,
    /// Mailbox to put as ReplyTo.
    reply_to: Option<Mailbox>,
    /// Underlying SMTPS transport.
    transport: SmtpTransport,
}

impl Emailer {
    pub fn connect(config: &EmailConfig) -> anyhow::Result<Self> {
        // `lettre` requires a default provider to be installed to use SMTPS.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let mut transport = SmtpTransport::from_url(&config.smtp_addr)?;
        if let (Some(username), Some(password)) =
            (config.smtp_username.clone(), config.smtp_password.clone())
        {
            transport = transport.credentials(Credentials::new(username, password));
        }
        let transport = transport.build();

        Ok(Self { transport, from: config.from.clone(), reply_to: config.reply_to.clone() })
    }

    pub fn builder(&self) -> MessageBuilder {
        let builder = Message::builder().from(self.from.clone());
        match &self.reply_to {
            Some(reply_to) => builder.reply_to(reply_to.clone()),
            None => builder,
        }
    }

    /// Send a message, moving the blocking SMTP call off the async runtime.
    pub async fn send(&self, message: Message) -> anyhow::Result<()> {
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message)).await??;
        Ok(())
    }
}
