use anyhow::Result;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

use crate::config::Config;

/// Seam over the outgoing mail primitive. Dispatch and auth mails go through
/// this so tests can substitute a stub transport.
pub trait MailSender: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

pub struct SmtpMailer {
    host: String,
    port: u16,
    username: String,
    password: String,
    from: String,
}

impl SmtpMailer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            username: config.smtp_username.clone(),
            password: config.smtp_password.clone(),
            from: config.smtp_from.clone(),
        }
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let tls = TlsParameters::builder(self.host.clone()).build()?;

        let mut builder = match SmtpTransport::relay(&self.host) {
            Ok(b) => b,
            Err(_) => SmtpTransport::builder_dangerous(&self.host),
        };

        builder = builder.port(self.port).timeout(Some(Duration::from_secs(20)));

        if !self.username.is_empty() {
            // Trim whitespace that may sneak in from copied app passwords
            let clean_password: String =
                self.password.chars().filter(|c| !c.is_whitespace()).collect();
            builder = builder
                .authentication(vec![Mechanism::Plain, Mechanism::Login])
                .credentials(Credentials::new(self.username.clone(), clean_password));
        }

        let builder = if self.port == 465 {
            builder.tls(Tls::Wrapper(tls))
        } else {
            builder.tls(Tls::Required(tls))
        };

        Ok(builder.build())
    }
}

impl MailSender for SmtpMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .body(body.to_string())?;

        match self.transport()?.send(&email) {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!(to, "SMTP send failed: {e:?}");
                Err(e.into())
            }
        }
    }
}
