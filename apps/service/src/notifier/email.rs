use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::NotifyError;
use crate::config::SmtpConfig;

/// Templated email delivery over SMTP. The alert batch is the single
/// template variable; the template identifier becomes the subject line.
pub struct EmailNotifier {
    from: String,
    template: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    pub fn new(smtp: &SmtpConfig, from: String, template: String) -> Result<Self, NotifyError> {
        let creds = Credentials::new(smtp.username.clone(), smtp.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|e| NotifyError(e.to_string()))?
            .port(smtp.port)
            .credentials(creds)
            .build();

        Ok(Self { from, template, transport })
    }

    pub async fn send(&self, addresses: &[String], body: &str) -> Result<(), NotifyError> {
        let mut builder = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e: lettre::address::AddressError| NotifyError(e.to_string()))?,
            )
            .subject(self.template.clone())
            .header(ContentType::TEXT_PLAIN);

        for address in addresses {
            builder = builder.to(address
                .parse()
                .map_err(|e: lettre::address::AddressError| NotifyError(e.to_string()))?);
        }

        let email = builder.body(body.to_string()).map_err(|e| NotifyError(e.to_string()))?;

        self.transport.send(email).await.map_err(|e| NotifyError(e.to_string()))?;

        Ok(())
    }
}
