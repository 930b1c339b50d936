//! Email service for contact form notifications

use anyhow::{anyhow, Result};
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailConfig;
use crate::models::ContactSubmission;

/// Sends a plain-text email for each stored contact submission.
///
/// With mail disabled, or without a recipient, the submission is only logged.
pub struct EmailService {
    config: MailConfig,
}

impl EmailService {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Whether notifications go out over SMTP
    pub fn is_enabled(&self) -> bool {
        self.config.enabled && self.config.notify_to.is_some() && !self.config.smtp_host.is_empty()
    }

    /// Notify the site owner about a new submission
    pub async fn notify_contact(&self, submission: &ContactSubmission) -> Result<()> {
        let Some(to) = self.config.notify_to.as_deref().filter(|_| self.is_enabled()) else {
            tracing::info!(
                id = submission.id,
                subject = %submission.subject,
                "Contact submission stored, mail notifications disabled"
            );
            return Ok(());
        };

        let email = self.build_message(to, submission)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
            .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
            .port(self.config.smtp_port);
        if !self.config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ));
        }
        let mailer: AsyncSmtpTransport<Tokio1Executor> = builder.build();

        mailer
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        tracing::info!(id = submission.id, "Contact notification sent");
        Ok(())
    }

    fn build_message(&self, to: &str, submission: &ContactSubmission) -> Result<Message> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_address);

        Message::builder()
            .from(from.parse().map_err(|e| anyhow!("Invalid from address: {}", e))?)
            .reply_to(
                submission
                    .email
                    .parse()
                    .map_err(|e| anyhow!("Invalid reply-to address: {}", e))?,
            )
            .to(to.parse().map_err(|e| anyhow!("Invalid to address: {}", e))?)
            .subject(format!("New contact form submission: {}", submission.subject))
            .header(ContentType::TEXT_PLAIN)
            .body(notification_body(submission))
            .map_err(|e| anyhow!("Failed to build email: {}", e))
    }
}

/// Plain-text body of the notification email
pub fn notification_body(submission: &ContactSubmission) -> String {
    format!(
        "A new message was submitted through the contact form.\n\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Subject: {}\n\n\
         {}\n\n\
         Submitted {} from {} ({})\n",
        submission.full_name,
        submission.email,
        submission.phone.as_deref().unwrap_or("-"),
        submission.subject,
        submission.message,
        submission.created_at.format("%Y-%m-%d %H:%M UTC"),
        submission.ip_address,
        submission.user_agent,
    )
}
