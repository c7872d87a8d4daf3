//! Renders templates and hands them to the configured sender

use std::sync::Arc;

use crate::domain::DomainError;
use crate::infrastructure::observability::record_email_sent;

use super::sender::{EmailMessage, EmailSender};
use super::templates::EmailTemplate;

#[derive(Debug, Clone)]
pub struct Mailer {
    sender: Arc<dyn EmailSender>,
    product_name: String,
}

impl Mailer {
    pub fn new(sender: Arc<dyn EmailSender>, product_name: impl Into<String>) -> Self {
        Self {
            sender,
            product_name: product_name.into(),
        }
    }

    pub async fn send(
        &self,
        to: &str,
        to_name: &str,
        template: EmailTemplate,
    ) -> Result<(), DomainError> {
        let rendered = template.render(&self.product_name);
        let message = EmailMessage {
            to: to.to_string(),
            to_name: to_name.to_string(),
            subject: rendered.subject,
            html_body: rendered.html,
            text_body: rendered.text,
        };

        let result = self.sender.send(&message).await;
        record_email_sent(template.kind(), result.is_ok());

        match &result {
            Ok(()) => tracing::info!(to = %to, template = template.kind(), "Email sent"),
            Err(e) => {
                tracing::warn!(to = %to, template = template.kind(), error = %e, "Email failed")
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::email::MemoryEmailSender;

    #[tokio::test]
    async fn test_send_renders_template() {
        let sender = Arc::new(MemoryEmailSender::new());
        let mailer = Mailer::new(sender.clone(), "IPTV");

        mailer
            .send(
                "jane@example.com",
                "Jane",
                EmailTemplate::Verification {
                    name: "Jane".to_string(),
                    code: "123456".to_string(),
                    ttl_minutes: 15,
                },
            )
            .await
            .unwrap();

        let sent = sender.last_to("jane@example.com").unwrap();
        assert_eq!(sent.to_name, "Jane");
        assert_eq!(sent.subject, "Verify your IPTV account");
        assert!(sent.text_body.contains("123456"));
    }

    #[tokio::test]
    async fn test_send_propagates_failure() {
        let mailer = Mailer::new(Arc::new(MemoryEmailSender::failing("down")), "IPTV");

        let result = mailer
            .send(
                "jane@example.com",
                "Jane",
                EmailTemplate::PasswordChanged {
                    name: "Jane".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Email { .. })));
    }
}
