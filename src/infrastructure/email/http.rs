//! Transactional email over an HTTP JSON API

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::DomainError;

use super::sender::{EmailMessage, EmailSender};

#[derive(Debug, Clone)]
pub struct HttpEmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct Contact<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    name: &'a str,
}

fn is_blank(value: &&str) -> bool {
    value.trim().is_empty()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody<'a> {
    sender: Contact<'a>,
    to: [Contact<'a>; 1],
    subject: &'a str,
    html_content: &'a str,
    text_content: &'a str,
}

#[derive(Clone)]
pub struct HttpEmailSender {
    client: reqwest::Client,
    config: HttpEmailConfig,
}

impl std::fmt::Debug for HttpEmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmailSender")
            .field("api_url", &self.config.api_url)
            .field("sender_email", &self.config.sender_email)
            .field("api_key", &"[hidden]")
            .finish()
    }
}

impl HttpEmailSender {
    pub fn new(config: HttpEmailConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        let body = SendEmailBody {
            sender: Contact {
                email: &self.config.sender_email,
                name: &self.config.sender_name,
            },
            to: [Contact {
                email: &message.to,
                name: &message.to_name,
            }],
            subject: &message.subject,
            html_content: &message.html_body,
            text_content: &message.text_body,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("api-key", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::email(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::email(format!("HTTP {}: {}", status, error_body)));
        }

        tracing::debug!(to = %message.to, subject = %message.subject, "Email accepted");
        Ok(())
    }
}
