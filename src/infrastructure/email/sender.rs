//! Email delivery port and simple senders

use std::fmt::Debug;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync + Debug {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError>;
}

/// Writes messages to the log instead of delivering them
///
/// Bodies carry one-time codes, so only the envelope is logged unless
/// built with [`LogEmailSender::with_body`].
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender {
    include_body: bool,
}

impl LogEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log the plain-text body at debug level
    pub fn with_body() -> Self {
        Self { include_body: true }
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email not delivered (log provider)"
        );

        if self.include_body {
            tracing::debug!(to = %message.to, body = %message.text_body, "Email body");
        }

        Ok(())
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct MemoryEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail_with: Option<String>,
}

impl MemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every delivery fails with `error`
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(error.into()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Most recent message addressed to `to`
    pub fn last_to(&self, to: &str) -> Option<EmailMessage> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }
}

#[async_trait]
impl EmailSender for MemoryEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        if let Some(error) = &self.fail_with {
            return Err(DomainError::email(error.clone()));
        }

        self.sent
            .lock()
            .map_err(|e| DomainError::internal(format!("Failed to acquire lock: {}", e)))?
            .push(message.clone());

        Ok(())
    }
}
