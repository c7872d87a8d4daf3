//! Outgoing email: templates, the delivery port and its adapters

mod http;
mod mailer;
mod sender;
mod templates;

pub use http::{HttpEmailConfig, HttpEmailSender};
pub use mailer::Mailer;
pub use sender::{EmailMessage, EmailSender, LogEmailSender, MemoryEmailSender};
pub use templates::{escape_html, EmailTemplate, RenderedEmail};
