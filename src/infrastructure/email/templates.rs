//! Account email templates

/// A message the gateway sends about an account
#[derive(Debug, Clone, PartialEq)]
pub enum EmailTemplate {
    Verification { name: String, code: String, ttl_minutes: i64 },
    PasswordReset { name: String, code: String, ttl_minutes: i64 },
    PasswordChanged { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl EmailTemplate {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Verification { .. } => "verification",
            Self::PasswordReset { .. } => "password_reset",
            Self::PasswordChanged { .. } => "password_changed",
        }
    }

    pub fn render(&self, product: &str) -> RenderedEmail {
        match self {
            Self::Verification {
                name,
                code,
                ttl_minutes,
            } => code_email(
                product,
                name,
                format!("Verify your {} account", product),
                "Use this code to confirm your email address:",
                code,
                *ttl_minutes,
            ),
            Self::PasswordReset {
                name,
                code,
                ttl_minutes,
            } => code_email(
                product,
                name,
                format!("Reset your {} password", product),
                "Use this code to choose a new password:",
                code,
                *ttl_minutes,
            ),
            Self::PasswordChanged { name } => {
                let subject = format!("Your {} password was changed", product);
                let notice = "Your password was just changed. If this was not you, reset your \
                              password right away.";

                RenderedEmail {
                    html: layout(
                        &subject,
                        &format!(
                            "<p>Hi {},</p>\n<p>{}</p>",
                            escape_html(name),
                            escape_html(notice)
                        ),
                        product,
                    ),
                    text: format!("Hi {},\n\n{}\n\n- {}\n", name, notice, product),
                    subject,
                }
            }
        }
    }
}

fn code_email(
    product: &str,
    name: &str,
    subject: String,
    intro: &str,
    code: &str,
    ttl_minutes: i64,
) -> RenderedEmail {
    let expiry = format!("The code expires in {} minutes.", ttl_minutes);

    let html = layout(
        &subject,
        &format!(
            "<p>Hi {},</p>\n<p>{}</p>\n\
             <p style=\"font-size:28px;font-weight:bold;letter-spacing:6px\">{}</p>\n\
             <p>{}</p>",
            escape_html(name),
            escape_html(intro),
            escape_html(code),
            escape_html(&expiry)
        ),
        product,
    );

    let text = format!(
        "Hi {},\n\n{}\n\n    {}\n\n{}\n\n- {}\n",
        name, intro, code, expiry, product
    );

    RenderedEmail {
        subject,
        html,
        text,
    }
}

fn layout(title: &str, body: &str, product: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body style=\"font-family:sans-serif\">\n{}\n<p>- {}</p>\n</body>\n</html>\n",
        escape_html(title),
        body,
        escape_html(product)
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_contains_code() {
        let email = EmailTemplate::Verification {
            name: "Jane".to_string(),
            code: "012345".to_string(),
            ttl_minutes: 15,
        }
        .render("IPTV Gateway");

        assert_eq!(email.subject, "Verify your IPTV Gateway account");
        assert!(email.html.contains("012345"));
        assert!(email.text.contains("012345"));
        assert!(email.text.contains("15 minutes"));
    }

    #[test]
    fn test_reset_subject() {
        let email = EmailTemplate::PasswordReset {
            name: "Jane".to_string(),
            code: "999999".to_string(),
            ttl_minutes: 10,
        }
        .render("IPTV");

        assert_eq!(email.subject, "Reset your IPTV password");
        assert!(email.text.contains("999999"));
    }

    #[test]
    fn test_user_input_is_escaped_in_html() {
        let email = EmailTemplate::PasswordChanged {
            name: "<script>alert('x')</script>".to_string(),
        }
        .render("IPTV");

        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
        assert!(email.text.contains("<script>"));
    }

    #[test]
    fn test_kind_labels() {
        let changed = EmailTemplate::PasswordChanged {
            name: String::new(),
        };
        assert_eq!(changed.kind(), "password_changed");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a&b<c>"d'"#), "a&amp;b&lt;c&gt;&quot;d&#39;");
    }
}
