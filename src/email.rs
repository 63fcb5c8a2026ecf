//! E-mail alerts over SMTP
//!
//! Messages are built with lettre and sent over implicit TLS using the
//! server and account in [`SmtpConfig`]. Building and sending are separate
//! so messages can be inspected without a server.

use std::fs;
use std::path::{Path, PathBuf};

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};

use crate::{Result, SsError};

/// Port for SMTP over implicit TLS
pub const DEFAULT_SMTP_PORT: u16 = 465;

fn default_port() -> u16 {
    DEFAULT_SMTP_PORT
}

/// SMTP account used to send alerts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server host name
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Sender address, also used as the login name
    pub email: String,
    pub password: String,
}

impl SmtpConfig {
    pub fn new(server: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            port: DEFAULT_SMTP_PORT,
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Validate the SMTP settings
    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            return Err(SsError::ConfigError("SMTP server must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(SsError::ConfigError("SMTP port must be greater than 0".to_string()));
        }
        parse_mailbox("sender", &self.email)
            .map_err(|e| SsError::ConfigError(e.to_string()))?;
        Ok(())
    }
}

/// One outgoing message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Email {
    /// Recipients, comma separated
    pub to: String,
    pub body: String,
    /// Carbon-copy recipients, comma separated
    pub cc: Option<String>,
    pub subject: Option<String>,
    pub reply_to: Option<String>,
    /// Files attached as `application/octet-stream`
    pub attachments: Vec<PathBuf>,
    /// Send the body as `text/html` instead of `text/plain`
    pub html: bool,
}

impl Email {
    pub fn new(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }

    pub fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }
}

fn parse_mailbox(role: &str, address: &str) -> Result<Mailbox> {
    address.trim().parse::<Mailbox>().map_err(|e| {
        SsError::InvalidInput(format!("Invalid {} address '{}': {}", role, address.trim(), e))
    })
}

fn parse_mailboxes(role: &str, addresses: &str) -> Result<Vec<Mailbox>> {
    let mailboxes = addresses
        .split(',')
        .filter(|a| !a.trim().is_empty())
        .map(|a| parse_mailbox(role, a))
        .collect::<Result<Vec<_>>>()?;
    if mailboxes.is_empty() {
        return Err(SsError::InvalidInput(format!("No {} address given", role)));
    }
    Ok(mailboxes)
}

fn attachment(path: &Path) -> Result<SinglePart> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            SsError::InvalidInput(format!("Attachment {} has no file name", path.display()))
        })?;
    let content = fs::read(path).map_err(|e| {
        SsError::InvalidInput(format!("Cannot read attachment {}: {}", path.display(), e))
    })?;
    let content_type = ContentType::parse("application/octet-stream")
        .map_err(|e| SsError::EmailError(format!("Bad attachment content type: {}", e)))?;
    Ok(Attachment::new(filename).body(content, content_type))
}

/// Build the MIME message for `email`, sent from the SMTP account
pub fn build_message(smtp: &SmtpConfig, email: &Email) -> Result<Message> {
    let mut builder = Message::builder().from(parse_mailbox("sender", &smtp.email)?);
    for to in parse_mailboxes("recipient", &email.to)? {
        builder = builder.to(to);
    }
    if let Some(cc) = &email.cc {
        for mailbox in parse_mailboxes("cc", cc)? {
            builder = builder.cc(mailbox);
        }
    }
    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(parse_mailbox("reply-to", reply_to)?);
    }
    if let Some(subject) = &email.subject {
        builder = builder.subject(subject.as_str());
    }

    let content_type = if email.html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };
    let mut parts = MultiPart::mixed().singlepart(
        SinglePart::builder()
            .header(content_type)
            .body(email.body.clone()),
    );
    for path in &email.attachments {
        parts = parts.singlepart(attachment(path)?);
    }

    builder
        .multipart(parts)
        .map_err(|e| SsError::EmailError(format!("Failed to build message: {}", e)))
}

/// Build `email` and send it through the configured SMTP server
pub fn send_email(smtp: &SmtpConfig, email: &Email) -> Result<()> {
    smtp.validate()?;
    let message = build_message(smtp, email)?;

    let transport = SmtpTransport::relay(&smtp.server)
        .map_err(|e| SsError::EmailError(format!("Cannot connect to {}: {}", smtp.server, e)))?
        .port(smtp.port)
        .credentials(Credentials::new(smtp.email.clone(), smtp.password.clone()))
        .build();

    transport
        .send(&message)
        .map_err(|e| SsError::EmailError(format!("Sending via {} failed: {}", smtp.server, e)))?;
    log::info!("sent e-mail to {} via {}:{}", email.to, smtp.server, smtp.port);
    Ok(())
}
