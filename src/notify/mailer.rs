//! Mail transports.

use super::NotifyError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    /// MIME type, e.g. `application/pdf`.
    pub content_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

/// A mail transport. Errors are treated as transient and retried by the dispatcher.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), NotifyError>;
}

/// Logs every message instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            attachments = email.attachments.len(),
            "Email (console)"
        );
        println!("{}", email.body);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Outbox {
    sent: Vec<Email>,
    attempts: Vec<Instant>,
    failures_left: u32,
}

/// Keeps messages in memory. Can be told to fail its first `n` sends.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Outbox>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the first `n` sends, then delivers.
    pub fn failing(n: u32) -> Self {
        let mailer = Self::default();
        mailer.outbox().failures_left = n;
        mailer
    }

    fn outbox(&self) -> MutexGuard<'_, Outbox> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sent(&self) -> Vec<Email> {
        self.outbox().sent.clone()
    }

    /// When each send was attempted, successful or not.
    pub fn attempts(&self) -> Vec<Instant> {
        self.outbox().attempts.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        let mut outbox = self.outbox();
        outbox.attempts.push(Instant::now());
        if outbox.failures_left > 0 {
            outbox.failures_left -= 1;
            return Err(NotifyError::Delivery("mail server unavailable".into()));
        }
        outbox.sent.push(email.clone());
        Ok(())
    }
}
