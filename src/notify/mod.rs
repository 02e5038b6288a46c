//! # Notification Dispatcher
//!
//! Mails the invoice (or quote) of a recorded action to its client, off the request path.
//!
//! ```text
//! Allocator ──enqueue──> [ mpsc queue ] ──> worker 1..n ──> Mailer
//!                              ^                  │ failure, retries left
//!                              └── sleep(backoff) ┘
//!                                                 │ failure, retries exhausted
//!                                                 └──> Delivery failure log
//! ```
//!
//! A failed send is not retried in place: the worker schedules the job to re-enter the queue
//! after the [`RetryPolicy`] delay and moves on. Retries hold only a weak handle on the queue, so
//! dropping every [`Notifier`] stops the workers even while retries are pending; those retries
//! are dropped with a warning.

pub mod error;
pub mod invoice;
pub mod mailer;
pub mod pdf;
pub mod retry;
pub mod smtp;

pub use error::*;
pub use invoice::render_invoice;
pub use mailer::{Attachment, ConsoleMailer, Email, Mailer, MemoryMailer};
pub use retry::RetryPolicy;
pub use smtp::SmtpMailer;

use crate::clients::{FailureLogClient, LedgerClient, UserClient};
use crate::model::{ActionId, Allocation, DeliveryFailureCreate, UserId};
use actor_framework::ActorClient;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument};

/// What the allocator hands over once an action is committed.
#[derive(Debug, Clone)]
pub struct Notification {
    pub client: UserId,
    pub action: ActionId,
    pub allocation: Allocation,
}

#[derive(Debug)]
struct Job {
    notification: Notification,
    /// Rendered on the first attempt and reused by retries.
    email: Option<Email>,
    attempt: u32,
}

/// Sending side of the queue. Enqueueing never waits for delivery.
#[derive(Clone)]
pub struct Notifier {
    sender: mpsc::Sender<Job>,
}

impl Notifier {
    pub async fn enqueue(&self, notification: Notification) {
        let action = notification.action;
        let job = Job {
            notification,
            email: None,
            attempt: 0,
        };
        match self.sender.send(job).await {
            Ok(()) => debug!(action_id = %action, "Notification queued"),
            Err(_) => error!(action_id = %action, "Dispatcher stopped; notification dropped"),
        }
    }
}

/// Settings for [`start`].
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub workers: usize,
    pub buffer: usize,
    pub policy: RetryPolicy,
    pub currency: String,
    pub from: String,
}

/// The stores a worker reads from and writes to.
#[derive(Clone)]
pub struct DispatcherStores {
    pub users: UserClient,
    pub ledger: LedgerClient,
    pub failures: FailureLogClient,
}

/// Spawns the worker pool and returns the queue handle plus the worker tasks.
pub fn start(
    config: DispatcherConfig,
    mailer: Arc<dyn Mailer>,
    stores: DispatcherStores,
) -> (Notifier, Vec<JoinHandle<()>>) {
    let (sender, receiver) = mpsc::channel(config.buffer.max(1));
    let jobs = Arc::new(Mutex::new(receiver));
    let config = Arc::new(config);

    let handles = (0..config.workers.max(1))
        .map(|id| {
            let worker = Worker {
                jobs: jobs.clone(),
                requeue: sender.downgrade(),
                mailer: mailer.clone(),
                stores: stores.clone(),
                config: config.clone(),
            };
            let span = tracing::info_span!("notify_worker", worker = id);
            tokio::spawn(worker.run().instrument(span))
        })
        .collect();

    info!(workers = config.workers.max(1), "Notification dispatcher started");
    (Notifier { sender }, handles)
}

struct Worker {
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    requeue: mpsc::WeakSender<Job>,
    mailer: Arc<dyn Mailer>,
    stores: DispatcherStores,
    config: Arc<DispatcherConfig>,
}

impl Worker {
    async fn run(self) {
        loop {
            let next = self.jobs.lock().await.recv().await;
            let Some(job) = next else {
                break;
            };
            self.process(job).await;
        }
        debug!("Worker stopped");
    }

    async fn render(&self, notification: &Notification) -> Result<Email, NotifyError> {
        let action = self
            .stores
            .ledger
            .get(notification.action)
            .await
            .map_err(|e| NotifyError::Store(e.to_string()))?
            .ok_or(NotifyError::MissingAction(notification.action))?;
        let client = self
            .stores
            .users
            .get(notification.client)
            .await
            .map_err(|e| NotifyError::Store(e.to_string()))?
            .ok_or(NotifyError::MissingClient(notification.client))?;
        render_invoice(
            &action,
            &client,
            &notification.allocation,
            &self.config.currency,
            &self.config.from,
        )
    }

    async fn process(&self, mut job: Job) {
        let action_id = job.notification.action;
        let email = match job.email.take() {
            Some(email) => email,
            None => match self.render(&job.notification).await {
                Ok(email) => email,
                Err(e) => {
                    error!(action_id = %action_id, error = %e, "Cannot build notification");
                    self.record_failure(&job.notification, &e, 0).await;
                    return;
                }
            },
        };

        match self.mailer.send(&email).await {
            Ok(()) => info!(action_id = %action_id, to = %email.to, "Notification delivered"),
            Err(e) if job.attempt < self.config.policy.max_retries => {
                let delay = self.config.policy.delay_for_attempt(job.attempt);
                warn!(
                    action_id = %action_id,
                    attempt = job.attempt + 1,
                    retry_in_secs = delay.as_secs(),
                    error = %e,
                    "Delivery failed, retrying"
                );
                let retry = Job {
                    notification: job.notification,
                    email: Some(email),
                    attempt: job.attempt + 1,
                };
                let requeue = self.requeue.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let Some(sender) = requeue.upgrade() else {
                        warn!(action_id = %action_id, "Dispatcher stopped; retry dropped");
                        return;
                    };
                    if sender.send(retry).await.is_err() {
                        warn!(action_id = %action_id, "Dispatcher stopped; retry dropped");
                    }
                });
            }
            Err(e) => {
                error!(
                    action_id = %action_id,
                    attempts = job.attempt + 1,
                    error = %e,
                    "Delivery abandoned"
                );
                self.record_failure(&job.notification, &e, job.attempt + 1)
                    .await;
            }
        }
    }

    async fn record_failure(&self, notification: &Notification, error: &NotifyError, attempts: u32) {
        let failure = DeliveryFailureCreate {
            client: notification.client,
            action: notification.action,
            error: error.to_string(),
            attempts,
            payload: serde_json::to_string(&notification.allocation).unwrap_or_default(),
        };
        if let Err(e) = self.stores.failures.record(failure).await {
            error!(action_id = %notification.action, error = %e, "Cannot record delivery failure");
        }
    }
}
