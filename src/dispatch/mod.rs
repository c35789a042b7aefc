//! Dispatch engine: one delivery attempt per recipient, then aggregation.
//!
//! A single recipient is handled inline on the caller's task. Two or more
//! recipients each get their own tokio task; all of them run to completion
//! before the job's status is computed.

pub mod message;
pub mod transport;

pub use message::{AttachmentFile, OutgoingMessage};
pub use transport::{MailTransport, SmtpMailer};

use crate::core::error::{AppError, Result};
use crate::core::models::{Job, MessageTemplate, OverallStatus, RecipientOutcome};
use futures::future::join_all;
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// Callback run as each attempt completes.
pub type OutcomeHook = Arc<dyn Fn(&RecipientOutcome) + Send + Sync>;

const DELIVERED: &str = "Message delivered";

#[derive(Clone)]
pub struct DispatchEngine {
    transport: Arc<dyn MailTransport>,
    on_outcome: Option<OutcomeHook>,
}

impl DispatchEngine {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport,
            on_outcome: None,
        }
    }

    pub fn with_outcome_hook(mut self, hook: OutcomeHook) -> Self {
        self.on_outcome = Some(hook);
        self
    }

    /// Attempts delivery to every recipient, records the outcomes on `job`
    /// and returns the aggregated status.
    ///
    /// `recipients` must be non-empty and free of duplicates.
    pub async fn dispatch(
        &self,
        job: &mut Job,
        template: &MessageTemplate,
        recipients: &[String],
    ) -> Result<OverallStatus> {
        if recipients.is_empty() {
            return Err(AppError::NoRecipients(format!(
                "job {} has no recipients",
                job.id
            )));
        }

        let started = Instant::now();
        let outcomes = if recipients.len() == 1 {
            let recipient = &recipients[0];
            let outcome = match AssertUnwindSafe(attempt(self.transport.as_ref(), template, recipient))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(payload) => aborted(recipient, &panic_message(payload.as_ref())),
            };
            self.notify(&outcome);
            vec![outcome]
        } else {
            self.fan_out(&job.id, template, recipients).await
        };

        job.record_outcomes(outcomes);
        let status = job.finalize();
        tracing::info!(
            target: "dispatch",
            job_id = %job.id,
            recipients = recipients.len(),
            "Job finished in {:.2?} with status {}",
            started.elapsed(),
            status
        );
        Ok(status)
    }

    async fn fan_out(
        &self,
        job_id: &str,
        template: &MessageTemplate,
        recipients: &[String],
    ) -> Vec<RecipientOutcome> {
        tracing::info!(
            target: "dispatch",
            job_id = %job_id,
            "Sending to {} recipients concurrently",
            recipients.len()
        );

        let collected = Arc::new(Mutex::new(Vec::with_capacity(recipients.len())));
        let template = Arc::new(template.clone());

        let handles: Vec<_> = recipients
            .iter()
            .map(|recipient| {
                let transport = Arc::clone(&self.transport);
                let template = Arc::clone(&template);
                let collected = Arc::clone(&collected);
                let hook = self.on_outcome.clone();
                let recipient = recipient.clone();
                tokio::spawn(async move {
                    let outcome = attempt(transport.as_ref(), &template, &recipient).await;
                    if let Some(hook) = &hook {
                        hook(&outcome);
                    }
                    collected.lock().push(outcome);
                })
            })
            .collect();

        let joined = join_all(handles).await;

        let mut outcomes = std::mem::take(&mut *collected.lock());
        for (recipient, result) in recipients.iter().zip(joined) {
            if let Err(e) = result {
                let outcome = aborted(recipient, &e.to_string());
                self.notify(&outcome);
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    fn notify(&self, outcome: &RecipientOutcome) {
        if let Some(hook) = &self.on_outcome {
            hook(outcome);
        }
    }
}

/// Outcome for an attempt that panicked instead of returning.
fn aborted(recipient: &str, reason: &str) -> RecipientOutcome {
    tracing::error!(target: "dispatch", "Attempt for {} aborted: {}", recipient, reason);
    RecipientOutcome::error(recipient, AppError::Task(reason.to_string()).to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("attempt panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("attempt panicked: {}", msg)
    } else {
        "attempt panicked".to_string()
    }
}

/// One delivery attempt. Failures become the outcome's error detail.
async fn attempt(
    transport: &dyn MailTransport,
    template: &MessageTemplate,
    recipient: &str,
) -> RecipientOutcome {
    let started = Instant::now();
    tracing::debug!(target: "dispatch", "Attempting delivery to {}", recipient);

    let result = match OutgoingMessage::assemble(template, recipient).await {
        Ok(message) => transport.send(&message).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => {
            tracing::debug!(
                target: "dispatch",
                "Delivered to {} in {:.2?}",
                recipient,
                started.elapsed()
            );
            let message = if response.trim().is_empty() {
                DELIVERED.to_string()
            } else {
                format!("{}: {}", DELIVERED, response.trim())
            };
            RecipientOutcome::success(recipient, message)
        }
        Err(e) => {
            tracing::warn!(
                target: "dispatch",
                "Delivery to {} failed after {:.2?}: {}",
                recipient,
                started.elapsed(),
                e
            );
            RecipientOutcome::error(recipient, e.to_string())
        }
    }
}
