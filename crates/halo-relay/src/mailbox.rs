use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use halo_types::models::{Notification, NotificationKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailboxError {
    #[error("recipient email is required")]
    MissingRecipient,

    #[error("sender email is required")]
    MissingSender,

    #[error("unknown notification type '{0}'")]
    UnknownKind(String),
}

/// Result of a successful send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Queued,
    /// The same (sender, type) pair is already pending for the recipient.
    Duplicate,
}

/// Per-recipient notification queues with duplicate suppression.
///
/// Each recipient has its own lock, so traffic for one recipient never
/// waits on another. The outer map lock is only held long enough to find
/// or create the recipient's queue.
#[derive(Clone, Default)]
pub struct Mailbox {
    inner: Arc<MailboxInner>,
}

#[derive(Default)]
struct MailboxInner {
    /// recipient email -> queue
    queues: RwLock<HashMap<String, Arc<Mutex<Queue>>>>,
}

/// `pending` and `present` always hold the same (sender, type) pairs.
#[derive(Default)]
struct Queue {
    pending: VecDeque<Notification>,
    present: HashSet<(String, NotificationKind)>,
}

impl Queue {
    fn push(&mut self, notification: Notification) -> SendOutcome {
        let key = (notification.sender_email.clone(), notification.kind);
        if !self.present.insert(key) {
            return SendOutcome::Duplicate;
        }
        self.pending.push_back(notification);
        SendOutcome::Queued
    }

    fn pop(&mut self) -> Option<Notification> {
        let head = self.pending.pop_front()?;
        self.present.remove(&(head.sender_email.clone(), head.kind));
        Some(head)
    }
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notification for `recipient`. No authentication is involved:
    /// any caller may address any mailbox by email.
    pub async fn send(
        &self,
        recipient: &str,
        sender: &str,
        kind: &str,
    ) -> Result<SendOutcome, MailboxError> {
        if recipient.is_empty() {
            return Err(MailboxError::MissingRecipient);
        }
        if sender.is_empty() {
            return Err(MailboxError::MissingSender);
        }
        let kind: NotificationKind = kind
            .parse()
            .map_err(|_| MailboxError::UnknownKind(kind.to_string()))?;

        let queue = self.queue_for(recipient).await;
        let outcome = queue.lock().await.push(Notification {
            sender_email: sender.to_string(),
            kind,
        });

        debug!("send {} -> {} ({}): {:?}", sender, recipient, kind, outcome);
        Ok(outcome)
    }

    /// Remove and return the oldest pending notification for `recipient`.
    /// An unknown recipient has an empty mailbox.
    pub async fn poll(&self, recipient: &str) -> Option<Notification> {
        let queue = self.inner.queues.read().await.get(recipient).cloned()?;
        let head = queue.lock().await.pop();
        head
    }

    /// Number of notifications waiting for `recipient`.
    pub async fn pending(&self, recipient: &str) -> usize {
        let Some(queue) = self.inner.queues.read().await.get(recipient).cloned() else {
            return 0;
        };
        let len = queue.lock().await.pending.len();
        len
    }

    async fn queue_for(&self, recipient: &str) -> Arc<Mutex<Queue>> {
        if let Some(queue) = self.inner.queues.read().await.get(recipient) {
            return queue.clone();
        }

        self.inner
            .queues
            .write()
            .await
            .entry(recipient.to_string())
            .or_default()
            .clone()
    }
}
