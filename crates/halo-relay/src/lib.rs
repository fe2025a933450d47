//! In-process shared state: notification mailboxes and the monitor slot.
//! Nothing here is persisted; it lives for the lifetime of the server.

pub mod mailbox;
pub mod monitor;

pub use mailbox::{Mailbox, MailboxError, SendOutcome};
pub use monitor::MonitorSlot;
