//! Asynchronous email notifications: a durable job queue, a dispatcher that
//! enqueues typed jobs and a worker that delivers them with retries.

pub mod dispatcher;
pub mod handler;
pub mod queue;
pub mod templates;
pub mod transport;
pub mod worker;

#[cfg(test)]
mod tests;

pub use dispatcher::NotificationDispatcher;
pub use handler::{decode_job, DispatchError, MailJobHandler};
pub use queue::{InMemoryJobQueue, JobQueue};
pub use templates::TemplateSettings;
pub use transport::{EmailMessage, MailError, MailTransport};
pub use worker::{JobOutcome, NotificationWorker, WorkerSettings};
