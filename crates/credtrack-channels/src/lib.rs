//! # CredTrack Channels
//! Delivery channel implementations behind the `Notifier` seam:
//! SMTP email, generic HTTP webhook, and a log-only channel for development.

pub mod email;
pub mod log;
pub mod webhook;

pub use email::EmailNotifier;
pub use log::LogNotifier;
pub use webhook::WebhookNotifier;
