//! Staged SMTP probing and response classification.
//!
//! The public entry point is [`check_smtp`], which dials a domain's mail
//! exchangers in priority order, runs the `RCPT TO` probe pair over a
//! partial SMTP dialog, and classifies the observed behavior into an
//! [`SmtpVerdict`]. The dialog is always aborted before `DATA`, so no mail
//! is ever sent.

mod dialer;
mod error;
mod options;
mod probe;
mod session;
mod types;
mod util;

pub use error::{SessionStage, SmtpError};
pub use options::{ProviderBehavior, ProviderOverride, SmtpCheckConfig};
pub use probe::check_smtp;
pub use types::{ProbeOutcome, SmtpReply, SmtpVerdict};

#[cfg(test)]
mod tests;
