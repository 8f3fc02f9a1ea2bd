#![forbid(unsafe_code)]
//! mailreach — checks whether a mailbox is likely deliverable without
//! sending mail.
//!
//! The engine resolves a domain's mail exchangers, conducts a partial SMTP
//! dialog (greeting, `EHLO`, `MAIL FROM`, `RCPT TO` probes), and classifies
//! the responses into an [`SmtpVerdict`]: deliverable, catch-all, full
//! inbox, or probe-blocking. The dialog is always aborted before `DATA`.
//!
//! ```no_run
//! use mailreach::Verifier;
//!
//! let mut verifier = Verifier::new();
//! verifier.helo_name("probe.example.org");
//! match verifier.check_smtp("example.com", "someone") {
//!     Ok(Some(verdict)) if verdict.deliverable => println!("mailbox accepts mail"),
//!     Ok(Some(verdict)) if verdict.catch_all => println!("domain accepts anything"),
//!     Ok(Some(_)) => println!("not deliverable or inconclusive"),
//!     Ok(None) => println!("SMTP checking disabled"),
//!     Err(err) => eprintln!("could not assess domain: {err}"),
//! }
//! ```

pub mod mx;
pub mod smtp;

mod error;
mod verifier;

pub use error::VerifyError;
pub use mx::{Error as MxError, MxHost, resolve_mx_hosts};
pub use smtp::{
    ProbeOutcome, ProviderBehavior, ProviderOverride, SmtpCheckConfig, SmtpError, SmtpReply,
    SmtpVerdict, check_smtp,
};
pub use verifier::Verifier;
