//! DNS mail-exchanger resolution.
//!
//! The public entry point is [`resolve_mx_hosts`], which performs a
//! synchronous lookup using the system resolver and returns the ordered
//! list of [`MxHost`] candidates for a domain, falling back to the domain's
//! own address record when it carries no MX records.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::resolve_mx_hosts;
pub use types::MxHost;

pub(crate) use resolver::{MxLookup, resolve_with};

#[cfg(test)]
mod tests;
