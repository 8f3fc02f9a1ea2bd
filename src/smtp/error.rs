use std::fmt;

use thiserror::Error;

use crate::mx;

/// Errors raised while probing a domain's mail exchangers.
///
/// `ConnectTimeout` and `ConnectionRefused` are recoverable at the host
/// level: the orchestrator falls through to the next exchanger. Everything
/// else aborts the verification and is surfaced to the caller.
#[derive(Debug, Error)]
pub enum SmtpError {
    #[error(transparent)]
    Mx(#[from] mx::Error),
    #[error("connection to {host} timed out")]
    ConnectTimeout {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection to {host} refused")]
    ConnectionRefused {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("proxy failure: {message}")]
    Proxy { message: String },
    #[error("protocol anomaly at {stage}: {message}")]
    Protocol {
        stage: SessionStage,
        message: String,
    },
    #[error("all mail exchangers tried without a conclusive probe: {last}")]
    Exhausted { last: String },
}

impl SmtpError {
    /// Whether the orchestrator may recover by trying the next exchanger.
    pub(crate) fn is_host_fallback(&self) -> bool {
        matches!(
            self,
            Self::ConnectTimeout { .. } | Self::ConnectionRefused { .. }
        )
    }
}

/// Mandatory stage of the SMTP preamble, named in protocol anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    Greeting,
    Ehlo,
    MailFrom,
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greeting => f.write_str("greeting"),
            Self::Ehlo => f.write_str("EHLO"),
            Self::MailFrom => f.write_str("MAIL FROM"),
        }
    }
}
