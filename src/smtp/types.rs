/// One parsed SMTP reply, with multi-line continuations collapsed.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub text: String,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

/// Result of a single `RCPT TO` exchange.
///
/// `accepted` is only set for the explicit acceptance codes (250/251); a
/// transient or unexpected code leaves it false without implying rejection.
/// When the exchange dies at the transport level no reply fields are
/// meaningful and `transport_error` carries the failure.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub accepted: bool,
    pub code: u16,
    pub text: String,
    pub transport_error: Option<String>,
}

impl ProbeOutcome {
    pub(crate) fn replied(reply: SmtpReply) -> Self {
        Self {
            accepted: reply.code == 250 || reply.code == 251,
            code: reply.code,
            text: reply.text,
            transport_error: None,
        }
    }

    pub(crate) fn failed(message: String) -> Self {
        Self {
            accepted: false,
            code: 0,
            text: String::new(),
            transport_error: Some(message),
        }
    }

    pub fn is_transient(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_rejected(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

/// Verdict produced by probing a domain's mail exchangers.
///
/// The booleans are independent because providers exhibit odd combinations;
/// an impossible pairing is logged as an anomaly rather than rejected.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmtpVerdict {
    /// An exchanger accepted a TCP connection and produced an SMTP greeting.
    pub host_exists: bool,
    /// A transient rejection matched a mailbox-full reply text.
    pub full_inbox: bool,
    /// The domain accepts mail for any local-part, so acceptance of the
    /// target address says nothing about that specific mailbox.
    pub catch_all: bool,
    /// The target address was accepted while a randomized one was not.
    pub deliverable: bool,
    /// Every exchanger was unreachable or refused the connection, which is
    /// read as the provider blocking SMTP verification, not as the address
    /// being invalid.
    pub disabled: bool,
}
