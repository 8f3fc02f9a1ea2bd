use std::time::Duration;

use crate::error::VerifyError;
use crate::smtp::{self, ProviderBehavior, ProviderOverride, SmtpCheckConfig, SmtpVerdict};

/// Long-lived verification handle.
///
/// Configuration is held as an immutable snapshot: every administrative
/// setter installs a fresh [`SmtpCheckConfig`] value and every call to
/// [`check_smtp`](Self::check_smtp) captures the snapshot at call start,
/// so in-flight verifications never observe a half-applied change. Calls
/// take `&self` and share no mutable state, so a `Verifier` can be used
/// from many threads at once.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: SmtpCheckConfig,
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SmtpCheckConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SmtpCheckConfig {
        &self.config
    }

    pub fn enable_smtp_check(&mut self) -> &mut Self {
        self.update(|config| config.enabled = true)
    }

    pub fn disable_smtp_check(&mut self) -> &mut Self {
        self.update(|config| config.enabled = false)
    }

    /// Client identity used in the `EHLO` command.
    pub fn helo_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.update(|config| config.helo_name = name.into())
    }

    /// Envelope sender used in the `MAIL FROM` command.
    pub fn from_address(&mut self, address: impl Into<String>) -> &mut Self {
        self.update(|config| config.from_address = address.into())
    }

    /// Connect and per-command deadline for each host attempt.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.update(|config| config.timeout = timeout)
    }

    /// SOCKS5 forward proxy for all probe connections.
    pub fn proxy_uri(&mut self, uri: impl Into<String>) -> &mut Self {
        self.update(|config| config.proxy_uri = Some(uri.into()))
    }

    /// Upper bound on mail exchangers tried per verification.
    pub fn max_hosts(&mut self, max: usize) -> &mut Self {
        self.update(|config| config.max_hosts = Some(max))
    }

    /// Register a provider-specific behavior override, e.g. a consumer
    /// provider that accepts every recipient over plain SMTP.
    pub fn provider_override(
        &mut self,
        pattern: impl Into<String>,
        behavior: ProviderBehavior,
    ) -> &mut Self {
        let entry = ProviderOverride::new(pattern, behavior);
        self.update(|config| config.provider_overrides.push(entry))
    }

    /// Probe `local_part@domain` for deliverability. See
    /// [`smtp::check_smtp`] for the classification contract; `Ok(None)`
    /// means SMTP checking is disabled and nothing was probed.
    ///
    /// The per-attempt timeout applies to each exchanger in turn, so a
    /// verification against N candidate hosts can take up to N × timeout.
    /// Callers needing a hard global deadline should impose an outer
    /// cancellation of their own.
    pub fn check_smtp(
        &self,
        domain: &str,
        local_part: &str,
    ) -> Result<Option<SmtpVerdict>, VerifyError> {
        let snapshot = self.config.clone();
        smtp::check_smtp(domain, local_part, &snapshot).map_err(VerifyError::from)
    }

    fn update(&mut self, apply: impl FnOnce(&mut SmtpCheckConfig)) -> &mut Self {
        let mut next = self.config.clone();
        apply(&mut next);
        self.config = next;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_install_fresh_snapshots() {
        let mut verifier = Verifier::new();
        let before = verifier.config().clone();

        verifier
            .helo_name("probe.example.org")
            .from_address("verify@example.org")
            .timeout(Duration::from_secs(3))
            .max_hosts(2);

        assert_eq!(before, SmtpCheckConfig::default());
        let after = verifier.config();
        assert_eq!(after.helo_name, "probe.example.org");
        assert_eq!(after.from_address, "verify@example.org");
        assert_eq!(after.timeout, Duration::from_secs(3));
        assert_eq!(after.max_hosts, Some(2));
    }

    #[test]
    fn disabled_check_reports_not_performed() {
        let mut verifier = Verifier::new();
        verifier.disable_smtp_check();

        let result = verifier
            .check_smtp("example.com", "someone")
            .expect("disabled check never errors");
        assert!(result.is_none());
    }

    #[test]
    fn provider_override_lands_in_snapshot() {
        let mut verifier = Verifier::new();
        verifier.provider_override("bulkmail.example", ProviderBehavior::AssumeCatchAll);

        assert!(matches!(
            verifier.config().behavior_for("bulkmail.example"),
            Some(ProviderBehavior::AssumeCatchAll)
        ));
        assert!(matches!(
            verifier.config().behavior_for("mx.bulkmail.example"),
            Some(ProviderBehavior::AssumeCatchAll)
        ));
        assert!(verifier.config().behavior_for("otherbulkmail.example").is_none());
    }
}
