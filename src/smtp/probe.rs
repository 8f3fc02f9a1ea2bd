use tracing::{debug, warn};
use trust_dns_resolver::Resolver;

use crate::mx::{self, MxLookup};

use super::dialer::{Dial, NetDialer};
use super::error::SmtpError;
use super::options::{ProviderBehavior, SmtpCheckConfig};
use super::session::SmtpSession;
use super::types::SmtpVerdict;
use super::util::{looks_like_full_inbox, random_local_part};

/// Probe the mail exchangers of `domain` and classify whether
/// `local_part@domain` is likely deliverable, without sending mail.
///
/// An empty `local_part` restricts the check to host reachability and
/// catch-all behavior. Returns `Ok(None)` when SMTP checking is disabled by
/// configuration, so callers can tell "not checked" from "checked and
/// inconclusive". DNS failures and protocol anomalies surface as errors;
/// a verdict is only produced once classification is conclusive.
pub fn check_smtp(
    domain: &str,
    local_part: &str,
    config: &SmtpCheckConfig,
) -> Result<Option<SmtpVerdict>, SmtpError> {
    if !config.enabled {
        return Ok(None);
    }
    let resolver = Resolver::from_system_conf().map_err(mx::Error::resolver_init)?;
    let dialer = NetDialer::new(config.timeout, config.proxy_uri.as_deref())?;
    check_with(domain, local_part, config, &resolver, &dialer)
}

pub(crate) fn check_with<R, D>(
    domain: &str,
    local_part: &str,
    config: &SmtpCheckConfig,
    resolver: &R,
    dialer: &D,
) -> Result<Option<SmtpVerdict>, SmtpError>
where
    R: MxLookup,
    D: Dial,
{
    if !config.enabled {
        return Ok(None);
    }

    let hosts = mx::resolve_with(resolver, domain)?;
    let limit = config.max_hosts.unwrap_or(hosts.len()).max(1);
    let assume_catch_all = matches!(
        config.behavior_for(domain),
        Some(ProviderBehavior::AssumeCatchAll)
    );

    let mut connected = false;
    let mut last_probe_failure = None;

    for candidate in hosts.iter().take(limit) {
        let stream = match dialer.dial(&candidate.host) {
            Ok(stream) => stream,
            Err(err) if err.is_host_fallback() => {
                debug!(host = %candidate.host, %err, "exchanger unavailable, trying next");
                continue;
            }
            Err(err) => return Err(err),
        };

        // A rejected preamble step is a protocol anomaly, not a host
        // availability issue, and aborts the whole verification.
        let session = SmtpSession::start(
            stream,
            &candidate.host,
            &config.helo_name,
            &config.from_address,
        )?;
        connected = true;

        match classify_host(session, domain, local_part, assume_catch_all) {
            HostOutcome::Verdict(verdict) => {
                debug!(%domain, host = %candidate.host, ?verdict, "classification complete");
                return Ok(Some(verdict));
            }
            HostOutcome::ProbeFailed(message) => {
                debug!(host = %candidate.host, %message, "probe died mid-session, trying next");
                last_probe_failure = Some(message);
            }
        }
    }

    if connected {
        Err(SmtpError::Exhausted {
            last: last_probe_failure
                .unwrap_or_else(|| "no exchanger produced a conclusive probe".to_string()),
        })
    } else {
        // Every exchanger unreachable or refusing port 25: read as the
        // provider blocking SMTP verification, not as a missing mailbox.
        Ok(Some(SmtpVerdict {
            disabled: true,
            ..SmtpVerdict::default()
        }))
    }
}

enum HostOutcome {
    Verdict(SmtpVerdict),
    ProbeFailed(String),
}

/// Run the probe pair against one established session.
///
/// The randomized probe goes first: it is both the catch-all test and the
/// baseline for the server's rejection behavior. The target probe only runs
/// for a non-empty local-part on a domain that is not catch-all, since a
/// catch-all acceptance cannot be attributed to the specific address.
fn classify_host(
    mut session: SmtpSession,
    domain: &str,
    local_part: &str,
    assume_catch_all: bool,
) -> HostOutcome {
    let mut verdict = SmtpVerdict {
        host_exists: true,
        ..SmtpVerdict::default()
    };

    if assume_catch_all {
        verdict.catch_all = true;
        return finish(session, verdict);
    }

    let random = session.probe(&format!("{}@{}", random_local_part(), domain));
    if let Some(message) = random.transport_error {
        drop(session);
        return HostOutcome::ProbeFailed(message);
    }
    if random.accepted {
        verdict.catch_all = true;
    }

    if verdict.catch_all || local_part.is_empty() {
        return finish(session, verdict);
    }

    let target = session.probe(&format!("{local_part}@{domain}"));
    if let Some(message) = target.transport_error {
        drop(session);
        return HostOutcome::ProbeFailed(message);
    }
    if target.accepted {
        verdict.deliverable = true;
    } else if target.is_transient() && looks_like_full_inbox(&target.text) {
        // Only the target probe can speak for the target mailbox; a
        // storage reply for the nonexistent random address is ignored.
        verdict.full_inbox = true;
    }

    finish(session, verdict)
}

fn finish(session: SmtpSession, verdict: SmtpVerdict) -> HostOutcome {
    session.close();
    if verdict.catch_all && (verdict.full_inbox || verdict.deliverable) {
        warn!(?verdict, "contradictory verdict combination observed");
    }
    HostOutcome::Verdict(verdict)
}
