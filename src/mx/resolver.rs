use tracing::debug;
use trust_dns_resolver::Resolver;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;

use super::{Error, MxHost};

/// Resolve the ordered mail-exchange hosts for `domain` using the system
/// resolver.
///
/// The domain is normalized via IDNA before querying DNS. The returned list
/// is sorted by ascending priority (lexicographic tie-break on host name)
/// and is never empty: a domain with no MX records falls back to its own
/// A/AAAA record as a synthetic priority-0 exchange, and a domain with
/// neither fails with [`Error::NoMailExchanger`].
pub fn resolve_mx_hosts(domain: &str) -> Result<Vec<MxHost>, Error> {
    let resolver = Resolver::from_system_conf().map_err(Error::resolver_init)?;
    resolve_with(&resolver, domain)
}

pub(crate) fn resolve_with<R>(lookup: &R, domain: &str) -> Result<Vec<MxHost>, Error>
where
    R: MxLookup,
{
    let ascii = normalize_domain(domain)?;

    let mut hosts = lookup.mx_records(&ascii)?;
    hosts.sort();
    hosts.dedup();

    if hosts.is_empty() {
        // Implicit MX: a domain without MX records still receives mail on
        // its own address record (RFC 5321 §5.1).
        if !lookup.has_address(&ascii)? {
            return Err(Error::NoMailExchanger);
        }
        hosts.push(MxHost::new(0, ascii.clone()));
    }

    debug!(domain = %ascii, hosts = hosts.len(), "resolved mail exchangers");
    Ok(hosts)
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(Error::idna)
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

/// DNS access used by [`resolve_with`], kept as a trait so tests can stub
/// the lookups.
pub(crate) trait MxLookup {
    /// MX records for `domain`. `Ok(vec![])` means the domain exists but
    /// carries no MX records; an unresolvable domain is an error.
    fn mx_records(&self, domain: &str) -> Result<Vec<MxHost>, Error>;

    /// Whether `domain` has any A/AAAA record usable as an implicit MX.
    fn has_address(&self, domain: &str) -> Result<bool, Error>;
}

impl MxLookup for Resolver {
    fn mx_records(&self, domain: &str) -> Result<Vec<MxHost>, Error> {
        match self.mx_lookup(domain) {
            Ok(lookup) => {
                let mut hosts = Vec::new();
                for mx in lookup.iter() {
                    let exchange = normalize_exchange(mx.exchange().to_utf8());
                    hosts.push(MxHost::new(mx.preference(), exchange));
                }
                Ok(hosts)
            }
            Err(err) => match classify_missing(&err) {
                Some(MissingKind::NxDomain) => Err(Error::DomainNotFound),
                Some(MissingKind::NoRecords) => Ok(Vec::new()),
                None => Err(Error::lookup(err)),
            },
        }
    }

    fn has_address(&self, domain: &str) -> Result<bool, Error> {
        match self.lookup_ip(domain) {
            Ok(lookup) => Ok(lookup.iter().next().is_some()),
            Err(err) => match classify_missing(&err) {
                Some(MissingKind::NxDomain) => Err(Error::DomainNotFound),
                Some(MissingKind::NoRecords) => Ok(false),
                None => Err(Error::lookup(err)),
            },
        }
    }
}

enum MissingKind {
    NxDomain,
    NoRecords,
}

fn classify_missing(err: &ResolveError) -> Option<MissingKind> {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::NXDomain {
                Some(MissingKind::NxDomain)
            } else {
                Some(MissingKind::NoRecords)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
impl MxLookup for crate::mx::tests::StubResolver {
    fn mx_records(&self, domain: &str) -> Result<Vec<MxHost>, Error> {
        (self.on_mx)(domain)
    }

    fn has_address(&self, domain: &str) -> Result<bool, Error> {
        (self.on_address)(domain)
    }
}
