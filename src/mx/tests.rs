use super::{Error, MxHost, resolver};

type MxResult = Result<Vec<MxHost>, Error>;
type MxFn = dyn Fn(&str) -> MxResult;
type AddressResult = Result<bool, Error>;
type AddressFn = dyn Fn(&str) -> AddressResult;

pub(crate) struct StubResolver {
    pub on_mx: Box<MxFn>,
    pub on_address: Box<AddressFn>,
}

impl StubResolver {
    fn new<M, A>(on_mx: M, on_address: A) -> Self
    where
        M: Fn(&str) -> MxResult + 'static,
        A: Fn(&str) -> AddressResult + 'static,
    {
        Self {
            on_mx: Box::new(on_mx),
            on_address: Box::new(on_address),
        }
    }

    fn with_records(records: Vec<MxHost>) -> Self {
        Self::new(
            move |_| Ok(records.clone()),
            |_| panic!("address fallback should not be consulted"),
        )
    }
}

#[test]
fn normalize_domain_rejects_empty() {
    let err = resolver::normalize_domain("  ").expect_err("empty domain should fail");
    assert!(matches!(err, Error::EmptyDomain));
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    let out = resolver::normalize_exchange("Mail.EXAMPLE.com.".to_string());
    assert_eq!(out, "mail.example.com");
}

#[test]
fn resolve_sorts_by_priority() {
    let stub = StubResolver::with_records(vec![
        MxHost::new(20, "backup.example.com"),
        MxHost::new(5, "primary.example.com"),
        MxHost::new(10, "secondary.example.com"),
    ]);

    let hosts = resolver::resolve_with(&stub, "example.com").expect("lookup succeeds");
    assert_eq!(hosts.len(), 3);
    assert_eq!(hosts[0].host, "primary.example.com");
    assert_eq!(hosts[1].host, "secondary.example.com");
    assert_eq!(hosts[2].host, "backup.example.com");
}

#[test]
fn resolve_breaks_priority_ties_lexicographically() {
    let stub = StubResolver::with_records(vec![
        MxHost::new(10, "mx-b.example.com"),
        MxHost::new(10, "mx-a.example.com"),
        MxHost::new(10, "mx-c.example.com"),
    ]);

    let hosts = resolver::resolve_with(&stub, "example.com").expect("lookup succeeds");
    let names: Vec<&str> = hosts.iter().map(|h| h.host.as_str()).collect();
    assert_eq!(
        names,
        ["mx-a.example.com", "mx-b.example.com", "mx-c.example.com"]
    );
}

#[test]
fn resolve_dedups_identical_records() {
    let stub = StubResolver::with_records(vec![
        MxHost::new(10, "mx.example.com"),
        MxHost::new(10, "mx.example.com"),
    ]);

    let hosts = resolver::resolve_with(&stub, "example.com").expect("lookup succeeds");
    assert_eq!(hosts.len(), 1);
}

#[test]
fn resolve_falls_back_to_address_record() {
    let stub = StubResolver::new(|_| Ok(Vec::new()), |_| Ok(true));

    let hosts = resolver::resolve_with(&stub, "example.com").expect("lookup succeeds");
    assert_eq!(hosts, vec![MxHost::new(0, "example.com".to_string())]);
}

#[test]
fn resolve_fails_without_mx_or_address() {
    let stub = StubResolver::new(|_| Ok(Vec::new()), |_| Ok(false));

    let err = resolver::resolve_with(&stub, "example.com").expect_err("no mail service");
    assert!(matches!(err, Error::NoMailExchanger));
}

#[test]
fn resolve_surfaces_nxdomain() {
    let stub = StubResolver::new(
        |_| Err(Error::DomainNotFound),
        |_| panic!("address fallback should not be consulted"),
    );

    let err = resolver::resolve_with(&stub, "notexisthost.example").expect_err("nxdomain");
    assert!(matches!(err, Error::DomainNotFound));
}

#[test]
fn resolve_normalizes_unicode_domains() {
    let stub = StubResolver::new(
        |domain| {
            assert_eq!(domain, "xn--bcher-kva.example");
            Ok(vec![MxHost::new(10, "mx.example.com")])
        },
        |_| panic!("address fallback should not be consulted"),
    );

    let hosts = resolver::resolve_with(&stub, "bücher.example").expect("lookup succeeds");
    assert_eq!(hosts[0].host, "mx.example.com");
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn resolved_order_is_total_and_stable(
            records in proptest::collection::vec(
                (0u16..50, "[a-z]{1,8}\\.example\\.com"),
                1..12,
            )
        ) {
            let records: Vec<MxHost> = records
                .into_iter()
                .map(|(priority, host)| MxHost::new(priority, host))
                .collect();
            let stub = StubResolver::with_records(records);

            let hosts = resolver::resolve_with(&stub, "example.com").unwrap();
            prop_assert!(!hosts.is_empty());
            for pair in hosts.windows(2) {
                prop_assert!(
                    (pair[0].priority, &pair[0].host) < (pair[1].priority, &pair[1].host)
                );
            }
        }
    }
}
