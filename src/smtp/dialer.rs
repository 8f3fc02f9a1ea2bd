use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use socks::Socks5Stream;
use tracing::trace;
use url::Url;

use super::error::SmtpError;

pub(crate) const SMTP_PORT: u16 = 25;

/// Transport dialing seam. The production implementation is [`NetDialer`];
/// tests substitute doubles to script connectivity and count invocations.
pub(crate) trait Dial {
    fn dial(&self, host: &str) -> Result<TcpStream, SmtpError>;
}

/// Dials `host:25` directly, or tunnels through a SOCKS5 proxy when one is
/// configured. The returned stream carries read/write deadlines; the caller
/// owns it and must close it on every exit path.
pub(crate) struct NetDialer {
    timeout: Duration,
    proxy: Option<ProxyTarget>,
}

#[derive(Debug)]
pub(crate) struct ProxyTarget {
    pub(crate) addr: String,
    pub(crate) auth: Option<(String, String)>,
}

impl NetDialer {
    pub(crate) fn new(timeout: Duration, proxy_uri: Option<&str>) -> Result<Self, SmtpError> {
        let proxy = proxy_uri.map(parse_proxy_uri).transpose()?;
        Ok(Self { timeout, proxy })
    }

    fn dial_direct(&self, host: &str) -> Result<TcpStream, SmtpError> {
        let addrs: Vec<_> = (host, SMTP_PORT)
            .to_socket_addrs()
            .map_err(|err| connect_error(host, err))?
            .collect();
        if addrs.is_empty() {
            return Err(SmtpError::ConnectionRefused {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no socket address for host"),
            });
        }

        connect_first(host, &addrs, Instant::now() + self.timeout)
    }

    fn dial_proxied(&self, host: &str, proxy: &ProxyTarget) -> Result<TcpStream, SmtpError> {
        trace!(%host, proxy = %proxy.addr, "dialing mail exchanger through proxy");
        let target = (host, SMTP_PORT);
        let stream = match &proxy.auth {
            Some((user, pass)) => {
                Socks5Stream::connect_with_password(proxy.addr.as_str(), target, user, pass)
            }
            None => Socks5Stream::connect(proxy.addr.as_str(), target),
        }
        .map_err(|err| proxied_error(host, err))?;
        Ok(stream.into_inner())
    }
}

impl Dial for NetDialer {
    fn dial(&self, host: &str) -> Result<TcpStream, SmtpError> {
        let stream = match &self.proxy {
            Some(proxy) => self.dial_proxied(host, proxy)?,
            None => self.dial_direct(host)?,
        };
        apply_deadlines(&stream, self.timeout).map_err(|err| connect_error(host, err))?;
        Ok(stream)
    }
}

/// Try each resolved address until `deadline`. The deadline is a budget for
/// the whole host attempt, shared across its address records, so one host
/// never takes longer than a single configured timeout.
pub(crate) fn connect_first(
    host: &str,
    addrs: &[SocketAddr],
    deadline: Instant,
) -> Result<TcpStream, SmtpError> {
    let mut last_err = None;
    for addr in addrs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(SmtpError::ConnectTimeout {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::TimedOut, "connect budget exhausted"),
            });
        }
        trace!(%host, %addr, "dialing mail exchanger");
        match TcpStream::connect_timeout(addr, remaining) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(connect_error(
        host,
        last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::ConnectionRefused)),
    ))
}

fn apply_deadlines(stream: &TcpStream, timeout: Duration) -> io::Result<()> {
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))
}

fn connect_error(host: &str, source: io::Error) -> SmtpError {
    match source.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => SmtpError::ConnectTimeout {
            host: host.to_string(),
            source,
        },
        _ => SmtpError::ConnectionRefused {
            host: host.to_string(),
            source,
        },
    }
}

/// Connect-class failures surfaced through the tunnel keep their host-level
/// recoverable mapping; anything else is a proxy failure and aborts.
pub(crate) fn proxied_error(host: &str, source: io::Error) -> SmtpError {
    match source.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::ConnectionRefused => {
            connect_error(host, source)
        }
        _ => SmtpError::Proxy {
            message: source.to_string(),
        },
    }
}

pub(crate) fn parse_proxy_uri(uri: &str) -> Result<ProxyTarget, SmtpError> {
    let parsed = Url::parse(uri).map_err(|err| SmtpError::Proxy {
        message: format!("invalid proxy URI: {err}"),
    })?;
    if parsed.scheme() != "socks5" {
        return Err(SmtpError::Proxy {
            message: format!("unsupported proxy scheme: {}", parsed.scheme()),
        });
    }
    let host = parsed.host_str().ok_or_else(|| SmtpError::Proxy {
        message: "proxy URI is missing a host".to_string(),
    })?;
    let port = parsed.port().unwrap_or(1080);
    let auth = match (parsed.username(), parsed.password()) {
        ("", _) => None,
        (user, password) => Some((user.to_string(), password.unwrap_or("").to_string())),
    };
    Ok(ProxyTarget {
        addr: format!("{host}:{port}"),
        auth,
    })
}
