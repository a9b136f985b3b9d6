//! Connection string parsing
//!
//! Supports formats:
//! * couchbase://host1[:port1][,host2[:port2]...][?key=value&...]
//! * couchbases://host1[:port1]... (TLS)
//! * http://host1[:port1]... (legacy HTTP bootstrap)
//! * host1[:port1],host2... (no scheme, legacy HTTP bootstrap)
//!
//! Hosts may be separated by `,` or `;`. IPv6 literals must be bracketed when a port
//! is given, e.g. `couchbase://[::1]:11210`.

use crate::protocol::constants::{schemes, DEFAULT_HOST};
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Bootstrap scheme named by the connection string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Legacy HTTP bootstrap: a user port addresses the management interface
    #[default]
    Http,
    /// Unencrypted key-value bootstrap: a user port addresses the key-value interface
    Couchbase,
    /// Encrypted key-value bootstrap
    Couchbases,
}

impl Scheme {
    /// Whether connections made under this scheme use TLS
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Couchbases)
    }

    /// Whether this is the legacy HTTP bootstrap mode
    pub fn is_legacy_http(&self) -> bool {
        matches!(self, Self::Http)
    }

    /// Scheme token as written in a connection string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => schemes::HTTP,
            Self::Couchbase => schemes::COUCHBASE,
            Self::Couchbases => schemes::COUCHBASES,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "" | schemes::HTTP => Ok(Self::Http),
            schemes::COUCHBASE => Ok(Self::Couchbase),
            schemes::COUCHBASES => Ok(Self::Couchbases),
            other => Err(Error::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Single host entry of a connection string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPort {
    /// Hostname or IP literal (IPv6 without brackets)
    pub host: String,
    /// Port as written; `None` when omitted
    pub port: Option<u16>,
}

impl HostPort {
    /// Create a host entry
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The user-supplied port, treating `0` the same as an omitted port
    pub fn explicit_port(&self) -> Option<u16> {
        self.port.filter(|&port| port != 0)
    }

    /// Render `host:port`, bracketing IPv6 literals
    pub fn endpoint(&self, port: u16) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, port)
        } else {
            format!("{}:{}", self.host, port)
        }
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => f.write_str(&self.endpoint(port)),
            None if self.host.contains(':') => write!(f, "[{}]", self.host),
            None => f.write_str(&self.host),
        }
    }
}

/// Parsed connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnSpec {
    /// Bootstrap scheme
    pub scheme: Scheme,
    /// Hosts in the order given; this is the failover priority order
    pub hosts: Vec<HostPort>,
    /// Query options in the order given
    pub options: Vec<(String, String)>,
}

impl ConnSpec {
    /// Parse connection string
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        // A "://" after a host list or inside an option value is not a scheme separator
        let (scheme, rest) = match s.split_once("://") {
            Some((scheme, rest)) if !scheme.contains(['?', '/', ',', ';']) => {
                (scheme.parse::<Scheme>()?, rest)
            }
            _ => (Scheme::Http, s),
        };

        // Split off query string before parsing hosts
        let (rest, query_string) = match rest.split_once('?') {
            Some((r, q)) => (r, q),
            None => (rest, ""),
        };

        let rest = match rest.split_once('/') {
            Some((hosts, "")) => hosts,
            Some((_, path)) => {
                return Err(Error::InvalidConnectionString(format!(
                    "unexpected path '/{}' after host list",
                    path
                )));
            }
            None => rest,
        };

        let hosts = parse_hosts(rest)?;
        let options = parse_options(query_string);

        Ok(Self {
            scheme,
            hosts,
            options,
        })
    }

    /// Look up a query option; later occurrences override earlier ones
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl FromStr for ConnSpec {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        for (i, host) in self.hosts.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", host)?;
        }
        for (i, (key, value)) in self.options.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

fn parse_hosts(list: &str) -> Result<Vec<HostPort>> {
    let mut hosts = Vec::new();
    for segment in list.split([',', ';']) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        hosts.push(parse_host(segment)?);
    }

    if hosts.is_empty() {
        hosts.push(HostPort::new(DEFAULT_HOST, None));
    }

    Ok(hosts)
}

fn parse_host(segment: &str) -> Result<HostPort> {
    // Bracketed IPv6 literal: [addr] or [addr]:port
    if let Some(rest) = segment.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or_else(|| {
            Error::InvalidConnectionString(format!("unterminated IPv6 literal in '{}'", segment))
        })?;
        if host.is_empty() {
            return Err(Error::InvalidConnectionString(format!(
                "missing host in '{}'",
                segment
            )));
        }
        let port = match after {
            "" => None,
            after => {
                let port = after.strip_prefix(':').ok_or_else(|| {
                    Error::InvalidConnectionString(format!(
                        "unexpected characters after IPv6 literal in '{}'",
                        segment
                    ))
                })?;
                Some(parse_port(port, segment)?)
            }
        };
        return Ok(HostPort::new(host, port));
    }

    // More than one colon without brackets: bare IPv6 literal, no port
    if segment.matches(':').count() > 1 {
        return Ok(HostPort::new(segment, None));
    }

    let (host, port) = match segment.split_once(':') {
        Some((host, port)) => (host, Some(parse_port(port, segment)?)),
        None => (segment, None),
    };

    if host.is_empty() {
        return Err(Error::InvalidConnectionString(format!(
            "missing host in '{}'",
            segment
        )));
    }

    Ok(HostPort::new(host, port))
}

fn parse_port(port: &str, segment: &str) -> Result<u16> {
    port.parse().map_err(|_| {
        Error::InvalidConnectionString(format!("invalid port '{}' in '{}'", port, segment))
    })
}

/// Split a query string into ordered key/value pairs
fn parse_options(query_string: &str) -> Vec<(String, String)> {
    let mut options = Vec::new();
    for pair in query_string.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => options.push((key.to_string(), value.to_string())),
            None => tracing::warn!("ignoring connection string option without value: {}", pair),
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_couchbase_multiple_hosts() {
        let spec = ConnSpec::parse("couchbase://10.0.0.1,10.0.0.2:11300").unwrap();
        assert_eq!(spec.scheme, Scheme::Couchbase);
        assert_eq!(
            spec.hosts,
            vec![
                HostPort::new("10.0.0.1", None),
                HostPort::new("10.0.0.2", Some(11300)),
            ]
        );
        assert!(spec.options.is_empty());
    }

    #[test]
    fn test_parse_couchbases() {
        let spec = ConnSpec::parse("couchbases://db.example.com").unwrap();
        assert_eq!(spec.scheme, Scheme::Couchbases);
        assert!(spec.scheme.is_encrypted());
        assert_eq!(spec.hosts, vec![HostPort::new("db.example.com", None)]);
    }

    #[test]
    fn test_parse_http_scheme() {
        let spec = ConnSpec::parse("http://localhost:8091").unwrap();
        assert_eq!(spec.scheme, Scheme::Http);
        assert_eq!(spec.hosts, vec![HostPort::new("localhost", Some(8091))]);
    }

    #[test]
    fn test_parse_without_scheme_defaults_to_http() {
        let spec = ConnSpec::parse("10.0.0.1:9000").unwrap();
        assert_eq!(spec.scheme, Scheme::Http);
        assert!(spec.scheme.is_legacy_http());
        assert_eq!(spec.hosts, vec![HostPort::new("10.0.0.1", Some(9000))]);
    }

    #[test]
    fn test_parse_empty_scheme_defaults_to_http() {
        let spec = ConnSpec::parse("://localhost").unwrap();
        assert_eq!(spec.scheme, Scheme::Http);
    }

    #[test]
    fn test_parse_without_scheme_option_value_with_separator() {
        let spec = ConnSpec::parse("10.0.0.1?certpath=file://ca.pem").unwrap();
        assert_eq!(spec.scheme, Scheme::Http);
        assert_eq!(spec.hosts, vec![HostPort::new("10.0.0.1", None)]);
        assert_eq!(spec.option("certpath"), Some("file://ca.pem"));

        let spec = ConnSpec::parse("a,b?certpath=file:///etc/ca.pem").unwrap();
        assert_eq!(spec.scheme, Scheme::Http);
        assert_eq!(spec.hosts.len(), 2);
        assert_eq!(spec.option("certpath"), Some("file:///etc/ca.pem"));
    }

    #[test]
    fn test_parse_scheme_with_option_value_with_separator() {
        let spec = ConnSpec::parse("couchbases://db?certpath=file://ca.pem").unwrap();
        assert_eq!(spec.scheme, Scheme::Couchbases);
        assert_eq!(spec.hosts, vec![HostPort::new("db", None)]);
        assert_eq!(spec.option("certpath"), Some("file://ca.pem"));
    }

    #[test]
    fn test_parse_unknown_scheme_fails() {
        let err = ConnSpec::parse("ftp://host").unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme(ref s) if s == "ftp"));
    }

    #[test]
    fn test_parse_semicolon_separator() {
        let spec = ConnSpec::parse("couchbase://a;b;c").unwrap();
        let names: Vec<_> = spec.hosts.iter().map(|h| h.host.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let spec = ConnSpec::parse("couchbase://a,,b,").unwrap();
        assert_eq!(spec.hosts.len(), 2);
    }

    #[test]
    fn test_parse_empty_host_list_defaults_to_localhost() {
        let spec = ConnSpec::parse("couchbase://").unwrap();
        assert_eq!(spec.hosts, vec![HostPort::new(DEFAULT_HOST, None)]);
    }

    #[test]
    fn test_parse_ipv6_with_port() {
        let spec = ConnSpec::parse("couchbase://[fe80::1]:11210,[::1]").unwrap();
        assert_eq!(
            spec.hosts,
            vec![
                HostPort::new("fe80::1", Some(11210)),
                HostPort::new("::1", None),
            ]
        );
    }

    #[test]
    fn test_parse_bare_ipv6_without_port() {
        let spec = ConnSpec::parse("couchbase://fe80::1").unwrap();
        assert_eq!(spec.hosts, vec![HostPort::new("fe80::1", None)]);
    }

    #[test]
    fn test_parse_unterminated_ipv6_fails() {
        let result = ConnSpec::parse("couchbase://[::1:11210");
        assert!(matches!(result, Err(Error::InvalidConnectionString(_))));
    }

    #[test]
    fn test_parse_invalid_port_fails() {
        assert!(ConnSpec::parse("couchbase://host:notaport").is_err());
        assert!(ConnSpec::parse("couchbase://host:70000").is_err());
    }

    #[test]
    fn test_parse_missing_host_fails() {
        let result = ConnSpec::parse("couchbase://:11210");
        assert!(matches!(result, Err(Error::InvalidConnectionString(_))));
    }

    #[test]
    fn test_parse_zero_port_is_kept_but_not_explicit() {
        let spec = ConnSpec::parse("couchbase://host:0").unwrap();
        assert_eq!(spec.hosts[0].port, Some(0));
        assert_eq!(spec.hosts[0].explicit_port(), None);
    }

    #[test]
    fn test_parse_options() {
        let spec =
            ConnSpec::parse("couchbase://host?connect_timeout=5000&tls_verify=none").unwrap();
        assert_eq!(spec.option("connect_timeout"), Some("5000"));
        assert_eq!(spec.option("tls_verify"), Some("none"));
        assert_eq!(spec.option("missing"), None);
    }

    #[test]
    fn test_later_option_overrides_earlier() {
        let spec = ConnSpec::parse("couchbase://host?a=1&a=2").unwrap();
        assert_eq!(spec.option("a"), Some("2"));
    }

    #[test]
    fn test_option_without_value_is_ignored() {
        let spec = ConnSpec::parse("couchbase://host?flag&a=1").unwrap();
        assert_eq!(spec.options, vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_parse_trailing_slash_accepted() {
        let spec = ConnSpec::parse("couchbase://host/").unwrap();
        assert_eq!(spec.hosts, vec![HostPort::new("host", None)]);
    }

    #[test]
    fn test_parse_path_rejected() {
        let result = ConnSpec::parse("couchbase://host/default");
        assert!(matches!(result, Err(Error::InvalidConnectionString(_))));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let input = "couchbases://a:11207,[::1]:18091,b?tls_verify=peer";
        let spec = ConnSpec::parse(input).unwrap();
        assert_eq!(spec.to_string(), input);
        assert_eq!(ConnSpec::parse(&spec.to_string()).unwrap(), spec);
    }

    #[test]
    fn test_scheme_from_str_and_display() {
        assert_eq!("couchbase".parse::<Scheme>().unwrap(), Scheme::Couchbase);
        assert_eq!("couchbases".parse::<Scheme>().unwrap(), Scheme::Couchbases);
        assert_eq!("http".parse::<Scheme>().unwrap(), Scheme::Http);
        assert_eq!(Scheme::Couchbases.to_string(), "couchbases");
        assert!("https".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_host_endpoint_brackets_ipv6() {
        assert_eq!(HostPort::new("::1", None).endpoint(8091), "[::1]:8091");
        assert_eq!(HostPort::new("node1", None).endpoint(8091), "node1:8091");
    }
}
