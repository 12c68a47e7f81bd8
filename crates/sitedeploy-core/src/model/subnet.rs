// ── Base subnet ──
//
// Operators give the site's base /24 as `10.10.20.0/24`, `10.10.20.0` or the
// legacy `10.10.20.` prefix. Only the first three octets matter: every VLAN
// address is derived from them (primary range) or from the next /24
// (secondary range).

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CoreError;

/// Which /24 a VLAN is carved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressRange {
    /// The base `A.B.C.0/24`.
    Primary,
    /// The following `A.B.(C+1).0/24`.
    Secondary,
}

/// The operator-supplied base /24 of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseSubnet {
    octets: [u8; 3],
}

impl BaseSubnet {
    pub fn new(a: u8, b: u8, c: u8) -> Self {
        Self { octets: [a, b, c] }
    }

    /// First address of the requested /24, or `None` when the secondary
    /// range would overflow the third octet.
    pub fn range_start(&self, range: AddressRange) -> Option<Ipv4Addr> {
        let [a, b, c] = self.octets;
        match range {
            AddressRange::Primary => Some(Ipv4Addr::new(a, b, c, 0)),
            AddressRange::Secondary => c.checked_add(1).map(|c| Ipv4Addr::new(a, b, c, 0)),
        }
    }
}

impl FromStr for BaseSubnet {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let invalid = |reason: String| CoreError::ValidationFailed {
            message: format!("invalid base subnet '{raw}': {reason}"),
        };

        let host = match raw.split_once('/') {
            Some((host, prefix)) => {
                let prefix_len = prefix
                    .parse::<u8>()
                    .map_err(|_| invalid(format!("invalid prefix length '{prefix}'")))?;
                if prefix_len > 32 {
                    return Err(invalid(format!(
                        "prefix length must be <= 32, got {prefix_len}"
                    )));
                }
                host
            }
            None => raw,
        };

        // Legacy `A.B.C.` form.
        let host = if host.ends_with('.') && host.matches('.').count() == 3 {
            format!("{host}0")
        } else {
            host.to_owned()
        };

        let addr = host
            .parse::<Ipv4Addr>()
            .map_err(|_| invalid("expected an IPv4 network address".into()))?;
        let [a, b, c, d] = addr.octets();
        if d != 0 {
            return Err(invalid(format!("fourth octet must be 0, got {d}")));
        }

        Ok(Self::new(a, b, c))
    }
}

impl fmt::Display for BaseSubnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.octets;
        write!(f, "{a}.{b}.{c}.0/24")
    }
}

impl Serialize for BaseSubnet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
