//! String-level CIDR operations.
//!
//! These are the functions a host configuration-language evaluator binds
//! to: each takes the scalar arguments the evaluator already parsed and
//! returns either the rendered result string or a [`CidrError`]. No
//! partial result is ever produced alongside an error.

use crate::error::CidrError;
use crate::models::{Addr, Prefix};

/// Calculate a full host address within the given network prefix.
///
/// `hostnum` may be negative to count back from the end of the block
/// (-1 is the last address).
///
/// # Examples
/// ```
/// use cidr_arith::cidr_host;
/// assert_eq!(cidr_host("192.168.1.0/24", 5).unwrap(), "192.168.1.5");
/// assert_eq!(cidr_host("192.168.1.0/24", -5).unwrap(), "192.168.1.251");
/// ```
pub fn cidr_host(prefix: &str, hostnum: i64) -> Result<String, CidrError> {
    log::debug!("cidr_host({:?}, {})", prefix, hostnum);
    let prefix = Prefix::new(prefix)?;
    Ok(prefix.host(hostnum)?.to_string())
}

/// Convert a prefix in CIDR notation into a subnet mask address.
pub fn cidr_netmask(prefix: &str) -> Result<String, CidrError> {
    log::debug!("cidr_netmask({:?})", prefix);
    let prefix = Prefix::new(prefix)?;
    Ok(prefix.netmask().to_string())
}

/// Calculate a subnet address within the given network prefix.
///
/// Extends the prefix by `newbits` bits (at most 32, regardless of
/// address family) and selects the `netnum`-th of the resulting subnets.
///
/// # Examples
/// ```
/// use cidr_arith::cidr_subnet;
/// assert_eq!(cidr_subnet("192.168.2.0/20", 4, 6).unwrap(), "192.168.6.0/24");
/// ```
pub fn cidr_subnet(prefix: &str, newbits: i64, netnum: i64) -> Result<String, CidrError> {
    log::debug!("cidr_subnet({:?}, {}, {})", prefix, newbits, netnum);
    let prefix = Prefix::new(prefix)?;
    Ok(prefix.subnet(newbits, netnum)?.to_string())
}

/// Produce the reverse-DNS lookup name for an IPv4 or IPv6 address.
///
/// The result is fully qualified (trailing dot), under `in-addr.arpa`
/// for IPv4 and `ip6.arpa` for IPv6.
pub fn rdns_host(address: &str) -> Result<String, CidrError> {
    log::debug!("rdns_host({:?})", address);
    let addr = Addr::new(address)?;
    Ok(addr.reverse_dns())
}
