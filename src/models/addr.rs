//! Fixed-width binary network addresses.
//!
//! Provides [`Addr`], a family-tagged IPv4/IPv6 address value, along with
//! the byte-array arithmetic the prefix operations are built on. All
//! arithmetic works on network-order byte arrays with explicit carry and
//! borrow, since IPv6 values do not fit a single machine integer.

use itertools::Itertools;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::CidrError;

/// An IPv4 (4-byte) or IPv6 (16-byte) address.
#[derive(Eq, Ord, Debug, Copy, Clone, Hash, PartialEq, PartialOrd)]
pub enum Addr {
    /// 32-bit address, rendered as a dotted quad.
    V4(Ipv4Addr),
    /// 128-bit address, rendered in compressed colon form.
    V6(Ipv6Addr),
}

impl Addr {
    /// Parse an address literal.
    ///
    /// An IPv4-mapped IPv6 literal (`::ffff:a.b.c.d`) normalizes to its
    /// 4-byte form before any further processing.
    pub fn new(addr: &str) -> Result<Addr, CidrError> {
        Ok(Addr::parse_literal(addr)?.to_canonical())
    }

    /// Parse an address literal without mapped-form normalization.
    pub(crate) fn parse_literal(addr: &str) -> Result<Addr, CidrError> {
        let addr = addr.trim();
        if let Ok(v4) = Ipv4Addr::from_str(addr) {
            return Ok(Addr::V4(v4));
        }
        if let Ok(v6) = Ipv6Addr::from_str(addr) {
            return Ok(Addr::V6(v6));
        }
        log::trace!("rejected address literal: {:?}", addr);
        Err(CidrError::InvalidAddress(addr.to_string()))
    }

    /// Collapse an IPv4-mapped IPv6 address to its 4-byte form.
    pub(crate) fn to_canonical(self) -> Addr {
        match self {
            Addr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => Addr::V4(v4),
                None => Addr::V6(v6),
            },
            v4 => v4,
        }
    }

    /// Bit-width of the address family: 32 or 128.
    pub fn width(&self) -> u8 {
        match self {
            Addr::V4(_) => 32,
            Addr::V6(_) => 128,
        }
    }

    /// The address as its network-order byte array.
    pub fn octets(&self) -> Vec<u8> {
        match self {
            Addr::V4(a) => a.octets().to_vec(),
            Addr::V6(a) => a.octets().to_vec(),
        }
    }

    /// Build an address of the same family from a byte array produced by
    /// [`Addr::octets`].
    pub(crate) fn with_octets(&self, bytes: &[u8]) -> Addr {
        match self {
            Addr::V4(_) => {
                let mut octets = [0u8; 4];
                octets.copy_from_slice(bytes);
                Addr::V4(Ipv4Addr::from(octets))
            }
            Addr::V6(_) => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(bytes);
                Addr::V6(Ipv6Addr::from(octets))
            }
        }
    }

    /// The reverse-lookup domain name for this address, always fully
    /// qualified (trailing dot).
    ///
    /// # Examples
    /// ```
    /// use cidr_arith::Addr;
    /// let addr = Addr::new("192.168.1.1").unwrap();
    /// assert_eq!(addr.reverse_dns(), "1.1.168.192.in-addr.arpa.");
    /// ```
    pub fn reverse_dns(&self) -> String {
        match self {
            Addr::V4(a) => {
                let o = a.octets();
                format!("{}.{}.{}.{}.in-addr.arpa.", o[3], o[2], o[1], o[0])
            }
            Addr::V6(a) => {
                // low nibble first within each byte, bytes reversed
                let nibbles = a
                    .octets()
                    .iter()
                    .rev()
                    .flat_map(|b| [b & 0x0f, b >> 4])
                    .map(|nibble| format!("{:x}", nibble))
                    .join(".");
                format!("{}.ip6.arpa.", nibbles)
            }
        }
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Addr::V4(a) => a.fmt(f),
            Addr::V6(a) => a.fmt(f),
        }
    }
}

/// Netmask byte for position `index` under a prefix of `len` bits.
fn prefix_mask_byte(index: usize, len: u8) -> u8 {
    let bit_start = (index * 8) as i16;
    let keep = (len as i16 - bit_start).clamp(0, 8);
    if keep == 0 {
        0
    } else {
        (0xffu16 << (8 - keep)) as u8
    }
}

/// Clear every bit beyond the first `len` bits.
pub(crate) fn clear_host_bits(bytes: &mut [u8], len: u8) {
    for (i, b) in bytes.iter_mut().enumerate() {
        *b &= prefix_mask_byte(i, len);
    }
}

/// Set every bit beyond the first `len` bits.
pub(crate) fn set_host_bits(bytes: &mut [u8], len: u8) {
    for (i, b) in bytes.iter_mut().enumerate() {
        *b |= !prefix_mask_byte(i, len);
    }
}

/// Add an unsigned offset to a network-order byte array, in place.
///
/// Returns `false` when the sum carries out of the most significant byte,
/// i.e. the result no longer fits the address width.
pub(crate) fn add_offset(bytes: &mut [u8], offset: u128) -> bool {
    let mut remaining = offset;
    let mut carry = 0u16;
    for b in bytes.iter_mut().rev() {
        let sum = *b as u16 + (remaining & 0xff) as u16 + carry;
        *b = (sum & 0xff) as u8;
        carry = sum >> 8;
        remaining >>= 8;
    }
    remaining == 0 && carry == 0
}

/// Subtract an unsigned offset from a network-order byte array, in place.
///
/// Returns `false` when the subtraction borrows past the most significant
/// byte.
pub(crate) fn sub_offset(bytes: &mut [u8], offset: u128) -> bool {
    let mut remaining = offset;
    let mut borrow = 0i16;
    for b in bytes.iter_mut().rev() {
        let diff = *b as i16 - (remaining & 0xff) as i16 - borrow;
        if diff < 0 {
            *b = (diff + 256) as u8;
            borrow = 1;
        } else {
            *b = diff as u8;
            borrow = 0;
        }
        remaining >>= 8;
    }
    remaining == 0 && borrow == 0
}
