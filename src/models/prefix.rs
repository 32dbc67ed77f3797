//! CIDR prefixes and the arithmetic defined over them.
//!
//! Provides [`Prefix`] for representing a network base address with a
//! prefix length, along with the host, netmask, and subnet calculations.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::addr::{add_offset, clear_host_bits, set_host_bits, sub_offset, Addr};
use crate::error::CidrError;

/// Maximum prefix extension accepted by [`Prefix::subnet`], regardless of
/// address family.
///
/// Kept at 32 bits so subnet numbers stay representable on 32-bit hosts,
/// even though the IPv6 arithmetic could take more.
pub const MAX_NEW_BITS: i64 = 32;

/// A network prefix: base address plus prefix length.
///
/// The base address always has its host bits cleared, even when the
/// literal it was parsed from carried nonzero host bits.
#[derive(Eq, Ord, Debug, Copy, Clone, Hash, PartialEq, PartialOrd)]
pub struct Prefix {
    addr: Addr,
    len: u8,
}

impl Prefix {
    /// Parse a CIDR literal (e.g. "10.0.0.0/24" or "fe80::/48").
    ///
    /// An IPv4-mapped IPv6 prefix covering the whole mapped range
    /// (length >= 96) normalizes to its IPv4 form.
    pub fn new(cidr: &str) -> Result<Prefix, CidrError> {
        let cidr = cidr.trim();
        let invalid = || {
            log::trace!("rejected CIDR literal: {:?}", cidr);
            CidrError::InvalidCidr(cidr.to_string())
        };
        let (addr_part, len_part) = cidr.split_once('/').ok_or_else(invalid)?;
        let addr = Addr::parse_literal(addr_part).map_err(|_| invalid())?;
        let len: u8 = len_part.parse().map_err(|_| invalid())?;
        if len > addr.width() {
            return Err(invalid());
        }
        let (addr, len) = match addr {
            Addr::V6(_) if len >= 96 => {
                let canonical = addr.to_canonical();
                match canonical {
                    Addr::V4(_) => (canonical, len - 96),
                    Addr::V6(_) => (addr, len),
                }
            }
            _ => (addr, len),
        };
        let mut bytes = addr.octets();
        clear_host_bits(&mut bytes, len);
        Ok(Prefix {
            addr: addr.with_octets(&bytes),
            len,
        })
    }

    /// The network base address.
    pub fn addr(&self) -> Addr {
        self.addr
    }

    /// The prefix length in bits.
    pub fn len(&self) -> u8 {
        self.len
    }

    /// Number of host bits remaining after the prefix.
    pub fn host_bits(&self) -> u8 {
        self.addr.width() - self.len
    }

    /// The netmask for this prefix length, as an address of the same
    /// family.
    ///
    /// # Examples
    /// ```
    /// use cidr_arith::Prefix;
    /// let prefix = Prefix::new("192.168.1.0/24").unwrap();
    /// assert_eq!(prefix.netmask().to_string(), "255.255.255.0");
    /// ```
    pub fn netmask(&self) -> Addr {
        let mut bytes = vec![0xffu8; self.addr.octets().len()];
        clear_host_bits(&mut bytes, self.len);
        self.addr.with_octets(&bytes)
    }

    /// The host address at the given offset within this prefix.
    ///
    /// Non-negative offsets count up from the network address; negative
    /// offsets count back from the last address of the block (-1 is the
    /// last address). Fails with [`CidrError::HostNumberOutOfRange`] when
    /// the offset magnitude does not fit the host bits.
    pub fn host(&self, hostnum: i64) -> Result<Addr, CidrError> {
        let host_bits = u32::from(self.host_bits());
        let magnitude = u128::from(hostnum.unsigned_abs());
        let mut bytes = self.addr.octets();
        let fits = if hostnum >= 0 {
            (host_bits >= 64 || magnitude < 1u128 << host_bits)
                && add_offset(&mut bytes, magnitude)
        } else {
            // -1 addresses the last address of the block
            set_host_bits(&mut bytes, self.len);
            (host_bits >= 64 || magnitude <= 1u128 << host_bits)
                && sub_offset(&mut bytes, magnitude - 1)
        };
        if !fits {
            return Err(CidrError::HostNumberOutOfRange {
                prefix_len: self.len,
                hostnum,
            });
        }
        Ok(self.addr.with_octets(&bytes))
    }

    /// Extend the prefix by `newbits` bits and select the `netnum`-th of
    /// the resulting subnets.
    ///
    /// The subnet number's bits are placed immediately after the original
    /// prefix length; all bits beyond the new length stay zero.
    pub fn subnet(&self, newbits: i64, netnum: i64) -> Result<Prefix, CidrError> {
        if !(0..=MAX_NEW_BITS).contains(&newbits) {
            return Err(CidrError::NewbitsTooLarge { newbits });
        }
        let width = self.addr.width();
        let new_len = i64::from(self.len) + newbits;
        if new_len > i64::from(width) {
            return Err(CidrError::PrefixExtensionOutOfRange {
                prefix_len: self.len,
                newbits,
                width,
            });
        }
        if netnum < 0 || netnum as u128 >= 1u128 << newbits {
            return Err(CidrError::SubnetNumberOutOfRange { netnum, newbits });
        }

        let mut bytes = self.addr.octets();
        for i in 0..newbits {
            if (netnum >> (newbits - 1 - i)) & 1 == 1 {
                let pos = usize::from(self.len) + i as usize;
                bytes[pos / 8] |= 0x80 >> (pos % 8);
            }
        }
        Ok(Prefix {
            addr: self.addr.with_octets(&bytes),
            len: new_len as u8,
        })
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

impl FromStr for Prefix {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Prefix, CidrError> {
        Prefix::new(s)
    }
}

impl Serialize for Prefix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let cidr = format!("{}/{}", self.addr, self.len);
        serializer.serialize_str(&cidr)
    }
}

impl<'de> Deserialize<'de> for Prefix {
    fn deserialize<D>(deserializer: D) -> Result<Prefix, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Prefix::new(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let prefix = Prefix::new("192.168.1.0/24").unwrap();
        assert_eq!(prefix.to_string(), "192.168.1.0/24");
        assert_eq!(prefix.len(), 24);
        assert_eq!(prefix.host_bits(), 8);

        let prefix = Prefix::new("fe80::/48").unwrap();
        assert_eq!(prefix.to_string(), "fe80::/48");
        assert_eq!(prefix.host_bits(), 80);

        // whitespace tolerated around the literal
        assert_eq!(
            Prefix::new(" 10.0.0.0/8 ").unwrap().to_string(),
            "10.0.0.0/8"
        );
    }

    #[test]
    fn test_parse_clears_host_bits() {
        let prefix = Prefix::new("192.168.1.42/24").unwrap();
        assert_eq!(prefix.to_string(), "192.168.1.0/24");

        let prefix = Prefix::new("2001:db8::dead:beef/64").unwrap();
        assert_eq!(prefix.to_string(), "2001:db8::/64");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            Prefix::new("not-a-cidr"),
            Err(CidrError::InvalidCidr(_))
        ));
        assert!(Prefix::new("10.256.0.0/8").is_err());
        assert!(Prefix::new("192.168.1.0").is_err());
        assert!(Prefix::new("192.168.1.0/33").is_err());
        assert!(Prefix::new("192.168.0.0/168").is_err());
        assert!(Prefix::new("192.168.1.0/").is_err());
        assert!(Prefix::new("192.168.1.0/-1").is_err());
        assert!(Prefix::new("::/129").is_err());
        assert!(Prefix::new("1::2::3/64").is_err());
    }

    #[test]
    fn test_parse_mapped_normalizes() {
        let prefix = Prefix::new("::ffff:192.168.0.0/112").unwrap();
        assert_eq!(prefix.to_string(), "192.168.0.0/16");
        assert_eq!(prefix.addr().width(), 32);

        // below the mapped range the prefix stays IPv6
        let prefix = Prefix::new("::ffff:0:0/95").unwrap();
        assert_eq!(prefix.addr().width(), 128);
    }

    #[test]
    fn test_netmask() {
        assert_eq!(
            Prefix::new("0.0.0.0/0").unwrap().netmask().to_string(),
            "0.0.0.0"
        );
        assert_eq!(
            Prefix::new("10.0.0.0/8").unwrap().netmask().to_string(),
            "255.0.0.0"
        );
        assert_eq!(
            Prefix::new("192.168.1.0/24").unwrap().netmask().to_string(),
            "255.255.255.0"
        );
        assert_eq!(
            Prefix::new("192.168.1.0/32").unwrap().netmask().to_string(),
            "255.255.255.255"
        );
        assert_eq!(
            Prefix::new("1::/64").unwrap().netmask().to_string(),
            "ffff:ffff:ffff:ffff::"
        );
        assert_eq!(Prefix::new("::/0").unwrap().netmask().to_string(), "::");
    }

    #[test]
    fn test_host() {
        let prefix = Prefix::new("192.168.1.0/24").unwrap();
        assert_eq!(prefix.host(0).unwrap().to_string(), "192.168.1.0");
        assert_eq!(prefix.host(5).unwrap().to_string(), "192.168.1.5");
        assert_eq!(prefix.host(255).unwrap().to_string(), "192.168.1.255");

        let prefix = Prefix::new("1::/64").unwrap();
        assert_eq!(prefix.host(5).unwrap().to_string(), "1::5");
    }

    #[test]
    fn test_host_negative() {
        let prefix = Prefix::new("192.168.1.0/24").unwrap();
        assert_eq!(prefix.host(-1).unwrap().to_string(), "192.168.1.255");
        assert_eq!(prefix.host(-5).unwrap().to_string(), "192.168.1.251");
        assert_eq!(prefix.host(-256).unwrap().to_string(), "192.168.1.0");

        let prefix = Prefix::new("1::/64").unwrap();
        assert_eq!(
            prefix.host(-1).unwrap().to_string(),
            "1::ffff:ffff:ffff:ffff"
        );
    }

    #[test]
    fn test_host_out_of_range() {
        let prefix = Prefix::new("192.168.1.0/30").unwrap();
        assert!(matches!(
            prefix.host(255),
            Err(CidrError::HostNumberOutOfRange {
                prefix_len: 30,
                hostnum: 255
            })
        ));
        assert!(prefix.host(-255).is_err());
        assert!(prefix.host(4).is_err());
        assert!(prefix.host(-5).is_err());
        assert_eq!(prefix.host(3).unwrap().to_string(), "192.168.1.3");
        assert_eq!(prefix.host(-4).unwrap().to_string(), "192.168.1.0");
    }

    #[test]
    fn test_host_negative_index_equivalence() {
        let prefix = Prefix::new("10.1.2.0/26").unwrap();
        let block = 1i64 << prefix.host_bits();
        for n in 0..block {
            assert_eq!(
                prefix.host(n).unwrap(),
                prefix.host(n - block).unwrap(),
                "offset {} should match {}",
                n,
                n - block
            );
        }
    }

    #[test]
    fn test_subnet() {
        let prefix = Prefix::new("192.168.2.0/20").unwrap();
        assert_eq!(prefix.subnet(4, 6).unwrap().to_string(), "192.168.6.0/24");

        let prefix = Prefix::new("fe80::/48").unwrap();
        assert_eq!(prefix.subnet(16, 6).unwrap().to_string(), "fe80:0:0:6::/64");

        // zero extension selects the prefix itself
        let prefix = Prefix::new("10.0.0.0/8").unwrap();
        assert_eq!(prefix.subnet(0, 0).unwrap().to_string(), "10.0.0.0/8");
    }

    #[test]
    fn test_subnet_errors() {
        let prefix = Prefix::new("192.168.0.0/30").unwrap();
        assert!(matches!(
            prefix.subnet(4, 6),
            Err(CidrError::PrefixExtensionOutOfRange { .. })
        ));

        let prefix = Prefix::new("fe80::/48").unwrap();
        assert!(matches!(
            prefix.subnet(33, 0),
            Err(CidrError::NewbitsTooLarge { newbits: 33 })
        ));
        assert!(matches!(
            prefix.subnet(-1, 0),
            Err(CidrError::NewbitsTooLarge { newbits: -1 })
        ));
        assert!(matches!(
            prefix.subnet(2, 16),
            Err(CidrError::SubnetNumberOutOfRange {
                netnum: 16,
                newbits: 2
            })
        ));
        assert!(matches!(
            prefix.subnet(2, -1),
            Err(CidrError::SubnetNumberOutOfRange { .. })
        ));
        assert!(matches!(
            prefix.subnet(0, 1),
            Err(CidrError::SubnetNumberOutOfRange { .. })
        ));
    }

    #[test]
    fn test_subnet_of_mapped_prefix() {
        let prefix = Prefix::new("::ffff:192.168.0.0/112").unwrap();
        assert_eq!(prefix.subnet(8, 6).unwrap().to_string(), "192.168.6.0/24");
    }

    #[test]
    fn test_serde_round_trip() {
        let prefix = Prefix::new("192.168.1.0/24").unwrap();
        let json = serde_json::to_string(&prefix).unwrap();
        assert_eq!(json, "\"192.168.1.0/24\"");
        let back: Prefix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, prefix);

        let err = serde_json::from_str::<Prefix>("\"10.256.0.0/8\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_prefix_cmp() {
        let p1 = Prefix::new("10.0.0.0/24").unwrap();
        let p2 = Prefix::new("10.0.1.0/24").unwrap();
        let p3 = Prefix::new("10.0.0.0/24").unwrap();

        assert!(p1 < p2);
        assert!(p1 == p3);
        assert!(p2 > p1);
    }
}
