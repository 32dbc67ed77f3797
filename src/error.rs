//! Error kinds for the CIDR arithmetic operations.

use std::error::Error;
use std::fmt;

/// Errors returned by the CIDR arithmetic operations.
///
/// Every variant is terminal for the call that produced it; no partial
/// result accompanies an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// Input string is not a valid IPv4 or IPv6 CIDR literal.
    InvalidCidr(String),
    /// Input string is not a valid IPv4 or IPv6 address literal.
    InvalidAddress(String),
    /// Requested host offset does not fit within the prefix's host bits.
    HostNumberOutOfRange {
        /// Prefix length of the block that was asked for the host.
        prefix_len: u8,
        /// The offending host offset.
        hostnum: i64,
    },
    /// Requested prefix extension is outside the fixed 0..=32 bit range.
    NewbitsTooLarge {
        /// The offending extension bit count.
        newbits: i64,
    },
    /// Extended prefix length would exceed the address family's bit-width.
    PrefixExtensionOutOfRange {
        /// Prefix length of the block being extended.
        prefix_len: u8,
        /// The requested extension bit count.
        newbits: i64,
        /// Bit-width of the address family (32 or 128).
        width: u8,
    },
    /// Subnet index does not fit within the allocated extension bits.
    SubnetNumberOutOfRange {
        /// The offending subnet index.
        netnum: i64,
        /// The extension bit count it had to fit in.
        newbits: i64,
    },
}

impl fmt::Display for CidrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CidrError::InvalidCidr(input) => {
                write!(f, "invalid CIDR expression: {}", input)
            }
            CidrError::InvalidAddress(input) => {
                write!(f, "invalid IPv4 or IPv6 address: {}", input)
            }
            CidrError::HostNumberOutOfRange {
                prefix_len,
                hostnum,
            } => write!(
                f,
                "prefix of {} does not accommodate a host numbered {}",
                prefix_len, hostnum
            ),
            CidrError::NewbitsTooLarge { newbits } => write!(
                f,
                "may not extend prefix by {} bits (allowed range is 0 to 32)",
                newbits
            ),
            CidrError::PrefixExtensionOutOfRange {
                prefix_len,
                newbits,
                width,
            } => write!(
                f,
                "not enough address space to extend prefix of {} by {} bits (family width {})",
                prefix_len, newbits, width
            ),
            CidrError::SubnetNumberOutOfRange { netnum, newbits } => {
                write!(f, "cannot fit subnet number {} in {} bits", netnum, newbits)
            }
        }
    }
}

impl Error for CidrError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CidrError::InvalidCidr("not-a-cidr".to_string()).to_string(),
            "invalid CIDR expression: not-a-cidr"
        );
        assert_eq!(
            CidrError::HostNumberOutOfRange {
                prefix_len: 30,
                hostnum: 255
            }
            .to_string(),
            "prefix of 30 does not accommodate a host numbered 255"
        );
        assert_eq!(
            CidrError::SubnetNumberOutOfRange {
                netnum: 16,
                newbits: 2
            }
            .to_string(),
            "cannot fit subnet number 16 in 2 bits"
        );
    }

    #[test]
    fn test_boxes_into_dyn_error() {
        let err: Box<dyn Error> = Box::new(CidrError::NewbitsTooLarge { newbits: 33 });
        assert!(err.to_string().contains("33 bits"));
    }
}
